//! Graphics state stack for the content stream interpreter.
//!
//! `q` pushes the CTM, the fill colour and the text parameters; `Q` pops
//! them. `cm` concatenates onto the CTM.

use pdfreplace_core::geometry::Ctm;
use pdfreplace_core::painting::Color;

use crate::text_state::TextStateSnapshot;

#[derive(Debug, Clone)]
struct SavedState {
    ctm: Ctm,
    fill: Color,
    text: TextStateSnapshot,
}

/// CTM, fill colour and the `q`/`Q` stack.
#[derive(Debug, Clone, Default)]
pub struct InterpreterState {
    ctm: Ctm,
    fill: Color,
    stack: Vec<SavedState>,
}

impl InterpreterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State for a Form XObject: inherits CTM and colour, starts with an
    /// empty stack.
    pub fn nested(&self, matrix: Ctm) -> Self {
        Self {
            ctm: matrix.concat(&self.ctm),
            fill: self.fill,
            stack: Vec::new(),
        }
    }

    pub fn ctm(&self) -> &Ctm {
        &self.ctm
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// `q`
    pub fn save(&mut self, text: TextStateSnapshot) {
        self.stack.push(SavedState {
            ctm: self.ctm,
            fill: self.fill,
            text,
        });
    }

    /// `Q`: returns the text parameters to restore, or `None` on an
    /// unbalanced `Q`.
    pub fn restore(&mut self) -> Option<TextStateSnapshot> {
        let saved = self.stack.pop()?;
        self.ctm = saved.ctm;
        self.fill = saved.fill;
        Some(saved.text)
    }

    /// `cm`
    pub fn concat_matrix(&mut self, m: Ctm) {
        self.ctm = m.concat(&self.ctm);
    }

    /// `g`, `rg`, `k`, `sc`, `scn`. Component counts other than 1, 3 or 4
    /// (patterns, DeviceN) leave the colour unchanged.
    pub fn set_fill_components(&mut self, components: &[f64]) {
        if let Some(color) = Color::from_components(components) {
            self.fill = color;
        }
    }

    /// `cs`: a new colour space starts at its initial colour, black for
    /// the device spaces.
    pub fn reset_fill(&mut self) {
        self.fill = Color::black();
    }
}
