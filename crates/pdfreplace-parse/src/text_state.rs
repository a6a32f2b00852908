//! Text state for the content stream interpreter.
//!
//! Tracks the parameters set by `Tc`, `Tw`, `Tz`, `TL`, `Tf`, `Tr` and `Ts`
//! together with the text and line matrices driven by `BT`, `Tm`, `Td`,
//! `TD` and `T*`.

use pdfreplace_core::geometry::Ctm;

/// Text parameters that belong to the graphics state and are saved and
/// restored by `q`/`Q`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStateSnapshot {
    pub char_spacing: f64,
    pub word_spacing: f64,
    pub h_scaling: f64,
    pub leading: f64,
    pub font_resource: String,
    pub font_size: f64,
    pub render_mode: i64,
    pub rise: f64,
}

/// Text state tracked while interpreting a content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct TextState {
    /// Character spacing (Tc).
    pub char_spacing: f64,
    /// Word spacing (Tw), applied to single-byte code 32 only.
    pub word_spacing: f64,
    /// Horizontal scaling (Tz) as a percentage.
    pub h_scaling: f64,
    /// Leading (TL).
    pub leading: f64,
    /// Resource name of the current font, e.g. `F1`.
    pub font_resource: String,
    pub font_size: f64,
    /// Rendering mode (Tr); 3 is invisible.
    pub render_mode: i64,
    /// Rise (Ts).
    pub rise: f64,
    text_matrix: Ctm,
    line_matrix: Ctm,
}

impl Default for TextState {
    fn default() -> Self {
        Self::new()
    }
}

impl TextState {
    pub fn new() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scaling: 100.0,
            leading: 0.0,
            font_resource: String::new(),
            font_size: 0.0,
            render_mode: 0,
            rise: 0.0,
            text_matrix: Ctm::identity(),
            line_matrix: Ctm::identity(),
        }
    }

    pub fn text_matrix(&self) -> &Ctm {
        &self.text_matrix
    }

    pub fn line_matrix(&self) -> &Ctm {
        &self.line_matrix
    }

    /// Horizontal scaling as a fraction (1.0 = 100%).
    pub fn h_scaling_normalized(&self) -> f64 {
        self.h_scaling / 100.0
    }

    /// `BT`: reset both matrices.
    pub fn begin_text(&mut self) {
        self.text_matrix = Ctm::identity();
        self.line_matrix = Ctm::identity();
    }

    /// `Tf`
    pub fn set_font(&mut self, resource: String, size: f64) {
        self.font_resource = resource;
        self.font_size = size;
    }

    /// `Tm`: replaces (not concatenates) both matrices.
    pub fn set_text_matrix(&mut self, m: Ctm) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    /// `Td`: offset from the start of the current line.
    pub fn move_text_position(&mut self, tx: f64, ty: f64) {
        let translation = Ctm::new(1.0, 0.0, 0.0, 1.0, tx, ty);
        self.line_matrix = translation.concat(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// `TD`: `-ty TL` followed by `tx ty Td`.
    pub fn move_text_position_and_set_leading(&mut self, tx: f64, ty: f64) {
        self.leading = -ty;
        self.move_text_position(tx, ty);
    }

    /// `T*`
    pub fn move_to_next_line(&mut self) {
        let leading = self.leading;
        self.move_text_position(0.0, -leading);
    }

    /// Advance the text matrix by `tx` text-space units after a glyph or a
    /// TJ adjustment.
    pub fn advance_text_position(&mut self, tx: f64) {
        let translation = Ctm::new(1.0, 0.0, 0.0, 1.0, tx, 0.0);
        self.text_matrix = translation.concat(&self.text_matrix);
    }

    /// Rendering matrix for the next glyph: `[Tfs·Th 0 0 Tfs 0 Ts] × Tm × CTM`.
    pub fn rendering_matrix(&self, ctm: &Ctm) -> Ctm {
        let params = Ctm::new(
            self.font_size * self.h_scaling_normalized(),
            0.0,
            0.0,
            self.font_size,
            0.0,
            self.rise,
        );
        params.concat(&self.text_matrix).concat(ctm)
    }

    /// Horizontal displacement for a glyph of width `w0` (glyph units).
    pub fn glyph_advance(&self, w0: f64, is_word_space: bool) -> f64 {
        let word = if is_word_space { self.word_spacing } else { 0.0 };
        (w0 / 1000.0 * self.font_size + self.char_spacing + word) * self.h_scaling_normalized()
    }

    /// Displacement for a TJ number.
    pub fn adjustment_advance(&self, amount: f64) -> f64 {
        -amount / 1000.0 * self.font_size * self.h_scaling_normalized()
    }

    pub fn save_snapshot(&self) -> TextStateSnapshot {
        TextStateSnapshot {
            char_spacing: self.char_spacing,
            word_spacing: self.word_spacing,
            h_scaling: self.h_scaling,
            leading: self.leading,
            font_resource: self.font_resource.clone(),
            font_size: self.font_size,
            render_mode: self.render_mode,
            rise: self.rise,
        }
    }

    /// Restore graphics-state parameters. Matrices are left alone.
    pub fn restore_snapshot(&mut self, snapshot: TextStateSnapshot) {
        self.char_spacing = snapshot.char_spacing;
        self.word_spacing = snapshot.word_spacing;
        self.h_scaling = snapshot.h_scaling;
        self.leading = snapshot.leading;
        self.font_resource = snapshot.font_resource;
        self.font_size = snapshot.font_size;
        self.render_mode = snapshot.render_mode;
        self.rise = snapshot.rise;
    }
}
