//! Size, baseline and spacing math for drawing replacement text into a
//! redacted region.
//!
//! Width measurement is supplied by the caller as a closure so these
//! functions stay free of any font I/O.

use crate::geometry::BBox;

/// Smallest font size the fitter will shrink to.
pub const MIN_FONT_SIZE: f64 = 4.0;

/// Number of 3% refinement steps after the proportional shrink.
const REFINE_STEPS: usize = 4;

/// Per-step shrink factor during refinement.
const REFINE_FACTOR: f64 = 0.97;

/// Guess a font size from the region height when no style was found.
pub fn estimate_font_size(rect: &BBox) -> f64 {
    (rect.height().max(1.0) * 0.78).clamp(6.0, 48.0)
}

/// Usable width for text inside `rect`.
pub fn usable_width(rect: &BBox) -> f64 {
    (rect.width() - 1.0).max(1.0)
}

/// Baseline y (top-left origin) for text of `size` inside `rect`.
///
/// With a descender metric (negative, in em units) the baseline sits
/// `descender·size` above the bottom edge, clamped inside the rect.
/// Without one it falls back to `max(1, 0.18·size)` above the bottom.
pub fn baseline_y(rect: &BBox, size: f64, descender: Option<f64>) -> f64 {
    match descender {
        Some(desc) => {
            let mut y = rect.bottom + desc * size;
            if y < rect.top {
                y = rect.top + size;
            }
            if y > rect.bottom {
                y = rect.bottom - 1.0;
            }
            y
        }
        None => rect.bottom - (size * 0.18).max(1.0),
    }
}

/// Shrink `size` until `measure(size)` fits within `max_width`.
///
/// One proportional step, then up to four 3% steps, never below
/// [`MIN_FONT_SIZE`].
pub fn fit_font_size<F>(size: f64, max_width: f64, mut measure: F) -> f64
where
    F: FnMut(f64) -> f64,
{
    let w0 = measure(size);
    if w0 <= max_width || w0 <= 0.0 {
        return size;
    }
    let mut size = (size * (max_width / w0)).max(MIN_FONT_SIZE);
    for _ in 0..REFINE_STEPS {
        if measure(size) <= max_width {
            break;
        }
        let next = size * REFINE_FACTOR;
        if next < MIN_FONT_SIZE {
            size = MIN_FONT_SIZE;
            break;
        }
        size = next;
    }
    size
}

/// Inputs to the tracking-emulation heuristic.
#[derive(Debug, Clone, Copy)]
pub struct TrackingCheck<'a> {
    pub rect: &'a BBox,
    pub original_text: &'a str,
    pub replacement_text: &'a str,
    /// Width of the replacement at `font_size`.
    pub measured_replacement: f64,
    /// Width of the original text at `font_size` in the chosen font.
    pub measured_original: f64,
    pub font_size: f64,
}

/// Decide whether the replacement should be laid out glyph by glyph to
/// mimic the letter-spacing of the original.
pub fn should_distribute(check: &TrackingCheck<'_>) -> bool {
    if check.font_size < 12.0 {
        return false;
    }
    if check.replacement_text.chars().count() <= 2 || check.measured_replacement <= 0.0 {
        return false;
    }

    let rect_w = usable_width(check.rect);
    if rect_w / check.measured_replacement < 1.20 {
        return false;
    }

    let orig = check.original_text.trim();
    let repl = check.replacement_text.trim();
    if orig.is_empty() {
        return false;
    }
    if orig.chars().any(char::is_whitespace) != repl.chars().any(char::is_whitespace) {
        return false;
    }

    // The original must itself under-fill the rect.
    if check.measured_original <= 0.0 || rect_w / check.measured_original < 1.10 {
        return false;
    }

    let ratio = repl.chars().count() as f64 / orig.chars().count().max(1) as f64;
    (0.65..=1.35).contains(&ratio)
}

/// Horizontal offsets (relative to `rect.x0`) for each glyph of a
/// distributed insertion.
///
/// The slack between the summed glyph widths and the usable width is spread
/// evenly over the gaps, capped at `2.5·size` per gap.
pub fn distribute_offsets(widths: &[f64], rect: &BBox, size: f64) -> Vec<f64> {
    let total: f64 = widths.iter().sum();
    let max_width = usable_width(rect);
    let gaps = widths.len().saturating_sub(1).max(1) as f64;
    let extra = if max_width > total {
        (max_width - total) / gaps
    } else {
        0.0
    };
    let extra = extra.clamp(0.0, size * 2.5);

    let mut x = 0.0;
    widths
        .iter()
        .map(|w| {
            let at = x;
            x += w + extra;
            at
        })
        .collect()
}
