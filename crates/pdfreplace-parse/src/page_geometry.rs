//! Conversion between PDF user space (bottom-left origin) and the top-left
//! origin used for chars, search results and match regions.

use pdfreplace_core::geometry::BBox;

/// Page viewport derived from `/MediaBox`.
///
/// The BBox passed in holds raw PDF array values: `x0` = left,
/// `top` = y-min (PDF bottom), `x1` = right, `bottom` = y-max (PDF top).
///
/// ```
/// use pdfreplace_core::geometry::BBox;
/// use pdfreplace_parse::page_geometry::PageGeometry;
///
/// let geo = PageGeometry::new(BBox::new(0.0, 0.0, 612.0, 792.0));
/// assert_eq!(geo.to_display(72.0, 720.0), (72.0, 72.0));
/// assert_eq!(geo.to_pdf(72.0, 72.0), (72.0, 720.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl PageGeometry {
    pub fn new(media_box: BBox) -> Self {
        Self {
            x0: media_box.x0.min(media_box.x1),
            y0: media_box.top.min(media_box.bottom),
            x1: media_box.x0.max(media_box.x1),
            y1: media_box.top.max(media_box.bottom),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// The page itself in display coordinates.
    pub fn bounds(&self) -> BBox {
        BBox::new(0.0, 0.0, self.width(), self.height())
    }

    /// PDF user-space point to display `(x, top)`.
    pub fn to_display(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.x0, self.y1 - y)
    }

    /// Display `(x, top)` back to PDF user space.
    pub fn to_pdf(&self, x: f64, top: f64) -> (f64, f64) {
        (x + self.x0, self.y1 - top)
    }

    /// Display box to a PDF rectangle `[x, y, width, height]` as used by `re`.
    pub fn to_pdf_rect(&self, bbox: &BBox) -> [f64; 4] {
        let (x, y) = self.to_pdf(bbox.x0, bbox.bottom);
        [x, y, bbox.width(), bbox.height()]
    }
}
