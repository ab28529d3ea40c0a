pub mod palette;
pub mod source;
mod text;

pub use palette::{PALETTE, palette_color};
pub use source::ImageSource;

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::errors::RenderError;
use crate::models::{BoundingBox, DetectionRecord};

/// Stroke thickness of a bounding box, in pixels.
const BOX_STROKE: u32 = 3;

/// Fixed height of the label banner above a box.
const LABEL_HEIGHT: u32 = 20;

/// Extra width around the measured label text.
const LABEL_PADDING: u32 = 8;

/// Integer upscale applied to the 8x8 label glyphs.
const LABEL_TEXT_SCALE: u32 = 2;

const LABEL_TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Burns bounding boxes and class labels into a copy of a source image.
///
/// Every call paints a fresh surface sized to the source's natural pixel
/// dimensions; the caller's image is never touched. Every record in the
/// input list draws exactly one box, colored by [`palette_color`] of its
/// list index, with a label banner whose bottom edge sits on the box top.
pub struct OverlayRenderer;

impl OverlayRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the source (decoding it on first use) and paint the overlay.
    pub fn render(
        &self,
        source: &mut ImageSource,
        detections: &[DetectionRecord],
    ) -> Result<RgbaImage, RenderError> {
        let image = source.ready()?;
        Ok(self.annotate(image, detections))
    }

    /// Paint the overlay onto a copy of an already decoded image.
    /// An empty detection list yields the plain image.
    pub fn annotate(&self, image: &DynamicImage, detections: &[DetectionRecord]) -> RgbaImage {
        let mut canvas = image.to_rgba8();
        for (index, det) in detections.iter().enumerate() {
            let color = palette_color(index);
            draw_box(&mut canvas, &det.bbox, color);
            draw_label(&mut canvas, det, color);
        }
        canvas
    }

    /// Render straight to PNG bytes, for exporting an annotated artifact.
    pub fn render_png(
        &self,
        source: &mut ImageSource,
        detections: &[DetectionRecord],
    ) -> Result<Vec<u8>, RenderError> {
        let canvas = self.render(source, detections)?;
        let mut bytes = Vec::new();
        canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Box corners snapped to whole pixels. Zero-area boxes clamp to one pixel
/// so the record still leaves a visible mark.
fn pixel_rect(bbox: &BoundingBox) -> (i32, i32, u32, u32) {
    let x = bbox.x1.round() as i32;
    let y = bbox.y1.round() as i32;
    let w = bbox.width().round().max(1.0) as u32;
    let h = bbox.height().round().max(1.0) as u32;
    (x, y, w, h)
}

fn draw_box(canvas: &mut RgbaImage, bbox: &BoundingBox, color: Rgba<u8>) {
    let (x, y, w, h) = pixel_rect(bbox);
    // Stroke as concentric one-pixel rings growing outward from the box edge
    for ring in 0..BOX_STROKE {
        let rect = Rect::at(x.saturating_sub(ring as i32), y.saturating_sub(ring as i32)).of_size(
            w.saturating_add(2 * ring),
            h.saturating_add(2 * ring),
        );
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

fn draw_label(canvas: &mut RgbaImage, det: &DetectionRecord, color: Rgba<u8>) {
    let label = format!("{} {:.1}%", det.label, det.confidence * 100.0);
    let text_width = text::measure(&label, LABEL_TEXT_SCALE);

    // Banner bottom edge touches the box top edge
    let x = det.bbox.x1.round() as i32;
    let y = (det.bbox.y1 - LABEL_HEIGHT as f32).round() as i32;
    let banner = Rect::at(x, y).of_size(text_width + LABEL_PADDING, LABEL_HEIGHT);
    draw_filled_rect_mut(canvas, banner, color);

    let text_x = x.saturating_add((LABEL_PADDING / 2) as i32);
    let text_y = y.saturating_add(((LABEL_HEIGHT - text::line_height(LABEL_TEXT_SCALE)) / 2) as i32);
    text::draw(canvas, &label, text_x, text_y, LABEL_TEXT_SCALE, LABEL_TEXT_COLOR);
}
