use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{ImageBuffer, Rgb};

use mitoscan::errors::TransportError;
use mitoscan::upload::{RelayResponse, UploadRelay};
use mitoscan::{BoundingBox, DetectionRecord, InferenceResult, aggregate};

/// Encodes an 8x8 solid-color PNG and returns it as base64, standing in
/// for the rasters a real backend attaches.
pub fn tiny_png_base64() -> String {
    let img = ImageBuffer::from_fn(8, 8, |_, _| Rgb([180u8, 60u8, 60u8]));
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .expect("Failed to encode fixture png");
    STANDARD.encode(bytes)
}

/// Creates a detection without a heatmap; the box position follows the id
/// so fixtures never overlap.
pub fn make_detection(id: u32, label: &str, confidence: f64) -> DetectionRecord {
    let off = id as f32 * 30.0;
    DetectionRecord {
        id,
        label: label.to_string(),
        confidence,
        bbox: BoundingBox::new(10.0 + off, 10.0, 30.0 + off, 30.0),
        heatmap_image: None,
    }
}

/// Creates a positive-class detection carrying a heatmap raster.
pub fn confirmed_detection(id: u32, confidence: f64) -> DetectionRecord {
    DetectionRecord {
        heatmap_image: Some(tiny_png_base64()),
        ..make_detection(id, "mitotic", confidence)
    }
}

/// Builds a full inference result whose summary is consistent with the
/// detection list.
pub fn make_result(detections: Vec<DetectionRecord>) -> InferenceResult {
    let summary = aggregate::summarize(&detections);
    InferenceResult {
        original_image: tiny_png_base64(),
        stage1_annotated_image: tiny_png_base64(),
        stage2_annotated_image: tiny_png_base64(),
        detections,
        summary,
    }
}

/// Relay that always answers with the same canned status and body.
pub struct StaticRelay {
    pub status: u16,
    pub body: String,
}

impl StaticRelay {
    /// Canned success reply carrying `result` as JSON.
    pub fn ok(result: &InferenceResult) -> Self {
        Self {
            status: 200,
            body: serde_json::to_string(result).expect("Failed to serialize fixture result"),
        }
    }

    /// Canned error reply with a raw body.
    pub fn error(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

impl UploadRelay for StaticRelay {
    async fn submit(&self, _file_name: &str, _bytes: &[u8]) -> Result<RelayResponse, TransportError> {
        Ok(RelayResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

/// Relay standing in for a dead endpoint.
pub struct UnreachableRelay;

impl UploadRelay for UnreachableRelay {
    async fn submit(&self, _file_name: &str, _bytes: &[u8]) -> Result<RelayResponse, TransportError> {
        Err(TransportError::Unreachable("connection refused".to_string()))
    }
}
