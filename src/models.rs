use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::errors::ValidationError;

/// Class label the backend assigns to a confirmed mitotic figure. Every
/// other label counts as the negative/background class.
pub const POSITIVE_CLASS: &str = "mitotic";

/// Axis-aligned box in source-image pixel coordinates.
/// Carried on the wire as the ordered array `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Corners must satisfy x2 >= x1 and y2 >= y1. Zero-area boxes are
    /// valid; reversed corners are not.
    pub fn is_ordered(&self) -> bool {
        self.x2 >= self.x1 && self.y2 >= self.y1
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [f32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.x1, bbox.y1, bbox.x2, bbox.y2]
    }
}

/// One candidate region classified by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    /// Unique within a single inference response, stable across re-renders.
    pub id: u32,

    /// Open set of class labels; see [`POSITIVE_CLASS`].
    #[serde(rename = "class")]
    pub label: String,

    /// Classifier confidence in [0, 1]. Out-of-range values and NaN are
    /// rejected at validation, never clamped.
    pub confidence: f64,

    pub bbox: BoundingBox,

    /// Base64-encoded saliency raster for this region. None means the
    /// backend computed no explanation, which is not an error.
    pub heatmap_image: Option<String>,
}

impl DetectionRecord {
    pub fn is_positive(&self) -> bool {
        self.label == POSITIVE_CLASS
    }
}

/// Classification totals for one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_candidates: usize,
    pub mitotic_count: usize,
    pub non_mitotic_count: usize,
}

/// One completed analysis of one uploaded image, as the relay returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    /// Base64-encoded input raster.
    pub original_image: String,
    /// Base64-encoded raster with stage-1 candidate regions drawn in.
    pub stage1_annotated_image: String,
    /// Base64-encoded raster with stage-2 classifications drawn in.
    pub stage2_annotated_image: String,
    /// Ordered by detection index; the order drives overlay color assignment.
    pub detections: Vec<DetectionRecord>,
    pub summary: Summary,
}

impl InferenceResult {
    /// Parse a raw relay body and run every ingestion check. Nothing
    /// downstream sees a payload that did not pass through here.
    pub fn from_json(payload: &str) -> Result<Self, ValidationError> {
        let result: Self = serde_json::from_str(payload)?;
        result.validate()?;
        Ok(result)
    }

    /// Check the per-record constraints and the summary cross-field
    /// invariant: total == mitotic + non_mitotic == detection count.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_detections(&self.detections)?;

        if self.summary.total_candidates != self.detections.len() {
            return Err(ValidationError::SummaryCountMismatch {
                reported: self.summary.total_candidates,
                actual: self.detections.len(),
            });
        }
        if self.summary.mitotic_count + self.summary.non_mitotic_count
            != self.summary.total_candidates
        {
            return Err(ValidationError::SummaryClassMismatch {
                mitotic: self.summary.mitotic_count,
                non_mitotic: self.summary.non_mitotic_count,
                total: self.summary.total_candidates,
            });
        }
        Ok(())
    }
}

/// Check confidence range, box ordering and id uniqueness for every record.
pub fn validate_detections(detections: &[DetectionRecord]) -> Result<(), ValidationError> {
    let mut seen_ids = HashSet::new();
    for det in detections {
        // NaN fails the range check as well; contains() is false for it
        if !(0.0..=1.0).contains(&det.confidence) {
            return Err(ValidationError::ConfidenceOutOfRange {
                id: det.id,
                value: det.confidence,
            });
        }
        if !det.bbox.is_ordered() {
            return Err(ValidationError::MalformedBoundingBox {
                id: det.id,
                x1: det.bbox.x1,
                y1: det.bbox.y1,
                x2: det.bbox.x2,
                y2: det.bbox.y2,
            });
        }
        if !seen_ids.insert(det.id) {
            return Err(ValidationError::DuplicateDetectionId(det.id));
        }
    }
    Ok(())
}

/// Immutable record of one completed upload.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: OffsetDateTime,
    pub file_name: String,
    pub detection_count: usize,
    pub avg_confidence: f64,
    /// Wall-clock seconds from submission to resolution.
    pub processing_time: f64,
}

impl HistoryEntry {
    /// Mint an entry with a fresh id and the current UTC timestamp.
    pub fn new(
        file_name: impl Into<String>,
        detection_count: usize,
        avg_confidence: f64,
        processing_time: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: OffsetDateTime::now_utc(),
            file_name: file_name.into(),
            detection_count,
            avg_confidence,
            processing_time,
        }
    }
}
