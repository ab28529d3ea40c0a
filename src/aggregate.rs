use crate::models::{DetectionRecord, Summary};

/// Confidence at or above which a positive-class candidate counts as
/// confirmed. Inclusive bound, fixed decision boundary for the whole crate.
pub const CONFIRMATION_THRESHOLD: f64 = 0.70;

/// Confidences strictly above this land in the high bucket.
pub const HIGH_CONFIDENCE_FLOOR: f64 = 0.8;

/// Confidences strictly below this land in the low bucket.
pub const LOW_CONFIDENCE_CEILING: f64 = 0.6;

/// Occurrence count of one class label within a single response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCount {
    pub name: String,
    pub count: usize,
}

/// Detections split by confidence. Values in [0.6, 0.8] belong to neither
/// bucket; the gap is part of the contract.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfidenceBuckets {
    pub high: usize,
    pub low: usize,
}

/// Everything the display layer derives from one detection list.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub summary: Summary,
    pub class_distribution: Vec<ClassCount>,
    pub confidence_buckets: ConfidenceBuckets,
    pub average_confidence: f64,
    pub confirmed_count: usize,
    /// Wall-clock seconds the upload took, when the caller measured it.
    pub processing_time: Option<f64>,
}

/// One entry per distinct class label, ordered by first occurrence.
pub fn class_distribution(detections: &[DetectionRecord]) -> Vec<ClassCount> {
    let mut counts: Vec<ClassCount> = Vec::new();
    for det in detections {
        match counts.iter_mut().find(|c| c.name == det.label) {
            Some(entry) => entry.count += 1,
            None => counts.push(ClassCount {
                name: det.label.clone(),
                count: 1,
            }),
        }
    }
    counts
}

/// high = count(confidence > 0.8), low = count(confidence < 0.6). Both
/// comparisons are strict, so the boundary values count for neither bucket.
pub fn confidence_buckets(detections: &[DetectionRecord]) -> ConfidenceBuckets {
    let mut buckets = ConfidenceBuckets::default();
    for det in detections {
        if det.confidence > HIGH_CONFIDENCE_FLOOR {
            buckets.high += 1;
        }
        if det.confidence < LOW_CONFIDENCE_CEILING {
            buckets.low += 1;
        }
    }
    buckets
}

/// Arithmetic mean of the confidences; 0.0 for an empty list.
pub fn average_confidence(detections: &[DetectionRecord]) -> f64 {
    if detections.is_empty() {
        return 0.0;
    }
    let sum: f64 = detections.iter().map(|d| d.confidence).sum();
    sum / detections.len() as f64
}

/// Positive-class detections at or above [`CONFIRMATION_THRESHOLD`] that
/// carry a saliency heatmap. Order follows the input list.
pub fn confirmed_positives(detections: &[DetectionRecord]) -> Vec<&DetectionRecord> {
    detections
        .iter()
        .filter(|d| {
            d.is_positive() && d.heatmap_image.is_some() && d.confidence >= CONFIRMATION_THRESHOLD
        })
        .collect()
}

/// Summary derived from the list itself, never taken from the payload. A
/// candidate counts as mitotic when its label is the positive class and its
/// confidence reaches the confirmation threshold, matching the backend's
/// counting rule.
pub fn summarize(detections: &[DetectionRecord]) -> Summary {
    let mitotic_count = detections
        .iter()
        .filter(|d| d.is_positive() && d.confidence >= CONFIRMATION_THRESHOLD)
        .count();
    Summary {
        total_candidates: detections.len(),
        mitotic_count,
        non_mitotic_count: detections.len() - mitotic_count,
    }
}

/// Bundle of all derived statistics for one analysis.
pub fn report(detections: &[DetectionRecord], processing_time: Option<f64>) -> AnalysisReport {
    AnalysisReport {
        summary: summarize(detections),
        class_distribution: class_distribution(detections),
        confidence_buckets: confidence_buckets(detections),
        average_confidence: average_confidence(detections),
        confirmed_count: confirmed_positives(detections).len(),
        processing_time,
    }
}
