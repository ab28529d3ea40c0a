use thiserror::Error;

/// Reasons an inference payload is rejected at the ingestion boundary.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("payload is not a valid inference result: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    #[error("detection {id}: confidence {value} is outside [0, 1]")]
    ConfidenceOutOfRange { id: u32, value: f64 },

    #[error("detection {id}: bounding box corners ({x1}, {y1})-({x2}, {y2}) are not ordered")]
    MalformedBoundingBox {
        id: u32,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },

    #[error("detection id {0} appears more than once in the response")]
    DuplicateDetectionId(u32),

    #[error("summary reports {reported} candidates but the response carries {actual} detections")]
    SummaryCountMismatch { reported: usize, actual: usize },

    #[error("summary counts do not add up: {mitotic} mitotic + {non_mitotic} other != {total} total")]
    SummaryClassMismatch {
        mitotic: usize,
        non_mitotic: usize,
        total: usize,
    },
}

/// Failure to reach the upload relay, or a non-success reply from it.
///
/// The status and body of an error reply are preserved verbatim; retrying
/// is up to the caller.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("relay unreachable: {0}")]
    Unreachable(String),

    #[error("relay returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Terminal outcome of one failed upload attempt.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Failure while resolving an image source or encoding an annotated surface.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("image payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image codec failure: {0}")]
    Codec(#[from] image::ImageError),
}
