pub mod aggregate;
pub mod errors;
pub mod history;
pub mod models;
pub mod render;
pub mod upload;

pub use aggregate::{
    AnalysisReport, CONFIRMATION_THRESHOLD, ClassCount, ConfidenceBuckets, HIGH_CONFIDENCE_FLOOR,
    LOW_CONFIDENCE_CEILING,
};
pub use errors::{RenderError, TransportError, UploadError, ValidationError};
pub use history::{DuplicateEntry, HistoryStore};
pub use models::{
    BoundingBox, DetectionRecord, HistoryEntry, InferenceResult, POSITIVE_CLASS, Summary,
};
pub use render::{ImageSource, OverlayRenderer, PALETTE, palette_color};
pub use upload::{
    CompletedUpload, HttpRelay, RelayResponse, RequestToken, UploadOrchestrator, UploadRelay,
    UploadState,
};
