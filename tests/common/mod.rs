mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from mitoscan for tests
pub use mitoscan::{
    BoundingBox, DetectionRecord, HistoryEntry, HistoryStore, ImageSource, InferenceResult,
    OverlayRenderer, Summary, UploadOrchestrator, UploadState, ValidationError,
};
