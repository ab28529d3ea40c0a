use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;

use crate::errors::RenderError;

/// An image input that may still be undecoded bytes.
///
/// Stands in for the "image ready" event of an interactive surface: the
/// first call to [`ImageSource::ready`] decodes, every later call reuses
/// the decoded pixels. Decoding happens at most once per source.
#[derive(Debug, Clone)]
pub struct ImageSource {
    encoded: Option<Vec<u8>>,
    decoded: Option<DynamicImage>,
}

impl ImageSource {
    /// Source from raw encoded bytes (PNG, JPEG, ...).
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            encoded: Some(bytes),
            decoded: None,
        }
    }

    /// Source from an already decoded image.
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            encoded: None,
            decoded: Some(image),
        }
    }

    /// Source from a base64 payload, as the inference response carries its
    /// rasters.
    pub fn from_base64(payload: &str) -> Result<Self, RenderError> {
        Ok(Self::from_bytes(STANDARD.decode(payload)?))
    }

    /// Whether the pixels are already decoded.
    pub fn is_ready(&self) -> bool {
        self.decoded.is_some()
    }

    /// Resolve to decoded pixels.
    ///
    /// The encoded bytes are kept until a decode succeeds, so a corrupt
    /// source reports the same error on every call.
    pub fn ready(&mut self) -> Result<&DynamicImage, RenderError> {
        if self.decoded.is_none() {
            let bytes = self.encoded.as_deref().unwrap_or_default();
            let image = image::load_from_memory(bytes)?;
            self.encoded = None;
            self.decoded = Some(image);
        }
        Ok(self.decoded.as_ref().expect("decoded just above"))
    }
}

impl From<DynamicImage> for ImageSource {
    fn from(image: DynamicImage) -> Self {
        Self::from_image(image)
    }
}
