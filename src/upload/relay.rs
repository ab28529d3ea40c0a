use std::future::Future;

use reqwest::multipart::{Form, Part};

use crate::errors::TransportError;

/// Raw reply from the upload relay, before any payload validation.
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: u16,
    pub body: String,
}

impl RelayResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Boundary to the endpoint that forwards an image to the inference
/// backend.
///
/// Implementations report transport problems through the error; a reply
/// with a non-success status is still a [`RelayResponse`], with its status
/// and body preserved verbatim for diagnostics.
pub trait UploadRelay {
    /// Submit one image as the multipart field `image`.
    fn submit(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> impl Future<Output = Result<RelayResponse, TransportError>>;
}

/// HTTP relay posting multipart/form-data to a fixed endpoint.
pub struct HttpRelay {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpRelay {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl UploadRelay for HttpRelay {
    async fn submit(&self, file_name: &str, bytes: &[u8]) -> Result<RelayResponse, TransportError> {
        log::debug!(
            "posting {} ({} bytes) to {}",
            file_name,
            bytes.len(),
            self.endpoint
        );

        let part = Part::bytes(bytes.to_vec()).file_name(file_name.to_string());
        let form = Form::new().part("image", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        Ok(RelayResponse { status, body })
    }
}
