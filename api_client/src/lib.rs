//! API client module for the PicSeek image library and similarity-search backend.

mod progress;

pub use progress::{GenerationEvent, LineDecoder};

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc;

/// The image library as reported by the backend.
///
/// `original_images` is the subset of `images` the server refuses to delete.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageListing {
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub original_images: Vec<String>,
}

impl ImageListing {
    pub fn is_original(&self, filename: &str) -> bool {
        self.original_images.iter().any(|f| f == filename)
    }
}

/// One ranked entry of a similarity-search response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    pub filename: String,
    pub image_url: String,
    pub similarity: f32,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct FeatureStatus {
    exists: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request error: {0}")]
    Request(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("stream error: {0}")]
    Stream(String),
}

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        ApiClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL serving the full-size image for `filename`.
    pub fn image_url(&self, filename: &str) -> String {
        format!("{}/images/{}", self.base_url, filename)
    }

    /// URL serving the reduced thumbnail for `filename`.
    pub fn thumb_url(&self, filename: &str) -> String {
        format!("{}/images/thumb/{}", self.base_url, filename)
    }

    /// Resolve a server-relative URL (as returned in search results) against
    /// the configured base.
    pub fn absolute_url(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            url.to_string()
        }
    }

    async fn error_for(response: reqwest::Response) -> ApiError {
        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| format!("HTTP {}", status));
        ApiError::Server(message)
    }

    /// Fetch the full library listing.
    pub async fn list_images(&self) -> Result<ImageListing, ApiError> {
        let url = format!("{}/api/images", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        response
            .json::<ImageListing>()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))
    }

    /// Ask whether a feature index exists server-side.
    pub async fn check_features(&self) -> Result<bool, ApiError> {
        let url = format!("{}/api/check-features", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let status = response
            .json::<FeatureStatus>()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Ok(status.exists)
    }

    /// Upload one image as multipart form data.
    pub async fn upload_image(&self, filename: &str, bytes: Vec<u8>) -> Result<(), ApiError> {
        let url = format!("{}/api/upload-image", self.base_url);
        let form = Form::new().part("file", Part::bytes(bytes).file_name(filename.to_string()));

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        Ok(())
    }

    /// Delete one image from the library. Originals are refused server-side.
    pub async fn delete_image(&self, filename: &str) -> Result<(), ApiError> {
        let url = format!("{}/api/delete-image/{}", self.base_url, filename);

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        Ok(())
    }

    /// Submit image bytes for similarity search and return the ranked hits.
    ///
    /// The endpoint only accepts uploaded binary content; callers searching
    /// with a library image fetch its bytes first via
    /// [`fetch_image`](ApiClient::fetch_image).
    pub async fn search(&self, filename: &str, bytes: Vec<u8>) -> Result<Vec<SearchHit>, ApiError> {
        let url = format!("{}/api/search", self.base_url);
        let form = Form::new().part("file", Part::bytes(bytes).file_name(filename.to_string()));

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let search_response = response
            .json::<SearchResponse>()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Ok(search_response.results)
    }

    /// Fetch the raw bytes of a library image.
    pub async fn fetch_image(&self, filename: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .client
            .get(self.image_url(filename))
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    /// Kick off server-side feature generation and consume its event stream.
    ///
    /// Progress events are forwarded on `events` as they arrive; the future
    /// resolves with the generated count once the stream reports completion.
    /// A `{error}` event or a stream that ends early resolves to an error.
    pub async fn generate_features(
        &self,
        events: mpsc::UnboundedSender<GenerationEvent>,
    ) -> Result<u64, ApiError> {
        use futures::StreamExt;

        let url = format!("{}/api/generate-features", self.base_url);

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(response).await);
        }

        let mut decoder = LineDecoder::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| ApiError::Request(e.to_string()))?;
            for event in decoder.feed(&bytes) {
                match event {
                    GenerationEvent::Complete { count } => {
                        let _ = events.send(GenerationEvent::Complete { count });
                        return Ok(count);
                    }
                    GenerationEvent::Failed(message) => {
                        return Err(ApiError::Stream(message));
                    }
                    progress => {
                        let _ = events.send(progress);
                    }
                }
            }
        }

        Err(ApiError::Stream("stream ended before completion".into()))
    }
}
