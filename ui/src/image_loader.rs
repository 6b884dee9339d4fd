//! Image loading for the PicSeek UI.

use iced::widget::image::Handle;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Semaphore;

#[derive(Debug, Error, PartialEq)]
pub enum ImageLoaderError {
    #[error("not found")]
    NotFound,
    #[error("timeout")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected status: {0}")]
    Status(u16),
    #[error("semaphore closed")]
    SemaphoreClosed,
}

/// Fetches images over HTTP and hands back in-memory widget handles.
///
/// A semaphore bounds the number of in-flight fetches; decoded handles are
/// owned by the controller and stay in memory for the life of the render.
#[derive(Debug, Clone)]
pub struct ImageLoader {
    client: reqwest::Client,
    semaphore: Arc<Semaphore>,
}

impl ImageLoader {
    pub fn new(concurrency: usize) -> Self {
        Self::with_client(reqwest::Client::new(), concurrency)
    }

    /// Create a loader with a custom HTTP client. Mainly used for testing.
    pub fn with_client(client: reqwest::Client, concurrency: usize) -> Self {
        Self {
            client,
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    pub async fn load(&self, url: &str) -> Result<Handle, ImageLoaderError> {
        let start = Instant::now();
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| ImageLoaderError::SemaphoreClosed)?;

        let response = self.client.get(url).send().await.map_err(classify)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ImageLoaderError::NotFound);
        }
        if !status.is_success() {
            return Err(ImageLoaderError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(classify)?;

        tracing::debug!("image_time_ms" = %start.elapsed().as_millis(), "url" = url);
        Ok(Handle::from_memory(bytes.to_vec()))
    }
}

fn classify(e: reqwest::Error) -> ImageLoaderError {
    if e.is_timeout() {
        ImageLoaderError::Timeout
    } else {
        ImageLoaderError::Network(e.to_string())
    }
}
