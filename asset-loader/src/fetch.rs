use std::{future::Future, pin::Pin, sync::Arc};

use async_trait::async_trait;
use texture_store::BaseImage;

/// Error reported by a fetch service. The loader only forwards it.
pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Image,
    Font,
}

impl ResourceKind {
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Image => "image",
            ResourceKind::Font => "font",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Generated by the loader, unique within one batch.
    pub id: String,
    /// Name the resource was queued under. Textures and sheets share a
    /// namespace, fonts have their own.
    pub name: String,
    /// URL or path, passed through untouched.
    pub locator: String,
    pub kind: ResourceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetched {
    /// A decoded image and its native size.
    Image(BaseImage),
    /// Anything the fetch service handled itself, such as an installed font.
    Other,
}

/// Downloads and decodes raw resources on behalf of the loader.
///
/// Timeouts and retries are the implementation's business.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<Fetched, FetchError>;
}

// --- Shared Fetcher ---

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    async fn fetch(&self, request: FetchRequest) -> Result<Fetched, FetchError> {
        (**self).fetch(request).await
    }
}

// --- Future Fetcher ---

pub type FetchFn = Box<
    dyn Fn(FetchRequest) -> Pin<Box<dyn Future<Output = Result<Fetched, FetchError>> + Send>>
        + Send
        + Sync,
>;

#[async_trait]
impl Fetcher for FetchFn {
    async fn fetch(&self, request: FetchRequest) -> Result<Fetched, FetchError> {
        (self)(request).await
    }
}
