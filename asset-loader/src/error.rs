use texture_store::StoreError;
use thiserror::Error;

use crate::fetch::FetchError;
use crate::manifest::FrameRect;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Asset loader was already started")]
    AlreadyStarted,
    #[error("Name {0:?} is already queued in this batch")]
    DuplicateName(String),
    #[error("Failed to fetch {name:?} from {locator:?}")]
    Fetch {
        name: String,
        locator: String,
        #[source]
        source: FetchError,
    },
    #[error("Resource {name:?} loaded from {locator:?} expected to be an image but it isn't")]
    UnexpectedResource { name: String, locator: String },
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Malformed spritesheet manifest")]
    Json(#[from] serde_json::Error),
    #[error("Frame {frame:?} has an unusable rectangle {rect:?}")]
    InvalidFrame { frame: String, rect: FrameRect },
}
