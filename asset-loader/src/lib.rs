//! Batch loading of textures, spritesheets, tilesets and fonts into a
//! [`TextureStore`](texture_store::TextureStore).
//!
//! The actual downloading and decoding is done by a [`Fetcher`] supplied by
//! the application.

pub mod builder;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod manifest;

pub use builder::AssetLoaderBuilder;
pub use error::{LoaderError, ManifestError};
pub use fetch::{FetchError, FetchFn, FetchRequest, Fetched, Fetcher, ResourceKind};
pub use loader::{AssetLoader, LoaderState, PendingCounts};
pub use manifest::{FrameEntry, FrameRect, SheetManifest};
