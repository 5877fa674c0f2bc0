//! Name-addressed texture regions.
//!
//! A [`TextureStore`] maps names to [`Region`]s inside decoded images, derives
//! slices and tiles from them, and keeps derived names stable across store
//! instances: a derived name such as `hero.png/3/7/10/15` resolves to the same
//! region in any store that registered `hero.png` to an equal region.

pub mod error;
pub mod key;
pub mod region;
pub mod store;
pub mod tileset;

pub use error::StoreError;
pub use key::{MAX_SLICE_DEPTH, TextureKey};
pub use region::{BaseImage, ImageId, Region, SliceRect};
pub use store::{BoundsPolicy, StoreBuilder, TextureStore};
pub use tileset::TilesetConfig;
