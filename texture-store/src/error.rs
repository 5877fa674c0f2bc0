use thiserror::Error;

use crate::key::MAX_SLICE_DEPTH;
use crate::region::Region;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Separator must be exactly one character that is not a digit or '-', got {0:?}")]
    InvalidSeparator(String),
    #[error("Texture name {name:?} contains the reserved separator {separator:?}")]
    ReservedSeparator { name: String, separator: char },
    #[error("No texture registered or derivable under {0:?}")]
    NotFound(String),
    #[error("No registered name for region {0:?}")]
    RegionNotRegistered(Region),
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),
    #[error("Texture {0:?} has no tileset configuration")]
    NotATileset(String),
    #[error("Tileset configuration for {0:?} is already registered")]
    DuplicateTileset(String),
    #[error("Offset of the slice {0:?} does not fit in 32-bit coordinates")]
    CoordinateOverflow(String),
    #[error("Region {0:?} lies outside its base image")]
    OutOfBounds(Region),
    #[error("Slicing {0:?} would nest slices deeper than {max} levels", max = MAX_SLICE_DEPTH)]
    SliceTooDeep(String),
}

impl StoreError {
    /// Whether the error reports an unknown name or region.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::NotFound(_) | StoreError::RegionNotRegistered(_)
        )
    }
}
