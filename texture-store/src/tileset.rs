use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Uniform tile grid cut out of a named region.
///
/// Offsets and spacing are in pixels, relative to the region the tileset is
/// attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct TilesetConfig {
    #[serde(alias = "tileWidth")]
    pub tile_width: i32,
    #[serde(alias = "tileHeight")]
    pub tile_height: i32,
    #[serde(default, alias = "offsetX")]
    pub offset_x: i32,
    #[serde(default, alias = "offsetY")]
    pub offset_y: i32,
    #[serde(default, alias = "spacingX")]
    pub spacing_x: i32,
    #[serde(default, alias = "spacingY")]
    pub spacing_y: i32,
}

impl TilesetConfig {
    /// A tight grid without offset or spacing.
    pub const fn new(tile_width: i32, tile_height: i32) -> Self {
        Self {
            tile_width,
            tile_height,
            offset_x: 0,
            offset_y: 0,
            spacing_x: 0,
            spacing_y: 0,
        }
    }

    pub const fn with_offset(mut self, offset_x: i32, offset_y: i32) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    pub const fn with_spacing(mut self, spacing_x: i32, spacing_y: i32) -> Self {
        self.spacing_x = spacing_x;
        self.spacing_y = spacing_y;
        self
    }

    /// Tile sizes must be positive, offsets and spacing non-negative.
    pub fn validate(&self) -> Result<(), StoreError> {
        let checks = [
            ("tile_width", self.tile_width, 1),
            ("tile_height", self.tile_height, 1),
            ("offset_x", self.offset_x, 0),
            ("offset_y", self.offset_y, 0),
            ("spacing_x", self.spacing_x, 0),
            ("spacing_y", self.spacing_y, 0),
        ];

        for (field, value, min) in checks {
            if value < min {
                return Err(StoreError::InvalidDimension(format!(
                    "tileset {field} must be at least {min}, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Top-left corner of tile `(tile_x, tile_y)`, relative to the tileset's region.
    ///
    /// Tile coordinates are not bounded; `None` means the offset does not fit in `i32`.
    pub fn tile_origin(&self, tile_x: i32, tile_y: i32) -> Option<(i32, i32)> {
        let step_x = self.tile_width.checked_add(self.spacing_x)?;
        let step_y = self.tile_height.checked_add(self.spacing_y)?;
        let x = tile_x.checked_mul(step_x)?.checked_add(self.offset_x)?;
        let y = tile_y.checked_mul(step_y)?.checked_add(self.offset_y)?;
        Some((x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TilesetConfig {
        TilesetConfig::new(10, 11).with_offset(1, 4).with_spacing(2, 3)
    }

    #[test]
    fn tile_origin_follows_offset_and_spacing() {
        let config = sample();
        assert_eq!(config.tile_origin(0, 0), Some((1, 4)));
        assert_eq!(config.tile_origin(1, 0), Some((13, 4)));
        assert_eq!(config.tile_origin(0, 1), Some((1, 18)));
        assert_eq!(config.tile_origin(1, 1), Some((13, 18)));
        assert_eq!(config.tile_origin(-1, 0), Some((-11, 4)));
    }

    #[test]
    fn validation_accepts_zero_offsets_and_spacing() {
        assert!(TilesetConfig::new(16, 16).validate().is_ok());
    }

    #[test]
    fn validation_rejects_bad_fields() {
        let edits: [fn(&mut TilesetConfig); 6] = [
            |config| config.tile_width = 0,
            |config| config.tile_height = 0,
            |config| config.offset_x = -1,
            |config| config.offset_y = -1,
            |config| config.spacing_x = -1,
            |config| config.spacing_y = -1,
        ];
        for edit in edits {
            let mut config = sample();
            edit(&mut config);
            assert!(
                matches!(config.validate(), Err(StoreError::InvalidDimension(_))),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn tile_origin_reports_overflow() {
        assert_eq!(TilesetConfig::new(16, 16).tile_origin(i32::MAX, 0), None);
    }

    #[test]
    fn deserializes_camel_case_fields() {
        let config: TilesetConfig = serde_json::from_str(
            r#"{"tileWidth":10,"tileHeight":11,"offsetX":1,"offsetY":4,"spacingX":2,"spacingY":3}"#,
        )
        .expect("valid tileset json");
        assert_eq!(config, sample());
    }
}
