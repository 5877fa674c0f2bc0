use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use texture_store::Region;

use crate::error::ManifestError;

/// Spritesheet description in the common `{ frames: { name: { frame } }, meta }` layout.
///
/// Only the frame rectangles are used. Per-frame fields such as `rotated`,
/// `trimmed` or `sourceSize` are ignored, `meta` is kept as is.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SheetManifest {
    pub frames: BTreeMap<String, FrameEntry>,
    #[serde(default)]
    pub meta: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FrameEntry {
    pub frame: FrameRect,
}

/// Frame rectangle in sheet-image pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct FrameRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl FrameRect {
    /// The frame as a region of the image `sheet` points into.
    ///
    /// `None` for non-positive sizes or offsets that overflow.
    pub fn region_in(&self, sheet: &Region) -> Option<Region> {
        if self.w <= 0 || self.h <= 0 {
            return None;
        }
        let x = sheet.x.checked_add(self.x)?;
        let y = sheet.y.checked_add(self.y)?;
        Some(Region::new(sheet.base, x, y, self.w as u32, self.h as u32))
    }
}

impl SheetManifest {
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, ManifestError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn frame_names(&self) -> impl Iterator<Item = &str> {
        self.frames.keys().map(String::as_str)
    }

    /// Rejects frames with a non-positive size.
    pub fn validate(&self) -> Result<(), ManifestError> {
        match self
            .frames
            .iter()
            .find(|(_, entry)| entry.frame.w <= 0 || entry.frame.h <= 0)
        {
            Some((name, entry)) => Err(ManifestError::InvalidFrame {
                frame: name.clone(),
                rect: entry.frame,
            }),
            None => Ok(()),
        }
    }

    /// Regions of every frame, in frame-name order.
    pub fn frame_regions(&self, sheet: &Region) -> Result<Vec<(&str, Region)>, ManifestError> {
        self.frames
            .iter()
            .map(|(name, entry)| {
                entry
                    .frame
                    .region_in(sheet)
                    .map(|region| (name.as_str(), region))
                    .ok_or_else(|| ManifestError::InvalidFrame {
                        frame: name.clone(),
                        rect: entry.frame,
                    })
            })
            .collect()
    }
}
