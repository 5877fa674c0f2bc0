use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque handle to decoded pixel data owned by the fetch service.
///
/// The store never dereferences it; two regions point into the same image
/// exactly when their `ImageId`s compare equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(u64);

// Starts at 1, leaving 0 free for handles built with `from_raw`.
static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

impl ImageId {
    /// Gets a new identifier, unique within the current process.
    pub fn next() -> Self {
        ImageId(NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Wraps an identifier assigned by an external image cache.
    pub const fn from_raw(raw: u64) -> Self {
        ImageId(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ImageId").field(&self.0).finish()
    }
}

/// A decoded image together with its native pixel extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BaseImage {
    pub id: ImageId,
    pub width: u32,
    pub height: u32,
}

impl BaseImage {
    pub const fn new(id: ImageId, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }
}

/// Immutable rectangle inside a base image.
///
/// Offsets are always relative to the base image's origin, never to an
/// intermediate slice. They are signed because tile lookups with negative
/// coordinates yield negative offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub base: BaseImage,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(base: BaseImage, x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            base,
            x,
            y,
            width,
            height,
        }
    }

    /// The region covering the whole base image.
    pub const fn full(base: BaseImage) -> Self {
        Self::new(base, 0, 0, base.width, base.height)
    }

    pub const fn image_id(&self) -> ImageId {
        self.base.id
    }

    pub const fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }

    /// Whether the rectangle lies inside `[0, width) x [0, height)` of its base image.
    pub fn is_within_base(&self) -> bool {
        let right = i64::from(self.x) + i64::from(self.width);
        let bottom = i64::from(self.y) + i64::from(self.height);

        self.x >= 0
            && self.y >= 0
            && right <= i64::from(self.base.width)
            && bottom <= i64::from(self.base.height)
    }
}

/// A slicing request relative to some named region.
///
/// Width and height stay signed here so that non-positive requests can be
/// reported instead of being unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SliceRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl SliceRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn has_positive_size(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: u32, height: u32) -> BaseImage {
        BaseImage::new(ImageId::from_raw(7), width, height)
    }

    #[test]
    fn image_ids_are_unique() {
        let a = ImageId::next();
        let b = ImageId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn full_region_covers_the_image() {
        let region = Region::full(image(64, 32));
        assert_eq!((region.x, region.y), (0, 0));
        assert_eq!(region.size(), [64, 32]);
        assert!(region.is_within_base());
    }

    #[test]
    fn bounds_check_rejects_overhanging_rectangles() {
        let base = image(64, 32);
        assert!(Region::new(base, 60, 0, 4, 32).is_within_base());
        assert!(!Region::new(base, 61, 0, 4, 32).is_within_base());
        assert!(!Region::new(base, 0, 1, 4, 32).is_within_base());
        assert!(!Region::new(base, -1, 0, 4, 4).is_within_base());
    }
}
