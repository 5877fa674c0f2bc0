use std::fmt;
use std::sync::Arc;

use crate::region::SliceRect;

/// Deepest slice nesting a derived name may encode.
pub const MAX_SLICE_DEPTH: usize = 64;

/// Structural address of a texture.
///
/// Root keys are names given at registration time. Slice keys describe a
/// rectangle relative to another key and are what derived names encode. The
/// string form only exists at the public boundary, see [`TextureKey::parse`]
/// and [`TextureKey::display`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TextureKey {
    Root(Arc<str>),
    Slice {
        base: Arc<TextureKey>,
        rect: SliceRect,
    },
}

impl TextureKey {
    pub fn root(name: impl Into<Arc<str>>) -> Self {
        TextureKey::Root(name.into())
    }

    /// Key of the rectangle `rect` taken relative to `self`.
    pub fn slice(self, rect: SliceRect) -> Self {
        TextureKey::Slice {
            base: Arc::new(self),
            rect,
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, TextureKey::Root(_))
    }

    /// Name of the registered texture this key ultimately refers to.
    pub fn root_name(&self) -> &str {
        let mut key = self;
        loop {
            match key {
                TextureKey::Root(name) => return name,
                TextureKey::Slice { base, .. } => key = base.as_ref(),
            }
        }
    }

    /// Number of slices between this key and its root.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut key = self;
        while let TextureKey::Slice { base, .. } = key {
            depth += 1;
            key = base.as_ref();
        }
        depth
    }

    /// Slice rectangles from the root outwards.
    pub fn slices(&self) -> Vec<SliceRect> {
        let mut rects = Vec::new();
        let mut key = self;
        while let TextureKey::Slice { base, rect } = key {
            rects.push(*rect);
            key = base.as_ref();
        }
        rects.reverse();
        rects
    }

    /// Decodes `root SEP x SEP y SEP w SEP h [SEP x SEP y SEP w SEP h ...]`.
    ///
    /// A name without the separator is a root key. Returns `None` when the
    /// name contains the separator but the trailing segments are not groups of
    /// four integers in canonical form, or nest deeper than [`MAX_SLICE_DEPTH`].
    pub fn parse(name: &str, separator: char) -> Option<TextureKey> {
        let mut segments = name.split(separator);
        // `split` always yields at least one segment.
        let root = segments.next()?;
        let numbers = segments.map(parse_coordinate).collect::<Option<Vec<_>>>()?;

        if numbers.len() % 4 != 0 || numbers.len() / 4 > MAX_SLICE_DEPTH {
            return None;
        }

        let key = numbers
            .chunks_exact(4)
            .fold(TextureKey::root(root), |key, chunk| {
                key.slice(SliceRect::new(chunk[0], chunk[1], chunk[2], chunk[3]))
            });

        Some(key)
    }

    /// Adapter that formats the key as a derived name using `separator`.
    pub fn display(&self, separator: char) -> KeyDisplay<'_> {
        KeyDisplay {
            key: self,
            separator,
        }
    }
}

/// Parses `0` or `-?[1-9][0-9]*`, the only spelling [`KeyDisplay`] produces.
fn parse_coordinate(segment: &str) -> Option<i32> {
    let digits = segment.strip_prefix('-').unwrap_or(segment);
    let canonical = match digits.as_bytes() {
        [b'0'] => digits.len() == segment.len(),
        [first, rest @ ..] => {
            first.is_ascii_digit() && *first != b'0' && rest.iter().all(u8::is_ascii_digit)
        }
        [] => false,
    };
    if !canonical {
        return None;
    }
    segment.parse().ok()
}

pub struct KeyDisplay<'a> {
    key: &'a TextureKey,
    separator: char,
}

impl fmt::Display for KeyDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = self.separator;
        f.write_str(self.key.root_name())?;
        for rect in self.key.slices() {
            write!(
                f,
                "{sep}{}{sep}{}{sep}{}{sep}{}",
                rect.x, rect.y, rect.width, rect.height
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_name_parses_as_root() {
        let key = TextureKey::parse("hero.png", '/').expect("root name");
        assert_eq!(key, TextureKey::root("hero.png"));
        assert!(key.is_root());
    }

    #[test]
    fn derived_name_parses_into_nested_slices() {
        let key = TextureKey::parse("hero.png/3/7/10/15/1/2/3/4", '/').expect("derived name");
        assert_eq!(key.root_name(), "hero.png");
        assert_eq!(
            key.slices(),
            vec![SliceRect::new(3, 7, 10, 15), SliceRect::new(1, 2, 3, 4)]
        );
    }

    #[test]
    fn display_uses_the_given_separator() {
        let key = TextureKey::root("test").slice(SliceRect::new(1, -2, 3, 4));
        assert_eq!(key.display('~').to_string(), "test~1~-2~3~4");
        assert_eq!(
            TextureKey::parse("test~1~-2~3~4", '~').as_ref(),
            Some(&key)
        );
    }

    #[test]
    fn malformed_derived_names_are_rejected() {
        assert_eq!(TextureKey::parse("a/1/2/3", '/'), None);
        assert_eq!(TextureKey::parse("a/1/2/x/4", '/'), None);
        assert_eq!(TextureKey::parse("a/", '/'), None);
    }

    #[test]
    fn only_canonical_integers_are_accepted() {
        for name in [
            "t/+1/2/3/4",
            "t/01/2/3/4",
            "t/-0/2/3/4",
            "t/-/2/3/4",
            "t/ 1/2/3/4",
        ] {
            assert_eq!(TextureKey::parse(name, '/'), None, "{name:?}");
        }
        let key = TextureKey::parse("t/0/-10/3/4", '/').expect("canonical name");
        assert_eq!(key.slices(), vec![SliceRect::new(0, -10, 3, 4)]);
    }

    #[test]
    fn nesting_is_capped() {
        let at_cap = format!("t{}", "/0/0/1/1".repeat(MAX_SLICE_DEPTH));
        let key = TextureKey::parse(&at_cap, '/').expect("name at the cap");
        assert_eq!(key.depth(), MAX_SLICE_DEPTH);
        assert_eq!(key.display('/').to_string(), at_cap);

        let too_deep = format!("t{}", "/0/0/1/1".repeat(MAX_SLICE_DEPTH + 1));
        assert_eq!(TextureKey::parse(&too_deep, '/'), None);
        assert_eq!(
            TextureKey::parse(&format!("t{}", "/0/0/1/1".repeat(10_000)), '/'),
            None
        );
    }
}
