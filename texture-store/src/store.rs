use std::sync::Arc;

use fxhash::FxHashMap;
use log::{trace, warn};
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::key::{MAX_SLICE_DEPTH, TextureKey};
use crate::region::{Region, SliceRect};
use crate::tileset::TilesetConfig;

// --- Constants ---

const DEFAULT_SEPARATOR: char = '/';

/// What the store does with slices that leave their base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundsPolicy {
    /// Hand out the rectangle anyway and log a warning.
    #[default]
    Permissive,
    /// Fail with [`StoreError::OutOfBounds`].
    Strict,
}

// --- Builder ---

pub struct StoreBuilder {
    separator: String,
    bounds_policy: BoundsPolicy,
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            bounds_policy: BoundsPolicy::default(),
        }
    }
}

impl StoreBuilder {
    pub fn separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_string();
        self
    }

    pub fn bounds_policy(mut self, policy: BoundsPolicy) -> Self {
        self.bounds_policy = policy;
        self
    }

    pub fn build(self) -> Result<TextureStore, StoreError> {
        let mut chars = self.separator.chars();
        let separator = match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_ascii_digit() && c != '-' => c,
            _ => return Err(StoreError::InvalidSeparator(self.separator)),
        };

        trace!(
            "StoreBuilder::build: separator={separator:?} bounds_policy={:?}",
            self.bounds_policy
        );
        Ok(TextureStore {
            separator,
            bounds_policy: self.bounds_policy,
            state: RwLock::new(StoreState::default()),
        })
    }
}

// --- Store ---

/// Name-addressed registry of texture regions and tileset configurations.
///
/// Names are either roots, given at registration, or derived names that encode
/// a slice of another name (`root/x/y/w/h`, with the configured separator).
/// Derived regions are computed on first lookup and kept in an internal cache,
/// so lookups go through `&self` and may take the write lock. All state sits
/// behind a single lock; the store can be shared between threads.
pub struct TextureStore {
    separator: char,
    bounds_policy: BoundsPolicy,
    state: RwLock<StoreState>,
}

#[derive(Default)]
struct StoreState {
    roots: FxHashMap<Arc<str>, Region>,
    derived: FxHashMap<TextureKey, Region>,
    // first claim wins for derived keys, explicit registration always wins
    names: FxHashMap<Region, TextureKey>,
    tilesets: FxHashMap<TextureKey, TilesetConfig>,
}

impl StoreState {
    fn lookup(&self, key: &TextureKey) -> Option<Region> {
        match key {
            TextureKey::Root(name) => self.roots.get(name).copied(),
            TextureKey::Slice { .. } => self.derived.get(key).copied(),
        }
    }

    /// Key that should answer reverse lookups of `region`: the smallest root
    /// name bound to it, else any cached derived key.
    fn holder_of(&self, region: &Region) -> Option<TextureKey> {
        let root = self
            .roots
            .iter()
            .filter(|(_, bound)| *bound == region)
            .map(|(name, _)| name)
            .min();
        if let Some(name) = root {
            return Some(TextureKey::Root(name.clone()));
        }
        self.derived
            .iter()
            .find(|(_, cached)| *cached == region)
            .map(|(key, _)| key.clone())
    }
}

impl Default for TextureStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Construction and configuration.
impl TextureStore {
    pub fn new() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            bounds_policy: BoundsPolicy::default(),
            state: RwLock::new(StoreState::default()),
        }
    }

    pub fn with_separator(separator: &str) -> Result<Self, StoreError> {
        Self::builder().separator(separator).build()
    }

    pub fn builder() -> StoreBuilder {
        StoreBuilder::default()
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn bounds_policy(&self) -> BoundsPolicy {
        self.bounds_policy
    }
}

/// Registration and lookup.
impl TextureStore {
    /// Fails if `name` cannot be used as a root name.
    pub fn validate_name(&self, name: &str) -> Result<(), StoreError> {
        if name.contains(self.separator) {
            return Err(StoreError::ReservedSeparator {
                name: name.to_string(),
                separator: self.separator,
            });
        }
        Ok(())
    }

    /// Binds `name` to `region`, replacing any previous binding.
    ///
    /// Replacing a binding also drops every derived region cached under it.
    /// If another name still holds the replaced region, reverse lookup of that
    /// region answers with that name from then on.
    pub fn register_texture(&self, region: Region, name: &str) -> Result<(), StoreError> {
        self.validate_name(name)?;

        let name: Arc<str> = Arc::from(name);
        let mut state = self.state.write();

        if let Some(previous) = state.roots.insert(name.clone(), region) {
            let before = state.derived.len();
            state.derived.retain(|key, _| key.root_name() != &*name);
            state.names.retain(|_, key| key.root_name() != &*name);
            trace!(
                "TextureStore::register_texture: replaced {name:?}, dropped {} cached slices",
                before - state.derived.len()
            );

            if !state.names.contains_key(&previous) {
                if let Some(holder) = state.holder_of(&previous) {
                    state.names.insert(previous, holder);
                }
            }
        }
        state.names.insert(region, TextureKey::Root(name.clone()));

        trace!("TextureStore::register_texture: {name:?} -> {region:?}");
        Ok(())
    }

    /// Reverse lookup. Cached derived regions answer with their derived name.
    pub fn texture_name(&self, region: &Region) -> Result<String, StoreError> {
        let state = self.state.read();
        state
            .names
            .get(region)
            .map(|key| key.display(self.separator).to_string())
            .ok_or(StoreError::RegionNotRegistered(*region))
    }

    /// Region bound to `name`, resolving and caching derived names.
    pub fn texture(&self, name: &str) -> Result<Region, StoreError> {
        let key = self.parse_key(name)?;
        self.resolve(&key)
    }

    /// Slice of the region named `name`.
    ///
    /// The offset is added to the base region's own offset, so slicing a slice
    /// stays anchored at the base image. The result is cached under its
    /// derived name, which [`TextureStore::texture_name`] then returns.
    pub fn texture_rectangle(
        &self,
        name: &str,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Result<Region, StoreError> {
        let key = self.parse_sliceable_key(name)?;
        self.resolve(&key.slice(SliceRect::new(x, y, width, height)))
    }

    /// Derived name for a slice of `name`, without resolving it.
    pub fn derived_name(&self, name: &str, rect: SliceRect) -> Result<String, StoreError> {
        let key = self.parse_sliceable_key(name)?;
        Ok(key.slice(rect).display(self.separator).to_string())
    }

    /// Whether `name` was registered explicitly.
    pub fn is_registered(&self, name: &str) -> bool {
        self.state.read().roots.contains_key(name)
    }

    /// Explicitly registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let state = self.state.read();
        let mut names: Vec<String> = state.roots.keys().map(|name| name.to_string()).collect();
        names.sort_unstable();
        names
    }

    /// Number of explicitly registered names.
    pub fn len(&self) -> usize {
        self.state.read().roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().roots.is_empty()
    }

    /// Number of derived regions materialized so far.
    pub fn cached_len(&self) -> usize {
        self.state.read().derived.len()
    }

    fn parse_key(&self, name: &str) -> Result<TextureKey, StoreError> {
        TextureKey::parse(name, self.separator)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    /// Like `parse_key`, for names that are about to get one more slice.
    fn parse_sliceable_key(&self, name: &str) -> Result<TextureKey, StoreError> {
        let key = self.parse_key(name)?;
        if key.depth() >= MAX_SLICE_DEPTH {
            return Err(StoreError::SliceTooDeep(name.to_string()));
        }
        Ok(key)
    }

    fn resolve(&self, key: &TextureKey) -> Result<Region, StoreError> {
        // Walk towards the root until a known region, remembering the slices
        // that still need composing.
        let (mut region, pending) = {
            let state = self.state.read();
            let mut pending = Vec::new();
            let mut current = key;
            loop {
                if let Some(region) = state.lookup(current) {
                    break (region, pending);
                }
                match current {
                    TextureKey::Root(name) => return Err(StoreError::NotFound(name.to_string())),
                    TextureKey::Slice { base, rect } => {
                        pending.push((current, rect));
                        current = base.as_ref();
                    }
                }
            }
        };

        for (slice_key, rect) in pending.into_iter().rev() {
            region = self.compose(slice_key, &region, rect)?;
            region = self.cache(slice_key, region);
        }
        Ok(region)
    }

    fn compose(
        &self,
        key: &TextureKey,
        base: &Region,
        rect: &SliceRect,
    ) -> Result<Region, StoreError> {
        if !rect.has_positive_size() {
            return Err(StoreError::InvalidDimension(format!(
                "slice size must be positive, got {}x{}",
                rect.width, rect.height
            )));
        }

        let overflow =
            || StoreError::CoordinateOverflow(key.display(self.separator).to_string());
        let x = base.x.checked_add(rect.x).ok_or_else(overflow)?;
        let y = base.y.checked_add(rect.y).ok_or_else(overflow)?;
        // sizes were checked positive above
        let (width, height) = (rect.width as u32, rect.height as u32);
        let region = Region::new(base.base, x, y, width, height);

        if !region.is_within_base() {
            match self.bounds_policy {
                BoundsPolicy::Strict => return Err(StoreError::OutOfBounds(region)),
                BoundsPolicy::Permissive => warn!(
                    "TextureStore::resolve: {} lies outside its {}x{} base image",
                    key.display(self.separator),
                    base.base.width,
                    base.base.height
                ),
            }
        }
        Ok(region)
    }

    fn cache(&self, key: &TextureKey, region: Region) -> Region {
        let mut state = self.state.write();
        // Another caller may have materialized the same key meanwhile.
        let region = *state.derived.entry(key.clone()).or_insert(region);
        state.names.entry(region).or_insert_with(|| key.clone());

        trace!(
            "TextureStore::cache: {} -> {region:?}",
            key.display(self.separator)
        );
        region
    }
}

/// Tilesets.
impl TextureStore {
    /// Attaches a tile grid to the region named `name`.
    pub fn register_tileset(&self, name: &str, config: TilesetConfig) -> Result<(), StoreError> {
        let key = self.parse_key(name)?;
        self.resolve(&key)?;

        let mut state = self.state.write();
        if state.tilesets.contains_key(&key) {
            return Err(StoreError::DuplicateTileset(name.to_string()));
        }
        config.validate()?;
        state.tilesets.insert(key, config);

        trace!("TextureStore::register_tileset: {name:?} -> {config:?}");
        Ok(())
    }

    pub fn tileset(&self, name: &str) -> Option<TilesetConfig> {
        let key = TextureKey::parse(name, self.separator)?;
        let state = self.state.read();
        state.tilesets.get(&key).copied()
    }

    /// Tile `(tile_x, tile_y)` of the tileset attached to `name`.
    ///
    /// Tile coordinates are not range checked; the rectangle lands wherever
    /// the grid formula puts it, subject to the bounds policy.
    pub fn tile(&self, name: &str, tile_x: i32, tile_y: i32) -> Result<Region, StoreError> {
        let key = self.parse_sliceable_key(name)?;
        let config = self.state.read().tilesets.get(&key).copied();
        let Some(config) = config else {
            self.resolve(&key)?;
            return Err(StoreError::NotATileset(name.to_string()));
        };

        let (x, y) = config.tile_origin(tile_x, tile_y).ok_or_else(|| {
            StoreError::CoordinateOverflow(format!("{name} tile ({tile_x}, {tile_y})"))
        })?;
        let rect = SliceRect::new(x, y, config.tile_width, config.tile_height);
        self.resolve(&key.slice(rect))
    }
}
