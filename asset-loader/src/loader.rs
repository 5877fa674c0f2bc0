use std::sync::Arc;

use futures::{StreamExt, TryStreamExt, future, stream};
use log::{debug, trace, warn};
use texture_store::{BaseImage, Region, TextureStore, TilesetConfig};

use crate::builder::AssetLoaderBuilder;
use crate::error::LoaderError;
use crate::fetch::{FetchRequest, Fetched, Fetcher, ResourceKind};
use crate::manifest::SheetManifest;

struct PendingTexture {
    name: String,
    url: String,
}

struct PendingSheet {
    name: String,
    url: String,
    manifest: SheetManifest,
    prefix: String,
}

struct PendingTileset {
    name: String,
    config: TilesetConfig,
}

struct PendingFont {
    name: String,
    url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    /// Accepting queue calls.
    Idle,
    /// `load` was called; the queue is frozen.
    Started,
    Completed,
    Failed,
}

/// Number of queued items per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingCounts {
    pub textures: usize,
    pub sheets: usize,
    pub tilesets: usize,
    pub fonts: usize,
}

/// One-shot batch loader that fetches queued assets and registers them in a
/// [`TextureStore`].
///
/// Queue everything first, then call [`AssetLoader::load`] once. Registration
/// happens in a fixed order: plain textures, then spritesheets and their
/// frames, then tilesets, so a tileset may refer to any texture or frame of
/// the same batch. Fonts are fetched but never registered as textures.
pub struct AssetLoader<F: Fetcher> {
    fetcher: F,
    texture_store: Arc<TextureStore>,
    max_concurrent_fetches: Option<usize>,

    state: LoaderState,
    textures: Vec<PendingTexture>,
    sheets: Vec<PendingSheet>,
    tilesets: Vec<PendingTileset>,
    fonts: Vec<PendingFont>,
}

/// Construction and information methods.
impl<F: Fetcher> AssetLoader<F> {
    pub fn new(fetcher: F) -> Self {
        Self::builder(fetcher).build()
    }

    pub fn builder(fetcher: F) -> AssetLoaderBuilder<F> {
        AssetLoaderBuilder::new(fetcher)
    }

    pub(crate) fn from_parts(
        fetcher: F,
        texture_store: Arc<TextureStore>,
        max_concurrent_fetches: Option<usize>,
    ) -> Self {
        Self {
            fetcher,
            texture_store,
            max_concurrent_fetches,
            state: LoaderState::Idle,
            textures: Vec::new(),
            sheets: Vec::new(),
            tilesets: Vec::new(),
            fonts: Vec::new(),
        }
    }

    pub fn texture_store(&self) -> &Arc<TextureStore> {
        &self.texture_store
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    pub fn is_started(&self) -> bool {
        self.state != LoaderState::Idle
    }

    pub fn pending(&self) -> PendingCounts {
        PendingCounts {
            textures: self.textures.len(),
            sheets: self.sheets.len(),
            tilesets: self.tilesets.len(),
            fonts: self.fonts.len(),
        }
    }
}

/// Queueing.
impl<F: Fetcher> AssetLoader<F> {
    /// Queues an image to be registered under `name`.
    pub fn queue_texture(
        &mut self,
        name: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<(), LoaderError> {
        self.ensure_idle()?;
        let name = name.into();
        self.texture_store.validate_name(&name)?;
        self.ensure_unqueued(&name)?;

        self.textures.push(PendingTexture {
            name,
            url: url.into(),
        });
        Ok(())
    }

    /// Queues a spritesheet. Every frame is registered as `prefix + frame name`;
    /// the whole sheet image gets a generated name that no other queued
    /// texture or sheet uses.
    pub fn queue_sheet(
        &mut self,
        url: impl Into<String>,
        manifest: SheetManifest,
        prefix: impl Into<String>,
    ) -> Result<(), LoaderError> {
        let name = self.generated_sheet_name();
        self.queue_named_sheet(name, url, manifest, prefix)
    }

    /// Like [`AssetLoader::queue_sheet`], with the whole sheet image registered as `name`.
    pub fn queue_named_sheet(
        &mut self,
        name: impl Into<String>,
        url: impl Into<String>,
        manifest: SheetManifest,
        prefix: impl Into<String>,
    ) -> Result<(), LoaderError> {
        self.ensure_idle()?;
        let name = name.into();
        let prefix = prefix.into();

        self.texture_store.validate_name(&name)?;
        self.ensure_unqueued(&name)?;
        manifest.validate()?;
        for frame in manifest.frame_names() {
            self.texture_store.validate_name(&format!("{prefix}{frame}"))?;
        }

        self.sheets.push(PendingSheet {
            name,
            url: url.into(),
            manifest,
            prefix,
        });
        Ok(())
    }

    /// Queues a tileset for `name`, which may be a texture or frame of this batch.
    pub fn queue_tileset(
        &mut self,
        name: impl Into<String>,
        config: TilesetConfig,
    ) -> Result<(), LoaderError> {
        self.ensure_idle()?;
        config.validate()?;

        self.tilesets.push(PendingTileset {
            name: name.into(),
            config,
        });
        Ok(())
    }

    /// Queues a font. It is handed to the fetch service only.
    pub fn queue_font(
        &mut self,
        name: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<(), LoaderError> {
        self.ensure_idle()?;

        self.fonts.push(PendingFont {
            name: name.into(),
            url: url.into(),
        });
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), LoaderError> {
        if self.state != LoaderState::Idle {
            return Err(LoaderError::AlreadyStarted);
        }
        Ok(())
    }

    fn ensure_unqueued(&self, name: &str) -> Result<(), LoaderError> {
        if self.is_queued(name) {
            return Err(LoaderError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    fn is_queued(&self, name: &str) -> bool {
        self.textures.iter().any(|texture| texture.name == name)
            || self.sheets.iter().any(|sheet| sheet.name == name)
    }

    fn generated_sheet_name(&self) -> String {
        // keep generated names usable with any separator
        let mark = if self.texture_store.separator() == '#' {
            '_'
        } else {
            '#'
        };
        (self.sheets.len()..)
            .map(|n| format!("__sheet{mark}{n}"))
            .find(|name| !self.is_queued(name))
            .unwrap_or_default()
    }
}

/// Loading.
impl<F: Fetcher> AssetLoader<F> {
    /// Fetches every queued resource, then registers the results.
    ///
    /// A failed fetch fails the whole batch before anything is registered. A
    /// store error during registration stops the remaining stages; whatever
    /// earlier stages registered stays in the store. The loader is single-use:
    /// a second call fails with [`LoaderError::AlreadyStarted`].
    pub async fn load(&mut self) -> Result<(), LoaderError> {
        self.ensure_idle()?;
        self.state = LoaderState::Started;

        let counts = self.pending();
        debug!(
            "AssetLoader::load: starting textures={} sheets={} tilesets={} fonts={}",
            counts.textures, counts.sheets, counts.tilesets, counts.fonts
        );

        let result = self.run().await;
        self.state = if result.is_ok() {
            LoaderState::Completed
        } else {
            LoaderState::Failed
        };
        result
    }

    async fn run(&self) -> Result<(), LoaderError> {
        // --- fetch ---
        let fetched = self.fetch_all().await?;
        let (texture_results, rest) = fetched.split_at(self.textures.len());
        let (sheet_results, font_results) = rest.split_at(self.sheets.len());

        let texture_images = self
            .textures
            .iter()
            .zip(texture_results)
            .map(|(texture, fetched)| expect_image(&texture.name, &texture.url, fetched))
            .collect::<Result<Vec<_>, _>>()?;

        // Frames are laid out before anything is registered so that a broken
        // sheet leaves the store untouched.
        let sheet_regions = self
            .sheets
            .iter()
            .zip(sheet_results)
            .map(|(sheet, fetched)| -> Result<_, LoaderError> {
                let region = Region::full(expect_image(&sheet.name, &sheet.url, fetched)?);
                let frames = sheet.manifest.frame_regions(&region)?;
                Ok((region, frames))
            })
            .collect::<Result<Vec<_>, _>>()?;

        trace!(
            "AssetLoader::run: {} fonts handed to the fetch service",
            font_results.len()
        );

        // --- register textures ---
        debug!("AssetLoader::run: registering {} textures", self.textures.len());
        for (texture, image) in self.textures.iter().zip(texture_images) {
            self.texture_store
                .register_texture(Region::full(image), &texture.name)?;
        }

        // --- register spritesheets ---
        debug!("AssetLoader::run: registering {} spritesheets", self.sheets.len());
        for (sheet, (region, frames)) in self.sheets.iter().zip(sheet_regions) {
            self.texture_store.register_texture(region, &sheet.name)?;
            for (frame, frame_region) in frames {
                self.texture_store
                    .register_texture(frame_region, &format!("{}{frame}", sheet.prefix))?;
            }
            trace!(
                "AssetLoader::run: sheet {:?} registered with {} frames",
                sheet.name,
                sheet.manifest.frames.len()
            );
        }

        // --- register tilesets ---
        debug!("AssetLoader::run: registering {} tilesets", self.tilesets.len());
        for tileset in &self.tilesets {
            self.texture_store
                .register_tileset(&tileset.name, tileset.config)?;
        }

        debug!("AssetLoader::run: completed");
        Ok(())
    }

    /// Fans every request out to the fetch service and joins them, in queue
    /// order: textures, sheets, fonts. Request ids are `<kind>#<index>`.
    async fn fetch_all(&self) -> Result<Vec<Fetched>, LoaderError> {
        let images = self
            .textures
            .iter()
            .map(|texture| (&texture.name, &texture.url))
            .chain(self.sheets.iter().map(|sheet| (&sheet.name, &sheet.url)))
            .map(|(name, url)| (name, url, ResourceKind::Image));
        let fonts = self
            .fonts
            .iter()
            .map(|font| (&font.name, &font.url, ResourceKind::Font));
        let fetches = images
            .chain(fonts)
            .enumerate()
            .map(|(index, (name, url, kind))| FetchRequest {
                id: format!("{}#{index}", kind.label()),
                name: name.clone(),
                locator: url.clone(),
                kind,
            })
            .map(|request| self.fetch_one(request));

        match self.max_concurrent_fetches {
            Some(limit) => stream::iter(fetches).buffered(limit).try_collect().await,
            None => future::try_join_all(fetches).await,
        }
    }

    async fn fetch_one(&self, request: FetchRequest) -> Result<Fetched, LoaderError> {
        trace!(
            "AssetLoader::fetch_one: id={:?} name={:?} locator={:?}",
            request.id, request.name, request.locator
        );
        let name = request.name.clone();
        let locator = request.locator.clone();

        self.fetcher.fetch(request).await.map_err(|source| {
            warn!("AssetLoader::fetch_one: {name:?} from {locator:?} failed: {source}");
            LoaderError::Fetch {
                name,
                locator,
                source,
            }
        })
    }
}

fn expect_image(name: &str, locator: &str, fetched: &Fetched) -> Result<BaseImage, LoaderError> {
    match fetched {
        Fetched::Image(image) => Ok(*image),
        Fetched::Other => Err(LoaderError::UnexpectedResource {
            name: name.to_string(),
            locator: locator.to_string(),
        }),
    }
}
