use std::{collections::BTreeMap, fmt};

use crate::{
    foundation::error::{SmtxError, SmtxResult},
    sheet::{
        descriptor::SpritesheetDescriptor,
        extract::cut_spritesheet,
        sprite::{AnimatedSprite, Spritesheet, SpritesheetSource},
        surface::{Surface, decode_surface},
    },
};

/// Lifecycle of one spritesheet source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing published for this source.
    #[default]
    Unloaded,
    /// A load is in flight; the previously published data (if any) is still active.
    Loading,
    /// Sprites and sheet record are published.
    Loaded,
}

/// Why a reload notification was sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReloadReason {
    /// A new user-made spritesheet replaced the previous one.
    UsermadeLoaded,
    /// The user-made spritesheet was removed.
    UsermadeUnloaded,
    /// The user-made override toggle changed.
    UsermadeToggled {
        /// New toggle value.
        enabled: bool,
    },
}

type InitListener = Box<dyn FnMut() + Send>;
type ReloadListener = Box<dyn FnMut(ReloadReason) + Send>;

/// Owned registry of loaded spritesheets and the animated sprites cut from them.
///
/// `main` and `object-default` are loaded once at startup and never unloaded;
/// `object-usermade` can be replaced or removed any number of times. Every mutation builds the
/// new sprites completely before touching published state, then swaps in one step, so lookups
/// only ever observe the old full set or the new full set.
pub struct SpriteRegistry {
    sprites: Vec<AnimatedSprite>,
    sheets: Vec<Spritesheet>,
    states: [LoadState; 3],
    usermade_enabled: bool,
    init_sent: bool,
    init_listeners: Vec<InitListener>,
    reload_listeners: Vec<ReloadListener>,
}

impl fmt::Debug for SpriteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpriteRegistry")
            .field("sprites_len", &self.sprites.len())
            .field("sheets", &self.sheets.iter().map(|s| s.source).collect::<Vec<_>>())
            .field("states", &self.states)
            .field("usermade_enabled", &self.usermade_enabled)
            .finish()
    }
}

impl Default for SpriteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteRegistry {
    /// Empty registry with every source unloaded and the user-made override disabled.
    pub fn new() -> Self {
        Self {
            sprites: Vec::new(),
            sheets: Vec::new(),
            states: [LoadState::Unloaded; 3],
            usermade_enabled: false,
            init_sent: false,
            init_listeners: Vec::new(),
            reload_listeners: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------------------------
    // notifications

    /// Register a callback fired once, after both startup spritesheets are loaded.
    pub fn on_spritesheet_init(&mut self, listener: impl FnMut() + Send + 'static) {
        self.init_listeners.push(Box::new(listener));
    }

    /// Register a callback fired after every committed change to user-made sprites or toggle.
    pub fn on_spritesheet_reload(&mut self, listener: impl FnMut(ReloadReason) + Send + 'static) {
        self.reload_listeners.push(Box::new(listener));
    }

    fn emit_reload(&mut self, reason: ReloadReason) {
        tracing::debug!(?reason, "spritesheet reload");
        for listener in &mut self.reload_listeners {
            listener(reason);
        }
    }

    fn maybe_emit_init(&mut self) {
        if self.init_sent
            || self.state(SpritesheetSource::Main) != LoadState::Loaded
            || self.state(SpritesheetSource::ObjectDefault) != LoadState::Loaded
        {
            return;
        }
        self.init_sent = true;
        tracing::info!(sprites = self.sprites.len(), "spritesheets initialized");
        for listener in &mut self.init_listeners {
            listener();
        }
    }

    // ------------------------------------------------------------------------------------------
    // loading

    /// Decode and cut the main spritesheet.
    pub async fn load_main(
        &mut self,
        image_bytes: &[u8],
        descriptor: SpritesheetDescriptor,
    ) -> SmtxResult<()> {
        self.load_startup(SpritesheetSource::Main, image_bytes, descriptor)
            .await
    }

    /// Decode and cut the bundled object spritesheet.
    pub async fn load_object_default(
        &mut self,
        image_bytes: &[u8],
        descriptor: SpritesheetDescriptor,
    ) -> SmtxResult<()> {
        self.load_startup(SpritesheetSource::ObjectDefault, image_bytes, descriptor)
            .await
    }

    /// Install an already-decoded main spritesheet.
    pub fn install_main(
        &mut self,
        surface: &Surface,
        descriptor: SpritesheetDescriptor,
    ) -> SmtxResult<()> {
        self.begin_startup(SpritesheetSource::Main)?;
        self.finish_startup(SpritesheetSource::Main, surface, descriptor)
    }

    /// Install an already-decoded bundled object spritesheet.
    pub fn install_object_default(
        &mut self,
        surface: &Surface,
        descriptor: SpritesheetDescriptor,
    ) -> SmtxResult<()> {
        self.begin_startup(SpritesheetSource::ObjectDefault)?;
        self.finish_startup(SpritesheetSource::ObjectDefault, surface, descriptor)
    }

    async fn load_startup(
        &mut self,
        source: SpritesheetSource,
        image_bytes: &[u8],
        descriptor: SpritesheetDescriptor,
    ) -> SmtxResult<()> {
        self.begin_startup(source)?;
        let surface = match decode_surface(image_bytes).await {
            Ok(surface) => surface,
            Err(e) => {
                self.set_state(source, LoadState::Unloaded);
                tracing::error!(%source, error = %e, "spritesheet load failed");
                return Err(e);
            }
        };
        self.finish_startup(source, &surface, descriptor)
    }

    fn begin_startup(&mut self, source: SpritesheetSource) -> SmtxResult<()> {
        if self.state(source) != LoadState::Unloaded {
            return Err(SmtxError::registry(format!(
                "spritesheet '{source}' is already {:?}",
                self.state(source)
            )));
        }
        self.set_state(source, LoadState::Loading);
        Ok(())
    }

    fn finish_startup(
        &mut self,
        source: SpritesheetSource,
        surface: &Surface,
        descriptor: SpritesheetDescriptor,
    ) -> SmtxResult<()> {
        let sprites = match cut_spritesheet(source, surface, &descriptor) {
            Ok(sprites) => sprites,
            Err(e) => {
                self.set_state(source, LoadState::Unloaded);
                return Err(e);
            }
        };
        self.commit(source, surface, descriptor, sprites);
        self.maybe_emit_init();
        Ok(())
    }

    /// Replace the user-made object spritesheet with a newly decoded one.
    ///
    /// On failure the previously published user-made sprites stay active and untouched.
    pub async fn load_usermade(
        &mut self,
        image_bytes: &[u8],
        descriptor: SpritesheetDescriptor,
    ) -> SmtxResult<()> {
        let previous = self.state(SpritesheetSource::ObjectUsermade);
        self.set_state(SpritesheetSource::ObjectUsermade, LoadState::Loading);
        let surface = match decode_surface(image_bytes).await {
            Ok(surface) => surface,
            Err(e) => {
                self.set_state(SpritesheetSource::ObjectUsermade, previous);
                tracing::error!(error = %e, "user-made spritesheet load failed");
                return Err(e);
            }
        };
        self.set_state(SpritesheetSource::ObjectUsermade, previous);
        self.install_usermade(&surface, descriptor)
    }

    /// Replace the user-made object spritesheet with an already-decoded surface.
    pub fn install_usermade(
        &mut self,
        surface: &Surface,
        descriptor: SpritesheetDescriptor,
    ) -> SmtxResult<()> {
        let sprites = cut_spritesheet(SpritesheetSource::ObjectUsermade, surface, &descriptor)?;
        self.commit(SpritesheetSource::ObjectUsermade, surface, descriptor, sprites);
        self.emit_reload(ReloadReason::UsermadeLoaded);
        Ok(())
    }

    /// Remove the user-made spritesheet and its sprites. Returns whether anything was removed.
    pub fn unload_usermade(&mut self) -> bool {
        if self.state(SpritesheetSource::ObjectUsermade) != LoadState::Loaded {
            return false;
        }
        self.remove_source(SpritesheetSource::ObjectUsermade);
        self.set_state(SpritesheetSource::ObjectUsermade, LoadState::Unloaded);
        self.emit_reload(ReloadReason::UsermadeUnloaded);
        true
    }

    /// Toggle whether user-made sprites take part in lookups. Takes effect immediately.
    pub fn set_enable_usermade(&mut self, enabled: bool) {
        self.usermade_enabled = enabled;
        self.emit_reload(ReloadReason::UsermadeToggled { enabled });
    }

    /// Current user-made override toggle.
    pub fn usermade_enabled(&self) -> bool {
        self.usermade_enabled
    }

    // Single non-suspending swap: drop the old data of `source`, publish the new data.
    fn commit(
        &mut self,
        source: SpritesheetSource,
        surface: &Surface,
        descriptor: SpritesheetDescriptor,
        sprites: Vec<AnimatedSprite>,
    ) {
        self.remove_source(source);
        let count = sprites.len();
        self.sprites.extend(sprites);
        self.sheets.push(Spritesheet {
            width: surface.width(),
            height: surface.height(),
            source,
            descriptor,
        });
        self.set_state(source, LoadState::Loaded);
        tracing::info!(%source, sprites = count, "spritesheet loaded");
    }

    fn remove_source(&mut self, source: SpritesheetSource) {
        self.sprites.retain(|s| s.source() != source);
        self.sheets.retain(|s| s.source != source);
    }

    fn set_state(&mut self, source: SpritesheetSource, state: LoadState) {
        self.states[source_slot(source)] = state;
    }

    // ------------------------------------------------------------------------------------------
    // lookups

    /// Load state of `source`.
    pub fn state(&self, source: SpritesheetSource) -> LoadState {
        self.states[source_slot(source)]
    }

    /// Latest-registered sprite for `key`, skipping user-made sprites while the toggle is off.
    pub fn get_animated_sprite(&self, key: &str) -> Option<&AnimatedSprite> {
        self.sprites
            .iter()
            .rev()
            .filter(|s| self.usermade_enabled || s.source() != SpritesheetSource::ObjectUsermade)
            .find(|s| s.key() == key)
    }

    /// Sheet record for `source`, if loaded.
    pub fn get_spritesheet(&self, source: SpritesheetSource) -> Option<&Spritesheet> {
        self.sheets.iter().find(|s| s.source == source)
    }

    /// Every published sprite in registration order.
    pub fn animated_sprites(&self) -> &[AnimatedSprite] {
        &self.sprites
    }

    /// Word -> object key map: bundled entries, overridden by user-made ones when enabled.
    pub fn get_word_object_map(&self) -> BTreeMap<String, String> {
        let mut map = self
            .get_spritesheet(SpritesheetSource::ObjectDefault)
            .map(|s| s.descriptor.wordmap.clone())
            .unwrap_or_default();
        if self.usermade_enabled
            && let Some(usermade) = self.get_spritesheet(SpritesheetSource::ObjectUsermade)
        {
            map.extend(
                usermade
                    .descriptor
                    .wordmap
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
        }
        map
    }

    /// Whether `word` maps to an object sprite.
    pub fn is_word_special(&self, word: &str) -> bool {
        self.get_word_object_map().contains_key(word)
    }

    /// Lowercased object key for `word`, if it is special.
    pub fn get_word_object(&self, word: &str) -> Option<String> {
        self.get_word_object_map()
            .get(word)
            .map(|object| object.to_lowercase())
    }

    /// Sprite drawn for `word`: its object sprite when special, otherwise the sprite keyed by
    /// the word itself.
    pub fn resolve_word(&self, word: &str) -> Option<&AnimatedSprite> {
        match self.get_word_object(word) {
            Some(object) => self.get_animated_sprite(&object),
            None => self.get_animated_sprite(word),
        }
    }
}

fn source_slot(source: SpritesheetSource) -> usize {
    match source {
        SpritesheetSource::Main => 0,
        SpritesheetSource::ObjectDefault => 1,
        SpritesheetSource::ObjectUsermade => 2,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/registry/store.rs"]
mod tests;
