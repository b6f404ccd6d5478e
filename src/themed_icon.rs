use crate::bitmap::Bitmap;
use crate::cascade::{Cascade, Resolution};
use crate::config::{CUSTOM_THEME_NAME, Config};
use crate::dnd::DropAction;
use crate::identity::{IconIdentity, InfoError, SINGULAR_STATE};
use crate::scope::{ClearScope, Scope};
use crate::search::SearchPath;
use crate::source::{IconTheme, ThemeSet, ThemeSource};
use crate::store::{CustomImage, CustomizationStore, StoreError};
use std::path::Path;
use std::rc::Rc;

type Renderer = Box<dyn FnMut(&Bitmap, Scope)>;

/// An applet icon that follows its state, size and theme, and can be customized by the user.
///
/// Every change re-runs the lookup cascade. The latest result is available from
/// [`bitmap`](Self::bitmap) and is also pushed to the renderer, if one is set.
///
/// # Example
///
/// ```no_run
/// use std::rc::Rc;
/// use themed_icon::{Config, IconTheme, SearchPath, ThemedIcon};
///
/// let config = Config::default();
/// let system = Rc::new(IconTheme::new("Adwaita", SearchPath::default()));
///
/// let mut icon = ThemedIcon::new(config, system);
/// icon.set_info("weather", "12", &["sunny", "rainy"], &["weather-clear", "weather-showers"])
///     .unwrap();
/// icon.set_state("rainy");
///
/// let bitmap = icon.bitmap().unwrap();
/// assert!(bitmap.height() <= 48);
/// ```
pub struct ThemedIcon {
    config: Config,
    identity: IconIdentity,
    themes: ThemeSet,
    store: CustomizationStore,
    resolved: Option<(Scope, Bitmap)>,
    renderer: Option<Renderer>,
}

impl ThemedIcon {
    /// Create an icon backed by the custom theme in `config.icon_dir` and the shared host theme.
    ///
    /// The custom theme's directories and `index.theme` are created if they're missing.
    pub fn new(config: Config, system: Rc<dyn ThemeSource>) -> Self {
        let custom = IconTheme::isolated(
            CUSTOM_THEME_NAME,
            SearchPath::new_from(vec![config.icon_dir.clone()]),
        );

        Self::with_themes(config, ThemeSet::new(Box::new(custom), system))
    }

    /// Create an icon resolving against an arbitrary set of themes.
    pub fn with_themes(config: Config, themes: ThemeSet) -> Self {
        let store = CustomizationStore::new(config.custom_theme_dir());
        if let Err(_e) = store.ensure_layout(&config.index_template()) {
            #[cfg(feature = "log")]
            log::warn!("unable to set up custom icon theme: {}", error_chain(&_e));
        }

        Self {
            identity: IconIdentity::new(config.default_size),
            config,
            themes,
            store,
            resolved: None,
            renderer: None,
        }
    }

    /// Call `renderer` with every newly resolved icon.
    pub fn set_renderer(&mut self, renderer: impl FnMut(&Bitmap, Scope) + 'static) {
        self.renderer = Some(Box::new(renderer));
    }

    /// Set the applet, instance and state table.
    ///
    /// Invalid tables are rejected and leave everything as it was. The first time an applet
    /// name is seen, its `icons` and `themes` data directories are added to the host theme.
    pub fn set_info<S: AsRef<str>>(
        &mut self,
        applet_name: &str,
        uid: &str,
        states: &[S],
        icon_names: &[S],
    ) -> Result<(), InfoError> {
        let applet_changed = self
            .identity
            .set_info(applet_name, uid, states, icon_names)
            .inspect_err(|_e| {
                #[cfg(feature = "log")]
                log::warn!("{_e}");
            })?;

        if applet_changed {
            for dir in self.config.applet_dirs(applet_name) {
                self.themes.system.append_search_path(&dir);
            }
        }

        // the current state usually belongs to the previous table until `set_state` follows
        if self.identity.current_index().is_some() {
            self.ensure_icon();
        }

        Ok(())
    }

    /// Set up an applet that only ever shows one icon.
    pub fn set_info_simple(
        &mut self,
        applet_name: &str,
        uid: &str,
        icon_name: &str,
    ) -> Result<(), InfoError> {
        self.set_info(applet_name, uid, &[SINGULAR_STATE], &[icon_name])?;
        self.set_state(SINGULAR_STATE);

        Ok(())
    }

    /// Forget the state table. Everything else, including the displayed icon, stays.
    pub fn clear_info(&mut self) {
        self.identity.clear_info();
    }

    pub fn set_state(&mut self, state: &str) {
        self.identity.set_state(state);
        self.ensure_icon();
    }

    pub fn set_size(&mut self, size: u32) {
        self.identity.set_size(size);
        self.ensure_icon();
    }

    /// Prefer the icon theme called `theme_name` over the host theme, or stop doing so.
    pub fn override_theme(&mut self, theme_name: Option<&str>) {
        let theme = theme_name.map(|name| {
            Box::new(IconTheme::new(name, self.config.search_path())) as Box<dyn ThemeSource>
        });

        self.set_override_source(theme);
    }

    /// Like [`override_theme`](Self::override_theme), with any theme source.
    pub fn set_override_source(&mut self, theme: Option<Box<dyn ThemeSource>>) {
        self.themes.override_theme = theme;
        self.ensure_icon();
    }

    /// Pick up changes to the icon themes on disk.
    pub fn theme_changed(&mut self) {
        self.themes.rescan();
        self.ensure_icon();
    }

    /// Resolve any state at any size, without changing the displayed icon.
    pub fn icon_at_size(&self, state: &str, size: u32) -> Option<Bitmap> {
        match self.cascade().resolve(&self.identity, state, size) {
            Resolution::Resolved { bitmap, .. } => Some(bitmap),
            _ => None,
        }
    }

    /// Remove customizations of the current icon.
    pub fn clear_icons(&mut self, which: ClearScope) -> Result<usize, StoreError> {
        let removed = self
            .store
            .clear(&self.identity, which)
            .inspect_err(warn_store_error);

        self.refresh_custom_theme();
        removed
    }

    /// Carry out what the user chose to do with a dropped image.
    ///
    /// Applying first clears the target scope and every more specific one, then stores the
    /// image. Images that can't be used are rejected before any file is touched; once files
    /// were removed the icon is resolved again, even if storing the new image failed.
    pub fn handle_drop(&mut self, action: DropAction) -> Result<(), StoreError> {
        match action {
            DropAction::Cancel => Ok(()),
            DropAction::Clear => self.clear_icons(ClearScope::All).map(drop),
            DropAction::Apply { path, scope } => {
                let image = open_custom_image(&path, scope).inspect_err(warn_store_error)?;

                let stored = self
                    .store
                    .clear_at_and_broader(&self.identity, scope)
                    .and_then(|_| self.store.save(&self.identity, scope, &image))
                    .inspect_err(warn_store_error);

                self.refresh_custom_theme();
                stored.map(drop)
            }
        }
    }

    pub fn identity(&self) -> &IconIdentity {
        &self.identity
    }

    pub fn state(&self) -> Option<&str> {
        self.identity.current_state()
    }

    pub fn size(&self) -> u32 {
        self.identity.current_size()
    }

    /// The icon currently displayed, if one was resolved yet.
    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.resolved.as_ref().map(|(_, bitmap)| bitmap)
    }

    /// The scope the displayed icon came from.
    pub fn resolved_scope(&self) -> Option<Scope> {
        self.resolved.as_ref().map(|(scope, _)| *scope)
    }

    pub fn store(&self) -> &CustomizationStore {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn cascade(&self) -> Cascade<'_> {
        Cascade {
            themes: &self.themes,
            pixmap_dirs: &self.config.pixmap_dirs,
            missing_icon_name: &self.config.missing_icon_name,
        }
    }

    fn refresh_custom_theme(&mut self) {
        self.themes.custom.rescan();
        self.ensure_icon();
    }

    fn ensure_icon(&mut self) {
        let Resolution::Resolved { scope, bitmap } = self.cascade().resolve_current(&self.identity)
        else {
            return;
        };

        if let Some(renderer) = &mut self.renderer {
            renderer(&bitmap, scope);
        }
        self.resolved = Some((scope, bitmap));
    }
}

fn open_custom_image(path: &Path, scope: Scope) -> Result<CustomImage, StoreError> {
    if !scope.is_customizable() {
        return Err(StoreError::NotCustomizable(scope));
    }

    CustomImage::open(path)
}

fn warn_store_error(_e: &StoreError) {
    #[cfg(feature = "log")]
    log::warn!("{}", error_chain(_e));
}

#[cfg(feature = "log")]
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}
