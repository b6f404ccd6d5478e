//! The ordered search that turns an [`IconIdentity`] into a bitmap.

use crate::bitmap::{self, Bitmap};
use crate::identity::IconIdentity;
use crate::scope::Scope;
use crate::source::ThemeSet;
use std::path::{Path, PathBuf};

/// Outcome of a cascade run.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// There is no state table, state or size yet. Nothing was looked up.
    NotReady,
    /// The requested state isn't in the state table.
    UnknownState(String),
    /// The first scope that produced an icon, and the icon, shrunk to fit.
    Resolved { scope: Scope, bitmap: Bitmap },
}

impl Resolution {
    pub fn bitmap(&self) -> Option<&Bitmap> {
        match self {
            Resolution::Resolved { bitmap, .. } => Some(bitmap),
            _ => None,
        }
    }

    pub fn scope(&self) -> Option<Scope> {
        match self {
            Resolution::Resolved { scope, .. } => Some(*scope),
            _ => None,
        }
    }
}

/// Everything besides the identity that a cascade run consults.
pub struct Cascade<'a> {
    pub themes: &'a ThemeSet,
    /// Directories tried, in order, for icon names that aren't loadable paths themselves.
    pub pixmap_dirs: &'a [PathBuf],
    /// Name of the host theme's "missing image" icon.
    pub missing_icon_name: &'a str,
}

impl Cascade<'_> {
    /// Resolve the identity's current state at its current size.
    pub fn resolve_current(&self, identity: &IconIdentity) -> Resolution {
        match identity.current_state() {
            Some(state) if identity.is_ready() => {
                self.resolve(identity, state, identity.current_size())
            }
            _ => Resolution::NotReady,
        }
    }

    /// Resolve `state` at `size`, walking every [`Scope`] in order until one yields an icon.
    ///
    /// Once the identity has a state table and `state` is part of it this always produces a
    /// bitmap, as the last scope cannot fail. Bitmaps taller than `size` are shrunk to `size`.
    pub fn resolve(&self, identity: &IconIdentity, state: &str, size: u32) -> Resolution {
        if identity.states().is_empty() || size == 0 {
            return Resolution::NotReady;
        }

        let Some(index) = identity.state_index(state) else {
            #[cfg(feature = "log")]
            log::warn!("State does not exist: {state}");

            return Resolution::UnknownState(state.to_owned());
        };

        Scope::ALL
            .into_iter()
            .find_map(|scope| {
                let bitmap = self.try_scope(scope, identity, index, size)?;
                Some(Resolution::Resolved {
                    scope,
                    bitmap: bitmap::shrink_to_height(bitmap, size),
                })
            })
            .unwrap_or(Resolution::NotReady)
    }

    fn try_scope(
        &self,
        scope: Scope,
        identity: &IconIdentity,
        index: usize,
        size: u32,
    ) -> Option<Bitmap> {
        let icon_name = identity.icon_name(index)?;
        let lookup_name = scope.lookup_name(icon_name, identity.applet_name(), identity.uid());

        let bitmap = match (scope, lookup_name) {
            (Scope::Uid | Scope::Applet | Scope::AwnTheme, Some(name)) => {
                self.themes.custom.load_icon(&name, size)
            }
            (Scope::OverrideTheme, Some(name)) => self
                .themes
                .override_theme
                .as_ref()
                .and_then(|theme| theme.load_icon(&name, size)),
            (Scope::GtkTheme, Some(name)) => self.themes.system.load_icon(&name, size),
            (Scope::Filename, _) => {
                let file_name = identity.original_icon_name(index)?;
                load_from_disk(file_name, size, self.pixmap_dirs)
            }
            (Scope::FallbackStop, _) => self.themes.system.load_icon(self.missing_icon_name, size),
            (Scope::FallbackFill, _) => Some(bitmap::placeholder(size)),
            (_, None) => None,
        };

        if bitmap.is_none() {
            #[cfg(feature = "log")]
            log::trace!("no icon for {icon_name:?} at scope {scope}");
        }

        bitmap
    }
}

/// Load `file_name` as an image file scaled to fit `size`.
///
/// The name is tried as a path first, then its file name inside each of `pixmap_dirs`. The first
/// file that loads wins.
pub fn load_from_disk(file_name: &str, size: u32, pixmap_dirs: &[PathBuf]) -> Option<Bitmap> {
    if file_name.is_empty() {
        return None;
    }

    let path = Path::new(file_name);
    let base_name = path.file_name();

    std::iter::once(path.to_owned())
        .chain(
            base_name
                .into_iter()
                .flat_map(|base_name| pixmap_dirs.iter().map(move |dir| dir.join(base_name))),
        )
        .filter(|candidate| candidate.is_file())
        .find_map(|candidate| bitmap::load_at_scale(&candidate, size).ok())
}
