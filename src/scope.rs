use crate::icon::FileType;
use crate::names::flatten_name;
use std::fmt::Display;

/// One tier of the icon lookup cascade, from most to least specific.
///
/// The declaration order is the lookup order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Scope {
    /// A customization for one applet instance: `{icon}-{applet}-{uid}` in the custom theme.
    Uid,
    /// A customization for every instance of an applet: `{icon}-{applet}` in the custom theme.
    Applet,
    /// `{icon}` in the custom theme.
    AwnTheme,
    /// `{icon}` in the user-selected override theme, if any.
    OverrideTheme,
    /// `{icon}` in the host's icon theme.
    GtkTheme,
    /// The original icon name, loaded as a file path.
    Filename,
    /// The host theme's "missing image" icon.
    FallbackStop,
    /// A solid swatch. Always succeeds.
    FallbackFill,
}

impl Scope {
    /// Every scope, in lookup order.
    pub const ALL: [Scope; 8] = [
        Scope::Uid,
        Scope::Applet,
        Scope::AwnTheme,
        Scope::OverrideTheme,
        Scope::GtkTheme,
        Scope::Filename,
        Scope::FallbackStop,
        Scope::FallbackFill,
    ];

    /// The scopes a user may store a customization in, most specific first.
    pub const CUSTOMIZABLE: [Scope; 3] = [Scope::Uid, Scope::Applet, Scope::AwnTheme];

    pub fn is_customizable(self) -> bool {
        Self::CUSTOMIZABLE.contains(&self)
    }

    /// The theme icon name this scope looks up, for scopes that look up theme icons.
    ///
    /// Path separators in any part become hyphens, so the name is always a single file name.
    pub fn lookup_name(self, icon_name: &str, applet_name: &str, uid: &str) -> Option<String> {
        let (icon_name, applet_name, uid) =
            (flatten_name(icon_name), flatten_name(applet_name), flatten_name(uid));

        match self {
            Scope::Uid => Some(format!("{icon_name}-{applet_name}-{uid}")),
            Scope::Applet => Some(format!("{icon_name}-{applet_name}")),
            Scope::AwnTheme | Scope::OverrideTheme | Scope::GtkTheme => Some(icon_name.into_owned()),
            Scope::Filename | Scope::FallbackStop | Scope::FallbackFill => None,
        }
    }

    /// File name of a customization stored at this scope, e.g. `clock-weather-42.svg`.
    ///
    /// `None` for scopes that can't hold customizations.
    pub fn file_name(
        self,
        icon_name: &str,
        applet_name: &str,
        uid: &str,
        file_type: FileType,
    ) -> Option<String> {
        if !self.is_customizable() {
            return None;
        }

        let stem = self.lookup_name(icon_name, applet_name, uid)?;
        Some(format!("{stem}.{}", file_type.ext()))
    }

    /// The customizable scopes cleared together with this one.
    ///
    /// Clearing a scope also clears every more specific one, so that a stale customization can
    /// never shadow whatever is stored next: clearing [`Scope::AwnTheme`] clears all three,
    /// clearing [`Scope::Applet`] also clears [`Scope::Uid`]. Non-customizable scopes clear
    /// nothing.
    pub fn clear_breadth(self) -> &'static [Scope] {
        match self {
            Scope::AwnTheme => &[Scope::AwnTheme, Scope::Applet, Scope::Uid],
            Scope::Applet => &[Scope::Applet, Scope::Uid],
            Scope::Uid => &[Scope::Uid],
            _ => &[],
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Scope::Uid => "uid",
            Scope::Applet => "applet",
            Scope::AwnTheme => "awn-theme",
            Scope::OverrideTheme => "override-theme",
            Scope::GtkTheme => "gtk-theme",
            Scope::Filename => "filename",
            Scope::FallbackStop => "fallback-stop",
            Scope::FallbackFill => "fallback-fill",
        };

        f.write_str(name)
    }
}

/// Which customizations to remove.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ClearScope {
    /// Every customization of the icon, at any scope.
    All,
    /// The customizations at a scope and every more specific one.
    At(Scope),
}

impl ClearScope {
    pub fn scopes(self) -> &'static [Scope] {
        match self {
            ClearScope::All => Scope::AwnTheme.clear_breadth(),
            ClearScope::At(scope) => scope.clear_breadth(),
        }
    }
}
