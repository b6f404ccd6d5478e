//! Applet icons that follow the desktop's icon theme, and that users can replace with their own images.
//!
//! This crate, `themed_icon`, resolves which image an applet should display for its current state
//! and size, looking through user customizations, icon themes and plain files, and always ends up
//! with *something* to draw.
//!
//! # Quick start
//!
//! ```no_run
//! use std::rc::Rc;
//! use themed_icon::{Config, IconTheme, SearchPath, ThemedIcon};
//!
//! let system = Rc::new(IconTheme::new("Adwaita", SearchPath::default()));
//! let mut icon = ThemedIcon::new(Config::default(), system);
//!
//! icon.set_info_simple("clock", "1", "preferences-system-time").unwrap();
//!
//! println!("Showing the clock icon from {:?}", icon.resolved_scope());
//! ```
//!
//! # High level design
//!
//! Every time the state, size or theme of an icon changes, the icon is looked up again. The lookup
//! walks an ordered list of [Scope]s and stops at the first one that produces an image:
//!
//! 1.  *Customizations*:
//!
//!     Images the user dropped onto an applet are kept in a small icon theme of their own,
//!     `awn-theme`, under the user's icon directory. They can apply to one applet instance, to every
//!     instance of an applet, or to every applet using that icon name, and the most specific one wins.
//!
//!     [CustomizationStore] writes and removes them, [parse_uri_list] turns a drag-and-drop payload
//!     into a file to store.
//!
//! 2.  *Icon themes*:
//!
//!     A theme the user picked for this icon only, then the host's theme. Both are [ThemeSource]s;
//!     [IconTheme] reads freedesktop themes from disk, finding them in a [SearchPath].
//!
//! 3.  *Files and fallbacks*:
//!
//!     Icon names may also be image paths. When nothing at all is found, the theme's "missing image"
//!     icon is shown, and failing that a translucent red square.
//!
//! Icons that end up taller than requested are scaled down to fit. [ThemedIcon] ties all of
//! this together.

mod bitmap;
mod cascade;
mod config;
mod dnd;
#[cfg(test)]
mod fixtures;
mod icon;
mod identity;
mod names;
mod scope;
mod search;
mod source;
mod store;
mod theme;
mod themed_icon;

pub use bitmap::*;
pub use cascade::*;
pub use config::*;
pub use dnd::*;
pub use icon::*;
pub use identity::*;
pub use names::*;
pub use scope::*;
pub use search::*;
pub use source::*;
pub use store::*;
pub use theme::*;
pub use themed_icon::*;
