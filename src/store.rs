//! On-disk customizations: files in the `scalable` directory of the custom theme.

use crate::bitmap::{self, Bitmap, LoadError};
use crate::icon::FileType;
use crate::identity::IconIdentity;
use crate::scope::{ClearScope, Scope};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Descriptor written into the custom theme when no packaged template is installed.
pub static DEFAULT_INDEX: &str = include_str!("../resources/index.theme");

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("the icon has no current state to customize")]
    NoCurrentIcon,
    #[error("icons can't be customized at scope {0}")]
    NotCustomizable(Scope),
    #[error("unable to load {path:?}")]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
    #[error("unable to copy {from:?} to {to:?}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to save {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to encode {path:?}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("unable to remove {path:?}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// An image a user wants to use as an icon.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomImage {
    /// An SVG, stored by copying the file as-is.
    Vector(PathBuf),
    /// Decoded pixels, stored as PNG.
    Raster(Bitmap),
}

impl CustomImage {
    /// Open an image file, checking that it is actually usable as an icon.
    ///
    /// Files named `*.svg` are vector images, anything else must decode as a raster image.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let load_error = |source: LoadError| StoreError::Load {
            path: path.to_owned(),
            source,
        };

        if FileType::from_path_ext(path) == Some(FileType::Svg) {
            let data = std::fs::read(path).map_err(|e| load_error(e.into()))?;
            bitmap::render_svg(&data, 1).map_err(load_error)?;

            return Ok(CustomImage::Vector(path.to_owned()));
        }

        bitmap::decode_raster(path)
            .map(CustomImage::Raster)
            .map_err(load_error)
    }

    pub fn file_type(&self) -> FileType {
        match self {
            CustomImage::Vector(_) => FileType::Svg,
            CustomImage::Raster(_) => FileType::Png,
        }
    }
}

/// Reads and writes customizations in the custom theme directory.
///
/// | Scope | File |
/// |---|---|
/// | `Uid` | `scalable/{icon}-{applet}-{uid}.{png,svg}` |
/// | `Applet` | `scalable/{icon}-{applet}.{png,svg}` |
/// | `AwnTheme` | `scalable/{icon}.{png,svg}` |
#[derive(Debug, Clone)]
pub struct CustomizationStore {
    theme_dir: PathBuf,
}

impl CustomizationStore {
    pub fn new(theme_dir: impl Into<PathBuf>) -> Self {
        Self {
            theme_dir: theme_dir.into(),
        }
    }

    pub fn theme_dir(&self) -> &Path {
        &self.theme_dir
    }

    /// The directory every customization is stored in.
    pub fn scalable_dir(&self) -> PathBuf {
        self.theme_dir.join("scalable")
    }

    /// Create the theme directories, and its `index.theme` if there is none yet.
    ///
    /// The index is copied from `template`, or [`DEFAULT_INDEX`] is written when `template`
    /// doesn't exist. An existing index is never replaced.
    pub fn ensure_layout(&self, template: &Path) -> Result<(), StoreError> {
        let scalable_dir = self.scalable_dir();
        std::fs::create_dir_all(&scalable_dir).map_err(|source| StoreError::Write {
            path: scalable_dir,
            source,
        })?;

        let index = self.theme_dir.join("index.theme");
        if index.exists() {
            return Ok(());
        }

        if template.is_file() {
            copy_if_absent(template, &index)
        } else {
            write_atomically(&index, |partial| {
                std::fs::write(partial, DEFAULT_INDEX).map_err(|source| StoreError::Write {
                    path: index.clone(),
                    source,
                })
            })
        }
    }

    /// Where a customization of the identity's current icon at `scope` is stored.
    pub fn destination(
        &self,
        identity: &IconIdentity,
        scope: Scope,
        file_type: FileType,
    ) -> Result<PathBuf, StoreError> {
        let index = identity.current_index().ok_or(StoreError::NoCurrentIcon)?;
        let icon_name = identity.icon_name(index).ok_or(StoreError::NoCurrentIcon)?;

        let file_name = scope
            .file_name(icon_name, identity.applet_name(), identity.uid(), file_type)
            .ok_or(StoreError::NotCustomizable(scope))?;

        Ok(self.scalable_dir().join(file_name))
    }

    /// Store `image` as the identity's current icon at `scope`, returning where it was written.
    ///
    /// Raster images are written as PNG, replacing any file already there. Vector images are
    /// copied verbatim, but only if nothing is stored at the destination yet.
    ///
    /// Customizations at other scopes aren't touched; use
    /// [`clear_at_and_broader`](Self::clear_at_and_broader) first so a stale one can't shadow
    /// the new image.
    pub fn save(
        &self,
        identity: &IconIdentity,
        scope: Scope,
        image: &CustomImage,
    ) -> Result<PathBuf, StoreError> {
        let destination = self.destination(identity, scope, image.file_type())?;

        let scalable_dir = self.scalable_dir();
        std::fs::create_dir_all(&scalable_dir).map_err(|source| StoreError::Write {
            path: scalable_dir,
            source,
        })?;

        match image {
            CustomImage::Vector(source) => copy_if_absent(source, &destination)?,
            CustomImage::Raster(bitmap) => {
                write_atomically(&destination, |partial| write_png(bitmap, partial))?
            }
        }

        #[cfg(feature = "log")]
        log::debug!("saved {scope} customization to {destination:?}");

        Ok(destination)
    }

    /// Remove the identity's current icon customizations, in every format.
    ///
    /// Returns how many files were removed. Files that don't exist are skipped silently.
    pub fn clear(&self, identity: &IconIdentity, which: ClearScope) -> Result<usize, StoreError> {
        let mut removed = 0;
        let mut failure = None;

        for scope in which.scopes() {
            for file_type in FileType::types() {
                let path = self.destination(identity, *scope, file_type)?;

                match std::fs::remove_file(&path) {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(source) => {
                        #[cfg(feature = "log")]
                        log::warn!("unable to remove {path:?}: {source}");

                        failure.get_or_insert(StoreError::Remove { path, source });
                    }
                }
            }
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(removed),
        }
    }

    /// Remove the customizations at `scope` and at every more specific scope.
    ///
    /// See [`Scope::clear_breadth`].
    pub fn clear_at_and_broader(
        &self,
        identity: &IconIdentity,
        scope: Scope,
    ) -> Result<usize, StoreError> {
        self.clear(identity, ClearScope::At(scope))
    }
}

fn copy_if_absent(from: &Path, to: &Path) -> Result<(), StoreError> {
    if to.exists() {
        return Ok(());
    }

    write_atomically(to, |partial| {
        std::fs::copy(from, partial)
            .map(drop)
            .map_err(|source| StoreError::Copy {
                from: from.to_owned(),
                to: to.to_owned(),
                source,
            })
    })
}

fn write_png(bitmap: &Bitmap, path: &Path) -> Result<(), StoreError> {
    let write_error = |source: std::io::Error| StoreError::Write {
        path: path.to_owned(),
        source,
    };

    let mut writer = BufWriter::new(File::create(path).map_err(write_error)?);
    let encoder = PngEncoder::new_with_quality(
        &mut writer,
        CompressionType::Uncompressed,
        FilterType::NoFilter,
    );
    encoder
        .write_image(
            bitmap.as_raw(),
            bitmap.width(),
            bitmap.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|source| StoreError::Encode {
            path: path.to_owned(),
            source,
        })?;

    writer.flush().map_err(write_error)
}

// Writes to a hidden sibling first, so `destination` is either complete or untouched.
fn write_atomically<F>(destination: &Path, write: F) -> Result<(), StoreError>
where
    F: FnOnce(&Path) -> Result<(), StoreError>,
{
    let file_name = destination
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    let partial = destination.with_file_name(format!(".{file_name}.part"));

    let result = write(&partial).and_then(|()| {
        std::fs::rename(&partial, destination).map_err(|source| StoreError::Write {
            path: destination.to_owned(),
            source,
        })
    });

    if result.is_err() {
        let _ = std::fs::remove_file(&partial);
    }

    result
}

#[cfg(test)]
mod test {
    use crate::fixtures;
    use crate::icon::FileType;
    use crate::identity::IconIdentity;
    use crate::scope::{ClearScope, Scope};
    use crate::store::{CustomImage, CustomizationStore, DEFAULT_INDEX, StoreError};
    use image::{Rgba, RgbaImage};
    use std::path::Path;

    fn clock() -> IconIdentity {
        let mut identity = IconIdentity::new(48);
        identity
            .set_info("clock", "42", &["running", "alarm"], &["clock", "clock-alarm"])
            .unwrap();
        identity.set_state("alarm");
        identity
    }

    fn store(root: &Path) -> CustomizationStore {
        let store = CustomizationStore::new(root.join("awn-theme"));
        store.ensure_layout(&root.join("no-template")).unwrap();
        store
    }

    fn touch_all(store: &CustomizationStore, identity: &IconIdentity) {
        for scope in Scope::CUSTOMIZABLE {
            for file_type in FileType::types() {
                let path = store.destination(identity, scope, file_type).unwrap();
                std::fs::write(path, b"stale").unwrap();
            }
        }
    }

    fn exists(store: &CustomizationStore, identity: &IconIdentity, scope: Scope) -> bool {
        FileType::types().iter().any(|file_type| {
            store
                .destination(identity, scope, *file_type)
                .unwrap()
                .exists()
        })
    }

    #[test]
    fn test_layout_uses_template_once() {
        let root = tempfile::tempdir().unwrap();
        let template = root.path().join("index.theme");
        std::fs::write(&template, "[Icon Theme]\nName=packaged\nDirectories=scalable\n").unwrap();

        let store = CustomizationStore::new(root.path().join("icons/awn-theme"));
        store.ensure_layout(&template).unwrap();
        assert!(store.scalable_dir().is_dir());
        let index = store.theme_dir().join("index.theme");
        assert!(std::fs::read_to_string(&index).unwrap().contains("packaged"));

        std::fs::write(&template, "changed").unwrap();
        store.ensure_layout(&template).unwrap();
        assert!(std::fs::read_to_string(&index).unwrap().contains("packaged"));
    }

    #[test]
    fn test_layout_falls_back_to_default_index() {
        let root = tempfile::tempdir().unwrap();
        let store = store(root.path());

        let index = std::fs::read_to_string(store.theme_dir().join("index.theme")).unwrap();
        assert_eq!(index, DEFAULT_INDEX);
    }

    #[test]
    fn test_destinations() {
        let root = tempfile::tempdir().unwrap();
        let store = store(root.path());
        let identity = clock();

        let scalable = store.scalable_dir();
        assert_eq!(
            store.destination(&identity, Scope::Uid, FileType::Png).unwrap(),
            scalable.join("clock-alarm-clock-42.png")
        );
        assert_eq!(
            store.destination(&identity, Scope::Applet, FileType::Svg).unwrap(),
            scalable.join("clock-alarm-clock.svg")
        );
        assert_eq!(
            store.destination(&identity, Scope::AwnTheme, FileType::Png).unwrap(),
            scalable.join("clock-alarm.png")
        );
        assert!(matches!(
            store.destination(&identity, Scope::GtkTheme, FileType::Png),
            Err(StoreError::NotCustomizable(Scope::GtkTheme))
        ));
        assert!(matches!(
            store.destination(&IconIdentity::new(48), Scope::Uid, FileType::Png),
            Err(StoreError::NoCurrentIcon)
        ));
    }

    #[test]
    fn test_separators_in_applet_and_uid_stay_inside_the_theme() {
        let root = tempfile::tempdir().unwrap();
        let store = store(root.path());
        let mut identity = IconIdentity::new(48);
        identity
            .set_info("my/applet", "x/../../../escaped", &["running"], &["clock"])
            .unwrap();
        identity.set_state("running");

        let path = store
            .save(&identity, Scope::Uid, &CustomImage::Raster(RgbaImage::new(2, 2)))
            .unwrap();

        assert_eq!(path.parent(), Some(store.scalable_dir().as_path()));
        assert_eq!(path.file_name().unwrap(), "clock-my-applet-x-..-..-..-escaped.png");
        assert_eq!(store.clear(&identity, ClearScope::All).unwrap(), 1);
    }

    #[test]
    fn test_save_raster_as_png() {
        let root = tempfile::tempdir().unwrap();
        let store = store(root.path());
        let pixels = RgbaImage::from_pixel(4, 3, Rgba([9, 8, 7, 255]));

        let path = store
            .save(&clock(), Scope::Applet, &CustomImage::Raster(pixels.clone()))
            .unwrap();

        assert_eq!(path.file_name().unwrap(), "clock-alarm-clock.png");
        assert_eq!(image::open(&path).unwrap().to_rgba8(), pixels);
        let leftovers = std::fs::read_dir(store.scalable_dir()).unwrap().count();
        assert_eq!(leftovers, 1, "no partial files are left behind");
    }

    #[test]
    fn test_saved_png_is_uncompressed() {
        let root = tempfile::tempdir().unwrap();
        let store = store(root.path());
        let pixels = RgbaImage::from_pixel(64, 64, Rgba([200, 10, 10, 255]));

        let path = store
            .save(&clock(), Scope::AwnTheme, &CustomImage::Raster(pixels.clone()))
            .unwrap();

        let written = std::fs::metadata(&path).unwrap().len();
        assert!(written >= 64 * 64 * 4, "{written} bytes for 16384 bytes of pixels");
        assert_eq!(image::open(&path).unwrap().to_rgba8(), pixels);
    }

    #[test]
    fn test_save_vector_copies_once() {
        let root = tempfile::tempdir().unwrap();
        let store = store(root.path());
        let source = root.path().join("dropped/clock.svg");
        fixtures::write_svg(&source, [1, 2, 3]);

        let image = CustomImage::open(&source).unwrap();
        assert_eq!(image, CustomImage::Vector(source.clone()));

        let path = store.save(&clock(), Scope::Uid, &image).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), std::fs::read(&source).unwrap());

        fixtures::write_svg(&source, [4, 5, 6]);
        store.save(&clock(), Scope::Uid, &image).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            fixtures::svg_source([1, 2, 3]),
            "existing vector customizations are kept"
        );
    }

    #[test]
    fn test_open_rejects_undecodable_files() {
        let root = tempfile::tempdir().unwrap();
        let bogus = root.path().join("bogus.png");
        std::fs::write(&bogus, b"plain text").unwrap();
        let bogus_svg = root.path().join("bogus.svg");
        std::fs::write(&bogus_svg, b"plain text").unwrap();

        assert!(matches!(CustomImage::open(&bogus), Err(StoreError::Load { .. })));
        assert!(matches!(CustomImage::open(&bogus_svg), Err(StoreError::Load { .. })));
    }

    #[test]
    fn test_save_to_read_only_scope_fails() {
        let root = tempfile::tempdir().unwrap();
        let store = store(root.path());
        let image = CustomImage::Raster(RgbaImage::new(1, 1));

        let result = store.save(&clock(), Scope::OverrideTheme, &image);

        assert!(matches!(result, Err(StoreError::NotCustomizable(_))));
    }

    #[test]
    fn test_clearing_cascades_to_more_specific_scopes() {
        let root = tempfile::tempdir().unwrap();
        let store = store(root.path());
        let identity = clock();

        touch_all(&store, &identity);
        assert_eq!(store.clear_at_and_broader(&identity, Scope::Uid).unwrap(), 2);
        assert!(!exists(&store, &identity, Scope::Uid));
        assert!(exists(&store, &identity, Scope::Applet));

        touch_all(&store, &identity);
        assert_eq!(store.clear_at_and_broader(&identity, Scope::Applet).unwrap(), 4);
        assert!(!exists(&store, &identity, Scope::Uid));
        assert!(!exists(&store, &identity, Scope::Applet));
        assert!(exists(&store, &identity, Scope::AwnTheme));

        touch_all(&store, &identity);
        assert_eq!(store.clear_at_and_broader(&identity, Scope::AwnTheme).unwrap(), 6);
        for scope in Scope::CUSTOMIZABLE {
            assert!(!exists(&store, &identity, scope));
        }
    }

    #[test]
    fn test_clear_all_and_missing_files() {
        let root = tempfile::tempdir().unwrap();
        let store = store(root.path());
        let identity = clock();

        assert_eq!(store.clear(&identity, ClearScope::All).unwrap(), 0);

        touch_all(&store, &identity);
        let mut other_state = identity.clone();
        other_state.set_state("running");
        assert_eq!(store.clear(&other_state, ClearScope::All).unwrap(), 0);
        assert_eq!(store.clear(&identity, ClearScope::All).unwrap(), 6);
        assert_eq!(
            store
                .clear(&identity, ClearScope::At(Scope::FallbackFill))
                .unwrap(),
            0
        );
    }
}
