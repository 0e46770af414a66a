//! Icon resolution for window representations.
//!
//! [`resolve_icon`] walks a fixed chain of [`IconTier`]s and always produces
//! a [`ResolvedIcon`]; when every tier misses, the result names the
//! `image-missing` icon so renderers never see an undefined icon.

use crate::apps::ApplicationRecord;
use crate::traits::IconLookup;
use std::path::{Path, PathBuf};

/// Generic icon used when the application is unknown.
pub const EXECUTABLE_ICON: &str = "application-x-executable-symbolic";
/// Last-resort icon.
pub const MISSING_ICON: &str = "image-missing";

/// Where an icon's pixels come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconSource {
    /// A name to be looked up in the icon theme.
    Themed(String),
    /// An image file on disk.
    File(PathBuf),
}

/// An icon found by an [`IconLookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub source: IconSource,
    /// Native pixel size `(width, height)`, when the lookup knows it.
    pub native_size: Option<(u32, u32)>,
}

impl Icon {
    pub fn themed(name: impl Into<String>, native_size: Option<(u32, u32)>) -> Self {
        Self {
            source: IconSource::Themed(name.into()),
            native_size,
        }
    }

    pub fn file(path: impl Into<PathBuf>, native_size: Option<(u32, u32)>) -> Self {
        Self {
            source: IconSource::File(path.into()),
            native_size,
        }
    }
}

/// Which step of the fallback chain produced an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IconTier {
    /// The resolved application's own icon.
    Application,
    /// A theme lookup by the raw window class.
    ByIdentifier,
    /// The generic executable icon.
    Executable,
    /// The `image-missing` icon.
    Missing,
}

/// The outcome of [`resolve_icon`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIcon {
    pub icon: Icon,
    pub tier: IconTier,
    /// Target edge length in pixels; the icon is drawn `size × size`.
    pub size: u32,
}

impl ResolvedIcon {
    /// Whether the icon must be rescaled to reach exactly `size × size`.
    /// Icons of unknown native size are left to the renderer.
    pub fn needs_rescale(&self) -> bool {
        self.icon
            .native_size
            .is_some_and(|native| native != (self.size, self.size))
    }
}

/// Resolve the icon for a window.
///
/// Tiers, first success wins: the application's icon, a theme lookup by
/// `app_id`, [`EXECUTABLE_ICON`], [`MISSING_ICON`].  If the lookup does not
/// even know `image-missing` the result still names it.
pub fn resolve_icon(
    app: Option<&ApplicationRecord>,
    app_id: &str,
    size: u32,
    icons: &dyn IconLookup,
) -> ResolvedIcon {
    let size = size.max(1);
    let found = |tier: IconTier, icon: Icon| ResolvedIcon { icon, tier, size };

    if let Some(icon) = app.and_then(|a| a.icon_at(icons, size)) {
        return found(IconTier::Application, icon);
    }
    if !app_id.is_empty() {
        if let Some(icon) = icons.lookup(app_id, size) {
            return found(IconTier::ByIdentifier, icon);
        }
    }
    if let Some(icon) = icons.lookup(EXECUTABLE_ICON, size) {
        return found(IconTier::Executable, icon);
    }
    let icon = icons
        .lookup(MISSING_ICON, size)
        .unwrap_or_else(|| Icon::themed(MISSING_ICON, None));
    found(IconTier::Missing, icon)
}

//  Filesystem lookup

/// Standard sizes of the `hicolor` theme, searched nearest-first.
const THEME_SIZES: [u32; 10] = [16, 22, 24, 32, 48, 64, 96, 128, 256, 512];

/// [`IconLookup`] over icon-theme directories on disk.
///
/// Absolute paths are accepted as-is when the file exists.  Names are
/// searched in `<base>/hicolor/<n>x<n>/apps`, then `<base>/hicolor/scalable/apps`,
/// then each pixmaps directory, as `.png` or `.svg`.  Used when no GTK icon
/// theme is available (`--once` and headless mode).
///
/// Only `hicolor` is searched: the user's configured icon theme and its
/// `Inherits` chain are ignored, so names shipped only by a themed icon
/// set resolve to a lower tier here than under GTK.
pub struct ThemeDirLookup {
    icon_bases: Vec<PathBuf>,
    pixmap_dirs: Vec<PathBuf>,
}

impl ThemeDirLookup {
    /// Search the XDG data directories.
    pub fn from_env() -> Self {
        let mut data_dirs = Vec::new();
        match std::env::var_os("XDG_DATA_HOME") {
            Some(d) if !d.is_empty() => data_dirs.push(PathBuf::from(d)),
            _ => {
                if let Some(home) = std::env::var_os("HOME") {
                    data_dirs.push(PathBuf::from(home).join(".local/share"));
                }
            }
        }
        match std::env::var_os("XDG_DATA_DIRS") {
            Some(d) if !d.is_empty() => data_dirs.extend(std::env::split_paths(&d)),
            _ => {
                data_dirs.push(PathBuf::from("/usr/local/share"));
                data_dirs.push(PathBuf::from("/usr/share"));
            }
        }
        Self {
            icon_bases: data_dirs.iter().map(|d| d.join("icons")).collect(),
            pixmap_dirs: data_dirs.iter().map(|d| d.join("pixmaps")).collect(),
        }
    }

    /// Search explicit directories.
    pub fn with_dirs(icon_bases: Vec<PathBuf>, pixmap_dirs: Vec<PathBuf>) -> Self {
        Self {
            icon_bases,
            pixmap_dirs,
        }
    }

    fn find_in(dir: &Path, name: &str) -> Option<PathBuf> {
        ["png", "svg"]
            .iter()
            .map(|ext| dir.join(format!("{}.{}", name, ext)))
            .find(|p| p.is_file())
    }
}

impl IconLookup for ThemeDirLookup {
    fn lookup(&self, name: &str, size: u32) -> Option<Icon> {
        if name.is_empty() {
            return None;
        }
        let as_path = Path::new(name);
        if as_path.is_absolute() {
            return as_path.is_file().then(|| Icon::file(as_path, None));
        }
        if name.contains('/') {
            return None;
        }

        let mut sizes = THEME_SIZES;
        sizes.sort_by_key(|s| s.abs_diff(size));

        for base in &self.icon_bases {
            let theme = base.join("hicolor");
            for s in sizes {
                let dir = theme.join(format!("{}x{}", s, s)).join("apps");
                if let Some(path) = Self::find_in(&dir, name) {
                    return Some(Icon::file(path, Some((s, s))));
                }
            }
            if let Some(path) = Self::find_in(&theme.join("scalable/apps"), name) {
                return Some(Icon::file(path, None));
            }
        }

        self.pixmap_dirs
            .iter()
            .find_map(|dir| Self::find_in(dir, name))
            .map(|path| Icon::file(path, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Lookup that knows a fixed set of names at a fixed native size.
    struct MapLookup(HashMap<&'static str, u32>);

    impl MapLookup {
        fn new(entries: &[(&'static str, u32)]) -> Self {
            Self(entries.iter().copied().collect())
        }
    }

    impl IconLookup for MapLookup {
        fn lookup(&self, name: &str, _size: u32) -> Option<Icon> {
            self.0.get(name).map(|&n| Icon::themed(name, Some((n, n))))
        }
    }

    fn foot_app() -> ApplicationRecord {
        ApplicationRecord {
            name: "foot".into(),
            icon: Some("foot-icon".into()),
            ..Default::default()
        }
    }

    #[test]
    fn application_icon_first() {
        let icons = MapLookup::new(&[("foot-icon", 48), ("foot", 48), (EXECUTABLE_ICON, 48)]);
        let r = resolve_icon(Some(&foot_app()), "foot", 48, &icons);
        assert_eq!(r.tier, IconTier::Application);
        assert_eq!(r.icon.source, IconSource::Themed("foot-icon".into()));
        assert!(!r.needs_rescale());
    }

    #[test]
    fn identifier_lookup_second() {
        let icons = MapLookup::new(&[("foot", 48), (EXECUTABLE_ICON, 48)]);
        let r = resolve_icon(Some(&foot_app()), "foot", 48, &icons);
        assert_eq!(r.tier, IconTier::ByIdentifier);
        let r = resolve_icon(None, "foot", 48, &icons);
        assert_eq!(r.tier, IconTier::ByIdentifier);
    }

    #[test]
    fn executable_fallback_third() {
        let icons = MapLookup::new(&[(EXECUTABLE_ICON, 16), (MISSING_ICON, 16)]);
        let r = resolve_icon(None, "unknown-app", 24, &icons);
        assert_eq!(r.tier, IconTier::Executable);
        assert!(r.needs_rescale());
    }

    #[test]
    fn missing_image_is_never_undefined() {
        let icons = MapLookup::new(&[(MISSING_ICON, 24)]);
        let r = resolve_icon(None, "unknown-app", 24, &icons);
        assert_eq!(r.tier, IconTier::Missing);
        assert_eq!(r.icon.source, IconSource::Themed(MISSING_ICON.into()));

        let nothing = MapLookup::new(&[]);
        let r = resolve_icon(None, "", 0, &nothing);
        assert_eq!(r.tier, IconTier::Missing);
        assert_eq!(r.icon.source, IconSource::Themed(MISSING_ICON.into()));
        assert_eq!(r.size, 1);
        assert!(!r.needs_rescale());
    }

    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn tmp_dir() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "hyprview-icon-test-{}-{}",
            std::process::id(),
            id
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn theme_dir_prefers_nearest_size() {
        let base = tmp_dir();
        for s in [16, 48] {
            let dir = base.join(format!("hicolor/{}x{}/apps", s, s));
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("foot.png"), b"png").unwrap();
        }
        let lookup = ThemeDirLookup::with_dirs(vec![base.clone()], vec![]);
        let icon = lookup.lookup("foot", 44).unwrap();
        assert_eq!(icon.native_size, Some((48, 48)));
        let icon = lookup.lookup("foot", 18).unwrap();
        assert_eq!(icon.native_size, Some((16, 16)));
        assert!(lookup.lookup("kitty", 40).is_none());
        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn theme_dir_falls_back_to_pixmaps_and_paths() {
        let pixmaps = tmp_dir();
        std::fs::write(pixmaps.join("legacy.svg"), b"<svg/>").unwrap();
        let lookup = ThemeDirLookup::with_dirs(vec![], vec![pixmaps.clone()]);
        let icon = lookup.lookup("legacy", 32).unwrap();
        assert_eq!(icon.source, IconSource::File(pixmaps.join("legacy.svg")));
        assert_eq!(icon.native_size, None);

        let abs = pixmaps.join("legacy.svg");
        let icon = lookup.lookup(abs.to_str().unwrap(), 32).unwrap();
        assert_eq!(icon.source, IconSource::File(abs));
        assert!(lookup.lookup("/nonexistent/icon.png", 32).is_none());
        assert!(lookup.lookup("../escape", 32).is_none());
        let _ = std::fs::remove_dir_all(&pixmaps);
    }
}
