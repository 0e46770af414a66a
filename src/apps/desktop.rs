//! [`AppRegistry`] backed by XDG `.desktop` files.
//!
//! Directories are searched in XDG precedence order: `$XDG_DATA_HOME`
//! first, then each entry of `$XDG_DATA_DIRS`.  Subdirectories are walked
//! too, their names joined into the desktop id with `-`.  An id seen in an
//! earlier directory shadows the same id in later ones, so user overrides
//! win over system entries.

use super::{program, ApplicationRecord};
use crate::traits::AppRegistry;
use log::debug;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Registry that enumerates desktop entries on every call.
pub struct DesktopEntryRegistry {
    dirs: Vec<PathBuf>,
}

/// Errors from enumerating desktop entries.
#[derive(Debug, thiserror::Error)]
#[error("application registry error: {0}")]
pub struct RegistryError(String);

impl DesktopEntryRegistry {
    /// Use the standard XDG application directories.
    pub fn from_env() -> Self {
        Self {
            dirs: application_dirs(),
        }
    }

    /// Use an explicit list of directories, highest precedence first.
    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Directories searched, highest precedence first.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

/// Standard XDG application directories.
fn application_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    match std::env::var_os("XDG_DATA_HOME") {
        Some(data_home) if !data_home.is_empty() => {
            dirs.push(PathBuf::from(data_home).join("applications"))
        }
        _ => {
            if let Some(home) = std::env::var_os("HOME") {
                dirs.push(PathBuf::from(home).join(".local/share/applications"));
            }
        }
    }

    match std::env::var_os("XDG_DATA_DIRS") {
        Some(data_dirs) if !data_dirs.is_empty() => {
            for dir in std::env::split_paths(&data_dirs) {
                dirs.push(dir.join("applications"));
            }
        }
        _ => {
            dirs.push(PathBuf::from("/usr/local/share/applications"));
            dirs.push(PathBuf::from("/usr/share/applications"));
        }
    }

    dirs
}

impl AppRegistry for DesktopEntryRegistry {
    type Error = RegistryError;

    /// Fails only when none of the directories could be read.
    fn applications(&self) -> Result<Vec<ApplicationRecord>, RegistryError> {
        let mut apps = Vec::new();
        let mut seen = HashSet::new();
        let mut readable = 0;

        for dir in &self.dirs {
            let mut entries = Vec::new();
            if let Err(e) = collect_entries(dir, "", &mut entries) {
                debug!("skipping {}: {}", dir.display(), e);
                continue;
            }
            readable += 1;

            for (id, path) in entries {
                if seen.contains(&id) {
                    continue;
                }
                match std::fs::read_to_string(&path) {
                    Ok(contents) => {
                        if let Some(app) = parse_desktop_entry(&id, &contents) {
                            apps.push(app);
                        }
                        seen.insert(id);
                    }
                    Err(e) => debug!("unreadable desktop entry {}: {}", path.display(), e),
                }
            }
        }

        if readable == 0 && !self.dirs.is_empty() {
            return Err(RegistryError(format!(
                "no readable application directory among {} searched",
                self.dirs.len()
            )));
        }
        Ok(apps)
    }
}

/// Collect `(desktop id, path)` pairs under `dir`, sorted by path.
///
/// Entries in subdirectories get the directory names as a `-`-joined
/// prefix, so `wine/Programs/notepad.desktop` has the id
/// `wine-Programs-notepad.desktop`.  Symlinked directories are not
/// followed.
fn collect_entries(
    dir: &Path,
    prefix: &str,
    out: &mut Vec<(String, PathBuf)>,
) -> std::io::Result<()> {
    let mut children: Vec<_> = std::fs::read_dir(dir)?.filter_map(|e| e.ok()).collect();
    children.sort_by_key(|e| e.path());

    for child in children {
        let path = child.path();
        let name = child.file_name().to_string_lossy().into_owned();
        if child.file_type().is_ok_and(|t| t.is_dir()) {
            let nested = format!("{}{}-", prefix, name);
            if let Err(e) = collect_entries(&path, &nested, out) {
                debug!("skipping {}: {}", path.display(), e);
            }
        } else if path.extension().is_some_and(|ext| ext == "desktop") {
            out.push((format!("{}{}", prefix, name), path));
        }
    }
    Ok(())
}

/// Parse the `[Desktop Entry]` group of a desktop file.
///
/// `desktop_id` is the entry's id (`org.gnome.Nautilus.desktop`); the
/// record's name is the id without the extension.  Returns `None` when the
/// group is missing or has neither a `Name` nor an `Exec` key.  `Hidden`
/// and `NoDisplay` entries are kept: their windows still need an identity.
pub fn parse_desktop_entry(desktop_id: &str, contents: &str) -> Option<ApplicationRecord> {
    let mut display_name = None;
    let mut window_class = None;
    let mut try_exec = None;
    let mut exec = None;
    let mut icon = None;
    let mut in_entry = false;
    let mut saw_entry = false;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if line.starts_with('[') {
            in_entry = line == "[Desktop Entry]";
            saw_entry |= in_entry;
            continue;
        }
        if !in_entry {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        // Localised keys (`Name[de]`) fall through to `_`.
        match key.trim() {
            "Name" => display_name = Some(value.to_string()),
            "StartupWMClass" => window_class = Some(value.to_string()),
            "TryExec" => try_exec = Some(value.to_string()),
            "Exec" => exec = Some(strip_field_codes(value)),
            "Icon" => icon = Some(value.to_string()),
            _ => {}
        }
    }

    if !saw_entry || (display_name.is_none() && exec.is_none()) {
        return None;
    }

    let name = desktop_id
        .strip_suffix(".desktop")
        .unwrap_or(desktop_id)
        .to_string();
    let executable = try_exec.or_else(|| exec.as_deref().and_then(program));

    Some(ApplicationRecord {
        name,
        display_name,
        window_class,
        executable,
        command_line: exec,
        icon,
    })
}

/// Remove `%f`-style field codes from an `Exec` value.
fn strip_field_codes(exec: &str) -> String {
    exec.split_whitespace()
        .filter(|word| !(word.len() == 2 && word.starts_with('%')))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentifierIndex;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    /// Create a unique temporary directory for each test.
    fn tmp_dir() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir().join(format!(
            "hyprview-apps-test-{}-{}",
            std::process::id(),
            id
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const NAUTILUS: &str = "\
[Desktop Entry]
Name=Files
Name[de]=Dateien
Exec=nautilus --new-window %U
Icon=org.gnome.Nautilus
StartupWMClass=org.gnome.Nautilus

[Desktop Action new-window]
Name=New Window
Exec=nautilus --new-window
";

    #[test]
    fn parses_main_group_only() {
        let app =
            parse_desktop_entry("org.gnome.Nautilus.desktop", NAUTILUS).unwrap();
        assert_eq!(app.name, "org.gnome.Nautilus");
        assert_eq!(app.display_name.as_deref(), Some("Files"));
        assert_eq!(app.window_class.as_deref(), Some("org.gnome.Nautilus"));
        assert_eq!(app.command_line.as_deref(), Some("nautilus --new-window"));
        assert_eq!(app.executable.as_deref(), Some("nautilus"));
        assert_eq!(app.icon.as_deref(), Some("org.gnome.Nautilus"));
    }

    #[test]
    fn try_exec_wins_over_exec() {
        let contents = "[Desktop Entry]\nName=Code\nTryExec=/usr/bin/code-oss\nExec=code %F\n";
        let app = parse_desktop_entry("code.desktop", contents).unwrap();
        assert_eq!(app.executable.as_deref(), Some("/usr/bin/code-oss"));
        assert_eq!(app.command_line.as_deref(), Some("code"));
    }

    #[test]
    fn no_desktop_entry_group_is_rejected() {
        assert!(parse_desktop_entry("a.desktop", "Name=Foo\nExec=foo\n").is_none());
        assert!(parse_desktop_entry("a.desktop", "[Desktop Entry]\nIcon=x\n").is_none());
    }

    #[test]
    fn hidden_entries_are_kept() {
        let contents = "[Desktop Entry]\nName=Helper\nExec=helper\nNoDisplay=true\n";
        assert!(parse_desktop_entry("helper.desktop", contents).is_some());
    }

    #[test]
    fn user_entries_shadow_system_entries() {
        let user = tmp_dir();
        let system = tmp_dir();
        std::fs::write(user.join("foot.desktop"), "[Desktop Entry]\nName=My Foot\nExec=foot\n")
            .unwrap();
        std::fs::write(system.join("foot.desktop"), "[Desktop Entry]\nName=Foot\nExec=foot\n")
            .unwrap();
        std::fs::write(system.join("kitty.desktop"), "[Desktop Entry]\nName=kitty\nExec=kitty\n")
            .unwrap();
        std::fs::write(system.join("README"), "not a desktop file").unwrap();

        let registry = DesktopEntryRegistry::with_dirs(vec![
            user.clone(),
            system.clone(),
            PathBuf::from("/nonexistent/hyprview"),
        ]);
        let apps = registry.applications().unwrap();
        assert_eq!(apps.len(), 2);
        let foot = apps.iter().find(|a| a.name == "foot").unwrap();
        assert_eq!(foot.display_name.as_deref(), Some("My Foot"));
        assert!(apps.iter().any(|a| a.name == "kitty"));

        let _ = std::fs::remove_dir_all(&user);
        let _ = std::fs::remove_dir_all(&system);
    }

    #[test]
    fn quoted_exec_path_with_space() {
        let contents = "[Desktop Entry]\nName=My Game\nExec=\"/opt/My Game/bin/mygame\" %U\n";
        let app = parse_desktop_entry("com.example.MyGame.desktop", contents).unwrap();
        assert_eq!(app.executable.as_deref(), Some("/opt/My Game/bin/mygame"));
        assert_eq!(app.executable_basename().as_deref(), Some("mygame"));
        assert_eq!(app.command_basename().as_deref(), Some("mygame"));

        let index = IdentifierIndex::build(vec![app]);
        assert_eq!(
            index.resolve("mygame").map(|a| a.name.as_str()),
            Some("com.example.MyGame")
        );
        assert!(index.resolve("my").is_none());
    }

    #[test]
    fn nested_entries_get_prefixed_ids() {
        let user = tmp_dir();
        let system = tmp_dir();
        let wine = user.join("wine/Programs");
        std::fs::create_dir_all(&wine).unwrap();
        std::fs::write(
            wine.join("Notepad++.desktop"),
            "[Desktop Entry]\nName=Notepad++\nExec=env WINEPREFIX=/w wine notepad++.exe\nStartupWMClass=notepad++.exe\n",
        )
        .unwrap();
        std::fs::create_dir_all(system.join("kde4")).unwrap();
        std::fs::write(system.join("kde4/kate.desktop"), "[Desktop Entry]\nName=Kate\nExec=kate\n")
            .unwrap();
        std::fs::write(system.join("kde4-kate.desktop"), "[Desktop Entry]\nName=Other\nExec=x\n")
            .unwrap();
        std::fs::create_dir_all(user.join("kde4")).unwrap();
        std::fs::write(user.join("kde4/kate.desktop"), "[Desktop Entry]\nName=My Kate\nExec=kate\n")
            .unwrap();

        let registry = DesktopEntryRegistry::with_dirs(vec![user.clone(), system.clone()]);
        let apps = registry.applications().unwrap();
        let names: Vec<&str> = apps.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["kde4-kate", "wine-Programs-Notepad++"]);
        assert_eq!(apps[0].display_name.as_deref(), Some("My Kate"));

        let _ = std::fs::remove_dir_all(&user);
        let _ = std::fs::remove_dir_all(&system);
    }

    #[test]
    fn no_readable_directory_is_an_error() {
        let registry = DesktopEntryRegistry::with_dirs(vec![
            PathBuf::from("/nonexistent/hyprview/a"),
            PathBuf::from("/nonexistent/hyprview/b"),
        ]);
        assert!(registry.applications().is_err());

        let empty = tmp_dir();
        let registry = DesktopEntryRegistry::with_dirs(vec![
            PathBuf::from("/nonexistent/hyprview/a"),
            empty.clone(),
        ]);
        assert!(registry.applications().unwrap().is_empty());
        let _ = std::fs::remove_dir_all(&empty);
    }

    #[test]
    fn field_codes_removed() {
        assert_eq!(strip_field_codes("foo %u --bar %F"), "foo --bar");
        assert_eq!(strip_field_codes("foo --percent=%50"), "foo --percent=%50");
    }
}
