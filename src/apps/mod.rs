//! Installed applications.
//!
//! [`ApplicationRecord`] is the canonical identity of an installed
//! application.  Records are produced by an
//! [`AppRegistry`](crate::traits::AppRegistry); the default one reads XDG
//! desktop entries (see [`desktop`]).

pub mod desktop;

use crate::icon::Icon;
use crate::traits::IconLookup;

/// Canonical identity of an installed application.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplicationRecord {
    /// Primary name, e.g. the desktop-file id `org.gnome.Nautilus`.
    pub name: String,
    /// Human-readable name, e.g. `Files`.
    pub display_name: Option<String>,
    /// Window-class hint (`StartupWMClass`).
    pub window_class: Option<String>,
    /// Path or name of the executable.
    pub executable: Option<String>,
    /// Command line used to launch the application.
    pub command_line: Option<String>,
    /// Icon name or absolute icon path.
    pub icon: Option<String>,
}

impl ApplicationRecord {
    /// Lower-cased last path component of the executable.
    pub fn executable_basename(&self) -> Option<String> {
        self.executable.as_deref().and_then(basename)
    }

    /// Lower-cased last path component of the first word of the command
    /// line (arguments dropped).
    pub fn command_basename(&self) -> Option<String> {
        self.command_line
            .as_deref()
            .and_then(program)
            .as_deref()
            .and_then(basename)
    }

    /// The application's own icon at `size` pixels, if it has one the
    /// lookup knows.
    pub fn icon_at(&self, icons: &dyn IconLookup, size: u32) -> Option<Icon> {
        let name = self.icon.as_deref().filter(|n| !n.is_empty())?;
        icons.lookup(name, size)
    }
}

/// Split an `Exec` command line into arguments.
///
/// Arguments are separated by unquoted whitespace.  Inside double quotes a
/// backslash escapes `"`, `` ` ``, `$` and `\`; outside quotes it escapes
/// the next character.
pub fn exec_arguments(cmd: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut started = false;
    let mut quoted = false;
    let mut chars = cmd.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                quoted = !quoted;
                started = true;
            }
            '\\' if quoted => match chars.peek() {
                Some(&next @ ('"' | '`' | '$' | '\\')) => {
                    current.push(next);
                    chars.next();
                }
                _ => current.push(c),
            },
            '\\' => {
                current.push(chars.next().unwrap_or(c));
                started = true;
            }
            c if c.is_whitespace() && !quoted => {
                if started {
                    args.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }
    if started {
        args.push(current);
    }
    args
}

/// The program of an `Exec` command line, unquoted.
pub fn program(cmd: &str) -> Option<String> {
    exec_arguments(cmd)
        .into_iter()
        .next()
        .filter(|p| !p.is_empty())
}

fn basename(path: &str) -> Option<String> {
    let base = path.rsplit('/').next()?;
    if base.is_empty() {
        None
    } else {
        Some(base.to_lowercase())
    }
}
