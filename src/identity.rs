//! Mapping window identifiers to installed applications.
//!
//! An [`IdentifierIndex`] is built from one registry snapshot and answers
//! "which application owns this window class?".  Lookup walks the fixed
//! [`RESOLUTION_ORDER`] of [`LookupStrategy`]s; the first strategy that
//! finds a record wins.
//!
//! Matching is case-insensitive but never substring-based: a window class
//! like `com.example.App.Devel` must not resolve to `com.example.App`.

use crate::apps::ApplicationRecord;
use std::collections::HashMap;

/// Suffixes stripped by [`normalize_class`], tried in this order.
pub const CLASS_SUFFIXES: [&str; 5] = [".bin", ".exe", ".so", "-bin", "-gtk"];

/// One way of matching an identifier to an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupStrategy {
    /// Lower-cased identifier found in the index.
    IndexExact,
    /// Identifier with a known suffix stripped found in the index.
    NormalizedClass,
    /// Scan: identifier equals an application's primary name.
    ExactName,
    /// Scan: identifier equals an application's window-class hint.
    ExactClass,
    /// Scan: identifier equals an application's display name.
    ExactDisplayName,
    /// Scan: identifier equals the executable's basename.
    ExecutableBasename,
    /// Scan: identifier equals the command line's basename.
    CommandBasename,
}

impl LookupStrategy {
    /// Whether this strategy is a per-application scan rather than an index
    /// lookup.
    pub fn is_scan(self) -> bool {
        !matches!(self, LookupStrategy::IndexExact | LookupStrategy::NormalizedClass)
    }
}

/// Resolution precedence.  Index lookups come first; the scan strategies
/// are applied to each application in registry order, so the first
/// application matching any of them wins.
pub const RESOLUTION_ORDER: [LookupStrategy; 7] = [
    LookupStrategy::IndexExact,
    LookupStrategy::NormalizedClass,
    LookupStrategy::ExactName,
    LookupStrategy::ExactClass,
    LookupStrategy::ExactDisplayName,
    LookupStrategy::ExecutableBasename,
    LookupStrategy::CommandBasename,
];

/// Lower-case `class` and strip the first matching suffix from
/// [`CLASS_SUFFIXES`].  Only one suffix is ever removed.
pub fn normalize_class(class: &str) -> String {
    let lower = class.to_lowercase();
    for suffix in CLASS_SUFFIXES {
        if let Some(stripped) = lower.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    lower
}

/// A successful lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub app: &'a ApplicationRecord,
    pub strategy: LookupStrategy,
}

/// Case-insensitive identifier → application lookup table.
///
/// Keys are the lower-cased name, display name, window class, executable
/// basename and command basename of every record.  When two records share
/// a key the one inserted last wins; since registry order depends on the
/// filesystem, which record that is should be treated as unspecified.
#[derive(Debug, Clone, Default)]
pub struct IdentifierIndex {
    apps: Vec<ApplicationRecord>,
    keys: HashMap<String, usize>,
}

impl IdentifierIndex {
    /// Build an index over `apps`.
    pub fn build(apps: Vec<ApplicationRecord>) -> Self {
        let mut keys = HashMap::new();
        for (i, app) in apps.iter().enumerate() {
            let candidates = [
                Some(app.name.to_lowercase()),
                app.display_name.as_ref().map(|s| s.to_lowercase()),
                app.window_class.as_ref().map(|s| s.to_lowercase()),
                app.executable_basename(),
                app.command_basename(),
            ];
            for key in candidates.into_iter().flatten() {
                if !key.is_empty() {
                    keys.insert(key, i);
                }
            }
        }
        Self { apps, keys }
    }

    /// Number of applications in the snapshot.
    pub fn len(&self) -> usize {
        self.apps.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// The applications the index was built from, in registry order.
    pub fn applications(&self) -> &[ApplicationRecord] {
        &self.apps
    }

    /// Resolve `identifier` to an application.
    pub fn resolve(&self, identifier: &str) -> Option<&ApplicationRecord> {
        self.resolve_with_strategy(identifier).map(|r| r.app)
    }

    /// Resolve `identifier` and report which strategy matched.
    pub fn resolve_with_strategy(&self, identifier: &str) -> Option<Resolution<'_>> {
        if identifier.trim().is_empty() {
            return None;
        }
        let lower = identifier.to_lowercase();
        let normalized = normalize_class(&lower);

        for strategy in RESOLUTION_ORDER.iter().copied().filter(|s| !s.is_scan()) {
            let key = match strategy {
                LookupStrategy::IndexExact => &lower,
                _ => &normalized,
            };
            if let Some(&i) = self.keys.get(key) {
                return Some(Resolution {
                    app: &self.apps[i],
                    strategy,
                });
            }
        }

        self.apps.iter().find_map(|app| {
            RESOLUTION_ORDER
                .iter()
                .copied()
                .filter(|s| s.is_scan())
                .find(|s| scan_matches(*s, app, &lower))
                .map(|strategy| Resolution { app, strategy })
        })
    }
}

fn scan_matches(strategy: LookupStrategy, app: &ApplicationRecord, lower: &str) -> bool {
    let eq = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase() == lower);
    match strategy {
        LookupStrategy::ExactName => eq(Some(&app.name)),
        LookupStrategy::ExactClass => eq(app.window_class.as_deref()),
        LookupStrategy::ExactDisplayName => eq(app.display_name.as_deref()),
        LookupStrategy::ExecutableBasename => app.executable_basename().as_deref() == Some(lower),
        LookupStrategy::CommandBasename => app.command_basename().as_deref() == Some(lower),
        LookupStrategy::IndexExact | LookupStrategy::NormalizedClass => false,
    }
}
