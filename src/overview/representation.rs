//! Interactive stand-in for one live window.
//!
//! A [`WindowRepresentation`] is plain data plus the input handlers of the
//! overview button: primary click focuses, secondary click or
//! Shift+Enter/Space closes, and dragging carries the window address as a
//! plain-text payload.  Handlers return an [`Action`]; dispatching it is the
//! controller's job.

use super::layout::{display_position, display_size};
use crate::apps::ApplicationRecord;
use crate::config::OverviewConfig;
use crate::icon::{resolve_icon, ResolvedIcon};
use crate::model::{Action, MonitorRecord, Transform, WindowRecord};
use crate::traits::IconLookup;

/// Pointer button numbers as reported by toolkits.
pub const PRIMARY_BUTTON: u32 = 1;
pub const SECONDARY_BUTTON: u32 = 3;

/// Keys the representation reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Return,
    KpEnter,
    Space,
    Other,
}

/// Modifier state of a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowRepresentation {
    pub address: String,
    pub title: String,
    /// Initial window class; the identifier used for icon lookups.
    pub app_id: String,
    /// Resolved application, if any.
    pub app: Option<ApplicationRecord>,
    /// Scaled size `(width, height)`.
    pub size: (f64, f64),
    /// Scaled position inside the workspace container.
    pub position: (f64, f64),
    pub transform: Transform,
    pub icon: ResolvedIcon,
}

impl WindowRepresentation {
    /// Build the representation of `window`.
    ///
    /// An unknown monitor is treated as an unrotated monitor at the origin.
    pub fn new(
        window: &WindowRecord,
        monitor: Option<&MonitorRecord>,
        app: Option<&ApplicationRecord>,
        icons: &dyn IconLookup,
        config: &OverviewConfig,
    ) -> Self {
        let (origin, transform) = monitor
            .map(|m| ((m.x, m.y), m.transform))
            .unwrap_or(((0, 0), Transform::Normal));
        let size = display_size(window.size, config.scale);
        let position = display_position(window.at, origin, config.scale);
        let icon_edge = icon_edge(oriented(size, transform), config.icon_factor);

        Self {
            address: window.address.clone(),
            title: window.title.clone(),
            app_id: window.initial_class.clone(),
            app: app.cloned(),
            size,
            position,
            transform,
            icon: resolve_icon(app, &window.initial_class, icon_edge, icons),
        }
    }

    /// Size used for icon sizing: width and height swap on monitors rotated
    /// by a quarter turn.  Placement keeps using [`size`](Self::size).
    pub fn icon_box(&self) -> (f64, f64) {
        oriented(self.size, self.transform)
    }

    /// Resolve the icon drawn over a full-size window preview, through the
    /// same fallback chain as the main icon.
    pub fn overlay_icon(&self, icons: &dyn IconLookup, icon_factor: f64) -> ResolvedIcon {
        let edge = icon_edge(self.icon_box(), icon_factor);
        resolve_icon(self.app.as_ref(), &self.app_id, edge, icons)
    }

    /// Tooltip text.
    pub fn tooltip(&self) -> &str {
        &self.title
    }

    /// Plain-text drag payload.
    pub fn drag_payload(&self) -> &str {
        &self.address
    }

    /// Primary activation (click) focuses the window.
    pub fn on_primary_activate(&self) -> Action {
        Action::Focus(self.address.clone())
    }

    /// Secondary activation (right click) closes the window.
    pub fn on_secondary_activate(&self) -> Action {
        Action::Close(self.address.clone())
    }

    /// Map a pointer button press to an action.  Only the secondary button
    /// acts on press; the primary button acts on release via
    /// [`on_primary_activate`](Self::on_primary_activate).
    pub fn on_button_press(&self, button: u32) -> Option<Action> {
        (button == SECONDARY_BUTTON).then(|| self.on_secondary_activate())
    }

    /// Shift + Return / KP_Enter / Space closes the window.  Returns `None`
    /// for every other key so the toolkit can keep handling it.
    pub fn on_close_shortcut(&self, key: Key, modifiers: Modifiers) -> Option<Action> {
        let confirm = matches!(key, Key::Return | Key::KpEnter | Key::Space);
        (modifiers.shift && confirm).then(|| Action::Close(self.address.clone()))
    }
}

fn oriented(size: (f64, f64), transform: Transform) -> (f64, f64) {
    if transform.swaps_axes() {
        (size.1, size.0)
    } else {
        size
    }
}

/// Icon edge for a box: `min(w, h) * factor`, truncated, at least 1px.
pub fn icon_edge(size: (f64, f64), factor: f64) -> u32 {
    let edge = (size.0.min(size.1) * factor).floor();
    if edge.is_finite() && edge >= 1.0 {
        edge as u32
    } else {
        1
    }
}
