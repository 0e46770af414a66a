//! Data types shared by every part of hyprview.
//!
//! [`WindowRecord`] and [`MonitorRecord`] are snapshots of compositor state,
//! [`Transform`] describes monitor rotation, and [`Action`] is the vocabulary
//! of user intents a window representation or drop target can emit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monitor rotation code as reported by the compositor.
///
/// Hyprland reports `0..=7`; codes `4..=7` are the flipped variants of
/// `0..=3` and rotate the same way, so the code is taken modulo 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transform {
    #[default]
    Normal,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Transform {
    /// Build a transform from the raw compositor code.
    pub fn from_code(code: i64) -> Self {
        match code.rem_euclid(4) {
            1 => Transform::Rotate90,
            2 => Transform::Rotate180,
            3 => Transform::Rotate270,
            _ => Transform::Normal,
        }
    }

    /// Whether this rotation swaps width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Transform::Rotate90 | Transform::Rotate270)
    }
}

/// A physical or logical display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorRecord {
    pub id: i64,
    /// X origin on the virtual desktop (pixels).
    pub x: i32,
    /// Y origin on the virtual desktop (pixels).
    pub y: i32,
    pub transform: Transform,
}

/// A live compositor window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRecord {
    /// Opaque address, unique among currently open windows (e.g. `"0x55d0c1a0"`).
    pub address: String,
    pub title: String,
    /// Class the window had when it was mapped.
    pub initial_class: String,
    /// Pixel size `(width, height)`.
    pub size: (i32, i32),
    /// Pixel position `(x, y)` on the virtual desktop.
    pub at: (i32, i32),
    /// Owning workspace.  Ids `<= 0` are special workspaces.
    pub workspace_id: i32,
    /// Owning monitor id.
    pub monitor_id: i64,
}

impl WindowRecord {
    /// Whether the window lives on a regular (numbered, positive) workspace.
    pub fn on_regular_workspace(&self) -> bool {
        self.workspace_id > 0
    }
}

/// Something the user asked the compositor to do from the overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Focus the window with this address.
    Focus(String),
    /// Close the window with this address.
    Close(String),
    /// Move the window to a workspace without following it.
    MoveToWorkspace { address: String, workspace_id: i32 },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Focus(address) => write!(f, "focus {}", address),
            Action::Close(address) => write!(f, "close {}", address),
            Action::MoveToWorkspace {
                address,
                workspace_id,
            } => write!(f, "move {} to workspace {}", address, workspace_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_codes() {
        assert_eq!(Transform::from_code(0), Transform::Normal);
        assert_eq!(Transform::from_code(1), Transform::Rotate90);
        assert_eq!(Transform::from_code(2), Transform::Rotate180);
        assert_eq!(Transform::from_code(3), Transform::Rotate270);
        // Flipped variants rotate like their base.
        assert_eq!(Transform::from_code(5), Transform::Rotate90);
        assert_eq!(Transform::from_code(7), Transform::Rotate270);
    }

    #[test]
    fn only_quarter_turns_swap_axes() {
        assert!(!Transform::Normal.swaps_axes());
        assert!(Transform::Rotate90.swaps_axes());
        assert!(!Transform::Rotate180.swaps_axes());
        assert!(Transform::Rotate270.swaps_axes());
    }

    #[test]
    fn special_workspaces_are_not_regular() {
        let mut w = WindowRecord {
            address: "0x1".into(),
            title: "t".into(),
            initial_class: "foot".into(),
            size: (100, 100),
            at: (0, 0),
            workspace_id: -98,
            monitor_id: 0,
        };
        assert!(!w.on_regular_workspace());
        w.workspace_id = 0;
        assert!(!w.on_regular_workspace());
        w.workspace_id = 1;
        assert!(w.on_regular_workspace());
    }

    #[test]
    fn action_display() {
        assert_eq!(Action::Focus("0x1".into()).to_string(), "focus 0x1");
        assert_eq!(Action::Close("0x1".into()).to_string(), "close 0x1");
        assert_eq!(
            Action::MoveToWorkspace {
                address: "0x1".into(),
                workspace_id: 3
            }
            .to_string(),
            "move 0x1 to workspace 3"
        );
    }
}
