//! Inputs that drive the overview.
//!
//! Two kinds of input reach the main loop over a single channel:
//!
//! * [`CompositorEvent`]s parsed from Hyprland's event socket, and
//! * [`ControlCommand`]s sent by external tools over the control socket.
//!
//! Both are wrapped in [`Input`] so every
//! [`EventSource`](crate::traits::EventSource) can share one sink.

use serde::{Deserialize, Serialize};

/// A named event from the compositor event stream.
///
/// Only the name matters to the overview; the payload is kept for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositorEvent {
    OpenWindow(String),
    CloseWindow(String),
    MoveWindow(String),
    /// Any other event, by name.
    Other { name: String, data: String },
}

impl CompositorEvent {
    /// Parse one `name>>payload` line.  Returns `None` for lines without the
    /// `>>` separator.
    pub fn parse(line: &str) -> Option<Self> {
        let (name, data) = line.trim_end_matches(['\r', '\n']).split_once(">>")?;
        let data = data.to_string();
        Some(match name {
            "openwindow" => CompositorEvent::OpenWindow(data),
            "closewindow" => CompositorEvent::CloseWindow(data),
            "movewindow" | "movewindowv2" => CompositorEvent::MoveWindow(data),
            _ => CompositorEvent::Other {
                name: name.to_string(),
                data,
            },
        })
    }

    /// Event name as it appears on the wire (the v2 move variant is folded
    /// into `movewindow`).
    pub fn name(&self) -> &str {
        match self {
            CompositorEvent::OpenWindow(_) => "openwindow",
            CompositorEvent::CloseWindow(_) => "closewindow",
            CompositorEvent::MoveWindow(_) => "movewindow",
            CompositorEvent::Other { name, .. } => name,
        }
    }

    /// Whether this event invalidates the overview.
    pub fn triggers_update(&self) -> bool {
        !matches!(self, CompositorEvent::Other { .. })
    }
}

/// Commands accepted on the control socket.
///
/// On the wire each command is a JSON string on its own line, e.g.
/// `"Toggle"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlCommand {
    /// Show the overview if hidden, hide it otherwise.
    Toggle,
    Show,
    Hide,
    /// Force a reconciliation pass.
    Refresh,
}

/// Everything the main loop reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Compositor(CompositorEvent),
    Control(ControlCommand),
}

impl From<CompositorEvent> for Input {
    fn from(e: CompositorEvent) -> Self {
        Input::Compositor(e)
    }
}

impl From<ControlCommand> for Input {
    fn from(c: ControlCommand) -> Self {
        Input::Control(c)
    }
}
