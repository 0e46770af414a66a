//! Core traits that decouple hyprview from any specific compositor, input
//! transport, application registry or icon theme.
//!
//! The [`Reconciler`](crate::overview::Reconciler) and the
//! [`OverviewDriver`](crate::driver::OverviewDriver) only depend on these
//! abstractions; concrete implementations live in [`hyprland`](crate::hyprland),
//! [`ipc`](crate::ipc), [`apps`](crate::apps) and [`icon`](crate::icon).

use crate::apps::ApplicationRecord;
use crate::event::Input;
use crate::icon::Icon;
use crate::model::{MonitorRecord, WindowRecord};
use std::sync::mpsc;

/// Abstraction over a compositor that can be queried for windows and
/// monitors and told to focus, close or move a window.
///
/// Queries are blocking; callers that must not block (the UI thread) run
/// them through the [`OverviewDriver`](crate::driver::OverviewDriver).
pub trait Compositor {
    /// The error type produced by this compositor.
    type Error: std::error::Error + Send + 'static;

    /// Return every monitor the compositor knows about.
    fn monitors(&self) -> Result<Vec<MonitorRecord>, Self::Error>;

    /// Return every open window, including those on special workspaces.
    fn clients(&self) -> Result<Vec<WindowRecord>, Self::Error>;

    /// Focus the window with `address`.
    fn focus_window(&self, address: &str) -> Result<(), Self::Error>;

    /// Ask the window with `address` to close.
    fn close_window(&self, address: &str) -> Result<(), Self::Error>;

    /// Move the window with `address` to `workspace_id` without moving
    /// focus along with it.
    ///
    /// An address that no longer exists is the compositor's problem; no
    /// liveness check is made here.
    fn move_window_to_workspace_silent(
        &self,
        address: &str,
        workspace_id: i32,
    ) -> Result<(), Self::Error>;
}

/// The installed-application registry.
pub trait AppRegistry {
    /// The error type produced by this registry.
    type Error: std::error::Error + Send + 'static;

    /// Enumerate installed applications.  Called once per reconciliation
    /// pass; nothing is cached between calls.
    fn applications(&self) -> Result<Vec<ApplicationRecord>, Self::Error>;
}

/// A source of icons keyed by name and desired pixel size.
pub trait IconLookup {
    /// Look up `name` (a themed icon name or an absolute path) at `size`
    /// pixels.  `None` means the icon is unknown.
    fn lookup(&self, name: &str, size: u32) -> Option<Icon>;
}

/// A source of [`Input`]s.
///
/// Implementations listen on some transport (Hyprland's event socket, the
/// control socket, a test harness) and forward parsed inputs into the
/// provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](EventSource::run) **blocks** until the source is exhausted,
///   the sink is closed, or an unrecoverable error occurs.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait EventSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Input`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Input>) -> Result<(), Self::Error>;
}
