//! The overview: reconciling compositor state into a workspace layout.
//!
//! A reconciliation pass has two halves:
//!
//! 1. [`fetch_snapshot`] enumerates installed applications and queries the
//!    compositor for monitors and clients.  This blocks on IPC and may run
//!    on a worker thread.
//! 2. [`Reconciler::apply_snapshot`] turns a [`Snapshot`] into a fresh
//!    [`OverviewState`], replacing the previous one wholesale.
//!
//! Nothing is diffed: every pass rebuilds every representation, so no
//! stale window survives a pass (and a moved window is simply rebuilt in
//! its new place).

pub mod drop_target;
pub mod layout;
pub mod representation;

use crate::apps::ApplicationRecord;
use crate::config::OverviewConfig;
use crate::identity::IdentifierIndex;
use crate::model::{Action, MonitorRecord, WindowRecord};
use crate::traits::{AppRegistry, Compositor, IconLookup};
pub use drop_target::DropTarget;
pub use layout::WorkspaceSlot;
use log::{debug, info, warn};
pub use representation::WindowRepresentation;
use std::collections::HashMap;
use std::fmt;

/// Errors that abort a reconciliation pass.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Querying the compositor failed (connection, reply, or JSON).
    #[error("compositor query failed: {0}")]
    Compositor(String),
    /// Enumerating applications failed.
    #[error("application registry failed: {0}")]
    Registry(String),
}

/// Everything one pass needs from the outside world.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub apps: Vec<ApplicationRecord>,
    pub monitors: Vec<MonitorRecord>,
    pub clients: Vec<WindowRecord>,
}

/// Gather a [`Snapshot`]: applications first, then monitors, then clients.
pub fn fetch_snapshot<C, R>(compositor: &C, registry: &R) -> Result<Snapshot, ReconcileError>
where
    C: Compositor + ?Sized,
    R: AppRegistry + ?Sized,
{
    let apps = registry
        .applications()
        .map_err(|e| ReconcileError::Registry(e.to_string()))?;
    let monitors = compositor
        .monitors()
        .map_err(|e| ReconcileError::Compositor(e.to_string()))?;
    let clients = compositor
        .clients()
        .map_err(|e| ReconcileError::Compositor(e.to_string()))?;
    Ok(Snapshot {
        apps,
        monitors,
        clients,
    })
}

/// Send `action` to the compositor.
pub fn dispatch<C: Compositor + ?Sized>(compositor: &C, action: &Action) -> Result<(), C::Error> {
    match action {
        Action::Focus(address) => compositor.focus_window(address),
        Action::Close(address) => compositor.close_window(address),
        Action::MoveToWorkspace {
            address,
            workspace_id,
        } => compositor.move_window_to_workspace_silent(address, *workspace_id),
    }
}

/// The result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewState {
    /// Workspaces `1..=workspace_count`, in id order.
    pub slots: Vec<WorkspaceSlot>,
    /// Sequence number of the pass that built this state.
    pub generation: u64,
}

impl OverviewState {
    /// Workspace with `id`, if it is shown.
    pub fn slot(&self, id: i32) -> Option<&WorkspaceSlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    /// Slots grouped by row, top to bottom.
    pub fn rows(&self) -> Vec<Vec<&WorkspaceSlot>> {
        let mut rows: Vec<Vec<&WorkspaceSlot>> = Vec::new();
        for slot in &self.slots {
            if rows.len() <= slot.row {
                rows.resize_with(slot.row + 1, Vec::new);
            }
            rows[slot.row].push(slot);
        }
        rows
    }

    /// All representations, workspace by workspace.
    pub fn representations(&self) -> impl Iterator<Item = &WindowRepresentation> {
        self.slots.iter().flat_map(|s| s.windows.iter())
    }

    /// Representation of the window with `address`.
    pub fn representation(&self, address: &str) -> Option<&WindowRepresentation> {
        self.representations().find(|r| r.address == address)
    }

    /// Number of representations.
    pub fn window_count(&self) -> usize {
        self.slots.iter().map(|s| s.windows.len()).sum()
    }

    /// Drop target of workspace `id`, if it is shown.
    pub fn drop_target(&self, id: i32) -> Option<DropTarget> {
        self.slot(id).map(|s| DropTarget::new(s.id))
    }
}

impl fmt::Display for OverviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for slot in &self.slots {
            writeln!(f, "[row {}] {} ({} windows)", slot.row, slot.label, slot.windows.len())?;
            for w in &slot.windows {
                writeln!(
                    f,
                    "    {} {:?} class={} at=({:.1}, {:.1}) size={:.1}x{:.1} icon={:?}",
                    w.address,
                    w.title,
                    w.app_id,
                    w.position.0,
                    w.position.1,
                    w.size.0,
                    w.size.1,
                    w.icon.tier,
                )?;
            }
        }
        Ok(())
    }
}

/// Build an [`OverviewState`] from a snapshot.
///
/// Windows on special workspaces (id `<= 0`) and on workspaces beyond
/// `workspace_count` get no representation.
pub fn build_state(
    snapshot: Snapshot,
    icons: &dyn IconLookup,
    config: &OverviewConfig,
    generation: u64,
) -> OverviewState {
    let index = IdentifierIndex::build(snapshot.apps);
    let monitors: HashMap<i64, &MonitorRecord> =
        snapshot.monitors.iter().map(|m| (m.id, m)).collect();

    let mut slots: Vec<WorkspaceSlot> = (1..=config.workspace_count)
        .map(|id| WorkspaceSlot::new(id, config.workspaces_per_row))
        .collect();

    for window in &snapshot.clients {
        if !window.on_regular_workspace() {
            continue;
        }
        let Some(slot) = slots.get_mut((window.workspace_id - 1) as usize) else {
            debug!(
                "window {} is on workspace {}, outside the overview",
                window.address, window.workspace_id
            );
            continue;
        };
        let monitor = monitors.get(&window.monitor_id).copied();
        if monitor.is_none() {
            debug!(
                "window {} is on unknown monitor {}",
                window.address, window.monitor_id
            );
        }
        let app = index.resolve(&window.initial_class);
        slot.windows
            .push(WindowRepresentation::new(window, monitor, app, icons, config));
    }

    OverviewState { slots, generation }
}

/// Owns the current [`OverviewState`] and replaces it on every pass.
///
/// The reconciler lives on the UI thread; it holds the icon lookup (which
/// may wrap a toolkit icon theme) but not the compositor, so the blocking
/// half of a pass can run elsewhere.
pub struct Reconciler {
    config: OverviewConfig,
    icons: Box<dyn IconLookup>,
    state: Option<OverviewState>,
    passes: u64,
}

impl Reconciler {
    pub fn new(config: OverviewConfig, icons: Box<dyn IconLookup>) -> Self {
        Self {
            config,
            icons,
            state: None,
            passes: 0,
        }
    }

    /// The state of the last successful pass.
    pub fn state(&self) -> Option<&OverviewState> {
        self.state.as_ref()
    }

    pub fn config(&self) -> &OverviewConfig {
        &self.config
    }

    pub fn icons(&self) -> &dyn IconLookup {
        self.icons.as_ref()
    }

    /// Run a full pass synchronously.  On failure the previous state is
    /// kept and the error returned.
    pub fn update<C, R>(&mut self, compositor: &C, registry: &R) -> Result<&OverviewState, ReconcileError>
    where
        C: Compositor + ?Sized,
        R: AppRegistry + ?Sized,
    {
        let snapshot = fetch_snapshot(compositor, registry)?;
        Ok(self.apply_snapshot(snapshot))
    }

    /// Like [`update`](Self::update) but logs failures and returns whatever
    /// state is current afterwards.
    pub fn refresh<C, R>(&mut self, compositor: &C, registry: &R) -> Option<&OverviewState>
    where
        C: Compositor + ?Sized,
        R: AppRegistry + ?Sized,
    {
        match fetch_snapshot(compositor, registry) {
            Ok(snapshot) => Some(self.apply_snapshot(snapshot)),
            Err(e) => {
                warn!("overview pass skipped, keeping previous state: {}", e);
                self.state.as_ref()
            }
        }
    }

    /// Tear down the current state and build a new one from `snapshot`.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> &OverviewState {
        if let Some(old) = self.state.take() {
            debug!(
                "tearing down {} representations of pass {}",
                old.window_count(),
                old.generation
            );
        }
        self.passes += 1;
        let state = build_state(snapshot, self.icons.as_ref(), &self.config, self.passes);
        info!(
            "overview pass {}: {} windows",
            state.generation,
            state.window_count()
        );
        self.state.insert(state)
    }
}
