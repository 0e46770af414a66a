//! Per-workspace drop target.

use crate::model::Action;

/// Accepts a dragged window address and turns it into a silent move to
/// its workspace.
///
/// The address is not checked against live windows: moving a window that
/// closed mid-drag is a no-op on the compositor side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    pub workspace_id: i32,
}

impl DropTarget {
    pub fn new(workspace_id: i32) -> Self {
        Self { workspace_id }
    }

    /// Handle a dropped plain-text payload.  Empty payloads are rejected.
    pub fn on_drop(&self, payload: &str) -> Option<Action> {
        let address = payload.trim();
        if address.is_empty() {
            return None;
        }
        Some(Action::MoveToWorkspace {
            address: address.to_string(),
            workspace_id: self.workspace_id,
        })
    }
}
