//! Miniature spatial layout.
//!
//! Windows are drawn at `scale` times their real size, positioned relative
//! to the origin of the monitor they are on.  Workspaces `1..=count` are
//! split into rows of `per_row`.

use super::representation::WindowRepresentation;

/// Scaled display size of a window.
pub fn display_size(size: (i32, i32), scale: f64) -> (f64, f64) {
    (size.0 as f64 * scale, size.1 as f64 * scale)
}

/// Scaled position of a window relative to its monitor's origin.
///
/// The absolute distance is used, so a window left of or above its
/// monitor's origin still lands inside the preview.
pub fn display_position(at: (i32, i32), origin: (i32, i32), scale: f64) -> (f64, f64) {
    let dx = (at.0 as i64 - origin.0 as i64).abs();
    let dy = (at.1 as i64 - origin.1 as i64).abs();
    (dx as f64 * scale, dy as f64 * scale)
}

/// Row (0-indexed) a workspace is placed in.
pub fn row_for(workspace_id: i32, per_row: i32) -> usize {
    let per_row = per_row.max(1);
    ((workspace_id.max(1) - 1) / per_row) as usize
}

/// Label shown above a workspace.
pub fn workspace_label(workspace_id: i32) -> String {
    format!("Workspace {}", workspace_id)
}

/// One numbered workspace in the overview.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceSlot {
    pub id: i32,
    pub row: usize,
    pub label: String,
    /// Representations placed in this workspace, in compositor order.
    pub windows: Vec<WindowRepresentation>,
}

impl WorkspaceSlot {
    pub fn new(id: i32, per_row: i32) -> Self {
        Self {
            id,
            row: row_for(id, per_row),
            label: workspace_label(id),
            windows: Vec::new(),
        }
    }

    /// An empty slot renders a placeholder drop target.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
