//! Declarative widget tree handed to the rendering host.
//!
//! [`build_view`] turns an [`OverviewState`] into a [`Node`] tree made of
//! boxes, labels, drop zones and absolutely placed window buttons.  The
//! tree carries no toolkit types; a renderer walks it and creates one
//! widget per node.  The whole tree is rebuilt on every pass.

use crate::config::OverviewConfig;
use crate::overview::{DropTarget, OverviewState, WindowRepresentation, WorkspaceSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A child of a [`Node::Fixed`] container at an absolute offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Placed {
    pub x: f64,
    pub y: f64,
    pub node: Node,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Container {
        orientation: Orientation,
        spacing: i32,
        /// Whether the container should take all space offered to it.
        expand: bool,
        css_class: &'static str,
        children: Vec<Node>,
    },
    Label {
        text: String,
        css_class: &'static str,
    },
    /// Absolute-positioning container, sized to fit its children.
    Fixed {
        width: f64,
        height: f64,
        children: Vec<Placed>,
    },
    /// Accepts dropped window addresses on behalf of one workspace.
    DropZone {
        target: DropTarget,
        child: Box<Node>,
    },
    /// Clickable, draggable stand-in for one window.
    Window(WindowRepresentation),
}

impl Node {
    /// Visit this node and every descendant, depth first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        match self {
            Node::Container { children, .. } => {
                for child in children {
                    child.walk(f);
                }
            }
            Node::Fixed { children, .. } => {
                for placed in children {
                    placed.node.walk(f);
                }
            }
            Node::DropZone { child, .. } => child.walk(f),
            Node::Label { .. } | Node::Window(_) => {}
        }
    }
}

/// Build the tree for `state`: a vertical stack of rows, each a horizontal
/// run of workspaces.
pub fn build_view(state: &OverviewState, config: &OverviewConfig) -> Node {
    let rows = state
        .rows()
        .into_iter()
        .map(|slots| Node::Container {
            orientation: Orientation::Horizontal,
            spacing: config.spacing,
            expand: true,
            css_class: "overview-row",
            children: slots.into_iter().map(|s| workspace_node(s, config)).collect(),
        })
        .collect();

    Node::Container {
        orientation: Orientation::Vertical,
        spacing: config.spacing,
        expand: true,
        css_class: "overview",
        children: rows,
    }
}

fn workspace_node(slot: &WorkspaceSlot, config: &OverviewConfig) -> Node {
    let content = if slot.is_empty() {
        Node::Label {
            text: config.placeholder.clone(),
            css_class: "placeholder",
        }
    } else {
        windows_node(&slot.windows)
    };

    Node::Container {
        orientation: Orientation::Vertical,
        spacing: 0,
        expand: true,
        css_class: "workspace",
        children: vec![
            Node::Label {
                text: slot.label.clone(),
                css_class: "workspace-label",
            },
            Node::DropZone {
                target: DropTarget::new(slot.id),
                child: Box::new(content),
            },
        ],
    }
}

fn windows_node(windows: &[WindowRepresentation]) -> Node {
    let width = windows
        .iter()
        .map(|w| w.position.0 + w.size.0)
        .fold(0.0, f64::max);
    let height = windows
        .iter()
        .map(|w| w.position.1 + w.size.1)
        .fold(0.0, f64::max);

    Node::Fixed {
        width,
        height,
        children: windows
            .iter()
            .map(|w| Placed {
                x: w.position.0,
                y: w.position.1,
                node: Node::Window(w.clone()),
            })
            .collect(),
    }
}
