//! **hyprview**: a workspace overview for Hyprland.
//!
//! Every open window is shown as a small icon button, placed at its
//! scaled-down position inside a box for its workspace.  Workspaces are
//! laid out in rows.  Clicking a button focuses the window, right-click
//! or Shift+Enter closes it, and dragging it onto another workspace moves
//! the window there.
//!
//! # Architecture
//!
//! The crate is organised around a few core traits:
//!
//! * [`traits::Compositor`]: queries windows and monitors and performs
//!   focus / close / move, so the overview is not coupled to Hyprland.
//! * [`traits::EventSource`]: abstracts the transports that deliver
//!   compositor events and control commands.
//! * [`traits::AppRegistry`] and [`traits::IconLookup`]: the installed
//!   applications and the icon theme.
//!
//! A reconciliation pass ([`overview`]) rebuilds the whole
//! [`OverviewState`](overview::OverviewState) from a fresh snapshot; the
//! [`driver`] runs the blocking half off the UI thread and coalesces
//! bursts of events.  [`view`] turns the state into a declarative widget
//! tree that a renderer ([`render`]) draws.
//!
//! Concrete implementations live in [`hyprland`] (Hyprland IPC),
//! [`ipc`] (control socket), [`apps`] (desktop entries) and [`icon`].

pub mod apps;
pub mod config;
pub mod driver;
pub mod event;
pub mod hyprland;
pub mod icon;
pub mod identity;
pub mod ipc;
pub mod model;
pub mod overview;
pub mod render;
pub mod scheduler;
pub mod traits;
pub mod view;

#[cfg(test)]
mod test_support;
