//! Rendering hosts for the overview's [`Node`](crate::view::Node) tree.
//!
//! When the `overview-gtk` feature is enabled, the
//! [`gtk::run_main_loop`] function takes over the main thread and
//! drives both input processing and rendering through the GLib main loop.

#[cfg(feature = "overview-gtk")]
pub mod gtk;
