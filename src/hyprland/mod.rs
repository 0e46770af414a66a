//! Hyprland-specific implementations.
//!
//! This module provides concrete backends for the
//! [`Compositor`](crate::traits::Compositor) and
//! [`EventSource`](crate::traits::EventSource) traits, powered by
//! Hyprland's IPC sockets.
//!
//! Nothing outside this module should reference Hyprland directly.

pub mod events;
pub mod ipc;

use std::path::PathBuf;

/// Errors produced by the Hyprland backend.
#[derive(Debug, thiserror::Error)]
#[error("hyprland ipc: {0}")]
pub struct HyprlandError(pub String);

/// `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE`, where both of
/// Hyprland's sockets live.
pub(crate) fn socket_dir() -> Result<PathBuf, HyprlandError> {
    let runtime = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandError("XDG_RUNTIME_DIR not set".into()))?;
    let sig = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(runtime).join("hypr").join(sig))
}
