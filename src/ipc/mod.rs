//! Control socket for external tools.
//!
//! Key-bind helpers and scripts connect to the socket and send
//! newline-delimited JSON [`ControlCommand`](crate::event::ControlCommand)s
//! to show, hide, toggle or refresh the overview.

pub mod listener;
