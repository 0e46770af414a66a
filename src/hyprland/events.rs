//! [`EventSource`] reading Hyprland's event socket.
//!
//! Hyprland broadcasts one `name>>payload` line per event on
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket2.sock`.
//! Only events that change the window layout are forwarded; the rest are
//! dropped here so the main loop is not woken for every focus change.

use super::{socket_dir, HyprlandError};
use crate::event::{CompositorEvent, Input};
use crate::traits::EventSource;
use log::{debug, info, trace};
use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::sync::mpsc;

/// Errors produced while reading the event socket.
#[derive(Debug, thiserror::Error)]
pub enum EventStreamError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Socket(#[from] HyprlandError),
}

#[derive(Debug, Default)]
pub struct HyprlandEventStream {
    socket: Option<PathBuf>,
}

impl HyprlandEventStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read events from an explicit socket path.
    pub fn with_socket(path: impl Into<PathBuf>) -> Self {
        Self {
            socket: Some(path.into()),
        }
    }

    fn socket_path(&self) -> Result<PathBuf, HyprlandError> {
        match &self.socket {
            Some(p) => Ok(p.clone()),
            None => Ok(socket_dir()?.join(".socket2.sock")),
        }
    }
}

impl EventSource for HyprlandEventStream {
    type Error = EventStreamError;

    /// Connect and forward layout events until the compositor closes the
    /// socket or the sink is dropped.
    ///
    /// This method **blocks**.  Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Input>) -> Result<(), EventStreamError> {
        let path = self.socket_path()?;
        let stream = UnixStream::connect(&path)?;
        info!("reading compositor events from {}", path.display());

        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            // Window titles are not guaranteed to be UTF-8.
            let line = String::from_utf8_lossy(&buf);
            let Some(event) = CompositorEvent::parse(&line) else {
                debug!("ignoring malformed event line {:?}", line);
                continue;
            };
            if !event.triggers_update() {
                trace!("event {}", event.name());
                continue;
            }
            if sink.send(event.into()).is_err() {
                info!("sink closed, shutting down");
                return Ok(());
            }
        }
        info!("compositor closed the event socket");
        Ok(())
    }
}
