//! [`Compositor`] implementation backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its Unix socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`,
//! without spawning `hyprctl`.

use super::{socket_dir, HyprlandError};
use crate::model::{MonitorRecord, Transform, WindowRecord};
use crate::traits::Compositor;
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Hyprland-backed compositor.
///
/// No connection is held open; every method call opens a short-lived IPC
/// request.
#[derive(Debug, Clone, Default)]
pub struct HyprlandCompositor {
    /// Overrides the command socket location (used by tests).
    socket: Option<PathBuf>,
}

impl HyprlandCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Talk to a command socket at an explicit path.
    pub fn with_socket(path: impl Into<PathBuf>) -> Self {
        Self {
            socket: Some(path.into()),
        }
    }

    fn socket_path(&self) -> Result<PathBuf, HyprlandError> {
        match &self.socket {
            Some(p) => Ok(p.clone()),
            None => Ok(socket_dir()?.join(".socket.sock")),
        }
    }

    /// Send a raw command and return the reply.
    fn request(&self, command: &str) -> Result<String, HyprlandError> {
        let path = self.socket_path()?;
        let mut stream = UnixStream::connect(&path)
            .map_err(|e| HyprlandError(format!("connect to {}: {}", path.display(), e)))?;

        stream
            .write_all(command.as_bytes())
            .map_err(|e| HyprlandError(format!("write: {}", e)))?;

        let mut response = Vec::new();
        stream
            .read_to_end(&mut response)
            .map_err(|e| HyprlandError(format!("read: {}", e)))?;

        String::from_utf8(response).map_err(|e| HyprlandError(format!("utf-8: {}", e)))
    }

    /// Send a dispatch command and check for `"ok"`.
    fn dispatch(&self, args: &str) -> Result<(), HyprlandError> {
        let response = self.request(&format!("/dispatch {}", args))?;
        if response.trim() == "ok" {
            Ok(())
        } else {
            Err(HyprlandError(format!("dispatch {}: {}", args, response.trim())))
        }
    }
}

//  Minimal serde structs for the JSON we care about

/// Subset of an object returned by `j/monitors`.
#[derive(Deserialize)]
struct MonitorJson {
    id: i64,
    x: i32,
    y: i32,
    #[serde(default)]
    transform: i64,
}

#[derive(Deserialize)]
struct WorkspaceRefJson {
    id: i32,
}

/// Subset of an object returned by `j/clients`.
#[derive(Deserialize)]
struct ClientJson {
    address: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "initialClass", default)]
    initial_class: String,
    size: [i32; 2],
    at: [i32; 2],
    workspace: WorkspaceRefJson,
    monitor: i64,
}

/// Decode a `j/monitors` reply.
pub fn parse_monitors(json: &str) -> Result<Vec<MonitorRecord>, HyprlandError> {
    let monitors: Vec<MonitorJson> =
        serde_json::from_str(json).map_err(|e| HyprlandError(format!("parse monitors: {}", e)))?;
    Ok(monitors
        .into_iter()
        .map(|m| MonitorRecord {
            id: m.id,
            x: m.x,
            y: m.y,
            transform: Transform::from_code(m.transform),
        })
        .collect())
}

/// Decode a `j/clients` reply.
pub fn parse_clients(json: &str) -> Result<Vec<WindowRecord>, HyprlandError> {
    let clients: Vec<ClientJson> =
        serde_json::from_str(json).map_err(|e| HyprlandError(format!("parse clients: {}", e)))?;
    Ok(clients
        .into_iter()
        .map(|c| WindowRecord {
            address: c.address,
            title: c.title,
            initial_class: c.initial_class,
            size: (c.size[0], c.size[1]),
            at: (c.at[0], c.at[1]),
            workspace_id: c.workspace.id,
            monitor_id: c.monitor,
        })
        .collect())
}

impl Compositor for HyprlandCompositor {
    type Error = HyprlandError;

    fn monitors(&self) -> Result<Vec<MonitorRecord>, HyprlandError> {
        parse_monitors(&self.request("j/monitors")?)
    }

    fn clients(&self) -> Result<Vec<WindowRecord>, HyprlandError> {
        parse_clients(&self.request("j/clients")?)
    }

    fn focus_window(&self, address: &str) -> Result<(), HyprlandError> {
        self.dispatch(&format!("focuswindow address:{}", address))
    }

    fn close_window(&self, address: &str) -> Result<(), HyprlandError> {
        self.dispatch(&format!("closewindow address:{}", address))
    }

    fn move_window_to_workspace_silent(
        &self,
        address: &str,
        workspace_id: i32,
    ) -> Result<(), HyprlandError> {
        self.dispatch(&format!(
            "movetoworkspacesilent {},address:{}",
            workspace_id, address
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::net::UnixListener;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::mpsc;

    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    fn tmp_socket_path() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        std::env::temp_dir().join(format!(
            "hyprview-ipc-test-{}-{}.sock",
            std::process::id(),
            id
        ))
    }

    const MONITORS: &str = r#"[
        {"id": 0, "name": "DP-1", "width": 2560, "height": 1440, "x": 0, "y": 0, "transform": 0},
        {"id": 1, "name": "HDMI-A-1", "width": 1920, "height": 1080, "x": 2560, "y": 0, "transform": 3}
    ]"#;

    const CLIENTS: &str = r#"[
        {
            "address": "0x55d0c1a0",
            "mapped": true,
            "at": [2570, 40],
            "size": [1900, 1030],
            "workspace": {"id": 2, "name": "2"},
            "monitor": 1,
            "class": "foot",
            "title": "~/src",
            "initialClass": "foot",
            "initialTitle": "foot"
        },
        {
            "address": "0x55d0c2b0",
            "at": [0, 0],
            "size": [800, 600],
            "workspace": {"id": -98, "name": "special:scratch"},
            "monitor": 0,
            "title": "scratch",
            "initialClass": "kitty"
        }
    ]"#;

    #[test]
    fn parses_monitor_subset() {
        let monitors = parse_monitors(MONITORS).unwrap();
        assert_eq!(monitors.len(), 2);
        assert_eq!(monitors[1].id, 1);
        assert_eq!(monitors[1].x, 2560);
        assert_eq!(monitors[1].transform, Transform::Rotate270);
    }

    #[test]
    fn parses_client_subset() {
        let clients = parse_clients(CLIENTS).unwrap();
        assert_eq!(clients.len(), 2);
        let c = &clients[0];
        assert_eq!(c.address, "0x55d0c1a0");
        assert_eq!(c.initial_class, "foot");
        assert_eq!(c.size, (1900, 1030));
        assert_eq!(c.at, (2570, 40));
        assert_eq!(c.workspace_id, 2);
        assert_eq!(c.monitor_id, 1);
        assert_eq!(clients[1].workspace_id, -98);
    }

    #[test]
    fn malformed_replies_are_errors() {
        assert!(parse_monitors("unknown request").is_err());
        assert!(parse_clients(r#"[{"address": "0x1"}]"#).is_err());
        assert!(parse_clients("").is_err());
    }

    /// Serve one canned reply per connection and record the requests.
    fn fake_hyprland(path: &std::path::Path, replies: Vec<&'static str>) -> mpsc::Receiver<String> {
        let listener = UnixListener::bind(path).unwrap();
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            for reply in replies {
                let (mut stream, _) = listener.accept().unwrap();
                let mut buf = [0u8; 1024];
                let n = stream.read(&mut buf).unwrap();
                let _ = tx.send(String::from_utf8_lossy(&buf[..n]).into_owned());
                stream.write_all(reply.as_bytes()).unwrap();
            }
        });
        rx
    }

    #[test]
    fn dispatch_commands_on_the_wire() {
        let path = tmp_socket_path();
        let requests = fake_hyprland(&path, vec!["ok", "ok", "ok"]);
        let hypr = HyprlandCompositor::with_socket(&path);

        hypr.focus_window("0x1234").unwrap();
        hypr.close_window("0x1234").unwrap();
        hypr.move_window_to_workspace_silent("0x1234", 3).unwrap();

        let sent: Vec<String> = requests.iter().take(3).collect();
        assert_eq!(
            sent,
            vec![
                "/dispatch focuswindow address:0x1234",
                "/dispatch closewindow address:0x1234",
                "/dispatch movetoworkspacesilent 3,address:0x1234",
            ]
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn rejected_dispatch_is_error() {
        let path = tmp_socket_path();
        let _requests = fake_hyprland(&path, vec!["No such window found"]);
        let hypr = HyprlandCompositor::with_socket(&path);
        let err = hypr.focus_window("0xdead").unwrap_err();
        assert!(err.to_string().contains("No such window found"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn queries_use_json_commands() {
        let path = tmp_socket_path();
        let requests = fake_hyprland(&path, vec![MONITORS, CLIENTS]);
        let hypr = HyprlandCompositor::with_socket(&path);
        assert_eq!(hypr.monitors().unwrap().len(), 2);
        assert_eq!(hypr.clients().unwrap().len(), 2);
        let sent: Vec<String> = requests.iter().take(2).collect();
        assert_eq!(sent, vec!["j/monitors", "j/clients"]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_socket_is_error() {
        let hypr = HyprlandCompositor::with_socket("/nonexistent/hyprview/.socket.sock");
        assert!(hypr.monitors().is_err());
    }
}
