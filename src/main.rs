//! Entry point for the **hyprview** daemon.
//!
//! Spawns the compositor event stream and the control socket listener on
//! background threads, feeding one input channel that the main thread
//! drains.  Compositor queries run on the
//! [`OverviewDriver`](hyprview::driver::OverviewDriver)'s worker.
//!
//! When the `overview-gtk` feature is enabled the main thread runs the
//! GLib main loop (GTK4 requires it) and polls the input channel from
//! there.  Without the feature, a headless loop logs each pass instead.
//!
//! `hyprview --once` runs a single synchronous pass, prints the layout and
//! exits.

use hyprview::apps::desktop::DesktopEntryRegistry;
use hyprview::config::Config;
use hyprview::driver::OverviewDriver;
use hyprview::event::Input;
use hyprview::hyprland::events::HyprlandEventStream;
use hyprview::hyprland::ipc::HyprlandCompositor;
use hyprview::icon::ThemeDirLookup;
use hyprview::ipc::listener::ControlListener;
use hyprview::overview::Reconciler;
use hyprview::traits::EventSource;
use log::{error, info};
use std::path::PathBuf;
use std::sync::mpsc;

/// Default socket path for the control listener.
fn default_socket_path() -> PathBuf {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(runtime).join("hyprview.sock")
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/hyprview`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("hyprview")
}

/// Try to load the config from `$XDG_CONFIG_HOME/hyprview/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

//  Main

fn main() {
    env_logger::init();

    let config = load_config();
    if std::env::args().any(|a| a == "--once") {
        run_once(config);
    } else {
        run_daemon(config);
    }
}

/// One synchronous pass, printed to stdout.
fn run_once(config: Config) {
    let mut reconciler = Reconciler::new(config.overview, Box::new(ThemeDirLookup::from_env()));
    match reconciler.update(&HyprlandCompositor::new(), &DesktopEntryRegistry::from_env()) {
        Ok(state) => print!("{}", state),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Normal daemon mode.
fn run_daemon(config: Config) {
    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let socket = config
        .control_socket
        .clone()
        .unwrap_or_else(default_socket_path);
    spawn_event_sources(input_tx, socket);

    let driver = OverviewDriver::spawn(HyprlandCompositor::new(), DesktopEntryRegistry::from_env());
    start_event_loop(driver, input_rx, config);
}

//  Event loops

#[cfg(feature = "overview-gtk")]
fn start_event_loop(driver: OverviewDriver, input_rx: mpsc::Receiver<Input>, config: Config) {
    let css = config
        .window
        .css
        .clone()
        .unwrap_or_else(|| config_dir().join("style.css"));
    hyprview::render::gtk::run_main_loop(driver, input_rx, config, Some(css));
}

#[cfg(not(feature = "overview-gtk"))]
fn start_event_loop(mut driver: OverviewDriver, input_rx: mpsc::Receiver<Input>, config: Config) {
    use std::time::Duration;

    let mut reconciler = Reconciler::new(config.overview, Box::new(ThemeDirLookup::from_env()));
    info!("hyprview running headless");
    driver.request_pass();

    loop {
        let mut batch = Vec::new();
        match input_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(input) => {
                batch.push(input);
                batch.extend(input_rx.try_iter());
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
        for cmd in driver.handle_inputs(batch) {
            info!("ignoring {:?} without a display", cmd);
        }
        if driver.poll(&mut reconciler) {
            if let Some(state) = reconciler.state() {
                log::debug!("layout:\n{}", state);
            }
        }
    }
    info!("all input sources closed, exiting");
}

//  Helpers

fn spawn_event_sources(tx: mpsc::Sender<Input>, socket: PathBuf) {
    {
        let tx = tx.clone();
        std::thread::spawn(move || {
            let mut source = ControlListener::new(&socket);
            if let Err(e) = source.run(tx) {
                error!("control listener error: {}", e);
            }
        });
    }

    std::thread::spawn(move || {
        let mut source = HyprlandEventStream::new();
        if let Err(e) = source.run(tx) {
            error!("compositor event stream error: {}", e);
        }
    });
}
