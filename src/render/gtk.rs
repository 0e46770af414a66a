//! GTK4 + layer-shell overview that runs on the **main thread**.
//!
//! # Widget tree
//!
//! ```text
//! window                          (layer-shell, transparent)
//! └ .overview                     (vertical box, rebuilt every pass)
//!     └ .overview-row             (one per row of workspaces)
//!         └ .workspace
//!             ├ .workspace-label
//!             └ .drop-zone        (accepts dragged window addresses)
//!                 ├ GtkFixed      (window buttons at scaled positions)
//!                 │   └ .window   (icon button; click, key, drag)
//!                 └ .placeholder  (when the workspace is empty)
//! ```
//!
//! # CSS selectors
//!
//! | Selector           | Targets                                   |
//! |--------------------|-------------------------------------------|
//! | `window`           | The overlay window (keep transparent)     |
//! | `.overview`        | Container around all rows                 |
//! | `.workspace`       | One workspace column                      |
//! | `.workspace-label` | "Workspace N"                             |
//! | `.drop-zone`       | The drop area of a workspace              |
//! | `.window`          | A window button                           |
//! | `.placeholder`     | The `+` shown for empty workspaces        |
//!
//! Widgets never talk to the compositor.  Their handlers push
//! [`Action`]s onto a channel that the main loop hands to the
//! [`OverviewDriver`].

use crate::config::Config;
use crate::driver::OverviewDriver;
use crate::event::{ControlCommand, Input};
use crate::icon::{Icon, IconSource, ResolvedIcon, ThemeDirLookup};
use crate::model::Action;
use crate::overview::representation::{Key, Modifiers, SECONDARY_BUTTON};
use crate::overview::{DropTarget, Reconciler, WindowRepresentation};
use crate::traits::IconLookup;
use crate::view::{build_view, Node, Orientation};
use gtk4::gdk_pixbuf::{InterpType, Pixbuf};
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use gtk4_layer_shell::LayerShell;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

//  Default CSS

const DEFAULT_CSS: &str = r#"
window,
window.background {
    background-color: transparent;
    background: none;
}

.overview {
    background-color: rgba(0, 0, 0, 0.75);
    border-radius: 16px;
    padding: 12px;
}

.workspace {
    min-width: 120px;
    border-radius: 8px;
    background-color: rgba(255, 255, 255, 0.06);
    padding: 6px;
}

.workspace-label {
    font-size: 0.8em;
    color: rgba(255, 255, 255, 0.7);
}

.drop-zone {
    min-height: 70px;
}

.window {
    padding: 0;
    border-radius: 4px;
    background-color: rgba(255, 255, 255, 0.12);
}

.window:focus {
    outline: 1px solid rgba(255, 255, 255, 0.8);
}

.placeholder {
    font-size: 2em;
    color: rgba(255, 255, 255, 0.3);
}
"#;

//  Icons

/// [`IconLookup`] over the display's GTK icon theme.
///
/// Hits are returned as files so their native size is known and the
/// renderer can rescale them.
struct GtkIconLookup {
    theme: gtk4::IconTheme,
}

impl IconLookup for GtkIconLookup {
    fn lookup(&self, name: &str, size: u32) -> Option<Icon> {
        let path = Path::new(name);
        if path.is_absolute() {
            return path.is_file().then(|| Icon::file(path, native_size(path)));
        }
        if !self.theme.has_icon(name) {
            return None;
        }
        let paintable = self.theme.lookup_icon(
            name,
            &[],
            size as i32,
            1,
            gtk4::TextDirection::None,
            gtk4::IconLookupFlags::empty(),
        );
        match paintable.file().and_then(|f| f.path()) {
            Some(path) => {
                let native = native_size(&path);
                Some(Icon::file(path, native))
            }
            None => Some(Icon::themed(name, None)),
        }
    }
}

fn native_size(path: &Path) -> Option<(u32, u32)> {
    let (_, w, h) = Pixbuf::file_info(path)?;
    Some((w.max(0) as u32, h.max(0) as u32))
}

/// An image widget showing `icon` at exactly `size × size`, rescaled
/// bilinearly when the source has a different size.
fn icon_image(icon: &ResolvedIcon) -> gtk4::Image {
    let size = icon.size as i32;
    let image = match &icon.icon.source {
        IconSource::File(path) if icon.needs_rescale() => match scaled_texture(path, size) {
            Some(texture) => gtk4::Image::from_paintable(Some(&texture)),
            None => gtk4::Image::from_file(path),
        },
        IconSource::File(path) => gtk4::Image::from_file(path),
        IconSource::Themed(name) => gtk4::Image::from_icon_name(name),
    };
    image.set_pixel_size(size);
    image
}

fn scaled_texture(path: &Path, size: i32) -> Option<gdk::Texture> {
    let pixbuf = match Pixbuf::from_file(path) {
        Ok(p) => p,
        Err(e) => {
            debug!("cannot load {}: {}", path.display(), e);
            return None;
        }
    };
    let scaled = pixbuf.scale_simple(size, size, InterpType::Bilinear)?;
    Some(gdk::Texture::for_pixbuf(&scaled))
}

//  Widgets

fn send(actions: &mpsc::Sender<Action>, action: Action) {
    if actions.send(action).is_err() {
        warn!("main loop gone, action dropped");
    }
}

fn key_of(keyval: gdk::Key) -> Key {
    if keyval == gdk::Key::Return {
        Key::Return
    } else if keyval == gdk::Key::KP_Enter {
        Key::KpEnter
    } else if keyval == gdk::Key::space {
        Key::Space
    } else {
        Key::Other
    }
}

fn window_button(rep: &WindowRepresentation, actions: &mpsc::Sender<Action>) -> gtk4::Button {
    let rep = Rc::new(rep.clone());

    let button = gtk4::Button::new();
    button.add_css_class("window");
    button.set_size_request(rep.size.0.round() as i32, rep.size.1.round() as i32);
    button.set_tooltip_text(Some(rep.tooltip()));
    let image = icon_image(&rep.icon);
    button.set_child(Some(&image));

    {
        let rep = rep.clone();
        let actions = actions.clone();
        button.connect_clicked(move |_| send(&actions, rep.on_primary_activate()));
    }

    let click = gtk4::GestureClick::new();
    click.set_button(SECONDARY_BUTTON);
    {
        let rep = rep.clone();
        let actions = actions.clone();
        click.connect_pressed(move |gesture, _, _, _| {
            if let Some(action) = rep.on_button_press(gesture.current_button()) {
                gesture.set_state(gtk4::EventSequenceState::Claimed);
                send(&actions, action);
            }
        });
    }
    button.add_controller(click);

    // Capture phase, so Shift+Return closes instead of activating the button.
    let keys = gtk4::EventControllerKey::new();
    keys.set_propagation_phase(gtk4::PropagationPhase::Capture);
    {
        let rep = rep.clone();
        let actions = actions.clone();
        keys.connect_key_pressed(move |_, keyval, _, state| {
            let modifiers = Modifiers {
                shift: state.contains(gdk::ModifierType::SHIFT_MASK),
                control: state.contains(gdk::ModifierType::CONTROL_MASK),
                alt: state.contains(gdk::ModifierType::ALT_MASK),
            };
            match rep.on_close_shortcut(key_of(keyval), modifiers) {
                Some(action) => {
                    send(&actions, action);
                    glib::Propagation::Stop
                }
                None => glib::Propagation::Proceed,
            }
        });
    }
    button.add_controller(keys);

    let drag = gtk4::DragSource::new();
    drag.set_actions(gdk::DragAction::COPY);
    {
        let payload = rep.drag_payload().to_string();
        drag.connect_prepare(move |_, _, _| {
            Some(gdk::ContentProvider::for_value(&payload.to_value()))
        });
    }
    let icon_ref = image.downgrade();
    drag.connect_drag_begin(move |source, _| {
        if let Some(image) = icon_ref.upgrade() {
            let paintable = gtk4::WidgetPaintable::new(Some(&image));
            source.set_icon(Some(&paintable), 0, 0);
        }
    });
    button.add_controller(drag);

    button
}

fn drop_zone(target: DropTarget, child: &gtk4::Widget, actions: &mpsc::Sender<Action>) -> gtk4::Box {
    let zone = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    zone.add_css_class("drop-zone");
    zone.set_vexpand(true);
    zone.append(child);

    let drop = gtk4::DropTarget::new(glib::Type::STRING, gdk::DragAction::COPY);
    let actions = actions.clone();
    drop.connect_drop(move |_, value, _, _| {
        let Ok(payload) = value.get::<String>() else {
            return false;
        };
        match target.on_drop(&payload) {
            Some(action) => {
                send(&actions, action);
                true
            }
            None => false,
        }
    });
    zone.add_controller(drop);
    zone
}

/// Create the widget for `node` and all its descendants.
fn render(node: &Node, actions: &mpsc::Sender<Action>) -> gtk4::Widget {
    match node {
        Node::Container {
            orientation,
            spacing,
            expand,
            css_class,
            children,
        } => {
            let orientation = match orientation {
                Orientation::Horizontal => gtk4::Orientation::Horizontal,
                Orientation::Vertical => gtk4::Orientation::Vertical,
            };
            let container = gtk4::Box::new(orientation, *spacing);
            container.add_css_class(css_class);
            container.set_hexpand(*expand);
            for child in children {
                container.append(&render(child, actions));
            }
            container.upcast()
        }
        Node::Label { text, css_class } => {
            let label = gtk4::Label::new(Some(text.as_str()));
            label.add_css_class(css_class);
            label.upcast()
        }
        Node::Fixed {
            width,
            height,
            children,
        } => {
            let fixed = gtk4::Fixed::new();
            fixed.set_size_request(width.ceil() as i32, height.ceil() as i32);
            for placed in children {
                fixed.put(&render(&placed.node, actions), placed.x, placed.y);
            }
            fixed.upcast()
        }
        Node::DropZone { target, child } => {
            drop_zone(*target, &render(child, actions), actions).upcast()
        }
        Node::Window(rep) => window_button(rep, actions).upcast(),
    }
}

//  Public API

/// Run the GTK4 main loop on the **current** (main) thread.
///
/// `inputs` carries compositor events and control commands; passes run on
/// `driver`'s worker and are applied here.
pub fn run_main_loop(
    mut driver: OverviewDriver,
    inputs: mpsc::Receiver<Input>,
    config: Config,
    css_path: Option<PathBuf>,
) {
    gtk4::init().expect("failed to initialise GTK4");
    info!("GTK4 initialised on main thread");

    load_css(&css_path);

    let icons: Box<dyn IconLookup> = match gdk::Display::default() {
        Some(display) => Box::new(GtkIconLookup {
            theme: gtk4::IconTheme::for_display(&display),
        }),
        None => {
            warn!("no GDK display, falling back to icon directories");
            Box::new(ThemeDirLookup::from_env())
        }
    };
    let mut reconciler = Reconciler::new(config.overview.clone(), icons);

    //  Layer-shell overlay window
    let window = gtk4::Window::new();
    window.init_layer_shell();
    window.set_layer(gtk4_layer_shell::Layer::Overlay);
    window.set_namespace(&config.window.namespace);
    window.set_keyboard_mode(gtk4_layer_shell::KeyboardMode::OnDemand);
    window.set_decorated(false);
    window.remove_css_class("background");

    let placeholder = gtk4::Label::new(Some("…"));
    window.set_child(Some(&placeholder));

    let escape = gtk4::EventControllerKey::new();
    {
        let window = window.downgrade();
        escape.connect_key_pressed(move |_, keyval, _, _| {
            if keyval != gdk::Key::Escape {
                return glib::Propagation::Proceed;
            }
            if let Some(window) = window.upgrade() {
                window.set_visible(false);
            }
            glib::Propagation::Stop
        });
    }
    window.add_controller(escape);

    // Present once so the Wayland surface is mapped, then hide.
    window.present();
    window.set_visible(config.window.start_visible);

    let (action_tx, action_rx) = mpsc::channel::<Action>();

    info!(
        "overview ready (namespace {}, CSS: {})",
        config.window.namespace,
        css_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<built-in>".into()),
    );

    driver.request_pass();

    let main_loop = glib::MainLoop::new(None, false);

    //  Main event loop (~60 fps)
    let quit = main_loop.clone();
    glib::timeout_add_local(Duration::from_millis(16), move || {
        // 1. Drain inputs.
        let (batch, disconnected) = drain_inputs(&inputs);

        for cmd in driver.handle_inputs(batch) {
            let visible = match cmd {
                ControlCommand::Toggle => !window.is_visible(),
                ControlCommand::Show => true,
                ControlCommand::Hide => false,
                ControlCommand::Refresh => continue,
            };
            info!("overview {}", if visible { "shown" } else { "hidden" });
            window.set_visible(visible);
            if visible {
                window.present();
            }
        }

        // 2. Hand widget actions to the worker.
        while let Ok(action) = action_rx.try_recv() {
            driver.dispatch(action);
        }

        // 3. Apply finished passes: tear down and rebuild the tree.
        if driver.poll(&mut reconciler) {
            if let Some(state) = reconciler.state() {
                let view = build_view(state, reconciler.config());
                window.set_child(Some(&render(&view, &action_tx)));
            }
        }

        stop_when_closed(disconnected, &quit)
    });

    info!("entering GLib main loop");
    main_loop.run();
    info!("GLib main loop exited");
}

/// Take every queued input.  The flag is set once all senders are gone.
fn drain_inputs(inputs: &mpsc::Receiver<Input>) -> (Vec<Input>, bool) {
    let mut batch = Vec::new();
    loop {
        match inputs.try_recv() {
            Ok(input) => batch.push(input),
            Err(mpsc::TryRecvError::Empty) => return (batch, false),
            Err(mpsc::TryRecvError::Disconnected) => return (batch, true),
        }
    }
}

/// Quit `main_loop` and remove the tick once the inputs are closed.
fn stop_when_closed(disconnected: bool, main_loop: &glib::MainLoop) -> glib::ControlFlow {
    if disconnected {
        error!("all input sources closed, exiting");
        main_loop.quit();
        glib::ControlFlow::Break
    } else {
        glib::ControlFlow::Continue
    }
}

//  CSS loading

fn load_css(css_path: &Option<PathBuf>) {
    let provider = gtk4::CssProvider::new();

    let css_content = match css_path.as_ref().filter(|p| p.exists()) {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(content) => {
                info!("user CSS: {} ({} bytes)", p.display(), content.len());
                content
            }
            Err(e) => {
                warn!("CSS read failed ({}): {}, using built-in", p.display(), e);
                DEFAULT_CSS.to_string()
            }
        },
        None => {
            info!("no user CSS, using built-in default");
            DEFAULT_CSS.to_string()
        }
    };

    #[allow(deprecated)]
    provider.load_from_data(&css_content);

    if let Some(display) = gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
        debug!("CSS registered on display");
    } else {
        warn!("no GDK display, CSS will not be applied");
    }
}
