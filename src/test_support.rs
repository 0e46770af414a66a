//! Test doubles shared by the unit tests.

use crate::apps::ApplicationRecord;
use crate::icon::Icon;
use crate::model::{Action, MonitorRecord, Transform, WindowRecord};
use crate::traits::{AppRegistry, Compositor, IconLookup};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, thiserror::Error)]
#[error("mock error: {0}")]
pub struct MockError(pub String);

#[derive(Debug, Default)]
pub struct MockState {
    pub monitors: Vec<MonitorRecord>,
    pub clients: Vec<WindowRecord>,
    /// When set, every query fails.
    pub failing: bool,
    pub dispatched: Vec<Action>,
    pub client_queries: usize,
}

/// A compositor that serves canned state and records every dispatch.
///
/// Clones share state, so a test can keep a handle after moving the
/// compositor into a worker thread.
#[derive(Debug, Clone, Default)]
pub struct MockCompositor {
    inner: Arc<Mutex<MockState>>,
}

impl MockCompositor {
    pub fn new(monitors: Vec<MonitorRecord>, clients: Vec<WindowRecord>) -> Self {
        let c = Self::default();
        {
            let mut s = c.state();
            s.monitors = monitors;
            s.clients = clients;
        }
        c
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap()
    }

    fn check(&self) -> Result<(), MockError> {
        if self.state().failing {
            Err(MockError("compositor unreachable".into()))
        } else {
            Ok(())
        }
    }
}

impl Compositor for MockCompositor {
    type Error = MockError;

    fn monitors(&self) -> Result<Vec<MonitorRecord>, MockError> {
        self.check()?;
        Ok(self.state().monitors.clone())
    }

    fn clients(&self) -> Result<Vec<WindowRecord>, MockError> {
        self.check()?;
        let mut s = self.state();
        s.client_queries += 1;
        Ok(s.clients.clone())
    }

    fn focus_window(&self, address: &str) -> Result<(), MockError> {
        self.state().dispatched.push(Action::Focus(address.into()));
        Ok(())
    }

    fn close_window(&self, address: &str) -> Result<(), MockError> {
        self.state().dispatched.push(Action::Close(address.into()));
        Ok(())
    }

    fn move_window_to_workspace_silent(
        &self,
        address: &str,
        workspace_id: i32,
    ) -> Result<(), MockError> {
        self.state().dispatched.push(Action::MoveToWorkspace {
            address: address.into(),
            workspace_id,
        });
        Ok(())
    }
}

/// A registry with a fixed application list.
#[derive(Debug, Clone, Default)]
pub struct MockRegistry(pub Vec<ApplicationRecord>);

impl AppRegistry for MockRegistry {
    type Error = MockError;

    fn applications(&self) -> Result<Vec<ApplicationRecord>, MockError> {
        Ok(self.0.clone())
    }
}

/// A registry whose enumeration always fails.
#[derive(Debug, Clone, Default)]
pub struct FailingRegistry;

impl AppRegistry for FailingRegistry {
    type Error = MockError;

    fn applications(&self) -> Result<Vec<ApplicationRecord>, MockError> {
        Err(MockError("no application directories".into()))
    }
}

/// Icon lookup that knows a fixed set of names.
pub struct NamedIcons(pub Vec<&'static str>);

impl IconLookup for NamedIcons {
    fn lookup(&self, name: &str, size: u32) -> Option<Icon> {
        self.0
            .contains(&name)
            .then(|| Icon::themed(name, Some((size, size))))
    }
}

pub fn monitor(id: i64, x: i32, y: i32, transform: Transform) -> MonitorRecord {
    MonitorRecord {
        id,
        x,
        y,
        transform,
    }
}

pub fn window(address: &str, class: &str, workspace_id: i32, monitor_id: i64) -> WindowRecord {
    WindowRecord {
        address: address.into(),
        title: format!("{} window", class),
        initial_class: class.into(),
        size: (1000, 500),
        at: (100, 200),
        workspace_id,
        monitor_id,
    }
}
