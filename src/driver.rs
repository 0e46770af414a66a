//! Keeps compositor IPC off the UI thread.
//!
//! [`OverviewDriver`] owns a worker thread that runs blocking jobs one at a
//! time: fetching a [`Snapshot`] for a pass, or dispatching an [`Action`].
//! The UI thread submits jobs and later calls [`poll`](OverviewDriver::poll)
//! to apply finished passes to its [`Reconciler`].  A [`PassScheduler`]
//! makes sure at most one fetch is in flight and that bursts of events
//! produce a single trailing pass.

use crate::event::{ControlCommand, Input};
use crate::model::Action;
use crate::overview::{dispatch, fetch_snapshot, ReconcileError, Reconciler, Snapshot};
use crate::scheduler::PassScheduler;
use crate::traits::{AppRegistry, Compositor};
use log::{debug, error, warn};
use std::sync::mpsc;
use std::time::{Duration, Instant};

enum Job {
    Fetch,
    Dispatch(Action),
}

enum Outcome {
    Fetched(Result<Snapshot, ReconcileError>),
    Dispatched(Action, Result<(), String>),
}

pub struct OverviewDriver {
    jobs: mpsc::Sender<Job>,
    outcomes: mpsc::Receiver<Outcome>,
    scheduler: PassScheduler,
}

impl OverviewDriver {
    /// Spawn the worker thread.  It exits once the driver is dropped.
    pub fn spawn<C, R>(compositor: C, registry: R) -> Self
    where
        C: Compositor + Send + 'static,
        R: AppRegistry + Send + 'static,
    {
        let (jobs, job_rx) = mpsc::channel::<Job>();
        let (out_tx, outcomes) = mpsc::channel::<Outcome>();

        std::thread::spawn(move || {
            for job in job_rx {
                let outcome = match job {
                    Job::Fetch => Outcome::Fetched(fetch_snapshot(&compositor, &registry)),
                    Job::Dispatch(action) => {
                        let result = dispatch(&compositor, &action).map_err(|e| e.to_string());
                        Outcome::Dispatched(action, result)
                    }
                };
                if out_tx.send(outcome).is_err() {
                    break;
                }
            }
            debug!("overview worker exiting");
        });

        Self {
            jobs,
            outcomes,
            scheduler: PassScheduler::new(),
        }
    }

    pub fn scheduler(&self) -> &PassScheduler {
        &self.scheduler
    }

    /// Ask for a reconciliation pass.  Coalesced with the one in flight,
    /// if any.
    pub fn request_pass(&mut self) {
        if self.scheduler.request() {
            self.start_fetch();
        } else {
            debug!("pass in flight, coalescing");
        }
    }

    /// Queue `action` for the compositor.
    pub fn dispatch(&self, action: Action) {
        debug!("dispatching {}", action);
        if self.jobs.send(Job::Dispatch(action)).is_err() {
            error!("overview worker is gone, action dropped");
        }
    }

    /// React to a batch of inputs drained from the input channel.
    ///
    /// Any number of triggering compositor events plus `Refresh` commands
    /// result in at most one pass request.  Visibility commands are handed
    /// back to the caller, in order.
    pub fn handle_inputs(&mut self, inputs: impl IntoIterator<Item = Input>) -> Vec<ControlCommand> {
        let mut wants_pass = false;
        let mut visibility = Vec::new();
        for input in inputs {
            match input {
                Input::Compositor(event) => {
                    debug!("event {}", event.name());
                    wants_pass |= event.triggers_update();
                }
                Input::Control(ControlCommand::Refresh) => wants_pass = true,
                Input::Control(cmd) => visibility.push(cmd),
            }
        }
        if wants_pass {
            self.request_pass();
        }
        visibility
    }

    /// Apply every finished job without blocking.  Returns `true` when the
    /// reconciler's state was replaced.
    pub fn poll(&mut self, reconciler: &mut Reconciler) -> bool {
        let mut changed = false;
        while let Ok(outcome) = self.outcomes.try_recv() {
            changed |= self.handle_outcome(outcome, reconciler);
        }
        changed
    }

    /// Block until no pass is in flight, or `timeout` elapses.  Returns
    /// `true` when the reconciler's state was replaced.
    pub fn wait_idle(&mut self, reconciler: &mut Reconciler, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut changed = false;
        while !self.scheduler.is_idle() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.outcomes.recv_timeout(remaining) {
                Ok(outcome) => changed |= self.handle_outcome(outcome, reconciler),
                Err(_) => break,
            }
        }
        changed
    }

    fn handle_outcome(&mut self, outcome: Outcome, reconciler: &mut Reconciler) -> bool {
        match outcome {
            Outcome::Dispatched(action, Ok(())) => {
                debug!("{} done", action);
                false
            }
            Outcome::Dispatched(action, Err(e)) => {
                warn!("{} failed: {}", action, e);
                false
            }
            Outcome::Fetched(result) => {
                let changed = match result {
                    Ok(snapshot) => {
                        reconciler.apply_snapshot(snapshot);
                        true
                    }
                    Err(e) => {
                        warn!("overview pass skipped, keeping previous state: {}", e);
                        false
                    }
                };
                if self.scheduler.finish() {
                    debug!("starting trailing pass");
                    self.start_fetch();
                }
                changed
            }
        }
    }

    fn start_fetch(&mut self) {
        if self.jobs.send(Job::Fetch).is_err() {
            error!("overview worker is gone, cannot reconcile");
            self.scheduler.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverviewConfig;
    use crate::event::CompositorEvent;
    use crate::model::Transform;
    use crate::test_support::{monitor, window, MockCompositor, MockRegistry, NamedIcons};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn reconciler() -> Reconciler {
        Reconciler::new(OverviewConfig::default(), Box::new(NamedIcons(vec![])))
    }

    fn compositor() -> MockCompositor {
        MockCompositor::new(
            vec![monitor(0, 0, 0, Transform::Normal)],
            vec![window("0x1", "foot", 1, 0)],
        )
    }

    #[test]
    fn pass_runs_on_worker_and_applies() {
        let c = compositor();
        let mut driver = OverviewDriver::spawn(c.clone(), MockRegistry::default());
        let mut r = reconciler();

        driver.request_pass();
        assert!(driver.wait_idle(&mut r, TIMEOUT));
        assert_eq!(r.state().unwrap().window_count(), 1);
        assert_eq!(c.state().client_queries, 1);
    }

    #[test]
    fn burst_runs_exactly_two_passes() {
        let c = compositor();
        let mut driver = OverviewDriver::spawn(c.clone(), MockRegistry::default());
        let mut r = reconciler();

        // The first request starts a pass; the scheduler stays busy until
        // the outcome is applied on this thread, so the rest coalesce.
        for _ in 0..5 {
            driver.request_pass();
        }
        assert_eq!(driver.scheduler().coalesced(), 4);
        driver.wait_idle(&mut r, TIMEOUT);
        assert!(driver.scheduler().is_idle());
        assert_eq!(c.state().client_queries, 2);
        assert_eq!(r.state().unwrap().generation, 2);
    }

    #[test]
    fn inputs_collapse_to_one_request() {
        let c = compositor();
        let mut driver = OverviewDriver::spawn(c.clone(), MockRegistry::default());
        let mut r = reconciler();

        let inputs: Vec<Input> = vec![
            CompositorEvent::OpenWindow("0x1".into()).into(),
            CompositorEvent::parse("workspace>>2").unwrap().into(),
            ControlCommand::Toggle.into(),
            CompositorEvent::CloseWindow("0x1".into()).into(),
            ControlCommand::Refresh.into(),
        ];
        let visibility = driver.handle_inputs(inputs);
        assert_eq!(visibility, vec![ControlCommand::Toggle]);
        assert_eq!(driver.scheduler().coalesced(), 0);
        driver.wait_idle(&mut r, TIMEOUT);
        assert_eq!(c.state().client_queries, 1);
    }

    #[test]
    fn unrelated_events_do_not_reconcile() {
        let c = compositor();
        let mut driver = OverviewDriver::spawn(c.clone(), MockRegistry::default());
        driver.handle_inputs(vec![Input::Compositor(
            CompositorEvent::parse("activewindow>>foot,~").unwrap(),
        )]);
        assert!(driver.scheduler().is_idle());
        assert_eq!(c.state().client_queries, 0);
    }

    #[test]
    fn failed_pass_keeps_state_and_goes_idle() {
        let c = compositor();
        let mut driver = OverviewDriver::spawn(c.clone(), MockRegistry::default());
        let mut r = reconciler();
        driver.request_pass();
        driver.wait_idle(&mut r, TIMEOUT);
        let before = r.state().unwrap().clone();

        c.state().failing = true;
        driver.request_pass();
        assert!(!driver.wait_idle(&mut r, TIMEOUT));
        assert!(driver.scheduler().is_idle());
        assert_eq!(r.state().unwrap(), &before);
    }

    #[test]
    fn actions_are_dispatched_in_order() {
        let c = compositor();
        let mut driver = OverviewDriver::spawn(c.clone(), MockRegistry::default());
        let mut r = reconciler();
        driver.dispatch(Action::Focus("0x1".into()));
        driver.dispatch(Action::Close("0x1".into()));
        // A fetch queued behind the dispatches flushes them.
        driver.request_pass();
        driver.wait_idle(&mut r, TIMEOUT);
        assert_eq!(
            c.state().dispatched,
            vec![Action::Focus("0x1".into()), Action::Close("0x1".into())]
        );
    }
}
