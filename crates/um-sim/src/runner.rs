//! Running a [`Sim`] on a worker thread.
//!
//! The worker owns the simulation outright.  Between ticks it sleeps for
//! the configured pace on a channel receive, so [`SimHandle::stop`] wakes it
//! at once instead of waiting out the sleep.  After every tick it replaces
//! the published [`SimView`], an owned copy of what a UI or logger needs;
//! readers never touch live simulation state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use um_core::{NodeId, Tick, VehicleId};
use um_signal::LightPhase;
use um_spatial::Router;

use crate::stats::{SharedStats, Statistics};
use crate::{Sim, SimError, SimObserver, SimResult};

// ── Published view ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct VehicleView {
    pub id:       VehicleId,
    pub current:  NodeId,
    pub next:     Option<NodeId>,
    /// Fraction of the edge towards `next` covered.
    pub position: f64,
    pub route:    Vec<NodeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LightView {
    pub node:           NodeId,
    pub phase:          LightPhase,
    pub remaining_secs: f64,
    /// Queue lengths in N, E, S, W order.
    pub queue_sizes:    [usize; 4],
}

/// Owned snapshot of the simulation after a tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimView {
    /// The next tick to run.
    pub tick:         Tick,
    pub elapsed_secs: f64,
    pub vehicles:     Vec<VehicleView>,
    pub lights:       Vec<LightView>,
    /// Set once the worker has left its loop.
    pub finished:     bool,
}

impl SimView {
    pub fn capture<R: Router>(sim: &Sim<R>) -> Self {
        let vehicles = sim
            .vehicles()
            .iter()
            .map(|v| VehicleView {
                id:       v.id,
                current:  v.current_node(),
                next:     v.next_node(),
                position: v.position,
                route:    v.route.clone(),
            })
            .collect();
        let lights = sim
            .lights()
            .iter()
            .map(|l| LightView {
                node:           l.node(),
                phase:          l.phase(),
                remaining_secs: l.remaining_secs(),
                queue_sizes:    l.queue_sizes(),
            })
            .collect();
        Self {
            tick: sim.current_tick(),
            elapsed_secs: sim.elapsed_secs(),
            vehicles,
            lights,
            finished: false,
        }
    }
}

// ── SimRunner ─────────────────────────────────────────────────────────────────

pub struct SimRunner;

impl SimRunner {
    /// Move `sim` onto a new thread and run it to completion, sleeping
    /// `pace` between ticks (`Duration::ZERO` runs flat out).
    ///
    /// `observer` receives every event, on the worker thread.
    pub fn spawn<R, O>(sim: Sim<R>, mut observer: O, pace: Duration) -> SimHandle<R>
    where
        R: Router + 'static,
        O: SimObserver + Send + 'static,
    {
        let stop = sim.stop_flag();
        let stats = sim.shared_stats();
        let view = Arc::new(RwLock::new(SimView::capture(&sim)));
        let finished = Arc::new(AtomicBool::new(false));
        let (wake_tx, wake_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel();

        let worker_view = Arc::clone(&view);
        let worker_finished = Arc::clone(&finished);
        let thread = thread::spawn(move || {
            let mut sim = sim;
            let result = drive(&mut sim, &mut observer, pace, &wake_rx, &worker_view);

            let mut final_view = SimView::capture(&sim);
            final_view.finished = true;
            publish(&worker_view, final_view);
            worker_finished.store(true, Ordering::Release);

            // The handle may already be gone; nobody is left to tell.
            let _ = done_tx.send(result.map(|()| sim));
        });

        SimHandle {
            stop,
            stats,
            view,
            finished,
            wake: wake_tx,
            done: done_rx,
            thread: Some(thread),
        }
    }
}

fn drive<R: Router, O: SimObserver>(
    sim: &mut Sim<R>,
    observer: &mut O,
    pace: Duration,
    wake: &Receiver<()>,
    view: &RwLock<SimView>,
) -> SimResult<()> {
    while !sim.is_finished() {
        sim.step(observer)?;
        publish(view, SimView::capture(sim));

        if !pace.is_zero() && !sim.is_finished() {
            match wake.recv_timeout(pace) {
                Ok(()) | Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => thread::sleep(pace),
            }
        }
    }
    sim.finish(observer);
    Ok(())
}

fn publish(view: &RwLock<SimView>, next: SimView) {
    *view.write().unwrap_or_else(PoisonError::into_inner) = next;
}

// ── SimHandle ─────────────────────────────────────────────────────────────────

/// Control and read access to a simulation running on a worker thread.
///
/// Dropping the handle requests a stop; the worker finishes its tick and
/// exits on its own.
pub struct SimHandle<R: Router> {
    stop:     Arc<AtomicBool>,
    stats:    SharedStats,
    view:     Arc<RwLock<SimView>>,
    finished: Arc<AtomicBool>,
    wake:     Sender<()>,
    done:     Receiver<SimResult<Sim<R>>>,
    thread:   Option<JoinHandle<()>>,
}

impl<R: Router> SimHandle<R> {
    /// Ask the worker to stop after the tick in progress and wake it if it
    /// is sleeping.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
        // Fails only once the worker has exited.
        let _ = self.wake.send(());
    }

    /// `true` once the worker has left its loop.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// A copy of the most recently published view.
    pub fn view(&self) -> SimView {
        self.view.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// A snapshot of the current statistics.
    pub fn stats(&self) -> Statistics {
        self.stats.snapshot()
    }

    /// Wait at most `timeout` for the worker to finish and return the
    /// simulation in its final state.
    ///
    /// # Errors
    ///
    /// - [`SimError::JoinTimeout`] if the worker is still running; the
    ///   handle stays usable and `join` may be called again.
    /// - [`SimError::WorkerLost`] if the worker panicked or its result was
    ///   already taken.
    /// - Any error the run itself failed with.
    pub fn join(&mut self, timeout: Duration) -> SimResult<Sim<R>> {
        match self.done.recv_timeout(timeout) {
            Ok(result) => {
                if let Some(thread) = self.thread.take() {
                    // The result is already in hand; the thread is exiting.
                    let _ = thread.join();
                }
                result
            }
            Err(RecvTimeoutError::Timeout) => Err(SimError::JoinTimeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(SimError::WorkerLost),
        }
    }
}

impl<R: Router> Drop for SimHandle<R> {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.stop();
        }
    }
}
