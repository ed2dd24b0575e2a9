//! Deferred work: one-callback-per-tick sampling of noisy event sources, and
//! short cancellable sequences of delayed steps.

use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

use crate::error::EnhanceError;

/// Something that runs a task once on its next tick.
pub trait TickScheduler {
    fn schedule(&self, task: Box<dyn FnOnce()>) -> Result<(), EnhanceError>;
}

/// Ticks on the browser's animation frames.
pub struct AnimationFrames {
    window: Window,
}

impl AnimationFrames {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl TickScheduler for AnimationFrames {
    fn schedule(&self, task: Box<dyn FnOnce()>) -> Result<(), EnhanceError> {
        let callback = Closure::once_into_js(move || task());
        self.window
            .request_animation_frame(callback.unchecked_ref())
            .map(|_| ())
            .map_err(EnhanceError::platform("requestAnimationFrame"))
    }
}

/// Collapses bursts of triggers into a single run per scheduler tick.
pub struct FrameCoalescer<S> {
    scheduler: S,
    pending: Rc<Cell<bool>>,
}

impl<S: TickScheduler> FrameCoalescer<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            pending: Rc::new(Cell::new(false)),
        }
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.get()
    }

    /// Queues `work` for the next tick unless a run is already queued.
    /// Returns whether this call queued anything.
    pub fn trigger<F>(&self, work: F) -> Result<bool, EnhanceError>
    where
        F: FnOnce() + 'static,
    {
        if self.pending.replace(true) {
            return Ok(false);
        }
        let pending = self.pending.clone();
        let queued = self.scheduler.schedule(Box::new(move || {
            work();
            pending.set(false);
        }));
        if let Err(err) = queued {
            self.pending.set(false);
            return Err(err);
        }
        Ok(true)
    }
}

/// A set of steps, each due at a fixed delay from the moment the sequence
/// starts. Dropping or cancelling the sequence clears every step that has
/// not fired yet.
#[derive(Default)]
pub struct StepSequence {
    timers: Vec<Timeout>,
}

impl StepSequence {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn start<S, F>(plan: &[(u32, S)], run: F) -> Self
    where
        S: Copy + 'static,
        F: Fn(S) + Clone + 'static,
    {
        let timers = plan
            .iter()
            .map(|&(delay_ms, step)| {
                let run = run.clone();
                Timeout::new(delay_ms, move || run(step))
            })
            .collect();
        Self { timers }
    }

    pub fn cancel(&mut self) {
        // Timeout::drop clears the underlying browser timer.
        self.timers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Clone, Default)]
    struct ManualTicks {
        queue: Rc<RefCell<Vec<Box<dyn FnOnce()>>>>,
        refuse: Rc<Cell<bool>>,
    }

    impl ManualTicks {
        fn tick(&self) {
            let due: Vec<_> = self.queue.borrow_mut().drain(..).collect();
            for task in due {
                task();
            }
        }

        fn queued(&self) -> usize {
            self.queue.borrow().len()
        }
    }

    impl TickScheduler for ManualTicks {
        fn schedule(&self, task: Box<dyn FnOnce()>) -> Result<(), EnhanceError> {
            if self.refuse.get() {
                return Err(EnhanceError::Platform {
                    op: "tick",
                    detail: "refused".to_string(),
                });
            }
            self.queue.borrow_mut().push(task);
            Ok(())
        }
    }

    #[test]
    fn burst_of_triggers_runs_once_per_tick() {
        let ticks = ManualTicks::default();
        let coalescer = FrameCoalescer::new(ticks.clone());
        let runs = Rc::new(Cell::new(0));

        for _ in 0..25 {
            let runs = runs.clone();
            coalescer.trigger(move || runs.set(runs.get() + 1)).unwrap();
        }
        assert_eq!(ticks.queued(), 1);
        assert!(coalescer.is_pending());

        ticks.tick();
        assert_eq!(runs.get(), 1);
        assert!(!coalescer.is_pending());
    }

    #[test]
    fn next_tick_accepts_new_work() {
        let ticks = ManualTicks::default();
        let coalescer = FrameCoalescer::new(ticks.clone());
        let runs = Rc::new(Cell::new(0));

        for _ in 0..3 {
            let counter = runs.clone();
            assert!(coalescer.trigger(move || counter.set(counter.get() + 1)).unwrap());
            let counter = runs.clone();
            assert!(!coalescer.trigger(move || counter.set(counter.get() + 1)).unwrap());
            ticks.tick();
        }
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn refused_schedule_does_not_wedge_the_flag() {
        let ticks = ManualTicks::default();
        ticks.refuse.set(true);
        let coalescer = FrameCoalescer::new(ticks.clone());

        assert!(coalescer.trigger(|| ()).is_err());
        assert!(!coalescer.is_pending());

        ticks.refuse.set(false);
        assert!(coalescer.trigger(|| ()).unwrap());
    }
}
