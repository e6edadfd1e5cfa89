//! Cooperative time slicing for long running, step-wise work.
//!
//! Work is expressed as a [`WorkUnit`]: a resumable state machine that performs one atomic step
//! each time it is called. A [`Scheduler`] runs steps back to back until the frame budget is
//! spent, then hands control back to the driving loop, which resumes it on its next tick.
//! Every scheduler is bound to the [`RunId`] it was created for and refuses to run any further
//! once the driver reports a different current run.

use std::time::Duration;

use tracing::trace;

use crate::clock::{Clock, MonotonicClock};

/// Identifier of one generation run. A newer run always has a larger id.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash, Ord, PartialOrd)]
pub struct RunId(u64);

impl RunId {
    pub fn initial() -> RunId {
        RunId(0)
    }

    pub fn next(self) -> RunId {
        RunId(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum StepOutcome {
    Continue,
    Complete,
}

pub trait WorkUnit<Ctx: ?Sized> {
    /// Perform one atomic unit of work.
    fn step(&mut self, ctx: &mut Ctx) -> StepOutcome;
}

/// How much wall clock time a pass may use between two suspensions.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameBudget {
    target_step_interval: Duration,
}

impl FrameBudget {
    pub fn new(target_step_interval: Duration) -> FrameBudget {
        FrameBudget { target_step_interval }
    }

    /// Budget for a driver loop ticking `frames_per_second` times a second. Zero is treated as one.
    pub fn from_frame_rate(frames_per_second: u32) -> FrameBudget {
        FrameBudget::new(Duration::from_secs(1) / frames_per_second.max(1))
    }

    #[inline]
    pub fn target_step_interval(&self) -> Duration {
        self.target_step_interval
    }

    /// The window left in this frame is two target intervals less the last frame's duration.
    /// Once the time since the last suspension reaches it, the pass must suspend.
    #[inline]
    pub fn is_exhausted(&self, frame_delta: Duration, since_suspension: Duration) -> bool {
        let window = (self.target_step_interval * 2).saturating_sub(frame_delta);
        window <= since_suspension
    }
}

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Resumption {
    /// The budget ran out; resume again on a later tick.
    Suspended,
    Completed,
    /// A newer run superseded this one. Nothing further was done.
    Aborted,
}

#[derive(Debug)]
pub struct Scheduler<C: Clock = MonotonicClock> {
    run: RunId,
    budget: FrameBudget,
    clock: C,
    last_suspension: Duration,
    steps: u64,
    suspensions: u64,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(run: RunId, budget: FrameBudget, clock: C) -> Scheduler<C> {
        let last_suspension = clock.now();
        Scheduler {
            run,
            budget,
            clock,
            last_suspension,
            steps: 0,
            suspensions: 0,
        }
    }

    #[inline]
    pub fn run(&self) -> RunId {
        self.run
    }

    #[inline]
    pub fn budget(&self) -> FrameBudget {
        self.budget
    }

    /// Atomic steps performed so far, across all work resumed through this scheduler.
    #[inline]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    #[inline]
    pub fn suspensions(&self) -> u64 {
        self.suspensions
    }

    /// Continue `work` until it completes or the budget is spent.
    ///
    /// `frame_delta` is the driver's measured duration of its last tick. The budget is checked
    /// before every step except the first: each resumption always takes at least one step, even
    /// when the budget is already spent on entry, so an over-budget frame cannot stall the pass
    /// forever.
    pub fn resume<Ctx, W>(&mut self,
                          work: &mut W,
                          ctx: &mut Ctx,
                          current_run: RunId,
                          frame_delta: Duration)
                          -> Resumption
        where Ctx: ?Sized,
              W: WorkUnit<Ctx> + ?Sized
    {
        if current_run != self.run {
            trace!(run = self.run.value(), current = current_run.value(), "stale pass aborted");
            return Resumption::Aborted;
        }

        let mut stepped = false;
        loop {
            if stepped {
                let now = self.clock.now();
                let since_suspension = now.saturating_sub(self.last_suspension);
                if self.budget.is_exhausted(frame_delta, since_suspension) {
                    self.last_suspension = now;
                    self.suspensions += 1;
                    trace!(run = self.run.value(), steps = self.steps, "suspending pass");
                    return Resumption::Suspended;
                }
            }

            stepped = true;
            self.steps += 1;
            if work.step(ctx) == StepOutcome::Complete {
                return Resumption::Completed;
            }
        }
    }
}
