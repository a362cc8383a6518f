use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Host primitive that runs the loop again before the next frame.
pub trait Scheduler {
    fn request_frame(&mut self);
}

/// Stops a [`RenderLoop`] from outside the loop.
///
/// Cloneable and `Send`; firing it from another thread is observed at the
/// next tick.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    Idle,
    Running,
    Stopped,
}

/// Explicit frame loop: runs one step per host frame until stopped.
///
/// ```text
/// Idle --start--> Running --stop / cancel / Break--> Stopped --start--> Running
/// ```
///
/// Only a running loop requests frames, and it requests exactly one per
/// completed step.
#[derive(Debug)]
pub struct RenderLoop {
    state: LoopState,
    token: CancelToken,
    ticks: u64,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            token: CancelToken::default(),
            ticks: 0,
        }
    }

    /// Starts (or restarts) the loop and requests the first frame.
    ///
    /// Restarting a stopped loop issues a fresh [`CancelToken`]; tokens handed
    /// out earlier no longer affect it. A token fired before the first start
    /// cancels that start: the loop goes straight to `Stopped` and requests
    /// nothing.
    pub fn start<S>(&mut self, scheduler: &mut S)
    where
        S: Scheduler + ?Sized,
    {
        self.sync_cancel();
        match self.state {
            LoopState::Running => return,
            LoopState::Idle if self.token.is_cancelled() => {
                log::debug!("render loop cancelled before start");
                self.state = LoopState::Stopped;
                return;
            }
            LoopState::Stopped => self.token = CancelToken::default(),
            LoopState::Idle => {}
        }

        self.state = LoopState::Running;
        scheduler.request_frame();
        log::debug!("render loop started");
    }

    pub fn stop(&mut self) {
        if self.state != LoopState::Stopped {
            log::debug!("render loop stopped after {} ticks", self.ticks);
        }
        self.token.cancel();
        self.state = LoopState::Stopped;
    }

    pub fn state(&self) -> LoopState {
        if self.state != LoopState::Stopped && self.token.is_cancelled() {
            LoopState::Stopped
        } else {
            self.state
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == LoopState::Running
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    /// Steps completed since creation.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Runs `step` for this frame if the loop is running, then requests the
    /// next frame unless the step broke out or the loop was cancelled.
    ///
    /// Returns whether `step` ran.
    pub fn tick<S, F>(&mut self, elapsed: Duration, scheduler: &mut S, step: F) -> bool
    where
        S: Scheduler + ?Sized,
        F: FnOnce(Duration) -> ControlFlow<()>,
    {
        self.sync_cancel();
        if self.state != LoopState::Running {
            return false;
        }

        let flow = step(elapsed);
        self.ticks += 1;

        match flow {
            ControlFlow::Break(()) => self.stop(),
            ControlFlow::Continue(()) => {
                self.sync_cancel();
                if self.state == LoopState::Running {
                    scheduler.request_frame();
                }
            }
        }
        true
    }

    fn sync_cancel(&mut self) {
        if self.state == LoopState::Running && self.token.is_cancelled() {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counting {
        requested: usize,
    }

    impl Scheduler for Counting {
        fn request_frame(&mut self) {
            self.requested += 1;
        }
    }

    fn keep_going(_: Duration) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    #[test]
    fn tick_while_idle_is_noop() {
        let mut sched = Counting::default();
        let mut lp = RenderLoop::new();

        assert!(!lp.tick(Duration::ZERO, &mut sched, |_| panic!("step must not run")));
        assert_eq!(sched.requested, 0);
        assert_eq!(lp.state(), LoopState::Idle);
    }

    #[test]
    fn running_loop_requests_one_frame_per_tick() {
        let mut sched = Counting::default();
        let mut lp = RenderLoop::new();

        lp.start(&mut sched);
        assert_eq!(sched.requested, 1);

        for _ in 0..3 {
            assert!(lp.tick(Duration::from_millis(16), &mut sched, keep_going));
        }
        assert_eq!(sched.requested, 4);
        assert_eq!(lp.ticks(), 3);

        lp.start(&mut sched);
        assert_eq!(sched.requested, 4, "start while running requests nothing");
    }

    #[test]
    fn no_frames_after_stop() {
        let mut sched = Counting::default();
        let mut lp = RenderLoop::new();
        lp.start(&mut sched);
        lp.stop();

        assert!(!lp.tick(Duration::ZERO, &mut sched, keep_going));
        assert_eq!(sched.requested, 1);
        assert_eq!(lp.state(), LoopState::Stopped);
    }

    #[test]
    fn cancel_token_stops_loop() {
        let mut sched = Counting::default();
        let mut lp = RenderLoop::new();
        lp.start(&mut sched);

        let token = lp.cancel_token();
        std::thread::spawn(move || token.cancel()).join().unwrap();

        assert_eq!(lp.state(), LoopState::Stopped);
        assert!(!lp.tick(Duration::ZERO, &mut sched, keep_going));
        assert_eq!(sched.requested, 1);
    }

    #[test]
    fn cancel_during_step_suppresses_next_request() {
        let mut sched = Counting::default();
        let mut lp = RenderLoop::new();
        lp.start(&mut sched);
        let token = lp.cancel_token();

        assert!(lp.tick(Duration::ZERO, &mut sched, |_| {
            token.cancel();
            ControlFlow::Continue(())
        }));
        assert_eq!(sched.requested, 1);
        assert!(!lp.is_running());
    }

    #[test]
    fn token_fired_before_start_cancels_it() {
        let mut sched = Counting::default();
        let mut lp = RenderLoop::new();
        lp.cancel_token().cancel();
        assert_eq!(lp.state(), LoopState::Stopped);

        lp.start(&mut sched);
        assert_eq!(sched.requested, 0);
        assert_eq!(lp.state(), LoopState::Stopped);
        assert!(!lp.tick(Duration::ZERO, &mut sched, keep_going));

        lp.start(&mut sched);
        assert_eq!(sched.requested, 1);
        assert!(lp.is_running());
        assert!(!lp.cancel_token().is_cancelled());
    }

    #[test]
    fn break_ends_loop() {
        let mut sched = Counting::default();
        let mut lp = RenderLoop::new();
        lp.start(&mut sched);

        assert!(lp.tick(Duration::ZERO, &mut sched, |_| ControlFlow::Break(())));
        assert_eq!(lp.state(), LoopState::Stopped);
        assert_eq!(sched.requested, 1);
    }

    #[test]
    fn restart_gets_fresh_token() {
        let mut sched = Counting::default();
        let mut lp = RenderLoop::new();
        lp.start(&mut sched);
        let old = lp.cancel_token();
        lp.stop();

        lp.start(&mut sched);
        assert!(lp.is_running());
        assert!(old.is_cancelled());
        assert!(!lp.cancel_token().is_cancelled());
        assert!(lp.tick(Duration::ZERO, &mut sched, keep_going));
        assert_eq!(sched.requested, 3);
    }
}
