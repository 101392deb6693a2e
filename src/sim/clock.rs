//! Simulation clock
//!
//! Turns host timestamps (ms, e.g. from `performance.now()`) into discrete
//! move ticks and elapsed game seconds. Two independent timers:
//! - the move timer fires at the effective move interval through a
//!   [`Scheduler`], re-armed whenever the interval changes;
//! - the elapsed-time accumulator sums active frame deltas and emits one
//!   second per 1000ms, carrying the remainder forward.
//!
//! Both stop while the game is paused or the page is hidden. Resuming shifts
//! the frame reference by the suspended span, so suspended time never counts.

use crate::consts::{MAX_CATCH_UP, SECOND_MS};

/// Identifies one repeating timer inside a scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u32);

/// Repeating-timer facility the clock runs on.
///
/// Implementations decide how firings are produced (interval timers, frame
/// callbacks, a test harness); the clock only arms, cancels and polls.
pub trait Scheduler {
    /// Arm a timer that first fires `interval_ms` after `now_ms`
    fn schedule_repeating(&mut self, now_ms: f64, interval_ms: f64) -> TimerHandle;

    /// Disarm a timer. Unknown handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);

    /// Earliest timer due at or before `now_ms`, advanced by one interval
    fn poll_due(&mut self, now_ms: f64) -> Option<TimerHandle>;
}

#[derive(Debug, Clone)]
struct Timer {
    handle: TimerHandle,
    interval_ms: f64,
    next_due_ms: f64,
}

/// `setInterval`-style scheduler: each timer fires on a fixed cadence from
/// the moment it was armed.
#[derive(Debug, Clone, Default)]
pub struct IntervalScheduler {
    timers: Vec<Timer>,
    next_id: u32,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn armed(&self) -> usize {
        self.timers.len()
    }
}

impl Scheduler for IntervalScheduler {
    fn schedule_repeating(&mut self, now_ms: f64, interval_ms: f64) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.timers.push(Timer {
            handle,
            interval_ms: interval_ms.max(1.0),
            next_due_ms: now_ms + interval_ms.max(1.0),
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.retain(|t| t.handle != handle);
    }

    fn poll_due(&mut self, now_ms: f64) -> Option<TimerHandle> {
        let timer = self
            .timers
            .iter_mut()
            .filter(|t| t.next_due_ms <= now_ms)
            .min_by(|a, b| a.next_due_ms.total_cmp(&b.next_due_ms))?;
        timer.next_due_ms += timer.interval_ms;
        Some(timer.handle)
    }
}

/// Drives move ticks and game seconds from host frames
#[derive(Debug, Clone)]
pub struct SimulationClock<S: Scheduler = IntervalScheduler> {
    scheduler: S,
    move_timer: Option<TimerHandle>,
    move_interval_ms: u32,
    /// Timestamp of the last active frame
    last_frame_ms: Option<f64>,
    /// Active time not yet turned into whole seconds
    accumulated_ms: f64,
    /// When the clock went inactive (pause or hidden page)
    suspended_at_ms: Option<f64>,
    total_suspended_ms: f64,
    paused: bool,
    hidden: bool,
    stopped: bool,
    moves_this_frame: u32,
}

impl SimulationClock<IntervalScheduler> {
    pub fn new(move_interval_ms: u32) -> Self {
        Self::with_scheduler(IntervalScheduler::new(), move_interval_ms)
    }
}

impl<S: Scheduler> SimulationClock<S> {
    /// Create a stopped clock; call [`start`](Self::start) to arm it
    pub fn with_scheduler(scheduler: S, move_interval_ms: u32) -> Self {
        Self {
            scheduler,
            move_timer: None,
            move_interval_ms,
            last_frame_ms: None,
            accumulated_ms: 0.0,
            suspended_at_ms: None,
            total_suspended_ms: 0.0,
            paused: false,
            hidden: false,
            stopped: true,
            moves_this_frame: 0,
        }
    }

    /// (Re)start from scratch: fresh accumulator, timers armed at `now_ms`.
    /// Page visibility is a property of the host and survives restarts.
    pub fn start(&mut self, now_ms: f64, move_interval_ms: u32) {
        self.cancel_move_timer();
        self.move_interval_ms = move_interval_ms;
        self.accumulated_ms = 0.0;
        self.total_suspended_ms = 0.0;
        self.paused = false;
        self.stopped = false;
        self.moves_this_frame = 0;
        self.last_frame_ms = Some(now_ms);
        self.suspended_at_ms = if self.hidden { Some(now_ms) } else { None };
        if self.is_active() {
            self.arm_move_timer(now_ms);
        }
    }

    /// Game over: cancel both timers until the next `start`
    pub fn stop(&mut self) {
        self.cancel_move_timer();
        self.stopped = true;
        self.suspended_at_ms = None;
    }

    /// Ticking right now (not paused, visible, not stopped)
    pub fn is_active(&self) -> bool {
        !self.paused && !self.hidden && !self.stopped
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn move_interval_ms(&self) -> u32 {
        self.move_interval_ms
    }

    /// Sub-second remainder carried toward the next game second
    pub fn pending_ms(&self) -> f64 {
        self.accumulated_ms
    }

    /// Total time spent paused or hidden since the last `start`
    pub fn suspended_ms(&self) -> f64 {
        self.total_suspended_ms
    }

    pub fn set_paused(&mut self, paused: bool, now_ms: f64) {
        let was_active = self.is_active();
        self.paused = paused;
        self.on_activity_change(was_active, now_ms);
    }

    pub fn set_visible(&mut self, visible: bool, now_ms: f64) {
        let was_active = self.is_active();
        self.hidden = !visible;
        self.on_activity_change(was_active, now_ms);
    }

    /// Change the move cadence; the move timer restarts from `now_ms`
    pub fn set_move_interval(&mut self, move_interval_ms: u32, now_ms: f64) {
        if move_interval_ms == self.move_interval_ms {
            return;
        }
        self.move_interval_ms = move_interval_ms;
        if self.move_timer.is_some() {
            self.cancel_move_timer();
            self.arm_move_timer(now_ms);
        }
    }

    /// Account a host frame. Returns how many whole game seconds elapsed.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        self.moves_this_frame = 0;
        if !self.is_active() {
            return 0;
        }

        let last = self.last_frame_ms.replace(now_ms).unwrap_or(now_ms);
        self.accumulated_ms += (now_ms - last).max(0.0);

        let mut seconds = 0;
        while self.accumulated_ms >= SECOND_MS {
            self.accumulated_ms -= SECOND_MS;
            seconds += 1;
        }
        seconds
    }

    /// True once per move tick due at or before `now_ms`.
    ///
    /// After `MAX_CATCH_UP` moves in one frame the backlog is dropped and the
    /// timer re-anchored at `now_ms`.
    pub fn poll_move(&mut self, now_ms: f64) -> bool {
        let Some(handle) = self.move_timer else {
            return false;
        };
        if !self.is_active() {
            return false;
        }
        if self.moves_this_frame >= MAX_CATCH_UP {
            if self.scheduler.poll_due(now_ms).is_some() {
                log::debug!("Dropping move backlog after {} catch-up ticks", MAX_CATCH_UP);
                self.cancel_move_timer();
                self.arm_move_timer(now_ms);
            }
            return false;
        }

        while let Some(fired) = self.scheduler.poll_due(now_ms) {
            if fired == handle {
                self.moves_this_frame += 1;
                return true;
            }
        }
        false
    }

    fn on_activity_change(&mut self, was_active: bool, now_ms: f64) {
        let active = self.is_active();
        if was_active && !active {
            self.cancel_move_timer();
            self.suspended_at_ms = Some(now_ms);
        } else if !was_active && active {
            if let Some(since) = self.suspended_at_ms.take() {
                let span = (now_ms - since).max(0.0);
                self.total_suspended_ms += span;
                if let Some(last) = self.last_frame_ms.as_mut() {
                    *last += span;
                }
            }
            self.arm_move_timer(now_ms);
        }
    }

    fn arm_move_timer(&mut self, now_ms: f64) {
        let handle = self
            .scheduler
            .schedule_repeating(now_ms, self.move_interval_ms as f64);
        self.move_timer = Some(handle);
    }

    fn cancel_move_timer(&mut self) {
        if let Some(handle) = self.move_timer.take() {
            self.scheduler.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_moves(clock: &mut SimulationClock, now: f64) -> u32 {
        clock.advance(now);
        let mut n = 0;
        while clock.poll_move(now) {
            n += 1;
        }
        n
    }

    #[test]
    fn test_scheduler_fires_in_order() {
        let mut s = IntervalScheduler::new();
        let a = s.schedule_repeating(0.0, 100.0);
        let b = s.schedule_repeating(0.0, 30.0);
        assert_eq!(s.poll_due(20.0), None);
        assert_eq!(s.poll_due(100.0), Some(b)); // 30
        assert_eq!(s.poll_due(100.0), Some(b)); // 60
        assert_eq!(s.poll_due(100.0), Some(b)); // 90
        assert_eq!(s.poll_due(100.0), Some(a)); // 100
        assert_eq!(s.poll_due(100.0), None);
        s.cancel(b);
        assert_eq!(s.armed(), 1);
    }

    #[test]
    fn test_moves_follow_interval() {
        let mut clock = SimulationClock::new(150);
        clock.start(0.0, 150);
        assert_eq!(count_moves(&mut clock, 100.0), 0);
        assert_eq!(count_moves(&mut clock, 160.0), 1);
        assert_eq!(count_moves(&mut clock, 310.0), 1);
    }

    #[test]
    fn test_catch_up_is_bounded() {
        let mut clock = SimulationClock::new(50);
        clock.start(0.0, 50);
        assert_eq!(count_moves(&mut clock, 10_000.0), MAX_CATCH_UP);
        // Backlog dropped: next move one interval after the stall
        assert_eq!(count_moves(&mut clock, 10_040.0), 0);
        assert_eq!(count_moves(&mut clock, 10_050.0), 1);
    }

    #[test]
    fn test_seconds_carry_remainder() {
        let mut clock = SimulationClock::new(150);
        clock.start(0.0, 150);
        assert_eq!(clock.advance(700.0), 0);
        assert_eq!(clock.advance(1_300.0), 1);
        assert!((clock.pending_ms() - 300.0).abs() < 1e-9);
        assert_eq!(clock.advance(3_800.0), 2);
        assert!((clock.pending_ms() - 800.0).abs() < 1e-9);
    }

    #[test]
    fn test_pause_discards_suspended_time() {
        let mut clock = SimulationClock::new(150);
        clock.start(0.0, 150);
        assert_eq!(clock.advance(600.0), 0);
        clock.set_paused(true, 800.0);
        assert_eq!(clock.advance(5_000.0), 0);
        assert!(!clock.poll_move(5_000.0));
        clock.set_paused(false, 10_800.0);
        // 600ms carried, plus 200ms on each side of the pause
        assert_eq!(clock.advance(11_000.0), 1);
        assert!((clock.suspended_ms() - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_hidden_page_suspends() {
        let mut clock = SimulationClock::new(100);
        clock.start(0.0, 100);
        clock.set_visible(false, 50.0);
        assert!(!clock.is_active());
        assert_eq!(count_moves(&mut clock, 2_000.0), 0);
        clock.set_visible(true, 60_000.0);
        assert_eq!(clock.advance(60_000.0), 0);
        assert_eq!(count_moves(&mut clock, 60_100.0), 1);
    }

    #[test]
    fn test_double_toggle_costs_nothing() {
        let mut clock = SimulationClock::new(100);
        clock.start(0.0, 100);
        clock.set_paused(true, 500.0);
        clock.set_paused(false, 500.0);
        assert_eq!(clock.suspended_ms(), 0.0);
        assert!(clock.is_active());
    }

    #[test]
    fn test_interval_change_rearms() {
        let mut clock = SimulationClock::new(150);
        clock.start(0.0, 150);
        clock.set_move_interval(75, 100.0);
        assert_eq!(count_moves(&mut clock, 170.0), 0);
        assert_eq!(count_moves(&mut clock, 175.0), 1);
    }

    #[test]
    fn test_stop_cancels_until_start() {
        let mut clock = SimulationClock::new(100);
        clock.start(0.0, 100);
        clock.stop();
        assert_eq!(count_moves(&mut clock, 1_000.0), 0);
        assert_eq!(clock.advance(5_000.0), 0);
        clock.start(5_000.0, 100);
        assert_eq!(count_moves(&mut clock, 5_100.0), 1);
    }
}
