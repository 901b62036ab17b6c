use crate::overlay::window::{OverlayWindow, WindowBackend};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub const DEFAULT_REPAINT_INTERVAL: Duration = Duration::from_millis(8);

const RATE_WINDOW: usize = 64;

/// The three things done to the overlay on every idle cycle.
pub trait IdleTarget {
    fn reassert_topmost(&mut self);
    fn bring_canvas_to_front(&mut self);
    fn invalidate(&mut self);
}

impl<B: WindowBackend> IdleTarget for OverlayWindow<B> {
    fn reassert_topmost(&mut self) {
        self.backend_mut().bring_to_top();
    }

    fn bring_canvas_to_front(&mut self) {
        self.backend_mut().bring_canvas_to_front();
    }

    fn invalidate(&mut self) {
        self.backend_mut().invalidate();
    }
}

/// Observed cycle frequency over the last few cycles.
#[derive(Debug, Clone, Default)]
pub struct RateMeter {
    samples: VecDeque<Instant>,
}

impl RateMeter {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(RATE_WINDOW),
        }
    }

    pub fn record(&mut self, now: Instant) {
        if self.samples.len() == RATE_WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(now);
    }

    /// Cycles per second across the sampled window, once at least two
    /// samples exist.
    pub fn hz(&self) -> Option<f64> {
        let (first, last) = (self.samples.front()?, self.samples.back()?);
        let span = last.saturating_duration_since(*first).as_secs_f64();
        if self.samples.len() < 2 || span <= 0.0 {
            return None;
        }
        Some((self.samples.len() - 1) as f64 / span)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Drives repaint and z-order reassertion while the host loop is idle.
///
/// [`tick`](Self::tick) is the idle notification. It keeps cycling until
/// `is_message_pending` reports work for the host, then returns so the host
/// can dispatch it. Under load the first poll already sees a message and
/// the call costs a single predicate check.
pub struct IdleScheduler<P, S>
where
    P: FnMut() -> bool,
    S: FnMut(Duration),
{
    interval: Duration,
    is_message_pending: P,
    sleep: S,
    meter: RateMeter,
    cycles: u64,
}

impl<P> IdleScheduler<P, fn(Duration)>
where
    P: FnMut() -> bool,
{
    pub fn with_thread_sleep(interval: Duration, is_message_pending: P) -> Self {
        Self::new(interval, is_message_pending, std::thread::sleep)
    }
}

impl<P, S> IdleScheduler<P, S>
where
    P: FnMut() -> bool,
    S: FnMut(Duration),
{
    pub fn new(interval: Duration, is_message_pending: P, sleep: S) -> Self {
        Self {
            interval,
            is_message_pending,
            sleep,
            meter: RateMeter::new(),
            cycles: 0,
        }
    }

    /// Run idle cycles until a message is pending. Returns the number of
    /// cycles performed by this call.
    pub fn tick<T: IdleTarget + ?Sized>(&mut self, target: &mut T) -> u64 {
        let mut cycles = 0;
        while !(self.is_message_pending)() {
            target.reassert_topmost();
            target.bring_canvas_to_front();
            target.invalidate();
            (self.sleep)(self.interval);
            self.meter.record(Instant::now());
            cycles += 1;
        }
        self.cycles += cycles;
        if cycles > 0 {
            tracing::trace!(cycles, hz = ?self.meter.hz(), "idle loop yielded to host");
        }
        cycles
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn total_cycles(&self) -> u64 {
        self.cycles
    }

    pub fn rate(&self) -> &RateMeter {
        &self.meter
    }
}
