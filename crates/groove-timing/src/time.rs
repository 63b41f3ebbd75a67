use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Wall clock the engine reads on every tick and strike.
pub trait TimeProvider {
    /// Microseconds since an arbitrary, fixed origin.
    fn now_us(&self) -> i64;

    fn now_ms(&self) -> f64 {
        self.now_us() as f64 / 1000.0
    }
}

impl<T: TimeProvider + ?Sized> TimeProvider for &T {
    fn now_us(&self) -> i64 {
        (**self).now_us()
    }
}

// Lets a test keep a handle on the mock the engine owns.
impl<T: TimeProvider + ?Sized> TimeProvider for Rc<T> {
    fn now_us(&self) -> i64 {
        (**self).now_us()
    }
}

/// Monotonic clock measured from construction.
pub struct SystemTimeProvider {
    origin: Instant,
}

impl SystemTimeProvider {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for SystemTimeProvider {
    fn now_us(&self) -> i64 {
        self.origin.elapsed().as_micros() as i64
    }
}

/// Hand-driven clock; starts at zero.
#[derive(Debug, Default)]
pub struct MockTimeProvider {
    now: Cell<i64>,
}

impl MockTimeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&self, us: i64) {
        self.now.set(us);
    }

    pub fn advance(&self, delta_us: i64) {
        self.now.set(self.now.get() + delta_us);
    }

    pub fn advance_ms(&self, delta_ms: i64) {
        self.advance(delta_ms * 1000);
    }
}

impl TimeProvider for MockTimeProvider {
    fn now_us(&self) -> i64 {
        self.now.get()
    }
}
