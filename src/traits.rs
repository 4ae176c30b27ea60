/// Host time source, injected so tests can steer the sale phases without
/// sleeping. Readings are unix seconds and expected to be monotonic.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}
