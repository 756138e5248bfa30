use std::time::Instant;

/// Monotonic time source, injected so expiry can be driven from tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}
