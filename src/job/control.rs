use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Cooperative stop flag shared with the caller.
///
/// The baker polls it once per face; tripping it never interrupts a
/// triangle that is already being rasterized.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Receives the overall bake progress in `[0, 1]`.
pub trait ProgressSink {
    fn progress(&mut self, fraction: f32);
}

impl<F: FnMut(f32)> ProgressSink for F {
    fn progress(&mut self, fraction: f32) {
        self(fraction)
    }
}

/// Discards progress updates.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn progress(&mut self, _fraction: f32) {}
}

#[cfg(test)]
#[path = "../../tests/unit/job/control.rs"]
mod tests;
