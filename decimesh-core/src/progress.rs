//! Progress reporting for long-running operations.
//!
//! Every unit of work (reading a file, a decimation run, writing a file)
//! reports through the same three calls:
//!
//! - `on_start(stage)` once,
//! - `on_step(current, total)` zero or more times with `current <= total`,
//! - `on_complete(stage)` once, after which the unit makes no further calls.
//!
//! The listener is a plain synchronous notification; it cannot suspend or
//! cancel the caller.

/// Receiver of progress notifications.
pub trait ProgressListener {
    /// A unit of work named `stage` has started.
    fn on_start(&mut self, stage: &str);

    /// `current` of `total` steps are done.
    fn on_step(&mut self, current: usize, total: usize);

    /// The unit of work named `stage` has finished.
    fn on_complete(&mut self, stage: &str);
}

impl<T: ProgressListener + ?Sized> ProgressListener for &mut T {
    fn on_start(&mut self, stage: &str) {
        (**self).on_start(stage);
    }

    fn on_step(&mut self, current: usize, total: usize) {
        (**self).on_step(current, total);
    }

    fn on_complete(&mut self, stage: &str) {
        (**self).on_complete(stage);
    }
}

/// A listener that discards all updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressListener for NoProgress {
    fn on_start(&mut self, _stage: &str) {}

    fn on_step(&mut self, _current: usize, _total: usize) {}

    fn on_complete(&mut self, _stage: &str) {}
}

/// One recorded progress notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Start(String),
    Step { current: usize, total: usize },
    Complete(String),
}

/// A listener that records every notification in order.
#[derive(Debug, Clone, Default)]
pub struct ProgressLog {
    pub events: Vec<ProgressEvent>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded step notifications as `(current, total)` pairs.
    pub fn steps(&self) -> Vec<(usize, usize)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::Step { current, total } => Some((*current, *total)),
                _ => None,
            })
            .collect()
    }

    /// Check the recorded sequence against the listener contract.
    ///
    /// Returns a description of the first violation, if any. Several units
    /// of work may be recorded back to back.
    pub fn check_contract(&self) -> Result<(), String> {
        let mut open: Option<&str> = None;
        for (i, event) in self.events.iter().enumerate() {
            match (event, open) {
                (ProgressEvent::Start(stage), None) => open = Some(stage.as_str()),
                (ProgressEvent::Start(stage), Some(current)) => {
                    return Err(format!(
                        "event {}: start of '{}' while '{}' is still running",
                        i, stage, current
                    ));
                }
                (ProgressEvent::Step { current, total }, Some(_)) => {
                    if current > total {
                        return Err(format!(
                            "event {}: step {} exceeds total {}",
                            i, current, total
                        ));
                    }
                }
                (ProgressEvent::Step { .. }, None) => {
                    return Err(format!("event {}: step outside of a unit of work", i));
                }
                (ProgressEvent::Complete(_), Some(_)) => open = None,
                (ProgressEvent::Complete(stage), None) => {
                    return Err(format!("event {}: completion of '{}' without a start", i, stage));
                }
            }
        }
        match open {
            Some(stage) => Err(format!("'{}' never completed", stage)),
            None => Ok(()),
        }
    }
}

impl ProgressListener for ProgressLog {
    fn on_start(&mut self, stage: &str) {
        self.events.push(ProgressEvent::Start(stage.to_string()));
    }

    fn on_step(&mut self, current: usize, total: usize) {
        self.events.push(ProgressEvent::Step { current, total });
    }

    fn on_complete(&mut self, stage: &str) {
        self.events.push(ProgressEvent::Complete(stage.to_string()));
    }
}
