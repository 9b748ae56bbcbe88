use std::time::{Duration, Instant};

use tracing::trace;

use crate::config::EngineConfig;
use crate::video::MediaCapability;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingSeek {
    pub target: f64,
    pub immediate: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SeekOutcome {
    Idle,
    Applied(f64),
    Redundant,
    Deferred,
}

#[derive(Debug)]
pub struct SeekCoalescer {
    pending: Option<PendingSeek>,
    last_throttled: Option<Instant>,
    epsilon: f64,
    throttle: Duration,
}

impl SeekCoalescer {
    pub fn new(epsilon: f64, throttle: Duration) -> Self {
        Self {
            pending: None,
            last_throttled: None,
            epsilon,
            throttle,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.seek_epsilon, config.seek_throttle())
    }

    pub fn request(&mut self, target: f64, immediate: bool) {
        self.pending = Some(PendingSeek { target, immediate });
    }

    pub fn flush(&mut self) {
        if let Some(pending) = self.pending.as_mut() {
            pending.immediate = true;
        }
    }

    pub fn pending(&self) -> Option<PendingSeek> {
        self.pending
    }

    pub fn clear(&mut self) {
        self.pending = None;
        self.last_throttled = None;
    }

    pub fn on_frame<M: MediaCapability>(&mut self, media: &mut M, now: Instant) -> SeekOutcome {
        let Some(seek) = self.pending.take() else {
            return SeekOutcome::Idle;
        };

        if !seek.immediate {
            if let Some(last) = self.last_throttled {
                if now.saturating_duration_since(last) < self.throttle {
                    self.pending = Some(seek);
                    return SeekOutcome::Deferred;
                }
            }

            if (seek.target - media.current_time()).abs() <= self.epsilon {
                trace!(target = seek.target, "dropping redundant seek");
                return SeekOutcome::Redundant;
            }
            self.last_throttled = Some(now);
        }

        trace!(
            target = seek.target,
            immediate = seek.immediate,
            "applying seek"
        );
        media.set_current_time(seek.target);
        SeekOutcome::Applied(seek.target)
    }
}
