use tracing::debug;

use crate::range::{StripScale, TrimRange, MIN_SPAN};

use super::drag::Handle;

#[derive(Debug, Clone)]
pub struct TrimEditor {
    range: TrimRange,
    min_span: f64,
}

impl Default for TrimEditor {
    fn default() -> Self {
        Self::new(MIN_SPAN)
    }
}

impl TrimEditor {
    pub fn new(min_span: f64) -> Self {
        TrimEditor {
            range: TrimRange::default(),
            min_span,
        }
    }

    pub fn range(&self) -> TrimRange {
        self.range
    }

    pub fn min_span(&self) -> f64 {
        self.min_span
    }

    pub fn reset(&mut self, duration: f64) {
        self.range = TrimRange::full(duration);
        debug!(end = self.range.end, "trim range reset");
    }

    pub fn hit_test(&self, x: f64, scale: &StripScale, radius: f64) -> Option<Handle> {
        if !scale.is_usable() {
            return None;
        }

        let to_start = (x - scale.x_from_time(self.range.start)).abs();
        let to_end = (x - scale.x_from_time(self.range.end)).abs();

        match (to_start <= radius, to_end <= radius) {
            (true, true) if to_end < to_start => Some(Handle::End),
            (true, _) => Some(Handle::Start),
            (false, true) => Some(Handle::End),
            (false, false) => None,
        }
    }

    pub fn drag_handle(
        &mut self,
        handle: Handle,
        pointer_time: f64,
        duration: f64,
        position: f64,
    ) -> Option<f64> {
        match handle {
            Handle::Start => {
                self.range = self.range.with_start(pointer_time, self.min_span);
                (position < self.range.start).then_some(self.range.start)
            }
            Handle::End => {
                self.range = self.range.with_end(pointer_time, duration, self.min_span);
                (position > self.range.end).then_some(self.range.end)
            }
        }
    }

    /// The result is always derived from the anchor, never from the
    /// previous move, so the span is the anchor's span for the whole gesture.
    pub fn drag_box(
        &mut self,
        anchor_trim: TrimRange,
        anchor_x: f64,
        pointer_x: f64,
        scale: &StripScale,
        position: f64,
    ) -> Option<f64> {
        let delta = scale.delta_time(pointer_x - anchor_x);
        self.range = anchor_trim.translated(delta, scale.duration);

        if self.range.contains(position) {
            None
        } else {
            Some(self.range.clamp_time(position))
        }
    }
}
