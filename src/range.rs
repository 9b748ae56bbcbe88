/// Shortest selectable clip, in seconds.
pub const MIN_SPAN: f64 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrimRange {
    pub start: f64,
    pub end: f64,
}

impl Default for TrimRange {
    fn default() -> Self {
        TrimRange {
            start: 0.0,
            end: 0.0,
        }
    }
}

impl TrimRange {
    pub fn new(start: f64, end: f64) -> Self {
        TrimRange { start, end }
    }

    pub fn full(duration: f64) -> Self {
        TrimRange {
            start: 0.0,
            end: duration.max(0.0),
        }
    }

    pub fn span(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    pub fn clamp_time(&self, time: f64) -> f64 {
        time.max(self.start).min(self.end)
    }

    pub fn with_start(&self, time: f64, min_span: f64) -> Self {
        let start = time.max(0.0).min(self.end - min_span).max(0.0);
        TrimRange {
            start,
            end: self.end,
        }
    }

    pub fn with_end(&self, time: f64, duration: f64, min_span: f64) -> Self {
        let end = time.min(duration).max(self.start + min_span).min(duration);
        TrimRange {
            start: self.start,
            end,
        }
    }

    /// Bounds that would leave `[0, duration]` push the whole range back inside.
    pub fn translated(&self, delta: f64, duration: f64) -> Self {
        let span = self.span();
        let latest_start = (duration - span).max(0.0);
        let start = (self.start + delta).max(0.0).min(latest_start);

        TrimRange {
            start,
            end: start + span,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StripScale {
    pub duration: f64,
    pub width: f64,
}

impl StripScale {
    pub fn new(duration: f64, width: f64) -> Self {
        StripScale { duration, width }
    }

    pub fn is_usable(&self) -> bool {
        self.duration > 0.0 && self.width > 0.0
    }

    pub fn percent_from_time(&self, time: f64) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        time / self.duration
    }

    pub fn time_from_percent(&self, percent: f64) -> f64 {
        self.duration * percent
    }

    pub fn x_from_time(&self, time: f64) -> f64 {
        self.percent_from_time(time) * self.width
    }

    pub fn time_from_x(&self, x: f64) -> f64 {
        if !self.is_usable() {
            return 0.0;
        }
        self.time_from_percent(x / self.width)
            .max(0.0)
            .min(self.duration)
    }

    pub fn delta_time(&self, delta_x: f64) -> f64 {
        if !self.is_usable() {
            return 0.0;
        }
        delta_x / self.width * self.duration
    }
}
