use std::collections::VecDeque;

use super::{MediaCapability, MediaEvent};

#[derive(Debug, Default)]
pub struct SimulatedMedia {
    locator: Option<String>,
    time: f64,
    duration: Option<f64>,
    playing: bool,
    muted: bool,
    reject_next_play: Option<String>,
    events: VecDeque<MediaEvent>,
    seeks: Vec<f64>,
}

impl SimulatedMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(duration: f64) -> Self {
        let mut media = Self::new();
        media.load("simulated");
        media.finish_loading(duration);
        media
    }

    pub fn finish_loading(&mut self, duration: f64) {
        self.duration = Some(duration);
        self.events.push_back(MediaEvent::MetadataLoaded { duration });
    }

    pub fn reject_next_play(&mut self, reason: impl Into<String>) {
        self.reject_next_play = Some(reason.into());
    }

    pub fn fail_decode(&mut self, reason: impl Into<String>) {
        self.playing = false;
        self.events.push_back(MediaEvent::DecodeError(reason.into()));
    }

    pub fn advance(&mut self, seconds: f64) {
        if !self.playing {
            return;
        }
        let Some(duration) = self.duration else {
            return;
        };

        self.time += seconds;
        if self.time >= duration {
            self.time = duration;
            self.playing = false;
            self.events.push_back(MediaEvent::TimeAdvanced(self.time));
            self.events.push_back(MediaEvent::EndReached);
        } else {
            self.events.push_back(MediaEvent::TimeAdvanced(self.time));
        }
    }

    pub fn tick(&mut self) {
        self.events.push_back(MediaEvent::TimeAdvanced(self.time));
    }

    pub fn locator(&self) -> Option<&str> {
        self.locator.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Every `set_current_time` call, in order.
    pub fn seeks(&self) -> &[f64] {
        &self.seeks
    }
}

impl MediaCapability for SimulatedMedia {
    fn load(&mut self, locator: &str) {
        self.locator = Some(locator.to_string());
        self.time = 0.0;
        self.duration = None;
        self.playing = false;
        self.events.clear();
        self.seeks.clear();
    }

    fn play(&mut self) {
        if self.duration.is_none() {
            self.events
                .push_back(MediaEvent::PlayRejected("source not ready".to_string()));
            return;
        }
        if let Some(reason) = self.reject_next_play.take() {
            self.events.push_back(MediaEvent::PlayRejected(reason));
            return;
        }
        if !self.playing {
            self.playing = true;
            self.events.push_back(MediaEvent::PlaybackStarted);
        }
    }

    fn pause(&mut self) {
        if self.playing {
            self.playing = false;
            self.events.push_back(MediaEvent::PlaybackStopped);
        }
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let upper = self.duration.unwrap_or(0.0);
        self.time = seconds.max(0.0).min(upper);
        self.seeks.push(self.time);
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn poll_event(&mut self) -> Option<MediaEvent> {
        self.events.pop_front()
    }
}
