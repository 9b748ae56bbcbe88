use tracing::{debug, warn};

use crate::error::PlaybackError;
use crate::range::TrimRange;
use crate::video::{MediaCapability, MediaEvent};

use super::drag::TimeOwner;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Paused,
    Playing,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PlaybackClock {
    pub current_time: f64,
    /// `None` until metadata for the current source arrives.
    pub duration: Option<f64>,
    pub is_playing: bool,
    pub is_looping: bool,
    pub is_muted: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SyncEffect {
    DurationKnown(f64),
    SeekTo(f64),
}

#[derive(Debug)]
pub struct PlaybackSynchronizer<M> {
    media: M,
    clock: PlaybackClock,
    state: PlaybackState,
    play_requested: bool,
    error: Option<PlaybackError>,
    tolerance: f64,
}

impl<M: MediaCapability> PlaybackSynchronizer<M> {
    pub fn new(media: M, tolerance: f64) -> Self {
        PlaybackSynchronizer {
            media,
            clock: PlaybackClock::default(),
            state: PlaybackState::Paused,
            play_requested: false,
            error: None,
            tolerance,
        }
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    pub fn clock(&self) -> PlaybackClock {
        self.clock
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn duration(&self) -> Option<f64> {
        self.clock.duration
    }

    pub fn position(&self) -> f64 {
        self.clock.current_time
    }

    pub fn reset_for_source(&mut self, locator: &str) {
        self.media.load(locator);
        self.media.set_muted(self.clock.is_muted);

        self.clock = PlaybackClock {
            is_looping: self.clock.is_looping,
            is_muted: self.clock.is_muted,
            ..PlaybackClock::default()
        };
        self.state = PlaybackState::Paused;
        self.play_requested = false;
        self.error = None;
        debug!(locator, "media source reset");
    }

    pub fn play(&mut self) {
        if self.state == PlaybackState::Playing || self.play_requested {
            return;
        }
        self.play_requested = true;
        self.media.play();
    }

    pub fn pause(&mut self) {
        self.play_requested = false;
        self.media.pause();
        if self.state == PlaybackState::Playing {
            debug!(at = self.clock.current_time, "paused");
        }
        self.state = PlaybackState::Paused;
        self.clock.is_playing = false;
    }

    pub fn toggle_play(&mut self) {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.play(),
        }
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.clock.is_looping = looping;
    }

    pub fn toggle_mute(&mut self) {
        self.clock.is_muted = !self.clock.is_muted;
        self.media.set_muted(self.clock.is_muted);
    }

    pub fn set_position(&mut self, seconds: f64) {
        self.clock.current_time = seconds;
    }

    pub fn poll_event(&mut self) -> Option<MediaEvent> {
        self.media.poll_event()
    }

    pub fn take_error(&mut self) -> Option<PlaybackError> {
        self.error.take()
    }

    pub fn handle_event(
        &mut self,
        event: MediaEvent,
        owner: TimeOwner,
        trim: &TrimRange,
    ) -> Option<SyncEffect> {
        match event {
            MediaEvent::MetadataLoaded { duration } => {
                debug!(duration, "metadata loaded");
                self.clock.duration = Some(duration);
                self.clock.current_time = 0.0;
                Some(SyncEffect::DurationKnown(duration))
            }
            MediaEvent::PlaybackStarted => {
                if self.play_requested {
                    self.play_requested = false;
                    self.state = PlaybackState::Playing;
                    self.clock.is_playing = true;
                    debug!(at = self.clock.current_time, "playing");
                } else if self.state == PlaybackState::Paused {
                    // a pause won the race against the start request
                    self.media.pause();
                }
                None
            }
            MediaEvent::PlaybackStopped => {
                if !self.play_requested {
                    self.state = PlaybackState::Paused;
                    self.clock.is_playing = false;
                }
                None
            }
            MediaEvent::PlayRejected(reason) => {
                warn!(%reason, "playback rejected");
                self.play_requested = false;
                self.state = PlaybackState::Paused;
                self.clock.is_playing = false;
                self.error = Some(PlaybackError::Rejected(reason));
                None
            }
            MediaEvent::DecodeError(reason) => {
                warn!(%reason, "media error");
                self.pause();
                self.error = Some(PlaybackError::Media(reason));
                None
            }
            MediaEvent::TimeAdvanced(time) => {
                if owner != TimeOwner::Clock {
                    return None;
                }
                self.clock.current_time = time;
                self.enforce_bounds(time, trim, false)
            }
            MediaEvent::EndReached => {
                if owner != TimeOwner::Clock {
                    return None;
                }
                let end = self.clock.duration.unwrap_or(trim.end);
                self.enforce_bounds(end, trim, true)
            }
        }
    }

    fn enforce_bounds(
        &mut self,
        time: f64,
        trim: &TrimRange,
        media_ended: bool,
    ) -> Option<SyncEffect> {
        if self.state != PlaybackState::Playing {
            return None;
        }

        if time >= trim.end {
            self.clock.current_time = trim.start;
            if self.clock.is_looping {
                debug!(start = trim.start, "looping trim range");
                if media_ended {
                    self.media.play();
                }
            } else {
                self.pause();
            }
            return Some(SyncEffect::SeekTo(trim.start));
        }

        if time + self.tolerance < trim.start {
            self.clock.current_time = trim.start;
            return Some(SyncEffect::SeekTo(trim.start));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::simulated::SimulatedMedia;

    fn playing(duration: f64, looping: bool) -> PlaybackSynchronizer<SimulatedMedia> {
        let trim = TrimRange::full(duration);
        let mut sync = PlaybackSynchronizer::new(SimulatedMedia::with_duration(duration), 0.05);
        sync.set_looping(looping);
        sync.play();
        while let Some(event) = sync.poll_event() {
            sync.handle_event(event, TimeOwner::Clock, &trim);
        }
        assert_eq!(sync.state(), PlaybackState::Playing);
        sync
    }

    #[test]
    fn end_of_range_without_loop_resets_and_pauses() {
        let trim = TrimRange::new(10.0, 90.0);
        let mut sync = playing(100.0, false);

        let effect = sync.handle_event(MediaEvent::TimeAdvanced(90.0), TimeOwner::Clock, &trim);

        assert_eq!(effect, Some(SyncEffect::SeekTo(10.0)));
        assert_eq!(sync.position(), 10.0);
        assert_eq!(sync.state(), PlaybackState::Paused);
        assert!(!sync.media().is_playing());
    }

    #[test]
    fn end_of_range_with_loop_keeps_playing() {
        let trim = TrimRange::new(10.0, 90.0);
        let mut sync = playing(100.0, true);

        let effect = sync.handle_event(MediaEvent::TimeAdvanced(90.0), TimeOwner::Clock, &trim);

        assert_eq!(effect, Some(SyncEffect::SeekTo(10.0)));
        assert_eq!(sync.position(), 10.0);
        assert_eq!(sync.state(), PlaybackState::Playing);
    }

    #[test]
    fn media_end_with_loop_restarts_media() {
        let trim = TrimRange::full(5.0);
        let mut sync = playing(5.0, true);
        sync.media_mut().advance(6.0);

        let mut effects = Vec::new();
        while let Some(event) = sync.poll_event() {
            effects.extend(sync.handle_event(event, TimeOwner::Clock, &trim));
        }

        assert!(effects.contains(&SyncEffect::SeekTo(0.0)));
        assert_eq!(sync.state(), PlaybackState::Playing);
        assert!(sync.media().is_playing());
    }

    #[test]
    fn ticks_are_ignored_while_a_drag_owns_time() {
        let trim = TrimRange::new(10.0, 90.0);
        let mut sync = playing(100.0, false);
        sync.set_position(42.0);

        for owner in [TimeOwner::TrimEditor, TimeOwner::SeekCoalescer] {
            let effect = sync.handle_event(MediaEvent::TimeAdvanced(95.0), owner, &trim);
            assert_eq!(effect, None);
            assert_eq!(sync.position(), 42.0);
        }
        assert_eq!(sync.state(), PlaybackState::Playing);
    }

    #[test]
    fn tick_before_start_snaps_forward() {
        let trim = TrimRange::new(10.0, 90.0);
        let mut sync = playing(100.0, false);

        let effect = sync.handle_event(MediaEvent::TimeAdvanced(3.0), TimeOwner::Clock, &trim);

        assert_eq!(effect, Some(SyncEffect::SeekTo(10.0)));
        assert_eq!(sync.position(), 10.0);
    }

    #[test]
    fn rejected_play_stays_paused_and_reports_once() {
        let trim = TrimRange::full(30.0);
        let mut sync = PlaybackSynchronizer::new(SimulatedMedia::with_duration(30.0), 0.05);
        sync.media_mut().reject_next_play("not allowed");
        sync.play();
        while let Some(event) = sync.poll_event() {
            sync.handle_event(event, TimeOwner::Clock, &trim);
        }

        assert_eq!(sync.state(), PlaybackState::Paused);
        assert_eq!(
            sync.take_error(),
            Some(PlaybackError::Rejected("not allowed".to_string()))
        );
        assert_eq!(sync.take_error(), None);
    }

    #[test]
    fn pause_wins_over_late_start() {
        let trim = TrimRange::full(30.0);
        let mut sync = PlaybackSynchronizer::new(SimulatedMedia::with_duration(30.0), 0.05);
        sync.play();
        sync.pause();
        while let Some(event) = sync.poll_event() {
            sync.handle_event(event, TimeOwner::Clock, &trim);
        }

        assert_eq!(sync.state(), PlaybackState::Paused);
        assert!(!sync.media().is_playing());
    }

    #[test]
    fn decode_error_stops_playback() {
        let trim = TrimRange::full(30.0);
        let mut sync = playing(30.0, false);
        sync.media_mut().fail_decode("corrupt stream");

        while let Some(event) = sync.poll_event() {
            sync.handle_event(event, TimeOwner::Clock, &trim);
        }

        assert_eq!(sync.state(), PlaybackState::Paused);
        assert!(matches!(sync.take_error(), Some(PlaybackError::Media(_))));
    }

    #[test]
    fn new_source_clears_duration_but_keeps_preferences() {
        let mut sync = playing(30.0, true);
        sync.toggle_mute();

        sync.reset_for_source("next.mp4");

        let clock = sync.clock();
        assert_eq!(clock.duration, None);
        assert!(clock.is_looping);
        assert!(clock.is_muted);
        assert!(sync.media().is_muted());
        assert_eq!(sync.state(), PlaybackState::Paused);
    }
}
