use std::collections::VecDeque;
use std::path::Path;

use anyhow::Context;
use gst::prelude::*;
use gst::{ClockTime, MessageView, SeekFlags, State};
use tracing::{debug, warn};

use super::{MediaCapability, MediaEvent};

fn seconds(time: ClockTime) -> f64 {
    time.nseconds() as f64 / 1_000_000_000.0
}

fn clock_time(seconds: f64) -> ClockTime {
    ClockTime::from_nseconds((seconds.max(0.0) * 1_000_000_000.0) as u64)
}

/// Bus messages are read on demand from [`MediaCapability::poll_event`], so
/// the owner drives everything from its frame callback.
#[derive(Debug)]
pub struct GstMedia {
    playbin: gst::Element,
    bus: gst::Bus,
    events: VecDeque<MediaEvent>,
    duration: Option<f64>,
    last_position: f64,
    playing: bool,
    ended: bool,
    ticked: bool,
}

impl GstMedia {
    pub fn new(video_sink: Option<&gst::Element>) -> anyhow::Result<Self> {
        gst::init()?;

        let playbin = gst::ElementFactory::make("playbin")
            .build()
            .context("creating playbin")?;
        if let Some(sink) = video_sink {
            playbin.set_property("video-sink", sink.clone());
        }
        let bus = playbin.bus().context("playbin has no bus")?;

        Ok(GstMedia {
            playbin,
            bus,
            events: VecDeque::new(),
            duration: None,
            last_position: 0.0,
            playing: false,
            ended: false,
            ticked: false,
        })
    }

    fn set_state(&self, state: State) -> Result<(), String> {
        self.playbin
            .set_state(state)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    fn is_from_playbin(&self, msg: &gst::Message) -> bool {
        msg.src() == Some(self.playbin.upcast_ref::<gst::Object>())
    }

    fn query_duration(&mut self) {
        if self.duration.is_some() {
            return;
        }
        if let Some(duration) = self.playbin.query_duration::<ClockTime>() {
            let duration = seconds(duration);
            debug!(duration, "playbin prerolled");
            self.duration = Some(duration);
            self.events.push_back(MediaEvent::MetadataLoaded { duration });
        }
    }

    fn drain_bus(&mut self) {
        while let Some(msg) = self.bus.pop() {
            match msg.view() {
                MessageView::AsyncDone(..) | MessageView::DurationChanged(..) => {
                    self.query_duration();
                }
                MessageView::StateChanged(change) if self.is_from_playbin(&msg) => {
                    match (change.old(), change.current()) {
                        (_, State::Playing) if !self.playing => {
                            self.playing = true;
                            self.events.push_back(MediaEvent::PlaybackStarted);
                        }
                        (State::Playing, _) if self.playing => {
                            self.playing = false;
                            self.events.push_back(MediaEvent::PlaybackStopped);
                        }
                        _ => {}
                    }
                }
                MessageView::Eos(..) => {
                    self.playing = false;
                    self.ended = true;
                    self.events.push_back(MediaEvent::EndReached);
                }
                MessageView::Error(err) => {
                    let reason = err.error().to_string();
                    warn!(%reason, debug = ?err.debug(), "playbin error");
                    self.playing = false;
                    if self.duration.is_none() {
                        self.events.push_back(MediaEvent::PlayRejected(reason));
                    } else {
                        self.events.push_back(MediaEvent::DecodeError(reason));
                    }
                }
                _ => {}
            }
        }
    }
}

impl MediaCapability for GstMedia {
    fn load(&mut self, locator: &str) {
        if let Err(e) = self.set_state(State::Null) {
            warn!(error = %e, "resetting playbin");
        }
        self.events.clear();
        self.duration = None;
        self.last_position = 0.0;
        self.playing = false;
        self.ended = false;

        let uri = if locator.contains("://") {
            Ok(locator.into())
        } else {
            gst::glib::filename_to_uri(Path::new(locator), None)
        };
        match uri {
            Ok(uri) => {
                self.playbin.set_property("uri", uri.as_str());
                // preroll so the duration becomes queryable
                if let Err(e) = self.set_state(State::Paused) {
                    self.events.push_back(MediaEvent::DecodeError(e));
                }
            }
            Err(e) => self.events.push_back(MediaEvent::DecodeError(e.to_string())),
        }
    }

    fn play(&mut self) {
        if self.duration.is_none() {
            self.events
                .push_back(MediaEvent::PlayRejected("video is still loading".to_string()));
            return;
        }
        match self.set_state(State::Playing) {
            // the pipeline stays in Playing after EOS, so no state change follows
            Ok(()) if self.ended => {
                self.ended = false;
                self.playing = true;
            }
            Ok(()) => {}
            Err(e) => self.events.push_back(MediaEvent::PlayRejected(e)),
        }
    }

    fn pause(&mut self) {
        self.ended = false;
        if let Err(e) = self.set_state(State::Paused) {
            warn!(error = %e, "pausing playbin");
        }
    }

    fn current_time(&self) -> f64 {
        self.playbin
            .query_position::<ClockTime>()
            .map(seconds)
            .unwrap_or(self.last_position)
    }

    fn set_current_time(&mut self, seconds: f64) {
        // the position must read back as exactly the requested time
        let flags = SeekFlags::FLUSH | SeekFlags::ACCURATE;
        match self.playbin.seek_simple(flags, clock_time(seconds)) {
            Ok(()) => self.last_position = seconds,
            Err(e) => warn!(seconds, error = %e, "seek failed"),
        }
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn set_muted(&mut self, muted: bool) {
        self.playbin.set_property("mute", muted);
    }

    fn poll_event(&mut self) -> Option<MediaEvent> {
        if self.events.is_empty() {
            if self.ticked {
                self.ticked = false;
                return None;
            }
            self.drain_bus();
            if self.playing {
                let position = self.current_time();
                self.last_position = position;
                self.events.push_back(MediaEvent::TimeAdvanced(position));
            }
            self.ticked = !self.events.is_empty();
        }
        self.events.pop_front()
    }
}

impl Drop for GstMedia {
    fn drop(&mut self) {
        let _ = self.set_state(State::Null);
    }
}
