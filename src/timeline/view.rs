use std::time::Instant;

use tracing::{debug, info};

use crate::config::{EngineConfig, ExportSettings};
use crate::error::{PlaybackError, WaveformError};
use crate::range::{StripScale, TrimRange};
use crate::video::export::{ClipSummary, ExportRequest};
use crate::video::{LibraryEvent, MediaCapability, SourceInfo};
use crate::waveform::{SourceId, WaveformProfile, WaveformSlot, WaveformStatus};

use super::drag::{DragSession, TimeOwner};
use super::frame::{FrameInput, TimelineFrame};
use super::seek::{SeekCoalescer, SeekOutcome};
use super::sync::{PlaybackClock, PlaybackState, PlaybackSynchronizer, SyncEffect};
use super::trim_editor::TrimEditor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// `Up` and `Leave` are expected from anywhere in the window, not only
/// from over the strip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down { x: f64, button: PointerButton },
    Move { x: f64 },
    Up,
    Leave,
}

pub struct TimelineView<M> {
    sync: PlaybackSynchronizer<M>,
    seeks: SeekCoalescer,
    editor: TrimEditor,
    session: DragSession,
    waveform: WaveformSlot,
    source: Option<SourceInfo>,
    source_id: SourceId,
    width: f64,
    height: f64,
    hit_radius: f64,
}

impl<M: MediaCapability> TimelineView<M> {
    pub fn new(media: M, config: &EngineConfig) -> Self {
        TimelineView {
            sync: PlaybackSynchronizer::new(media, config.seek_epsilon),
            seeks: SeekCoalescer::from_config(config),
            editor: TrimEditor::new(config.min_span),
            session: DragSession::Idle,
            waveform: WaveformSlot::default(),
            source: None,
            source_id: SourceId::default(),
            width: 0.0,
            height: 0.0,
            hit_radius: config.handle_hit_radius,
        }
    }

    pub fn load_source(&mut self, source: SourceInfo) -> SourceId {
        self.source_id = self.source_id.next();
        info!(path = ?source.path, id = self.source_id.0, "loading source");

        self.sync.reset_for_source(&source.locator());
        self.seeks.clear();
        self.editor.reset(0.0);
        self.session = DragSession::Idle;
        self.waveform.begin(self.source_id);
        self.source = Some(source);
        self.source_id
    }

    pub fn select_source(&mut self, source: SourceInfo) -> Option<SourceId> {
        match self.source.as_mut() {
            Some(current) if current.path == source.path => {
                *current = source;
                None
            }
            _ => Some(self.load_source(source)),
        }
    }

    pub fn on_library_event(&mut self, event: &LibraryEvent) -> Option<SourceId> {
        if !event.requests_reload() {
            return None;
        }
        debug!(?event, "library reload requested");

        match (event, &self.source) {
            (LibraryEvent::FileChanged(path), Some(current)) if *path == current.path => {
                let source = current.clone();
                Some(self.load_source(source))
            }
            _ => None,
        }
    }

    pub fn set_strip_size(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    fn scale(&self) -> Option<StripScale> {
        let scale = StripScale::new(self.sync.duration()?, self.width);
        scale.is_usable().then_some(scale)
    }

    pub fn time_owner(&self) -> TimeOwner {
        if self.seeks.pending().is_some() {
            TimeOwner::SeekCoalescer
        } else {
            self.session.time_owner()
        }
    }

    pub fn on_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { x, button } => self.pointer_down(x, button),
            PointerEvent::Move { x } => self.pointer_move(x),
            PointerEvent::Up | PointerEvent::Leave => self.end_session(),
        }
    }

    fn pointer_down(&mut self, x: f64, button: PointerButton) {
        // nothing is editable until the duration is known
        let Some(scale) = self.scale() else {
            return;
        };
        self.end_session();

        match button {
            PointerButton::Primary => {
                if let Some(handle) = self.editor.hit_test(x, &scale, self.hit_radius) {
                    self.sync.pause();
                    self.session = DragSession::DraggingHandle(handle);
                } else {
                    self.session = DragSession::ScrubbingPlayhead;
                    self.scrub_to(scale.time_from_x(x), true);
                }
            }
            PointerButton::Secondary => {
                self.session = DragSession::BoxSelecting {
                    anchor_trim: self.editor.range(),
                    anchor_x: x,
                };
            }
        }
        debug!(session = ?self.session, "drag started");
    }

    fn pointer_move(&mut self, x: f64) {
        let Some(scale) = self.scale() else {
            return;
        };
        let position = self.sync.position();

        let snap = match self.session {
            DragSession::Idle => None,
            DragSession::ScrubbingPlayhead => {
                self.scrub_to(scale.time_from_x(x), false);
                None
            }
            DragSession::DraggingHandle(handle) => {
                let time = scale.time_from_x(x);
                self.editor.drag_handle(handle, time, scale.duration, position)
            }
            DragSession::BoxSelecting {
                anchor_trim,
                anchor_x,
            } => self.editor.drag_box(anchor_trim, anchor_x, x, &scale, position),
        };

        if let Some(time) = snap {
            self.seek_now(time);
        }
    }

    fn end_session(&mut self) {
        if !self.session.is_active() {
            return;
        }
        if self.session == DragSession::ScrubbingPlayhead {
            self.seeks.flush();
        }
        debug!(session = ?self.session, trim = ?self.editor.range(), "drag ended");
        self.session = DragSession::Idle;
    }

    fn scrub_to(&mut self, time: f64, immediate: bool) {
        let time = self.editor.range().clamp_time(time);
        self.seeks.request(time, immediate);
        self.sync.set_position(time);
    }

    fn seek_now(&mut self, time: f64) {
        self.seeks.request(time, true);
        self.sync.set_position(time);
    }

    pub fn frame(&mut self, now: Instant) -> TimelineFrame {
        while let Some(event) = self.sync.poll_event() {
            let owner = self.time_owner();
            let trim = self.editor.range();

            match self.sync.handle_event(event, owner, &trim) {
                Some(SyncEffect::DurationKnown(duration)) => {
                    self.editor.reset(duration);
                    self.seek_now(self.editor.range().start);
                }
                Some(SyncEffect::SeekTo(time)) => self.seek_now(time),
                None => {}
            }
        }

        if let SeekOutcome::Applied(time) = self.seeks.on_frame(self.sync.media_mut(), now) {
            if !self.session.is_active() {
                self.sync.set_position(time);
            }
        }

        TimelineFrame::compose(FrameInput {
            width: self.width,
            height: self.height,
            duration: self.sync.duration(),
            trim: self.editor.range(),
            position: self.sync.position(),
            waveform: self.waveform.status(),
            session: &self.session,
        })
    }

    pub fn play(&mut self) {
        self.sync.play();
    }

    pub fn pause(&mut self) {
        self.sync.pause();
    }

    pub fn toggle_play(&mut self) {
        self.sync.toggle_play();
    }

    pub fn toggle_loop(&mut self) {
        let looping = !self.sync.clock().is_looping;
        self.sync.set_looping(looping);
    }

    pub fn toggle_mute(&mut self) {
        self.sync.toggle_mute();
    }

    pub fn jump_to_start(&mut self) {
        if self.sync.duration().is_some() {
            self.seek_now(self.editor.range().start);
        }
    }

    pub fn jump_to_end(&mut self) {
        if self.sync.duration().is_some() {
            self.seek_now(self.editor.range().end);
        }
    }

    pub fn complete_waveform(
        &mut self,
        source: SourceId,
        result: Result<WaveformProfile, WaveformError>,
    ) -> bool {
        self.waveform.complete(source, result)
    }

    pub fn clip_summary(&self) -> Option<ClipSummary> {
        let duration = self.sync.duration()?;
        let size = self.source.as_ref().and_then(|source| source.size_bytes);
        Some(ClipSummary::new(self.editor.range().span(), duration, size))
    }

    pub fn export_request(&self, settings: &ExportSettings, title: &str) -> Option<ExportRequest> {
        let source = self.source.as_ref()?;
        self.sync.duration()?;
        Some(ExportRequest::new(source, self.editor.range(), settings, title))
    }

    pub fn take_playback_error(&mut self) -> Option<PlaybackError> {
        self.sync.take_error()
    }

    pub fn trim(&self) -> TrimRange {
        self.editor.range()
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn position(&self) -> f64 {
        self.sync.position()
    }

    pub fn duration(&self) -> Option<f64> {
        self.sync.duration()
    }

    pub fn clock(&self) -> PlaybackClock {
        self.sync.clock()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.sync.state()
    }

    pub fn waveform_status(&self) -> &WaveformStatus {
        self.waveform.status()
    }

    pub fn source(&self) -> Option<&SourceInfo> {
        self.source.as_ref()
    }

    pub fn source_id(&self) -> SourceId {
        self.source_id
    }

    pub fn media(&self) -> &M {
        self.sync.media()
    }

    pub fn media_mut(&mut self) -> &mut M {
        self.sync.media_mut()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::timeline::drag::Handle;
    use crate::timeline::frame::WaveformLayer;
    use crate::video::simulated::SimulatedMedia;
    use approx::assert_relative_eq;

    struct Harness {
        view: TimelineView<SimulatedMedia>,
        now: Instant,
    }

    impl Harness {
        /// 100 s source on a 1000 px strip, 10 px per second.
        fn loaded() -> Self {
            let mut view = TimelineView::new(SimulatedMedia::new(), &EngineConfig::default());
            view.set_strip_size(1000.0, 50.0);
            view.load_source(SourceInfo::new("/videos/match.mp4"));
            view.media_mut().finish_loading(100.0);

            let mut harness = Harness {
                view,
                now: Instant::now(),
            };
            harness.frame();
            harness
        }

        fn frame(&mut self) -> TimelineFrame {
            self.now += Duration::from_millis(16);
            self.view.frame(self.now)
        }

        fn frames(&mut self, count: usize) {
            for _ in 0..count {
                self.frame();
            }
        }

        fn drag(&mut self, button: PointerButton, from: f64, to: f64) {
            self.view.on_pointer(PointerEvent::Down { x: from, button });
            self.view.on_pointer(PointerEvent::Move { x: to });
            self.view.on_pointer(PointerEvent::Up);
            self.frame();
        }
    }

    #[test]
    fn metadata_resets_trim_to_full_range() {
        let harness = Harness::loaded();

        assert_eq!(harness.view.duration(), Some(100.0));
        assert_eq!(harness.view.trim(), TrimRange::new(0.0, 100.0));
        assert_eq!(harness.view.waveform_status(), &WaveformStatus::Loading);
    }

    #[test]
    fn scrub_coalesces_moves_and_flushes_on_release() {
        let mut harness = Harness::loaded();
        let seeks_before = harness.view.media().seeks().len();

        harness.view.on_pointer(PointerEvent::Down {
            x: 400.0,
            button: PointerButton::Primary,
        });
        harness.frame();
        assert_relative_eq!(harness.view.media().current_time(), 40.0);

        for x in [410.0, 420.0, 430.0, 440.0] {
            harness.view.on_pointer(PointerEvent::Move { x });
        }
        assert_relative_eq!(harness.view.position(), 44.0);
        harness.frame();

        harness.view.on_pointer(PointerEvent::Up);
        assert_eq!(harness.view.session(), &DragSession::Idle);
        harness.frame();

        assert_relative_eq!(harness.view.media().current_time(), 44.0);
        let applied = &harness.view.media().seeks()[seeks_before..];
        assert!(applied.len() <= 3, "applied {applied:?}");
        assert_relative_eq!(*applied.last().unwrap(), 44.0);
    }

    #[test]
    fn clock_ticks_do_not_move_a_scrubbed_playhead() {
        let mut harness = Harness::loaded();
        harness.view.play();
        harness.frame();

        harness.view.on_pointer(PointerEvent::Down {
            x: 700.0,
            button: PointerButton::Primary,
        });
        harness.frame();
        harness.view.on_pointer(PointerEvent::Move { x: 300.0 });
        harness.view.media_mut().advance(0.5);
        harness.frame();

        assert_relative_eq!(harness.view.position(), 30.0);
    }

    #[test]
    fn handle_drag_pauses_and_snaps_position() {
        let mut harness = Harness::loaded();
        harness.drag(PointerButton::Primary, 300.0, 300.0);
        assert_relative_eq!(harness.view.position(), 30.0);
        harness.view.play();
        harness.frame();
        assert_eq!(harness.view.playback_state(), PlaybackState::Playing);

        harness.view.on_pointer(PointerEvent::Down {
            x: 2.0,
            button: PointerButton::Primary,
        });
        assert_eq!(
            harness.view.session(),
            &DragSession::DraggingHandle(Handle::Start)
        );
        assert_eq!(harness.view.playback_state(), PlaybackState::Paused);

        harness.view.on_pointer(PointerEvent::Move { x: 500.0 });
        assert_relative_eq!(harness.view.trim().start, 50.0);
        assert_relative_eq!(harness.view.position(), 50.0);

        harness.view.on_pointer(PointerEvent::Up);
        harness.frame();
        assert_relative_eq!(harness.view.media().current_time(), 50.0);
    }

    #[test]
    fn box_selection_translates_and_ends_on_leave() {
        let mut harness = Harness::loaded();
        harness.drag(PointerButton::Primary, 998.0, 600.0);
        assert_relative_eq!(harness.view.trim().end, 60.0);

        harness.view.on_pointer(PointerEvent::Down {
            x: 100.0,
            button: PointerButton::Secondary,
        });
        harness.view.on_pointer(PointerEvent::Move { x: 900.0 });
        harness.view.on_pointer(PointerEvent::Move { x: 350.0 });

        let trim = harness.view.trim();
        assert_relative_eq!(trim.start, 25.0);
        assert_relative_eq!(trim.end, 85.0);
        assert!(harness.frame().box_selecting);

        harness.view.on_pointer(PointerEvent::Leave);
        assert!(!harness.view.session().is_active());
        harness.view.on_pointer(PointerEvent::Move { x: 0.0 });
        assert_relative_eq!(harness.view.trim().start, 25.0);
    }

    #[test]
    fn playback_stops_at_trim_end_and_rewinds() {
        let mut harness = Harness::loaded();
        harness.drag(PointerButton::Primary, 0.0, 100.0);
        harness.drag(PointerButton::Primary, 1000.0, 900.0);
        assert_eq!(harness.view.trim(), TrimRange::new(10.0, 90.0));

        harness.view.play();
        harness.frame();
        harness.view.media_mut().set_current_time(89.9);
        harness.view.media_mut().advance(0.2);
        harness.frame();

        assert_relative_eq!(harness.view.position(), 10.0);
        assert_relative_eq!(harness.view.media().current_time(), 10.0);
        assert_eq!(harness.view.playback_state(), PlaybackState::Paused);
    }

    #[test]
    fn jumps_land_on_trim_bounds() {
        let mut harness = Harness::loaded();
        harness.drag(PointerButton::Primary, 0.0, 100.0);
        harness.drag(PointerButton::Primary, 1000.0, 900.0);

        harness.view.jump_to_end();
        harness.frame();
        assert_relative_eq!(harness.view.media().current_time(), 90.0);
        assert_relative_eq!(harness.view.position(), 90.0);

        harness.view.jump_to_start();
        harness.frame();
        assert_relative_eq!(harness.view.media().current_time(), 10.0);
        assert_relative_eq!(harness.view.position(), 10.0);
    }

    #[test]
    fn scrub_is_clamped_into_trim_range() {
        let mut harness = Harness::loaded();
        harness.drag(PointerButton::Primary, 0.0, 200.0);
        harness.drag(PointerButton::Primary, 1000.0, 800.0);
        assert_eq!(harness.view.trim(), TrimRange::new(20.0, 80.0));

        harness.drag(PointerButton::Primary, 950.0, 50.0);
        assert_relative_eq!(harness.view.position(), 20.0);
        assert_relative_eq!(harness.view.media().current_time(), 20.0);

        harness.drag(PointerButton::Primary, 500.0, 990.0);
        assert_relative_eq!(harness.view.position(), 80.0);
        assert_relative_eq!(harness.view.media().current_time(), 80.0);
    }

    #[test]
    fn looping_playback_restarts_at_trim_start() {
        let mut harness = Harness::loaded();
        harness.drag(PointerButton::Primary, 1000.0, 500.0);
        harness.view.toggle_loop();
        harness.view.play();
        harness.frame();

        harness.view.media_mut().set_current_time(49.95);
        harness.view.media_mut().advance(0.1);
        harness.frame();

        assert_relative_eq!(harness.view.media().current_time(), 0.0);
        assert_eq!(harness.view.playback_state(), PlaybackState::Playing);
    }

    #[test]
    fn late_waveform_for_previous_source_is_not_rendered() {
        let mut harness = Harness::loaded();
        let old = harness.view.source_id();

        let new = harness.view.load_source(SourceInfo::new("/videos/other.mp4"));
        let late = WaveformProfile::from_bucket_amplitudes(vec![0.2, 0.4]);

        assert!(!harness.view.complete_waveform(old, Ok(late)));
        assert_eq!(harness.frame().waveform, WaveformLayer::Loading);

        let fresh = WaveformProfile::from_bucket_amplitudes(vec![1.0]);
        assert!(harness.view.complete_waveform(new, Ok(fresh)));
    }

    #[test]
    fn new_source_resets_drag_and_trim() {
        let mut harness = Harness::loaded();
        harness.drag(PointerButton::Primary, 0.0, 400.0);
        harness.view.on_pointer(PointerEvent::Down {
            x: 700.0,
            button: PointerButton::Secondary,
        });

        harness.view.load_source(SourceInfo::new("/videos/other.mp4"));

        assert_eq!(harness.view.session(), &DragSession::Idle);
        assert_eq!(harness.view.trim(), TrimRange::default());
        assert_eq!(harness.view.duration(), None);
    }

    #[test]
    fn same_path_does_not_reset() {
        let mut harness = Harness::loaded();
        harness.drag(PointerButton::Primary, 0.0, 400.0);

        let mut refreshed = SourceInfo::new("/videos/match.mp4");
        refreshed.size_bytes = Some(1_000);
        assert_eq!(harness.view.select_source(refreshed), None);
        assert_relative_eq!(harness.view.trim().start, 40.0);

        let summary = harness.view.clip_summary().unwrap();
        assert_relative_eq!(summary.duration, 60.0);
        assert_eq!(summary.estimated_bytes, Some(600));
    }

    #[test]
    fn missing_metadata_disables_editing() {
        let mut view = TimelineView::new(SimulatedMedia::new(), &EngineConfig::default());
        view.set_strip_size(500.0, 40.0);
        view.load_source(SourceInfo::new("/videos/broken.mp4"));

        view.on_pointer(PointerEvent::Down {
            x: 0.0,
            button: PointerButton::Primary,
        });
        view.play();
        view.frame(Instant::now());

        assert_eq!(view.session(), &DragSession::Idle);
        assert_eq!(view.duration(), None);
        assert!(matches!(
            view.take_playback_error(),
            Some(PlaybackError::Rejected(_))
        ));
        assert_eq!(view.take_playback_error(), None);
        assert!(view.export_request(&ExportSettings::default(), "").is_none());
    }

    #[test]
    fn export_uses_trim_bounds_and_default_title() {
        let mut harness = Harness::loaded();
        harness.drag(PointerButton::Primary, 0.0, 125.0);

        let request = harness
            .view
            .export_request(&ExportSettings::default(), "  ")
            .unwrap();
        assert_eq!(request.title, "match_clip");
        assert_relative_eq!(request.trim_start, 12.5);
        assert_relative_eq!(request.trim_end, 100.0);

        let named = harness
            .view
            .export_request(&ExportSettings::default(), "goal")
            .unwrap();
        assert_eq!(named.file_name(), "goal.mp4");
    }

    #[test]
    fn change_to_open_file_reloads_it() {
        let mut harness = Harness::loaded();
        harness.drag(PointerButton::Primary, 0.0, 400.0);
        let before = harness.view.source_id();

        let thumbnail = LibraryEvent::ThumbnailReady("match".to_string());
        assert_eq!(harness.view.on_library_event(&thumbnail), None);
        let other = LibraryEvent::FileChanged("/videos/other.mp4".into());
        assert_eq!(harness.view.on_library_event(&other), None);
        assert_relative_eq!(harness.view.trim().start, 40.0);

        let changed = LibraryEvent::FileChanged("/videos/match.mp4".into());
        let reloaded = harness.view.on_library_event(&changed);
        assert_eq!(reloaded, Some(before.next()));
        assert_eq!(harness.view.duration(), None);
        assert_eq!(harness.view.session(), &DragSession::Idle);
    }
}
