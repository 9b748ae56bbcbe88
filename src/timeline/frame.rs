use crate::range::{StripScale, TrimRange};
use crate::waveform::{WaveformProfile, WaveformStatus};

use super::drag::{DragSession, Handle};

pub const HANDLE_WIDTH: f64 = 12.0;
const BAR_HEIGHT_RATIO: f64 = 0.7;
const BAR_GAP: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveformBar {
    pub rect: Rect,
    pub played: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WaveformLayer {
    Bars(Vec<WaveformBar>),
    Loading,
    LoadFailed,
    Hidden,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimelineFrame {
    pub width: f64,
    pub height: f64,
    pub waveform: WaveformLayer,
    pub before_overlay: Option<Rect>,
    pub after_overlay: Option<Rect>,
    pub start_handle: Rect,
    pub end_handle: Rect,
    pub indicator_x: f64,
    pub position: f64,
    pub trim: TrimRange,
    pub duration: Option<f64>,
    pub active_handle: Option<Handle>,
    pub box_selecting: bool,
}

pub(crate) struct FrameInput<'a> {
    pub width: f64,
    pub height: f64,
    pub duration: Option<f64>,
    pub trim: TrimRange,
    pub position: f64,
    pub waveform: &'a WaveformStatus,
    pub session: &'a DragSession,
}

impl TimelineFrame {
    pub(crate) fn compose(input: FrameInput<'_>) -> Self {
        let FrameInput {
            width,
            height,
            duration,
            trim,
            position,
            waveform,
            session,
        } = input;

        let scale = StripScale::new(duration.unwrap_or(0.0), width);
        let start_x = scale.x_from_time(trim.start);
        let end_x = scale.x_from_time(trim.end);
        let indicator_x = scale.x_from_time(position);

        let before_overlay = (start_x > 0.0).then(|| Rect::new(0.0, 0.0, start_x, height));
        let after_overlay = (scale.is_usable() && end_x < width)
            .then(|| Rect::new(end_x, 0.0, width - end_x, height));

        let waveform = match waveform {
            WaveformStatus::Ready(profile) => {
                WaveformLayer::Bars(bars(profile, width, height, indicator_x))
            }
            WaveformStatus::Loading => WaveformLayer::Loading,
            WaveformStatus::LoadFailed => WaveformLayer::LoadFailed,
            WaveformStatus::Idle | WaveformStatus::Omitted => WaveformLayer::Hidden,
        };

        TimelineFrame {
            width,
            height,
            waveform,
            before_overlay,
            after_overlay,
            start_handle: Rect::new(start_x - HANDLE_WIDTH / 2.0, 0.0, HANDLE_WIDTH, height),
            end_handle: Rect::new(end_x - HANDLE_WIDTH / 2.0, 0.0, HANDLE_WIDTH, height),
            indicator_x,
            position,
            trim,
            duration,
            active_handle: session.active_handle(),
            box_selecting: matches!(session, DragSession::BoxSelecting { .. }),
        }
    }
}

fn bars(profile: &WaveformProfile, width: f64, height: f64, played_width: f64) -> Vec<WaveformBar> {
    if profile.is_empty() {
        return Vec::new();
    }

    let bar_width = width / profile.len() as f64;
    profile
        .values()
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let x = i as f64 * bar_width;
            let bar_height = *value as f64 * height * BAR_HEIGHT_RATIO;
            WaveformBar {
                rect: Rect::new(
                    x,
                    (height - bar_height) / 2.0,
                    (bar_width - BAR_GAP).max(0.0),
                    bar_height,
                ),
                played: x <= played_width,
            }
        })
        .collect()
}
