use std::cell::RefCell;

use relm4::gtk;
use relm4::gtk::prelude::{SnapshotExt, SnapshotExtManual, WidgetExt};
use relm4::gtk::subclass::prelude::*;
use relm4::gtk::{gdk, glib, graphene, gsk, Snapshot};

use trimline::timeline::{Handle, Rect, TimelineFrame, WaveformLayer};

use crate::ui::IGNORE_OVERLAY_COLOUR;

static FILL_RULE: gsk::FillRule = gsk::FillRule::Winding;
static HANDLE_CURVE: f32 = 4.0;
static INDICATOR_WIDTH: f32 = 3.0;
static RANGE_BORDER: f32 = 3.0;
static BACKGROUND_COLOUR: gdk::RGBA = gdk::RGBA::new(0.153, 0.153, 0.165, 1.0);
static PLAYED_COLOUR: gdk::RGBA = gdk::RGBA::new(0.063, 0.725, 0.506, 1.0);
static UNPLAYED_COLOUR: gdk::RGBA = gdk::RGBA::new(0.322, 0.322, 0.357, 1.0);
static FAILED_COLOUR: gdk::RGBA = gdk::RGBA::new(0.878, 0.333, 0.298, 0.8);
static HANDLE_COLOUR: gdk::RGBA = gdk::RGBA::new(0.337, 0.337, 0.337, 1.0);
static ACTIVE_COLOUR: gdk::RGBA = gdk::RGBA::new(0.961, 0.761, 0.259, 1.0);
static INDICATOR_COLOUR: gdk::RGBA = gdk::RGBA::WHITE;

fn graphene_rect(rect: &Rect) -> graphene::Rect {
    graphene::Rect::new(
        rect.x as f32,
        rect.y as f32,
        rect.width as f32,
        rect.height as f32,
    )
}

fn rounded_path(rect: graphene::Rect, radius: f32) -> gsk::Path {
    let outline = gsk::RoundedRect::from_rect(rect, radius);
    let path_builder = gsk::PathBuilder::new();
    path_builder.add_rounded_rect(&outline);
    path_builder.to_path()
}

#[derive(Default, Debug)]
pub struct StripWidget {
    frame: RefCell<Option<TimelineFrame>>,
}

#[glib::object_subclass]
impl ObjectSubclass for StripWidget {
    const NAME: &'static str = "TrimlineStrip";
    type Type = super::StripWidget;
    type ParentType = gtk::Widget;
}

impl ObjectImpl for StripWidget {}

impl WidgetImpl for StripWidget {
    fn snapshot(&self, snapshot: &Snapshot) {
        let widget = self.obj();
        let bounds = graphene::Rect::new(0.0, 0.0, widget.width() as f32, widget.height() as f32);
        snapshot.append_color(&BACKGROUND_COLOUR, &bounds);

        let frame = self.frame.borrow();
        let Some(frame) = frame.as_ref() else {
            return;
        };

        match &frame.waveform {
            WaveformLayer::Bars(bars) => {
                for bar in bars {
                    let colour = if bar.played {
                        &PLAYED_COLOUR
                    } else {
                        &UNPLAYED_COLOUR
                    };
                    snapshot.append_color(colour, &graphene_rect(&bar.rect));
                }
            }
            WaveformLayer::LoadFailed => {
                let middle = bounds.height() / 2.0;
                let line = graphene::Rect::new(0.0, middle - 1.0, bounds.width(), 2.0);
                snapshot.append_color(&FAILED_COLOUR, &line);
            }
            WaveformLayer::Loading | WaveformLayer::Hidden => {}
        }

        if let Some(before) = &frame.before_overlay {
            snapshot.append_color(&IGNORE_OVERLAY_COLOUR, &graphene_rect(before));
        }
        if let Some(after) = &frame.after_overlay {
            snapshot.append_color(&IGNORE_OVERLAY_COLOUR, &graphene_rect(after));
        }

        let border_colour = if frame.box_selecting {
            ACTIVE_COLOUR
        } else {
            HANDLE_COLOUR
        };
        let selected = graphene::Rect::new(
            frame.start_handle.x as f32,
            0.0,
            (frame.end_handle.x - frame.start_handle.x) as f32,
            bounds.height(),
        );
        snapshot.append_border(
            &gsk::RoundedRect::from_rect(selected, 0.0),
            &[RANGE_BORDER, 0.0, RANGE_BORDER, 0.0],
            &[border_colour; 4],
        );

        for (rect, handle) in [
            (&frame.start_handle, Handle::Start),
            (&frame.end_handle, Handle::End),
        ] {
            let colour = if frame.active_handle == Some(handle) {
                &ACTIVE_COLOUR
            } else {
                &HANDLE_COLOUR
            };
            let path = rounded_path(graphene_rect(rect), HANDLE_CURVE);
            snapshot.append_fill(&path, FILL_RULE, colour);
        }

        let indicator = graphene::Rect::new(
            frame.indicator_x as f32 - INDICATOR_WIDTH / 2.0,
            0.0,
            INDICATOR_WIDTH,
            bounds.height(),
        );
        snapshot.append_fill(
            &rounded_path(indicator, INDICATOR_WIDTH / 2.0),
            FILL_RULE,
            &INDICATOR_COLOUR,
        );
    }
}

impl super::StripWidget {
    pub fn set_frame(&self, frame: TimelineFrame) {
        self.imp().frame.replace(Some(frame));
        self.queue_draw();
    }
}
