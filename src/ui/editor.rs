use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use gst::prelude::ObjectExt;
use relm4::gtk::prelude::{
    BoxExt, ButtonExt, EditableExt, EntryExt, GestureDragExt, GestureSingleExt, OrientableExt,
    ToggleButtonExt, WidgetExt,
};
use relm4::gtk::{gdk, glib};
use relm4::{adw, gtk, Component, ComponentParts, ComponentSender, RelmWidgetExt};
use tracing::{info, warn};

use trimline::config::EngineConfig;
use trimline::error::{ExportError, WaveformError};
use trimline::timeline::{PlaybackState, PointerButton, PointerEvent, TimelineView};
use trimline::timestamp;
use trimline::video::export::{ExportCollaborator, FfmpegExporter};
use trimline::video::player::GstMedia;
use trimline::video::{LibraryEvent, SourceInfo};
use trimline::waveform::{SourceId, WaveformAnalyzer, WaveformProfile};

static STATUS_TIMEOUT: Duration = Duration::from_secs(4);

pub fn media_with_sink() -> anyhow::Result<(GstMedia, gdk::Paintable)> {
    gst::init()?;
    let sink = gst::ElementFactory::make("gtk4paintablesink")
        .build()
        .context("gtk4paintablesink plugin missing")?;
    let paintable = sink.property::<gdk::Paintable>("paintable");
    let media = GstMedia::new(Some(&sink))?;
    Ok((media, paintable))
}

pub struct EditorInit {
    pub media: GstMedia,
    pub paintable: gdk::Paintable,
    pub config: EngineConfig,
    pub source: Option<PathBuf>,
}

pub struct EditorModel {
    view: TimelineView<GstMedia>,
    config: EngineConfig,
    exporter: FfmpegExporter,
    title: String,
    is_playing: bool,
    is_muted: bool,
    is_looping: bool,
    exporting: bool,
    has_source: bool,
    status: Option<String>,
    status_generation: u64,
}

#[derive(Debug)]
pub enum EditorMsg {
    Open(PathBuf),
    Reload,
    Pointer(PointerEvent),
    Frame,
    TogglePlay,
    ToggleLoop,
    ToggleMute,
    JumpToStart,
    JumpToEnd,
    SetTitle(String),
    Export,
}

#[derive(Debug)]
pub enum EditorCmdMsg {
    WaveformDone(SourceId, Result<WaveformProfile, WaveformError>),
    ExportDone(Result<PathBuf, ExportError>),
    ClearStatus(u64),
}

#[relm4::component(pub)]
impl Component for EditorModel {
    type CommandOutput = EditorCmdMsg;
    type Input = EditorMsg;
    type Output = ();
    type Init = EditorInit;

    view! {
        gtk::Box {
            set_orientation: gtk::Orientation::Vertical,
            set_spacing: 10,
            inline_css: "margin: 15px",

            add_controller = gtk::EventControllerMotion {
                connect_leave[sender] => move |_| {
                    sender.input(EditorMsg::Pointer(PointerEvent::Leave));
                },
            },

            #[name = "picture"]
            gtk::Picture {
                set_vexpand: true,
                set_hexpand: true,
                set_width_request: 640,
                set_height_request: 360,

                add_controller = gtk::GestureClick {
                    connect_pressed[sender] => move |_, _, _, _| {
                        sender.input(EditorMsg::TogglePlay);
                    }
                },
            },

            #[name = "strip"]
            super::StripWidget {
                set_hexpand: true,
                set_height_request: 64,

                add_controller = gtk::GestureDrag {
                    set_button: 0,

                    connect_drag_begin[sender] => move |drag, x, _| {
                        let button = if drag.current_button() == gdk::BUTTON_SECONDARY {
                            PointerButton::Secondary
                        } else {
                            PointerButton::Primary
                        };
                        sender.input(EditorMsg::Pointer(PointerEvent::Down { x, button }));
                    },

                    connect_drag_update[sender] => move |drag, offset_x, _| {
                        if let Some((start_x, _)) = drag.start_point() {
                            let x = start_x + offset_x;
                            sender.input(EditorMsg::Pointer(PointerEvent::Move { x }));
                        }
                    },

                    connect_drag_end[sender] => move |_, _, _| {
                        sender.input(EditorMsg::Pointer(PointerEvent::Up));
                    },
                },
            },

            gtk::Box {
                set_spacing: 10,
                add_css_class: "toolbar",
                #[watch]
                set_sensitive: model.has_source,

                gtk::Button {
                    set_icon_name: "view-refresh-symbolic",
                    set_tooltip_text: Some("Reload video"),
                    connect_clicked => EditorMsg::Reload,
                },

                gtk::Button {
                    set_icon_name: "media-skip-backward-symbolic",
                    connect_clicked => EditorMsg::JumpToStart,
                },

                gtk::Button {
                    add_css_class: "raised",
                    #[watch]
                    set_icon_name: if model.is_playing {
                        "media-playback-pause-symbolic"
                    } else {
                        "media-playback-start-symbolic"
                    },
                    connect_clicked => EditorMsg::TogglePlay,
                },

                gtk::Button {
                    set_icon_name: "media-skip-forward-symbolic",
                    connect_clicked => EditorMsg::JumpToEnd,
                },

                gtk::ToggleButton {
                    set_icon_name: "media-playlist-repeat-symbolic",
                    #[watch]
                    set_active: model.is_looping,
                    connect_clicked => EditorMsg::ToggleLoop,
                },

                gtk::Button {
                    #[watch]
                    set_icon_name: if model.is_muted {
                        "audio-volume-muted-symbolic"
                    } else {
                        "audio-volume-high-symbolic"
                    },
                    connect_clicked => EditorMsg::ToggleMute,
                },

                #[name = "position_label"]
                gtk::Label {
                    add_css_class: "monospace",
                },

                #[name = "clip_label"]
                gtk::Label {
                    set_hexpand: true,
                    set_halign: gtk::Align::Start,
                    set_css_classes: &["monospace", "dim-label"],
                },

                gtk::Entry {
                    set_placeholder_text: Some("Clip title"),
                    connect_changed[sender] => move |entry| {
                        sender.input(EditorMsg::SetTitle(entry.text().to_string()));
                    },
                },

                gtk::Button {
                    set_label: "Export",
                    add_css_class: "suggested-action",
                    #[watch]
                    set_sensitive: !model.exporting,
                    connect_clicked => EditorMsg::Export,
                },
            },

            adw::Banner {
                #[watch]
                set_revealed: model.status.is_some(),
                #[watch]
                set_title: model.status.as_deref().unwrap_or_default(),
            },
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let EditorInit {
            media,
            paintable,
            config,
            source,
        } = init;

        let model = EditorModel {
            view: TimelineView::new(media, &config),
            exporter: FfmpegExporter::from_settings(&config.export),
            config,
            title: String::new(),
            is_playing: false,
            is_muted: false,
            is_looping: false,
            exporting: false,
            has_source: false,
            status: None,
            status_generation: 0,
        };

        let widgets = view_output!();
        widgets.picture.set_paintable(Some(&paintable));

        let tick_sender = sender.clone();
        widgets.strip.add_tick_callback(move |_, _| {
            tick_sender.input(EditorMsg::Frame);
            glib::ControlFlow::Continue
        });

        if let Some(path) = source {
            sender.input(EditorMsg::Open(path));
        }

        ComponentParts { model, widgets }
    }

    fn update_with_view(
        &mut self,
        widgets: &mut Self::Widgets,
        message: Self::Input,
        sender: ComponentSender<Self>,
        _root: &Self::Root,
    ) {
        match message {
            EditorMsg::Open(path) => {
                let source = SourceInfo::from_local_path(&path);
                if let Some(id) = self.view.select_source(source) {
                    self.analyze_waveform(id, &sender);
                }
                self.has_source = true;
            }
            EditorMsg::Reload => {
                if let Some(source) = self.view.source() {
                    let changed = LibraryEvent::FileChanged(source.path.clone());
                    if let Some(id) = self.view.on_library_event(&changed) {
                        self.analyze_waveform(id, &sender);
                    }
                }
            }
            EditorMsg::Pointer(event) => self.view.on_pointer(event),
            EditorMsg::Frame => {
                self.view.set_strip_size(
                    widgets.strip.width() as f64,
                    widgets.strip.height() as f64,
                );
                let frame = self.view.frame(Instant::now());

                let duration = frame.duration.unwrap_or(0.0);
                widgets.position_label.set_label(&format!(
                    "{} / {}",
                    timestamp::display_text(frame.position),
                    timestamp::display_text(duration)
                ));
                if let Some(summary) = self.view.clip_summary() {
                    let size = summary
                        .estimated_megabytes()
                        .map(|mb| format!(" | ~{mb:.2} MB"))
                        .unwrap_or_default();
                    widgets.clip_label.set_label(&format!(
                        "{} - {} ({}){size}",
                        timestamp::display_text(frame.trim.start),
                        timestamp::display_text(frame.trim.end),
                        timestamp::display_text(summary.duration),
                    ));
                }
                widgets.strip.set_frame(frame);

                let clock = self.view.clock();
                self.is_playing = self.view.playback_state() == PlaybackState::Playing;
                self.is_muted = clock.is_muted;
                self.is_looping = clock.is_looping;

                if let Some(error) = self.view.take_playback_error() {
                    self.show_status(error.to_string(), &sender);
                }
            }
            EditorMsg::TogglePlay => self.view.toggle_play(),
            EditorMsg::ToggleLoop => self.view.toggle_loop(),
            EditorMsg::ToggleMute => self.view.toggle_mute(),
            EditorMsg::JumpToStart => self.view.jump_to_start(),
            EditorMsg::JumpToEnd => self.view.jump_to_end(),
            EditorMsg::SetTitle(title) => self.title = title,
            EditorMsg::Export => match self.view.export_request(&self.config.export, &self.title) {
                Some(request) => {
                    self.view.pause();
                    self.exporting = true;
                    let exporter = self.exporter.clone();
                    sender.oneshot_command(async move {
                        EditorCmdMsg::ExportDone(exporter.export(request).await)
                    });
                }
                None => self.show_status("Nothing to export yet".to_string(), &sender),
            },
        }
        self.update_view(widgets, sender);
    }

    fn update_cmd_with_view(
        &mut self,
        widgets: &mut Self::Widgets,
        message: Self::CommandOutput,
        sender: ComponentSender<Self>,
        _root: &Self::Root,
    ) {
        match message {
            EditorCmdMsg::WaveformDone(id, result) => {
                self.view.complete_waveform(id, result);
            }
            EditorCmdMsg::ExportDone(result) => {
                self.exporting = false;
                match result {
                    Ok(path) => {
                        info!(?path, "export finished");
                        self.show_status(format!("Saved {}", path.display()), &sender);
                    }
                    Err(e) => {
                        warn!(error = %e, "export failed");
                        self.show_status(e.to_string(), &sender);
                    }
                }
            }
            EditorCmdMsg::ClearStatus(generation) => {
                if generation == self.status_generation {
                    self.status = None;
                }
            }
        }
        self.update_view(widgets, sender);
    }
}

impl EditorModel {
    fn analyze_waveform(&self, id: SourceId, sender: &ComponentSender<Self>) {
        let Some(locator) = self.view.source().map(SourceInfo::locator) else {
            return;
        };
        let analyzer = WaveformAnalyzer::from_config(&self.config);
        sender.oneshot_command(async move {
            let result = analyzer.analyze(&locator).await;
            EditorCmdMsg::WaveformDone(id, result)
        });
    }

    fn show_status(&mut self, text: String, sender: &ComponentSender<Self>) {
        self.status = Some(text);
        self.status_generation += 1;

        let generation = self.status_generation;
        sender.oneshot_command(async move {
            tokio::time::sleep(STATUS_TIMEOUT).await;
            EditorCmdMsg::ClearStatus(generation)
        });
    }
}
