use std::path::PathBuf;

use relm4::gtk::glib;
use relm4::gtk::prelude::{ApplicationExt, GtkWindowExt, WidgetExt};
use relm4::{
    adw, main_application, Component, ComponentController, ComponentParts, ComponentSender,
    Controller, SimpleComponent,
};
use tracing::error;

use trimline::config::EngineConfig;

use crate::ui::editor::{media_with_sink, EditorInit, EditorModel};

pub(super) struct App {
    editor: Option<Controller<EditorModel>>,
}

#[derive(Debug)]
pub(super) enum AppMsg {
    Quit,
}

#[relm4::component(pub)]
impl SimpleComponent for App {
    type Init = (EngineConfig, Option<PathBuf>);
    type Input = AppMsg;
    type Output = ();

    view! {
        main_window = adw::ApplicationWindow::new(&main_application()) {
            set_visible: true,
            set_default_height: 600,
            set_default_width: 900,
            set_title: Some("Trimline"),

            connect_close_request[sender] => move |_| {
                sender.input(AppMsg::Quit);
                glib::Propagation::Stop
            },

            #[name = "tool_bar_view"]
            adw::ToolbarView {
                add_top_bar = &adw::HeaderBar {},
            }
        }
    }

    fn init(
        (config, source): Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let editor = match media_with_sink() {
            Ok((media, paintable)) => Some(
                EditorModel::builder()
                    .launch(EditorInit {
                        media,
                        paintable,
                        config,
                        source,
                    })
                    .detach(),
            ),
            Err(e) => {
                error!(error = %e, "media pipeline unavailable");
                None
            }
        };

        let model = App { editor };
        let widgets = view_output!();

        match &model.editor {
            Some(editor) => widgets.tool_bar_view.set_content(Some(editor.widget())),
            None => {
                let page = adw::StatusPage::builder()
                    .icon_name("dialog-error-symbolic")
                    .title("Playback unavailable")
                    .description("GStreamer or the gtk4paintablesink plugin is missing.")
                    .build();
                widgets.tool_bar_view.set_content(Some(&page));
            }
        }

        ComponentParts { model, widgets }
    }

    fn update(&mut self, message: Self::Input, _sender: ComponentSender<Self>) {
        match message {
            AppMsg::Quit => main_application().quit(),
        }
    }
}
