use relm4::gtk;
use relm4::gtk::{gdk, glib};

pub mod editor;
mod strip;

pub(crate) static IGNORE_OVERLAY_COLOUR: gdk::RGBA = gdk::RGBA::new(0.0, 0.0, 0.0, 0.55);

glib::wrapper! {
    pub struct StripWidget(ObjectSubclass<strip::StripWidget>)
        @extends gtk::Widget;
}

impl Default for StripWidget {
    fn default() -> Self {
        glib::Object::new()
    }
}
