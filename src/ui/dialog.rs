//! Review dialog
//!
//! Preview, file name and folder, and the Back / Copy / Edit / Save buttons.
//! The dialog only reports responses; the controller decides what they mean.

use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;
use gtk::{glib, Orientation};
use image::RgbaImage;
use log::debug;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::app::flow::DialogResponse;
use crate::app::state::SaveTarget;
use crate::platform::clipboard::texture_for_image;

pub struct ReviewDialog {
    window: adw::Window,
    filename_entry: gtk::Entry,
    folder_button: gtk::Button,
    folder: Rc<RefCell<PathBuf>>,
    buttons: Vec<gtk::Button>,
}

impl ReviewDialog {
    /// `on_dismiss` answers whether the dialog may close right now.
    pub fn new(
        app: &adw::Application,
        image: &RgbaImage,
        target: &SaveTarget,
        on_response: impl Fn(DialogResponse) + 'static,
        on_dismiss: impl Fn() -> bool + 'static,
    ) -> Rc<Self> {
        let preview = gtk::Picture::builder()
            .paintable(&texture_for_image(image))
            .can_shrink(true)
            .content_fit(gtk::ContentFit::Contain)
            .width_request(400)
            .height_request(260)
            .hexpand(true)
            .vexpand(true)
            .build();
        preview.add_css_class("card");

        let filename_entry = gtk::Entry::builder()
            .text(target.file_name())
            .activates_default(true)
            .hexpand(true)
            .build();

        let folder_button = gtk::Button::builder()
            .label(target.folder_name())
            .tooltip_text("Choose Folder")
            .build();

        let name_row = gtk::Box::builder()
            .orientation(Orientation::Horizontal)
            .spacing(6)
            .build();
        name_row.append(&gtk::Label::new(Some("Name:")));
        name_row.append(&filename_entry);
        name_row.append(&gtk::Label::new(Some("Folder:")));
        name_row.append(&folder_button);

        let back_btn = gtk::Button::builder()
            .icon_name("go-previous-symbolic")
            .tooltip_text("New Screenshot")
            .build();
        let copy_btn = gtk::Button::builder()
            .label("_Copy to Clipboard")
            .use_underline(true)
            .build();
        let edit_btn = gtk::Button::builder()
            .label("_Edit")
            .use_underline(true)
            .build();
        let save_btn = gtk::Button::builder()
            .label("_Save")
            .use_underline(true)
            .build();
        save_btn.add_css_class("suggested-action");

        let header_bar = adw::HeaderBar::builder()
            .show_end_title_buttons(false)
            .build();
        header_bar.pack_start(&back_btn);
        header_bar.pack_end(&save_btn);
        header_bar.pack_end(&edit_btn);
        header_bar.pack_end(&copy_btn);

        let body = gtk::Box::builder()
            .orientation(Orientation::Vertical)
            .spacing(12)
            .margin_top(12)
            .margin_bottom(12)
            .margin_start(12)
            .margin_end(12)
            .build();
        body.append(&preview);
        body.append(&name_row);

        let content = gtk::Box::builder()
            .orientation(Orientation::Vertical)
            .build();
        content.append(&header_bar);
        content.append(&body);

        let window = adw::Window::builder()
            .application(app)
            .title("Save Screenshot")
            .content(&content)
            .default_widget(&save_btn)
            .build();

        let dialog = Rc::new(Self {
            window,
            filename_entry,
            folder_button,
            folder: Rc::new(RefCell::new(target.folder())),
            buttons: vec![back_btn.clone(), copy_btn.clone(), edit_btn.clone(), save_btn.clone()],
        });

        let on_response = Rc::new(on_response);
        for (button, response) in [
            (&back_btn, DialogResponse::Back),
            (&copy_btn, DialogResponse::Copy),
            (&edit_btn, DialogResponse::Edit),
            (&save_btn, DialogResponse::Save),
        ] {
            let on_response = on_response.clone();
            button.connect_clicked(move |_| {
                debug!("Dialog response: {}", response.id());
                on_response(response);
            });
        }

        dialog.window.connect_close_request(move |_| {
            if on_dismiss() {
                glib::Propagation::Proceed
            } else {
                glib::Propagation::Stop
            }
        });

        dialog.connect_folder_chooser();
        dialog
    }

    fn connect_folder_chooser(&self) {
        self.folder_button.connect_clicked({
            let window = self.window.clone();
            let folder = self.folder.clone();
            move |button| {
                let window = window.clone();
                let folder = folder.clone();
                let button = button.clone();
                glib::spawn_future_local(async move {
                    let chooser = gtk::FileDialog::builder()
                        .title("Select a Folder")
                        .modal(true)
                        .build();
                    chooser.set_initial_folder(Some(&gtk::gio::File::for_path(
                        folder.borrow().as_path(),
                    )));

                    match chooser.select_folder_future(Some(&window)).await {
                        Ok(selected) => {
                            if let Some(path) = selected.path() {
                                button.set_label(&folder_label(&path));
                                *folder.borrow_mut() = path;
                            }
                        }
                        Err(e) => debug!("Folder chooser closed: {}", e),
                    }
                });
            }
        });
    }

    pub fn present(&self) {
        self.window.present();
        self.focus_filename();
    }

    pub fn window(&self) -> &adw::Window {
        &self.window
    }

    pub fn folder(&self) -> PathBuf {
        self.folder.borrow().clone()
    }

    /// Whatever the user has typed, in the chosen folder.
    pub fn target(&self) -> SaveTarget {
        SaveTarget::from_path(self.folder().join(self.filename_entry.text().as_str()))
    }

    pub fn set_busy(&self, busy: bool) {
        for button in &self.buttons {
            button.set_sensitive(!busy);
        }
        self.filename_entry.set_sensitive(!busy);
        self.folder_button.set_sensitive(!busy);
    }

    /// Focus the name with the stem selected, so typing replaces it.
    pub fn focus_filename(&self) {
        let text = self.filename_entry.text();
        self.filename_entry.grab_focus();
        self.filename_entry
            .select_region(0, stem_length(text.as_str()) as i32);
    }

    pub fn close(&self) {
        self.window.destroy();
    }
}

fn folder_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Length in characters of the name without its extension.
pub fn stem_length(file_name: &str) -> usize {
    let stem = match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(dot) => &file_name[..dot],
    };
    stem.chars().count()
}
