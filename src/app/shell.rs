//! Application shell
//!
//! Owns the `adw::Application`: startup, activate, and the exit status the
//! process reports once the main loop is done.

use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;
use gtk::{gio, glib};
use log::debug;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::app::headless;
use crate::app::lifecycle::{ExitStatus, Lifecycle};
use crate::app::settings::{KeyFileSettings, SettingsStore};
use crate::app::CaptureConfig;
use crate::platform::GtkDesktop;
use crate::ui::InteractiveController;

pub const APP_ID: &str = "org.example.Shutterbug";
const APP_NAME: &str = "Screenshot";
const ICON_NAME: &str = "applets-screenshooter";

pub fn run(config: CaptureConfig, settings: Rc<KeyFileSettings>) -> glib::ExitCode {
    let flags = if config.interactive {
        gio::ApplicationFlags::empty()
    } else {
        gio::ApplicationFlags::NON_UNIQUE
    };

    let app = adw::Application::builder()
        .application_id(APP_ID)
        .flags(flags)
        .build();
    let status = ExitStatus::default();

    app.connect_startup(|_| {
        glib::set_application_name(APP_NAME);
        gtk::Window::set_default_icon_name(ICON_NAME);
    });

    let config = Rc::new(config);
    let settings: Rc<dyn SettingsStore> = settings;
    let started = Rc::new(Cell::new(false));
    let controller: Rc<RefCell<Option<Rc<InteractiveController>>>> = Rc::default();

    app.connect_activate({
        let status = status.clone();
        move |app| {
            if let Some(window) = app.active_window() {
                debug!("Already running, presenting the existing window");
                window.present();
                return;
            }

            if started.replace(true) {
                return;
            }

            if config.interactive {
                let interactive =
                    InteractiveController::start(app, (*config).clone(), settings.clone());
                *controller.borrow_mut() = Some(interactive);
                return;
            }

            // Keeps the application alive until the spawned run takes its own hold.
            let bootstrap = Lifecycle::hold(app);
            let app = app.clone();
            let config = config.clone();
            let settings = settings.clone();
            let status = status.clone();
            glib::spawn_future_local(async move {
                let desktop = GtkDesktop::new(&app);
                headless::run(&config, &desktop, &app, settings.as_ref(), &status).await;
                drop(bootstrap);
            });
        }
    });

    let code = app.run_with_args::<&str>(&[]);

    if status.failed() {
        status.code()
    } else {
        code
    }
}
