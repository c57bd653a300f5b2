//! Interactive controller
//!
//! Drives options window -> capture -> review dialog -> save, with `Flow`
//! deciding what each dialog response is allowed to do. Every async span
//! runs under an application hold.

use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;
use gtk::glib;
use image::RgbaImage;
use log::{debug, error, info, warn};
use std::cell::RefCell;
use std::rc::Rc;

use crate::app::config::CAPTURE_SOUND;
use crate::app::flow::{AfterSave, DialogResponse, Flow, Step};
use crate::app::settings::{SettingsStore, LAST_SAVE_DIRECTORY_KEY};
use crate::app::state::{SaveTarget, Session};
use crate::app::{CaptureConfig, Lifecycle};
use crate::capture::{acquire, capture_delay};
use crate::error::{ScreenshotError, ScreenshotResult};
use crate::platform::{external, Desktop, GtkDesktop};
use crate::save::{resolve_save_path, save, OverwritePrompt, SavedImage};
use crate::ui::alerts;
use crate::ui::dialog::ReviewDialog;
use crate::ui::options::OptionsWindow;

/// Asks through the review dialog before replacing a file.
struct DialogPrompt {
    parent: gtk::Window,
}

impl OverwritePrompt for DialogPrompt {
    async fn confirm_overwrite(&self, target: &SaveTarget) -> bool {
        alerts::confirm_overwrite(Some(&self.parent), target).await
    }
}

pub struct InteractiveController {
    app: adw::Application,
    desktop: GtkDesktop,
    settings: Rc<dyn SettingsStore>,
    config: RefCell<CaptureConfig>,
    flow: RefCell<Flow>,
    session: RefCell<Session>,
    options: RefCell<Option<OptionsWindow>>,
    dialog: RefCell<Option<Rc<ReviewDialog>>>,
}

impl InteractiveController {
    pub fn start(
        app: &adw::Application,
        config: CaptureConfig,
        settings: Rc<dyn SettingsStore>,
    ) -> Rc<Self> {
        let controller = Rc::new(Self {
            app: app.clone(),
            desktop: GtkDesktop::new(app),
            settings,
            config: RefCell::new(config),
            flow: RefCell::new(Flow::new()),
            session: RefCell::new(Session::new()),
            options: RefCell::new(None),
            dialog: RefCell::new(None),
        });

        controller.show_options();
        controller
    }

    fn show_options(self: &Rc<Self>) {
        if !self.flow.borrow_mut().show_options() {
            debug!("Not showing options while busy");
            return;
        }

        let weak = Rc::downgrade(self);
        let options = OptionsWindow::new(&self.app, &self.config.borrow(), move |config| {
            if let Some(this) = weak.upgrade() {
                this.take_screenshot(config);
            }
        });
        options.present();

        if let Some(previous) = self.options.borrow_mut().replace(options) {
            previous.close();
        }
    }

    fn take_screenshot(self: &Rc<Self>, config: CaptureConfig) {
        if !self.flow.borrow_mut().begin_capture() {
            return;
        }

        // Taken before the options window goes, so the application outlives it.
        let hold = Lifecycle::hold(&self.app);
        *self.config.borrow_mut() = config;
        if let Some(options) = self.options.borrow_mut().take() {
            options.close();
        }

        let this = self.clone();
        glib::spawn_future_local(async move {
            let _hold = hold;
            this.capture().await;
        });
    }

    async fn capture(self: &Rc<Self>) {
        let config = self.config.borrow().clone();

        let delay = capture_delay(&config);
        if !delay.is_zero() {
            glib::timeout_future(delay).await;
        }

        let image = match acquire(&self.desktop, &config).await {
            Ok(Some(image)) => image,
            Ok(None) => {
                self.flow.borrow_mut().capture_finished(false);
                self.show_options();
                return;
            }
            Err(err) => {
                error!("{}", err);
                self.capture_failed("Unable to capture a screenshot", &err)
                    .await;
                return;
            }
        };

        config.persist(self.settings.as_ref());
        if config.play_sound {
            self.desktop.play_sound(CAPTURE_SOUND, "Screenshot taken");
        }

        let path = match resolve_save_path(config.save_dir.as_deref()).await {
            Ok(path) => path,
            Err(err) => {
                error!("{}", err);
                self.capture_failed("Impossible to find a valid location to save the screenshot", &err)
                    .await;
                return;
            }
        };

        self.flow.borrow_mut().capture_finished(true);
        self.review(image, SaveTarget::from_path(path), &config);
    }

    async fn capture_failed(self: &Rc<Self>, title: &str, err: &ScreenshotError) {
        self.flow.borrow_mut().capture_finished(false);
        self.show_options();

        let parent = self
            .options
            .borrow()
            .as_ref()
            .map(|options| options.window().clone().upcast::<gtk::Window>());
        alerts::show_error(parent.as_ref(), title, err).await;
    }

    fn review(self: &Rc<Self>, image: RgbaImage, target: SaveTarget, config: &CaptureConfig) {
        let image = {
            let mut session = self.session.borrow_mut();
            session.reset_for_capture();
            session.set_image(image);
            session.set_color_profile(config.color_profile.clone());
            session.set_target(target.clone());
            session.image().cloned()
        };
        let Some(image) = image else {
            return;
        };

        let on_response = {
            let weak = Rc::downgrade(self);
            move |response| {
                if let Some(this) = weak.upgrade() {
                    this.respond(response);
                }
            }
        };
        let on_dismiss = {
            let weak = Rc::downgrade(self);
            move || weak.upgrade().map_or(true, |this| this.dismissed())
        };

        let dialog = ReviewDialog::new(&self.app, &image, &target, on_response, on_dismiss);
        dialog.present();
        *self.dialog.borrow_mut() = Some(dialog);
    }

    fn respond(self: &Rc<Self>, response: DialogResponse) {
        let step = self.flow.borrow_mut().respond(response);

        match step {
            Step::Save(after) => {
                let hold = Lifecycle::hold(&self.app);
                let this = self.clone();
                glib::spawn_future_local(async move {
                    let _hold = hold;
                    this.save(after).await;
                });
            }
            Step::Copy => self.copy(),
            Step::Back => self.back(),
            Step::Ignore => debug!(
                "{:?} ignored in state {:?}",
                response,
                self.flow.borrow().state()
            ),
        }
    }

    async fn save(self: &Rc<Self>, after: AfterSave) {
        let dialog = self.dialog.borrow().clone();
        let Some(dialog) = dialog else {
            self.flow.borrow_mut().save_finished(false);
            return;
        };

        dialog.set_busy(true);
        let parent = dialog.window().clone().upcast::<gtk::Window>();

        let (job, lock) = {
            let mut session = self.session.borrow_mut();
            session.set_target(dialog.target());
            (session.save_job(), session.save_lock())
        };

        let result = match job {
            Ok(mut job) => {
                let prompt = DialogPrompt {
                    parent: parent.clone(),
                };
                let result = save(&mut job, &lock, &prompt).await;
                self.session.borrow_mut().set_overwrite(job.overwrite);
                result
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(saved) => self.saved(&dialog, saved, after).await,
            Err(err) => {
                warn!("{}", err);
                self.flow.borrow_mut().save_finished(false);
                dialog.set_busy(false);
                if !err.is_conflict() {
                    alerts::show_error(Some(&parent), "Unable to save the screenshot", &err).await;
                }
                dialog.focus_filename();
            }
        }
    }

    async fn saved(self: &Rc<Self>, dialog: &ReviewDialog, saved: SavedImage, after: AfterSave) {
        info!("Screenshot saved to {}", saved.target.uri());
        self.desktop
            .add_recent(saved.target.uri(), saved.format.mime_type());
        self.remember_folder(dialog);

        let after = self.flow.borrow_mut().save_finished(true);
        self.dialog.borrow_mut().take();
        dialog.close();

        match after {
            Some(AfterSave::OfferViewer) => {
                if alerts::offer_open(&saved.target).await {
                    external::open_in_viewer(saved.target.uri());
                }
            }
            Some(AfterSave::LaunchEditor) => {
                let editor = self.config.borrow().editor.clone();
                if let Err(err) = external::launch_editor(&editor, saved.target.path()) {
                    error!("{}", err);
                    alerts::editor_missing(&err).await;
                    self.app.quit();
                }
            }
            None => {}
        }
    }

    fn copy(&self) {
        if let Err(err) = copy_capture(&self.desktop, &self.session.borrow()) {
            warn!("{}", err);
        }
    }

    fn back(self: &Rc<Self>) {
        if let Some(dialog) = self.dialog.borrow_mut().take() {
            self.remember_folder(&dialog);
            dialog.close();
        }
        self.session.borrow_mut().reset_for_capture();
        self.show_options();
    }

    fn dismissed(&self) -> bool {
        if !self.flow.borrow_mut().dialog_dismissed() {
            return false;
        }
        self.dialog.borrow_mut().take();
        true
    }

    fn remember_folder(&self, dialog: &ReviewDialog) {
        let folder = dialog.folder();
        self.settings
            .set_string(LAST_SAVE_DIRECTORY_KEY, &folder.to_string_lossy());
        self.config.borrow_mut().save_dir = Some(folder);
    }
}

/// Put the reviewed capture on the clipboard.
fn copy_capture<D: Desktop>(desktop: &D, session: &Session) -> ScreenshotResult<()> {
    match session.image() {
        Some(image) if session.has_image() => desktop.copy_image(image),
        _ => Err(ScreenshotError::Clipboard("no image was captured".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::testing::FakeDesktop;

    #[test]
    fn test_copy_puts_the_capture_on_the_clipboard() {
        let desktop = FakeDesktop::default();
        let mut session = Session::new();
        session.set_image(RgbaImage::new(32, 16));

        copy_capture(&desktop, &session).unwrap();

        assert_eq!(desktop.copied.borrow().as_slice(), [(32, 16)]);
    }

    #[test]
    fn test_copy_without_a_capture_fails() {
        let desktop = FakeDesktop::default();

        let err = copy_capture(&desktop, &Session::new()).unwrap_err();
        assert!(matches!(err, ScreenshotError::Clipboard(_)));

        let mut session = Session::new();
        session.set_image(RgbaImage::new(0, 0));
        assert!(copy_capture(&desktop, &session).is_err());
        assert!(desktop.copied.borrow().is_empty());
    }

    #[test]
    fn test_copy_reports_clipboard_errors() {
        let desktop = FakeDesktop::default().failing_clipboard();
        let mut session = Session::new();
        session.set_image(RgbaImage::new(4, 4));

        assert!(copy_capture(&desktop, &session).is_err());
    }
}
