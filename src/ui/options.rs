use gtk4 as gtk;
use libadwaita as adw;

use adw::prelude::*;
use gtk::Orientation;
use std::cell::RefCell;
use std::rc::Rc;

use crate::app::{BorderEffect, CaptureConfig, CaptureMode};

const MAX_DELAY: u32 = 99;

/// The "Take Screenshot" window
pub struct OptionsWindow {
    window: adw::ApplicationWindow,
}

struct OptionsComponents {
    take_screenshot_btn: gtk::Button,
    mode_screen: gtk::ToggleButton,
    mode_window: gtk::ToggleButton,
    mode_area: gtk::ToggleButton,
    delay_value: gtk::Label,
    delay_minus: gtk::Button,
    delay_plus: gtk::Button,
    pointer_row: adw::SwitchRow,
    border_row: adw::SwitchRow,
    effect_row: adw::ComboRow,
}

impl OptionsWindow {
    pub fn new(
        app: &adw::Application,
        config: &CaptureConfig,
        on_take: impl Fn(CaptureConfig) + 'static,
    ) -> Self {
        let state = Rc::new(RefCell::new(config.clone()));
        let (content, components) = create_content(config);

        connect_mode_toggles(&state, &components);
        connect_delay_controls(&state, &components);
        connect_switches(&state, &components);

        components.take_screenshot_btn.connect_clicked({
            let state = state.clone();
            move |_| on_take(state.borrow().clone())
        });

        let window = adw::ApplicationWindow::builder()
            .application(app)
            .title("Take Screenshot")
            .content(&content)
            .resizable(false)
            .build();

        Self { window }
    }

    pub fn present(&self) {
        self.window.present();
    }

    pub fn window(&self) -> &adw::ApplicationWindow {
        &self.window
    }

    pub fn close(&self) {
        self.window.destroy();
    }
}

fn create_content(config: &CaptureConfig) -> (gtk::Box, OptionsComponents) {
    let take_screenshot_btn = gtk::Button::builder()
        .label("Take Screenshot")
        .icon_name("camera-photo-symbolic")
        .build();
    take_screenshot_btn.add_css_class("suggested-action");

    let mode_screen = gtk::ToggleButton::builder()
        .label("Screen")
        .active(config.mode == CaptureMode::Screen)
        .build();
    let mode_window = gtk::ToggleButton::builder()
        .label("Window")
        .group(&mode_screen)
        .active(config.mode == CaptureMode::Window)
        .build();
    let mode_area = gtk::ToggleButton::builder()
        .label("Area")
        .group(&mode_screen)
        .active(config.mode == CaptureMode::Area)
        .build();

    let mode_box = gtk::Box::builder()
        .orientation(Orientation::Horizontal)
        .build();
    mode_box.add_css_class("linked");
    mode_box.append(&mode_screen);
    mode_box.append(&mode_window);
    mode_box.append(&mode_area);

    let header_bar = adw::HeaderBar::builder().title_widget(&mode_box).build();
    header_bar.pack_start(&take_screenshot_btn);

    let delay_value = gtk::Label::builder()
        .label(config.delay.to_string())
        .width_chars(2)
        .build();
    let delay_minus = gtk::Button::builder()
        .icon_name("list-remove-symbolic")
        .valign(gtk::Align::Center)
        .build();
    let delay_plus = gtk::Button::builder()
        .icon_name("list-add-symbolic")
        .valign(gtk::Align::Center)
        .build();

    let delay_controls = gtk::Box::builder()
        .orientation(Orientation::Horizontal)
        .build();
    delay_controls.add_css_class("linked");
    delay_controls.append(&delay_minus);
    delay_controls.append(&delay_plus);

    let delay_row = adw::ActionRow::builder()
        .title("Delay in Seconds")
        .sensitive(config.mode != CaptureMode::Area)
        .build();
    delay_row.add_suffix(&delay_value);
    delay_row.add_suffix(&delay_controls);

    let pointer_row = adw::SwitchRow::builder()
        .title("Show Pointer")
        .active(config.include_pointer)
        .build();

    let border_row = adw::SwitchRow::builder()
        .title("Include Window Border")
        .active(config.include_border)
        .sensitive(config.mode == CaptureMode::Window)
        .build();

    let labels: Vec<&str> = BorderEffect::ALL.iter().map(|e| e.label()).collect();
    let effect_row = adw::ComboRow::builder()
        .title("Effect")
        .model(&gtk::StringList::new(&labels))
        .selected(effect_index(config.border_effect))
        .sensitive(config.mode == CaptureMode::Window)
        .build();

    let group = adw::PreferencesGroup::builder()
        .margin_top(12)
        .margin_bottom(12)
        .margin_start(12)
        .margin_end(12)
        .build();
    group.add(&delay_row);
    group.add(&pointer_row);
    group.add(&border_row);
    group.add(&effect_row);

    let content = gtk::Box::builder()
        .orientation(Orientation::Vertical)
        .build();
    content.append(&header_bar);
    content.append(&group);

    let components = OptionsComponents {
        take_screenshot_btn,
        mode_screen,
        mode_window,
        mode_area,
        delay_value,
        delay_minus,
        delay_plus,
        pointer_row,
        border_row,
        effect_row,
    };

    // Delay is meaningless for area grabs, border options only apply to windows.
    let delay_row_handle = delay_row.clone();
    let border_row_handle = components.border_row.clone();
    let effect_row_handle = components.effect_row.clone();
    let update_sensitivity = move |mode: CaptureMode| {
        delay_row_handle.set_sensitive(mode != CaptureMode::Area);
        border_row_handle.set_sensitive(mode == CaptureMode::Window);
        effect_row_handle.set_sensitive(mode == CaptureMode::Window);
    };
    let update_sensitivity = Rc::new(update_sensitivity);
    for (button, mode) in [
        (&components.mode_screen, CaptureMode::Screen),
        (&components.mode_window, CaptureMode::Window),
        (&components.mode_area, CaptureMode::Area),
    ] {
        let update_sensitivity = update_sensitivity.clone();
        button.connect_toggled(move |btn| {
            if btn.is_active() {
                update_sensitivity(mode);
            }
        });
    }

    (content, components)
}

fn effect_index(effect: BorderEffect) -> u32 {
    BorderEffect::ALL
        .iter()
        .position(|e| *e == effect)
        .unwrap_or(0) as u32
}

fn effect_at(index: u32) -> BorderEffect {
    BorderEffect::ALL
        .get(index as usize)
        .copied()
        .unwrap_or_default()
}

fn connect_mode_toggles(state: &Rc<RefCell<CaptureConfig>>, components: &OptionsComponents) {
    for (button, mode) in [
        (&components.mode_screen, CaptureMode::Screen),
        (&components.mode_window, CaptureMode::Window),
        (&components.mode_area, CaptureMode::Area),
    ] {
        let state = state.clone();
        button.connect_toggled(move |btn| {
            if btn.is_active() {
                state.borrow_mut().mode = mode;
            }
        });
    }
}

fn connect_delay_controls(state: &Rc<RefCell<CaptureConfig>>, components: &OptionsComponents) {
    components.delay_minus.connect_clicked({
        let state = state.clone();
        let delay_value = components.delay_value.clone();
        move |_| {
            let mut s = state.borrow_mut();
            s.delay = s.delay.saturating_sub(1);
            delay_value.set_label(&s.delay.to_string());
        }
    });

    components.delay_plus.connect_clicked({
        let state = state.clone();
        let delay_value = components.delay_value.clone();
        move |_| {
            let mut s = state.borrow_mut();
            s.delay = (s.delay + 1).min(MAX_DELAY);
            delay_value.set_label(&s.delay.to_string());
        }
    });
}

fn connect_switches(state: &Rc<RefCell<CaptureConfig>>, components: &OptionsComponents) {
    components.pointer_row.connect_active_notify({
        let state = state.clone();
        move |row| state.borrow_mut().include_pointer = row.is_active()
    });

    components.border_row.connect_active_notify({
        let state = state.clone();
        move |row| state.borrow_mut().include_border = row.is_active()
    });

    components.effect_row.connect_selected_notify({
        let state = state.clone();
        move |row| state.borrow_mut().border_effect = effect_at(row.selected())
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_index_round_trips() {
        for effect in BorderEffect::ALL {
            assert_eq!(effect_at(effect_index(effect)), effect);
        }
    }

    #[test]
    fn test_out_of_range_selection_means_no_effect() {
        assert_eq!(effect_at(gtk::INVALID_LIST_POSITION), BorderEffect::None);
    }
}
