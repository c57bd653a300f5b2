//! Area selection overlay
//!
//! Shows the frozen screen fullscreen and lets the user drag a rectangle.
//! Escape, or closing the overlay, cancels.

use gtk4 as gtk;
use libadwaita as adw;

use gtk::gdk_pixbuf::Pixbuf;
use gtk::prelude::*;
use gtk::{gdk, glib, DrawingArea, EventControllerKey, GestureDrag};
use image::RgbaImage;
use log::debug;
use std::cell::RefCell;
use std::rc::Rc;
use tokio::sync::oneshot;

use crate::capture::CaptureRect;
use crate::platform::clipboard::rgba_image_to_pixbuf;

#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct Selection {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
}

impl Selection {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            start_x: x,
            start_y: y,
            end_x: x,
            end_y: y,
        }
    }

    /// Drag offsets are relative to the start point.
    pub fn drag_to(&mut self, offset_x: f64, offset_y: f64) {
        self.end_x = self.start_x + offset_x;
        self.end_y = self.start_y + offset_y;
    }

    /// Widget rectangle
    pub fn rectangle(&self) -> CaptureRect {
        CaptureRect::from_corners((self.start_x, self.start_y), (self.end_x, self.end_y))
    }

    /// Same rectangle in the pixels of an image drawn at `scale`
    pub fn to_image_rect(&self, scale: f64) -> CaptureRect {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        CaptureRect::from_corners(
            (self.start_x / scale, self.start_y / scale),
            (self.end_x / scale, self.end_y / scale),
        )
    }
}

/// Scale that fits an image into a widget
pub fn fit_scale(widget: (f64, f64), image: (f64, f64)) -> f64 {
    if image.0 <= 0.0 || image.1 <= 0.0 {
        return 1.0;
    }
    (widget.0 / image.0).min(widget.1 / image.1)
}

type Reply = Rc<RefCell<Option<oneshot::Sender<Option<CaptureRect>>>>>;

fn finish(reply: &Reply, result: Option<CaptureRect>) {
    if let Some(sender) = reply.borrow_mut().take() {
        let _ = sender.send(result);
    }
}

pub async fn select_area(app: &adw::Application, frozen: &RgbaImage) -> Option<CaptureRect> {
    let (sender, receiver) = oneshot::channel();
    let reply: Reply = Rc::new(RefCell::new(Some(sender)));

    let pixbuf = rgba_image_to_pixbuf(frozen);
    let selection: Rc<RefCell<Option<Selection>>> = Rc::default();

    let drawing_area = DrawingArea::builder().hexpand(true).vexpand(true).build();
    drawing_area.set_draw_func({
        let selection = selection.clone();
        move |_, cr, width, height| {
            draw_overlay(cr, &pixbuf, *selection.borrow(), width as f64, height as f64);
        }
    });
    drawing_area.set_cursor_from_name(Some("crosshair"));

    let window = gtk::Window::builder()
        .application(app)
        .title("Select Area")
        .decorated(false)
        .child(&drawing_area)
        .build();

    let image_size = (frozen.width() as f64, frozen.height() as f64);
    connect_drag(&drawing_area, &selection, &reply, image_size);

    let keys = EventControllerKey::new();
    keys.connect_key_pressed({
        let reply = reply.clone();
        move |_, key, _, _| {
            if key == gdk::Key::Escape {
                finish(&reply, None);
                glib::Propagation::Stop
            } else {
                glib::Propagation::Proceed
            }
        }
    });
    window.add_controller(keys);

    window.connect_close_request({
        let reply = reply.clone();
        move |_| {
            finish(&reply, None);
            glib::Propagation::Proceed
        }
    });

    window.fullscreen();
    window.present();

    let result = receiver.await.ok().flatten();
    debug!("Area selection finished: {:?}", result);
    window.destroy();
    result
}

fn connect_drag(
    drawing_area: &DrawingArea,
    selection: &Rc<RefCell<Option<Selection>>>,
    reply: &Reply,
    image_size: (f64, f64),
) {
    let drag = GestureDrag::new();

    drag.connect_drag_begin({
        let selection = selection.clone();
        let drawing_area = drawing_area.clone();
        move |_, x, y| {
            *selection.borrow_mut() = Some(Selection::at(x, y));
            drawing_area.queue_draw();
        }
    });

    drag.connect_drag_update({
        let selection = selection.clone();
        let drawing_area = drawing_area.clone();
        move |_, x, y| {
            if let Some(sel) = selection.borrow_mut().as_mut() {
                sel.drag_to(x, y);
            }
            drawing_area.queue_draw();
        }
    });

    drag.connect_drag_end({
        let selection = selection.clone();
        let drawing_area = drawing_area.clone();
        let reply = reply.clone();
        move |_, x, y| {
            let Some(mut sel) = selection.borrow_mut().take() else {
                return;
            };
            sel.drag_to(x, y);

            if !sel.rectangle().is_significant() {
                // Too small, let the user try again
                drawing_area.queue_draw();
                return;
            }

            let scale = fit_scale(
                (drawing_area.width() as f64, drawing_area.height() as f64),
                image_size,
            );
            finish(&reply, Some(sel.to_image_rect(scale)));
        }
    });

    drawing_area.add_controller(drag);
}

fn draw_overlay(
    cr: &gtk::cairo::Context,
    pixbuf: &Pixbuf,
    selection: Option<Selection>,
    da_width: f64,
    da_height: f64,
) {
    let scale = fit_scale(
        (da_width, da_height),
        (pixbuf.width() as f64, pixbuf.height() as f64),
    );

    let _ = cr.save();
    cr.scale(scale, scale);
    cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
    let _ = cr.paint();
    let _ = cr.restore();

    cr.set_source_rgba(0.0, 0.0, 0.0, 0.5);
    let Some(sel) = selection else {
        cr.rectangle(0.0, 0.0, da_width, da_height);
        let _ = cr.fill();
        return;
    };

    let rect = sel.rectangle();
    let rx = rect.x as f64;
    let ry = rect.y as f64;
    let rw = rect.width as f64;
    let rh = rect.height as f64;

    cr.rectangle(0.0, 0.0, da_width, ry);
    cr.rectangle(0.0, ry + rh, da_width, da_height - (ry + rh));
    cr.rectangle(0.0, ry, rx, rh);
    cr.rectangle(rx + rw, ry, da_width - (rx + rw), rh);
    let _ = cr.fill();

    cr.set_source_rgb(1.0, 1.0, 1.0);
    cr.set_line_width(2.0);
    cr.rectangle(rx, ry, rw, rh);
    let _ = cr.stroke();
}
