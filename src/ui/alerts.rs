//! Modal alerts
//!
//! Thin wrappers over `gtk::AlertDialog`. Each one resolves when the user
//! answers; the caller keeps the application held across the await.

use gtk4 as gtk;

use log::debug;

use crate::app::state::SaveTarget;
use crate::error::ScreenshotError;

const ANSWER_YES: i32 = 1;

async fn choose(dialog: gtk::AlertDialog, parent: Option<&gtk::Window>) -> Option<i32> {
    match dialog.choose_future(parent).await {
        Ok(answer) => Some(answer),
        Err(e) => {
            debug!("Alert dismissed: {}", e);
            None
        }
    }
}

fn remediation(err: &ScreenshotError) -> &'static str {
    match err {
        ScreenshotError::PathResolution(_) | ScreenshotError::EncodeWrite(_) => {
            "Choose another folder or file name and try again."
        }
        ScreenshotError::FileConflict { .. } => "Choose another file name to keep both.",
        ScreenshotError::Capture(_) => "Make sure a display is available and try again.",
        ScreenshotError::ExternalToolUnavailable(_) => "Install it and try again.",
        _ => "",
    }
}

pub async fn show_error(parent: Option<&gtk::Window>, title: &str, err: &ScreenshotError) {
    let hint = remediation(err);
    let detail = if hint.is_empty() {
        err.to_string()
    } else {
        format!("{}\n\n{}", err, hint)
    };

    let dialog = gtk::AlertDialog::builder()
        .modal(true)
        .message(title)
        .detail(detail)
        .buttons(["_Close"])
        .build();

    choose(dialog, parent).await;
}

pub async fn confirm_overwrite(parent: Option<&gtk::Window>, target: &SaveTarget) -> bool {
    let conflict = ScreenshotError::FileConflict {
        file_name: target.file_name(),
        folder: target.folder_name(),
    };

    let dialog = gtk::AlertDialog::builder()
        .modal(true)
        .message("Overwrite existing file?")
        .detail(conflict.to_string())
        .buttons(["_No", "_Yes"])
        .cancel_button(0)
        .default_button(0)
        .build();

    choose(dialog, parent).await == Some(ANSWER_YES)
}

pub async fn offer_open(target: &SaveTarget) -> bool {
    let dialog = gtk::AlertDialog::builder()
        .modal(true)
        .message("Screenshot saved")
        .detail(format!(
            "\u{201c}{}\u{201d} was saved in \u{201c}{}\u{201d}.",
            target.file_name(),
            target.folder_name()
        ))
        .buttons(["_Close", "_Open"])
        .cancel_button(0)
        .default_button(1)
        .build();

    choose(dialog, None).await == Some(ANSWER_YES)
}

pub async fn editor_missing(err: &ScreenshotError) {
    let dialog = gtk::AlertDialog::builder()
        .modal(true)
        .message("Cannot open the image editor")
        .detail(format!(
            "{}\n\nThe screenshot was saved. The application will now quit.",
            err
        ))
        .buttons(["_Quit"])
        .build();

    choose(dialog, None).await;
}
