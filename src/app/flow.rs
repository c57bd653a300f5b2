//! Interactive flow
//!
//! The state machine behind the options window and the review dialog. It
//! decides what a dialog response means in the current state, so that a
//! response arriving mid-save can never start a second save or tear the
//! dialog down underneath it.

use log::debug;

/// Buttons of the review dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogResponse {
    Save,
    Copy,
    Back,
    Edit,
}

impl DialogResponse {
    pub fn id(&self) -> &'static str {
        match self {
            DialogResponse::Save => "save",
            DialogResponse::Copy => "copy",
            DialogResponse::Back => "back",
            DialogResponse::Edit => "edit",
        }
    }

}

/// What happens once a save succeeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterSave {
    OfferViewer,
    LaunchEditor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// Options window shown, waiting for "Take Screenshot"
    Options,
    /// Delay, area selection and grabbing
    Capturing,
    /// Review dialog shown
    Reviewing,
    /// Review dialog busy with a save
    Saving(AfterSave),
    /// Dialog gone, nothing left to do
    Done,
}

/// What the controller must do in response to a dialog button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Save(AfterSave),
    Copy,
    Back,
    Ignore,
}

#[derive(Debug)]
pub struct Flow {
    state: FlowState,
}

impl Default for Flow {
    fn default() -> Self {
        Self::new()
    }
}

impl Flow {
    pub fn new() -> Self {
        Self {
            state: FlowState::Options,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.state, FlowState::Saving(_))
    }

    /// Back to the options window. Refused while a save is in flight.
    pub fn show_options(&mut self) -> bool {
        if self.is_saving() || self.state == FlowState::Capturing {
            return false;
        }
        self.state = FlowState::Options;
        true
    }

    pub fn begin_capture(&mut self) -> bool {
        if self.state != FlowState::Options {
            debug!("Ignoring capture request in state {:?}", self.state);
            return false;
        }
        self.state = FlowState::Capturing;
        true
    }

    /// A finished capture shows the review dialog; a failed or dismissed one
    /// returns to the options window.
    pub fn capture_finished(&mut self, captured: bool) {
        if self.state != FlowState::Capturing {
            return;
        }
        self.state = if captured {
            FlowState::Reviewing
        } else {
            FlowState::Options
        };
    }

    pub fn respond(&mut self, response: DialogResponse) -> Step {
        if self.state != FlowState::Reviewing {
            debug!("Ignoring {:?} in state {:?}", response, self.state);
            return Step::Ignore;
        }

        match response {
            DialogResponse::Save => {
                self.state = FlowState::Saving(AfterSave::OfferViewer);
                Step::Save(AfterSave::OfferViewer)
            }
            DialogResponse::Edit => {
                self.state = FlowState::Saving(AfterSave::LaunchEditor);
                Step::Save(AfterSave::LaunchEditor)
            }
            DialogResponse::Copy => Step::Copy,
            DialogResponse::Back => {
                self.state = FlowState::Options;
                Step::Back
            }
        }
    }

    /// Ends the save. On success the dialog is finished with and the follow-up
    /// action is returned; on failure the dialog is handed back to the user.
    pub fn save_finished(&mut self, saved: bool) -> Option<AfterSave> {
        let FlowState::Saving(after) = self.state else {
            return None;
        };

        if saved {
            self.state = FlowState::Done;
            Some(after)
        } else {
            self.state = FlowState::Reviewing;
            None
        }
    }

    /// The user closed the review dialog themselves.
    pub fn dialog_dismissed(&mut self) -> bool {
        if self.state != FlowState::Reviewing {
            return false;
        }
        self.state = FlowState::Done;
        true
    }
}
