use serde::{Deserialize, Serialize};

use super::Violation;

/// A keyboard event as reported by the frontend (`KeyboardEvent.key` plus
/// modifier flags).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct KeyInput {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

impl KeyInput {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Default::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Blocked combinations; anything else is let through.
    pub fn violation(&self) -> Option<Violation> {
        let key = self.key.as_str();
        match key {
            "PrintScreen" => return Some(Violation::PrintScreen),
            "F12" => return Some(Violation::DevtoolsAttempt),
            "Meta" | "OS" => return Some(Violation::WindowsKey),
            "Tab" if self.alt => return Some(Violation::TaskSwitch),
            _ => {}
        }

        // Cmd on macOS stands in for Ctrl.
        if !(self.ctrl || self.meta) {
            return None;
        }
        if self.shift && key == "I" {
            return Some(Violation::DevtoolsAttempt);
        }
        match key {
            "u" => Some(Violation::ViewSource),
            "s" => Some(Violation::SaveAttempt),
            "a" => Some(Violation::SelectAll),
            "c" => Some(Violation::CopyAttempt),
            "v" => Some(Violation::PasteAttempt),
            "x" => Some(Violation::CutAttempt),
            _ => None,
        }
    }
}
