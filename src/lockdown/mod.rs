//! Quiz Lockdown Controller.
//!
//! A UI-agnostic state machine a frontend feeds browser events into. It
//! decides whether quiz content may be shown and which inputs to suppress.
//! Everything here runs on a device the participant controls, so it is
//! advisory only and not a security boundary.

pub mod keys;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use keys::KeyInput;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LockState {
    Unlocked,
    Locked,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum LockdownEvent {
    FullscreenGranted,
    FullscreenDenied(String),
    FullscreenExited,
    Key(KeyInput),
    ContextMenu,
    SelectStart,
    DragStart,
    Copy,
    Cut,
    Paste,
    ScreenCaptureRequested,
    WindowBlur,
    VisibilityHidden,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Violation {
    PrintScreen,
    DevtoolsAttempt,
    ViewSource,
    SaveAttempt,
    SelectAll,
    CopyAttempt,
    PasteAttempt,
    CutAttempt,
    TaskSwitch,
    WindowsKey,
    ContextMenu,
    TextSelection,
    DragAttempt,
    ClipboardAccess,
    ScreenCapture,
    TabSwitch,
    WindowBlur,
}

impl Violation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Violation::PrintScreen => "print_screen",
            Violation::DevtoolsAttempt => "devtools_attempt",
            Violation::ViewSource => "view_source",
            Violation::SaveAttempt => "save_attempt",
            Violation::SelectAll => "select_all",
            Violation::CopyAttempt => "copy_attempt",
            Violation::PasteAttempt => "paste_attempt",
            Violation::CutAttempt => "cut_attempt",
            Violation::TaskSwitch => "task_switch",
            Violation::WindowsKey => "windows_key",
            Violation::ContextMenu => "context_menu",
            Violation::TextSelection => "text_selection",
            Violation::DragAttempt => "drag_attempt",
            Violation::ClipboardAccess => "clipboard_access",
            Violation::ScreenCapture => "screen_capture",
            Violation::TabSwitch => "tab_switch",
            Violation::WindowBlur => "window_blur",
        }
    }

    /// Blur and visibility changes are observed after the fact and cannot be
    /// prevented.
    pub fn is_suppressible(&self) -> bool {
        !matches!(self, Violation::TabSwitch | Violation::WindowBlur)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Let the event's default action happen.
    Allow,
    /// Cancel the event's default action.
    Suppress,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub state: LockState,
    pub disposition: Disposition,
    pub violation: Option<Violation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockdownError {
    #[error("Screen capture is blocked during the quiz")]
    ScreenCaptureBlocked,
}

pub type ViolationObserver = Box<dyn Fn(Violation, u32) + Send + Sync>;

pub struct LockdownController {
    state: LockState,
    violations: u32,
    last_denial: Option<String>,
    observer: Option<ViolationObserver>,
}

impl Default for LockdownController {
    fn default() -> Self {
        Self::new()
    }
}

impl LockdownController {
    pub fn new() -> Self {
        Self {
            state: LockState::Unlocked,
            violations: 0,
            last_denial: None,
            observer: None,
        }
    }

    /// Called with the violation and the running count after each increment.
    pub fn with_observer(mut self, observer: ViolationObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn content_visible(&self) -> bool {
        self.state == LockState::Locked
    }

    pub fn warning_visible(&self) -> bool {
        self.state == LockState::Unlocked
    }

    pub fn violations(&self) -> u32 {
        self.violations
    }

    pub fn last_denial(&self) -> Option<&str> {
        self.last_denial.as_deref()
    }

    /// Stand-in for the display-capture API while a quiz is open.
    pub fn request_screen_capture(&mut self) -> Result<(), LockdownError> {
        self.handle(LockdownEvent::ScreenCaptureRequested);
        Err(LockdownError::ScreenCaptureBlocked)
    }

    pub fn handle(&mut self, event: LockdownEvent) -> Outcome {
        let violation = match event {
            LockdownEvent::FullscreenGranted => {
                if self.state == LockState::Unlocked {
                    log::info!("Fullscreen entered, quiz content unlocked");
                }
                self.state = LockState::Locked;
                self.last_denial = None;
                return self.outcome(Disposition::Allow, None);
            }
            LockdownEvent::FullscreenDenied(reason) => {
                log::warn!("Fullscreen request failed: {}", reason);
                self.last_denial = Some(reason);
                return self.outcome(Disposition::Allow, None);
            }
            LockdownEvent::FullscreenExited => {
                if self.state == LockState::Locked {
                    log::info!("Fullscreen exited, quiz content hidden");
                }
                self.state = LockState::Unlocked;
                return self.outcome(Disposition::Allow, None);
            }
            LockdownEvent::Key(input) => input.violation(),
            LockdownEvent::ContextMenu => Some(Violation::ContextMenu),
            LockdownEvent::SelectStart => Some(Violation::TextSelection),
            LockdownEvent::DragStart => Some(Violation::DragAttempt),
            LockdownEvent::Copy | LockdownEvent::Cut | LockdownEvent::Paste => {
                Some(Violation::ClipboardAccess)
            }
            LockdownEvent::ScreenCaptureRequested => Some(Violation::ScreenCapture),
            LockdownEvent::WindowBlur => Some(Violation::WindowBlur),
            LockdownEvent::VisibilityHidden => Some(Violation::TabSwitch),
        };

        match violation {
            Some(violation) if self.state == LockState::Locked => {
                self.record(violation);
                let disposition = if violation.is_suppressible() {
                    Disposition::Suppress
                } else {
                    Disposition::Allow
                };
                self.outcome(disposition, Some(violation))
            }
            _ => self.outcome(Disposition::Allow, None),
        }
    }

    fn record(&mut self, violation: Violation) {
        self.violations = self.violations.saturating_add(1);
        log::warn!(
            "Security violation detected: {} (total {})",
            violation.as_str(),
            self.violations
        );
        if let Some(observer) = &self.observer {
            observer(violation, self.violations);
        }
    }

    fn outcome(&self, disposition: Disposition, violation: Option<Violation>) -> Outcome {
        Outcome {
            state: self.state,
            disposition,
            violation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn locked() -> LockdownController {
        let mut controller = LockdownController::new();
        controller.handle(LockdownEvent::FullscreenGranted);
        controller
    }

    #[test]
    fn test_starts_unlocked_with_content_hidden() {
        let controller = LockdownController::new();
        assert_eq!(controller.state(), LockState::Unlocked);
        assert!(!controller.content_visible());
        assert!(controller.warning_visible());
        assert_eq!(controller.violations(), 0);
    }

    #[test]
    fn test_fullscreen_enter_and_exit() {
        let mut controller = LockdownController::new();

        let outcome = controller.handle(LockdownEvent::FullscreenGranted);
        assert_eq!(outcome.state, LockState::Locked);
        assert!(controller.content_visible());
        assert!(!controller.warning_visible());

        controller.handle(LockdownEvent::FullscreenExited);
        assert_eq!(controller.state(), LockState::Unlocked);
        assert!(!controller.content_visible());

        for _ in 0..5 {
            controller.handle(LockdownEvent::FullscreenGranted);
            controller.handle(LockdownEvent::FullscreenExited);
        }
        controller.handle(LockdownEvent::FullscreenGranted);
        assert_eq!(controller.state(), LockState::Locked);
    }

    #[test]
    fn test_denied_fullscreen_stays_unlocked() {
        let mut controller = LockdownController::new();
        let outcome = controller.handle(LockdownEvent::FullscreenDenied("NotAllowedError".to_string()));

        assert_eq!(outcome.state, LockState::Unlocked);
        assert_eq!(controller.last_denial(), Some("NotAllowedError"));
        assert_eq!(controller.violations(), 0);
    }

    #[test]
    fn test_each_blocked_key_counts_once_without_state_change() {
        let mut controller = locked();
        let keys = [
            KeyInput::new("PrintScreen"),
            KeyInput::new("F12"),
            KeyInput::new("I").ctrl().shift(),
            KeyInput::new("u").ctrl(),
            KeyInput::new("s").ctrl(),
            KeyInput::new("a").ctrl(),
            KeyInput::new("c").ctrl(),
            KeyInput::new("v").ctrl(),
            KeyInput::new("x").ctrl(),
            KeyInput::new("Tab").alt(),
            KeyInput::new("Meta"),
        ];

        for (i, key) in keys.into_iter().enumerate() {
            let outcome = controller.handle(LockdownEvent::Key(key));
            assert_eq!(outcome.disposition, Disposition::Suppress);
            assert_eq!(outcome.state, LockState::Locked);
            assert_eq!(controller.violations(), i as u32 + 1);
        }
    }

    #[test]
    fn test_dom_events_are_suppressed() {
        let mut controller = locked();
        let events = [
            (LockdownEvent::ContextMenu, Violation::ContextMenu),
            (LockdownEvent::SelectStart, Violation::TextSelection),
            (LockdownEvent::DragStart, Violation::DragAttempt),
            (LockdownEvent::Copy, Violation::ClipboardAccess),
            (LockdownEvent::Cut, Violation::ClipboardAccess),
            (LockdownEvent::Paste, Violation::ClipboardAccess),
        ];
        for (event, expected) in events {
            let outcome = controller.handle(event);
            assert_eq!(outcome.violation, Some(expected));
            assert_eq!(outcome.disposition, Disposition::Suppress);
        }
        assert_eq!(controller.violations(), 6);
    }

    #[test]
    fn test_blur_and_visibility_count_but_are_not_suppressed() {
        let mut controller = locked();
        let blur = controller.handle(LockdownEvent::WindowBlur);
        let hidden = controller.handle(LockdownEvent::VisibilityHidden);

        assert_eq!(blur.disposition, Disposition::Allow);
        assert_eq!(hidden.violation, Some(Violation::TabSwitch));
        assert_eq!(controller.state(), LockState::Locked);
        assert_eq!(controller.violations(), 2);
    }

    #[test]
    fn test_ordinary_keys_are_allowed() {
        let mut controller = locked();
        let outcome = controller.handle(LockdownEvent::Key(KeyInput::new("b")));
        assert_eq!(outcome.disposition, Disposition::Allow);
        assert_eq!(controller.violations(), 0);
    }

    #[test]
    fn test_nothing_is_counted_while_unlocked() {
        let mut controller = LockdownController::new();
        controller.handle(LockdownEvent::Key(KeyInput::new("c").ctrl()));
        controller.handle(LockdownEvent::WindowBlur);
        assert_eq!(controller.violations(), 0);
    }

    #[test]
    fn test_screen_capture_always_rejected() {
        let mut controller = LockdownController::new();
        assert_eq!(
            controller.request_screen_capture(),
            Err(LockdownError::ScreenCaptureBlocked)
        );

        let mut controller = locked();
        assert_eq!(
            controller.request_screen_capture(),
            Err(LockdownError::ScreenCaptureBlocked)
        );
        assert_eq!(controller.violations(), 1);
    }

    #[test]
    fn test_observer_receives_running_count() {
        let seen: Arc<Mutex<Vec<(Violation, u32)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut controller = LockdownController::new()
            .with_observer(Box::new(move |v, n| sink.lock().unwrap().push((v, n))));

        controller.handle(LockdownEvent::FullscreenGranted);
        controller.handle(LockdownEvent::ContextMenu);
        controller.handle(LockdownEvent::Key(KeyInput::new("PrintScreen")));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![(Violation::ContextMenu, 1), (Violation::PrintScreen, 2)]
        );
    }

    #[test]
    fn test_events_deserialize_from_frontend_json() {
        let event: LockdownEvent = serde_json::from_value(serde_json::json!({
            "type": "key",
            "detail": { "key": "c", "ctrl": true }
        }))
        .unwrap();
        assert_eq!(event, LockdownEvent::Key(KeyInput::new("c").ctrl()));

        let event: LockdownEvent =
            serde_json::from_value(serde_json::json!({ "type": "window_blur" })).unwrap();
        assert_eq!(event, LockdownEvent::WindowBlur);
    }
}
