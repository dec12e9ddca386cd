//! Presentation commands.
//!
//! The gate never touches a UI. Every operation returns a list of
//! [`DisplayCommand`]s that a presentation layer (terminal, browser page)
//! applies in order.

use crate::error::Rejection;
use serde::{Deserialize, Serialize};

/// Handle for a scheduled view transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(pub u64);

/// Tone of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Neutral,
    Success,
    Error,
}

/// A command for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DisplayCommand {
    /// Replace the status line
    RenderStatus { kind: StatusKind, message: String },
    /// Show the remaining attempt count
    RenderAttemptsRemaining { remaining: u32 },
    /// Disable name, code and submit inputs
    DisableForm,
    /// Enable name, code and submit inputs
    EnableForm,
    /// Empty both input fields
    ClearForm,
    /// Fill the inputs with remembered raw values
    PrefillForm { name_raw: String, code_raw: String },
    /// Show the lock form, hide the invitation
    ShowLockForm,
    /// Show the invitation, hide the lock form
    ShowInvitation { display_name: String },
    /// Call `Gate::fire(ticket)` after `delay_ms`
    Schedule {
        ticket: Ticket,
        delay_ms: u64,
        display_name: String,
    },
    /// Drop the timer for `ticket`, if still pending
    Cancel { ticket: Ticket },
}

impl DisplayCommand {
    pub(crate) fn status(kind: StatusKind, message: impl Into<String>) -> Self {
        Self::RenderStatus {
            kind,
            message: message.into(),
        }
    }
}

/// A presentation layer.
pub trait Presenter {
    /// Apply one command.
    fn apply(&mut self, command: &DisplayCommand);

    /// Apply commands in order.
    fn apply_all(&mut self, commands: &[DisplayCommand]) {
        for command in commands {
            self.apply(command);
        }
    }
}

/// Status texts shown by the gate.
pub mod messages {
    use super::Rejection;

    pub const WAITING: &str = "Waiting…";
    pub const READY: &str = "Ready. Press unlock to continue.";
    pub const BLOCKED_ON_LOAD: &str = "Access blocked (too many attempts).";

    /// Greeting for a first use.
    pub fn welcome(display_name: &str) -> String {
        format!("Welcome {} ✨", display_name)
    }

    /// Greeting for a reconnect.
    pub fn welcome_back(display_name: &str) -> String {
        format!("Welcome back {} ✨", display_name)
    }

    /// Status text for a rejection.
    pub fn rejection(rejection: Rejection) -> String {
        rejection.to_string()
    }

    /// Attempt counter label.
    pub fn attempts_left(remaining: u32) -> String {
        format!("Attempts left: {}", remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_serialize_tagged() {
        let json = serde_json::to_value(DisplayCommand::ShowInvitation {
            display_name: "Alice".into(),
        })
        .unwrap();
        assert_eq!(json["cmd"], "show_invitation");
        assert_eq!(json["display_name"], "Alice");

        let json = serde_json::to_value(DisplayCommand::status(StatusKind::Error, "x")).unwrap();
        assert_eq!(json["cmd"], "render_status");
        assert_eq!(json["kind"], "error");

        let json = serde_json::to_value(DisplayCommand::DisableForm).unwrap();
        assert_eq!(json, serde_json::json!({ "cmd": "disable_form" }));
    }

    #[test]
    fn ticket_serializes_bare() {
        let json = serde_json::to_value(DisplayCommand::Cancel { ticket: Ticket(7) }).unwrap();
        assert_eq!(json, serde_json::json!({ "cmd": "cancel", "ticket": 7 }));
    }

    #[test]
    fn greetings() {
        assert_eq!(messages::welcome("Alice"), "Welcome Alice ✨");
        assert_eq!(messages::welcome_back("Alice"), "Welcome back Alice ✨");
        assert_eq!(messages::attempts_left(2), "Attempts left: 2");
    }

    #[derive(Default)]
    struct Recorder(Vec<DisplayCommand>);

    impl Presenter for Recorder {
        fn apply(&mut self, command: &DisplayCommand) {
            self.0.push(command.clone());
        }
    }

    #[test]
    fn apply_all_preserves_order() {
        let mut recorder = Recorder::default();
        recorder.apply_all(&[DisplayCommand::ShowLockForm, DisplayCommand::EnableForm]);
        assert_eq!(recorder.0, vec![DisplayCommand::ShowLockForm, DisplayCommand::EnableForm]);
    }
}
