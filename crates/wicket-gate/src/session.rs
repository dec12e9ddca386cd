//! Load-time reconnection policy.

use crate::config::SessionPolicy;
use crate::store::LastCredentials;

/// The first screen to show after load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitialScreen {
    /// Lock flag set: lock form, inputs disabled
    Locked,
    /// Lock form, optionally prefilled
    LockForm { prefill: Option<LastCredentials> },
    /// Skip the form and show the invitation
    Invitation { display_name: String },
}

impl SessionPolicy {
    /// Whether this policy forgets the last guest on load and on page leave.
    pub const fn forgets_guest(self) -> bool {
        matches!(self, Self::Strict)
    }
}

/// Decide the initial screen. The lock flag always wins.
///
/// `last_guest` and `last_credentials` are only consulted by the policies
/// that use them.
pub fn initial_screen(
    policy: SessionPolicy,
    locked: bool,
    last_guest: Option<String>,
    last_credentials: Option<LastCredentials>,
) -> InitialScreen {
    if locked {
        return InitialScreen::Locked;
    }
    match policy {
        SessionPolicy::Strict => InitialScreen::LockForm { prefill: None },
        SessionPolicy::Sticky => match last_guest {
            Some(display_name) => InitialScreen::Invitation { display_name },
            None => InitialScreen::LockForm { prefill: None },
        },
        SessionPolicy::Prefill => InitialScreen::LockForm {
            prefill: last_credentials,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> LastCredentials {
        LastCredentials {
            name_raw: "Alice Smith".into(),
            code_raw: "PFM-2025-003".into(),
        }
    }

    #[test]
    fn lock_beats_every_policy() {
        for policy in [SessionPolicy::Strict, SessionPolicy::Sticky, SessionPolicy::Prefill] {
            assert_eq!(
                initial_screen(policy, true, Some("Alice".into()), Some(credentials())),
                InitialScreen::Locked
            );
        }
    }

    #[test]
    fn strict_ignores_remembered_state() {
        assert_eq!(
            initial_screen(SessionPolicy::Strict, false, Some("Alice".into()), Some(credentials())),
            InitialScreen::LockForm { prefill: None }
        );
        assert!(SessionPolicy::Strict.forgets_guest());
        assert!(!SessionPolicy::Sticky.forgets_guest());
    }

    #[test]
    fn sticky_restores_last_guest() {
        assert_eq!(
            initial_screen(SessionPolicy::Sticky, false, Some("Alice".into()), None),
            InitialScreen::Invitation {
                display_name: "Alice".into()
            }
        );
        assert_eq!(
            initial_screen(SessionPolicy::Sticky, false, None, Some(credentials())),
            InitialScreen::LockForm { prefill: None }
        );
    }

    #[test]
    fn prefill_uses_credentials_only() {
        assert_eq!(
            initial_screen(SessionPolicy::Prefill, false, Some("Alice".into()), Some(credentials())),
            InitialScreen::LockForm {
                prefill: Some(credentials())
            }
        );
        assert_eq!(
            initial_screen(SessionPolicy::Prefill, false, Some("Alice".into()), None),
            InitialScreen::LockForm { prefill: None }
        );
    }
}
