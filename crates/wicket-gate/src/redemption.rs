//! Redemption state machine.
//!
//! [`redeem`] is a pure function: it takes the current [`GateState`], the
//! whitelist, the registry and a [`Submission`], and returns the next state,
//! the verdict, and the [`Effects`] the caller must persist. Nothing here
//! touches a store.
//!
//! # Rule order
//!
//! The first applicable rule wins:
//!
//! 1. locked → `LockedOut` (nothing evaluated, nothing consumed)
//! 2. name shorter than [`MIN_NAME_LEN`] → `InvalidName` (free)
//! 3. code not whitelisted → `InvalidCode` (costs an attempt)
//! 4. code bound to another name → `CodeConflict` (costs an attempt)
//! 5. code bound to this name → `Reconnect`
//! 6. otherwise → `FirstUse`, bind the code

use crate::codes::Whitelist;
use crate::error::Rejection;
use crate::registry::Registry;
use crate::store::LastCredentials;

/// Shortest accepted normalized name, in characters.
pub const MIN_NAME_LEN: usize = 3;

/// Canonical name for comparison and storage: trimmed, internal whitespace
/// runs collapsed to one space, lowercased.
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Canonical code: trimmed and uppercased.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// One form submission, with both raw and normalized forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Name exactly as typed
    pub name_raw: String,
    /// Code exactly as typed
    pub code_raw: String,
    /// Normalized name
    pub name: String,
    /// Normalized code
    pub code: String,
}

impl Submission {
    /// Capture and normalize a submission.
    pub fn new(name_raw: impl Into<String>, code_raw: impl Into<String>) -> Self {
        let name_raw = name_raw.into();
        let code_raw = code_raw.into();
        Self {
            name: normalize_name(&name_raw),
            code: normalize_code(&code_raw),
            name_raw,
            code_raw,
        }
    }

    /// Trimmed raw name, used for display and LastGuest.
    pub fn display_name(&self) -> &str {
        self.name_raw.trim()
    }
}

/// Session-scoped gate state. Only `locked` is ever persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateState {
    pub attempts_left: u32,
    pub locked: bool,
}

impl GateState {
    /// Fresh session with a full attempt budget.
    pub const fn fresh(max_attempts: u32) -> Self {
        Self {
            attempts_left: max_attempts,
            locked: false,
        }
    }

    /// State of a browser whose lock flag is already set.
    pub const fn locked() -> Self {
        Self {
            attempts_left: 0,
            locked: true,
        }
    }

    /// Consume one attempt, locking when the budget is gone.
    fn consume_attempt(self) -> Self {
        let attempts_left = self.attempts_left.saturating_sub(1);
        Self {
            attempts_left,
            locked: self.locked || attempts_left == 0,
        }
    }
}

/// How an accepted submission was accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// Code was unbound and is now bound to this guest
    FirstUse,
    /// Code was already bound to this guest
    Reconnect,
}

/// Result of one redemption attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted(Acceptance),
    Rejected(Rejection),
}

/// Writes the caller must apply, in field order, after the decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Effects {
    /// Bind `(code, normalized_name)` in the registry
    pub bind: Option<(String, String)>,
    /// Set the persisted lock flag
    pub lock: bool,
    /// Persist LastGuest
    pub last_guest: Option<String>,
    /// Persist LastCredentials
    pub last_credentials: Option<LastCredentials>,
}

impl Effects {
    /// Whether there is nothing to persist.
    pub fn is_empty(&self) -> bool {
        self.bind.is_none()
            && !self.lock
            && self.last_guest.is_none()
            && self.last_credentials.is_none()
    }
}

/// Output of [`redeem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub state: GateState,
    pub verdict: Verdict,
    pub effects: Effects,
}

impl Decision {
    fn reject(state: GateState, rejection: Rejection) -> Self {
        let (state, lock) = if rejection.consumes_attempt() {
            let next = state.consume_attempt();
            (next, next.locked && !state.locked)
        } else {
            (state, false)
        };
        Self {
            state,
            verdict: Verdict::Rejected(rejection),
            effects: Effects {
                lock,
                ..Effects::default()
            },
        }
    }

    /// Whether this attempt locked the gate.
    pub fn just_locked(&self) -> bool {
        self.effects.lock
    }
}

/// Decide the outcome of a submission.
///
/// `remember_credentials` controls whether an acceptance also records the
/// raw input for later prefill.
///
/// # Examples
///
/// ```
/// use wicket_gate::{redeem, Acceptance, GateState, Registry, Submission, Verdict, Whitelist};
///
/// let whitelist = Whitelist::from_codes(["PFM-2025-003"]);
/// let decision = redeem(
///     GateState::fresh(3),
///     &whitelist,
///     &Registry::new(),
///     &Submission::new("Alice Smith", "pfm-2025-003"),
///     false,
/// );
/// assert_eq!(decision.verdict, Verdict::Accepted(Acceptance::FirstUse));
/// ```
pub fn redeem(
    state: GateState,
    whitelist: &Whitelist,
    registry: &Registry,
    submission: &Submission,
    remember_credentials: bool,
) -> Decision {
    if state.locked {
        return Decision {
            state,
            verdict: Verdict::Rejected(Rejection::LockedOut),
            effects: Effects::default(),
        };
    }

    if submission.name.chars().count() < MIN_NAME_LEN {
        return Decision::reject(state, Rejection::InvalidName);
    }

    if !whitelist.contains(&submission.code) {
        return Decision::reject(state, Rejection::InvalidCode);
    }

    let acceptance = match registry.lookup(&submission.code) {
        Some(entry) if !entry.is_bound_to(&submission.name) => {
            return Decision::reject(state, Rejection::CodeConflict);
        }
        Some(_) => Acceptance::Reconnect,
        None => Acceptance::FirstUse,
    };

    let bind = match acceptance {
        Acceptance::FirstUse => Some((submission.code.clone(), submission.name.clone())),
        Acceptance::Reconnect => None,
    };
    let last_credentials = remember_credentials.then(|| LastCredentials {
        name_raw: submission.name_raw.clone(),
        code_raw: submission.code_raw.clone(),
    });

    Decision {
        state,
        verdict: Verdict::Accepted(acceptance),
        effects: Effects {
            bind,
            lock: false,
            last_guest: Some(submission.display_name().to_string()),
            last_credentials,
        },
    }
}
