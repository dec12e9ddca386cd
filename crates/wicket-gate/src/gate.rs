//! Gate controller.
//!
//! Turns the three inbound events (load, submit, switch guest) into store
//! writes and [`DisplayCommand`]s. Persistence always completes before a
//! view transition is scheduled, so losing the page after scheduling never
//! loses state.

use crate::codes::Whitelist;
use crate::config::GateConfig;
use crate::display::{messages, DisplayCommand, StatusKind, Ticket};
use crate::error::Rejection;
use crate::redemption::{redeem, Acceptance, Decision, GateState, Submission, Verdict};
use crate::registry::Registry;
use crate::session::{initial_screen, InitialScreen};
use crate::store::{KeyValueStore, SlotStore};
use chrono::{DateTime, Utc};

/// A pending delayed switch to the invitation view.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending {
    ticket: Ticket,
    display_name: String,
}

/// The invitation gate.
pub struct Gate<S> {
    config: GateConfig,
    whitelist: Whitelist,
    store: SlotStore<S>,
    state: GateState,
    pending: Option<Pending>,
    next_ticket: u64,
    clock: fn() -> DateTime<Utc>,
}

impl<S: KeyValueStore> Gate<S> {
    /// Create a gate over a backend. The config is assumed valid
    /// (see [`GateConfig::validate`]).
    pub fn new(config: GateConfig, backend: S) -> Self {
        let whitelist = Whitelist::generate(
            config.code_count,
            config.code_step,
            &config.code_prefix,
            &config.code_year,
        );
        Self::with_whitelist(config, whitelist, backend)
    }

    /// Create a gate with an explicit whitelist.
    pub fn with_whitelist(config: GateConfig, whitelist: Whitelist, backend: S) -> Self {
        let store = SlotStore::new(backend, config.store_keys());
        let state = if store.is_locked() {
            GateState::locked()
        } else {
            GateState::fresh(config.max_attempts)
        };
        Self {
            config,
            whitelist,
            store,
            state,
            pending: None,
            next_ticket: 1,
            clock: Utc::now,
        }
    }

    /// Replace the binding timestamp source.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Page load.
    pub fn on_load(&mut self) -> Vec<DisplayCommand> {
        let locked = self.store.is_locked();
        if !locked && self.config.policy.forgets_guest() {
            self.store.clear_last_guest();
        }

        let screen = initial_screen(
            self.config.policy,
            locked,
            self.store.last_guest(),
            self.store.last_credentials(),
        );
        tracing::info!(policy = %self.config.policy, screen = screen_name(&screen), "gate loaded");

        match screen {
            InitialScreen::Locked => {
                self.state = GateState::locked();
                vec![
                    DisplayCommand::ShowLockForm,
                    DisplayCommand::RenderAttemptsRemaining { remaining: 0 },
                    DisplayCommand::DisableForm,
                    DisplayCommand::status(StatusKind::Error, messages::BLOCKED_ON_LOAD),
                ]
            }
            InitialScreen::LockForm { prefill } => {
                self.state = GateState::fresh(self.config.max_attempts);
                let mut commands = vec![
                    DisplayCommand::ShowLockForm,
                    DisplayCommand::EnableForm,
                    DisplayCommand::RenderAttemptsRemaining {
                        remaining: self.state.attempts_left,
                    },
                ];
                match prefill {
                    Some(credentials) => {
                        commands.push(DisplayCommand::PrefillForm {
                            name_raw: credentials.name_raw,
                            code_raw: credentials.code_raw,
                        });
                        commands.push(DisplayCommand::status(StatusKind::Neutral, messages::READY));
                    }
                    None => {
                        commands.push(DisplayCommand::status(StatusKind::Neutral, messages::WAITING));
                    }
                }
                commands
            }
            InitialScreen::Invitation { display_name } => {
                self.state = GateState::fresh(self.config.max_attempts);
                vec![
                    DisplayCommand::RenderAttemptsRemaining {
                        remaining: self.state.attempts_left,
                    },
                    DisplayCommand::ShowInvitation { display_name },
                ]
            }
        }
    }

    /// Form submission.
    pub fn on_submit(&mut self, name_raw: &str, code_raw: &str) -> Vec<DisplayCommand> {
        let submission = Submission::new(name_raw, code_raw);
        let registry = self.store.load_registry();
        let decision = redeem(
            self.state,
            &self.whitelist,
            &registry,
            &submission,
            self.config.remember_credentials,
        );

        self.persist(&decision, registry);
        self.state = decision.state;

        match decision.verdict {
            Verdict::Rejected(Rejection::LockedOut) => vec![
                DisplayCommand::DisableForm,
                DisplayCommand::status(StatusKind::Error, messages::rejection(Rejection::LockedOut)),
            ],
            Verdict::Rejected(rejection) => self.rejected(rejection, &decision),
            Verdict::Accepted(acceptance) => self.accepted(acceptance, &submission),
        }
    }

    /// Apply a decision's effects. Runs before any command is emitted.
    fn persist(&mut self, decision: &Decision, mut registry: Registry) {
        let effects = &decision.effects;
        if let Some((code, name)) = &effects.bind {
            registry.bind(code, name, (self.clock)());
            self.store.save_registry(&registry);
        }
        if effects.lock {
            self.store.set_locked();
        }
        if let Some(display_name) = &effects.last_guest {
            self.store.set_last_guest(display_name);
        }
        if let Some(credentials) = &effects.last_credentials {
            self.store.set_last_credentials(credentials);
        }
    }

    fn rejected(&self, rejection: Rejection, decision: &Decision) -> Vec<DisplayCommand> {
        tracing::debug!(
            reason = rejection.as_str(),
            attempts_left = decision.state.attempts_left,
            "redemption rejected"
        );

        if !rejection.consumes_attempt() {
            return vec![DisplayCommand::status(StatusKind::Error, messages::rejection(rejection))];
        }

        let mut commands = vec![
            DisplayCommand::RenderAttemptsRemaining {
                remaining: decision.state.attempts_left,
            },
            DisplayCommand::status(StatusKind::Error, messages::rejection(rejection)),
        ];
        if decision.just_locked() {
            tracing::info!("attempts exhausted, gate locked");
            commands.push(DisplayCommand::DisableForm);
            commands.push(DisplayCommand::status(
                StatusKind::Error,
                messages::rejection(Rejection::LockedOut),
            ));
        }
        commands
    }

    fn accepted(&mut self, acceptance: Acceptance, submission: &Submission) -> Vec<DisplayCommand> {
        let display_name = submission.display_name().to_string();
        tracing::info!(code = %submission.code, outcome = ?acceptance, "redemption accepted");

        let (greeting, delay) = match acceptance {
            Acceptance::FirstUse => (messages::welcome(&display_name), self.config.welcome_delay),
            Acceptance::Reconnect => (
                messages::welcome_back(&display_name),
                self.config.welcome_back_delay,
            ),
        };

        let mut commands = Vec::with_capacity(3);
        if let Some(stale) = self.pending.take() {
            commands.push(DisplayCommand::Cancel { ticket: stale.ticket });
        }
        commands.push(DisplayCommand::status(StatusKind::Success, greeting));

        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        self.pending = Some(Pending {
            ticket,
            display_name: display_name.clone(),
        });
        commands.push(DisplayCommand::Schedule {
            ticket,
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            display_name,
        });
        commands
    }

    /// A scheduled transition elapsed. Stale or cancelled tickets do nothing.
    pub fn fire(&mut self, ticket: Ticket) -> Vec<DisplayCommand> {
        match self.pending.take() {
            Some(pending) if pending.ticket == ticket => vec![DisplayCommand::ShowInvitation {
                display_name: pending.display_name,
            }],
            other => {
                self.pending = other;
                Vec::new()
            }
        }
    }

    /// "Not you?" button. Does nothing while locked.
    pub fn on_switch_guest(&mut self) -> Vec<DisplayCommand> {
        if self.state.locked {
            return Vec::new();
        }
        tracing::info!("switching guest");

        self.store.clear_last_guest();
        self.state = GateState::fresh(self.config.max_attempts);

        let mut commands = Vec::with_capacity(7);
        if let Some(pending) = self.pending.take() {
            commands.push(DisplayCommand::Cancel {
                ticket: pending.ticket,
            });
        }
        commands.extend([
            DisplayCommand::ShowLockForm,
            DisplayCommand::RenderAttemptsRemaining {
                remaining: self.state.attempts_left,
            },
            DisplayCommand::status(StatusKind::Neutral, messages::WAITING),
            DisplayCommand::ClearForm,
            DisplayCommand::EnableForm,
        ]);
        commands
    }

    /// Page leave. The strict policy forgets the last guest here too.
    pub fn on_unload(&mut self) {
        if self.config.policy.forgets_guest() {
            self.store.clear_last_guest();
        }
    }

    /// Current session state.
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Active configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Valid codes.
    pub fn whitelist(&self) -> &Whitelist {
        &self.whitelist
    }

    /// Slot store (for inspection).
    pub fn store(&self) -> &SlotStore<S> {
        &self.store
    }

    /// Ticket of the pending transition, if any.
    pub fn pending_ticket(&self) -> Option<Ticket> {
        self.pending.as_ref().map(|p| p.ticket)
    }
}

fn screen_name(screen: &InitialScreen) -> &'static str {
    match screen {
        InitialScreen::Locked => "locked",
        InitialScreen::LockForm { prefill: Some(_) } => "lock_form_prefilled",
        InitialScreen::LockForm { prefill: None } => "lock_form",
        InitialScreen::Invitation { .. } => "invitation",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionPolicy;
    use crate::store::MemoryStore;
    use chrono::TimeZone;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn gate(policy: SessionPolicy) -> Gate<MemoryStore> {
        Gate::new(GateConfig::with_policy(policy), MemoryStore::new()).with_clock(fixed_clock)
    }

    fn scheduled(commands: &[DisplayCommand]) -> Option<(Ticket, u64)> {
        commands.iter().find_map(|c| match c {
            DisplayCommand::Schedule { ticket, delay_ms, .. } => Some((*ticket, *delay_ms)),
            _ => None,
        })
    }

    #[test]
    fn load_shows_waiting_form() {
        let mut gate = gate(SessionPolicy::Strict);
        let commands = gate.on_load();
        assert_eq!(
            commands,
            vec![
                DisplayCommand::ShowLockForm,
                DisplayCommand::EnableForm,
                DisplayCommand::RenderAttemptsRemaining { remaining: 3 },
                DisplayCommand::status(StatusKind::Neutral, messages::WAITING),
            ]
        );
    }

    #[test]
    fn first_use_persists_then_schedules() {
        let mut gate = gate(SessionPolicy::Strict);
        gate.on_load();
        let commands = gate.on_submit("Alice Smith", "pfm-2025-003");

        let entry = gate.store().load_registry().lookup("PFM-2025-003").cloned().unwrap();
        assert_eq!(entry.bound_name, "alice smith");
        assert_eq!(entry.bound_at, Some(fixed_clock()));
        assert_eq!(gate.store().last_guest().as_deref(), Some("Alice Smith"));

        assert_eq!(
            commands[0],
            DisplayCommand::status(StatusKind::Success, "Welcome Alice Smith ✨")
        );
        let (ticket, delay) = scheduled(&commands).unwrap();
        assert_eq!(delay, 650);
        assert_eq!(
            gate.fire(ticket),
            vec![DisplayCommand::ShowInvitation {
                display_name: "Alice Smith".into()
            }]
        );
        assert!(gate.fire(ticket).is_empty());
    }

    #[test]
    fn reconnect_uses_shorter_delay() {
        let mut gate = gate(SessionPolicy::Strict);
        gate.on_load();
        gate.on_submit("Alice Smith", "PFM-2025-003");
        let commands = gate.on_submit("alice  smith", "PFM-2025-003");

        assert_eq!(
            commands[1],
            DisplayCommand::status(StatusKind::Success, "Welcome back alice  smith ✨")
        );
        assert_eq!(scheduled(&commands).map(|(_, d)| d), Some(450));
    }

    #[test]
    fn resubmitting_cancels_previous_transition() {
        let mut gate = gate(SessionPolicy::Strict);
        gate.on_load();
        let first = scheduled(&gate.on_submit("Alice Smith", "PFM-2025-003")).unwrap().0;
        let commands = gate.on_submit("Alice Smith", "PFM-2025-003");

        assert_eq!(commands[0], DisplayCommand::Cancel { ticket: first });
        let second = scheduled(&commands).unwrap().0;
        assert_ne!(first, second);
        assert!(gate.fire(first).is_empty());
        assert_eq!(gate.pending_ticket(), Some(second));
    }

    #[test]
    fn locking_attempt_disables_form() {
        let mut gate = gate(SessionPolicy::Strict);
        gate.on_load();
        gate.on_submit("Alice Smith", "NOPE-1");
        gate.on_submit("Alice Smith", "NOPE-2");
        let commands = gate.on_submit("Alice Smith", "NOPE-3");

        assert_eq!(
            commands,
            vec![
                DisplayCommand::RenderAttemptsRemaining { remaining: 0 },
                DisplayCommand::status(StatusKind::Error, "Invalid activation code."),
                DisplayCommand::DisableForm,
                DisplayCommand::status(StatusKind::Error, "Access blocked. Too many attempts."),
            ]
        );
        assert!(gate.store().is_locked());
        assert!(gate.on_switch_guest().is_empty());
    }

    #[test]
    fn locked_submission_does_not_touch_store() {
        let mut gate = gate(SessionPolicy::Strict);
        gate.on_load();
        for _ in 0..3 {
            gate.on_submit("Alice Smith", "NOPE");
        }
        let before = gate.store().backend().clone();
        let commands = gate.on_submit("Alice Smith", "PFM-2025-003");
        assert_eq!(commands[0], DisplayCommand::DisableForm);
        assert_eq!(gate.store().backend(), &before);
    }

    #[test]
    fn switch_guest_resets_session_only() {
        let mut gate = gate(SessionPolicy::Prefill);
        gate.on_load();
        gate.on_submit("Alice Smith", "NOPE");
        let ticket = scheduled(&gate.on_submit("Alice Smith", "PFM-2025-003")).unwrap().0;

        let commands = gate.on_switch_guest();
        assert_eq!(commands[0], DisplayCommand::Cancel { ticket });
        assert!(commands.contains(&DisplayCommand::ClearForm));
        assert!(commands.contains(&DisplayCommand::RenderAttemptsRemaining { remaining: 3 }));
        assert_eq!(gate.state(), GateState::fresh(3));
        assert_eq!(gate.store().last_guest(), None);
        assert!(gate.store().last_credentials().is_some());
        assert_eq!(gate.store().load_registry().len(), 1);
        assert!(gate.fire(ticket).is_empty());
    }

    #[test]
    fn unload_clears_guest_only_when_strict() {
        let mut strict = gate(SessionPolicy::Strict);
        strict.on_submit("Alice Smith", "PFM-2025-003");
        strict.on_unload();
        assert_eq!(strict.store().last_guest(), None);

        let mut sticky = gate(SessionPolicy::Sticky);
        sticky.on_submit("Alice Smith", "PFM-2025-003");
        sticky.on_unload();
        assert_eq!(sticky.store().last_guest().as_deref(), Some("Alice Smith"));
    }
}
