//! Terminal presentation layer.
//!
//! Renders gate commands as plain text and owns the timers behind
//! `Schedule` commands.

use crate::error::Result;
use std::io::{self, Write};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use wicket_gate::{messages, DisplayCommand, Gate, KeyValueStore, Presenter, StatusKind, Ticket};

/// Which screen is visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    LockForm,
    Invitation { display_name: String },
}

/// Terminal view state, driven only by [`DisplayCommand`]s.
#[derive(Debug)]
pub struct TerminalPresenter<W> {
    out: W,
    pub screen: Screen,
    pub enabled: bool,
    pub prefill: Option<(String, String)>,
    pub timer: Option<(Ticket, Duration)>,
    failed: Option<io::Error>,
}

impl<W: Write> TerminalPresenter<W> {
    /// Create a presenter writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            screen: Screen::LockForm,
            enabled: true,
            prefill: None,
            timer: None,
            failed: None,
        }
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text)
    }

    fn prompt(&mut self, label: &str) -> io::Result<()> {
        write!(self.out, "{}", label)?;
        self.out.flush()
    }

    /// First write error hit while applying commands, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.failed.take()
    }

    /// Apply commands and surface any write error.
    fn present(&mut self, commands: &[DisplayCommand]) -> Result<()> {
        self.apply_all(commands);
        match self.take_error() {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    fn render(&mut self, command: &DisplayCommand) -> io::Result<()> {
        match command {
            DisplayCommand::RenderStatus { kind, message } => {
                let marker = match kind {
                    StatusKind::Neutral => "·",
                    StatusKind::Success => "✓",
                    StatusKind::Error => "✗",
                };
                self.line(&format!("{} {}", marker, message))?;
            }
            DisplayCommand::RenderAttemptsRemaining { remaining } => {
                self.line(&messages::attempts_left(*remaining))?;
            }
            DisplayCommand::DisableForm => self.enabled = false,
            DisplayCommand::EnableForm => self.enabled = true,
            DisplayCommand::ClearForm => self.prefill = None,
            DisplayCommand::PrefillForm { name_raw, code_raw } => {
                self.prefill = Some((name_raw.clone(), code_raw.clone()));
            }
            DisplayCommand::ShowLockForm => {
                if self.screen != Screen::LockForm {
                    self.line("")?;
                }
                self.screen = Screen::LockForm;
                self.line("== Invitation locked ==")?;
            }
            DisplayCommand::ShowInvitation { display_name } => {
                self.screen = Screen::Invitation {
                    display_name: display_name.clone(),
                };
                self.line("")?;
                self.line("== You're invited ==")?;
                self.line(&format!("Personal invitation for: {}", display_name))?;
                self.line("(/switch to change guest, /quit to leave)")?;
            }
            DisplayCommand::Schedule {
                ticket, delay_ms, ..
            } => {
                self.timer = Some((*ticket, Duration::from_millis(*delay_ms)));
            }
            DisplayCommand::Cancel { ticket } => {
                if self.timer.map(|(t, _)| t) == Some(*ticket) {
                    self.timer = None;
                }
            }
        }
        Ok(())
    }
}

impl<W: Write> Presenter for TerminalPresenter<W> {
    fn apply(&mut self, command: &DisplayCommand) {
        if let Err(e) = self.render(command) {
            self.failed.get_or_insert(e);
        }
    }
}

/// What the user asked for.
enum Input {
    Submit { name: String, code: String },
    Switch,
    Quit,
    Idle,
}

fn as_command(line: &str) -> Option<Input> {
    match line.trim() {
        "/quit" | "/q" => Some(Input::Quit),
        "/switch" => Some(Input::Switch),
        _ => None,
    }
}

/// Run an interactive session until `/quit`, end of input, or lockout.
pub async fn run<S, W>(gate: &mut Gate<S>, presenter: &mut TerminalPresenter<W>) -> Result<()>
where
    S: KeyValueStore,
    W: Write,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    presenter.present(&gate.on_load())?;

    loop {
        let on_invitation = matches!(presenter.screen, Screen::Invitation { .. });
        if !presenter.enabled && !on_invitation {
            presenter.line("Form disabled. Clear the store file to start over.")?;
            break;
        }

        let input = if on_invitation {
            presenter.prompt("> ")?;
            match lines.next_line().await? {
                Some(line) => as_command(&line).unwrap_or(Input::Idle),
                None => Input::Quit,
            }
        } else {
            let (default_name, default_code) = presenter.prefill.clone().unwrap_or_default();
            presenter.prompt(&with_default("Full name", &default_name))?;
            let Some(name) = lines.next_line().await? else {
                break;
            };
            match as_command(&name) {
                Some(command) => command,
                None => {
                    presenter.prompt(&with_default("Activation code", &default_code))?;
                    let Some(code) = lines.next_line().await? else {
                        break;
                    };
                    Input::Submit {
                        name: or_default(name, default_name),
                        code: or_default(code, default_code),
                    }
                }
            }
        };

        match input {
            Input::Quit => break,
            Input::Idle => {}
            Input::Switch => presenter.present(&gate.on_switch_guest())?,
            Input::Submit { name, code } => {
                presenter.present(&gate.on_submit(&name, &code))?;
                if let Some((ticket, delay)) = presenter.timer.take() {
                    tokio::time::sleep(delay).await;
                    presenter.present(&gate.fire(ticket))?;
                }
            }
        }
    }

    gate.on_unload();
    Ok(())
}

fn with_default(label: &str, default: &str) -> String {
    if default.is_empty() {
        format!("{}: ", label)
    } else {
        format!("{} [{}]: ", label, default.trim())
    }
}

fn or_default(typed: String, default: String) -> String {
    if typed.trim().is_empty() {
        default
    } else {
        typed
    }
}
