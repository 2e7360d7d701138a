//! Menu dispatcher
//!
//! A blocking read-eval loop over any `BufRead`/`Write` pair. The loop is
//! driven by a small state machine:
//!
//! ```text
//! MenuDisplayed ──(action key)──▶ StepRunning ──(done)──▶ AwaitingAck
//!      ▲   │                                                  │
//!      │   └──(quit key / end of input)──▶ Exited ◀──(EOF)────┤
//!      └──────────────────────(Enter)─────────────────────────┘
//! ```
//!
//! Invalid input keeps the menu in `MenuDisplayed`.

use crossterm::style::Stylize;
use crossterm::{cursor, execute, terminal};
use std::fmt;
use std::io::{BufRead, Write};
use std::time::Duration;
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::error::{Result, SetupError};
use crate::installer::{self, ActionReport};
use crate::steps::StepContext;
use crate::theme::{self, Colors};
use crate::types::{Action, MenuChoice};

/// Dispatcher states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    MenuDisplayed,
    StepRunning,
    AwaitingAck,
    Exited,
}

impl MenuState {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Exited)
    }

    /// Whether `self → to` is an edge of the state machine
    pub const fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::MenuDisplayed, Self::StepRunning)
                | (Self::MenuDisplayed, Self::Exited)
                | (Self::StepRunning, Self::AwaitingAck)
                | (Self::AwaitingAck, Self::MenuDisplayed)
                | (Self::AwaitingAck, Self::Exited)
        )
    }
}

impl fmt::Display for MenuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MenuDisplayed => "menu displayed",
            Self::StepRunning => "step running",
            Self::AwaitingAck => "awaiting acknowledgment",
            Self::Exited => "exited",
        };
        f.write_str(name)
    }
}

/// Why the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuExit {
    /// The quit option was selected
    Quit,
    /// Standard input reached end of file
    InputClosed,
}

/// Presentation knobs
#[derive(Debug, Clone)]
pub struct MenuOptions {
    /// Clear the terminal before drawing the menu
    pub clear_screen: bool,
    /// Pause after an invalid selection
    pub invalid_pause: Duration,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            clear_screen: true,
            invalid_pause: Duration::from_secs(1),
        }
    }
}

pub const FAREWELL: &str = "Thank you for using DarkNK!";

pub struct Menu<'a, R, W> {
    ctx: StepContext<'a>,
    input: R,
    out: W,
    options: MenuOptions,
    state: MenuState,
    reports: Vec<ActionReport>,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(ctx: StepContext<'a>, input: R, out: W, options: MenuOptions) -> Self {
        Self {
            ctx,
            input,
            out,
            options,
            state: MenuState::MenuDisplayed,
            reports: Vec::new(),
        }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    /// Reports of every action run so far, oldest first
    pub fn reports(&self) -> &[ActionReport] {
        &self.reports
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn transition(&mut self, to: MenuState) -> Result<()> {
        if !self.state.can_transition(to) {
            return Err(SetupError::menu_transition(format!(
                "cannot go from {} to {}",
                self.state, to
            )));
        }
        debug!(from = %self.state, to = %to, "menu transition");
        self.state = to;
        Ok(())
    }

    /// Read one line; `None` on end of input. Bytes that are not UTF-8 are
    /// replaced, so a garbled line is just an invalid selection.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut buf = Vec::new();
        let n = self.input.read_until(b'\n', &mut buf)?;
        Ok((n > 0).then(|| String::from_utf8_lossy(&buf).into_owned()))
    }

    fn render(&mut self) -> Result<()> {
        if self.options.clear_screen {
            execute!(
                self.out,
                terminal::Clear(terminal::ClearType::All),
                cursor::MoveTo(0, 0)
            )?;
        }
        theme::write_banner(&mut self.out);

        let bar = theme::rule('═', 40);
        writeln!(self.out, "\n{}", bar.as_str().with(Colors::PRIMARY))?;
        writeln!(self.out, "{}", "        MAIN MENU".with(Colors::ACCENT))?;
        writeln!(self.out, "{}\n", bar.as_str().with(Colors::PRIMARY))?;
        for action in Action::iter() {
            writeln!(
                self.out,
                "{} {}",
                format!("[{}]", action.key()).with(Colors::SUCCESS),
                action.label().with(Colors::TEXT)
            )?;
        }
        writeln!(
            self.out,
            "{} {}",
            format!("[{}]", MenuChoice::QUIT_KEY).with(Colors::SUCCESS),
            "Exit".with(Colors::TEXT)
        )?;
        writeln!(self.out, "\n{}", bar.as_str().with(Colors::PRIMARY))?;
        write!(self.out, "{}", "Select option [0-6]: ".with(Colors::ACCENT))?;
        self.out.flush()?;
        Ok(())
    }

    fn say_farewell(&mut self) -> Result<()> {
        writeln!(self.out, "\n{}", FAREWELL.with(Colors::SUCCESS))?;
        writeln!(self.out, "{}", "Goodbye! 👋".with(Colors::PRIMARY))?;
        Ok(())
    }

    /// Run until quit or end of input
    pub fn run(&mut self) -> Result<MenuExit> {
        loop {
            match self.state {
                MenuState::MenuDisplayed => {
                    self.render()?;
                    let Some(line) = self.read_line()? else {
                        self.transition(MenuState::Exited)?;
                        writeln!(self.out)?;
                        return Ok(MenuExit::InputClosed);
                    };

                    match MenuChoice::parse(&line) {
                        Some(MenuChoice::Quit) => {
                            info!("quit selected");
                            self.transition(MenuState::Exited)?;
                            self.say_farewell()?;
                            return Ok(MenuExit::Quit);
                        }
                        Some(MenuChoice::Run(action)) => {
                            self.transition(MenuState::StepRunning)?;
                            let report = installer::run_action(action, &self.ctx, &mut self.out);
                            self.reports.push(report);
                            self.transition(MenuState::AwaitingAck)?;
                        }
                        None => {
                            debug!(input = line.trim(), "invalid menu selection");
                            writeln!(
                                self.out,
                                "\n{}",
                                "Invalid option! Please try again.".with(Colors::ERROR)
                            )?;
                            std::thread::sleep(self.options.invalid_pause);
                        }
                    }
                }
                MenuState::AwaitingAck => {
                    write!(self.out, "\n{}", "Press Enter to continue...".with(Colors::PRIMARY))?;
                    self.out.flush()?;
                    if self.read_line()?.is_some() {
                        self.transition(MenuState::MenuDisplayed)?;
                    } else {
                        self.transition(MenuState::Exited)?;
                        writeln!(self.out)?;
                        return Ok(MenuExit::InputClosed);
                    }
                }
                state @ (MenuState::StepRunning | MenuState::Exited) => {
                    return Err(SetupError::menu_transition(format!(
                        "menu loop entered in state {state}"
                    )));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_edges() {
        use MenuState::*;
        assert!(MenuDisplayed.can_transition(StepRunning));
        assert!(MenuDisplayed.can_transition(Exited));
        assert!(StepRunning.can_transition(AwaitingAck));
        assert!(AwaitingAck.can_transition(MenuDisplayed));
        assert!(AwaitingAck.can_transition(Exited));

        assert!(!StepRunning.can_transition(Exited));
        assert!(!MenuDisplayed.can_transition(AwaitingAck));
        assert!(!Exited.can_transition(MenuDisplayed));
        assert!(Exited.is_terminal());
        assert!(!AwaitingAck.is_terminal());
    }
}
