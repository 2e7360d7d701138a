//! Indeterminate progress indicator drawn while a command runs

use crossterm::{
    cursor, queue,
    style::{Print, Stylize},
    terminal::{Clear, ClearType},
};
use std::io::{IsTerminal, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const TICK: Duration = Duration::from_millis(80);

/// A spinner on stderr. Stops and erases its line when dropped.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Start spinning next to `message`. Does nothing when stderr is not a
    /// terminal.
    pub fn start(message: &str) -> Self {
        let running = Arc::new(AtomicBool::new(true));

        if !std::io::stderr().is_terminal() {
            return Self {
                running,
                handle: None,
            };
        }

        let flag = Arc::clone(&running);
        let message = message.to_string();
        let handle = std::thread::spawn(move || {
            let mut stderr = std::io::stderr();
            let mut frame = 0usize;
            while flag.load(Ordering::Relaxed) {
                let _ = queue!(
                    stderr,
                    cursor::MoveToColumn(0),
                    Clear(ClearType::CurrentLine),
                    Print(FRAMES[frame % FRAMES.len()].cyan()),
                    Print(" "),
                    Print(&message),
                );
                let _ = stderr.flush();
                frame += 1;
                std::thread::sleep(TICK);
            }
            let _ = queue!(stderr, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine));
            let _ = stderr.flush();
        });

        Self {
            running,
            handle: Some(handle),
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_start_and_drop() {
        // Under the test harness stderr is usually captured; either way the
        // drop must return promptly.
        let spinner = Spinner::start("Installing curl");
        std::thread::sleep(Duration::from_millis(20));
        drop(spinner);
    }
}
