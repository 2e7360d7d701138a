//! Colors, banner and the short status lines printed by steps
//!
//! All terminal styling goes through here so steps only say *what* happened.
//! Write errors on the console are ignored: a notice that cannot be printed
//! must not change the outcome of a step.

use crossterm::style::{Color, Stylize};
use std::io::Write;

/// Semantic colors
pub struct Colors;

impl Colors {
    pub const PRIMARY: Color = Color::Cyan;
    pub const ACCENT: Color = Color::Yellow;
    pub const SUCCESS: Color = Color::Green;
    pub const ERROR: Color = Color::Red;
    pub const HEADING: Color = Color::Magenta;
    pub const TEXT: Color = Color::White;
}

pub const APP_NAME: &str = "BD-JISAN Termux Setup Tool";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const BANNER_ART: &str = r"
    /$$$$$ /$$$$$$  /$$$$$$   /$$$$$$  /$$   /$$
  |__  $$|_  $$_/ /$$__  $$ /$$__  $$| $$$ | $$
      | $$  | $$  | $$  \__/| $$  \ $$| $$$$| $$
      | $$  | $$  |  $$$$$$ | $$$$$$$$| $$ $$ $$
 /$$  | $$  | $$   \____  $$| $$__  $$| $$  $$$$
| $$  | $$  | $$   /$$  \ $$| $$  | $$| $$\  $$$
|  $$$$$$/ /$$$$$$|  $$$$$$/| $$  | $$| $$ \  $$
 \______/ |______/ \______/ |__/  |__/|__/  \__/

                 I am a cyber warrior.";

/// Horizontal rule of `width` copies of `ch`
pub fn rule(ch: char, width: usize) -> String {
    std::iter::repeat_n(ch, width).collect()
}

pub fn write_banner(out: &mut dyn Write) {
    let _ = write_banner_inner(out);
}

fn write_banner_inner(out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "{}", format!("╔{}╗", rule('═', 50)).with(Colors::PRIMARY))?;
    writeln!(out, "{}", BANNER_ART.with(Colors::PRIMARY))?;
    writeln!(out, "{}", format!("╚{}╝", rule('═', 50)).with(Colors::PRIMARY))?;
    writeln!(out, "{}", format!("      {APP_NAME}").with(Colors::ACCENT))?;
    writeln!(out, "{}", format!("           Version: {VERSION}").with(Colors::SUCCESS))?;
    writeln!(out, "{}", "         Author: Team BCT".with(Colors::PRIMARY))?;
    writeln!(out)?;
    writeln!(out, "{}", "      BANGLADESH CYBER TROOPS".with(Colors::ACCENT))
}

/// `[*] Installing core packages...`
pub fn section(out: &mut dyn Write, msg: &str) {
    let _ = writeln!(out, "\n{}", format!("[*] {msg}").with(Colors::SUCCESS));
}

/// `[+] Installing: curl`
pub fn progress(out: &mut dyn Write, msg: &str) {
    let _ = writeln!(out, "{}", format!("[+] {msg}").with(Colors::ACCENT));
}

/// `[*] sqlmap already exists, updating...`
pub fn info(out: &mut dyn Write, msg: &str) {
    let _ = writeln!(out, "{}", format!("[*] {msg}").with(Colors::PRIMARY));
}

/// `[+] Created: ~/tools`
pub fn created(out: &mut dyn Write, msg: &str) {
    let _ = writeln!(out, "{}", format!("[+] {msg}").with(Colors::SUCCESS));
}

/// `[-] Failed to install: bad-pkg`
pub fn failure(out: &mut dyn Write, msg: &str) {
    let _ = writeln!(out, "{}", format!("[-] {msg}").with(Colors::ERROR));
}

/// `[✓] Core packages installed!`
pub fn done(out: &mut dyn Write, msg: &str) {
    let _ = writeln!(out, "{}", format!("[✓] {msg}").with(Colors::SUCCESS));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut dyn Write)) -> String {
        let mut buf = Vec::new();
        f(&mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_rule_width() {
        assert_eq!(rule('=', 5), "=====");
        assert_eq!(rule('═', 3).chars().count(), 3);
    }

    #[test]
    fn test_status_lines_carry_prefix() {
        assert!(render(|o| failure(o, "Failed to install: x")).contains("[-] Failed to install: x"));
        assert!(render(|o| done(o, "ok")).contains("[✓] ok"));
    }

    #[test]
    fn test_banner_mentions_version() {
        let banner = render(write_banner);
        assert!(banner.contains(VERSION));
        assert!(banner.contains(APP_NAME));
    }
}
