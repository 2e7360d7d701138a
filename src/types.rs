//! Type-safe selectors for backends, steps and menu actions
//!
//! Replaces the stringly-typed `"pkg"`/`"pip"` switches and raw menu keys
//! with enums that can be matched exhaustively.

use clap::ValueEnum;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// External package manager used to install a package list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Backend {
    /// Termux's apt wrapper
    Pkg,
    /// Python's package installer
    Pip,
}

impl Backend {
    /// The argv that installs (or upgrades) a single package
    pub fn install_argv(self, package: &str) -> Vec<String> {
        let base: &[&str] = match self {
            Self::Pkg => &["pkg", "install", "-y"],
            Self::Pip => &["pip", "install", "--upgrade"],
        };
        base.iter()
            .map(|s| (*s).to_string())
            .chain(std::iter::once(package.to_string()))
            .collect()
    }
}

/// A named unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, EnumIter)]
pub enum Step {
    #[strum(serialize = "Termux Setup")]
    TermuxSetup,
    #[strum(serialize = "Core Packages")]
    CorePackages,
    #[strum(serialize = "Security Tools")]
    SecurityTools,
    #[strum(serialize = "Python Modules")]
    PythonModules,
    #[strum(serialize = "System Optimization")]
    SystemOptimization,
    #[strum(serialize = "Update All")]
    UpdateAll,
    #[strum(serialize = "Fix Broken Termux")]
    FixBroken,
}

/// Something the user can ask for from the menu or the `run` subcommand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
#[derive(Display, EnumString, EnumIter)]
pub enum Action {
    #[value(name = "full-setup")]
    #[strum(serialize = "full-setup")]
    FullSetup,
    #[value(name = "tools")]
    #[strum(serialize = "tools")]
    ToolsOnly,
    #[value(name = "update")]
    #[strum(serialize = "update")]
    UpdateAll,
    #[value(name = "fix")]
    #[strum(serialize = "fix")]
    FixBroken,
    #[value(name = "python")]
    #[strum(serialize = "python")]
    PythonModules,
    #[value(name = "security")]
    #[strum(serialize = "security")]
    SecurityTools,
}

impl Action {
    /// Menu key for this action
    pub const fn key(self) -> char {
        match self {
            Self::FullSetup => '1',
            Self::ToolsOnly => '2',
            Self::UpdateAll => '3',
            Self::FixBroken => '4',
            Self::PythonModules => '5',
            Self::SecurityTools => '6',
        }
    }

    /// Label shown next to the key in the menu
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullSetup => "Full Termux Setup",
            Self::ToolsOnly => "Install Tools Only",
            Self::UpdateAll => "Update All Packages",
            Self::FixBroken => "Fix Broken Termux",
            Self::PythonModules => "Install Python Modules",
            Self::SecurityTools => "Install Security Tools",
        }
    }

    /// Steps run, in order, for this action
    pub const fn steps(self) -> &'static [Step] {
        match self {
            Self::FullSetup => &[
                Step::TermuxSetup,
                Step::CorePackages,
                Step::SecurityTools,
                Step::PythonModules,
                Step::SystemOptimization,
            ],
            Self::ToolsOnly => &[Step::CorePackages, Step::SecurityTools],
            Self::UpdateAll => &[Step::UpdateAll],
            Self::FixBroken => &[Step::FixBroken],
            Self::PythonModules => &[Step::PythonModules],
            Self::SecurityTools => &[Step::SecurityTools],
        }
    }

    /// Whether the action ends by printing and saving the summary
    pub const fn writes_summary(self) -> bool {
        matches!(self, Self::FullSetup)
    }

    /// Look up the action bound to a menu key
    pub fn from_key(key: char) -> Option<Self> {
        Self::iter().find(|a| a.key() == key)
    }
}

/// A parsed menu selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Run(Action),
    Quit,
}

impl MenuChoice {
    pub const QUIT_KEY: char = '0';

    /// Parse one line of user input. Surrounding whitespace is ignored and
    /// exactly one character must remain.
    pub fn parse(input: &str) -> Option<Self> {
        let mut chars = input.trim().chars();
        let key = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        if key == Self::QUIT_KEY {
            return Some(Self::Quit);
        }
        Action::from_key(key).map(Self::Run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_install_argv() {
        assert_eq!(Backend::Pkg.install_argv("curl"), vec!["pkg", "install", "-y", "curl"]);
        assert_eq!(
            Backend::Pip.install_argv("rich"),
            vec!["pip", "install", "--upgrade", "rich"]
        );
    }

    #[test]
    fn test_backend_parses_lowercase() {
        assert_eq!("pkg".parse::<Backend>().unwrap(), Backend::Pkg);
        assert_eq!("pip".parse::<Backend>().unwrap(), Backend::Pip);
        assert!("apt".parse::<Backend>().is_err());
    }

    #[test]
    fn test_menu_keys_are_unique_and_cover_one_to_six() {
        let mut keys: Vec<char> = Action::iter().map(Action::key).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!['1', '2', '3', '4', '5', '6']);
    }

    #[test]
    fn test_menu_choice_parse() {
        assert_eq!(MenuChoice::parse("0"), Some(MenuChoice::Quit));
        assert_eq!(MenuChoice::parse(" 1 \n"), Some(MenuChoice::Run(Action::FullSetup)));
        assert_eq!(MenuChoice::parse("6"), Some(MenuChoice::Run(Action::SecurityTools)));
        assert_eq!(MenuChoice::parse("7"), None);
        assert_eq!(MenuChoice::parse("12"), None);
        assert_eq!(MenuChoice::parse(""), None);
        assert_eq!(MenuChoice::parse("q"), None);
    }

    #[test]
    fn test_full_setup_runs_five_steps_and_writes_summary() {
        let steps = Action::FullSetup.steps();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[0], Step::TermuxSetup);
        assert_eq!(steps[4], Step::SystemOptimization);
        assert!(Action::FullSetup.writes_summary());
        assert!(!Action::ToolsOnly.writes_summary());
    }

    #[test]
    fn test_action_cli_names_roundtrip() {
        for action in Action::iter() {
            let parsed: Action = action.to_string().parse().unwrap();
            assert_eq!(parsed, action);
        }
    }
}
