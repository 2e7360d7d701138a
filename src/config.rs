//! Setup configuration: where things go and what gets installed.
//!
//! `SetupPaths` is the fixed path set derived from the home directory.
//! `PackageCatalog` holds the package lists and git tools; it has built-in
//! defaults and can be saved to / loaded from a JSON file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SetupError;

/// Marker that ends Termux's prefix path
pub const TERMUX_PREFIX_SUFFIX: &str = "com.termux/files/usr";

/// Every path the steps read or write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupPaths {
    pub home: PathBuf,
    pub tools: PathBuf,
    pub scripts: PathBuf,
    pub wordlists: PathBuf,
    /// User binaries; git tool entry points are linked here
    pub bin: PathBuf,
    /// Shell startup file receiving the prompt block
    pub bashrc: PathBuf,
    /// Terminal properties file receiving the performance block
    pub termux_properties: PathBuf,
    pub summary_file: PathBuf,
}

impl SetupPaths {
    /// Derive the path set from a home directory. The summary file lands in
    /// the current working directory.
    pub fn from_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            tools: home.join("tools"),
            scripts: home.join("scripts"),
            wordlists: home.join("wordlists"),
            bin: home.join("bin"),
            bashrc: home.join(".bashrc"),
            termux_properties: home.join(".termux").join("termux.properties"),
            summary_file: PathBuf::from("setup_summary.txt"),
            home,
        }
    }

    /// Resolve the home directory from `$HOME`
    pub fn from_env() -> crate::error::Result<Self> {
        let home = std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .ok_or_else(|| SetupError::host("HOME is not set"))?;
        Ok(Self::from_home(home))
    }

    pub fn with_summary_file(mut self, summary_file: impl Into<PathBuf>) -> Self {
        self.summary_file = summary_file.into();
        self
    }

    /// Directories created by the Termux setup step
    pub fn workspace_dirs(&self) -> [&Path; 3] {
        [&self.tools, &self.scripts, &self.wordlists]
    }

    /// Checkout location of a git tool
    pub fn tool_dir(&self, tool: &GitTool) -> PathBuf {
        self.tools.join(&tool.name)
    }
}

/// A tool installed from a git repository rather than a package manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitTool {
    /// Directory name under `tools/` and link name under `bin/`
    pub name: String,
    /// Clone URL
    pub url: String,
    /// Script inside the checkout to link into `bin/` (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
}

/// The package lists and git tools to install
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageCatalog {
    pub core_packages: Vec<String>,
    pub security_packages: Vec<String>,
    pub python_modules: Vec<String>,
    pub git_tools: Vec<GitTool>,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| (*s).to_string()).collect()
}

impl Default for PackageCatalog {
    fn default() -> Self {
        Self {
            core_packages: owned(&[
                "python", "python-pip", "git", "curl", "wget", "nano", "vim", "unzip", "zip",
                "tar", "clang", "make", "cmake",
            ]),
            security_packages: owned(&["nmap", "hydra", "nikto"]),
            python_modules: owned(&[
                "requests",
                "rich",
                "colorama",
                "tqdm",
                "scapy",
                "beautifulsoup4",
                "lxml",
                "pillow",
                "pycryptodome",
                "paramiko",
                "netifaces",
            ]),
            git_tools: vec![GitTool {
                name: "sqlmap".to_string(),
                url: "https://github.com/sqlmapproject/sqlmap.git".to_string(),
                entry_point: Some("sqlmap.py".to_string()),
            }],
        }
    }
}

/// Characters that have no business in a package or tool name
const FORBIDDEN_CHARS: &[char] = &[';', '|', '&', '$', '`', '"', '\'', '/', '\\', '<', '>'];

fn validate_name(kind: &str, name: &str) -> crate::error::Result<()> {
    if name.trim().is_empty() {
        return Err(SetupError::validation(format!("{kind} name is empty")));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(SetupError::validation(format!(
            "{kind} name '{name}' contains whitespace"
        )));
    }
    if name.starts_with('-') {
        return Err(SetupError::validation(format!(
            "{kind} name '{name}' looks like a flag"
        )));
    }
    if let Some(c) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(SetupError::validation(format!(
            "{kind} name '{name}' contains forbidden character '{c}'"
        )));
    }
    Ok(())
}

impl PackageCatalog {
    /// Save the catalog to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize catalog to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write catalog to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load a catalog from a JSON file. Lists missing from the file keep
    /// their built-in defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read catalog from {:?}", path.as_ref()))?;

        let catalog: Self =
            serde_json::from_str(&content).context("Failed to parse catalog JSON")?;

        Ok(catalog)
    }

    /// Reject names that would be unsafe or meaningless as argv entries
    pub fn validate(&self) -> crate::error::Result<()> {
        for name in self
            .core_packages
            .iter()
            .chain(&self.security_packages)
            .chain(&self.python_modules)
        {
            validate_name("Package", name)?;
        }

        let mut seen = std::collections::HashSet::new();
        for tool in &self.git_tools {
            validate_name("Git tool", &tool.name)?;
            if !seen.insert(tool.name.as_str()) {
                return Err(SetupError::validation(format!(
                    "Git tool '{}' is listed twice",
                    tool.name
                )));
            }
            let url = tool.url.trim();
            if url.is_empty() || url.starts_with('-') || url.chars().any(char::is_whitespace) {
                return Err(SetupError::validation(format!(
                    "Git tool '{}' has an invalid URL",
                    tool.name
                )));
            }
            if let Some(entry) = &tool.entry_point {
                if entry.trim().is_empty() || entry.contains("..") || entry.starts_with('/') {
                    return Err(SetupError::validation(format!(
                        "Git tool '{}' has an invalid entry point",
                        tool.name
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_paths_from_home() {
        let paths = SetupPaths::from_home("/data/data/com.termux/files/home");
        assert_eq!(paths.tools, PathBuf::from("/data/data/com.termux/files/home/tools"));
        assert_eq!(
            paths.termux_properties,
            PathBuf::from("/data/data/com.termux/files/home/.termux/termux.properties")
        );
        assert_eq!(paths.summary_file, PathBuf::from("setup_summary.txt"));
        assert_eq!(paths.workspace_dirs().len(), 3);
    }

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = PackageCatalog::default();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.core_packages.len(), 13);
        assert_eq!(catalog.security_packages, vec!["nmap", "hydra", "nikto"]);
        assert_eq!(catalog.python_modules.len(), 11);
        assert_eq!(catalog.git_tools[0].name, "sqlmap");
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        for bad in ["", "two words", "curl;rm", "-y", "a|b", "../x"] {
            let catalog = PackageCatalog {
                core_packages: vec![bad.to_string()],
                ..PackageCatalog::default()
            };
            assert!(catalog.validate().is_err(), "'{bad}' should be rejected");
        }
    }

    #[test]
    fn test_validate_rejects_duplicate_git_tools() {
        let mut catalog = PackageCatalog::default();
        let dup = catalog.git_tools[0].clone();
        catalog.git_tools.push(dup);
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_escaping_entry_point() {
        let mut catalog = PackageCatalog::default();
        catalog.git_tools[0].entry_point = Some("../../etc/passwd".to_string());
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_save_and_load_catalog() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");

        let catalog = PackageCatalog {
            python_modules: vec!["requests".to_string()],
            ..PackageCatalog::default()
        };
        catalog.save_to_file(&path).unwrap();

        let loaded = PackageCatalog::load_from_file(&path).unwrap();
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_partial_catalog_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(&path, r#"{ "security_packages": ["nmap"] }"#).unwrap();

        let loaded = PackageCatalog::load_from_file(&path).unwrap();
        assert_eq!(loaded.security_packages, vec!["nmap"]);
        assert_eq!(loaded.core_packages, PackageCatalog::default().core_packages);
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(PackageCatalog::load_from_file("/nonexistent/catalog.json").is_err());
    }
}
