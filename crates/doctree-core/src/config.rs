//! Run configuration (`doctree.toml`) parsing and validation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default config file name looked up by the CLI.
pub const CONFIG_FILE: &str = "doctree.toml";

/// Run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Config {
    /// Documentation title.
    pub title: String,

    /// Output directory handed to the renderer.
    pub output: PathBuf,

    /// Renderer name.
    pub renderer: String,

    /// One output partition per class.
    pub split_by_class: bool,

    /// Hoist classes out of their namespace node.
    pub split_from_ns: bool,

    /// Prepended to every output partition name.
    pub prefix: Option<String>,

    /// Appended to every output partition name.
    pub suffix: Option<String>,

    /// Log the parser report.
    pub report: bool,

    /// Produce the parser report instead of a tree.
    pub report_only: bool,

    /// Policy for unresolved cross-references. Parsed and carried, but no
    /// renderer acts on it yet.
    pub broken_links: Option<BrokenLinks>,

    /// Extension aliases as `alias:extension` pairs.
    pub aliases: Vec<String>,

    /// Glob patterns excluded from file discovery.
    pub exclude: Vec<String>,

    /// Global object profile used to link built-in types.
    pub global_objects: Option<String>,

    /// Pretty-print JSON output.
    pub format_json: bool,

    /// Keep existing files in the output directory.
    pub keep_out_dir: bool,

    /// Turn the first resolution diagnostic into a fatal error.
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: String::from("API documentation"),
            output: PathBuf::from("doc"),
            renderer: String::from("json"),
            split_by_class: false,
            split_from_ns: false,
            prefix: None,
            suffix: None,
            report: false,
            report_only: false,
            broken_links: None,
            aliases: Vec::new(),
            exclude: Vec::new(),
            global_objects: None,
            format_json: false,
            keep_out_dir: false,
            strict: false,
        }
    }
}

/// What to do with a link to an unknown id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokenLinks {
    Throw,
    Show,
    Hide,
}

/// Output partitioning policy derived from the split flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputPolicy {
    /// One partition per source file.
    Default,
    /// One partition per class.
    SplitByClass,
    /// Per-file partitions, classes hoisted out of namespaces.
    SplitFromNs,
}

/// Known global object profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalProfile {
    JavaScript,
}

impl GlobalProfile {
    /// Built-in global objects for this profile.
    pub fn objects(self) -> &'static [&'static str] {
        match self {
            GlobalProfile::JavaScript => &[
                "Array", "Boolean", "Date", "Error", "Function", "JSON", "Math", "Number",
                "Object", "RegExp", "String",
            ],
        }
    }
}

impl std::str::FromStr for GlobalProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "javascript" | "js" => Ok(Self::JavaScript),
            _ => Err(ConfigError::UnknownGlobalProfile(s.to_string())),
        }
    }
}

impl Config {
    /// Load a config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a config from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or the options conflict.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check option combinations that cannot be expressed in the types.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.split_by_class && self.split_from_ns {
            return Err(ConfigError::ConflictingPolicies);
        }

        for (field, value) in [("prefix", &self.prefix), ("suffix", &self.suffix)] {
            if let Some(value) = value {
                if value.contains(['/', '\\']) {
                    return Err(ConfigError::InvalidAffix {
                        field,
                        value: value.clone(),
                    });
                }
            }
        }

        self.alias_pairs()?;
        self.global_profile()?;
        Ok(())
    }

    /// The selected output policy.
    pub fn output_policy(&self) -> OutputPolicy {
        if self.split_by_class {
            OutputPolicy::SplitByClass
        } else if self.split_from_ns {
            OutputPolicy::SplitFromNs
        } else {
            OutputPolicy::Default
        }
    }

    /// Extension aliases split into `(alias, extension)` pairs.
    pub fn alias_pairs(&self) -> Result<Vec<(String, String)>, ConfigError> {
        self.aliases
            .iter()
            .map(|pair| match pair.split_once(':') {
                Some((alias, ext)) if !alias.is_empty() && !ext.is_empty() => {
                    Ok((alias.to_string(), ext.to_string()))
                }
                _ => Err(ConfigError::MalformedAlias(pair.clone())),
            })
            .collect()
    }

    /// The configured global object profile, if any.
    pub fn global_profile(&self) -> Result<Option<GlobalProfile>, ConfigError> {
        self.global_objects.as_deref().map(str::parse).transpose()
    }

    /// Apply prefix and suffix to a partition name.
    pub fn partition_name(&self, base: &str) -> String {
        format!(
            "{}{}{}",
            self.prefix.as_deref().unwrap_or(""),
            base,
            self.suffix.as_deref().unwrap_or("")
        )
    }
}
