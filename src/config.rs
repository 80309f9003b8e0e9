use crate::error::UpdateError;
use crate::rules::{
    ANSIBLE_KEY, DOCS_RELEASE_PATTERN, DOCS_RELEASE_TEMPLATE, DOCS_VERSION_PATTERN,
    DOCS_VERSION_TEMPLATE, MAIN_PROJECT_PATTERN, MAIN_PROJECT_TEMPLATE, NODE_KEY, Rule,
    SETUP_CFG_PATTERN, SETUP_CFG_TEMPLATE, SETUP_PATTERN, SETUP_TEMPLATE, SONAR_PATTERN,
    SONAR_TEMPLATE, Target, TargetKind,
};
use ini::{Ini, ParseOption};
use log::debug;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_RELEASE_FILE: &str = "release.ini";
pub const DEFAULT_SECTION: &str = "DEFAULT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Release file not found: '{0}'")]
    NotFound(PathBuf),
    #[error("Unable to read release file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to parse release file: {0}")]
    Parse(#[from] ini::ParseError),
}

/// The parsed `release.ini`.
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    ini: Ini,
}

// Patterns are regular expressions: backslashes and quotes must reach them untouched.
fn parse_option() -> ParseOption {
    ParseOption { enabled_quote: false, enabled_escape: false, ..ParseOption::default() }
}

fn strip_quotes(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

impl ReleaseConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        debug!("Loading release file '{}'", path.display());

        let ini = Ini::load_from_file_opt(path, parse_option()).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Io { path: path.to_path_buf(), source },
            ini::Error::Parse(e) => ConfigError::Parse(e),
        })?;
        Ok(ReleaseConfig { ini })
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.ini.section(Some(section)).is_some()
    }

    /// Value of `key` in `section`, with one pair of surrounding double quotes removed.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.ini
            .get_from(Some(section), key)
            .map(strip_quotes)
            .filter(|value| !value.is_empty())
    }

    pub fn get_or<'a>(&'a self, section: &str, key: &str, fallback: &'a str) -> &'a str {
        self.get(section, key).unwrap_or(fallback)
    }

    /// The release recorded by the last run, from `[DEFAULT] current_release`.
    pub fn current_release(&self) -> Option<&str> {
        self.get(DEFAULT_SECTION, "current_release")
    }

    /// Builds the rules for `kind`, filling unset options with the defaults of the kind.
    ///
    /// A missing section or a section without `path` is [`UpdateError::Skipped`].
    /// A single line rule on `path`, `pattern`/`template` options overriding the defaults.
    fn line_rule(&self, section: &str, path: PathBuf, pattern: &str, template: &str) -> Rule {
        Rule::line(
            path,
            self.get_or(section, "pattern", pattern),
            self.get_or(section, "template", template),
        )
    }

    pub fn resolve(&self, kind: TargetKind) -> Result<Target, UpdateError> {
        let section = kind.section();
        if !self.has_section(section) {
            return Err(UpdateError::skipped(section, format!("no `{section}` section")));
        }
        let path = self
            .get(section, "path")
            .map(PathBuf::from)
            .ok_or_else(|| UpdateError::skipped(section, format!("no `path` option in `{section}`")))?;

        let rules = match kind {
            TargetKind::Docs => vec![
                Rule::line(
                    &path,
                    self.get_or(section, "pattern_release", DOCS_RELEASE_PATTERN),
                    self.get_or(section, "template_release", DOCS_RELEASE_TEMPLATE),
                ),
                Rule::line(
                    &path,
                    self.get_or(section, "pattern_version", DOCS_VERSION_PATTERN),
                    self.get_or(section, "template_version", DOCS_VERSION_TEMPLATE),
                ),
            ],
            TargetKind::Node => vec![Rule::Manifest {
                path,
                key: self.get_or(section, "key", NODE_KEY).to_string(),
            }],
            TargetKind::Ansible => vec![Rule::KeyPath {
                path,
                key_path: self.get_or(section, "key", ANSIBLE_KEY).to_string(),
            }],
            TargetKind::MainProject => vec![self.line_rule(section, path, MAIN_PROJECT_PATTERN, MAIN_PROJECT_TEMPLATE)],
            TargetKind::Sonar => vec![self.line_rule(section, path, SONAR_PATTERN, SONAR_TEMPLATE)],
            TargetKind::Setup => vec![self.line_rule(section, path, SETUP_PATTERN, SETUP_TEMPLATE)],
            TargetKind::SetupCfg => vec![self.line_rule(section, path, SETUP_CFG_PATTERN, SETUP_CFG_TEMPLATE)],
        };

        debug!("Resolved `{}`: {:?}", section, rules);
        Ok(Target { kind, rules })
    }
}

impl FromStr for ReleaseConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ReleaseConfig { ini: Ini::load_from_str_opt(s, parse_option())? })
    }
}
