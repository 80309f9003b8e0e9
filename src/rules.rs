use crate::patchers::{
    PatchError, key_path_patcher::patch_key_path, line_patcher::patch_line,
    manifest_patcher::patch_manifest,
};
use crate::version::Version;
use std::fmt;
use std::path::{Path, PathBuf};

// main project file, e.g. `__init__.py` or a Django settings module
pub const MAIN_PROJECT_PATTERN: &str = r#"^__version__\s*=\s*VERSION\s*=\s*['"][.\d\w]+['"]$"#;
pub const MAIN_PROJECT_TEMPLATE: &str = r#"__version__ = VERSION = "{major}.{minor}.{release}""#;

pub const SONAR_PATTERN: &str = r"^sonar.projectVersion=([.\d]+)$";
pub const SONAR_TEMPLATE: &str = "sonar.projectVersion={major}.{minor}";

pub const SETUP_PATTERN: &str = r#"^\s*version=['"]([.\d\w]+)['"],$"#;
pub const SETUP_TEMPLATE: &str = r#"    version="{major}.{minor}.{release}","#;

pub const SETUP_CFG_PATTERN: &str = r"^version = ([.\d\w]+)";
pub const SETUP_CFG_TEMPLATE: &str = "version = {major}.{minor}.{release}";

// Sphinx conf.py
pub const DOCS_VERSION_PATTERN: &str = r#"^version\s*=\s*["']([.\d\w]+)["']$"#;
pub const DOCS_VERSION_TEMPLATE: &str = r#"version = "{major}.{minor}""#;
pub const DOCS_RELEASE_PATTERN: &str = r#"^release\s*=\s*["']([.\d\w]+)["']$"#;
pub const DOCS_RELEASE_TEMPLATE: &str = r#"release = "{major}.{minor}.{release}""#;

pub const NODE_KEY: &str = "version";
pub const ANSIBLE_KEY: &str = "git.version";

pub const RELEASE_INI_PATTERN: &str = r#"^current_release\s*=\s*['"]?([.\d\w]+)['"]?$"#;
pub const RELEASE_INI_TEMPLATE: &str = "current_release = {major}.{minor}.{release}";

/// The kinds of file a `release.ini` can point at, one section each.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TargetKind {
    MainProject,
    Sonar,
    Setup,
    SetupCfg,
    Docs,
    Node,
    Ansible,
}

impl TargetKind {
    /// Every kind, in the order targets are processed.
    pub const ALL: [TargetKind; 7] = [
        TargetKind::MainProject,
        TargetKind::Sonar,
        TargetKind::Setup,
        TargetKind::SetupCfg,
        TargetKind::Docs,
        TargetKind::Node,
        TargetKind::Ansible,
    ];

    pub fn section(self) -> &'static str {
        match self {
            TargetKind::MainProject => "main_project",
            TargetKind::Sonar => "sonar",
            TargetKind::Setup => "setup",
            TargetKind::SetupCfg => "setup_cfg",
            TargetKind::Docs => "docs",
            TargetKind::Node => "node",
            TargetKind::Ansible => "ansible",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section())
    }
}

/// One rewrite applied to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Line { path: PathBuf, pattern: String, template: String },
    KeyPath { path: PathBuf, key_path: String },
    Manifest { path: PathBuf, key: String },
}

impl Rule {
    pub fn line(path: impl Into<PathBuf>, pattern: impl Into<String>, template: impl Into<String>) -> Self {
        Rule::Line { path: path.into(), pattern: pattern.into(), template: template.into() }
    }

    /// The rule keeping `current_release` of the release file itself in sync.
    pub fn release_file(path: impl Into<PathBuf>) -> Self {
        Rule::line(path, RELEASE_INI_PATTERN, RELEASE_INI_TEMPLATE)
    }

    pub fn path(&self) -> &Path {
        match self {
            Rule::Line { path, .. } | Rule::KeyPath { path, .. } | Rule::Manifest { path, .. } => path,
        }
    }

    /// Runs the rule. Returns the new row for line rules, the whole new document otherwise.
    pub fn apply(&self, version: &Version, dry_run: bool) -> Result<Option<String>, PatchError> {
        match self {
            Rule::Line { path, pattern, template } => patch_line(path, pattern, template, version, dry_run),
            Rule::KeyPath { path, key_path } => patch_key_path(path, key_path, version, dry_run).map(Some),
            Rule::Manifest { path, key } => patch_manifest(path, key, version, dry_run).map(Some),
        }
    }
}

/// A configured target with the rules resolved for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub kind: TargetKind,
    pub rules: Vec<Rule>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_default_patterns_compile() {
        for pattern in [
            MAIN_PROJECT_PATTERN,
            SONAR_PATTERN,
            SETUP_PATTERN,
            SETUP_CFG_PATTERN,
            DOCS_VERSION_PATTERN,
            DOCS_RELEASE_PATTERN,
            RELEASE_INI_PATTERN,
        ] {
            assert!(Regex::new(pattern).is_ok(), "pattern does not compile: {pattern}");
        }
    }

    #[test]
    fn test_main_project_pattern() {
        let regex = Regex::new(MAIN_PROJECT_PATTERN).unwrap();
        assert!(regex.is_match(r#"__version__ = VERSION = "0.1.0""#));
        assert!(regex.is_match("__version__=VERSION='0.9.3'"));
        assert!(!regex.is_match(r#"__version__ = "0.1.0""#));
    }

    #[test]
    fn test_setup_pattern() {
        let regex = Regex::new(SETUP_PATTERN).unwrap();
        assert!(regex.is_match(r#"    version="0.1.0","#));
        assert!(!regex.is_match(r#"    version="0.1.0""#));
    }

    #[test]
    fn test_release_ini_pattern() {
        let regex = Regex::new(RELEASE_INI_PATTERN).unwrap();
        assert!(regex.is_match("current_release = 0.1.0"));
        assert!(regex.is_match(r#"current_release="0.1.0""#));
        assert!(!regex.is_match("previous_release = 0.1.0"));
    }

    #[test]
    fn test_docs_patterns_do_not_overlap() {
        let version = Regex::new(DOCS_VERSION_PATTERN).unwrap();
        let release = Regex::new(DOCS_RELEASE_PATTERN).unwrap();
        assert!(version.is_match(r#"version = "0.1""#));
        assert!(!version.is_match(r#"release = "0.1.0""#));
        assert!(release.is_match("release = '0.1.0'"));
        assert!(!release.is_match("version = '0.1'"));
    }

    #[test]
    fn test_sections_are_unique() {
        let mut sections: Vec<&str> = TargetKind::ALL.iter().map(|kind| kind.section()).collect();
        sections.sort_unstable();
        sections.dedup();
        assert_eq!(sections.len(), TargetKind::ALL.len());
    }

    #[test]
    fn test_rule_path() {
        let rule = Rule::release_file("release.ini");
        assert_eq!(rule.path(), Path::new("release.ini"));
        assert!(matches!(rule, Rule::Line { ref pattern, .. } if pattern == RELEASE_INI_PATTERN));
    }
}
