use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VersionError {
    #[error("Version number \"{0}\" does not respect the <MAJOR>.<MINOR>.<RELEASE> format")]
    Malformed(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Unknown placeholder '{{{placeholder}}}' in template \"{template}\"")]
    UnknownPlaceholder { template: String, placeholder: String },
    #[error("Unbalanced brace in template \"{0}\"")]
    UnbalancedBrace(String),
}

/// A release number split into its three components.
///
/// Components are kept as strings so suffixes such as `1a` survive untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: String,
    pub minor: String,
    pub release: String,
}

impl Version {
    pub fn new(
        major: impl Into<String>,
        minor: impl Into<String>,
        release: impl Into<String>,
    ) -> Self {
        Self { major: major.into(), minor: minor.into(), release: release.into() }
    }

    /// Fills `{major}`, `{minor}` and `{release}` in `template`.
    ///
    /// `{{` and `}}` produce literal braces. Any other placeholder is rejected.
    pub fn render(&self, template: &str) -> Result<String, TemplateError> {
        let mut rendered = String::with_capacity(template.len() + 8);
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    rendered.push('{');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => name.push(c),
                            None => return Err(TemplateError::UnbalancedBrace(template.to_string())),
                        }
                    }
                    match name.as_str() {
                        "major" => rendered.push_str(&self.major),
                        "minor" => rendered.push_str(&self.minor),
                        "release" => rendered.push_str(&self.release),
                        _ => {
                            return Err(TemplateError::UnknownPlaceholder {
                                template: template.to_string(),
                                placeholder: name,
                            });
                        }
                    }
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    rendered.push('}');
                }
                '}' => return Err(TemplateError::UnbalancedBrace(template.to_string())),
                c => rendered.push(c),
            }
        }

        Ok(rendered)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            [major, minor, release] => Ok(Version::new(*major, *minor, *release)),
            _ => Err(VersionError::Malformed(s.to_string())),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.release)
    }
}

/// Splits a release string into `(major, minor, release)`.
pub fn split_version(version: &str) -> Result<(String, String, String), VersionError> {
    let Version { major, minor, release } = version.parse()?;
    Ok((major, minor, release))
}
