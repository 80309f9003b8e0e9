use crate::config::ReleaseConfig;
use crate::error::UpdateError;
use crate::rules::{Rule, TargetKind};
use crate::version::Version;
use log::{debug, error, info, warn};
use std::path::Path;

/// What happened to each target during a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub updated: Vec<TargetKind>,
    pub skipped: Vec<TargetKind>,
    pub failed: Vec<(TargetKind, String)>,
    /// Targets with a rule that found nothing to change (dry-run only).
    pub unmatched: Vec<TargetKind>,
    /// The `current_release` row written to (or previewed for) the release file.
    pub release_row: Option<String>,
    pub release_file_error: Option<String>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.unmatched.is_empty() && self.release_file_error.is_none()
    }
}

/// Applies every rule configured for `kind`, returning what each rule produced, in order.
///
/// `None` marks a rule that matched nothing, which only happens in dry-run.
pub fn update_target(
    config: &ReleaseConfig,
    kind: TargetKind,
    version: &Version,
    dry_run: bool,
) -> Result<Vec<Option<String>>, UpdateError> {
    let target = config.resolve(kind)?;
    let mut changes = Vec::with_capacity(target.rules.len());
    for rule in &target.rules {
        let change = rule.apply(version, dry_run)?;
        if change.is_none() {
            warn!("`{}`: no matching row in '{}'", kind, rule.path().display());
        }
        changes.push(change);
    }
    Ok(changes)
}

/// Updates every configured target, then records `version` as `current_release` in
/// `release_file` when no target failed.
///
/// Targets are independent: a failing target is logged and the run moves on.
pub fn process_update(
    config: &ReleaseConfig,
    release_file: impl AsRef<Path>,
    version: &Version,
    dry_run: bool,
) -> RunSummary {
    let release_file = release_file.as_ref();
    let mut summary = RunSummary::default();
    info!("Updating release to {} (dry run: {})", version, dry_run);
    if let Some(current) = config.current_release() {
        debug!("Current release: {}", current);
    }

    for kind in TargetKind::ALL {
        match update_target(config, kind, version, dry_run) {
            Ok(changes) => {
                for change in changes.iter().flatten() {
                    if dry_run {
                        info!("`{}`: new content = {}", kind, change.trim_end());
                    } else {
                        debug!("`{}`: new content = {}", kind, change.trim_end());
                    }
                }
                if changes.iter().any(Option::is_none) {
                    summary.unmatched.push(kind);
                } else {
                    summary.updated.push(kind);
                }
            }
            Err(UpdateError::Skipped { section, reason }) => {
                warn!("No release section for `{}`: {}", section, reason);
                summary.skipped.push(kind);
            }
            Err(UpdateError::Failed(e)) => {
                error!("Unable to update `{}`: {}", kind, e);
                summary.failed.push((kind, e.to_string()));
            }
        }
    }

    if !summary.failed.is_empty() || !summary.unmatched.is_empty() {
        warn!(
            "{} target(s) failed, {} without a match, `current_release` left untouched in '{}'",
            summary.failed.len(),
            summary.unmatched.len(),
            release_file.display()
        );
        return summary;
    }

    match Rule::release_file(release_file).apply(version, dry_run) {
        Ok(Some(row)) => {
            info!("'{}': new row = {}", release_file.display(), row.trim_end());
            summary.release_row = Some(row);
        }
        Ok(None) => {
            error!("No `current_release` row in '{}'", release_file.display());
            summary.release_file_error = Some(format!("no `current_release` row in '{}'", release_file.display()));
        }
        Err(e) => {
            error!("Unable to update '{}': {}", release_file.display(), e);
            summary.release_file_error = Some(e.to_string());
        }
    }

    summary
}
