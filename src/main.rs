use anyhow::{Context, Result, bail};
use bump_release::{arguments::Arguments, config::ReleaseConfig, runner::process_update, version::Version};
use clap::Parser;
use log::LevelFilter;

fn main() -> Result<()> {
    let args = Arguments::parse();
    pretty_env_logger::env_logger::builder()
        .filter_level(if args.debug { LevelFilter::Debug } else { LevelFilter::Info })
        .format_timestamp(None)
        .init();

    let version: Version = args.release.parse()?;
    let config = ReleaseConfig::load(&args.release_file)
        .with_context(|| format!("Unable to load release file {:?}", args.release_file))?;

    let summary = process_update(&config, &args.release_file, &version, args.dry_run);

    if !summary.is_success() {
        let mut failures: Vec<String> = summary
            .failed
            .iter()
            .map(|(kind, reason)| format!("`{kind}`: {reason}"))
            .collect();
        failures.extend(summary.unmatched.iter().map(|kind| format!("`{kind}`: no matching row")));
        if let Some(reason) = &summary.release_file_error {
            failures.push(format!("{:?}: {reason}", args.release_file));
        }
        bail!("Release {} not fully applied:\n  {}", version, failures.join("\n  "));
    }

    Ok(())
}
