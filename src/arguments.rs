use clap::Parser;
use std::path::PathBuf;

use crate::config::DEFAULT_RELEASE_FILE;

#[derive(Debug, Parser)]
#[command(author, version, about, bin_name = "bump-release")]
pub struct Arguments {
    /// Release file path
    #[arg(long, short, default_value = DEFAULT_RELEASE_FILE)]
    pub release_file: PathBuf,
    /// If set, no operation is performed on files
    #[arg(long, short = 'n')]
    pub dry_run: bool,
    /// If set, more traces are printed
    #[arg(long, short, visible_alias = "verbose")]
    pub debug: bool,
    /// Version number, as MAJOR.MINOR.RELEASE
    pub release: String,
}
