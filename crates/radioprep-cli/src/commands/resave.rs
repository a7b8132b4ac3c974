//! The `resave` subcommand: rewrite TIFFs in place via an external tool.

use radioprep_core::config;
use radioprep_core::resave;
use std::path::PathBuf;

pub fn cmd_resave(root: PathBuf, tool: String, verbose: bool) -> Result<(), String> {
    config::set_verbose(verbose);

    let summary = resave::run(&root, &tool)?;

    if summary.failed.is_empty() {
        Ok(())
    } else {
        Err(format!("{} files failed to resave", summary.failed.len()))
    }
}
