//! The `cleanup` subcommand: remove generated pipeline output.

use radioprep_core::cleanup;
use radioprep_core::config;
use std::path::PathBuf;

pub fn cmd_cleanup(root: PathBuf, verbose: bool) -> Result<(), String> {
    config::set_verbose(verbose);

    let summary = cleanup::run(&root)?;

    println!(
        "Removed {} diagnostic files and {} output directories",
        summary.files_removed, summary.dirs_removed
    );

    if summary.failures > 0 {
        Err(format!("{} paths could not be removed", summary.failures))
    } else {
        Ok(())
    }
}
