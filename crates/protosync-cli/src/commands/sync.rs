//! The sync command: one pass over the API tree, then one over the shadow tree

use std::path::PathBuf;

use colored::Colorize;

use protosync_core::config::force_from_env;
use protosync_core::sync::FixedAnswer;
use protosync_core::{
    Confirm, ExternalTools, SyncConfig, SyncMode, SyncOutcome, SyncRequest, TreeSynchronizer,
};
use protosync_git::open_source_control;

use crate::cli::Cli;
use crate::error::{CliError, Result};
use crate::interactive::TerminalConfirm;

/// How a run ended when no error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every pass was clean or applied
    Success,
    /// A check pass found the tree out of date
    Diverged,
}

/// Run the regular pass and, when a shadow root is given, the shadow pass.
///
/// Stops after the first diverging check pass.
pub fn run_sync(cli: &Cli) -> Result<RunStatus> {
    let config = SyncConfig::load(cli.config.as_deref())?;
    let mode = SyncMode::from(cli.mode);
    let artifact_root = cli
        .artifact_root
        .clone()
        .unwrap_or_else(|| config.artifacts.root.clone());
    let force = cli.force || force_from_env();

    if !cli.api_root.is_dir() {
        return Err(CliError::user(format!(
            "API root '{}' is not a directory",
            cli.api_root.display()
        )));
    }

    let source_control = open_source_control(&cli.api_root)?;
    let tools = ExternalTools::new(config.tools.clone());
    let auto = FixedAnswer(true);
    let terminal = TerminalConfirm;
    let confirm: &dyn Confirm = if cli.ci { &auto } else { &terminal };

    let synchronizer = TreeSynchronizer::new(&config.policy, &tools, &artifact_root)
        .with_source_control(source_control.as_ref())
        .with_confirm(confirm)
        .with_history_root(&cli.api_root)
        .with_tooling_paths(config.sync.tooling_paths.clone())
        .force(force)
        .jobs(cli.jobs.or(config.sync.jobs));

    let mut passes: Vec<(PathBuf, bool)> = vec![(cli.api_root.clone(), false)];
    if let Some(shadow_root) = &cli.api_shadow_root {
        passes.push((shadow_root.clone(), true));
    }

    let mut outcomes = Vec::new();
    let mut status = RunStatus::Success;
    for (api_root, shadow) in passes {
        let request = SyncRequest {
            api_root,
            labels: cli.labels.clone(),
            mode,
            ci: cli.ci,
            shadow,
        };
        let outcome = synchronizer.run(&request)?;
        if !cli.json {
            report(&outcome);
        }
        let diverged = outcome.diverged();
        outcomes.push(outcome);
        if diverged {
            status = RunStatus::Diverged;
            break;
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    }
    Ok(status)
}

fn report(outcome: &SyncOutcome) {
    let root = outcome.api_root.display();
    let pass = if outcome.shadow { "shadow" } else { "api" };

    if outcome.is_clean() {
        println!(
            "{} {} tree '{}' is up to date ({} synced, {} unchanged).",
            "OK".green().bold(),
            pass,
            root,
            outcome.synced,
            outcome.skipped
        );
        return;
    }

    match outcome.mode {
        SyncMode::Check => {
            eprintln!(
                "{} Please apply following patch to directory '{}'",
                "DRIFTED".red().bold(),
                root
            );
            eprintln!("{}", outcome.patch);
        }
        SyncMode::Fix => {
            println!(
                "{} Updated {} tree '{}': {} added, {} modified, {} deleted.",
                "=>".blue().bold(),
                pass,
                root,
                outcome.added.len(),
                outcome.modified.len(),
                outcome.deleted.len()
            );
            for path in &outcome.deleted {
                println!("   {} {}", "-".red(), path.cyan());
            }
        }
    }
}
