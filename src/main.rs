// SPDX-License-Identifier: MIT

use std::{
    io::{IsTerminal, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::Context as _;
use clap::ArgMatches;
use ncprefs_rs::{
    NcError, NcPrefs,
    cli::{build_cli, operations, pick_bundle_id},
    dispatch::{Collaborators, execute},
    ncprefs::{KillDaemons, NoReload, Reloader, Spotlight},
    preferences::open_store,
};
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

fn main() -> ExitCode {
    let matches = build_cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Verbose trace goes to stdout next to the regular output; otherwise only
/// warnings are shown, on stderr.
fn init_tracing(verbose: bool) {
    let builder = FmtSubscriber::builder().with_target(false).without_time();
    let result = if verbose {
        tracing::subscriber::set_global_default(
            builder
                .with_max_level(Level::DEBUG)
                .with_ansi(std::io::stdout().is_terminal())
                .with_writer(std::io::stdout)
                .finish(),
        )
    } else {
        tracing::subscriber::set_global_default(
            builder
                .with_max_level(Level::WARN)
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr)
                .finish(),
        )
    };
    if let Err(e) = result {
        eprintln!("Failed to set up logging: {e}");
    }
}

fn run(matches: &ArgMatches) -> Result<(), NcError> {
    // Parse every value token before touching the preferences.
    let ops = operations(matches)?;

    let mut store = open_store(matches.get_one::<PathBuf>("plist").cloned())?;
    let mut prefs = NcPrefs::load(store.as_mut())?;
    debug!(store = %prefs.location(), ops = ops.len(), "loaded");

    let mut stdout = std::io::stdout().lock();

    if matches.get_flag("pick") {
        let apps = prefs.list(&Spotlight);
        if let Some(id) = pick_bundle_id(&apps)? {
            writeln!(stdout, "{id}").context("Failed to write output")?;
        }
    }

    let reloader: &dyn Reloader = if matches.get_flag("no-reload") {
        &NoReload
    } else {
        &KillDaemons
    };
    let ctx = Collaborators {
        names: &Spotlight,
        reloader,
    };

    let summary = execute(&mut prefs, &ops, &ctx, &mut stdout)?;
    debug!(?summary, "done");
    Ok(())
}
