use clap::Parser;
use std::{
    io::{self, BufRead, Write},
    process::ExitCode,
    time::Instant,
};
use tracing::{error, info};

use crate::{
    config::{Config, StartArgs},
    error::DriveCopyError,
    store::{drive::DriveClient, dry_run::DryRun, RemoteStore},
    walk::{resolve_root_owner, Walker},
};

pub mod config;
pub mod error;
pub mod store;
pub mod walk;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let args = StartArgs::parse();

    tracing_subscriber::fmt().with_max_level(args.log_level).init();

    match start(args).await {
        Ok(()) => {
            info!("Finished successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Aborted: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn start(args: StartArgs) -> Result<(), DriveCopyError> {
    let StartArgs {
        root,
        target,
        config_path,
        page_size,
        dry_run,
        ..
    } = args;

    let config = match config_path {
        Some(path) => Config::read(path)?,
        None => Config::default(),
    };

    let root = input(root, "Root folder id")?;
    let target = input(target, "Target user email")?;

    let client = DriveClient::new(
        &config.api_url,
        config.access_token()?,
        page_size.unwrap_or(config.page_size),
    );

    if dry_run {
        info!("Dry run, nothing will be created");
        run(&DryRun::new(client), &root, &target).await
    } else {
        run(&client, &root, &target).await
    }
}

async fn run<S: RemoteStore>(store: &S, root: &str, target: &str) -> Result<(), DriveCopyError> {
    let start = Instant::now();

    let root_owner = resolve_root_owner(store, root).await?;
    info!("Root folder {root} is owned by {root_owner}, copying items owned by {target}");

    let mut walker = Walker::new(store, target, &root_owner);
    walker.walk(root).await?;

    let summary = walker.summary();
    info!(
        "Done in {}ms. Folders walked: {} Owned items: {} Created: {} Failed: {}",
        start.elapsed().as_millis(),
        summary.folders_walked,
        summary.owned_found,
        summary.created,
        summary.failed
    );

    Ok(())
}

/// Use the value given on the command line or ask for it on stdin.
fn input(value: Option<String>, label: &str) -> Result<String, DriveCopyError> {
    if let Some(value) = value {
        return Ok(value);
    }

    let mut stdout = io::stdout();
    write!(stdout, "{label}: ")?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    let value = line.trim();
    if value.is_empty() {
        return Err(DriveCopyError::Config(format!("{label} is required")));
    }

    Ok(value.to_string())
}
