mod analytics;
mod budget;
mod config;
mod db;
mod export;
mod import;
mod models;
mod report;
mod run;
mod ui;

use anyhow::{Context, Result};

use config::{AppPaths, Settings};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let paths = AppPaths::resolve()?;
    let tui = args.len() == 1;
    init_logging(&paths, tui)?;

    let settings = Settings::load(&paths.config_path())?;
    let mut db = db::Database::open(&paths.db_path())?;

    if tui {
        run::as_tui(&mut db, settings)
    } else {
        run::as_cli(&args, &mut db, &settings, &paths.config_path())
    }
}

/// The dashboard owns the terminal, so its log lines go to a file.
fn init_logging(paths: &AppPaths, tui: bool) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::new().filter_or("SPENDTRACK_LOG", "warn"));
    if tui {
        let log_path = paths.log_path();
        let file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}
