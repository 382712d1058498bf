mod app;
mod config;
mod error;
mod grid;
mod input;
mod paths;
mod terminal;
mod text;

use std::fs::{self, File};
use std::io;
use std::path::Path;

use dummydata_lib::PreviewClient;
use simplelog::{Config as LogConfig, LevelFilter, WriteLogger};

use crate::app::App;
use crate::config::Config;
use crate::error::TuiError;
use crate::terminal::Terminal;

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    paths::rotate_logs();

    let Some(log_path) = paths::log_file() else {
        eprintln!("Cannot determine a cache directory; logging is disabled");
        return;
    };
    let file = match create_log_file(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Cannot create log file {}: {}", log_path.display(), e);
            return;
        }
    };
    if let Err(e) = WriteLogger::init(LevelFilter::Debug, LogConfig::default(), file) {
        eprintln!("Cannot initialize logger: {}", e);
    }
}

/// Creates `path` and its parent directories.
fn create_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    File::create(path)
}

async fn run() -> Result<(), TuiError> {
    let config = Config::load()?;
    log::info!(
        "Starting with backend {} (downloads to {})",
        config.server_url,
        config.download_dir.display()
    );

    let client = PreviewClient::builder()
        .url(&config.server_url)
        .timeout(config.timeout)
        .build()?;

    let mut app = App::new(&config, client);
    let mut terminal = Terminal::new()?;
    app.run(&mut terminal).await
}
