use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod controller;
mod inputter;
mod model;
mod theme;
mod ui;

use controller::Controller;
use dashview::browser::BrowserMessage;
use dashview::domain::{DashConfig, DashError};
use dashview::loader;
use model::{Model, Status};

/// Browse, search, sort and summarize a tabular data file.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// CSV, Parquet or Arrow IPC file
    file: String,

    /// Rows per page
    #[arg(long, default_value_t = 10)]
    page_size: usize,

    /// Initial search term
    #[arg(long)]
    search: Option<String>,

    /// Initial sort column
    #[arg(long)]
    sort: Option<String>,

    #[arg(long, default_value = "dashview.log")]
    log_file: String,

    /// Event poll timeout in ms
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    #[arg(long, default_value_t = 30)]
    max_column_width: usize,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let result = run(args);
    ratatui::restore();
    match result {
        Err(e) => {
            error!("Exiting with {e}");
            eprintln!("Error: {:?}", e);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn expand(path: &str) -> Result<PathBuf, DashError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| DashError::LoadingFailed(e.to_string()))
}

fn init_logging(path: &Path) -> Result<(), DashError> {
    let file = File::create(path)?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run(args: Args) -> Result<(), DashError> {
    init_logging(&expand(&args.log_file)?)?;
    info!("Starting dashview!");

    let cfg = DashConfig::default()
        .with_page_size(args.page_size)
        .with_event_poll_time(args.poll_ms)
        .with_max_column_width(args.max_column_width);

    let dataset = loader::load_data_file(expand(&args.file)?)?;
    let mut model = Model::init(&cfg, dataset)?;
    if let Some(term) = args.search {
        model.apply(BrowserMessage::Search(term))?;
    }
    if let Some(key) = args.sort {
        model.apply(BrowserMessage::Sort(key))?;
    }

    let controller = Controller::new(&cfg);
    let mut terminal = ratatui::init();

    while model.status != Status::QUITTING {
        terminal.draw(|f| ui::draw(&model, f))?;

        if let Some(message) = controller.handle_event(&model)? {
            model.update(Some(message))?;
        }
    }

    info!("Bye!");
    Ok(())
}
