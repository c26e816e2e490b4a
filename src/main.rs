use anyhow::{Context, Result};
use clap::Parser;
use dashgram::config::DashboardConfig;
use dashgram::dashboard::Dashboard;
use dashgram::data::Dataset;
use dashgram::runtime::DashboardState;
use dashgram::{csv_reader, logger, parser, OutputFormat};
use log::{error, info};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dashgram")]
#[command(about = "Build a dashboard of up to four grouped charts from tabular data", long_about = None)]
struct Args {
    /// Input file (defaults to stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Read the input as a JSON array of objects instead of CSV
    #[arg(long)]
    json: bool,

    /// Dashboard definition file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Chart slots, e.g. 'chart(x: region, y: sales, type: pie) | chart(x: month)'
    #[arg(long = "chart")]
    charts: Vec<String>,

    /// Directory the rendered charts are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Print the first N rows of the loaded data
    #[arg(long, num_args = 0..=1, default_missing_value = "100")]
    preview: Option<usize>,
}

fn main() {
    let _logger = match logger::set_global_logger("info") {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(Args::parse()) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    for dsl in &args.charts {
        config.charts.extend(parser::parse_slots(dsl)?);
    }

    let mut options = config.render.clone();
    if let Some(format) = args.format {
        options.format = format;
    }
    if let Some(width) = args.width {
        options.width = width;
    }
    if let Some(height) = args.height {
        options.height = height;
    }

    let dataset = load_dataset(&args)?;
    let mut state = DashboardState::new();
    println!("{}", state.load(dataset));

    if let Some(limit) = args.preview {
        if let Some(dataset) = state.dataset() {
            println!("{}", dataset.preview(limit));
        }
    }

    let dashboard = Dashboard::new(config.charts);
    let status = state.generate(&dashboard, &options, Some(&args.out_dir))?;
    for chart in state.charts().charts() {
        if let Some(path) = &chart.path {
            info!("{} -> {}", chart.heading, path.display());
        }
    }
    println!("{}", status);

    Ok(())
}

fn load_dataset(args: &Args) -> Result<Dataset> {
    if args.json {
        let text = match &args.input {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read '{}'", path.display()))?,
            None => {
                let mut text = String::new();
                io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read JSON from stdin")?;
                text
            }
        };
        let value: serde_json::Value =
            serde_json::from_str(&text).context("Input is not valid JSON")?;
        return Dataset::from_json(&value);
    }

    let csv_data = match &args.input {
        Some(path) => csv_reader::read_csv_from_path(path)?,
        None => csv_reader::read_csv_from_stdin()?,
    };
    Ok(Dataset::from_csv(csv_data))
}
