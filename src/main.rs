use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use notice_canvas::{Job, LayoutSettings, Palette, RenderOptions, Rgb};

/// Compose numbered notice records onto a branded template image.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// JSON array of {"index", "title", "body"} records
    #[arg(short, long)]
    records: PathBuf,

    /// Background template image (at least 536px tall)
    #[arg(short, long)]
    template: PathBuf,

    /// Where to write the full composed image
    #[arg(short, long)]
    output: PathBuf,

    /// Directory for page slices; defaults to the output's directory
    #[arg(long)]
    pages_dir: Option<PathBuf>,

    /// Maximum height of each page slice in pixels
    #[arg(long, default_value_t = 2000)]
    chunk_height: u32,

    /// Only write the full image
    #[arg(long)]
    no_split: bool,

    /// Layout settings JSON; every key is required
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Write the effective layout settings to this path before rendering
    #[arg(long)]
    write_settings: Option<PathBuf>,

    /// Accent color for the index and title text, as #RRGGBB
    #[arg(long, default_value = "#EE7500")]
    accent: String,

    /// Directory searched first for font files
    #[arg(long)]
    fonts: Option<PathBuf>,

    /// Measure with the fixed-pitch width model instead of font files (no text is painted)
    #[arg(long)]
    heuristic_metrics: bool,
}

fn run(cli: Cli) -> Result<(), notice_canvas::Error> {
    let settings = match &cli.settings {
        Some(path) => LayoutSettings::load(path)?,
        None => LayoutSettings::default(),
    };
    if let Some(path) = &cli.write_settings {
        settings.save(path)?;
        log::info!("Wrote layout settings to {}", path.display());
    }

    let accent = Rgb::from_hex(&cli.accent).ok_or_else(|| {
        notice_canvas::Error::Configuration(format!("invalid accent color {:?}", cli.accent))
    })?;

    let job = Job {
        records: cli.records,
        template: cli.template,
        output: cli.output,
        pages_dir: cli.pages_dir,
        settings,
        options: RenderOptions {
            chunk_height: cli.chunk_height,
            split_pages: !cli.no_split,
            palette: Palette::with_accent(accent),
        },
        fonts_dir: cli.fonts,
        heuristic_metrics: cli.heuristic_metrics,
    };

    for path in notice_canvas::generate(&job)? {
        println!("{}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
