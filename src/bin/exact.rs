//! Binary that takes as standard in an adjacency matrix in its JSON interchange form, computes a
//! vertex cover and writes the solution to standard out, one vertex per line.

use std::error;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use cover_engine::{
    bounded_search::{exact_cover, exact_cover_kernelized},
    config::{CoverMode, EngineConfig},
    connectivity::make_connected,
    graph::{AdjacencyMatrix, Cover},
    heuristics::take_two,
    progress::CancelToken,
    vc_instance::VCInstance,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "exact", about = "Computes vertex covers of adjacency matrices")]
struct Args {
    /// Number of vertices in the cover.
    #[arg(long, short = 'k')]
    size: Option<usize>,

    /// `exact`, `exact+kernelized` or `approximate`. Overrides the configuration.
    #[arg(long, value_parser = parse_mode)]
    mode: Option<CoverMode>,

    /// Try sizes `0, 1, ...` until a cover is found.
    #[arg(long)]
    minimum: bool,

    /// Connect all components before computing the cover.
    #[arg(long)]
    connect: bool,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a random matrix with this many vertices instead of reading one.
    #[arg(long)]
    generate: Option<usize>,

    /// Edge probability for `--generate`.
    #[arg(long, default_value_t = 0.5)]
    density: f64,
}

fn parse_mode(s: &str) -> Result<CoverMode, String> {
    serde_json::from_value(serde_json::Value::String(s.to_owned())).map_err(|e| e.to_string())
}

fn cover_of_size(matrix: &AdjacencyMatrix, mode: CoverMode, k: usize, config: &EngineConfig, cancel: &CancelToken) -> Result<Option<Cover>, Box<dyn error::Error>> {
    let mut on_progress = |p: f64| info!(progress = p, "searching");
    let cover = match mode {
        CoverMode::Exact => exact_cover(matrix, k, config.progress_step, &mut on_progress, cancel)?,
        CoverMode::ExactKernelized => exact_cover_kernelized(matrix, k, config.progress_step, &mut on_progress, cancel)?,
        CoverMode::Approximate => Some(take_two(matrix, config.progress_step, &mut on_progress, cancel)?),
    };
    Ok(cover)
}

pub fn main() -> Result<(), Box<dyn error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cover_engine=info,exact=info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    if let Some(n) = args.generate {
        let matrix = AdjacencyMatrix::generate_random(n, args.density)?;
        serde_json::to_writer_pretty(&mut stdout, &matrix.to_raw())?;
        return Ok(());
    }

    let mut input = String::new();
    io::stdin().lock().read_to_string(&mut input)?;
    let mut matrix = AdjacencyMatrix::from_json(&input)?;
    let cancel = CancelToken::new();
    if args.connect {
        let added = make_connected(&mut matrix, &cancel)?;
        info!(added, "connected components");
    }

    let resu = if config.mode == CoverMode::Approximate {
        cover_of_size(&matrix, config.mode, 0, &config, &cancel)?
    } else if args.minimum {
        let mut found = None;
        for k in 0..=matrix.len() {
            if let Some(cover) = cover_of_size(&matrix, config.mode, k, &config, &cancel)? {
                found = Some(cover);
                break;
            }
        }
        found
    } else {
        let k = args.size.ok_or("either `--size` or `--minimum` is required for the exact modes")?;
        cover_of_size(&matrix, config.mode, k, &config, &cancel)?
    };

    match resu {
        Some(cover) => {
            // Validate
            if !matrix.validate_cover(&cover) {
                return Err("computed cover does not cover every edge".into());
            }
            info!(size = cover.len(), "found cover");
            VCInstance::write_solution(&cover, &mut stdout)?;
        }
        None => writeln!(stdout, "no cover")?,
    }
    Ok(())
}
