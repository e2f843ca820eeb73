use clap::Parser;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use grid_dot_reader::{
    DARK_THRESHOLD, DetectError, DetectionResult, DotConfig, ErrorBody, GridSpec, OutputShape,
    decode_image, detect_dots,
};

#[derive(Parser, Debug)]
#[command(
    name = "dot_grid",
    about = "Detect dark dots in an image and report the grid cell of each one",
    version
)]
struct Cli {
    /// Input image path, or `-` to read encoded bytes from stdin
    #[arg(short = 'i', long = "image")]
    image: PathBuf,

    /// Number of grid rows
    #[arg(short = 'r', long = "rows", default_value_t = 5, allow_negative_numbers = true)]
    rows: i64,

    /// Number of grid columns
    #[arg(short = 'c', long = "cols", default_value_t = 5, allow_negative_numbers = true)]
    cols: i64,

    /// Group column indices by row instead of listing dots
    #[arg(short = 'g', long = "grouped")]
    grouped: bool,

    /// Pixels darker than this are dot material
    #[arg(short = 't', long = "threshold", default_value_t = DARK_THRESHOLD)]
    threshold: u8,

    /// Write JSON here instead of stdout
    #[arg(short = 'o', long = "out")]
    out: Option<PathBuf>,

    /// Pretty-print the JSON
    #[arg(long = "pretty")]
    pretty: bool,
}

fn read_input(path: &Path) -> Result<Vec<u8>, DetectError> {
    if path.as_os_str() == "-" {
        let mut bytes = Vec::new();
        io::stdin()
            .read_to_end(&mut bytes)
            .map_err(|e| DetectError::InternalFailure(format!("failed to read stdin: {e}")))?;
        return Ok(bytes);
    }
    if !path.exists() {
        return Err(DetectError::MissingInput);
    }
    fs::read(path).map_err(|e| {
        DetectError::InternalFailure(format!("failed to read {}: {e}", path.display()))
    })
}

fn run(cli: &Cli) -> Result<DetectionResult, DetectError> {
    let grid = GridSpec::new(cli.rows, cli.cols)?;
    let config = DotConfig {
        dark_threshold: cli.threshold,
        output: if cli.grouped {
            OutputShape::Grouped
        } else {
            OutputShape::Flat
        },
    };

    tracing::info!("Loading image: {}", cli.image.display());
    let bytes = read_input(&cli.image)?;
    let buffer = decode_image(&bytes)?;
    tracing::info!("Image size: {}x{}", buffer.width(), buffer.height());

    let result = detect_dots(&buffer, &grid, &config)?;
    tracing::info!(
        "Detected {} dots on a {}x{} grid",
        result.len(),
        grid.rows(),
        grid.cols()
    );
    Ok(result)
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

fn emit(json: &str, out: Option<&Path>) -> io::Result<()> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json)?;
            tracing::info!("Results written to {}", path.display());
            Ok(())
        }
        None => writeln!(io::stdout().lock(), "{json}"),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let (json, code) = match run(&cli) {
        Ok(result) => (to_json(&result, cli.pretty), ExitCode::SUCCESS),
        Err(err) => {
            tracing::error!("Detection failed ({}): {err}", err.status_code());
            let code = if err.is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            };
            (to_json(&ErrorBody::from(&err), cli.pretty), code)
        }
    };

    let written = json
        .map_err(io::Error::other)
        .and_then(|json| emit(&json, cli.out.as_deref()));
    if let Err(e) = written {
        eprintln!("Failed to write output: {e}");
        return ExitCode::FAILURE;
    }
    code
}
