//! Draftline command-line exporter.
//!
//! Reads a saved project (native or legacy JSON), optionally appends walls
//! from a parametric command file, and writes it in the format named by the
//! output file's extension.

use draftline_core::{Session, SessionError, Unit};
use draftline_render::{Background, ExportError, ExportFormat, ExportOptions, export_to_path};
use std::path::PathBuf;
use thiserror::Error;

const USAGE: &str = "usage: draftline <input.json> <output.{png,svg,dxf,json}> \
[--background <#hex|transparent>] [--font-size <px>] [--padding <px>] \
[--unit <mm|cm|m|in>] [--commands <file>]";

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}\n{usage}", usage = USAGE)]
    Usage(String),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Parsed command line.
#[derive(Debug)]
struct Args {
    input: PathBuf,
    output: PathBuf,
    options: ExportOptions,
    unit: Option<Unit>,
    commands: Option<PathBuf>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, CliError> {
        let mut positional = Vec::new();
        let mut options = ExportOptions::default();
        let mut unit = None;
        let mut commands = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| CliError::Usage(format!("{flag} needs a value")))
            };
            match arg.as_str() {
                "--background" => {
                    let raw = value("--background")?;
                    let background = raw
                        .parse::<Background>()
                        .map_err(|e| CliError::Usage(e.to_string()))?;
                    options = options.with_background(background);
                }
                "--font-size" => options = options.with_font_size(parse_number("--font-size", &value("--font-size")?)?),
                "--padding" => options = options.with_padding(parse_number("--padding", &value("--padding")?)?),
                "--unit" => {
                    let raw = value("--unit")?;
                    unit = Some(raw.parse::<Unit>().map_err(|e| CliError::Usage(e.to_string()))?);
                }
                "--commands" => commands = Some(PathBuf::from(value("--commands")?)),
                flag if flag.starts_with("--") => return Err(CliError::Usage(format!("Unknown option {flag}"))),
                other => positional.push(PathBuf::from(other)),
            }
        }

        let [input, output]: [PathBuf; 2] = positional
            .try_into()
            .map_err(|_| CliError::Usage("Expected an input and an output file".to_string()))?;
        if ExportFormat::from_path(&output).is_none() {
            return Err(CliError::Usage(format!("Unsupported output {}", output.display())));
        }
        Ok(Self {
            input,
            output,
            options,
            unit,
            commands,
        })
    }
}

fn parse_number(flag: &str, raw: &str) -> Result<f64, CliError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(CliError::Usage(format!("{flag} expects a non-negative number, got {raw:?}"))),
    }
}

fn read(path: &PathBuf) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.clone(),
        source,
    })
}

fn run(args: Args) -> Result<ExportFormat, CliError> {
    let mut session = Session::new();
    session.import_document(&read(&args.input)?)?;
    if let Some(unit) = args.unit {
        session.set_unit(unit);
    }
    if let Some(path) = &args.commands {
        let added = session.apply_parametric(&read(path)?)?;
        log::info!("Appended {added} walls from {}", path.display());
    }
    if session.needs_calibration() {
        log::warn!("Drawing is not calibrated; exporting without length labels");
    }
    Ok(export_to_path(session.document(), &args.output, &args.options)?)
}

fn main() {
    env_logger::init();

    let result = Args::parse(std::env::args().skip(1)).and_then(run);
    match result {
        Ok(format) => log::info!("Export finished ({format})"),
        Err(e) => {
            eprintln!("draftline: {e}");
            std::process::exit(1);
        }
    }
}
