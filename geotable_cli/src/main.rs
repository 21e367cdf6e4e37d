use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{info, warn};

use geotable::format::{format_bearing, station_format};
use geotable::io::{read_alignments, write_string};
use geotable::report::text::render_text;
use geotable::report::xml::render_xml;
use geotable::{
    AlignmentSource, GeoTableError, LayoutAlignment, Report, ReportKind, ReportSettings, Result,
};

/// Alignment geometry reports from LandXML or JSON alignments.
#[derive(Parser)]
#[command(name = "geotable_cli", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report the horizontal geometry of an alignment.
    Horizontal(ReportArgs),
    /// Report the vertical profile of an alignment.
    Vertical(ReportArgs),
    /// Write horizontal and vertical reports for every alignment in each input.
    Batch {
        inputs: Vec<PathBuf>,
        #[arg(long)]
        out_dir: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
        #[arg(long)]
        settings: Option<PathBuf>,
        #[arg(long, default_value = "fonts")]
        font_dir: PathBuf,
    },
    /// Print a station in CC+OO.OO form.
    #[command(allow_negative_numbers = true)]
    Station { value: f64 },
    /// Print an azimuth in degrees as a quadrant bearing.
    #[command(allow_negative_numbers = true)]
    Bearing { degrees: f64 },
}

#[derive(Args)]
struct ReportArgs {
    input: PathBuf,
    /// Alignment name; defaults to the first one in the file.
    #[arg(long)]
    alignment: Option<String>,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Output file; text and xml print to stdout without it.
    #[arg(long)]
    output: Option<PathBuf>,
    /// JSON report settings.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Directory holding the DejaVuSans font files for pdf output.
    #[arg(long, default_value = "fonts")]
    font_dir: PathBuf,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Xml,
    Pdf,
    Xlsx,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Text => "txt",
            Format::Xml => "xml",
            Format::Pdf => "pdf",
            Format::Xlsx => "xlsx",
        }
    }
}

fn init_logging() {
    if let Ok(path) = std::env::var("GEOTABLE_LOG") {
        match File::create(&path) {
            Ok(file) => {
                env_logger::Builder::from_default_env()
                    .target(env_logger::Target::Pipe(Box::new(file)))
                    .init();
                return;
            }
            Err(e) => eprintln!("Failed to create log file {}: {}", path, e),
        }
    }
    env_logger::Builder::from_default_env().init();
}

fn load_settings(path: Option<&Path>) -> Result<ReportSettings> {
    match path {
        Some(path) => ReportSettings::load(path),
        None => Ok(ReportSettings::default()),
    }
}

fn select(alignments: Vec<LayoutAlignment>, name: Option<&str>) -> Result<LayoutAlignment> {
    let wanted = name.unwrap_or_default();
    alignments
        .into_iter()
        .find(|a| name.is_none() || a.name() == wanted)
        .ok_or_else(|| GeoTableError::MissingAlignment(wanted.to_string()))
}

fn build(kind: ReportKind, source: &LayoutAlignment, settings: &ReportSettings) -> Result<Report> {
    match kind {
        ReportKind::Horizontal => Report::horizontal(source, settings),
        ReportKind::Vertical => Report::vertical(source, settings),
    }
}

fn render(report: &Report, format: Format, output: Option<&Path>, font_dir: &Path) -> Result<()> {
    match format {
        Format::Text | Format::Xml => {
            let body = if format == Format::Text {
                render_text(report)?
            } else {
                render_xml(report)?
            };
            match output {
                Some(path) => write_string(path, &body),
                None => {
                    print!("{body}");
                    Ok(())
                }
            }
        }
        Format::Pdf | Format::Xlsx => {
            let path = output.ok_or_else(|| {
                GeoTableError::Render(format!("{} output needs --output", format.extension()))
            })?;
            write_binary(report, format, path, font_dir)
        }
    }
}

#[cfg(feature = "reporting")]
fn write_binary(report: &Report, format: Format, path: &Path, font_dir: &Path) -> Result<()> {
    if format == Format::Pdf {
        geotable::report::pdf::write_pdf(report, path, font_dir)
    } else {
        geotable::report::excel::write_excel(report, path)
    }
}

#[cfg(not(feature = "reporting"))]
fn write_binary(_report: &Report, format: Format, _path: &Path, _font_dir: &Path) -> Result<()> {
    Err(GeoTableError::Render(format!(
        "{} output requires the `reporting` feature",
        format.extension()
    )))
}

fn run_report(kind: ReportKind, args: &ReportArgs) -> Result<()> {
    let settings = load_settings(args.settings.as_deref())?;
    let source = select(read_alignments(&args.input)?, args.alignment.as_deref())?;
    let report = build(kind, &source, &settings)?;
    render(&report, args.format, args.output.as_deref(), &args.font_dir)?;
    if let Some(path) = &args.output {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn file_stub(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

fn run_batch(
    inputs: &[PathBuf],
    out_dir: &Path,
    format: Format,
    settings: Option<&Path>,
    font_dir: &Path,
) -> Result<()> {
    let settings = load_settings(settings)?;
    fs::create_dir_all(out_dir)?;
    let mut failures = 0;
    for input in inputs {
        let alignments = match read_alignments(input) {
            Ok(alignments) => alignments,
            Err(e) => {
                warn!("Skipping {}: {e}", input.display());
                failures += 1;
                continue;
            }
        };
        for source in alignments {
            for kind in [ReportKind::Horizontal, ReportKind::Vertical] {
                if kind == ReportKind::Vertical && source.profile().is_none() {
                    info!("{} has no profile; skipping vertical report", source.name());
                    continue;
                }
                let path = out_dir.join(format!(
                    "{}_{}.{}",
                    file_stub(source.name()),
                    kind.as_str().to_ascii_lowercase(),
                    format.extension()
                ));
                match build(kind, &source, &settings)
                    .and_then(|report| render(&report, format, Some(&path), font_dir))
                {
                    Ok(()) => println!("Wrote {}", path.display()),
                    Err(e) => {
                        warn!("{} {} report failed: {e}", source.name(), kind.as_str());
                        failures += 1;
                    }
                }
            }
        }
    }
    if failures > 0 {
        eprintln!("{failures} batch item(s) failed");
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Horizontal(args) => run_report(ReportKind::Horizontal, &args),
        Commands::Vertical(args) => run_report(ReportKind::Vertical, &args),
        Commands::Batch {
            inputs,
            out_dir,
            format,
            settings,
            font_dir,
        } => run_batch(&inputs, &out_dir, format, settings.as_deref(), &font_dir),
        Commands::Station { value } => {
            println!("{}", station_format(value));
            Ok(())
        }
        Commands::Bearing { degrees } => {
            println!("{}", format_bearing(degrees.to_radians(), 2));
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    init_logging();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
