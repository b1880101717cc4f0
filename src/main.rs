use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{error, info, Level};

use skeletron::export::{export_edges, SkeletonLines};
use skeletron::settings::{Classification, ExportMode, Settings};
use skeletron::{input, skeleton_from_polygon, Polygon};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// one `x1 y1 x2 y2 typecode` line per halfedge
    Text,
    /// a json list of `[[x1, y1], [x2, y2], typecode]`
    Json,
    /// merged inner bisector polylines, one per line
    Lines,
}

/// Reads a polygon from stdin and prints its straight skeleton.
///
/// Input is one `x y` pair per line. A blank line starts a new ring: the first
/// ring is the outer boundary, the following rings are holes.
#[derive(Parser, Debug)]
#[command(name = "skeletron", version)]
struct Cli {
    /// read rings as nested json arrays `[[[x, y], ...], ...]`
    #[arg(long)]
    json_input: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// json settings file, flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    mode: Option<ExportMode>,
    #[arg(long, value_enum)]
    classification: Option<Classification>,
    /// only print the halfedge pointing away from the boundary
    #[arg(long)]
    single_direction: bool,
    #[arg(long)]
    max_events: Option<usize>,
    #[arg(long)]
    tolerance: Option<f64>,
}
impl Cli {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_json_file(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => Settings::default(),
        };
        if let Some(mode) = self.mode { settings.export_mode = mode }
        if let Some(classification) = self.classification { settings.classification = classification }
        if self.single_direction { settings.both_directions = false }
        if self.max_events.is_some() { settings.max_events = self.max_events }
        if let Some(tolerance) = self.tolerance { settings.tolerance = tolerance }
        settings.validate()?;
        Ok(settings)
    }
}

fn main() -> ExitCode {
    init_logger();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let settings = cli.settings()?;
    let stdin = io::stdin();
    let rings = if cli.json_input {
        input::read_json_rings(stdin.lock())
    } else {
        input::read_rings(stdin.lock())
    }.context("reading rings from stdin")?;
    info!("read {} rings", rings.len());

    let polygon = Polygon::from_rings(rings)?;
    let skeleton = skeleton_from_polygon(&polygon, &settings)?;

    let mut out = BufWriter::new(io::stdout().lock());
    match cli.format {
        OutputFormat::Text => {
            for record in export_edges(&skeleton, &settings) {
                writeln!(out, "{} {} {} {} {}",
                    record.start.x, record.start.y, record.end.x, record.end.y, record.typecode)?;
            }
        },
        OutputFormat::Json => {
            serde_json::to_writer(&mut out, &export_edges(&skeleton, &settings))?;
            writeln!(out)?;
        },
        OutputFormat::Lines => {
            for line in SkeletonLines::from(&skeleton).inner {
                let points: Vec<String> = line.iter().map(|p| format!("{} {}", p.x, p.y)).collect();
                writeln!(out, "{}", points.join(", "))?;
            }
        },
    }
    out.flush()?;
    Ok(())
}

fn init_logger(){
    env_logger::builder()
        .format(|buf, record|{
            match record.level() {
                Level::Error => write!(buf,"\x1b[031mError\x1b[0m")?,
                Level::Warn  => write!(buf,"\x1b[033mWarn \x1b[0m")?,
                Level::Info  => write!(buf,"\x1b[032mInfo \x1b[0m")?,
                Level::Debug => write!(buf,"\x1b[034mDebug\x1b[0m")?,
                Level::Trace => write!(buf,"\x1b[035mTrace\x1b[0m")?,
            };
            writeln!(buf,": {}",record.args())
        })
    .init();
}
