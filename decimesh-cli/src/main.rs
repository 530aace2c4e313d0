//! decimesh CLI - triangle mesh decimation from the command line.
//!
//! Usage: decimesh --input <INPUT> --output <OUTPUT> --method <qem|asem|rem>
//!        (--ratio <RATIO> | --target <TARGET>)
//!
//! Run `decimesh --help` for all options.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{CommandFactory, Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use decimesh_core::{Drawable, ProgressListener, TriangleMesh};
use decimesh_io::{read_mesh_with_progress, write_mesh_with_progress};
use decimesh_simplification::{
    DecimateOptions, Decimator, JoinPosition, Method, Target, TopologyMesh,
};

#[derive(Parser, Debug)]
#[command(name = "decimesh")]
#[command(
    author,
    version,
    about = "Triangle mesh decimation by vertex-pair contraction",
    long_about = None
)]
struct Cli {
    /// Input mesh file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output mesh file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Decimation method
    #[arg(short, long, value_enum)]
    method: Option<MethodArg>,

    /// Fraction of triangles to remove, in (0.0, 1.0]
    #[arg(short, long, conflicts_with = "target")]
    ratio: Option<f64>,

    /// Target number of triangles
    #[arg(short, long)]
    target: Option<usize>,

    /// Placement of the surviving vertex for the angle-sum method
    #[arg(long, value_enum, default_value = "target")]
    join_position: JoinPositionArg,

    /// Seed for the random method
    #[arg(long)]
    seed: Option<u64>,

    /// Remove triangles with area at or below this value after decimating
    #[arg(long)]
    cleanup_epsilon: Option<f64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum MethodArg {
    /// Quadric error metric
    Qem,
    /// Angle sum flatness
    Asem,
    /// Random vertex pairs
    Rem,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Qem => Method::Qem,
            MethodArg::Asem => Method::AngleSum,
            MethodArg::Rem => Method::Random,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum JoinPositionArg {
    /// Keep the removed vertex position
    Source,
    /// Keep the surviving vertex position
    Target,
    /// Move to the midpoint
    Midpoint,
}

impl From<JoinPositionArg> for JoinPosition {
    fn from(arg: JoinPositionArg) -> Self {
        match arg {
            JoinPositionArg::Source => JoinPosition::Source,
            JoinPositionArg::Target => JoinPosition::Target,
            JoinPositionArg::Midpoint => JoinPosition::Midpoint,
        }
    }
}

/// Prints `<caption> <percent>%` whenever the whole percentage changes.
struct ConsoleProgress<W: Write> {
    caption: &'static str,
    percent: usize,
    out: W,
}

impl ConsoleProgress<std::io::Stdout> {
    fn stdout(caption: &'static str) -> Self {
        Self::new(caption, std::io::stdout())
    }
}

impl<W: Write> ConsoleProgress<W> {
    fn new(caption: &'static str, out: W) -> Self {
        Self {
            caption,
            percent: 0,
            out,
        }
    }
}

impl<W: Write> ProgressListener for ConsoleProgress<W> {
    fn on_start(&mut self, _stage: &str) {
        let _ = writeln!(self.out, "{} Started", self.caption);
    }

    fn on_step(&mut self, current: usize, total: usize) {
        if total == 0 {
            return;
        }
        let percent = current * 100 / total;
        if percent != self.percent {
            self.percent = percent;
            let _ = writeln!(self.out, "{} {}%", self.caption, percent);
        }
    }

    fn on_complete(&mut self, _stage: &str) {
        let _ = writeln!(self.out, "{} Completed", self.caption);
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return;
        }
    };

    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Decimation options from the flags, `None` when a required flag is missing.
fn options_from_cli(cli: &Cli) -> Option<DecimateOptions> {
    let method = cli.method?;
    let target = match (cli.ratio, cli.target) {
        (Some(ratio), _) => Target::Ratio(ratio),
        (None, Some(count)) => Target::Triangles(count),
        (None, None) => return None,
    };
    let mut options = DecimateOptions {
        target,
        ..Default::default()
    }
    .method(method.into())
    .join_position(cli.join_position.into());
    if let Some(seed) = cli.seed {
        options = options.seed(seed);
    }
    if let Some(epsilon) = cli.cleanup_epsilon {
        options = options.with_degenerate_epsilon(epsilon);
    }
    Some(options)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let (Some(input), Some(output), Some(options)) =
        (cli.input.as_deref(), cli.output.as_deref(), options_from_cli(&cli))
    else {
        println!("Not all required arguments specified.");
        println!("{}", Cli::command().render_usage());
        return Ok(());
    };

    if cli.verbose {
        println!(
            "Converting '{}' to '{}' using '{}' method",
            input.display(),
            output.display(),
            options.method
        );
    }

    let start = Instant::now();
    let mesh = read_mesh_with_progress(input, &mut ConsoleProgress::stdout("Reading"))
        .with_context(|| format!("failed to read {}", input.display()))?;
    if cli.verbose {
        print_summary("Input", &mesh)?;
    }

    let decimation = Decimator::new(options).run(&mesh, ConsoleProgress::stdout("Remeshing"))?;
    if cli.verbose {
        println!("Output: {}", decimation.stats.dump());
        if decimation.degenerate_removed > 0 {
            println!("Degenerate triangles removed: {}", decimation.degenerate_removed);
        }
    }

    write_output(&decimation.mesh, output)?;

    info!(
        original = decimation.report.original_triangles,
        remaining = decimation.mesh.face_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Decimation finished"
    );
    Ok(())
}

fn print_summary(label: &str, mesh: &TriangleMesh) -> anyhow::Result<()> {
    let stats = TopologyMesh::<()>::load(mesh)?.stats();
    println!("{}: {}", label, stats.dump());
    let (min, max) = mesh.bounding_box();
    println!(
        "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
        min.x, min.y, min.z, max.x, max.y, max.z
    );
    Ok(())
}

fn write_output(mesh: &TriangleMesh, output: &Path) -> anyhow::Result<()> {
    write_mesh_with_progress(mesh, output, &mut ConsoleProgress::stdout("Writing"))
        .with_context(|| format!("failed to write {}", output.display()))
}
