use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use zf_model::Model;
use zf_sim::{SimError, SimProgress, Simulation};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Project(#[from] zf_project::ProjectError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "zf-cli")]
#[command(
    about = "zoneflow CLI - transient zone and hydronic network simulation",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Wire the model graph and list models, states and published quantities
    Describe {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Run a simulation and write the requested outputs as TSV
    Run {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Override the time step in seconds
        #[arg(long)]
        dt: Option<f64>,
        /// Override the end time in seconds
        #[arg(long)]
        t_end: Option<f64>,
        /// Output TSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Do not draw the progress bar
        #[arg(long)]
        quiet: bool,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Describe { project_path } => cmd_describe(&project_path),
        Commands::Run {
            project_path,
            dt,
            t_end,
            output,
            quiet,
        } => cmd_run(&project_path, dt, t_end, output.as_deref(), quiet),
    }
}

fn cmd_validate(project_path: &Path) -> CliResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = zf_project::load(project_path)?;
    zf_project::validate_project(&project).map_err(zf_project::ProjectError::from)?;
    // wiring catches unresolved references the schema cannot see
    zf_sim::build_model_graph(&project)?;
    println!("✓ Project is valid");
    Ok(())
}

fn cmd_describe(project_path: &Path) -> CliResult<()> {
    let project = zf_project::load(project_path)?;
    let built = zf_sim::build_model_graph(&project)?;
    let graph = &built.graph;

    println!("Project: {}", project.name);
    println!("  Models: {}", graph.len());
    println!("  States: {}", graph.n_states());

    println!("\nModels:");
    let mut descriptions = Vec::new();
    for info in graph.infos() {
        println!("  [{}] {} {:?}", info.index, info.display_name, info.kind);
        let Some(model) = graph.model(info.index) else {
            continue;
        };
        descriptions.clear();
        model.result_descriptions(&mut descriptions);
        for d in &descriptions {
            let size = if d.size == 1 { String::new() } else { format!("[{}]", d.size) };
            println!("      {}{} [{}]  {}", d.name, size, d.unit, d.description);
        }
    }

    println!("\nEvaluation order:");
    for &i in graph.evaluation_order() {
        if let Some(model) = graph.model(i) {
            println!("  {}", model.display_name());
        }
    }

    println!("\nState blocks:");
    for block in graph.state_blocks() {
        let name = graph.model(block.state_model).map(|m| m.display_name()).unwrap_or_default();
        println!("  {:>6} .. {:<6} {}", block.offset, block.offset + block.len, name);
    }
    Ok(())
}

fn cmd_run(
    project_path: &Path,
    dt: Option<f64>,
    t_end: Option<f64>,
    output: Option<&Path>,
    quiet: bool,
) -> CliResult<()> {
    let mut project = zf_project::load(project_path)?;
    if let Some(dt) = dt {
        project.integrator.dt_s = dt;
    }
    if let Some(t_end) = t_end {
        project.integrator.t_end_s = t_end;
    }

    let mut sim = Simulation::from_project(&project)?;
    eprintln!(
        "Running {}: dt = {:.3} s, t_end = {:.3} s, {} states",
        project.name,
        project.integrator.dt_s,
        project.integrator.t_end_s,
        sim.graph().n_states()
    );

    let started = Instant::now();
    let record = if quiet {
        sim.run()?
    } else {
        let mut last_emit = Instant::now();
        let mut last_fraction = -1.0f64;
        let record = sim.run_with_progress(Some(&mut |p: SimProgress| {
            let emit_now = (p.fraction_complete - last_fraction).abs() >= 0.005
                || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_progress(&p, started.elapsed().as_secs_f64());
                last_fraction = p.fraction_complete;
                last_emit = Instant::now();
            }
        }))?;
        clear_progress_line();
        record
    };

    eprintln!(
        "✓ Simulation completed in {:.3}s: {} steps, {} cutback retries, {} samples",
        started.elapsed().as_secs_f64(),
        record.steps,
        record.cutback_retries,
        record.t.len()
    );

    let Some(handler) = sim.output() else {
        return Ok(());
    };
    match output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            handler.write_tsv(&mut out)?;
            out.flush()?;
            eprintln!("✓ Wrote {} columns to {}", handler.columns().len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            handler.write_tsv(&mut out)?;
        }
    }
    Ok(())
}

fn clear_progress_line() {
    eprint!("\r{}\r", " ".repeat(120));
    let _ = io::stderr().flush();
}

fn render_progress(p: &SimProgress, elapsed_s: f64) {
    let width = 28usize;
    let filled = ((p.fraction_complete * width as f64).round() as usize).min(width);
    eprint!(
        "\r[{}{}] {:>6.2}%  t={:.1}/{:.1}s  step={}  cutbacks={}  elapsed={:.1}s",
        "#".repeat(filled),
        "-".repeat(width.saturating_sub(filled)),
        p.fraction_complete * 100.0,
        p.sim_time,
        p.t_end,
        p.step,
        p.cutback_retries,
        elapsed_s
    );
    let _ = io::stderr().flush();
}
