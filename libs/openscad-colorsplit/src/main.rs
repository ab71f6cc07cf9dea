//! colorsplit - split an annotated OpenSCAD model into colored OBJ files
//!
//! Usage:
//!   colorsplit model.scad                    Render every color of every group
//!   colorsplit model.scad -s label=v2        Override an extern property
//!   colorsplit model.scad --json             Print the run summary as JSON

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use config::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use openscad_colorsplit::{
    load_palette, parse_assignment, OpenScadRenderer, Pipeline, PipelineError, RunSummary,
    Settings, SettingsLayer,
};

#[derive(Parser, Debug)]
#[command(name = "colorsplit", version, about = "Split annotated OpenSCAD sources into per-color OBJ models")]
struct Cli {
    /// Annotated OpenSCAD source
    input: PathBuf,

    /// Directory for intermediate and output files [default: ColorHelper_{input}]
    #[arg(short, long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Pattern for merged OBJ files [default: {input}_{group}.obj]
    #[arg(short, long = "merge-output")]
    merge_output: Option<String>,

    /// Material library file [default: {input}.mtl in the output directory]
    #[arg(long = "mtl-output", visible_alias = "mtl")]
    mtl_output: Option<PathBuf>,

    /// Pattern for source variants
    #[arg(long)]
    scad_pattern: Option<String>,

    /// Pattern for rendered meshes
    #[arg(long)]
    stl_pattern: Option<String>,

    /// Pattern for per-color OBJ files
    #[arg(long)]
    obj_pattern: Option<String>,

    /// Pattern for material names [default: {color}]
    #[arg(long)]
    material_pattern: Option<String>,

    /// OpenSCAD executable
    #[arg(long = "exe")]
    executable: Option<PathBuf>,

    /// Palette file [default: built-in CSS colors]
    #[arg(long = "color-map", visible_alias = "colors")]
    color_map: Option<PathBuf>,

    /// Override an extern property (repeatable, first value wins)
    #[arg(short = 's', long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    properties: Vec<(String, String)>,

    /// Parallel renders [default: available cores]
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Seconds before a render is killed, 0 waits forever [default: 600]
    #[arg(long = "timeout")]
    timeout_secs: Option<u64>,

    /// Also comment out color statements owned by other groups
    #[arg(long)]
    exclude_foreign_groups: bool,

    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log debug details
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn layer(&self) -> SettingsLayer {
        SettingsLayer {
            output_dir: self.output_dir.clone(),
            merge_output: self.merge_output.clone(),
            mtl_output: self.mtl_output.clone(),
            scad_pattern: self.scad_pattern.clone(),
            stl_pattern: self.stl_pattern.clone(),
            obj_pattern: self.obj_pattern.clone(),
            material_pattern: self.material_pattern.clone(),
            executable: self.executable.clone(),
            color_map: self.color_map.clone(),
            jobs: self.jobs,
            timeout_secs: self.timeout_secs,
            exclude_foreign_groups: self.exclude_foreign_groups.then_some(true),
            properties: self.properties.clone(),
        }
    }

    fn default_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::WARN
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(cli.default_level().into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(summary) => {
            if summary.failed_units() > 0 {
                tracing::warn!(
                    failed = summary.failed_units(),
                    total = summary.units().count(),
                    "some units did not render"
                );
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(err) => {
            let code = err
                .downcast_ref::<PipelineError>()
                .map_or(EXIT_FAILURE, PipelineError::exit_code);
            tracing::error!("{err:#}");
            ExitCode::from(code)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    let mut layers = vec![cli.layer()];
    if let Some(path) = &cli.config {
        layers.push(SettingsLayer::load(path)?);
    }
    let settings = Settings::resolve(&cli.input, &layers)?;

    let palette = load_palette(settings.color_map.as_deref())?;
    let renderer = OpenScadRenderer::new(&settings.executable, settings.timeout);
    tracing::debug!(
        executable = %renderer.executable().display(),
        jobs = settings.jobs.get(),
        output = %settings.output_dir.display(),
        "starting"
    );

    let summary = Pipeline::new(&settings, &palette, &renderer).run()?;

    if cli.json {
        let text =
            serde_json::to_string_pretty(&summary).context("failed to serialize run summary")?;
        println!("{text}");
    }
    Ok(summary)
}
