use clap::{Parser, Subcommand};
use d2d_common::model::core::RoutingProblem;
use d2d_common::util::config::GeneratorConfig;
use d2d_common::util::{logger, visualization};
use d2d_common::{eval, formats, synth};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "FILE", default_value = "testcase.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the three testcase input files into a folder
    Generate { folder: String },
    /// Render a testcase and its routing result to a PNG
    Draw {
        gmp: String,
        gcl: String,
        cst: String,
        lg: String,
        #[arg(long)]
        output: Option<String>,
    },
    /// Score a routing result against its testcase
    Evaluate {
        gmp: String,
        gcl: String,
        cst: String,
        lg: String,
    },
}

fn main() -> anyhow::Result<()> {
    logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Generate { folder } => generate(&args.config, &folder),
        Commands::Draw {
            gmp,
            gcl,
            cst,
            lg,
            output,
        } => draw(&gmp, &gcl, &cst, &lg, output),
        Commands::Evaluate { gmp, gcl, cst, lg } => evaluate(&gmp, &gcl, &cst, &lg),
    }
}

fn load_config(path: &Path) -> anyhow::Result<GeneratorConfig> {
    if path.exists() {
        log::info!("Loading configuration from {:?}", path);
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;
        toml::from_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))
    } else {
        log::warn!(
            "Configuration file {:?} not found. Using internal defaults.",
            path
        );
        Ok(GeneratorConfig::default())
    }
}

fn generate(config_path: &Path, folder: &str) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    std::fs::create_dir_all(folder)?;

    let problem = synth::synthesize(&config).map_err(|e| anyhow::anyhow!(e))?;

    let dir = Path::new(folder);
    let stem = dir
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("testcase");

    let gmp = dir.join(format!("{}.gmp", stem));
    let gcl = dir.join(format!("{}.gcl", stem));
    let cst = dir.join(format!("{}.cst", stem));

    formats::placement::write(&problem, &gmp.display().to_string())?;
    formats::capacity::write(&problem, &gcl.display().to_string())?;
    formats::cost::write(&problem, &cst.display().to_string())?;

    log::info!("Testcase generated in {}", folder);
    Ok(())
}

fn draw(gmp: &str, gcl: &str, cst: &str, lg: &str, output: Option<String>) -> anyhow::Result<()> {
    let problem = RoutingProblem::load(gmp, gcl, cst, Some(lg))?;

    let output = output.unwrap_or_else(|| {
        let stem = Path::new(gmp)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("testcase");
        format!("{}_placement.png", stem)
    });

    // Keep the image aspect equal to the routing area's.
    let width: u32 = 1500;
    let height =
        ((width as f64 * problem.area.height() as f64 / problem.area.width() as f64) as u32).max(1);

    log::info!("Rendering to {}", output);
    visualization::draw_problem(&problem, &output, width, height);
    Ok(())
}

fn evaluate(gmp: &str, gcl: &str, cst: &str, lg: &str) -> anyhow::Result<()> {
    let problem = RoutingProblem::load(gmp, gcl, cst, None)?;
    let traces = formats::route::parse(lg)?;
    let report = eval::evaluate(&problem, &traces);

    println!(
        "{:>6} {:>10} {:>9} {:>14} {:>6} {:>14}",
        "Net", "WL", "Overflow", "CellCost", "Vias", "TotalCost"
    );
    for (id, score) in &report.nets {
        println!(
            "{:>6} {:>10} {:>9} {:>14.2} {:>6} {:>14.2}",
            id.0,
            score.wirelength,
            score.overflow,
            score.cell_cost,
            score.via_count,
            score.total_cost
        );
    }
    let total = report.total;
    println!(
        "{:>6} {:>10} {:>9} {:>14.2} {:>6} {:>14.2}",
        "Total", total.wirelength, total.overflow, total.cell_cost, total.via_count, total.total_cost
    );

    for violation in &report.violations {
        log::error!("{}", violation);
    }
    if report.violations.is_empty() {
        log::info!("\x1b[32mPASS\x1b[0m: routing result is well formed.");
    } else {
        log::error!(
            "\x1b[31mFAIL\x1b[0m: {} violations found.",
            report.violations.len()
        );
    }
    Ok(())
}
