use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fleur::{
    AVAILABLE_DATASETS, Alternative, Approach, BarApproach, BarOptions, BarPlotOptions, BarStats,
    BetweenOptions, BetweenPlotOptions, BetweenStats, Correlation, DataFrame, InputData,
    ScatterOptions, ScatterPlotOptions, ScatterStats, load_data,
};
use log::LevelFilter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "fleur",
    version,
    about = "Run the right statistical test for two variables and plot the result"
)]
struct Cli {
    /// Log test selection and rendering details (ignores RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare a numerical variable across the groups of a categorical one.
    Between(BetweenArgs),
    /// Test the association between two categorical variables.
    Bar(BarArgs),
    /// Regress one numerical variable on another.
    Scatter(ScatterArgs),
    /// List or export the bundled datasets.
    #[command(subcommand)]
    Datasets(DatasetsCommand),
}

#[derive(Subcommand, Debug)]
enum DatasetsCommand {
    /// Print the bundled dataset names with their shapes.
    List,
    /// Write a bundled dataset to a CSV file.
    Export { name: String, path: PathBuf },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Column holding the x variable.
    #[arg(short, long)]
    x: String,
    /// Column holding the y variable.
    #[arg(short, long)]
    y: String,
    /// CSV file with a header row.
    #[arg(long, conflicts_with = "dataset", required_unless_present = "dataset")]
    data: Option<PathBuf>,
    /// Bundled dataset name (iris, mtcars).
    #[arg(long)]
    dataset: Option<String>,
    /// Draw the figure to this path (.svg, or a bitmap format such as .png).
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Write the full result as JSON to this path.
    #[arg(long)]
    json: Option<PathBuf>,
    /// JSON file with plot options.
    #[arg(long)]
    options: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct BetweenArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Samples are paired (repeated measures of the same subjects).
    #[arg(long, default_value_t = false)]
    paired: bool,
    /// parametric, nonparametric, or auto (normality check per group).
    #[arg(long, default_value = "parametric")]
    approach: Approach,
}

#[derive(Args, Debug)]
struct BarArgs {
    #[command(flatten)]
    input: InputArgs,
    /// auto, chi-square, or fisher.
    #[arg(long, default_value = "auto")]
    approach: BarApproach,
}

#[derive(Args, Debug)]
struct ScatterArgs {
    #[command(flatten)]
    input: InputArgs,
    /// two-sided, less, or greater.
    #[arg(long, default_value = "two-sided")]
    alternative: Alternative,
    /// pearson, spearman, or kendall.
    #[arg(long, default_value = "pearson")]
    effect_size: Correlation,
    /// Confidence level of the slope interval, in percent.
    #[arg(long, default_value_t = 95.0)]
    ci: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        env_logger::builder().filter_level(LevelFilter::Debug).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }
    match cli.cmd {
        Command::Between(args) => cmd_between(args),
        Command::Bar(args) => cmd_bar(args),
        Command::Scatter(args) => cmd_scatter(args),
        Command::Datasets(cmd) => cmd_datasets(cmd),
    }
}

fn load_input(args: &InputArgs) -> Result<InputData> {
    let frame = match (&args.data, &args.dataset) {
        (Some(path), _) => DataFrame::read_csv(path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, Some(name)) => load_data(name)?,
        (None, None) => anyhow::bail!("one of --data or --dataset is required"),
    };
    Ok(InputData::new(args.x.as_str(), args.y.as_str(), Some(&frame))?)
}

fn read_options<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        None => Ok(T::default()),
        Some(p) => {
            let file = File::open(p).with_context(|| format!("opening {}", p.display()))?;
            serde_json::from_reader(file).with_context(|| format!("parsing {}", p.display()))
        }
    }
}

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    eprintln!("Saved results to {}", path.display());
    Ok(())
}

fn cmd_between(args: BetweenArgs) -> Result<()> {
    let data = load_input(&args.input)?;
    let options = BetweenOptions {
        paired: args.paired,
        approach: args.approach,
        ..Default::default()
    };
    let stats = BetweenStats::new(&data, &options)?;
    print!("{}", stats.summary());

    if let Some(path) = args.input.json.as_deref() {
        write_json(&stats, path)?;
    }
    if let Some(plot_path) = args.input.plot.as_ref() {
        let plot_opts: BetweenPlotOptions = read_options(args.input.options.as_deref())?;
        stats.plot(plot_path, &plot_opts)?;
        eprintln!("Wrote plot to {}", plot_path.display());
    }
    Ok(())
}

fn cmd_bar(args: BarArgs) -> Result<()> {
    let data = load_input(&args.input)?;
    let stats = BarStats::new(
        &data,
        &BarOptions {
            approach: args.approach,
        },
    )?;
    print!("{}", stats.summary());

    if let Some(path) = args.input.json.as_deref() {
        write_json(&stats, path)?;
    }
    if let Some(plot_path) = args.input.plot.as_ref() {
        let plot_opts: BarPlotOptions = read_options(args.input.options.as_deref())?;
        stats.plot(plot_path, &plot_opts)?;
        eprintln!("Wrote plot to {}", plot_path.display());
    }
    Ok(())
}

fn cmd_scatter(args: ScatterArgs) -> Result<()> {
    let data = load_input(&args.input)?;
    let options = ScatterOptions {
        alternative: args.alternative,
        effect_size: args.effect_size,
        ci: args.ci,
    };
    let stats = ScatterStats::new(&data, &options)?;
    print!("{}", stats.summary());

    if let Some(path) = args.input.json.as_deref() {
        write_json(&stats, path)?;
    }
    if let Some(plot_path) = args.input.plot.as_ref() {
        let plot_opts: ScatterPlotOptions = read_options(args.input.options.as_deref())?;
        stats.plot(plot_path, &plot_opts)?;
        eprintln!("Wrote plot to {}", plot_path.display());
    }
    Ok(())
}

fn cmd_datasets(cmd: DatasetsCommand) -> Result<()> {
    match cmd {
        DatasetsCommand::List => {
            for name in AVAILABLE_DATASETS {
                let df = load_data(name)?;
                println!("{name}  rows={} columns={}", df.height(), df.width());
            }
        }
        DatasetsCommand::Export { name, path } => {
            let df = load_data(&name)?;
            df.write_csv(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Saved {} rows to {}", df.height(), path.display());
        }
    }
    Ok(())
}
