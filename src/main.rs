use clap::{Parser, Subcommand};
use colored::*;
use ndxform::core::config::{EngineConfig, CONFIG_FILE};
use ndxform::core::dtype::DataType;
use ndxform::core::tensor::Shape;
use ndxform::core::value::ExtraArg;
use ndxform::engine::Workspace;
use ndxform::graph::SymbolicGraph;
use ndxform::ops::{registry, Construction, GraphProvider, OpKind, Resolution, TransformSameOp};
use serde::Serialize;
use std::fs;
use toon_format::encode_default;

#[derive(Parser)]
#[command(name = "ndxform")]
#[command(version = "0.1")]
#[command(about = "Same-dtype elementwise transforms over typed buffers", long_about = None)]
struct Cli {
    /// Output format: 'display' (default, human-readable) or 'toon' (machine-readable)
    #[arg(long, global = true, default_value = "display")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered transforms
    List,
    /// Apply a transform eagerly to a buffer
    Apply {
        /// Op name or alias (e.g. abs, neg, clip_by_value)
        op: String,
        /// Element type; defaults to [execution] default_dtype
        #[arg(long)]
        dtype: Option<DataType>,
        #[arg(long, value_delimiter = ',', default_value = "8")]
        shape: Vec<usize>,
        /// Input values; defaults to a ramp centred on zero
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        values: Option<Vec<f64>>,
        /// Only transform the first N elements
        #[arg(long)]
        count: Option<usize>,
        /// Overwrite the input instead of writing a new buffer
        #[arg(long)]
        in_place: bool,
        /// Extra scalar arguments (clip_by_value takes min,max)
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        args: Vec<f64>,
    },
    /// Resolve the output type and shape of a graph node without running it
    Resolve {
        op: String,
        #[arg(long)]
        dtype: Option<DataType>,
        #[arg(long, value_delimiter = ',')]
        shape: Vec<usize>,
        /// Explicit output shape
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        output_shape: Option<Vec<i64>>,
        #[arg(long)]
        in_place: bool,
    },
    /// Write a default ndxform.toml
    Init,
}

#[derive(Serialize)]
struct OpRow {
    num: i32,
    name: &'static str,
    extra_args: usize,
}

#[derive(Serialize)]
struct ApplyOutput {
    op: String,
    dtype: DataType,
    shape: Vec<usize>,
    count: usize,
    in_place: bool,
    values: Vec<f64>,
}

#[derive(Serialize)]
struct ResolveOutput {
    op: String,
    input_dtype: DataType,
    input_shape: Vec<usize>,
    #[serde(flatten)]
    resolution: Resolution,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let use_toon = cli.format == "toon";
    let config = EngineConfig::load();

    let result = match cli.command {
        Commands::List => handle_list(use_toon),
        Commands::Apply {
            op,
            dtype,
            shape,
            values,
            count,
            in_place,
            args,
        } => handle_apply(
            config,
            use_toon,
            &op,
            dtype,
            shape,
            values,
            count,
            in_place,
            args,
        ),
        Commands::Resolve {
            op,
            dtype,
            shape,
            output_shape,
            in_place,
        } => handle_resolve(&config, use_toon, &op, dtype, shape, output_shape, in_place),
        Commands::Init => handle_init(&config),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red(), e);
        std::process::exit(1);
    }
    Ok(())
}

fn print_output<T: Serialize>(value: &T, use_toon: bool, display: impl FnOnce()) {
    if use_toon {
        let toon =
            encode_default(value).unwrap_or_else(|e| format!("Error encoding TOON: {}", e));
        println!("{}", toon);
    } else {
        display();
    }
}

fn handle_list(use_toon: bool) -> Result<(), Box<dyn std::error::Error>> {
    let rows: Vec<OpRow> = registry()
        .ops()
        .into_iter()
        .map(|op| OpRow {
            num: op.op_num(),
            name: op.name(),
            extra_args: op.extra_arg_count(),
        })
        .collect();

    print_output(&rows, use_toon, || {
        println!("{}", "Same-dtype transforms".bold().blue());
        for row in &rows {
            let args = if row.extra_args > 0 {
                format!(" ({} extra args)", row.extra_args).yellow().to_string()
            } else {
                String::new()
            };
            println!("  {:>3}  {}{}", row.num, row.name.green(), args);
        }
    });
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn handle_apply(
    config: EngineConfig,
    use_toon: bool,
    op_name: &str,
    dtype: Option<DataType>,
    shape: Vec<usize>,
    values: Option<Vec<f64>>,
    count: Option<usize>,
    in_place: bool,
    args: Vec<f64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let op = registry().lookup(op_name)?;
    let dtype = dtype.unwrap_or(config.execution.default_dtype);
    let shape = Shape::new(shape);
    let n = shape.num_elements();
    let values = values.unwrap_or_else(|| (0..n).map(|i| i as f64 - (n / 2) as f64).collect());

    let mut ws = Workspace::with_config(config);
    ws.insert_values("x", dtype, shape.clone(), &values)?;

    let output = if in_place { None } else { Some("y") };
    let extra: Vec<ExtraArg> = args.into_iter().map(ExtraArg::from).collect();
    let dispatched = ws.apply(op, "x", output, count, extra)?;

    let result = ws.get(output.unwrap_or("x"))?;
    let report = ApplyOutput {
        op: op.name().to_string(),
        dtype: result.dtype(),
        shape: result.shape.dims.clone(),
        count: dispatched.count,
        in_place: dispatched.in_place,
        values: result.to_f64_vec(),
    };

    print_output(&report, use_toon, || {
        println!(
            "{} {} {} ({} elements{})",
            report.op.green().bold(),
            report.dtype,
            result.shape,
            report.count,
            if report.in_place { ", in place" } else { "" }
        );
        println!("{:?}", report.values);
    });
    Ok(())
}

fn handle_resolve(
    config: &EngineConfig,
    use_toon: bool,
    op_name: &str,
    dtype: Option<DataType>,
    shape: Vec<usize>,
    output_shape: Option<Vec<i64>>,
    in_place: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let op = registry().lookup(op_name)?;
    let dtype = dtype.unwrap_or(config.execution.default_dtype);

    let mut graph = SymbolicGraph::new();
    let x = graph.var("x", dtype, Shape::new(shape.clone()))?;
    let input = graph.operand(x)?;

    let construction = match &output_shape {
        Some(dims) => Construction::symbolic_with_wide_shape(input, dims, in_place, Vec::new()),
        None => Construction::symbolic(input, in_place),
    };
    let mut transform = TransformSameOp::new(op, construction);
    let resolution = transform
        .resolve_with(config.resolution.shape_policy)?
        .clone();

    let report = ResolveOutput {
        op: op.name().to_string(),
        input_dtype: dtype,
        input_shape: shape,
        resolution,
    };

    print_output(&report, use_toon, || {
        println!(
            "{}: {} {} -> {} {}",
            report.op.green().bold(),
            report.input_dtype,
            Shape::new(report.input_shape.clone()),
            report.resolution.dtype,
            report.resolution.shape
        );
    });
    Ok(())
}

fn handle_init(config: &EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    if std::path::Path::new(CONFIG_FILE).exists() {
        println!(
            "Configuration file already exists: {}",
            CONFIG_FILE.yellow()
        );
        return Ok(());
    }

    fs::write(CONFIG_FILE, config.to_toml_string()?)?;
    println!("Created default configuration: {}", CONFIG_FILE.green());
    Ok(())
}
