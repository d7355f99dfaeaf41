//! Prediction pipeline entry point — CLI wiring and job dispatch.

use std::net::SocketAddr;
use std::path::Path;
use std::process;
use std::sync::Arc;

use energy_forecast::api::{self, AppState};
use energy_forecast::config::PipelineConfig;
use energy_forecast::datagen;
use energy_forecast::io::dataset;
use energy_forecast::model::{LoadedModel, train_from_records};

/// Pipeline job selected on the command line.
enum Command {
    Generate,
    Train,
    Serve,
}

/// Parsed CLI arguments.
struct CliArgs {
    command: Command,
    config_path: Option<String>,
    days_override: Option<usize>,
    seed_override: Option<u64>,
    data_override: Option<String>,
    model_override: Option<String>,
    port_override: Option<u16>,
}

fn print_help() {
    eprintln!("energy-forecast — facility energy consumption prediction pipeline");
    eprintln!();
    eprintln!("Usage: energy-forecast <COMMAND> [OPTIONS]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  generate                 Write the synthetic training dataset CSV");
    eprintln!("  train                    Fit the regression model and persist the artifact");
    eprintln!("  serve                    Serve predictions over HTTP");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load pipeline config from a TOML file");
    eprintln!("  --days <n>               Override generator day count");
    eprintln!("  --seed <u64>             Override generator/trainer random seed");
    eprintln!("  --data <path>            Override dataset CSV path");
    eprintln!("  --model <path>           Override model artifact path");
    eprintln!("  --port <u16>             Override API server port (default: 8000)");
    eprintln!("  --help                   Show this help message");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();

    let command = match args.get(1).map(String::as_str) {
        Some("generate") => Command::Generate,
        Some("train") => Command::Train,
        Some("serve") => Command::Serve,
        Some("--help") | Some("-h") => {
            print_help();
            process::exit(0);
        }
        Some(other) => {
            eprintln!("error: unknown command \"{other}\"");
            print_help();
            process::exit(1);
        }
        None => {
            print_help();
            process::exit(1);
        }
    };

    let mut cli = CliArgs {
        command,
        config_path: None,
        days_override: None,
        seed_override: None,
        data_override: None,
        model_override: None,
        port_override: None,
    };

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --config requires a path argument");
                    process::exit(1);
                }
                cli.config_path = Some(args[i].clone());
            }
            "--days" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --days requires a number argument");
                    process::exit(1);
                }
                if let Ok(d) = args[i].parse::<usize>() {
                    cli.days_override = Some(d);
                } else {
                    eprintln!("error: --days value \"{}\" is not a valid count", args[i]);
                    process::exit(1);
                }
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--data" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --data requires a path argument");
                    process::exit(1);
                }
                cli.data_override = Some(args[i].clone());
            }
            "--model" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --model requires a path argument");
                    process::exit(1);
                }
                cli.model_override = Some(args[i].clone());
            }
            "--port" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --port requires a u16 argument");
                    process::exit(1);
                }
                if let Ok(p) = args[i].parse::<u16>() {
                    cli.port_override = Some(p);
                } else {
                    eprintln!("error: --port value \"{}\" is not a valid u16", args[i]);
                    process::exit(1);
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    // Load config: --config takes priority, then the built-in baseline.
    let mut config = if let Some(ref path) = cli.config_path {
        match PipelineConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        PipelineConfig::baseline()
    };

    // Apply CLI overrides.
    if let Some(days) = cli.days_override {
        config.generator.days = days;
    }
    if let Some(seed) = cli.seed_override {
        config.generator.seed = seed;
        config.trainer.seed = seed;
    }
    if let Some(ref data) = cli.data_override {
        config.generator.output = data.clone();
        config.trainer.input = data.clone();
    }
    if let Some(ref model) = cli.model_override {
        config.trainer.output = model.clone();
        config.server.model = model.clone();
    }
    if let Some(port) = cli.port_override {
        config.server.port = port;
    }

    // Validate
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    match cli.command {
        Command::Generate => run_generate(&config),
        Command::Train => run_train(&config),
        Command::Serve => run_serve(&config),
    }
}

/// Writes the synthetic dataset CSV.
fn run_generate(config: &PipelineConfig) {
    let g = &config.generator;
    println!(
        "Generating synthetic energy data ({} days, seed {})...",
        g.days, g.seed
    );
    let records = datagen::generate(g.days, g.seed);
    if let Err(e) = dataset::write_dataset(&records, Path::new(&g.output)) {
        eprintln!("{e}");
        process::exit(1);
    }
    println!("Wrote {} records to {}", records.len(), g.output);
}

/// Fits the model, reports held-out error, and persists the artifact.
fn run_train(config: &PipelineConfig) {
    let t = &config.trainer;
    println!("Loading dataset from {}...", t.input);
    let records = match dataset::read_dataset(Path::new(&t.input)) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Run `energy-forecast generate` first to create the dataset.");
            process::exit(1);
        }
    };

    println!(
        "Training random forest ({} trees, target: {}) on {} records...",
        t.n_trees,
        t.target,
        records.len()
    );
    let artifact = match train_from_records(&records, t) {
        Ok(artifact) => artifact,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    println!("Mean Absolute Error: {:.2} kWh", artifact.test_mae);

    if let Err(e) = artifact.save(Path::new(&t.output)) {
        eprintln!("{e}");
        process::exit(1);
    }
    println!("Model saved to {}", t.output);
}

/// Loads the model artifact (degraded mode if unavailable) and serves the API.
fn run_serve(config: &PipelineConfig) {
    let s = &config.server;
    let model = match LoadedModel::load(Path::new(&s.model)) {
        Ok(model) => {
            println!(
                "Loaded model from {} (target: {}, test MAE {:.2} kWh)",
                s.model,
                model.target(),
                model.test_mae()
            );
            Some(model)
        }
        Err(e) => {
            eprintln!("warning: {e}");
            eprintln!(
                "Serving in degraded mode; prediction endpoints will answer 503 \
                 until a model is trained and the server restarted."
            );
            None
        }
    };

    let state = Arc::new(AppState {
        model,
        validation: s.validation_mode(),
    });
    let addr = SocketAddr::from(([0, 0, 0, 0], s.port));
    let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("error: failed to create tokio runtime: {e}");
        process::exit(1);
    });
    rt.block_on(api::serve(state, addr));
}
