mod logging;

use clap::{Parser, Subcommand};
use lpformat_dense::LpProblem;
use lpformat_lang::{LoadError, Model, VarKind};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lpformat")]
#[command(about = "Parse LPSolve-style LP files into solver-agnostic models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Give undeclared variables a lower bound of -infinity instead of 0
    #[arg(long, global = true)]
    free_by_default: bool,
    /// Keep single-variable constraints as rows instead of bounds
    #[arg(long, global = true)]
    no_bounds: bool,
    /// Log parser activity to stderr (overridden by LPFORMAT_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an .lp file and output the model
    Parse {
        /// The file to parse ("-" reads stdin)
        file: PathBuf,
        /// Output format (pretty, json, lp)
        #[arg(short, long, default_value = "pretty")]
        format: String,
    },
    /// Check an .lp file for errors
    Check {
        /// The file to check ("-" reads stdin)
        file: PathBuf,
    },
    /// Output the dense coefficient matrix of a model
    Dense {
        /// The file to convert ("-" reads stdin)
        file: PathBuf,
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },
}

fn load(cli: &Cli, file: &PathBuf) -> Result<Model, LoadError> {
    let mut parser = lpformat_lang::Parser::new().with_bound_tightening(!cli.no_bounds);
    if cli.free_by_default {
        parser = parser.with_default_lower_bound(f64::NEG_INFINITY);
    }
    if file.as_os_str() == "-" {
        parser.parse_reader(std::io::stdin().lock())
    } else {
        parser.parse_file(file)
    }
}

fn load_or_exit(cli: &Cli, file: &PathBuf) -> Model {
    match load(cli, file) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("Error: {}", e))
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    match &cli.command {
        Commands::Parse { file, format } => {
            let model = load_or_exit(&cli, file);
            match format.as_str() {
                "json" => println!("{}", to_json(&model)),
                "lp" => print!("{}", model),
                _ => println!("{:#?}", model),
            }
        }
        Commands::Check { file } => match load(&cli, file) {
            Ok(model) => {
                let count = |kind: VarKind| model.variables.iter().filter(|v| v.kind == kind).count();

                println!("✓ {} is valid", file.display());
                println!("  {}imize objective", model.objective.direction);
                println!("  {} variables", model.num_variables());
                println!("    {} integer", count(VarKind::Integer));
                println!("    {} binary", count(VarKind::Binary));
                println!("    {} free", count(VarKind::Free));
                println!("  {} constraints", model.num_constraints());
            }
            Err(e) => {
                eprintln!("✗ {} has errors:", file.display());
                eprintln!("  {}", e);
                std::process::exit(1);
            }
        },
        Commands::Dense { file, format } => {
            let model = load_or_exit(&cli, file);
            let problem = match LpProblem::from_model(&model) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            if format == "json" {
                println!("{}", to_json(&problem));
            } else {
                print!("{}", problem);
            }
        }
    }
}
