use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jmmc::ast::{AstPrinter, Program};
use jmmc::Config;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "jmmc")]
#[command(about = "Java-- compiler backend: attributed tree to IR and Jasmin")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON attributed tree to a .j file
    Compile {
        /// Input tree (JSON)
        #[arg(value_name = "TREE")]
        input: PathBuf,

        /// Output directory for generated files
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Fold integer constants before lowering
        #[arg(long)]
        optimize: bool,

        /// Also write the IR next to the Jasmin output
        #[arg(long)]
        emit_ir: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the IR of a tree
    Ir {
        #[arg(value_name = "TREE")]
        input: PathBuf,

        #[arg(long)]
        optimize: bool,
    },

    /// Print the Jasmin text of a tree
    Jasmin {
        #[arg(value_name = "TREE")]
        input: PathBuf,

        #[arg(long)]
        optimize: bool,
    },

    /// Print an outline of a tree
    Tree {
        #[arg(value_name = "TREE")]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Compile { verbose: true, .. });
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match &cli.command {
        Commands::Compile {
            input,
            output,
            optimize,
            emit_ir,
            verbose,
        } => {
            let config = Config::default()
                .with_optimize(*optimize)
                .with_emit_ir(*emit_ir);
            let output_dir = output.clone().unwrap_or_else(|| PathBuf::from("."));
            let written = jmmc::compile_file(input, &output_dir, &config)
                .with_context(|| format!("failed to compile {}", input.display()))?;
            if *verbose {
                for path in written {
                    println!("wrote {}", path.display());
                }
            }
        }
        Commands::Ir { input, optimize } => {
            let program = load(input)?;
            let compilation = jmmc::compile(&program, &Config::default().with_optimize(*optimize))?;
            print!("{}", compilation.ir_text);
        }
        Commands::Jasmin { input, optimize } => {
            let program = load(input)?;
            let compilation = jmmc::compile(&program, &Config::default().with_optimize(*optimize))?;
            print!("{}", compilation.jasmin);
        }
        Commands::Tree { input } => {
            let program = load(input)?;
            print!("{}", AstPrinter::new().print(&program));
        }
    }

    Ok(())
}

fn load(input: &Path) -> Result<Program> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let program = Program::from_json(&source)
        .with_context(|| format!("{} is not a valid attributed tree", input.display()))?;
    Ok(program)
}
