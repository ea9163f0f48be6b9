use adaptive_expressions::{
    Error, Expression, ExpressionConfig, ExpressionResult, SimpleObjectMemory, TriggerTree, Value,
};
use clap::{command, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, default_value = "expression.json", global = true)]
    config: PathBuf,

    /// Enable debug mode
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression and print the result as JSON
    Eval {
        expression: String,

        #[command(flatten)]
        memory: MemoryArgs,
    },

    /// List the memory paths an expression reads
    Refs { expression: String },

    /// Print the bound form of an expression
    Format { expression: String },

    /// Print the most specific triggers that fire for a memory
    Match {
        /// Trigger expressions; each is reported by its position
        #[arg(short, long, required = true)]
        trigger: Vec<String>,

        #[command(flatten)]
        memory: MemoryArgs,

        /// Also print the trigger tree
        #[arg(long)]
        tree: bool,
    },
}

#[derive(clap::Args)]
struct MemoryArgs {
    /// Memory read from a JSON file
    #[arg(short, long, conflicts_with = "data")]
    memory: Option<PathBuf>,

    /// Memory as inline JSON
    #[arg(long)]
    data: Option<String>,
}

impl MemoryArgs {
    fn load(&self) -> ExpressionResult<SimpleObjectMemory> {
        let text = match (&self.memory, &self.data) {
            (Some(path), _) => std::fs::read_to_string(path)
                .map_err(|e| Error::internal(format!("Failed to read memory file: {}", e)))?,
            (None, Some(json)) => json.clone(),
            (None, None) => "{}".to_string(),
        };
        let root = Value::from_json_str(&text)
            .map_err(|e| Error::internal(format!("Failed to parse memory: {}", e)))?;
        Ok(SimpleObjectMemory::new(root))
    }
}

fn load_config(cli: &Cli) -> ExpressionResult<ExpressionConfig> {
    if cli.config.exists() {
        Ok(ExpressionConfig::from_file(&cli.config)?)
    } else {
        Ok(ExpressionConfig::default())
    }
}

fn run(cli: &Cli) -> ExpressionResult<()> {
    let config = load_config(cli)?;
    info!("config loaded.");
    debug!("config: {:?}", config);
    let options = config.to_options();

    match &cli.command {
        Commands::Eval { expression, memory } => {
            let expression = Expression::parse(expression)?;
            let mut memory = memory.load()?;
            let value = expression.try_evaluate(&mut memory, &options)?;
            println!("{}", value.to_json());
        }
        Commands::Refs { expression } => {
            for path in Expression::parse(expression)?.references() {
                println!("{}", path);
            }
        }
        Commands::Format { expression } => {
            println!("{}", Expression::parse(expression)?);
        }
        Commands::Match {
            trigger,
            memory,
            tree,
        } => {
            let mut triggers = TriggerTree::new();
            for (position, text) in trigger.iter().enumerate() {
                triggers.add_trigger_text(text, position, &[])?;
            }
            debug!("{}", triggers);
            if *tree {
                print!("{}", triggers.tree_to_string(0));
            }
            let mut memory = memory.load()?;
            for matched in triggers.matches_with_options(&mut memory, &options) {
                println!("{}: {}", matched.action(), matched.original_expression());
            }
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
