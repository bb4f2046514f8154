use clap::{Parser as ClapParser, Subcommand};
use iql_lang::cli::{self, CheckOptions, CheckResult, CliError, OutputFormat};
use iql_lang::parser::DEFAULT_MAX_DEPTH;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::Level;

#[derive(ClapParser)]
#[command(name = "iql")]
#[command(about = "IQL - compile SQL-like queries over a typed object model")]
#[command(version)]
struct Cli {
    /// Log compiler stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an IQL query and print its canonical form
    Check {
        /// The IQL query (reads from stdin if not provided)
        query: Option<String>,

        /// Metadata model as a JSON file
        #[arg(short, long)]
        model: PathBuf,

        /// Package the classes live in (defaults to the model's package)
        #[arg(short, long, default_value = "")]
        namespace: String,

        /// Print a JSON summary instead of text
        #[arg(long, conflicts_with = "iql")]
        json: bool,

        /// Print re-parseable IQL with quoted constants
        #[arg(long)]
        iql: bool,

        /// Deepest allowed nesting of parentheses and subqueries
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'iql docs' to list categories)
        category: String,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check {
            query,
            model,
            namespace,
            json,
            iql,
            max_depth,
        } => {
            let format = if json {
                OutputFormat::Json
            } else if iql {
                OutputFormat::Iql
            } else {
                OutputFormat::Canonical
            };
            run_check(query, model, namespace, format, max_depth)
        }
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(
    query: Option<String>,
    model: PathBuf,
    namespace: String,
    format: OutputFormat,
    max_depth: usize,
) -> Result<(), CliError> {
    let query = match query {
        Some(s) => s,
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        None => return Err(CliError::NoInput),
    };

    let options = CheckOptions {
        query,
        namespace,
        model_json: fs::read_to_string(&model)?,
        format,
        max_depth,
    };

    match cli::execute_check(&options)? {
        CheckResult::Text(text) => println!("{}", text),
        CheckResult::Json(summary) => println!("{:#}", summary),
    }
    Ok(())
}
