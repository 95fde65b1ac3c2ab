use std::fs::File;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{miette, IntoDiagnostic};
use slog::{info, o, Drain, Level, Logger};

use rulex::{
    combine, evaluate_logged, parse_with, to_canonical, to_debug_tree, tokenize, validate,
    Catalog, DataRecord, ParseOptions, DEFAULT_MAX_DEPTH,
};

/// Parse, evaluate and combine attribute rules
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// log evaluation details to stderr
    #[arg(short, long)]
    verbose: bool,

    /// deepest parenthesis nesting accepted
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// print the token stream of a rule
    Tokens { rule: String },
    /// parse a rule and print its canonical form
    Parse {
        rule: String,
        /// print the tagged node tree instead
        #[arg(long)]
        tree: bool,
    },
    /// evaluate a rule against a JSON object of attribute values
    Eval {
        rule: String,
        /// inline JSON object, e.g. '{"age": 30}'
        #[arg(long, conflicts_with = "data_file")]
        data: Option<String>,
        /// file containing a JSON object
        #[arg(long)]
        data_file: Option<PathBuf>,
    },
    /// AND two or more rules together, in order
    Combine {
        #[arg(required = true, num_args = 2..)]
        rules: Vec<String>,
        #[arg(long)]
        tree: bool,
    },
    /// lint a rule and print the report as JSON
    Check {
        rule: String,
        /// allowed attribute name (repeatable)
        #[arg(short, long = "attribute")]
        attributes: Vec<String>,
        /// allow only age, department, salary and experience
        #[arg(long, conflicts_with = "attributes")]
        employee_catalog: bool,
    },
}

fn logger(verbose: bool) -> Logger {
    let level = if verbose { Level::Debug } else { Level::Info };
    let plain = slog_term::PlainSyncDecorator::new(std::io::stderr());
    let drain = slog_term::FullFormat::new(plain).build().fuse();
    Logger::root(drain.filter_level(level).fuse(), o!())
}

fn main() -> miette::Result<()> {
    let args = Args::parse();
    let logger = logger(args.verbose);
    let options = ParseOptions {
        max_depth: args.max_depth,
    };

    match args.command {
        Command::Tokens { rule } => {
            for lexeme in tokenize(&rule)? {
                println!("{:>3}..{:<3} {}", lexeme.span.start, lexeme.span.end, lexeme.token);
            }
        }
        Command::Parse { rule, tree } => {
            let node = parse_with(&rule, options)?;
            if tree {
                println!("{}", to_debug_tree(&node));
            } else {
                println!("{}", to_canonical(&node));
            }
        }
        Command::Eval {
            rule,
            data,
            data_file,
        } => {
            let record = match (data, data_file) {
                (Some(json), _) => DataRecord::from_json(&json).into_diagnostic()?,
                (None, Some(path)) => {
                    let file = File::open(&path).into_diagnostic()?;
                    DataRecord::from_reader(file).into_diagnostic()?
                }
                (None, None) => return Err(miette!("provide --data or --data-file")),
            };
            let node = parse_with(&rule, options)?;
            let result = evaluate_logged(&logger, &node, &record)?;
            println!("{}", result);
        }
        Command::Combine { rules, tree } => {
            let nodes = rules
                .iter()
                .map(|r| parse_with(r, options))
                .collect::<Result<Vec<_>, _>>()?;
            let combined = combine(nodes)?;
            info!(logger, "combined rules"; "count" => rules.len());
            if tree {
                println!("{}", to_debug_tree(&combined));
            } else {
                println!("{}", to_canonical(&combined));
            }
        }
        Command::Check {
            rule,
            attributes,
            employee_catalog,
        } => {
            let catalog = if employee_catalog {
                Some(Catalog::default_employee())
            } else if attributes.is_empty() {
                None
            } else {
                Some(Catalog::new(attributes))
            };
            let report = validate(&rule, catalog.as_ref(), options);
            println!(
                "{}",
                serde_json::to_string_pretty(&report).into_diagnostic()?
            );
            if !report.is_valid {
                return Err(miette!("rule failed validation"));
            }
        }
    }

    Ok(())
}
