use clap::{Parser, Subcommand};
use luca::load::{luca_files, parse_file};
use luca::parse::{normalize_indentation, tokenize, DirectiveRegistry, Parser as LucaParser};
use luca::{Error, ErrorType, Ledger, ParseOptions, Source};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn input_files(input: &Path) -> Result<Vec<PathBuf>, Error> {
    if input.is_dir() {
        luca_files(input)
    } else {
        Ok(vec![input.to_path_buf()])
    }
}

fn balances(files: &[PathBuf], auto_create: bool) -> Result<(), Error> {
    let ledger = Ledger::from_files(files, auto_create)?;
    let mut result = vec![];
    for account in ledger.accounts() {
        let commodity = account
            .account()
            .commodity
            .clone()
            .unwrap_or_default();
        result.push(format!("{} {} {}", account.name(), account.balance(), commodity));
    }
    result.sort();
    for entry in result {
        println!("{}", entry.trim_end());
    }
    Ok(())
}

fn fmt(files: &[PathBuf], options: ParseOptions) -> Result<(), Error> {
    let registry = DirectiveRegistry::default();
    let parser = LucaParser::new(&registry, options);
    for file in files {
        let doc = parse_file(&parser, file)?;
        if files.len() > 1 {
            println!("; {}", file.display());
        }
        print!("{}", doc);
    }
    Ok(())
}

fn tokens(files: &[PathBuf], options: ParseOptions) -> Result<(), Error> {
    for file in files {
        let src = Arc::new(file.display().to_string());
        let text = std::fs::read_to_string(file).map_err(|err| {
            Error::new(
                ErrorType::Io,
                format!("Couldn't read {}: {}", file.display(), err),
                Source::file_start(src.clone()),
            )
        })?;
        let normalized = normalize_indentation(&text, options.tab_width, &src)?;
        for token in tokenize(&normalized, src.clone())? {
            println!("{}:{} {}", token.location.line, token.location.col, token);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "luca",
    about = "A double-entry accounting tool for .luca files.",
    version = VERSION,
)]
struct Cli {
    /// A .luca file, or a directory whose .luca files are all read.
    #[arg(short, required = true)]
    input: PathBuf,
    /// Create accounts, and well-known commodities, on first reference.
    #[arg(long)]
    auto_create: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the balance of every account.
    Balances,
    /// Print the canonical text of every input file.
    Fmt,
    /// Dump the token stream after indentation is normalized.
    Tokens,
}

fn main() {
    pretty_env_logger::init();
    let args = Cli::parse();
    let options = ParseOptions::from_env();
    let result = input_files(&args.input).and_then(|files| match args.command {
        Commands::Balances => balances(&files, args.auto_create),
        Commands::Fmt => fmt(&files, options),
        Commands::Tokens => tokens(&files, options),
    });
    if let Err(error) = result {
        eprintln!("{}", error);
        std::process::exit(1);
    }
}
