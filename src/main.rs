use std::{
    fs::{read_to_string, write},
    path::{Path, PathBuf},
    process,
    sync::Arc,
    time::Instant,
};

use clap::Parser as ClapParser;
use pseudocode::{
    display_error,
    to_json,
    errors::errors::Error,
    lexer::lexer::{preprocess, tokenize},
    lowering::lowering::lower,
    parser::parser::parse,
};
use serde::Serialize;

#[derive(ClapParser, Debug)]
#[command(name = "pseudocode", about = "Parses pseudocode programs into a canonical AST")]
struct Cli {
    /// Source file to parse.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Print the token stream instead of the AST.
    #[arg(long)]
    tokens: bool,

    /// Write the raw syntax tree as JSON to this path.
    #[arg(long, value_name = "PATH")]
    raw: Option<PathBuf>,

    /// Also write the AST as JSON to this path.
    #[arg(long, value_name = "PATH")]
    ast: Option<PathBuf>,

    /// Print how long each phase took.
    #[arg(long)]
    timings: bool,

    /// Print and write JSON on a single line.
    #[arg(long)]
    compact: bool,

    /// Keep typographic quotes instead of replacing them with plain ones.
    #[arg(long)]
    no_normalize_quotes: bool,
}

fn main() {
    let cli = Cli::parse();

    let file_name = cli
        .file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| cli.file.to_string_lossy().to_string());

    let mut source = match read_to_string(&cli.file) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Failed to read {}: {}", cli.file.display(), err);
            process::exit(1);
        }
    };
    if !cli.no_normalize_quotes {
        source = preprocess(&source);
    }

    let start = Instant::now();
    let tokens = tokenize(source.clone(), Some(file_name.clone()))
        .unwrap_or_else(|err| fail(&err, &source, &file_name));
    if cli.timings {
        eprintln!("Tokenized in {:?}", start.elapsed());
    }

    if cli.tokens {
        for token in &tokens {
            println!("{}", token.debug());
        }
        return;
    }

    let parse_start = Instant::now();
    let tree = parse(tokens, Arc::new(file_name.clone()))
        .unwrap_or_else(|err| fail(&err, &source, &file_name));
    if cli.timings {
        eprintln!("Parsed in {:?}", parse_start.elapsed());
    }

    if let Some(path) = &cli.raw {
        write_json(path, &tree, cli.compact);
    }

    let lower_start = Instant::now();
    let program = lower(&tree).unwrap_or_else(|err| fail(&err, &source, &file_name));
    if cli.timings {
        eprintln!("Lowered in {:?}", lower_start.elapsed());
        eprintln!("Total time: {:?}", start.elapsed());
    }

    if let Some(path) = &cli.ast {
        write_json(path, &program, cli.compact);
    }

    match to_json(&program, cli.compact) {
        Ok(json) => println!("{}", json),
        Err(err) => {
            eprintln!("Failed to serialize the AST: {}", err);
            process::exit(1);
        }
    }
}

fn fail(error: &Error, source: &str, file: &str) -> ! {
    display_error(error, source, file);
    process::exit(1)
}

fn write_json<T: Serialize>(path: &Path, value: &T, compact: bool) {
    let result = to_json(value, compact)
        .map_err(|err| err.to_string())
        .and_then(|json| write(path, json).map_err(|err| err.to_string()));

    if let Err(err) = result {
        eprintln!("Failed to write {}: {}", path.display(), err);
        process::exit(1);
    }
}
