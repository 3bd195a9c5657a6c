use coil::{meta_grammar, init_logging, Config as FileConfig, Grammar, Tokenizer, TokenKind};
use std::fs::File;
use std::io::{self, BufReader, IsTerminal, Write};
use std::path::PathBuf;
use tracing::{debug, error, info};

#[derive(Debug)]
enum Command {
    Tokens(Option<PathBuf>),
    Firsts,
    GrammarJson,
}

#[derive(Debug)]
struct Config {
    command: Command,
    config_path: Option<PathBuf>,
}

impl Config {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let prog = args.first().map(String::as_str).unwrap_or("coil");

        let mut positional = Vec::new();
        let mut config_path = None;
        let mut rest = args.iter().skip(1);
        while let Some(arg) = rest.next() {
            match arg.as_str() {
                "--help" | "-h" => return Err(Self::usage(prog)),
                "--config" => match rest.next() {
                    Some(path) => config_path = Some(PathBuf::from(path)),
                    None => return Err("--config needs a path".to_string()),
                },
                value if !value.starts_with("--") => positional.push(value.to_string()),
                opt => return Err(format!("Unknown option: {}\n\n{}", opt, Self::usage(prog))),
            }
        }

        let command = match positional.as_slice() {
            [cmd] if cmd == "tokens" => Command::Tokens(None),
            [cmd, file] if cmd == "tokens" => Command::Tokens(Some(PathBuf::from(file))),
            [cmd] if cmd == "firsts" => Command::Firsts,
            [cmd] if cmd == "grammar-json" => Command::GrammarJson,
            _ => return Err(Self::usage(prog)),
        };

        Ok(Self {
            command,
            config_path,
        })
    }

    fn usage(prog: &str) -> String {
        format!(
            "coil - tokenizer and grammar tables\n\n\
            USAGE:\n    {} [OPTIONS] <COMMAND>\n\n\
            COMMANDS:\n    \
            tokens [FILE]   Dump tokens from FILE, or from stdin\n    \
            firsts          Recompute and print the meta-grammar's FIRST sets\n    \
            grammar-json    Print the meta-grammar as JSON\n\n\
            OPTIONS:\n    \
            -h, --help          Print help information\n    \
            --config <PATH>     Use PATH instead of the discovered coil.toml",
            prog
        )
    }
}

fn load_file_config(path: Option<&PathBuf>) -> coil::Result<FileConfig> {
    match path {
        Some(path) => FileConfig::load(path),
        None => FileConfig::discover_or_default(),
    }
}

/// Print one token per line; true if input ended cleanly
fn dump_tokens(mut tokenizer: Tokenizer<'_>) -> io::Result<bool> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut count = 0usize;
    loop {
        let token = tokenizer.get();
        count += 1;
        writeln!(out, "{}: {}", token.line, token)?;
        match token.kind {
            TokenKind::EndMarker => break,
            TokenKind::ErrorToken => {
                error!(line = tokenizer.line(), status = %tokenizer.status(), "Tokenizer error");
                eprintln!("line {}: {}", tokenizer.line(), tokenizer.status());
                if !tokenizer.recover() {
                    return Ok(false);
                }
            }
            _ => {}
        }
    }
    debug!(tokens = count, "Token dump complete");
    Ok(!tokenizer.status().is_error())
}

fn run_tokens(file: Option<&PathBuf>, config: &FileConfig) -> Result<bool, Box<dyn std::error::Error>> {
    let tok_config = config.tokenizer_config();
    match file {
        Some(path) => {
            info!(file = %path.display(), "Tokenizing file");
            let reader = BufReader::new(File::open(path)?);
            let mut tok_config = tok_config;
            tok_config.ps1 = None;
            tok_config.ps2 = None;
            Ok(dump_tokens(Tokenizer::from_reader(reader).with_config(&tok_config))?)
        }
        None => {
            let stdin = io::stdin();
            let mut tokenizer = Tokenizer::from_reader(stdin.lock()).with_config(&tok_config);
            if stdin.is_terminal() && tok_config.ps1.is_none() {
                tokenizer = tokenizer.with_prompts(Some(">>> ".to_string()), Some("... ".to_string()));
            }
            info!("Tokenizing standard input");
            Ok(dump_tokens(tokenizer)?)
        }
    }
}

fn run_firsts(config: &FileConfig) -> Result<bool, Box<dyn std::error::Error>> {
    let mut grammar: Grammar = meta_grammar();
    grammar.clear_firsts();
    let reports = grammar.add_firsts()?;
    if config.grammar.report_left_recursion {
        for report in &reports {
            eprintln!("Left-recursion for '{}' (while computing '{}')", report.name, report.below);
        }
    }
    for dfa in &grammar.dfas {
        if let Some(set) = dfa.first.done() {
            println!("{} {}", dfa.name, grammar.describe_set(set));
        }
    }
    Ok(reports.is_empty())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = match Config::from_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let file_config = match load_file_config(args.config_path.as_ref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let guard = init_logging(file_config.log_config()?);

    info!("coil starting");
    debug!(command = ?args.command, "Configuration loaded");

    let ok = match &args.command {
        Command::Tokens(file) => run_tokens(file.as_ref(), &file_config)?,
        Command::Firsts => run_firsts(&file_config)?,
        Command::GrammarJson => {
            println!("{}", meta_grammar().to_json()?);
            true
        }
    };

    if !ok {
        error!("Finished with errors");
        drop(guard);
        std::process::exit(1);
    }
    Ok(())
}
