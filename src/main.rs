use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use hi_interpreter as hi;

use hi::ast_printer::AstPrinter;
use hi::error::HiError;
use hi::interpreter::{Interpreter, DEFAULT_MAX_CALL_DEPTH};
use hi::parser::Parser;
use hi::scanner::{scan_tokens, Scanner};
use hi::session::{parse_program, Session};

/// Exit status for scan, parse and resolve errors.
const EXIT_STATIC_ERROR: i32 = 65;

/// Exit status for runtime errors.
const EXIT_RUNTIME_ERROR: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Hi language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to the log file
    #[arg(long, global = true)]
    log: bool,

    /// Where `--log` writes its records
    #[arg(long, global = true, default_value = "app.log")]
    log_file: PathBuf,

    /// Deepest allowed nesting of function calls
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Print the tokens as a JSON array instead
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file and prints its AST
    Parse {
        filename: PathBuf,

        /// Parse a whole program instead of a single expression
        #[arg(long)]
        program: bool,
    },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs input from a file as a Hi program, or starts a REPL without one
    Run { filename: Option<PathBuf> },
}

/// Maps the file and returns its contents, which must be valid UTF-8.
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;

    let len = file
        .metadata()
        .context(format!("Failed to stat file {:?}", filename))?
        .len();

    // Zero-length mappings are rejected on some platforms.
    if len == 0 {
        return Ok(String::new());
    }

    // SAFETY: the map is read once, immediately copied, and dropped.
    let mmap = unsafe { Mmap::map(&file) }.context(format!("Failed to map file {:?}", filename))?;

    let source = std::str::from_utf8(&mmap)
        .map_err(HiError::from)
        .context(format!("File {:?} is not valid UTF-8", filename))?;

    info!("Read {} bytes from {:?}", len, filename);

    Ok(source.to_owned())
}

fn init_logger(path: &Path) -> Result<()> {
    // Create or open the log file
    let log_file = File::create(path).context(format!("Failed to create {:?}", path))?;

    // Configure env_logger to write to file with statement number and source line
    Builder::new()
        .format(|buf, record| {
            // Strip 'hi_interpreter::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("hi_interpreter::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized, writing to {:?}", path);
    Ok(())
}

/// Print every diagnostic and pick the exit status: runtime errors win.
fn report(errors: &[HiError]) -> i32 {
    for error in errors {
        debug!("Reporting: {}", error);
        eprintln!("{}", error);
    }

    if errors.iter().any(HiError::is_runtime) {
        EXIT_RUNTIME_ERROR
    } else {
        EXIT_STATIC_ERROR
    }
}

fn tokenize(source: &str, json: bool) -> Result<()> {
    if json {
        match scan_tokens(source) {
            Ok(tokens) => {
                let out = serde_json::to_string_pretty(&tokens).context("Failed to encode tokens")?;
                println!("{}", out);
            }
            Err(e) => std::process::exit(report(&[e])),
        }

        return Ok(());
    }

    let mut tokenized = true;

    for token in Scanner::new(source) {
        match token {
            Ok(token) => {
                debug!("Scanned token: {}", token);
                println!("{}", token);
            }

            Err(e) => {
                tokenized = false;
                debug!("Tokenization debug: {}", e);
                eprintln!("{}", e);
            }
        }
    }

    if !tokenized {
        debug!("Tokenization failed, exiting with code 65");
        std::process::exit(EXIT_STATIC_ERROR);
    }

    info!("Tokenization completed successfully");
    Ok(())
}

fn parse(source: &str, program: bool) {
    if program {
        match parse_program(source) {
            Ok(statements) => {
                for stmt in &statements {
                    println!("{}", AstPrinter::print_stmt(stmt));
                }
            }
            Err(errors) => std::process::exit(report(&errors)),
        }

        return;
    }

    let parsed = scan_tokens(source).and_then(|tokens| Parser::new(tokens).parse_expression());

    match parsed {
        Ok(expr) => {
            let ast_str = AstPrinter::print(&expr);
            debug!("AST: {}", ast_str);
            println!("{}", ast_str);
        }

        Err(e) => std::process::exit(report(&[e])),
    }
}

/// Read-eval-print loop over stdin.  Definitions persist between lines and
/// errors are reported without leaving the loop.
fn repl(mut session: Session) -> Result<()> {
    info!("Starting REPL");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        line.clear();

        if stdin.lock().read_line(&mut line).context("Failed to read stdin")? == 0 {
            writeln!(stdout)?;
            break;
        }

        if let Err(errors) = session.run(&line) {
            report(&errors);
        }
    }

    info!("REPL finished");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger(&args.log_file)?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let mut session = Session::with_interpreter(
        Interpreter::new().with_max_call_depth(args.max_call_depth),
    );

    match args.commands {
        Commands::Tokenize { filename, json } => {
            info!("Running Tokenize subcommand");
            let source = read_file(&filename)?;
            tokenize(&source, json)?;
        }

        Commands::Parse { filename, program } => {
            info!("Running Parse subcommand");
            let source = read_file(&filename)?;
            parse(&source, program);
        }

        Commands::Evaluate { filename } => {
            info!("Running Evaluate subcommand");
            let source = read_file(&filename)?;

            match session.evaluate(&source) {
                Ok(value) => println!("{}", value),
                Err(errors) => std::process::exit(report(&errors)),
            }
        }

        Commands::Run { filename } => match filename {
            Some(filename) => {
                info!("Running Run subcommand");
                let source = read_file(&filename)?;

                if let Err(errors) = session.run(&source) {
                    std::process::exit(report(&errors));
                }

                info!("Program executed successfully");
            }

            None => repl(session)?,
        },
    }

    Ok(())
}
