//! Rocker Inspect CLI
//!
//! Usage:
//!   rocker-inspect [OPTIONS] <FILE>
//!
//! Options:
//!   -d, --template-dir <DIR>  Directory relative template paths resolve against
//!   -c, --config <FILE>       Configuration file (TOML format)
//!       --log                 Emit the report through the log instead of stdout
//!   -v, --verbose...          More log output (-v debug, -vv trace)
//!   -h, --help                Print help

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use rocker_inspect::report::REPORT_TARGET;
use rocker_inspect::{
    DiagnosticSink, InspectConfig, ParseError, Renderer, TemplateParser, TracingSink,
};

#[derive(Parser)]
#[command(name = "rocker-inspect")]
#[command(about = "Print the parsed model of a Rocker-style template")]
struct Cli {
    /// Template file
    file: PathBuf,

    /// Directory relative template paths resolve against
    #[arg(short = 'd', long)]
    template_dir: Option<PathBuf>,

    /// Configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit the report through the log instead of stdout
    #[arg(long)]
    log: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Log filter from `RUST_LOG` directives, or from the verbosity when unset
///
/// With `report_to_log` the report target is always enabled at INFO, so
/// `RUST_LOG` cannot silence the report.
fn log_filter(env_directives: Option<&str>, verbose: u8, report_to_log: bool) -> EnvFilter {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let mut filter = env_directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    if report_to_log {
        match format!("{}=info", REPORT_TARGET).parse::<Directive>() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("Error in report log directive: {}", e),
        }
    }
    filter
}

fn init_tracing(verbose: u8, report_to_log: bool) {
    let env_directives = std::env::var("RUST_LOG").ok();
    let filter = log_filter(env_directives.as_deref(), verbose, report_to_log);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(report_to_log)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log);

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => match InspectConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => InspectConfig::default(),
    };
    if let Some(dir) = cli.template_dir {
        config = config.with_template_directory(dir);
    }

    let parser = TemplateParser::new(config.clone());
    let source = match parser.read_template(&cli.file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    // The excerpt is built from the same buffer the location refers to
    let model = match parser.parse_source(&cli.file, &source) {
        Ok(model) => model,
        Err(e) => {
            report_parse_error(&e, &source);
            std::process::exit(1);
        }
    };

    let renderer = Renderer::new(&config);
    let result = if cli.log {
        renderer.render(&model, &mut TracingSink)
    } else {
        renderer.render(&model, &mut StdoutSink)
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the one-line error, plus an annotated excerpt for syntax errors
fn report_parse_error(err: &ParseError, source: &str) {
    eprintln!("{}", err);
    if let ParseError::Syntax { .. } = err {
        eprint!("{}", err.format(source));
    }
}

struct StdoutSink;

impl DiagnosticSink for StdoutSink {
    fn emit(&mut self, line: &str) {
        println!("{}", line);
    }
}
