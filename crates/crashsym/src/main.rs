use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use crashsym_core::prelude::*;
use crashsym_utils::{info, init_logging, init_logging_with_level, LogFormat, LogLevel};

/// Resolve crash stack addresses to functions and source lines.
#[derive(Parser, Debug)]
#[command(name = "crashsym")]
#[command(version)]
#[command(about = "Resolve crash stack addresses to functions and source lines", long_about = None)]
struct Cli
{
    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

/// Where a module's symbols come from.
#[derive(Args, Debug)]
struct SymbolSource
{
    /// Name to load the module under (as it appears in stack frames)
    #[arg(short, long)]
    module: String,
    /// Path to the module's symbol map file
    #[arg(short, long)]
    symbols: PathBuf,
    /// Fail the load if more than this fraction of lines is malformed (0.0 - 1.0)
    #[arg(long)]
    max_malformed_ratio: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Resolve one or more module-relative addresses
    Resolve
    {
        #[command(flatten)]
        source: SymbolSource,
        /// Addresses to resolve (hex, with or without 0x)
        #[arg(required = true)]
        addresses: Vec<Address>,
    },
    /// Print what was loaded from a symbol map file
    Stats
    {
        #[command(flatten)]
        source: SymbolSource,
    },
}

fn main()
{
    let cli = Cli::parse();

    let logging = match cli.log_level {
        Some(level) => init_logging_with_level(level, LogFormat::Pretty),
        None => init_logging(),
    };
    let _guard = match logging {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    let stdout = io::stdout();
    if let Err(e) = run_command(cli.command, &mut stdout.lock()) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn load(source: &SymbolSource) -> SymbolResult<(BasicSourceLineResolver, LoadStats)>
{
    let mut options = ResolverOptions::default();
    if let Some(ratio) = source.max_malformed_ratio {
        options = options.with_max_malformed_ratio(ratio);
    }

    let mut resolver = BasicSourceLineResolver::with_options(options);
    let stats = resolver.load_module(&source.module, &source.symbols)?;
    Ok((resolver, stats))
}

fn run_command(command: Commands, out: &mut dyn Write) -> Result<(), Box<dyn std::error::Error>>
{
    match command {
        Commands::Resolve { source, addresses } => {
            let (resolver, _) = load(&source)?;
            info!("Resolving {} addresses in {}", addresses.len(), source.module);

            for address in addresses {
                let mut frame = StackFrame::new(source.module.as_str(), address);
                let result = resolver.fill_source_line_info(&mut frame);
                writeln!(out, "{}", render_frame(&frame, result.err().as_ref()))?;
            }
            Ok(())
        }
        Commands::Stats { source } => {
            let (_, stats) = load(&source)?;
            print_stats(out, &source.module, &stats)?;
            Ok(())
        }
    }
}

/// One output line per frame: the address, then what it resolved to.
fn render_frame(frame: &StackFrame, error: Option<&SymbolError>) -> String
{
    match (&frame.source, error) {
        (Some(info), _) if info.kind == SymbolKind::PublicSymbol => {
            format!("{}  {info} (public symbol)", frame.instruction)
        }
        (Some(info), _) => format!("{}  {info}", frame.instruction),
        (None, Some(err)) => format!("{}  <unresolved: {err}>", frame.instruction),
        (None, None) => format!("{}  <unresolved>", frame.instruction),
    }
}

fn print_stats(out: &mut dyn Write, module: &str, stats: &LoadStats) -> io::Result<()>
{
    writeln!(out, "Module: {module}")?;
    writeln!(out, "  Lines:          {}", stats.lines)?;
    writeln!(out, "  Files:          {}", stats.files)?;
    writeln!(out, "  Functions:      {}", stats.functions)?;
    writeln!(out, "  Line records:   {}", stats.line_records)?;
    writeln!(out, "  Public symbols: {}", stats.public_symbols)?;
    writeln!(out, "  Skipped:        {}", stats.skipped)?;
    writeln!(out, "  Malformed:      {}", stats.malformed)?;
    Ok(())
}
