use std::process;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use symforge_core::arch::KNOWN_ARCHITECTURES;
use symforge_core::config::SessionConfig;
use symforge_core::error::{Result, SymforgeError};
use symforge_core::module::{Module, ModuleBuilder};
use symforge_core::owner::HostObject;
use symforge_core::typedesc::{init_float_type, init_integer_type, FloatFormat};
use symforge_core::Session;
use symforge_utils::{info, init_logging, init_logging_with_level, LogFormat, LogLevel, LoggingGuard, LoggingError};

/// Build and inspect synthetic debug information.
#[derive(Parser, Debug)]
#[command(name = "symforge")]
#[command(version)]
#[command(about = "Build and inspect synthetic debug information", long_about = None)]
struct Cli
{
    /// Target architecture (defaults to SYMFORGE_TARGET_ARCH, then the host)
    #[arg(long, global = true)]
    arch: Option<String>,

    /// Log level (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format: pretty or json
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// List the architectures symforge knows about
    Archs,
    /// Build a synthetic module and print its symbol tables
    Build
    {
        /// Module name
        name: String,
        /// Code label, as NAME=ADDR (hex with 0x, or decimal)
        #[arg(long = "label", value_name = "NAME=ADDR")]
        labels: Vec<String>,
        /// Static data, as NAME=ADDR
        #[arg(long = "static", value_name = "NAME=ADDR")]
        statics: Vec<String>,
        /// Integer typedef, as NAME=BITS, with a trailing `u` for unsigned
        #[arg(long = "int", value_name = "NAME=BITS[u]")]
        ints: Vec<String>,
        /// Source language of every symbol
        #[arg(long)]
        language: Option<String>,
    },
    /// Create a float type from a preset layout and print it
    Float
    {
        /// Type name
        name: String,
        /// Layout preset: ieee_single, ieee_double or i387_ext
        #[arg(long, default_value = "ieee_double")]
        preset: String,
    },
}

fn main()
{
    let cli = Cli::parse();

    let _guard = match start_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn start_logging(cli: &Cli) -> std::result::Result<LoggingGuard, LoggingError>
{
    match (cli.log_level, cli.log_format) {
        (None, None) => init_logging(),
        (level, format) => init_logging_with_level(level.unwrap_or(LogLevel::Info), format.unwrap_or_default()),
    }
}

fn run_command(cli: Cli) -> Result<()>
{
    let mut config = SessionConfig::from_env()?;
    if let Some(arch) = cli.arch {
        config = config.with_default_architecture(arch);
    }

    match cli.command {
        Commands::Archs => {
            println!("{:<12} {:<8} {:>4}", "NAME", "ORDER", "BITS");
            for (name, machine, byte_order) in KNOWN_ARCHITECTURES {
                let bits = machine.address_size().map_or(0, |size| u32::from(size.bytes()) * 8);
                println!("{name:<12} {byte_order:<8} {bits:>4}");
            }
            Ok(())
        }
        Commands::Build {
            name,
            labels,
            statics,
            ints,
            language,
        } => {
            let session = Session::new(config)?;
            let arch = HostObject::from(session.default_architecture().clone());
            let language = language.as_deref();

            let mut builder = ModuleBuilder::new(&name);
            for entry in &ints {
                let (symbol, bits) = split_assignment(entry)?;
                let (bits, is_unsigned) = match bits.strip_suffix('u') {
                    Some(bits) => (bits, true),
                    None => (bits, false),
                };
                let bits = i32::from_str(bits)
                    .map_err(|e| SymforgeError::InvalidArgument(format!("bad bit size in {entry:?}: {e}")))?;
                let ty = init_integer_type(&arch, bits, is_unsigned, symbol)?;
                add_reporting_duplicate(builder.add_type_symbol(symbol, &ty, language)?, symbol);
            }
            for entry in &labels {
                let (symbol, address) = split_assignment(entry)?;
                add_reporting_duplicate(builder.add_label_symbol(symbol, parse_address(address)?, language)?, symbol);
            }
            for entry in &statics {
                let (symbol, address) = split_assignment(entry)?;
                add_reporting_duplicate(builder.add_static_symbol(symbol, parse_address(address)?, language)?, symbol);
            }

            info!("Building module {} with {} symbols", name, builder.len());
            let module = builder.build(&session)?;
            print_module(&module);
            Ok(())
        }
        Commands::Float { name, preset } => {
            let format = FloatFormat::preset_by_name(&preset)
                .ok_or_else(|| SymforgeError::InvalidArgument(format!("unknown float preset {preset}")))?;
            let session = Session::new(config)?;
            let arch = session.default_architecture();
            let ty = init_float_type(&HostObject::from(arch.clone()), &format, &name)?;
            println!("{ty}: {:?}, {} bits, {arch}", ty.code(), ty.bit_size());
            if let Some(layout) = ty.float_format() {
                println!("  {layout}");
            }
            Ok(())
        }
    }
}

fn add_reporting_duplicate(inserted: bool, symbol: &str)
{
    if !inserted {
        eprintln!("warning: {symbol} defined more than once, keeping the first definition");
    }
}

fn split_assignment(entry: &str) -> Result<(&str, &str)>
{
    entry.split_once('=')
        .filter(|(name, value)| !name.is_empty() && !value.is_empty())
        .ok_or_else(|| SymforgeError::InvalidArgument(format!("expected NAME=VALUE, got {entry:?}")))
}

fn parse_address(text: &str) -> Result<u64>
{
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| SymforgeError::InvalidArgument(format!("bad address {text:?}: {e}")))
}

fn print_module(module: &Module)
{
    println!("Module {} ({})", module.name(), module.arch());
    println!("\nSections:");
    for (index, section) in module.sections().iter().enumerate() {
        println!("  [{index}] {:<8} {} size {}", section.name, section.address, section.size);
    }

    println!("\nMinimal symbols ({}):", module.minimal_symbol_count());
    if let Some(table) = module.minimal_symbols() {
        for symbol in table.iter() {
            println!("  {} {:<5} {}", symbol.address, symbol.kind, symbol.name);
        }
    }

    println!("\nFull symbols ({}):", module.full_symbol_count());
    for compunit in module.compunits() {
        println!("  compunit {} ({})", compunit.name(), compunit.language());
        for symbol in compunit.symbols() {
            let value = match (symbol.address(), symbol.ty()) {
                (Some(address), _) => address.to_string(),
                (None, Some(ty)) => format!("{ty} ({} bits)", ty.bit_size()),
                (None, None) => String::new(),
            };
            println!("    {:<8} {:<24} {value}", symbol.class(), symbol.name());
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse_address()
    {
        assert_eq!(parse_address("0x1000").unwrap(), 0x1000);
        assert_eq!(parse_address("4096").unwrap(), 4096);
        assert!(parse_address("0xzz").is_err());
    }

    #[test]
    fn test_split_assignment()
    {
        assert_eq!(split_assignment("main=0x10").unwrap(), ("main", "0x10"));
        assert!(split_assignment("main").is_err());
        assert!(split_assignment("=0x10").is_err());
    }

    #[test]
    fn test_cli_parses_build()
    {
        let cli = Cli::try_parse_from([
            "symforge", "--arch", "s390x", "build", "jit", "--label", "entry=0x10", "--int", "word=32u",
        ])
        .unwrap();
        assert_eq!(cli.arch.as_deref(), Some("s390x"));
        match cli.command {
            Commands::Build { name, labels, ints, .. } => {
                assert_eq!(name, "jit");
                assert_eq!(labels, vec!["entry=0x10"]);
                assert_eq!(ints, vec!["word=32u"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
