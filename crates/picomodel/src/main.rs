use clap::{Args, Parser, ValueEnum};
use env_logger::Env;
use log::*;
use picomodel_core::{Model, ModelError, Revision, model_from_family};

use std::io::Write;

use crate::inspect::{classify, info, ranges};

mod inspect;

#[derive(Parser, Debug)]
enum Command {
    /// Show what is known about a chip
    #[command(arg_required_else_help = true)]
    Info {
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Show which kind of memory addresses fall in
    #[command(arg_required_else_help = true)]
    Classify {
        #[command(flatten)]
        model: ModelArgs,

        /// Addresses to classify
        #[clap(required = true, value_parser = parse_u32)]
        addresses: Vec<u32>,
    },
    /// Show the address ranges used when reading, writing and verifying
    #[command(arg_required_else_help = true)]
    Ranges {
        #[command(flatten)]
        model: ModelArgs,

        /// Show the ranges for a RAM image instead of a flash image
        #[clap(long)]
        ram: bool,
    },
}

#[derive(Args, Debug)]
struct ModelArgs {
    /// UF2 family id (e.g. 0xe48bff56 for RP2040)
    #[clap(value_parser = parse_u32)]
    family: u32,

    /// Silicon revision (b0, b1, b2, a2, a3, a4)
    #[clap(short, long)]
    revision: Option<Revision>,

    /// Exact family id of the image running on the device
    #[clap(long, value_parser = parse_u32)]
    family_id: Option<u32>,
}

impl ModelArgs {
    fn resolve(&self) -> Result<Model, ModelError> {
        let mut model = model_from_family(self.family);
        if let Some(family_id) = self.family_id {
            model = model.with_family_id(family_id)?;
        }
        if let Some(revision) = self.revision {
            model = model.with_revision(revision)?;
        }
        Ok(model)
    }
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|err| format!("'{}' is not a 32 bit number: {}", s, err))
}

#[derive(Parser, Debug)]
#[clap(version, about, long_about = None)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Set the logging verbosity
    #[clap(short, long, value_enum, global = true, default_value_t = LogLevel::Info)]
    verbose: LogLevel,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
            LogLevel::Off => LevelFilter::Off,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default())
        .filter_level(cli.verbose.into())
        .target(env_logger::Target::Stdout)
        .format(|buf, record| {
            let level = record.level();
            if level == Level::Info {
                writeln!(buf, "{}", record.args())
            } else {
                writeln!(buf, "{}: {}", record.level(), record.args())
            }
        })
        .init();

    let command = match cli.command {
        Some(command) => command,
        None => return Ok(()),
    };

    match command {
        Command::Info { model } => info(&model.resolve()?),
        Command::Classify { model, addresses } => classify(&model.resolve()?, &addresses),
        Command::Ranges { model, ram } => ranges(&model.resolve()?, ram),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_decimal() {
        assert_eq!(parse_u32("0xe48bff56"), Ok(0xe48bff56));
        assert_eq!(parse_u32("0X10"), Ok(16));
        assert_eq!(parse_u32("4096"), Ok(4096));
        assert!(parse_u32("0x100000000").is_err());
        assert!(parse_u32("flash").is_err());
    }

    #[test]
    fn resolves_refined_model() {
        let cli = Cli::parse_from([
            "picomodel",
            "info",
            "0xe48bff59",
            "--revision",
            "a3",
            "--family-id",
            "0xe48bff5a",
        ]);
        let model = match cli.command {
            Some(Command::Info { model }) => model.resolve().unwrap(),
            other => panic!("unexpected command {:?}", other),
        };
        assert_eq!(model.name(), "RP2350");
        assert_eq!(model.revision_name(), "A3");
        assert_eq!(model.family_id(), Some(0xe48bff5a));
    }

    #[test]
    fn rp2040_family_id_is_already_set() {
        let cli = Cli::parse_from(["picomodel", "info", "0xe48bff56", "--family-id", "1"]);
        match cli.command {
            Some(Command::Info { model }) => {
                assert_eq!(model.resolve().unwrap_err(), ModelError::FamilyIdAlreadySet)
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
