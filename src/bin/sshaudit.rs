use std::path::PathBuf;
use structopt::StructOpt;

use sshaudit::config::Config;
use sshaudit::output::{OutputFormat, OutputHandler};
use sshaudit::Analyzer;

/// SSH auth log auditor
#[derive(StructOpt, Debug)]
#[structopt(name = "sshaudit", about = "SSH auth log security event and brute-force analyzer")]
pub enum Cli {
    /// Classify security events into a JSON array
    Events {
        /// Path to the auth log
        #[structopt(short, long, default_value = "/data/auth.log")]
        input: PathBuf,
        /// Output JSON file ("-" for stdout)
        #[structopt(short, long, default_value = "/output/ssh_security_events.json")]
        output: PathBuf,
        /// Single-line JSON instead of pretty-printed
        #[structopt(long)]
        compact: bool,
    },
    /// Detect brute-force windows into a JSON array
    Bruteforce {
        /// Path to the auth log
        #[structopt(short, long, default_value = "/data/auth.log")]
        input: PathBuf,
        /// Output JSON file ("-" for stdout)
        #[structopt(short, long, default_value = "/output/ssh_bruteforce_attacks.json")]
        output: PathBuf,
        /// Single-line JSON instead of pretty-printed
        #[structopt(long)]
        compact: bool,
    },
    /// Run both analyses with paths and thresholds from a config file
    Analyze {
        /// Path to configuration file
        #[structopt(short, long, default_value = "sshaudit.toml")]
        config: PathBuf,
    },
    /// Generate a default configuration file
    Config {
        /// Output path for the configuration file
        #[structopt(short, long, default_value = "sshaudit.toml")]
        output: PathBuf,
    },
}

fn handler(output: PathBuf, compact: bool) -> OutputHandler {
    let format = if compact { OutputFormat::Compact } else { OutputFormat::Json };
    let target = if output.as_os_str() == "-" { None } else { Some(output) };
    OutputHandler::new(format, target)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::from_args();

    match cli {
        Cli::Events { input, output, compact } => {
            let analyzer = Analyzer::new();
            let report = analyzer.analyze_file(&input)?;
            handler(output, compact).write_all(&report.events)?;
        }
        Cli::Bruteforce { input, output, compact } => {
            let analyzer = Analyzer::new();
            let report = analyzer.analyze_file(&input)?;
            handler(output, compact).write_all(&report.findings)?;
        }
        Cli::Analyze { config } => {
            let config = Config::load_or_default(&config)?;
            let format = OutputFormat::from_str(&config.output.format);

            let report = Analyzer::from_config(&config).analyze_file(&config.input.file_path)?;

            OutputHandler::new(format, Some(config.output.events_path.clone()))
                .write_all(&report.events)?;
            OutputHandler::new(format, Some(config.output.bruteforce_path.clone()))
                .write_all(&report.findings)?;
        }
        Cli::Config { output } => {
            let config = Config::default();
            config.to_file(&output)?;
            println!("Default configuration written to: {:?}", output);
        }
    }

    Ok(())
}
