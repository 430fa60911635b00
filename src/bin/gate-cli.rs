use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use edge_gate::config::load_config;
use edge_gate::ranges::{RangeSource, RangeTable};
use edge_gate::{AccessDecider, AccessPolicy, ResolvedIdentity, Verdict};

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Offline inspection tool for edge-gate ranges and policies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether an address belongs to the edge network
    Contains {
        ip: String,
        /// JSON range document; the built-in list is used when omitted
        #[arg(long)]
        ranges_file: Option<PathBuf>,
    },
    /// List the edge network prefixes
    Ranges {
        #[arg(long)]
        ranges_file: Option<PathBuf>,
    },
    /// Run the access decision for an address under a configuration
    Decide {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ip: String,
        /// Treat the request as carrying CF-Connecting-IP
        #[arg(long)]
        edge_header: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn run(command: Commands) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match command {
        Commands::Contains { ip, ranges_file } => {
            let table = load_table(ranges_file);
            if table.contains(&ip) {
                println!("{} is inside the edge network ({})", ip, table.origin().label());
                Ok(ExitCode::SUCCESS)
            } else {
                println!("{} is outside the edge network ({})", ip, table.origin().label());
                Ok(ExitCode::FAILURE)
            }
        }
        Commands::Ranges { ranges_file } => {
            let table = load_table(ranges_file);
            println!("# origin: {} ({} prefixes)", table.origin().label(), table.len());
            for prefix in table.prefixes() {
                println!("{}", prefix);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Decide {
            config,
            ip,
            edge_header,
        } => {
            let config = load_config(&config)?;
            let policy = AccessPolicy::from_config(&config.access);
            let table = RangeTable::load(&RangeSource::from_config(&config.edge_ranges));

            let identity = ResolvedIdentity {
                client_ip: ip,
                edge_header_present: edge_header,
                edge_country: None,
                edge_request_id: None,
            };

            let verdict = AccessDecider.decide(&identity, &policy, &table);
            println!("{}", serde_json::to_string_pretty(&policy.summary())?);
            match verdict {
                Verdict::Allow => {
                    println!("allow {}", identity.client_ip);
                    Ok(ExitCode::SUCCESS)
                }
                Verdict::Deny(reason) => {
                    println!("deny {} ({}): {}", identity.client_ip, reason.as_str(), reason);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

fn load_table(ranges_file: Option<PathBuf>) -> RangeTable {
    let source = match ranges_file {
        Some(path) => RangeSource::File(path),
        None => RangeSource::Builtin,
    };
    RangeTable::load(&source)
}
