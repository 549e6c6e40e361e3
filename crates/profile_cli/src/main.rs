//! Command-line front end for the profile service.
//!
//! # Usage
//!
//! ```bash
//! # One-shot calls against a database file
//! profile_cli --db profiles.sqlite3 create '{"userId":"U1","firstName":"John",...}'
//! profile_cli --db profiles.sqlite3 get U1
//! profile_cli --db profiles.sqlite3 list
//!
//! # Long-running loop: one JSON request per stdin line, one reply per stdout line
//! echo '{"method":"GetAllProfiles"}' | profile_cli --db profiles.sqlite3 serve
//! ```
//!
//! Flags override `PROFILE_*` environment variables.

mod serve;

use clap::{Parser, Subcommand};
use log::info;
use profile_core::{
    init_logging_from_config, CreateProfileRequest, DeleteProfileRequest,
    GetProfileByIdRequest, ProfileService, RpcReply, ServiceConfig, UpdateProfileRequest,
    UserProfile,
};
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "profile_cli")]
#[command(version, about = "Profile record service")]
struct Cli {
    /// SQLite database file (in-memory when omitted)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log level (`trace`, `debug`, `info`, `warn`, `error`)
    #[arg(long)]
    log_level: Option<String>,

    /// Snapshot validity window in seconds
    #[arg(long)]
    snapshot_ttl_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a profile from a JSON document
    Create { profile: String },
    /// Fetch one profile by id
    Get { user_id: String },
    /// List every profile
    List,
    /// Update a profile from a JSON document
    Update { profile: String },
    /// Delete a profile and its address
    Delete { user_id: String },
    /// Serve line-delimited JSON requests from stdin
    Serve,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("profile_cli failed: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = resolve_config(&cli)?;
    init_logging_from_config(&config)?;
    let service = ProfileService::open(&config)?;
    info!(
        "event=cli_start module=cli status=ok version={}",
        profile_core::core_version()
    );

    let reply = match cli.command {
        Command::Create { profile } => RpcReply::Status(service.create_profile(
            &CreateProfileRequest {
                profile: Some(parse_profile(&profile)?),
            },
        )),
        Command::Get { user_id } => {
            RpcReply::Profile(service.get_profile_by_id(&GetProfileByIdRequest { user_id }))
        }
        Command::List => RpcReply::Profiles(service.get_all_profiles()),
        Command::Update { profile } => RpcReply::Status(service.update_profile(
            &UpdateProfileRequest {
                profile: Some(parse_profile(&profile)?),
            },
        )),
        Command::Delete { user_id } => {
            RpcReply::Status(service.delete_profile(&DeleteProfileRequest { user_id }))
        }
        Command::Serve => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            let served = serve::serve(&service, stdin.lock(), stdout.lock())?;
            info!("event=cli_serve module=cli status=ok requests={served}");
            return Ok(());
        }
    };

    println!("{}", serde_json::to_string(&reply)?);
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<ServiceConfig, Box<dyn Error>> {
    let mut config = ServiceConfig::from_env()?;
    if let Some(db) = &cli.db {
        config.db_path = Some(db.clone());
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(secs) = cli.snapshot_ttl_secs {
        config.snapshot_ttl = Duration::from_secs(secs);
    }
    config.validate()?;
    Ok(config)
}

fn parse_profile(raw: &str) -> Result<UserProfile, serde_json::Error> {
    serde_json::from_str(raw)
}
