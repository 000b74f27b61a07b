use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use weft_consensus::{is_valid_turn_progression, ProposalSummary, TURN_TIMEOUT_FRAMES};
use weft_core::{EventId, KeyPair, ProposalSyncState};

mod cli;
mod commands;
mod config;

use cli::{Cli, Commands};
use commands::{emit_event, inspect_event, schedule, EmitParams};
use config::{generate_sample_config, ToolConfig};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins, then --log-level, then the config file
    let level = cli
        .log_level
        .clone()
        .or_else(|| {
            cli.command
                .config_path()
                .and_then(|path| ToolConfig::load(path).ok())
                .map(|config| config.log_level)
        })
        .unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { output, validators } => {
            init_config(&output, validators)?;
        }
        Commands::Keygen { output } => {
            generate_keypair(output)?;
        }
        Commands::Emit {
            config,
            epoch,
            seq,
            frame,
            lamport,
            parents,
            last_turn,
            last_frame,
            block,
            out,
        } => {
            let params = EmitParams {
                epoch,
                seq,
                frame,
                lamport,
                parents: parents
                    .iter()
                    .map(|p| EventId::from_hex(p))
                    .collect::<Result<_, _>>()?,
                incoming: ProposalSyncState {
                    last_seen_proposal_turn: last_turn,
                    last_seen_proposal_frame: last_frame,
                },
                block,
                time: now_nanos()?,
            };
            emit(&config, params, out)?;
        }
        Commands::Decode { hex, file, config } => {
            decode(hex, file, config)?;
        }
        Commands::Schedule {
            config,
            from,
            count,
        } => {
            let config = load_config(&config)?;
            for (turn, proposer) in schedule(&config.to_validators()?, from, count)? {
                println!("turn {:>10}  validator {}", turn, proposer);
            }
        }
        Commands::CheckTurn {
            last_turn,
            last_frame,
            next_turn,
            next_frame,
        } => {
            let last = ProposalSummary::new(last_turn, last_frame);
            let next = ProposalSummary::new(next_turn, next_frame);
            let valid = is_valid_turn_progression(last, next);
            println!(
                "turn {} at frame {} after turn {} at frame {}: {} (timeout {} frames)",
                next_turn,
                next_frame,
                last_turn,
                last_frame,
                if valid { "valid" } else { "invalid" },
                TURN_TIMEOUT_FRAMES
            );
        }
    }

    Ok(())
}

fn load_config(path: &Path) -> Result<ToolConfig> {
    if !path.exists() {
        return Err(anyhow!(
            "Configuration file not found: {}. Run 'weft init' to create one.",
            path.display()
        ));
    }
    info!("Loading configuration from {:?}", path);
    ToolConfig::load(path)
}

/// Initialize a new configuration file
fn init_config(output: &Path, validators: u32) -> Result<()> {
    if validators == 0 {
        return Err(anyhow!("at least one validator is required"));
    }
    let config = generate_sample_config(validators);
    config.save(output)?;
    info!("Configuration saved to {:?}", output);

    println!("\nConfiguration file created: {}", output.display());
    println!("Local validator: {}", config.validator_id.unwrap_or_default());
    println!("\nTo emit an event, run:");
    println!(
        "  weft emit --config {} --epoch 1 --frame 1 --lamport 1",
        output.display()
    );

    Ok(())
}

/// Generate a new keypair
fn generate_keypair(output: Option<PathBuf>) -> Result<()> {
    let keypair = KeyPair::generate();

    println!("Generated new keypair:");
    println!("  Public key:  {}", keypair.public.to_hex());
    println!("  Secret key:  {}", keypair.secret.to_hex());

    if let Some(path) = output {
        std::fs::write(&path, keypair.secret.to_hex())?;
        info!("Secret key saved to {:?}", path);
    }

    println!("\nWARNING: Keep your secret key safe! Do not share it with anyone.");

    Ok(())
}

fn emit(config_path: &Path, params: EmitParams, out: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let event = emit_event(&config, params)?;
    let bytes = event.encode()?;

    match out {
        Some(path) => {
            std::fs::write(&path, &bytes)?;
            println!("Event {} written to {}", event.id(), path.display());
        }
        None => {
            println!("id:    {}", event.id());
            println!("event: {}", hex::encode(&bytes));
        }
    }
    Ok(())
}

fn decode(
    hex_input: Option<String>,
    file: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<()> {
    let raw = match (hex_input, file) {
        (Some(s), _) => hex::decode(s.trim().trim_start_matches("0x"))?,
        (None, Some(path)) => std::fs::read(path)?,
        (None, None) => return Err(anyhow!("pass --hex or --file")),
    };
    let config = config.as_deref().map(load_config).transpose()?;

    let report = inspect_event(&raw, config.as_ref())?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn now_nanos() -> Result<u64> {
    let elapsed = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH)?;
    u64::try_from(elapsed.as_nanos()).map_err(|_| anyhow!("system time out of range"))
}
