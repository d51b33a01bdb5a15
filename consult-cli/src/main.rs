use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use consult::LaunchParams;
use consult::client::{
    CallHandle, CallServices, CallStatus, ClientConfig, HttpRelay, MediaQuality, RtcPeerFactory,
    StatusSnapshot, SyntheticCapture,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "consult")]
#[command(about = "Video-consultation call client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Quality {
    High,
    Basic,
}

impl From<Quality> for MediaQuality {
    fn from(q: Quality) -> Self {
        match q {
            Quality::High => MediaQuality::High,
            Quality::Basic => MediaQuality::Basic,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Join a consultation room and stay in the call until Ctrl-C.
    Join {
        #[arg(long)]
        room: String,

        /// This side created the room and sends the offers.
        #[arg(long)]
        initiator: bool,

        #[arg(long)]
        admin: bool,

        /// Join without camera or microphone (administrators only).
        #[arg(long)]
        no_media: bool,

        #[arg(long, value_enum)]
        quality: Option<Quality>,

        #[arg(long, env = "CONSULT_RELAY_URL")]
        relay_url: Option<String>,

        #[arg(long, env = "CONSULT_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Join {
            room,
            initiator,
            admin,
            no_media,
            quality,
            relay_url,
            config,
        } => {
            let mut config = ClientConfig::load(config.as_deref())
                .context("Failed to load configuration")?;
            if let Some(url) = relay_url {
                config.relay_url = url;
            }
            if let Some(quality) = quality {
                config.preferred_quality = quality.into();
            }
            config.validate().context("Invalid configuration")?;

            let params = LaunchParams::new(room.as_str(), initiator)
                .admin(admin)
                .no_media(no_media);
            run_call(params, config).await?;
        }
    }

    Ok(())
}

async fn run_call(params: LaunchParams, config: ClientConfig) -> Result<()> {
    let relay = HttpRelay::new(config.relay_url.clone(), config.http_timeout())
        .context("Failed to create relay client")?;
    let services = CallServices {
        peers: Arc::new(RtcPeerFactory::new(config.ice_servers.clone())),
        relay: Arc::new(relay),
        capture: Arc::new(SyntheticCapture::default()),
    };

    println!(
        "{} room {} as {}",
        "📞 Joining".green().bold(),
        params.room_id.as_str().bold(),
        params.role()
    );

    let call = CallHandle::start(params, config, services);
    let mut status = call.subscribe();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("{}", "Hanging up...".yellow());
                call.hang_up().await;
                break;
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = status.borrow_and_update().clone();
                print_status(&snapshot);
                if snapshot.status.is_final() {
                    break;
                }
            }
        }
    }

    call.join().await.context("Call ended with an error")?;
    println!("{}", "✨ Call ended".green().bold());
    Ok(())
}

fn print_status(snapshot: &StatusSnapshot) {
    let text = snapshot.status.to_string();
    let line = match &snapshot.status {
        CallStatus::Connected => text.green().bold(),
        CallStatus::Reconnecting => text.yellow(),
        CallStatus::Failed(_) => text.red().bold(),
        _ => text.cyan(),
    };
    println!(
        "{}  [{} / {}, remote tracks: {}]",
        line, snapshot.negotiation, snapshot.connectivity, snapshot.remote_tracks
    );
}
