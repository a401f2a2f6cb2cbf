use std::{net::SocketAddr, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{load_settings, InputRecord, MatrixClient};
use serde_json::{json, Value};
use shared::{domain::DEFAULT_PORT, wire::WireEncoding};
use tokio::net::UdpSocket;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Drive a UDP controlled RGB LED matrix")]
struct Cli {
    /// Instance defaults file; missing files are ignored.
    #[arg(long, default_value = client_core::defaults::SETTINGS_FILE)]
    settings: PathBuf,
    #[arg(long)]
    ip: Option<String>,
    #[arg(long)]
    port: Option<u16>,
    #[arg(long)]
    encoding: Option<WireEncoding>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build one command from flags and send it.
    Send(SendArgs),
    /// Decode and log datagrams, standing in for a panel.
    Listen {
        #[arg(long, default_value_t = SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))]
        bind: SocketAddr,
    },
}

#[derive(Args, Debug, Default)]
struct SendArgs {
    /// Text to display; selects the text command.
    text: Option<String>,
    #[arg(short, long)]
    segment: Option<i64>,
    #[arg(short, long)]
    color: Option<String>,
    #[arg(long)]
    bgcolor: Option<String>,
    #[arg(short, long)]
    font: Option<String>,
    #[arg(long)]
    size: Option<String>,
    #[arg(short, long)]
    align: Option<String>,
    #[arg(short, long)]
    effect: Option<String>,
    #[arg(long)]
    intensity: Option<i64>,
    /// Segment number to clear, or "all".
    #[arg(long)]
    clear: Option<String>,
    #[arg(long)]
    clear_all: bool,
    #[arg(short, long)]
    brightness: Option<i64>,
    #[arg(long)]
    layout: Option<i64>,
    #[arg(long)]
    orientation: Option<String>,
    #[arg(long)]
    group: Option<i64>,
    /// Group members, comma separated.
    #[arg(long, value_delimiter = ',')]
    segments: Vec<i64>,
    /// Reconfigure the segment geometry from --x/--y/--w/--h.
    #[arg(long)]
    configure: bool,
    #[arg(long)]
    x: Option<i64>,
    #[arg(long)]
    y: Option<i64>,
    #[arg(long)]
    w: Option<i64>,
    #[arg(long)]
    h: Option<i64>,
    /// Complete JSON command object sent as is.
    #[arg(long)]
    raw: Option<String>,
}

impl SendArgs {
    fn into_record(self) -> Result<InputRecord> {
        let mut record = InputRecord::new();

        if let Some(raw) = self.raw {
            match serde_json::from_str::<Value>(&raw).context("--raw must be JSON")? {
                Value::Object(map) => record.extend(map),
                _ => bail!("--raw must be a JSON object"),
            }
        }

        let mut put = |key: &str, value: Option<Value>| {
            if let Some(value) = value {
                record.insert(key.to_string(), value);
            }
        };
        put("text", self.text.map(Value::from));
        put("segment", self.segment.map(Value::from));
        put("color", self.color.map(Value::from));
        put("bgcolor", self.bgcolor.map(Value::from));
        put("font", self.font.map(Value::from));
        put("size", self.size.map(Value::from));
        put("align", self.align.map(Value::from));
        put("effect", self.effect.map(Value::from));
        put("intensity", self.intensity.map(Value::from));
        put("brightness", self.brightness.map(Value::from));
        put("layout", self.layout.map(Value::from));
        put("orientation", self.orientation.map(Value::from));
        put("group", self.group.map(Value::from));
        put("x", self.x.map(Value::from));
        put("y", self.y.map(Value::from));
        put("w", self.w.map(Value::from));
        put("h", self.h.map(Value::from));
        put(
            "segments",
            (!self.segments.is_empty()).then(|| Value::from(self.segments)),
        );
        put("config", self.configure.then(|| json!(true)));
        put(
            "clear",
            if self.clear_all {
                Some(json!("all"))
            } else {
                self.clear.map(Value::from)
            },
        );

        Ok(record)
    }
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
        Command::Send(args) => {
            let mut defaults = load_settings(Some(&cli.settings));
            if cli.ip.is_some() {
                defaults.ip = cli.ip;
            }
            if cli.port.is_some() {
                defaults.port = cli.port;
            }
            if cli.encoding.is_some() {
                defaults.encoding = cli.encoding;
            }
            send(defaults, args).await
        }
        Command::Listen { bind } => listen(bind).await,
    }
}

async fn send(defaults: client_core::InstanceDefaults, args: SendArgs) -> Result<()> {
    let record = args.into_record()?;
    let client = MatrixClient::new(defaults);
    let outcome = client.dispatch(&record).await;
    client.close().await;

    match outcome {
        Ok(dispatched) => {
            println!("{}", serde_json::to_string(&dispatched)?);
            Ok(())
        }
        Err(error) => bail!("{}: {error}", error.code().label()),
    }
}

async fn listen(bind: SocketAddr) -> Result<()> {
    let socket = UdpSocket::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!(%bind, "listening for matrix commands");

    let mut buf = vec![0u8; 4096];
    loop {
        tokio::select! {
            received = socket.recv_from(&mut buf) => {
                let (len, from) = received.context("udp receive failed")?;
                match shared::wire::decode(&buf[..len]) {
                    Ok(command) => info!(
                        %from,
                        kind = %command.kind(),
                        command = %serde_json::to_string(&command)?,
                        "received"
                    ),
                    Err(error) => warn!(%from, %error, "undecodable datagram"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                return Ok(());
            }
        }
    }
}
