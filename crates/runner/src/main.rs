//! Entry point: parses flags, dials the arena server over UDP, joins, and
//! runs the two halves of the bot for the life of the process: the ingest
//! task feeding the shared world state and the fixed-period planner loop
//! reading it. There is no shutdown path; termination is process exit.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use tokio::net::UdpSocket;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use maze_bot_core::agent::{Observation, PlannerConfig, TacticalPlanner, TargetPolicy};
use maze_bot_core::ingest::run_ingest;
use maze_bot_core::wire::Command;
use maze_bot_core::world::WorldState;

#[derive(Parser, Debug)]
#[command(name = "maze-bot", about = "Autonomous client for the maze-combat arena")]
struct Args {
    /// Server host.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port.
    #[arg(long, default_value_t = 11000)]
    port: u16,

    /// Display name; also decides which colored key counts as ours.
    #[arg(long, default_value = "mazebot")]
    name: String,

    /// Steady-state objective once ammo and health are satisfied.
    #[arg(long, default_value = "hunt-enemy")]
    policy: TargetPolicy,

    /// Planner tick period in milliseconds.
    #[arg(long = "tick-ms", default_value_t = 100)]
    tick_ms: u64,
}

/// Serializes intents onto the wire, fire and forget. A failed send is
/// logged and superseded by whatever the next tick decides.
struct CommandEmitter {
    socket: Arc<UdpSocket>,
}

impl CommandEmitter {
    async fn send(&self, cmd: &Command) {
        let frame = cmd.to_frame();
        if let Err(err) = self.socket.send(frame.as_bytes()).await {
            tracing::warn!("emitter.send.failed frame={frame} {err}");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);

    // Transport setup failures are the only fatal errors.
    let socket = UdpSocket::bind("0.0.0.0:0")
        .await
        .context("bind local udp socket")?;
    socket
        .connect(&addr)
        .await
        .with_context(|| format!("connect {addr}"))?;
    tracing::info!("runner.connected {addr}");

    let socket = Arc::new(socket);
    let world = Arc::new(Mutex::new(WorldState::new()));
    let emitter = CommandEmitter {
        socket: Arc::clone(&socket),
    };

    emitter
        .send(&Command::RequestJoin {
            name: args.name.clone(),
        })
        .await;

    tokio::spawn(run_ingest(Arc::clone(&socket), Arc::clone(&world)));

    let mut planner = TacticalPlanner::new(PlannerConfig {
        policy: args.policy,
        ..PlannerConfig::default()
    });

    let mut tick = tokio::time::interval(Duration::from_millis(args.tick_ms));
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tick.tick().await;
        let now = Instant::now();
        let obs = {
            let mut world = world.lock().await;
            world.expire_stale(now);
            Observation::from_world(&world)
        };
        for cmd in planner.tick(&obs, now) {
            emitter.send(&cmd).await;
        }
    }
}
