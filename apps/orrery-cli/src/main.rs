use std::path::{Path, PathBuf};

use anyhow::{Context, ensure};
use clap::{Parser, Subcommand};
use glam::DVec3;
use orrery_bubble::{BubbleConfig, BubblePartition};
use orrery_destiny::{decode_update, hex_dump};
use orrery_kernel::{
    DynamicEntity, ItemRecord, KinematicController, Scene, SceneConfig, SystemEntity,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "orrery-cli", about = "CLI tool for orrery scene and Destiny operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON file with `scene` and `bubble` settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Encode one ship as an add-ball update and dump it
    Encode {
        /// Inventory record as JSON; overrides the record flags below
        #[arg(long)]
        item: Option<PathBuf>,
        #[arg(long, default_value = "140000001")]
        id: u32,
        #[arg(long, default_value = "Rook")]
        name: String,
        #[arg(long, default_value = "50.0")]
        radius: f64,
        /// Position as x,y,z
        #[arg(long, value_delimiter = ',', default_value = "0,0,0")]
        position: Vec<f64>,
        /// Put the ship in warp toward x,y,z
        #[arg(long, value_delimiter = ',')]
        warp_to: Option<Vec<f64>>,
        /// Update sequence number
        #[arg(short, long, default_value = "1")]
        sequence: u32,
        /// Print the decoded ball as JSON as well
        #[arg(long)]
        json: bool,
    },
    /// Run a demo scene and report bubbles and add-balls
    Tick {
        /// Number of ships to spawn
        #[arg(short, long, default_value = "5")]
        ships: u32,
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "10")]
        ticks: u64,
    },
}

/// Settings loadable with `--config`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Settings {
    scene: SceneConfig,
    bubble: BubbleConfig,
}

impl Settings {
    fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

fn vec3(values: &[f64], what: &str) -> anyhow::Result<DVec3> {
    ensure!(
        values.len() == 3,
        "{what} needs exactly three comma-separated values, got {}",
        values.len()
    );
    Ok(DVec3::new(values[0], values[1], values[2]))
}

fn load_item(path: &Path) -> anyhow::Result<ItemRecord> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading item {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing item {}", path.display()))
}

fn demo_ship(index: u32) -> SystemEntity {
    let id = 140_000_000 + index;
    let position = DVec3::new(f64::from(index) * 150_000.0, 0.0, 0.0);
    let item = ItemRecord {
        radius: 40.0,
        position,
        mass: 1.2e6,
        max_velocity: 120_000.0,
        agility: 3.2,
        shield_capacity: 450.0,
        armor_hp: 350.0,
        hull_hp: 300.0,
        ..ItemRecord::new(id, 587, format!("Demo Ship {index}"))
    }
    .into_ref();
    let mut physics = KinematicController::new(position, item.max_velocity());
    if index % 2 == 1 {
        physics.goto(position + DVec3::new(0.0, 0.0, 1_000_000.0));
    }
    SystemEntity::dynamic(item, Box::new(physics))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Info => {
            println!("orrery-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", orrery_common::crate_info());
            println!("destiny: {}", orrery_destiny::crate_info());
            println!("kernel: {}", orrery_kernel::crate_info());
            println!("bubble: {}", orrery_bubble::crate_info());
            println!(
                "config: tick={}s, bubble={}m, live_velocity={}",
                settings.scene.tick_seconds,
                settings.bubble.bubble_size,
                settings.scene.ball.live_velocity
            );
        }
        Commands::Encode {
            item,
            id,
            name,
            radius,
            position,
            warp_to,
            sequence,
            json,
        } => {
            let record = match item {
                Some(path) => load_item(&path)?,
                None => ItemRecord {
                    radius,
                    position: vec3(&position, "--position")?,
                    ..ItemRecord::new(id, 587, name)
                },
            };
            let mut physics = KinematicController::new(record.position, record.max_velocity);
            if let Some(target) = warp_to {
                physics.warp_to(vec3(&target, "--warp-to")?);
            }
            let entity = DynamicEntity::new(Some(record.into_ref()), Some(Box::new(physics)));

            let msg = entity.make_add_ball(sequence, &settings.scene.ball);
            println!("add-ball seq={sequence}: {} bytes", msg.destiny_binary.len());
            println!("{}", hex_dump(&msg.destiny_binary));
            println!("slim: {}", serde_json::to_string(&msg.slim)?);
            for (id, damage) in &msg.damages {
                println!("damage[{id}]: {}", serde_json::to_string(&damage.wire_tuple())?);
            }

            let (envelope, ball) =
                decode_update(&msg.destiny_binary).context("decoding add-ball")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&ball)?);
            } else {
                println!(
                    "decoded: more={} seq={} id={} mode={:?} name={:?}",
                    envelope.more, envelope.sequence, ball.id, ball.mode, ball.name
                );
            }
        }
        Commands::Tick { ships, ticks } => {
            println!("Demo scene: {ships} ships, {ticks} ticks");

            let mut scene = Scene::new(settings.scene);
            for i in 0..ships {
                scene.add(demo_ship(i))?;
            }
            let mut bubbles = BubblePartition::new(settings.bubble)?;
            bubbles.rebuild(&mut scene);
            println!("Start: bubbles={}", bubbles.bubble_count());

            for _ in 0..ticks {
                scene.step();
                bubbles.rebuild(&mut scene);
            }

            println!(
                "End: tick={}, entities={}, bubbles={}",
                scene.tick(),
                scene.entity_count(),
                bubbles.bubble_count()
            );
            for (id, entity) in scene.entities() {
                let p = entity.position();
                let bubble = entity
                    .bubble()
                    .map_or_else(|| "-".to_string(), |b| b.to_string());
                println!(
                    "  {id} {:?} at ({:.0}, {:.0}, {:.0}) in {bubble}",
                    entity.name(),
                    p.x,
                    p.y,
                    p.z
                );
            }

            let msgs = scene.make_add_balls(1);
            let total: usize = msgs.iter().map(|m| m.destiny_binary.len()).sum();
            println!("Add-balls: {} messages, {total} bytes", msgs.len());
        }
    }

    Ok(())
}
