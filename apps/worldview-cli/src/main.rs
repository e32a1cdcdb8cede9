mod demo;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use worldview_common::Ray;
use worldview_input::{Action, FrameInput, LookDelta, MoveInput};
use worldview_stream::TileCoord;
use worldview_terrain::{ProceduralTerrain, TerrainParams};
use worldview_viewer::{TerrainViewer, ViewerConfig};

/// Simulated frame length (60 Hz).
const FRAME: Duration = Duration::from_micros(16_667);

#[derive(Parser)]
#[command(name = "worldview-cli", about = "Drive the worldview streaming core headless")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML file overriding viewer and terrain settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Terrain and scene seed
    #[arg(short, long, global = true)]
    seed: Option<u32>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate versions
    Info,
    /// Stream around a fixed tile until the neighbourhood is resident
    Stream {
        #[arg(long, default_value = "10")]
        tile_x: i32,
        #[arg(long, default_value = "10")]
        tile_z: i32,
        /// Give up after this many frames
        #[arg(long, default_value = "600")]
        max_frames: u32,
    },
    /// Jump the viewpoint between two tiles and trace residency per frame
    Jump {
        #[arg(long, value_parser = parse_tile, default_value = "0,0")]
        from: TileCoord,
        #[arg(long, value_parser = parse_tile, default_value = "15,15")]
        to: TileCoord,
        /// Frames to trace after the jump
        #[arg(long, default_value = "90")]
        frames: u32,
    },
    /// Cast a ray straight down at a world point and print what it selects
    Pick {
        #[arg(long)]
        x: f32,
        #[arg(long)]
        z: f32,
    },
    /// Fly with a fixed input and report where streaming and LOD ended up
    Fly {
        #[arg(long, default_value = "10")]
        seconds: f32,
        /// Heading in degrees, 0 = +X
        #[arg(long, default_value = "0")]
        heading: f32,
        #[arg(long)]
        boost: bool,
        /// Number of demo settlements
        #[arg(long, default_value = "6")]
        settlements: usize,
    },
}

/// Settings file layout: viewer settings at the top level plus a `terrain` section.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct AppConfig {
    #[serde(flatten)]
    viewer: ViewerConfig,
    terrain: TerrainParams,
}

fn parse_tile(s: &str) -> Result<TileCoord, String> {
    let (x, z) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Z, got {s:?}"))?;
    let x = x.trim().parse().map_err(|e| format!("bad X: {e}"))?;
    let z = z.trim().parse().map_err(|e| format!("bad Z: {e}"))?;
    Ok(TileCoord::new(x, z))
}

fn load_config(path: Option<&Path>, seed: Option<u32>) -> anyhow::Result<AppConfig> {
    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => AppConfig::default(),
    };
    if let Some(seed) = seed {
        config.terrain.seed = seed;
    }
    Ok(config)
}

fn build_viewer(config: &AppConfig) -> anyhow::Result<TerrainViewer<ProceduralTerrain>> {
    let terrain = ProceduralTerrain::new(config.terrain.clone());
    TerrainViewer::new(config.viewer.clone(), terrain).context("building viewer")
}

/// Centre of a tile at a comfortable altitude.
fn tile_center(tile: TileCoord, tile_size: f32) -> Vec3 {
    let origin = tile.origin(tile_size);
    Vec3::new(origin.x + tile_size * 0.5, 150.0, origin.y + tile_size * 0.5)
}

/// Run idle frames until nothing is queued or `max_frames` is reached.
fn settle(viewer: &mut TerrainViewer<ProceduralTerrain>, max_frames: u32) -> u32 {
    let idle = FrameInput::default();
    for frame in 1..=max_frames {
        viewer.frame(FRAME, &idle);
        if !viewer.metrics().is_loading() {
            return frame;
        }
    }
    max_frames
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_deref(), cli.seed)?;
    let tile_size = config.viewer.stream.bounds.tile_size;

    match cli.command {
        Commands::Info => {
            println!("worldview-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", worldview_common::crate_info());
            println!("terrain: {}", worldview_terrain::crate_info());
            println!("stream: {}", worldview_stream::crate_info());
            println!("lod: {}", worldview_lod::crate_info());
            println!("select: {}", worldview_select::crate_info());
            println!("input: {}", worldview_input::crate_info());
            println!("camera: {}", worldview_camera::crate_info());
            println!("viewer: {}", worldview_viewer::crate_info());
        }
        Commands::Stream {
            tile_x,
            tile_z,
            max_frames,
        } => {
            let mut viewer = build_viewer(&config)?;
            let tile = TileCoord::new(tile_x, tile_z);
            viewer.camera_mut().teleport(tile_center(tile, tile_size));
            let frames = settle(&mut viewer, max_frames);
            let cost = viewer.streamer().generation_cost();
            if cli.json {
                print_json(&viewer.summary())?;
            } else {
                println!("Streaming at tile {tile}: settled after {frames} frames");
                println!("{}", viewer.summary());
                println!(
                    "Generation cost: avg {:?}, worst {:?} over {} tiles; water tiles {}",
                    cost.average(),
                    cost.max(),
                    cost.count(),
                    viewer.metrics().water_tiles
                );
            }
        }
        Commands::Jump { from, to, frames } => {
            let mut viewer = build_viewer(&config)?;
            let load = config.viewer.stream.load_radius;
            let bounds = config.viewer.stream.bounds;
            let near = |center: TileCoord, viewer: &TerrainViewer<ProceduralTerrain>| {
                viewer
                    .streamer()
                    .tiles()
                    .filter(|t| t.coord().chebyshev(center) <= load)
                    .count()
            };

            viewer.camera_mut().teleport(tile_center(from, tile_size));
            let warmup = settle(&mut viewer, 2000);
            let old_square = worldview_stream::tiles_in_radius(from, load, bounds).count();
            println!(
                "Warm at {from}: {} resident after {warmup} frames",
                viewer.metrics().resident_tiles
            );

            viewer.camera_mut().teleport(tile_center(to, tile_size));
            let idle = FrameInput::default();
            let mut rows = Vec::new();
            for _ in 0..frames {
                let report = viewer.frame(FRAME, &idle);
                let row = JumpRow {
                    frame: report.frame,
                    resident: viewer.metrics().resident_tiles,
                    near_old: near(from, &viewer),
                    near_new: near(to, &viewer),
                    generated: report.stream.generated.len(),
                    evicted: report.stream.evicted.len(),
                    queued: viewer.metrics().queue_depth,
                };
                if !cli.json {
                    println!(
                        "frame {:>4}: resident={:>3} old={:>3}/{old_square} new={:>3} +{} -{} queued={}",
                        row.frame,
                        row.resident,
                        row.near_old,
                        row.near_new,
                        row.generated,
                        row.evicted,
                        row.queued
                    );
                }
                rows.push(row);
            }
            if cli.json {
                print_json(&rows)?;
            }
        }
        Commands::Pick { x, z } => {
            let mut viewer = build_viewer(&config)?;
            let foundation = demo::demo_foundation(
                u64::from(config.terrain.seed),
                6,
                &config.viewer.stream.bounds,
                viewer.sampler(),
            );
            viewer.load_foundation(&foundation)?;
            viewer.camera_mut().teleport(Vec3::new(x, 150.0, z));
            settle(&mut viewer, 2000);

            let ray = Ray::new(Vec3::new(x, 10_000.0, z), Vec3::NEG_Y);
            let selection = viewer.pick(&ray);
            if cli.json {
                print_json(&selection)?;
            } else {
                match selection {
                    Some(result) => println!("{result:#?}"),
                    None => println!("Nothing at ({x}, {z}): deselect"),
                }
            }
        }
        Commands::Fly {
            seconds,
            heading,
            boost,
            settlements,
        } => {
            let mut viewer = build_viewer(&config)?;
            let foundation = demo::demo_foundation(
                u64::from(config.terrain.seed),
                settlements,
                &config.viewer.stream.bounds,
                viewer.sampler(),
            );
            viewer.load_foundation(&foundation)?;
            viewer.apply(Action::CapturePointer(true));
            viewer.camera_mut().set_orientation(heading.to_radians(), 0.0);

            let input = FrameInput {
                movement: MoveInput {
                    forward: true,
                    boost,
                    ..MoveInput::default()
                },
                look: LookDelta::default(),
                click: None,
            };
            let frames = (seconds.max(0.0) / FRAME.as_secs_f32()).round() as u32;
            let mut switches = 0;
            for _ in 0..frames {
                switches += viewer.frame(FRAME, &input).lod.switched;
            }
            viewer.apply(Action::Click(Vec2::ZERO));
            viewer.apply(Action::CapturePointer(false));

            if cli.json {
                print_json(&viewer.summary())?;
            } else {
                println!("Flew {seconds}s ({frames} frames), {switches} LOD switches");
                println!("{}", viewer.summary());
            }
        }
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct JumpRow {
    frame: u64,
    resident: usize,
    near_old: usize,
    near_new: usize,
    generated: usize,
    evicted: usize,
    queued: usize,
}
