use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use wayfinder::config::{PathfindingSettings, load_settings, save_settings};
use wayfinder::pathfinding::{FollowState, PathfindingBehavior, move_to_in_world};
use wayfinder::scenario::Scenario;
use wayfinder::{PathfindingPlugin, PathfindingResult, SceneObject};

#[derive(Parser, Clone)]
#[command(name = "wayfinder")]
#[command(about = "Plan and follow a grid path through a TOML scenario")]
struct Args {
    /// Scenario file (mover, destination, obstacles, optional behavior overrides)
    scenario: PathBuf,

    /// Settings file to use instead of the user configuration
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Step the follower for this many frames after planning
    #[arg(long)]
    simulate: Option<u32>,

    /// Frame duration in milliseconds for --simulate
    #[arg(long, default_value = "16")]
    frame_ms: u64,

    /// Write the effective settings to the user configuration
    #[arg(long)]
    save_settings: bool,

    /// Log search details
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> PathfindingResult<()> {
    let args = Args::parse();

    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        LogPlugin {
            level: if args.verbose { Level::DEBUG } else { Level::INFO },
            ..default()
        },
        PathfindingPlugin,
    ))
    .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(
        args.frame_ms,
    )));

    let settings = match &args.settings {
        Some(path) => {
            let settings = PathfindingSettings::load_from_file(path)?;
            info!("Loaded pathfinding settings from {}", path.display());
            settings
        }
        None => load_settings(),
    };
    if args.save_settings {
        save_settings(&settings)?;
        info!("Saved pathfinding settings");
    }
    app.insert_resource(settings);

    let scenario = Scenario::load(&args.scenario)?;
    info!(
        "Scenario {} with {} obstacles",
        args.scenario.display(),
        scenario.obstacles.len()
    );

    let mover = scenario.spawn(app.world_mut(), &settings);
    let destination = scenario.destination;
    let found = move_to_in_world(app.world_mut(), mover, destination.x, destination.y)?;

    let behavior = app
        .world()
        .get::<PathfindingBehavior>(mover)
        .cloned()
        .unwrap_or_default();
    if !found {
        println!("No path to ({}, {})", destination.x, destination.y);
        return Ok(());
    }

    println!("Path with {} waypoints:", behavior.node_count());
    for (index, node) in behavior.path().iter().enumerate() {
        println!("  {index:3}: ({}, {})", node.x, node.y);
    }

    if let Some(frames) = args.simulate {
        // The first update only starts the clock
        app.update();
        let mut elapsed_frames = 0;
        while elapsed_frames < frames {
            app.update();
            elapsed_frames += 1;
            let arrived = app
                .world()
                .get::<PathfindingBehavior>(mover)
                .is_some_and(|behavior| behavior.destination_reached());
            if arrived {
                break;
            }
        }

        let world = app.world();
        let object = world.get::<SceneObject>(mover).copied().unwrap_or_default();
        let state = world
            .get::<PathfindingBehavior>(mover)
            .map_or(FollowState::NoPath, |behavior| behavior.follow_state());
        println!(
            "After {elapsed_frames} frames: position ({:.2}, {:.2}), angle {:.1}, {}",
            object.position.x,
            object.position.y,
            object.angle,
            match state {
                FollowState::Arrived => "arrived".to_string(),
                FollowState::OnSegment(segment) => format!("on segment {segment}"),
                FollowState::NoPath => "no path".to_string(),
            }
        );
    }

    Ok(())
}
