//! Headless demo running a small scene of steering agents

use std::error::Error;

use steering::core::SceneError;
use steering::prelude::*;

const TICKS: u32 = 600;
const DT: f32 = 1.0 / 60.0;
const SEED: u64 = 0x5eed;

fn build_scene() -> Scene {
    let mut scene = Scene::new("Demo");

    scene.add_obstacle(Body::new(Vec3::new(8.0, 1.0, 0.0), 1.5));
    scene.add_obstacle(Body::new(Vec3::new(-6.0, -4.0, 0.0), 1.0));
    scene.add_obstacle(Body::new(Vec3::new(2.0, -8.0, 0.0), 2.0));

    // arena, normals pointing inwards
    let corners = [
        Vec3::new(-20.0, -20.0, 0.0),
        Vec3::new(20.0, -20.0, 0.0),
        Vec3::new(20.0, 20.0, 0.0),
        Vec3::new(-20.0, 20.0, 0.0),
    ];
    for i in 0..corners.len() {
        scene.add_wall(WallSegment::new(corners[i], corners[(i + 1) % corners.len()]));
    }

    let evader = scene.add_agent(
        Agent::new(VehicleState::new(Vec3::new(5.0, 5.0, 0.0), 4.0, 6.0).with_velocity(Vec3::X))
            .with_name("Evader")
            .with_goals(Goals {
                wander: true,
                ..Default::default()
            }),
    );
    let pursuer = scene.add_agent(
        Agent::new(VehicleState::new(Vec3::new(-10.0, 0.0, 0.0), 4.5, 6.0))
            .with_name("Pursuer")
            .with_goals(Goals {
                pursue: Some(evader),
                ..Default::default()
            }),
    );
    scene.agents[evader].goals.evade = Some(pursuer);

    for (i, offset) in [Vec3::new(-2.0, 1.5, 0.0), Vec3::new(-2.0, -1.5, 0.0)]
        .into_iter()
        .enumerate()
    {
        scene.add_agent(
            Agent::new(VehicleState::new(Vec3::new(-14.0, 2.0 * i as f32, 0.0), 5.0, 8.0))
                .with_name(format!("Wing {i}"))
                .with_goals(Goals {
                    follow: Some((pursuer, offset)),
                    flock: true,
                    ..Default::default()
                }),
        );
    }

    for i in 0..6 {
        let angle = i as f32 / 6.0 * std::f32::consts::TAU;
        scene.add_agent(
            Agent::new(
                VehicleState::new(Vec3::new(angle.cos(), angle.sin(), 0.0) * 12.0, 2.0, 3.0)
                    .with_radius(0.3),
            )
            .with_name(format!("Wanderer {i}"))
            .with_goals(Goals {
                wander: true,
                flock: true,
                ..Default::default()
            }),
        );
    }

    scene.add_agent(
        Agent::new(VehicleState::new(Vec3::new(0.0, -15.0, 0.0), 3.0, 4.0))
            .with_name("Homing")
            .with_goals(Goals {
                arrive: Some(Vec3::new(0.0, 15.0, 0.0)),
                ..Default::default()
            }),
    );

    scene
}

/// Explicit Euler step
fn integrate(scene: &mut Scene, forces: &[Vec3], dt: f32) {
    for (agent, &force) in scene.agents.iter_mut().zip(forces) {
        let state = &mut agent.state;
        let velocity = (state.velocity + force * dt).truncated(state.max_speed);
        state.set_velocity(velocity);
        state.position += velocity * dt;
    }
}

fn run(config: SteeringConfig) -> Result<(), SceneError> {
    let mut scene = build_scene();
    let mut steering = scene.spawn_steering(&config, SEED);
    let mut grid = NeighbourGrid::new(config.perception_radius);
    let mut stats = TickStats::new();

    log::info!(
        "Running '{}' with {} agents for {TICKS} ticks",
        scene.name,
        scene.agent_count()
    );

    for tick in 1..=TICKS {
        let forces = scene.compute_forces(&mut steering, &mut grid)?;
        stats.record_tick(&forces, scene.agents.iter().map(|a| a.state.max_force));
        integrate(&mut scene, &forces, DT);

        if tick % 60 == 0 {
            log::info!("{}", stats.format_stats());
        }
    }

    for agent in &scene.agents {
        log::info!(
            "{:>12}: position {:.2}, speed {:.2}",
            agent.name.as_deref().unwrap_or("?"),
            agent.state.position,
            agent.state.speed()
        );
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // Optional config file as first argument
    let config = match std::env::args().nth(1) {
        Some(path) if path.ends_with(".json") => SteeringConfig::load_json(&path)?,
        Some(path) => SteeringConfig::load_ron(&path)?,
        None => SteeringConfig::default(),
    };

    run(config)?;
    Ok(())
}
