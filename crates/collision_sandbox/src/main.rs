//! Collision sandbox
//!
//! Builds a small arena (walls, a rock and a pickup trigger), then flies a ship
//! with a turret child transform through it for a number of frames, logging
//! movement resolution and the turret's sight line.
//!
//! Usage: `collision_sandbox [config.toml|config.ron]`

mod config;

use engine2d::prelude::*;

use config::SandboxConfig;

/// Handles for everything the frame loop touches
struct Arena {
    tree: TransformTree,
    colliders: ColliderSet,
    ship: TransformId,
    turret: TransformId,
    ship_body: ColliderId,
    pickup: ColliderId,
}

impl Arena {
    fn build(config: &SandboxConfig) -> Result<Self, ShapeError> {
        let mut tree = TransformTree::new();
        let mut colliders = ColliderSet::with_config(config.physics.clone());

        let ship = tree.create_with(Vec2::new(-20.0, 0.0), 0.0, Vec2::new(1.0, 1.0));
        let turret = tree.create();
        tree.set_parent(turret, Some(ship));
        tree.set_local_position(turret, Vec2::new(1.5, 0.0));

        let hull = Shape::polygon(vec![
            Vec2::new(-1.0, -1.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(-1.0, 1.0),
        ])?;
        let ship_body = colliders.insert(
            Collider::new(hull)
                .with_transform(ship)
                .with_layers(PhysicsLayers::PLAYER, PhysicsLayers::ENVIRONMENT | PhysicsLayers::PICKUP),
        );

        for (center, width, height) in [
            (Vec2::new(0.0, 12.0), 60.0, 2.0),
            (Vec2::new(0.0, -12.0), 60.0, 2.0),
            (Vec2::new(14.0, 0.0), 2.0, 22.0),
        ] {
            colliders.insert(
                Collider::new(Shape::Box(BoxShape::at(center, width, height)))
                    .with_layers(PhysicsLayers::ENVIRONMENT, PhysicsLayers::all()),
            );
        }

        let mut rock = Polygon::regular(7, 3.0)?;
        rock.set_position(Vec2::new(2.0, 3.0));
        colliders.insert(
            Collider::new(Shape::Polygon(rock)).with_layers(PhysicsLayers::ENVIRONMENT, PhysicsLayers::all()),
        );

        let mut coin = Circle::new(1.0);
        coin.set_position(Vec2::new(-8.0, 0.0));
        let pickup = colliders.insert(
            Collider::new(Shape::Circle(coin))
                .with_layers(PhysicsLayers::PICKUP, PhysicsLayers::PLAYER)
                .as_trigger(),
        );

        colliders.sync_all(&mut tree);
        Ok(Self {
            tree,
            colliders,
            ship,
            turret,
            ship_body,
            pickup,
        })
    }

    fn step(&mut self, frame: u32, config: &SandboxConfig) {
        self.tree.rotate(self.ship, config.ship_turn_degrees.to_radians());
        let heading = self.tree.rotation(self.ship);
        let motion = Vec2::new(heading.cos(), heading.sin()) * config.ship_speed;

        let result = self.colliders.apply_movement(self.ship_body, motion, &mut self.tree);
        for contact in &result.hits {
            log::info!(
                "frame {frame}: ship blocked by {:?}, normal {:?}, depth {:.3}",
                contact.other,
                contact.hit.normal,
                contact.hit.depth()
            );
        }

        for change in self.colliders.sync_all(&mut self.tree) {
            log::debug!("frame {frame}: {:?} moved to {:?}", change.id, change.current);
        }

        if self
            .colliders
            .collisions_for(self.ship_body)
            .iter()
            .any(|contact| contact.other == self.pickup)
        {
            log::info!("frame {frame}: ship is over the pickup");
        }

        let origin = self.tree.position(self.turret);
        let facing = self.tree.rotation(self.turret);
        let sight_end = origin + Vec2::new(facing.cos(), facing.sin()) * config.sight_range;
        let layers = self.colliders.config().default_layers & !PhysicsLayers::PLAYER;
        match self.colliders.linecast(origin, sight_end, layers) {
            Some((id, hit)) => log::info!(
                "frame {frame}: turret sees {id:?} at {:.2} ({:.0}% of range)",
                hit.distance,
                hit.fraction * 100.0
            ),
            None => log::info!("frame {frame}: turret sees nothing"),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting collision sandbox");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading sandbox config from {path}");
            SandboxConfig::load_from_file(&path)?
        }
        None => SandboxConfig::default(),
    };
    log::debug!(
        "Spatial hash cell size {} (for an external index over registered regions)",
        config.physics.spatial_hash_cell_size
    );

    let mut arena = Arena::build(&config)?;
    for frame in 0..config.frames {
        arena.step(frame, &config);
    }

    let position = arena.tree.position(arena.ship);
    log::info!(
        "Sandbox finished after {} frames; ship at ({:.2}, {:.2}), {} transform rebuilds",
        config.frames,
        position.x,
        position.y,
        arena.tree.recalculation_count()
    );
    Ok(())
}
