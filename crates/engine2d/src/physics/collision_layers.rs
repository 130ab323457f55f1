//! Physics layers for filtering collision and cast queries
//!
//! Every collider sits on one or more layers and carries a mask of the layers
//! it reacts to. Two colliders interact only when each one's layer is in the
//! other's mask.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Layer bits; the named constants cover common game roles and the
    /// remaining bits are free for the game to assign
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct PhysicsLayers: u32 {
        /// Player characters
        const PLAYER = 1 << 0;
        /// Enemy characters
        const ENEMY = 1 << 1;
        /// Projectiles (bullets, missiles, etc.)
        const PROJECTILE = 1 << 2;
        /// Static level geometry
        const ENVIRONMENT = 1 << 3;
        /// Trigger volumes
        const TRIGGER = 1 << 4;
        /// Pickups and collectibles
        const PICKUP = 1 << 5;

        // User-defined layers
        const _ = !0;
    }
}

impl Default for PhysicsLayers {
    fn default() -> Self {
        Self::all()
    }
}

impl PhysicsLayers {
    /// Layer for a single user bit (0..32)
    pub fn bit(index: u32) -> Self {
        Self::from_bits_retain(1_u32.checked_shl(index).unwrap_or(0))
    }

    /// Check if two colliders should interact based on their layers and masks
    ///
    /// # Example
    /// ```
    /// use engine2d::physics::PhysicsLayers;
    ///
    /// let hits = PhysicsLayers::should_collide(
    ///     PhysicsLayers::PLAYER, PhysicsLayers::ENEMY | PhysicsLayers::ENVIRONMENT,
    ///     PhysicsLayers::ENEMY, PhysicsLayers::PLAYER,
    /// );
    /// assert!(hits);
    /// ```
    pub fn should_collide(
        layer_a: PhysicsLayers,
        mask_a: PhysicsLayers,
        layer_b: PhysicsLayers,
        mask_b: PhysicsLayers,
    ) -> bool {
        // A's layer must be in B's mask AND B's layer must be in A's mask
        mask_b.intersects(layer_a) && mask_a.intersects(layer_b)
    }
}
