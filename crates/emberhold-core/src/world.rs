//! The shared colony world: fact store, resource registry, build site, and
//! active threats.
//!
//! Everything here is an explicitly constructed context object passed by
//! reference from the simulation driver; there is no process-wide state.

use goap_core::FactStore;
use serde::{Deserialize, Serialize};

use crate::resources::ResourceRegistry;

/// Flat 2-D point. The least geometry the mover and spatial queries need;
/// anything richer belongs to the host engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance_to(self, other: Position) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Step from `self` toward `target` by at most `step`, landing exactly
    /// on the target once within reach.
    pub fn moved_toward(self, target: Position, step: f32) -> Position {
        let distance = self.distance_to(target);
        if distance <= step || distance == 0.0 {
            return target;
        }
        let scale = step / distance;
        Position {
            x: self.x + (target.x - self.x) * scale,
            y: self.y + (target.y - self.y) * scale,
        }
    }

    /// The point `distance` away from `self` along the direction facing away
    /// from `threat`. Falls back to an arbitrary fixed direction when the
    /// two coincide.
    pub fn away_from(self, threat: Position, distance: f32) -> Position {
        let length = self.distance_to(threat);
        if length == 0.0 {
            return Position::new(self.x + distance, self.y);
        }
        let scale = distance / length;
        Position {
            x: self.x + (self.x - threat.x) * scale,
            y: self.y + (self.y - threat.y) * scale,
        }
    }
}

/// A hostile presence agents flee from, expiring after a few ticks.
#[derive(Debug, Clone, Copy)]
struct Threat {
    position: Position,
    remaining_ticks: u32,
}

/// The shared world: facts, resources, and the build site every delivery
/// converges on.
#[derive(Debug)]
pub struct Colony {
    pub facts: FactStore,
    pub resources: ResourceRegistry,
    build_site: Position,
    threats: Vec<Threat>,
}

impl Colony {
    pub fn new(build_site: Position) -> Self {
        Self {
            facts: FactStore::new(),
            resources: ResourceRegistry::new(),
            build_site,
            threats: Vec::new(),
        }
    }

    pub fn build_site(&self) -> Position {
        self.build_site
    }

    pub fn add_threat(&mut self, position: Position, remaining_ticks: u32) {
        self.threats.push(Threat {
            position,
            remaining_ticks,
        });
    }

    pub fn has_threats(&self) -> bool {
        !self.threats.is_empty()
    }

    pub fn nearest_threat(&self, from: Position) -> Option<Position> {
        self.threats
            .iter()
            .min_by(|a, b| {
                from.distance_squared(a.position)
                    .total_cmp(&from.distance_squared(b.position))
            })
            .map(|threat| threat.position)
    }

    /// Advance threat lifetimes by one tick, dropping expired ones.
    pub fn decay_threats(&mut self) {
        for threat in &mut self.threats {
            threat.remaining_ticks = threat.remaining_ticks.saturating_sub(1);
        }
        self.threats.retain(|threat| threat.remaining_ticks > 0);
    }
}
