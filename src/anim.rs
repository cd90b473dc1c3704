//! Fall animation: after a collapse the grid already holds the new positions; this keeps
//! a per-brick display layer that glides from the old layer down to the new one.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use voxstack::{BrickId, Fall};

/// Time to fall one layer.
const MS_PER_LAYER: f32 = 70.0;

#[derive(Debug, Clone, Copy)]
struct Glide {
    from: f32,
    to: f32,
    started: Instant,
}

impl Glide {
    fn duration(&self) -> Duration {
        Duration::from_secs_f32((self.from - self.to).abs() * MS_PER_LAYER / 1000.0)
    }

    fn layer_at(&self, now: Instant) -> f32 {
        let total = self.duration().as_secs_f32();
        if total <= 0.0 {
            return self.to;
        }
        let t = (now.saturating_duration_since(self.started).as_secs_f32() / total).min(1.0);
        // Ease in: accelerate like gravity
        self.from + (self.to - self.from) * t * t
    }

    fn done(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration()
    }
}

#[derive(Debug, Default)]
pub struct FallAnimations {
    glides: HashMap<BrickId, Glide>,
}

impl FallAnimations {
    /// Start a glide. A brick still mid-air from an earlier cascade continues from where it is.
    pub fn push(&mut self, fall: Fall, now: Instant) {
        let from = self
            .glides
            .get(&fall.brick)
            .map_or(fall.from.layer as f32, |g| g.layer_at(now));
        self.glides.insert(
            fall.brick,
            Glide {
                from,
                to: fall.to_layer as f32,
                started: now,
            },
        );
    }

    /// Layer to draw `brick` at, if it is still falling.
    pub fn display_layer(&self, brick: BrickId, now: Instant) -> Option<f32> {
        self.glides.get(&brick).map(|g| g.layer_at(now))
    }

    pub fn prune(&mut self, now: Instant) {
        self.glides.retain(|_, g| !g.done(now));
    }

    pub fn clear(&mut self) {
        self.glides.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.glides.is_empty()
    }
}
