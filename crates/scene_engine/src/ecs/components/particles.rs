//! Particle emitter component
//!
//! Particles are simulated in world space from the owning entity's position at
//! emission time. The live array never exceeds `max_particles`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::ecs::component::{AttachContext, Component, ComponentKind, ComponentSlots};
use crate::foundation::math::Vec3;

/// A single live particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// World-space position
    pub position: Vec3,
    /// Velocity in units per second
    pub velocity: Vec3,
    /// Seconds since emission
    pub age: f32,
    /// Age at which the particle is removed
    pub lifetime: f32,
    /// Display size, shrinking from 1 to 0 over the lifetime
    pub size: f32,
}

impl Particle {
    /// Whether the particle is still within its lifetime
    pub fn is_alive(&self) -> bool {
        self.age < self.lifetime
    }
}

/// Bounded particle emitter
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    /// Cap on live particles
    pub max_particles: usize,
    /// Particles per second while emitting
    pub emission_rate: f32,
    /// Lifetime given to new particles, seconds
    pub lifetime: f32,
    /// Velocity scale for new particles
    pub speed: f32,
    /// Continuous emission on each update
    pub emitting: bool,
    /// Whether the component is active
    pub enabled: bool,
    rng: StdRng,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self {
            particles: Vec::new(),
            max_particles: 1000,
            emission_rate: 50.0,
            lifetime: 2.0,
            speed: 5.0,
            emitting: true,
            enabled: true,
            rng: StdRng::from_entropy(),
        }
    }
}

impl ParticleSystem {
    /// Emitter with default parameters and an entropy-seeded generator
    pub fn new() -> Self {
        Self::default()
    }

    /// Emitter with a reproducible generator
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Default::default()
        }
    }

    /// Builder pattern: set continuous emission
    pub fn with_emitting(mut self, emitting: bool) -> Self {
        self.emitting = emitting;
        self
    }

    /// Builder pattern: set particle lifetime
    pub fn with_lifetime(mut self, lifetime: f32) -> Self {
        self.lifetime = lifetime.max(0.0);
        self
    }

    /// Builder pattern: set capacity
    pub fn with_max_particles(mut self, max_particles: usize) -> Self {
        self.max_particles = max_particles;
        self
    }

    /// Replace the generator seed
    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Live particles
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of live particles
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Remove every live particle
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Spawn up to `count` particles at `origin`; returns how many were spawned
    pub fn emit(&mut self, count: usize, origin: Vec3) -> usize {
        let available = self.max_particles.saturating_sub(self.particles.len());
        let spawned = count.min(available);

        for _ in 0..spawned {
            let velocity = Vec3::new(
                (self.rng.gen::<f32>() - 0.5) * self.speed,
                self.rng.gen::<f32>() * self.speed,
                (self.rng.gen::<f32>() - 0.5) * self.speed,
            );
            self.particles.push(Particle {
                position: origin,
                velocity,
                age: 0.0,
                lifetime: self.lifetime,
                size: 1.0,
            });
        }

        spawned
    }

    /// Emit for this step if continuous, then age, move, shrink and cull
    pub fn update(&mut self, delta_time: f32, origin: Vec3) {
        if self.emitting {
            let count = (self.emission_rate * delta_time).max(0.0).ceil() as usize;
            self.emit(count, origin);
        }

        for particle in &mut self.particles {
            particle.age += delta_time;
            particle.position += particle.velocity * delta_time;
            particle.size = if particle.lifetime > 0.0 {
                (1.0 - particle.age / particle.lifetime).max(0.0)
            } else {
                0.0
            };
        }
        self.particles.retain(Particle::is_alive);
    }

    /// Persistable snapshot; live particles are not persisted
    pub fn serialize(&self) -> ParticleData {
        ParticleData {
            enabled: self.enabled,
            max_particles: self.max_particles,
            emission_rate: self.emission_rate,
            lifetime: self.lifetime,
            speed: self.speed,
            emitting: self.emitting,
        }
    }

    /// Rebuild from a persisted snapshot
    pub fn deserialize(data: &ParticleData) -> Self {
        Self {
            max_particles: data.max_particles,
            emission_rate: data.emission_rate,
            lifetime: data.lifetime,
            speed: data.speed,
            emitting: data.emitting,
            enabled: data.enabled,
            ..Default::default()
        }
    }
}

impl Component for ParticleSystem {
    const KIND: ComponentKind = ComponentKind::ParticleSystem;

    fn slot(slots: &ComponentSlots) -> Option<&Self> {
        slots.particles.as_ref()
    }

    fn slot_mut(slots: &mut ComponentSlots) -> &mut Option<Self> {
        &mut slots.particles
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn apply_scene_defaults(&mut self, context: &AttachContext) {
        if let Some(seed) = context.particle_seed {
            self.reseed(seed);
        }
    }
}

/// Serialized form of a [`ParticleSystem`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParticleData {
    /// Enabled flag
    pub enabled: bool,
    /// Capacity
    pub max_particles: usize,
    /// Particles per second
    pub emission_rate: f32,
    /// Particle lifetime
    pub lifetime: f32,
    /// Velocity scale
    pub speed: f32,
    /// Continuous emission flag
    pub emitting: bool,
}

impl Default for ParticleData {
    fn default() -> Self {
        Self {
            enabled: true,
            max_particles: 1000,
            emission_rate: 50.0,
            lifetime: 2.0,
            speed: 5.0,
            emitting: true,
        }
    }
}
