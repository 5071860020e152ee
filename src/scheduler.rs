//! The tick scheduler: the single writer that owns the grid and drives the
//! six-phase-plus pipeline described in SPEC_FULL.md §5. Calculators never
//! hold a reference to the grid outside the phase that invokes them.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::air_resistance::{air_resistance_force, DEFAULT_AIR_RESISTANCE_SCALAR};
use crate::cohesion::{adhesion_force, cohesion_resistance, com_cohesion_force};
use crate::collision::{classify_candidates, CollisionKind, DEFAULT_ELASTICITY_FACTOR};
use crate::error::PhysicsError;
use crate::executor::execute_move;
use crate::grid::Grid;
use crate::material::Material;
use crate::pressure::{
    accumulate_dynamic_pressure, compute_hydrostatic_pressure, decay_dynamic_pressure,
    pressure_force, BlockedTransfer, DEFAULT_DYNAMIC_ACCUMULATION_RATE, DEFAULT_DYNAMIC_DECAY_RATE,
};
use crate::transfer::detect_transfers;
use crate::vector::{Vec2, Vec2Ext};

/// A value carried by `set_tunable`, tagged by the shape the recognized
/// tunable name expects (spec.md §6 "Inputs").
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TunableValue {
    Scalar(f64),
    Vector(Vec2),
    Bool(bool),
    Int(i32),
}

/// Below this fill, a cell is forcibly cleared back to Air during
/// pre-clean — distinct from `cell::FILL_EPSILON`, which governs
/// individual mutators.
pub const MIN_FILL_THRESHOLD: f64 = 0.01;

/// Undocumented in the source but preserved behavior (see SPEC_FULL.md §9):
/// velocities above this speed get a pseudo-viscosity scale-down each tick.
const SOFT_DAMPING_SPEED_THRESHOLD: f64 = 0.5;
const SOFT_DAMPING_FACTOR: f64 = 0.9;

/// Tunable knobs exposed to callers, all with defaults matching
/// SPEC_FULL.md §4.13.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tunables {
    pub gravity: Vec2,
    pub max_velocity: f64,
    pub elasticity_factor: f64,
    pub pressure_scale: f64,
    pub hydrostatic_enabled: bool,
    pub dynamic_enabled: bool,
    pub air_resistance_scalar: f64,
    pub cohesion_range: i32,
    pub fragmentation_threshold: f64,
    pub min_fill_threshold: f64,
    pub dynamic_accumulation_rate: f64,
    pub dynamic_decay_rate: f64,
}

impl Default for Tunables {
    fn default() -> Self {
        Tunables {
            gravity: Vec2::new(0.0, 9.81),
            max_velocity: 0.9,
            elasticity_factor: DEFAULT_ELASTICITY_FACTOR,
            pressure_scale: 1.0,
            hydrostatic_enabled: true,
            dynamic_enabled: true,
            air_resistance_scalar: DEFAULT_AIR_RESISTANCE_SCALAR,
            cohesion_range: 1,
            fragmentation_threshold: crate::collision::FRAGMENTATION_THRESHOLD,
            min_fill_threshold: MIN_FILL_THRESHOLD,
            dynamic_accumulation_rate: DEFAULT_DYNAMIC_ACCUMULATION_RATE,
            dynamic_decay_rate: DEFAULT_DYNAMIC_DECAY_RATE,
        }
    }
}

/// Per-tick aggregate counters, reset every `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stats {
    pub total_mass: f64,
    pub blocked_transfer_count: u32,
    pub moves_executed: u32,
    pub removed_mass: f64,
    pub tick: u64,
}

/// An externally queued change to apply before the next tick's pre-clean
/// phase, e.g. painting material from a UI or a growth script. The core
/// applies these as plain cell mutations; deciding which cells to grow is
/// out of scope here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrowthCommand {
    ConvertCell { at: (u32, u32), material: Material, fill: f64 },
    SetOrganismId { at: (u32, u32), id: u32 },
}

/// Owns the grid exclusively and advances it one tick at a time.
pub struct Scheduler {
    grid: Grid,
    tunables: Tunables,
    stats: Stats,
    inbox: Vec<GrowthCommand>,
    rng: StdRng,
}

impl Scheduler {
    pub fn new(grid: Grid, tunables: Tunables) -> Self {
        Scheduler {
            grid,
            tunables,
            stats: Stats::default(),
            inbox: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic constructor for reproducible tests and replays.
    pub fn with_seed(grid: Grid, tunables: Tunables, seed: u64) -> Self {
        Scheduler {
            grid,
            tunables,
            stats: Stats::default(),
            inbox: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Places material outside the tick pipeline, applied at the start of
    /// the next `advance`.
    pub fn queue_command(&mut self, command: GrowthCommand) {
        self.inbox.push(command);
    }

    /// Sets a cell unconditionally, queued for the start of the next
    /// `advance` (spec.md §6 "Inputs" — used by scenarios and user input).
    pub fn place_material(&mut self, x: u32, y: u32, material: Material, fill: f64) {
        self.queue_command(GrowthCommand::ConvertCell { at: (x, y), material, fill });
    }

    /// Updates one recognized tunable by name (spec.md §6). Rejected at this
    /// boundary — leaving `self.tunables` unchanged — if the name is unknown
    /// or the value's shape doesn't match what that tunable expects.
    pub fn set_tunable(&mut self, name: &str, value: TunableValue) -> Result<(), PhysicsError> {
        use TunableValue::{Bool, Int, Scalar, Vector};

        macro_rules! scalar {
            ($field:ident) => {
                match value {
                    Scalar(v) if v.is_finite() => {
                        self.tunables.$field = v;
                        Ok(())
                    }
                    Scalar(v) => Err(PhysicsError::InvalidTunableValue { name: name.to_string(), value: v }),
                    _ => Err(PhysicsError::InvalidTunableValue { name: name.to_string(), value: f64::NAN }),
                }
            };
        }

        match name {
            "gravity" => match value {
                Vector(v) => {
                    self.tunables.gravity = v;
                    Ok(())
                }
                Scalar(v) => {
                    self.tunables.gravity = Vec2::new(0.0, v);
                    Ok(())
                }
                _ => Err(PhysicsError::InvalidTunableValue { name: name.to_string(), value: f64::NAN }),
            },
            "max_velocity" => scalar!(max_velocity),
            "elasticity_factor" => scalar!(elasticity_factor),
            "pressure_scale" => scalar!(pressure_scale),
            "air_resistance_scalar" => scalar!(air_resistance_scalar),
            "fragmentation_threshold" => scalar!(fragmentation_threshold),
            "min_fill_threshold" => scalar!(min_fill_threshold),
            "hydrostatic_enabled" => match value {
                Bool(b) => {
                    self.tunables.hydrostatic_enabled = b;
                    Ok(())
                }
                _ => Err(PhysicsError::InvalidTunableValue { name: name.to_string(), value: f64::NAN }),
            },
            "dynamic_enabled" => match value {
                Bool(b) => {
                    self.tunables.dynamic_enabled = b;
                    Ok(())
                }
                _ => Err(PhysicsError::InvalidTunableValue { name: name.to_string(), value: f64::NAN }),
            },
            "cohesion_range" => match value {
                Int(i) if i >= 0 => {
                    self.tunables.cohesion_range = i;
                    Ok(())
                }
                Int(i) => Err(PhysicsError::InvalidTunableValue { name: name.to_string(), value: i as f64 }),
                _ => Err(PhysicsError::InvalidTunableValue { name: name.to_string(), value: f64::NAN }),
            },
            _ => Err(PhysicsError::UnknownTunable(name.to_string())),
        }
    }

    /// Drives one full tick: pre-clean, force computation, integration,
    /// transfer detection, move execution, pressure update.
    pub fn advance(&mut self, dt: f64) {
        self.drain_inbox();
        self.pre_clean();

        let forces = self.compute_forces();
        self.integrate(dt, &forces);

        let candidates = detect_transfers(&self.grid);
        let mut descriptors =
            classify_candidates(&self.grid, candidates, self.tunables.fragmentation_threshold);
        crate::executor::shuffle_queue(&mut descriptors, &mut self.rng);

        let mut blocked: Vec<BlockedTransfer> = Vec::new();
        let mut moves_executed = 0u32;
        let mut removed_mass = 0.0;
        for descriptor in &descriptors {
            let kind = descriptor.kind;
            let before = self.grid.total_mass();
            let moved = execute_move(
                &mut self.grid,
                descriptor,
                self.tunables.elasticity_factor,
                self.tunables.fragmentation_threshold,
                &mut blocked,
            );
            if moved > 0.0 {
                moves_executed += 1;
            }
            if kind == CollisionKind::Fragmentation {
                let after = self.grid.total_mass();
                removed_mass += (before - after).max(0.0);
            }
        }

        if self.tunables.dynamic_enabled {
            accumulate_dynamic_pressure(&mut self.grid, &blocked, self.tunables.dynamic_accumulation_rate);
            decay_dynamic_pressure(&mut self.grid, self.tunables.dynamic_decay_rate, dt);
        }
        if self.tunables.hydrostatic_enabled {
            compute_hydrostatic_pressure(&mut self.grid, self.tunables.gravity);
        }

        self.stats = Stats {
            total_mass: self.grid.total_mass(),
            blocked_transfer_count: blocked.len() as u32,
            moves_executed,
            removed_mass,
            tick: self.stats.tick + 1,
        };
        tracing::trace!(
            tick = self.stats.tick,
            total_mass = self.stats.total_mass,
            moves = moves_executed,
            blocked = self.stats.blocked_transfer_count,
            "tick advanced"
        );
    }

    fn drain_inbox(&mut self) {
        for command in self.inbox.drain(..) {
            match command {
                GrowthCommand::ConvertCell { at: (x, y), material, fill } => {
                    if self.grid.in_bounds(x, y) {
                        self.grid.at_mut(x, y).set(material, fill);
                    }
                }
                GrowthCommand::SetOrganismId { at: (x, y), id } => {
                    if self.grid.in_bounds(x, y) {
                        self.grid.at_mut(x, y).organism_id = id;
                    }
                }
            }
        }
    }

    /// Clears any cell whose fill has decayed below the configured
    /// threshold back to Air.
    fn pre_clean(&mut self) {
        let threshold = self.tunables.min_fill_threshold;
        for ((_, _), cell) in self.grid.iter_row_major_mut() {
            if !cell.is_empty() && cell.fill_ratio < threshold {
                cell.set(Material::Air, 0.0);
                cell.velocity = Vec2::ZERO;
                cell.com = Vec2::ZERO;
            }
        }
    }

    /// Read-only phase: computes the net force on every occupied cell. Each
    /// cell's force depends only on its own neighborhood (support/cohesion
    /// range), never on another cell's force this tick, so the per-cell work
    /// is embarrassingly parallel — behind the `parallel` feature this runs
    /// over `rayon`'s global pool instead of sequentially.
    #[cfg(not(feature = "parallel"))]
    fn compute_forces(&self) -> Vec<Vec2> {
        let grid = &self.grid;
        let mut forces = vec![Vec2::ZERO; (grid.width() as usize) * (grid.height() as usize)];
        for ((x, y), cell) in grid.iter_row_major() {
            forces[(y as usize) * (grid.width() as usize) + (x as usize)] =
                self.force_at(grid, x, y, cell);
        }
        forces
    }

    #[cfg(feature = "parallel")]
    fn compute_forces(&self) -> Vec<Vec2> {
        use rayon::prelude::*;

        let grid = &self.grid;
        let width = grid.width() as usize;
        let total = width * (grid.height() as usize);
        (0..total)
            .into_par_iter()
            .map(|idx| {
                let x = (idx % width) as u32;
                let y = (idx / width) as u32;
                self.force_at(grid, x, y, grid.at(x, y))
            })
            .collect()
    }

    fn force_at(&self, grid: &Grid, x: u32, y: u32, cell: &crate::cell::Cell) -> Vec2 {
        if cell.is_empty() || cell.is_wall() {
            return Vec2::ZERO;
        }
        let mut force = self.tunables.gravity.scale(cell.material.density() * cell.fill_ratio);

        let resistance = cohesion_resistance(grid, x, y);
        let com_pull = com_cohesion_force(grid, x, y, self.tunables.cohesion_range);
        let adhesion = adhesion_force(grid, x, y);
        let drag = air_resistance_force(cell, self.tunables.air_resistance_scalar);
        let pressure = pressure_force(cell, self.tunables.gravity, self.tunables.pressure_scale);

        force += com_pull.force.scale(1.0 - resistance.magnitude.min(1.0));
        force += adhesion.force;
        force += drag;
        force += pressure;
        force
    }

    /// Integrates velocity and COM for every occupied cell using the
    /// per-cell forces computed in the previous phase.
    ///
    /// Forces here are already density-scaled accelerations (`force_at`
    /// folds `density * fill_ratio` into gravity), so this adds them to
    /// velocity directly rather than dividing by mass again — a second
    /// division would cancel the density-proportional response §4.9
    /// requires (a denser material must fall at the same rate as a lighter
    /// one under gravity, not slower).
    fn integrate(&mut self, dt: f64, forces: &[Vec2]) {
        let width = self.grid.width() as usize;
        let max_velocity = self.tunables.max_velocity;
        for ((x, y), cell) in self.grid.iter_row_major_mut() {
            if cell.is_empty() || cell.is_wall() {
                continue;
            }
            let idx = (y as usize) * width + (x as usize);
            let mut velocity = (cell.velocity + forces[idx].scale(dt)).clamp_magnitude(max_velocity);
            if velocity.magnitude() > SOFT_DAMPING_SPEED_THRESHOLD {
                velocity = velocity.scale(SOFT_DAMPING_FACTOR);
            }
            cell.velocity = velocity;
            cell.com += cell.velocity.scale(dt);
            cell.clamp_com();
        }
    }
}
