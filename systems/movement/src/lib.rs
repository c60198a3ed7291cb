#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic stepper that walks an agent along a planned path.
//!
//! Positions are continuous pixel coordinates. A cell's pixel origin is its
//! coordinate multiplied by the tile size, so an agent standing on a cell is
//! drawn with its top-left corner on the cell's top-left corner. There is no
//! frame timing: one call to [`PathFollower::step`] is one movement step.

use endless_dungeon_core::{CellCoord, Path, DEFAULT_TILE_SIZE};
use glam::Vec2;
use thiserror::Error;
use tracing::debug;

/// Speed and arrival tolerance used while following a path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementSettings {
    /// Edge length of a cell in pixels.
    pub tile_size: u32,
    /// Maximum distance in pixels covered by a single step.
    pub speed: f32,
    /// Distance in pixels below which a waypoint counts as reached.
    pub arrival_threshold: f32,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            speed: 1.0,
            arrival_threshold: 1.0,
        }
    }
}

impl MovementSettings {
    /// Checks that the settings describe an agent that can make progress.
    ///
    /// # Errors
    ///
    /// Returns [`MovementError`] when the tile size is zero, the speed is not
    /// a positive finite number, or the arrival threshold is negative or NaN.
    pub fn validate(&self) -> Result<(), MovementError> {
        if self.tile_size == 0 {
            return Err(MovementError::InvalidTileSize {
                tile_size: self.tile_size,
            });
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(MovementError::InvalidSpeed { speed: self.speed });
        }
        if !(self.arrival_threshold >= 0.0) {
            return Err(MovementError::InvalidArrivalThreshold {
                threshold: self.arrival_threshold,
            });
        }
        Ok(())
    }
}

/// Errors raised by invalid movement settings.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum MovementError {
    /// Cells must cover at least one pixel.
    #[error("tile size must be positive (received {tile_size})")]
    InvalidTileSize {
        /// Provided tile size that failed validation.
        tile_size: u32,
    },
    /// The agent must cover a finite, positive distance per step.
    #[error("agent speed must be positive (received {speed})")]
    InvalidSpeed {
        /// Provided speed that failed validation.
        speed: f32,
    },
    /// Waypoints cannot be reached with a negative tolerance.
    #[error("arrival threshold must not be negative (received {threshold})")]
    InvalidArrivalThreshold {
        /// Provided threshold that failed validation.
        threshold: f32,
    },
}

/// Result of a single movement step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The agent moved toward its current waypoint.
    Moved,
    /// The agent was close enough to the waypoint and advanced to the next one.
    WaypointReached(CellCoord),
    /// Every waypoint has been reached; further steps do nothing.
    Finished,
}

/// Converts a cell coordinate into the pixel position of its top-left corner.
#[must_use]
pub fn cell_origin(cell: CellCoord, tile_size: u32) -> Vec2 {
    Vec2::new(
        cell.column() as f32 * tile_size as f32,
        cell.row() as f32 * tile_size as f32,
    )
}

/// Walks an agent through the cells of a path one step at a time.
#[derive(Clone, Debug)]
pub struct PathFollower {
    path: Path,
    settings: MovementSettings,
    position: Vec2,
    heading_degrees: f32,
    waypoint_index: usize,
}

impl PathFollower {
    /// Places an agent on the first cell of `path`.
    ///
    /// An empty path produces a follower that is already finished and sits
    /// at the pixel origin.
    ///
    /// # Errors
    ///
    /// Returns [`MovementError`] when `settings` fail
    /// [`MovementSettings::validate`].
    pub fn new(path: Path, settings: MovementSettings) -> Result<Self, MovementError> {
        settings.validate()?;
        let position = path
            .start()
            .map_or(Vec2::ZERO, |cell| cell_origin(cell, settings.tile_size));

        Ok(Self {
            path,
            settings,
            position,
            heading_degrees: 0.0,
            waypoint_index: 0,
        })
    }

    /// Advances the agent by one step.
    pub fn step(&mut self) -> StepOutcome {
        let Some(target_cell) = self.current_target() else {
            return StepOutcome::Finished;
        };

        let offset = cell_origin(target_cell, self.settings.tile_size) - self.position;
        let distance = offset.length();

        if distance <= 0.0 || distance < self.settings.arrival_threshold {
            self.waypoint_index += 1;
            debug!(
                column = target_cell.column(),
                row = target_cell.row(),
                waypoint = self.waypoint_index,
                remaining = self.path.len() - self.waypoint_index,
                "waypoint reached"
            );
            return StepOutcome::WaypointReached(target_cell);
        }

        let travel = self.settings.speed.min(distance);
        self.position += offset / distance * travel;
        self.heading_degrees = offset.y.atan2(offset.x).to_degrees();
        StepOutcome::Moved
    }

    /// Current pixel position of the agent's top-left corner.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Direction of the last movement in degrees, measured clockwise from east
    /// in screen space.
    #[must_use]
    pub fn heading_degrees(&self) -> f32 {
        self.heading_degrees
    }

    /// Waypoint the agent is walking toward, if any remain.
    #[must_use]
    pub fn current_target(&self) -> Option<CellCoord> {
        self.path.cells().get(self.waypoint_index).copied()
    }

    /// Number of waypoints already reached.
    #[must_use]
    pub fn waypoint_index(&self) -> usize {
        self.waypoint_index
    }

    /// Reports whether every waypoint has been reached.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.waypoint_index >= self.path.len()
    }

    /// Cell whose pixel origin lies closest to the agent's position.
    #[must_use]
    pub fn nearest_cell(&self) -> CellCoord {
        let tile = self.settings.tile_size.max(1) as f32;
        let scaled = (self.position / tile).round().max(Vec2::ZERO);
        CellCoord::new(scaled.x as u32, scaled.y as u32)
    }

    /// Path the agent follows.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
