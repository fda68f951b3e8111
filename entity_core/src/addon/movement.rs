//! Movement addon - grid position that publishes `onMove` events

use super::InstallContext;
use crate::entity::Entity;
use crate::events::Publisher;
use crate::types::Options;
use crate::AddonError;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Topic published after every step
pub const MOVE_TOPIC: &str = "onMove";

/// Compass direction accepted by [`Entity::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Parse `U`/`UP`/`N`/`NORTH` and friends, case-insensitively
    pub fn parse(s: &str) -> Option<Direction> {
        match s.to_uppercase().as_str() {
            "U" | "UP" | "N" | "NORTH" => Some(Direction::Up),
            "D" | "DOWN" | "S" | "SOUTH" => Some(Direction::Down),
            "L" | "LEFT" | "W" | "WEST" => Some(Direction::Left),
            "R" | "RIGHT" | "E" | "EAST" => Some(Direction::Right),
            _ => None,
        }
    }

    /// `(row, column)` offset of one step
    pub fn offset(self) -> (f64, f64) {
        match self {
            Direction::Up => (1.0, 0.0),
            Direction::Down => (-1.0, 0.0),
            Direction::Left => (0.0, -1.0),
            Direction::Right => (0.0, 1.0),
        }
    }
}

/// Position state added by the movement addon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    /// `[row, column]`
    pub position: [f64; 2],
    pub speed: f64,
}

impl Default for Movement {
    fn default() -> Self {
        Movement {
            position: [0.0, 0.0],
            speed: 1.0,
        }
    }
}

/// Install movement, starting from `options.base` when it is a pair of numbers
pub(crate) fn install(
    entity: &mut Entity,
    options: &Options,
    _context: &InstallContext<'_>,
) -> Result<(), AddonError> {
    let mut movement = Movement::default();
    if let Some([row, col]) = options
        .get("base")
        .and_then(|base| base.as_array())
        .and_then(|base| <&[_; 2]>::try_from(base.as_slice()).ok())
    {
        if let (Some(row), Some(col)) = (row.as_f64(), col.as_f64()) {
            movement.position = [row, col];
        }
    }
    if let Some(speed) = options.get_f64("speed") {
        movement.speed = speed;
    }

    entity.movement = Some(movement);
    Ok(())
}

impl Entity {
    /// Move one step and publish an `onMove` event
    ///
    /// Unrecognized directions leave the position unchanged but still publish.
    pub fn step<P: Publisher + ?Sized>(
        &mut self,
        direction: &str,
        publisher: &mut P,
    ) -> Result<&mut Self, AddonError> {
        let movement = self
            .movement
            .as_mut()
            .ok_or_else(|| AddonError::MissingAddon("movement".to_string()))?;

        if let Some(dir) = Direction::parse(direction) {
            let (row, col) = dir.offset();
            movement.position[0] += row * movement.speed;
            movement.position[1] += col * movement.speed;
        }

        publisher.publish(MOVE_TOPIC, json!({ "dir": direction, "target": self.name() }));
        Ok(self)
    }

    /// `[row, column]`, if the movement addon is applied
    pub fn position(&self) -> Option<[f64; 2]> {
        self.movement.as_ref().map(|m| m.position)
    }

    pub fn movement_speed(&self) -> Option<f64> {
        self.movement.as_ref().map(|m| m.speed)
    }

    pub fn set_movement_speed(&mut self, speed: f64) -> Result<&mut Self, AddonError> {
        self.movement
            .as_mut()
            .ok_or_else(|| AddonError::MissingAddon("movement".to_string()))?
            .speed = speed;
        Ok(self)
    }
}
