//! Value types shared by the peripheral traits and their mocks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Rotation command for the door actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorDirection {
    /// Forward: retracts the bolt.
    Clockwise,
    /// Reverse: throws the bolt.
    Anticlockwise,
    /// Halt the motor.
    Stop,
}

impl MotorDirection {
    /// Returns `true` if the motor is being driven.
    pub fn is_moving(self) -> bool {
        !matches!(self, MotorDirection::Stop)
    }
}

impl fmt::Display for MotorDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MotorDirection::Clockwise => "clockwise",
            MotorDirection::Anticlockwise => "anticlockwise",
            MotorDirection::Stop => "stop",
        };
        write!(f, "{name}")
    }
}

/// One command issued to the door actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorCommand {
    pub direction: MotorDirection,
    /// Duty cycle in percent.
    pub speed: u8,
}

impl MotorCommand {
    pub fn new(direction: MotorDirection, speed: u8) -> Self {
        Self { direction, speed }
    }
}
