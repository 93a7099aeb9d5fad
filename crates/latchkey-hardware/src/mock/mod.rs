//! Mock peripherals for tests and the simulator.
//!
//! Each device comes with a handle that either drives it (keypad, motion
//! sensor) or observes what the node did with it (motor, alarm). The store
//! is its own handle: clones share cells.

pub mod door;
pub mod eeprom;
pub mod keypad;

pub use door::{
    MockAlarm, MockAlarmHandle, MockDoorActuator, MockDoorActuatorHandle, MockMotionSensor,
    MockMotionSensorHandle, Timestamped,
};
pub use eeprom::{DEFAULT_EEPROM_SIZE, MockEeprom};
pub use keypad::{MockKeypad, MockKeypadHandle};
