//! Peripheral abstraction layer for the Latchkey door lock.
//!
//! Both nodes reach their hardware only through the traits in [`traits`]:
//!
//! | Trait | Node | Device |
//! |-------|------|--------|
//! | [`KeypadDevice`] | frontend | scanned 4x4 keypad |
//! | [`CharacterDisplay`] | frontend | 2x16 character LCD |
//! | [`NvStore`] | authority | on-chip EEPROM |
//! | [`DoorActuator`] | authority | reversible DC motor |
//! | [`MotionSensor`] | authority | doorway occupancy sensor |
//! | [`AlarmIndicator`] | authority | buzzer |
//!
//! The [`SoftwareTimer`] replaces the hardware timer channel and its
//! interrupt-driven tick counter.
//!
//! # Mock Implementations
//!
//! The [`mock`] module provides in-memory devices with control handles for
//! tests and the terminal simulator.
//!
//! ```
//! use latchkey_hardware::mock::MockMotionSensor;
//! use latchkey_hardware::MotionSensor;
//!
//! # async fn example() -> latchkey_hardware::Result<()> {
//! let (mut sensor, handle) = MockMotionSensor::new();
//! handle.set_motion(true);
//! assert!(sensor.motion_detected().await?);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod mock;
pub mod timer;
pub mod traits;
pub mod types;

pub use error::{HardwareError, Result};
pub use timer::{SoftwareTimer, TickHandler};
pub use traits::{
    AlarmIndicator, CharacterDisplay, DoorActuator, KeypadDevice, KeypadInput, MotionSensor,
    NvStore,
};
pub use types::{MotorCommand, MotorDirection};
