//! Mock door motor, motion sensor, and alarm.
//!
//! Each device records what the node asked of it, timestamped on the Tokio
//! clock so tests running with a paused clock can assert exact timing.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;
use tracing::info;

use crate::types::{MotorCommand, MotorDirection};
use crate::{AlarmIndicator, DoorActuator, MotionSensor, Result};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A logged event with the instant it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamped<T> {
    pub value: T,
    pub at: Instant,
}

// ============================================================================
// Door actuator
// ============================================================================

/// Mock door motor.
#[derive(Debug)]
pub struct MockDoorActuator {
    log: Arc<Mutex<Vec<Timestamped<MotorCommand>>>>,
}

impl MockDoorActuator {
    pub fn new() -> (Self, MockDoorActuatorHandle) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                log: Arc::clone(&log),
            },
            MockDoorActuatorHandle { log },
        )
    }
}

impl DoorActuator for MockDoorActuator {
    async fn rotate(&mut self, direction: MotorDirection, speed: u8) -> Result<()> {
        info!("Door motor: {} at {}%", direction, speed);
        lock(&self.log).push(Timestamped {
            value: MotorCommand::new(direction, speed),
            at: Instant::now(),
        });
        Ok(())
    }
}

/// Observer for a [`MockDoorActuator`].
#[derive(Debug, Clone)]
pub struct MockDoorActuatorHandle {
    log: Arc<Mutex<Vec<Timestamped<MotorCommand>>>>,
}

impl MockDoorActuatorHandle {
    /// Every command issued so far, oldest first.
    pub fn history(&self) -> Vec<Timestamped<MotorCommand>> {
        lock(&self.log).clone()
    }

    /// Directions issued so far, oldest first.
    pub fn directions(&self) -> Vec<MotorDirection> {
        lock(&self.log).iter().map(|c| c.value.direction).collect()
    }

    /// The most recent command, if any.
    pub fn current(&self) -> Option<MotorCommand> {
        lock(&self.log).last().map(|c| c.value)
    }
}

// ============================================================================
// Motion sensor
// ============================================================================

/// Mock doorway sensor. Reports clear until told otherwise.
#[derive(Debug)]
pub struct MockMotionSensor {
    state: Arc<MotionState>,
}

#[derive(Debug, Default)]
struct MotionState {
    detected: AtomicBool,
    reads: AtomicU32,
}

impl MockMotionSensor {
    pub fn new() -> (Self, MockMotionSensorHandle) {
        let state = Arc::new(MotionState::default());
        (
            Self {
                state: Arc::clone(&state),
            },
            MockMotionSensorHandle { state },
        )
    }
}

impl MotionSensor for MockMotionSensor {
    async fn motion_detected(&mut self) -> Result<bool> {
        self.state.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.state.detected.load(Ordering::Acquire))
    }
}

/// Control for a [`MockMotionSensor`].
#[derive(Debug, Clone)]
pub struct MockMotionSensorHandle {
    state: Arc<MotionState>,
}

impl MockMotionSensorHandle {
    /// Put something in (or take it out of) the doorway.
    pub fn set_motion(&self, detected: bool) {
        self.state.detected.store(detected, Ordering::Release);
    }

    /// Flip the doorway state and return the new value.
    pub fn toggle(&self) -> bool {
        !self.state.detected.fetch_xor(true, Ordering::AcqRel)
    }

    pub fn is_detected(&self) -> bool {
        self.state.detected.load(Ordering::Acquire)
    }

    /// How many times the node has polled the sensor.
    pub fn reads(&self) -> u32 {
        self.state.reads.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Alarm
// ============================================================================

/// Mock alarm output.
#[derive(Debug)]
pub struct MockAlarm {
    log: Arc<Mutex<Vec<Timestamped<bool>>>>,
}

impl MockAlarm {
    pub fn new() -> (Self, MockAlarmHandle) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                log: Arc::clone(&log),
            },
            MockAlarmHandle { log },
        )
    }
}

impl AlarmIndicator for MockAlarm {
    async fn set_alarm(&mut self, on: bool) -> Result<()> {
        info!("Alarm {}", if on { "ON" } else { "OFF" });
        lock(&self.log).push(Timestamped {
            value: on,
            at: Instant::now(),
        });
        Ok(())
    }
}

/// Observer for a [`MockAlarm`].
#[derive(Debug, Clone)]
pub struct MockAlarmHandle {
    log: Arc<Mutex<Vec<Timestamped<bool>>>>,
}

impl MockAlarmHandle {
    pub fn is_on(&self) -> bool {
        lock(&self.log).last().is_some_and(|e| e.value)
    }

    pub fn history(&self) -> Vec<Timestamped<bool>> {
        lock(&self.log).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_actuator_records_commands() {
        let (mut motor, handle) = MockDoorActuator::new();
        assert_eq!(handle.current(), None);

        motor.rotate(MotorDirection::Clockwise, 100).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(15)).await;
        motor.rotate(MotorDirection::Stop, 0).await.unwrap();

        let history = handle.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].at - history[0].at, std::time::Duration::from_secs(15));
        assert_eq!(
            handle.directions(),
            vec![MotorDirection::Clockwise, MotorDirection::Stop]
        );
        assert_eq!(handle.current(), Some(MotorCommand::new(MotorDirection::Stop, 0)));
    }

    #[tokio::test]
    async fn test_motion_sensor_follows_handle() {
        let (mut sensor, handle) = MockMotionSensor::new();
        assert!(!sensor.motion_detected().await.unwrap());

        handle.set_motion(true);
        assert!(sensor.motion_detected().await.unwrap());

        assert!(!handle.toggle());
        assert!(!sensor.motion_detected().await.unwrap());
        assert!(handle.toggle());
        assert!(handle.is_detected());
        assert_eq!(handle.reads(), 3);
    }

    #[tokio::test]
    async fn test_alarm_state() {
        let (mut alarm, handle) = MockAlarm::new();
        assert!(!handle.is_on());

        alarm.set_alarm(true).await.unwrap();
        assert!(handle.is_on());

        alarm.set_alarm(false).await.unwrap();
        assert!(!handle.is_on());
        assert_eq!(handle.history().len(), 2);
    }
}
