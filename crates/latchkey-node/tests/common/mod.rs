//! Shared rigs for the node integration tests.
//!
//! Every test runs on a paused Tokio clock, so the 15 s and 60 s windows
//! elapse as soon as both nodes are idle.

#![allow(dead_code)]

use std::future::Future;
use std::time::Duration;

use tokio::io::DuplexStream;

use latchkey_core::Credential;
use latchkey_core::constants::{CREDENTIAL_BASE_ADDRESS, OP_CREDENTIAL_SAVED};
use latchkey_hardware::mock::{
    MockAlarm, MockAlarmHandle, MockDoorActuator, MockDoorActuatorHandle, MockEeprom, MockKeypad,
    MockKeypadHandle, MockMotionSensor, MockMotionSensorHandle,
};
use latchkey_node::{Authority, AuthorityDevices, Frontend, LcdHandle, VirtualLcd};
use latchkey_protocol::StreamLink;

pub type TestLink = StreamLink<DuplexStream>;

pub type TestAuthority =
    Authority<TestLink, MockEeprom, MockDoorActuator, MockMotionSensor, MockAlarm>;

pub type TestFrontend = Frontend<TestLink, MockKeypad, VirtualLcd>;

/// An authority plus handles on its peripherals.
pub struct AuthorityRig {
    pub authority: TestAuthority,
    pub eeprom: MockEeprom,
    pub door: MockDoorActuatorHandle,
    pub motion: MockMotionSensorHandle,
    pub alarm: MockAlarmHandle,
}

pub fn authority_rig(link: TestLink, eeprom: MockEeprom) -> AuthorityRig {
    let (door, door_handle) = MockDoorActuator::new();
    let (motion, motion_handle) = MockMotionSensor::new();
    let (alarm, alarm_handle) = MockAlarm::new();

    let devices = AuthorityDevices {
        store: eeprom.clone(),
        door,
        motion,
        alarm,
    };

    AuthorityRig {
        authority: Authority::new(link, devices),
        eeprom,
        door: door_handle,
        motion: motion_handle,
        alarm: alarm_handle,
    }
}

/// A frontend plus its keypad and display handles.
pub struct FrontendRig {
    pub frontend: TestFrontend,
    pub keys: MockKeypadHandle,
    pub lcd: LcdHandle,
}

pub fn frontend_rig(link: TestLink) -> FrontendRig {
    let (keypad, keys) = MockKeypad::new();
    let (display, lcd) = VirtualLcd::new();

    FrontendRig {
        frontend: Frontend::new(link, keypad, display),
        keys,
        lcd,
    }
}

/// Both nodes on one link over a shared store.
pub fn system(eeprom: MockEeprom) -> (AuthorityRig, FrontendRig) {
    let (front, back) = StreamLink::pair();
    (authority_rig(back, eeprom), frontend_rig(front))
}

/// A store that already holds `digits` with the saved marker.
pub fn enrolled_eeprom(digits: [u8; 5]) -> MockEeprom {
    let mut cells = MockEeprom::new().snapshot();
    let base = usize::from(CREDENTIAL_BASE_ADDRESS);
    let record = credential(digits).to_record();
    cells[base..base + record.len()].copy_from_slice(&record);
    MockEeprom::from_bytes(cells)
}

/// The six persisted bytes: five digits then the status byte.
pub fn stored_record(eeprom: &MockEeprom) -> Vec<u8> {
    eeprom
        .peek(CREDENTIAL_BASE_ADDRESS, 6)
        .expect("record inside store")
}

pub fn credential(digits: [u8; 5]) -> Credential {
    Credential::new(digits).expect("valid digits")
}

pub fn is_saved(record: &[u8]) -> bool {
    record.last() == Some(&OP_CREDENTIAL_SAVED)
}

/// Poll `condition` on the paused clock until it holds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    while !condition() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Run `script` while the authority serves commands.
///
/// The authority must already have announced itself.
pub async fn alongside<T>(authority: &mut TestAuthority, script: impl Future<Output = T>) -> T {
    tokio::select! {
        result = serve_forever(authority) => panic!("authority stopped: {result:?}"),
        value = script => value,
    }
}

async fn serve_forever(authority: &mut TestAuthority) -> latchkey_core::Result<()> {
    loop {
        authority.serve_one().await?;
    }
}
