//! Authority node.
//!
//! Owns the canonical credential, the door motor, the doorway sensor, and
//! the alarm. It never initiates an exchange: after announcing itself with
//! `PEER_READY` it waits for a command byte, carries the command out to
//! completion, and goes back to waiting.
//!
//! | Command | Wire exchange | Side effects |
//! |---------|---------------|--------------|
//! | `GET_STATUS` | status byte | refresh cache when saved |
//! | `SET_NEW_CREDENTIAL` | 2 transfers, `MATCH`/`NO_MATCH` | persist on match |
//! | `CHECK_CREDENTIAL` | 1 transfer, `MATCH`/`NO_MATCH` | none |
//! | `LOCKOUT_NOTIFY` | none | alarm on for 60 s |
//! | `UNLOCK_DOOR` | `LOCK_DOOR` once the doorway clears | full door cycle |

mod command;
mod door;

pub use command::Command;
pub use door::{DoorAction, DoorEvent, DoorPhase};

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, trace, warn};

use latchkey_core::constants::{
    CREDENTIAL_BASE_ADDRESS, CREDENTIAL_LENGTH, DOOR_ACTUATION_SECS, DOOR_MOTOR_SPEED, IDLE_BYTE,
    LOCKOUT_COOLDOWN_SECS, MOTION_POLL_MS, OP_CREDENTIAL_SAVED, POST_PERSIST_SETTLE_MS,
    STATUS_ADDRESS, STORE_SETTLE_MS,
};
use latchkey_core::{Credential, Result, SystemStatus};
use latchkey_hardware::{
    AlarmIndicator, DoorActuator, MotionSensor, MotorDirection, NvStore, SoftwareTimer,
};
use latchkey_protocol::{CredentialFrame, Link, LinkExt, Message, Opcode, Verdict};

use crate::StateMachine;

/// Peripherals owned by the authority.
#[derive(Debug)]
pub struct AuthorityDevices<S, D, P, A> {
    pub store: S,
    pub door: D,
    pub motion: P,
    pub alarm: A,
}

/// The credential-owning, door-driving node.
pub struct Authority<L, S, D, P, A> {
    link: L,
    devices: AuthorityDevices<S, D, P, A>,
    timer: SoftwareTimer,
    cache: Option<Credential>,
    door: StateMachine<DoorPhase>,
}

impl<L, S, D, P, A> Authority<L, S, D, P, A>
where
    L: Link,
    S: NvStore,
    D: DoorActuator,
    P: MotionSensor,
    A: AlarmIndicator,
{
    pub fn new(link: L, devices: AuthorityDevices<S, D, P, A>) -> Self {
        Self {
            link,
            devices,
            timer: SoftwareTimer::new(),
            cache: None,
            door: StateMachine::new(DoorPhase::Idle),
        }
    }

    /// Current door phase.
    pub fn door_phase(&self) -> DoorPhase {
        self.door.current_state()
    }

    /// Door cycle state machine, for inspecting its history.
    pub fn door(&self) -> &StateMachine<DoorPhase> {
        &self.door
    }

    /// Returns `true` once a valid credential has been loaded from the store.
    pub fn has_cached_credential(&self) -> bool {
        self.cache.is_some()
    }

    pub fn devices(&self) -> &AuthorityDevices<S, D, P, A> {
        &self.devices
    }

    /// Tell the frontend the authority is up.
    pub async fn announce(&mut self) -> Result<()> {
        info!("Authority ready");
        self.link.send_message(&Message::PeerReady).await
    }

    /// Announce, then serve commands until the link fails.
    pub async fn run(&mut self) -> Result<()> {
        self.announce().await?;
        loop {
            self.serve_one().await?;
        }
    }

    /// Read one byte and carry out the command it names.
    ///
    /// Returns the command served, or `None` if the byte was ignored.
    pub async fn serve_one(&mut self) -> Result<Option<Command>> {
        let byte = self.link.recv_byte().await?;
        let Some(command) = Command::from_byte(byte) else {
            if byte != IDLE_BYTE {
                debug!("Ignoring byte 0x{:02X} outside a command", byte);
            }
            return Ok(None);
        };

        debug!("Dispatching {}", command);
        match command {
            Command::GetStatus => self.report_status().await?,
            Command::SetNewCredential => self.enroll().await?,
            Command::CheckCredential => self.check().await?,
            Command::LockoutNotify => self.sound_lockout().await?,
            Command::UnlockDoor => self.cycle_door().await?,
        }
        Ok(Some(command))
    }

    async fn report_status(&mut self) -> Result<()> {
        let status = self.devices.store.read_byte(STATUS_ADDRESS).await?;
        settle(STORE_SETTLE_MS).await;
        self.link.send_byte(status).await?;

        if SystemStatus::from_u8(status).is_saved() {
            self.refresh_cache().await?;
        }
        Ok(())
    }

    async fn enroll(&mut self) -> Result<()> {
        let candidate = self.link.receive_credential().await?;
        self.link.skip_until(Opcode::Confirm).await?;
        let confirmation = self.link.receive_credential().await?;

        let accepted = match (valid(&candidate), valid(&confirmation)) {
            (Some(a), Some(b)) if a == b => Some(a),
            _ => None,
        };

        match accepted {
            Some(credential) => {
                self.link.send_message(&Message::Match).await?;
                self.persist(&credential).await?;
                info!("New credential enrolled");
            }
            None => {
                self.link.send_message(&Message::NoMatch).await?;
                info!("Enrollment rejected: confirmation differs");
            }
        }
        Ok(())
    }

    async fn check(&mut self) -> Result<()> {
        let frame = self.link.receive_credential().await?;
        let verdict = match (valid(&frame), self.cache.as_ref()) {
            (Some(candidate), Some(stored)) => Verdict::from_equal(&candidate == stored),
            (Some(_), None) => {
                debug!("No credential cached; rejecting");
                Verdict::NoMatch
            }
            (None, _) => Verdict::NoMatch,
        };

        info!("Verification: {:?}", verdict);
        self.link.send_message(&Message::from(verdict)).await
    }

    async fn sound_lockout(&mut self) -> Result<()> {
        warn!("Attempts exhausted, alarm for {}s", LOCKOUT_COOLDOWN_SECS);
        self.devices.alarm.set_alarm(true).await?;
        self.timer.delay(LOCKOUT_COOLDOWN_SECS).await;
        self.devices.alarm.set_alarm(false).await?;
        Ok(())
    }

    async fn cycle_door(&mut self) -> Result<()> {
        self.advance_door(DoorEvent::UnlockRequested).await?;
        self.timer.delay(DOOR_ACTUATION_SECS).await;
        self.advance_door(DoorEvent::ActuationElapsed).await?;

        while self.devices.motion.motion_detected().await? {
            sleep(Duration::from_millis(MOTION_POLL_MS)).await;
        }
        self.advance_door(DoorEvent::MotionCleared).await?;

        self.timer.delay(DOOR_ACTUATION_SECS).await;
        self.advance_door(DoorEvent::ActuationElapsed).await
    }

    async fn advance_door(&mut self, event: DoorEvent) -> Result<()> {
        let transition = self.door.fire(event)?;
        info!("Door: {} -> {}", transition.from, transition.to);

        match transition.action {
            Some(DoorAction::Unlock) => {
                self.devices
                    .door
                    .rotate(MotorDirection::Clockwise, DOOR_MOTOR_SPEED)
                    .await?
            }
            Some(DoorAction::Halt) => self.devices.door.rotate(MotorDirection::Stop, 0).await?,
            Some(DoorAction::Relock) => {
                self.link.send_message(&Message::LockDoor).await?;
                self.devices
                    .door
                    .rotate(MotorDirection::Anticlockwise, DOOR_MOTOR_SPEED)
                    .await?
            }
            None => {}
        }
        Ok(())
    }

    /// Write the record digit by digit, then the saved sentinel, then reload.
    async fn persist(&mut self, credential: &Credential) -> Result<()> {
        for (address, digit) in (CREDENTIAL_BASE_ADDRESS..).zip(credential.to_bytes()) {
            self.devices.store.write_byte(address, digit).await?;
            settle(STORE_SETTLE_MS).await;
        }
        self.devices
            .store
            .write_byte(STATUS_ADDRESS, OP_CREDENTIAL_SAVED)
            .await?;
        settle(POST_PERSIST_SETTLE_MS).await;

        self.refresh_cache().await
    }

    async fn refresh_cache(&mut self) -> Result<()> {
        let mut digits = [0u8; CREDENTIAL_LENGTH];
        for (address, slot) in (CREDENTIAL_BASE_ADDRESS..).zip(digits.iter_mut()) {
            *slot = self.devices.store.read_byte(address).await?;
            settle(STORE_SETTLE_MS).await;
        }

        self.cache = match Credential::new(digits) {
            Ok(credential) => Some(credential),
            Err(e) => {
                warn!("Stored credential is corrupt ({}); treating as absent", e);
                None
            }
        };
        trace!("Credential cache refreshed");
        Ok(())
    }
}

impl<L, S, D, P, A> std::fmt::Debug for Authority<L, S, D, P, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authority")
            .field("door_phase", &self.door.current_state())
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

/// Validate a received frame; out-of-range digits mean the link slipped.
fn valid(frame: &CredentialFrame) -> Option<Credential> {
    match frame.credential() {
        Ok(credential) => Some(credential),
        Err(e) => {
            warn!("Received credential is malformed ({}); link may be out of step", e);
            None
        }
    }
}

async fn settle(ms: u64) {
    sleep(Duration::from_millis(ms)).await;
}
