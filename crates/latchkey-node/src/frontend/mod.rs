//! Frontend node.
//!
//! Owns the keypad and the character display and initiates every exchange
//! with the authority. It never decides whether a credential is correct; it
//! relays digits and renders whatever verdict comes back.

mod step;

pub use step::{FrontendAction, FrontendEvent, FrontendStep};

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use latchkey_core::constants::{
    CREDENTIAL_LENGTH, DOOR_ACTUATION_SECS, KEY_DEBOUNCE_MS, LOCKOUT_COOLDOWN_SECS,
    MAX_FAILED_ATTEMPTS, OUTCOME_HOLD_MS, SPLASH_HOLD_MS,
};
use latchkey_core::{Credential, Result, SystemStatus};
use latchkey_hardware::{CharacterDisplay, KeypadDevice, KeypadInput, SoftwareTimer};
use latchkey_protocol::{Link, LinkExt, Message, Opcode, Verdict};

use crate::StateMachine;

const SPLASH: &str = "Door Lock System";
const PROMPT: &str = "ENTER PASS: ";
const CONFIRM_PROMPT: &str = "RE-ENTER PASS: ";
const MATCHED: &str = "PASS MATCH";
const MISMATCHED: &str = "PASS DONT MATCH";

/// The keypad-and-display node.
pub struct Frontend<L, K, D> {
    link: L,
    keypad: K,
    display: D,
    timer: SoftwareTimer,
    steps: StateMachine<FrontendStep>,
    attempts: u8,
    status: Option<SystemStatus>,
}

impl<L, K, D> Frontend<L, K, D>
where
    L: Link,
    K: KeypadDevice,
    D: CharacterDisplay,
{
    pub fn new(link: L, keypad: K, display: D) -> Self {
        Self {
            link,
            keypad,
            display,
            timer: SoftwareTimer::new(),
            steps: StateMachine::new(FrontendStep::Enroll),
            attempts: 0,
            status: None,
        }
    }

    pub fn current_step(&self) -> FrontendStep {
        self.steps.current_state()
    }

    /// Consecutive failed verifications in the current attempt window.
    pub fn attempts(&self) -> u8 {
        self.attempts
    }

    /// Status reported by the authority at boot, updated on enrollment.
    pub fn status(&self) -> Option<SystemStatus> {
        self.status
    }

    pub fn steps(&self) -> &StateMachine<FrontendStep> {
        &self.steps
    }

    /// Boot handshake.
    ///
    /// Waits for `PEER_READY`, asks for the persisted status, shows the
    /// splash screen, and picks the first step.
    pub async fn start(&mut self) -> Result<FrontendStep> {
        let skipped = self.link.skip_until(Opcode::PeerReady).await?;
        if skipped > 0 {
            debug!("Skipped {} byte(s) before authority came up", skipped);
        }

        self.link.send_message(&Message::GetStatus).await?;
        let status = SystemStatus::from_u8(self.link.recv_byte().await?);
        self.status = Some(status);
        info!("Authority reports {}", status);

        self.display.display_string(SPLASH).await?;
        sleep(Duration::from_millis(SPLASH_HOLD_MS)).await;

        let first = if status.is_saved() {
            FrontendStep::Menu
        } else {
            FrontendStep::Enroll
        };
        self.steps = StateMachine::new(first);
        Ok(first)
    }

    /// Boot, then run steps until the link or a peripheral fails.
    pub async fn run(&mut self) -> Result<()> {
        self.start().await?;
        loop {
            self.step().await?;
        }
    }

    /// Run the current step once and return the step that follows.
    ///
    /// A verification step covers a single attempt, so a rejected attempt
    /// returns the same step.
    pub async fn step(&mut self) -> Result<FrontendStep> {
        self.display.clear().await?;

        let event = match self.current_step() {
            FrontendStep::Enroll => self.enroll().await?,
            FrontendStep::Menu => self.menu().await?,
            FrontendStep::VerifyForOpen | FrontendStep::VerifyForChange => self.verify().await?,
            FrontendStep::Lockout => self.lockout().await?,
        };

        let transition = self.steps.fire(event)?;
        if transition.from != transition.to {
            info!("Frontend: {} -> {}", transition.from, transition.to);
        }

        match transition.action {
            Some(FrontendAction::UnlockDoor) => self.unlock_door().await?,
            Some(FrontendAction::NotifyLockout) => {
                self.link.send_message(&Message::LockoutNotify).await?
            }
            None => {}
        }
        Ok(transition.to)
    }

    async fn enroll(&mut self) -> Result<FrontendEvent> {
        self.display.display_string(PROMPT).await?;
        let candidate = self.enter_credential().await?;
        self.link
            .send_message(&Message::SetNewCredential(candidate))
            .await?;

        self.display.display_string(CONFIRM_PROMPT).await?;
        let confirmation = self.enter_credential().await?;
        self.link
            .send_message(&Message::Confirm(confirmation))
            .await?;

        if self.await_verdict().await?.is_match() {
            self.status = Some(SystemStatus::CredentialSaved);
            self.show_outcome(MATCHED).await?;
            Ok(FrontendEvent::EnrollmentAccepted)
        } else {
            self.show_outcome(MISMATCHED).await?;
            Ok(FrontendEvent::EnrollmentRejected)
        }
    }

    async fn menu(&mut self) -> Result<FrontendEvent> {
        self.attempts = 0;
        self.show("+ : Open Door", (1, 0), "- : Change Pass").await?;

        loop {
            match self.keypad.read_input().await? {
                KeypadInput::Plus => return Ok(FrontendEvent::OpenSelected),
                KeypadInput::Minus => return Ok(FrontendEvent::ChangeSelected),
                other => debug!("Menu ignoring {:?}", other),
            }
        }
    }

    async fn verify(&mut self) -> Result<FrontendEvent> {
        self.display.display_string(PROMPT).await?;
        let credential = self.enter_credential().await?;
        self.link
            .send_message(&Message::CheckCredential(credential))
            .await?;

        if self.await_verdict().await?.is_match() {
            self.attempts = 0;
            self.show_outcome(MATCHED).await?;
            return Ok(FrontendEvent::VerificationAccepted);
        }

        self.attempts += 1;
        self.show_outcome(MISMATCHED).await?;
        self.display.clear().await?;

        if self.attempts >= MAX_FAILED_ATTEMPTS {
            warn!("{} failed attempts, locking out", self.attempts);
            Ok(FrontendEvent::AttemptsExhausted)
        } else {
            info!(
                "Verification failed ({}/{})",
                self.attempts, MAX_FAILED_ATTEMPTS
            );
            Ok(FrontendEvent::VerificationRejected)
        }
    }

    async fn lockout(&mut self) -> Result<FrontendEvent> {
        self.show("SYSTEM LOCKED", (1, 0), "WAIT FOR 1 MIN").await?;
        self.timer.delay(LOCKOUT_COOLDOWN_SECS).await;
        self.attempts = 0;
        Ok(FrontendEvent::CooldownElapsed)
    }

    async fn unlock_door(&mut self) -> Result<()> {
        self.link.send_message(&Message::UnlockDoor).await?;

        self.display.clear().await?;
        self.show("DOOR IS", (1, 0), "UNLOCKING").await?;
        self.timer.delay(DOOR_ACTUATION_SECS).await;

        self.display.clear().await?;
        self.show("WAIT FOR PEOPLE", (1, 4), "TO ENTER").await?;
        self.link.skip_until(Opcode::LockDoor).await?;

        self.display.clear().await?;
        self.show("DOOR IS", (1, 0), "LOCKING").await?;
        self.timer.delay(DOOR_ACTUATION_SECS).await;
        Ok(())
    }

    /// Read exactly five digits, echoing `*`, then wait for Enter.
    ///
    /// Non-digit keys are skipped during the digit phase, Enter included.
    async fn enter_credential(&mut self) -> Result<Credential> {
        self.display.move_cursor(1, 0).await?;

        let mut values = [0u8; CREDENTIAL_LENGTH];
        let mut entered = 0;
        while entered < CREDENTIAL_LENGTH {
            if let Some(digit) = self.keypad.read_input().await?.as_digit() {
                values[entered] = digit;
                self.display.display_character('*').await?;
                entered += 1;
            }
            sleep(Duration::from_millis(KEY_DEBOUNCE_MS)).await;
        }

        while self.keypad.read_input().await? != KeypadInput::Enter {}

        self.display.clear().await?;
        Credential::new(values)
    }

    async fn await_verdict(&mut self) -> Result<Verdict> {
        let reply = self.link.recv_byte().await?;
        let verdict = Verdict::from_u8(reply);
        if Opcode::from_u8(reply).is_none() {
            warn!("Unexpected reply 0x{:02X}, treating as no match", reply);
        }
        Ok(verdict)
    }

    async fn show_outcome(&mut self, text: &str) -> Result<()> {
        self.display.display_string(text).await?;
        sleep(Duration::from_millis(OUTCOME_HOLD_MS)).await;
        Ok(())
    }

    /// Two-line message; the second line starts at `at`.
    async fn show(&mut self, top: &str, at: (u8, u8), bottom: &str) -> Result<()> {
        self.display.display_string(top).await?;
        self.display.move_cursor(at.0, at.1).await?;
        self.display.display_string(bottom).await?;
        Ok(())
    }
}

impl<L, K, D> std::fmt::Debug for Frontend<L, K, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frontend")
            .field("step", &self.steps.current_state())
            .field("attempts", &self.attempts)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
