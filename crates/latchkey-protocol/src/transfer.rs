//! Digit-by-digit credential transfer.
//!
//! A credential crosses the link as a context opcode followed by five
//! acknowledged digits and the `0x23` terminator:
//!
//! ```text
//! sender                     receiver
//!   | --- context opcode ---> |
//!   | --- digit 0 ----------> |
//!   | <-- NEXT_DIGIT -------- |
//!   |        ... x5 ...       |
//!   | --- 0x23 -------------> |
//! ```
//!
//! The sender puts seven bytes on the wire and the receiver five. The
//! receiver does not validate digit values; an out-of-range byte is kept in
//! the [`CredentialFrame`] and treated as a mismatch by whoever compares it.

use tracing::{debug, trace};

use crate::{Link, Message, Opcode};
use latchkey_core::constants::{CREDENTIAL_LENGTH, OP_CREDENTIAL_SAVED};
use latchkey_core::{Credential, Result};

/// The raw bytes received in one credential transfer.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CredentialFrame {
    /// Digit bytes in transfer order, unvalidated.
    pub digits: [u8; CREDENTIAL_LENGTH],
    /// The byte that closed the transfer.
    pub terminator: u8,
}

impl CredentialFrame {
    /// Validate the digits into a credential.
    ///
    /// # Errors
    /// Returns `Error::InvalidDigit` if any byte is greater than 9.
    pub fn credential(&self) -> Result<Credential> {
        Credential::new(self.digits)
    }

    /// Returns `true` if the transfer closed with the expected terminator.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminator == OP_CREDENTIAL_SAVED
    }
}

impl From<&Credential> for CredentialFrame {
    fn from(credential: &Credential) -> Self {
        Self {
            digits: credential.to_bytes(),
            terminator: OP_CREDENTIAL_SAVED,
        }
    }
}

// Digits stay out of logs.
impl std::fmt::Debug for CredentialFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialFrame")
            .field("digits", &"*****")
            .field("terminator", &format_args!("0x{:02X}", self.terminator))
            .finish()
    }
}

/// Protocol-level helpers available on every [`Link`].
pub trait LinkExt: Link {
    /// Send a single opcode.
    async fn send_opcode(&mut self, opcode: Opcode) -> Result<()> {
        trace!("-> {}", opcode);
        self.send_byte(opcode.to_u8()).await
    }

    /// Receive one byte and decode it as an opcode.
    ///
    /// Returns `Ok(None)` for a byte outside the vocabulary.
    async fn recv_opcode(&mut self) -> Result<Option<Opcode>> {
        let byte = self.recv_byte().await?;
        Ok(Opcode::from_u8(byte))
    }

    /// Discard bytes until `opcode` arrives, returning how many were dropped.
    async fn skip_until(&mut self, opcode: Opcode) -> Result<usize> {
        let wanted = opcode.to_u8();
        let mut discarded = 0;
        loop {
            let byte = self.recv_byte().await?;
            if byte == wanted {
                if discarded > 0 {
                    debug!("Discarded {} byte(s) waiting for {}", discarded, opcode);
                }
                return Ok(discarded);
            }
            discarded += 1;
        }
    }

    /// Send `context`, then transfer `credential` one acknowledged digit at a
    /// time, then the terminator.
    async fn send_credential(&mut self, context: Opcode, credential: &Credential) -> Result<()> {
        self.send_opcode(context).await?;
        for digit in credential.to_bytes() {
            self.send_byte(digit).await?;
            self.skip_until(Opcode::NextDigit).await?;
        }
        self.send_byte(OP_CREDENTIAL_SAVED).await
    }

    /// Receive the body of a credential transfer whose context opcode has
    /// already been read.
    async fn receive_credential(&mut self) -> Result<CredentialFrame> {
        let mut digits = [0u8; CREDENTIAL_LENGTH];
        for slot in digits.iter_mut() {
            *slot = self.recv_byte().await?;
            self.send_opcode(Opcode::NextDigit).await?;
        }
        let terminator = self.recv_byte().await?;

        let frame = CredentialFrame { digits, terminator };
        if !frame.is_terminated() {
            debug!("Credential transfer closed with 0x{:02X}", terminator);
        }
        Ok(frame)
    }

    /// Put a typed message on the wire.
    ///
    /// Transfer messages run the full digit exchange; everything else is a
    /// single byte.
    async fn send_message(&mut self, message: &Message) -> Result<()> {
        match (message.opcode(), message.credential()) {
            (Some(context), Some(credential)) => self.send_credential(context, credential).await,
            _ => self.send_byte(message.wire_byte()).await,
        }
    }
}

impl<L: Link + ?Sized> LinkExt for L {}
