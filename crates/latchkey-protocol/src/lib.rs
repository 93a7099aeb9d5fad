//! Latchkey link protocol.
//!
//! Byte-level vocabulary, codec, transport abstraction, and the credential
//! transfer shared by the frontend and authority nodes.
//!
//! # Example
//!
//! ```
//! use latchkey_core::Credential;
//! use latchkey_protocol::{LinkExt, Opcode, StreamLink};
//!
//! # async fn example() -> latchkey_core::Result<()> {
//! let (mut frontend, mut authority) = StreamLink::pair();
//! let credential = Credential::new([1, 2, 3, 4, 5])?;
//!
//! let (sent, frame) = tokio::join!(
//!     frontend.send_credential(Opcode::CheckCredential, &credential),
//!     async {
//!         authority.skip_until(Opcode::CheckCredential).await?;
//!         authority.receive_credential().await
//!     },
//! );
//! sent?;
//! assert_eq!(frame?.credential()?, credential);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod link;
pub mod message;
pub mod opcode;
pub mod transfer;

pub use codec::WireCodec;
pub use link::{Link, LinkConfig, StreamLink, SupervisedLink};
pub use message::{Message, Verdict};
pub use opcode::Opcode;
pub use transfer::{CredentialFrame, LinkExt};
