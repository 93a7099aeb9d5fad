//! Latchkey nodes.
//!
//! The two halves of the lock, each generic over its link and peripherals:
//!
//! - [`Authority`]: owns the stored credential, compares, drives the door.
//! - [`Frontend`]: reads the keypad, renders to the display, asks the
//!   authority for every decision.
//!
//! Both are table-driven [`StateMachine`]s. [`VirtualLcd`] is the display
//! used by the simulator and the tests.

pub mod authority;
pub mod display;
pub mod frontend;
pub mod machine;

pub use authority::{Authority, AuthorityDevices, Command, DoorAction, DoorEvent, DoorPhase};
pub use display::{LcdGeometry, LcdHandle, VirtualLcd};
pub use frontend::{Frontend, FrontendAction, FrontendEvent, FrontendStep};
pub use machine::{MachineState, StateMachine, StateTransition};
