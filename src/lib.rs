#![no_std]

mod codec;
mod cursor;
mod extract;
mod frame;
mod message;
mod signal;

// Yaw rate, LSB at byte 0 bit 1, 10 bits, Motorola, signed, 0.25 deg/s per bit
// SG_ YawRate : 1|10@0- (0.25,0) [-128|127.75] "deg/s" Vector__XXX

pub const FRAME_LEN: usize = 8;
pub const FRAME_BITS: usize = FRAME_LEN * 8;

pub const MAX_SIGNAL_LENGTH: u8 = 32;
pub const MAX_SIGNAL_NAME_LENGTH: usize = 32;
pub const MAX_SIGNALS_PER_MESSAGE: usize = 16;

/// Payload of a classic CAN frame. Shorter DLCs are zero-padded to 8 bytes so
/// every bit position in 0..64 can be addressed.
pub type FrameData = [u8; FRAME_LEN];

pub use cursor::*;
pub use extract::*;
pub use frame::*;
pub use message::*;
pub use signal::*;

pub use embedded_can::{ExtendedId, Frame, Id, StandardId};
