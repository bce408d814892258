use crate::{BitCursor, ByteOrder, FrameData, MAX_SIGNAL_LENGTH};

/// Reasons a strict extraction refuses a `(start_bit, length)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExtractError {
    #[error("Signal length ({0:?}) was out of the valid range (1..=32)")]
    InvalidLength(u8),
    #[error("Start bit ({0:?}) was out of the valid range (0..=63)")]
    StartBitOutOfRange(u8),
    #[error(
        "Signal at start bit ({start_bit:?}) with length ({length:?}) runs past the end of the frame ({available:?} bits available)"
    )]
    FieldOverrun {
        start_bit: u8,
        length: u8,
        available: u8,
    },
}

/// Extracts an unsigned Motorola (big-endian) signal whose `start_bit` is the
/// position of its LSB.
///
/// Bits are visited from `start_bit` toward the MSB of the signal (down
/// through each byte, then bit 7 of the next byte) and the n-th visited bit
/// becomes bit n of the result.
///
/// Malformed requests never fail: a `length` outside 1..=32 or a `start_bit`
/// of 64 or more returns 0, and a field running past byte 7 keeps the bits it
/// could reach with the rest left at 0. Use [`try_extract_be_lsb`] to have
/// those cases reported instead.
pub fn extract_be_lsb(data: &FrameData, start_bit: u8, length: u8) -> u32 {
    extract(data, start_bit, length, ByteOrder::BigEndian)
}

/// [`extract_be_lsb`] followed by [`sign_extend`] to the same width
pub fn extract_be_lsb_signed(data: &FrameData, start_bit: u8, length: u8) -> i32 {
    sign_extend(extract_be_lsb(data, start_bit, length), length)
}

/// Extracts an unsigned Intel (little-endian) signal whose `start_bit` is the
/// position of its LSB. Same leniency as [`extract_be_lsb`].
pub fn extract_le(data: &FrameData, start_bit: u8, length: u8) -> u32 {
    extract(data, start_bit, length, ByteOrder::LittleEndian)
}

/// Lenient extraction for either byte order
pub fn extract(data: &FrameData, start_bit: u8, length: u8, byte_order: ByteOrder) -> u32 {
    if length == 0 || length > MAX_SIGNAL_LENGTH {
        return 0;
    }

    match BitCursor::new(start_bit) {
        Some(start) => collect_bits(data, start, length, byte_order),
        None => 0,
    }
}

/// Strict extraction for either byte order. Out of range parameters and
/// fields that do not fit in the frame are returned as errors.
pub fn try_extract(
    data: &FrameData,
    start_bit: u8,
    length: u8,
    byte_order: ByteOrder,
) -> Result<u32, ExtractError> {
    let start = check_field(start_bit, length, byte_order)?;

    Ok(collect_bits(data, start, length, byte_order))
}

pub fn try_extract_be_lsb(data: &FrameData, start_bit: u8, length: u8) -> Result<u32, ExtractError> {
    try_extract(data, start_bit, length, ByteOrder::BigEndian)
}

pub fn try_extract_be_lsb_signed(
    data: &FrameData,
    start_bit: u8,
    length: u8,
) -> Result<i32, ExtractError> {
    try_extract_be_lsb(data, start_bit, length).map(|raw| sign_extend(raw, length))
}

/// Widens a `bit_length`-bit two's complement value to an `i32`.
///
/// A `bit_length` of 0 or 32 and up has nothing to extend, so the value is
/// reinterpreted as-is.
pub fn sign_extend(value: u32, bit_length: u8) -> i32 {
    if bit_length == 0 || bit_length >= 32 {
        return value as i32;
    }

    let sign_bit = 1u32 << (bit_length - 1);

    if value & sign_bit == 0 {
        return value as i32;
    }

    let mask = (1u32 << bit_length) - 1;

    (value | !mask) as i32
}

/// Validates a field and returns a cursor on its LSB
pub(crate) fn check_field(
    start_bit: u8,
    length: u8,
    byte_order: ByteOrder,
) -> Result<BitCursor, ExtractError> {
    if length == 0 || length > MAX_SIGNAL_LENGTH {
        return Err(ExtractError::InvalidLength(length));
    }

    let start = BitCursor::new(start_bit).ok_or(ExtractError::StartBitOutOfRange(start_bit))?;
    let available = start.bits_available(byte_order);

    if length > available {
        return Err(ExtractError::FieldOverrun {
            start_bit,
            length,
            available,
        });
    }

    Ok(start)
}

fn collect_bits(data: &FrameData, start: BitCursor, length: u8, byte_order: ByteOrder) -> u32 {
    let mut value = 0u32;
    let mut cursor = Some(start);

    for i in 0..length {
        // Overrun, the remaining high bits stay 0
        let Some(position) = cursor else {
            break;
        };

        // First visited bit lands in bit 0
        value |= (position.read(data) as u32) << i;
        cursor = position.advance(byte_order);
    }

    value
}
