use crate::{ByteOrder, FrameData, FRAME_BITS, FRAME_LEN};

/// Position of a single bit inside an 8 byte frame.
///
/// `byte_index` counts from the first byte on the wire and `bit_index` is the
/// bit within that byte (7 is the MSB, 0 the LSB). The absolute bit number used
/// by signal descriptors is `byte_index * 8 + bit_index`.
///
/// Signals are read by starting a cursor on the signal's LSB and stepping it
/// once per bit with [`BitCursor::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitCursor {
    byte_index: u8,
    bit_index: u8,
}

impl BitCursor {
    /// Places a cursor on an absolute bit number. Positions past the end of
    /// the frame (64 and up) return `None`.
    pub const fn new(start_bit: u8) -> Option<Self> {
        if start_bit as usize >= FRAME_BITS {
            return None;
        }

        Some(Self {
            byte_index: start_bit / 8,
            bit_index: start_bit % 8,
        })
    }

    pub const fn byte_index(&self) -> usize {
        self.byte_index as usize
    }

    pub const fn bit_index(&self) -> u8 {
        self.bit_index
    }

    /// The absolute bit number the cursor is sitting on
    pub const fn position(&self) -> u8 {
        self.byte_index * 8 + self.bit_index
    }

    /// Reads the bit under the cursor (0 or 1)
    pub fn read(&self, data: &FrameData) -> u8 {
        (data[self.byte_index as usize] >> self.bit_index) & 0x01
    }

    /// Steps toward the signal's MSB in Motorola order: down through the
    /// current byte, then on to bit 7 of the next byte. Returns `None` once
    /// the walk leaves the frame.
    pub fn next_motorola(self) -> Option<Self> {
        let (byte_index, bit_index) = match self.bit_index {
            0 => (self.byte_index + 1, 7),
            bit => (self.byte_index, bit - 1),
        };

        Self::within_frame(byte_index, bit_index)
    }

    /// Steps toward the signal's MSB in Intel order: up through the current
    /// byte, then on to bit 0 of the next byte. Returns `None` once the walk
    /// leaves the frame.
    pub fn next_intel(self) -> Option<Self> {
        let (byte_index, bit_index) = match self.bit_index {
            7 => (self.byte_index + 1, 0),
            bit => (self.byte_index, bit + 1),
        };

        Self::within_frame(byte_index, bit_index)
    }

    pub fn advance(self, byte_order: ByteOrder) -> Option<Self> {
        match byte_order {
            ByteOrder::BigEndian => self.next_motorola(),
            ByteOrder::LittleEndian => self.next_intel(),
        }
    }

    /// Number of bits that can be visited from here (this one included)
    /// before the walk runs off the end of the frame
    pub const fn bits_available(&self, byte_order: ByteOrder) -> u8 {
        let following_bytes = (FRAME_LEN as u8 - 1 - self.byte_index) * 8;

        match byte_order {
            ByteOrder::BigEndian => self.bit_index + 1 + following_bytes,
            ByteOrder::LittleEndian => 8 - self.bit_index + following_bytes,
        }
    }

    fn within_frame(byte_index: u8, bit_index: u8) -> Option<Self> {
        if byte_index as usize >= FRAME_LEN {
            return None;
        }

        Some(Self {
            byte_index,
            bit_index,
        })
    }
}
