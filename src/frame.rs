use embedded_can::{Frame, Id};

use crate::{FrameData, FRAME_LEN};

/// Copies up to 8 bytes of payload into a zero-padded frame buffer. Bytes
/// past the eighth are ignored.
pub fn padded_payload(data: &[u8]) -> FrameData {
    let mut padded = [0u8; FRAME_LEN];
    let len = data.len().min(FRAME_LEN);

    padded[..len].copy_from_slice(&data[..len]);

    padded
}

/// Zero-padded payload of any [`Frame`], or `None` for remote frames which
/// carry no data
pub fn frame_payload<F: Frame>(frame: &F) -> Option<FrameData> {
    if frame.is_remote_frame() {
        return None;
    }

    Some(padded_payload(frame.data()))
}

/// Represents a CAN 2.0 frame which supports RTR (Remote Transmission Request).
///
/// The DLC can be up to 8 bytes, and the data if absent means that it is an
/// RTR frame. The payload is stored zero-padded to 8 bytes so signals can be
/// read from it directly.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Can2Frame {
    #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
    id: Id,
    dlc: usize,
    data: Option<FrameData>,
}

impl Can2Frame {
    /// Creates a new CAN 2.0 data frame. `data` must have a length in the
    /// range 0..=8 or else `None` will be returned instead.
    pub fn new_data(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        if data.len() > FRAME_LEN {
            return None;
        }

        Some(Self {
            id: id.into(),
            dlc: data.len(),
            data: Some(padded_payload(data)),
        })
    }

    /// Creates a new CAN 2.0 remote frame. `dlc` must be in the range 0..=8 or
    /// else `None` will be returned instead.
    pub fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        if dlc > FRAME_LEN {
            return None;
        }

        Some(Self {
            id: id.into(),
            dlc,
            data: None,
        })
    }

    /// The full 8 byte payload including padding. Will return `None` if it is
    /// an RTR frame.
    pub fn payload(&self) -> Option<&FrameData> {
        self.data.as_ref()
    }
}

impl Frame for Can2Frame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        Can2Frame::new_data(id, data)
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        Can2Frame::new_remote(id, dlc)
    }

    fn is_extended(&self) -> bool {
        matches!(self.id, Id::Extended(_))
    }

    fn is_remote_frame(&self) -> bool {
        self.data.is_none()
    }

    fn id(&self) -> Id {
        self.id
    }

    fn dlc(&self) -> usize {
        self.dlc
    }

    /// Data up to the DLC (empty for RTR frames)
    fn data(&self) -> &[u8] {
        match &self.data {
            Some(data) => &data[..self.dlc],
            None => &[],
        }
    }
}
