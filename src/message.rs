use embedded_can::{Frame, Id};
use heapless::Vec;

use crate::{frame_payload, DecodedSignal, Signal, MAX_SIGNALS_PER_MESSAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayoutError {
    #[error("Message layout is already holding its maximum of ({0:?}) signals")]
    TooManySignals(usize),
}

/// The signals carried by one CAN message ID
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MessageLayout<const N: usize = MAX_SIGNALS_PER_MESSAGE> {
    #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
    id: Id,
    #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
    signals: Vec<Signal, N>,
}

impl<const N: usize> MessageLayout<N> {
    pub fn new(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            signals: Vec::new(),
        }
    }

    /// Adds a signal, failing once the layout is full
    pub fn push(&mut self, signal: Signal) -> Result<(), LayoutError> {
        self.signals
            .push(signal)
            .map_err(|_| LayoutError::TooManySignals(N))
    }

    /// Consumes self and returns it with `signal` added
    pub fn with_signal(mut self, signal: Signal) -> Result<Self, LayoutError> {
        self.push(signal)?;
        Ok(self)
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn signal(&self, name: &str) -> Option<&Signal> {
        self.signals.iter().find(|signal| signal.name() == name)
    }

    pub fn matches<F: Frame>(&self, frame: &F) -> bool {
        frame.id() == self.id
    }

    /// Decodes every signal of the layout from `frame`. Returns `None` when
    /// the frame has a different ID. Remote frames decode with every raw
    /// value at 0.
    pub fn decode<F: Frame>(&self, frame: &F) -> Option<Vec<DecodedSignal<'_>, N>> {
        if !self.matches(frame) {
            return None;
        }

        let payload = frame_payload(frame);

        Some(
            self.signals
                .iter()
                .map(|signal| signal.decode(payload.as_ref()))
                .collect(),
        )
    }
}
