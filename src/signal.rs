use core::str::Utf8Error;

use heapless::String;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{
    codec::{
        expect_byte, f32_from_ascii, is_identifier_byte, skip_whitespace, take_until, take_while,
        u8_from_dec_digits,
    },
    extract::check_field,
    extract, sign_extend, ExtractError, FrameData, MAX_SIGNAL_NAME_LENGTH,
};

const SIGNAL_PREFIX: &[u8] = b"SG_";

/// Bit traversal order of a signal. The integer value is the DBC `@` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[num_enum(error_type(name = SignalParseError, constructor = SignalParseError::InvalidByteOrder))]
#[repr(u8)]
pub enum ByteOrder {
    /// Motorola. From the LSB, walk down each byte then on to bit 7 of the
    /// next byte.
    #[default]
    BigEndian = b'0',
    /// Intel. From the LSB, walk up each byte then on to bit 0 of the next
    /// byte.
    LittleEndian = b'1',
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[num_enum(error_type(name = SignalParseError, constructor = SignalParseError::InvalidValueType))]
#[repr(u8)]
pub enum ValueType {
    #[default]
    Unsigned = b'+',
    /// Two's complement over the signal's own width
    Signed = b'-',
}

/// Where a signal lives inside a frame and how its bits are interpreted.
///
/// `start_bit` is always the position of the signal's LSB, for both byte
/// orders. Construction rejects any layout that does not fit in an 8 byte
/// frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SignalDescriptor {
    start_bit: u8,
    length: u8,
    byte_order: ByteOrder,
    value_type: ValueType,
}

impl SignalDescriptor {
    pub fn new(
        start_bit: u8,
        length: u8,
        byte_order: ByteOrder,
        value_type: ValueType,
    ) -> Result<Self, ExtractError> {
        check_field(start_bit, length, byte_order)?;

        Ok(Self {
            start_bit,
            length,
            byte_order,
            value_type,
        })
    }

    pub fn start_bit(&self) -> u8 {
        self.start_bit
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Reads the raw value from a payload. A missing payload (such as a
    /// remote frame) reads as 0.
    pub fn raw(&self, data: Option<&FrameData>) -> RawValue {
        let bits = data.map_or(0, |data| {
            extract(data, self.start_bit, self.length, self.byte_order)
        });

        match self.value_type {
            ValueType::Unsigned => RawValue::Unsigned(bits),
            ValueType::Signed => RawValue::Signed(sign_extend(bits, self.length)),
        }
    }
}

/// Integer read from the frame before scaling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RawValue {
    Unsigned(u32),
    Signed(i32),
}

impl RawValue {
    pub fn as_f32(self) -> f32 {
        match self {
            RawValue::Unsigned(value) => value as f32,
            RawValue::Signed(value) => value as f32,
        }
    }
}

/// A named signal with its linear conversion to physical units
/// (`physical = raw * factor + offset`) and optional plausible range.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Signal {
    #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
    name: String<MAX_SIGNAL_NAME_LENGTH>,
    descriptor: SignalDescriptor,
    factor: f32,
    offset: f32,
    range: Option<(f32, f32)>,
}

/// One signal decoded from a frame
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodedSignal<'a> {
    pub name: &'a str,
    pub raw: RawValue,
    pub physical: f32,
    /// False when the physical value falls outside the signal's range
    pub in_range: bool,
}

impl Signal {
    /// Creates an unscaled signal (factor 1, offset 0, no range)
    pub fn new(name: &str, descriptor: SignalDescriptor) -> Result<Self, SignalParseError> {
        if name.is_empty() {
            return Err(SignalParseError::EmptyName);
        }

        let mut owned = String::new();
        owned
            .push_str(name)
            .map_err(|_| SignalParseError::NameTooLong(name.len()))?;

        Ok(Self {
            name: owned,
            descriptor,
            factor: 1.0,
            offset: 0.0,
            range: None,
        })
    }

    pub fn with_scaling(mut self, factor: f32, offset: f32) -> Self {
        self.factor = factor;
        self.offset = offset;
        self
    }

    /// Limits the plausible physical range. A `[0|0]` range, as DBC files
    /// write it, means unrestricted.
    pub fn with_range(mut self, minimum: f32, maximum: f32) -> Self {
        self.range = if minimum == 0.0 && maximum == 0.0 {
            None
        } else {
            Some((minimum, maximum))
        };
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &SignalDescriptor {
        &self.descriptor
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn range(&self) -> Option<(f32, f32)> {
        self.range
    }

    pub fn physical(&self, raw: RawValue) -> f32 {
        raw.as_f32() * self.factor + self.offset
    }

    pub fn is_in_range(&self, physical: f32) -> bool {
        match self.range {
            Some((minimum, maximum)) => physical >= minimum && physical <= maximum,
            None => true,
        }
    }

    pub fn decode(&self, data: Option<&FrameData>) -> DecodedSignal<'_> {
        let raw = self.descriptor.raw(data);
        let physical = self.physical(raw);

        DecodedSignal {
            name: &self.name,
            raw,
            physical,
            in_range: self.is_in_range(physical),
        }
    }
}

/// Various errors which can arise while parsing a signal definition
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SignalParseError {
    /* Generic line parsing */
    #[error("Tried to parse an empty buffer")]
    Empty,
    #[error("Expected a signal definition starting with SG_")]
    MissingSignalPrefix,
    #[error("Expected ({0:?}) but found ({1:?})")]
    UnexpectedByte(u8, u8),
    #[error("Signal definition ended early")]
    Truncated,

    /* Name */
    #[error("Signal name was empty")]
    EmptyName,
    #[error("Signal name of ({0:?}) bytes does not fit (max {max})", max = MAX_SIGNAL_NAME_LENGTH)]
    NameTooLong(usize),
    #[error("Multiplexed signals are not supported")]
    Multiplexed,

    /* Numbers */
    #[error("Tried to decode a decimal digit but it was out of range ({0:?})")]
    IllegalDecimalDigit(u8),
    #[error("Decimal value does not fit in a byte")]
    DecimalOverflow,
    #[error("Tried to decode a number but it was invalid")]
    InvalidNumber,
    #[error("Tried to decode text as UTF-8 but it was invalid ({0:?})")]
    InvalidUtf8(
        #[cfg_attr(feature = "defmt", defmt(Debug2Format))]
        #[from]
        Utf8Error,
    ),

    /* Bit layout */
    #[error("Tried to decode byte order but it was invalid ({0:?})")]
    InvalidByteOrder(u8),
    #[error("Tried to decode value type but it was invalid ({0:?})")]
    InvalidValueType(u8),
    #[error("Signal layout does not fit the frame")]
    InvalidLayout(#[from] ExtractError),
}

impl Signal {
    /// Parses a DBC-style signal line:
    ///
    /// `SG_ <name> : <start>|<length>@<order><sign> (<factor>,<offset>) [<min>|<max>] ...`
    ///
    /// The scaling and range groups are optional and anything after them
    /// (unit, receivers) is ignored. `<start>` is the LSB position for both
    /// byte orders.
    pub fn from_bytes(buffer: &[u8]) -> Result<Self, SignalParseError> {
        let buffer = skip_whitespace(buffer);

        if buffer.is_empty() {
            return Err(SignalParseError::Empty);
        }

        let remaining = buffer
            .strip_prefix(SIGNAL_PREFIX)
            .filter(|rest| rest.first().is_some_and(u8::is_ascii_whitespace))
            .ok_or(SignalParseError::MissingSignalPrefix)?;

        /* Name */

        let (name, remaining) = take_while(skip_whitespace(remaining), is_identifier_byte);
        let name = core::str::from_utf8(name)?;

        let remaining = match skip_whitespace(remaining).split_first() {
            Some((b':', rest)) => rest,
            Some((b'M' | b'm', _)) => return Err(SignalParseError::Multiplexed),
            Some((&found, _)) => return Err(SignalParseError::UnexpectedByte(b':', found)),
            None => return Err(SignalParseError::Truncated),
        };

        /* Bit layout */

        let (start_digits, remaining) = take_until(skip_whitespace(remaining), b'|');
        let start_bit = u8_from_dec_digits(start_digits)?;
        let remaining = expect_byte(remaining, b'|')?;

        let (length_digits, remaining) = take_until(remaining, b'@');
        let length = u8_from_dec_digits(length_digits)?;
        let remaining = expect_byte(remaining, b'@')?;

        let (&order, remaining) = remaining
            .split_first()
            .ok_or(SignalParseError::Truncated)?;
        let (&sign, remaining) = remaining
            .split_first()
            .ok_or(SignalParseError::Truncated)?;

        let descriptor = SignalDescriptor::new(
            start_bit,
            length,
            ByteOrder::try_from(order)?,
            ValueType::try_from(sign)?,
        )?;

        let mut signal = Signal::new(name, descriptor)?;

        /* Scaling */

        let mut remaining = skip_whitespace(remaining);

        if let Some(rest) = remaining.strip_prefix(b"(") {
            let (factor, rest) = take_until(rest, b',');
            let rest = expect_byte(rest, b',')?;
            let (offset, rest) = take_until(rest, b')');
            remaining = skip_whitespace(expect_byte(rest, b')')?);

            signal = signal.with_scaling(f32_from_ascii(factor)?, f32_from_ascii(offset)?);
        }

        /* Range */

        if let Some(rest) = remaining.strip_prefix(b"[") {
            let (minimum, rest) = take_until(rest, b'|');
            let rest = expect_byte(rest, b'|')?;
            let (maximum, rest) = take_until(rest, b']');
            expect_byte(rest, b']')?;

            signal = signal.with_range(f32_from_ascii(minimum)?, f32_from_ascii(maximum)?);
        }

        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ByteOrder, ExtractError, RawValue, Signal, SignalDescriptor, SignalParseError, ValueType,
        MAX_SIGNAL_NAME_LENGTH,
    };

    fn yaw_rate() -> Signal {
        Signal::from_bytes(b"SG_ YawRate : 1|10@0- (0.25,0) [-128|127.75] \"deg/s\" Vector__XXX")
            .unwrap()
    }

    #[test]
    fn descriptor_validation() {
        assert!(SignalDescriptor::new(1, 10, ByteOrder::BigEndian, ValueType::Signed).is_ok());
        assert_eq!(
            SignalDescriptor::new(0, 0, ByteOrder::BigEndian, ValueType::Unsigned),
            Err(ExtractError::InvalidLength(0))
        );
        assert_eq!(
            SignalDescriptor::new(64, 1, ByteOrder::BigEndian, ValueType::Unsigned),
            Err(ExtractError::StartBitOutOfRange(64))
        );
        assert_eq!(
            SignalDescriptor::new(57, 8, ByteOrder::BigEndian, ValueType::Unsigned),
            Err(ExtractError::FieldOverrun {
                start_bit: 57,
                length: 8,
                available: 2
            })
        );
    }

    #[test]
    fn descriptor_raw_values() {
        let data = [0x0F, 0xFF, 0, 0, 0, 0, 0, 0];
        let unsigned = SignalDescriptor::new(3, 12, ByteOrder::BigEndian, ValueType::Unsigned)
            .unwrap();
        let signed =
            SignalDescriptor::new(3, 12, ByteOrder::BigEndian, ValueType::Signed).unwrap();

        assert_eq!(unsigned.raw(Some(&data)), RawValue::Unsigned(4095));
        assert_eq!(signed.raw(Some(&data)), RawValue::Signed(-1));
    }

    #[test]
    fn absent_payload_reads_zero() {
        let signed =
            SignalDescriptor::new(3, 12, ByteOrder::BigEndian, ValueType::Signed).unwrap();
        let unsigned =
            SignalDescriptor::new(0, 8, ByteOrder::LittleEndian, ValueType::Unsigned).unwrap();

        assert_eq!(signed.raw(None), RawValue::Signed(0));
        assert_eq!(unsigned.raw(None), RawValue::Unsigned(0));
    }

    #[test]
    fn parse_full_signal_line() {
        let signal = yaw_rate();

        assert_eq!(signal.name(), "YawRate");
        assert_eq!(signal.descriptor().start_bit(), 1);
        assert_eq!(signal.descriptor().length(), 10);
        assert_eq!(signal.descriptor().byte_order(), ByteOrder::BigEndian);
        assert_eq!(signal.descriptor().value_type(), ValueType::Signed);
        assert_eq!(signal.factor(), 0.25);
        assert_eq!(signal.offset(), 0.0);
        assert_eq!(signal.range(), Some((-128.0, 127.75)));
    }

    #[test]
    fn parse_minimal_signal_line() {
        let signal = Signal::from_bytes(b"  SG_ Gear:0|4@1+").unwrap();

        assert_eq!(signal.name(), "Gear");
        assert_eq!(signal.descriptor().byte_order(), ByteOrder::LittleEndian);
        assert_eq!(signal.descriptor().value_type(), ValueType::Unsigned);
        assert_eq!(signal.factor(), 1.0);
        assert_eq!(signal.offset(), 0.0);
        assert_eq!(signal.range(), None);
    }

    #[test]
    fn zero_range_is_unrestricted() {
        let signal = Signal::from_bytes(b"SG_ Odometer : 7|24@0+ (1,0) [0|0] \"km\"").unwrap();

        assert_eq!(signal.range(), None);
        assert!(signal.is_in_range(1.0e7));
    }

    #[test]
    fn decode_scales_and_checks_range() {
        let signal = yaw_rate();

        // Raw -512
        let decoded = signal.decode(Some(&[0x00, 0x01, 0, 0, 0, 0, 0, 0]));
        assert_eq!(decoded.name, "YawRate");
        assert_eq!(decoded.raw, RawValue::Signed(-512));
        assert_eq!(decoded.physical, -128.0);
        assert!(decoded.in_range);

        // Raw 1
        let decoded = signal.decode(Some(&[0x02, 0x00, 0, 0, 0, 0, 0, 0]));
        assert_eq!(decoded.physical, 0.25);

        let narrow = yaw_rate().with_range(-10.0, 10.0);
        assert!(!narrow.decode(Some(&[0x00, 0x01, 0, 0, 0, 0, 0, 0])).in_range);
    }

    #[test]
    fn offset_applies_after_factor() {
        let descriptor =
            SignalDescriptor::new(7, 8, ByteOrder::BigEndian, ValueType::Unsigned).unwrap();
        let signal = Signal::new("Coolant", descriptor)
            .unwrap()
            .with_scaling(0.5, -40.0);

        assert_eq!(signal.decode(Some(&[0x05, 0, 0, 0, 0, 0, 0, 0])).physical, 40.0);
        assert_eq!(signal.decode(None).physical, -40.0);
    }

    #[test]
    fn prefix_must_be_followed_by_whitespace() {
        assert_eq!(
            Signal::from_bytes(b"SG_FOO_BAR : 8|16@1+"),
            Err(SignalParseError::MissingSignalPrefix)
        );
        assert_eq!(
            Signal::from_bytes(b"SG_"),
            Err(SignalParseError::MissingSignalPrefix)
        );
        assert_eq!(
            Signal::from_bytes(b"SG_\tFOO_BAR : 8|16@1+").map(|signal| signal.name() == "FOO_BAR"),
            Ok(true)
        );
    }

    #[test]
    fn name_length_message_tracks_limit() {
        use core::fmt::Write;

        let mut message = heapless::String::<64>::new();
        write!(message, "{}", SignalParseError::NameTooLong(40)).unwrap();

        let mut expected = heapless::String::<64>::new();
        write!(
            expected,
            "Signal name of (40) bytes does not fit (max {})",
            MAX_SIGNAL_NAME_LENGTH
        )
        .unwrap();

        assert_eq!(message, expected);
    }

    #[test]
    fn signal_parse_errors() {
        assert_eq!(Signal::from_bytes(b"   "), Err(SignalParseError::Empty));
        assert_eq!(
            Signal::from_bytes(b"BO_ 36 KINEMATICS: 8 XXX"),
            Err(SignalParseError::MissingSignalPrefix)
        );
        assert_eq!(
            Signal::from_bytes(b"SG_ : 1|10@0-"),
            Err(SignalParseError::EmptyName)
        );
        assert_eq!(
            Signal::from_bytes(b"SG_ Mode M : 0|2@1+"),
            Err(SignalParseError::Multiplexed)
        );
        assert_eq!(
            Signal::from_bytes(b"SG_ Speed m2 : 8|16@1+"),
            Err(SignalParseError::Multiplexed)
        );
        assert_eq!(
            Signal::from_bytes(b"SG_ Speed = 8|16@1+"),
            Err(SignalParseError::UnexpectedByte(b':', b'='))
        );
        assert_eq!(
            Signal::from_bytes(b"SG_ Speed : 8x|16@1+"),
            Err(SignalParseError::IllegalDecimalDigit(b'x'))
        );
        assert_eq!(
            Signal::from_bytes(b"SG_ Speed : 8|16"),
            Err(SignalParseError::Truncated)
        );
        assert_eq!(
            Signal::from_bytes(b"SG_ Speed : 8|16@0"),
            Err(SignalParseError::Truncated)
        );
        assert_eq!(
            Signal::from_bytes(b"SG_ Speed : 8|16@2+"),
            Err(SignalParseError::InvalidByteOrder(b'2'))
        );
        assert_eq!(
            Signal::from_bytes(b"SG_ Speed : 8|16@1*"),
            Err(SignalParseError::InvalidValueType(b'*'))
        );
        assert_eq!(
            Signal::from_bytes(b"SG_ Speed : 8|33@1+"),
            Err(SignalParseError::InvalidLayout(ExtractError::InvalidLength(33)))
        );
        assert_eq!(
            Signal::from_bytes(b"SG_ Speed : 300|8@1+"),
            Err(SignalParseError::DecimalOverflow)
        );
        assert_eq!(
            Signal::from_bytes(b"SG_ Speed : 8|16@1+ (0.01;0)"),
            Err(SignalParseError::Truncated)
        );
        assert_eq!(
            Signal::from_bytes(b"SG_ Speed : 8|16@1+ (fast,0)"),
            Err(SignalParseError::InvalidNumber)
        );
        assert_eq!(
            Signal::from_bytes(b"SG_ Speed : 8|16@1+ (1,0) [0|250"),
            Err(SignalParseError::Truncated)
        );
        assert_eq!(
            Signal::from_bytes(b"SG_ ThisSignalNameIsMuchTooLongToStore : 8|16@1+"),
            Err(SignalParseError::NameTooLong(34))
        );
    }
}
