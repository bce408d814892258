use crate::SignalParseError;

/* Scanning */

pub fn skip_whitespace(buffer: &[u8]) -> &[u8] {
    let start = buffer
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(buffer.len());

    &buffer[start..]
}

/// Splits off the leading run of bytes matching `predicate`
pub fn take_while(buffer: &[u8], predicate: impl Fn(u8) -> bool) -> (&[u8], &[u8]) {
    let end = buffer
        .iter()
        .position(|byte| !predicate(*byte))
        .unwrap_or(buffer.len());

    buffer.split_at(end)
}

/// Splits off everything before `delimiter`. The delimiter stays at the
/// front of the remainder.
pub fn take_until(buffer: &[u8], delimiter: u8) -> (&[u8], &[u8]) {
    take_while(buffer, |byte| byte != delimiter)
}

pub fn expect_byte(buffer: &[u8], expected: u8) -> Result<&[u8], SignalParseError> {
    match buffer.split_first() {
        Some((&found, rest)) if found == expected => Ok(rest),
        Some((&found, _)) => Err(SignalParseError::UnexpectedByte(expected, found)),
        None => Err(SignalParseError::Truncated),
    }
}

pub fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/* Numbers */

pub fn dec_digit_to_u8(byte: u8) -> Result<u8, SignalParseError> {
    Ok(match byte {
        b'0'..=b'9' => byte - b'0',
        _ => return Err(SignalParseError::IllegalDecimalDigit(byte)),
    })
}

pub fn u8_from_dec_digits(digits: &[u8]) -> Result<u8, SignalParseError> {
    let digits = trim_ascii(digits);

    if digits.is_empty() {
        return Err(SignalParseError::Truncated);
    }

    let mut value = 0u8;

    for digit in digits.iter() {
        let digit = dec_digit_to_u8(*digit)?;

        value = value
            .checked_mul(10)
            .and_then(|value| value.checked_add(digit))
            .ok_or(SignalParseError::DecimalOverflow)?;
    }

    Ok(value)
}

pub fn f32_from_ascii(text: &[u8]) -> Result<f32, SignalParseError> {
    core::str::from_utf8(trim_ascii(text))?
        .parse()
        .map_err(|_| SignalParseError::InvalidNumber)
}

fn trim_ascii(text: &[u8]) -> &[u8] {
    let text = skip_whitespace(text);
    let end = text
        .iter()
        .rposition(|byte| !byte.is_ascii_whitespace())
        .map_or(0, |last| last + 1);

    &text[..end]
}
