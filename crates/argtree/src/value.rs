//! Lexical grammars for option values.

/// Parse one of the accepted boolean spellings.
///
/// `true`, `True`, `TRUE` and `1` are true; `false`, `False`, `FALSE` and `0`
/// are false. Anything else is rejected.
pub fn parse_boolean(text: &str) -> Option<bool> {
    match text {
        "true" | "True" | "TRUE" | "1" => Some(true),
        "false" | "False" | "FALSE" | "0" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegerError {
    /// No digits were consumed.
    Empty,
    /// Digits were consumed but characters remain after them.
    Trailing(String),
    /// The numeral does not fit in an `i64`.
    Overflow,
}

/// Parse an integer literal the way C's `strtoll(text, &end, 0)` reads it.
///
/// Leading whitespace and a single `+`/`-` sign are accepted. The base is
/// detected from the prefix: `0x`/`0X` is hexadecimal, a leading `0` is
/// octal, anything else is decimal. The whole string must be consumed.
pub fn parse_integer(text: &str) -> Result<i64, IntegerError> {
    let bytes = text.as_bytes();
    let mut pos = bytes
        .iter()
        .take_while(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c))
        .count();

    let negative = match bytes.get(pos) {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let radix = if bytes.get(pos) == Some(&b'0')
        && matches!(bytes.get(pos + 1), Some(b'x' | b'X'))
        && bytes.get(pos + 2).is_some_and(u8::is_ascii_hexdigit)
    {
        pos += 2;
        16
    } else if bytes.get(pos) == Some(&b'0') {
        8
    } else {
        10
    };

    let digits_start = pos;
    let mut value: Option<i64> = Some(0);
    while let Some(digit) = bytes.get(pos).and_then(|b| (*b as char).to_digit(radix)) {
        value = value.and_then(|v| v.checked_mul(i64::from(radix))).and_then(|v| {
            if negative {
                v.checked_sub(i64::from(digit))
            } else {
                v.checked_add(i64::from(digit))
            }
        });
        pos += 1;
    }

    if pos == digits_start {
        return Err(IntegerError::Empty);
    }
    if pos < bytes.len() {
        return Err(IntegerError::Trailing(text[pos..].to_string()));
    }
    value.ok_or(IntegerError::Overflow)
}
