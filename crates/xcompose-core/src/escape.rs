// XCompose Escape Codec
// Decodes string literal escapes and produces safely re-parsable literals

use std::collections::TryReserveError;

/// Errors raised by the codec
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("cannot allocate the escape buffer: {0}")]
    Allocation(#[from] TryReserveError),
}

/// A decoded literal plus the escapes that were absorbed while decoding it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decoded {
    pub bytes: Vec<u8>,
    pub dropped: Vec<DroppedEscape>,
}

/// An escape sequence that produced no output byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedEscape {
    /// Byte offset of the backslash, or of a raw NUL, within the literal body
    pub offset: usize,
    pub reason: DropReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Octal value larger than one byte
    OctalOverflow,
    /// Raw NUL byte, or an escape that decodes to NUL
    Nul,
    /// `\x` not followed by a hexadecimal digit
    MissingHexDigits,
    /// Backslash followed by a character with no escape meaning
    UnknownEscape,
}

/// Decode the body of a string literal (the bytes between the quotes).
///
/// Recognised escapes are `\\`, `\"`, `\x` or `\X` with one or two hex
/// digits, and one to three octal digits. Bytes that are not part of an
/// escape are copied verbatim, except raw NUL bytes. NUL in any form and
/// octal values above 255 are dropped, as are the backslashes of unknown
/// escapes. The output never contains a NUL.
pub fn decode(body: &[u8]) -> Result<Decoded, CodecError> {
    let mut out = Vec::new();
    out.try_reserve(body.len())?;
    let mut dropped = Vec::new();

    let mut pos = 0;
    while pos < body.len() {
        let byte = body[pos];
        if byte == 0 {
            dropped.push(DroppedEscape {
                offset: pos,
                reason: DropReason::Nul,
            });
            pos += 1;
            continue;
        }
        if byte != b'\\' {
            out.push(byte);
            pos += 1;
            continue;
        }

        let start = pos;
        pos += 1;
        let drop_reason = match body.get(pos) {
            Some(b'\\') | Some(b'"') => {
                out.push(body[pos]);
                pos += 1;
                None
            }
            Some(b'x') | Some(b'X') => {
                pos += 1;
                let (value, digits) = take_digits(&body[pos..], 2, 16);
                pos += digits;
                match (digits, value) {
                    (0, _) => Some(DropReason::MissingHexDigits),
                    (_, 0) => Some(DropReason::Nul),
                    (_, v) => {
                        out.push(v as u8);
                        None
                    }
                }
            }
            Some(b'0'..=b'7') => {
                let (value, digits) = take_digits(&body[pos..], 3, 8);
                pos += digits;
                match value {
                    0 => Some(DropReason::Nul),
                    v if v > 0xff => Some(DropReason::OctalOverflow),
                    v => {
                        out.push(v as u8);
                        None
                    }
                }
            }
            // The escaped character itself is kept by the next iteration.
            _ => Some(DropReason::UnknownEscape),
        };

        if let Some(reason) = drop_reason {
            dropped.push(DroppedEscape {
                offset: start,
                reason,
            });
        }
    }

    Ok(Decoded {
        bytes: out,
        dropped,
    })
}

/// Consume up to `max` digits of `radix` from the front of `input`.
fn take_digits(input: &[u8], max: usize, radix: u32) -> (u32, usize) {
    let mut value = 0u32;
    let mut count = 0;
    for &byte in input.iter().take(max) {
        match (byte as char).to_digit(radix) {
            Some(digit) => {
                value = value * radix + digit;
                count += 1;
            }
            None => break,
        }
    }
    (value, count)
}

/// Encode UTF-8 text as the body of a string literal.
///
/// Only the strict minimum is escaped: control characters up to 0x10 and
/// DEL become `\xHH`, quote and backslash are backslash-escaped. A hex
/// digit directly after a `\xHH` escape is escaped too, so the result never
/// depends on how many digits a decoder consumes. Non-ASCII bytes are
/// copied unchanged.
pub fn encode(text: &str) -> Result<String, CodecError> {
    let mut out = String::new();
    // Longest escape turns one byte into four.
    out.try_reserve(text.len().saturating_mul(4))?;

    let mut previous_is_hex_escape = false;
    for ch in text.chars() {
        if !ch.is_ascii() {
            out.push(ch);
            previous_is_hex_escape = false;
            continue;
        }
        let byte = ch as u8;
        if byte <= 0x10 || byte == 0x7f || (previous_is_hex_escape && byte.is_ascii_hexdigit()) {
            out.push_str(&format!("\\x{:02x}", byte));
            previous_is_hex_escape = true;
        } else if byte == b'"' || byte == b'\\' {
            out.push('\\');
            out.push(ch);
            previous_is_hex_escape = false;
        } else {
            out.push(ch);
            previous_is_hex_escape = false;
        }
    }

    out.shrink_to_fit();
    Ok(out)
}
