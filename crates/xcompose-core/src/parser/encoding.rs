// XCompose Encoding Check
// Early detection of inputs that are not UTF-8

use std::sync::Arc;

use crate::error::{ComposeError, ComposeResult, Location};

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Validate that `input` is UTF-8 and return it without its byte order mark.
///
/// The first character relevant to the grammar (whitespace, `include`, a
/// modifier, a keysym or a comment) is always ASCII, which is enough to
/// reject UTF-16 and UTF-32 inputs early with a precise message.
pub(crate) fn check_encoding<'a>(input: &'a [u8], source: &Arc<str>) -> ComposeResult<&'a str> {
    let input = input.strip_prefix(UTF8_BOM).unwrap_or(input);

    let fail = |line: usize, column: usize, reason: &str| ComposeError::Encoding {
        location: Location::new(source.clone(), line, column),
        reason: reason.to_string(),
    };

    if input.starts_with(b"\xff\xfe") || input.starts_with(b"\xfe\xff") {
        return Err(fail(1, 1, "unexpected UTF-16 or UTF-32 byte order mark"));
    }
    if input.len() >= 2 {
        if input[0] == 0 {
            return Err(fail(1, 1, "unexpected NULL character"));
        }
        if input[1] == 0 {
            return Err(fail(1, 2, "unexpected NULL character"));
        }
    }
    if matches!(input.first(), Some(b) if !b.is_ascii()) {
        return Err(fail(1, 1, "unexpected non-ASCII character"));
    }

    std::str::from_utf8(input).map_err(|err| {
        let valid = &input[..err.valid_up_to()];
        let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
        let line_start = valid
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |idx| idx + 1);
        fail(line, valid.len() - line_start + 1, "invalid UTF-8 sequence")
    })
}
