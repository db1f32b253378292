//! Presentation of parser diagnostics: locating an [`ErrorMsg`]'s byte
//! offset in the source and rendering an excerpt-plus-caret block.

use crate::ir::ErrorMsg;

/// Converts a byte offset within `source` to a 1-based `(line, col)` pair.
///
/// ZIR diagnostics carry byte offsets, so the column counts bytes, not
/// characters. Offsets past the end of the buffer land on the last line,
/// one column past its final byte.
pub fn byte_to_line_col(source: &str, byte: u32) -> (u32, u32) {
    let at = (byte as usize).min(source.len());
    let before = &source.as_bytes()[..at];
    let line = 1 + before.iter().filter(|&&b| b == b'\n').count() as u32;
    let col = 1 + before.iter().rev().take_while(|&&b| b != b'\n').count() as u32;
    (line, col)
}

/// Byte span of the line containing `byte`, without its newline.
fn line_span(source: &str, byte: u32) -> (usize, usize) {
    let bytes = source.as_bytes();
    let at = (byte as usize).min(bytes.len());
    let start = match bytes[..at].iter().rposition(|&b| b == b'\n') {
        Some(newline) => newline + 1,
        None => 0,
    };
    let end = bytes[at..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |i| at + i);
    (start, end)
}

/// Renders a caret diagnostic for `err` against the source it was parsed
/// from.
///
/// ```text
/// error: unknown instruction 'frobnicate' (byte 47)
///  --> 3:6
/// 3 | @2 = frobnicate()
///   |      ^
/// ```
pub fn render_error(source: &str, err: &ErrorMsg) -> String {
    let (line, col) = byte_to_line_col(source, err.byte);
    let (start, end) = line_span(source, err.byte);
    let number = line.to_string();
    let mut out = format!("error: {}\n --> {}:{}\n", err, line, col);
    out.push_str(&format!("{} | {}\n", number, &source[start..end]));
    // Right-aligning "^" in a col-wide field puts it under the offending
    // byte of the excerpt above.
    out.push_str(&format!(
        "{:pad$} | {:>width$}\n",
        "",
        "^",
        pad = number.len(),
        width = col as usize
    ));
    out
}
