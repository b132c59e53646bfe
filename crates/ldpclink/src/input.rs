//! Message entry and display.
//!
//! Hex entry is deliberately forgiving: separators are dropped, an unpaired
//! trailing digit is ignored and a pair that is not valid hex decodes as far
//! as its leading hex digits go (`"G1"` is `0x00`, `"1G"` is `0x01`).

use ldpclink_session::{Message, Result, MAX_MESSAGE_BYTES};

/// Longest text message accepted; one byte of the buffer is reserved.
pub const MAX_TEXT_BYTES: usize = MAX_MESSAGE_BYTES - 1;

/// Bytes per group in [`hex_dump`].
const GROUP: usize = 4;
/// Bytes per line in [`hex_dump`].
const LINE: usize = 16;

/// Message holding the raw bytes of `text`, truncated to [`MAX_TEXT_BYTES`].
pub fn text_to_message(text: &str) -> Result<Message> {
    let bytes = text.as_bytes();
    let len = bytes.len().min(MAX_TEXT_BYTES);
    Message::from_bytes(bytes[..len].to_vec())
}

/// Message decoded from a hex string such as `"AB CD EF 12"`.
///
/// Spaces, carriage returns and line feeds are removed before digits are
/// paired. At most [`MAX_MESSAGE_BYTES`] bytes are decoded.
pub fn hex_to_message(input: &str) -> Result<Message> {
    let digits: Vec<u8> = input
        .bytes()
        .filter(|b| !matches!(b, b' ' | b'\r' | b'\n'))
        .collect();

    let data: Vec<u8> = digits
        .chunks_exact(2)
        .take(MAX_MESSAGE_BYTES)
        .map(decode_pair)
        .collect();
    Message::from_bytes(data)
}

fn decode_pair(pair: &[u8]) -> u8 {
    pair.iter()
        .map_while(|b| char::from(*b).to_digit(16))
        .fold(0u8, |acc, digit| (acc << 4) | digit as u8)
}

/// Uppercase hex, a space between every four bytes and a line per sixteen.
pub fn hex_dump(data: &[u8]) -> String {
    data.chunks(LINE)
        .map(|line| {
            line.chunks(GROUP)
                .map(hex_string)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Contiguous uppercase hex.
pub fn hex_string(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02X}")).collect()
}

/// Printable ASCII as is, everything else as `.`.
pub fn ascii_render(data: &[u8]) -> String {
    data.iter()
        .map(|&b| {
            if (0x20..=0x7E).contains(&b) {
                char::from(b)
            } else {
                '.'
            }
        })
        .collect()
}

/// Leading decimal digits of `input` as a bit count, zero if there are none.
///
/// Surrounding whitespace is ignored. Returns `None` when the digits do not
/// fit in 16 bits.
pub fn parse_bit_count(input: &str) -> Option<u16> {
    let digits: String = input
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return Some(0);
    }
    digits.parse().ok()
}
