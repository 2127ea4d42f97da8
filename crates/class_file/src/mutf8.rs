//! The JVM's "modified UTF-8" (§4.4.7).
//!
//! Text is handled as UTF-16 code units: NUL takes two bytes and a
//! supplementary character is written as its two surrogates, three bytes each.

const REPLACEMENT: u16 = 0xfffd;

fn is_continuation(b: u8) -> bool {
    b & 0xc0 == 0x80
}

/// Decodes modified UTF-8.
///
/// A truncated trailing sequence ends the text. Unrecognized leading bytes and
/// unpaired surrogates come out as U+FFFD.
pub fn decode(bytes: &[u8]) -> String {
    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let x = bytes[i];
        if x & 0x80 == 0 {
            units.push(x as u16);
            i += 1;
        } else if x & 0xe0 == 0xc0 {
            let Some(&y) = bytes.get(i + 1) else {
                break;
            };
            if !is_continuation(y) {
                units.push(REPLACEMENT);
                i += 1;
                continue;
            }
            units.push(((x as u16 & 0x1f) << 6) | (y as u16 & 0x3f));
            i += 2;
        } else if x & 0xf0 == 0xe0 {
            let (Some(&y), Some(&z)) = (bytes.get(i + 1), bytes.get(i + 2)) else {
                break;
            };
            if !is_continuation(y) || !is_continuation(z) {
                units.push(REPLACEMENT);
                i += 1;
                continue;
            }
            units.push(((x as u16 & 0x0f) << 12) | ((y as u16 & 0x3f) << 6) | (z as u16 & 0x3f));
            i += 3;
        } else {
            units.push(REPLACEMENT);
            i += 1;
        }
    }

    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

pub fn encode(text: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(text));
    for unit in text.encode_utf16() {
        match unit {
            0x0001..=0x007f => buf.push(unit as u8),
            0x0000 | 0x0080..=0x07ff => {
                buf.push(0xc0 | ((unit >> 6) as u8 & 0x1f));
                buf.push(0x80 | (unit as u8 & 0x3f));
            }
            _ => {
                buf.push(0xe0 | ((unit >> 12) as u8 & 0x0f));
                buf.push(0x80 | ((unit >> 6) as u8 & 0x3f));
                buf.push(0x80 | (unit as u8 & 0x3f));
            }
        }
    }
    buf
}

/// Length of [`encode`]'s output without allocating it.
pub fn encoded_len(text: &str) -> usize {
    text.encode_utf16()
        .map(|unit| match unit {
            0x0001..=0x007f => 1,
            0x0000 | 0x0080..=0x07ff => 2,
            _ => 3,
        })
        .sum()
}
