use ufmt::{uDisplay, uWrite, Formatter};

pub fn decomp8(byte: u8) -> [u8; 2] { // ← (high nibble, low nibble)
    [byte >> 4, byte & 0x0F]
}

pub fn comp8(nib: [u8; 2]) -> u8 {
    (nib[0] & 0x0F) << 4 | (nib[1] & 0x0F)
}

// 0-9 → '0'-'9', 10-15 → 'A'-'F'. Anything wider than a nibble has no digit.
pub fn int2hex(nib: u8) -> Option<u8> {
    match nib {
        0..=9 => Some(b'0' + nib),
        10..=15 => Some(b'A' + nib - 10),
        _ => None,
    }
}

// Accepts '0'-'9', 'A'-'F' and 'a'-'f'.
pub fn hex2int(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

/// Byte rendered as exactly two upper-case hex digits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hex(pub u8);

impl uDisplay for Hex {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        for nib in decomp8(self.0) {
            // decomp8 never yields more than 4 bits
            f.write_char(int2hex(nib).unwrap_or(b'?') as char)?;
        }
        Ok(())
    }
}
