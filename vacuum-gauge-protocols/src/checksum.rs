//! Frame checksum
//!
//! One printable byte: the sum of all address and payload bytes modulo 64,
//! offset into the range `64..=127` (`@` to DEL).

/// Checksum of `data` (address followed by payload)
#[inline]
#[must_use]
pub fn checksum(data: &[u8]) -> u8 {
    let sum = data.iter().fold(0u32, |acc, &b| acc + b as u32);
    (sum % 64) as u8 + 64
}

/// Whether `expected` is the checksum of `data`
#[inline]
#[must_use]
pub fn verify(data: &[u8], expected: u8) -> bool {
    checksum(data) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_manual_sum() {
        let sum: u32 = [b'0', b'0', b'1', b'T'].iter().map(|&b| b as u32).sum();
        assert_eq!(checksum(b"001T"), (sum % 64) as u8 + 64);
    }

    #[test]
    fn always_printable() {
        for len in 0..16 {
            let data = [0xffu8; 16];
            let c = checksum(&data[..len]);
            assert!((64..=127).contains(&c));
        }
    }

    #[test]
    fn detects_corruption() {
        let c = checksum(b"001T");
        assert!(verify(b"001T", c));
        assert!(!verify(b"001T", c + 1));
        assert!(!verify(b"001M", c));
    }
}
