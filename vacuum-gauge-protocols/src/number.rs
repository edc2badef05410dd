//! ASCII number codecs
//!
//! ## Pressure: `MMMMEE`
//!
//! Four mantissa digits and a two-digit biased exponent, value in mbar:
//!
//! ```text
//! p = MMMM · 10^(EE − 23)
//!
//! "123017" → 1230 · 10^-6  = 1.23e-3 mbar
//! "987619" → 9876 · 10^-4  = 0.9876 mbar
//! "123421" → 1234 · 10^-2  = 12.34 mbar
//! "000020" → 0
//! ```
//!
//! ## Calibration factor
//!
//! The factor times 100 as a plain integer: `"123"` is 1.23, `"99"` is 0.99.
//! Decimal points are not accepted.
//!
//! ## Registers
//!
//! Small integers (setpoint selectors, Penning state) travel as six
//! zero-padded digits.

use heapless::Vec;
use vacuum_gauge_core::FrameError;

/// Digits of one encoded field
pub type Digits = Vec<u8, 6>;

const EXPONENT_BIAS: i32 = 23;

fn parse_digits(data: &[u8]) -> Option<u32> {
    if data.is_empty() || data.len() > 9 {
        return None;
    }
    data.iter().try_fold(0u32, |acc, &b| {
        b.is_ascii_digit().then(|| acc * 10 + (b - b'0') as u32)
    })
}

fn write_padded(value: u32, width: usize) -> Result<Digits, FrameError> {
    let mut digits = Digits::new();
    let mut rest = value;
    for _ in 0..width {
        digits
            .push(b'0' + (rest % 10) as u8)
            .map_err(|_| FrameError::Overflow)?;
        rest /= 10;
    }
    if rest != 0 {
        return Err(FrameError::Overflow);
    }
    digits.reverse();
    Ok(digits)
}

fn write_plain(value: u32) -> Result<Digits, FrameError> {
    let mut width = 1;
    let mut rest = value / 10;
    while rest > 0 {
        width += 1;
        rest /= 10;
    }
    write_padded(value, width)
}

/// Decode a `MMMMEE` pressure in mbar
pub fn decode_pressure(data: &[u8]) -> Result<f64, FrameError> {
    if data.len() != 6 {
        return Err(FrameError::Malformed {
            reason: "pressure field must be six digits",
        });
    }
    let malformed = FrameError::Malformed {
        reason: "pressure field is not numeric",
    };
    let mantissa = parse_digits(&data[..4]).ok_or(malformed)?;
    let exponent = parse_digits(&data[4..]).ok_or(malformed)? as i32;
    Ok(mantissa as f64 * libm::pow(10.0, (exponent - EXPONENT_BIAS) as f64))
}

/// Encode a pressure in mbar as `MMMMEE`
pub fn encode_pressure(mbar: f64) -> Result<Digits, FrameError> {
    if !mbar.is_finite() || mbar < 0.0 {
        return Err(FrameError::Malformed {
            reason: "pressure must be finite and non-negative",
        });
    }
    if mbar == 0.0 {
        return write_padded(20, 6);
    }

    let mut exponent = libm::floor(libm::log10(mbar)) as i32;
    let mut mantissa = libm::round(mbar / libm::pow(10.0, (exponent - 3) as f64)) as u32;
    if mantissa >= 10_000 {
        mantissa = libm::round(mantissa as f64 / 10.0) as u32;
        exponent += 1;
    }

    let biased = exponent - 3 + EXPONENT_BIAS;
    if biased < 0 {
        // Below the smallest representable pressure
        return write_padded(20, 6);
    }
    if biased > 99 {
        return Err(FrameError::Overflow);
    }
    write_padded(mantissa * 100 + biased as u32, 6)
}

/// Decode a calibration factor (`"123"` → 1.23)
pub fn decode_calibration(data: &[u8]) -> Result<f64, FrameError> {
    parse_digits(data)
        .map(|hundredths| hundredths as f64 / 100.0)
        .ok_or(FrameError::Malformed {
            reason: "calibration field is not an integer",
        })
}

/// Encode a calibration factor (1.23 → `"123"`)
pub fn encode_calibration(factor: f64) -> Result<Digits, FrameError> {
    let hundredths = libm::round(factor * 100.0);
    if !hundredths.is_finite() || !(0.0..=999_999.0).contains(&hundredths) {
        return Err(FrameError::Overflow);
    }
    write_plain(hundredths as u32)
}

/// Decode an integer register of up to six digits
pub fn decode_register(data: &[u8]) -> Result<u32, FrameError> {
    if data.len() > 6 {
        return Err(FrameError::Overflow);
    }
    parse_digits(data).ok_or(FrameError::Malformed {
        reason: "register field is not an integer",
    })
}

/// Encode an integer register as six zero-padded digits
pub fn encode_register(value: u32) -> Result<Digits, FrameError> {
    write_padded(value, 6)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1e-30)
    }

    #[test]
    fn pressure_encoding() {
        assert_eq!(&encode_pressure(1.23e-3).unwrap()[..], b"123017");
        assert_eq!(&encode_pressure(0.9876).unwrap()[..], b"987619");
        assert_eq!(&encode_pressure(12.34).unwrap()[..], b"123421");
        assert_eq!(&encode_pressure(9999.0).unwrap()[..], b"999923");
        assert_eq!(&encode_pressure(1000.0).unwrap()[..], b"100023");
        assert_eq!(&encode_pressure(0.0).unwrap()[..], b"000020");
    }

    #[test]
    fn pressure_mantissa_carry() {
        // 9.99996 rounds up to 10000 and carries into the exponent
        assert_eq!(&encode_pressure(9.99996).unwrap()[..], b"100021");
    }

    #[test]
    fn pressure_rejects_unphysical() {
        assert!(encode_pressure(-1.0).is_err());
        assert!(encode_pressure(f64::NAN).is_err());
        assert_eq!(encode_pressure(1e90), Err(FrameError::Overflow));
    }

    #[test]
    fn pressure_decoding() {
        assert!(approx(decode_pressure(b"123417").unwrap(), 1.234e-3));
        assert!(approx(decode_pressure(b"987619").unwrap(), 0.9876));
        assert!(approx(decode_pressure(b"123421").unwrap(), 12.34));
        assert_eq!(decode_pressure(b"000019").unwrap(), 0.0);
    }

    #[test]
    fn pressure_decoding_rejects_malformed() {
        for bad in [&b"abc123"[..], b"12345", b"1234567", b""] {
            assert!(decode_pressure(bad).is_err(), "{:?}", bad);
        }
    }

    #[test]
    fn calibration_codec() {
        assert_eq!(&encode_calibration(1.23).unwrap()[..], b"123");
        assert_eq!(&encode_calibration(0.987).unwrap()[..], b"99");
        assert_eq!(&encode_calibration(10.0).unwrap()[..], b"1000");
        assert_eq!(&encode_calibration(0.995).unwrap()[..], b"100");
        assert_eq!(&encode_calibration(0.0).unwrap()[..], b"0");

        assert_eq!(decode_calibration(b"123").unwrap(), 1.23);
        assert_eq!(decode_calibration(b"99").unwrap(), 0.99);
        assert_eq!(decode_calibration(b"1000").unwrap(), 10.0);
        assert_eq!(decode_calibration(b"0").unwrap(), 0.0);
    }

    #[test]
    fn calibration_rejects_decimals() {
        assert!(decode_calibration(b"12.3").is_err());
        assert!(decode_calibration(b"abc").is_err());
        assert!(decode_calibration(b"").is_err());
        assert!(encode_calibration(-1.0).is_err());
    }

    #[test]
    fn registers_are_padded() {
        assert_eq!(&encode_register(1).unwrap()[..], b"000001");
        assert_eq!(&encode_register(123).unwrap()[..], b"000123");
        assert_eq!(decode_register(b"000042").unwrap(), 42);
        assert_eq!(decode_register(b"2").unwrap(), 2);
        assert!(encode_register(1_000_000).is_err());
    }
}
