//! DS3231 on-die temperature.

use ufmt::{uDisplay, uWrite, Formatter};

use crate::config::{DS3231_ADDR, DS3231_TEMP_REG};
use crate::error::TwiError;
use crate::twi::{TwiMaster, TwiRegisters};

/// Temperature in quarter degrees Celsius, as the DS3231 reports it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Temperature {
    /// Signed count of 0.25 °C steps.
    pub quarters: i16,
}

impl Temperature {
    /// The two registers hold one 10-bit two's-complement value: the upper
    /// eight bits in `msb` (reg 0x11), the lower two in bits 7:6 of `lsb` (reg 0x12).
    pub fn from_registers(msb: u8, lsb: u8) -> Self {
        Self { quarters: i16::from(msb as i8) << 2 | i16::from(lsb >> 6) }
    }
}

// Prints e.g. "24.75" or "-03.25". The DS3231 only reports -40..=85 but
// three-digit values still come out right.
impl uDisplay for Temperature {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        if self.quarters < 0 {
            f.write_char('-')?;
        }
        let abs = self.quarters.unsigned_abs();
        let deg = abs >> 2;
        if deg >= 100 {
            f.write_char((b'0' + (deg / 100) as u8) as char)?;
        }
        f.write_char((b'0' + (deg / 10 % 10) as u8) as char)?;
        f.write_char((b'0' + (deg % 10) as u8) as char)?;
        f.write_str(match abs & 0b11 {
            0b00 => ".00",
            0b01 => ".25",
            0b10 => ".50",
            _ => ".75",
        })
    }
}

/// One 2-byte read covering both temperature registers.
pub fn read_temperature<R: TwiRegisters>(twi: &mut TwiMaster<R>) -> Result<Temperature, TwiError> {
    let mut raw = [0u8; 2];
    twi.read_register(DS3231_ADDR, DS3231_TEMP_REG, &mut raw)?;
    Ok(Temperature::from_registers(raw[0], raw[1]))
}
