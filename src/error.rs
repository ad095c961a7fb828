//! Bus transaction errors.
//!
//! Everything here is `Copy` and carries fixed-size data only; nothing in the
//! firmware allocates.

use ufmt::{uDisplay, uWrite, Formatter};

use crate::bitops::Hex;

/// Protocol step of a register read, in wire order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Start,
    SlaveWrite,
    Register,
    RepeatedStart,
    SlaveRead,
    /// Receiving the n-th data byte (0-based).
    Data(u8),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TwiError {
    /// The status register did not hold the code this step must produce.
    Protocol { step: Step, expected: u8, found: u8 },
    /// TWINT never came up within the configured spin limit.
    Timeout { step: Step },
    /// Slave addresses are 7 bits wide.
    AddressOutOfRange(u8),
    /// Asked to read zero bytes.
    EmptyRead,
    /// Asked for more bytes than a data step can index.
    TooLong(usize),
}

impl uDisplay for Step {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match self {
            Step::Start => f.write_str("START"),
            Step::SlaveWrite => f.write_str("SLA+W"),
            Step::Register => f.write_str("register"),
            Step::RepeatedStart => f.write_str("repeated START"),
            Step::SlaveRead => f.write_str("SLA+R"),
            Step::Data(n) => ufmt::uwrite!(f, "data byte {}", n),
        }
    }
}

impl uDisplay for TwiError {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match *self {
            TwiError::Protocol { step, expected, found } => ufmt::uwrite!(
                f,
                "{} failed (status 0x{}, expected 0x{})",
                step,
                Hex(found),
                Hex(expected)
            ),
            TwiError::Timeout { step } => ufmt::uwrite!(f, "{} timed out", step),
            TwiError::AddressOutOfRange(addr) => {
                ufmt::uwrite!(f, "slave address 0x{} is not 7-bit", Hex(addr))
            }
            TwiError::EmptyRead => f.write_str("nothing to read"),
            TwiError::TooLong(len) => ufmt::uwrite!(f, "{} bytes is more than one read can take", len),
        }
    }
}
