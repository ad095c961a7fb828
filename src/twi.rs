//! Master-mode TWI (two-wire / I2C) register reads.
//!
//! Only one transaction shape is supported: write the register address, then
//! read `n` bytes back after a repeated START:
//!
//! ```text
//! S  SLA+W  A  REG  A  Sr  SLA+R  A  D0  A  ...  Dn-1  N  P
//! ```
//!
//! Each step hands a control word to TWCR, spins on TWINT and then checks the
//! status code in TWSR. The spin is bounded by [`TwiConfig::spin_limit`].

use crate::config::{TWI_BIT_RATE, TWI_SPIN_LIMIT};
use crate::error::{Step, TwiError};

/// TWCR bits.
pub mod twcr {
    pub const TWINT: u8 = 1 << 7;
    pub const TWEA: u8 = 1 << 6;
    pub const TWSTA: u8 = 1 << 5;
    pub const TWSTO: u8 = 1 << 4;
    pub const TWEN: u8 = 1 << 2;
}

/// TWSR status codes (prescaler bits masked off), master modes only.
pub mod status {
    pub const MASK: u8 = 0xF8;

    pub const START: u8 = 0x08;
    pub const REP_START: u8 = 0x10;
    pub const MT_SLA_ACK: u8 = 0x18;
    pub const MT_SLA_NACK: u8 = 0x20;
    pub const MT_DATA_ACK: u8 = 0x28;
    pub const MT_DATA_NACK: u8 = 0x30;
    pub const ARB_LOST: u8 = 0x38;
    pub const MR_SLA_ACK: u8 = 0x40;
    pub const MR_SLA_NACK: u8 = 0x48;
    pub const MR_DATA_ACK: u8 = 0x50;
    pub const MR_DATA_NACK: u8 = 0x58;
}

const WRITE: u8 = 0;
const READ: u8 = 1;

/// Register-level access to the TWI peripheral. The board implements this on
/// top of the PAC; tests script it.
pub trait TwiRegisters {
    fn set_bit_rate(&mut self, twbr: u8);
    fn set_control(&mut self, twcr: u8);
    fn control(&self) -> u8;
    /// Raw TWSR, prescaler bits included.
    fn status(&self) -> u8;
    fn set_data(&mut self, twdr: u8);
    fn data(&self) -> u8;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TwiConfig {
    pub bit_rate: u8,
    pub spin_limit: u16,
    /// Validate the status after the repeated START (0x10). The bus has always
    /// been run without this check; turning it on makes a misbehaving slave
    /// fail at the repeated START instead of at SLA+R.
    pub check_repeated_start: bool,
}

impl Default for TwiConfig {
    fn default() -> Self {
        Self {
            bit_rate: TWI_BIT_RATE,
            spin_limit: TWI_SPIN_LIMIT,
            check_repeated_start: false,
        }
    }
}

/// Longest single read; data steps are indexed with a `u8`.
pub const MAX_READ: usize = 256;

pub struct TwiMaster<R> {
    regs: R,
    config: TwiConfig,
}

impl<R: TwiRegisters> TwiMaster<R> {
    pub fn new(regs: R, config: TwiConfig) -> Self {
        Self { regs, config }
    }

    /// Program the bit rate and enable the peripheral.
    pub fn init(&mut self) {
        self.regs.set_bit_rate(self.config.bit_rate);
        self.regs.set_control(twcr::TWEN);
    }

    pub fn regs(&self) -> &R {
        &self.regs
    }

    /// Read `buf.len()` bytes starting at `register` of `slave`.
    ///
    /// Runs with interrupts masked so nothing else gets to poke the peripheral
    /// between a control write and its TWINT. On success `buf` is completely
    /// filled; on error its contents are unspecified and must not be used.
    pub fn read_register(&mut self, slave: u8, register: u8, buf: &mut [u8]) -> Result<(), TwiError> {
        if slave > 0x7F {
            return Err(TwiError::AddressOutOfRange(slave));
        }
        if buf.is_empty() {
            return Err(TwiError::EmptyRead);
        }
        if buf.len() > MAX_READ {
            return Err(TwiError::TooLong(buf.len()));
        }

        critical_section::with(|_| {
            let res = self.transfer(slave, register, buf);
            // Release the bus either way; START has already gone out.
            self.stop();
            res
        })
    }

    pub fn read_single(&mut self, slave: u8, register: u8) -> Result<u8, TwiError> {
        let mut byte = [0u8];
        self.read_register(slave, register, &mut byte)?;
        Ok(byte[0])
    }

    fn transfer(&mut self, slave: u8, register: u8, buf: &mut [u8]) -> Result<(), TwiError> {
        use twcr::*;

        self.command(TWEN | TWSTA | TWINT, Step::Start)?;
        self.expect(Step::Start, status::START)?;

        self.regs.set_data(slave << 1 | WRITE);
        self.command(TWEN | TWINT, Step::SlaveWrite)?;
        self.expect(Step::SlaveWrite, status::MT_SLA_ACK)?;

        self.regs.set_data(register);
        self.command(TWEN | TWINT, Step::Register)?;
        self.expect(Step::Register, status::MT_DATA_ACK)?;

        self.command(TWEN | TWSTA | TWINT, Step::RepeatedStart)?;
        if self.config.check_repeated_start {
            self.expect(Step::RepeatedStart, status::REP_START)?;
        }

        self.regs.set_data(slave << 1 | READ);
        self.command(TWEN | TWINT, Step::SlaveRead)?;
        self.expect(Step::SlaveRead, status::MR_SLA_ACK)?;

        let last = buf.len() - 1;
        for (i, byte) in buf.iter_mut().enumerate() {
            let step = Step::Data(i as u8);
            // ACK everything but the last byte; the NACK tells the slave we're done.
            if i == last {
                self.command(TWEN | TWINT, step)?;
                self.expect(step, status::MR_DATA_NACK)?;
            } else {
                self.command(TWEN | TWINT | TWEA, step)?;
                self.expect(step, status::MR_DATA_ACK)?;
            }
            *byte = self.regs.data();
        }

        Ok(())
    }

    fn command(&mut self, control: u8, step: Step) -> Result<(), TwiError> {
        self.regs.set_control(control);
        for _ in 0..self.config.spin_limit {
            if self.regs.control() & twcr::TWINT != 0 {
                return Ok(());
            }
        }
        Err(TwiError::Timeout { step })
    }

    fn expect(&self, step: Step, expected: u8) -> Result<(), TwiError> {
        let found = self.regs.status() & status::MASK;
        if found == expected {
            Ok(())
        } else {
            Err(TwiError::Protocol { step, expected, found })
        }
    }

    // TWINT is not set after a STOP; TWSTO clears itself once it is on the wire.
    fn stop(&mut self) {
        use twcr::*;

        self.regs.set_control(TWEN | TWINT | TWSTO);
        for _ in 0..self.config.spin_limit {
            if self.regs.control() & TWSTO == 0 {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::twcr::*;
    use super::*;
    use crate::mock::ScriptedTwi;

    const DS3231_OK: [u8; 4] = [status::START, status::MT_SLA_ACK, status::MT_DATA_ACK, status::REP_START];

    fn engine(script: &[u8], data: &[u8]) -> TwiMaster<ScriptedTwi> {
        TwiMaster::new(ScriptedTwi::new(script, data), TwiConfig::default())
    }

    #[test]
    fn twi_read_single_std() {
        let mut script = DS3231_OK.to_vec();
        script.extend([status::MR_SLA_ACK, status::MR_DATA_NACK]);
        let mut twi = engine(&script, &[0x19]);

        assert_eq!(twi.read_single(0x68, 0x11), Ok(0x19));

        let regs = twi.regs();
        assert_eq!(regs.sent_data(), [0xD0, 0x11, 0xD1]);
        assert_eq!(
            regs.controls(),
            [
                TWEN | TWSTA | TWINT,
                TWEN | TWINT,
                TWEN | TWINT,
                TWEN | TWSTA | TWINT,
                TWEN | TWINT,
                TWEN | TWINT, // ← last (only) byte: no TWEA
                TWEN | TWINT | TWSTO,
            ]
        );
        assert!(regs.script_done());
    }

    #[test]
    fn twi_read_multi_acks_all_but_last() {
        let mut script = DS3231_OK.to_vec();
        script.extend([status::MR_SLA_ACK, status::MR_DATA_ACK, status::MR_DATA_ACK, status::MR_DATA_NACK]);
        let mut twi = engine(&script, &[1, 2, 3]);
        let mut buf = [0u8; 3];

        assert_eq!(twi.read_register(0x68, 0x00, &mut buf), Ok(()));
        assert_eq!(buf, [1, 2, 3]);

        let ctl = twi.regs().controls();
        assert_eq!(&ctl[5..8], [TWEN | TWINT | TWEA, TWEN | TWINT | TWEA, TWEN | TWINT]);
    }

    #[test]
    fn twi_sla_nack_aborts() {
        let mut twi = engine(&[status::START, status::MT_SLA_NACK], &[]);

        assert_eq!(
            twi.read_single(0x68, 0x11),
            Err(TwiError::Protocol { step: Step::SlaveWrite, expected: status::MT_SLA_ACK, found: status::MT_SLA_NACK })
        );

        // Aborted right after SLA+W, then STOP.
        let ctl = twi.regs().controls();
        assert_eq!(ctl.len(), 3);
        assert_eq!(ctl[2], TWEN | TWINT | TWSTO);
        assert_eq!(twi.regs().sent_data(), [0xD0]);
    }

    #[test]
    fn twi_prescaler_bits_ignored() {
        // TWPS bits live in the low bits of TWSR.
        let script = [status::START | 0x03, status::MT_SLA_ACK | 0x01, status::MT_DATA_ACK, 0x00, status::MR_SLA_ACK, status::MR_DATA_NACK];
        let mut twi = engine(&script, &[0x42]);

        assert_eq!(twi.read_single(0x68, 0x11), Ok(0x42));
    }

    #[test]
    fn twi_rep_start_unchecked_by_default() {
        // Garbage status after Sr goes unnoticed unless asked for.
        let script = [status::START, status::MT_SLA_ACK, status::MT_DATA_ACK, status::ARB_LOST, status::MR_SLA_ACK, status::MR_DATA_NACK];
        let mut twi = engine(&script, &[0x07]);
        assert_eq!(twi.read_single(0x68, 0x11), Ok(0x07));

        let cfg = TwiConfig { check_repeated_start: true, ..TwiConfig::default() };
        let mut strict = TwiMaster::new(ScriptedTwi::new(&script, &[0x07]), cfg);
        assert_eq!(
            strict.read_single(0x68, 0x11),
            Err(TwiError::Protocol { step: Step::RepeatedStart, expected: status::REP_START, found: status::ARB_LOST })
        );
    }

    #[test]
    fn twi_data_mismatch() {
        let mut script = DS3231_OK.to_vec();
        script.extend([status::MR_SLA_ACK, status::MR_DATA_ACK, status::MR_DATA_ACK]);
        let mut twi = engine(&script, &[9, 9]);
        let mut buf = [0u8; 2];

        assert_eq!(
            twi.read_register(0x68, 0x11, &mut buf),
            Err(TwiError::Protocol { step: Step::Data(1), expected: status::MR_DATA_NACK, found: status::MR_DATA_ACK })
        );
    }

    #[test]
    fn twi_timeout_when_twint_stuck() {
        let mut regs = ScriptedTwi::new(&[], &[]);
        regs.stall();
        let mut twi = TwiMaster::new(regs, TwiConfig { spin_limit: 16, ..TwiConfig::default() });

        assert_eq!(twi.read_single(0x68, 0x11), Err(TwiError::Timeout { step: Step::Start }));
    }

    #[test]
    fn twi_rejects_before_touching_bus() {
        let mut twi = engine(&[], &[]);

        assert_eq!(twi.read_single(0xA5, 0x11), Err(TwiError::AddressOutOfRange(0xA5)));
        assert_eq!(twi.read_register(0x68, 0x11, &mut []), Err(TwiError::EmptyRead));
        assert!(twi.regs().controls().is_empty());
    }

    #[test]
    fn twi_len_limit() {
        let mut twi = engine(&[], &[]);
        let mut big = [0u8; MAX_READ + 1];

        assert_eq!(twi.read_register(0x68, 0x00, &mut big), Err(TwiError::TooLong(257)));
        assert!(twi.regs().controls().is_empty());

        // The last allowed byte is still named by its own index.
        let mut script = DS3231_OK.to_vec();
        script.push(status::MR_SLA_ACK);
        script.extend([status::MR_DATA_ACK; MAX_READ - 1]);
        script.push(status::MR_DATA_ACK); // ← should have been NACK
        let mut twi = engine(&script, &[0; MAX_READ]);
        let mut buf = [0u8; MAX_READ];
        assert_eq!(
            twi.read_register(0x68, 0x00, &mut buf),
            Err(TwiError::Protocol { step: Step::Data(255), expected: status::MR_DATA_NACK, found: status::MR_DATA_ACK })
        );
    }

    #[test]
    fn twi_init_sets_rate() {
        let mut twi = engine(&[], &[]);
        twi.init();

        assert_eq!(twi.regs().bit_rate(), Some(TWI_BIT_RATE));
        assert_eq!(twi.regs().controls(), [TWEN]);
    }
}
