//! Serial menu firmware core for the Arduino Uno.
//!
//! A 1 kHz tick drives [`scheduler::TickScheduler`], which blinks the LED and
//! gives [`menu::MenuContext`] one poll per tick. The menu reads keys through
//! [`channel::CharacterChannel`] and talks to the DS3231 through
//! [`twi::TwiMaster`].
//!
//! Everything here sits on top of three small capabilities (serial bytes,
//! TWI registers, an output latch), so it runs unchanged on the host under
//! `cargo test`. The board glue lives in `main.rs`.

#![cfg_attr(not(test), no_std)]

pub mod bitops;
pub mod channel;
pub mod config;
pub mod error;
pub mod latch;
pub mod menu;
pub mod scheduler;
pub mod sensor;
pub mod trace;
pub mod twi;

#[cfg(test)]
mod mock;

pub use channel::{ByteTransport, CharResult, CharacterChannel};
pub use error::{Step, TwiError};
pub use latch::{OutputLatch, PinLatch};
pub use menu::{AddressField, BusAddress, DigitEntry, Flow, MenuContext, MenuState};
pub use scheduler::{Blinker, TickScheduler};
pub use twi::{TwiConfig, TwiMaster, TwiRegisters};

/// The peripherals the menu works with, bundled so one `&mut` reaches all of them.
pub struct Board<T, R, L> {
    pub serial: CharacterChannel<T>,
    pub twi: TwiMaster<R>,
    pub led: L,
}

impl<T, R, L> Board<T, R, L>
where
    T: ByteTransport,
    R: TwiRegisters,
    L: OutputLatch,
{
    pub fn new(serial: CharacterChannel<T>, twi: TwiMaster<R>, led: L) -> Self {
        Self { serial, twi, led }
    }
}
