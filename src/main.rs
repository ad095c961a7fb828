#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]

use arduino_hal::pac::TWI;
use arduino_hal::prelude::*;
use avr_device::interrupt::{self, Mutex};
use core::cell::Cell;
use core::convert::Infallible;
use panic_halt as _;
use unomenu::config::{BAUD_RATE, TICK_COMPARE};
use unomenu::{
    Board, ByteTransport, CharacterChannel, PinLatch, TickScheduler, TwiConfig, TwiMaster,
    TwiRegisters,
};

// Ticks the ISR has counted but the main loop has not run yet.
static PENDING_TICKS: Mutex<Cell<u16>> = Mutex::new(Cell::new(0));

struct UsartTransport(arduino_hal::DefaultSerial);

impl ByteTransport for UsartTransport {
    fn read(&mut self) -> nb::Result<u8, Infallible> {
        self.0.read()
    }

    fn write(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        self.0.write_byte(byte); // ← waits on UDRE0 itself
        Ok(())
    }
}

struct TwiPeripheral(TWI);

impl TwiRegisters for TwiPeripheral {
    fn set_bit_rate(&mut self, twbr: u8) {
        self.0.twsr().write(|w| unsafe { w.bits(0) }); // ← TWPS = 0, prescaler 1
        self.0.twbr().write(|w| unsafe { w.bits(twbr) });
    }

    fn set_control(&mut self, twcr: u8) {
        self.0.twcr().write(|w| unsafe { w.bits(twcr) });
    }

    fn control(&self) -> u8 {
        self.0.twcr().read().bits()
    }

    fn status(&self) -> u8 {
        self.0.twsr().read().bits()
    }

    fn set_data(&mut self, twdr: u8) {
        self.0.twdr().write(|w| unsafe { w.bits(twdr) });
    }

    fn data(&self) -> u8 {
        self.0.twdr().read().bits()
    }
}

// Timer0, CTC on OCR0A, clk/64: one compare match per millisecond.
fn setup_tick_timer(tc0: &arduino_hal::pac::TC0) {
    tc0.tccr0a().write(|w| w.wgm0().ctc());
    tc0.ocr0a().write(|w| unsafe { w.bits(TICK_COMPARE) });
    tc0.tccr0b().write(|w| w.cs0().prescale_64());
    tc0.timsk0().write(|w| w.ocie0a().set_bit());
}

#[avr_device::interrupt(atmega328p)]
fn TIMER0_COMPA() {
    interrupt::free(|cs| {
        let pending = PENDING_TICKS.borrow(cs);
        pending.set(pending.get().saturating_add(1));
    });
}

#[arduino_hal::entry]
fn main() -> ! {
    let dp = arduino_hal::Peripherals::take().unwrap();
    let pins = arduino_hal::pins!(dp);

    let serial = arduino_hal::default_serial!(dp, pins, BAUD_RATE);

    // SDA/SCL pull-ups; TWEN takes the pins over once the bus is enabled.
    let _sda = pins.a4.into_pull_up_input();
    let _scl = pins.a5.into_pull_up_input();
    let mut twi = TwiMaster::new(TwiPeripheral(dp.TWI), TwiConfig::default());
    twi.init();

    let led = PinLatch::new(pins.d13.into_output());

    let mut board = Board::new(CharacterChannel::new(UsartTransport(serial)), twi, led);
    let mut scheduler = TickScheduler::new(&board.led);

    setup_tick_timer(&dp.TC0);
    unsafe { avr_device::interrupt::enable() };

    loop {
        let due = interrupt::free(|cs| PENDING_TICKS.borrow(cs).replace(0));
        for _ in 0..due {
            scheduler.tick(&mut board);
        }
    }
}
