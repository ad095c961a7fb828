//! Board constants. Clock, timing and bus parameters all live here so they
//! can be tuned in one place.

/// ATmega328P core clock on the Uno.
pub const CPU_HZ: u32 = 16_000_000;

/// Serial line speed (UBRR0 = 25 at 16 MHz, U2X off). 8-N-1.
pub const BAUD_RATE: u32 = 38_400;

/// Periodic tick rate.
pub const TICK_HZ: u32 = 1_000;

/// Timer0 runs at CPU_HZ / 64 in CTC mode, so the compare value for one tick
/// is 250 counts minus one.
pub const TICK_PRESCALER: u32 = 64;
pub const TICK_COMPARE: u8 = (CPU_HZ / TICK_PRESCALER / TICK_HZ - 1) as u8;

/// Ticks between two blink pattern flips (one second at 1 kHz).
pub const BLINK_TICKS: u16 = 1_000;

/// TWBR value. SCL = CPU_HZ / (16 + 2 * TWBR) with prescaler 1, ~470 kHz max
/// on paper; the DS3231 tolerates it fine on short wires.
pub const TWI_BIT_RATE: u8 = 9;

/// Upper bound on TWINT polls per protocol step before giving up. A byte at
/// the slowest sane SCL takes far fewer iterations than this.
pub const TWI_SPIN_LIMIT: u16 = 10_000;

/// DS3231 real-time clock / temperature sensor.
pub const DS3231_ADDR: u8 = 0x68;
/// Temperature MSB register; the LSB register follows at 0x12.
pub const DS3231_TEMP_REG: u8 = 0x11;

/// Echo accepted keypresses back to the terminal.
pub const ECHO_INPUT: bool = true;
