use embedded_hal::digital::{PinState, StatefulOutputPin};

/// 8-bit output latch. Shared between the blink scheduler and the LED menu;
/// whoever reads it must assume the other side may have changed it.
pub trait OutputLatch {
    fn get(&self) -> u8;
    fn set(&mut self, value: u8);
}

/// A single output pin seen as a latch: any nonzero value drives it high and
/// a high pin reads back as 0xFF.
pub struct PinLatch<P> {
    pin: P,
    level: u8,
}

impl<P: StatefulOutputPin> PinLatch<P> {
    pub fn new(mut pin: P) -> Self {
        let level = match pin.is_set_high() {
            Ok(true) => 0xFF,
            _ => 0x00,
        };
        Self { pin, level }
    }
}

impl<P: StatefulOutputPin> OutputLatch for PinLatch<P> {
    fn get(&self) -> u8 {
        self.level
    }

    fn set(&mut self, value: u8) {
        let state = PinState::from(value != 0);
        // On a failing pin keep the last level so the blink logic sees no change.
        if self.pin.set_state(state).is_ok() {
            self.level = if value != 0 { 0xFF } else { 0x00 };
        }
    }
}
