//! Millisecond tick dispatch: keeps the LED blinking at ~1 Hz and gives the
//! menu one slice per tick.

use crate::channel::ByteTransport;
use crate::config::BLINK_TICKS;
use crate::latch::OutputLatch;
use crate::menu::{Flow, MenuContext};
use crate::twi::TwiRegisters;
use crate::Board;

/// Blink phase tracker. The latch is shared with the LED menu, so the phase is
/// re-derived from whatever the latch holds now instead of from local state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Blinker {
    previous: u8,
    next: u8,
    elapsed: u16,
}

impl Blinker {
    pub fn new(current: u8) -> Self {
        Self { previous: current, next: !current, elapsed: 0 }
    }

    pub fn next_pattern(&self) -> u8 {
        self.next
    }

    pub fn elapsed(&self) -> u16 {
        self.elapsed
    }

    pub fn tick<L: OutputLatch>(&mut self, latch: &mut L) {
        let now = latch.get();
        if now != self.previous {
            // Someone else wrote the latch; hold that pattern for a full period.
            self.previous = now;
            self.next = !now;
            self.elapsed = 0;
            return;
        }

        self.elapsed += 1;
        if self.elapsed == BLINK_TICKS {
            latch.set(self.next);
            self.previous = latch.get(); // ← our own write is not an outside change
            self.next ^= 0xFF;
            self.elapsed = 0;
        }
    }
}

/// Owns the menu context and decides each tick whether it still runs.
pub struct TickScheduler {
    blink: Blinker,
    menu: MenuContext,
    running: bool,
}

impl TickScheduler {
    pub fn new<L: OutputLatch>(latch: &L) -> Self {
        Self { blink: Blinker::new(latch.get()), menu: MenuContext::new(), running: true }
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn menu(&self) -> &MenuContext {
        &self.menu
    }

    pub fn tick<T, R, L>(&mut self, board: &mut Board<T, R, L>)
    where
        T: ByteTransport,
        R: TwiRegisters,
        L: OutputLatch,
    {
        self.blink.tick(&mut board.led);

        if !self.running {
            return;
        }
        if self.menu.poll(board) == Flow::Halt {
            self.running = false;
            crate::trace!(&mut board.serial, "menu halted after {} polls\r", self.menu.ticks());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::Latch;

    #[test]
    fn blink_flips_each_period() {
        let mut latch = Latch(0x00);
        let mut b = Blinker::new(latch.0);

        for _ in 0..999 {
            b.tick(&mut latch);
        }
        assert_eq!(latch.0, 0x00);

        b.tick(&mut latch);
        assert_eq!(latch.0, 0xFF);
        assert_eq!(b.elapsed(), 0);

        for _ in 0..1000 {
            b.tick(&mut latch);
        }
        assert_eq!(latch.0, 0x00);
    }

    #[test]
    fn blink_resyncs_on_outside_write() {
        let mut latch = Latch(0x00);
        let mut b = Blinker::new(latch.0);

        for _ in 0..500 {
            b.tick(&mut latch);
        }
        latch.0 = 0xFF; // ← e.g. "turn LED on" from the menu
        b.tick(&mut latch);
        assert_eq!(b.elapsed(), 0);
        assert_eq!(b.next_pattern(), 0x00);

        // A full period from the resync, not from the old phase.
        for _ in 0..999 {
            b.tick(&mut latch);
        }
        assert_eq!(latch.0, 0xFF);
        b.tick(&mut latch);
        assert_eq!(latch.0, 0x00);
    }

    #[test]
    fn blink_arbitrary_pattern() {
        let mut latch = Latch(0x0F);
        let mut b = Blinker::new(latch.0);

        for _ in 0..1000 {
            b.tick(&mut latch);
        }
        assert_eq!(latch.0, 0xF0);
        for _ in 0..1000 {
            b.tick(&mut latch);
        }
        assert_eq!(latch.0, 0x0F);
    }
}
