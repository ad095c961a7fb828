// Host doubles for the register/serial/latch capabilities.

use core::cell::Cell;
use core::convert::Infallible;
use std::collections::VecDeque;
use std::vec::Vec;

use crate::channel::ByteTransport;
use crate::latch::OutputLatch;
use crate::twi::{twcr, TwiRegisters};

/// TWI register file that replays a fixed status sequence, one code per
/// TWINT-clearing control write.
pub struct ScriptedTwi {
    script: VecDeque<u8>,
    incoming: Vec<u8>,
    next_in: Cell<usize>,
    status: u8,
    controls: Vec<u8>,
    sent: Vec<u8>,
    bit_rate: Option<u8>,
    stalled: bool,
}

impl ScriptedTwi {
    pub fn new(script: &[u8], incoming: &[u8]) -> Self {
        Self {
            script: script.iter().copied().collect(),
            incoming: incoming.to_vec(),
            next_in: Cell::new(0),
            status: 0xF8,
            controls: Vec::new(),
            sent: Vec::new(),
            bit_rate: None,
            stalled: false,
        }
    }

    pub fn stall(&mut self) { // ← TWINT never comes back up
        self.stalled = true;
    }

    pub fn controls(&self) -> &[u8] {
        &self.controls
    }

    pub fn sent_data(&self) -> &[u8] {
        &self.sent
    }

    pub fn bit_rate(&self) -> Option<u8> {
        self.bit_rate
    }

    pub fn script_done(&self) -> bool {
        self.script.is_empty()
    }
}

impl TwiRegisters for ScriptedTwi {
    fn set_bit_rate(&mut self, twbr: u8) {
        self.bit_rate = Some(twbr);
    }

    fn set_control(&mut self, bits: u8) {
        self.controls.push(bits);
        if bits & twcr::TWINT != 0 && bits & twcr::TWSTO == 0 {
            self.status = self.script.pop_front().unwrap_or(0xF8);
        }
    }

    fn control(&self) -> u8 {
        if self.stalled {
            0
        } else {
            twcr::TWINT | twcr::TWEN
        }
    }

    fn status(&self) -> u8 {
        self.status
    }

    fn set_data(&mut self, byte: u8) {
        self.sent.push(byte);
    }

    fn data(&self) -> u8 {
        let i = self.next_in.get();
        self.next_in.set(i + 1);
        self.incoming.get(i).copied().unwrap_or(0xFF)
    }
}

/// Serial line with a queued keyboard and a captured screen.
#[derive(Default)]
pub struct Loopback {
    pub input: VecDeque<u8>,
    pub output: Vec<u8>,
}

impl Loopback {
    pub fn typed(keys: &str) -> Self {
        Self { input: keys.bytes().collect(), output: Vec::new() }
    }

    pub fn take_output(&mut self) -> String {
        let out = String::from_utf8_lossy(&self.output).into_owned();
        self.output.clear();
        out
    }
}

impl ByteTransport for Loopback {
    fn read(&mut self) -> nb::Result<u8, Infallible> {
        self.input.pop_front().ok_or(nb::Error::WouldBlock)
    }

    fn write(&mut self, byte: u8) -> nb::Result<(), Infallible> {
        self.output.push(byte);
        Ok(())
    }
}

#[derive(Default)]
pub struct Latch(pub u8);

impl OutputLatch for Latch {
    fn get(&self) -> u8 {
        self.0
    }

    fn set(&mut self, value: u8) {
        self.0 = value;
    }
}
