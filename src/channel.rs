//! Character I/O over the serial line.
//!
//! Reading never waits: [`CharacterChannel::poll_char`] reports whether a byte
//! was queued and returns straight away. Writing may block until the transport
//! takes the byte, which is bounded by the baud rate.

use core::convert::Infallible;

use ufmt::uWrite;
use unwrap_infallible::UnwrapInfallible;

/// Byte-level serial transport, `nb` style: `WouldBlock` means "not now".
pub trait ByteTransport {
    fn read(&mut self) -> nb::Result<u8, Infallible>;
    fn write(&mut self, byte: u8) -> nb::Result<(), Infallible>;
}

/// Outcome of one poll. `success == false` just means nothing was waiting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CharResult {
    pub success: bool,
    pub value: u8,
}

impl CharResult {
    pub fn byte(self) -> Option<u8> {
        self.success.then_some(self.value)
    }
}

pub struct CharacterChannel<T> {
    transport: T,
}

impl<T: ByteTransport> CharacterChannel<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Take the next input byte if there is one. With `echo`, a printable byte
    /// is written back followed by CR+LF; control bytes are never echoed.
    pub fn poll_char(&mut self, echo: bool) -> CharResult {
        match self.transport.read() {
            Ok(value) => {
                if echo && is_printable(value) {
                    self.write_char(value);
                    self.write_str("\r\n");
                }
                CharResult { success: true, value }
            }
            Err(nb::Error::WouldBlock) => CharResult::default(),
            Err(nb::Error::Other(never)) => match never {},
        }
    }

    pub fn write_char(&mut self, byte: u8) {
        nb::block!(self.transport.write(byte)).unwrap_infallible()
    }

    pub fn write_str(&mut self, text: &str) {
        for &b in text.as_bytes() {
            self.write_char(b);
        }
    }

    pub fn write_line(&mut self, text: &str) {
        self.write_str(text);
        self.write_str("\r\n");
    }
}

impl<T: ByteTransport> uWrite for CharacterChannel<T> {
    type Error = Infallible;

    fn write_str(&mut self, s: &str) -> Result<(), Self::Error> {
        CharacterChannel::write_str(self, s);
        Ok(())
    }

    fn write_char(&mut self, c: char) -> Result<(), Self::Error> {
        let mut utf8 = [0u8; 4];
        CharacterChannel::write_str(self, c.encode_utf8(&mut utf8));
        Ok(())
    }
}

pub fn is_printable(byte: u8) -> bool {
    byte.is_ascii_graphic() || byte == b' '
}
