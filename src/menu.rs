//! Terminal menu.
//!
//! One call to [`MenuContext::poll`] handles at most one keypress. Each screen
//! prints its static text once per entry: the `printed` flag gates it and is
//! cleared by every accepted keypress, so a key that keeps the menu where it
//! is (`c` in the main menu, an unknown option, ...) still reprints it on the
//! next poll while idle polls print nothing.

use ufmt::{uDisplay, uWrite, Formatter};
use unwrap_infallible::UnwrapInfallible;

use crate::bitops::{comp8, decomp8, hex2int, Hex};
use crate::channel::{is_printable, ByteTransport, CharacterChannel};
use crate::config::ECHO_INPUT;
use crate::latch::OutputLatch;
use crate::sensor::read_temperature;
use crate::twi::TwiRegisters;
use crate::Board;

const MAIN_MENU: [&str; 9] = [
    "Main menu",
    "Options:",
    "a - print some other text",
    "b - go to the 2nd menu",
    "c - reprint the main menu",
    "l - go to the LED menu",
    "p - print seconds thingie",
    "r - go to i2c menu",
    "q - exit the program",
];

const SECONDARY_MENU: [&str; 4] = [
    "Secondary menu",
    "Options:",
    "a - reprint this menu",
    "q - return to the main menu",
];

const LED_MENU: [&str; 6] = [
    "Led toggle menu",
    "Options:",
    "a - toggle LED",
    "b - turn LED on",
    "c - turn LED off",
    "q - return to the main menu",
];

const BUS_MENU: [&str; 6] = [
    "I2C Menu:",
    "Options:",
    "s - set slave address",
    "d - set data address",
    "r - read a byte",
    "q - return to the main menu",
];

const PROMPT_HIGH: &str = "Input most significant hex digit (or q):";
const PROMPT_LOW: &str = "Input least significant hex digit (or q):";

const LED_ON: u8 = 0xFF;
const LED_OFF: u8 = 0x00;

/// Whether the scheduler should keep calling [`MenuContext::poll`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Halt,
}

/// Which half of the bus address pair a hex entry writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressField {
    Slave,
    Register,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BusAddress {
    pub slave: u8,
    pub register: u8,
}

impl BusAddress {
    pub fn set(&mut self, field: AddressField, value: u8) {
        match field {
            AddressField::Slave => self.slave = value,
            AddressField::Register => self.register = value,
        }
    }
}

/// Two-keystroke hex byte builder, high nibble first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DigitEntry {
    have_first: bool,
    value: u8,
}

impl DigitEntry {
    pub fn have_first_nibble(&self) -> bool {
        self.have_first
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Feed one nibble; the second one completes the byte and resets the builder.
    pub fn push(&mut self, nib: u8) -> Option<u8> {
        if self.have_first {
            let byte = comp8([decomp8(self.value)[0], nib]);
            *self = Self::default();
            Some(byte)
        } else {
            self.value = comp8([nib, 0]);
            self.have_first = true;
            None
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MenuState {
    /// Before the first poll; behaves exactly like `Main`.
    #[default]
    Uninitialized,
    Main,
    Secondary,
    LedToggle,
    BusMenu,
    BusSet { field: AddressField, entry: DigitEntry },
    /// Terminal. The next poll says goodbye and halts.
    Exit,
}

impl uDisplay for MenuState {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str(match self {
            MenuState::Uninitialized => "uninitialized",
            MenuState::Main => "main",
            MenuState::Secondary => "secondary",
            MenuState::LedToggle => "led",
            MenuState::BusMenu => "i2c",
            MenuState::BusSet { field: AddressField::Slave, .. } => "i2c/slave",
            MenuState::BusSet { field: AddressField::Register, .. } => "i2c/register",
            MenuState::Exit => "exit",
        })
    }
}

/// All mutable menu state. Created once, owned by the scheduler.
#[derive(Clone, Debug, Default)]
pub struct MenuContext {
    state: MenuState,
    address: BusAddress,
    printed: bool,
    ticks: u32,
}

impl MenuContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(address: BusAddress) -> Self {
        Self { address, ..Self::default() }
    }

    pub fn state(&self) -> MenuState {
        self.state
    }

    pub fn address(&self) -> BusAddress {
        self.address
    }

    pub fn screen_printed(&self) -> bool {
        self.printed
    }

    /// Number of polls so far, wrapping.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// The half-entered hex byte, if a hex entry is in progress.
    pub fn pending_entry(&self) -> DigitEntry {
        match self.state {
            MenuState::BusSet { entry, .. } => entry,
            _ => DigitEntry::default(),
        }
    }

    pub fn poll<T, R, L>(&mut self, board: &mut Board<T, R, L>) -> Flow
    where
        T: ByteTransport,
        R: TwiRegisters,
        L: OutputLatch,
    {
        self.ticks = self.ticks.wrapping_add(1);

        let next = match self.state {
            MenuState::Uninitialized | MenuState::Main => self.main_menu(board),
            MenuState::Secondary => self.secondary_menu(board),
            MenuState::LedToggle => self.led_menu(board),
            MenuState::BusMenu => self.bus_menu(board),
            MenuState::BusSet { field, entry } => self.bus_set_menu(board, field, entry),
            MenuState::Exit => {
                board.serial.write_line("Exiting menu...");
                return Flow::Halt;
            }
        };

        if next != self.state {
            crate::trace!(&mut board.serial, "{} -> {}\r", self.state, next);
            self.state = next;
        }
        Flow::Continue
    }

    // Prints `lines` unless already shown, then takes one keypress. Control
    // bytes (CR/LF from the terminal) are swallowed without touching the screen.
    fn screen<T: ByteTransport>(&mut self, serial: &mut CharacterChannel<T>, lines: &[&str]) -> Option<u8> {
        if !self.printed {
            for line in lines {
                serial.write_line(line);
            }
            self.printed = true;
        }

        let key = serial.poll_char(ECHO_INPUT).byte()?;
        if !is_printable(key) {
            return None;
        }
        self.printed = false;
        Some(key)
    }

    fn main_menu<T, R, L>(&mut self, board: &mut Board<T, R, L>) -> MenuState
    where
        T: ByteTransport,
        R: TwiRegisters,
        L: OutputLatch,
    {
        let Some(key) = self.screen(&mut board.serial, &MAIN_MENU) else {
            return MenuState::Main;
        };

        match key {
            b'a' => {
                board.serial.write_line("Here we print something");
                MenuState::Main
            }
            b'b' => MenuState::Secondary,
            b'c' => MenuState::Main,
            b'l' => MenuState::LedToggle,
            b'p' => {
                print_temperature(board);
                MenuState::Main
            }
            b'r' => MenuState::BusMenu,
            b'q' => MenuState::Exit,
            _ => {
                unknown_option(&mut board.serial, key);
                MenuState::Main
            }
        }
    }

    fn secondary_menu<T, R, L>(&mut self, board: &mut Board<T, R, L>) -> MenuState
    where
        T: ByteTransport,
    {
        let Some(key) = self.screen(&mut board.serial, &SECONDARY_MENU) else {
            return MenuState::Secondary;
        };

        match key {
            b'a' => MenuState::Secondary,
            b'q' => MenuState::Main,
            _ => {
                unknown_option(&mut board.serial, key);
                MenuState::Secondary
            }
        }
    }

    fn led_menu<T, R, L>(&mut self, board: &mut Board<T, R, L>) -> MenuState
    where
        T: ByteTransport,
        L: OutputLatch,
    {
        let Some(key) = self.screen(&mut board.serial, &LED_MENU) else {
            return MenuState::LedToggle;
        };

        // 'a' toggles by resolving to on/off from the current latch value.
        let action = match key {
            b'a' if board.led.get() == LED_OFF => b'b',
            b'a' => b'c',
            k => k,
        };

        match action {
            b'b' => {
                board.led.set(LED_ON);
                board.serial.write_line("Toggled LED on");
                MenuState::LedToggle
            }
            b'c' => {
                board.led.set(LED_OFF);
                board.serial.write_line("Toggled LED off");
                MenuState::LedToggle
            }
            b'q' => MenuState::Main,
            _ => {
                unknown_option(&mut board.serial, key);
                MenuState::LedToggle
            }
        }
    }

    fn bus_menu<T, R, L>(&mut self, board: &mut Board<T, R, L>) -> MenuState
    where
        T: ByteTransport,
        R: TwiRegisters,
    {
        if !self.printed {
            let BusAddress { slave, register } = self.address;
            ufmt::uwriteln!(&mut board.serial, "SLV addr: {}\r", Hex(slave)).unwrap_infallible();
            ufmt::uwriteln!(&mut board.serial, "DATA addr: {}\r", Hex(register)).unwrap_infallible();
        }
        let Some(key) = self.screen(&mut board.serial, &BUS_MENU) else {
            return MenuState::BusMenu;
        };

        match key {
            b's' => MenuState::BusSet { field: AddressField::Slave, entry: DigitEntry::default() },
            b'd' => MenuState::BusSet { field: AddressField::Register, entry: DigitEntry::default() },
            b'r' => {
                let BusAddress { slave, register } = self.address;
                match board.twi.read_single(slave, register) {
                    Ok(value) => {
                        ufmt::uwriteln!(&mut board.serial, "DATA value: 0x{}\r", Hex(value)).unwrap_infallible();
                    }
                    Err(e) => {
                        ufmt::uwriteln!(&mut board.serial, "I2C read failed: {}\r", e).unwrap_infallible();
                        crate::trace!(&mut board.serial, "read {}/{}: {}\r", Hex(slave), Hex(register), e);
                    }
                }
                MenuState::BusMenu
            }
            b'q' => MenuState::Main,
            _ => {
                unknown_option(&mut board.serial, key);
                MenuState::BusMenu
            }
        }
    }

    // Shared by both address fields. 'q' drops the half-built byte and leaves
    // the target alone; a non-hex key restarts the entry but stays here.
    fn bus_set_menu<T, R, L>(
        &mut self,
        board: &mut Board<T, R, L>,
        field: AddressField,
        mut entry: DigitEntry,
    ) -> MenuState
    where
        T: ByteTransport,
    {
        let prompt = if entry.have_first_nibble() { PROMPT_LOW } else { PROMPT_HIGH };
        let Some(key) = self.screen(&mut board.serial, &[prompt]) else {
            return MenuState::BusSet { field, entry };
        };

        if key == b'q' {
            return MenuState::BusMenu;
        }
        let Some(nib) = hex2int(key) else {
            board.serial.write_line("Invalid input. (Must be 0-F)");
            return MenuState::BusSet { field, entry: DigitEntry::default() };
        };

        match entry.push(nib) {
            Some(byte) => {
                self.address.set(field, byte);
                MenuState::BusMenu
            }
            None => MenuState::BusSet { field, entry },
        }
    }
}

fn unknown_option<T: ByteTransport>(serial: &mut CharacterChannel<T>, key: u8) {
    ufmt::uwriteln!(serial, "Unknown option \"{}\"\r", key as char).unwrap_infallible();
}

fn print_temperature<T, R, L>(board: &mut Board<T, R, L>)
where
    T: ByteTransport,
    R: TwiRegisters,
{
    match read_temperature(&mut board.twi) {
        Ok(t) => ufmt::uwriteln!(&mut board.serial, "Temperature: {}\r", t).unwrap_infallible(),
        Err(e) => {
            ufmt::uwriteln!(&mut board.serial, "Temperature read failed: {}\r", e).unwrap_infallible();
            crate::trace!(&mut board.serial, "ds3231: {}\r", e);
        }
    }
}
