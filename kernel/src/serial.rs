//! COM1 serial output.
//!
//! The serial side of the console mirror. Bytes go out raw: the console's
//! emit path decides how control characters are rendered (backspace is
//! already expanded to backspace-space-backspace before it gets here).

use core::fmt;
use spin::Mutex;
use uart_16550::SerialPort;

const COM1_PORT: u16 = 0x3f8;

pub static SERIAL1: Mutex<SerialPort> = Mutex::new(unsafe { SerialPort::new(COM1_PORT) });

pub fn init() {
    SERIAL1.lock().init();
}

/// Send one byte, untranslated.
pub fn write_byte(byte: u8) {
    use x86_64::instructions::interrupts;

    interrupts::without_interrupts(|| {
        SERIAL1.lock().send_raw(byte);
    });
}

/// The UART as a console byte sink.
pub struct SerialSink;

impl crate::console::ByteSink for SerialSink {
    fn put(&mut self, byte: u8) {
        write_byte(byte);
    }
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments) {
    use core::fmt::Write;
    use x86_64::instructions::interrupts;

    interrupts::without_interrupts(|| {
        SERIAL1
            .lock()
            .write_fmt(args)
            .expect("Printing to serial failed");
    });
}
