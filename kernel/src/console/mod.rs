//! Interactive line-editing console.
//!
//! Keystrokes arrive from the keyboard interrupt and are edited in place
//! on a single uncommitted line; readers block until the line is committed
//! by Enter or end-of-file. The editor keeps three representations in
//! agreement before the device lock is released:
//!
//! 1. the input ring and its `r <= w <= c <= e` cursors ([`buffer`]),
//! 2. the 80x25 text surface and its hardware cursor ([`screen`]),
//! 3. the selection, clipboard and undo side state ([`select`], [`undo`]).
//!
//! Editing commands:
//!
//! - printable bytes insert at the cursor; backspace deletes left of it
//! - arrow left/right move the cursor; Ctrl+A / Ctrl+D move by words
//! - Ctrl+U kills the line, Enter commits it, Ctrl+D on an empty line
//!   signals end-of-file
//! - Ctrl+S anchors and confirms a highlighted selection; Ctrl+C copies it
//!   to the clipboard and Ctrl+V pastes, replacing any active selection
//! - Ctrl+Z undoes the last single-byte insertion or deletion
//! - Tab completes the first word against the command dictionary
//! - Ctrl+P requests a process dump, executed after the lock is dropped

pub mod buffer;
pub mod complete;
pub mod device;
pub mod edit;
pub mod screen;
pub mod select;
pub mod undo;

#[cfg(test)]
pub(crate) mod testing;

use buffer::LineBuffer;
use screen::{TextScreen, TextVideo, BACKSPACE};
use select::Clipboard;
use undo::UndoLog;

pub use device::ConsoleDevice;
pub use select::Selection;

/// Left-arrow sentinel delivered by the keyboard decoder.
pub const KEY_LF: u8 = 0xe4;
/// Right-arrow sentinel delivered by the keyboard decoder.
pub const KEY_RT: u8 = 0xe5;

/// End-of-file marker committed into the ring by Ctrl+D.
pub const EOT: u8 = ctrl(b'D');

/// Control-x.
pub const fn ctrl(x: u8) -> u8 {
    x.wrapping_sub(b'@')
}

/// Sink for the serial side of the console mirror.
pub trait ByteSink {
    fn put(&mut self, byte: u8);
}

/// What a handled keystroke asks of the surrounding interrupt handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// State changed (or the key was ignored); nothing to do.
    Handled,
    /// A line was committed or the ring filled; wake blocked readers.
    LineReady,
    /// Ctrl+P: run the process dump once the device lock is released.
    ProcessDump,
}

/// The whole console state: surface, serial mirror, input ring and the
/// selection/clipboard/undo side state. One value, one lock.
pub struct Console<V, S> {
    pub(crate) screen: TextScreen<V>,
    pub(crate) serial: S,
    pub(crate) input: LineBuffer,
    pub(crate) selection: Selection,
    pub(crate) clipboard: Clipboard,
    pub(crate) undo: UndoLog,
    pub(crate) last_key_was_tab: bool,
}

impl<V: TextVideo, S: ByteSink> core::fmt::Write for Console<V, S> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for b in s.bytes() {
            self.emit(u16::from(b));
        }
        Ok(())
    }
}

/// The console device wired to the real hardware.
#[cfg(target_arch = "x86_64")]
pub fn console() -> &'static ConsoleDevice<screen::CgaVideo, crate::serial::SerialSink> {
    static CONSOLE: ConsoleDevice<screen::CgaVideo, crate::serial::SerialSink> =
        ConsoleDevice::new(screen::CgaVideo, crate::serial::SerialSink);
    &CONSOLE
}

#[cfg(target_arch = "x86_64")]
fn console_read(dst: &mut [u8], sched: &dyn crate::sched::Scheduler) -> isize {
    console().read(dst, sched)
}

#[cfg(target_arch = "x86_64")]
fn console_write(src: &[u8]) -> isize {
    console().write(src) as isize
}

/// Register the console in the device table. Interrupt routing is done
/// separately by `interrupts::init` once the IDT is up.
#[cfg(target_arch = "x86_64")]
pub fn init() {
    crate::dev::register(
        crate::dev::CONSOLE,
        crate::dev::DevOps {
            read: console_read,
            write: console_write,
        },
    );
}

/// Formatted output through the locked emit path.
#[cfg(target_arch = "x86_64")]
#[doc(hidden)]
pub fn _print(args: core::fmt::Arguments) {
    use core::fmt::Write;

    console().with_console(|con| {
        let _ = con.write_fmt(args);
    });
}

impl<V: TextVideo, S: ByteSink> Console<V, S> {
    pub const fn new(video: V, serial: S) -> Self {
        Self {
            screen: TextScreen::new(video),
            serial,
            input: LineBuffer::new(),
            selection: Selection::Inactive,
            clipboard: Clipboard::new(),
            undo: UndoLog::new(),
            last_key_was_tab: false,
        }
    }

    /// Mirror one character to serial and screen.
    ///
    /// [`BACKSPACE`] erases a cell on both sinks; serial gets the
    /// backspace-space-backspace sequence. Once the panic flag is latched
    /// every emission halts the calling processor.
    pub fn emit(&mut self, ch: u16) {
        if crate::panic::panicked() {
            crate::panic::halt();
        }

        if ch == BACKSPACE {
            self.serial.put(0x08);
            self.serial.put(b' ');
            self.serial.put(0x08);
        } else {
            self.serial.put(ch as u8);
        }
        self.screen.put(ch);
    }

    /// Route one keystroke from the input source.
    ///
    /// Null bytes are dropped without touching any state. Every other
    /// keystroke clears the tab bit unless it is itself a Tab, and every
    /// non-selection command clears an active selection before acting.
    pub fn handle_key(&mut self, key: u8) -> KeyOutcome {
        if key == 0 {
            return KeyOutcome::Handled;
        }

        let was_tab = self.last_key_was_tab;
        self.last_key_was_tab = false;

        match key {
            k if k == ctrl(b'S') => self.toggle_select(),
            k if k == ctrl(b'C') => self.copy_selection(),
            k if k == ctrl(b'V') => self.paste(),
            k if k == ctrl(b'A') => {
                self.deselect_if_any();
                self.backward_word();
            }
            k if k == ctrl(b'D') => {
                self.deselect_if_any();
                if self.input.line_len() == 0 {
                    return self.append_eof();
                }
                self.forward_word();
            }
            k if k == ctrl(b'P') => {
                self.deselect_if_any();
                return KeyOutcome::ProcessDump;
            }
            k if k == ctrl(b'U') => {
                self.deselect_if_any();
                self.kill_line();
            }
            k if k == ctrl(b'H') || k == 0x7f => {
                self.deselect_if_any();
                self.backspace();
            }
            k if k == ctrl(b'Z') => {
                self.deselect_if_any();
                self.undo_last();
            }
            KEY_LF => {
                self.deselect_if_any();
                self.cursor_left();
            }
            KEY_RT => {
                self.deselect_if_any();
                self.cursor_right();
            }
            b'\t' => {
                self.deselect_if_any();
                self.complete(was_tab);
            }
            b'\n' | b'\r' => {
                self.deselect_if_any();
                return self.commit_line();
            }
            c if c >= 0x20 => {
                self.deselect_if_any();
                if self.input.is_full() {
                    // No room left: the incoming byte is dropped and the
                    // line is committed as it stands.
                    return self.commit_line();
                }
                self.insert_at_cursor(c);
            }
            // Unrecognised control bytes are dropped.
            _ => {}
        }

        KeyOutcome::Handled
    }
}
