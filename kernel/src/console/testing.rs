//! Test doubles for the console.
//!
//! An array-backed cell grid stands in for CGA memory, a byte vector for
//! the UART, and a hook-driven scheduler for the sleep/wakeup contract.
//! `feed_keys` re-checks the cross-representation invariants after every
//! keystroke, so every test doubles as an invariant check.

use core::cell::{Cell, RefCell};
use core::ops::{Deref, DerefMut};

use super::buffer::INPUT_BUF;
use super::screen::{TextVideo, CELLS};
use super::undo::UNDO_BUF;
use super::{ByteSink, Console, ConsoleDevice, Selection};
use crate::sched::Scheduler;

/// Array-backed stand-in for the CGA cell grid and cursor register.
pub struct TestVideo {
    cells: [u16; CELLS],
    cursor: usize,
}

impl TestVideo {
    pub fn new() -> Self {
        Self {
            cells: [0; CELLS],
            cursor: 0,
        }
    }
}

impl TextVideo for TestVideo {
    fn load(&self, pos: usize) -> u16 {
        self.cells[pos]
    }

    fn store(&mut self, pos: usize, cell: u16) {
        self.cells[pos] = cell;
    }

    fn cursor(&self) -> usize {
        self.cursor
    }

    fn set_cursor(&mut self, pos: usize) {
        self.cursor = pos;
    }
}

/// Captures everything emitted to the serial side.
pub struct TestSink {
    bytes: Vec<u8>,
}

impl TestSink {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl ByteSink for TestSink {
    fn put(&mut self, byte: u8) {
        self.bytes.push(byte);
    }
}

/// Scheduler double: counts sleeps, wakeups and dumps, and can run hooks
/// so single-threaded tests can commit input from inside `sleep` or probe
/// lock state from inside `process_dump`.
pub struct TestSched<'a> {
    slept: Cell<usize>,
    woken: Cell<usize>,
    killed: Cell<bool>,
    dumped: Cell<usize>,
    on_sleep: RefCell<Option<Box<dyn FnMut() + 'a>>>,
    on_dump: RefCell<Option<Box<dyn Fn() + 'a>>>,
}

impl<'a> TestSched<'a> {
    pub fn new() -> Self {
        Self {
            slept: Cell::new(0),
            woken: Cell::new(0),
            killed: Cell::new(false),
            dumped: Cell::new(0),
            on_sleep: RefCell::new(None),
            on_dump: RefCell::new(None),
        }
    }

    pub fn on_sleep(&self, hook: impl FnMut() + 'a) {
        *self.on_sleep.borrow_mut() = Some(Box::new(hook));
    }

    pub fn on_dump(&self, hook: impl Fn() + 'a) {
        *self.on_dump.borrow_mut() = Some(Box::new(hook));
    }

    pub fn kill(&self) {
        self.killed.set(true);
    }

    pub fn slept(&self) -> usize {
        self.slept.get()
    }

    pub fn wakeups(&self) -> usize {
        self.woken.get()
    }

    pub fn dumps(&self) -> usize {
        self.dumped.get()
    }
}

impl Scheduler for TestSched<'_> {
    fn sleep(&self, _channel: usize) {
        self.slept.set(self.slept.get() + 1);
        let mut hook = self.on_sleep.borrow_mut();
        match hook.as_mut() {
            Some(f) => f(),
            None => panic!("reader slept with nothing pending and no sleep hook"),
        }
    }

    fn wakeup(&self, _channel: usize) {
        self.woken.set(self.woken.get() + 1);
    }

    fn current_killed(&self) -> bool {
        self.killed.get()
    }

    fn process_dump(&self) {
        self.dumped.set(self.dumped.get() + 1);
        if let Some(f) = &*self.on_dump.borrow() {
            f();
        }
    }
}

/// A console whose invariants are re-checked after every keystroke fed
/// through [`feed_keys`].
pub struct Checked(pub Console<TestVideo, TestSink>);

impl Deref for Checked {
    type Target = Console<TestVideo, TestSink>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Checked {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

pub fn test_console() -> Console<TestVideo, TestSink> {
    Console::new(TestVideo::new(), TestSink::new())
}

pub fn test_device() -> ConsoleDevice<TestVideo, TestSink> {
    ConsoleDevice::new(TestVideo::new(), TestSink::new())
}

/// Route `keys` through the dispatcher, checking the state invariants
/// after each one.
pub fn feed_keys(con: &mut Checked, keys: &[u8]) {
    for &key in keys {
        con.0.handle_key(key);
        check_invariants(&con.0);
    }
}

/// Drive the device's interrupt entry with a canned byte stream.
pub fn feed_device(
    dev: &ConsoleDevice<TestVideo, TestSink>,
    sched: &TestSched<'_>,
    bytes: &[u8],
) {
    let mut it = bytes.iter().copied();
    dev.handle_interrupt(&mut || it.next(), sched);
}

/// The uncommitted line `buf[w..e)`.
pub fn line(con: &Console<TestVideo, TestSink>) -> Vec<u8> {
    (con.input.w..con.input.e).map(|i| con.input.at(i)).collect()
}

/// Screen contents as text, rows separated by newlines, for coarse
/// assertions about listings and prompts.
pub fn screen_text(con: &Console<TestVideo, TestSink>) -> String {
    use super::screen::WIDTH;
    let mut out = String::new();
    for row in 0..CELLS / WIDTH {
        for col in 0..WIDTH {
            let glyph = (con.screen.cell(row * WIDTH + col) & 0xff) as u8;
            out.push(if glyph == 0 { ' ' } else { glyph as char });
        }
        out.push('\n');
    }
    out
}

/// The §-style cross-representation invariants: cursor ordering, ring
/// bound, screen mirror, selection bounds and undo bound.
pub fn check_invariants(con: &Console<TestVideo, TestSink>) {
    let input = &con.input;
    assert!(
        input.r <= input.w && input.w <= input.c && input.c <= input.e,
        "cursor ordering violated: r={} w={} c={} e={}",
        input.r,
        input.w,
        input.c,
        input.e
    );
    assert!(input.e - input.r <= INPUT_BUF, "ring overfull");

    // The screen mirrors buf[w..e) from the line origin, with the
    // hardware cursor over the edit cursor.
    let origin = con.screen.cursor() - (input.c - input.w);
    for i in input.w..input.e {
        let pos = origin + (i - input.w);
        assert!(pos < CELLS);
        let glyph = (con.screen.cell(pos) & 0xff) as u8;
        assert_eq!(
            glyph,
            input.at(i),
            "screen cell {} does not mirror buffer index {}",
            pos,
            i
        );
    }

    if let Selection::Active { start, end } = con.selection {
        assert!(input.w <= start && start < end && end <= input.e, "selection out of line");
    }

    assert!(con.undo.len() <= UNDO_BUF);
}
