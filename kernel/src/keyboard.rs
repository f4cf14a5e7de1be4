//! PS/2 keyboard decoding.
//!
//! Turns scan-code set 1 into the byte stream the console dispatcher
//! consumes: printable ASCII, control bytes for Ctrl combinations, and
//! the arrow sentinels [`KEY_LF`]/[`KEY_RT`] for the E0-prefixed cursor
//! keys. Modifier state (shift, control, caps lock, pending E0) lives
//! behind its own lock; [`get_char`] is only called from the keyboard
//! interrupt path, under the console's interrupt discipline.

use spin::Mutex;
use x86_64::instructions::port::Port;

use crate::console::{KEY_LF, KEY_RT};

const KBD_STATUS_PORT: u16 = 0x64;
const KBD_DATA_PORT: u16 = 0x60;
/// Output-buffer-full bit of the status register.
const KBD_DATA_READY: u8 = 0x01;

const LEFT_SHIFT: u8 = 0x2a;
const RIGHT_SHIFT: u8 = 0x36;
const CTRL: u8 = 0x1d;
const CAPS_LOCK: u8 = 0x3a;
const KEY_RELEASED: u8 = 0x80;

/// E0-prefixed make codes for the cursor keys.
const SC_ARROW_LEFT: u8 = 0x4b;
const SC_ARROW_RIGHT: u8 = 0x4d;

/// Plain and shifted byte for one key.
#[derive(Clone, Copy)]
struct Key {
    plain: u8,
    shifted: u8,
}

const fn k(plain: u8, shifted: u8) -> Option<Key> {
    Some(Key { plain, shifted })
}

const fn same(b: u8) -> Option<Key> {
    Some(Key {
        plain: b,
        shifted: b,
    })
}

/// Scan-code set 1, make codes 0x00..0x3a.
#[rustfmt::skip]
const KEYS: [Option<Key>; 0x3a] = [
    None,                 // 0x00
    same(0x1b),           // 0x01 escape
    k(b'1', b'!'), k(b'2', b'@'), k(b'3', b'#'), k(b'4', b'$'),
    k(b'5', b'%'), k(b'6', b'^'), k(b'7', b'&'), k(b'8', b'*'),
    k(b'9', b'('), k(b'0', b')'), k(b'-', b'_'), k(b'=', b'+'),
    same(0x08),           // 0x0e backspace
    same(b'\t'),          // 0x0f tab
    k(b'q', b'Q'), k(b'w', b'W'), k(b'e', b'E'), k(b'r', b'R'),
    k(b't', b'T'), k(b'y', b'Y'), k(b'u', b'U'), k(b'i', b'I'),
    k(b'o', b'O'), k(b'p', b'P'), k(b'[', b'{'), k(b']', b'}'),
    same(b'\n'),          // 0x1c enter
    None,                 // 0x1d left control
    k(b'a', b'A'), k(b's', b'S'), k(b'd', b'D'), k(b'f', b'F'),
    k(b'g', b'G'), k(b'h', b'H'), k(b'j', b'J'), k(b'k', b'K'),
    k(b'l', b'L'), k(b';', b':'), k(b'\'', b'"'), k(b'`', b'~'),
    None,                 // 0x2a left shift
    k(b'\\', b'|'),
    k(b'z', b'Z'), k(b'x', b'X'), k(b'c', b'C'), k(b'v', b'V'),
    k(b'b', b'B'), k(b'n', b'N'), k(b'm', b'M'), k(b',', b'<'),
    k(b'.', b'>'), k(b'/', b'?'),
    None,                 // 0x36 right shift
    None,                 // 0x37 keypad *
    None,                 // 0x38 left alt
    same(b' '),           // 0x39 space
];

struct Modifiers {
    shift: bool,
    ctrl: bool,
    caps_lock: bool,
    /// An 0xE0 prefix arrived; the next code selects an extended key.
    e0: bool,
}

impl Modifiers {
    const fn new() -> Self {
        Self {
            shift: false,
            ctrl: false,
            caps_lock: false,
            e0: false,
        }
    }

    /// Decode one scan code. Returns 0 for codes that produce no byte
    /// (modifiers, releases, prefixes); the dispatcher drops nulls.
    fn translate(&mut self, code: u8) -> u8 {
        if code == 0xe0 {
            self.e0 = true;
            return 0;
        }

        if code & KEY_RELEASED != 0 {
            match code & !KEY_RELEASED {
                LEFT_SHIFT | RIGHT_SHIFT => self.shift = false,
                CTRL => self.ctrl = false,
                _ => {}
            }
            self.e0 = false;
            return 0;
        }

        if self.e0 {
            self.e0 = false;
            return match code {
                SC_ARROW_LEFT => KEY_LF,
                SC_ARROW_RIGHT => KEY_RT,
                _ => 0,
            };
        }

        match code {
            LEFT_SHIFT | RIGHT_SHIFT => {
                self.shift = true;
                0
            }
            CTRL => {
                self.ctrl = true;
                0
            }
            CAPS_LOCK => {
                self.caps_lock = !self.caps_lock;
                0
            }
            code => {
                let Some(Some(key)) = KEYS.get(code as usize) else {
                    return 0;
                };
                self.apply(*key)
            }
        }
    }

    fn apply(&self, key: Key) -> u8 {
        if key.plain.is_ascii_lowercase() {
            if self.ctrl {
                return key.plain & 0x1f;
            }
            if self.shift != self.caps_lock {
                return key.shifted;
            }
            return key.plain;
        }
        if self.shift {
            key.shifted
        } else {
            key.plain
        }
    }
}

static STATE: Mutex<Modifiers> = Mutex::new(Modifiers::new());

/// Pull one byte from the controller, or `None` when no input is ready.
///
/// Must not log or block: it runs under the console device lock.
pub fn get_char() -> Option<u8> {
    let mut status: Port<u8> = Port::new(KBD_STATUS_PORT);
    let mut data: Port<u8> = Port::new(KBD_DATA_PORT);

    // SAFETY: PS/2 controller status read; no side effects.
    let st = unsafe { status.read() };
    if st & KBD_DATA_READY == 0 {
        return None;
    }
    // SAFETY: the status bit guarantees a byte is waiting; reading pops it.
    let code = unsafe { data.read() };

    Some(STATE.lock().translate(code))
}
