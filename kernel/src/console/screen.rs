//! 80x25 text-mode surface.
//!
//! The surface algorithm (advance, scroll, destructive backspace) is
//! target-independent and operates through the [`TextVideo`] trait, which
//! abstracts the cell store and the hardware cursor register. On x86_64 the
//! real implementation is [`CgaVideo`]: the memory-mapped CGA cell array at
//! `0xb8000` and the CRT controller cursor at ports `0x3d4`/`0x3d5`.

/// Columns per row.
pub const WIDTH: usize = 80;
/// Rows on screen.
pub const HEIGHT: usize = 25;
/// Total cell count; the hardware cursor stays in `[0, CELLS]`.
pub const CELLS: usize = WIDTH * HEIGHT;

/// Default attribute: light gray on black.
pub const ATTR_NORMAL: u8 = 0x07;
/// Inverse-video attribute used for the selection highlight.
pub const ATTR_INVERSE: u8 = 0x70;

/// Out-of-band code for a destructive backspace. Sits above the byte range
/// so it can never collide with buffered input.
pub const BACKSPACE: u16 = 0x100;

/// Cell store and hardware cursor behind the surface.
///
/// `load`/`store` move whole `(attr << 8) | glyph` cells; `cursor` and
/// `set_cursor` mirror the CRT controller's cursor location register.
pub trait TextVideo {
    fn load(&self, pos: usize) -> u16;
    fn store(&mut self, pos: usize, cell: u16);
    fn cursor(&self) -> usize;
    fn set_cursor(&mut self, pos: usize);
}

/// The text surface: owns the scroll and cursor-advance rules on top of a
/// [`TextVideo`] backend.
pub struct TextScreen<V> {
    video: V,
}

impl<V: TextVideo> TextScreen<V> {
    pub const fn new(video: V) -> Self {
        Self { video }
    }

    /// Write one character at the cursor and advance it.
    ///
    /// Newline jumps to the next row boundary, [`BACKSPACE`] steps back and
    /// blanks the vacated cell, anything else stores a glyph with the
    /// default attribute. Crossing into the final row scrolls everything up
    /// one row. A cursor position outside `[0, CELLS]` is a fatal error.
    pub fn put(&mut self, ch: u16) {
        let mut pos = self.video.cursor();

        if ch == u16::from(b'\n') {
            pos += WIDTH - pos % WIDTH;
        } else if ch == BACKSPACE {
            if pos > 0 {
                pos -= 1;
            }
        } else {
            let cell = (u16::from(ATTR_NORMAL) << 8) | (ch & 0xff);
            self.video.store(pos, cell);
            pos += 1;
        }

        if pos > CELLS {
            panic!("console: cursor position {} out of range", pos);
        }

        if pos / WIDTH >= HEIGHT - 1 {
            // Scroll up: rows 1..=23 over rows 0..=22, then blank from the
            // new cursor to the end of row 23.
            for i in 0..(HEIGHT - 2) * WIDTH {
                let cell = self.video.load(i + WIDTH);
                self.video.store(i, cell);
            }
            pos -= WIDTH;
            for i in pos..(HEIGHT - 1) * WIDTH {
                self.video.store(i, 0);
            }
        }

        self.video.set_cursor(pos);
        if ch == BACKSPACE {
            let blank = (u16::from(ATTR_NORMAL) << 8) | u16::from(b' ');
            self.video.store(pos, blank);
        }
    }

    /// Current hardware cursor position.
    pub fn cursor(&self) -> usize {
        self.video.cursor()
    }

    /// Move the hardware cursor. Positions outside `[0, CELLS]` are fatal.
    pub fn set_cursor(&mut self, pos: usize) {
        if pos > CELLS {
            panic!("console: cursor position {} out of range", pos);
        }
        self.video.set_cursor(pos);
    }

    /// Raw cell at `pos`.
    pub fn cell(&self, pos: usize) -> u16 {
        self.video.load(pos)
    }

    /// Replace the attribute byte at `pos`, preserving the glyph.
    pub fn set_attr(&mut self, pos: usize, attr: u8) {
        let glyph = self.video.load(pos) & 0x00ff;
        self.video.store(pos, (u16::from(attr) << 8) | glyph);
    }
}

/// CGA text memory and CRT controller cursor.
///
/// Assumes the legacy VGA window is identity-mapped by early paging.
#[cfg(target_arch = "x86_64")]
pub struct CgaVideo;

#[cfg(target_arch = "x86_64")]
mod cga {
    use super::{TextVideo, CELLS};
    use x86_64::instructions::port::Port;

    const CGA_BASE: *mut u16 = 0xb8000 as *mut u16;
    const CRT_PORT: u16 = 0x3d4;
    const CURSOR_HIGH: u8 = 14;
    const CURSOR_LOW: u8 = 15;

    impl TextVideo for super::CgaVideo {
        fn load(&self, pos: usize) -> u16 {
            debug_assert!(pos < CELLS);
            // SAFETY: pos is bounded by the 2000-cell CGA window, which is
            // mapped for the lifetime of the kernel.
            unsafe { core::ptr::read_volatile(CGA_BASE.add(pos)) }
        }

        fn store(&mut self, pos: usize, cell: u16) {
            debug_assert!(pos < CELLS);
            // SAFETY: as for `load`.
            unsafe { core::ptr::write_volatile(CGA_BASE.add(pos), cell) }
        }

        fn cursor(&self) -> usize {
            let mut index: Port<u8> = Port::new(CRT_PORT);
            let mut data: Port<u8> = Port::new(CRT_PORT + 1);
            // SAFETY: CRT controller index/data ports; reads have no side
            // effects beyond selecting the register.
            unsafe {
                index.write(CURSOR_HIGH);
                let high = usize::from(data.read());
                index.write(CURSOR_LOW);
                let low = usize::from(data.read());
                (high << 8) | low
            }
        }

        fn set_cursor(&mut self, pos: usize) {
            let mut index: Port<u8> = Port::new(CRT_PORT);
            let mut data: Port<u8> = Port::new(CRT_PORT + 1);
            // SAFETY: as for `cursor`.
            unsafe {
                index.write(CURSOR_HIGH);
                data.write((pos >> 8) as u8);
                index.write(CURSOR_LOW);
                data.write(pos as u8);
            }
        }
    }
}
