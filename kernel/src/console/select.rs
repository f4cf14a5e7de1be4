//! Selection and clipboard.
//!
//! Ctrl+S anchors a selection at the cursor; a second Ctrl+S confirms it
//! and the covered cells flip to inverse video. The range lives in buffer
//! indices, so it is clamped to the visible line `[w, e)` whenever it is
//! consumed. One 128-byte clipboard holds the last copy.

use super::screen::{TextVideo, ATTR_INVERSE, ATTR_NORMAL, CELLS};
use super::{ByteSink, Console};

/// Clipboard capacity in bytes.
pub const CLIPBOARD_BUF: usize = 128;

/// Selection state. `Anchored` is the half-state between the two Ctrl+S
/// keystrokes: the anchor is set but no range is highlighted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Inactive,
    Anchored { start: usize },
    Active { start: usize, end: usize },
}

/// Last copied byte range, truncated to capacity.
pub struct Clipboard {
    buf: [u8; CLIPBOARD_BUF],
    len: usize,
}

impl Clipboard {
    pub const fn new() -> Self {
        Self {
            buf: [0; CLIPBOARD_BUF],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn at(&self, i: usize) -> u8 {
        self.buf[i]
    }
}

impl<V: TextVideo, S: ByteSink> Console<V, S> {
    /// Ctrl+S: anchor on the first press, confirm on the second.
    pub(crate) fn toggle_select(&mut self) {
        match self.selection {
            Selection::Inactive | Selection::Active { .. } => {
                self.clear_selection();
                self.selection = Selection::Anchored {
                    start: self.input.c,
                };
            }
            Selection::Anchored { start } => {
                let (start, end) = if start <= self.input.c {
                    (start, self.input.c)
                } else {
                    (self.input.c, start)
                };
                // The anchor may have gone stale if the line shrank while
                // it was pending; keep the range inside the visible line.
                let start = start.max(self.input.w);
                let end = end.min(self.input.e);
                if start >= end {
                    self.selection = Selection::Inactive;
                } else {
                    self.selection = Selection::Active { start, end };
                    self.paint_highlight(start, end, true);
                }
            }
        }
    }

    /// Flip the attribute over buffer range `[start, end)`, clamped to the
    /// visible line. Glyphs are untouched.
    fn paint_highlight(&mut self, start: usize, end: usize, on: bool) {
        let start = start.max(self.input.w);
        let end = end.min(self.input.e);
        if start >= end {
            return;
        }

        let origin = self.line_origin();
        let attr = if on { ATTR_INVERSE } else { ATTR_NORMAL };
        for i in start..end {
            let pos = origin + (i - self.input.w);
            if pos < CELLS {
                self.screen.set_attr(pos, attr);
            }
        }
    }

    /// Screen cell mirroring `w`, derived from the hardware cursor.
    pub(crate) fn line_origin(&self) -> usize {
        self.screen.cursor() - (self.input.c - self.input.w)
    }

    /// Drop any selection state, restoring highlighted cells.
    pub(crate) fn clear_selection(&mut self) {
        if let Selection::Active { start, end } = self.selection {
            self.paint_highlight(start, end, false);
        }
        self.selection = Selection::Inactive;
    }

    /// Clear a confirmed selection; an anchor with no confirmed end
    /// survives so the pending Ctrl+S pair still completes.
    pub(crate) fn deselect_if_any(&mut self) {
        if let Selection::Active { .. } = self.selection {
            self.clear_selection();
        }
    }

    /// Ctrl+C: copy the selected bytes, capped to clipboard capacity.
    /// Without a confirmed selection only the selection artefact is
    /// cleared; the clipboard keeps its previous contents.
    pub(crate) fn copy_selection(&mut self) {
        match self.selection {
            Selection::Active { start, end } => {
                let start = start.max(self.input.w);
                let end = end.min(self.input.e);
                let len = (end - start).min(CLIPBOARD_BUF);
                for i in 0..len {
                    self.clipboard.buf[i] = self.input.at(start + i);
                }
                self.clipboard.len = len;
            }
            _ => self.clear_selection(),
        }
    }

    /// Ctrl+V: replace any active selection with the clipboard bytes,
    /// inserted one by one through the ordinary insert path so each byte
    /// is undoable. Insertion stops when the ring fills.
    pub(crate) fn paste(&mut self) {
        if self.clipboard.len > 0 {
            if let Selection::Active { .. } = self.selection {
                self.delete_selection();
            }
            for i in 0..self.clipboard.len {
                if self.input.is_full() {
                    break;
                }
                let ch = self.clipboard.buf[i];
                self.insert_at_cursor(ch);
            }
        }
        self.clear_selection();
    }

    /// Remove the selected bytes from the line, log the deletions, close
    /// the gap on screen and park the cursor at the selection start.
    pub(crate) fn delete_selection(&mut self) {
        let Selection::Active { start, end } = self.selection else {
            return;
        };

        let start = start.max(self.input.w);
        let end = end.min(self.input.e);
        if start >= end {
            self.clear_selection();
            return;
        }

        let len = end - start;
        let old_e = self.input.e;
        for k in 0..len {
            let ch = self.input.at(start + k);
            self.undo
                .push(super::undo::OpKind::Delete, ch, start + k);
        }

        // The origin is derived from the cursor mapping before any index
        // moves.
        let origin = self.line_origin().min(CELLS - 1);

        for i in end..old_e {
            let ch = self.input.at(i);
            self.input.set(i - len, ch);
        }
        self.input.e -= len;
        self.input.c = start;

        // Redraw the surviving line and blank the freed tail.
        self.screen.set_cursor(origin);
        for i in self.input.w..self.input.e {
            let ch = self.input.at(i);
            self.emit(u16::from(ch));
        }
        for _ in 0..(old_e - self.input.e) {
            self.emit(u16::from(b' '));
        }
        self.screen
            .set_cursor(origin + (self.input.c - self.input.w));

        self.selection = Selection::Inactive;
    }
}
