//! Line-editing commands.
//!
//! Every command leaves the ring cursors, the screen cells and the
//! hardware cursor in agreement: the cells from the line origin mirror
//! `buf[w..e)` and the hardware cursor sits at `origin + (c - w)`.

use super::screen::{TextVideo, BACKSPACE};
use super::undo::OpKind;
use super::{ByteSink, Console, KeyOutcome, EOT};

pub(crate) fn is_whitespace(c: u8) -> bool {
    c == b' ' || c == b'\t' || c == b'\n' || c == 0x0b
}

impl<V: TextVideo, S: ByteSink> Console<V, S> {
    /// Insert `byte` at the edit cursor, logging it for undo and pulling
    /// the hardware cursor back over the redrawn tail.
    ///
    /// Pre-condition: the ring is not full.
    pub(crate) fn insert_at_cursor(&mut self, byte: u8) {
        let at = self.input.c;
        self.undo.push(OpKind::Insert, byte, at);

        self.input.insert(at, byte);
        self.input.c += 1;

        // Redraw from the inserted byte to the end of the line, then pull
        // the cursor back over the shifted tail.
        for i in (self.input.c - 1)..self.input.e {
            let ch = self.input.at(i);
            self.emit(u16::from(ch));
        }
        let pos = self.screen.cursor();
        self.screen.set_cursor(pos - (self.input.e - self.input.c));
    }

    /// Delete the byte left of the cursor and close the gap on screen.
    pub(crate) fn backspace(&mut self) {
        if self.input.c <= self.input.w {
            return;
        }

        let removed = self.input.remove(self.input.c - 1);
        self.input.c -= 1;
        self.undo.push(OpKind::Delete, removed, self.input.c);

        // Step the cursor back, redraw the shifted tail, blank the vacated
        // cell, then park the cursor at the logical position.
        let pos = self.screen.cursor();
        self.screen.set_cursor(pos - 1);
        for i in self.input.c..self.input.e {
            let ch = self.input.at(i);
            self.emit(u16::from(ch));
        }
        self.emit(u16::from(b' '));
        let pos = self.screen.cursor();
        self.screen
            .set_cursor(pos - (self.input.e - self.input.c + 1));
    }

    pub(crate) fn cursor_left(&mut self) {
        if self.input.c > self.input.w {
            self.input.c -= 1;
            let pos = self.screen.cursor();
            self.screen.set_cursor(pos - 1);
        }
    }

    pub(crate) fn cursor_right(&mut self) {
        if self.input.c < self.input.e {
            self.input.c += 1;
            let pos = self.screen.cursor();
            self.screen.set_cursor(pos + 1);
        }
    }

    /// Ctrl+A: skip whitespace leftward, then the word before it.
    pub(crate) fn backward_word(&mut self) {
        if self.input.c <= self.input.w {
            return;
        }
        let old = self.input.c;
        let mut i = self.input.c - 1;
        while i > self.input.w && is_whitespace(self.input.at(i)) {
            i -= 1;
        }
        while i > self.input.w && !is_whitespace(self.input.at(i - 1)) {
            i -= 1;
        }
        self.input.c = i;
        let pos = self.screen.cursor();
        self.screen.set_cursor(pos - (old - i));
    }

    /// Ctrl+D on a non-empty line: skip the word under the cursor, then
    /// the whitespace after it. The cursor only moves when the landing
    /// index is strictly inside the line.
    pub(crate) fn forward_word(&mut self) {
        if self.input.c >= self.input.e {
            return;
        }
        let old = self.input.c;
        let mut i = self.input.c;
        while i < self.input.e && !is_whitespace(self.input.at(i)) {
            i += 1;
        }
        while i < self.input.e && is_whitespace(self.input.at(i)) {
            i += 1;
        }
        if i < self.input.e {
            let pos = self.screen.cursor();
            self.screen.set_cursor(pos + (i - old));
            self.input.c = i;
        }
    }

    /// Ctrl+U: erase the whole uncommitted line and forget the undo log.
    pub(crate) fn kill_line(&mut self) {
        self.clear_selection();
        if self.input.line_len() == 0 {
            return;
        }

        // Walk the cursor to the end of the line so the backspaces sweep
        // over every cell.
        let pos = self.screen.cursor();
        self.screen.set_cursor(pos + (self.input.e - self.input.c));
        self.input.c = self.input.e;

        while self.input.e != self.input.w {
            self.input.e -= 1;
            self.input.c -= 1;
            self.emit(BACKSPACE);
        }
        self.input.c = self.input.w;
        self.undo.clear();
    }

    /// Commit the line: draw the newline, append it when a slot remains,
    /// and make everything up to `e` visible to readers.
    ///
    /// When the ring is completely full the line is committed without its
    /// terminating newline; appending one would overrun the ring.
    pub(crate) fn commit_line(&mut self) -> KeyOutcome {
        // Neither a highlighted range nor a pending anchor survives the
        // commit.
        self.clear_selection();
        self.emit(u16::from(b'\n'));
        if !self.input.is_full() {
            self.input.push(b'\n');
        }
        self.input.w = self.input.e;
        self.input.c = self.input.w;
        self.undo.clear();
        KeyOutcome::LineReady
    }

    /// Ctrl+D on an empty line: commit a lone EOF marker.
    pub(crate) fn append_eof(&mut self) -> KeyOutcome {
        self.clear_selection();
        if self.input.is_full() {
            // Nowhere to put the marker until readers drain the ring.
            return KeyOutcome::Handled;
        }
        self.input.push(EOT);
        self.input.w = self.input.e;
        self.input.c = self.input.w;
        self.undo.clear();
        KeyOutcome::LineReady
    }
}
