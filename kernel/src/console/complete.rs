//! First-word tab completion.
//!
//! Tab matches the line's first word against the fixed command dictionary.
//! A single match inserts the missing suffix through the ordinary insert
//! path. Several matches first extend the word to their longest common
//! prefix; a second Tab in a row lists every match, reprompts and redraws
//! the in-progress line. Completion never looks past the first word: once
//! the line contains a space, Tab does nothing.

use super::screen::TextVideo;
use super::{ByteSink, Console};

/// Userspace program names, in listing order. Fixed at build time to the
/// tool set shipped with the system.
pub const COMMANDS: &[&str] = &[
    "cat", "echo", "forktest", "grep", "init", "kill", "ln", "ls", "mkdir", "rm", "sh",
    "stressfs", "usertests", "wc", "zombie",
];

/// Longest prefix length shared by every dictionary entry that starts
/// with `prefix`.
fn common_prefix_len(prefix: &[u8]) -> usize {
    let mut len = usize::MAX;
    let mut first: Option<&[u8]> = None;
    for cmd in COMMANDS {
        let cmd = cmd.as_bytes();
        if !cmd.starts_with(prefix) {
            continue;
        }
        match first {
            None => {
                first = Some(cmd);
                len = cmd.len();
            }
            Some(reference) => {
                let mut i = 0;
                while i < len.min(cmd.len()) && reference[i] == cmd[i] {
                    i += 1;
                }
                len = i;
            }
        }
    }
    if first.is_some() {
        len
    } else {
        0
    }
}

impl<V: TextVideo, S: ByteSink> Console<V, S> {
    /// Handle Tab. `was_tab` is the tab bit: whether the previous handled
    /// keystroke was also a Tab.
    pub(crate) fn complete(&mut self, was_tab: bool) {
        // The word under completion is the whole line; give up as soon as
        // a second token starts.
        let len = self.input.line_len();
        let mut prefix = [0u8; super::buffer::INPUT_BUF];
        for (i, slot) in prefix.iter_mut().take(len).enumerate() {
            let b = self.input.at(self.input.w + i);
            if b == b' ' {
                return;
            }
            *slot = b;
        }
        let prefix = &prefix[..len];

        let mut matches = 0;
        let mut first_match: &[u8] = b"";
        for cmd in COMMANDS {
            if cmd.as_bytes().starts_with(prefix) {
                matches += 1;
                if matches == 1 {
                    first_match = cmd.as_bytes();
                }
            }
        }

        match matches {
            0 => {}
            1 => self.insert_suffix(first_match, len),
            _ if !was_tab => {
                let shared = common_prefix_len(prefix);
                if shared > len {
                    self.insert_suffix(&first_match[..shared], len);
                }
                self.last_key_was_tab = true;
            }
            _ => self.list_matches(prefix),
        }
    }

    /// Insert `word[from..]` at the cursor through the ordinary insert
    /// path; stops when the ring fills.
    fn insert_suffix(&mut self, word: &[u8], from: usize) {
        for &b in &word[from..] {
            if self.input.is_full() {
                break;
            }
            self.insert_at_cursor(b);
        }
    }

    /// Second Tab on an ambiguous word: list every match, reprompt and
    /// redraw the line. The undo log does not survive the redraw.
    fn list_matches(&mut self, prefix: &[u8]) {
        self.emit(u16::from(b'\n'));
        let mut first = true;
        for cmd in COMMANDS {
            if !cmd.as_bytes().starts_with(prefix) {
                continue;
            }
            if !first {
                self.emit(u16::from(b' '));
                self.emit(u16::from(b' '));
            }
            first = false;
            for &b in cmd.as_bytes() {
                self.emit(u16::from(b));
            }
        }
        self.emit(u16::from(b'\n'));
        self.emit(u16::from(b'$'));
        self.emit(u16::from(b' '));

        // Re-emit the in-progress bytes, then re-establish the cursor
        // mapping with the edit cursor back at the prompt point.
        for i in self.input.w..self.input.e {
            let ch = self.input.at(i);
            self.emit(u16::from(ch));
        }
        let pos = self.screen.cursor();
        self.screen.set_cursor(pos - self.input.line_len());
        self.input.c = self.input.w;
        self.undo.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{common_prefix_len, COMMANDS};
    use crate::console::testing::{feed_keys, line, screen_text, test_console, Checked};

    #[test]
    fn test_dictionary_is_sorted_enough_for_listing() {
        // The completion scenarios rely on "sh" preceding "stressfs".
        let sh = COMMANDS.iter().position(|c| *c == "sh").unwrap();
        let stressfs = COMMANDS.iter().position(|c| *c == "stressfs").unwrap();
        assert!(sh < stressfs);
    }

    #[test]
    fn test_common_prefix_len() {
        assert_eq!(common_prefix_len(b"s"), 1); // sh / stressfs
        assert_eq!(common_prefix_len(b"ca"), 3); // cat alone
        assert_eq!(common_prefix_len(b"xyz"), 0);
    }

    #[test]
    fn test_single_match_inserts_suffix() {
        let mut con = Checked(test_console());
        feed_keys(&mut con, b"ca\t");
        assert_eq!(line(&con), b"cat");
        assert_eq!(con.input.c, con.input.e);
        assert!(!con.last_key_was_tab);
    }

    #[test]
    fn test_completed_word_commits_cleanly() {
        let mut con = Checked(test_console());
        feed_keys(&mut con, b"ca\t\n");
        let drained: Vec<u8> = (con.input.r..con.input.w).map(|i| con.input.at(i)).collect();
        assert_eq!(drained, b"cat\n");
    }

    #[test]
    fn test_no_match_is_a_noop() {
        let mut con = Checked(test_console());
        feed_keys(&mut con, b"qq\t");
        assert_eq!(line(&con), b"qq");
        assert!(!con.last_key_was_tab);
    }

    #[test]
    fn test_second_token_is_never_completed() {
        let mut con = Checked(test_console());
        feed_keys(&mut con, b"cat fil\t");
        assert_eq!(line(&con), b"cat fil");
    }

    #[test]
    fn test_ambiguous_prefix_arms_tab_bit() {
        let mut con = Checked(test_console());
        // "s" matches sh and stressfs, whose shared prefix is just "s":
        // nothing to insert, but the tab bit arms for the listing.
        feed_keys(&mut con, b"s\t");
        assert_eq!(line(&con), b"s");
        assert!(con.last_key_was_tab);
    }

    #[test]
    fn test_second_tab_lists_matches_and_reprompts() {
        let mut con = Checked(test_console());
        feed_keys(&mut con, b"s\t\t");
        let text = screen_text(&con);
        assert!(text.contains("sh  stressfs"));
        assert!(text.contains("$ s"));
        // The line survives logically with the edit cursor back at the
        // prompt point.
        assert_eq!(line(&con), b"s");
        assert_eq!(con.input.c, con.input.w);
        assert_eq!(con.undo.len(), 0);
        assert!(!con.last_key_was_tab);
    }

    #[test]
    fn test_typing_between_tabs_rearms_the_listing() {
        let mut con = Checked(test_console());
        feed_keys(&mut con, b"s\t");
        assert!(con.last_key_was_tab);
        feed_keys(&mut con, b"h");
        assert!(!con.last_key_was_tab);
        // "sh" now matches a single command and is already complete.
        feed_keys(&mut con, b"\t");
        assert_eq!(line(&con), b"sh");
    }
}
