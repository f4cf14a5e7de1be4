//! The console as a character device.
//!
//! One spinlock guards the whole [`Console`] value; it is held across a
//! full dispatcher iteration and across each reader/writer critical
//! section, with interrupts disabled on the local processor so the
//! keyboard handler cannot re-enter. Readers park on a scheduler channel
//! keyed by the device's address and are woken when the dispatcher commits
//! a line, an EOF marker, or a full ring.

use spin::Mutex;

use super::screen::TextVideo;
use super::{ByteSink, Console, KeyOutcome, EOT};
use crate::sched::Scheduler;

/// What a locked scan of the ring told the reader to do next.
enum ReadStep {
    /// Line, EOF or a filled destination: the read is complete.
    Done,
    /// Ring drained without a terminator; wait for the dispatcher.
    Sleep,
    /// The current thread was killed while waiting.
    Killed,
}

/// A [`Console`] behind the device lock.
pub struct ConsoleDevice<V, S> {
    inner: Mutex<Console<V, S>>,
}

impl<V: TextVideo, S: ByteSink> ConsoleDevice<V, S> {
    pub const fn new(video: V, serial: S) -> Self {
        Self {
            inner: Mutex::new(Console::new(video, serial)),
        }
    }

    /// The sleep/wakeup channel readers of this device park on.
    fn channel(&self) -> usize {
        self as *const Self as usize
    }

    /// Run `f` under the device lock with local interrupts disabled.
    fn with_device<R>(&self, f: impl FnOnce(&mut Console<V, S>) -> R) -> R {
        #[cfg(all(target_arch = "x86_64", target_os = "none"))]
        {
            x86_64::instructions::interrupts::without_interrupts(|| f(&mut self.inner.lock()))
        }
        #[cfg(not(all(target_arch = "x86_64", target_os = "none")))]
        {
            f(&mut self.inner.lock())
        }
    }

    /// Dispatcher entry: drain the input source under the lock, routing
    /// each keystroke and waking readers as lines complete. A Ctrl+P
    /// process dump is only latched here; it runs after the lock is
    /// dropped because it takes other locks.
    pub fn handle_interrupt(
        &self,
        getc: &mut dyn FnMut() -> Option<u8>,
        sched: &dyn Scheduler,
    ) {
        let mut dump = false;
        self.with_device(|con| {
            while let Some(key) = getc() {
                match con.handle_key(key) {
                    KeyOutcome::Handled => {}
                    KeyOutcome::LineReady => sched.wakeup(self.channel()),
                    KeyOutcome::ProcessDump => dump = true,
                }
            }
        });
        if dump {
            sched.process_dump();
        }
    }

    /// Blocking read.
    ///
    /// Returns once at least one byte is available and a newline was
    /// consumed, an EOF marker was seen, or `dst` is full. An EOF marker
    /// hit after earlier bytes is pushed back so the next call returns 0.
    /// Returns `-1` if the calling thread is killed while waiting.
    pub fn read(&self, dst: &mut [u8], sched: &dyn Scheduler) -> isize {
        let mut n = 0;
        loop {
            let step = self.with_device(|con| {
                if con.input.r == con.input.w {
                    return if sched.current_killed() {
                        ReadStep::Killed
                    } else {
                        ReadStep::Sleep
                    };
                }
                while n < dst.len() && con.input.r != con.input.w {
                    let ch = con.input.at(con.input.r);
                    con.input.r += 1;
                    if ch == EOT {
                        if n > 0 {
                            // Save the EOF marker so the next call
                            // delivers the 0-byte result.
                            con.input.r -= 1;
                        }
                        return ReadStep::Done;
                    }
                    dst[n] = ch;
                    n += 1;
                    if ch == b'\n' {
                        return ReadStep::Done;
                    }
                }
                if n == dst.len() {
                    ReadStep::Done
                } else {
                    ReadStep::Sleep
                }
            });

            match step {
                ReadStep::Done => return n as isize,
                ReadStep::Killed => return -1,
                ReadStep::Sleep => sched.sleep(self.channel()),
            }
        }
    }

    /// Write: mirror every byte through the sinks under the lock.
    pub fn write(&self, src: &[u8]) -> usize {
        self.with_device(|con| {
            for &b in src {
                con.emit(u16::from(b));
            }
        });
        src.len()
    }

    /// Run `f` on the locked console. For host-side callers (logger,
    /// panic banner) that need formatted output through the sinks.
    pub fn with_console<R>(&self, f: impl FnOnce(&mut Console<V, S>) -> R) -> R {
        self.with_device(f)
    }

    #[cfg(test)]
    pub(crate) fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}
