//! Character-device switch.
//!
//! A fixed table mapping device numbers to read/write entry points. The
//! filesystem layer resolves a device file's major number here; the
//! console registers itself at [`CONSOLE`] during init.

use spin::Mutex;

use crate::sched::Scheduler;

/// Number of device slots.
pub const NDEV: usize = 10;
/// Device number of the console.
pub const CONSOLE: usize = 1;

/// Entry points of one character device.
#[derive(Clone, Copy)]
pub struct DevOps {
    pub read: fn(dst: &mut [u8], sched: &dyn Scheduler) -> isize,
    pub write: fn(src: &[u8]) -> isize,
}

static DEVICES: Mutex<[Option<DevOps>; NDEV]> = Mutex::new([None; NDEV]);

/// Install `ops` at `slot`. Out-of-range slots are ignored.
pub fn register(slot: usize, ops: DevOps) {
    if slot < NDEV {
        DEVICES.lock()[slot] = Some(ops);
    }
}

/// Read from device `slot`. Returns `-1` for an unregistered device.
pub fn read(slot: usize, dst: &mut [u8], sched: &dyn Scheduler) -> isize {
    let ops = DEVICES.lock().get(slot).copied().flatten();
    match ops {
        Some(ops) => (ops.read)(dst, sched),
        None => -1,
    }
}

/// Write to device `slot`. Returns `-1` for an unregistered device.
pub fn write(slot: usize, src: &[u8]) -> isize {
    let ops = DEVICES.lock().get(slot).copied().flatten();
    match ops {
        Some(ops) => (ops.write)(src),
        None => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sched::{BusyWait, Scheduler};

    fn stub_read(dst: &mut [u8], _sched: &dyn Scheduler) -> isize {
        if let Some(slot) = dst.first_mut() {
            *slot = b'!';
        }
        1
    }

    fn stub_write(src: &[u8]) -> isize {
        src.len() as isize
    }

    #[test]
    fn test_unregistered_slot_returns_error() {
        let mut buf = [0u8; 4];
        assert_eq!(read(NDEV - 1, &mut buf, &BusyWait), -1);
        assert_eq!(write(NDEV - 1, b"x"), -1);
    }

    #[test]
    fn test_registered_ops_are_dispatched() {
        register(
            NDEV - 2,
            DevOps {
                read: stub_read,
                write: stub_write,
            },
        );
        let mut buf = [0u8; 4];
        assert_eq!(read(NDEV - 2, &mut buf, &BusyWait), 1);
        assert_eq!(buf[0], b'!');
        assert_eq!(write(NDEV - 2, b"abc"), 3);
    }

    #[test]
    fn test_out_of_range_registration_is_ignored() {
        register(
            NDEV + 5,
            DevOps {
                read: stub_read,
                write: stub_write,
            },
        );
        let mut buf = [0u8; 4];
        assert_eq!(read(NDEV + 5, &mut buf, &BusyWait), -1);
    }
}
