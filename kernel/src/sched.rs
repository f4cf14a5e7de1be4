//! Scheduler contract.
//!
//! The console does not schedule anything itself; it suspends blocked
//! readers and wakes them through these primitives, provided by whatever
//! kernel hosts the device. The contract mirrors the classic
//! sleep/wakeup channel pair: a channel is an opaque word (the console
//! uses its own address), `wakeup` makes every thread sleeping on the
//! channel runnable.

use conquer_once::spin::OnceCell;

/// Sleep/wakeup channels plus the kill flag and the process-table dump.
///
/// `sleep` is called with the console device lock already released; a
/// `wakeup` issued after the caller's last availability check must not be
/// lost (implementations typically pair the channel with a generation
/// counter, or re-run the caller promptly). Spurious returns from `sleep`
/// are fine: the console re-checks its condition on every wakeup.
///
/// `wakeup` and `process_dump` must not call back into the console's
/// blocking entry points; `wakeup` runs with the device lock held.
pub trait Scheduler {
    /// Block the current thread until `wakeup` is called on `channel`.
    fn sleep(&self, channel: usize);

    /// Make every thread sleeping on `channel` runnable.
    fn wakeup(&self, channel: usize);

    /// True when the current thread has been marked killed; a sleeping
    /// reader returns `-1` promptly once this is set.
    fn current_killed(&self) -> bool;

    /// Dump the process table. Invoked for Ctrl+P, always after the
    /// console lock has been dropped, since the dump takes other locks.
    fn process_dump(&self);
}

static SCHEDULER: OnceCell<&'static (dyn Scheduler + Sync)> = OnceCell::uninit();

/// Register the host kernel's scheduler. Later registrations are ignored.
pub fn register(sched: &'static (dyn Scheduler + Sync)) {
    let _ = SCHEDULER.try_init_once(|| sched);
}

/// The registered scheduler, or a busy-wait fallback when the host has
/// not registered one yet (early boot).
pub fn scheduler() -> &'static (dyn Scheduler + Sync) {
    static FALLBACK: BusyWait = BusyWait;
    match SCHEDULER.try_get() {
        Ok(sched) => *sched,
        Err(_) => &FALLBACK,
    }
}

/// Placeholder used before a real scheduler exists: `sleep` returns at
/// once, so blocked readers poll instead of suspending.
pub struct BusyWait;

impl Scheduler for BusyWait {
    fn sleep(&self, _channel: usize) {
        core::hint::spin_loop();
    }

    fn wakeup(&self, _channel: usize) {}

    fn current_killed(&self) -> bool {
        false
    }

    fn process_dump(&self) {
        log::debug!("process dump requested, but no scheduler is registered");
    }
}
