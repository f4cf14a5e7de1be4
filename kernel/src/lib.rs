//! Console subsystem: an interactive line-editing console over the CGA
//! text screen and COM1, exposed as a blocking character device.
//!
//! The editing core is target-independent and exercised by host tests;
//! everything that touches ports or MMIO is gated to x86_64, and the
//! interrupt glue additionally to bare-metal builds.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_os = "none", feature(abi_x86_interrupt))]

pub mod console;
pub mod dev;
pub mod macros;
pub mod panic;
pub mod sched;

#[cfg(target_arch = "x86_64")]
pub mod keyboard;
#[cfg(target_arch = "x86_64")]
pub mod logger;
#[cfg(target_arch = "x86_64")]
pub mod serial;

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
pub mod interrupts;

/// Bring the console up: serial first so early logging works, then the
/// logger, the device-table entry, and finally keyboard interrupt
/// routing on the boot processor.
#[cfg(target_arch = "x86_64")]
pub fn init() {
    serial::init();
    logger::init();
    console::init();
    #[cfg(target_os = "none")]
    interrupts::init();
    log::info!("console device ready");
}
