//! IDT and 8259 PIC glue for the keyboard interrupt.
//!
//! Routes IRQ 1 to the console dispatcher on the boot processor. Only the
//! keyboard line is unmasked; everything else belongs to the host kernel.

use conquer_once::spin::OnceCell;
use pic8259::ChainedPics;
use spin::Mutex;
use x86_64::structures::idt::{InterruptDescriptorTable, InterruptStackFrame};

pub const PIC_1_OFFSET: u8 = 32;
pub const PIC_2_OFFSET: u8 = PIC_1_OFFSET + 8;

pub static PICS: Mutex<ChainedPics> =
    Mutex::new(unsafe { ChainedPics::new(PIC_1_OFFSET, PIC_2_OFFSET) });

#[derive(Debug, Clone, Copy)]
#[repr(u8)]
pub enum InterruptIndex {
    Keyboard = PIC_1_OFFSET + 1,
}

impl InterruptIndex {
    fn as_u8(self) -> u8 {
        self as u8
    }
}

static IDT: OnceCell<InterruptDescriptorTable> = OnceCell::uninit();

/// Load the IDT, remap the PICs and unmask the keyboard line.
pub fn init() {
    IDT.init_once(|| {
        let mut idt = InterruptDescriptorTable::new();
        idt[InterruptIndex::Keyboard.as_u8()].set_handler_fn(keyboard_interrupt_handler);
        idt
    });
    IDT.try_get().expect("IDT just initialized").load();

    // SAFETY: standard PIC remap to vectors 32..48 before unmasking.
    unsafe {
        PICS.lock().initialize();
        // Leave only the cascade and the keyboard line open.
        PICS.lock().write_masks(0b1111_1001, 0b1111_1111);
    }

    log::info!("keyboard interrupt routed");
}

extern "x86-interrupt" fn keyboard_interrupt_handler(_stack_frame: InterruptStackFrame) {
    let mut getc = crate::keyboard::get_char;
    crate::console::console().handle_interrupt(&mut getc, crate::sched::scheduler());

    // SAFETY: acknowledging the vector we are handling.
    unsafe {
        PICS.lock()
            .notify_end_of_interrupt(InterruptIndex::Keyboard.as_u8());
    }
}
