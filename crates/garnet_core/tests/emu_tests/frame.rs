use crate::setup::emu_with_program;
use garnet_core::emulator::debug::DebugEmulator;
use garnet_core::emulator::ppu::RGBA;
use garnet_core::DISPLAY_WIDTH;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const DISPCNT: u32 = 0x0400_0000;
const DISPSTAT: u32 = 0x0400_0004;

/// An endless `B .` so the frame loop has something to chew on.
const IDLE_LOOP: &[u32] = &[0xEAFF_FFFE];

#[test]
fn mode3_frame_reaches_the_draw_callback() {
    let mut emu = emu_with_program(IDLE_LOOP);
    {
        let mut debug = DebugEmulator(&mut emu);
        let (bus, cpu) = debug.bus_and_cpu();

        // Bitmap mode 3, red in the top-left pixel and green two rows down
        bus.write_16(DISPCNT, 0x0003, cpu);
        bus.write_16(0x0600_0000, 0x001F, cpu);
        bus.write_16(0x0600_0000 + 2 * DISPLAY_WIDTH * 2, 0x1F << 5, cpu);
    }

    let drawn = Arc::new(AtomicBool::new(false));
    let drawn_in_callback = drawn.clone();

    emu.set_draw(Box::new(move |frame| {
        let red = RGBA {
            red: 0xFF,
            green: 0,
            blue: 0,
            alpha: 0xFF,
        };
        let green = RGBA {
            red: 0,
            green: 0xFF,
            blue: 0,
            alpha: 0xFF,
        };

        let matches = frame[0] == red && frame[2 * DISPLAY_WIDTH as usize] == green;
        drawn_in_callback.store(matches, Ordering::SeqCst);
    }));

    emu.frame();

    assert!(drawn.load(Ordering::SeqCst));
}

#[test]
fn mode4_uses_the_palette() {
    let mut emu = emu_with_program(IDLE_LOOP);
    {
        let mut debug = DebugEmulator(&mut emu);
        let (bus, cpu) = debug.bus_and_cpu();

        // Bitmap mode 4, palette entry 1 is blue, first pixel uses it
        bus.write_16(DISPCNT, 0x0004, cpu);
        bus.write_16(0x0500_0002, 0x1F << 10, cpu);
        bus.write_16(0x0600_0000, 0x0001, cpu);
    }

    emu.frame();

    let mut debug = DebugEmulator(&mut emu);
    let pixel = debug.bus().ppu.frame_buffer()[0];
    assert_eq!(
        pixel,
        RGBA {
            red: 0,
            green: 0,
            blue: 0xFF,
            alpha: 0xFF
        }
    );
}

#[test]
fn vblank_and_vcounter_interrupts_latch_during_a_frame() {
    let mut emu = emu_with_program(IDLE_LOOP);
    {
        let mut debug = DebugEmulator(&mut emu);
        let (bus, cpu) = debug.bus_and_cpu();

        // VBlank + VCounter IRQs enabled, match line 159. IME stays off so the flags
        // survive in IF for inspection.
        bus.write_16(DISPSTAT, (159 << 8) | 0b10_1000, cpu);
    }

    emu.frame();

    let mut debug = DebugEmulator(&mut emu);
    let bus = debug.bus();
    assert!(bus.interrupts.flags.vblank());
    assert!(bus.interrupts.flags.vcounter_match());
    // The loop ends on the final line
    assert_eq!(bus.ppu.current_scanline(), 227);
    // Line 227 sits outside the VBlank flag window
    assert!(!bus.ppu.status().v_blank_flag());
}

#[test]
fn hblank_interrupt_fires_every_line() {
    let mut emu = emu_with_program(IDLE_LOOP);
    {
        let mut debug = DebugEmulator(&mut emu);
        let (bus, cpu) = debug.bus_and_cpu();

        bus.write_16(DISPSTAT, 0b1_0000, cpu);
    }

    emu.frame();

    let mut debug = DebugEmulator(&mut emu);
    assert!(debug.bus().interrupts.flags.hblank());
}

#[test]
fn timer_overflows_during_a_frame() {
    let mut emu = emu_with_program(IDLE_LOOP);
    {
        let mut debug = DebugEmulator(&mut emu);
        let (bus, cpu) = debug.bus_and_cpu();

        // Timer 0: prescaler 1, IRQ on overflow, enabled. A frame is ~280k cycles, so
        // the 16-bit counter wraps several times.
        bus.write_16(0x0400_0102, 0x00C0, cpu);
    }

    emu.frame();

    let mut debug = DebugEmulator(&mut emu);
    assert!(debug.bus().interrupts.flags.timer_0());
}

#[test]
fn cpu_takes_the_timer_interrupt() {
    use garnet_core::emulator::cpu::registers::Mode;

    let mut emu = emu_with_program(IDLE_LOOP);
    {
        let mut debug = DebugEmulator(&mut emu);
        let (bus, cpu) = debug.bus_and_cpu();

        bus.write_32(0x0400_0208, 1, cpu);
        bus.write_16(0x0400_0200, 1 << 3, cpu);
        // Reload high so the overflow comes quickly
        bus.write_16(0x0400_0100, 0xFF00, cpu);
        bus.write_16(0x0400_0102, 0x00C0, cpu);
    }

    let mut entered_irq = false;
    for _ in 0..10_000 {
        emu.step_instruction();

        let mut debug = DebugEmulator(&mut emu);
        if debug.cpu().registers.cpsr.mode() == Mode::IRQ {
            entered_irq = true;
            break;
        }
    }

    assert!(entered_irq);
}
