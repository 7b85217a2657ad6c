use crate::setup::emu_with_program;
use garnet_core::emulator::debug::DebugEmulator;

#[test]
fn cpu_set_copies_halfwords() {
    // SWI 0x0B (CpuSet); in ARM state the function number sits in the comment's
    // upper byte
    let mut emu = emu_with_program(&[0xEF0B_0000]);
    {
        let mut debug = DebugEmulator(&mut emu);
        let (bus, cpu) = debug.bus_and_cpu();

        for i in 0..4u32 {
            bus.write_16(0x0200_0000 + i * 2, 0xA000 | i as u16, cpu);
        }

        let registers = &mut debug.cpu().registers;
        registers.general_purpose[0] = 0x0200_0000;
        registers.general_purpose[1] = 0x0200_0100;
        registers.general_purpose[2] = 4;
    }

    emu.step_instruction();

    let mut debug = DebugEmulator(&mut emu);
    let (bus, cpu) = debug.bus_and_cpu();
    for i in 0..4u32 {
        assert_eq!(bus.read_16(0x0200_0100 + i * 2, cpu), 0xA000 | i as u16);
    }
}

#[test]
fn cpu_set_fills_words() {
    let mut emu = emu_with_program(&[0xEF0B_0000]);
    {
        let mut debug = DebugEmulator(&mut emu);
        let (bus, cpu) = debug.bus_and_cpu();

        bus.write_32(0x0200_0000, 0xCAFE_F00D, cpu);

        let registers = &mut debug.cpu().registers;
        registers.general_purpose[0] = 0x0200_0000;
        registers.general_purpose[1] = 0x0200_0200;
        // Fill mode (bit 24), word units (bit 26), 8 units
        registers.general_purpose[2] = (1 << 24) | (1 << 26) | 8;
    }

    emu.step_instruction();

    let mut debug = DebugEmulator(&mut emu);
    let (bus, cpu) = debug.bus_and_cpu();
    for i in 0..8u32 {
        assert_eq!(bus.read_32(0x0200_0200 + i * 4, cpu), 0xCAFE_F00D);
    }
}

#[test]
fn register_ram_reset_clears_selected_blocks() {
    // SWI 0x01 (RegisterRamReset)
    let mut emu = emu_with_program(&[0xEF01_0000]);
    {
        let mut debug = DebugEmulator(&mut emu);
        let (bus, cpu) = debug.bus_and_cpu();

        bus.write_32(0x0200_0000, 0x1111_1111, cpu);
        bus.write_16(0x0500_0000, 0x2222, cpu);
        bus.write_16(0x0600_0000, 0x3333, cpu);

        // Clear EWRAM + palette, leave VRAM alone
        debug.cpu().registers.general_purpose[0] = 0b101;
    }

    emu.step_instruction();

    let mut debug = DebugEmulator(&mut emu);
    let (bus, cpu) = debug.bus_and_cpu();
    assert_eq!(bus.read_32(0x0200_0000, cpu), 0);
    assert_eq!(bus.read_16(0x0500_0000, cpu), 0);
    assert_eq!(bus.read_16(0x0600_0000, cpu), 0x3333);
}

#[test]
fn halt_sleeps_until_an_interrupt_line_raises() {
    // SWI 0x02 (Halt) followed by a marker instruction
    let mut emu = emu_with_program(&[0xEF02_0000, 0xE3A0_0001]);
    {
        let mut debug = DebugEmulator(&mut emu);
        let (bus, cpu) = debug.bus_and_cpu();

        // Timer 0 wakes us up; IME stays off so no exception is taken on resume
        bus.interrupts.enable.set_timer_0(true);
        bus.write_16(0x0400_0100, 0xFF00, cpu);
        bus.write_16(0x0400_0102, 0x00C0, cpu);
    }

    emu.step_instruction();
    {
        let mut debug = DebugEmulator(&mut emu);
        assert!(debug.bus().system_control.is_halted);
    }

    // The halted CPU burns cycles while the timer runs towards its overflow
    let mut woke_up = false;
    for _ in 0..1_000 {
        emu.step_instruction();

        let mut debug = DebugEmulator(&mut emu);
        if !debug.bus().system_control.is_halted {
            woke_up = true;
            break;
        }
    }
    assert!(woke_up);

    // Execution resumes with the instruction after the SWI
    let mut debug = DebugEmulator(&mut emu);
    assert_eq!(debug.cpu().registers.general_purpose[0], 1);
}

#[test]
fn soft_reset_restarts_at_the_cartridge_entry() {
    use garnet_core::emulator::cpu::registers::{Mode, SP_REG};

    // SWI 0x00 (SoftReset)
    let mut emu = emu_with_program(&[0xEF00_0000]);
    {
        let mut debug = DebugEmulator(&mut emu);
        debug.cpu().registers.general_purpose[5] = 0x1234;
    }

    emu.step_instruction();

    let mut debug = DebugEmulator(&mut emu);
    let registers = &debug.cpu().registers;
    assert_eq!(registers.next_pc(), 0x0800_0000);
    assert_eq!(registers.cpsr.mode(), Mode::System);
    assert_eq!(registers.general_purpose[SP_REG], 0x0300_7F00);
    assert_eq!(registers.general_purpose[5], 0);
}
