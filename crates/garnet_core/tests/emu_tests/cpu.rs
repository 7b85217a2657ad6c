use crate::setup::{emu_with_program, thumb_words};
use garnet_core::emulator::bus::interrupts::Interrupts;
use garnet_core::emulator::cpu::registers::{Mode, State, LINK_REG, PC_REG};
use garnet_core::emulator::debug::DebugEmulator;

const ROM_BASE: u32 = 0x0800_0000;

#[test]
fn adds_computes_carry_and_overflow() {
    // ADDS R0, R1, R2
    let mut emu = emu_with_program(&[0xE091_0002]);
    {
        let mut debug = DebugEmulator(&mut emu);
        debug.cpu().registers.general_purpose[1] = 0x8000_0000;
        debug.cpu().registers.general_purpose[2] = 0x8000_0000;
    }

    emu.step_instruction();

    let mut debug = DebugEmulator(&mut emu);
    let registers = &debug.cpu().registers;
    assert_eq!(registers.general_purpose[0], 0);
    assert!(!registers.cpsr.sign());
    assert!(registers.cpsr.zero());
    assert!(registers.cpsr.carry());
    assert!(registers.cpsr.overflow());
}

#[test]
fn subs_computes_borrow() {
    // SUBS R0, R1, R2
    let mut emu = emu_with_program(&[0xE051_0002]);
    {
        let mut debug = DebugEmulator(&mut emu);
        debug.cpu().registers.general_purpose[1] = 1;
        debug.cpu().registers.general_purpose[2] = 2;
    }

    emu.step_instruction();

    let mut debug = DebugEmulator(&mut emu);
    let registers = &debug.cpu().registers;
    assert_eq!(registers.general_purpose[0], 0xFFFF_FFFF);
    assert!(registers.cpsr.sign());
    assert!(!registers.cpsr.zero());
    // Borrow occurred, so the (inverted) carry is clear
    assert!(!registers.cpsr.carry());
    assert!(!registers.cpsr.overflow());
}

#[test]
fn branch_with_link_skips_and_links() {
    let mut emu = emu_with_program(&[
        // BL +0 (lands two instructions ahead thanks to the pipeline)
        0xEB00_0000,
        // MOV R0, #1 -- must be skipped
        0xE3A0_0001,
        // MOV R0, #2
        0xE3A0_0002,
    ]);

    emu.step_instruction();
    {
        let mut debug = DebugEmulator(&mut emu);
        assert_eq!(debug.cpu().registers.next_pc(), ROM_BASE + 8);
        assert_eq!(debug.cpu().registers.general_purpose[LINK_REG], ROM_BASE + 4);
    }

    emu.step_instruction();
    let mut debug = DebugEmulator(&mut emu);
    assert_eq!(debug.cpu().registers.general_purpose[0], 2);
}

#[test]
fn failed_condition_is_a_no_op() {
    // MOVEQ R0, #1 with Z clear
    let mut emu = emu_with_program(&[0x03A0_0001]);

    emu.step_instruction();

    let mut debug = DebugEmulator(&mut emu);
    assert_eq!(debug.cpu().registers.general_purpose[0], 0);
    assert_eq!(debug.cpu().registers.next_pc(), ROM_BASE + 4);
}

#[test]
fn load_store_round_trip() {
    let mut emu = emu_with_program(&[
        // STR R1, [R0]
        0xE580_1000,
        // LDR R2, [R0]
        0xE590_2000,
        // LDRB R3, [R0, #1]
        0xE5D0_3001,
    ]);
    {
        let mut debug = DebugEmulator(&mut emu);
        debug.cpu().registers.general_purpose[0] = 0x0200_0000;
        debug.cpu().registers.general_purpose[1] = 0xDEAD_BEEF;
    }

    emu.step_instruction();
    emu.step_instruction();
    emu.step_instruction();

    let mut debug = DebugEmulator(&mut emu);
    assert_eq!(debug.cpu().registers.general_purpose[2], 0xDEAD_BEEF);
    // Byte loads zero extend
    assert_eq!(debug.cpu().registers.general_purpose[3], 0xBE);
}

#[test]
fn block_transfer_writes_back_by_register_count() {
    let mut emu = emu_with_program(&[
        // STMIA R0!, {R1-R3}
        0xE8A0_000E,
        // LDMDB R0!, {R4-R6}
        0xE930_0070,
    ]);
    {
        let mut debug = DebugEmulator(&mut emu);
        let registers = &mut debug.cpu().registers;
        registers.general_purpose[0] = 0x0300_0010;
        registers.general_purpose[1] = 0x11;
        registers.general_purpose[2] = 0x22;
        registers.general_purpose[3] = 0x33;
    }

    emu.step_instruction();
    {
        let mut debug = DebugEmulator(&mut emu);
        // Writeback is base + 4 * popcount
        assert_eq!(debug.cpu().registers.general_purpose[0], 0x0300_001C);
        let (bus, cpu) = debug.bus_and_cpu();
        assert_eq!(bus.read_32(0x0300_0010, cpu), 0x11);
        assert_eq!(bus.read_32(0x0300_0018, cpu), 0x33);
    }

    emu.step_instruction();
    let mut debug = DebugEmulator(&mut emu);
    let registers = &debug.cpu().registers;
    // Ascending register order regardless of direction
    assert_eq!(registers.general_purpose[4], 0x11);
    assert_eq!(registers.general_purpose[5], 0x22);
    assert_eq!(registers.general_purpose[6], 0x33);
    assert_eq!(registers.general_purpose[0], 0x0300_0010);
}

#[test]
fn bx_enters_thumb_state() {
    let mut thumb_section = thumb_words(&[
        // MOV R0, #42
        0x202A,
        // LSL R1, R0, #2
        0x0081,
    ]);

    // BX R2 with R2 pointing (Thumb bit set) at the code right after it
    let mut program = vec![0xE12F_FF12];
    program.append(&mut thumb_section);

    let mut emu = emu_with_program(&program);
    {
        let mut debug = DebugEmulator(&mut emu);
        debug.cpu().registers.general_purpose[2] = (ROM_BASE + 4) | 1;
    }

    emu.step_instruction();
    {
        let mut debug = DebugEmulator(&mut emu);
        assert_eq!(debug.cpu().registers.cpsr.state(), State::Thumb);
        assert_eq!(debug.cpu().registers.next_pc(), ROM_BASE + 4);
    }

    emu.step_instruction();
    emu.step_instruction();

    let mut debug = DebugEmulator(&mut emu);
    assert_eq!(debug.cpu().registers.general_purpose[0], 42);
    assert_eq!(debug.cpu().registers.general_purpose[1], 42 << 2);
}

#[test]
fn irq_enters_exception_mode() {
    // Two harmless instructions to interrupt
    let mut emu = emu_with_program(&[0xE1A0_0000, 0xE1A0_0000]);
    {
        let mut debug = DebugEmulator(&mut emu);
        let bus = debug.bus();
        bus.interrupts.master_enable.set_interrupt_enable(true);
        bus.interrupts.enable.set_timer_0(true);
        bus.interrupts.request_interrupt(Interrupts::Timer0);
    }

    // The interrupt is delivered at the instruction boundary
    emu.step_instruction();

    let mut debug = DebugEmulator(&mut emu);
    let registers = &debug.cpu().registers;
    assert_eq!(registers.cpsr.mode(), Mode::IRQ);
    assert_eq!(registers.cpsr.state(), State::Arm);
    assert!(registers.cpsr.irq_disable());
    // The interrupted CPSR is preserved in the IRQ bank's SPSR
    assert_eq!(registers.spsr.mode(), Mode::System);
    // Return convention: R14 holds the preempted instruction + 4
    assert_eq!(registers.general_purpose[LINK_REG], ROM_BASE + 8);
    // Execution continues at the IRQ vector, with the pipeline refilled behind it
    assert_eq!(registers.next_pc(), 0x18);
    assert_eq!(registers.general_purpose[PC_REG], 0x18 + 4);
}

#[test]
fn register_shift_reads_pc_plus_four() {
    // ADD R0, PC, PC, LSL R2 (register-specified shift, amount 0)
    let mut emu = emu_with_program(&[0xE08F_021F]);

    emu.step_instruction();

    let mut debug = DebugEmulator(&mut emu);
    // Both operands read PC + 4 relative to the usual prefetch value
    assert_eq!(debug.cpu().registers.general_purpose[0], 2 * (ROM_BASE + 12));
}
