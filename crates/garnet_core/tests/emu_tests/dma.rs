use crate::setup::emu_with_program;
use garnet_core::emulator::bus::dma::DmaStartTiming;
use garnet_core::emulator::debug::DebugEmulator;

const DMA0_SOURCE: u32 = 0x0400_00B0;
const DMA0_DEST: u32 = 0x0400_00B4;
const DMA0_COUNT: u32 = 0x0400_00B8;
const DMA0_CONTROL: u32 = 0x0400_00BA;

#[test]
fn immediate_word_transfer_copies_and_disables() {
    let mut emu = emu_with_program(&[0xEAFF_FFFE]);
    let mut debug = DebugEmulator(&mut emu);
    let (bus, cpu) = debug.bus_and_cpu();

    for i in 0..4u32 {
        bus.write_32(0x0200_0000 + i * 4, 0x1111_0000 | i, cpu);
    }

    bus.write_register::<u32>(DMA0_SOURCE, 0x0200_0000, cpu);
    bus.write_register::<u32>(DMA0_DEST, 0x0200_1000, cpu);
    bus.write_register::<u16>(DMA0_COUNT, 4, cpu);
    // Enable, 32-bit units, immediate timing, both pointers incrementing.
    // The store itself fires the transfer.
    bus.write_register::<u16>(DMA0_CONTROL, 0x8400, cpu);

    for i in 0..4u32 {
        assert_eq!(bus.read_32(0x0200_1000 + i * 4, cpu), 0x1111_0000 | i);
    }

    // repeat = 0, the enable bit is cleared on completion
    assert_eq!(bus.read_register::<u16>(DMA0_CONTROL, cpu) & 0x8000, 0);
}

#[test]
fn halfword_transfer_with_fixed_source() {
    let mut emu = emu_with_program(&[0xEAFF_FFFE]);
    let mut debug = DebugEmulator(&mut emu);
    let (bus, cpu) = debug.bus_and_cpu();

    bus.write_16(0x0200_0000, 0xABCD, cpu);

    bus.write_32(DMA0_SOURCE, 0x0200_0000, cpu);
    bus.write_32(DMA0_DEST, 0x0200_0100, cpu);
    bus.write_16(DMA0_COUNT, 3, cpu);
    // Enable, halfword units, fixed source, incrementing destination
    bus.write_16(DMA0_CONTROL, 0x8100, cpu);

    for i in 0..3u32 {
        assert_eq!(bus.read_16(0x0200_0100 + i * 2, cpu), 0xABCD);
    }
}

#[test]
fn completion_interrupt_sets_the_flag() {
    let mut emu = emu_with_program(&[0xEAFF_FFFE]);
    let mut debug = DebugEmulator(&mut emu);
    let (bus, cpu) = debug.bus_and_cpu();

    bus.write_32(DMA0_SOURCE, 0x0200_0000, cpu);
    bus.write_32(DMA0_DEST, 0x0200_0010, cpu);
    bus.write_16(DMA0_COUNT, 1, cpu);
    // Enable with IRQ-on-completion
    bus.write_16(DMA0_CONTROL, 0xC400, cpu);

    assert!(bus.interrupts.flags.dma_0());
}

#[test]
fn non_immediate_timing_waits_for_its_event() {
    let mut emu = emu_with_program(&[0xEAFF_FFFE]);
    let mut debug = DebugEmulator(&mut emu);
    let (bus, cpu) = debug.bus_and_cpu();

    bus.write_16(0x0200_0000, 0x5555, cpu);

    bus.write_32(DMA0_SOURCE, 0x0200_0000, cpu);
    bus.write_32(DMA0_DEST, 0x0200_0020, cpu);
    bus.write_16(DMA0_COUNT, 1, cpu);
    // Enabled, but HBlank timed: the register store must not fire it
    bus.write_16(DMA0_CONTROL, 0xA100, cpu);
    assert_eq!(bus.read_16(0x0200_0020, cpu), 0);

    bus.dma_transfer(DmaStartTiming::HBlank, cpu);
    assert_eq!(bus.read_16(0x0200_0020, cpu), 0x5555);
}

#[test]
fn repeat_keeps_the_channel_enabled() {
    let mut emu = emu_with_program(&[0xEAFF_FFFE]);
    let mut debug = DebugEmulator(&mut emu);
    let (bus, cpu) = debug.bus_and_cpu();

    bus.write_32(DMA0_SOURCE, 0x0200_0000, cpu);
    bus.write_32(DMA0_DEST, 0x0200_0040, cpu);
    bus.write_16(DMA0_COUNT, 1, cpu);
    // Enable with repeat, HBlank timing
    bus.write_16(DMA0_CONTROL, 0xA300, cpu);

    bus.dma_transfer(DmaStartTiming::HBlank, cpu);

    assert_ne!(bus.read_16(DMA0_CONTROL, cpu) & 0x8000, 0);
}
