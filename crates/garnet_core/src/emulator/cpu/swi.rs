//! High level emulation of the BIOS software interrupts.
//!
//! With a BIOS image loaded every SWI simply vectors to `0x08` and runs the real
//! handler. Without one the calls that boot sequences rely on are emulated directly;
//! anything else is a hard error.

use crate::emulator::bus::{Bus, MemoryBlock};
use crate::emulator::cpu::registers::{Mode, State, PC_REG, SP_REG};
use crate::emulator::cpu::{Exception, CPU};
use crate::utils::BitOps;

/// The region of on-chip RAM reserved for the BIOS call stacks.
const STACK_AREA_START: u32 = 0x0300_7E00;
const STACK_AREA_END: u32 = 0x0300_8000;

impl CPU {
    pub(crate) fn software_interrupt(&mut self, bus: &mut Bus, comment: u32) {
        if bus.bios_present() {
            self.raise_exception(bus, Exception::SoftwareInterrupt);
            return;
        }

        crate::cpu_log!("HLE BIOS call: {:#04X}", comment);
        match comment {
            0x00 => self.swi_soft_reset(bus),
            0x01 => self.swi_register_ram_reset(bus),
            // Halt: sleep until an enabled interrupt line is raised
            0x02 => bus.system_control.is_halted = true,
            0x0B => self.swi_cpu_set(bus),
            _ => panic!("Unhandled SWI comment without a BIOS: {:#04X}", comment),
        }
    }

    /// SoftReset: clear the BIOS stack area, reset the banked stack pointers and
    /// restart at the cartridge entry point in System mode.
    fn swi_soft_reset(&mut self, bus: &mut Bus) {
        for address in STACK_AREA_START..STACK_AREA_END {
            bus.write_8_raw(address, 0);
        }

        self.registers.write_banked_reg(Mode::Supervisor, SP_REG, 0x0300_7FE0);
        self.registers.write_banked_reg(Mode::IRQ, SP_REG, 0x0300_7FA0);

        self.switch_mode(Mode::System);
        self.registers.write_banked_reg(Mode::System, SP_REG, 0x0300_7F00);

        for reg in 0..=12 {
            self.registers.write_reg(reg, 0);
        }

        self.switch_state(State::Arm);
        self.write_reg(PC_REG, 0x0800_0000, bus);
    }

    /// RegisterRamReset: zero the regions selected by the flag bits in R0. The top of
    /// on-chip RAM is spared, it holds the stacks.
    fn swi_register_ram_reset(&mut self, bus: &mut Bus) {
        let flags = self.read_reg(0);

        if flags.check_bit(0) {
            bus.clear_block(MemoryBlock::WramBoard);
        }
        if flags.check_bit(1) {
            let preserved = (STACK_AREA_START - 0x0300_0000) as usize;
            bus.write_block(MemoryBlock::WramChip, &vec![0; preserved]);
        }
        if flags.check_bit(2) {
            bus.clear_block(MemoryBlock::Palette);
        }
        if flags.check_bit(3) {
            bus.clear_block(MemoryBlock::Vram);
        }
        if flags.check_bit(4) {
            bus.clear_block(MemoryBlock::Oam);
        }
        // The serial and sound register groups (bits 5..=7) have no storage to clear here
    }

    /// CpuSet: copy or fill `count` halfwords/words from R0 to R1, with the control
    /// bits read from R2.
    fn swi_cpu_set(&mut self, bus: &mut Bus) {
        let source = self.read_reg(0);
        let dest = self.read_reg(1);
        let control = self.read_reg(2);

        let count = control.get_bits(0, 20);
        let is_fill = control.check_bit(24);
        let is_word = control.check_bit(26);

        if is_word {
            let (source, dest) = (source & !0x3, dest & !0x3);

            if is_fill {
                let value = bus.read_32_raw(source, self);
                for i in 0..count {
                    bus.write_32_raw(dest.wrapping_add(i * 4), value);
                }
            } else {
                for i in 0..count {
                    let value = bus.read_32_raw(source.wrapping_add(i * 4), self);
                    bus.write_32_raw(dest.wrapping_add(i * 4), value);
                }
            }
        } else {
            let (source, dest) = (source & !0x1, dest & !0x1);

            if is_fill {
                let value = bus.read_16_raw(source, self);
                for i in 0..count {
                    bus.write_16_raw(dest.wrapping_add(i * 2), value);
                }
            } else {
                for i in 0..count {
                    let value = bus.read_16_raw(source.wrapping_add(i * 2), self);
                    bus.write_16_raw(dest.wrapping_add(i * 2), value);
                }
            }
        }
    }
}
