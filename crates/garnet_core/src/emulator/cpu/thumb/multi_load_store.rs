use crate::emulator::bus::Bus;
use crate::emulator::cpu::registers::{LINK_REG, PC_REG, SP_REG};
use crate::emulator::cpu::thumb::{ThumbInstruction, ThumbV4};
use crate::emulator::cpu::CPU;
use crate::utils::BitOps;

impl ThumbV4 {
    /// PUSH/POP on a full descending stack, optionally including LR (push) or PC (pop).
    pub fn push_pop_registers(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        let is_load = instruction.check_bit(11);
        let store_lr_load_pc = instruction.check_bit(8);

        let register_list = instruction.get_bits(0, 7) as u8;

        if is_load {
            let mut sp = cpu.read_reg(SP_REG);

            for reg in 0..8u8 {
                if register_list.check_bit(reg) {
                    let value = bus.read_32(sp, cpu);
                    cpu.write_reg(reg as usize, value, bus);
                    sp = sp.wrapping_add(4);
                }
            }

            if store_lr_load_pc {
                let value = bus.read_32(sp, cpu);
                sp = sp.wrapping_add(4);
                cpu.write_reg(SP_REG, sp, bus);
                // Flushes the pipeline
                cpu.write_reg(PC_REG, value, bus);
            } else {
                cpu.write_reg(SP_REG, sp, bus);
            }
        } else {
            let mut sp = cpu.read_reg(SP_REG);

            // LR sits at the highest address, the lowest register at the lowest.
            if store_lr_load_pc {
                sp = sp.wrapping_sub(4);
                bus.write_32(sp, cpu.read_reg(LINK_REG), cpu);
            }

            for reg in (0..8u8).rev() {
                if register_list.check_bit(reg) {
                    sp = sp.wrapping_sub(4);
                    bus.write_32(sp, cpu.read_reg(reg as usize), cpu);
                }
            }

            cpu.write_reg(SP_REG, sp, bus);
        }
    }

    /// LDMIA/STMIA over the low registers with base writeback.
    pub fn multiple_load_store(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        let is_load = instruction.check_bit(11);
        let r_base = instruction.get_bits(8, 10) as usize;

        let register_list = instruction.get_bits(0, 7) as u8;
        let mut address = cpu.read_reg(r_base);

        for reg in 0..8u8 {
            if !register_list.check_bit(reg) {
                continue;
            }

            if is_load {
                let value = bus.read_32(address, cpu);
                cpu.write_reg(reg as usize, value, bus);
            } else {
                bus.write_32(address, cpu.read_reg(reg as usize), cpu);
            }

            address = address.wrapping_add(4);
        }

        // A loaded base keeps the loaded value instead of the writeback
        if !(is_load && register_list.check_bit(r_base as u8)) {
            cpu.write_reg(r_base, address, bus);
        }
    }
}
