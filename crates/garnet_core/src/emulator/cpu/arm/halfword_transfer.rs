use crate::emulator::bus::Bus;
use crate::emulator::cpu::arm::{ArmInstruction, ArmV4};
use crate::emulator::cpu::CPU;
use crate::utils::{sign_extend32, BitOps};

impl ArmV4 {
    /// Halfword, signed and doubleword transfers. The offset is either a register or a
    /// split 8-bit immediate, selected by bit 22.
    pub fn halfword_and_signed_transfer(cpu: &mut CPU, instruction: ArmInstruction, bus: &mut Bus) {
        crate::cpu_log!("Executing instruction: Halfword and Signed Data Transfer");
        let is_preindexed = instruction.check_bit(24);
        let is_up = instruction.check_bit(23);
        let is_immediate_offset = instruction.check_bit(22);
        let has_writeback = instruction.check_bit(21);
        let is_load = instruction.check_bit(20);

        let (reg_base, reg_dest) = (
            instruction.get_bits(16, 19) as usize,
            instruction.get_bits(12, 15) as usize,
        );

        let offset = if is_immediate_offset {
            (instruction.get_bits(8, 11) << 4) | instruction.get_bits(0, 3)
        } else {
            cpu.read_reg(instruction.get_bits(0, 3) as usize)
        };

        let base_address = cpu.read_reg(reg_base);
        let offset_address = if is_up {
            base_address.wrapping_add(offset)
        } else {
            base_address.wrapping_sub(offset)
        };
        let address = if is_preindexed { offset_address } else { base_address };

        match (is_load, instruction.get_bits(5, 6)) {
            // STRH
            (false, 0b01) => {
                let value = cpu.read_reg(reg_dest) as u16;
                bus.write_16(address, value, cpu);
            }
            // LDRD; doubleword transfers force bit 3 of the address low
            (false, 0b10) => {
                let address = address & !0x8;
                let low = bus.read_32(address, cpu);
                let high = bus.read_32(address.wrapping_add(4), cpu);

                cpu.write_reg(reg_dest, low, bus);
                cpu.write_reg(reg_dest + 1, high, bus);
            }
            // STRD
            (false, 0b11) => {
                let address = address & !0x8;
                bus.write_32(address, cpu.read_reg(reg_dest), cpu);
                bus.write_32(address.wrapping_add(4), cpu.read_reg(reg_dest + 1), cpu);
            }
            // LDRH, zero extended
            (true, 0b01) => {
                let value = bus.read_16(address, cpu) as u32;
                cpu.write_reg(reg_dest, value, bus);
            }
            // LDRSB
            (true, 0b10) => {
                let value = sign_extend32(bus.read_8(address, cpu) as u32, 8) as u32;
                cpu.write_reg(reg_dest, value, bus);
            }
            // LDRSH
            (true, 0b11) => {
                let value = sign_extend32(bus.read_16(address, cpu) as u32, 16) as u32;
                cpu.write_reg(reg_dest, value, bus);
            }
            _ => Self::undefined_instruction(cpu, instruction, bus),
        }

        // Post indexing always writes back
        if !is_preindexed {
            // A load into the base must win over the writeback
            if !(is_load && reg_base == reg_dest) {
                cpu.write_reg(reg_base, offset_address, bus);
            }
        } else if has_writeback && !(is_load && reg_base == reg_dest) {
            cpu.write_reg(reg_base, address, bus);
        }
    }
}
