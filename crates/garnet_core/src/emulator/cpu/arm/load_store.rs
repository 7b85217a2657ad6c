use crate::emulator::bus::Bus;
use crate::emulator::cpu::arm::{ArmInstruction, ArmV4};
use crate::emulator::cpu::common::ShiftType;
use crate::emulator::cpu::CPU;
use crate::utils::BitOps;
use num_traits::FromPrimitive;

impl ArmV4 {
    /// LDR/STR with an optional byte qualifier, pre/post indexing and writeback.
    pub fn single_data_transfer(cpu: &mut CPU, instruction: ArmInstruction, bus: &mut Bus) {
        crate::cpu_log!("Executing instruction: Single Data Transfer");
        let (reg_base, reg_dest) = (
            instruction.get_bits(16, 19) as usize,
            instruction.get_bits(12, 15) as usize,
        );
        let is_load = instruction.check_bit(20);
        let has_writeback = instruction.check_bit(21);
        let is_byte_transfer = instruction.check_bit(22);
        let is_up = instruction.check_bit(23);
        let is_preindexed = instruction.check_bit(24);
        let is_register_offset = instruction.check_bit(25);

        let offset = if is_register_offset {
            let r_offset = instruction.get_bits(0, 3) as usize;
            let shift_type = ShiftType::from_u32(instruction.get_bits(5, 6)).unwrap();
            let shift_amount = instruction.get_bits(7, 11) as u8;

            // The offset shift never commits its carry-out.
            let (offset, _) =
                shift_type.perform_immediate_shift(cpu.read_reg(r_offset), shift_amount, cpu.registers.cpsr.carry());

            offset
        } else {
            instruction.get_bits(0, 11)
        };

        let base_address = cpu.read_reg(reg_base);
        let offset_address = if is_up {
            base_address.wrapping_add(offset)
        } else {
            base_address.wrapping_sub(offset)
        };
        let address = if is_preindexed { offset_address } else { base_address };

        if is_load {
            let value = if is_byte_transfer {
                // Byte loads zero extend
                bus.read_8(address, cpu) as u32
            } else {
                bus.read_32(address, cpu)
            };

            // Post indexing always writes back; the loaded value wins over the
            // writeback when the destination is also the base.
            if !is_preindexed {
                cpu.write_reg(reg_base, offset_address, bus);
            } else if has_writeback {
                cpu.write_reg(reg_base, address, bus);
            }

            cpu.write_reg(reg_dest, value, bus);
        } else {
            let value = cpu.read_reg(reg_dest);

            if is_byte_transfer {
                bus.write_8(address, value as u8, cpu);
            } else {
                bus.write_32(address, value, cpu);
            }

            if !is_preindexed {
                cpu.write_reg(reg_base, offset_address, bus);
            } else if has_writeback {
                cpu.write_reg(reg_base, address, bus);
            }
        }
    }
}
