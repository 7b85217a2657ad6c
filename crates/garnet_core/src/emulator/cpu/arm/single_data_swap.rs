use crate::emulator::bus::Bus;
use crate::emulator::cpu::arm::{ArmInstruction, ArmV4};
use crate::emulator::cpu::CPU;
use crate::utils::BitOps;

impl ArmV4 {
    /// SWP/SWPB: an atomic read of the memory location followed by a store of the
    /// source register, with the old contents landing in the destination.
    pub fn single_data_swap(cpu: &mut CPU, instruction: ArmInstruction, bus: &mut Bus) {
        crate::cpu_log!("Executing instruction: Single Data Swap");
        let is_byte_swap = instruction.check_bit(22);
        let (reg_base, reg_dest, reg_src) = (
            instruction.get_bits(16, 19) as usize,
            instruction.get_bits(12, 15) as usize,
            instruction.get_bits(0, 3) as usize,
        );

        let source_value = cpu.read_reg(reg_src);
        let address = cpu.read_reg(reg_base);

        if is_byte_swap {
            let old_value = bus.read_8(address, cpu);

            bus.write_8(address, source_value as u8, cpu);
            cpu.write_reg(reg_dest, old_value as u32, bus);
        } else {
            let old_value = bus.read_32(address, cpu);

            bus.write_32(address, source_value, cpu);
            cpu.write_reg(reg_dest, old_value, bus);
        }
    }
}
