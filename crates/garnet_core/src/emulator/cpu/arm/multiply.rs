use crate::emulator::bus::Bus;
use crate::emulator::cpu::arm::{ArmInstruction, ArmV4};
use crate::emulator::cpu::CPU;
use crate::utils::BitOps;

impl ArmV4 {
    /// MUL and MLA. The carry and overflow flags are left untouched.
    pub fn multiply(cpu: &mut CPU, instruction: ArmInstruction, bus: &mut Bus) {
        let accumulate = instruction.check_bit(21);
        let set_flags = instruction.check_bit(20);
        let r_d = instruction.get_bits(16, 19) as usize;
        let r_add = instruction.get_bits(12, 15) as usize;
        let r_1 = instruction.get_bits(8, 11) as usize;
        let r_2 = instruction.get_bits(0, 3) as usize;

        let result = cpu
            .read_reg(r_1)
            .wrapping_mul(cpu.read_reg(r_2))
            .wrapping_add(if accumulate { cpu.read_reg(r_add) } else { 0 });

        cpu.write_reg(r_d, result, bus);

        if set_flags {
            cpu.set_zero_and_sign(result);
        }
    }

    /// UMULL/UMLAL/SMULL/SMLAL, producing a 64-bit result across two registers.
    pub fn multiply_long(cpu: &mut CPU, instruction: ArmInstruction, _bus: &mut Bus) {
        let signed = instruction.check_bit(22);
        let accumulate = instruction.check_bit(21);
        let set_flags = instruction.check_bit(20);
        let r_high = instruction.get_bits(16, 19) as usize;
        let r_low = instruction.get_bits(12, 15) as usize;
        let r_1 = instruction.get_bits(8, 11) as usize;
        let r_2 = instruction.get_bits(0, 3) as usize;

        let registers = &mut cpu.registers.general_purpose;
        let accumulator = ((registers[r_high] as u64) << 32) | registers[r_low] as u64;

        let result = if signed {
            let product = registers[r_1] as i32 as i64 * registers[r_2] as i32 as i64;

            (product as u64).wrapping_add(if accumulate { accumulator } else { 0 })
        } else {
            let product = registers[r_1] as u64 * registers[r_2] as u64;

            product.wrapping_add(if accumulate { accumulator } else { 0 })
        };

        registers[r_high] = (result >> 32) as u32;
        registers[r_low] = result as u32;

        if set_flags {
            cpu.registers.cpsr.set_sign(result.check_bit(63));
            cpu.registers.cpsr.set_zero(result == 0);
        }
    }
}
