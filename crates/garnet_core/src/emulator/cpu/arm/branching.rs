use crate::emulator::bus::Bus;
use crate::emulator::cpu::arm::{ArmInstruction, ArmV4};
use crate::emulator::cpu::common::common_behaviour;
use crate::emulator::cpu::registers::{LINK_REG, PC_REG};
use crate::emulator::cpu::CPU;
use crate::utils::{sign_extend32, BitOps};

impl ArmV4 {
    /// BX and BLX on a register operand. Bit 0 of the register selects the Thumb state
    /// and is cleared on the jump.
    pub fn branch_and_exchange(cpu: &mut CPU, instruction: ArmInstruction, bus: &mut Bus) {
        let r_n = instruction.get_bits(0, 3) as usize;
        let target = cpu.read_reg(r_n);

        match instruction.get_bits(4, 7) {
            0b0001 => {}
            0b0011 => {
                // Link variant: the return address is the instruction after this one
                let return_address = cpu.read_reg(PC_REG).wrapping_sub(4);
                cpu.write_reg(LINK_REG, return_address, bus);
            }
            _ => {
                Self::undefined_instruction(cpu, instruction, bus);
                return;
            }
        }

        common_behaviour::branch_and_exchange(cpu, target, bus);
    }

    /// B and BL with a 24-bit signed word offset.
    pub fn branch_and_link(cpu: &mut CPU, instruction: ArmInstruction, bus: &mut Bus) {
        let offset = sign_extend32(instruction.get_bits(0, 23), 24) << 2;
        let pc = cpu.read_reg(PC_REG);

        if instruction.check_bit(24) {
            // The PC reads two instructions ahead, the return address is one ahead.
            cpu.write_reg(LINK_REG, pc.wrapping_sub(4), bus);
        }

        cpu.write_reg(PC_REG, pc.wrapping_add(offset as u32), bus);
    }
}
