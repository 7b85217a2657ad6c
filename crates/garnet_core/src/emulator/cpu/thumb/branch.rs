use crate::emulator::bus::Bus;
use crate::emulator::cpu::common::common_behaviour;
use crate::emulator::cpu::registers::{LINK_REG, PC_REG};
use crate::emulator::cpu::thumb::{ThumbInstruction, ThumbV4};
use crate::emulator::cpu::CPU;
use crate::utils::{sign_extend32, BitOps};

impl ThumbV4 {
    /// ADD/CMP/MOV on the full register range, plus BX/BLX.
    pub fn hi_reg_op_branch_exchange(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        let opcode = instruction.get_bits(8, 9);
        let h1 = instruction.check_bit(7);
        let h2 = instruction.check_bit(6);
        // The H flags extend the register fields into R8-R15
        let r_d = instruction.get_bits(0, 2) as usize + (h1 as usize * 8);
        let r_s = instruction.get_bits(3, 5) as usize + (h2 as usize * 8);

        let op1 = cpu.read_reg(r_d);
        let op2 = cpu.read_reg(r_s);

        match opcode {
            // ADD, never sets flags
            0b00 => {
                let result = common_behaviour::add(cpu, op1, op2, false);
                cpu.write_reg(r_d, result, bus);
            }
            // CMP, the only format in this group that sets flags
            0b01 => {
                let _ = common_behaviour::sub(cpu, op1, op2, true);
            }
            // MOV
            0b10 => cpu.write_reg(r_d, op2, bus),
            // BX/BLX, distinguished by H1
            0b11 => {
                if h1 {
                    let return_address = cpu.read_reg(PC_REG).wrapping_sub(2) | 1;
                    cpu.write_reg(LINK_REG, return_address, bus);
                }

                common_behaviour::branch_and_exchange(cpu, op2, bus);
            }
            _ => unreachable!(),
        }
    }

    /// Conditional branch over a signed 8-bit halfword offset.
    pub fn conditional_branch(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        let condition = instruction.get_bits(8, 11) as u8;

        if !common_behaviour::check_condition(&cpu.registers.cpsr, condition) {
            return;
        }

        let offset = sign_extend32(instruction.get_bits(0, 7) as u32, 8) << 1;
        let pc = cpu.read_reg(PC_REG);

        cpu.write_reg(PC_REG, pc.wrapping_add(offset as u32), bus);
    }

    /// Unconditional branch over a signed 11-bit halfword offset.
    pub fn unconditional_branch(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        let offset = sign_extend32(instruction.get_bits(0, 10) as u32, 11) << 1;
        let pc = cpu.read_reg(PC_REG);

        cpu.write_reg(PC_REG, pc.wrapping_add(offset as u32), bus);
    }

    /// The first half of the two-instruction BL: stage the upper offset bits in LR.
    pub fn long_branch_with_link_high(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        let offset = sign_extend32(instruction.get_bits(0, 10) as u32, 11) << 12;
        let pc = cpu.read_reg(PC_REG);

        cpu.write_reg(LINK_REG, pc.wrapping_add(offset as u32), bus);
    }

    /// The second half of the BL pair: jump to the staged address plus the low offset,
    /// leaving the return address (with the Thumb bit set) in LR.
    pub fn long_branch_with_link_low(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        let offset = (instruction.get_bits(0, 10) as u32) << 1;
        let target = cpu.read_reg(LINK_REG).wrapping_add(offset);

        let return_address = cpu.read_reg(PC_REG).wrapping_sub(2) | 1;
        cpu.write_reg(LINK_REG, return_address, bus);

        cpu.write_reg(PC_REG, target, bus);
    }

    pub fn software_interrupt(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        // The comment byte carries the BIOS function number directly in Thumb state
        let comment = instruction.get_bits(0, 7) as u32;

        cpu.software_interrupt(bus, comment);
    }
}
