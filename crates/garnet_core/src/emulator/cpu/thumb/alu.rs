use crate::emulator::bus::Bus;
use crate::emulator::cpu::common::{common_behaviour, ShiftType};
use crate::emulator::cpu::thumb::{ThumbInstruction, ThumbV4};
use crate::emulator::cpu::CPU;
use crate::utils::BitOps;
use num_traits::FromPrimitive;

impl ThumbV4 {
    /// LSL/LSR/ASR with a 5-bit immediate shift amount.
    pub fn move_shifted_reg(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        // 0b11 in the opcode slot belongs to add/subtract and is dispatched before us
        let shift_type = ShiftType::from_u16(instruction.get_bits(11, 12)).unwrap();
        let offset = instruction.get_bits(6, 10) as u8;
        let r_s = instruction.get_bits(3, 5) as usize;
        let r_d = instruction.get_bits(0, 2) as usize;

        let (value, carry) = shift_type.perform_immediate_shift(cpu.read_reg(r_s), offset, cpu.registers.cpsr.carry());

        cpu.write_reg(r_d, value, bus);
        cpu.set_logical_flags(value, carry);
    }

    /// Three-operand ADD/SUB with either a register or a 3-bit immediate.
    pub fn add_subtract(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        let is_immediate = instruction.check_bit(10);
        let is_subtract = instruction.check_bit(9);
        let r_d = instruction.get_bits(0, 2) as usize;
        let r_s = instruction.get_bits(3, 5) as usize;

        let op1 = cpu.read_reg(r_s);
        let op2 = if is_immediate {
            instruction.get_bits(6, 8) as u32
        } else {
            cpu.read_reg(instruction.get_bits(6, 8) as usize)
        };

        let result = if is_subtract {
            common_behaviour::sub(cpu, op1, op2, true)
        } else {
            common_behaviour::add(cpu, op1, op2, true)
        };

        cpu.write_reg(r_d, result, bus);
    }

    /// MOV/CMP/ADD/SUB with an 8-bit immediate.
    pub fn move_compare_add_subtract(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        let opcode = instruction.get_bits(11, 12);
        let r_d = instruction.get_bits(8, 10) as usize;
        let imm = instruction.get_bits(0, 7) as u32;

        let op1 = cpu.read_reg(r_d);

        match opcode {
            0b00 => {
                cpu.write_reg(r_d, imm, bus);
                cpu.set_zero_and_sign(imm);
            }
            0b01 => {
                let _ = common_behaviour::sub(cpu, op1, imm, true);
            }
            0b10 => {
                let result = common_behaviour::add(cpu, op1, imm, true);
                cpu.write_reg(r_d, result, bus);
            }
            0b11 => {
                let result = common_behaviour::sub(cpu, op1, imm, true);
                cpu.write_reg(r_d, result, bus);
            }
            _ => unreachable!(),
        }
    }

    /// The 16-op ALU format sharing two low registers.
    pub fn alu_operations(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        let opcode = instruction.get_bits(6, 9);
        let r_s = instruction.get_bits(3, 5) as usize;
        let r_d = instruction.get_bits(0, 2) as usize;

        let op1 = cpu.read_reg(r_d);
        let op2 = cpu.read_reg(r_s);

        match opcode {
            // AND
            0b0000 => {
                let result = op1 & op2;
                cpu.write_reg(r_d, result, bus);
                cpu.set_zero_and_sign(result);
            }
            // EOR
            0b0001 => {
                let result = op1 ^ op2;
                cpu.write_reg(r_d, result, bus);
                cpu.set_zero_and_sign(result);
            }
            // LSL/LSR/ASR/ROR by the low byte of Rs
            0b0010 => Self::shift_by_register(cpu, bus, ShiftType::LogicalLeft, r_d, op1, op2),
            0b0011 => Self::shift_by_register(cpu, bus, ShiftType::LogicalRight, r_d, op1, op2),
            0b0100 => Self::shift_by_register(cpu, bus, ShiftType::ArithRight, r_d, op1, op2),
            0b0111 => Self::shift_by_register(cpu, bus, ShiftType::RotateRight, r_d, op1, op2),
            // ADC
            0b0101 => {
                let result = common_behaviour::adc(cpu, op1, op2, true);
                cpu.write_reg(r_d, result, bus);
            }
            // SBC
            0b0110 => {
                let result = common_behaviour::sbc(cpu, op1, op2, true);
                cpu.write_reg(r_d, result, bus);
            }
            // TST
            0b1000 => cpu.set_zero_and_sign(op1 & op2),
            // NEG
            0b1001 => {
                let result = common_behaviour::sub(cpu, 0, op2, true);
                cpu.write_reg(r_d, result, bus);
            }
            // CMP
            0b1010 => {
                let _ = common_behaviour::sub(cpu, op1, op2, true);
            }
            // CMN
            0b1011 => {
                let _ = common_behaviour::add(cpu, op1, op2, true);
            }
            // ORR
            0b1100 => {
                let result = op1 | op2;
                cpu.write_reg(r_d, result, bus);
                cpu.set_zero_and_sign(result);
            }
            // MUL
            0b1101 => {
                let result = op1.wrapping_mul(op2);
                cpu.write_reg(r_d, result, bus);
                cpu.set_zero_and_sign(result);
            }
            // BIC
            0b1110 => {
                let result = op1 & !op2;
                cpu.write_reg(r_d, result, bus);
                cpu.set_zero_and_sign(result);
            }
            // MVN
            0b1111 => {
                let result = !op2;
                cpu.write_reg(r_d, result, bus);
                cpu.set_zero_and_sign(result);
            }
            _ => unreachable!(),
        }
    }

    /// Shifts inside the ALU format take their amount from a register: the amount is
    /// masked to a byte, zero leaves value and carry untouched, and the shift lookup
    /// costs one internal cycle.
    #[inline]
    fn shift_by_register(cpu: &mut CPU, bus: &mut Bus, shift_type: ShiftType, r_d: usize, value: u32, amount: u32) {
        bus.idle(1);

        let amount = amount as u8;
        let (result, carry) = if amount == 0 {
            (value, cpu.registers.cpsr.carry())
        } else {
            shift_type.perform_shift(value, amount, cpu.registers.cpsr.carry())
        };

        cpu.write_reg(r_d, result, bus);
        cpu.set_logical_flags(result, carry);
    }
}
