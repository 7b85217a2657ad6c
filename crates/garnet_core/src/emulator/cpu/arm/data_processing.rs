use crate::emulator::bus::Bus;
use crate::emulator::cpu::arm::{ArmInstruction, ArmV4};
use crate::emulator::cpu::common::{common_behaviour, ShiftType};
use crate::emulator::cpu::registers::PC_REG;
use crate::emulator::cpu::CPU;
use crate::utils::BitOps;
use num_traits::FromPrimitive;

impl ArmV4 {
    pub fn data_processing(cpu: &mut CPU, instruction: ArmInstruction, bus: &mut Bus) {
        crate::cpu_log!("Executing instruction: Data Processing");
        let opcode = DataOperation::from_u32(instruction.get_bits(21, 24)).unwrap();
        let set_flags = instruction.check_bit(20);
        let r_d = instruction.get_bits(12, 15) as usize;
        let r_n = instruction.get_bits(16, 19) as usize;
        let is_immediate = instruction.check_bit(25);

        // With a register-specified shift amount both Rn and Rm read as PC + 4 when they
        // name R15, as the shift lookup consumes an extra pipeline slot.
        let reads_pc_late = !is_immediate && instruction.check_bit(4);
        if reads_pc_late {
            cpu.registers.general_purpose[PC_REG] = cpu.registers.general_purpose[PC_REG].wrapping_add(4);
        }

        let (op2_value, shift_carry) = if is_immediate {
            // An 8-bit immediate, rotated right by twice the 4-bit rotate field
            let rotate = instruction.get_bits(8, 11) * 2;
            let imm = instruction.get_bits(0, 7);

            if rotate == 0 {
                (imm, cpu.registers.cpsr.carry())
            } else {
                let rotated = imm.rotate_right(rotate);
                (rotated, rotated.check_bit(31))
            }
        } else {
            Self::shifted_register_operand(cpu, instruction, bus)
        };
        let op1_value = cpu.read_reg(r_n);

        if reads_pc_late {
            cpu.registers.general_purpose[PC_REG] = cpu.registers.general_purpose[PC_REG].wrapping_sub(4);
        }

        Self::perform_data_operation(cpu, bus, opcode, op1_value, op2_value, r_d, set_flags, shift_carry);
    }

    /// Resolve a shifted-register Op2: either a 5-bit immediate shift amount or the low
    /// byte of Rs. The latter costs one extra internal cycle.
    fn shifted_register_operand(cpu: &mut CPU, instruction: ArmInstruction, bus: &mut Bus) -> (u32, bool) {
        let shift_type = ShiftType::from_u32(instruction.get_bits(5, 6)).unwrap();
        let r_m = instruction.get_bits(0, 3) as usize;
        let current_carry = cpu.registers.cpsr.carry();

        if instruction.check_bit(4) {
            bus.idle(1);

            let r_s = instruction.get_bits(8, 11) as usize;
            // Only the lowest byte of Rs matters
            let shift_amount = cpu.read_reg(r_s) as u8;

            if shift_amount == 0 {
                // A zero amount from a register leaves value and carry untouched
                (cpu.read_reg(r_m), current_carry)
            } else {
                shift_type.perform_shift(cpu.read_reg(r_m), shift_amount, current_carry)
            }
        } else {
            let shift_amount = instruction.get_bits(7, 11) as u8;

            shift_type.perform_immediate_shift(cpu.read_reg(r_m), shift_amount, current_carry)
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn perform_data_operation(
        cpu: &mut CPU,
        bus: &mut Bus,
        opcode: DataOperation,
        op1: u32,
        op2: u32,
        r_d: usize,
        set_flags: bool,
        shift_carry: bool,
    ) {
        crate::cpu_log!("Executing opcode: {:?}", opcode);
        // When the destination is R15 the flags never land in the CPSR; the SPSR
        // restore below takes precedence.
        let write_flags = set_flags && r_d != PC_REG;

        let result = match opcode {
            DataOperation::And => {
                let result = op1 & op2;
                if write_flags {
                    cpu.set_logical_flags(result, shift_carry);
                }
                Some(result)
            }
            DataOperation::Eor => {
                let result = op1 ^ op2;
                if write_flags {
                    cpu.set_logical_flags(result, shift_carry);
                }
                Some(result)
            }
            DataOperation::Sub => Some(common_behaviour::sub(cpu, op1, op2, write_flags)),
            DataOperation::Rsb => Some(common_behaviour::sub(cpu, op2, op1, write_flags)),
            DataOperation::Add => Some(common_behaviour::add(cpu, op1, op2, write_flags)),
            DataOperation::Adc => Some(common_behaviour::adc(cpu, op1, op2, write_flags)),
            DataOperation::Sbc => Some(common_behaviour::sbc(cpu, op1, op2, write_flags)),
            DataOperation::Rsc => Some(common_behaviour::sbc(cpu, op2, op1, write_flags)),
            DataOperation::Tst => {
                let result = op1 & op2;
                cpu.set_logical_flags(result, shift_carry);
                None
            }
            DataOperation::Teq => {
                let result = op1 ^ op2;
                cpu.set_logical_flags(result, shift_carry);
                None
            }
            DataOperation::Cmp => {
                common_behaviour::sub(cpu, op1, op2, true);
                None
            }
            DataOperation::Cmn => {
                common_behaviour::add(cpu, op1, op2, true);
                None
            }
            DataOperation::Orr => {
                let result = op1 | op2;
                if write_flags {
                    cpu.set_logical_flags(result, shift_carry);
                }
                Some(result)
            }
            DataOperation::Mov => {
                if write_flags {
                    cpu.set_logical_flags(op2, shift_carry);
                }
                Some(op2)
            }
            DataOperation::Bic => {
                let result = op1 & !op2;
                if write_flags {
                    cpu.set_logical_flags(result, shift_carry);
                }
                Some(result)
            }
            DataOperation::Mvn => {
                let result = !op2;
                if write_flags {
                    cpu.set_logical_flags(result, shift_carry);
                }
                Some(result)
            }
        };

        let Some(result) = result else {
            return;
        };

        if set_flags && r_d == PC_REG && cpu.registers.cpsr.mode().has_spsr() {
            // Exception return: the SPSR moves back into the CPSR before the jump, so
            // the PC write masks by the restored state.
            let spsr = cpu.registers.spsr;
            cpu.registers.write_cpsr(spsr);
            cpu.write_reg(PC_REG, result, bus);

            // The restore may have re-enabled IRQs with one already pending.
            cpu.poll_interrupts(bus);
        } else {
            cpu.write_reg(r_d, result, bus);
        }
    }
}


#[derive(Debug, Eq, PartialEq, Copy, Clone, num_derive::FromPrimitive)]
enum DataOperation {
    And = 0b0000,
    Eor = 0b0001,
    Sub = 0b0010,
    Rsb = 0b0011,
    Add = 0b0100,
    Adc = 0b0101,
    Sbc = 0b0110,
    Rsc = 0b0111,
    Tst = 0b1000,
    Teq = 0b1001,
    Cmp = 0b1010,
    Cmn = 0b1011,
    Orr = 0b1100,
    Mov = 0b1101,
    Bic = 0b1110,
    Mvn = 0b1111,
}
