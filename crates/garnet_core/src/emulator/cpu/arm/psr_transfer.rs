use crate::emulator::bus::Bus;
use crate::emulator::cpu::arm::{ArmInstruction, ArmV4};
use crate::emulator::cpu::registers::{Mode, PSR};
use crate::emulator::cpu::CPU;
use crate::utils::BitOps;

impl ArmV4 {
    /// MRS: transfer the CPSR or SPSR into a register.
    pub fn mrs_psr_to_reg(cpu: &mut CPU, instruction: ArmInstruction, bus: &mut Bus) {
        let r_d = instruction.get_bits(12, 15) as usize;
        let use_spsr = instruction.check_bit(22);

        let contents = if use_spsr { cpu.registers.spsr } else { cpu.registers.cpsr };

        cpu.write_reg(r_d, contents.as_raw(), bus);
    }

    /// MSR: transfer a register or rotated immediate into the CPSR or SPSR, limited to
    /// the fields named by the f/s/x/c mask in bits 19..=16.
    pub fn msr_to_psr(cpu: &mut CPU, instruction: ArmInstruction, _bus: &mut Bus) {
        let use_spsr = instruction.check_bit(22);
        let is_immediate = instruction.check_bit(25);

        let operand = if is_immediate {
            let rotate = instruction.get_bits(8, 11) * 2;
            instruction.get_bits(0, 7).rotate_right(rotate)
        } else {
            cpu.read_reg(instruction.get_bits(0, 3) as usize)
        };

        let mut field_mask = 0u32;
        for (bit, mask) in [(19, 0xFF00_0000u32), (18, 0x00FF_0000), (17, 0x0000_FF00), (16, 0x0000_00FF)] {
            if instruction.check_bit(bit) {
                field_mask |= mask;
            }
        }

        // The control field is privileged
        if cpu.registers.cpsr.mode() == Mode::User {
            field_mask &= !0xFF;
        }

        if use_spsr {
            if cpu.registers.cpsr.mode().has_spsr() {
                let new_value = (cpu.registers.spsr.as_raw() & !field_mask) | (operand & field_mask);
                cpu.registers.spsr = PSR::from(new_value);
            }
        } else {
            let new_value = (cpu.registers.cpsr.as_raw() & !field_mask) | (operand & field_mask);
            // A mode change through the control field swaps the register banks
            cpu.registers.write_cpsr(PSR::from(new_value));
        }
    }
}
