use crate::emulator::bus::Bus;
use crate::emulator::cpu::arm::{ArmInstruction, ArmV4};
use crate::emulator::cpu::registers::{Mode, PC_REG};
use crate::emulator::cpu::CPU;
use crate::utils::BitOps;

impl ArmV4 {
    /// LDM/STM in the four addressing modes (IA/IB/DA/DB).
    ///
    /// Registers transfer in ascending order regardless of direction; the decrementing
    /// modes pre-compute the lowest address and walk upwards from there.
    pub fn block_data_transfer(cpu: &mut CPU, instruction: ArmInstruction, bus: &mut Bus) {
        crate::cpu_log!("Executing instruction: Block Data Transfer");
        let is_load = instruction.check_bit(20);

        if !is_load {
            // An STM that includes R15 stores PC + 12, one slot past the usual read.
            cpu.registers.general_purpose[PC_REG] = cpu.registers.general_purpose[PC_REG].wrapping_add(4);
        }

        let psr_or_user = instruction.check_bit(22);

        if psr_or_user {
            Self::block_transfer_user_bank(cpu, instruction, bus, is_load);
        } else {
            Self::block_transfer(cpu, instruction, bus, is_load);
        }

        if !is_load {
            cpu.registers.general_purpose[PC_REG] = cpu.registers.general_purpose[PC_REG].wrapping_sub(4);
        }
    }

    #[inline]
    fn block_transfer(cpu: &mut CPU, instruction: ArmInstruction, bus: &mut Bus, is_load: bool) {
        let (mut address, final_address, register_list) = Self::transfer_addresses(cpu, instruction);
        let is_preindexed = instruction.check_bit(24);
        let has_writeback = instruction.check_bit(21);
        let reg_base = instruction.get_bits(16, 19) as usize;

        for reg in 0..16 {
            if !register_list.check_bit(reg) {
                continue;
            }

            if is_preindexed {
                address = address.wrapping_add(4);
            }

            if is_load {
                let value = bus.read_32(address, cpu);
                cpu.write_reg(reg as usize, value, bus);
            } else {
                let value = cpu.read_reg(reg as usize);
                bus.write_32(address, value, cpu);
            }

            if !is_preindexed {
                address = address.wrapping_add(4);
            }
        }

        if has_writeback && !(is_load && register_list.check_bit(reg_base as u8)) {
            cpu.write_reg(reg_base, final_address, bus);
        }
    }

    /// The S-bit variant: transfers the User bank from privileged modes, and an LDM
    /// that includes R15 additionally restores the CPSR from the SPSR.
    #[inline]
    fn block_transfer_user_bank(cpu: &mut CPU, instruction: ArmInstruction, bus: &mut Bus, is_load: bool) {
        let register_list = instruction.get_bits(0, 15) as u16;
        let loads_pc = is_load && register_list.check_bit(15);

        let old_mode = cpu.registers.cpsr.mode();
        let mut swapped_banks = false;

        if loads_pc {
            // LDM with R15 in the list: the mode change happens through the SPSR.
            let spsr = cpu.registers.spsr;
            cpu.registers.write_cpsr(spsr);
        } else {
            swapped_banks = cpu.registers.swap_register_banks(old_mode, Mode::User, false);
        }

        Self::block_transfer(cpu, instruction, bus, is_load);

        if swapped_banks {
            cpu.registers.swap_register_banks(Mode::User, old_mode, false);
        }
    }

    /// Compute the first transfer address and the writeback value.
    ///
    /// Returns `(start_address, final_address, register_list)` where `start_address`
    /// still needs the pre-increment applied per transfer.
    fn transfer_addresses(cpu: &CPU, instruction: ArmInstruction) -> (u32, u32, u16) {
        let is_preindexed = instruction.check_bit(24);
        let is_up = instruction.check_bit(23);
        let register_list = instruction.get_bits(0, 15) as u16;
        let register_count = register_list.count_ones();
        let reg_base = instruction.get_bits(16, 19) as usize;

        let base = cpu.read_reg(reg_base);
        let (address, final_address);

        if is_up {
            final_address = base.wrapping_add(4 * register_count);
            address = base;
        } else {
            // Walk upwards from the bottom of the block
            final_address = base.wrapping_sub(4 * register_count);
            // Pre-decrement starts one slot lower than post-decrement, both end at the
            // same address.
            if is_preindexed {
                address = final_address.wrapping_sub(4);
            } else {
                address = final_address.wrapping_add(4);
            }
        }

        (address, final_address, register_list)
    }
}
