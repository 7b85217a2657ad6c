use crate::emulator::bus::Bus;
use crate::emulator::cpu::registers::{PC_REG, SP_REG};
use crate::emulator::cpu::thumb::{ThumbInstruction, ThumbV4};
use crate::emulator::cpu::CPU;
use crate::utils::{sign_extend32, BitOps};

impl ThumbV4 {
    pub fn pc_relative_load(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        let r_d = instruction.get_bits(8, 10) as usize;
        let imm_value = (instruction.get_bits(0, 7) as u32) << 2;

        // The PC is forced word aligned for this addition
        let address = (cpu.registers.pc() & 0xFFFF_FFFC).wrapping_add(imm_value);
        let value = bus.read_32(address, cpu);

        cpu.write_reg(r_d, value, bus);
    }

    pub fn load_store_with_reg_offset(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        let is_load = instruction.check_bit(11);
        let is_byte_transfer = instruction.check_bit(10);

        let r_offset = instruction.get_bits(6, 8) as usize;
        let r_base = instruction.get_bits(3, 5) as usize;
        let r_d = instruction.get_bits(0, 2) as usize;

        let address = cpu.read_reg(r_base).wrapping_add(cpu.read_reg(r_offset));

        Self::load_or_store_value(cpu, bus, is_load, is_byte_transfer, r_d, address)
    }

    pub fn load_store_with_immediate_offset(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        let is_byte_transfer = instruction.check_bit(12);
        let is_load = instruction.check_bit(11);

        // Word transfers scale the 5-bit offset by four
        let offset = (instruction.get_bits(6, 10) as u32) << if is_byte_transfer { 0 } else { 2 };
        let r_base = instruction.get_bits(3, 5) as usize;
        let r_d = instruction.get_bits(0, 2) as usize;

        let address = cpu.read_reg(r_base).wrapping_add(offset);

        Self::load_or_store_value(cpu, bus, is_load, is_byte_transfer, r_d, address)
    }

    /// STRH/LDSB/LDRH/LDSH with a register offset.
    pub fn load_store_sign_extended_byte_halfword(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        let h_flag = instruction.check_bit(11);
        let is_sign_extended = instruction.check_bit(10);

        let r_offset = instruction.get_bits(6, 8) as usize;
        let r_base = instruction.get_bits(3, 5) as usize;
        let r_d = instruction.get_bits(0, 2) as usize;

        let address = cpu.read_reg(r_base).wrapping_add(cpu.read_reg(r_offset));

        if is_sign_extended {
            let value = if h_flag {
                sign_extend32(bus.read_16(address, cpu) as u32, 16) as u32
            } else {
                sign_extend32(bus.read_8(address, cpu) as u32, 8) as u32
            };

            cpu.write_reg(r_d, value, bus);
        } else if h_flag {
            let value = bus.read_16(address, cpu) as u32;
            cpu.write_reg(r_d, value, bus);
        } else {
            bus.write_16(address, cpu.read_reg(r_d) as u16, cpu);
        }
    }

    pub fn load_store_halfword(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        let is_load = instruction.check_bit(11);

        let offset = (instruction.get_bits(6, 10) as u32) << 1;
        let r_base = instruction.get_bits(3, 5) as usize;
        let r_d = instruction.get_bits(0, 2) as usize;

        let address = cpu.read_reg(r_base).wrapping_add(offset);

        if is_load {
            let value = bus.read_16(address, cpu) as u32;
            cpu.write_reg(r_d, value, bus);
        } else {
            bus.write_16(address, cpu.read_reg(r_d) as u16, cpu);
        }
    }

    pub fn sp_relative_load_store(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        let is_load = instruction.check_bit(11);

        let r_d = instruction.get_bits(8, 10) as usize;
        let offset = (instruction.get_bits(0, 7) as u32) << 2;

        let address = cpu.read_reg(SP_REG).wrapping_add(offset);

        if is_load {
            let value = bus.read_32(address, cpu);
            cpu.write_reg(r_d, value, bus);
        } else {
            bus.write_32(address, cpu.read_reg(r_d), cpu);
        }
    }

    /// Compute an address relative to the (word-aligned) PC or the SP.
    pub fn load_address(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        let source_is_sp = instruction.check_bit(11);

        let r_d = instruction.get_bits(8, 10) as usize;
        let constant = (instruction.get_bits(0, 7) as u32) << 2;

        let base = if source_is_sp {
            cpu.read_reg(SP_REG)
        } else {
            cpu.read_reg(PC_REG) & 0xFFFF_FFFC
        };

        cpu.write_reg(r_d, base.wrapping_add(constant), bus);
    }

    pub fn add_offset_to_stack_pointer(cpu: &mut CPU, instruction: ThumbInstruction, bus: &mut Bus) {
        let offset_is_negative = instruction.check_bit(7);
        let offset = (instruction.get_bits(0, 6) as u32) << 2;

        let new_sp = if offset_is_negative {
            cpu.read_reg(SP_REG).wrapping_sub(offset)
        } else {
            cpu.read_reg(SP_REG).wrapping_add(offset)
        };

        cpu.write_reg(SP_REG, new_sp, bus);
    }

    #[inline(always)]
    fn load_or_store_value(
        cpu: &mut CPU,
        bus: &mut Bus,
        is_load: bool,
        is_byte_transfer: bool,
        r_d: usize,
        address: u32,
    ) {
        if is_load {
            let value = if is_byte_transfer {
                bus.read_8(address, cpu) as u32
            } else {
                bus.read_32(address, cpu)
            };

            cpu.write_reg(r_d, value, bus);
        } else if is_byte_transfer {
            bus.write_8(address, cpu.read_reg(r_d) as u8, cpu);
        } else {
            bus.write_32(address, cpu.read_reg(r_d), cpu);
        }
    }
}
