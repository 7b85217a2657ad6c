use crate::emulator::MemoryAddress;
use crate::utils::BitOps;
use modular_bitfield::prelude::*;

pub const WAIT_CNT_START: MemoryAddress = 0x0400_0204;
pub const WAIT_CNT_END: MemoryAddress = 0x0400_0205;
pub const POST_BOOT_FLAG_ADDR: MemoryAddress = 0x0400_0300;
pub const HALT_CNT_ADDR: MemoryAddress = 0x0400_0301;

/// WAITCNT, POSTFLG and HALTCNT.
///
/// The wait-state configuration is storage only; the bus charges the per-region
/// constants from its memory map. Halting however is honoured: a halted CPU burns
/// cycles until an enabled interrupt line is raised.
pub struct SystemControl {
    pub wait_control: WaitControl,
    post_boot_flag: u8,
    pub is_halted: bool,
}

impl SystemControl {
    pub fn new() -> Self {
        SystemControl {
            wait_control: WaitControl::new(),
            post_boot_flag: 0,
            is_halted: false,
        }
    }

    pub fn read_wait_cnt(&self, addr: MemoryAddress) -> u8 {
        let raw: u16 = self.wait_control.into();
        raw.to_le_bytes()[(addr - WAIT_CNT_START) as usize]
    }

    pub fn write_wait_cnt(&mut self, addr: MemoryAddress, value: u8) {
        let mut raw: u16 = self.wait_control.into();
        let shift = ((addr - WAIT_CNT_START) as usize) * 8;

        raw = (raw & !(0xFF << shift)) | ((value as u16) << shift);
        self.wait_control = raw.into();
    }

    pub fn read_post_boot(&self) -> u8 {
        self.post_boot_flag
    }

    pub fn write_post_boot(&mut self, value: u8) {
        self.post_boot_flag = value & 1;
    }

    /// Bit 7 selects Stop instead of Halt; Stop powers down the sound/LCD circuits and
    /// is not modelled.
    pub fn write_halt_control(&mut self, value: u8) {
        if value.check_bit(7) {
            log::warn!("Stop mode requested, treating it as a regular halt");
        }

        self.is_halted = true;
    }
}

impl Default for SystemControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Game pak wait states and the prefetch enable. Kept for readback only.
#[bitfield(bits = 16)]
#[repr(u16)]
#[allow(dead_code)]
#[derive(Debug, Copy, Clone)]
pub struct WaitControl {
    pub sram_wait: B2,
    pub ws0_first_access: B2,
    pub ws0_second_access: B1,
    pub ws1_first_access: B2,
    pub ws1_second_access: B1,
    pub ws2_first_access: B2,
    pub ws2_second_access: B1,
    pub phi_terminal_output: B2,
    #[skip]
    unused: B1,
    pub prefetch_enable: bool,
    /// (Read only) 0 = GBA game pak, 1 = CGB
    pub game_pak_type: bool,
}
