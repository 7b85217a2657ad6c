pub use bios::{BiosData, BIOS_SIZE};

use crate::emulator::bus::bios::GbaBios;
use crate::emulator::bus::dma::{DmaChannels, DmaStartTiming, DMA_IO_END, DMA_IO_START};
use crate::emulator::bus::interrupts::{
    InterruptManager, IE_END, IE_START, IF_END, IF_START, IME_END, IME_START,
};
use crate::emulator::bus::keypad::{Keypad, KEYCONTROL_END, KEYCONTROL_START, KEYSTATUS_END, KEYSTATUS_START};
use crate::emulator::bus::system_control::{
    SystemControl, HALT_CNT_ADDR, POST_BOOT_FLAG_ADDR, WAIT_CNT_END, WAIT_CNT_START,
};
use crate::emulator::bus::timers::{Timers, TIMER_IO_END, TIMER_IO_START};
use crate::emulator::cartridge::Cartridge;
use crate::emulator::cpu::CPU;
use crate::emulator::ppu::{LCD_IO_END, LCD_IO_START, PPU};
use crate::emulator::MemoryAddress;

pub const IO_START: MemoryAddress = 0x0400_0000;
pub const IO_END: MemoryAddress = 0x0400_03FE;

mod bios;
pub mod dma;
pub mod helpers;
pub mod interrupts;
pub mod keypad;
mod ram;
pub mod system_control;
pub mod timers;

/// Width indices into [MemoryRegion::cycles].
const WIDTH_8: usize = 0;
const WIDTH_16: usize = 1;
const WIDTH_32: usize = 2;

/// One region of the address space: its window, the period its backing storage
/// mirrors with, and the access cost per width.
pub struct MemoryRegion {
    pub name: &'static str,
    pub start: MemoryAddress,
    pub end: MemoryAddress,
    /// Addresses repeat with this period; `(addr - start) % mirror` hits the storage.
    pub mirror: u32,
    /// Access cycles for 8/16/32 bit, reflecting the region's bus width and wait
    /// states (constants; WAITCNT is not interpreted).
    pub cycles: [u64; 3],
}

/// The fixed memory map. The game pak ROM appears three times: the wait-state windows
/// share one backing store.
pub const MEMORY_MAP: [MemoryRegion; 11] = [
    MemoryRegion { name: "BIOS",    start: 0x0000_0000, end: 0x0000_3FFF, mirror: 0x4000,      cycles: [1, 1, 1] },
    MemoryRegion { name: "WRAM1",   start: 0x0200_0000, end: 0x02FF_FFFF, mirror: 0x4_0000,    cycles: [3, 3, 6] },
    MemoryRegion { name: "WRAM2",   start: 0x0300_0000, end: 0x03FF_FFFF, mirror: 0x8000,      cycles: [1, 1, 1] },
    MemoryRegion { name: "IO",      start: 0x0400_0000, end: 0x0400_03FE, mirror: 0x400,       cycles: [1, 1, 1] },
    MemoryRegion { name: "Palette", start: 0x0500_0000, end: 0x05FF_FFFF, mirror: 0x400,       cycles: [1, 1, 2] },
    MemoryRegion { name: "VRAM",    start: 0x0600_0000, end: 0x06FF_FFFF, mirror: 0x2_0000,    cycles: [1, 1, 2] },
    MemoryRegion { name: "OAM",     start: 0x0700_0000, end: 0x07FF_FFFF, mirror: 0x400,       cycles: [1, 1, 1] },
    MemoryRegion { name: "ROM0",    start: 0x0800_0000, end: 0x09FF_FFFF, mirror: 0x200_0000,  cycles: [5, 5, 8] },
    MemoryRegion { name: "ROM1",    start: 0x0A00_0000, end: 0x0BFF_FFFF, mirror: 0x200_0000,  cycles: [5, 5, 8] },
    MemoryRegion { name: "ROM2",    start: 0x0C00_0000, end: 0x0DFF_FFFF, mirror: 0x200_0000,  cycles: [5, 5, 8] },
    MemoryRegion { name: "SRAM",    start: 0x0E00_0000, end: 0x0FFF_FFFF, mirror: 0x1_0000,    cycles: [5, 5, 5] },
];

/// The individually addressable backing stores, for bulk loads and clears.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MemoryBlock {
    Bios,
    WramBoard,
    WramChip,
    Palette,
    Vram,
    Oam,
    Sram,
}

/// The system bus: every peripheral plus the routing and side-effect policy for all
/// memory accesses.
pub struct Bus {
    pub bios: GbaBios,
    pub rom: Cartridge,
    pub ram: ram::WorkRam,
    pub ppu: PPU,
    pub dma: DmaChannels,
    pub timers: Timers,
    pub interrupts: InterruptManager,
    pub keypad: Keypad,
    pub system_control: SystemControl,
    /// Total elapsed cycles; every charged access adds its region's cost here.
    pub cycles: u64,
}

impl Bus {
    pub fn new(rom: Cartridge, bios: Option<Box<BiosData>>) -> Self {
        let present = bios.is_some();
        let bios_data = bios.unwrap_or_else(|| crate::box_array![0; bios::BIOS_SIZE]);

        Self {
            bios: GbaBios::new(bios_data, present),
            rom,
            ram: ram::WorkRam::new(),
            ppu: PPU::new(),
            dma: DmaChannels::new(),
            timers: Timers::new(),
            interrupts: InterruptManager::new(),
            keypad: Keypad::default(),
            system_control: SystemControl::new(),
            cycles: 0,
        }
    }

    pub fn bios_present(&self) -> bool {
        self.bios.is_present()
    }

    /// Charge idle (internal) cycles that belong to no memory access.
    #[inline(always)]
    pub fn idle(&mut self, cycles: u64) {
        self.cycles += cycles;
    }

    fn access_cost(addr: MemoryAddress, width: usize) -> u64 {
        MEMORY_MAP
            .iter()
            .find(|region| region.start <= addr && addr <= region.end)
            .map(|region| region.cycles[width])
            .unwrap_or(1)
    }

    #[inline(always)]
    fn charge(&mut self, addr: MemoryAddress, width: usize) {
        self.cycles += Self::access_cost(addr, width);
    }

    #[inline]
    pub fn read_8(&mut self, addr: MemoryAddress, cpu: &CPU) -> u8 {
        self.charge(addr, WIDTH_8);
        self.read_8_raw(addr, cpu)
    }

    #[inline]
    pub fn read_16(&mut self, addr: MemoryAddress, cpu: &CPU) -> u16 {
        let addr = addr & !0x1;
        self.charge(addr, WIDTH_16);
        self.read_16_raw(addr, cpu)
    }

    #[inline]
    pub fn read_32(&mut self, addr: MemoryAddress, cpu: &CPU) -> u32 {
        let addr = addr & !0x3;
        self.charge(addr, WIDTH_32);
        self.read_32_raw(addr, cpu)
    }

    pub fn write_8(&mut self, addr: MemoryAddress, value: u8, cpu: &CPU) {
        self.charge(addr, WIDTH_8);
        self.write_8_raw(addr, value);
        self.check_dma_window(addr, cpu);
    }

    pub fn write_16(&mut self, addr: MemoryAddress, value: u16, cpu: &CPU) {
        let addr = addr & !0x1;
        self.charge(addr, WIDTH_16);
        self.write_16_raw(addr, value);
        self.check_dma_window(addr, cpu);
    }

    pub fn write_32(&mut self, addr: MemoryAddress, value: u32, cpu: &CPU) {
        let addr = addr & !0x3;
        self.charge(addr, WIDTH_32);
        self.write_32_raw(addr, value);
        self.check_dma_window(addr, cpu);
    }

    /// A store into the DMA register block immediately runs the enabled
    /// immediate-timing channels.
    #[inline]
    fn check_dma_window(&mut self, addr: MemoryAddress, cpu: &CPU) {
        if (DMA_IO_START..=DMA_IO_END).contains(&addr) {
            self.dma_transfer(DmaStartTiming::Immediately, cpu);
        }
    }

    #[inline]
    pub(crate) fn read_16_raw(&mut self, addr: MemoryAddress, cpu: &CPU) -> u16 {
        let addr = addr & !0x1;

        u16::from_le_bytes([self.read_8_raw(addr, cpu), self.read_8_raw(addr.wrapping_add(1), cpu)])
    }

    #[inline]
    pub(crate) fn read_32_raw(&mut self, addr: MemoryAddress, cpu: &CPU) -> u32 {
        let addr = addr & !0x3;

        u32::from_le_bytes([
            self.read_8_raw(addr, cpu),
            self.read_8_raw(addr.wrapping_add(1), cpu),
            self.read_8_raw(addr.wrapping_add(2), cpu),
            self.read_8_raw(addr.wrapping_add(3), cpu),
        ])
    }

    pub(crate) fn read_8_raw(&mut self, addr: MemoryAddress, cpu: &CPU) -> u8 {
        crate::bus_log!("Reading from {:#010X}", addr);
        match addr >> 24 {
            0x00 if GbaBios::is_in_bios_region(addr) => self.bios.read(addr, cpu),
            0x00 | 0x01 => self.open_bus_read(addr, cpu),
            0x02 => self.ram.read_board(addr),
            0x03 => self.ram.read_chip(addr),
            0x04 => self.read_io(addr, cpu),
            0x05 => self.ppu.read_palette(addr),
            0x06 => self.ppu.read_vram(addr),
            0x07 => self.ppu.read_oam(addr),
            // The three wait-state windows hit the same bytes
            0x08..=0x0D => self.rom.read(addr),
            0x0E | 0x0F => self.rom.read_sram(addr),
            _ => self.open_bus_read(addr, cpu),
        }
    }

    pub(crate) fn write_32_raw(&mut self, addr: MemoryAddress, value: u32) {
        let addr = addr & !0x3;
        let bytes = value.to_le_bytes();

        self.write_16_raw(addr, u16::from_le_bytes([bytes[0], bytes[1]]));
        self.write_16_raw(addr.wrapping_add(2), u16::from_le_bytes([bytes[2], bytes[3]]));
    }

    pub(crate) fn write_16_raw(&mut self, addr: MemoryAddress, value: u16) {
        let addr = addr & !0x1;

        match addr >> 24 {
            0x05 => self.ppu.write_palette_16(addr, value),
            0x06 => self.ppu.write_vram_16(addr, value),
            0x07 => self.ppu.write_oam_16(addr, value),
            _ => {
                let bytes = value.to_le_bytes();
                self.write_8_raw(addr, bytes[0]);
                self.write_8_raw(addr.wrapping_add(1), bytes[1]);
            }
        }
    }

    pub(crate) fn write_8_raw(&mut self, addr: MemoryAddress, value: u8) {
        crate::bus_log!("Writing {:#04X} to {:#010X}", value, addr);
        match addr >> 24 {
            0x00 | 0x01 => {
                crate::bus_log!("Ignored write to BIOS region: {:#010X}", addr);
            }
            0x02 => self.ram.write_board(addr, value),
            0x03 => self.ram.write_chip(addr, value),
            0x04 => self.write_io(addr, value),
            0x05 => self.ppu.write_palette(addr, value),
            0x06 => self.ppu.write_vram(addr, value),
            0x07 => {
                // 8-bit OAM writes are dropped by the hardware
                crate::bus_log!("Ignored 8-bit OAM write to {:#010X}", addr);
            }
            0x08..=0x0D => {
                crate::bus_log!("Ignored ROM write to {:#010X}", addr);
            }
            0x0E | 0x0F => self.rom.write_sram(addr, value),
            _ => panic!("Unmapped write of {:#04X} to {:#010X}", value, addr),
        }
    }

    #[inline]
    fn read_io(&mut self, addr: MemoryAddress, cpu: &CPU) -> u8 {
        if addr > IO_END {
            return self.open_bus_read(addr, cpu);
        }

        match addr {
            LCD_IO_START..=LCD_IO_END => self.ppu.read_io(addr),
            DMA_IO_START..=DMA_IO_END => match self.dma.read_register(addr) {
                Some(value) => value,
                // Source/destination/count are write-only
                None => self.open_bus_read(addr, cpu),
            },
            TIMER_IO_START..=TIMER_IO_END => self.timers.read_registers(addr),
            KEYSTATUS_START..=KEYSTATUS_END => self.keypad.read_status(addr),
            KEYCONTROL_START..=KEYCONTROL_END => self.keypad.read_control(addr),
            IE_START..=IE_END => self.interrupts.read_ie(addr),
            IF_START..=IF_END => self.interrupts.read_if(addr),
            WAIT_CNT_START..=WAIT_CNT_END => self.system_control.read_wait_cnt(addr),
            IME_START..=IME_END => self.interrupts.read_ime(addr),
            POST_BOOT_FLAG_ADDR => self.system_control.read_post_boot(),
            _ => {
                crate::bus_log!("Unhandled IO read from {:#010X}", addr);
                self.open_bus_read(addr, cpu)
            }
        }
    }

    #[inline]
    fn write_io(&mut self, addr: MemoryAddress, value: u8) {
        if addr > IO_END {
            return;
        }

        match addr {
            LCD_IO_START..=LCD_IO_END => self.ppu.write_io(addr, value),
            DMA_IO_START..=DMA_IO_END => self.dma.write_register(addr, value),
            TIMER_IO_START..=TIMER_IO_END => self.timers.write_registers(addr, value),
            KEYSTATUS_START..=KEYSTATUS_END => {
                crate::bus_log!("Ignored write to the read-only keypad status");
            }
            KEYCONTROL_START..=KEYCONTROL_END => self.keypad.write_control(addr, value),
            IE_START..=IE_END => self.interrupts.write_ie(addr, value),
            IF_START..=IF_END => self.interrupts.write_if(addr, value),
            WAIT_CNT_START..=WAIT_CNT_END => self.system_control.write_wait_cnt(addr, value),
            IME_START..=IME_END => self.interrupts.write_ime(addr, value),
            POST_BOOT_FLAG_ADDR => self.system_control.write_post_boot(value),
            HALT_CNT_ADDR => self.system_control.write_halt_control(value),
            _ => {
                // The sound and serial groups have no observable behaviour here
                crate::bus_log!("Ignored IO write of {:#04X} to {:#010X}", value, addr);
            }
        }
    }

    /// Reads with nothing behind them observe the latest prefetched opcode.
    #[inline(always)]
    fn open_bus_read(&self, addr: MemoryAddress, cpu: &CPU) -> u8 {
        cpu.pipeline[2].to_le_bytes()[addr as usize % 4]
    }

    /// Borrow a whole backing store, e.g. to feed the scanline renderer tests or to
    /// dump memory from a debugger.
    pub fn read_block(&self, block: MemoryBlock) -> &[u8] {
        match block {
            MemoryBlock::Bios => self.bios.data(),
            MemoryBlock::WramBoard => self.ram.board(),
            MemoryBlock::WramChip => self.ram.chip(),
            MemoryBlock::Palette => self.ppu.palette_ram(),
            MemoryBlock::Vram => self.ppu.vram(),
            MemoryBlock::Oam => self.ppu.oam_ram(),
            MemoryBlock::Sram => self.rom.sram(),
        }
    }

    /// Bulk copy into a backing store from its start, truncating to whichever side is
    /// shorter. The BIOS block is intentionally absent, it is loaded at construction.
    pub fn write_block(&mut self, block: MemoryBlock, data: &[u8]) {
        let target: &mut [u8] = match block {
            MemoryBlock::Bios => {
                log::warn!("Ignored bulk write to the read-only BIOS block");
                return;
            }
            MemoryBlock::WramBoard => self.ram.board_mut(),
            MemoryBlock::WramChip => self.ram.chip_mut(),
            MemoryBlock::Palette => self.ppu.palette_ram_mut(),
            MemoryBlock::Vram => self.ppu.vram_mut(),
            MemoryBlock::Oam => self.ppu.oam_ram_mut(),
            MemoryBlock::Sram => self.rom.sram_mut(),
        };

        let len = target.len().min(data.len());
        target[..len].copy_from_slice(&data[..len]);
    }

    /// Zero a backing store.
    pub fn clear_block(&mut self, block: MemoryBlock) {
        let target: &mut [u8] = match block {
            MemoryBlock::Bios => {
                log::warn!("Ignored clear of the read-only BIOS block");
                return;
            }
            MemoryBlock::WramBoard => self.ram.board_mut(),
            MemoryBlock::WramChip => self.ram.chip_mut(),
            MemoryBlock::Palette => self.ppu.palette_ram_mut(),
            MemoryBlock::Vram => self.ppu.vram_mut(),
            MemoryBlock::Oam => self.ppu.oam_ram_mut(),
            MemoryBlock::Sram => self.rom.sram_mut(),
        };

        target.fill(0);
    }
}
