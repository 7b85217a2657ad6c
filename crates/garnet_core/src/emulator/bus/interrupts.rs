use crate::emulator::MemoryAddress;
use modular_bitfield::prelude::*;

pub const IE_START: MemoryAddress = 0x0400_0200;
pub const IE_END: MemoryAddress = 0x0400_0201;
pub const IF_START: MemoryAddress = 0x0400_0202;
pub const IF_END: MemoryAddress = 0x0400_0203;
pub const IME_START: MemoryAddress = 0x0400_0208;
pub const IME_END: MemoryAddress = 0x0400_020B;

/// The IE, IF and IME registers.
///
/// Peripherals raise their line through [Self::request_interrupt]; the CPU samples the
/// result at its dispatch points.
#[derive(Debug)]
pub struct InterruptManager {
    pub master_enable: InterruptMasterEnable,
    pub enable: InterruptEnable,
    pub flags: InterruptRequestFlags,
}

impl InterruptManager {
    pub fn new() -> Self {
        InterruptManager {
            master_enable: InterruptMasterEnable::new(),
            enable: InterruptEnable::new(),
            flags: InterruptRequestFlags::new(),
        }
    }

    /// Whether any enabled interrupt line is raised, disregarding IME.
    #[inline]
    pub fn interrupt_pending(&self) -> bool {
        let enable: u16 = self.enable.into();
        let flags: u16 = self.flags.into();

        enable & flags != 0
    }

    #[inline]
    pub fn master_enabled(&self) -> bool {
        self.master_enable.interrupt_enable()
    }

    pub fn read_ie(&self, address: MemoryAddress) -> u8 {
        let raw: u16 = self.enable.into();
        raw.to_le_bytes()[(address - IE_START) as usize]
    }

    pub fn read_if(&self, address: MemoryAddress) -> u8 {
        let raw: u16 = self.flags.into();
        raw.to_le_bytes()[(address - IF_START) as usize]
    }

    pub fn read_ime(&self, address: MemoryAddress) -> u8 {
        let raw: u32 = self.master_enable.into();
        raw.to_le_bytes()[(address - IME_START) as usize]
    }

    pub fn write_ie(&mut self, address: MemoryAddress, value: u8) {
        let mut raw: u16 = self.enable.into();
        let byte = (address % 2) as usize;

        raw = (raw & !(0xFF << (byte * 8))) | ((value as u16) << (byte * 8));
        self.enable = raw.into();
    }

    /// Writing a `1` to a raised bit acknowledges (clears) that interrupt.
    pub fn write_if(&mut self, address: MemoryAddress, value: u8) {
        let raw: u16 = self.flags.into();
        let byte = (address % 2) as usize;

        let acknowledged = (value as u16) << (byte * 8);
        self.flags = (raw & !acknowledged).into();
    }

    pub fn write_ime(&mut self, address: MemoryAddress, value: u8) {
        let mut raw: u32 = self.master_enable.into();
        let byte = (address % 4) as usize;

        raw = (raw & !(0xFF << (byte * 8))) | ((value as u32) << (byte * 8));
        self.master_enable = raw.into();
    }

    /// Raise the given interrupt line.
    ///
    /// The request only reaches the CPU if the matching `IE` bit and `IME` are set.
    pub fn request_interrupt(&mut self, interrupt: Interrupts) {
        let raw: u16 = self.flags.into();
        self.flags = (raw | interrupt as u16).into();
    }
}

impl Default for InterruptManager {
    fn default() -> Self {
        Self::new()
    }
}

/// All interrupt lines of the GBA; the numeric value is the bit in `IE`/`IF`.
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
#[repr(u16)]
pub enum Interrupts {
    GamePak = 1 << 13,
    Keypad = 1 << 12,
    DMA3 = 1 << 11,
    DMA2 = 1 << 10,
    DMA1 = 1 << 9,
    DMA0 = 1 << 8,
    Serial = 1 << 7,
    Timer3 = 1 << 6,
    Timer2 = 1 << 5,
    Timer1 = 1 << 4,
    Timer0 = 1 << 3,
    VCounter = 1 << 2,
    Hblank = 1 << 1,
    Vblank = 1,
}

/// A cleared flag leaves the interrupt disabled.
#[bitfield(bits = 16)]
#[repr(u16)]
#[allow(dead_code)]
#[derive(Debug, Copy, Clone)]
pub struct InterruptEnable {
    pub vblank: bool,
    pub hblank: bool,
    pub vcounter_match: bool,
    pub timer_0: bool,
    pub timer_1: bool,
    pub timer_2: bool,
    pub timer_3: bool,
    pub serial: bool,
    pub dma_0: bool,
    pub dma_1: bool,
    pub dma_2: bool,
    pub dma_3: bool,
    pub keypad: bool,
    /// External IRQ source
    pub game_pak: bool,
    #[skip]
    unused: B2,
}

/// A set flag is a raised, unacknowledged interrupt.
#[bitfield(bits = 16)]
#[repr(u16)]
#[allow(dead_code)]
#[derive(Debug, Copy, Clone)]
pub struct InterruptRequestFlags {
    pub vblank: bool,
    pub hblank: bool,
    pub vcounter_match: bool,
    pub timer_0: bool,
    pub timer_1: bool,
    pub timer_2: bool,
    pub timer_3: bool,
    pub serial: bool,
    pub dma_0: bool,
    pub dma_1: bool,
    pub dma_2: bool,
    pub dma_3: bool,
    pub keypad: bool,
    /// External IRQ source
    pub game_pak: bool,
    #[skip]
    unused: B2,
}

#[bitfield(bits = 32)]
#[repr(u32)]
#[allow(dead_code)]
#[derive(Debug, Copy, Clone)]
pub struct InterruptMasterEnable {
    /// When `false` every interrupt is masked regardless of `IE`.
    pub interrupt_enable: bool,
    #[skip]
    unused: B31,
}
