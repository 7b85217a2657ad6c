use crate::emulator::bus::interrupts::Interrupts;
use crate::emulator::bus::Bus;
use crate::emulator::cpu::CPU;
use crate::emulator::MemoryAddress;
use modular_bitfield::prelude::*;

pub const DMA_IO_START: MemoryAddress = 0x0400_00B0;
pub const DMA_IO_END: MemoryAddress = 0x0400_00DF;

/// Bytes of register space per channel: source, destination, count, control.
const DMA_CHANNEL_SIZE: u32 = 12;
const DMA_DEST_OFFSET: usize = 4;
const DMA_COUNT_OFFSET: usize = 8;
const DMA_CONTROL_OFFSET: usize = 10;

/// The four DMA channels.
///
/// DMA0 has the highest priority; DMA1/DMA2 feed the sound FIFOs on hardware and DMA3
/// can write to the game pak bus. The channels themselves are general purpose.
pub struct DmaChannels {
    channels: [DmaChannel; 4],
    /// Guards against a transfer's own stores re-entering the engine.
    active: bool,
}

impl DmaChannels {
    pub fn new() -> Self {
        Self {
            channels: [DmaChannel::new(); 4],
            active: false,
        }
    }

    pub fn channel(&self, channel: usize) -> &DmaChannel {
        &self.channels[channel]
    }

    #[inline]
    pub fn write_register(&mut self, address: MemoryAddress, value: u8) {
        let relative = address - DMA_IO_START;
        let channel = (relative / DMA_CHANNEL_SIZE) as usize;

        self.channels[channel].write((relative % DMA_CHANNEL_SIZE) as usize, value);
    }

    /// Source, destination and count are write-only; only the control word reads back.
    pub fn read_register(&self, address: MemoryAddress) -> Option<u8> {
        let relative = address - DMA_IO_START;
        let channel = (relative / DMA_CHANNEL_SIZE) as usize;
        let offset = (relative % DMA_CHANNEL_SIZE) as usize;

        match offset {
            DMA_CONTROL_OFFSET..=11 => {
                let raw: u16 = self.channels[channel].control.into();
                Some(raw.to_le_bytes()[offset - DMA_CONTROL_OFFSET])
            }
            _ => None,
        }
    }
}

impl Default for DmaChannels {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DmaChannel {
    source: MemoryAddress,
    dest: MemoryAddress,
    word_count: u16,
    control: DmaControl,
}

impl DmaChannel {
    pub fn new() -> Self {
        Self {
            source: 0,
            dest: 0,
            word_count: 0,
            control: DmaControl::new(),
        }
    }

    #[inline]
    fn write(&mut self, offset: usize, value: u8) {
        match offset {
            0..=3 => {
                let mut bytes = self.source.to_le_bytes();
                bytes[offset] = value;
                self.source = u32::from_le_bytes(bytes);
            }
            DMA_DEST_OFFSET..=7 => {
                let mut bytes = self.dest.to_le_bytes();
                bytes[offset - DMA_DEST_OFFSET] = value;
                self.dest = u32::from_le_bytes(bytes);
            }
            DMA_COUNT_OFFSET..=9 => {
                let mut bytes = self.word_count.to_le_bytes();
                bytes[offset - DMA_COUNT_OFFSET] = value;
                self.word_count = u16::from_le_bytes(bytes);
            }
            DMA_CONTROL_OFFSET..=11 => {
                let mut raw: u16 = self.control.into();
                let shift = (offset - DMA_CONTROL_OFFSET) * 8;
                raw = (raw & !(0xFF << shift)) | ((value as u16) << shift);
                self.control = raw.into();
            }
            _ => unreachable!(),
        }
    }

    #[inline]
    pub fn control(&self) -> DmaControl {
        self.control
    }
}

impl Bus {
    const DMA_INTERRUPTS: [Interrupts; 4] = [
        Interrupts::DMA0,
        Interrupts::DMA1,
        Interrupts::DMA2,
        Interrupts::DMA3,
    ];

    /// Run the block copy of every enabled channel whose start timing matches,
    /// in priority order.
    ///
    /// The transfer happens atomically relative to CPU steps and does not charge
    /// access cycles.
    pub fn dma_transfer(&mut self, timing: DmaStartTiming, cpu: &CPU) {
        if self.dma.active {
            return;
        }
        self.dma.active = true;

        for idx in 0..4 {
            let channel = self.dma.channels[idx];
            let control = channel.control;

            if !control.enabled() || control.start_timing() != timing {
                continue;
            }
            if control.start_timing() == DmaStartTiming::Special {
                // Sound FIFO / video capture timing, nothing to feed here
                continue;
            }

            let unit = match control.transfer_type() {
                DmaTransferType::Halfword => 2,
                DmaTransferType::Word => 4,
            };
            // A zero count transfers the full wrap of the channel's counter
            let count = if channel.word_count == 0 {
                if idx == 3 {
                    0x1_0000
                } else {
                    0x4000
                }
            } else {
                channel.word_count as u32
            };

            log::trace!(
                target: "garnet::dma",
                "DMA{}: {} units of {} bytes, {:#010X} -> {:#010X}",
                idx, count, unit, channel.source, channel.dest
            );

            let mut source = channel.source;
            let mut dest = channel.dest;

            for _ in 0..count {
                if unit == 4 {
                    let value = self.read_32_raw(source, cpu);
                    self.write_32_raw(dest, value);
                } else {
                    let value = self.read_16_raw(source, cpu);
                    self.write_16_raw(dest, value);
                }

                source = match control.source_control() {
                    DmaSourceControl::Increment => source.wrapping_add(unit),
                    DmaSourceControl::Decrement => source.wrapping_sub(unit),
                    DmaSourceControl::Fixed | DmaSourceControl::Prohibited => source,
                };
                dest = match control.dest_control() {
                    // IncrementReload re-latches the register value on repeat, which a
                    // fresh transfer re-reads anyway; during the copy it increments.
                    DmaDestControl::Increment | DmaDestControl::IncrementReload => dest.wrapping_add(unit),
                    DmaDestControl::Decrement => dest.wrapping_sub(unit),
                    DmaDestControl::Fixed => dest,
                };
            }

            if !control.repeat() {
                self.dma.channels[idx].control.set_enabled(false);
            }
            if control.irq_on_completion() {
                self.interrupts.request_interrupt(Self::DMA_INTERRUPTS[idx]);
            }
        }

        self.dma.active = false;
    }
}

#[bitfield(bits = 16)]
#[repr(u16)]
#[derive(Debug, Copy, Clone)]
pub struct DmaControl {
    #[skip]
    unused: B5,
    pub dest_control: DmaDestControl,
    pub source_control: DmaSourceControl,
    /// Must be zero when the game pak DRQ bit is set
    pub repeat: bool,
    pub transfer_type: DmaTransferType,
    /// DMA3 only: DRQ from the game pak
    pub game_pak_drq: bool,
    /// Special depends on the channel: prohibited for DMA0, sound FIFO for DMA1/DMA2,
    /// video capture for DMA3
    pub start_timing: DmaStartTiming,
    pub irq_on_completion: bool,
    pub enabled: bool,
}

#[derive(Debug, BitfieldSpecifier, PartialEq, Clone, Copy)]
#[bits = 2]
pub enum DmaDestControl {
    Increment = 0b00,
    Decrement = 0b01,
    Fixed = 0b10,
    IncrementReload = 0b11,
}

#[derive(Debug, BitfieldSpecifier, PartialEq, Clone, Copy)]
#[bits = 2]
pub enum DmaSourceControl {
    Increment = 0b00,
    Decrement = 0b01,
    Fixed = 0b10,
    Prohibited = 0b11,
}

#[derive(Debug, BitfieldSpecifier, PartialEq, Clone, Copy)]
#[bits = 1]
pub enum DmaTransferType {
    Halfword = 0b0,
    Word = 0b1,
}

#[derive(Debug, BitfieldSpecifier, PartialEq, Clone, Copy)]
#[bits = 2]
pub enum DmaStartTiming {
    Immediately = 0b00,
    VBlank = 0b01,
    HBlank = 0b10,
    Special = 0b11,
}
