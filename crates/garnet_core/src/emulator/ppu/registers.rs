use crate::emulator::MemoryAddress;
use modular_bitfield::prelude::*;

pub const LCD_CONTROL_START: MemoryAddress = 0x0400_0000;
pub const LCD_CONTROL_END: MemoryAddress = 0x0400_0001;
/// Nothing uses green swap, it is plain storage here.
pub const GREEN_SWAP_START: MemoryAddress = 0x0400_0002;
pub const GREEN_SWAP_END: MemoryAddress = 0x0400_0003;
pub const LCD_STATUS_START: MemoryAddress = 0x0400_0004;
pub const LCD_STATUS_END: MemoryAddress = 0x0400_0005;
pub const LCD_VERTICAL_COUNTER_START: MemoryAddress = 0x0400_0006;
pub const LCD_VERTICAL_COUNTER_END: MemoryAddress = 0x0400_0007;
pub const BG_CONTROL_START: MemoryAddress = 0x0400_0008;
pub const BG_CONTROL_END: MemoryAddress = 0x0400_000F;

/// DISPCNT
#[bitfield(bits = 16)]
#[repr(u16)]
#[allow(dead_code)]
#[derive(Debug, Copy, Clone)]
pub struct LcdControl {
    /// Bg mode, in range 0..=5 (bits 0..=2)
    pub bg_mode: BgMode,
    /// Reserved/CGB mode, can only be set by BIOS opcodes
    #[skip]
    cgb_mode: bool,
    /// Which of the two bitmap frames is displayed (BG modes 4 and 5 only)
    pub display_frame_select: bool,
    /// 1 = allow access to OAM during H-Blank
    pub h_blank_interval_free: bool,
    /// OBJ character VRAM mapping (0 = two dimensional, 1 = one dimensional)
    pub obj_character_vram_mapping: bool,
    /// Forced blank (1 = allow FAST access to VRAM, palette, OAM)
    pub forced_blank: bool,
    pub screen_display_bg0: bool,
    pub screen_display_bg1: bool,
    pub screen_display_bg2: bool,
    pub screen_display_bg3: bool,
    pub screen_display_obj: bool,
    pub window_0_display: bool,
    pub window_1_display: bool,
    pub obj_window_display: bool,
}

/// | Mode | Rot/Scal | Layers | Size             | Colours      |
/// |------|----------|--------|------------------|--------------|
/// | 0    | No       | 0123   | 256x256..512x512 | 16/16..256/1 |
/// | 1    | Mixed    | 012-   | (BG2 as mode 2)  |              |
/// | 2    | Yes      | --23   | 128x128..1024x1024 | 256/1      |
/// | 3    | Yes      | --2-   | 240x160          | 32768        |
/// | 4    | Yes      | --2-   | 240x160          | 256/1        |
/// | 5    | Yes      | --2-   | 160x128          | 32768        |
#[derive(Debug, BitfieldSpecifier, PartialEq, Copy, Clone)]
#[bits = 3]
pub enum BgMode {
    Mode0 = 0b000,
    Mode1 = 0b001,
    Mode2 = 0b010,
    Mode3 = 0b011,
    Mode4 = 0b100,
    Mode5 = 0b101,
}

/// DISPSTAT
#[bitfield(bits = 16)]
#[repr(u16)]
#[allow(dead_code)]
#[derive(Debug, Copy, Clone)]
pub struct LcdStatus {
    /// (Read only) set in lines 160..=226, not 227
    pub v_blank_flag: bool,
    /// (Read only) toggled in all lines; the drawing time is 960 cycles but the flag
    /// stays clear for 1006
    pub h_blank_flag: bool,
    /// (Read only) set while the current scanline matches the V-count setting
    pub v_counter_flag: bool,
    pub v_blank_irq_enable: bool,
    pub h_blank_irq_enable: bool,
    pub v_counter_irq_enable: bool,
    #[skip]
    unused: B2,
    /// Much like LYC on the older Game Boys: when equal to VCOUNT the V-counter flag is
    /// set and (if enabled) an interrupt is requested.
    pub v_count_setting: u8,
}

/// VCOUNT, the currently drawn scanline.
#[bitfield(bits = 16)]
#[repr(u16)]
#[allow(dead_code)]
#[derive(Debug, Copy, Clone)]
pub struct VerticalCounter {
    /// (Read only) current scanline, 0..=227. Values from 160 up are inside VBlank.
    pub current_scanline: u8,
    /// On the NDS bit 8 extends the scanline, unused here
    #[skip]
    unused: u8,
}

/// BG0CNT..BG3CNT. Only the bitmap modes render, the fields are kept for readback.
#[bitfield(bits = 16)]
#[repr(u16)]
#[allow(dead_code)]
#[derive(Debug, Copy, Clone)]
pub struct BgControl {
    pub priority: B2,
    /// In units of 16KB (= BG tile data)
    pub character_base_block: B2,
    #[skip]
    unused: B2,
    pub mosaic: bool,
    /// 0 = 16/16 palettes, 1 = 256/1
    pub colors_palettes: bool,
    /// In units of 2KB (= BG map data)
    pub screen_base_block: B5,
    /// For BG2/BG3: display area overflow (0 = transparent, 1 = wraparound)
    pub display_area_overflow: bool,
    pub screen_size: B2,
}
