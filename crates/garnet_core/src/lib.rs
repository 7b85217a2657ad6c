pub mod emulator;
mod utils;

/// Horizontal resolution of the LCD in pixels.
pub const DISPLAY_WIDTH: u32 = 240;
/// Vertical resolution of the LCD in pixels.
pub const DISPLAY_HEIGHT: u32 = 160;
/// The amount of pixels in one full frame.
pub const FRAMEBUFFER_SIZE: usize = (DISPLAY_WIDTH * DISPLAY_HEIGHT) as usize;

/// System clock of the GBA, in Hz.
pub const CLOCK_SPEED: u32 = 16_777_216;
/// Refresh rate of the LCD. The front end should call [emulator::GBAEmulator::frame] at this rate.
pub const REFRESH_RATE: f64 = 59.7275;

/// Total scanlines per frame, including the VBlank period.
pub const SCANLINES_PER_FRAME: u32 = 228;
/// The first scanline of the VBlank period. The flag stays raised until line 227.
pub const VBLANK_START_SCANLINE: u32 = 160;
/// Cycles it takes to fully draw (and blank) one scanline.
pub const CYCLES_PER_SCANLINE: u64 = 1232;
/// Intra-scanline cycle at which the HBlank flag is raised.
pub const HBLANK_START_CYCLE: u64 = 1006;

/// The buttons of the GBA, set by the front end via
/// [emulator::GBAEmulator::key_down]/[emulator::GBAEmulator::key_up].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub enum InputKeys {
    A,
    B,
    Select,
    Start,
    Right,
    Left,
    Up,
    Down,
    ShoulderRight,
    ShoulderLeft,
}

macro_rules! cpu_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "cpu-logging")]
        log::trace!(target: "garnet::cpu", $($arg)*);
    }
}

macro_rules! bus_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "bus-logging")]
        log::trace!(target: "garnet::bus", $($arg)*);
    }
}

/// Allocate an array of the provided size directly on the heap.
///
/// Several of our memory regions (VRAM, work RAM, the framebuffer) are large enough to
/// blow the stack when constructed as a plain array first.
#[macro_export]
macro_rules! box_array {
    ($val:expr; $len:expr) => {{
        let boxed: Box<[_; $len]> = vec![$val; $len].into_boxed_slice().try_into().unwrap();
        boxed
    }};
}

use bus_log;
use cpu_log;
