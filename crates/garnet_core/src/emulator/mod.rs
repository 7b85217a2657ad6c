use bus::Bus;
use cartridge::Cartridge;
use cpu::CPU;

use crate::emulator::bus::dma::DmaStartTiming;
use crate::emulator::bus::{BiosData, BIOS_SIZE};
use crate::emulator::frame::RgbaFrame;
use crate::{InputKeys, CYCLES_PER_SCANLINE, HBLANK_START_CYCLE, SCANLINES_PER_FRAME, VBLANK_START_SCANLINE};

pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod debug;
pub mod frame;
pub mod ppu;

/// Refers to an *absolute* memory address. Components receiving one must translate it
/// to an address relative to themselves.
pub type MemoryAddress = u32;
pub type AlignedAddress = u32;

/// Invoked at the end of every frame with the finished framebuffer.
pub type DrawCallback = Box<dyn FnMut(&RgbaFrame) + Send>;

#[derive(Debug, Default)]
pub struct EmuOptions {
    /// Whether to start execution at the cartridge entry point instead of the reset
    /// vector. Forced when no BIOS is provided.
    pub skip_bios: bool,
    /// BIOS image. When absent the BIOS region is zeroed and the supported software
    /// interrupts are emulated at a high level instead.
    pub bios: Option<Vec<u8>>,
}

/// The main emulator struct: owns every component and drives the scanline loop.
pub struct GBAEmulator {
    pub(crate) cpu: CPU,
    pub(crate) bus: Bus,
    draw: Option<DrawCallback>,
}

impl GBAEmulator {
    pub fn new(rom: Cartridge, mut options: EmuOptions) -> Self {
        let has_bios = options.bios.is_some();
        let mut bus = Bus::new(rom, options.bios.take().map(vec_to_bios_data));
        let cpu = CPU::new(options.skip_bios || !has_bios, &mut bus);

        GBAEmulator { cpu, bus, draw: None }
    }

    /// Install the thunk called at end-of-frame. The front end should copy or upload
    /// the buffer before returning.
    pub fn set_draw(&mut self, callback: DrawCallback) {
        self.draw = Some(callback);
    }

    /// Enter the run loop: frames forever, paced to the LCD refresh rate.
    ///
    /// Front ends that drive their own timing call [Self::frame] directly instead.
    pub fn boot(&mut self) -> ! {
        let frame_duration = std::time::Duration::from_secs_f64(1.0 / crate::REFRESH_RATE);

        loop {
            let started = std::time::Instant::now();

            self.frame();

            if let Some(remaining) = frame_duration.checked_sub(started.elapsed()) {
                std::thread::sleep(remaining);
            }
        }
    }

    /// Run one full frame: 228 scanlines of 1232 cycles each, then the draw callback.
    ///
    /// The front end calls this at the display refresh period (~16.74ms).
    #[profiling::function]
    pub fn frame(&mut self) {
        for line in 0..SCANLINES_PER_FRAME {
            self.run_scanline(line);
        }

        profiling::finish_frame!();

        if let Some(draw) = &mut self.draw {
            draw(self.bus.ppu.frame_buffer());
        }
    }

    fn run_scanline(&mut self, line: u32) {
        {
            let Bus { ppu, interrupts, .. } = &mut self.bus;
            ppu.begin_scanline(line, interrupts);
        }

        if line == VBLANK_START_SCANLINE {
            self.bus.dma_transfer(DmaStartTiming::VBlank, &self.cpu);
        }

        let line_start = self.bus.cycles;
        let mut in_hblank = false;

        while self.bus.cycles - line_start < CYCLES_PER_SCANLINE {
            if !in_hblank && self.bus.cycles - line_start >= HBLANK_START_CYCLE {
                in_hblank = true;

                {
                    let Bus { ppu, interrupts, .. } = &mut self.bus;
                    ppu.set_hblank(true, interrupts);
                }
                self.bus.dma_transfer(DmaStartTiming::HBlank, &self.cpu);
            }

            self.step_instruction();
        }

        if line < VBLANK_START_SCANLINE {
            self.bus.ppu.render_scanline(line);
        }

        let Bus { ppu, interrupts, .. } = &mut self.bus;
        ppu.set_hblank(false, interrupts);
    }

    /// Step the CPU one instruction, deliver any pending interrupt and advance the
    /// timers by however many cycles the step consumed.
    ///
    /// While halted the CPU burns cycles instead; the timers keep running and a raised
    /// enabled interrupt line resumes execution.
    pub fn step_instruction(&mut self) {
        let before = self.bus.cycles;

        if self.bus.system_control.is_halted && !self.bus.interrupts.interrupt_pending() {
            self.bus.idle(1);

            let delta = self.bus.cycles - before;
            let Bus { timers, interrupts, .. } = &mut self.bus;
            timers.tick(delta, interrupts);
            return;
        }

        self.bus.system_control.is_halted = false;
        self.cpu.step_instruction(&mut self.bus);
        self.cpu.poll_interrupts(&mut self.bus);

        let delta = self.bus.cycles - before;
        let Bus { timers, interrupts, .. } = &mut self.bus;
        timers.tick(delta, interrupts);
    }

    pub fn key_down(&mut self, key: InputKeys) {
        let Bus { keypad, interrupts, .. } = &mut self.bus;
        keypad.set_key(key, true, interrupts);
    }

    pub fn key_up(&mut self, key: InputKeys) {
        let Bus { keypad, interrupts, .. } = &mut self.bus;
        keypad.set_key(key, false, interrupts);
    }

    pub fn frame_buffer(&mut self) -> &mut RgbaFrame {
        self.bus.ppu.frame_buffer()
    }
}

fn vec_to_bios_data(mut data: Vec<u8>) -> Box<BiosData> {
    data.resize(BIOS_SIZE, 0);
    Box::try_from(data.into_boxed_slice()).unwrap()
}
