use crate::emulator::bus::interrupts::{InterruptManager, Interrupts};
use crate::emulator::MemoryAddress;
use modular_bitfield::prelude::*;

pub const TIMER_IO_START: MemoryAddress = 0x0400_0100;
pub const TIMER_IO_END: MemoryAddress = 0x0400_010F;

const PRESCALER_PERIODS: [u64; 4] = [1, 64, 256, 1024];

/// The four 16-bit timers.
///
/// Ticked directly with the Δcycles of every CPU step; a shared prescaler pipeline
/// divides those cycles and distributes increments to the non-cascading channels.
pub struct Timers {
    timers: [Timer; 4],
    /// Leftover cycles per prescaler that did not yet amount to a full tick.
    prescaler_residue: [u64; 4],
}

impl Timers {
    const TIMER_INTERRUPTS: [Interrupts; 4] = [
        Interrupts::Timer0,
        Interrupts::Timer1,
        Interrupts::Timer2,
        Interrupts::Timer3,
    ];

    pub fn new() -> Self {
        Self {
            timers: Default::default(),
            prescaler_residue: [0; 4],
        }
    }

    pub fn read_registers(&self, addr: MemoryAddress) -> u8 {
        let timer = &self.timers[Self::addr_to_timer_idx(addr)];
        let byte = addr as usize % 4;

        match byte {
            // The counter itself; the reload latch is write-only
            0..=1 => timer.counter.to_le_bytes()[byte],
            2..=3 => {
                let raw: u16 = timer.control.into();
                raw.to_le_bytes()[byte - 2]
            }
            _ => unreachable!(),
        }
    }

    /// Stores to `TMxCNT_L` land in the reload latch, never in the live counter; the
    /// counter is only loaded from the latch on the enable bit's rising edge.
    pub fn write_registers(&mut self, addr: MemoryAddress, value: u8) {
        let timer = &mut self.timers[Self::addr_to_timer_idx(addr)];
        let byte = addr as usize % 4;

        match byte {
            0..=1 => {
                let mut bytes = timer.reload.to_le_bytes();
                bytes[byte] = value;
                timer.reload = u16::from_le_bytes(bytes);
            }
            2..=3 => {
                let was_enabled = timer.control.enabled();

                let mut raw: u16 = timer.control.into();
                let shift = (byte - 2) * 8;
                raw = (raw & !(0xFF << shift)) | ((value as u16) << shift);
                timer.control = raw.into();

                if timer.control.enabled() && !was_enabled {
                    timer.counter = timer.reload;
                }
            }
            _ => unreachable!(),
        }
    }

    /// Advance every channel by the cycles the last CPU step consumed.
    pub fn tick(&mut self, cycles: u64, interrupts: &mut InterruptManager) {
        let mut ticks = [0u64; 4];
        for (residue, (period, tick)) in self
            .prescaler_residue
            .iter_mut()
            .zip(PRESCALER_PERIODS.iter().zip(ticks.iter_mut()))
        {
            *residue += cycles;
            *tick = *residue / period;
            *residue %= period;
        }

        let mut previous_overflows = 0;
        for (idx, timer) in self.timers.iter_mut().enumerate() {
            if !timer.control.enabled() {
                previous_overflows = 0;
                continue;
            }

            let increments = if timer.control.cascade() {
                // Channel 0 has nothing below it to cascade from
                if idx == 0 {
                    0
                } else {
                    previous_overflows
                }
            } else {
                ticks[timer.control.prescaler() as usize]
            };

            let overflows = timer.advance(increments);

            if overflows > 0 && timer.control.irq_on_overflow() {
                interrupts.request_interrupt(Self::TIMER_INTERRUPTS[idx]);
            }

            previous_overflows = overflows;
        }
    }

    #[inline(always)]
    const fn addr_to_timer_idx(addr: MemoryAddress) -> usize {
        (addr - TIMER_IO_START) as usize / 4
    }
}

impl Default for Timers {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
struct Timer {
    control: TimerControl,
    counter: u16,
    reload: u16,
}

impl Timer {
    /// Apply `increments` counts and return how often the counter overflowed.
    ///
    /// An increment that overflows loads the reload value; any remaining increments
    /// continue counting up from it.
    fn advance(&mut self, increments: u64) -> u64 {
        if increments == 0 {
            return 0;
        }

        let mut value = self.counter as u64 + increments;
        let mut overflows = 0;

        if value > 0xFFFF {
            let past = value - 0x1_0000;
            let period = 0x1_0000 - self.reload as u64;

            overflows = 1 + past / period;
            value = self.reload as u64 + past % period;
        }

        self.counter = value as u16;
        overflows
    }
}

#[bitfield(bits = 16)]
#[repr(u16)]
#[derive(Debug, Default, Copy, Clone)]
pub struct TimerControl {
    pub prescaler: TimerPrescaler,
    /// When set the channel counts overflows of the channel below instead of cycles.
    pub cascade: bool,
    #[skip]
    unused: B3,
    pub irq_on_overflow: bool,
    pub enabled: bool,
    #[skip]
    unused2: u8,
}

#[derive(Debug, BitfieldSpecifier, Copy, Clone)]
#[bits = 2]
pub enum TimerPrescaler {
    C1 = 0b00,
    C64 = 0b01,
    C256 = 0b10,
    C1024 = 0b11,
}

#[cfg(test)]
mod tests {
    use super::{Timers, TIMER_IO_START};
    use crate::emulator::bus::interrupts::InterruptManager;

    fn write_16(timers: &mut Timers, addr: u32, value: u16) {
        let bytes = value.to_le_bytes();
        timers.write_registers(addr, bytes[0]);
        timers.write_registers(addr + 1, bytes[1]);
    }

    fn read_16(timers: &Timers, addr: u32) -> u16 {
        u16::from_le_bytes([timers.read_registers(addr), timers.read_registers(addr + 1)])
    }

    #[test]
    fn enable_edge_loads_reload_latch() {
        let mut timers = Timers::new();

        write_16(&mut timers, TIMER_IO_START, 0xFF00);
        // The latch is not the counter
        assert_eq!(read_16(&timers, TIMER_IO_START), 0);

        write_16(&mut timers, TIMER_IO_START + 2, 0x0080);
        assert_eq!(read_16(&timers, TIMER_IO_START), 0xFF00);

        // Writing the control again with the bit still set must not reload
        write_16(&mut timers, TIMER_IO_START, 0x1234);
        write_16(&mut timers, TIMER_IO_START + 2, 0x0080);
        assert_eq!(read_16(&timers, TIMER_IO_START), 0xFF00);
    }

    #[test]
    fn overflow_reloads_and_raises_irq() {
        let mut timers = Timers::new();
        let mut interrupts = InterruptManager::new();

        write_16(&mut timers, TIMER_IO_START, 0xFF00);
        // Enable with IRQ, prescaler 1
        write_16(&mut timers, TIMER_IO_START + 2, 0x00C0);

        // Start just below the overflow
        write_16(&mut timers, TIMER_IO_START, 0xFFFE);
        write_16(&mut timers, TIMER_IO_START + 2, 0x0000);
        write_16(&mut timers, TIMER_IO_START + 2, 0x00C0);
        write_16(&mut timers, TIMER_IO_START, 0xFF00);

        // 0xFFFE -> 0xFFFF -> overflow/reload 0xFF00 -> 0xFF01
        timers.tick(3, &mut interrupts);

        assert_eq!(read_16(&timers, TIMER_IO_START), 0xFF01);
        assert!(interrupts.flags.timer_0());
    }

    #[test]
    fn prescaler_divides_cycles() {
        let mut timers = Timers::new();
        let mut interrupts = InterruptManager::new();

        // Timer 1 at 1/64
        write_16(&mut timers, TIMER_IO_START + 4, 0);
        write_16(&mut timers, TIMER_IO_START + 6, 0x0081);

        timers.tick(63, &mut interrupts);
        assert_eq!(read_16(&timers, TIMER_IO_START + 4), 0);

        // The residue carries over
        timers.tick(1, &mut interrupts);
        assert_eq!(read_16(&timers, TIMER_IO_START + 4), 1);

        timers.tick(128, &mut interrupts);
        assert_eq!(read_16(&timers, TIMER_IO_START + 4), 3);
    }

    #[test]
    fn cascade_counts_single_overflow() {
        let mut timers = Timers::new();
        let mut interrupts = InterruptManager::new();

        // Timer 0 about to overflow every tick
        write_16(&mut timers, TIMER_IO_START, 0xFFFF);
        write_16(&mut timers, TIMER_IO_START + 2, 0x0080);
        // Timer 1 cascading
        write_16(&mut timers, TIMER_IO_START + 4, 0);
        write_16(&mut timers, TIMER_IO_START + 6, 0x0084);

        timers.tick(1, &mut interrupts);

        // One overflow below increments the cascade by exactly one
        assert_eq!(read_16(&timers, TIMER_IO_START + 4), 1);
    }
}
