use crate::emulator::bus::Bus;
use crate::emulator::cpu::CPU;
use crate::emulator::GBAEmulator;

/// A reference to the [GBAEmulator] with access to internal state, for debuggers and
/// the test harness.
#[repr(transparent)]
pub struct DebugEmulator<'a>(pub &'a mut GBAEmulator);

impl<'a> DebugEmulator<'a> {
    pub fn cpu(&mut self) -> &mut CPU {
        &mut self.0.cpu
    }

    pub fn bus(&mut self) -> &mut Bus {
        &mut self.0.bus
    }

    pub fn bus_and_cpu(&mut self) -> (&mut Bus, &mut CPU) {
        (&mut self.0.bus, &mut self.0.cpu)
    }
}
