use crate::emulator::bus::interrupts::{InterruptManager, Interrupts};
use crate::emulator::MemoryAddress;
use crate::InputKeys;

pub const KEYSTATUS_START: MemoryAddress = 0x0400_0130;
pub const KEYSTATUS_END: MemoryAddress = 0x0400_0131;
pub const KEYCONTROL_START: MemoryAddress = 0x0400_0132;
pub const KEYCONTROL_END: MemoryAddress = 0x0400_0133;

/// KEYINPUT and KEYCNT.
///
/// The status register is active low: a cleared bit is a held button. The front end
/// updates it between frames through [Self::set_key].
pub struct Keypad {
    pub status: KeypadStatus,
    pub interrupt_control: KeypadInterruptControl,
}

impl Default for Keypad {
    fn default() -> Self {
        Keypad {
            status: KeypadStatus::default(),
            interrupt_control: KeypadInterruptControl::default(),
        }
    }
}

impl Keypad {
    pub fn set_key(&mut self, key: InputKeys, pressed: bool, interrupts: &mut InterruptManager) {
        let released = !pressed;

        match key {
            InputKeys::A => self.status.set_button_a(released),
            InputKeys::B => self.status.set_button_b(released),
            InputKeys::Select => self.status.set_select(released),
            InputKeys::Start => self.status.set_start(released),
            InputKeys::Right => self.status.set_right(released),
            InputKeys::Left => self.status.set_left(released),
            InputKeys::Up => self.status.set_up(released),
            InputKeys::Down => self.status.set_down(released),
            InputKeys::ShoulderRight => self.status.set_shoulder_right(released),
            InputKeys::ShoulderLeft => self.status.set_shoulder_left(released),
        }

        self.check_interrupt(interrupts);
    }

    pub fn read_status(&self, address: MemoryAddress) -> u8 {
        let raw: u16 = self.status.into();
        raw.to_le_bytes()[(address - KEYSTATUS_START) as usize]
    }

    pub fn read_control(&self, address: MemoryAddress) -> u8 {
        let raw: u16 = self.interrupt_control.into();
        raw.to_le_bytes()[(address - KEYCONTROL_START) as usize]
    }

    pub fn write_control(&mut self, address: MemoryAddress, value: u8) {
        let mut raw: u16 = self.interrupt_control.into();
        let byte = (address - KEYCONTROL_START) as usize;

        raw = (raw & !(0xFF << (byte * 8))) | ((value as u16) << (byte * 8));
        self.interrupt_control = raw.into();
    }

    /// Raise the keypad interrupt when the KEYCNT condition over the selected buttons
    /// holds: all of them in AND mode, at least one in OR mode.
    fn check_interrupt(&self, interrupts: &mut InterruptManager) {
        if !self.interrupt_control.irq_enable() {
            return;
        }

        let control: u16 = self.interrupt_control.into();
        let selected = control & 0x3FF;
        // Invert the active-low status so a set bit means pressed
        let status: u16 = self.status.into();
        let pressed = !status & 0x3FF;

        let triggered = if self.interrupt_control.irq_condition_and() {
            pressed & selected == selected
        } else {
            pressed & selected != 0
        };

        if triggered {
            interrupts.request_interrupt(Interrupts::Keypad);
        }
    }
}

/// Button state, read only from the bus side. `1` is released, `0` is pressed.
#[modular_bitfield::bitfield(bits = 16)]
#[repr(u16)]
#[derive(Debug, Copy, Clone)]
pub struct KeypadStatus {
    pub button_a: bool,
    pub button_b: bool,
    pub select: bool,
    pub start: bool,
    pub right: bool,
    pub left: bool,
    pub up: bool,
    pub down: bool,
    pub shoulder_right: bool,
    pub shoulder_left: bool,
    #[skip]
    unused: modular_bitfield::prelude::B6,
}

impl Default for KeypadStatus {
    fn default() -> Self {
        // Everything released
        0x03FF.into()
    }
}

#[modular_bitfield::bitfield(bits = 16)]
#[repr(u16)]
#[derive(Debug, Copy, Clone)]
pub struct KeypadInterruptControl {
    pub button_a: bool,
    pub button_b: bool,
    pub select: bool,
    pub start: bool,
    pub right: bool,
    pub left: bool,
    pub up: bool,
    pub down: bool,
    pub shoulder_right: bool,
    pub shoulder_left: bool,
    #[skip]
    unused: modular_bitfield::prelude::B4,
    pub irq_enable: bool,
    /// `false`: logical OR over the selected buttons, `true`: logical AND.
    pub irq_condition_and: bool,
}

impl Default for KeypadInterruptControl {
    fn default() -> Self {
        0.into()
    }
}

#[cfg(test)]
mod tests {
    use super::Keypad;
    use crate::emulator::bus::interrupts::InterruptManager;
    use crate::InputKeys;

    #[test]
    fn status_is_active_low() {
        let mut keypad = Keypad::default();
        let mut interrupts = InterruptManager::new();

        let raw: u16 = keypad.status.into();
        assert_eq!(raw, 0x03FF);

        keypad.set_key(InputKeys::A, true, &mut interrupts);
        let raw: u16 = keypad.status.into();
        assert_eq!(raw, 0x03FE);

        keypad.set_key(InputKeys::A, false, &mut interrupts);
        let raw: u16 = keypad.status.into();
        assert_eq!(raw, 0x03FF);
    }

    #[test]
    fn or_condition_raises_interrupt() {
        let mut keypad = Keypad::default();
        let mut interrupts = InterruptManager::new();

        // Select button A, enable the IRQ, OR condition
        keypad.interrupt_control = 0x4001.into();
        keypad.set_key(InputKeys::A, true, &mut interrupts);

        assert!(interrupts.flags.keypad());
    }
}
