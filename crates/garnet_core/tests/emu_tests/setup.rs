use garnet_core::emulator::cartridge::Cartridge;
use garnet_core::emulator::{EmuOptions, GBAEmulator};

/// Assemble a list of ARM opcodes into a bootable in-memory cartridge and wrap it in a
/// BIOS-less emulator. Execution starts at the first opcode.
pub fn emu_with_program(instructions: &[u32]) -> GBAEmulator {
    let mut rom = Vec::with_capacity(instructions.len() * 4);
    for instruction in instructions {
        rom.extend_from_slice(&instruction.to_le_bytes());
    }

    GBAEmulator::new(Cartridge::new(rom), EmuOptions::default())
}

/// Pack pairs of Thumb opcodes into the words of a program image.
pub fn thumb_words(halfwords: &[u16]) -> Vec<u32> {
    halfwords
        .chunks(2)
        .map(|pair| {
            let low = pair[0] as u32;
            let high = pair.get(1).copied().unwrap_or(0) as u32;

            low | (high << 16)
        })
        .collect()
}
