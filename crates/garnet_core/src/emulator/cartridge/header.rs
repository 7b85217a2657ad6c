use parsing::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    Japan,
    Europe,
    French,
    Spanish,
    Usa,
    German,
    Italian,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartBackupId {
    /// Either 512B or 8KB of EEPROM
    EEProm,
    /// 32KB of SRAM
    Sram,
    /// 64KB of Flash
    Flash64,
    /// 128KB of Flash
    Flash128,
}

/// The cartridge header of a GBA ROM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartridgeHeader {
    /// Uppercase ASCII, max 12 characters
    pub game_title: String,
    /// Uppercase ASCII, max 4 characters
    pub game_code: String,
    /// Uppercase ASCII, max 2 characters
    pub maker_code: String,
    /// 0x00 for current GBA models
    pub main_unit_code: u8,
    pub software_version: u8,
    pub complement_checksum: u8,
    /// The save-memory type, found by scanning the ROM for its ID string.
    pub backup_id: CartBackupId,
}

impl CartridgeHeader {
    /// Parse the header out of the full ROM image.
    pub fn new(rom: &[u8]) -> Self {
        let (calculated, read) = (Self::calculate_checksum(rom), parse_complement_checksum(rom));

        if calculated != read {
            log::warn!(
                "Header checksum mismatch (calculated {:#04X}, read {:#04X}), continuing cartridge load",
                calculated,
                read
            );
        }

        Self {
            game_title: parse_title(rom),
            game_code: parse_game_code(rom),
            maker_code: parse_maker_code(rom),
            main_unit_code: rom[0xB3],
            software_version: rom[0xBC],
            complement_checksum: read,
            backup_id: find_backup_id(rom).unwrap_or(CartBackupId::Flash64),
        }
    }

    pub fn region(&self) -> Option<Region> {
        parse_region(&self.game_code)
    }

    fn calculate_checksum(rom: &[u8]) -> u8 {
        let checksum = rom[0xA0..0xBC].iter().fold(0u8, |acc, &value| acc.wrapping_sub(value));

        checksum.wrapping_sub(0x19)
    }
}

mod parsing {
    use crate::emulator::cartridge::header::{CartBackupId, Region};

    pub fn parse_title(rom: &[u8]) -> String {
        String::from_utf8_lossy(&rom[0xA0..0xAC])
            .trim_matches(char::from(0))
            .to_string()
    }

    pub fn parse_game_code(rom: &[u8]) -> String {
        String::from_utf8_lossy(&rom[0xAC..0xB0])
            .trim_matches(char::from(0))
            .to_string()
    }

    pub fn parse_maker_code(rom: &[u8]) -> String {
        String::from_utf8_lossy(&rom[0xB0..0xB2])
            .trim_matches(char::from(0))
            .to_string()
    }

    pub fn parse_complement_checksum(rom: &[u8]) -> u8 {
        rom[0xBD]
    }

    pub fn parse_region(game_code: &str) -> Option<Region> {
        match game_code.chars().nth(3)? {
            'J' => Region::Japan,
            'P' => Region::Europe,
            'F' => Region::French,
            'S' => Region::Spanish,
            'E' => Region::Usa,
            'D' => Region::German,
            'I' => Region::Italian,
            _ => {
                log::info!("Unknown region code in {}, defaulting to Japan", game_code);
                Region::Japan
            }
        }
        .into()
    }

    /// Scan the ROM for the backup ID string the save libraries embed.
    pub fn find_backup_id(rom: &[u8]) -> Option<CartBackupId> {
        use regex::bytes::Regex;
        let re = Regex::new(r#"(EEPROM|SRAM|FLASH|FLASH512|FLASH1M)_V(\d{3})"#).unwrap();

        let capture = re.captures(rom)?;

        let id = match std::str::from_utf8(&capture[1]).unwrap() {
            "EEPROM" => CartBackupId::EEProm,
            "SRAM" => CartBackupId::Sram,
            "FLASH" | "FLASH512" => CartBackupId::Flash64,
            "FLASH1M" => CartBackupId::Flash128,
            other => panic!("What is this backup ID? {}", other),
        };

        Some(id)
    }
}
