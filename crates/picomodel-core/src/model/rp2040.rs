use static_assertions::const_assert;

use crate::{
    RP2040_FAMILY_ID,
    model::{Bounds, Chip, FLASH_START, Model, RomTails, SRAM_START, Variant},
    picoboot::PicobootCmd,
};

pub const ROM_END_RP2040: u32 = 0x00004000;
pub const FLASH_END_RP2040: u32 = 0x11000000;
pub const SRAM_END_RP2040: u32 = 0x20042000;

pub const XIP_SRAM_START_RP2040: u32 = 0x15000000;
pub const XIP_SRAM_END_RP2040: u32 = 0x15004000;

// Non striped alias of the four main SRAM banks
pub const MAIN_RAM_BANKED_START: u32 = 0x21000000;
pub const MAIN_RAM_BANKED_END: u32 = 0x21040000;

const_assert!(FLASH_START <= FLASH_END_RP2040);
const_assert!(SRAM_START <= SRAM_END_RP2040);
const_assert!(XIP_SRAM_START_RP2040 <= XIP_SRAM_END_RP2040);
const_assert!(MAIN_RAM_BANKED_START <= MAIN_RAM_BANKED_END);

pub(crate) const RP2040_BOUNDS: Bounds = Bounds {
    flash_start: FLASH_START,
    flash_end: FLASH_END_RP2040,
    sram_start: SRAM_START,
    sram_end: SRAM_END_RP2040,
    xip_sram_start: XIP_SRAM_START_RP2040,
    xip_sram_end: XIP_SRAM_END_RP2040,
};

const RP2040_PICOBOOT_CMDS: &[PicobootCmd] = &[
    PicobootCmd::ExclusiveAccess,
    PicobootCmd::Reboot,
    PicobootCmd::FlashErase,
    PicobootCmd::Read,
    PicobootCmd::Write,
    PicobootCmd::ExitXip,
    PicobootCmd::EnterCmdXip,
    PicobootCmd::Exec,
    PicobootCmd::VectorizeFlash,
];

impl Model {
    /// An RP2040, with the RP2040 family id already set.
    pub const fn rp2040() -> Self {
        Self {
            variant: Variant::Rp2040,
            chip: Chip::Rp2040,
            name: Chip::Rp2040.name(),
            rom_end: ROM_END_RP2040,
            picoboot_cmds: RP2040_PICOBOOT_CMDS,
            revision: None,
            family_id: Some(RP2040_FAMILY_ID),
            rom_tails: &RomTails::NONE,
        }
    }
}
