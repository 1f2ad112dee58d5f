use std::{fmt, ops::Range};

use static_assertions::const_assert;

use crate::{
    RP2350_ARM_NS_FAMILY_ID, RP2350_ARM_S_FAMILY_ID, RP2350_RISCV_FAMILY_ID,
    model::{Bounds, Chip, FLASH_START, Model, Revision, SRAM_START, Variant},
    picoboot::PicobootCmd,
};

pub const ROM_END_RP2350: u32 = 0x00008000;
pub const FLASH_END_RP2350: u32 = 0x12000000;
pub const SRAM_END_RP2350: u32 = 0x20082000;

pub const XIP_SRAM_START_RP2350: u32 = 0x13ffc000;
pub const XIP_SRAM_END_RP2350: u32 = 0x14000000;

/// Size of the tail of the bootrom which can't be read back over PICOBOOT.
pub const UNREADABLE_ROM_SIZE: u32 = 0x200;

const_assert!(FLASH_START <= FLASH_END_RP2350);
const_assert!(SRAM_START <= SRAM_END_RP2350);
const_assert!(XIP_SRAM_START_RP2350 <= XIP_SRAM_END_RP2350);
const_assert!(UNREADABLE_ROM_SIZE <= ROM_END_RP2350);

pub(crate) const RP2350_BOUNDS: Bounds = Bounds {
    flash_start: FLASH_START,
    flash_end: FLASH_END_RP2350,
    sram_start: SRAM_START,
    sram_end: SRAM_END_RP2350,
    xip_sram_start: XIP_SRAM_START_RP2350,
    xip_sram_end: XIP_SRAM_END_RP2350,
};

const RP2350_PICOBOOT_CMDS: &[PicobootCmd] = &[
    PicobootCmd::ExclusiveAccess,
    PicobootCmd::Reboot,
    PicobootCmd::FlashErase,
    PicobootCmd::Read,
    PicobootCmd::Write,
    PicobootCmd::ExitXip,
    PicobootCmd::EnterCmdXip,
    PicobootCmd::Exec,
    PicobootCmd::Reboot2,
    PicobootCmd::GetInfo,
    PicobootCmd::OtpRead,
    PicobootCmd::OtpWrite,
];

pub type RomTail = [u8; UNREADABLE_ROM_SIZE as usize];

/// The true contents of the unreadable end of the RP2350 bootrom, one blob per
/// silicon revision.
///
/// These are shipped alongside the tool rather than read from the device, so
/// the tool hands them over with [`Model::with_rom_tails`]. A revision whose
/// blob is missing just has no data.
#[derive(Clone, Copy, Default)]
pub struct RomTails {
    pub a2: Option<&'static RomTail>,
    pub a3: Option<&'static RomTail>,
    pub a4: Option<&'static RomTail>,
}

impl RomTails {
    pub const NONE: RomTails = RomTails {
        a2: None,
        a3: None,
        a4: None,
    };

    pub const fn get(&self, revision: Revision) -> Option<&'static RomTail> {
        match revision {
            Revision::Rp2350A2 => self.a2,
            Revision::Rp2350A3 => self.a3,
            Revision::Rp2350A4 => self.a4,
            _ => None,
        }
    }
}

impl fmt::Debug for RomTails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RomTails")
            .field("a2", &self.a2.is_some())
            .field("a3", &self.a3.is_some())
            .field("a4", &self.a4.is_some())
            .finish()
    }
}

impl Model {
    /// A generic RP2350 with the usual 32K bootrom and no family id set yet.
    pub const fn rp2350() -> Self {
        Self::rp2350_with_rom_end(ROM_END_RP2350)
    }

    pub const fn rp2350_with_rom_end(rom_end: u32) -> Self {
        Self {
            variant: Variant::Rp2350,
            chip: Chip::Rp2350,
            name: if rom_end > 0x8000 {
                "RP2350(64k)"
            } else {
                Chip::Rp2350.name()
            },
            rom_end,
            picoboot_cmds: RP2350_PICOBOOT_CMDS,
            revision: None,
            family_id: None,
            rom_tails: &RomTails::NONE,
        }
    }

    pub const fn rp2350_arm_s() -> Self {
        Self::rp2350().preset_family_id(RP2350_ARM_S_FAMILY_ID)
    }

    pub const fn rp2350_arm_ns() -> Self {
        Self::rp2350().preset_family_id(RP2350_ARM_NS_FAMILY_ID)
    }

    pub const fn rp2350_riscv() -> Self {
        Self::rp2350().preset_family_id(RP2350_RISCV_FAMILY_ID)
    }

    const fn preset_family_id(mut self, family_id: u32) -> Self {
        self.family_id = Some(family_id);
        self
    }

    pub(crate) fn rp2350_unreadable_rom(&self) -> Range<u32> {
        self.rom_end.saturating_sub(UNREADABLE_ROM_SIZE)..self.rom_end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        MemoryType, ModelError, contains_unreadable_rom,
        model::ROM_START, model_from_family,
    };

    static A3_TAIL: RomTail = [0xa3; UNREADABLE_ROM_SIZE as usize];
    static TAILS: RomTails = RomTails {
        a3: Some(&A3_TAIL),
        ..RomTails::NONE
    };

    #[test]
    fn from_family_id_range() {
        for id in RP2350_ARM_S_FAMILY_ID..=RP2350_ARM_NS_FAMILY_ID {
            let model = model_from_family(id);
            assert_eq!(model.chip(), Chip::Rp2350);
            assert_eq!(model.name(), "RP2350");
            assert_eq!(model.family_id(), None);
            assert!(model.requires_block_loop());
            assert!(model.supports_partition_table());
            assert!(!model.supports_otp_v2());
            assert_eq!(model.rom_table_version(), Ok(2));
        }
    }

    #[test]
    fn sub_variants_preset_family_id() {
        assert_eq!(
            Model::rp2350_arm_s().family_id(),
            Some(RP2350_ARM_S_FAMILY_ID)
        );
        assert_eq!(
            Model::rp2350_arm_ns().family_id(),
            Some(RP2350_ARM_NS_FAMILY_ID)
        );
        assert_eq!(
            Model::rp2350_riscv().family_id(),
            Some(RP2350_RISCV_FAMILY_ID)
        );
        assert_eq!(
            Model::rp2350_riscv()
                .with_family_id(RP2350_ARM_S_FAMILY_ID)
                .unwrap_err(),
            ModelError::FamilyIdAlreadySet
        );
        for model in [
            Model::rp2350_arm_s(),
            Model::rp2350_arm_ns(),
            Model::rp2350_riscv(),
        ] {
            assert_eq!(model.chip(), Chip::Rp2350);
            assert!(model.supports_picoboot_cmd(PicobootCmd::OtpRead));
            assert!(model.requires_block_loop());
        }
    }

    #[test]
    fn sixty_four_k_rom() {
        let model = Model::rp2350_with_rom_end(0x10000);
        assert_eq!(model.name(), "RP2350(64k)");
        assert_eq!(model.get_memory_type(0x9000), MemoryType::Rom);
        assert_eq!(model.unreadable_rom_range(), Some(0xfe00..0x10000));
        assert_eq!(Model::rp2350().get_memory_type(0x9000), MemoryType::Invalid);
    }

    #[test]
    fn memory_types() {
        let model = Model::rp2350();
        for addr in [FLASH_START + 1, 0x11000000, FLASH_END_RP2350 - 1] {
            assert_eq!(model.get_memory_type(addr), MemoryType::Flash);
        }
        assert_eq!(model.get_memory_type(ROM_START), MemoryType::Rom);
        assert_eq!(model.get_memory_type(0x7fff), MemoryType::Rom);
        assert_eq!(model.get_memory_type(0x20081000), MemoryType::Sram);
        assert_eq!(model.get_memory_type(0x13ffd000), MemoryType::XipSram);
        assert_eq!(model.get_memory_type(0x15001000), MemoryType::Invalid);
        assert_eq!(model.get_memory_type(0x21000000), MemoryType::Invalid);
    }

    #[test]
    fn unreadable_rom_range() {
        let model = Model::rp2350_arm_ns();
        let rom_end = model.rom_end();
        assert_eq!(
            model.unreadable_rom_range(),
            Some(rom_end - 0x200..rom_end)
        );
        assert!(contains_unreadable_rom(rom_end - 0x200, 1, &model));
        assert!(!contains_unreadable_rom(rom_end - 0x201, 1, &model));
        assert!(!contains_unreadable_rom(rom_end, 1, &model));
    }

    #[test]
    fn unreadable_rom_data() {
        let model = Model::rp2350().with_rom_tails(&TAILS);
        assert_eq!(model.unreadable_rom_data(), None);

        let a3 = model.with_revision(Revision::Rp2350A3).unwrap();
        assert_eq!(a3.revision_name(), "A3");
        assert_eq!(a3.unreadable_rom_data(), Some(&A3_TAIL));

        let a4 = model.with_revision(Revision::Rp2350A4).unwrap();
        assert_eq!(a4.revision_name(), "A4");
        assert_eq!(a4.unreadable_rom_data(), None);

        let no_tails = Model::rp2350().with_revision(Revision::Rp2350A3).unwrap();
        assert_eq!(no_tails.unreadable_rom_data(), None);
    }

    #[test]
    fn revision_is_set_once() {
        let model = Model::rp2350()
            .with_revision(Revision::Rp2350A2)
            .unwrap();
        assert_eq!(
            model.with_revision(Revision::Rp2350A4).unwrap_err(),
            ModelError::RevisionAlreadySet
        );
        assert_eq!(model.revision(), Some(Revision::Rp2350A2));
    }

    #[test]
    fn rom_tails_lookup() {
        assert!(TAILS.get(Revision::Rp2350A3).is_some());
        assert!(TAILS.get(Revision::Rp2350A2).is_none());
        assert!(TAILS.get(Revision::Rp2040B2).is_none());
        assert_eq!(
            format!("{:?}", TAILS),
            "RomTails { a2: false, a3: true, a4: false }"
        );
    }
}
