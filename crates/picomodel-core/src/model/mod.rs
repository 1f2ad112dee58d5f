use std::{fmt, ops::Range, str::FromStr};

use log::{debug, warn};
use thiserror::Error;

use crate::{
    ModelError, RP2040_FAMILY_ID, RP2350_ARM_NS_FAMILY_ID, RP2350_ARM_S_FAMILY_ID,
    picoboot::PicobootCmd,
};

pub use rp2040::{
    FLASH_END_RP2040, MAIN_RAM_BANKED_END, MAIN_RAM_BANKED_START, ROM_END_RP2040,
    SRAM_END_RP2040, XIP_SRAM_END_RP2040, XIP_SRAM_START_RP2040,
};
pub use rp2350::{
    FLASH_END_RP2350, ROM_END_RP2350, RomTail, RomTails, SRAM_END_RP2350, UNREADABLE_ROM_SIZE,
    XIP_SRAM_END_RP2350, XIP_SRAM_START_RP2350,
};

pub mod rp2040;
pub mod rp2350;

pub const ROM_START: u32 = 0x00000000;
pub const FLASH_START: u32 = 0x10000000;
pub const SRAM_START: u32 = 0x20000000;

/// ROM visible on a chip we know nothing about, just enough to read the id bytes
const UNKNOWN_ROM_END: u32 = 0x100;

/// Shared model for devices that could not be identified.
pub static UNKNOWN: Model = Model::unknown();

/// Shared model with the widest bounds of any known chip, for probing
/// addresses before the chip is known.
pub static LARGEST: Model = Model::generic();

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MemoryType {
    Rom,
    Flash,
    Sram,
    /// RP2040 banked SRAM alias
    SramUnstriped,
    XipSram,
    Invalid,
}

impl MemoryType {
    pub const fn name(self) -> &'static str {
        match self {
            MemoryType::Rom => "rom",
            MemoryType::Flash => "flash",
            MemoryType::Sram => "sram",
            MemoryType::SramUnstriped => "sram_unstriped",
            MemoryType::XipSram => "xip_sram",
            MemoryType::Invalid => "invalid",
        }
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Chip {
    Rp2040,
    Rp2350,
    Unknown,
}

impl Chip {
    pub const fn name(self) -> &'static str {
        match self {
            Chip::Rp2040 => "RP2040",
            Chip::Rp2350 => "RP2350",
            Chip::Unknown => "RP-series",
        }
    }
}

impl fmt::Display for Chip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Silicon revision, as found by probing the bootrom.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Revision {
    Rp2040B0,
    Rp2040B1,
    Rp2040B2,
    Rp2350A2,
    Rp2350A3,
    Rp2350A4,
}

impl Revision {
    pub const fn chip(self) -> Chip {
        match self {
            Revision::Rp2040B0 | Revision::Rp2040B1 | Revision::Rp2040B2 => Chip::Rp2040,
            Revision::Rp2350A2 | Revision::Rp2350A3 | Revision::Rp2350A4 => Chip::Rp2350,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Revision::Rp2040B0 => "B0",
            Revision::Rp2040B1 => "B1",
            Revision::Rp2040B2 => "B2",
            Revision::Rp2350A2 => "A2",
            Revision::Rp2350A3 => "A3",
            Revision::Rp2350A4 => "A4",
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Revision {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "b0" => Revision::Rp2040B0,
            "b1" => Revision::Rp2040B1,
            "b2" => Revision::Rp2040B2,
            "a2" => Revision::Rp2350A2,
            "a3" => Revision::Rp2350A3,
            "a4" => Revision::Rp2350A4,
            _ => return Err(ModelError::UnknownRevision(s.to_string())),
        })
    }
}

/// Inclusive bounds of the flash, SRAM and XIP SRAM regions of a chip.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Bounds {
    pub flash_start: u32,
    pub flash_end: u32,
    pub sram_start: u32,
    pub sram_end: u32,
    pub xip_sram_start: u32,
    pub xip_sram_end: u32,
}

const fn min(a: u32, b: u32) -> u32 {
    if a < b { a } else { b }
}

const fn max(a: u32, b: u32) -> u32 {
    if a > b { a } else { b }
}

impl Bounds {
    const fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            flash_start: min(self.flash_start, other.flash_start),
            flash_end: max(self.flash_end, other.flash_end),
            sram_start: min(self.sram_start, other.sram_start),
            sram_end: max(self.sram_end, other.sram_end),
            xip_sram_start: min(self.xip_sram_start, other.xip_sram_start),
            xip_sram_end: max(self.xip_sram_end, other.xip_sram_end),
        }
    }
}

const GENERIC_BOUNDS: Bounds = rp2040::RP2040_BOUNDS.union(&rp2350::RP2350_BOUNDS);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Variant {
    Unknown,
    Generic,
    Rp2040,
    Rp2350,
}

/// A PICOBOOT command the device does not accept.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
#[error("{device} does not support the {cmd} command")]
pub struct UnsupportedCmd {
    pub device: &'static str,
    pub cmd: PicobootCmd,
}

/// Details of a specific chip.
///
/// Stock models come from a family id via [`model_from_family`]. Once the
/// device has been probed the model is refined with [`Model::with_revision`]
/// and [`Model::with_family_id`], each of which may succeed at most once. A
/// model is a plain value, so a fully identified one can be copied to any
/// thread that needs it.
#[derive(Copy, Clone, Debug)]
pub struct Model {
    variant: Variant,
    chip: Chip,
    name: &'static str,
    rom_end: u32,
    picoboot_cmds: &'static [PicobootCmd],
    revision: Option<Revision>,
    family_id: Option<u32>,
    rom_tails: &'static RomTails,
}

impl Model {
    pub const fn unknown() -> Self {
        Self {
            variant: Variant::Unknown,
            chip: Chip::Unknown,
            name: Chip::Unknown.name(),
            rom_end: UNKNOWN_ROM_END,
            picoboot_cmds: &[],
            revision: None,
            family_id: None,
            rom_tails: &RomTails::NONE,
        }
    }

    /// Unknown chip, but with memory regions wide enough to cover every chip
    /// we know about.
    pub const fn generic() -> Self {
        Self {
            variant: Variant::Generic,
            ..Self::unknown()
        }
    }

    pub fn chip(&self) -> Chip {
        self.chip
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn revision(&self) -> Option<Revision> {
        self.revision
    }

    pub fn family_id(&self) -> Option<u32> {
        self.family_id
    }

    pub fn rom_start(&self) -> u32 {
        ROM_START
    }

    pub fn rom_end(&self) -> u32 {
        self.rom_end
    }

    pub fn picoboot_cmds(&self) -> &'static [PicobootCmd] {
        self.picoboot_cmds
    }

    /// Returns this model with its silicon revision set.
    pub fn with_revision(self, revision: Revision) -> Result<Self, ModelError> {
        if self.revision.is_some() {
            return Err(ModelError::RevisionAlreadySet);
        }
        if revision.chip() != self.chip {
            warn!(
                "Revision {} is not a revision of the {}",
                revision, self.name
            );
        }
        debug!("{} is revision {}", self.name, revision);
        Ok(Self {
            revision: Some(revision),
            ..self
        })
    }

    /// Returns this model with its family id set.
    pub fn with_family_id(self, family_id: u32) -> Result<Self, ModelError> {
        if self.family_id.is_some() {
            return Err(ModelError::FamilyIdAlreadySet);
        }
        debug!("{} has family id {:#010x}", self.name, family_id);
        Ok(Self {
            family_id: Some(family_id),
            ..self
        })
    }

    pub fn with_rom_tails(self, rom_tails: &'static RomTails) -> Self {
        Self { rom_tails, ..self }
    }

    fn bounds(&self) -> Option<&'static Bounds> {
        match self.variant {
            Variant::Unknown => None,
            Variant::Generic => Some(&GENERIC_BOUNDS),
            Variant::Rp2040 => Some(&rp2040::RP2040_BOUNDS),
            Variant::Rp2350 => Some(&rp2350::RP2350_BOUNDS),
        }
    }

    fn bound(&self, what: &'static str, f: fn(&Bounds) -> u32) -> Result<u32, ModelError> {
        self.bounds().map(f).ok_or(ModelError::NotPossible {
            what,
            model: self.name,
        })
    }

    /// Classify an address. All regions are inclusive of their ends.
    pub fn get_memory_type(&self, addr: u32) -> MemoryType {
        if self.variant == Variant::Rp2040
            && (MAIN_RAM_BANKED_START..=MAIN_RAM_BANKED_END).contains(&addr)
        {
            return MemoryType::SramUnstriped;
        }
        if let Some(b) = self.bounds() {
            if (b.flash_start..=b.flash_end).contains(&addr) {
                return MemoryType::Flash;
            }
            if (b.sram_start..=b.sram_end).contains(&addr) {
                return MemoryType::Sram;
            }
            if (b.xip_sram_start..=b.xip_sram_end).contains(&addr) {
                return MemoryType::XipSram;
            }
        }
        if (self.rom_start()..=self.rom_end).contains(&addr) {
            return MemoryType::Rom;
        }
        MemoryType::Invalid
    }

    pub fn supports_picoboot_cmd(&self, cmd: PicobootCmd) -> bool {
        self.picoboot_cmds.contains(&cmd)
    }

    /// Like [`Model::supports_picoboot_cmd`], but names the device that
    /// rejected the command.
    pub fn check_picoboot_cmd(&self, cmd: PicobootCmd) -> Result<(), UnsupportedCmd> {
        if self.supports_picoboot_cmd(cmd) {
            Ok(())
        } else {
            Err(UnsupportedCmd {
                device: self.name,
                cmd,
            })
        }
    }

    /// Checks every command in order, stopping at the first unsupported one.
    pub fn check_picoboot_cmds<I>(&self, cmds: I) -> Result<(), UnsupportedCmd>
    where
        I: IntoIterator<Item = PicobootCmd>,
    {
        cmds.into_iter()
            .try_for_each(|cmd| self.check_picoboot_cmd(cmd))
    }

    pub fn supports_partition_table(&self) -> bool {
        self.variant == Variant::Rp2350
    }

    pub fn supports_otp_v2(&self) -> bool {
        false
    }

    pub fn requires_block_loop(&self) -> bool {
        self.variant == Variant::Rp2350
    }

    pub fn rom_table_version(&self) -> Result<u8, ModelError> {
        match self.variant {
            Variant::Rp2040 => Ok(1),
            Variant::Rp2350 => Ok(2),
            Variant::Unknown | Variant::Generic => Err(ModelError::NotPossible {
                what: "rom table version",
                model: self.name,
            }),
        }
    }

    pub fn flash_start(&self) -> Result<u32, ModelError> {
        self.bound("flash start", |b| b.flash_start)
    }

    pub fn flash_end(&self) -> Result<u32, ModelError> {
        self.bound("flash end", |b| b.flash_end)
    }

    pub fn sram_start(&self) -> Result<u32, ModelError> {
        self.bound("sram start", |b| b.sram_start)
    }

    pub fn sram_end(&self) -> Result<u32, ModelError> {
        self.bound("sram end", |b| b.sram_end)
    }

    pub fn xip_sram_start(&self) -> Result<u32, ModelError> {
        self.bound("xip sram start", |b| b.xip_sram_start)
    }

    pub fn xip_sram_end(&self) -> Result<u32, ModelError> {
        self.bound("xip sram end", |b| b.xip_sram_end)
    }

    /// "Unknown" unless a revision of this model's chip has been set.
    pub fn revision_name(&self) -> &'static str {
        match self.revision {
            Some(revision) if revision.chip() == self.chip => revision.name(),
            _ => "Unknown",
        }
    }

    /// The end of the bootrom that reads back wrong over PICOBOOT.
    pub fn unreadable_rom_range(&self) -> Option<Range<u32>> {
        match self.variant {
            Variant::Rp2350 => Some(self.rp2350_unreadable_rom()),
            _ => None,
        }
    }

    pub fn unreadable_rom_data(&self) -> Option<&'static RomTail> {
        match self.variant {
            Variant::Rp2350 => self.rom_tails.get(self.revision?),
            _ => None,
        }
    }
}

/// Inclusive of ends.
pub fn get_memory_type(addr: u32, model: &Model) -> MemoryType {
    model.get_memory_type(addr)
}

/// Picks a stock model for a UF2 family id.
///
/// All of the RP2350 family ids give the same generic RP2350, since which of
/// them a device is running can't be told until it has been probed.
pub fn model_from_family(family_id: u32) -> Model {
    let model = if family_id == RP2040_FAMILY_ID {
        Model::rp2040()
    } else if (RP2350_ARM_S_FAMILY_ID..=RP2350_ARM_NS_FAMILY_ID).contains(&family_id) {
        Model::rp2350()
    } else {
        UNKNOWN
    };
    debug!("Family id {:#010x} is {}", family_id, model.name);
    model
}
