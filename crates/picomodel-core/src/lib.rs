//! Chip and memory model for tools that talk to RP2040 and RP2350 devices.
//!
//! Resolve a [`Model`] once, from a UF2 family id with [`model_from_family`],
//! refine it with the silicon revision once the device has been probed, then
//! use it to classify addresses and to build the address range views that
//! read, write and verify logic works from.
//!
//! Nothing in this crate performs I/O.

use thiserror::Error;

pub mod address_range;
pub mod model;
pub mod picoboot;

pub use address_range::{
    AddressRange, AddressRangeType, AddressRangesExt, address_ranges_flash, address_ranges_ram,
    contains_unreadable_rom,
};
pub use model::{
    Chip, LARGEST, MemoryType, Model, Revision, RomTails, UNKNOWN, UnsupportedCmd,
    get_memory_type, model_from_family,
};
pub use picoboot::PicobootCmd;

// See https://github.com/microsoft/uf2/blob/master/utils/uf2families.json for list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
#[allow(non_camel_case_types)]
pub enum Family {
    /// Raspberry Pi RP2040
    RP2040 = 0xe48bff56,

    /// Raspberry Pi Microcontrollers: Absolute (unpartitioned) download
    RP2XXX_ABSOLUTE = 0xe48bff57,

    /// Raspberry Pi Microcontrollers: Data partition download
    RP2XXX_DATA = 0xe48bff58,

    /// Raspberry Pi RP2350, Secure Arm image
    RP2350_ARM_S = 0xe48bff59,

    /// Raspberry Pi RP2350, RISC-V image
    RP2350_RISCV = 0xe48bff5a,

    /// Raspberry Pi RP2350, Non-secure Arm image
    RP2350_ARM_NS = 0xe48bff5b,
}

impl Family {
    pub const fn id(self) -> u32 {
        self as u32
    }
}

impl Default for Family {
    fn default() -> Self {
        Self::RP2040
    }
}

impl TryFrom<u32> for Family {
    type Error = u32;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Ok(match id {
            0xe48bff56 => Family::RP2040,
            0xe48bff57 => Family::RP2XXX_ABSOLUTE,
            0xe48bff58 => Family::RP2XXX_DATA,
            0xe48bff59 => Family::RP2350_ARM_S,
            0xe48bff5a => Family::RP2350_RISCV,
            0xe48bff5b => Family::RP2350_ARM_NS,
            _ => return Err(id),
        })
    }
}

pub const RP2040_FAMILY_ID: u32 = Family::RP2040.id();
pub const RP2350_ARM_S_FAMILY_ID: u32 = Family::RP2350_ARM_S.id();
pub const RP2350_RISCV_FAMILY_ID: u32 = Family::RP2350_RISCV.id();
pub const RP2350_ARM_NS_FAMILY_ID: u32 = Family::RP2350_ARM_NS.id();

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The model does not know this fact, callers must not guess a value
    #[error("unknown {what} for {model}")]
    NotPossible {
        what: &'static str,
        model: &'static str,
    },
    #[error("Chip revision has already been set")]
    RevisionAlreadySet,
    #[error("Family id has already been set")]
    FamilyIdAlreadySet,
    #[error("Unknown chip revision '{0}'")]
    UnknownRevision(String),
    #[error("Unknown PICOBOOT command id {0:#04x}")]
    UnknownCommand(u8),
}
