use log::debug;
use thiserror::Error;

use crate::{
    ModelError,
    model::{Chip, MAIN_RAM_BANKED_END, MAIN_RAM_BANKED_START, Model},
};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AddressRangeType {
    /// May have contents
    Contents,
    /// Must be uninitialized
    NoContents,
    /// will be ignored
    Ignore,
}

/// A range of addresses, inclusive of both ends.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AddressRange {
    pub typ: AddressRangeType,
    pub to: u32,
    pub from: u32,
}

impl AddressRange {
    pub const fn new(from: u32, to: u32, typ: AddressRangeType) -> Self {
        Self { typ, to, from }
    }

    pub fn contains(&self, addr: u32) -> bool {
        self.from <= addr && addr <= self.to
    }
}

impl Default for AddressRange {
    fn default() -> Self {
        Self {
            typ: AddressRangeType::Ignore,
            to: 0,
            from: 0,
        }
    }
}

/// The ranges a flash image may touch: flash itself, plus RAM which a flash
/// image may only describe as uninitialized.
///
/// The order matters to code that merges ranges, so it is always flash, SRAM,
/// XIP SRAM and then, on an RP2040, the banked SRAM alias.
pub fn address_ranges_flash(model: &Model) -> Result<Vec<AddressRange>, ModelError> {
    let mut ranges = vec![
        AddressRange::new(
            model.flash_start()?,
            model.flash_end()?,
            AddressRangeType::Contents,
        ),
        AddressRange::new(
            model.sram_start()?,
            model.sram_end()?,
            AddressRangeType::NoContents,
        ),
        AddressRange::new(
            model.xip_sram_start()?,
            model.xip_sram_end()?,
            AddressRangeType::NoContents,
        ),
    ];
    if model.chip() == Chip::Rp2040 {
        ranges.push(AddressRange::new(
            MAIN_RAM_BANKED_START,
            MAIN_RAM_BANKED_END,
            AddressRangeType::NoContents,
        ));
    }
    Ok(ranges)
}

pub fn address_ranges_ram(model: &Model) -> Result<Vec<AddressRange>, ModelError> {
    Ok(vec![
        AddressRange::new(
            model.sram_start()?,
            model.sram_end()?,
            AddressRangeType::Contents,
        ),
        AddressRange::new(
            model.xip_sram_start()?,
            model.xip_sram_end()?,
            AddressRangeType::Contents,
        ),
        // for now we ignore the bootrom if present
        AddressRange::new(model.rom_start(), model.rom_end(), AddressRangeType::Ignore),
    ])
}

/// Does `[addr, addr + size)` touch the part of the bootrom that can't be read
/// back from the device?
pub fn contains_unreadable_rom(addr: u32, size: u32, model: &Model) -> bool {
    let unreadable = match model.unreadable_rom_range() {
        Some(unreadable) => unreadable,
        None => return false,
    };
    let (start, end) = (u64::from(unreadable.start), u64::from(unreadable.end));
    let addr = u64::from(addr);
    let addr_end = addr + u64::from(size);

    (addr >= start && addr < end)
        || (addr_end > start && addr_end <= end)
        || (addr < start && addr_end > end)
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AddressRangeError {
    #[error("Contents for uninitialized memory at {0:#08x}")]
    ContentsForUninitializedMemory(u32),
    #[error("Memory segment {0:#08x}->{1:#08x} is outside of valid address range for device")]
    SegmentInvalidForDevice(u32, u64),
}

pub trait AddressRangesExt<'a>: IntoIterator<Item = &'a AddressRange> + Clone {
    fn range_for(&self, addr: u32) -> Option<&'a AddressRange> {
        self.clone().into_iter().find(|r| r.contains(addr))
    }

    fn is_address_initialized(&self, addr: u32) -> bool {
        let range = if let Some(range) = self.range_for(addr) {
            range
        } else {
            return false;
        };

        matches!(range.typ, AddressRangeType::Contents)
    }

    /// Find the range holding all of `[addr, addr + size)`.
    fn check_address_range(
        &self,
        addr: u32,
        size: u32,
        uninitialized: bool,
    ) -> Result<AddressRange, AddressRangeError> {
        let end = u64::from(addr) + u64::from(size);
        for range in self.clone().into_iter() {
            if range.contains(addr) && u64::from(range.to) + 1 >= end {
                if range.typ == AddressRangeType::NoContents && !uninitialized {
                    return Err(AddressRangeError::ContentsForUninitializedMemory(addr));
                }
                debug!(
                    "{} segment {:#08x}->{:#08x}",
                    if uninitialized {
                        "Uninitialized"
                    } else {
                        "Mapped"
                    },
                    addr,
                    end,
                );
                return Ok(*range);
            }
        }
        Err(AddressRangeError::SegmentInvalidForDevice(addr, end))
    }
}

impl<'a, T> AddressRangesExt<'a> for T where T: IntoIterator<Item = &'a AddressRange> + Clone {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        LARGEST, RP2040_FAMILY_ID, UNKNOWN,
        model::{
            FLASH_END_RP2040, FLASH_END_RP2350, FLASH_START, ROM_END_RP2040, SRAM_END_RP2040,
            SRAM_END_RP2350, SRAM_START, XIP_SRAM_END_RP2040, XIP_SRAM_START_RP2040,
            XIP_SRAM_START_RP2350,
        },
        model_from_family,
    };

    #[test]
    fn rp2040_flash_ranges() {
        let ranges = address_ranges_flash(&model_from_family(RP2040_FAMILY_ID)).unwrap();
        assert_eq!(
            ranges,
            vec![
                AddressRange::new(FLASH_START, FLASH_END_RP2040, AddressRangeType::Contents),
                AddressRange::new(SRAM_START, SRAM_END_RP2040, AddressRangeType::NoContents),
                AddressRange::new(
                    XIP_SRAM_START_RP2040,
                    XIP_SRAM_END_RP2040,
                    AddressRangeType::NoContents
                ),
                AddressRange::new(
                    MAIN_RAM_BANKED_START,
                    MAIN_RAM_BANKED_END,
                    AddressRangeType::NoContents
                ),
            ]
        );
    }

    #[test]
    fn rp2350_flash_ranges_have_no_banked_sram() {
        let ranges = address_ranges_flash(&Model::rp2350_riscv()).unwrap();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0].to, FLASH_END_RP2350);
        assert_eq!(ranges[2].from, XIP_SRAM_START_RP2350);
    }

    #[test]
    fn ram_ranges() {
        let ranges = address_ranges_ram(&Model::rp2040()).unwrap();
        assert_eq!(
            ranges,
            vec![
                AddressRange::new(SRAM_START, SRAM_END_RP2040, AddressRangeType::Contents),
                AddressRange::new(
                    XIP_SRAM_START_RP2040,
                    XIP_SRAM_END_RP2040,
                    AddressRangeType::Contents
                ),
                AddressRange::new(0, ROM_END_RP2040, AddressRangeType::Ignore),
            ]
        );
    }

    #[test]
    fn largest_flash_ranges_cover_both_chips() {
        let largest = address_ranges_flash(&LARGEST).unwrap();
        for model in [Model::rp2040(), Model::rp2350()] {
            let ranges = address_ranges_flash(&model).unwrap();
            for (wide, narrow) in largest.iter().zip(&ranges) {
                assert!(wide.from <= narrow.from);
                assert!(wide.to >= narrow.to);
                assert_eq!(wide.typ, narrow.typ);
            }
        }
        assert_eq!(largest[1].to, SRAM_END_RP2350);
    }

    #[test]
    fn unknown_has_no_ranges() {
        assert!(matches!(
            address_ranges_flash(&UNKNOWN),
            Err(ModelError::NotPossible { .. })
        ));
        assert!(address_ranges_ram(&UNKNOWN).is_err());
    }

    #[test]
    fn unreadable_rom_overlaps() {
        let model = Model::rp2350();
        let start = model.rom_end() - 0x200;
        let end = model.rom_end();

        // Touching either edge from outside
        assert!(!contains_unreadable_rom(start - 0x10, 0x10, &model));
        assert!(!contains_unreadable_rom(end, 0x10, &model));
        // Overlapping the start
        assert!(contains_unreadable_rom(start - 0x10, 0x11, &model));
        // Overlapping the end
        assert!(contains_unreadable_rom(end - 1, 0x10, &model));
        // Inside
        assert!(contains_unreadable_rom(start + 0x10, 0x10, &model));
        // Spanning all of it
        assert!(contains_unreadable_rom(0, 0x10000, &model));
        assert!(contains_unreadable_rom(start, 0x200, &model));
    }

    #[test]
    fn unreadable_rom_only_on_rp2350() {
        for model in [Model::rp2040(), UNKNOWN, LARGEST] {
            assert!(!contains_unreadable_rom(0, u32::MAX, &model));
        }
    }

    #[test]
    fn ranges_ext() {
        let ranges = address_ranges_flash(&Model::rp2040()).unwrap();
        let ranges = ranges.as_slice();
        assert_eq!(
            ranges.range_for(0x21000010).map(|r| r.typ),
            Some(AddressRangeType::NoContents)
        );
        assert!(ranges.is_address_initialized(FLASH_START + 0x100));
        assert!(!ranges.is_address_initialized(SRAM_START));
        assert!(!ranges.is_address_initialized(0x30000000));

        assert_eq!(
            ranges.check_address_range(FLASH_START, 0x100, false),
            Ok(ranges[0])
        );
        assert_eq!(
            ranges.check_address_range(SRAM_START, 0x100, false),
            Err(AddressRangeError::ContentsForUninitializedMemory(SRAM_START))
        );
        assert_eq!(
            ranges.check_address_range(SRAM_START, 0x100, true),
            Ok(ranges[1])
        );
        assert_eq!(
            ranges.check_address_range(SRAM_END_RP2040, 0x100, true),
            Err(AddressRangeError::SegmentInvalidForDevice(
                SRAM_END_RP2040,
                u64::from(SRAM_END_RP2040) + 0x100
            ))
        );
    }
}
