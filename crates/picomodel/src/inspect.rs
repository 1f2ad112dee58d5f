use log::info;
use picomodel_core::{
    AddressRangeType, Model, ModelError, address_ranges_flash, address_ranges_ram,
    contains_unreadable_rom,
};

fn region(start: Result<u32, ModelError>, end: Result<u32, ModelError>) -> String {
    match (start, end) {
        (Ok(start), Ok(end)) => format!("{:#010x}-{:#010x}", start, end),
        (Err(err), _) | (_, Err(err)) => err.to_string(),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

pub fn info(model: &Model) -> Result<(), Box<dyn std::error::Error>> {
    info!("Device {}", model.name());

    let family_id = match model.family_id() {
        Some(family_id) => format!("{:#010x}", family_id),
        None => "not set".to_string(),
    };
    let rom_table = match model.rom_table_version() {
        Ok(version) => version.to_string(),
        Err(err) => err.to_string(),
    };
    let unreadable_rom = match model.unreadable_rom_range() {
        Some(range) => format!("{:#010x}-{:#010x}", range.start, range.end),
        None => "none".to_string(),
    };
    let cmds = model
        .picoboot_cmds()
        .iter()
        .map(|cmd| cmd.name())
        .collect::<Vec<_>>()
        .join(", ");

    println!("chip:             {}", model.chip());
    println!("revision:         {}", model.revision_name());
    println!("family id:        {}", family_id);
    println!(
        "rom:              {:#010x}-{:#010x}",
        model.rom_start(),
        model.rom_end()
    );
    println!(
        "flash:            {}",
        region(model.flash_start(), model.flash_end())
    );
    println!(
        "sram:             {}",
        region(model.sram_start(), model.sram_end())
    );
    println!(
        "xip sram:         {}",
        region(model.xip_sram_start(), model.xip_sram_end())
    );
    println!("unreadable rom:   {}", unreadable_rom);
    println!("rom table:        {}", rom_table);
    println!(
        "partition table:  {}",
        yes_no(model.supports_partition_table())
    );
    println!("block loop:       {}", yes_no(model.requires_block_loop()));
    println!("otp v2:           {}", yes_no(model.supports_otp_v2()));
    println!("picoboot:         {}", cmds);

    Ok(())
}

pub fn classify(model: &Model, addresses: &[u32]) -> Result<(), Box<dyn std::error::Error>> {
    info!("Classifying addresses for {}", model.name());

    for &addr in addresses {
        if contains_unreadable_rom(addr, 1, model) {
            println!("{:#010x} {} (unreadable)", addr, model.get_memory_type(addr));
        } else {
            println!("{:#010x} {}", addr, model.get_memory_type(addr));
        }
    }

    Ok(())
}

pub fn ranges(model: &Model, ram: bool) -> Result<(), Box<dyn std::error::Error>> {
    let ranges = if ram {
        info!("RAM image ranges for {}", model.name());
        address_ranges_ram(model)?
    } else {
        info!("Flash image ranges for {}", model.name());
        address_ranges_flash(model)?
    };

    for range in ranges {
        let typ = match range.typ {
            AddressRangeType::Contents => "contents",
            AddressRangeType::NoContents => "no contents",
            AddressRangeType::Ignore => "ignore",
        };
        println!("{:#010x}-{:#010x} {}", range.from, range.to, typ);
    }

    Ok(())
}
