use std::fmt;

use crate::ModelError;

/// PICOBOOT command ids, as sent in the `bCmdId` field of a command packet.
///
/// Ids with the top bit set carry a device to host data phase.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PicobootCmd {
    ExclusiveAccess = 0x01,
    Reboot = 0x02,
    FlashErase = 0x03,
    Read = 0x84,
    Write = 0x05,
    ExitXip = 0x06,
    EnterCmdXip = 0x07,
    Exec = 0x08,
    /// RP2040 only
    VectorizeFlash = 0x09,
    /// RP2350 only
    Reboot2 = 0x0a,
    /// RP2350 only
    GetInfo = 0x8b,
    /// RP2350 only
    OtpRead = 0x8c,
    /// RP2350 only
    OtpWrite = 0x0d,
}

impl PicobootCmd {
    pub const ALL: &'static [PicobootCmd] = &[
        PicobootCmd::ExclusiveAccess,
        PicobootCmd::Reboot,
        PicobootCmd::FlashErase,
        PicobootCmd::Read,
        PicobootCmd::Write,
        PicobootCmd::ExitXip,
        PicobootCmd::EnterCmdXip,
        PicobootCmd::Exec,
        PicobootCmd::VectorizeFlash,
        PicobootCmd::Reboot2,
        PicobootCmd::GetInfo,
        PicobootCmd::OtpRead,
        PicobootCmd::OtpWrite,
    ];

    pub const fn id(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            PicobootCmd::ExclusiveAccess => "exclusive-access",
            PicobootCmd::Reboot => "reboot",
            PicobootCmd::FlashErase => "flash-erase",
            PicobootCmd::Read => "read",
            PicobootCmd::Write => "write",
            PicobootCmd::ExitXip => "exit-xip",
            PicobootCmd::EnterCmdXip => "enter-cmd-xip",
            PicobootCmd::Exec => "exec",
            PicobootCmd::VectorizeFlash => "vectorize-flash",
            PicobootCmd::Reboot2 => "reboot2",
            PicobootCmd::GetInfo => "get-info",
            PicobootCmd::OtpRead => "otp-read",
            PicobootCmd::OtpWrite => "otp-write",
        }
    }
}

impl fmt::Display for PicobootCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for PicobootCmd {
    type Error = ModelError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        PicobootCmd::ALL
            .iter()
            .copied()
            .find(|cmd| cmd.id() == id)
            .ok_or(ModelError::UnknownCommand(id))
    }
}
