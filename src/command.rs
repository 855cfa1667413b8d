//! Command framing: the exact byte sequence transmitted ahead of any data
//! payload.

/// One flash transaction header.
///
/// Addresses are 24-bit: chips in this family only decode the low 24 bits,
/// so anything above is truncated and the contents appear mirrored at
/// multiples of the chip size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Read Data (03h) starting at the given address.
    Read(u32),
    /// Write Enable (06h): set the write-enable latch.
    WriteEnable,
    /// Read Status Register (05h). The caller appends one dummy byte to
    /// the exchange to clock the status byte out.
    ReadStatus,
    /// Page Program (02h) at the given address; the data payload follows
    /// the frame.
    PageProgram(u32),
    /// Sector Erase (20h) of the sector containing the given address.
    SectorErase(u32),
}

impl Command {
    /// The one-byte instruction code.
    pub const fn opcode(&self) -> u8 {
        match self {
            Command::Read(_) => 0x03,
            Command::WriteEnable => 0x06,
            Command::ReadStatus => 0x05,
            Command::PageProgram(_) => 0x02,
            Command::SectorErase(_) => 0x20,
        }
    }

    /// Builds the frame to transmit before any payload: the opcode,
    /// followed by the big-endian 24-bit address where the command
    /// carries one.
    pub fn frame(&self) -> CommandFrame {
        match self {
            Command::Read(addr) | Command::PageProgram(addr) | Command::SectorErase(addr) => {
                let mut a = [0u8; 3];
                encode_addr(*addr, &mut a);
                CommandFrame {
                    buf: [self.opcode(), a[0], a[1], a[2]],
                    len: 4,
                }
            }
            Command::WriteEnable | Command::ReadStatus => CommandFrame {
                buf: [self.opcode(), 0, 0, 0],
                len: 1,
            },
        }
    }
}

/// A framed command header. Fixed capacity, no allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandFrame {
    buf: [u8; 4],
    len: usize,
}

impl CommandFrame {
    /// The bytes to clock out, opcode first.
    pub fn bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

/// Encodes the low 24 bits of `addr`, most significant byte first.
pub fn encode_addr(addr: u32, buf: &mut [u8; 3]) {
    buf[0] = (addr >> 16) as u8;
    buf[1] = (addr >> 8) as u8;
    buf[2] = addr as u8;
}

/// Decodes a big-endian 24-bit address, the inverse of [`encode_addr`].
pub fn decode_addr(buf: &[u8; 3]) -> u32 {
    (buf[0] as u32) << 16 | (buf[1] as u32) << 8 | buf[2] as u32
}
