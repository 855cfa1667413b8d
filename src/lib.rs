#![no_std]
//! Platform-agnostic driver for 25-series SPI NOR flash chips using
//! [embedded-hal](https://github.com/rust-embedded/embedded-hal).
//!
//! The driver owns the chip-select line itself (it consumes an
//! [`SpiBus`](embedded_hal::spi::SpiBus) plus an
//! [`OutputPin`](embedded_hal::digital::OutputPin), not an `SpiDevice`),
//! because the chips require a guard interval around every select-line
//! transition and a write-enable/busy-poll sequence around every
//! destructive command. Every public operation is one complete
//! select → transfer → deselect bracket, followed by a bounded busy-poll
//! for erase and program.
//!
//! Supported commands:
//! * Read Data (03h)
//! * Write Enable (06h)
//! * Read Status Register (05h)
//! * Page Program (02h)
//! * Sector Erase (20h)
//!
//! # Code placement when driving the boot flash
//!
//! While a sector erase or page program is in progress the chip serves no
//! reads. If the flash being driven is also the memory the firmware
//! executes from (XIP), an instruction fetch during the operation faults
//! or returns garbage. On such systems the routines that issue erase and
//! program commands, everything they call, and the vector table entries
//! that could preempt them must be resident in RAM for the duration of
//! the command. This is a link-time requirement, not something the driver
//! can enforce: place the calling code in a RAM section, e.g.
//!
//! ```ignore
//! #[link_section = ".data.ram_func"]
//! #[inline(never)]
//! fn update_firmware(flash: &mut Flash) { ... }
//! ```
//!
//! with a linker script that loads `.data.ram_func` to RAM at startup
//! (RP2040's `__not_in_flash_func` and ESP-IDF's `IRAM_ATTR` are the same
//! mechanism).

pub mod command;
pub mod comms;
pub mod cs;
pub mod error;
pub mod traits;

pub use command::Command;
pub use comms::{Config, FlashSpi, Status};
pub use cs::ChipSelect;
pub use error::Error;
pub use traits::NorFlash;

/// Size of one programmable page in bytes. A page program transfers
/// exactly this many data bytes.
pub const PAGE_SIZE: usize = 256;

/// Erase-sector size in bytes on the observed chip family. The driver
/// does not validate erase addresses against it; the chip masks the
/// sub-sector address bits.
pub const SECTOR_SIZE: u32 = 4096;
