//! Blocking driver for 25-series SPI NOR flash.
//!
//! Every operation is one or more complete chip-select brackets:
//! select, clock the command frame (and payload) through, flush, deselect.
//! Destructive commands additionally issue Write Enable beforehand and
//! busy-poll the status register afterwards. Refer to a 25-series
//! datasheet, e.g.:
//! https://datasheet.lcsc.com/lcsc/1912111437_Winbond-Elec-W25Q128JVSIQ_C113767.pdf

use crate::command::Command;
use crate::cs::ChipSelect;
use crate::error::Error;
use crate::traits::NorFlash;
use crate::PAGE_SIZE;
use core::fmt::Debug;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

bitflags::bitflags! {
    /// Status register bits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Status: u8 {
        /// Erase or write in progress.
        const BUSY = 1 << 0;
        /// Status of the **W**rite **E**nable **L**atch.
        const WEL = 1 << 1;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Status {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Status({=u8:08b})", self.bits());
    }
}

/// Driver tunables. The defaults suit the observed 1 MHz, 4 KiB-sector
/// configuration; adjust to the chip's datasheet.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Guard interval around every chip-select transition, in
    /// nanoseconds. Must be at or above the chip's CS setup/hold minimum.
    pub guard_delay_ns: u32,
    /// Maximum number of busy status reads in one wait before giving up
    /// with [`Error::Timeout`].
    pub max_poll_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            guard_delay_ns: 100,
            // A sector erase takes up to ~400 ms on these chips; at
            // 1 MHz each poll bracket is tens of microseconds, so this
            // bound is generous without being unbounded.
            max_poll_attempts: 1_000_000,
        }
    }
}

/// Blocking SPI NOR flash driver.
///
/// Owns the bus, the select line, and a delay provider for the guard
/// intervals; `&mut self` on every operation is what serializes access to
/// the chip.
pub struct FlashSpi<SPI, PIN, D> {
    spi: SPI,
    cs: ChipSelect<PIN>,
    delay: D,
    max_poll_attempts: u32,
}

impl<SPI, PIN, D> Debug for FlashSpi<SPI, PIN, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FlashSpi").finish()
    }
}

impl<SPI, PIN, D> FlashSpi<SPI, PIN, D>
where
    SPI: SpiBus,
    PIN: OutputPin,
    D: DelayNs,
{
    /// Creates the driver and drives the select line to its idle (high)
    /// level.
    pub fn new(
        spi: SPI,
        cs_pin: PIN,
        delay: D,
        config: Config,
    ) -> Result<Self, Error<SPI::Error, PIN::Error>> {
        let mut this = Self {
            spi,
            cs: ChipSelect::new(cs_pin, config.guard_delay_ns),
            delay,
            max_poll_attempts: config.max_poll_attempts,
        };
        this.cs.deselect(&mut this.delay).map_err(Error::Gpio)?;
        Ok(this)
    }

    /// Reads flash contents into `buf`, starting at `addr`.
    ///
    /// Note that `addr` is not fully decoded: these chips only look at
    /// the lowest `N` bits needed to encode their size, so contents are
    /// "mirrored" at multiples of the flash size. Only 24 bits of `addr`
    /// are transferred in any case, limiting 25-series chips to 16 MiB.
    ///
    /// Reading is always valid; no write-enable or busy-check is
    /// involved.
    pub fn read(
        &mut self,
        addr: u32,
        buf: &mut [u8],
    ) -> Result<(), Error<SPI::Error, PIN::Error>> {
        let frame = Command::Read(addr).frame();
        self.transaction(|spi| {
            spi.write(frame.bytes())?;
            // Clocks out as many dummy bytes as the caller wants data.
            spi.read(buf)
        })
    }

    /// Sets the write-enable latch (opcode 06h).
    ///
    /// The chip clears the latch itself after every completed program or
    /// erase, so this must be issued immediately before each destructive
    /// command; [`Self::sector_erase`] and [`Self::page_program`] do so
    /// internally.
    pub fn write_enable(&mut self) -> Result<(), Error<SPI::Error, PIN::Error>> {
        let frame = Command::WriteEnable.frame();
        self.transaction(|spi| spi.write(frame.bytes()))
    }

    /// Sector erase (opcode 20h): sets every byte of the sector
    /// containing `addr` to the erased state of all 1s (FFh), then blocks
    /// until the chip reports completion.
    ///
    /// The sector size is chip-specific ([`crate::SECTOR_SIZE`] on the
    /// observed parts) and not validated here; the chip ignores the
    /// address bits below its sector boundary.
    pub fn sector_erase(&mut self, addr: u32) -> Result<(), Error<SPI::Error, PIN::Error>> {
        self.write_enable()?;

        let frame = Command::SectorErase(addr).frame();
        self.transaction(|spi| spi.write(frame.bytes()))?;
        #[cfg(feature = "defmt")]
        defmt::trace!("erase sector {=u32:#x}", addr);

        self.wait_until_ready()
    }

    /// Page program (opcode 02h): programs exactly one page
    /// ([`PAGE_SIZE`] bytes) at `addr`, then blocks until the chip
    /// reports completion.
    ///
    /// The page must have been erased since it was last programmed: a
    /// program can only clear bits, never set them. `addr` must be a
    /// multiple of [`PAGE_SIZE`], and `data` exactly one page long; both
    /// are checked before any bus activity.
    pub fn page_program(
        &mut self,
        addr: u32,
        data: &[u8],
    ) -> Result<(), Error<SPI::Error, PIN::Error>> {
        if data.len() != PAGE_SIZE {
            return Err(Error::InvalidLength);
        }
        if addr % PAGE_SIZE as u32 != 0 {
            return Err(Error::NotAligned);
        }
        self.write_enable()?;
        #[cfg(feature = "defmt")]
        if !self.is_wel()? {
            defmt::warn!("WEL should be set: {}", self.read_status()?);
        }

        let frame = Command::PageProgram(addr).frame();
        self.transaction(|spi| {
            spi.write(frame.bytes())?;
            spi.write(data)
        })?;
        #[cfg(feature = "defmt")]
        defmt::trace!("program page {=u32:#x}", addr);

        self.wait_until_ready()
    }

    /// Reads the status register (opcode 05h). One bracket, one
    /// full-duplex exchange; the second received byte is the register.
    pub fn read_status(&mut self) -> Result<Status, Error<SPI::Error, PIN::Error>> {
        let mut buf = [Command::ReadStatus.opcode(), 0];
        self.transaction(|spi| spi.transfer_in_place(&mut buf))?;
        Ok(Status::from_bits_truncate(buf[1]))
    }

    pub fn is_busy(&mut self) -> Result<bool, Error<SPI::Error, PIN::Error>> {
        Ok(self.read_status()?.contains(Status::BUSY))
    }

    pub fn is_wel(&mut self) -> Result<bool, Error<SPI::Error, PIN::Error>> {
        Ok(self.read_status()?.contains(Status::WEL))
    }

    /// Blocks until the busy flag clears, reading the status register
    /// fresh on every iteration (at least once). Gives up with
    /// [`Error::Timeout`] after [`Config::max_poll_attempts`] consecutive
    /// busy reads; the chip is then still working and the caller decides
    /// what to do.
    pub fn wait_until_ready(&mut self) -> Result<(), Error<SPI::Error, PIN::Error>> {
        let mut polls = 0;
        loop {
            if !self.read_status()?.contains(Status::BUSY) {
                return Ok(());
            }
            polls += 1;
            if polls >= self.max_poll_attempts {
                return Err(Error::Timeout);
            }
        }
    }

    /// Deselects the chip and hands back the bus, pin and delay.
    pub fn release(mut self) -> (SPI, PIN, D) {
        let _ = self.cs.deselect(&mut self.delay);
        (self.spi, self.cs.free(), self.delay)
    }

    /// Runs `op` inside one select/deselect bracket. The bus is flushed
    /// before deselecting, and the line is released even when `op` fails.
    fn transaction<R>(
        &mut self,
        op: impl FnOnce(&mut SPI) -> Result<R, SPI::Error>,
    ) -> Result<R, Error<SPI::Error, PIN::Error>> {
        let Self { spi, cs, delay, .. } = self;
        cs.select(delay).map_err(Error::Gpio)?;
        let result = op(spi)
            .and_then(|r| spi.flush().map(|()| r))
            .map_err(Error::Spi);
        let deselect = cs.deselect(delay).map_err(Error::Gpio);
        let result = result?;
        deselect?;
        Ok(result)
    }
}

impl<SPI, PIN, D> NorFlash for FlashSpi<SPI, PIN, D>
where
    SPI: SpiBus,
    PIN: OutputPin,
    D: DelayNs,
{
    type Error = Error<SPI::Error, PIN::Error>;

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), Self::Error> {
        FlashSpi::read(self, addr, buf)
    }

    fn sector_erase(&mut self, addr: u32) -> Result<(), Self::Error> {
        FlashSpi::sector_erase(self, addr)
    }

    fn page_program(&mut self, addr: u32, data: &[u8]) -> Result<(), Self::Error> {
        FlashSpi::page_program(self, addr, data)
    }
}
