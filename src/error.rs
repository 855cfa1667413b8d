//! The error type used by this library.

/// Driver errors, generic over the SPI bus error `S` and the chip-select
/// pin error `P`.
///
/// A failed erase or program leaves the addressed range in an
/// indeterminate state; the driver never retries destructive commands, so
/// the caller must re-verify by reading back. [`Error::Timeout`] is
/// reported distinctly from transport faults: it means the chip is still
/// busy, not that the bus is broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<S, P> {
    /// An SPI transfer failed.
    Spi(S),

    /// The chip-select line could not be driven.
    Gpio(P),

    /// The busy flag did not clear within the configured poll bound.
    Timeout,

    /// A page program was given a payload that is not exactly one page.
    /// Rejected before any bus activity.
    InvalidLength,

    /// A program address is not aligned to a page boundary.
    NotAligned,
}
