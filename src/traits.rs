/// The operations a serial NOR flash chip offers to the rest of the
/// system.
pub trait NorFlash {
    type Error;

    /// Reads `buf.len()` bytes starting at `addr` into `buf`.
    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Erases one sector, returning every byte in it to 0xFF. Blocks
    /// until the chip reports completion.
    fn sector_erase(&mut self, addr: u32) -> Result<(), Self::Error>;

    /// Programs exactly one page of previously erased memory. Blocks
    /// until the chip reports completion.
    fn page_program(&mut self, addr: u32, data: &[u8]) -> Result<(), Self::Error>;
}
