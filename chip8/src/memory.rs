use std::fmt::Display;

use crate::error::Fault;
use crate::{MEM_SIZE, ROM_ADDR};

pub struct Memory {
    pub(crate) data: [u8; MEM_SIZE],
}

impl Memory {
    /// Create an empty instance of the Memory struct
    pub fn new() -> Self {
        Self {
            data: [0; MEM_SIZE],
        }
    }

    /// Write `data` into memory starting at `addr` and return the number of bytes written
    ///
    /// This is the only way to fill the reserved region below the program base.
    pub(crate) fn write(&mut self, addr: usize, data: &[u8]) -> Result<usize, Fault> {
        let end = addr.checked_add(data.len()).filter(|&end| end <= MEM_SIZE);
        let Some(end) = end else {
            return Err(Fault::LoadOverflow {
                offset: addr,
                len: data.len(),
            });
        };

        self.data[addr..end].copy_from_slice(data);
        Ok(data.len())
    }

    /// Copy a program image into memory, refusing to touch the reserved region
    pub fn load(&mut self, addr: usize, data: &[u8]) -> Result<usize, Fault> {
        if addr < ROM_ADDR {
            return Err(Fault::ProtectedWrite { addr });
        }
        self.write(addr, data)
    }

    pub fn read_byte(&self, addr: usize) -> Result<u8, Fault> {
        self.data
            .get(addr)
            .copied()
            .ok_or(Fault::MemoryOutOfBounds { addr })
    }

    /// Read a big-endian instruction word
    pub fn read_word(&self, addr: usize) -> Result<u16, Fault> {
        let hi = self.read_byte(addr)? as u16;
        let lo = self.read_byte(addr + 1)? as u16;
        Ok(hi << 8 | lo)
    }

    /// Store `data` on behalf of a running program
    ///
    /// The whole range is checked before anything is written.
    pub fn store(&mut self, addr: usize, data: &[u8]) -> Result<(), Fault> {
        if addr < ROM_ADDR {
            return Err(Fault::ProtectedWrite { addr });
        }
        let end = addr + data.len();
        if end > MEM_SIZE {
            return Err(Fault::MemoryOutOfBounds {
                addr: addr.max(MEM_SIZE),
            });
        }
        self.data[addr..end].copy_from_slice(data);
        Ok(())
    }

    /// Borrow up to `len` bytes starting at `addr`, cut short at the end of memory
    pub fn slice_clamped(&self, addr: usize, len: usize) -> Result<&[u8], Fault> {
        if addr >= MEM_SIZE {
            return Err(Fault::MemoryOutOfBounds { addr });
        }
        let end = (addr + len).min(MEM_SIZE);
        Ok(&self.data[addr..end])
    }

    /// Borrow exactly `len` bytes starting at `addr`
    pub fn slice(&self, addr: usize, len: usize) -> Result<&[u8], Fault> {
        self.data
            .get(addr..addr + len)
            .ok_or(Fault::MemoryOutOfBounds {
                addr: addr.max(MEM_SIZE),
            })
    }
}

impl Display for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const BYTES_PER_LINE: usize = 16;
        for (line, chunk) in self.data.chunks(BYTES_PER_LINE).enumerate() {
            write!(f, "{:04X}: ", line * BYTES_PER_LINE)?;
            for byte in chunk {
                write!(f, "{:02X} ", byte)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
