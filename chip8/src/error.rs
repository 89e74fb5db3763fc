use thiserror::Error;

/// Everything that can go wrong while loading or running a program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("program of {len} bytes at {offset:#05x} overflows memory")]
    LoadOverflow { offset: usize, len: usize },
    #[error("write to reserved interpreter memory at {addr:#05x}")]
    ProtectedWrite { addr: usize },
    #[error("memory access out of bounds at {addr:#06x}")]
    MemoryOutOfBounds { addr: usize },
    #[error("call stack overflow at {addr:#05x}")]
    StackOverflow { addr: u16 },
    #[error("sub return with empty stack at {addr:#05x}")]
    StackUnderflow { addr: u16 },
    #[error("invalid opcode '{opcode:04X}' encountered at {addr:#05x}")]
    UndefinedOpcode { opcode: u16, addr: u16 },
}

impl Fault {
    /// Undefined opcodes are skipped over, everything else leaves the
    /// interpreter in a state that can't meaningfully continue
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Fault::UndefinedOpcode { .. })
    }
}
