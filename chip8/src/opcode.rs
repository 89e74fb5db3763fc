use std::fmt::Display as FmtDisplay;

/// The raw fields of an instruction word. Which ones are meaningful depends
/// on the opcode class in `c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub c: u8,
    pub x: u8,
    pub y: u8,
    pub n: u8,
    pub nn: u8,
    pub nnn: u16,
}

impl Opcode {
    pub fn new(word: u16) -> Self {
        Opcode {
            c: ((word & 0xF000) >> 12) as u8,
            x: ((word & 0x0F00) >> 8) as u8,
            y: ((word & 0x00F0) >> 4) as u8,
            n: (word & 0x000F) as u8,
            nn: (word & 0x00FF) as u8,
            nnn: word & 0x0FFF,
        }
    }

    pub fn word(&self) -> u16 {
        (self.c as u16) << 12 | self.nnn
    }
}

impl FmtDisplay for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04X}", self.word())
    }
}

/// A decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 0x0NNN
    Sys { nnn: u16 },
    /// 0x00E0
    Cls,
    /// 0x00EE
    Ret,
    /// 0x1NNN
    Jump { nnn: u16 },
    /// 0x2NNN
    Call { nnn: u16 },
    /// 0x3XNN
    SkipEq { x: u8, nn: u8 },
    /// 0x4XNN
    SkipNe { x: u8, nn: u8 },
    /// 0x5XY0
    SkipRegEq { x: u8, y: u8 },
    /// 0x6XNN
    Set { x: u8, nn: u8 },
    /// 0x7XNN
    Add { x: u8, nn: u8 },
    /// 0x8XY0
    RegSet { x: u8, y: u8 },
    /// 0x8XY1
    RegOr { x: u8, y: u8 },
    /// 0x8XY2
    RegAnd { x: u8, y: u8 },
    /// 0x8XY3
    RegXor { x: u8, y: u8 },
    /// 0x8XY4
    RegAdd { x: u8, y: u8 },
    /// 0x8XY5
    RegSubRight { x: u8, y: u8 },
    /// 0x8XY6
    RegShiftRight { x: u8, y: u8 },
    /// 0x8XY7
    RegSubLeft { x: u8, y: u8 },
    /// 0x8XYE
    RegShiftLeft { x: u8, y: u8 },
    /// 0x9XY0
    SkipRegNe { x: u8, y: u8 },
    /// 0xANNN
    SetIndex { nnn: u16 },
    /// 0xBNNN
    JumpWithOffset { nnn: u16, x: u8 },
    /// 0xCXNN
    Random { x: u8, nn: u8 },
    /// 0xDXYN
    Draw { x: u8, y: u8, n: u8 },
    /// 0xEX9E
    SkipIfKeyDown { x: u8 },
    /// 0xEXA1
    SkipIfKeyUp { x: u8 },
    /// 0xFX07
    DelayGet { x: u8 },
    /// 0xFX0A
    GetKey { x: u8 },
    /// 0xFX15
    DelaySet { x: u8 },
    /// 0xFX18
    SoundSet { x: u8 },
    /// 0xFX1E
    AddToIndex { x: u8 },
    /// 0xFX29
    FontCharacter { x: u8 },
    /// 0xFX33
    StoreDecimal { x: u8 },
    /// 0xFX55
    MemoryStore { x: u8 },
    /// 0xFX65
    MemoryLoad { x: u8 },
    /// Any word that matches none of the above
    Unknown(Opcode),
}

impl Instruction {
    pub fn decode(word: u16) -> Self {
        use Instruction::*;

        let op = Opcode::new(word);
        let Opcode { x, y, n, nn, nnn, .. } = op;
        match op.c {
            0x0 => match nnn {
                0x0E0 => Cls,
                0x0EE => Ret,
                _ => Sys { nnn },
            },
            0x1 => Jump { nnn },
            0x2 => Call { nnn },
            0x3 => SkipEq { x, nn },
            0x4 => SkipNe { x, nn },
            0x5 if n == 0 => SkipRegEq { x, y },
            0x6 => Set { x, nn },
            0x7 => Add { x, nn },
            0x8 => match n {
                0x0 => RegSet { x, y },
                0x1 => RegOr { x, y },
                0x2 => RegAnd { x, y },
                0x3 => RegXor { x, y },
                0x4 => RegAdd { x, y },
                0x5 => RegSubRight { x, y },
                0x6 => RegShiftRight { x, y },
                0x7 => RegSubLeft { x, y },
                0xE => RegShiftLeft { x, y },
                _ => Unknown(op),
            },
            0x9 if n == 0 => SkipRegNe { x, y },
            0xA => SetIndex { nnn },
            0xB => JumpWithOffset { nnn, x },
            0xC => Random { x, nn },
            0xD => Draw { x, y, n },
            0xE => match nn {
                0x9E => SkipIfKeyDown { x },
                0xA1 => SkipIfKeyUp { x },
                _ => Unknown(op),
            },
            0xF => match nn {
                0x07 => DelayGet { x },
                0x0A => GetKey { x },
                0x15 => DelaySet { x },
                0x18 => SoundSet { x },
                0x1E => AddToIndex { x },
                0x29 => FontCharacter { x },
                0x33 => StoreDecimal { x },
                0x55 => MemoryStore { x },
                0x65 => MemoryLoad { x },
                _ => Unknown(op),
            },
            _ => Unknown(op),
        }
    }
}

impl FmtDisplay for Instruction {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Instruction::*;

        match *self {
            Sys { nnn }            => write!(f, "SYS {:#05x}", nnn),
            Cls                    => write!(f, "CLS"),
            Ret                    => write!(f, "RET"),
            Jump { nnn }           => write!(f, "JP {:#05x}", nnn),
            Call { nnn }           => write!(f, "CALL {:#05x}", nnn),
            SkipEq { x, nn }       => write!(f, "SE V{:X}, {:#04x}", x, nn),
            SkipNe { x, nn }       => write!(f, "SNE V{:X}, {:#04x}", x, nn),
            SkipRegEq { x, y }     => write!(f, "SE V{:X}, V{:X}", x, y),
            Set { x, nn }          => write!(f, "LD V{:X}, {:#04x}", x, nn),
            Add { x, nn }          => write!(f, "ADD V{:X}, {:#04x}", x, nn),
            RegSet { x, y }        => write!(f, "LD V{:X}, V{:X}", x, y),
            RegOr { x, y }         => write!(f, "OR V{:X}, V{:X}", x, y),
            RegAnd { x, y }        => write!(f, "AND V{:X}, V{:X}", x, y),
            RegXor { x, y }        => write!(f, "XOR V{:X}, V{:X}", x, y),
            RegAdd { x, y }        => write!(f, "ADD V{:X}, V{:X}", x, y),
            RegSubRight { x, y }   => write!(f, "SUB V{:X}, V{:X}", x, y),
            RegShiftRight { x, y } => write!(f, "SHR V{:X}, V{:X}", x, y),
            RegSubLeft { x, y }    => write!(f, "SUBN V{:X}, V{:X}", x, y),
            RegShiftLeft { x, y }  => write!(f, "SHL V{:X}, V{:X}", x, y),
            SkipRegNe { x, y }     => write!(f, "SNE V{:X}, V{:X}", x, y),
            SetIndex { nnn }       => write!(f, "LD I, {:#05x}", nnn),
            JumpWithOffset { nnn, .. } => write!(f, "JP V0, {:#05x}", nnn),
            Random { x, nn }       => write!(f, "RND V{:X}, {:#04x}", x, nn),
            Draw { x, y, n }       => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipIfKeyDown { x }    => write!(f, "SKP V{:X}", x),
            SkipIfKeyUp { x }      => write!(f, "SKNP V{:X}", x),
            DelayGet { x }         => write!(f, "LD V{:X}, DT", x),
            GetKey { x }           => write!(f, "LD V{:X}, K", x),
            DelaySet { x }         => write!(f, "LD DT, V{:X}", x),
            SoundSet { x }         => write!(f, "LD ST, V{:X}", x),
            AddToIndex { x }       => write!(f, "ADD I, V{:X}", x),
            FontCharacter { x }    => write!(f, "LD F, V{:X}", x),
            StoreDecimal { x }     => write!(f, "LD B, V{:X}", x),
            MemoryStore { x }      => write!(f, "LD [I], V{:X}", x),
            MemoryLoad { x }       => write!(f, "LD V{:X}, [I]", x),
            Unknown(op)            => write!(f, "??? {}", op),
        }
    }
}
