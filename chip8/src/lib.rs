mod display;
pub mod driver;
mod error;
pub mod keypad;
mod memory;
pub mod opcode;
pub mod registers;

use std::fmt::Display as FmtDisplay;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

pub use crate::display::{Display, FrameBuffer};
pub use crate::driver::{Driver, StopHandle};
pub use crate::error::Fault;
pub use crate::keypad::Key;
pub use crate::opcode::{Instruction, Opcode};
pub use crate::registers::Registers;

use crate::keypad::Keypad;
use crate::memory::Memory;

pub const FONT_CHAR_LENGTH: usize = 5;

pub const FONT_DATA: [u8; FONT_CHAR_LENGTH * 0x10] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

pub const FONT_ADDR: usize = 0x000;

pub const MEM_SIZE: usize = 0x1000;
pub const ROM_ADDR: usize = 0x200;
pub const STACK_SIZE: usize = 0x10;
pub const REGISTER_COUNT: usize = 0x10;

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// Behaviours that differ between interpreters. The defaults are the
/// conventions this crate documents and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Chip8Config {
    /// 8XY6/8XYE shift VY into VX instead of shifting VX in place
    legacy_shift: bool,
    /// BNNN adds VX instead of V0
    jump_add_offset: bool,
    /// FX55/FX65 leave I pointing past the last register copied
    memory_increment_i: bool,
    /// 8XY3 sets VF when the operands had any bit in common
    xor_flag: bool,
}

impl Chip8Config {
    pub fn new() -> Self {
        Self {
            legacy_shift: false,
            jump_add_offset: false,
            memory_increment_i: false,
            xor_flag: true,
        }
    }
}

pub struct Chip8 {
    config: Chip8Config,
    /// 4 KiB of RAM holding the font at 0x000 and the program from 0x200
    memory: Memory,
    /// A frame buffer containing binary pixel states
    display: Display,
    /// The most recent key reported by the host
    keypad: Keypad,
    /// A stack for 16-bit addresses, which is used to call subroutines/functions and return from them
    stack: [u16; STACK_SIZE],
    /// A pointer to the current stack address in use
    sp: usize,
    /// 16 8-bit registers numbered 0 through F hexadecimal, VF doubles as the flag register
    v: Registers,
    /// The program counter points to the next instruction in memory
    pc: u16,
    /// The index register is used to point at locations in memory
    i: u16,
    /// The delay timer is decremented once per tick until it reaches 0
    dt: u8,
    /// The sound timer is decremented once per tick until it reaches 0, the host beeps while it's not 0
    st: u8,
    /// Suspends the timers but not execution
    paused: bool,
    rng: Box<dyn RngCore + Send>,
}

impl Chip8 {
    pub fn new() -> Result<Self, Fault> {
        let mut memory = Memory::new();
        memory.write(FONT_ADDR, &FONT_DATA)?;

        Ok(Chip8 {
            config: Chip8Config::new(),
            memory,
            display: Display::new(),
            keypad: Keypad::new(),
            stack: [0; STACK_SIZE],
            sp: 0,
            v: Registers::new(),
            pc: ROM_ADDR as u16,
            i: 0,
            dt: 0,
            st: 0,
            paused: false,
            rng: Box::new(StdRng::from_os_rng()),
        })
    }

    /* Config builder functions */
    pub fn legacy_shift(mut self, value: bool) -> Self {
        self.config.legacy_shift = value;
        self
    }

    pub fn jump_add_offset(mut self, value: bool) -> Self {
        self.config.jump_add_offset = value;
        self
    }

    pub fn memory_increment_i(mut self, value: bool) -> Self {
        self.config.memory_increment_i = value;
        self
    }

    pub fn xor_flag(mut self, value: bool) -> Self {
        self.config.xor_flag = value;
        self
    }

    /// Replace the random source used by CXNN
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Use a deterministic random source, mostly for tests and replays
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }

    /// Bring the machine back to its power-on state, keeping the configuration
    /// and random source
    pub fn reset(&mut self) -> Result<(), Fault> {
        debug!("reset");
        self.memory = Memory::new();
        self.memory.write(FONT_ADDR, &FONT_DATA)?;
        self.display = Display::new();
        self.keypad = Keypad::new();
        self.stack = [0; STACK_SIZE];
        self.sp = 0;
        self.v = Registers::new();
        self.pc = ROM_ADDR as u16;
        self.i = 0;
        self.dt = 0;
        self.st = 0;
        self.paused = false;
        Ok(())
    }

    /// Copy a program image into memory at `offset` and point the program counter at it
    pub fn load(&mut self, bytes: &[u8], offset: usize) -> Result<usize, Fault> {
        let written = self.memory.load(offset, bytes)?;
        self.pc = offset as u16;
        debug!("loaded {} bytes at {:#05x}", written, offset);
        Ok(written)
    }

    pub fn load_rom(&mut self, rom: &[u8]) -> Result<usize, Fault> {
        self.load(rom, ROM_ADDR)
    }

    pub fn pause(&mut self) {
        debug!("timers paused");
        self.paused = true;
    }

    pub fn resume(&mut self) {
        debug!("timers resumed");
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_fb_dirty(&self) -> bool {
        self.display.is_dirty()
    }

    pub fn is_sound_playing(&self) -> bool {
        self.st > 0
    }

    /// Snapshot of the screen for presentation
    pub fn fb(&mut self) -> FrameBuffer {
        self.display.fb()
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn keydown(&mut self, key: Key) {
        self.keypad.keydown(key);
    }

    pub fn keyup(&mut self) {
        self.keypad.keyup();
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn v(&self) -> &Registers {
        &self.v
    }

    pub fn dt(&self) -> u8 {
        self.dt
    }

    pub fn st(&self) -> u8 {
        self.st
    }

    pub fn stack_depth(&self) -> usize {
        self.sp
    }

    /// Execute one instruction, then run the timers down by one unless paused
    ///
    /// The timers tick even when the instruction faults.
    pub fn tick(&mut self) -> Result<(), Fault> {
        let result = self.step();
        if !self.paused {
            self.tick_timers();
        }
        result
    }

    /// Execute one instruction without touching the timers
    pub fn step(&mut self) -> Result<(), Fault> {
        let addr = self.pc;
        let word = self.fetch()?;
        let instruction = Instruction::decode(word);
        trace!("{:#05x} {:04X} {}", addr, word, instruction);
        self.execute(instruction)
    }

    fn tick_timers(&mut self) {
        self.dt = self.dt.saturating_sub(1);
        self.st = self.st.saturating_sub(1);
    }

    fn fetch(&mut self) -> Result<u16, Fault> {
        let word = self.memory.read_word(self.pc as usize)?;
        self.pc += 2;
        Ok(word)
    }

    /// Address of the instruction currently executing
    fn current_addr(&self) -> u16 {
        self.pc - 2
    }

    #[rustfmt::skip]
    fn execute(&mut self, instruction: Instruction) -> Result<(), Fault> {
        use Instruction::*;

        match instruction {
            Sys { .. }                 => (),
            Cls                        => self.op_cls(),
            Ret                        => return self.op_sub_return(),
            Jump { nnn }               => self.op_jump(nnn),
            Call { nnn }               => return self.op_sub_call(nnn),
            SkipEq { x, nn }           => self.op_skip_eq(x, nn),
            SkipNe { x, nn }           => self.op_skip_ne(x, nn),
            SkipRegEq { x, y }         => self.op_skip_reg_eq(x, y),
            Set { x, nn }              => self.op_set(x, nn),
            Add { x, nn }              => self.op_add(x, nn),
            RegSet { x, y }            => self.op_reg_set(x, y),
            RegOr { x, y }             => self.op_reg_or(x, y),
            RegAnd { x, y }            => self.op_reg_and(x, y),
            RegXor { x, y }            => self.op_reg_xor(x, y),
            RegAdd { x, y }            => self.op_reg_add(x, y),
            RegSubRight { x, y }       => self.op_reg_sub_right(x, y),
            RegShiftRight { x, y }     => self.op_reg_shift_right(x, y),
            RegSubLeft { x, y }        => self.op_reg_sub_left(x, y),
            RegShiftLeft { x, y }      => self.op_reg_shift_left(x, y),
            SkipRegNe { x, y }         => self.op_skip_reg_ne(x, y),
            SetIndex { nnn }           => self.op_set_index(nnn),
            JumpWithOffset { nnn, x }  => self.op_jump_with_offset(nnn, x),
            Random { x, nn }           => self.op_random(x, nn),
            Draw { x, y, n }           => return self.op_display(x, y, n),
            SkipIfKeyDown { x }        => self.op_skip_if_key_down(x),
            SkipIfKeyUp { x }          => self.op_skip_if_key_up(x),
            DelayGet { x }             => self.op_dt_get(x),
            GetKey { x }               => self.op_get_key(x),
            DelaySet { x }             => self.op_dt_set(x),
            SoundSet { x }             => self.op_st_set(x),
            AddToIndex { x }           => self.op_add_to_index(x),
            FontCharacter { x }        => self.op_font_character(x),
            StoreDecimal { x }         => return self.op_convert_to_decimal(x),
            MemoryStore { x }          => return self.op_memory_store(x),
            MemoryLoad { x }           => return self.op_memory_load(x),
            Unknown(opcode)            => {
                return Err(Fault::UndefinedOpcode {
                    opcode: opcode.word(),
                    addr: self.current_addr(),
                })
            }
        }
        Ok(())
    }

    /* Operations */

    /// 0x00E0
    fn op_cls(&mut self) {
        self.display.clear();
    }

    /// 0x00EE
    fn op_sub_return(&mut self) -> Result<(), Fault> {
        if self.sp == 0 {
            return Err(Fault::StackUnderflow {
                addr: self.current_addr(),
            });
        }
        self.sp -= 1;
        self.pc = self.stack[self.sp] + 2;
        Ok(())
    }

    /// 0x1NNN
    fn op_jump(&mut self, nnn: u16) {
        self.pc = nnn;
    }

    /// 0x2NNN
    fn op_sub_call(&mut self, nnn: u16) -> Result<(), Fault> {
        let addr = self.current_addr();
        if self.sp >= STACK_SIZE {
            return Err(Fault::StackOverflow { addr });
        }
        self.stack[self.sp] = addr;
        self.sp += 1;
        self.pc = nnn;
        Ok(())
    }

    /// 0x3XNN
    fn op_skip_eq(&mut self, x: u8, nn: u8) {
        if self.v[x] == nn {
            self.pc += 2;
        }
    }

    /// 0x4XNN
    fn op_skip_ne(&mut self, x: u8, nn: u8) {
        if self.v[x] != nn {
            self.pc += 2;
        }
    }

    /// 0x5XY0
    fn op_skip_reg_eq(&mut self, x: u8, y: u8) {
        if self.v[x] == self.v[y] {
            self.pc += 2;
        }
    }

    /// 0x6XNN
    fn op_set(&mut self, x: u8, nn: u8) {
        self.v[x] = nn;
    }

    /// 0x7XNN
    fn op_add(&mut self, x: u8, nn: u8) {
        self.v[x] = self.v[x].wrapping_add(nn);
    }

    /// 0x8XY0
    fn op_reg_set(&mut self, x: u8, y: u8) {
        self.v[x] = self.v[y];
    }

    /// 0x8XY1
    fn op_reg_or(&mut self, x: u8, y: u8) {
        self.v[x] |= self.v[y];
    }

    /// 0x8XY2
    fn op_reg_and(&mut self, x: u8, y: u8) {
        self.v[x] &= self.v[y];
    }

    /// 0x8XY3
    fn op_reg_xor(&mut self, x: u8, y: u8) {
        let (vx, vy) = (self.v[x], self.v[y]);
        self.v[x] = vx ^ vy;
        if self.config.xor_flag {
            // XOR only differs from OR where both operands had a bit set
            self.v.set_flag(vx ^ vy != vx | vy);
        }
    }

    /// 0x8XY4
    fn op_reg_add(&mut self, x: u8, y: u8) {
        let (sum, overflow) = self.v[x].overflowing_add(self.v[y]);
        self.v[x] = sum;
        self.v.set_flag(overflow);
    }

    /// 0x8XY5
    fn op_reg_sub_right(&mut self, x: u8, y: u8) {
        let (diff, borrow) = self.v[x].overflowing_sub(self.v[y]);
        self.v[x] = diff;
        self.v.set_flag(!borrow);
    }

    /// 0x8XY6
    fn op_reg_shift_right(&mut self, x: u8, y: u8) {
        let source = if self.config.legacy_shift {
            self.v[y]
        } else {
            self.v[x]
        };
        self.v[x] = source >> 1;
        self.v.set_flag(source & 0x1 == 1);
    }

    /// 0x8XY7
    fn op_reg_sub_left(&mut self, x: u8, y: u8) {
        let (diff, borrow) = self.v[y].overflowing_sub(self.v[x]);
        self.v[x] = diff;
        self.v.set_flag(!borrow);
    }

    /// 0x8XYE
    fn op_reg_shift_left(&mut self, x: u8, y: u8) {
        let source = if self.config.legacy_shift {
            self.v[y]
        } else {
            self.v[x]
        };
        self.v[x] = source << 1;
        self.v.set_flag(source >> 7 & 0x1 == 1);
    }

    /// 0x9XY0
    fn op_skip_reg_ne(&mut self, x: u8, y: u8) {
        if self.v[x] != self.v[y] {
            self.pc += 2;
        }
    }

    /// 0xANNN
    fn op_set_index(&mut self, nnn: u16) {
        self.i = nnn;
    }

    /// 0xBNNN
    fn op_jump_with_offset(&mut self, nnn: u16, x: u8) {
        let idx = if self.config.jump_add_offset { x } else { 0 };
        self.pc = nnn + self.v[idx] as u16;
    }

    /// 0xCXNN
    fn op_random(&mut self, x: u8, nn: u8) {
        self.v[x] = nn & self.rng.random::<u8>();
    }

    /// 0xDXYN
    fn op_display(&mut self, x: u8, y: u8, n: u8) -> Result<(), Fault> {
        let vx = self.v[x] as usize;
        let vy = self.v[y] as usize;
        let sprite = self.memory.slice_clamped(self.i as usize, n as usize)?;
        let collision = self.display.draw_sprite(vx, vy, sprite);
        self.v.set_flag(collision);
        Ok(())
    }

    /// 0xEX9E
    fn op_skip_if_key_down(&mut self, x: u8) {
        if self.keypad.is_key_down(self.v[x]) {
            self.pc += 2;
        }
    }

    /// 0xEXA1
    fn op_skip_if_key_up(&mut self, x: u8) {
        if self.keypad.is_key_up(self.v[x]) {
            self.pc += 2;
        }
    }

    /// 0xFX07
    fn op_dt_get(&mut self, x: u8) {
        self.v[x] = self.dt;
    }

    /// 0xFX0A
    fn op_get_key(&mut self, x: u8) {
        if let Some(key) = self.keypad.awaiting_release {
            if self.keypad.is_key_up(key) {
                self.v[x] = key;
                self.keypad.process_release();
                return;
            }
        } else if let Some(key) = self.keypad.pressed() {
            self.keypad.await_release(key);
        }
        // run this instruction again on the next tick
        self.pc -= 2;
    }

    /// 0xFX15
    fn op_dt_set(&mut self, x: u8) {
        self.dt = self.v[x];
    }

    /// 0xFX18
    fn op_st_set(&mut self, x: u8) {
        self.st = self.v[x];
    }

    /// 0xFX1E
    fn op_add_to_index(&mut self, x: u8) {
        self.i = self.i.wrapping_add(self.v[x] as u16);
    }

    /// 0xFX29
    fn op_font_character(&mut self, x: u8) {
        self.i = (FONT_ADDR + FONT_CHAR_LENGTH * (self.v[x] & 0xF) as usize) as u16;
    }

    /// 0xFX33
    fn op_convert_to_decimal(&mut self, x: u8) -> Result<(), Fault> {
        let n = self.v[x];
        let digits = [n / 100, n / 10 % 10, n % 10];
        self.memory.store(self.i as usize, &digits)
    }

    /// 0xFX55
    fn op_memory_store(&mut self, x: u8) -> Result<(), Fault> {
        let count = x as usize + 1;
        self.memory
            .store(self.i as usize, &self.v.as_slice()[..count])?;
        if self.config.memory_increment_i {
            self.i += count as u16;
        }
        Ok(())
    }

    /// 0xFX65
    fn op_memory_load(&mut self, x: u8) -> Result<(), Fault> {
        let count = x as usize + 1;
        let data = self.memory.slice(self.i as usize, count)?;
        self.v.as_mut_slice()[..count].copy_from_slice(data);
        if self.config.memory_increment_i {
            self.i += count as u16;
        }
        Ok(())
    }
}

impl FmtDisplay for Chip8 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Registers ===")?;
        for (idx, value) in self.v.as_slice().iter().enumerate() {
            write!(f, "V{:X}={:02X} ", idx, value)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "PC={:04X} I={:04X} DT={:02X} ST={:02X} SP={}",
            self.pc, self.i, self.dt, self.st, self.sp
        )?;
        write!(f, "=== Memory ===\n{}", self.memory)
    }
}
