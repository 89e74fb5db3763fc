/// A host key normalized to one of the 16 hexadecimal keys, or no key at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key(Option<u8>);

impl Key {
    pub const NONE: Key = Key(None);

    pub fn from_scancode(value: u32) -> Self {
        match value {
            18 => Self(Some(0x1)), // 1 -> 1
            19 => Self(Some(0x2)), // 2 -> 2
            20 => Self(Some(0x3)), // 3 -> 3
            21 => Self(Some(0xC)), // 4 -> C
            12 => Self(Some(0x4)), // Q -> 4
            13 => Self(Some(0x5)), // W -> 5
            14 => Self(Some(0x6)), // E -> 6
            15 => Self(Some(0xD)), // R -> D
            0 => Self(Some(0x7)),  // A -> 7
            1 => Self(Some(0x8)),  // S -> 8
            2 => Self(Some(0x9)),  // D -> 9
            3 => Self(Some(0xE)),  // F -> E
            6 => Self(Some(0xA)),  // Z -> A
            7 => Self(Some(0x0)),  // X -> 0
            8 => Self(Some(0xB)),  // C -> B
            9 => Self(Some(0xF)),  // V -> F
            _ => Self(None),
        }
    }

    pub fn from_label(value: &str) -> Self {
        match value {
            "1" => Self(Some(0x1)),
            "2" => Self(Some(0x2)),
            "3" => Self(Some(0x3)),
            "4" => Self(Some(0xC)),
            "q" => Self(Some(0x4)),
            "w" => Self(Some(0x5)),
            "e" => Self(Some(0x6)),
            "r" => Self(Some(0xD)),
            "a" => Self(Some(0x7)),
            "s" => Self(Some(0x8)),
            "d" => Self(Some(0x9)),
            "f" => Self(Some(0xE)),
            "z" => Self(Some(0xA)),
            "x" => Self(Some(0x0)),
            "c" => Self(Some(0xB)),
            "v" => Self(Some(0xF)),
            _ => Self(None),
        }
    }

    /// Use the low nibble of `value` as the key directly
    pub fn from_hex(value: u8) -> Self {
        Self(Some(value & 0xF))
    }

    pub fn value(&self) -> Option<u8> {
        self.0
    }
}

/// Tracks the most recent key the host reported as held down
pub struct Keypad {
    pub(crate) pressed: Option<u8>,
    pub(crate) awaiting_release: Option<u8>,
}

impl Keypad {
    pub fn new() -> Self {
        Self {
            pressed: None,
            awaiting_release: None,
        }
    }

    pub fn keydown(&mut self, key: Key) {
        if let Some(key) = key.0 {
            self.pressed = Some(key);
        }
    }

    /// Any release clears the input state; only one key is tracked at a time
    pub fn keyup(&mut self) {
        self.pressed = None;
    }

    pub fn pressed(&self) -> Option<u8> {
        self.pressed
    }

    pub fn await_release(&mut self, key: u8) {
        self.awaiting_release = Some(key);
    }

    pub fn process_release(&mut self) {
        self.awaiting_release = None;
    }

    pub fn is_key_down(&self, key: u8) -> bool {
        self.pressed == Some(key & 0xF)
    }

    pub fn is_key_up(&self, key: u8) -> bool {
        !self.is_key_down(key)
    }
}
