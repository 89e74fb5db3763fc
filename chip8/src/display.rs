use std::fmt::Display as FmtDisplay;

use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

pub type FrameBuffer = [[bool; SCREEN_WIDTH]; SCREEN_HEIGHT];

pub struct Display {
    /// One cell per pixel, indexed as `fb[y][x]`
    pub(crate) fb: FrameBuffer,
    pub(crate) dirty: bool,
}

impl Display {
    pub fn new() -> Self {
        Self {
            fb: [[false; SCREEN_WIDTH]; SCREEN_HEIGHT],
            dirty: false,
        }
    }

    /// Take a copy of the frame buffer and mark the display as presented
    pub fn fb(&mut self) -> FrameBuffer {
        self.dirty = false;
        self.fb
    }

    pub fn rows(&self) -> &FrameBuffer {
        &self.fb
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Toggle the pixel at the coordinates and return true if it was already on
    /// This function marks the display as dirty, causing it to be re-rendered on the next update
    fn toggle(&mut self, x: usize, y: usize) -> bool {
        self.dirty = true;
        let prev = self.fb[y][x];
        self.fb[y][x] = !prev;
        prev
    }

    /// XOR the sprite `rows` onto the screen with its top-left corner at (`x`, `y`)
    ///
    /// Coordinates wrap around both edges. Returns true if any pixel was switched off.
    pub fn draw_sprite(&mut self, x: usize, y: usize, rows: &[u8]) -> bool {
        let mut collision = false;
        for (row, &byte) in rows.iter().enumerate() {
            let py = (y + row) % SCREEN_HEIGHT;
            for col in 0..8 {
                if (byte >> (7 - col)) & 0x1 == 0 {
                    continue;
                }
                let px = (x + col) % SCREEN_WIDTH;
                collision |= self.toggle(px, py);
            }
        }
        collision
    }

    /// Clear the display contents
    /// This function marks the display as dirty, causing it to be re-rendered on the next update
    pub fn clear(&mut self) {
        self.dirty = true;
        for row in self.fb.iter_mut() {
            row.fill(false);
        }
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.fb[y % SCREEN_HEIGHT][x % SCREEN_WIDTH]
    }
}

impl FmtDisplay for Display {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.fb.iter() {
            for &cell in row {
                write!(f, "{}", if cell { '#' } else { '.' })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
