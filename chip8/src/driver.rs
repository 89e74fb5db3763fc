//! Runs a [`Chip8`] at a fixed cadence.
//!
//! The driver owns the interpreter and calls [`Chip8::tick`] once per
//! interval until it is stopped, a tick limit is reached, or the program
//! faults in a way that can't be skipped over.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, error, warn};

use crate::{Chip8, Fault, FrameBuffer, Key};

/// Requests a running [`Driver`] to stop, possibly from another thread
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct Driver {
    chip8: Chip8,
    interval: Duration,
    stop: StopHandle,
}

impl Driver {
    pub fn new(chip8: Chip8, interval: Duration) -> Self {
        Self {
            chip8,
            interval,
            stop: StopHandle::default(),
        }
    }

    pub fn chip8(&self) -> &Chip8 {
        &self.chip8
    }

    pub fn chip8_mut(&mut self) -> &mut Chip8 {
        &mut self.chip8
    }

    pub fn into_inner(self) -> Chip8 {
        self.chip8
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Reset the interpreter and forget any earlier stop request
    pub fn initialize(&mut self) -> Result<(), Fault> {
        self.stop.clear();
        self.chip8.reset()
    }

    pub fn load(&mut self, bytes: &[u8], offset: usize) -> Result<usize, Fault> {
        self.chip8.load(bytes, offset)
    }

    pub fn tick(&mut self) -> Result<(), Fault> {
        self.chip8.tick()
    }

    pub fn pause(&mut self) {
        self.chip8.pause();
    }

    pub fn resume(&mut self) {
        self.chip8.resume();
    }

    pub fn stop(&self) {
        debug!("stop requested");
        self.stop.stop();
    }

    pub fn keydown(&mut self, key: Key) {
        self.chip8.keydown(key);
    }

    pub fn keyup(&mut self) {
        self.chip8.keyup();
    }

    /// Tick until stopped or a fatal fault, handing each changed frame to `on_frame`
    ///
    /// Returns the number of ticks executed.
    pub fn run(&mut self, on_frame: impl FnMut(&FrameBuffer)) -> Result<usize, Fault> {
        self.run_inner(None, on_frame)
    }

    /// Like [`Driver::run`], but gives up after `ticks` ticks
    pub fn run_for(
        &mut self,
        ticks: usize,
        on_frame: impl FnMut(&FrameBuffer),
    ) -> Result<usize, Fault> {
        self.run_inner(Some(ticks), on_frame)
    }

    fn run_inner(
        &mut self,
        limit: Option<usize>,
        mut on_frame: impl FnMut(&FrameBuffer),
    ) -> Result<usize, Fault> {
        let mut ticks = 0;
        let mut deadline = Instant::now();

        while !self.stop.is_stopped() && limit.map_or(true, |limit| ticks < limit) {
            match self.chip8.tick() {
                Ok(()) => {}
                Err(fault) if !fault.is_fatal() => warn!("{}", fault),
                Err(fault) => {
                    error!("{}", fault);
                    return Err(fault);
                }
            }
            ticks += 1;

            if self.chip8.is_fb_dirty() {
                let fb = self.chip8.fb();
                on_frame(&fb);
            }

            if !self.interval.is_zero() {
                deadline += self.interval;
                let now = Instant::now();
                if deadline > now {
                    thread::sleep(deadline - now);
                } else {
                    // fell behind, don't try to catch up with a burst of ticks
                    deadline = now;
                }
            }
        }

        debug!("driver ran {} ticks", ticks);
        Ok(ticks)
    }
}
