use std::time::Duration;

use chip8::{Chip8, Driver, Fault, Key, FONT_DATA, ROM_ADDR, SCREEN_HEIGHT, SCREEN_WIDTH};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn chip8_with(rom: &[u8]) -> Chip8 {
    init_logger();
    let mut chip8 = Chip8::new().unwrap().with_seed(0x5EED);
    chip8.load_rom(rom).unwrap();
    chip8
}

fn lit_pixels(chip8: &Chip8) -> usize {
    chip8
        .display()
        .rows()
        .iter()
        .flatten()
        .filter(|&&cell| cell)
        .count()
}

#[test]
fn load_and_set_index() {
    let mut chip8 = chip8_with(&[0x60, 0x05, 0xA2, 0x00]);
    chip8.tick().unwrap();
    chip8.tick().unwrap();

    assert_eq!(chip8.v()[0], 5);
    assert_eq!(chip8.i(), 0x200);
    assert_eq!(chip8.pc(), 0x204);
}

#[test]
fn single_byte_sprite_at_origin() {
    // LD I, 0x206 ; DRW V0, V0, 1 ; JP 0x204 ; sprite
    let mut chip8 = chip8_with(&[0xA2, 0x06, 0xD0, 0x01, 0x12, 0x04, 0xFF]);
    chip8.tick().unwrap();
    chip8.tick().unwrap();

    for x in 0..8 {
        assert!(chip8.display().is_set(x, 0));
    }
    assert_eq!(lit_pixels(&chip8), 8);
    assert_eq!(chip8.v()[0xF], 0);
}

#[test]
fn sprite_wraps_around_the_corner() {
    // LD V0, 63 ; LD V1, 31 ; LD I, 0x20C ; DRW V0, V1, 2 ; JP 0x208 ; pad ; sprite
    #[rustfmt::skip]
    let mut chip8 = chip8_with(&[
        0x60, 0x3F,
        0x61, 0x1F,
        0xA2, 0x0C,
        0xD0, 0x12,
        0x12, 0x08,
        0x00, 0x00,
        0xC0, 0xC0,
    ]);
    for _ in 0..4 {
        chip8.tick().unwrap();
    }

    let fb = chip8.fb();
    assert!(fb[SCREEN_HEIGHT - 1][SCREEN_WIDTH - 1]);
    assert!(fb[SCREEN_HEIGHT - 1][0]);
    assert!(fb[0][SCREEN_WIDTH - 1]);
    assert!(fb[0][0]);
    assert!(!fb[0][1]);
    assert_eq!(lit_pixels(&chip8), 4);
}

#[test]
fn drawing_twice_erases_and_reports_collision() {
    // LD V0, 0xA ; LD F, V0 ; DRW V1, V2, 5 ; DRW V1, V2, 5
    let mut chip8 = chip8_with(&[0x60, 0x0A, 0xF0, 0x29, 0xD1, 0x25, 0xD1, 0x25]);
    chip8.tick().unwrap();
    chip8.tick().unwrap();
    assert_eq!(chip8.i(), 0xA * 5);

    chip8.tick().unwrap();
    assert_eq!(chip8.v()[0xF], 0);
    assert!(lit_pixels(&chip8) > 0);

    chip8.tick().unwrap();
    assert_eq!(chip8.v()[0xF], 1);
    assert_eq!(lit_pixels(&chip8), 0);
}

#[test]
fn clear_screen_turns_everything_off() {
    // LD I, 0 ; DRW V0, V0, 15 ; CLS
    let mut chip8 = chip8_with(&[0xA0, 0x00, 0xD0, 0x0F, 0x00, 0xE0]);
    chip8.tick().unwrap();
    chip8.tick().unwrap();
    assert!(lit_pixels(&chip8) > 0);

    chip8.tick().unwrap();
    assert_eq!(lit_pixels(&chip8), 0);
    assert!(chip8.is_fb_dirty());
}

#[test]
fn call_and_return() {
    // 0x200: CALL 0x208 ; 0x202: LD V1, 2 ; 0x204: JP 0x204
    // 0x208: LD V0, 1 ; 0x20A: RET
    #[rustfmt::skip]
    let mut chip8 = chip8_with(&[
        0x22, 0x08,
        0x61, 0x02,
        0x12, 0x04,
        0x00, 0x00,
        0x60, 0x01,
        0x00, 0xEE,
    ]);
    chip8.tick().unwrap();
    assert_eq!(chip8.pc(), 0x208);
    assert_eq!(chip8.stack_depth(), 1);

    chip8.tick().unwrap();
    chip8.tick().unwrap();
    assert_eq!(chip8.pc(), 0x202);
    assert_eq!(chip8.stack_depth(), 0);

    chip8.tick().unwrap();
    assert_eq!((chip8.v()[0], chip8.v()[1]), (1, 2));

    // returning again has nowhere to go
    let mut chip8 = chip8_with(&[0x00, 0xEE]);
    let fault = chip8.tick().unwrap_err();
    assert_eq!(fault, Fault::StackUnderflow { addr: 0x200 });
    assert!(fault.is_fatal());
}

#[test]
fn timers_never_underflow() {
    // LD V0, 3 ; LD DT, V0 ; LD ST, V0 ; JP 0x206
    let mut chip8 = chip8_with(&[0x60, 0x03, 0xF0, 0x15, 0xF0, 0x18, 0x12, 0x06]);
    for _ in 0..50 {
        chip8.tick().unwrap();
    }
    assert_eq!(chip8.dt(), 0);
    assert_eq!(chip8.st(), 0);
    assert!(!chip8.is_sound_playing());
}

#[test]
fn paused_timers_hold_while_code_runs() {
    // LD V0, 9 ; LD DT, V0 ; LD ST, V0 ; ADD V1, 1 ; JP 0x206
    let mut chip8 = chip8_with(&[
        0x60, 0x09, 0xF0, 0x15, 0xF0, 0x18, 0x71, 0x01, 0x12, 0x06,
    ]);
    chip8.pause();
    for _ in 0..13 {
        chip8.tick().unwrap();
    }
    assert_eq!((chip8.dt(), chip8.st()), (9, 9));
    assert_eq!(chip8.v()[1], 5);
}

#[test]
fn decimal_digits_read_back_into_registers() {
    // LD V0, 137 ; LD I, 0x300 ; LD B, V0 ; LD V2, [I]
    let mut chip8 = chip8_with(&[0x60, 0x89, 0xA3, 0x00, 0xF0, 0x33, 0xF2, 0x65]);
    for _ in 0..4 {
        chip8.tick().unwrap();
    }
    assert_eq!(chip8.v().as_slice()[..3], [1, 3, 7]);
    assert_eq!(chip8.i(), 0x300);
}

#[test]
fn wait_for_key() {
    // LD V3, K ; ADD V3, 1
    let mut chip8 = chip8_with(&[0xF3, 0x0A, 0x73, 0x01]);
    for _ in 0..3 {
        chip8.tick().unwrap();
    }
    assert_eq!(chip8.pc(), 0x200);

    chip8.keydown(Key::from_label("w"));
    chip8.tick().unwrap();
    chip8.keyup();
    chip8.tick().unwrap();
    chip8.tick().unwrap();
    assert_eq!(chip8.v()[3], 0x6);
}

#[test]
fn glyphs_survive_program_writes() {
    // LD I, 0x010 ; LD [I], V3
    let mut chip8 = chip8_with(&[0xA0, 0x10, 0xF3, 0x55]);
    chip8.tick().unwrap();
    assert_eq!(chip8.tick(), Err(Fault::ProtectedWrite { addr: 0x010 }));

    // FONT_DATA is still what a sprite draw reads back
    let mut chip8 = chip8_with(&[0x60, 0x02, 0xF0, 0x29, 0xD1, 0x15]);
    for _ in 0..3 {
        chip8.tick().unwrap();
    }
    let row = FONT_DATA[2 * 5];
    for col in 0..8 {
        assert_eq!(chip8.display().is_set(col, 0), (row >> (7 - col)) & 1 == 1);
    }
}

#[test]
fn driver_runs_program_to_completion() {
    init_logger();
    let mut chip8 = Chip8::new().unwrap().with_seed(1);
    // LD V0, 0 ; ADD V0, 1 ; SE V0, 10 ; JP 0x202 ; JP 0x208
    chip8
        .load(
            &[0x60, 0x00, 0x70, 0x01, 0x30, 0x0A, 0x12, 0x02, 0x12, 0x08],
            ROM_ADDR,
        )
        .unwrap();
    let mut driver = Driver::new(chip8, Duration::ZERO);
    driver.run_for(100, |_| {}).unwrap();

    let chip8 = driver.into_inner();
    assert_eq!(chip8.v()[0], 10);
    assert_eq!(chip8.pc(), 0x208);
}
