//! Terminal renderer. Draws a [`Snapshot`] into a pixel buffer and flushes it
//! with half-block characters, two pixels per terminal cell.

use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};

use crate::input::ControlMode;
use crate::session::GameState;
use crate::snapshot::{BirdPose, PipeView, Snapshot};

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Rgb(u8, u8, u8);

impl Rgb {
    const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    const fn dim(self) -> Rgb {
        Rgb(self.0 / 2, self.1 / 2, self.2 / 2)
    }
}

const LETTERBOX: Rgb = Rgb(12, 14, 20);
const SKY_TOP: Rgb = Rgb(70, 180, 200);
const SKY_BOT: Rgb = Rgb(190, 232, 245);
const GRASS: Rgb = Rgb(84, 168, 55);
const GRASS_LIGHT: Rgb = Rgb(110, 200, 70);
const DIRT: Rgb = Rgb(210, 185, 110);
const DIRT_DARK: Rgb = Rgb(185, 160, 90);
const PANEL: Rgb = Rgb(220, 195, 120);
const PIPE_L: Rgb = Rgb(74, 122, 26);
const PIPE_M: Rgb = Rgb(100, 170, 40);
const PIPE_R: Rgb = Rgb(115, 191, 46);
const PIPE_HI: Rgb = Rgb(145, 215, 62);
const CAP_DARK: Rgb = Rgb(60, 100, 20);
const BIRD_Y: Rgb = Rgb(245, 200, 66);
const BIRD_HI: Rgb = Rgb(255, 225, 100);
const BIRD_WING: Rgb = Rgb(215, 165, 35);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_PUPIL: Rgb = Rgb(20, 20, 20);
const BIRD_BEAK: Rgb = Rgb(225, 75, 35);
const HILL_FAR: Rgb = Rgb(120, 195, 75);
const HILL_NEAR: Rgb = Rgb(95, 175, 55);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);
const GESTURE: Rgb = Rgb(225, 110, 200);

// ── Pixel buffer with half-block rendering ──────────────────────────────────

struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![LETTERBOX; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, LETTERBOX);
    }

    fn clear(&mut self, c: Rgb) {
        self.px.fill(c);
    }

    fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    fn flush(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = Rgb(0, 0, 0);
        let mut prev_bg = Rgb(0, 0, 0);
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if need_bg || prev_bg != top {
                        queue!(out, style::SetBackgroundColor(to_color(top)))?;
                        prev_bg = top;
                        need_bg = false;
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(out, style::SetForegroundColor(to_color(top)))?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    if need_bg || prev_bg != bot {
                        queue!(out, style::SetBackgroundColor(to_color(bot)))?;
                        prev_bg = bot;
                        need_bg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)?;
        out.flush()
    }
}

fn to_color(c: Rgb) -> CColor {
    CColor::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

// ── 3x5 bitmap digits ──────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

/// `k` is the size of one glyph dot in pixels.
fn draw_digit(buf: &mut PixelBuf, x: i32, y: i32, d: u8, k: i32, fg: Rgb) {
    let glyph = &DIGITS[d as usize];
    for row in 0..5 {
        for col in 0..3 {
            if glyph[row * 3 + col] == 1 {
                let px = x + col as i32 * k;
                let py = y + row as i32 * k;
                buf.fill_rect(px + 1, py + 1, k, k, SHADOW);
                buf.fill_rect(px, py, k, k, fg);
            }
        }
    }
}

fn draw_number(buf: &mut PixelBuf, cx: i32, y: i32, n: u32, k: i32, fg: Rgb) {
    let s = n.to_string();
    let advance = 4 * k; // 3 dots per digit + 1 dot spacing
    let total_w = s.len() as i32 * advance - k;
    let start_x = cx - total_w / 2;
    for (i, ch) in s.bytes().enumerate() {
        draw_digit(buf, start_x + i as i32 * advance, y, ch - b'0', k, fg);
    }
}

// ── Game-to-pixel mapping ───────────────────────────────────────────────────

/// Uniform scale that fits the play field into the buffer, centered.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Viewport {
    scale: f64,
    ox: f64,
    oy: f64,
    w: i32,
    h: i32,
}

impl Viewport {
    fn fit(pw: usize, ph: usize, field_w: u32, field_h: u32) -> Self {
        let scale = (pw as f64 / f64::from(field_w)).min(ph as f64 / f64::from(field_h));
        let w = f64::from(field_w) * scale;
        let h = f64::from(field_h) * scale;
        Self {
            scale,
            ox: ((pw as f64 - w) / 2.0).floor(),
            oy: ((ph as f64 - h) / 2.0).floor(),
            w: w as i32,
            h: h as i32,
        }
    }

    fn x(&self, gx: f64) -> i32 {
        (self.ox + gx * self.scale).floor() as i32
    }

    fn y(&self, gy: f64) -> i32 {
        (self.oy + gy * self.scale).floor() as i32
    }

    /// Game length to pixels, never below one pixel.
    fn len(&self, l: f64) -> i32 {
        ((l * self.scale).round() as i32).max(1)
    }

    /// Integer glyph size for HUD text.
    fn dot(&self) -> i32 {
        ((self.h as f64 / 60.0) as i32).max(1)
    }
}

// ── Renderer ────────────────────────────────────────────────────────────────

pub struct Renderer {
    buf: PixelBuf,
    frame: u64,
}

impl Renderer {
    /// Size in terminal cells.
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            buf: PixelBuf::new(cols as usize, rows as usize * 2),
            frame: 0,
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.buf.resize(cols as usize, rows as usize * 2);
    }

    pub fn draw(&mut self, snap: &Snapshot, out: &mut impl Write) -> io::Result<()> {
        self.compose(snap);
        self.buf.flush(out)
    }

    fn compose(&mut self, snap: &Snapshot) {
        self.frame += 1;
        let view = Viewport::fit(self.buf.w, self.buf.h, snap.field.width, snap.field.height);
        let buf = &mut self.buf;

        buf.clear(LETTERBOX);
        draw_sky(buf, &view, snap);
        draw_hills(buf, &view, snap);
        if snap.state != GameState::Welcome {
            for pipe in &snap.pipes {
                draw_pipe(buf, &view, snap, pipe);
            }
        }
        draw_ground(buf, &view, snap);
        draw_bird(buf, &view, &snap.bird, self.frame);

        match snap.state {
            GameState::Welcome => draw_title(buf, &view, snap),
            GameState::Playing => {
                draw_number(buf, view.x(f64::from(snap.field.width) / 2.0), view.y(20.0), snap.score, view.dot(), WHITE)
            }
            GameState::GameOver => draw_game_over(buf, &view, snap),
        }
        draw_mode(buf, &view, snap);
    }
}

fn draw_sky(buf: &mut PixelBuf, view: &Viewport, snap: &Snapshot) {
    let top = view.y(0.0);
    let bottom = view.y(f64::from(snap.ground_y()));
    let span = (bottom - top).max(1);
    for y in top..bottom {
        let t = ((y - top) * 256 / span) as u16;
        let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
        buf.fill_rect(view.x(0.0), y, view.w, 1, c);
    }
}

fn draw_hills(buf: &mut PixelBuf, view: &Viewport, snap: &Snapshot) {
    let base = view.y(f64::from(snap.ground_y()));
    // Background offset counts down; negate so hills drift left.
    let shift = -snap.scenery.background_x;
    for (speed, freq, amp, lift, c) in [(0.5, 0.004, 60.0, 40.0, HILL_FAR), (1.0, 0.006, 40.0, 20.0, HILL_NEAR)] {
        for i in 0..view.w {
            let gx = f64::from(i) / view.scale;
            let fx = (gx - shift * speed) * freq;
            let h = (fx.sin() * amp + (fx * 1.7).sin() * amp / 2.0 + lift) * view.scale;
            let top = base - h.max(0.0) as i32;
            for y in top..base {
                buf.set(view.x(0.0) + i, y, c);
            }
        }
    }
}

fn draw_ground(buf: &mut PixelBuf, view: &Viewport, snap: &Snapshot) {
    let gy = view.y(f64::from(snap.ground_y()));
    let bottom = view.y(f64::from(snap.field.height));
    let left = view.x(0.0);
    let offset = (snap.scenery.ground_x * view.scale) as i32;
    // Grass strip
    for i in 0..view.w {
        let alt = ((i + offset) / 3) % 2 == 0;
        buf.set(left + i, gy, if alt { GRASS } else { GRASS_LIGHT });
        buf.set(left + i, gy + 1, GRASS);
    }
    // Dirt
    for y in (gy + 2)..bottom {
        for i in 0..view.w {
            let stripe = (i + offset + (y - gy) * 2).rem_euclid(12) < 6;
            buf.set(left + i, y, if stripe { DIRT } else { DIRT_DARK });
        }
    }
}

fn draw_pipe(buf: &mut PixelBuf, view: &Viewport, snap: &Snapshot, pipe: &PipeView) {
    let px = view.x(pipe.x);
    let pw = view.len(f64::from(pipe.width));
    let gap_top = view.y(f64::from(pipe.top_height));
    let gap_bot = view.y(f64::from(pipe.bottom_y));
    let floor = view.y(f64::from(snap.ground_y()));
    let cap_extra = view.len(4.0);
    let cap_h = view.len(24.0).max(2);
    let field_l = view.x(0.0);
    let field_r = field_l + view.w;

    let column = |buf: &mut PixelBuf, x: i32, c: Rgb, y0: i32, y1: i32| {
        if x < field_l || x >= field_r {
            return;
        }
        for y in y0..y1 {
            buf.set(x, y, c);
        }
    };

    // Bodies
    for x in 0..pw {
        let c = pipe_shade(x, pw);
        column(buf, px + x, c, view.y(0.0), gap_top - cap_h);
        column(buf, px + x, c, gap_bot + cap_h, floor);
    }
    // Caps
    for x in -cap_extra..(pw + cap_extra) {
        let c = pipe_shade(x + cap_extra, pw + cap_extra * 2);
        column(buf, px + x, c, gap_top - cap_h, gap_top);
        column(buf, px + x, CAP_DARK, gap_top - cap_h, gap_top - cap_h + 1);
        column(buf, px + x, CAP_DARK, gap_top - 1, gap_top);
        column(buf, px + x, c, gap_bot, gap_bot + cap_h);
        column(buf, px + x, CAP_DARK, gap_bot, gap_bot + 1);
        column(buf, px + x, CAP_DARK, gap_bot + cap_h - 1, gap_bot + cap_h);
    }
}

fn draw_bird(buf: &mut PixelBuf, view: &Viewport, bird: &BirdPose, frame: u64) {
    let x = view.x(bird.x);
    let y = view.y(bird.y);
    let w = view.len(f64::from(bird.width));
    let h = view.len(f64::from(bird.height));

    // Nose up lifts the beak, nose down drops it.
    let tilt = if bird.angle > 10.0 {
        -1
    } else if bird.angle < -45.0 {
        1
    } else {
        0
    };

    // Body
    buf.fill_rect(x, y, w, h, BIRD_Y);
    buf.fill_rect(x + 1, y, (w - 2).max(1), (h / 6).max(1), BIRD_HI);

    // Wing
    let wing_y = y + h / 2 + if frame % 8 < 4 { -1 } else { 1 } + tilt;
    buf.fill_rect(x + 1, wing_y, (w / 3).max(1), (h / 4).max(1), BIRD_WING);

    // Eye
    let eye = (w / 6).max(1);
    let ex = x + w - eye * 2 - 1;
    let ey = y + (h / 5).max(1);
    buf.fill_rect(ex, ey, eye + 1, eye + 1, BIRD_EYE);
    buf.set(ex + eye, ey + eye, BIRD_PUPIL);

    // Beak
    let beak_w = (w / 4).max(2);
    let beak_h = (h / 4).max(1);
    buf.fill_rect(x + w, y + h / 2 - beak_h / 2 + tilt, beak_w, beak_h, BIRD_BEAK);

    // Tail
    let tail_w = (w / 8).max(1);
    buf.fill_rect(x - tail_w, y + h / 2 - 1 - tilt, tail_w, 2, BIRD_WING);
}

fn draw_title(buf: &mut PixelBuf, view: &Viewport, snap: &Snapshot) {
    let cx = view.x(f64::from(snap.field.width) / 2.0);
    let cy = view.y(f64::from(snap.field.height) / 4.0);
    // "FLAPPY" in big blocky letters
    let char_w = view.len(40.0);
    let char_h = view.len(60.0);
    let total_w = 6 * char_w;
    let sx = cx - total_w / 2;
    for i in 0..6 {
        let bx = sx + i * char_w;
        buf.fill_rect(bx, cy, char_w - 1, char_h, BIRD_Y);
        buf.fill_rect(bx, cy, char_w - 1, 1, BIRD_HI);
    }

    // Subtitle: "SPACE TO FLAP" as blocks
    let k = view.dot();
    let sub_y = cy + char_h + 4 * k;
    let msg = "SPACE TO FLAP";
    let msg_w = msg.len() as i32 * 4 * k;
    let msg_x = cx - msg_w / 2;
    for (i, ch) in msg.chars().enumerate() {
        if ch == ' ' {
            continue;
        }
        buf.fill_rect(msg_x + i as i32 * 4 * k, sub_y, 3 * k, 3 * k, WHITE);
    }
}

fn draw_game_over(buf: &mut PixelBuf, view: &Viewport, snap: &Snapshot) {
    // Dark overlay
    for y in 0..buf.h {
        for x in 0..buf.w {
            let c = buf.get(x, y);
            buf.set(x as i32, y as i32, c.dim());
        }
    }

    let cx = view.x(f64::from(snap.field.width) / 2.0);
    let cy = view.y(f64::from(snap.field.height) / 2.0);
    let panel_w = view.len(320.0);
    let panel_h = view.len(160.0);
    let px = cx - panel_w / 2;
    let py = cy - panel_h / 2;
    buf.fill_rect(px - 1, py - 1, panel_w + 2, panel_h + 2, SHADOW);
    buf.fill_rect(px, py, panel_w, panel_h, DIRT);
    buf.fill_rect(px + 1, py + 1, panel_w - 2, panel_h - 2, PANEL);

    let k = view.dot() * 2;
    draw_number(buf, cx, cy - 5 * k / 2, snap.score, k, WHITE);
}

/// Top-right badge: white for keyboard, pink plus camera index for gestures.
fn draw_mode(buf: &mut PixelBuf, view: &Viewport, snap: &Snapshot) {
    let k = view.dot();
    let right = view.x(f64::from(snap.field.width)) - 2 * k;
    let top = view.y(0.0) + 2 * k;
    match snap.control_mode {
        ControlMode::Keyboard => buf.fill_rect(right - 3 * k, top, 3 * k, 3 * k, WHITE),
        ControlMode::Gesture => {
            buf.fill_rect(right - 3 * k, top, 3 * k, 3 * k, GESTURE);
            let digit = (snap.input_device % 10) as u8;
            draw_digit(buf, right - 8 * k, top, digit, k, GESTURE);
        }
    }
}

fn pipe_shade(x: i32, total_w: i32) -> Rgb {
    if total_w <= 1 {
        return PIPE_M;
    }
    let t = (x.clamp(0, total_w - 1) as f64 / (total_w - 1) as f64 * 256.0) as u16;
    if t < 64 {
        Rgb::lerp(PIPE_L, PIPE_M, (t * 4).min(256))
    } else if t < 100 {
        Rgb::lerp(PIPE_M, PIPE_HI, ((t - 64) * 7).min(256))
    } else if t < 160 {
        Rgb::lerp(PIPE_HI, PIPE_R, ((t - 100) * 4).min(256))
    } else {
        Rgb::lerp(PIPE_R, PIPE_L, ((t - 160) * 3).min(256))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::input::Intent;
    use crate::session::GameSession;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn snapshot(state_jump: bool) -> Snapshot {
        let mut s = GameSession::with_rng(GameConfig::default(), StdRng::seed_from_u64(3)).unwrap();
        if state_jump {
            s.handle_intent(Intent::Jump, 0);
            s.insert_pipe(500.0, 200);
        }
        s.snapshot()
    }

    #[test]
    fn viewport_letterboxes_wide_terminals() {
        let view = Viewport::fit(200, 60, 800, 600);
        assert_eq!(view.scale, 0.1);
        assert_eq!(view.w, 80);
        assert_eq!(view.h, 60);
        assert_eq!(view.x(0.0), 60);
        assert_eq!(view.y(0.0), 0);
        assert_eq!(view.x(800.0), 140);
    }

    #[test]
    fn bird_and_pipe_land_where_expected() {
        let mut r = Renderer::new(80, 30);
        let snap = snapshot(true);
        r.compose(&snap);
        let view = Viewport::fit(80, 60, 800, 600);
        // Middle of the bird body.
        let bx = view.x(snap.bird.x) + 1;
        let by = view.y(snap.bird.y) + view.len(30.0) / 2;
        assert_ne!(r.buf.get(bx as usize, by as usize), SKY_TOP);
        // Inside the top pipe body, well above the cap.
        let px = view.x(520.0) as usize;
        let py = view.y(40.0) as usize;
        let c = r.buf.get(px, py);
        assert!(c.1 > c.0 && c.1 > c.2, "expected green pipe, got {c:?}");
    }

    #[test]
    fn flush_writes_one_frame() {
        let mut r = Renderer::new(40, 12);
        let mut out = Vec::new();
        r.draw(&snapshot(false), &mut out).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert_eq!(text.matches("\r\n").count(), 11);
    }

    #[test]
    fn game_over_darkens_the_scene() {
        let mut s = GameSession::with_rng(GameConfig::default(), StdRng::seed_from_u64(3)).unwrap();
        s.handle_intent(Intent::Jump, 0);
        while s.state() == GameState::Playing {
            s.update(16);
        }
        let mut r = Renderer::new(80, 30);
        r.compose(&s.snapshot());
        // Top-left sky pixel is dimmed.
        let view = Viewport::fit(80, 60, 800, 600);
        let c = r.buf.get(view.x(0.0) as usize, view.y(0.0) as usize);
        assert!(c.2 < SKY_TOP.2);
    }
}
