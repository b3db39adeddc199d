//! Screen renderer
//!
//! Pure function of the application state: everything drawn here comes
//! from [`App`], and nothing is remembered between frames.

use core::fmt::Write;

use embedded_graphics::mono_font::ascii::FONT_6X9;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use heapless::String;

use smon_core::animation::AnimationState;
use smon_core::metrics::MetricSnapshot;
use smon_core::state::{LinkState, Mood};
use smon_core::{App, Millis};

use crate::layout::*;

const TEXT: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(&FONT_6X9, BinaryColor::On);
const TEXT_INVERTED: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(&FONT_6X9, BinaryColor::Off);
const FILL: PrimitiveStyle<BinaryColor> = PrimitiveStyle::with_fill(BinaryColor::On);
const STROKE: PrimitiveStyle<BinaryColor> = PrimitiveStyle::with_stroke(BinaryColor::On, 1);

const WAITING_LINES: [(&str, i32); 4] = [
    ("Smart Monitor", 0),
    ("Waiting for data...", 16),
    ("Check host bridge", 28),
    ("115200 baud", 40),
];

/// Draw one complete frame
///
/// Shows the waiting screen until the first message, the dashboard after.
pub fn render<D>(app: &App, now: Millis, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    target.clear(BinaryColor::Off)?;

    if app.link_state(now) == LinkState::Waiting {
        return draw_waiting(target);
    }

    draw_header(app.metrics(), target)?;
    draw_gauges(app.animation(), target)?;
    draw_face(app, target)?;
    draw_ticker(app.animation(), target)
}

/// Boot splash shown once after panel init
pub fn render_splash<D>(target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    target.clear(BinaryColor::Off)?;
    text(target, "Smart Monitor", 0, 0, TEXT)
}

fn draw_waiting<D>(target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    for (line, y) in WAITING_LINES {
        text(target, line, 0, y, TEXT)?;
    }
    Ok(())
}

fn draw_header<D>(metrics: &MetricSnapshot, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    fill_rect(target, 0, 0, SCREEN_WIDTH, HEADER_HEIGHT)?;

    let mut temp: String<16> = String::new();
    match metrics.temperature() {
        // 11 digits and a unit always fit
        Some(t) => write!(temp, "{}C", t as i32).ok(),
        None => temp.push_str("--C").ok(),
    };
    text(target, &temp, HEADER_TEXT_X, HEADER_TEXT_Y, TEXT_INVERTED)?;

    let x_avail = HEADER_TEXT_X + text_width(&temp) + HEADER_TITLE_GAP;
    let avail_width = (SCREEN_WIDTH - x_avail - 2).max(0);
    let title = clip_to_width(metrics.title(), avail_width);
    let x = (x_avail + (avail_width - text_width(title)) / 2).max(x_avail);
    text(target, title, x, HEADER_TEXT_Y, TEXT_INVERTED)
}

fn draw_gauges<D>(animation: &AnimationState, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let mut y = GAUGES_TOP;
    text(target, "CPU:", GAUGE_LABEL_X, y, TEXT)?;
    y += GAUGE_LABEL_SPACING;
    draw_bar(target, y, animation.cpu_percent() / 100.0)?;

    y += GAUGE_HEIGHT + GAUGE_SPACING;
    text(target, "RAM:", GAUGE_LABEL_X, y, TEXT)?;
    y += GAUGE_LABEL_SPACING;
    draw_bar(target, y, animation.ram_ratio())
}

/// Outlined bar with a fill proportional to `ratio`
fn draw_bar<D>(target: &mut D, y: i32, ratio: f32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Rectangle::new(Point::new(LEFT_X, y), size(GAUGE_WIDTH, GAUGE_HEIGHT))
        .into_styled(STROKE)
        .draw(target)?;

    let inner = GAUGE_WIDTH - 2;
    let fill = bar_fill(inner, ratio);
    if fill > 0 {
        fill_rect(target, LEFT_X + 1, y + 1, fill, GAUGE_HEIGHT - 2)?;
    }
    Ok(())
}

/// Filled width of a bar, rounded to the nearest pixel
fn bar_fill(inner: i32, ratio: f32) -> i32 {
    let ratio = ratio.clamp(0.0, 1.0);
    ((inner as f32 * ratio + 0.5) as i32).clamp(0, inner)
}

fn draw_face<D>(app: &App, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let animation = app.animation();
    let character = animation.character();
    let sleeping = animation.is_sleeping();
    let mood = app.mood();
    let face = FaceGeometry::new(character.head_bob() as i32);

    let left_height = if character.is_blinking() || character.is_winking() {
        1
    } else {
        face.eye_height
    };
    let right_height = if character.is_blinking() {
        1
    } else {
        face.eye_height
    };
    let half_eye = face.eye_width / 2;

    // Eyes
    if sleeping {
        hline(target, face.left_eye_x() - half_eye, face.eye_y, face.eye_width)?;
        hline(target, face.right_eye_x() - half_eye, face.eye_y, face.eye_width)?;
    } else {
        fill_rect(
            target,
            face.left_eye_x() - half_eye,
            face.eye_y - left_height / 2,
            face.eye_width,
            left_height,
        )?;
        fill_rect(
            target,
            face.right_eye_x() - half_eye,
            face.eye_y - right_height / 2,
            face.eye_width,
            right_height,
        )?;
    }

    // Brows
    if !sleeping {
        match mood {
            Mood::Happy => {
                draw_arc_brow(target, &face, face.left_eye_x(), left_height)?;
                draw_arc_brow(target, &face, face.right_eye_x(), right_height)?;
            }
            Mood::Sad => {
                let w = face.eye_width;
                line(
                    target,
                    (face.left_eye_x() - w, face.eye_y - left_height - 1),
                    (face.left_eye_x() + w, face.eye_y - left_height),
                )?;
                line(
                    target,
                    (face.right_eye_x() - w, face.eye_y - right_height),
                    (face.right_eye_x() + w, face.eye_y - right_height - 1),
                )?;
            }
            Mood::Neutral => {}
        }
    }

    // Mouth
    let half_mouth = face.mouth_width / 2;
    let (left, right) = (face.cx - half_mouth, face.cx + half_mouth);
    let y = face.mouth_y;
    match (sleeping, mood) {
        (true, _) | (false, Mood::Neutral) => hline(target, left, y, face.mouth_width)?,
        (false, Mood::Happy) => {
            line(target, (left, y + 2), (face.cx, y + 4))?;
            line(target, (face.cx, y + 4), (right, y + 2))?;
        }
        (false, Mood::Sad) => {
            line(target, (left, y + 2), (face.cx, y))?;
            line(target, (face.cx, y), (right, y + 2))?;
        }
    }

    if sleeping {
        draw_sleep_marks(target, &face, animation.sleep().phase())?;
    }

    if character.is_sweating() {
        let sx = face.right_eye_x() + 2;
        let sy = face.eye_y - 2;
        line(target, (sx, sy), (sx + 1, sy + 2))?;
        line(target, (sx + 1, sy + 2), (sx, sy + 4))?;
    }

    Ok(())
}

/// Small upward arc above one eye
fn draw_arc_brow<D>(target: &mut D, face: &FaceGeometry, eye_x: i32, eye_height: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let x0 = eye_x - face.eye_width;
    let x1 = eye_x + face.eye_width;
    let xc = (x0 + x1) / 2;
    let y = face.eye_y - eye_height - 4;
    line(target, (x0, y), (xc, y - 2))?;
    line(target, (xc, y - 2), (x1, y))
}

/// Anchor of the sleep marks; rises one pixel per phase
fn sleep_marks_origin(face: &FaceGeometry, phase: u8) -> Point {
    Point::new(face.cx + face.radius - 4, face.cy - face.radius + 4 - phase as i32)
}

/// Two stacked "Z" glyphs
fn draw_sleep_marks<D>(target: &mut D, face: &FaceGeometry, phase: u8) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let Point { x, y } = sleep_marks_origin(face, phase);
    line(target, (x, y), (x + 3, y))?;
    line(target, (x + 1, y - 1), (x + 1, y + 2))?;
    line(target, (x, y + 2), (x + 3, y + 2))?;
    line(target, (x + 5, y - 3), (x + 8, y - 3))?;
    line(target, (x + 6, y - 4), (x + 6, y - 1))?;
    line(target, (x + 5, y - 1), (x + 8, y - 1))
}

fn draw_ticker<D>(animation: &AnimationState, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    hline(target, 0, TICKER_RULE_Y, SCREEN_WIDTH)?;
    let ticker = animation.ticker();
    text(target, ticker.text(), ticker.offset_px(), TICKER_TEXT_Y, TEXT)
}

/// Longest prefix of whole characters that fits `width` pixels
fn clip_to_width(s: &str, width: i32) -> &str {
    let max_chars = (width / CHAR_WIDTH).max(0) as usize;
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

fn text_width(s: &str) -> i32 {
    s.chars().count() as i32 * CHAR_WIDTH
}

fn text<D>(target: &mut D, s: &str, x: i32, y: i32, style: MonoTextStyle<'static, BinaryColor>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Text::with_baseline(s, Point::new(x, y), style, Baseline::Top).draw(target)?;
    Ok(())
}

fn size(w: i32, h: i32) -> Size {
    Size::new(w.max(0) as u32, h.max(0) as u32)
}

fn fill_rect<D>(target: &mut D, x: i32, y: i32, w: i32, h: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Rectangle::new(Point::new(x, y), size(w, h))
        .into_styled(FILL)
        .draw(target)
}

fn hline<D>(target: &mut D, x: i32, y: i32, w: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    if w <= 0 {
        return Ok(());
    }
    line(target, (x, y), (x + w - 1, y))
}

fn line<D>(target: &mut D, from: (i32, i32), to: (i32, i32)) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    Line::new(Point::new(from.0, from.1), Point::new(to.0, to.1))
        .into_styled(STROKE)
        .draw(target)
}
