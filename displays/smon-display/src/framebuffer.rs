//! In-memory monochrome frame buffer

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

/// Panel dimensions
pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;
pub const PAGES: usize = HEIGHT / 8;

/// Frame buffer, 1 bit per pixel, organized as pages
///
/// Each byte covers one column of an 8-pixel page, least significant bit
/// at the top.
#[derive(Clone)]
pub struct FrameBuffer {
    pages: [[u8; WIDTH]; PAGES],
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    /// Create a blank buffer
    pub const fn new() -> Self {
        Self {
            pages: [[0; WIDTH]; PAGES],
        }
    }

    /// Raw page data for the panel driver
    pub fn pages(&self) -> &[[u8; WIDTH]; PAGES] {
        &self.pages
    }

    /// Read one pixel; out-of-range coordinates read as off
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        match index(x, y) {
            Some((page, column, bit)) => self.pages[page][column] & bit != 0,
            None => false,
        }
    }

    /// Count lit pixels
    pub fn lit(&self) -> usize {
        self.pages
            .iter()
            .flatten()
            .map(|byte| byte.count_ones() as usize)
            .sum()
    }

    fn set(&mut self, x: i32, y: i32, on: bool) {
        if let Some((page, column, bit)) = index(x, y) {
            if on {
                self.pages[page][column] |= bit;
            } else {
                self.pages[page][column] &= !bit;
            }
        }
    }
}

fn index(x: i32, y: i32) -> Option<(usize, usize, u8)> {
    if x < 0 || y < 0 || x >= WIDTH as i32 || y >= HEIGHT as i32 {
        return None;
    }
    let (x, y) = (x as usize, y as usize);
    Some((y / 8, x, 1 << (y % 8)))
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set(point.x, point.y, color.is_on());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let fill = if color.is_on() { 0xFF } else { 0x00 };
        for page in self.pages.iter_mut() {
            page.fill(fill);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_page_bit_layout() {
        let mut fb = FrameBuffer::new();
        fb.set(5, 0, true);
        fb.set(5, 9, true);
        fb.set(127, 63, true);
        assert_eq!(fb.pages()[0][5], 0b0000_0001);
        assert_eq!(fb.pages()[1][5], 0b0000_0010);
        assert_eq!(fb.pages()[7][127], 0b1000_0000);
        assert_eq!(fb.lit(), 3);
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut fb = FrameBuffer::new();
        Rectangle::new(Point::new(-4, -4), Size::new(8, 8))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut fb)
            .unwrap();
        assert_eq!(fb.lit(), 16);
        assert!(fb.pixel(3, 3));
        assert!(!fb.pixel(4, 4));
        assert!(!fb.pixel(-1, 0));
        assert!(!fb.pixel(128, 0));
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new();
        fb.clear(BinaryColor::On).unwrap();
        assert_eq!(fb.lit(), WIDTH * HEIGHT);
        fb.clear(BinaryColor::Off).unwrap();
        assert_eq!(fb.lit(), 0);
    }
}
