//! Image drawing with Unicode `▀` half-blocks (2 pixels per cell).

use image::RgbaImage;
use ratatui::{buffer::Buffer, layout::Position, layout::Rect, style::Color};

/// Draw `img` fitted inside `area`, centred on both axes.
///
/// Each cell shows 1 pixel wide × 2 pixels tall: the top pixel as the
/// foreground of `▀`, the bottom one as its background.  Images are never
/// scaled up.
pub fn render_image(img: &RgbaImage, area: Rect, buf: &mut Buffer) {
    if area.width == 0 || area.height == 0 || img.width() == 0 || img.height() == 0 {
        return;
    }

    let max_px_w = area.width as f64;
    let max_px_h = area.height as f64 * 2.0;
    let src_w = img.width() as f64;
    let src_h = img.height() as f64;

    let scale = (max_px_w / src_w).min(max_px_h / src_h).min(1.0);
    let fit_w = (src_w * scale).round().max(1.0) as u32;
    let fit_h = (src_h * scale).round().max(1.0) as u32;

    let rgba = if (fit_w, fit_h) == (img.width(), img.height()) {
        img.clone()
    } else {
        image::imageops::thumbnail(img, fit_w, fit_h)
    };
    let (iw, ih) = (rgba.width(), rgba.height());

    let col_offset = area.width.saturating_sub(iw as u16) / 2;
    let rows_used = ih.div_ceil(2) as u16;
    let row_offset = area.height.saturating_sub(rows_used) / 2;

    for row in 0..rows_used.min(area.height) {
        let yt = row as u32 * 2;
        let yb = yt + 1;
        for col in 0..iw.min(area.width as u32) {
            let t = rgba.get_pixel(col, yt);
            let fg = Color::Rgb(t[0], t[1], t[2]);
            let bg = if yb < ih {
                let b = rgba.get_pixel(col, yb);
                Color::Rgb(b[0], b[1], b[2])
            } else {
                Color::Reset
            };
            let pos = Position::new(area.x + col_offset + col as u16, area.y + row_offset + row);
            if let Some(cell) = buf.cell_mut(pos) {
                cell.set_char('▀').set_fg(fg).set_bg(bg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn pixels_pair_into_cells() {
        // GIVEN a 2×4 image: red top half, blue bottom half
        let mut img = RgbaImage::from_pixel(2, 4, Rgba([255, 0, 0, 255]));
        for x in 0..2 {
            for y in 2..4 {
                img.put_pixel(x, y, Rgba([0, 0, 255, 255]));
            }
        }
        let mut buf = Buffer::empty(Rect::new(0, 0, 2, 2));

        // WHEN drawn at native size
        render_image(&img, buf.area, &mut buf);

        // THEN each row of cells carries two pixel rows
        assert_eq!(buf[(0, 0)].symbol(), "▀");
        assert_eq!(buf[(0, 0)].fg, Color::Rgb(255, 0, 0));
        assert_eq!(buf[(0, 0)].bg, Color::Rgb(255, 0, 0));
        assert_eq!(buf[(1, 1)].fg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn small_images_are_centred() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255]));
        let mut buf = Buffer::empty(Rect::new(0, 0, 6, 3));

        render_image(&img, buf.area, &mut buf);

        assert_eq!(buf[(1, 1)].symbol(), " ");
        assert_eq!(buf[(2, 1)].symbol(), "▀");
        assert_eq!(buf[(3, 1)].symbol(), "▀");
    }
}
