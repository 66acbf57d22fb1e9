//! Standings table renderer.
//!
//! Produces the shareable round-results artifact: a PNG grid with one row
//! per participant, a cumulative "W-L" record column, and one column per
//! round whose cell background encodes win / loss / blank. Cell sizes are
//! derived from the rendered text, so the table grows with participant
//! count and round count instead of clipping.

use std::io::Cursor;

use embedded_graphics::{
    mono_font::{ascii::FONT_9X15, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};
use image::{ImageFormat, Rgb, RgbImage};

use crate::error::{Error, Result};
use crate::standings::Standings;

const BORDER: u32 = 1;
const CELL_PAD: u32 = 6;
const ROW_HEIGHT: u32 = 26;
// FONT_9X15 metrics
const CHAR_W: u32 = 9;
const FONT_H: u32 = 15;
const MIN_NAME_COL: u32 = 84;
const MIN_CELL_COL: u32 = 56;

const GRID_LINE: Rgb888 = Rgb888::new(0x00, 0x00, 0x00);
const HEADER_FILL: Rgb888 = Rgb888::new(0xd6, 0xd6, 0xd6);
const PLAIN_FILL: Rgb888 = Rgb888::new(0xff, 0xff, 0xff);
const WIN_FILL: Rgb888 = Rgb888::new(0x33, 0x99, 0x33);
const LOSS_FILL: Rgb888 = Rgb888::new(0xcc, 0x33, 0x00);
const BLANK_FILL: Rgb888 = Rgb888::new(0xe9, 0xe9, 0xe9);
const TEXT_COLOR: Rgb888 = Rgb888::new(0x00, 0x00, 0x00);

/// Render the standings into PNG bytes.
///
/// Empty or internally inconsistent standings are a `RenderError`: the
/// caller keeps the round Resolved-but-not-Reported and retries next pass
/// instead of delivering a malformed image.
pub fn render_standings(standings: &Standings) -> Result<Vec<u8>> {
    if standings.rows.is_empty() {
        return Err(Error::Render("standings have no participants".into()));
    }
    if standings.round < 1 {
        return Err(Error::Render(format!(
            "cannot render standings for round {}",
            standings.round
        )));
    }
    for row in &standings.rows {
        if row.cells.len() != standings.round as usize {
            return Err(Error::Render(format!(
                "participant {} has {} grid cells for round {}",
                row.display_name,
                row.cells.len(),
                standings.round
            )));
        }
    }

    let layout = Layout::of(standings);
    let mut canvas = Canvas::new(layout.width, layout.height);
    let text_style = MonoTextStyle::new(&FONT_9X15, TEXT_COLOR);

    // Header row: empty name corner, "Record", then one column per round.
    fill_cell(&mut canvas, &layout, 0, 0, HEADER_FILL);
    fill_cell(&mut canvas, &layout, 1, 0, HEADER_FILL);
    draw_centered(&mut canvas, &layout, 1, 0, "Record", text_style);
    for round in 1..=standings.round {
        let col = (round + 1) as usize;
        fill_cell(&mut canvas, &layout, col, 0, HEADER_FILL);
        draw_centered(&mut canvas, &layout, col, 0, &format!("Week {}", round), text_style);
    }

    for (idx, row) in standings.rows.iter().enumerate() {
        let grid_row = idx + 1;

        fill_cell(&mut canvas, &layout, 0, grid_row, PLAIN_FILL);
        draw_left(&mut canvas, &layout, 0, grid_row, &row.display_name, text_style);

        fill_cell(&mut canvas, &layout, 1, grid_row, PLAIN_FILL);
        draw_centered(&mut canvas, &layout, 1, grid_row, &row.record(), text_style);

        for (cell_idx, cell) in row.cells.iter().enumerate() {
            let col = cell_idx + 2;
            match cell {
                None => fill_cell(&mut canvas, &layout, col, grid_row, BLANK_FILL),
                Some(pick) => {
                    let fill = match pick.won {
                        Some(true) => WIN_FILL,
                        Some(false) => LOSS_FILL,
                        None => BLANK_FILL,
                    };
                    fill_cell(&mut canvas, &layout, col, grid_row, fill);
                    draw_centered(&mut canvas, &layout, col, grid_row, &pick.short_code, text_style);
                }
            }
        }
    }

    let mut buf = Cursor::new(Vec::new());
    canvas
        .img
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| Error::Render(format!("png encoding failed: {}", e)))?;

    Ok(buf.into_inner())
}

// =============================================================================
// Layout
// =============================================================================

struct Layout {
    col_widths: Vec<u32>,
    width: u32,
    height: u32,
}

impl Layout {
    fn of(standings: &Standings) -> Self {
        let rows = &standings.rows;

        let name_chars = rows
            .iter()
            .map(|r| r.display_name.chars().count())
            .max()
            .unwrap_or(0) as u32;
        let name_w = (name_chars * CHAR_W + 2 * CELL_PAD).max(MIN_NAME_COL);

        let record_chars = rows
            .iter()
            .map(|r| r.record().chars().count())
            .max()
            .unwrap_or(0)
            .max("Record".len()) as u32;
        let record_w = (record_chars * CHAR_W + 2 * CELL_PAD).max(MIN_CELL_COL);

        let mut col_widths = vec![name_w, record_w];
        for round in 1..=standings.round {
            let header_chars = format!("Week {}", round).chars().count() as u32;
            let code_chars = rows
                .iter()
                .filter_map(|r| r.cells[(round - 1) as usize].as_ref())
                .map(|c| c.short_code.chars().count())
                .max()
                .unwrap_or(0) as u32;
            let w = (header_chars.max(code_chars) * CHAR_W + 2 * CELL_PAD).max(MIN_CELL_COL);
            col_widths.push(w);
        }

        let width = col_widths.iter().sum::<u32>() + (col_widths.len() as u32 + 1) * BORDER;
        let grid_rows = rows.len() as u32 + 1;
        let height = grid_rows * ROW_HEIGHT + (grid_rows + 1) * BORDER;

        Self {
            col_widths,
            width,
            height,
        }
    }

    fn col_x(&self, col: usize) -> u32 {
        BORDER + self.col_widths[..col].iter().map(|w| w + BORDER).sum::<u32>()
    }

    fn row_y(&self, row: usize) -> u32 {
        BORDER + row as u32 * (ROW_HEIGHT + BORDER)
    }
}

// =============================================================================
// Drawing
// =============================================================================

/// `embedded-graphics` draw target over an RGB image buffer. Out-of-bounds
/// pixels are dropped rather than panicking.
struct Canvas {
    img: RgbImage,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        // Start from a grid-line colored sheet; cell fills leave the 1px
        // borders showing through.
        Self {
            img: RgbImage::from_pixel(
                width,
                height,
                Rgb([GRID_LINE.r(), GRID_LINE.g(), GRID_LINE.b()]),
            ),
        }
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.img.width(), self.img.height())
    }
}

impl DrawTarget for Canvas {
    type Color = Rgb888;
    type Error = std::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> std::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (w, h) = (self.img.width() as i32, self.img.height() as i32);
        for Pixel(point, color) in pixels {
            if point.x >= 0 && point.y >= 0 && point.x < w && point.y < h {
                self.img.put_pixel(
                    point.x as u32,
                    point.y as u32,
                    Rgb([color.r(), color.g(), color.b()]),
                );
            }
        }
        Ok(())
    }
}

fn fill_cell(canvas: &mut Canvas, layout: &Layout, col: usize, row: usize, fill: Rgb888) {
    Rectangle::new(
        Point::new(layout.col_x(col) as i32, layout.row_y(row) as i32),
        Size::new(layout.col_widths[col], ROW_HEIGHT),
    )
    .into_styled(PrimitiveStyle::with_fill(fill))
    .draw(canvas)
    .ok();
}

fn draw_centered(
    canvas: &mut Canvas,
    layout: &Layout,
    col: usize,
    row: usize,
    text: &str,
    style: MonoTextStyle<'_, Rgb888>,
) {
    let text_w = text.chars().count() as u32 * CHAR_W;
    let x = layout.col_x(col) + layout.col_widths[col].saturating_sub(text_w) / 2;
    draw_text(canvas, layout, x, row, text, style);
}

fn draw_left(
    canvas: &mut Canvas,
    layout: &Layout,
    col: usize,
    row: usize,
    text: &str,
    style: MonoTextStyle<'_, Rgb888>,
) {
    let x = layout.col_x(col) + CELL_PAD;
    draw_text(canvas, layout, x, row, text, style);
}

fn draw_text(
    canvas: &mut Canvas,
    layout: &Layout,
    x: u32,
    row: usize,
    text: &str,
    style: MonoTextStyle<'_, Rgb888>,
) {
    let y = layout.row_y(row) + (ROW_HEIGHT - FONT_H) / 2;
    Text::with_baseline(text, Point::new(x as i32, y as i32), style, Baseline::Top)
        .draw(canvas)
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standings::{PickCell, StandingRow};

    fn standing(name: &str, wins: u32, losses: u32, cells: Vec<Option<PickCell>>) -> StandingRow {
        StandingRow {
            participant_id: 0,
            display_name: name.to_string(),
            wins,
            losses,
            cells,
        }
    }

    fn cell(code: &str, won: Option<bool>) -> Option<PickCell> {
        Some(PickCell {
            short_code: code.to_string(),
            won,
        })
    }

    fn two_row_standings() -> Standings {
        Standings {
            round: 2,
            rows: vec![
                standing("X", 1, 0, vec![cell("A", Some(true)), cell("C", None)]),
                standing("Y", 0, 1, vec![cell("B", Some(false)), None]),
            ],
        }
    }

    #[test]
    fn test_empty_standings_are_a_render_error() {
        let standings = Standings { round: 1, rows: vec![] };
        assert!(matches!(
            render_standings(&standings),
            Err(Error::Render(_))
        ));
    }

    #[test]
    fn test_inconsistent_grid_is_a_render_error() {
        let standings = Standings {
            round: 3,
            rows: vec![standing("X", 0, 0, vec![None])],
        };
        assert!(matches!(
            render_standings(&standings),
            Err(Error::Render(_))
        ));
    }

    #[test]
    fn test_output_is_png() {
        let png = render_standings(&two_row_standings()).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn test_image_dimensions_follow_layout() {
        let standings = two_row_standings();
        let layout = Layout::of(&standings);

        let img = image::load_from_memory(&render_standings(&standings).unwrap())
            .unwrap()
            .to_rgb8();
        assert_eq!(img.width(), layout.width);
        assert_eq!(img.height(), layout.height);
    }

    #[test]
    fn test_size_scales_with_rounds_and_participants() {
        let base = two_row_standings();

        let mut more_rounds = two_row_standings();
        more_rounds.round = 3;
        for row in &mut more_rounds.rows {
            row.cells.push(None);
        }

        let mut more_rows = two_row_standings();
        more_rows.rows.push(standing("Z", 0, 0, vec![None, None]));

        assert!(Layout::of(&more_rounds).width > Layout::of(&base).width);
        assert_eq!(Layout::of(&more_rounds).height, Layout::of(&base).height);
        assert!(Layout::of(&more_rows).height > Layout::of(&base).height);
        assert_eq!(Layout::of(&more_rows).width, Layout::of(&base).width);
    }

    #[test]
    fn test_cell_fills_encode_outcome() {
        let standings = two_row_standings();
        let layout = Layout::of(&standings);
        let img = image::load_from_memory(&render_standings(&standings).unwrap())
            .unwrap()
            .to_rgb8();

        // Sample just inside each cell's corner, past the border and away
        // from any glyphs.
        let sample = |col: usize, row: usize| {
            let p = img.get_pixel(layout.col_x(col) + 2, layout.row_y(row) + 2);
            (p[0], p[1], p[2])
        };

        // Row 1 is X: win in round 1, unresolved (blank fill) in round 2.
        assert_eq!(sample(2, 1), (0x33, 0x99, 0x33));
        assert_eq!(sample(3, 1), (0xe9, 0xe9, 0xe9));
        // Row 2 is Y: loss in round 1, no pick in round 2.
        assert_eq!(sample(2, 2), (0xcc, 0x33, 0x00));
        assert_eq!(sample(3, 2), (0xe9, 0xe9, 0xe9));
        // Name and record cells stay plain.
        assert_eq!(sample(0, 1), (0xff, 0xff, 0xff));
        assert_eq!(sample(1, 1), (0xff, 0xff, 0xff));
    }
}
