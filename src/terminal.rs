use crate::{
    bucket::Surface,
    types::{CellProbe, PixelSize},
};

use anyhow::Context;
use log::{debug, warn};
use ratatui::crossterm::terminal;

/// Cell width in virtual pixels when the terminal does not report its pixel size.
const VIRTUAL_FONT_PX: f64 = 10.0;

/// The terminal window as a bucket surface.
///
/// Terminals that answer the window-size query are measured in real pixels.
/// Others are measured in virtual pixels: each cell is `VIRTUAL_FONT_PX` wide
/// and one line tall.
pub struct TerminalSurface {
    cols: u16,
    rows: u16,
    pixels: Option<PixelSize>,
    line_height: f64,
    content: String,
}

impl TerminalSurface {
    pub fn measure() -> anyhow::Result<Self> {
        let mut surface = Self {
            cols: 0,
            rows: 0,
            pixels: None,
            line_height: 1.0,
            content: String::new(),
        };
        surface.remeasure()?;

        Ok(surface)
    }

    /// Whole-pixel font size that, at the current line height, fills one terminal row.
    fn font_px(&self) -> Option<f64> {
        let pixels = self.pixels?;
        if self.rows == 0 || self.cols == 0 || self.line_height <= 0.0 {
            return None;
        }

        let cell_height = pixels.height / self.rows as f64;
        Some((cell_height / self.line_height).round().max(1.0))
    }
}

impl Surface for TerminalSurface {
    fn pixel_size(&self) -> PixelSize {
        match (self.pixels, self.font_px()) {
            // Rows are laid out at the rounded font size, not the raw cell height.
            (Some(pixels), Some(font_px)) => PixelSize {
                width: pixels.width,
                height: self.rows as f64 * (font_px * self.line_height),
            },
            (Some(pixels), None) => pixels,
            (None, _) => PixelSize {
                width: self.cols as f64 * VIRTUAL_FONT_PX,
                height: self.rows as f64 * VIRTUAL_FONT_PX * self.line_height,
            },
        }
    }

    fn use_fixed_width(&mut self, line_height: f64) {
        // Terminal cells are monospace already; only the line height matters.
        self.line_height = line_height;
    }

    fn probe_cell(&mut self) -> CellProbe {
        match (self.pixels, self.font_px()) {
            (Some(pixels), Some(font_px)) => CellProbe {
                width: pixels.width / self.cols as f64,
                font_size: format!("{}px", font_px),
            },
            _ => CellProbe {
                width: VIRTUAL_FONT_PX,
                font_size: format!("{}px", VIRTUAL_FONT_PX),
            },
        }
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn set_content(&mut self, content: String) {
        self.content = content;
    }

    fn remeasure(&mut self) -> anyhow::Result<()> {
        match terminal::window_size() {
            Ok(size) => {
                self.cols = size.columns;
                self.rows = size.rows;
                self.pixels = (size.width > 0 && size.height > 0).then(|| PixelSize {
                    width: size.width as f64,
                    height: size.height as f64,
                });
            }
            Err(e) => {
                warn!("Window size query failed, falling back to cell size: {}", e);
                let (cols, rows) = terminal::size().context("Failed to read terminal size")?;
                self.cols = cols;
                self.rows = rows;
                self.pixels = None;
            }
        }

        debug!(
            "Terminal measured: {} cols x {} rows, pixels {:?}",
            self.cols, self.rows, self.pixels
        );

        Ok(())
    }
}
