use crate::{
    helpers::{cell_count, centered_band, generate_overlay_row, generate_row, parse_font_size},
    types::{CellMetrics, CellProbe, GridShape, Overlay, PixelSize},
};

use anyhow::Context;
use log::{debug, trace};
use rand::rngs::StdRng;

pub trait Surface {
    fn pixel_size(&self) -> PixelSize;

    /// Switches to monospace, no-wrap rendering with the given line height.
    fn use_fixed_width(&mut self, line_height: f64);

    fn probe_cell(&mut self) -> CellProbe;

    fn content(&self) -> &str;

    fn set_content(&mut self, content: String);

    fn clear(&mut self) {
        self.set_content(String::new());
    }

    fn remeasure(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Fills a surface with random alphanumerics and keeps an overlay centered in it.
///
/// The grid shape is fixed when the bucket is built. A resized surface needs a
/// new bucket.
pub struct AsciiBucket<S> {
    surface: S,
    overlay: Overlay,
    cell: CellMetrics,
    shape: GridShape,
    rows: Vec<String>,
    rng: StdRng,
}

impl<S: Surface> AsciiBucket<S> {
    pub fn new(
        mut surface: S,
        overlay: Overlay,
        line_height: f64,
        rng: StdRng,
    ) -> anyhow::Result<Self> {
        surface.use_fixed_width(line_height);
        let size = surface.pixel_size();

        let probe = surface.probe_cell();
        let font_size =
            parse_font_size(&probe.font_size).context("Failed to measure character cell")?;
        let cell = CellMetrics {
            width: probe.width,
            height: font_size * line_height,
        };

        let shape = GridShape {
            rows: cell_count(size.height, cell.height),
            cols: cell_count(size.width, cell.width),
        };

        debug!(
            "Bucket geometry: surface {}x{}px, cell {}x{}px, grid {} cols x {} rows",
            size.width, size.height, cell.width, cell.height, shape.cols, shape.rows
        );

        let mut bucket = Self {
            surface,
            overlay,
            cell,
            shape,
            rows: Vec::with_capacity(shape.rows),
            rng,
        };
        bucket.fill();

        Ok(bucket)
    }

    /// Re-randomizes every row in place. The grid keeps its shape.
    pub fn refresh(&mut self) {
        trace!(
            "Refreshing {} rows of {} cells ({}x{}px)",
            self.shape.rows, self.shape.cols, self.cell.width, self.cell.height
        );

        self.fill();
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    fn fill(&mut self) {
        let cols = self.shape.cols;
        let band = centered_band(self.shape.rows, self.overlay.len());
        let ignore = self.overlay.ignore();
        let mut overlay_line = 0usize;

        self.rows.clear();
        for row in 0..self.shape.rows {
            if !band.contains(row) {
                self.rows.push(generate_row(&mut self.rng, cols));
                continue;
            }

            let line = match self.overlay.row(overlay_line) {
                Some(text) => generate_overlay_row(&mut self.rng, cols, text, ignore),
                None => generate_row(&mut self.rng, cols),
            };
            self.rows.push(line);
            overlay_line += 1;
        }

        let mut content = String::with_capacity(self.shape.rows * (cols + 1));
        for row in &self.rows {
            content.push_str(row);
            content.push('\n');
        }
        self.surface.set_content(content);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::helpers::CHARACTERS;

    use log::LevelFilter;
    use proptest::prelude::*;
    use rand::SeedableRng;

    pub(crate) fn init_logging() {
        let _ = env_logger::builder()
            .filter_level(LevelFilter::Trace)
            .is_test(true)
            .try_init();
    }

    #[derive(Debug, Default)]
    pub(crate) struct FakeSurface {
        pub size: PixelSize,
        pub cell_width: f64,
        pub font_size: String,
        pub line_height: Option<f64>,
        pub content: String,
        pub remeasured: usize,
    }

    impl FakeSurface {
        pub(crate) fn new(width: f64, height: f64, cell_width: f64, font_size: &str) -> Self {
            Self {
                size: PixelSize { width, height },
                cell_width,
                font_size: font_size.to_string(),
                ..Self::default()
            }
        }
    }

    impl Surface for FakeSurface {
        fn pixel_size(&self) -> PixelSize {
            self.size
        }

        fn use_fixed_width(&mut self, line_height: f64) {
            self.line_height = Some(line_height);
        }

        fn probe_cell(&mut self) -> CellProbe {
            CellProbe {
                width: self.cell_width,
                font_size: self.font_size.clone(),
            }
        }

        fn content(&self) -> &str {
            &self.content
        }

        fn set_content(&mut self, content: String) {
            self.content = content;
        }

        fn remeasure(&mut self) -> anyhow::Result<()> {
            self.remeasured += 1;
            Ok(())
        }
    }

    fn bucket(surface: FakeSurface, overlay: Overlay, line_height: f64) -> AsciiBucket<FakeSurface> {
        init_logging();
        AsciiBucket::new(surface, overlay, line_height, StdRng::seed_from_u64(42)).unwrap()
    }

    fn grid(bucket: &AsciiBucket<FakeSurface>) -> Vec<Vec<char>> {
        bucket
            .surface()
            .content()
            .lines()
            .map(|l| l.chars().collect())
            .collect()
    }

    fn is_filler(ch: char) -> bool {
        ch.is_ascii() && CHARACTERS.contains(&(ch as u8))
    }

    #[test]
    fn worked_example_places_single_overlay_row() {
        let surface = FakeSurface::new(100.0, 50.0, 10.0, "10px");
        let bucket = bucket(surface, Overlay::new(&["AxCD"], 'x'), 1.0);
        let rows = grid(&bucket);

        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.len() == 10));

        assert_eq!(rows[2][3], 'A');
        assert!(is_filler(rows[2][4]));
        assert_eq!(rows[2][5], 'C');
        assert_eq!(rows[2][6], 'D');

        for (r, row) in rows.iter().enumerate() {
            for (c, ch) in row.iter().enumerate() {
                if r == 2 && (3..7).contains(&c) {
                    continue;
                }
                assert!(is_filler(*ch), "{ch:?} at row {r} col {c}");
            }
        }
    }

    #[test]
    fn default_overlay_is_centered_with_line_height() {
        // 16px font at 1.2 line height is a 19.2px row, 25 rows in 480px.
        let surface = FakeSurface::new(800.0, 480.0, 8.0, "16px");
        let overlay = Overlay::default();
        let bucket = bucket(surface, overlay.clone(), 1.2);
        let rows = grid(&bucket);

        assert_eq!(bucket.surface().line_height, Some(1.2));
        assert_eq!(rows.len(), 25);
        assert!(rows.iter().all(|r| r.len() == 100));

        for line in 0..overlay.len() {
            let text = overlay.row(line).unwrap();
            let row = &rows[10 + line];
            for (offset, &expected) in text.iter().enumerate() {
                let actual = row[34 + offset];
                if expected == overlay.ignore() {
                    assert!(is_filler(actual));
                } else {
                    assert_eq!(actual, expected, "row {line} offset {offset}");
                }
            }
        }
    }

    #[test]
    fn content_is_rows_terminated_by_newlines() {
        let surface = FakeSurface::new(30.0, 20.0, 10.0, "10px");
        let bucket = bucket(surface, Overlay::new(&["-"], 'x'), 1.0);
        let content = bucket.surface().content();

        assert!(content.ends_with('\n'));
        assert_eq!(content.split('\n').count(), 3);
        assert_eq!(content.split('\n').last(), Some(""));
    }

    #[test]
    fn refresh_keeps_shape_and_changes_content() {
        let surface = FakeSurface::new(400.0, 240.0, 8.0, "16px");
        let mut bucket = bucket(surface, Overlay::default(), 1.2);
        let before = grid(&bucket);

        bucket.refresh();
        let once = grid(&bucket);
        bucket.refresh();
        let twice = grid(&bucket);

        for rows in [&once, &twice] {
            assert_eq!(rows.len(), before.len());
            for (a, b) in rows.iter().zip(&before) {
                assert_eq!(a.len(), b.len());
            }
        }
        assert_ne!(before, once);
        assert_ne!(once, twice);
    }

    #[test]
    fn refresh_keeps_overlay_rows_in_place() {
        let surface = FakeSurface::new(100.0, 50.0, 10.0, "10px");
        let mut bucket = bucket(surface, Overlay::new(&["#", "%"], 'x'), 1.0);

        for _ in 0..3 {
            bucket.refresh();
            let rows = grid(&bucket);
            // rows 1..3, column 4
            assert_eq!(rows[1][4], '#');
            assert_eq!(rows[2][4], '%');
        }
    }

    #[test]
    fn degenerate_surface_yields_empty_grid() {
        let surface = FakeSurface::new(0.0, 0.0, 0.0, "16px");
        let mut bucket = bucket(surface, Overlay::default(), 1.2);
        assert_eq!(bucket.surface().content(), "");

        bucket.refresh();
        assert_eq!(bucket.surface().content(), "");
    }

    #[test]
    fn font_size_without_pixel_unit_is_an_error() {
        init_logging();
        let surface = FakeSurface::new(100.0, 100.0, 10.0, "1em");
        let result = AsciiBucket::new(surface, Overlay::default(), 1.2, StdRng::seed_from_u64(0));
        assert!(result.is_err());
    }

    #[test]
    fn overlay_taller_than_grid_is_cropped_from_the_top() {
        let surface = FakeSurface::new(10.0, 20.0, 10.0, "10px");
        let bucket = bucket(surface, Overlay::new(&["1", "2", "3", "4"], 'x'), 1.0);
        let rows = grid(&bucket);

        // 2 rows, 4 overlay rows: band is -1..3, so rows 0 and 1 take overlay rows 0 and 1.
        assert_eq!(rows, vec![vec!['1'], vec!['2']]);
    }

    proptest! {
        #[test]
        fn shape_follows_pixel_geometry(
            w in 1u32..2000,
            h in 1u32..2000,
            cw in 1u32..32,
            font in 1u32..32,
        ) {
            let surface = FakeSurface::new(w as f64, h as f64, cw as f64, &format!("{font}px"));
            let bucket = AsciiBucket::new(
                surface,
                Overlay::new(&["AB"], 'x'),
                1.0,
                StdRng::seed_from_u64(w as u64),
            )
            .unwrap();
            let rows = grid(&bucket);

            let expected_rows = (h as f64 / font as f64).ceil() as usize;
            let expected_cols = (w as f64 / cw as f64).ceil() as usize;
            prop_assert_eq!(rows.len(), expected_rows);
            for row in &rows {
                prop_assert_eq!(row.len(), expected_cols);
            }
        }

        #[test]
        fn everything_outside_the_overlay_is_filler(seed in any::<u64>()) {
            let surface = FakeSurface::new(120.0, 90.0, 10.0, "10px");
            let bucket = AsciiBucket::new(
                surface,
                Overlay::new(&["!!!"], 'x'),
                1.0,
                StdRng::seed_from_u64(seed),
            )
            .unwrap();
            let rows = grid(&bucket);

            // 12 cols x 9 rows: overlay at row 4, cols 4..7
            for (r, row) in rows.iter().enumerate() {
                for (c, &ch) in row.iter().enumerate() {
                    if r == 4 && (4..7).contains(&c) {
                        prop_assert_eq!(ch, '!');
                    } else {
                        prop_assert!(is_filler(ch));
                    }
                }
            }
        }
    }
}
