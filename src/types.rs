use std::time::Duration;

pub const DEFAULT_IGNORE_CHAR: char = 'x';

pub const DEFAULT_OVERLAY: [&str; 5] = [
    r"xxxx _ xxxxxxxx _ xxxxxxxxxxxxxx",
    r"xxx / \   _ __ | |_ ___  _ __ xx",
    r"xx / _ \ | '_ \| __/ _ \| '_ \ x",
    r"x / ___ \| | | | || (_) | | | | ",
    r" /_/ x \_\_| |_|\__\___/|_| |_| ",
];

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CellProbe {
    pub width: f64,
    pub font_size: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellMetrics {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Band {
    pub start: i64,
    pub end: i64,
}

impl Band {
    pub fn contains(&self, idx: usize) -> bool {
        let idx = idx as i64;
        idx >= self.start && idx < self.end
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Overlay {
    rows: Vec<Vec<char>>,
    ignore: char,
}

impl Overlay {
    pub fn new<S: AsRef<str>>(rows: &[S], ignore: char) -> Self {
        Self {
            rows: rows.iter().map(|r| r.as_ref().chars().collect()).collect(),
            ignore,
        }
    }

    pub fn row(&self, idx: usize) -> Option<&[char]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn ignore(&self) -> char {
        self.ignore
    }
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new(&DEFAULT_OVERLAY[..], DEFAULT_IGNORE_CHAR)
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub interval: Duration,
    pub line_height: f64,
    pub overlay: Overlay,
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(200),
            line_height: 1.2,
            overlay: Overlay::default(),
            seed: None,
        }
    }
}
