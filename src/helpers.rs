use crate::types::{Band, DEFAULT_IGNORE_CHAR, DEFAULT_OVERLAY, Overlay, Settings};

use anyhow::{Context, bail};
use clap::Parser;
use rand::Rng;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

pub const CHARACTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Parser, Debug)]
#[command(name = "ascii-bucket")]
#[command(about = "Animated bucket of random characters with a centered logo")]
pub struct Args {
    /// Refresh interval in milliseconds
    #[arg(short = 'i', long = "interval-ms", default_value_t = 200)]
    pub interval_ms: u64,

    /// Line-height multiplier applied to the font size
    #[arg(long = "line-height", default_value_t = 1.2)]
    pub line_height: f64,

    /// Use the lines of the file at PATH as the overlay
    #[arg(short = 'o', long = "overlay")]
    pub overlay: Option<PathBuf>,

    /// Overlay character that is rendered as random filler
    #[arg(long = "ignore-char", default_value_t = DEFAULT_IGNORE_CHAR)]
    pub ignore_char: char,

    /// Seed for the character generator
    #[arg(short = 's', long = "seed")]
    pub seed: Option<u64>,

    /// Write logs to PATH instead of stderr
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

pub fn parse_args() -> anyhow::Result<(Settings, Option<PathBuf>)> {
    let args = Args::parse();
    let settings = settings_from_args(&args)?;

    Ok((settings, args.log_file))
}

pub fn settings_from_args(args: &Args) -> anyhow::Result<Settings> {
    if args.interval_ms == 0 {
        bail!("--interval-ms must be greater than zero");
    }

    let overlay = match &args.overlay {
        Some(path) => load_overlay_from_file(path, args.ignore_char)?,
        None => Overlay::new(&DEFAULT_OVERLAY[..], args.ignore_char),
    };

    Ok(Settings {
        interval: Duration::from_millis(args.interval_ms),
        line_height: args.line_height,
        overlay,
        seed: args.seed,
    })
}

pub fn load_overlay_from_file(path: &Path, ignore: char) -> anyhow::Result<Overlay> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read overlay file at {}", path.display()))?;

    let content = content.replace("\r\n", "\n");
    let rows: Vec<&str> = content.lines().collect();
    if rows.is_empty() {
        bail!("Overlay file at {} has no rows", path.display());
    }

    Ok(Overlay::new(rows.as_slice(), ignore))
}

pub fn random_char<R: Rng + ?Sized>(rng: &mut R) -> char {
    CHARACTERS[rng.random_range(0..CHARACTERS.len())] as char
}

pub fn cell_count(extent: f64, cell: f64) -> usize {
    if !extent.is_finite() || !cell.is_finite() || extent <= 0.0 || cell <= 0.0 {
        return 0;
    }

    // Float noise when a fractional cell divides the extent exactly must not add a cell.
    let cells = extent / cell;
    let slack = cells * f64::EPSILON * 4.0;

    (cells - slack).ceil().max(1.0) as usize
}

pub fn centered_band(total: usize, len: usize) -> Band {
    let half_total = total as f64 / 2.0;
    let half_len = len as f64 / 2.0;

    Band {
        start: (half_total - half_len).floor() as i64,
        end: (half_total + half_len).floor() as i64,
    }
}

/// Reads a computed font size such as `"16px"`. Only the integer part counts.
pub fn parse_font_size(font_size: &str) -> anyhow::Result<f64> {
    let trimmed = font_size.trim();
    let Some(number) = trimmed.strip_suffix("px") else {
        bail!("Font size {:?} is not in pixels", font_size);
    };

    let number = number.trim_start();
    let (sign, digits) = match number.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, number.strip_prefix('+').unwrap_or(number)),
    };

    let int_part: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();
    if int_part.is_empty() {
        bail!("Font size {:?} has no numeric value", font_size);
    }

    let value: f64 = int_part
        .parse()
        .with_context(|| format!("Font size {:?} is out of range", font_size))?;

    Ok(sign * value)
}

pub fn generate_row<R: Rng + ?Sized>(rng: &mut R, cols: usize) -> String {
    (0..cols).map(|_| random_char(rng)).collect()
}

pub fn generate_overlay_row<R: Rng + ?Sized>(
    rng: &mut R,
    cols: usize,
    text: &[char],
    ignore: char,
) -> String {
    let band = centered_band(cols, text.len());
    let mut overlay_idx = 0usize;

    let mut row = String::with_capacity(cols);
    for col in 0..cols {
        if !band.contains(col) {
            row.push(random_char(rng));
            continue;
        }

        match text.get(overlay_idx) {
            Some(&ch) if ch != ignore => row.push(ch),
            _ => row.push(random_char(rng)),
        }
        overlay_idx += 1;
    }

    row
}
