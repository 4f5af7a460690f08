use crate::{
    bucket::{AsciiBucket, Surface},
    timer::{Timer, TimerToken},
    types::Settings,
};

use anyhow::{Context, bail};
use log::{debug, error, info};
use rand::{SeedableRng, rngs::StdRng};
use ratatui::{prelude::*, widgets::*};
use std::time::Instant;

/// Owns the bucket and the single refresh timer driving it.
pub struct App<S, T> {
    bucket: Option<AsciiBucket<S>>,
    timer: T,
    active: Option<TimerToken>,
    settings: Settings,
    rng: StdRng,
}

impl<S: Surface, T: Timer> App<S, T> {
    pub fn new(surface: S, timer: T, settings: Settings) -> anyhow::Result<Self> {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut app = Self {
            bucket: None,
            timer,
            active: None,
            settings,
            rng,
        };
        app.setup(surface)?;

        Ok(app)
    }

    pub fn resize(&mut self) -> anyhow::Result<()> {
        let Some(mut surface) = self.teardown() else {
            bail!("Resize requested without a surface");
        };

        surface
            .remeasure()
            .context("Failed to measure surface after resize")?;
        info!("Surface resized, rebuilding bucket");

        self.setup(surface)
    }

    pub fn on_tick(&mut self, token: TimerToken) {
        if self.active != Some(token) {
            debug!("Ignoring stale timer {:?}", token);
            return;
        }

        if let Some(bucket) = self.bucket.as_mut() {
            bucket.refresh();
        }
    }

    pub fn pump(&mut self, now: Instant) {
        for token in self.timer.expired(now) {
            self.on_tick(token);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.next_deadline()
    }

    pub fn draw_ui(&self, f: &mut Frame) {
        let Some(bucket) = &self.bucket else {
            return;
        };

        let paragraph = Paragraph::new(bucket.surface().content());
        f.render_widget(paragraph, f.area());
    }

    fn setup(&mut self, mut surface: S) -> anyhow::Result<()> {
        surface.clear();

        let bucket = AsciiBucket::new(
            surface,
            self.settings.overlay.clone(),
            self.settings.line_height,
            StdRng::from_rng(&mut self.rng),
        )
        .inspect_err(|e| error!("Failed to build bucket: {:#}", e))?;

        self.bucket = Some(bucket);
        self.active = Some(self.timer.start(self.settings.interval));

        Ok(())
    }

    /// Cancels the timer before the bucket goes away.
    fn teardown(&mut self) -> Option<S> {
        if let Some(token) = self.active.take() {
            self.timer.cancel(token);
        }

        self.bucket.take().map(AsciiBucket::into_surface)
    }
}
