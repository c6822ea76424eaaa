//! Terminal runner (default binary).
//!
//! Drives one field at a fixed tick rate. Keys are collected by the input
//! tracker between ticks and applied as one snapshot per tick. Frames are
//! drawn between ticks with interpolated animation poses.
//!
//! Set `BLOCKFALL_LOG_PATH` to write trace output to a file; the filter is
//! read from `BLOCKFALL_LOG` (default `info`).

use std::fs::File;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use tracing_subscriber::EnvFilter;

use blockfall::core::{FieldConfig, GameField};
use blockfall::input::{should_quit, should_restart, InputTracker};
use blockfall::term::{
    FieldView, FrameBuffer, NextPanel, ScorePanel, TermField, TerminalRenderer, Viewport,
};
use blockfall::types::TICK_MS;

fn main() -> Result<()> {
    init_logging()?;

    let config = FieldConfig::from_env();
    let field = GameField::with_displays(config, ScorePanel::new(), NextPanel::new())
        .context("invalid field configuration")?;

    let mut term = TerminalRenderer::new();
    term.enter()?;

    let result = run(&mut term, field);

    // Always try to restore terminal state.
    let _ = term.exit();
    result
}

fn init_logging() -> Result<()> {
    let Ok(path) = std::env::var("BLOCKFALL_LOG_PATH") else {
        return Ok(());
    };
    let file = File::create(&path).with_context(|| format!("cannot open log file {path}"))?;
    let filter = EnvFilter::try_from_env("BLOCKFALL_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    tracing::info!(%path, "logging enabled");
    Ok(())
}

fn run(term: &mut TerminalRenderer, mut field: TermField) -> Result<()> {
    field.start();

    let view = FieldView::default();
    let mut fb = FrameBuffer::new(0, 0);
    let mut tracker = InputTracker::new(Instant::now());

    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        // Render.
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        let interpolation =
            (last_tick.elapsed().as_secs_f64() / tick_duration.as_secs_f64()).min(1.0);
        view.render_into(&field, interpolation, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        // Input with timeout until next tick.
        let timeout = tick_duration.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press && should_quit(key) {
                        tracing::info!(score = field.score(), "quit");
                        return Ok(());
                    }
                    if key.kind == KeyEventKind::Press && should_restart(key) {
                        tracing::info!(score = field.score(), "restart");
                        field.reset();
                        field.start();
                        tracker.reset(Instant::now());
                        continue;
                    }
                    tracker.handle_event(key, Instant::now());
                }
                Event::Resize(_, _) => term.invalidate(),
                _ => {}
            }
        }

        // Tick.
        if last_tick.elapsed() >= tick_duration {
            last_tick = Instant::now();

            let snapshot = tracker.snapshot(last_tick);
            field.control(&snapshot)?;
            field.tick()?;
            field.score_display_mut().tick_frame();
            field.next_shape_display_mut().tick_frame();
        }
    }
}
