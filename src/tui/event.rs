use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

pub fn poll(tick_rate: Duration) -> Result<AppEvent> {
    if event::poll(tick_rate)? {
        match event::read()? {
            // Windows reports both press and release.
            Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(AppEvent::Key(key)),
            Event::Resize(_, _) => return Ok(AppEvent::Resize),
            _ => {}
        }
    }
    Ok(AppEvent::Tick)
}
