mod app;
mod event;
mod ui;

use anyhow::Result;
use chrono::NaiveDate;

use crate::config::Config;
use crate::service::Tracker;

/// Run the interactive dashboard until the user quits.
pub fn run(tracker: Tracker, config: Config, today: NaiveDate) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = app::App::new(tracker, config, today).and_then(|mut app| app.run(&mut terminal));
    ratatui::restore();
    result
}
