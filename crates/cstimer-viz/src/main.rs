mod bootstrap;

use anyhow::Result;
use cstimer_core::settings::Settings;
use cstimer_ui::app::{App, ViewMode};

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("cstimer-viz v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Theme: {}, Timezone: {}",
        settings.view,
        settings.theme,
        settings.timezone
    );

    let records = bootstrap::load_records(&settings.path, &settings.parse_options())?;

    if let Some((first, last)) = records.time_range() {
        tracing::info!(
            "Loaded {} solves across {} scramble types, {} to {}",
            records.len(),
            records.scramble_types().len(),
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        );
    } else {
        tracing::warn!("No solves found in {}", settings.path.display());
    }

    let app = App::new(
        &settings.theme,
        ViewMode::from_name(&settings.view),
        &settings.timezone,
    );
    app.run(&records)?;

    Ok(())
}
