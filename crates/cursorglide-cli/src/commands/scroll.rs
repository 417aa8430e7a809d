use anyhow::Result;

use cursorglide_core::{AppConfig, Cursor};

pub async fn run(config: &AppConfig, delta: i32) -> Result<()> {
    let mut cursor = Cursor::from_config(config)?;
    let report = cursor.scroll(delta).await?;

    let direction = if delta < 0 { "down" } else { "up" };
    println!(
        "Scrolled {} {} units in {} wheel events",
        direction,
        report.emitted.unsigned_abs(),
        report.ticks
    );

    Ok(())
}
