use anyhow::Result;

use cursorglide_core::{AppConfig, Cursor};

pub async fn run(config: &AppConfig, x: i32, y: i32) -> Result<()> {
    let mut cursor = Cursor::from_config(config)?;
    let report = cursor.move_to(x, y).await?;

    if report.target.x != x || report.target.y != y {
        println!("Target ({}, {}) clamped to {}", x, y, report.target);
    }
    println!(
        "Pointer at {} ({} steps, {} writes)",
        report.target, report.steps, report.writes
    );

    Ok(())
}
