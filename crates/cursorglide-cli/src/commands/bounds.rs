use anyhow::Result;

use cursorglide_core::{AppConfig, Cursor, PointerBackend};

pub fn run(config: &AppConfig) -> Result<()> {
    let cursor = Cursor::from_config(config)?;
    let bounds = cursor.bounds()?;

    println!("Backend:  {}", cursor.backend().name());
    println!("Bounds:   {}", bounds);
    println!("Size:     {} x {}", bounds.width(), bounds.height());
    println!("Position: {}", cursor.position()?);

    Ok(())
}
