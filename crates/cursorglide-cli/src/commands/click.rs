use anyhow::Result;
use clap::ValueEnum;

use cursorglide_core::{AppConfig, Cursor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ClickButton {
    Left,
    Right,
}

pub fn run(config: &AppConfig, button: ClickButton) -> Result<()> {
    let mut cursor = Cursor::from_config(config)?;
    match button {
        ClickButton::Left => cursor.primary_click()?,
        ClickButton::Right => cursor.secondary_click()?,
    }
    println!("Clicked {:?} at {}", button, cursor.position()?);
    Ok(())
}
