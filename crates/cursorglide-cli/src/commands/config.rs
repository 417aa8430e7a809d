use anyhow::Result;

use cursorglide_core::AppConfig;

/// Print the effective configuration, overrides included
pub fn show(config: &AppConfig) -> Result<()> {
    println!("# {}", AppConfig::config_path().display());
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Save new rates to the configuration file
pub fn set(
    mut config: AppConfig,
    speed: Option<f64>,
    frame_rate: Option<u32>,
    scroll_rate: Option<f64>,
) -> Result<()> {
    if speed.is_none() && frame_rate.is_none() && scroll_rate.is_none() {
        println!("Nothing to change. Pass --speed, --frame-rate or --scroll-rate.");
        return Ok(());
    }

    apply(&mut config, speed, frame_rate, scroll_rate);
    config.save()?;

    println!("Saved {}", AppConfig::config_path().display());
    println!("  Speed:       {} px/s", config.motion.speed_px_per_sec);
    println!("  Frame rate:  {} fps", config.motion.frame_rate);
    println!("  Scroll rate: {} units/s", config.scroll.units_per_sec);

    Ok(())
}

pub fn apply(config: &mut AppConfig, speed: Option<f64>, frame_rate: Option<u32>, scroll_rate: Option<f64>) {
    if let Some(speed) = speed {
        config.motion.speed_px_per_sec = speed;
    }
    if let Some(frame_rate) = frame_rate {
        config.motion.frame_rate = frame_rate;
        config.scroll.frame_rate = frame_rate;
    }
    if let Some(scroll_rate) = scroll_rate {
        config.scroll.units_per_sec = scroll_rate;
    }
}
