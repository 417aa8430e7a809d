use std::io::Write;

use anyhow::{bail, Result};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use cursorglide_core::{AppConfig, Cursor, Error, PointerHandle, PointerService};

/// One parsed prompt line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    MoveTo { x: i32, y: i32 },
    LeftClick,
    RightClick,
    Scroll(i32),
    Quit,
    Empty,
}

/// Parse `x y`, `x,y`, `left`, `right`, `scroll <delta>` or `q`
///
/// Coordinates may carry a fractional part, which is truncated toward zero.
pub fn parse_input(raw: &str) -> Result<Input> {
    let line = raw.trim();
    if line.is_empty() {
        return Ok(Input::Empty);
    }

    let lower = line.to_ascii_lowercase();
    match lower.as_str() {
        "q" | "quit" => return Ok(Input::Quit),
        "left" => return Ok(Input::LeftClick),
        "right" => return Ok(Input::RightClick),
        _ => {}
    }

    let mut words = lower.split_whitespace();
    if words.next() == Some("scroll") {
        let delta = match (words.next(), words.next()) {
            (Some(delta), None) => delta.parse::<i32>().ok(),
            _ => None,
        };
        return match delta {
            Some(delta) => Ok(Input::Scroll(delta)),
            None => bail!("Invalid scroll command. Use 'scroll <delta>' where delta is an integer."),
        };
    }

    let normalized = line.replace(',', " ");
    let parts: Vec<&str> = normalized.split_whitespace().collect();
    if parts.len() != 2 {
        bail!("Please enter two numbers like: 800 400 or 800,400");
    }
    Ok(Input::MoveTo {
        x: parse_coordinate(parts[0])?,
        y: parse_coordinate(parts[1])?,
    })
}

fn parse_coordinate(raw: &str) -> Result<i32> {
    match raw.parse::<f64>() {
        // `as` truncates toward zero and saturates at the i32 range
        Ok(value) if value.is_finite() => Ok(value as i32),
        _ => bail!("'{}' is not a number", raw),
    }
}

pub async fn run(config: &AppConfig) -> Result<()> {
    let cursor = Cursor::from_config(config)?;
    let (handle, task) = PointerService::spawn(cursor);

    let (bounds, position) = handle.bounds().await?;
    println!("cursorglide interactive");
    println!("Screen bounds: {}", bounds);
    println!("Pointer at {}", position);
    println!(
        "Speed: {} px/s, scroll: {} units/s, {} fps",
        config.motion.speed_px_per_sec, config.scroll.units_per_sec, config.motion.frame_rate
    );
    println!("Enter coordinates as 'x y' or 'x,y' (type 'q' to quit).");
    println!("Commands: 'left' for left click, 'right' for right click, 'scroll <delta>' for scrolling.\n");

    // Ctrl+C stops the running motion and ends the prompt
    let (stop_tx, stop_rx) = watch::channel(false);
    let signal_handle = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C");
            signal_handle.shutdown();
            let _ = stop_tx.send(true);
        }
    });

    let mut lines = spawn_stdin_reader();
    let mut stdout = std::io::stdout();
    command_loop(&handle, &mut lines, stop_rx, &mut stdout).await?;

    handle.shutdown();
    if let Err(e) = task.await {
        warn!("Pointer task ended abnormally: {}", e);
    }
    println!("\nBye.");

    Ok(())
}

/// Read stdin on a plain thread so a pending read never blocks runtime shutdown
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if tx.blocking_send(line.clone()).is_err() {
                        break;
                    }
                }
            }
        }
    });
    rx
}

/// Prompt, parse and dispatch lines until quit, end of input or stop
pub async fn command_loop<W: Write>(
    handle: &PointerHandle,
    lines: &mut mpsc::Receiver<String>,
    mut stop: watch::Receiver<bool>,
    out: &mut W,
) -> Result<()> {
    loop {
        write!(out, "Command > ")?;
        out.flush()?;

        let line = tokio::select! {
            biased;
            Ok(()) = stop.changed() => {
                if *stop.borrow() {
                    break;
                }
                continue;
            }
            line = lines.recv() => match line {
                Some(line) => line,
                None => break,
            },
        };

        let input = match parse_input(&line) {
            Ok(Input::Quit) => break,
            Ok(Input::Empty) => continue,
            Ok(input) => input,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };

        match execute(handle, input, out).await {
            Ok(()) => {}
            Err(Error::ServiceStopped) => break,
            Err(e) => writeln!(out, "Error: {}", e)?,
        }
    }

    Ok(())
}

async fn execute<W: Write>(
    handle: &PointerHandle,
    input: Input,
    out: &mut W,
) -> cursorglide_core::Result<()> {
    debug!("Interactive input: {:?}", input);
    match input {
        Input::MoveTo { x, y } => {
            writeln!(out, "Moving to ({}, {}) ...", x, y)?;
            let report = handle.move_to(x, y).await?;
            if report.cancelled {
                writeln!(out, "Interrupted, pointer placed at {}", report.target)?;
            }
        }
        Input::LeftClick => {
            writeln!(out, "Performing left click...")?;
            handle.primary_click().await?;
        }
        Input::RightClick => {
            writeln!(out, "Performing right click...")?;
            handle.secondary_click().await?;
        }
        Input::Scroll(delta) => {
            let direction = if delta > 0 { "up" } else { "down" };
            writeln!(out, "Scrolling {} by {}...", direction, delta)?;
            handle.scroll(delta).await?;
        }
        Input::Quit | Input::Empty => {}
    }
    Ok(())
}
