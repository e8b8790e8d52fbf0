//! lux_tree interactive entry point.

use std::io::{self, Write};

use log::error;
use lux_field::ThemeConfig;
use lux_tree::app::{run, AppConfig, TrackingMode};

const MIN_PARTICLES: usize = 500;
const MAX_PARTICLES: usize = 50_000;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║        Lux Tree — Gesture Particle Tree & Photo Memories     ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    #[cfg(feature = "leap")]
    println!("  Mode: LeapMotion hardware");
    #[cfg(not(feature = "leap"))]
    println!("  Mode: Simulated hand  (use --features leap for hardware)");
    println!();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut cfg = if args.iter().any(|a| a == "--quick") {
        println!("  Quick-start: Glacial Luxury, 8000 particles\n");
        AppConfig::default()
    } else {
        configure_interactively()
    };
    if let Err(e) = apply_flags(&mut cfg, &args) {
        eprintln!("  {}", e);
        eprintln!("  usage: lux_tree [--quick] [--theme ICE|CLASSIC|NEON] [--particles N] [--no-tracking] [--photo PATH]...");
        std::process::exit(2);
    }

    println!();
    println!("  Opening visualizer window…");
    println!();

    if let Err(e) = run(cfg) {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Command-line overrides, applied after the prompts.
fn apply_flags(cfg: &mut AppConfig, args: &[String]) -> Result<(), String> {
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--quick"       => {}
            "--no-tracking" => cfg.tracking = TrackingMode::Off,
            "--theme" => {
                let id = it.next().ok_or("--theme needs a value")?;
                cfg.theme = ThemeConfig::by_id(id).ok_or_else(|| format!("unknown theme {:?}", id))?;
            }
            "--particles" => {
                let n = it.next().ok_or("--particles needs a value")?;
                let n: usize = n.parse().map_err(|_| format!("bad particle count {:?}", n))?;
                cfg.particle_count = n.clamp(MIN_PARTICLES, MAX_PARTICLES);
            }
            "--photo" => {
                let path = it.next().ok_or("--photo needs a value")?;
                cfg.photos.push(path.clone());
            }
            other => return Err(format!("unknown argument {:?}", other)),
        }
    }
    Ok(())
}

fn configure_interactively() -> AppConfig {
    let mut cfg = AppConfig::default();

    println!("  Theme:");
    for (i, t) in ThemeConfig::all().iter().enumerate() {
        println!("    {}. {}", i + 1, t.name);
    }
    cfg.theme = match read_line("  Choice (1–3, default 1): ").trim() {
        "2" => &lux_field::theme::CLASSIC,
        "3" => &lux_field::theme::NEON,
        _   => ThemeConfig::default_theme(),
    };

    cfg.particle_count = read_line("  Particles (default 8000): ")
        .trim().parse().unwrap_or(cfg.particle_count)
        .clamp(MIN_PARTICLES, MAX_PARTICLES);

    if read_line("  Hand tracking? (Y/n): ").trim().eq_ignore_ascii_case("n") {
        cfg.tracking = TrackingMode::Off;
    }

    loop {
        let path = read_line("  Photo path or URL (blank to finish): ");
        let path = path.trim();
        if path.is_empty() { break; }
        cfg.photos.push(path.to_string());
    }

    cfg
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf
}
