//! Example: draw a synthetic signature and export it as PNG

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sigpad::{Color, Point, SignatureConfig, SignatureModel};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let out_path = std::env::args().nth(1).unwrap_or_else(|| "signature.png".to_string());

    let (model, main) = SignatureModel::with_main_queue(SignatureConfig::default())?;
    model.set_empty_state_observer(Some(Arc::new(|empty: bool| {
        tracing::info!(empty, "Empty state changed");
    })));
    model.set_canvas_size(480, 160);

    println!("sigpad v{}", sigpad::VERSION);

    // Two strokes: a wave and an underline
    for i in 0..=120 {
        let t = i as f32 / 120.0;
        let x = 40.0 + t * 400.0;
        let y = 80.0 + (t * std::f32::consts::TAU * 3.0).sin() * 30.0 * (1.0 - t * 0.5);
        model.update(Point::new(x, y));
    }
    model.end_continuous_line(|out| {
        tracing::info!(committed = out.raster.is_some(), "First stroke merged");
    });

    model.set_color(Color::BLUE);
    for i in 0..=40 {
        model.update(Point::new(60.0 + i as f32 * 9.0, 135.0 + (i % 3) as f32 * 0.5));
    }
    model.end_continuous_line(|_| {});

    let (tx, rx) = std::sync::mpsc::channel();
    model.get_flattened_image(move |image| {
        let _ = tx.send(image);
    });

    model.flush();
    main.run_pending_timeout(Duration::from_secs(1));

    let image = rx.recv_timeout(Duration::from_secs(1)).context("no flattened image")??;
    let png = image.encode_png()?;
    std::fs::write(&out_path, png).with_context(|| format!("Failed to write {}", out_path))?;

    println!("Wrote {}x{} signature to {}", image.width(), image.height(), out_path);
    Ok(())
}
