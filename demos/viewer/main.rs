//! # Pose Viewer Example
//!
//! Opens a window showing one detected pose as a 3D skeleton.
//!
//! ## Usage:
//! ```bash
//! cargo run --example viewer                      # bundled sample pose
//! cargo run --example viewer -- pose.json         # your own backend output
//! cargo run --example viewer -- pose.json --sway  # stream slightly moving poses
//! ```
//!
//! Left-drag orbits, right-drag pans, scroll zooms.
//! Set `RUST_LOG=skeleton3d=debug` to watch generations being rebuilt.

use std::{thread, time::Duration};

use anyhow::{Context, Result};
use skeleton3d::prelude::*;

const SAMPLE_POSE: &str = include_str!("pose.json");

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let sway = args.iter().any(|arg| arg == "--sway");
    let path = args.iter().find(|arg| !arg.starts_with("--"));

    let json = match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read pose file {path}"))?,
        None => SAMPLE_POSE.to_string(),
    };
    let pose = PoseData::from_json(&json).context("pose file is not usable")?;
    log::info!(
        "loaded pose with {} landmarks and {} connections",
        pose.landmarks.len(),
        pose.connections.len()
    );

    let app = ViewerApp::new(ViewerConfig::default()).with_pose(pose.clone());

    app.run_with(move |proxy| {
        if !sway {
            return;
        }
        thread::spawn(move || {
            let mut t = 0.0f32;
            loop {
                thread::sleep(Duration::from_millis(100));
                t += 0.1;
                let mut next = pose.clone();
                for landmark in &mut next.landmarks {
                    landmark.x += 0.05 * (t + landmark.y * 3.0).sin();
                }
                if proxy.send_event(next).is_err() {
                    break;
                }
            }
        });
    })
    .context("event loop failed")?;

    Ok(())
}
