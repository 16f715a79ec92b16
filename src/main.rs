// Example runner for the `hsv_tracker` library: tracks one still image.
//
//   hsv_tracker <image> <h_min> <s_min> <v_min> <h_max> <s_max> <v_max> [mask.png]
//
// Hue is in [0, 180), saturation and value in [0, 255]. Set RUST_LOG=debug to
// see what every stage found.

use hsv_tracker::core_modules::utils::image_helper::image_helper::save_mask;
use hsv_tracker::{ObjectTracker, Thresholds, TrackerConfig, TrackerError};
use log::info;
use std::env;

fn main() -> Result<(), TrackerError> {
    env_logger::init();

    // --- 1. Argument Parsing & Setup ---
    let args: Vec<String> = env::args().collect();
    if args.len() < 8 {
        println!(
            "Usage: hsv_tracker <image> <h_min> <s_min> <v_min> <h_max> <s_max> <v_max> [mask_output.png]"
        );
        return Ok(());
    }

    let mut bounds = [0u8; 6];
    for (slot, raw) in bounds.iter_mut().zip(&args[2..8]) {
        *slot = raw.parse().map_err(|_| {
            TrackerError::InvalidConfig(format!("threshold `{raw}` is not a value in 0..=255"))
        })?;
    }
    let thresholds = Thresholds::from(bounds);

    let config = match env::var("HSV_TRACKER_CONFIG") {
        Ok(path) => TrackerConfig::load(path)?,
        Err(_) => TrackerConfig::default(),
    };
    let tracker = ObjectTracker::new(config)?;

    // --- 2. Tracking ---
    let mut frame = image::open(&args[1])?;
    info!("loaded {} ({}x{})", args[1], frame.width(), frame.height());
    let result = tracker.track(&mut frame, &thresholds);

    // --- 3. Report ---
    match result.detection() {
        Some(object) => println!(
            "object at ({:.1}, {:.1}), area {:.1}, mean {:.2}, box {:?}",
            object.centroid.0, object.centroid.1, object.area, object.mean, object.bounding_rect
        ),
        None => println!(
            "{:?}: position {:?}, area {}, mean {}",
            result.status, result.position, result.area, result.mean
        ),
    }

    // --- 4. Debug mask ---
    if let Some(output_path) = args.get(8) {
        match frame.as_luma8() {
            Some(mask) => {
                save_mask(output_path, mask)?;
                println!("mask written to {output_path}");
            }
            None => println!("debug rendering disabled, no mask to write"),
        }
    }

    Ok(())
}
