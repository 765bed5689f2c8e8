//! Example: Generate a racetrack
//!
//! Runs the full pipeline with the default parameters and prints statistics
//! for every stage. Set `RUST_LOG=voronoi_track_gen=debug` to see the
//! per-stage log lines.

use tracing_subscriber::EnvFilter;
use voronoi_track_gen::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("Voronoi Track Generation Example");
    println!("================================\n");

    let config = GenerationConfigBuilder::new()
        .seed(42)
        .mode(Mode::Extend)
        .format(SimFormat::Fsds)
        .geo_anchor(51.197682, 5.323411)?
        .build()?;

    println!("Configuration:");
    println!("  Seed: {}", config.seed);
    println!("  Mode: {}", config.mode.name());
    println!("  Points / Regions: {} / {}", config.point_count, config.region_count);
    println!("  Bounds: {}..{}", config.bounds.min, config.bounds.max);
    println!("  Track width: {} m", config.track_width);
    println!("  Cone spacing: {} m", config.sample_spacing);
    println!();

    let track = TrackGenerator::generate(&config)?;

    let tessellation = track.tessellation();
    let total_neighbors: usize = tessellation.regions().iter().map(|r| r.neighbor_count()).sum();
    println!("Tessellation:");
    println!("  Regions: {}", tessellation.seed_count());
    println!(
        "  Average neighbors per region: {:.2}",
        total_neighbors as f64 / tessellation.seed_count() as f64
    );
    println!("  Working seeds: {:?}", tessellation.working_seeds());
    println!();

    println!("Raw loop:");
    println!("  Vertices: {}", track.raw_loop().len());
    println!("  Perimeter: {:.1} m", track.raw_loop().perimeter());
    println!();

    let centerline = track.centerline();
    println!("Centerline:");
    println!("  Samples: {}", centerline.len());
    println!("  Length: {:.1} m", centerline.length());
    println!("  Tightest turn radius: {:.1} m", centerline.min_turn_radius());
    println!("  Relaxed vertices: {:?}", centerline.relaxed_vertices());
    println!();

    let export = track.export()?;
    println!("Export ({}):", export.format.identifier());
    println!("  Cones: {}", export.cone_count());
    println!("  Flagged regions: {}", track.boundaries().flagged().len());
    println!(
        "  Start: ({:.2}, {:.2}) heading {:.1}°",
        export.start_pose.position.x,
        export.start_pose.position.y,
        export.start_pose.heading.to_degrees()
    );

    if let ExportCoordinates::Geographic(geo) = &export.coordinates {
        println!("\nFirst cones:");
        for cone in geo.tagged_cones().iter().take(6) {
            println!(
                "  {:?} {:?}: lat={:.7}, lon={:.7}",
                cone.side, cone.kind, cone.position.lat, cone.position.lon
            );
        }
    }

    println!("\nGeneration complete!");
    Ok(())
}
