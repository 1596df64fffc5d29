use ptracer::core::scene::Scene;
use ptracer::core::vpl::{generate_vpls, normalize_vpl_power, VplKind};
use ptracer::math::spectrum::RGBSpectrum;
use ptracer::scenes::cornell::cornell_box;

use console::style;
use std::env;

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut count: usize = 1000;
    let mut max_depth: i32 = 5;
    let mut offset: u64 = 0;
    let mut fog = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" => {
                i += 1;
                count = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(count);
            }
            "--max-depth" => {
                i += 1;
                max_depth = args.get(i).and_then(|v| v.parse::<i32>().ok()).unwrap_or(max_depth);
            }
            "--offset" => {
                i += 1;
                offset = args.get(i).and_then(|v| v.parse::<u64>().ok()).unwrap_or(offset);
            }
            "--fog" => fog = true,
            _ => {
                eprintln!("Usage: {} [--count N] [--max-depth N] [--offset N] [--fog]", args[0]);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let scene = cornell_box(fog);
    let (mut vpls, next_index) = generate_vpls(&scene, offset, count, max_depth);
    normalize_vpl_power(&mut vpls, next_index);

    let emitter_seeds = vpls.iter().filter(|v| v.kind == VplKind::EmitterSeed).count();
    let mut emitted = RGBSpectrum::default();
    let mut indirect = RGBSpectrum::default();
    for vpl in &vpls {
        match vpl.kind {
            VplKind::EmitterSeed => emitted += vpl.power,
            VplKind::SurfaceSeed => indirect += vpl.power,
        }
    }
    let reference = scene.total_emitted_power();

    println!("{}", style("VPL generation").bold());
    println!("  requested      {}", count);
    println!("  generated      {} ({} emitter, {} surface)", vpls.len(), emitter_seeds, vpls.len() - emitter_seeds);
    println!("  index          {} -> {}", offset, next_index);
    println!("  emitter power  {:?}", emitted.to_linear_rgb());
    println!("  scene power    {:?}", reference.to_linear_rgb());
    println!("  surface power  {:?}", indirect.to_linear_rgb());

    let error = if reference[0] > 0.0 { ((emitted[0] - reference[0]) / reference[0]).abs() } else { 0.0 };
    let line = format!("  relative error {:.4}", error);
    if error < 0.05 {
        println!("{}", style(line).green());
    } else {
        println!("{}", style(line).yellow());
    }
}
