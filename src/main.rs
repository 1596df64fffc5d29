// Copyright 2020 TwoCookingMice

use ptracer::core::config::{load_config, RenderConfig};
use ptracer::core::error::{RenderError, RenderResult};
use ptracer::core::work::{CancellationToken, PreviewObserver, WorkResources};
use ptracer::filters::filter_registry;
use ptracer::integrators::ptracer::CaptureParticleProcess;
use ptracer::io::exr_utils;
use ptracer::math::bitmap::Bitmap;
use ptracer::renderers::parallel::ResultTransport;
use ptracer::scenes::cornell::{cornell_box, cornell_camera};

use console::style;
use std::env;
use std::sync::Arc;

struct Options {
    output_path: String,
    config_path: Option<String>,
    width: usize,
    height: usize,
    samples: Option<String>,
    spp: Option<String>,
    max_depth: Option<String>,
    threads: Option<usize>,
    fog: bool,
    serialized: bool,
    progress: bool,
}

/// Logs the mean of every developed preview.
struct PreviewLogger;

impl PreviewObserver for PreviewLogger {
    fn refresh(&self, preview: &Bitmap, received_samples: u64) {
        let count = preview.pixel_count().max(1) as f32;
        let mean = preview.pixels().iter().map(|p| (p[0] + p[1] + p[2]) / 3.0).sum::<f32>() / count;
        log::debug!("Preview refreshed after {} samples, mean value {:.5}.", received_samples, mean);
    }
}

fn parse_args(args: &[String]) -> Option<Options> {
    if args.len() < 2 {
        return None;
    }

    let mut options = Options {
        output_path: args[1].clone(),
        config_path: None,
        width: 256,
        height: 256,
        samples: None,
        spp: None,
        max_depth: None,
        threads: None,
        fog: false,
        serialized: false,
        progress: true,
    };

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                options.config_path = args.get(i).cloned();
            }
            "--width" => {
                i += 1;
                options.width = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(options.width);
            }
            "--height" => {
                i += 1;
                options.height = args.get(i).and_then(|v| v.parse::<usize>().ok()).unwrap_or(options.height);
            }
            "--samples" => {
                i += 1;
                options.samples = args.get(i).cloned();
            }
            "--spp" => {
                i += 1;
                options.spp = args.get(i).cloned();
            }
            "--max-depth" => {
                i += 1;
                options.max_depth = args.get(i).cloned();
            }
            "--threads" => {
                i += 1;
                options.threads = args.get(i).and_then(|v| v.parse::<usize>().ok());
            }
            "--fog" => options.fog = true,
            "--serialized" => options.serialized = true,
            "--no-progress" => options.progress = false,
            other => log::warn!("Ignoring unknown argument {}.", other),
        }
        i += 1;
    }
    Some(options)
}

fn run(options: &Options) -> RenderResult<()> {
    let mut config = match &options.config_path {
        Some(path) => load_config(path)?,
        None => RenderConfig::default(),
    };
    if let Some(samples) = &options.samples {
        config.integrator.set("sampleCount", samples);
    }
    if let Some(spp) = &options.spp {
        config.integrator.set("samplesPerPixel", spp);
    }
    if let Some(max_depth) = &options.max_depth {
        config.integrator.set("maxDepth", max_depth);
    }
    if let Some(threads) = options.threads {
        config.threads = threads;
    }
    if options.serialized {
        config.transport = ResultTransport::Serialized;
    }

    let settings = config.capture_settings()?;
    let filter = config.create_filter(&filter_registry()?)?;
    let resources = WorkResources {
        scene: Arc::new(cornell_box(options.fog)),
        sensor: Arc::new(cornell_camera(options.width, options.height)),
        filter,
    };

    let process = CaptureParticleProcess::new(settings);
    process.add_observer(Arc::new(PreviewLogger));
    let stats = config.scheduler()
        .with_progress(options.progress)
        .run(&process, &resources, &CancellationToken::new())?;

    let image = process.developed_image()
        .ok_or_else(|| RenderError::Precondition(String::from("no sensor was bound")))?;
    exr_utils::write_exr_to_file(&image, &options.output_path)?;

    println!("{} {} particles in {} units -> {}",
             style("Rendered").green().bold(),
             stats.samples_merged,
             stats.units_merged,
             style(&options.output_path).cyan());
    Ok(())
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let options = match parse_args(&args) {
        Some(options) => options,
        None => {
            eprintln!("Usage: {} <output.exr> [--config integrator.xml] [--width N] [--height N] [--samples N] [--spp N] [--max-depth N] [--threads N] [--fog] [--serialized] [--no-progress]", args[0]);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&options) {
        eprintln!("{} {}", style("error:").red().bold(), e);
        std::process::exit(1);
    }
}
