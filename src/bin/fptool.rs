use clap::{Parser, Subcommand};
use ridgeline::tools::{
    Pose, Singularity, ToolError, grayscale_stats, load_grayscale, read_xyt, ridge_ratio, save_binarized,
    save_grayscale, synthetic_print_posed, write_xyt,
};
use ridgeline::{Config, GrayscaleImage, MinutiaRecord, MinutiaSet, detector, identify, match_records, quality};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "fptool", version, about = "ridgeline fingerprint CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect minutiae in an image
    Detect {
        #[arg(long)]
        image: PathBuf,
        #[arg(long, default_value_t = 500)]
        ppi: u32,
        /// Write minutiae as x y theta quality lines
        #[arg(long)]
        xyt: Option<PathBuf>,
        /// Write the binarized image
        #[arg(long)]
        binarized: Option<PathBuf>,
        /// Print the full detection as JSON
        #[arg(long)]
        json: bool,
    },
    /// Score a probe against a gallery (images or .xyt files)
    Match {
        #[arg(long)]
        probe: PathBuf,
        #[arg(long)]
        gallery: PathBuf,
        #[arg(long, default_value_t = 500)]
        ppi: u32,
        /// Report accept/reject against this score
        #[arg(long)]
        threshold: Option<u32>,
    },
    /// Rank gallery entries against a probe
    Identify {
        #[arg(long)]
        probe: PathBuf,
        #[arg(long, num_args = 1.., required = true)]
        gallery: Vec<PathBuf>,
        #[arg(long, default_value_t = 500)]
        ppi: u32,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Classify image quality
    Quality {
        #[arg(long)]
        image: PathBuf,
        #[arg(long, default_value_t = 500)]
        ppi: u32,
        #[arg(long)]
        json: bool,
    },
    /// Render a synthetic ridge pattern with random singularities
    Synth {
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 320)]
        width: usize,
        #[arg(long, default_value_t = 360)]
        height: usize,
        #[arg(long, default_value_t = 9.0)]
        period: f32,
        #[arg(long, default_value_t = 12)]
        singularities: usize,
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Rotation about the image centre, degrees
        #[arg(long, default_value_t = 0.0)]
        rotation: f32,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let config = Config::from_env();
    if let Err(err) = config.validate() {
        eprintln!("Invalid configuration: {err}");
        return ExitCode::FAILURE;
    }

    let outcome = match cli.command {
        Command::Detect {
            image,
            ppi,
            xyt,
            binarized,
            json,
        } => detect_cmd(&image, ppi, xyt.as_deref(), binarized.as_deref(), json, &config),
        Command::Match {
            probe,
            gallery,
            ppi,
            threshold,
        } => match_cmd(&probe, &gallery, ppi, threshold, &config),
        Command::Identify {
            probe,
            gallery,
            ppi,
            top,
        } => identify_cmd(&probe, &gallery, ppi, top, &config),
        Command::Quality { image, ppi, json } => quality_cmd(&image, ppi, json, &config),
        Command::Synth {
            out,
            width,
            height,
            period,
            singularities,
            seed,
            rotation,
        } => synth_cmd(&out, width, height, period, singularities, seed, rotation),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn detect_cmd(
    image: &Path,
    ppi: u32,
    xyt: Option<&Path>,
    binarized: Option<&Path>,
    json: bool,
    config: &Config,
) -> Result<(), ToolError> {
    let (pixels, width, height) = load_grayscale(image)?;
    let img = GrayscaleImage::new(&pixels, width, height, ppi)?;

    let start = Instant::now();
    let detection = detector::detect(&img, &config.detect);
    let elapsed = start.elapsed();

    if json {
        let out = serde_json::json!({
            "image": image.display().to_string(),
            "width": width,
            "height": height,
            "condition": detection.condition,
            "minutiae": detection.minutiae,
            "stats": detection.stats,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        let gray = grayscale_stats(&pixels);
        println!("Image: {} ({}x{} @ {} ppi)", image.display(), width, height, ppi);
        println!("Grayscale range: {}-{}, average: {}", gray.min, gray.max, gray.avg);
        println!("Ridge pixels: {:.2}%", ridge_ratio(&detection.binarized) * 100.0);
        if let Some(condition) = detection.condition {
            println!("Condition: {condition:?}");
        }
        println!("Found {} minutiae in {:.2?}", detection.minutiae.len(), elapsed);
        for (i, m) in detection.minutiae.iter().enumerate() {
            println!(
                "  {:3}: ({:4}, {:4}) {:3}° {:?} reliability={:.2}",
                i, m.x, m.y, m.direction, m.kind, m.reliability
            );
        }
    }

    if let Some(path) = xyt {
        write_xyt(path, &detection.minutiae.to_records())?;
    }
    if let Some(path) = binarized {
        save_binarized(path, &detection.binarized)?;
    }
    Ok(())
}

/// Minutiae records from an .xyt file or by detection on an image.
fn load_records(path: &Path, ppi: u32, config: &Config) -> Result<Vec<MinutiaRecord>, ToolError> {
    let is_xyt = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xyt"));
    if is_xyt {
        return read_xyt(path);
    }
    let (pixels, width, height) = load_grayscale(path)?;
    let img = GrayscaleImage::new(&pixels, width, height, ppi)?;
    Ok(detector::detect(&img, &config.detect).minutiae.to_records())
}

fn match_cmd(
    probe: &Path,
    gallery: &Path,
    ppi: u32,
    threshold: Option<u32>,
    config: &Config,
) -> Result<(), ToolError> {
    let p = load_records(probe, ppi, config)?;
    let g = load_records(gallery, ppi, config)?;
    let start = Instant::now();
    let result = match_records(&p, &g, config)?;
    println!(
        "{} {} score={} probe={} gallery={} ({:.2?})",
        probe.display(),
        gallery.display(),
        result.score,
        result.probe_count,
        result.gallery_count,
        start.elapsed()
    );
    if let Some(t) = threshold {
        let decision = if result.score >= t { "accept" } else { "reject" };
        println!("threshold={t} decision={decision}");
    }
    Ok(())
}

fn identify_cmd(
    probe: &Path,
    gallery: &[PathBuf],
    ppi: u32,
    top: usize,
    config: &Config,
) -> Result<(), ToolError> {
    let to_set = |records: Vec<MinutiaRecord>| -> Result<MinutiaSet, ToolError> {
        let minutiae = records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                r.validate(i)?;
                Ok(ridgeline::Minutia {
                    x: r.x as u32,
                    y: r.y as u32,
                    direction: r.direction as u16,
                    kind: r.kind.unwrap_or(ridgeline::MinutiaKind::RidgeEnding),
                    reliability: r.reliability_or_default(),
                })
            })
            .collect::<Result<Vec<_>, ridgeline::FpError>>()?;
        Ok(MinutiaSet::new(minutiae, config.matcher.max_minutiae))
    };

    let probe_set = to_set(load_records(probe, ppi, config)?)?;
    let mut sets = Vec::with_capacity(gallery.len());
    for path in gallery {
        sets.push(to_set(load_records(path, ppi, config)?)?);
    }

    let start = Instant::now();
    let ranked = identify(&probe_set, &sets, config);
    println!(
        "Probe {} against {} entries ({:.2?})",
        probe.display(),
        sets.len(),
        start.elapsed()
    );
    for c in ranked.iter().take(top) {
        println!("  {:5} {}", c.score, gallery[c.index].display());
    }
    Ok(())
}

fn quality_cmd(image: &Path, ppi: u32, json: bool, config: &Config) -> Result<(), ToolError> {
    let (pixels, width, height) = load_grayscale(image)?;
    let img = GrayscaleImage::new(&pixels, width, height, ppi)?;
    let result = quality::assess(&img, config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "{}: class {} ({}), confidence {:.2}, status {:?}",
            image.display(),
            result.class,
            result.label(),
            result.confidence,
            result.status
        );
    }
    Ok(())
}

fn synth_cmd(
    out: &Path,
    width: usize,
    height: usize,
    period: f32,
    count: usize,
    seed: u64,
    rotation: f32,
) -> Result<(), ToolError> {
    let mut state = seed.max(1);
    let mut next = move || {
        // xorshift64
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 11) as f32 / (1u64 << 53) as f32
    };
    let margin = 0.15;
    let singularities: Vec<Singularity> = (0..count)
        .map(|_| {
            let x = (margin + (1.0 - 2.0 * margin) * next()) * width as f32;
            let y = (margin + (1.0 - 2.0 * margin) * next()) * height as f32;
            let charge = if next() < 0.5 { -1.0 } else { 1.0 };
            Singularity::new(x, y, charge)
        })
        .collect();
    let pose = Pose {
        rotation,
        ..Pose::default()
    };
    let pixels = synthetic_print_posed(width, height, period, &singularities, pose);
    save_grayscale(out, &pixels, width, height)?;
    println!("Wrote {} ({}x{}, {} singularities)", out.display(), width, height, count);
    for s in &singularities {
        let (x, y) = pose.apply(s.x, s.y, width, height);
        println!("  ({x:.1}, {y:.1}) charge {:+}", s.charge);
    }
    Ok(())
}
