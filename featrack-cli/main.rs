use std::path::PathBuf;
use std::process;

use log::warn;
use structopt::StructOpt;

use featrack_cli::{run_sweep, FrameSource, StatsSinks, SweepOptions, SweepSummary};
use featrack_core::{
    init_thread_pool, DescriptorKind, DetectorKind, HarnessConfig, MatcherKind, SelectorKind,
};

#[derive(Debug, StructOpt)]
#[structopt(
    name = "featrack",
    about = "Benchmark keypoint detector/descriptor combinations over an image sequence"
)]
struct Opt {
    /// Run only this detector (default: all of SHITOMASI, HARRIS, FAST, ORB)
    #[structopt(long)]
    detector: Option<DetectorKind>,

    /// Run only this descriptor (default: all of BRIEF, ORB, SIFT)
    #[structopt(long)]
    descriptor: Option<DescriptorKind>,

    /// Matching strategy: BRUTE_FORCE or APPROX_INDEX
    #[structopt(long, default_value = "BRUTE_FORCE")]
    matcher: MatcherKind,

    /// Match selection: NEAREST or RATIO_TEST
    #[structopt(long, default_value = "RATIO_TEST")]
    selector: SelectorKind,

    /// Directory holding the input frames
    #[structopt(long, parse(from_os_str), default_value = "images")]
    image_dir: PathBuf,

    /// First frame index (inclusive)
    #[structopt(long, default_value = "0")]
    start: usize,

    /// Last frame index (inclusive)
    #[structopt(long, default_value = "9")]
    end: usize,

    /// Directory for CSV logs and match images
    #[structopt(long, parse(from_os_str), default_value = "output")]
    output_dir: PathBuf,

    /// Save a side-by-side match visualization per frame pair
    #[structopt(long)]
    save: bool,

    /// Keep all keypoints instead of cropping to the vehicle region
    #[structopt(long)]
    no_roi: bool,
}

fn run(opt: Opt) -> Result<SweepSummary, Box<dyn std::error::Error>> {
    if opt.end < opt.start {
        return Err(format!("--end {} is before --start {}", opt.end, opt.start).into());
    }

    let mut config = HarnessConfig::default();
    if opt.no_roi {
        config.roi = None;
    }
    if let Err(e) = init_thread_pool(config.n_threads) {
        warn!("thread pool already initialized: {}", e);
    }

    let source = FrameSource {
        dir: opt.image_dir,
        prefix: "000000".to_string(),
        pad_width: 4,
        extension: "png".to_string(),
        start: opt.start,
        end: opt.end,
    };

    std::fs::create_dir_all(&opt.output_dir)?;
    let mut sinks = StatsSinks::create(&opt.output_dir)?;

    let options = SweepOptions {
        detectors: opt.detector.map_or_else(
            || {
                vec![
                    DetectorKind::ShiTomasi,
                    DetectorKind::Harris,
                    DetectorKind::Fast,
                    DetectorKind::Orb,
                ]
            },
            |d| vec![d],
        ),
        descriptors: opt.descriptor.map_or_else(
            || {
                let mut all = vec![DescriptorKind::Brief, DescriptorKind::Orb];
                if cfg!(feature = "sift") {
                    all.push(DescriptorKind::Sift);
                }
                all
            },
            |d| vec![d],
        ),
        matcher: opt.matcher,
        selector: opt.selector,
        save_dir: opt.save.then(|| opt.output_dir.join("matches")),
    };

    let summary = run_sweep(&options, &source, &config, &mut sinks)?;

    println!(
        "Analysis complete: {} combinations succeeded, {} failed",
        summary.completed, summary.failed
    );
    println!("Keypoint log: {}", sinks.keypoint_log_path().display());
    println!("Match log:    {}", sinks.match_log_path().display());
    if let Some(dir) = &options.save_dir {
        println!("Match images: {}", dir.display());
    }

    Ok(summary)
}

fn main() {
    pretty_env_logger::init();
    let opt = Opt::from_args();

    if let Err(e) = run(opt) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
