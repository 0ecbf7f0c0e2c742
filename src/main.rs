use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use anyhow::Context;
use image::imageops;
use indicatif::{ProgressBar, ProgressStyle};
use raymarch_renderer::scene::REFERENCE_SCENE;
use raymarch_renderer::{parse_file_content, render_scene_with};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(rename_all = "kebab-case")]
struct Opt {
    /// Scene description; the built-in reference scene when omitted.
    #[structopt(long, parse(from_os_str))]
    pub scene: Option<PathBuf>,
    /// Output image, format chosen from the extension.
    #[structopt(long, parse(from_os_str), default_value = "img.png")]
    pub output: PathBuf,
    #[structopt(long)]
    pub threads: Option<usize>,
    /// Save the image as rendered instead of rotated by 180 degrees.
    #[structopt(long)]
    pub no_flip: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = Opt::from_args();

    if let Some(threads) = opts.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to set up the render thread pool")?;
    }

    let content = match &opts.scene {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed opening scene file {}", path.display()))?,
        None => REFERENCE_SCENE.to_string(),
    };
    let job = parse_file_content(&content).context("failed to load the scene")?;

    let progress = ProgressBar::new(job.config.height as u64);
    progress.set_style(
        ProgressStyle::with_template("{elapsed_precise} [{bar:40}] {pos}/{len} rows")
            .context("bad progress bar template")?,
    );
    let rendered = render_scene_with(
        &job.scene,
        &job.camera,
        &job.config,
        &progress,
        &AtomicBool::new(false),
    )?;

    let image = if opts.no_flip {
        rendered
    } else {
        imageops::rotate180(&rendered)
    };
    image
        .save(&opts.output)
        .with_context(|| format!("failed writing {}", opts.output.display()))?;
    log::info!("saved {}", opts.output.display());
    Ok(())
}
