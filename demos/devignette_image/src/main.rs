use std::path::{Path, PathBuf};
use std::time::Instant;

use argh::FromArgs;

use devignette::image::{Bgr8Image, ImageSize};
use devignette::{Devignetting, DevignettingConfig};

#[derive(FromArgs, Debug)]
/// Correct the vignetting of an image.
struct Args {
    /// path to the input image
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// path to the corrected image
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// keep the vignetting center in the middle of the image
    #[argh(switch)]
    no_center: bool,

    /// run step by step and save the intermediate corrections to this directory
    #[argh(option)]
    preview_dir: Option<PathBuf>,

    /// number of steps between two saved previews
    #[argh(option, default = "50")]
    preview_every: usize,
}

fn read_bgr8(path: &Path) -> Result<Bgr8Image, Box<dyn std::error::Error>> {
    let rgb = image::open(path)?.to_rgb8();
    let size = ImageSize {
        width: rgb.width() as usize,
        height: rgb.height() as usize,
    };

    let mut data = rgb.into_raw();
    data.chunks_exact_mut(3).for_each(|px| px.swap(0, 2));

    Ok(Bgr8Image::new(size, data)?)
}

fn write_bgr8(image: &Bgr8Image, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = image
        .iter_rows()
        .flat_map(|row| row.chunks_exact(3).flat_map(|px| [px[2], px[1], px[0]]))
        .collect::<Vec<u8>>();

    let rgb = image::RgbImage::from_raw(image.width() as u32, image.height() as u32, data)
        .ok_or("invalid image buffer")?;
    rgb.save(path)?;

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let original = read_bgr8(&args.input)?;
    log::info!("loaded {} from {}", original.size(), args.input.display());

    let config = DevignettingConfig {
        optimize_center: !args.no_center,
    };
    let mut devignetting = Devignetting::new(&original, config)?;

    let start = Instant::now();

    let mut corrected = original.clone();
    match &args.preview_dir {
        None => devignetting.run(&mut corrected)?,
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let every = args.preview_every.max(1);
            loop {
                // every step corrects a fresh copy of the input, like a new video frame
                corrected.clone_from(&original);
                let done = devignetting.step(&mut corrected)?;

                let steps = devignetting.num_steps();
                if done || steps % every == 0 {
                    let preview = dir.join(format!("step_{steps:05}.png"));
                    write_bgr8(&corrected, &preview)?;
                    log::debug!("saved {}", preview.display());
                }
                if done {
                    break;
                }
            }
        }
    }

    log::info!(
        "corrected in {:?} after {} steps, entropy {}, {:?}",
        start.elapsed(),
        devignetting.num_steps(),
        devignetting.best_score(),
        devignetting.model()
    );

    write_bgr8(&corrected, &args.output)?;
    println!("Saved corrected image to {}", args.output.display());

    Ok(())
}
