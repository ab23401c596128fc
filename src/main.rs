use anyhow::{anyhow, Result};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tweetbox::app::composer::{Composer, SubmitOutcome};
use tweetbox::config::AppConfig;
use tweetbox::domain::media::RawFile;
use tweetbox::infra::camera::{MediaDevices, NoCamera, StillFrameDevices};
use tweetbox::infra::store::PostStore;

const USAGE: &str = "usage: tweetbox [--image PATH] [--capture FRAME] <text...>";

struct Args {
    text: String,
    image: Option<PathBuf>,
    capture: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        println!("{}", USAGE);
        std::process::exit(0);
    }

    let image = args.opt_value_from_str("--image")?;
    let capture = args.opt_value_from_str("--capture")?;
    let text = args
        .finish()
        .into_iter()
        .map(|word| {
            word.into_string()
                .map_err(|_| anyhow!("post text must be valid UTF-8"))
        })
        .collect::<Result<Vec<_>>>()?
        .join(" ");

    Ok(Args {
        text,
        image,
        capture,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = parse_args()?;
    let config = AppConfig::from_env()?;

    match args.capture.clone() {
        Some(frame) => run(tweetbox::composer(&config, StillFrameDevices::new(frame))?, args).await,
        None => run(tweetbox::composer(&config, NoCamera)?, args).await,
    }
}

async fn run<S: PostStore, D: MediaDevices>(composer: Composer<S, D>, args: Args) -> Result<()> {
    composer.set_text(args.text);

    if let Some(path) = args.image {
        let file = RawFile::from_path(&path)
            .await
            .map_err(|err| anyhow!("failed to open {}: {}", path.display(), err))?;
        composer.select_image(file)?;
    }

    if args.capture.is_some() {
        composer.start_capture().await?;
        composer.capture()?;
    }

    match composer.submit().await {
        SubmitOutcome::Posted(handle) => {
            tracing::info!(path = %handle.path, "posted");
            println!("{}", handle.path);
            Ok(())
        }
        SubmitOutcome::Busy => Err(anyhow!("a submission is already in flight")),
        SubmitOutcome::Failed(err) => Err(anyhow!("{}", err)),
    }
}
