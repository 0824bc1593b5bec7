use std::path::PathBuf;

use bytes::Bytes;
use structopt::StructOpt;

use comicgen::config::ComicConfig;
use comicgen::imagegen::ServiceKind;
use comicgen::input::{mime_for_extension, ComicRequest, VideoSource};
use comicgen::pipeline::ComicGenerator;
use comicgen::ComicError;

#[derive(Debug, StructOpt, Clone)]
#[structopt(name = "comicgen", about = "Turn a video into a 4-panel comic strip")]
struct Opt {
    // YouTube video or shorts URL
    #[structopt(long, required_unless = "video-file", conflicts_with = "video-file")]
    video_url: Option<String>,

    // Local video to send inline instead of a URL
    #[structopt(long, parse(from_os_str))]
    video_file: Option<PathBuf>,

    // Characters, setting or theme for the comic
    #[structopt(short, long)]
    prompt: String,

    // Image service tried first (openai or imagen)
    #[structopt(long, default_value = "openai")]
    primary: ServiceKind,

    // Image service tried if the primary fails; defaults to the other one
    #[structopt(long)]
    fallback: Option<ServiceKind>,

    // Where the PNG is written
    #[structopt(short, long, parse(from_os_str), default_value = "comic_strip.png")]
    output: PathBuf,

    // Print the prompt written by the video model
    #[structopt(long)]
    show_prompt: bool,
}

async fn load_source(opt: &Opt) -> Result<VideoSource, ComicError> {
    match (&opt.video_url, &opt.video_file) {
        (Some(url), _) => VideoSource::youtube(url),
        (None, Some(path)) => {
            let data = tokio::fs::read(path).await?;
            let mime = path
                .extension()
                .and_then(|e| e.to_str())
                .map(mime_for_extension);
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| String::from("video"));
            VideoSource::upload(Bytes::from(data), mime, &name)
        }
        (None, None) => Err(ComicError::validation("Please provide a video URL")),
    }
}

#[tokio::main]
async fn main() -> Result<(), ComicError> {
    comicgen::init_tracing("comicgen=info");
    let opt = Opt::from_args();

    let config = ComicConfig::from_env();
    let fallback = opt.fallback.unwrap_or_else(|| opt.primary.other());
    let generator = ComicGenerator::new(&config, config.http_client()?, opt.primary, fallback)?;

    let source = load_source(&opt).await?;
    let request = ComicRequest::new(source, &opt.prompt)?;
    let result = generator.generate_comic(&request).await?;

    if opt.show_prompt {
        println!("Enhanced prompt:\n{}\n", result.enhanced_prompt);
    }
    if let Some(ref warning) = result.warning {
        println!("Warning: {warning}");
    }
    result.image.save(&opt.output).await?;
    println!(
        "Generated with {} in {:.1}s -> {}",
        result.service_used.label(),
        result.took.as_secs_f64(),
        opt.output.display()
    );
    Ok(())
}
