use comicgen::imagegen::ServiceKind;
use comicgen::ComicError;
use comicgen_ws::server::ServerDefaults;
use structopt::StructOpt;

#[derive(Debug, StructOpt, Clone)]
#[structopt(name = "comic-server", about = "Video to Comic Generator Web Server")]
struct Opt {
    // TCP port to listen on
    #[structopt(short, long, default_value = "3000")]
    port: u16,

    // Image service preselected as primary in the form and used by the API when none is given
    #[structopt(long, default_value = "openai")]
    primary: ServiceKind,

    // Preselected fallback; defaults to the other service
    #[structopt(long)]
    fallback: Option<ServiceKind>,
}

#[tokio::main]
async fn main() -> Result<(), ComicError> {
    let opt = Opt::from_args();
    let defaults = ServerDefaults {
        primary: opt.primary,
        fallback: opt.fallback.unwrap_or_else(|| opt.primary.other()),
    };
    comicgen_ws::server::launch_server(opt.port, defaults).await
}
