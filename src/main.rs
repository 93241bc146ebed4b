use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use gallery::app::GalleryApp;
use gallery::cli::{CliArgs, USAGE};

fn main() {
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = "gallery=info".parse::<Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = match CliArgs::from_env() {
        Ok(args) => args,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    };

    let app = GalleryApp::new(args);
    std::process::exit(app.run());
}
