use std::process;

use server::prelude::*;

#[async_std::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = ctrlc::set_handler(|| {
        log::info!("interrupted, shutting down");
        process::exit(0);
    }) {
        log::warn!("unable to install signal handler: {}", err);
    }

    if let Err(err) = run().await {
        log::error!("{}", err);
        process::exit(1);
    }
}

async fn run() -> Result<(), Error> {
    let config = Config::from_env()?;
    server::serve(config).await
}
