use clap::Parser;

#[tokio::main]
async fn main() {
    // `CHAIN` decides which environment file supplies the remaining
    // variables, so it is read before argument parsing.
    let chain = std::env::var("CHAIN").unwrap_or_else(|_| deployer::config::DEFAULT_CHAIN.into());
    let env_file = match deployer::config::load_env_file(&chain) {
        Ok(env_file) => env_file,
        Err(err) => {
            eprintln!("{err:?}");
            std::process::exit(1);
        }
    };

    let args = deployer::arguments::Arguments::parse();
    observe::tracing::initialize(
        "warn,deployer=debug,chain=debug,artifacts=debug",
        tracing::level_filters::LevelFilter::ERROR,
    );
    if let Some(path) = env_file {
        tracing::info!(path = %path.display(), "loaded environment file");
    }
    tracing::info!("running deployer with validated arguments:\n{}", args);

    if let Err(err) = deployer::main(args).await {
        tracing::error!(?err, "deployment failed");
        std::process::exit(1);
    }
}
