use resizer_core::Config;

// Use mimalloc as the global allocator for lower fragmentation under many concurrent decodes.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (metadata store, storage, services, routes)
    let (state, router) = resizer_api::setup::initialize_app(config.clone()).await?;

    // Start the server; returns after the persist queue has drained
    resizer_api::setup::server::start_server(&config, router, state).await?;

    Ok(())
}
