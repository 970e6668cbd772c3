use std::sync::Arc;
use tokengate::api;
use tokengate::logger::*;
use tokengate::server::*;
use tokengate::settings::*;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let mut project_settings = parse_settings(cli.settings.as_deref())?;
    if let Some(address) = cli.address {
        project_settings.http.address = address;
    }
    info!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    let address: std::net::SocketAddr = project_settings.http.address.parse()?;

    let server = Arc::new(Server::try_new(&project_settings)?);

    let (bound, serving) = warp::serve(api::routes(server.clone()))
        .try_bind_with_graceful_shutdown(address, async {
            signal::ctrl_c().await.expect("Could not register SIGINT");
        })?;
    info!(%bound, "listening");
    serving.await;

    server.shutdown();

    Ok(())
}
