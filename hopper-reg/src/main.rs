//  MAIN.rs
//    by Lut99
//
//  Created:
//    05 Feb 2025, 11:58:43
//  Last edited:
//    23 May 2025, 11:36:40
//  Auto updated?
//    Yes
//
//  Description:
//!   Entrypoint to the `hopper-reg` service.
//

mod cli;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use dotenvy::dotenv;
use error_trace::trace;
use hopper_cfg::info::YamlInfo as _;
use hopper_cfg::node::NodeConfig;
use hopper_reg::spec::Context;
use hopper_reg::store::ElementStore;
use hopper_reg::{health, work};
use tokio::signal::unix::{Signal, SignalKind, signal};
use tracing::{debug, error, info, warn};
use warp::Filter;

/***** CONSTANTS *****/
/// The default log level for tracing_subscriber. Levels higher than this will be discarded.
const DEFAULT_LOG_LEVEL: tracing::level_filters::LevelFilter = tracing::level_filters::LevelFilter::INFO;
/// The environment variable used by env-filter in tracing subscriber
const LOG_LEVEL_ENV_VAR: &str = "HOPPER_REG_LOG";



/***** ENTRYPOINT *****/
#[tokio::main]
async fn main() {
    dotenv().ok();
    let args = cli::Cli::parse();

    let cli_log_level = if args.trace {
        tracing::level_filters::LevelFilter::TRACE
    } else if args.debug {
        tracing::level_filters::LevelFilter::DEBUG
    } else {
        DEFAULT_LOG_LEVEL
    };
    specifications::tracing::setup_subscriber(LOG_LEVEL_ENV_VAR, cli_log_level);

    info!("Initializing hopper-reg v{}...", env!("CARGO_PKG_VERSION"));

    // Load the node config
    debug!("Loading node.yml file '{}'...", args.node_config_path.display());
    let node_config: NodeConfig = match NodeConfig::from_path(&args.node_config_path) {
        Ok(config) => config,
        Err(err) => {
            error!("{}", trace!(("Failed to load NodeConfig file"), err));
            std::process::exit(1);
        },
    };

    // Load the element snapshot named by it
    debug!("Loading element snapshot '{}'...", node_config.paths.elements.display());
    let store: ElementStore = match ElementStore::from_path(&node_config.paths.elements) {
        Ok(store) => store,
        Err(err) => {
            error!("{}", trace!(("Failed to load element snapshot"), err));
            std::process::exit(1);
        },
    };
    info!("Serving {} work element(s) ({} live)", store.len(), store.count());

    // Prepare the warp paths
    debug!("Preparing warp...");
    let context: Arc<Context> = Arc::new(Context { store });
    let filter = work::routes(context).or(health::routes()).with(warp::trace::request());

    // Extract the bind address
    let bind_addr: SocketAddr = node_config.services.reg.bind;

    // Run the server
    info!("Ready to accept new connections @ '{}'...", bind_addr);
    let handle = warp::serve(filter).try_bind_with_graceful_shutdown(bind_addr, async {
        // Register a SIGTERM handler to be Docker-friendly
        let mut handler: Signal = match signal(SignalKind::terminate()) {
            Ok(handler) => handler,
            Err(err) => {
                error!("{}", trace!(("Failed to register SIGTERM signal handler"), err));
                warn!("Service will NOT shutdown gracefully on SIGTERM");
                loop {
                    tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
                }
            },
        };

        // Wait until we receive such a signal after which we terminate the server
        handler.recv().await;
        info!("Received SIGTERM, shutting down gracefully...");
    });

    match handle {
        Ok((addr, srv)) => {
            info!("Now serving @ '{addr}'");
            srv.await
        },
        Err(err) => {
            error!("{}", trace!(("Failed to serve at '{bind_addr}'"), err));
            std::process::exit(1);
        },
    }
}
