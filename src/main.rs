use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::extract::Extension;
use axum::routing::{get, post, put};
use axum::Router;

use chord_dht::bootstrap;
use chord_dht::maintenance::Maintainer;
use chord_dht::node::handlers::{
    handle_helloworld, handle_join, handle_leave, handle_network, handle_node_info,
    handle_notify, handle_sim_crash, handle_sim_recover, handle_update_predecessor,
    handle_update_successor,
};
use chord_dht::node::ChordNode;
use chord_dht::ring::{KeySpace, NodeAddress};
use chord_dht::rpc::protocol::{
    ENDPOINT_NODE_INFO, ENDPOINT_NOTIFY, ENDPOINT_STORAGE, ENDPOINT_TRANSFER,
    ENDPOINT_UPDATE_PREDECESSOR, ENDPOINT_UPDATE_SUCCESSOR,
};
use chord_dht::rpc::{HttpPeerRpc, PeerRpc};
use chord_dht::storage::handlers::{handle_get_value, handle_put_value, handle_transfer};

const DEFAULT_TICK_MS: u64 = 2000;
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

struct Config {
    bind: Option<String>,
    space_bits: Option<u32>,
    id: Option<u64>,
    join: Option<String>,
    bootstrap: Option<PathBuf>,
    node_id: Option<u64>,
    lifetime: Option<u64>,
}

fn usage(program: &str) {
    eprintln!(
        "Usage: {} --bind <host:port> --space <m> [--id <id>] [--join <host:port>] [--lifetime <secs>]",
        program
    );
    eprintln!("       {} --bootstrap <Nodes.json> --node <id> [--bind <host:port>]", program);
    eprintln!("Example: {} --bind 127.0.0.1:4000 --space 4", program);
    eprintln!(
        "Example: {} --bind 127.0.0.1:4001 --space 4 --join 127.0.0.1:4000",
        program
    );
}

fn parse_args(args: &[String]) -> anyhow::Result<Config> {
    let mut config = Config {
        bind: None,
        space_bits: None,
        id: None,
        join: None,
        bootstrap: None,
        node_id: None,
        lifetime: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                config.bind = Some(args.get(i + 1).context("--bind needs a value")?.clone());
                i += 2;
            }
            "--space" => {
                config.space_bits =
                    Some(args.get(i + 1).context("--space needs a value")?.parse()?);
                i += 2;
            }
            "--id" => {
                config.id = Some(args.get(i + 1).context("--id needs a value")?.parse()?);
                i += 2;
            }
            "--join" => {
                config.join = Some(args.get(i + 1).context("--join needs a value")?.clone());
                i += 2;
            }
            "--bootstrap" => {
                config.bootstrap = Some(PathBuf::from(
                    args.get(i + 1).context("--bootstrap needs a value")?,
                ));
                i += 2;
            }
            "--node" => {
                config.node_id = Some(args.get(i + 1).context("--node needs a value")?.parse()?);
                i += 2;
            }
            "--lifetime" => {
                config.lifetime =
                    Some(args.get(i + 1).context("--lifetime needs a value")?.parse()?);
                i += 2;
            }
            other => {
                anyhow::bail!("unknown argument {:?}", other);
            }
        }
    }

    Ok(config)
}

/// Build the node either fresh from the CLI parameters or restored from a
/// bootstrap file entry. Returns the node and the address to serve on.
fn build_node(config: &Config, rpc: Arc<dyn PeerRpc>) -> anyhow::Result<(Arc<ChordNode>, String)> {
    if let Some(path) = &config.bootstrap {
        let node_id = config
            .node_id
            .context("--bootstrap requires --node <id>")?;
        let entry = bootstrap::load_node(path, node_id)?;
        let space = KeySpace::new(entry.space_bits())?;
        let bind = config.bind.clone().unwrap_or_else(|| entry.address.clone());
        let fingers = entry
            .finger_table
            .iter()
            .map(|f| f.successor.clone())
            .collect();
        let node = ChordNode::with_state(
            NodeAddress::new(entry.id, entry.address.clone()),
            space,
            rpc,
            entry.successor.clone(),
            entry.predecessor.clone(),
            fingers,
        );
        return Ok((node, bind));
    }

    let bind = config.bind.clone().context("--bind is required")?;
    let bits = config.space_bits.context("--space is required")?;
    let space = KeySpace::new(bits)?;
    let id = match config.id {
        Some(id) => {
            anyhow::ensure!(space.contains(id), "--id {} outside [0, 2^{})", id, bits);
            id
        }
        None => space.hash(&bind),
    };
    let node = ChordNode::new(NodeAddress::new(id, bind.clone()), space, rpc);
    Ok((node, bind))
}

fn router(node: Arc<ChordNode>) -> Router {
    Router::new()
        .route("/helloworld", get(handle_helloworld))
        .route(
            &format!("{}/:key", ENDPOINT_STORAGE),
            get(handle_get_value).put(handle_put_value),
        )
        .route("/network", get(handle_network))
        .route(ENDPOINT_NODE_INFO, get(handle_node_info))
        .route("/join", post(handle_join))
        .route("/leave", post(handle_leave))
        .route("/sim-crash", post(handle_sim_crash))
        .route("/sim-recover", post(handle_sim_recover))
        .route(ENDPOINT_UPDATE_SUCCESSOR, put(handle_update_successor))
        .route(ENDPOINT_UPDATE_PREDECESSOR, put(handle_update_predecessor))
        .route(ENDPOINT_NOTIFY, post(handle_notify))
        .route(ENDPOINT_TRANSFER, post(handle_transfer))
        .layer(Extension(node))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        usage(&args[0]);
        std::process::exit(1);
    }

    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            usage(&args[0]);
            std::process::exit(1);
        }
    };

    let rpc: Arc<dyn PeerRpc> = Arc::new(HttpPeerRpc::new());
    let (node, bind) = build_node(&config, rpc)?;

    tracing::info!(
        "Starting node {} on {} (identifier space: {} bits)",
        node.address().id,
        bind,
        node.space().bits()
    );

    let tick = std::env::var("TICK_INTERVAL_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TICK_MS);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("cannot bind {}", bind))?;

    // Maintenance runs on its own timer and stops on the shared signal.
    {
        let maintainer = Maintainer::new(node.clone());
        tokio::spawn(async move {
            maintainer.run(Duration::from_millis(tick)).await;
        });
    }

    // Shutdown triggers: interrupt, optional lifetime, completed /leave.
    {
        let node = node.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received, shutting down");
                node.trigger_shutdown();
            }
        });
    }
    if let Some(secs) = config.lifetime {
        let node = node.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            tracing::info!("lifetime of {}s expired, shutting down", secs);
            node.trigger_shutdown();
        });
    }

    if let Some(peer) = &config.join {
        let node = node.clone();
        let peer = peer.clone();
        tokio::spawn(async move {
            if let Err(e) = node.join(&peer).await {
                tracing::warn!("startup join via {} failed: {}", peer, e);
            }
        });
    }

    let app = router(node.clone());
    let mut drain_rx = node.shutdown_receiver();
    let mut graceful_rx = node.shutdown_receiver();

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = graceful_rx.changed().await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            result.context("server task failed")??;
        }
        _ = drain_rx.changed() => {
            if tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await.is_err() {
                tracing::warn!("shutdown grace expired, closing remaining connections");
                server.abort();
            }
        }
    }

    tracing::info!("node exiting");
    Ok(())
}
