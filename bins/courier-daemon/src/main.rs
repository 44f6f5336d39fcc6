mod config;

use config::DaemonConfig;
use courier_core::call::NeverReject;
use courier_core::dispatch::LogErrorSink;
use courier_core::keys::AuthCreds;
use courier_core::transport::MockTransport;
use courier_core::ReceiveCore;
use courier_wire::{from_json_str, BinaryNode, WireError};
use log::{info, warn, LevelFilter};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;

#[derive(thiserror::Error, Debug)]
enum DaemonError {
    #[error("config")]
    Config,
}

#[tokio::main]
async fn main() -> Result<(), DaemonError> {
    let args: Vec<String> = std::env::args().collect();
    let mut path = PathBuf::from("courier.toml");
    let mut i = 1;
    while i + 1 < args.len() {
        if args[i] == "--config" {
            path = PathBuf::from(&args[i + 1]);
        }
        i += 1;
    }
    let cfg = config::load_config(&path).map_err(|_| DaemonError::Config)?;
    init_logging(&cfg);

    let core = ReceiveCore::new(
        cfg.receive.clone(),
        AuthCreds::generate(cfg.registration_id),
        Arc::new(MockTransport::new()),
        Arc::new(NeverReject),
        Arc::new(LogErrorSink),
    );

    let mut events = core.subscribe();
    let event_log = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!("event: {:?}", event);
        }
    });

    info!("courier daemon up, feeding nodes from stdin");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    match parse_node(&line) {
                        Ok(node) => {
                            if let Err(err) = core.dispatch(node).await {
                                warn!("dispatch failed: {}", err);
                            }
                        }
                        Err(err) => warn!("unparseable node: {}", err),
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    warn!("stdin: {}", err);
                    break;
                }
            }
        }
    }
    event_log.abort();
    Ok(())
}

fn parse_node(line: &str) -> Result<BinaryNode, WireError> {
    let node: BinaryNode = from_json_str(line)?;
    node.validate()?;
    Ok(node)
}

fn init_logging(cfg: &DaemonConfig) {
    let level = match cfg.logging.level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };
    let _ = env_logger::Builder::from_default_env()
        .filter_level(level)
        .try_init();
}
