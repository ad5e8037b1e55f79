// Copyright (c) James Kassemi, SC, US. All rights reserved.
//! HTTP/1 accept loop. hyper v1.+
use std::{future::Future, io};

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use ledger::LedgerStore;
use log::{debug, info, warn};
use tokio::net::TcpListener;

use crate::routes::{ApiState, handle};

/// Accepts connections until `shutdown` resolves. In-flight connections finish on their own tasks.
pub async fn serve<S, F>(state: ApiState<S>, listener: TcpListener, shutdown: F) -> io::Result<()>
where
    S: LedgerStore + 'static,
    F: Future<Output = ()>,
{
    info!("wheel api listening on {}", listener.local_addr()?);
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(err) => {
                        warn!("failed to accept connection: {err}");
                        continue;
                    }
                };
                let io = TokioIo::new(socket);
                let state = state.clone();
                let service = service_fn(move |req| handle(state.clone(), req));
                tokio::spawn(async move {
                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        debug!("error serving connection from {peer}: {err:?}");
                    }
                });
            }
            _ = &mut shutdown => {
                info!("wheel api shutting down");
                return Ok(());
            }
        }
    }
}
