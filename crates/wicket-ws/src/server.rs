//! Listeners: the WebSocket channel server and the HTTP asset server.
//!
//! Both pick up the bridge's TLS material when they are bound and then
//! serve `wss://` and `https://` respectively.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use rustls::ServerConfig;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio_rustls::TlsAcceptor;
use tokio_tungstenite::accept_async;
use wicket_common::WindowId;
use wicket_core::Bridge;

use crate::connection::handle_connection;
use crate::tls;

/// Host to advertise for a bound address. Wildcard binds are reached
/// through loopback.
fn advertised_host(addr: SocketAddr) -> String {
    if addr.ip().is_unspecified() {
        "127.0.0.1".to_string()
    } else {
        addr.ip().to_string()
    }
}

/// Loopback peers may reach any window; other hosts only public ones.
pub(crate) fn peer_allowed(bridge: &Bridge, window: WindowId, peer: SocketAddr) -> bool {
    peer.ip().is_loopback() || bridge.is_public(window)
}

// =============================================================================
// WebSocket channels
// =============================================================================

/// Accepts browser sockets and attaches them to bridge windows.
pub struct ChannelServer {
    listener: TcpListener,
    bridge: Bridge,
    tls: Option<TlsAcceptor>,
}

impl ChannelServer {
    /// Bind the listener and advertise it to browsers as the channel
    /// endpoint. TLS material installed on the bridge at this point makes
    /// the endpoint `wss://`.
    pub async fn bind(bridge: Bridge, addr: impl ToSocketAddrs) -> io::Result<Self> {
        let tls = tls::from_bridge(&bridge)?.map(TlsAcceptor::from);
        let listener = TcpListener::bind(addr).await?;
        let local = listener.local_addr()?;
        let scheme = if tls.is_some() { "wss" } else { "ws" };
        bridge.set_channel_endpoint(format!(
            "{scheme}://{}:{}/",
            advertised_host(local),
            local.port()
        ));
        Ok(Self {
            listener,
            bridge,
            tls,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop. Runs until the task is dropped.
    pub async fn run(self) {
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!(tls = self.tls.is_some(), "channel server listening on {}", addr);
        }
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let bridge = self.bridge.clone();
                    let tls = self.tls.clone();
                    tokio::spawn(async move {
                        match tls {
                            Some(acceptor) => match acceptor.accept(stream).await {
                                Ok(stream) => accept_channel(stream, addr, bridge).await,
                                Err(e) => {
                                    tracing::warn!(peer = %addr, error = %e, "TLS handshake failed");
                                }
                            },
                            None => accept_channel(stream, addr, bridge).await,
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "TCP accept error");
                }
            }
        }
    }
}

async fn accept_channel<S>(stream: S, addr: SocketAddr, bridge: Bridge)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    match accept_async(stream).await {
        Ok(ws) => handle_connection(ws, addr, bridge).await,
        Err(e) => {
            tracing::warn!(peer = %addr, error = %e, "WS handshake failed");
        }
    }
}

// =============================================================================
// HTTP assets
// =============================================================================

/// Serves window pages and assets at `/{window}/{path}`.
pub struct AssetServer {
    listener: TcpListener,
    bridge: Bridge,
    tls: Option<Arc<ServerConfig>>,
}

impl AssetServer {
    /// Bind the listener and make it the port windows are shown on. TLS
    /// material installed on the bridge at this point is served as HTTPS.
    pub async fn bind(bridge: Bridge, addr: impl ToSocketAddrs) -> io::Result<Self> {
        let tls = tls::from_bridge(&bridge)?;
        let listener = TcpListener::bind(addr).await?;
        bridge.set_server_port(listener.local_addr()?.port());
        Ok(Self {
            listener,
            bridge,
            tls,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(self) -> io::Result<()> {
        tracing::info!(
            tls = self.tls.is_some(),
            "asset server listening on {}",
            self.listener.local_addr()?
        );
        let app = router(self.bridge).into_make_service_with_connect_info::<SocketAddr>();
        match self.tls {
            Some(config) => {
                let listener = self.listener.into_std()?;
                axum_server::from_tcp_rustls(listener, RustlsConfig::from_config(config))
                    .serve(app)
                    .await
            }
            None => axum::serve(self.listener, app).await,
        }
    }
}

pub fn router(bridge: Bridge) -> Router {
    Router::new()
        .route("/{window}", get(index_handler))
        .route("/{window}/", get(index_handler))
        .route("/{window}/{*path}", get(asset_handler))
        .with_state(bridge)
}

async fn index_handler(
    State(bridge): State<Bridge>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path(window): Path<usize>,
) -> Response {
    serve_asset(bridge, peer, WindowId(window), String::new()).await
}

async fn asset_handler(
    State(bridge): State<Bridge>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Path((window, path)): Path<(usize, String)>,
) -> Response {
    serve_asset(bridge, peer, WindowId(window), path).await
}

async fn serve_asset(bridge: Bridge, peer: SocketAddr, window: WindowId, path: String) -> Response {
    if !peer_allowed(&bridge, window, peer) {
        tracing::debug!(peer = %peer, window = %window, "asset request from remote peer refused");
        return (StatusCode::FORBIDDEN, "forbidden").into_response();
    }
    let asset = tokio::task::spawn_blocking(move || bridge.resolve_asset(window, &path))
        .await
        .ok()
        .flatten();
    match asset {
        Some(asset) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, asset.mime),
                (header::CACHE_CONTROL, "no-store"),
            ],
            asset.data,
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "not found").into_response(),
    }
}
