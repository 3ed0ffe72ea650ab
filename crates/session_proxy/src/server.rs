use std::io;
use std::net::TcpListener;
use std::sync::Arc;

use actix_web::{dev::Server, web, App, HttpServer};

use crate::config::ProxyConfig;
use crate::controllers::session_controller;
use crate::issuer::{SessionIssuer, UpstreamSessionIssuer};
use crate::middleware::RequestSpan;
use crate::upstream::UpstreamClient;

pub struct AppState {
    pub issuer: Arc<dyn SessionIssuer>,
}

impl AppState {
    pub fn from_config(config: Arc<ProxyConfig>) -> reqwest::Result<Self> {
        let client = UpstreamClient::new(config)?;
        Ok(Self {
            issuer: Arc::new(UpstreamSessionIssuer::new(client)),
        })
    }
}

pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.configure(session_controller::config);
}

/// Build a server on an already-bound listener. The returned future must be
/// awaited or spawned to start serving.
pub fn serve(state: web::Data<AppState>, listener: TcpListener) -> io::Result<Server> {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(RequestSpan)
            .configure(app_config)
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub async fn run(config: ProxyConfig, bind_address: &str, port: u16) -> io::Result<()> {
    if config.uses_placeholder_workflow() {
        tracing::warn!(
            workflow_id = config.workflow_id(),
            "WORKFLOW_ID is not set; upstream will reject sessions for the placeholder workflow"
        );
    }
    tracing::debug!(config = ?config, "Session proxy configuration");

    let state = AppState::from_config(Arc::new(config))
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let listener = TcpListener::bind((bind_address, port))?;
    tracing::info!("Session proxy listening on http://{}:{}", bind_address, port);

    serve(web::Data::new(state), listener)?.await
}
