use actix_web::{web, HttpRequest, HttpResponse};

use crate::error::NormalizedError;
use crate::issuer::SessionRequest;
use crate::server::AppState;

/// Page-facing path used by the embedded widget script.
pub const CHATKIT_SESSION_PATH: &str = "/api/chatkit/session";
pub const SESSION_PATH: &str = "/session";

/// Mint a session secret. The request body, if any, is ignored.
pub async fn create_session(
    req: HttpRequest,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, NormalizedError> {
    let requester = req.peer_addr().map(|addr| addr.ip().to_string());
    let request = SessionRequest::new(requester);

    let credential = app_state.issuer.issue_session(&request).await?;
    Ok(HttpResponse::Ok().json(credential))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route(SESSION_PATH, web::post().to(create_session))
        .route(CHATKIT_SESSION_PATH, web::post().to(create_session));
}
