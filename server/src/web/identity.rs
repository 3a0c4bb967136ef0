// bazaar_server/src/web/identity.rs

//! Establishes who is calling.
//!
//! The caller's id travels in the `X-User-ID` header and is checked against the
//! users repository. No header means an anonymous caller; the access pipeline
//! decides whether that is acceptable for the route.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use bazaar::model::{Entity, User};
use bazaar::{AccessRequest, Identity, Method, Repository, RouteMarker};
use futures_util::future::LocalBoxFuture;
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "X-User-ID";

/// The identity behind a request, if any.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Identity>);

impl Caller {
  pub fn identity(&self) -> Option<Identity> {
    self.0.clone()
  }

  /// Starts an access request on behalf of this caller.
  pub fn request(&self, method: Method, marker: RouteMarker) -> AccessRequest {
    AccessRequest::new(method).by(self.identity()).marked(marker)
  }
}

impl FromRequest for Caller {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let header = req
      .headers()
      .get(USER_ID_HEADER)
      .map(|value| value.to_str().map(str::to_owned));
    let state = req.app_data::<web::Data<AppState>>().cloned();

    Box::pin(async move {
      let raw = match header {
        None => return Ok(Caller(None)),
        Some(Ok(raw)) => raw,
        Some(Err(_)) => return Err(AppError::Auth(format!("{} header is not valid text.", USER_ID_HEADER))),
      };
      let user_id = Uuid::parse_str(raw.trim()).map_err(|_| {
        warn!(header = %raw, "Caller extractor: malformed user id.");
        AppError::Auth(format!("Invalid {} header.", USER_ID_HEADER))
      })?;
      let state = state.ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;

      let user = state.repos.users.find_optional(&User::id_filter(user_id)).await?;
      match user {
        Some(user) => Ok(Caller(Some(Identity {
          id: user.id,
          email: user.email,
        }))),
        None => {
          warn!(%user_id, "Caller extractor: unknown user.");
          Err(AppError::Auth("Unknown user.".to_string()))
        }
      }
    })
  }
}
