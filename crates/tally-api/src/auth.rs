//! Caller identification.
//!
//! Every profile-scoped endpoint expects a `profile_id` header naming a
//! stored profile. Handlers take a [`Requester`] argument and get the
//! resolved [`Profile`] handed to them; requests that do not resolve are
//! rejected before the handler runs.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use tally_core::{profile::Profile, store::ProfileStore};

use crate::{AppState, error::ApiError};

/// Header carrying the caller's profile id.
pub const PROFILE_HEADER: &str = "profile_id";

/// The profile making the request.
#[derive(Debug, Clone)]
pub struct Requester(pub Profile);

/// Resolves the `profile_id` header against the profile store.
///
/// A missing header, an unparseable id and an id with no stored profile
/// are indistinguishable to the caller; all three yield
/// [`ApiError::profile_not_found`].
pub async fn resolve_profile<S>(headers: &HeaderMap, store: &S) -> Result<Profile, ApiError>
where
  S: ProfileStore,
{
  let id: i64 = headers
    .get(PROFILE_HEADER)
    .and_then(|value| value.to_str().ok())
    .and_then(|value| value.trim().parse().ok())
    .ok_or_else(ApiError::profile_not_found)?;

  store
    .profile(id)
    .await
    .map_err(|e| ApiError::Internal(Box::new(e)))?
    .ok_or_else(ApiError::profile_not_found)
}

impl<S> FromRequestParts<AppState<S>> for Requester
where
  S: ProfileStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let profile = resolve_profile(&parts.headers, state.store.as_ref()).await?;
    Ok(Self(profile))
  }
}
