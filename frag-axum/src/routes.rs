use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use frag_core::{is_supported_type, Fragment, MediaType};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::{ApiError, FragmentsState, Owner};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    expand: Option<String>,
}

impl ListQuery {
    fn expand(&self) -> bool {
        matches!(self.expand.as_deref(), Some("1") | Some("true"))
    }
}

/// `/v1` routes. Every handler takes an [`Owner`], so all of them require auth.
pub fn v1_router() -> Router<FragmentsState> {
    Router::new()
        .route("/fragments", get(list_fragments).post(create_fragment))
        .route(
            "/fragments/{id}",
            get(get_fragment).put(update_fragment).delete(delete_fragment),
        )
        .route("/fragments/{id}/info", get(get_fragment_info))
}

pub async fn health() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, "no-cache")],
        Json(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "author": env!("CARGO_PKG_AUTHORS"),
            "githubUrl": env!("CARGO_PKG_REPOSITORY"),
        })),
    )
}

pub async fn not_found() -> ApiError {
    ApiError::not_found("not found")
}

async fn list_fragments(
    State(state): State<FragmentsState>,
    owner: Owner,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let fragments = state.fragments.by_owner(owner.id(), query.expand()).await?;
    debug!(owner_id = owner.id(), count = fragments.len(), "fragments listed");

    Ok(Json(json!({ "status": "ok", "fragments": fragments })))
}

async fn create_fragment(
    State(state): State<FragmentsState>,
    owner: Owner,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let content_type = content_type(&headers)?;

    let mut fragment = Fragment::new(owner.id(), content_type)?;
    state.fragments.set_data(&mut fragment, body).await?;

    let location = format!("{}/v1/fragments/{}", base_url(&state, &headers), fragment.id());
    info!(owner_id = owner.id(), id = fragment.id(), size = fragment.size(), "fragment created");

    let location = HeaderValue::from_str(&location)
        .map_err(|_| ApiError::internal("Unable to build Location header"))?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(json!({ "status": "ok", "fragment": fragment })),
    )
        .into_response())
}

async fn get_fragment(
    State(state): State<FragmentsState>,
    owner: Owner,
    Path(id_with_ext): Path<String>,
) -> Result<Response, ApiError> {
    let (id, ext) = split_extension(&id_with_ext);
    let fragment = state.fragments.by_id(owner.id(), id).await?;

    let target = match ext {
        Some(ext) => Some(MediaType::from_extension(ext).ok_or_else(|| {
            warn!(ext, "unsupported extension");
            ApiError::unsupported_media_type(format!("Unsupported file extension: .{ext}"))
        })?),
        None => None,
    };
    let target = target.map(|t| t.as_str());
    let served = match fragment.negotiate(target)? {
        Some(converted) => converted.as_str().to_string(),
        None => fragment.content_type().to_string(),
    };

    let data = state.fragments.get_converted_data(&fragment, target).await?;
    debug!(id, source_type = fragment.content_type(), target_type = %served, "fragment read");

    let content_type = HeaderValue::from_str(&served)
        .map_err(|_| ApiError::internal("Unable to build Content-Type header"))?;
    Ok(([(header::CONTENT_TYPE, content_type)], data).into_response())
}

async fn get_fragment_info(
    State(state): State<FragmentsState>,
    owner: Owner,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let fragment = state.fragments.by_id(owner.id(), &id).await?;
    Ok(Json(json!({
        "status": "ok",
        "fragment": fragment,
        "formats": fragment.formats(),
    })))
}

async fn update_fragment(
    State(state): State<FragmentsState>,
    owner: Owner,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let content_type = content_type(&headers)?;

    let fragment = state
        .fragments
        .replace_data(owner.id(), &id, content_type, body)
        .await?;
    info!(owner_id = owner.id(), id = fragment.id(), size = fragment.size(), "fragment updated");

    Ok(Json(json!({
        "status": "ok",
        "fragment": fragment,
        "formats": fragment.formats(),
    })))
}

async fn delete_fragment(
    State(state): State<FragmentsState>,
    owner: Owner,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    // 404 for anything the caller does not own
    state.fragments.by_id(owner.id(), &id).await?;
    state.fragments.delete(owner.id(), &id).await?;
    info!(owner_id = owner.id(), id, "fragment deleted");

    Ok(Json(json!({ "status": "ok" })))
}

fn content_type(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| is_supported_type(v))
        .ok_or_else(|| ApiError::unsupported_media_type("Unsupported Content-Type"))
}

fn base_url(state: &FragmentsState, headers: &HeaderMap) -> String {
    if let Some(api_url) = &state.api_url {
        return api_url.clone();
    }
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}")
}

/// `abc.md` -> (`abc`, Some(`md`)). A trailing dot is not an extension.
fn split_extension(value: &str) -> (&str, Option<&str>) {
    match value.rsplit_once('.') {
        Some((id, ext)) if !id.is_empty() && !ext.is_empty() => (id, Some(ext)),
        _ => (value, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_last_dot() {
        assert_eq!(split_extension("abc"), ("abc", None));
        assert_eq!(split_extension("abc.md"), ("abc", Some("md")));
        assert_eq!(split_extension("a.b.html"), ("a.b", Some("html")));
        assert_eq!(split_extension("abc."), ("abc.", None));
        assert_eq!(split_extension(".md"), (".md", None));
    }

    #[test]
    fn expand_flag() {
        assert!(ListQuery { expand: Some("1".into()) }.expand());
        assert!(!ListQuery { expand: Some("0".into()) }.expand());
        assert!(!ListQuery::default().expand());
    }
}
