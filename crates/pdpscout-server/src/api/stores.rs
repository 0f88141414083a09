use axum::{extract::State, Extension, Json};
use pdpscout_core::{Platform, ResolverKind, VerificationPolicy};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct StoreItem {
    slug: String,
    name: String,
    base_url: String,
    /// `None` means the platform is detected per lookup.
    platform: Option<Platform>,
    resolver: ResolverKind,
    verification: VerificationPolicy,
}

pub(super) async fn list_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<StoreItem>>> {
    let data = state
        .catalog
        .iter()
        .map(|store| StoreItem {
            slug: store.slug.clone(),
            name: store.display_name().to_string(),
            base_url: store.base_url.clone(),
            platform: store.platform,
            resolver: store.resolver,
            verification: store.verification,
        })
        .collect();

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}
