use axum::{
    extract::State,
    response::Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tower_cookies::Cookies;

use crate::{
    middleware::current_session,
    models::ItemRecord,
    AppState,
};

#[derive(Serialize)]
pub struct InventoryResponse {
    pub items: Vec<ItemRecord>,
    pub item_count: usize,
    pub total_value: Decimal,
}

pub async fn list_items(
    cookies: Cookies,
    State(state): State<AppState>,
) -> Json<InventoryResponse> {
    let session = current_session(&cookies, &state.sessions);
    let response = state.sessions.with_store(session, |store| InventoryResponse {
        items: store.items().to_vec(),
        item_count: store.len(),
        total_value: store.total_value(),
    });

    Json(response)
}
