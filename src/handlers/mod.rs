pub mod api;
pub mod inventory;
pub mod transfer;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use askama::Template;
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::{
    filters,
    middleware::current_session,
    models::ItemRecord,
    AppState,
};

/// One-shot messages carried through a redirect's query string.
#[derive(Debug, Default, Deserialize)]
pub struct Flash {
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl Flash {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            notice: None,
            error: Some(message.into()),
        }
    }
}

pub fn redirect_with_notice(path: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{}?notice={}", path, urlencoding::encode(message)))
}

#[derive(Template)]
#[template(path = "overview.html")]
struct OverviewTemplate {
    items: Vec<ItemRecord>,
    total_value: Decimal,
    currency: String,
    flash: Flash,
}

pub async fn overview(
    cookies: Cookies,
    State(state): State<AppState>,
    Query(flash): Query<Flash>,
) -> impl IntoResponse {
    let session = current_session(&cookies, &state.sessions);
    let (items, total_value) = state
        .sessions
        .with_store(session, |store| (store.items().to_vec(), store.total_value()));

    OverviewTemplate {
        items,
        total_value,
        currency: state.config.currency_label.clone(),
        flash,
    }
}
