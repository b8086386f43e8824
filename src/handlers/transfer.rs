use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Multipart;
use askama::Template;
use log::{info, warn};
use tower_cookies::Cookies;

use crate::{
    error::AppError,
    handlers::{redirect_with_notice, Flash},
    middleware::current_session,
    AppState,
};

const EXPORT_FILE_NAME: &str = "inventory.csv";

#[derive(Template)]
#[template(path = "transfer.html")]
struct TransferTemplate {
    item_count: usize,
    currency: String,
    flash: Flash,
}

pub async fn transfer_page(
    cookies: Cookies,
    State(state): State<AppState>,
    Query(flash): Query<Flash>,
) -> impl IntoResponse {
    let session = current_session(&cookies, &state.sessions);
    let item_count = state.sessions.with_store(session, |store| store.len());

    TransferTemplate {
        item_count,
        currency: state.config.currency_label.clone(),
        flash,
    }
}

pub async fn export_csv(
    cookies: Cookies,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let session = current_session(&cookies, &state.sessions);
    let csv = state.sessions.with_store(session, |store| store.export_csv())?;

    info!("Exporting {} bytes of CSV for session {}", csv.len(), session);
    let disposition = format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

// Replaces the whole inventory with the uploaded file; a rejected file leaves it untouched
pub async fn import_csv(
    cookies: Cookies,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let upload = read_upload(multipart).await?;
    let session = current_session(&cookies, &state.sessions);

    let render = |status: StatusCode, flash: Flash| {
        let item_count = state.sessions.with_store(session, |store| store.len());
        let template = TransferTemplate {
            item_count,
            currency: state.config.currency_label.clone(),
            flash,
        };
        (status, template).into_response()
    };

    let Some(bytes) = upload else {
        return Ok(render(StatusCode::BAD_REQUEST, Flash::error("Choose a CSV file to import")));
    };

    match state.sessions.with_store(session, |store| store.import_csv(&bytes)) {
        Ok(count) => {
            info!("Imported {} items for session {}", count, session);
            Ok(redirect_with_notice("/", &format!("Imported {count} items")).into_response())
        }
        Err(err) => {
            let kind = if err.is_validation() { "validation" } else { "parse" };
            warn!("Rejected CSV import for session {} ({} error): {}", session, kind, err);
            Ok(render(
                StatusCode::UNPROCESSABLE_ENTITY,
                Flash::error(format!("Import failed: {err}")),
            ))
        }
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<Option<Bytes>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Upload(err.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let data = field
            .bytes()
            .await
            .map_err(|err| AppError::Upload(err.to_string()))?;
        if !data.is_empty() {
            return Ok(Some(data));
        }
    }
    Ok(None)
}
