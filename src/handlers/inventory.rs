use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use askama::Template;
use log::{info, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::str::FromStr;
use tower_cookies::Cookies;

use crate::{
    filters,
    handlers::{redirect_with_notice, Flash},
    middleware::current_session,
    models::{ItemDraft, ItemRecord},
    AppState,
};

const MAX_NAME_CHARS: usize = 100;
const MIN_PRICE: Decimal = dec!(0.01);
const BLANK_EDIT_ROWS: usize = 3;

#[derive(Template)]
#[template(path = "inventory/item_form.html")]
struct ItemFormTemplate {
    form: ItemForm,
    errors: Vec<String>,
    currency: String,
    flash: Flash,
}

#[derive(Template)]
#[template(path = "inventory/edit.html")]
struct EditTemplate {
    rows: Vec<EditRow>,
    errors: Vec<String>,
    currency: String,
    flash: Flash,
}

#[derive(Debug, Deserialize)]
pub struct ItemForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    quantity: String,
    #[serde(default)]
    unit_price: String,
}

impl Default for ItemForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            quantity: "1".to_string(),
            unit_price: "10.00".to_string(),
        }
    }
}

// Prices typed with a decimal comma are accepted as well.
fn parse_price(text: &str) -> Option<Decimal> {
    Decimal::from_str(&text.trim().replace(',', ".")).ok()
}

fn check_name(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("name is required")
    } else if name.chars().count() > MAX_NAME_CHARS {
        Some("name must be at most 100 characters")
    } else {
        None
    }
}

impl ItemForm {
    fn validate(&self) -> Result<ItemDraft, Vec<String>> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if let Some(problem) = check_name(name) {
            errors.push(format!("Item {problem}"));
        }

        let quantity = match self.quantity.trim().parse::<u32>() {
            Ok(quantity) if quantity >= 1 => Some(quantity),
            _ => {
                errors.push("Quantity must be a whole number of at least 1".to_string());
                None
            }
        };

        let unit_price = match parse_price(&self.unit_price) {
            Some(price) if price >= MIN_PRICE => Some(price),
            _ => {
                errors.push("Unit price must be at least 0.01".to_string());
                None
            }
        };

        match (quantity, unit_price) {
            (Some(quantity), Some(unit_price)) if errors.is_empty() => {
                Ok(ItemDraft::new(name, quantity, unit_price))
            }
            _ => Err(errors),
        }
    }
}

/// A row of the bulk editor as the browser sees it.
#[derive(Debug, Clone, Default)]
pub struct EditRow {
    index: usize,
    name: String,
    quantity: String,
    unit_price: String,
    value: String,
    remove: bool,
}

impl EditRow {
    fn from_record(index: usize, record: &ItemRecord) -> Self {
        Self {
            index,
            name: record.name().to_string(),
            quantity: record.quantity().to_string(),
            unit_price: record.unit_price().to_string(),
            value: filters::format_amount(record.value()),
            remove: false,
        }
    }

    fn blank(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }
}

/// Repeated fields of the bulk editor, one entry per rendered row.
#[derive(Debug, Deserialize)]
pub struct EditForm {
    #[serde(default)]
    name: Vec<String>,
    #[serde(default)]
    quantity: Vec<String>,
    #[serde(default)]
    unit_price: Vec<String>,
    #[serde(default)]
    remove: Vec<usize>,
}

fn field(values: &[String], index: usize) -> &str {
    values.get(index).map_or("", |value| value.trim())
}

impl EditForm {
    fn row_count(&self) -> usize {
        self.name.len().max(self.quantity.len()).max(self.unit_price.len())
    }

    /// Echo the submission back so a failed save keeps the user's input.
    fn rows(&self) -> Vec<EditRow> {
        (0..self.row_count())
            .map(|index| EditRow {
                index,
                name: field(&self.name, index).to_string(),
                quantity: field(&self.quantity, index).to_string(),
                unit_price: field(&self.unit_price, index).to_string(),
                value: String::new(),
                remove: self.remove.contains(&index),
            })
            .collect()
    }

    fn to_drafts(&self) -> Result<Vec<ItemDraft>, Vec<String>> {
        let mut drafts = Vec::new();
        let mut errors = Vec::new();

        for index in 0..self.row_count() {
            let name = field(&self.name, index);
            let quantity = field(&self.quantity, index);
            let unit_price = field(&self.unit_price, index);

            if self.remove.contains(&index)
                || (name.is_empty() && quantity.is_empty() && unit_price.is_empty())
            {
                continue;
            }

            let row = index + 1;
            if let Some(problem) = check_name(name) {
                errors.push(format!("Row {row}: {problem}"));
            }
            let quantity = quantity.parse::<u32>().ok();
            if quantity.is_none() {
                errors.push(format!("Row {row}: quantity must be a whole number of 0 or more"));
            }
            let unit_price = parse_price(unit_price).filter(|price| *price >= MIN_PRICE);
            if unit_price.is_none() {
                errors.push(format!("Row {row}: unit price must be at least 0.01"));
            }

            if let (Some(quantity), Some(unit_price)) = (quantity, unit_price) {
                drafts.push(ItemDraft::new(name, quantity, unit_price));
            }
        }

        if errors.is_empty() {
            Ok(drafts)
        } else {
            Err(errors)
        }
    }
}

// Handler to show the form for adding a single item
pub async fn item_form(
    State(state): State<AppState>,
    Query(flash): Query<Flash>,
) -> impl IntoResponse {
    ItemFormTemplate {
        form: ItemForm::default(),
        errors: Vec::new(),
        currency: state.config.currency_label.clone(),
        flash,
    }
}

// Handler to add a single item to the session's inventory
pub async fn create_item(
    cookies: Cookies,
    State(state): State<AppState>,
    Form(form): Form<ItemForm>,
) -> Response {
    let currency = state.config.currency_label.clone();
    let reject = |form: ItemForm, errors: Vec<String>| {
        let template = ItemFormTemplate {
            form,
            errors,
            currency: currency.clone(),
            flash: Flash::default(),
        };
        (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
    };

    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(errors) => {
            warn!("Rejected new item: {}", errors.join("; "));
            return reject(form, errors);
        }
    };

    let session = current_session(&cookies, &state.sessions);
    let added = state.sessions.with_store(session, |store| {
        store
            .add_item(draft.name, draft.quantity, draft.unit_price)
            .map(|item| item.name().to_string())
    });

    match added {
        Ok(name) => redirect_with_notice("/", &format!("Added item: {name}")).into_response(),
        Err(err) => reject(form, vec![err.to_string()]),
    }
}

// Handler to show every item as an editable row
pub async fn edit_page(
    cookies: Cookies,
    State(state): State<AppState>,
    Query(flash): Query<Flash>,
) -> impl IntoResponse {
    let session = current_session(&cookies, &state.sessions);
    let mut rows: Vec<EditRow> = state.sessions.with_store(session, |store| {
        store
            .items()
            .iter()
            .enumerate()
            .map(|(index, record)| EditRow::from_record(index, record))
            .collect()
    });

    let first_blank = rows.len();
    rows.extend((first_blank..first_blank + BLANK_EDIT_ROWS).map(EditRow::blank));

    EditTemplate {
        rows,
        errors: Vec::new(),
        currency: state.config.currency_label.clone(),
        flash,
    }
}

// Handler to save the bulk editor; the whole table is replaced when anything changed
pub async fn save_edits(
    cookies: Cookies,
    State(state): State<AppState>,
    axum_extra::extract::Form(form): axum_extra::extract::Form<EditForm>,
) -> Response {
    let currency = state.config.currency_label.clone();
    let reject = |form: &EditForm, errors: Vec<String>| {
        let template = EditTemplate {
            rows: form.rows(),
            errors,
            currency: currency.clone(),
            flash: Flash::default(),
        };
        (StatusCode::UNPROCESSABLE_ENTITY, template).into_response()
    };

    let drafts = match form.to_drafts() {
        Ok(drafts) => drafts,
        Err(errors) => {
            warn!("Rejected inventory edit: {}", errors.join("; "));
            return reject(&form, errors);
        }
    };

    let session = current_session(&cookies, &state.sessions);
    let saved = state.sessions.with_store(session, |store| {
        if store.drafts() == drafts {
            return Ok(false);
        }
        store.replace_all(drafts).map(|()| true)
    });

    match saved {
        Ok(true) => {
            info!("Saved inventory edits for session {}", session);
            redirect_with_notice("/items/edit", "Changes saved").into_response()
        }
        Ok(false) => redirect_with_notice("/items/edit", "No changes to save").into_response(),
        Err(err) => reject(&form, vec![err.to_string()]),
    }
}
