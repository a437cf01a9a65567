//! Voucher route handlers.

use std::cmp::Ordering;

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{NaiveDate, Utc};
use tower_sessions::Session;
use tracing::instrument;

use boutique_core::{FieldErrors, VoucherId};

use super::{format_date, render};
use crate::components::data_table::{
    DataTableConfig, FilterOption, Page, SortDir, TableColumn, TableQuery, TableRow,
};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::forms::VoucherForm;
use crate::middleware::AdminLayout;
use crate::models::{Voucher, VoucherKind};
use crate::services::flash;
use crate::state::AppState;
use crate::store::StoreError;

/// A voucher paired with the day its status is judged on.
#[derive(Debug, Clone)]
pub struct DatedVoucher {
    pub voucher: Voucher,
    pub today: NaiveDate,
}

impl DatedVoucher {
    /// `active`, `expired`, `used-up` or `inactive`.
    fn state(&self) -> &'static str {
        let voucher = &self.voucher;
        if !voucher.active {
            "inactive"
        } else if voucher.expires_on.is_some_and(|day| self.today > day) {
            "expired"
        } else if voucher.usage_limit.is_some_and(|limit| voucher.times_used >= limit) {
            "used-up"
        } else {
            "active"
        }
    }
}

impl TableRow for DatedVoucher {
    const SORT_COLUMNS: &'static [&'static str] = &["code", "value", "used", "expires"];
    const DEFAULT_SORT: (&'static str, SortDir) = ("code", SortDir::Asc);

    fn matches(&self, term: &str) -> bool {
        self.voucher.code.to_lowercase().contains(term)
    }

    fn compare(&self, other: &Self, column: &str) -> Ordering {
        let (a, b) = (&self.voucher, &other.voucher);
        match column {
            "value" => a.kind.as_str().cmp(b.kind.as_str()).then(a.value.cmp(&b.value)),
            "used" => a.times_used.cmp(&b.times_used),
            // No expiry sorts after every date
            "expires" => match (a.expires_on, b.expires_on) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            _ => a.code.cmp(&b.code),
        }
        .then_with(|| a.id.cmp(&b.id))
    }

    fn status(&self) -> Option<&str> {
        Some(self.state())
    }
}

/// Table configuration for the voucher listing.
#[must_use]
pub fn vouchers_table_config() -> DataTableConfig {
    DataTableConfig::new("/vouchers")
        .search_placeholder("Search by code...")
        .empty_title("No vouchers match")
        .column(TableColumn::sortable("code", "Code"))
        .column(TableColumn::sortable("value", "Discount"))
        .column(TableColumn::sortable("used", "Used"))
        .column(TableColumn::sortable("expires", "Expires"))
        .column(TableColumn::new("status", "Status"))
        .column(TableColumn::new("actions", ""))
        .status_option(FilterOption::new("active", "Active"))
        .status_option(FilterOption::new("expired", "Expired"))
        .status_option(FilterOption::new("used-up", "Used up"))
        .status_option(FilterOption::new("inactive", "Inactive"))
}

/// Voucher row view for templates.
#[derive(Debug, Clone)]
pub struct VoucherRowView {
    pub id: i32,
    pub code: String,
    pub value: String,
    pub usage: String,
    pub expires_on: Option<String>,
    pub state: &'static str,
    pub active: bool,
}

impl From<DatedVoucher> for VoucherRowView {
    fn from(dated: DatedVoucher) -> Self {
        let state = dated.state();
        let voucher = dated.voucher;
        Self {
            id: voucher.id.as_i32(),
            value: voucher.value_display(),
            usage: voucher.usage_limit.map_or_else(
                || voucher.times_used.to_string(),
                |limit| format!("{} / {limit}", voucher.times_used),
            ),
            expires_on: voucher.expires_on.map(format_date),
            state,
            active: voucher.active,
            code: voucher.code,
        }
    }
}

/// Vouchers list page template.
#[derive(Template)]
#[template(path = "vouchers/index.html")]
pub struct VouchersIndexTemplate {
    pub layout: AdminLayout,
    pub config: DataTableConfig,
    pub page: Page<VoucherRowView>,
}

/// Voucher create/edit form template.
#[derive(Template)]
#[template(path = "vouchers/form.html")]
pub struct VoucherFormTemplate {
    pub layout: AdminLayout,
    /// `None` while creating.
    pub voucher_id: Option<i32>,
    pub form: VoucherForm,
    pub errors: FieldErrors,
    pub kinds: [VoucherKind; 2],
}

impl VoucherFormTemplate {
    fn new(
        layout: AdminLayout,
        voucher_id: Option<i32>,
        form: VoucherForm,
        errors: FieldErrors,
    ) -> Self {
        Self {
            layout,
            voucher_id,
            form,
            errors,
            kinds: VoucherKind::ALL,
        }
    }

    #[must_use]
    pub fn action(&self) -> String {
        self.voucher_id
            .map_or_else(|| "/vouchers".to_string(), |id| format!("/vouchers/{id}"))
    }

    #[must_use]
    pub fn is_kind(&self, kind: &str) -> bool {
        self.form.kind == kind
    }
}

/// Vouchers list page handler.
#[instrument(skip_all)]
pub async fn index(
    layout: AdminLayout,
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Html<String>> {
    let today = Utc::now().date_naive();
    let rows = state
        .store()
        .vouchers()
        .await
        .into_iter()
        .map(|voucher| DatedVoucher { voucher, today })
        .collect();
    let config = vouchers_table_config();
    let page = query.apply(&config, rows).map(VoucherRowView::from);
    render(&VouchersIndexTemplate {
        layout,
        config,
        page,
    })
}

/// New voucher form.
pub async fn new(layout: AdminLayout) -> Result<Html<String>> {
    render(&VoucherFormTemplate::new(
        layout,
        None,
        VoucherForm::default(),
        FieldErrors::new(),
    ))
}

/// Edit voucher form.
pub async fn edit(
    layout: AdminLayout,
    State(state): State<AppState>,
    Path(id): Path<VoucherId>,
) -> Result<Html<String>> {
    let voucher = state.store().voucher(id).await?;
    render(&VoucherFormTemplate::new(
        layout,
        Some(id.as_i32()),
        VoucherForm::from(&voucher),
        FieldErrors::new(),
    ))
}

/// Create a voucher.
#[instrument(skip(layout, state, session, form), fields(code = %form.code))]
pub async fn create(
    layout: AdminLayout,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<VoucherForm>,
) -> Result<Response> {
    save(layout, &state, &session, None, form).await
}

/// Update a voucher.
#[instrument(skip(layout, state, session, form))]
pub async fn update(
    layout: AdminLayout,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<VoucherId>,
    Form(form): Form<VoucherForm>,
) -> Result<Response> {
    state.store().voucher(id).await?;
    save(layout, &state, &session, Some(id), form).await
}

async fn save(
    layout: AdminLayout,
    state: &AppState,
    session: &Session,
    id: Option<VoucherId>,
    form: VoucherForm,
) -> Result<Response> {
    let store = state.store();

    let result = match form.validate() {
        Ok(input) => {
            let saved = match id {
                Some(id) => store.update_voucher(id, input).await,
                None => store.create_voucher(input).await,
            };
            match saved {
                Ok(voucher) => Ok(voucher),
                Err(StoreError::DuplicateCode(code)) => {
                    let mut errors = FieldErrors::new();
                    errors.add("code", format!("Code {code} already exists"));
                    Err(errors)
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(errors) => Err(errors),
    };

    match result {
        Ok(voucher) => {
            let verb = if id.is_some() { "updated" } else { "created" };
            add_breadcrumb("vouchers", verb, &[("code", &voucher.code)]);
            tracing::info!(voucher_id = voucher.id.as_i32(), "Voucher {verb}");
            flash::set(session, format!("Voucher {} {verb}", voucher.code)).await?;
            Ok(Redirect::to("/vouchers").into_response())
        }
        Err(errors) => {
            let template =
                VoucherFormTemplate::new(layout, id.map(|id| id.as_i32()), form, errors);
            Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&template)?).into_response())
        }
    }
}

/// Activate or deactivate a voucher.
#[instrument(skip(_layout, state, session))]
pub async fn toggle(
    _layout: AdminLayout,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<VoucherId>,
) -> Result<Redirect> {
    let voucher = state.store().toggle_voucher(id).await?;
    let verb = if voucher.active { "activated" } else { "deactivated" };
    add_breadcrumb("vouchers", verb, &[("code", &voucher.code)]);
    tracing::info!(voucher_id = id.as_i32(), active = voucher.active, "Voucher toggled");
    flash::set(&session, format!("Voucher {} {verb}", voucher.code)).await?;
    Ok(Redirect::to("/vouchers"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    use chrono::TimeDelta;

    fn dated(code: &str, today: NaiveDate) -> DatedVoucher {
        let voucher = crate::store::demo_data(Utc::now())
            .vouchers
            .into_iter()
            .find(|v| v.code == code)
            .unwrap();
        DatedVoucher { voucher, today }
    }

    #[test]
    fn test_voucher_states() {
        let today = Utc::now().date_naive();
        assert_eq!(dated("WELCOME10", today).state(), "active");
        assert_eq!(dated("SUMMER15", today).state(), "expired");
        assert_eq!(dated("VIPSHIP", today).state(), "inactive");
        assert_eq!(
            dated("AUTUMN25", today + TimeDelta::days(365)).state(),
            "expired"
        );
    }

    #[test]
    fn test_state_matches_redeemable() {
        let today = Utc::now().date_naive();
        for code in ["WELCOME10", "AUTUMN25", "SUMMER15", "VIPSHIP"] {
            let dated = dated(code, today);
            assert_eq!(dated.state() == "active", dated.voucher.is_redeemable(today));
        }
    }

    #[test]
    fn test_expiry_sort_puts_open_ended_last() {
        let today = Utc::now().date_naive();
        let rows = crate::store::demo_data(Utc::now())
            .vouchers
            .into_iter()
            .map(|voucher| DatedVoucher { voucher, today })
            .collect();
        let query = TableQuery {
            sort: Some("expires".to_string()),
            ..TableQuery::default()
        };
        let page = query.apply(&vouchers_table_config(), rows);
        assert!(page.rows[0].voucher.expires_on.is_some());
        assert!(page.rows.last().unwrap().voucher.expires_on.is_none());
    }
}
