use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::invoice_service::{self, FeeInvoice, InvoiceInput, Payment, PaymentInput};
use crate::tenancy::TenantContext;

#[derive(Debug, Deserialize)]
pub struct InvoiceListQuery {
    pub student_id: Option<Uuid>,
    pub status: Option<String>,
}

pub async fn list(
    Extension(ctx): Extension<TenantContext>,
    Query(query): Query<InvoiceListQuery>,
) -> Result<Json<Vec<FeeInvoice>>, ApiError> {
    let invoices =
        invoice_service::list_invoices(&ctx, query.student_id, query.status.as_deref()).await?;
    Ok(Json(invoices))
}

pub async fn show(
    Extension(ctx): Extension<TenantContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<FeeInvoice>, ApiError> {
    let invoice = invoice_service::get_invoice(&ctx, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Invoice not found"))?;
    Ok(Json(invoice))
}

pub async fn create(
    Extension(ctx): Extension<TenantContext>,
    Json(payload): Json<InvoiceInput>,
) -> Result<(StatusCode, Json<FeeInvoice>), ApiError> {
    let invoice = invoice_service::create_invoice(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// POST /api/invoices/:id/payments
pub async fn record_payment(
    Extension(ctx): Extension<TenantContext>,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<PaymentInput>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let payment = invoice_service::record_payment(&ctx, invoice_id, payload).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}
