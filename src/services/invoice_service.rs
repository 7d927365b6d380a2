use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::tenancy::{assert_valid_schema_name, TenantContext};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeeInvoice {
    pub id: Uuid,
    pub student_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub due_date: Option<NaiveDate>,
    pub status: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub amount: Decimal,
    pub status: String,
    pub paid_at: DateTime<Utc>,
    pub metadata: Value,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceInput {
    pub student_id: Uuid,
    pub amount: Decimal,
    pub currency: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentInput {
    pub amount: Decimal,
    pub metadata: Option<Value>,
}

fn invoices_table(schema: &str) -> Result<String, ApiError> {
    assert_valid_schema_name(schema)?;
    Ok(format!("{schema}.fee_invoices"))
}

fn payments_table(schema: &str) -> Result<String, ApiError> {
    assert_valid_schema_name(schema)?;
    Ok(format!("{schema}.payments"))
}

pub async fn create_invoice(
    ctx: &TenantContext,
    input: InvoiceInput,
) -> Result<FeeInvoice, ApiError> {
    let (tenant, schema) = ctx.require()?;
    if input.amount <= Decimal::ZERO {
        return Err(ApiError::bad_request("Invoice amount must be positive"));
    }

    let invoice = sqlx::query_as::<_, FeeInvoice>(&format!(
        "INSERT INTO {} (student_id, amount, currency, due_date, metadata) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
        invoices_table(schema)?
    ))
    .bind(input.student_id)
    .bind(input.amount)
    .bind(input.currency.as_deref().unwrap_or("USD"))
    .bind(input.due_date)
    .bind(input.metadata.unwrap_or_else(|| Value::Object(Default::default())))
    .fetch_one(ctx.pool())
    .await?;

    info!(
        tenant = %tenant.schema_name,
        invoice_id = %invoice.id,
        student_id = %invoice.student_id,
        "invoice created"
    );
    Ok(invoice)
}

pub async fn list_invoices(
    ctx: &TenantContext,
    student_id: Option<Uuid>,
    status: Option<&str>,
) -> Result<Vec<FeeInvoice>, ApiError> {
    let (_, schema) = ctx.require()?;
    let invoices = sqlx::query_as::<_, FeeInvoice>(&format!(
        "SELECT * FROM {} \
         WHERE ($1::uuid IS NULL OR student_id = $1::uuid) \
           AND ($2::text IS NULL OR status = $2::text) \
         ORDER BY created_at DESC",
        invoices_table(schema)?
    ))
    .bind(student_id)
    .bind(status)
    .fetch_all(ctx.pool())
    .await?;
    Ok(invoices)
}

pub async fn get_invoice(ctx: &TenantContext, id: Uuid) -> Result<Option<FeeInvoice>, ApiError> {
    let (_, schema) = ctx.require()?;
    let invoice = sqlx::query_as::<_, FeeInvoice>(&format!(
        "SELECT * FROM {} WHERE id = $1",
        invoices_table(schema)?
    ))
    .bind(id)
    .fetch_optional(ctx.pool())
    .await?;
    Ok(invoice)
}

/// Record a payment against an invoice; when payments cover the invoice
/// amount, the invoice flips to `paid`.
pub async fn record_payment(
    ctx: &TenantContext,
    invoice_id: Uuid,
    input: PaymentInput,
) -> Result<Payment, ApiError> {
    let (tenant, schema) = ctx.require()?;
    if input.amount <= Decimal::ZERO {
        return Err(ApiError::bad_request("Payment amount must be positive"));
    }

    let invoice = get_invoice(ctx, invoice_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Invoice not found"))?;

    let payment = sqlx::query_as::<_, Payment>(&format!(
        "INSERT INTO {} (invoice_id, amount, metadata) \
         VALUES ($1, $2, $3) RETURNING *",
        payments_table(schema)?
    ))
    .bind(invoice_id)
    .bind(input.amount)
    .bind(input.metadata.unwrap_or_else(|| Value::Object(Default::default())))
    .fetch_one(ctx.pool())
    .await?;

    let paid: (Option<Decimal>,) = sqlx::query_as(&format!(
        "SELECT SUM(amount) FROM {} WHERE invoice_id = $1 AND status = 'succeeded'",
        payments_table(schema)?
    ))
    .bind(invoice_id)
    .fetch_one(ctx.pool())
    .await?;

    if paid.0.unwrap_or(Decimal::ZERO) >= invoice.amount {
        sqlx::query(&format!(
            "UPDATE {} SET status = 'paid', updated_at = NOW() WHERE id = $1",
            invoices_table(schema)?
        ))
        .bind(invoice_id)
        .execute(ctx.pool())
        .await?;
    }

    info!(
        tenant = %tenant.schema_name,
        invoice_id = %invoice_id,
        payment_id = %payment.id,
        "payment recorded"
    );
    Ok(payment)
}
