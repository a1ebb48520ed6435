use actix_web::web;
use utoipa::TupleUnit;

use super::schemas::RemitCommissionsRequest;
use crate::errors::GenericError;
use crate::finance_client::{CommissionRow, FinanceClient, FinancialSummary};
use crate::schemas::GenericResponse;

#[utoipa::path(
    get,
    path = "/finance/summary",
    tag = "Financial Summary",
    responses(
        (status=200, description= "Financial Summary", body= GenericResponse<FinancialSummary>),
    )
)]
#[tracing::instrument(name = "financial summary", skip(client))]
pub async fn financial_summary(
    client: web::Data<FinanceClient>,
) -> Result<web::Json<GenericResponse<FinancialSummary>>, GenericError> {
    let summary = client.fetch_summary().await.map_err(|e| {
        GenericError::ProviderError(
            "Something went wrong while fetching the financial summary".to_string(),
            e,
        )
    })?;
    Ok(web::Json(GenericResponse::success(
        "Successfully fetched financial summary",
        Some(summary),
    )))
}

#[utoipa::path(
    get,
    path = "/finance/breakdown",
    tag = "Commission Breakdown",
    responses(
        (status=200, description= "Commission Breakdown", body= GenericResponse<Vec<CommissionRow>>),
    )
)]
#[tracing::instrument(name = "commission breakdown", skip(client))]
pub async fn commission_breakdown(
    client: web::Data<FinanceClient>,
) -> Result<web::Json<GenericResponse<Vec<CommissionRow>>>, GenericError> {
    let rows = client.fetch_breakdown().await.map_err(|e| {
        GenericError::ProviderError(
            "Something went wrong while fetching the commission breakdown".to_string(),
            e,
        )
    })?;
    Ok(web::Json(GenericResponse::success(
        "Successfully fetched commission breakdown",
        Some(rows),
    )))
}

#[utoipa::path(
    post,
    path = "/finance/remit",
    tag = "Remit Commissions",
    request_body(content = RemitCommissionsRequest, description = "Request Body"),
    responses(
        (status=200, description= "Remit Commissions", body= GenericResponse<TupleUnit>),
    )
)]
#[tracing::instrument(name = "remit commissions", skip(client))]
pub async fn remit_commissions(
    body: RemitCommissionsRequest,
    client: web::Data<FinanceClient>,
) -> Result<web::Json<GenericResponse<()>>, GenericError> {
    if body.order_ids.is_empty() {
        return Err(GenericError::ValidationError(
            "No orders selected for remittance".to_string(),
        ));
    }
    let outcome = client.bulk_remit(&body.order_ids).await.map_err(|e| {
        GenericError::ProviderError("Something went wrong while remitting".to_string(), e)
    })?;
    if !outcome.success {
        // Business rejection (e.g. insufficient wallet balance); surfaced
        // inline, scoped to this request.
        return Err(GenericError::ValidationError(
            outcome
                .error
                .unwrap_or_else(|| "Remittance was rejected".to_string()),
        ));
    }
    Ok(web::Json(GenericResponse::success(
        "Successfully remitted commissions",
        Some(()),
    )))
}
