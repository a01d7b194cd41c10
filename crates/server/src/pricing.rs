//! JSON surface of the price resolution engine.
//!
//! - `POST /api/v1/pricing/resolve` resolves one part for an optional customer, list and quantity.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use motofleet_core::{
    CustomerId, InterfaceError, PartId, PriceRequest, PriceResolver, ResolutionResult,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct PricingState {
    resolver: Arc<dyn PriceResolver>,
}

/// Wire form of a resolution request. Every field is optional here so absence can be reported
/// with a precise error code instead of a generic deserialization failure.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequestBody {
    pub part_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub list_code: Option<String>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub error: String,
    pub message: String,
    pub correlation_id: String,
}

type ApiFailure = (StatusCode, Json<ApiError>);

pub fn router(resolver: Arc<dyn PriceResolver>) -> Router {
    Router::new()
        .route("/api/v1/pricing/resolve", post(resolve_price))
        .with_state(PricingState { resolver })
}

async fn resolve_price(
    State(state): State<PricingState>,
    payload: Result<Json<ResolveRequestBody>, JsonRejection>,
) -> Result<Json<ResolutionResult>, ApiFailure> {
    let correlation_id = Uuid::new_v4().to_string();

    let Json(body) = payload.map_err(|rejection| {
        reject(
            InterfaceError::bad_request("InvalidInput", rejection.body_text()),
            &correlation_id,
        )
    })?;
    let request = request_from_body(body).map_err(|error| reject(error, &correlation_id))?;
    let part_id = request.part_id;

    match state.resolver.resolve_price(request).await {
        Ok(result) => {
            info!(
                event_name = "pricing.resolve.completed",
                correlation_id = %correlation_id,
                part_id = part_id.0,
                list_code = %result.applied_list_code,
                method = result.resolution_method.as_str(),
                final_price = %result.final_price,
                alert_level = result.alert_level.as_str(),
                "price resolved"
            );
            Ok(Json(result))
        }
        Err(pricing_error) => {
            let detail = pricing_error.to_string();
            let interface = pricing_error.into_interface(correlation_id.clone());
            if matches!(interface, InterfaceError::Internal { .. }) {
                error!(
                    event_name = "pricing.resolve.failed",
                    correlation_id = %correlation_id,
                    part_id = part_id.0,
                    error = %detail,
                    "price resolution failed"
                );
            } else {
                warn!(
                    event_name = "pricing.resolve.failed",
                    correlation_id = %correlation_id,
                    part_id = part_id.0,
                    error_code = interface.code(),
                    error = %detail,
                    "price resolution rejected"
                );
            }
            Err(failure(&interface))
        }
    }
}

fn request_from_body(body: ResolveRequestBody) -> Result<PriceRequest, InterfaceError> {
    let part_id = body
        .part_id
        .ok_or_else(|| InterfaceError::bad_request("MissingPartId", "partId is required"))?;

    let quantity = match body.quantity {
        None => 1,
        Some(value) if value <= 0 => {
            return Err(InterfaceError::bad_request("InvalidInput", "quantity must be at least 1"))
        }
        Some(value) => u32::try_from(value).map_err(|_| {
            InterfaceError::bad_request("InvalidInput", "quantity is out of range")
        })?,
    };

    Ok(PriceRequest {
        part_id: PartId(part_id),
        customer_id: body.customer_id.map(CustomerId),
        list_code: body.list_code,
        quantity,
    })
}

fn reject(error: InterfaceError, correlation_id: &str) -> ApiFailure {
    warn!(
        event_name = "pricing.resolve.rejected",
        correlation_id = %correlation_id,
        error_code = error.code(),
        error = %error.user_message(),
        "resolution request rejected before pricing"
    );
    let error = match error {
        InterfaceError::BadRequest { code, message, .. } => InterfaceError::BadRequest {
            code,
            message,
            correlation_id: correlation_id.to_string(),
        },
        other => other,
    };
    failure(&error)
}

fn failure(error: &InterfaceError) -> ApiFailure {
    let status = match error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ApiError {
            error: error.code().to_string(),
            message: error.user_message(),
            correlation_id: error.correlation_id().to_string(),
        }),
    )
}
