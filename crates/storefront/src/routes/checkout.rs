//! Checkout and receipt route handlers.
//!
//! Checkout freezes the session's cart into an order, records the payment
//! method the shopper picked, and empties the cart. No payment gateway is
//! contacted.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use brightwire_core::{Customer, Order, PaymentMethod};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use super::cart::get_cart_id;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::services::render_receipt;
use crate::state::AppState;

/// Checkout request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer: Customer,
    pub payment_method: PaymentMethod,
}

/// Placed order with its receipt.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order: Order,
    pub receipt: String,
}

/// Place an order for the session's cart.
#[instrument(skip(state, session, request), fields(payment_method = ?request.payment_method))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let CheckoutRequest {
        mut customer,
        payment_method,
    } = request;
    customer.name = customer.name.trim().to_string();
    if customer.name.is_empty() {
        return Err(AppError::BadRequest("customer name is required".to_string()));
    }

    let Some(cart_id) = get_cart_id(&session).await else {
        return Err(AppError::BadRequest("cart is empty".to_string()));
    };

    let pricing = *state.pricing();
    let order = state
        .carts()
        .with_cart(cart_id, move |cart| {
            if cart.is_empty() {
                return None;
            }
            let totals = cart.totals(&pricing);
            let order = Order::place(cart.items().to_vec(), &totals, payment_method);
            cart.clear();
            Some(order)
        })
        .await?
        .ok_or_else(|| AppError::BadRequest("cart is empty".to_string()))?;

    let receipt = render_receipt(&order, &customer);
    tracing::info!(
        order_id = %order.id,
        units = order.unit_count(),
        total = %order.total,
        "order placed"
    );
    add_breadcrumb("checkout", "Order placed", &[("order_id", order.id.to_string())]);

    if let Some(email) = state.email() {
        if let Err(e) = email.send_receipt(customer.email.as_str(), &receipt).await {
            tracing::error!(order_id = %order.id, error = %e, "failed to email receipt");
        }
    }

    let placed = state.orders().record(order, customer).await;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order: placed.order.clone(),
            receipt,
        }),
    ))
}

/// Plain-text receipt for a placed order.
#[instrument(skip(state))]
pub async fn receipt(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<String> {
    let placed = state
        .orders()
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    Ok(render_receipt(&placed.order, &placed.customer))
}
