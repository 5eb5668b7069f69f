//! Cart route handlers.
//!
//! Cart IDs are stored in the session and map to file-backed carts. Reads
//! never create a cart; the first mutation does.

use axum::{Json, extract::State};
use brightwire_core::cart::CartItem;
use brightwire_core::{CartId, CartTotals, PricingCalculator, ProductId, ProductType};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::session_keys;
use crate::services::SessionCart;
use crate::state::AppState;

/// Cart contents with derived totals.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub count: u32,
    pub totals: CartTotals,
}

impl CartView {
    /// Snapshot a cart.
    #[must_use]
    pub fn of(cart: &SessionCart, pricing: &PricingCalculator) -> Self {
        Self {
            items: cart.items().to_vec(),
            count: cart.count(),
            totals: cart.totals(pricing),
        }
    }

    /// A cart with no lines.
    #[must_use]
    pub fn empty(pricing: &PricingCalculator) -> Self {
        Self {
            items: Vec::new(),
            count: 0,
            totals: pricing.totals(&[]),
        }
    }
}

/// Cart badge count.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

/// Result of a cart mutation.
#[derive(Debug, Serialize)]
pub struct CartUpdate {
    /// Whether the cart changed.
    pub changed: bool,
    pub cart: CartView,
}

/// Identifies a cart line.
#[derive(Debug, Deserialize)]
pub struct CartLineRequest {
    pub id: ProductId,
    #[serde(rename = "type")]
    pub product_type: ProductType,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub id: ProductId,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub quantity: f64,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the cart ID from the session.
pub(crate) async fn get_cart_id(session: &Session) -> Option<CartId> {
    session
        .get::<CartId>(session_keys::CART_ID)
        .await
        .ok()
        .flatten()
}

/// Get the cart ID from the session, binding a new one if there is none.
async fn get_or_create_cart_id(session: &Session) -> Result<CartId> {
    if let Some(cart_id) = get_cart_id(session).await {
        return Ok(cart_id);
    }
    let cart_id = CartId::generate();
    session.insert(session_keys::CART_ID, cart_id).await?;
    tracing::debug!(%cart_id, "bound new cart to session");
    Ok(cart_id)
}

// =============================================================================
// Handlers
// =============================================================================

/// Current cart.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartView>> {
    let pricing = *state.pricing();
    let Some(cart_id) = get_cart_id(&session).await else {
        return Ok(Json(CartView::empty(&pricing)));
    };

    let view = state
        .carts()
        .with_cart(cart_id, move |cart| CartView::of(cart, &pricing))
        .await?;
    Ok(Json(view))
}

/// Cart count badge.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<Json<CartCount>> {
    let count = match get_cart_id(&session).await {
        Some(cart_id) => state.carts().with_cart(cart_id, |cart| cart.count()).await?,
        None => 0,
    };
    Ok(Json(CartCount { count }))
}

/// Add one unit of a catalog offering.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CartLineRequest>,
) -> Result<Json<CartUpdate>> {
    let offering = state
        .catalog()
        .find(request.id, request.product_type)
        .ok_or_else(|| {
            AppError::NotFound(format!("{} {}", request.product_type, request.id))
        })?;
    let product = offering.to_cart_product(request.product_type);

    add_breadcrumb(
        "cart",
        "Added to cart",
        &[
            ("id", request.id.to_string()),
            ("type", request.product_type.to_string()),
        ],
    );

    let cart_id = get_or_create_cart_id(&session).await?;
    let pricing = *state.pricing();
    let cart = state
        .carts()
        .with_cart(cart_id, move |cart| {
            cart.add(product);
            CartView::of(cart, &pricing)
        })
        .await?;

    Ok(Json(CartUpdate {
        changed: true,
        cart,
    }))
}

/// Set a line's quantity. Quantities below 1 are ignored.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartUpdate>> {
    mutate(&state, &session, move |cart| {
        cart.set_quantity(request.id, request.product_type, request.quantity)
    })
    .await
}

/// Remove a line.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<CartLineRequest>,
) -> Result<Json<CartUpdate>> {
    mutate(&state, &session, move |cart| {
        cart.remove(request.id, request.product_type)
    })
    .await
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartUpdate>> {
    mutate(&state, &session, |cart| {
        let changed = !cart.is_empty();
        cart.clear();
        changed
    })
    .await
}

/// Apply a mutation to the session's cart, if it has one.
async fn mutate<F>(state: &AppState, session: &Session, f: F) -> Result<Json<CartUpdate>>
where
    F: FnOnce(&mut SessionCart) -> bool + Send + 'static,
{
    let pricing = *state.pricing();
    let Some(cart_id) = get_cart_id(session).await else {
        return Ok(Json(CartUpdate {
            changed: false,
            cart: CartView::empty(&pricing),
        }));
    };

    let (changed, cart) = state
        .carts()
        .with_cart(cart_id, move |cart| {
            let changed = f(cart);
            (changed, CartView::of(cart, &pricing))
        })
        .await?;

    Ok(Json(CartUpdate { changed, cart }))
}
