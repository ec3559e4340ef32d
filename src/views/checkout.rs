//! # Checkout
//!
//! Builds the order-creation payload from the cart. The totals shown on the
//! summary and the totals submitted come from the same [`projector::compute`]
//! call, and success is only reported once the backend has accepted the payment.

use crate::api::{ApiResult, StorefrontError};
use crate::model::{CartLine, NewOrder, Order, OrderItem, PaymentMethod};
use crate::projector::{self, Totals};
use crate::session::{CacheKey, SessionContext};
use serde::Serialize;
use tracing::{info, instrument};

/// Totals for the checkout summary.
pub fn summary(cart: &[CartLine]) -> Totals {
    projector::compute(cart)
}

/// The order-creation payload for `cart`.
pub fn build_order(
    user_id: &str,
    cart: &[CartLine],
    address: &str,
    payment: PaymentMethod,
) -> ApiResult<NewOrder> {
    if cart.is_empty() {
        return Err(StorefrontError::validation("cart", "Your cart is empty"));
    }
    if let Some(line) = cart.iter().find(|line| line.quantity == 0) {
        return Err(StorefrontError::validation(
            "quantity",
            format!("Quantity for {} must be at least 1", line.product_id),
        ));
    }
    let address = address.trim();
    if address.is_empty() {
        return Err(StorefrontError::validation("address", "Please choose a delivery address"));
    }
    let totals = summary(cart);
    Ok(NewOrder {
        user_id: user_id.to_string(),
        order_items: cart.iter().map(OrderItem::from).collect(),
        subtotal: totals.subtotal,
        shipping: totals.shipping,
        total: totals.total,
        address: address.to_string(),
        payment,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderPlaced {
    pub order: Order,
    pub totals: Totals,
}

/// Submits the order. On success the address is remembered for next time and
/// the cart marker is reset.
#[instrument(skip_all, fields(user_id = %ctx.user_id(), lines = cart.len()))]
pub async fn place_order(
    ctx: &SessionContext,
    cart: &[CartLine],
    address: &str,
    payment: PaymentMethod,
) -> ApiResult<OrderPlaced> {
    let new_order = build_order(ctx.user_id(), cart, address, payment)?;
    let totals = summary(cart);
    let order = ctx.backend().create_order(ctx.auth(), &new_order).await?;
    info!(order_id = %order.id, total = totals.total, "Order placed");

    ctx.remember(CacheKey::LastAddress, &new_order.address).await;
    ctx.set_cart_length(0).await;
    Ok(OrderPlaced { order, totals })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PaymentConfirmation;

    fn cart() -> Vec<CartLine> {
        vec![
            CartLine {
                product_id: "tea".into(),
                name: "Assam Tea".into(),
                price: 100.0,
                quantity: 2,
            },
            CartLine {
                product_id: "mug".into(),
                name: String::new(),
                price: 25.0,
                quantity: 1,
            },
        ]
    }

    fn razorpay() -> PaymentMethod {
        PaymentMethod::Razorpay(PaymentConfirmation {
            razorpay_order_id: "order_rzp_1".into(),
            razorpay_payment_id: "pay_1".into(),
            razorpay_signature: "sig".into(),
        })
    }

    #[test]
    fn test_submitted_totals_match_summary() {
        let cart = cart();
        let order = build_order("user_1", &cart, " 9 Lake View ", razorpay()).unwrap();
        let shown = summary(&cart);
        assert_eq!(
            (order.subtotal, order.shipping, order.total),
            (shown.subtotal, shown.shipping, shown.total)
        );
        assert_eq!(order.total, 275.0);
        assert_eq!(order.address, "9 Lake View");
        assert_eq!(order.order_items[1].product_name, None);
    }

    #[test]
    fn test_payload_carries_confirmation_unchanged() {
        let order = build_order("user_1", &cart(), "9 Lake View", razorpay()).unwrap();
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["payment_method"], "razorpay");
        assert_eq!(json["razorpay_signature"], "sig");
        assert_eq!(json["razorpay_payment_id"], "pay_1");

        let wallet = build_order("user_1", &cart(), "9 Lake View", PaymentMethod::Wallet).unwrap();
        let json = serde_json::to_value(&wallet).unwrap();
        assert_eq!(json["payment_method"], "wallet");
    }

    #[test]
    fn test_rejects_incomplete_checkout() {
        assert!(matches!(
            build_order("user_1", &[], "9 Lake View", PaymentMethod::Wallet),
            Err(StorefrontError::Validation { field, .. }) if field == "cart"
        ));
        assert!(matches!(
            build_order("user_1", &cart(), "  ", PaymentMethod::Wallet),
            Err(StorefrontError::Validation { field, .. }) if field == "address"
        ));
    }
}
