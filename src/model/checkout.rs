use crate::model::OrderItem;
use serde::{Deserialize, Serialize};

/// A cart line as held by the storefront before checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    #[serde(default)]
    pub name: String,
    /// Unit price.
    pub price: f64,
    pub quantity: u32,
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            product_name: (!line.name.is_empty()).then(|| line.name.clone()),
            quantity: line.quantity,
            price: line.price,
        }
    }
}

/// Signed result of the hosted checkout widget. Forwarded untouched; only the
/// backend can verify the signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

/// How an order is paid for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "payment_method", rename_all = "lowercase")]
pub enum PaymentMethod {
    Razorpay(PaymentConfirmation),
    Wallet,
}

/// Body of `POST /order/create`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: String,
    pub order_items: Vec<OrderItem>,
    pub subtotal: f64,
    pub shipping: f64,
    pub total: f64,
    pub address: String,
    #[serde(flatten)]
    pub payment: PaymentMethod,
}
