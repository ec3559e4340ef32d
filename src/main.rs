//! Walks one customer through the storefront against the in-process backend:
//! place an order, track it to delivery, request a return and receive the refund.

use std::sync::Arc;

use chrono::Utc;
use storefront_orders::api::StorefrontError;
use storefront_orders::config::StorefrontConfig;
use storefront_orders::lifecycle::{setup_tracing, MemoryBackend};
use storefront_orders::model::{BankDetails, CartLine, PaymentMethod, ReturnType};
use storefront_orders::session::{Session, SessionUser};
use storefront_orders::views::{checkout, orders, returns, wallet};
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();
    let config = StorefrontConfig::from_env()?;

    let backend = Arc::new(MemoryBackend::start());
    let token = backend.register_user("user_1", 2000.0).await?;
    let user = SessionUser {
        id: "user_1".into(),
        name: "Asha Rao".into(),
        email: "asha@example.com".into(),
    };
    let session = Session::start(backend.clone(), token, user, &config).await;
    let ctx = session.context().clone();

    let cart = vec![
        CartLine {
            product_id: "tea".into(),
            name: "Assam Tea".into(),
            price: 450.0,
            quantity: 2,
        },
        CartLine {
            product_id: "kettle".into(),
            name: "Steel Kettle".into(),
            price: 300.0,
            quantity: 1,
        },
    ];
    let totals = checkout::summary(&cart);
    info!(subtotal = totals.subtotal, shipping = totals.shipping, total = totals.total, "Checkout summary");

    let placed = checkout::place_order(&ctx, &cart, "14 Park Street, Kolkata", PaymentMethod::Wallet)
        .instrument(tracing::info_span!("checkout"))
        .await?;
    let order_id = placed.order.id.clone();

    backend.deliver_order(&order_id, Utc::now()).await?;
    let detail = orders::track(&ctx, &order_id).await?;
    for step in &detail.tracking {
        info!(label = step.label, completed = step.completed, timestamp = ?step.timestamp, "Tracking");
    }

    let form = returns::ReturnForm {
        order_id: order_id.clone(),
        reason: "Kettle arrived dented".into(),
        description: String::new(),
        bank: BankDetails {
            account_holder_name: "Asha Rao".into(),
            account_number: "123456789012".into(),
            ifsc_code: "HDFC0001234".into(),
            bank_name: Some("HDFC Bank".into()),
        },
    };
    match returns::submit(&ctx, &form, ReturnType::Return, &detail.actions).await {
        Ok(request) => {
            backend.approve_return(&request.id).await?;
            backend.complete_return(&request.id).await?;
        }
        Err(StorefrontError::Validation { field, message }) => {
            error!(%field, %message, "Return form rejected")
        }
        Err(e) => error!(error = %e, "Return request failed"),
    }

    for row in returns::load(&ctx).await? {
        info!(id = %row.request.id, status = %row.request.status, refund = ?row.refund_shown, "Return request");
    }
    let wallet = wallet::load(&ctx).await?;
    info!(balance = wallet.balance, discrepancy = ?wallet.discrepancy, "Wallet");

    drop(ctx);
    session.logout().await;
    if let Some(backend) = Arc::into_inner(backend) {
        backend.shutdown().await?;
    }
    info!("Demo completed");
    Ok(())
}
