//! # Cart/Checkout Total Calculator
//!
//! The single place totals are computed. The checkout summary, the orders screen and
//! the order-creation payload all call [`compute`], so the amount shown is the
//! amount submitted.

use crate::model::{CartLine, OrderItem};
use serde::Serialize;

/// Subtotals strictly above this ship free.
pub const FREE_SHIPPING_ABOVE: f64 = 1000.0;
pub const FLAT_SHIPPING: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Totals {
    pub subtotal: f64,
    pub shipping: f64,
    pub total: f64,
}

/// Anything with a unit price and a quantity.
pub trait PricedLine {
    fn unit_price(&self) -> f64;
    fn quantity(&self) -> u32;
}

impl PricedLine for CartLine {
    fn unit_price(&self) -> f64 {
        self.price
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }
}

impl PricedLine for OrderItem {
    fn unit_price(&self) -> f64 {
        self.price
    }

    fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// `subtotal = Σ price × quantity`, `shipping = 0` above the free-shipping
/// threshold and a flat fee otherwise, `total = subtotal + shipping`.
///
/// An empty cart still pays the flat fee.
pub fn compute<'a, L, I>(lines: I) -> Totals
where
    L: PricedLine + 'a,
    I: IntoIterator<Item = &'a L>,
{
    let subtotal: f64 = lines
        .into_iter()
        .map(|line| line.unit_price() * f64::from(line.quantity()))
        .sum();
    let shipping = shipping_for(subtotal);
    Totals {
        subtotal,
        shipping,
        total: subtotal + shipping,
    }
}

pub fn shipping_for(subtotal: f64) -> f64 {
    if subtotal > FREE_SHIPPING_ABOVE {
        0.0
    } else {
        FLAT_SHIPPING
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: f64, quantity: u32) -> CartLine {
        CartLine {
            product_id: format!("p{price}"),
            name: String::new(),
            price,
            quantity,
        }
    }

    #[test]
    fn test_empty_cart_pays_flat_shipping() {
        let totals = compute::<CartLine, _>(&[]);
        assert_eq!(totals.subtotal, 0.0);
        assert_eq!(totals.shipping, 50.0);
        assert_eq!(totals.total, 50.0);
    }

    #[test]
    fn test_small_order_pays_shipping() {
        let totals = compute(&[line(100.0, 2)]);
        assert_eq!(
            totals,
            Totals {
                subtotal: 200.0,
                shipping: 50.0,
                total: 250.0
            }
        );
    }

    #[test]
    fn test_large_order_ships_free() {
        let totals = compute(&[line(500.0, 2), line(250.0, 2)]);
        assert_eq!(totals.subtotal, 1500.0);
        assert_eq!(totals.shipping, 0.0);
        assert_eq!(totals.total, 1500.0);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        assert_eq!(compute(&[line(1000.0, 1)]).shipping, 50.0);
        assert_eq!(compute(&[line(1000.5, 1)]).shipping, 0.0);
    }

    #[test]
    fn test_identity_holds_across_carts() {
        let carts = vec![
            vec![],
            vec![line(0.0, 3)],
            vec![line(19.99, 7), line(5.0, 1)],
            vec![line(999.0, 1), line(2.0, 1)],
            vec![line(1200.0, 3)],
        ];
        for cart in carts {
            let totals = compute(&cart);
            let expected_shipping = if totals.subtotal > 1000.0 { 0.0 } else { 50.0 };
            assert_eq!(totals.shipping, expected_shipping);
            assert_eq!(totals.total, totals.subtotal + expected_shipping);
        }
    }

    #[test]
    fn test_order_items_and_cart_lines_agree() {
        let cart = vec![line(100.0, 2), line(35.5, 4)];
        let items: Vec<OrderItem> = cart.iter().map(OrderItem::from).collect();
        assert_eq!(compute(&cart), compute(&items));
    }
}
