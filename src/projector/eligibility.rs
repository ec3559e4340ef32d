//! # Eligibility Classifier
//!
//! The backend decides whether an order can be returned or cancelled
//! (`GET /return-orders/eligibility/:orderId`). This module only turns that answer
//! into the actions the UI may show. It never derives eligibility from the order
//! itself: an action is offered only if the backend said yes.

use crate::api::StorefrontError;
use crate::model::{Eligibility, OrderStatus, ReturnType};
use serde::Serialize;

pub const RETURN_POLICY: &str = "Returns are accepted within 7 days of delivery.";
pub const CANCELLATION_POLICY: &str = "Orders can be cancelled before shipment.";

/// Policy text shown next to a request form.
pub fn policy_copy(kind: ReturnType) -> &'static str {
    match kind {
        ReturnType::Return => RETURN_POLICY,
        ReturnType::Cancellation => CANCELLATION_POLICY,
    }
}

/// Which kind of request an order would be listed under on the returns screen.
///
/// This only picks the listing; whether the action is enabled still comes from
/// [`ActionGate`].
pub fn candidate_kind(status: OrderStatus) -> Option<ReturnType> {
    match status {
        OrderStatus::Delivered => Some(ReturnType::Return),
        OrderStatus::Pending | OrderStatus::Processing => Some(ReturnType::Cancellation),
        OrderStatus::Shipped | OrderStatus::Cancelled => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OrderAction {
    RequestReturn,
    CancelOrder,
}

impl OrderAction {
    /// The action that files a request of `kind`.
    pub fn for_kind(kind: ReturnType) -> Self {
        match kind {
            ReturnType::Return => OrderAction::RequestReturn,
            ReturnType::Cancellation => OrderAction::CancelOrder,
        }
    }
}

/// Actions the UI may enable for one order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionGate {
    return_enabled: bool,
    cancel_enabled: bool,
    /// Backend's explanation, or why the check could not be made.
    pub note: Option<String>,
}

impl ActionGate {
    /// Nothing enabled. Used while the eligibility call is outstanding.
    pub fn closed() -> Self {
        Self::default()
    }

    pub fn from_eligibility(eligibility: &Eligibility) -> Self {
        Self {
            return_enabled: eligibility.can_return,
            cancel_enabled: eligibility.can_cancel,
            note: (!eligibility.reason.is_empty()).then(|| eligibility.reason.clone()),
        }
    }

    /// A failed eligibility call enables nothing.
    pub fn from_result(result: &Result<Eligibility, StorefrontError>) -> Self {
        match result {
            Ok(eligibility) => Self::from_eligibility(eligibility),
            Err(e) => Self {
                note: Some(e.user_message()),
                ..Self::closed()
            },
        }
    }

    pub fn allows(&self, action: OrderAction) -> bool {
        match action {
            OrderAction::RequestReturn => self.return_enabled,
            OrderAction::CancelOrder => self.cancel_enabled,
        }
    }

    pub fn actions(&self) -> Vec<OrderAction> {
        [OrderAction::RequestReturn, OrderAction::CancelOrder]
            .into_iter()
            .filter(|action| self.allows(*action))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eligibility(can_return: bool, can_cancel: bool) -> Eligibility {
        Eligibility {
            can_return,
            can_cancel,
            reason: String::new(),
        }
    }

    #[test]
    fn test_gate_never_exceeds_backend_answer() {
        for can_return in [false, true] {
            for can_cancel in [false, true] {
                let answer = eligibility(can_return, can_cancel);
                let gate = ActionGate::from_eligibility(&answer);
                for action in gate.actions() {
                    match action {
                        OrderAction::RequestReturn => assert!(answer.can_return),
                        OrderAction::CancelOrder => assert!(answer.can_cancel),
                    }
                }
                assert_eq!(gate.allows(OrderAction::RequestReturn), can_return);
                assert_eq!(gate.allows(OrderAction::CancelOrder), can_cancel);
            }
        }
    }

    #[test]
    fn test_failed_call_enables_nothing() {
        let gate = ActionGate::from_result(&Err(StorefrontError::Transport("timeout".into())));
        assert!(gate.actions().is_empty());
        assert!(gate.note.is_some());
    }

    #[test]
    fn test_reason_is_carried_as_note() {
        let answer = Eligibility {
            can_return: false,
            can_cancel: false,
            reason: "Return window has closed".into(),
        };
        let gate = ActionGate::from_eligibility(&answer);
        assert_eq!(gate.note.as_deref(), Some("Return window has closed"));
    }

    #[test]
    fn test_candidate_kind_follows_status() {
        assert_eq!(candidate_kind(OrderStatus::Delivered), Some(ReturnType::Return));
        assert_eq!(candidate_kind(OrderStatus::Pending), Some(ReturnType::Cancellation));
        assert_eq!(candidate_kind(OrderStatus::Processing), Some(ReturnType::Cancellation));
        assert_eq!(candidate_kind(OrderStatus::Shipped), None);
        assert_eq!(candidate_kind(OrderStatus::Cancelled), None);
    }

    #[test]
    fn test_policy_copy() {
        assert!(policy_copy(ReturnType::Return).contains("7 days of delivery"));
        assert!(policy_copy(ReturnType::Cancellation).contains("before shipment"));
    }
}
