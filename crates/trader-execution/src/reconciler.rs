//! 계좌 주문 조정.
//!
//! 직전 미체결 주문 집합과 거래소의 최신 주문 스냅샷을 비교해 각 주문을
//! 미체결, 체결, 취소로 분류합니다.

use std::collections::HashMap;
use tracing::info;
use trader_core::{Account, Order, OrderOutcome};

/// 조정 한 번의 결과.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// 조정 후 미체결 주문 수
    pub open: usize,
    /// 새로 이력에 추가된 체결 주문 수
    pub filled: usize,
    /// 새로 이력에 추가된 취소 주문 수
    pub canceled: usize,
    /// 추적 대상이 아니어서 버린 비활성 주문 수
    pub ignored: usize,
}

impl ReconcileReport {
    /// 이번 조정에서 종료된 주문 수.
    pub fn transitions(&self) -> usize {
        self.filled + self.canceled
    }
}

/// 최신 주문 스냅샷으로 계좌의 미체결 주문과 이력을 갱신합니다.
///
/// - 활성 주문은 새 미체결 집합이 됩니다. ID가 아직 없는 활성 주문은
///   `pending_orders`에 그대로 남습니다.
/// - 비활성 주문은 ID가 있고 직전 미체결 집합에 있던 경우에만 이력에 추가됩니다.
///   같은 ID가 스냅샷에 여러 번 있어도 이력에는 한 번만 들어갑니다.
/// - 체결 수량이 0이 아니면 체결, 0이면 취소로 분류합니다.
pub fn reconcile_orders(account: &mut Account, snapshot: Vec<Order>) -> ReconcileReport {
    let mut previous = account.open_order_ids();
    let mut open = HashMap::new();
    let mut pending = Vec::new();
    let mut report = ReconcileReport::default();

    for order in snapshot {
        if order.active {
            if order.has_id() {
                open.insert(order.id.clone(), order);
            } else {
                pending.push(order);
            }
            continue;
        }

        if !order.has_id() || !previous.remove(&order.id) {
            report.ignored += 1;
            continue;
        }

        let outcome = order.outcome().unwrap_or(OrderOutcome::Canceled);
        match outcome {
            OrderOutcome::Filled => report.filled += 1,
            OrderOutcome::Canceled => report.canceled += 1,
        }
        info!(
            "order {} got {} @ {}",
            order.id,
            outcome,
            order
                .executed_price
                .map(|p| p.round_dp(1).to_string())
                .unwrap_or_else(|| "-".to_string())
        );
        account.order_history.push(order);
    }

    account.open_orders = open;
    account.pending_orders = pending;
    report.open = account.open_order_count();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use trader_core::Side;

    fn resting(id: &str) -> Order {
        Order::limit(Side::Buy, dec!(1), dec!(100)).with_id(id)
    }

    fn closed(id: &str, executed: rust_decimal::Decimal) -> Order {
        let mut order = resting(id);
        order.active = false;
        order.executed_amount = executed;
        if !executed.is_zero() {
            order.executed_price = Some(dec!(100));
        }
        order
    }

    fn account_with_open(ids: &[&str]) -> Account {
        let mut account = Account::new();
        for id in ids {
            account.open_orders.insert(id.to_string(), resting(id));
        }
        account
    }

    #[test]
    fn test_classifies_fills_and_cancels() {
        let mut account = account_with_open(&["a", "b", "c"]);

        let report = reconcile_orders(
            &mut account,
            vec![closed("a", dec!(1)), closed("b", dec!(0)), resting("c")],
        );

        assert_eq!(
            report,
            ReconcileReport {
                open: 1,
                filled: 1,
                canceled: 1,
                ignored: 0
            }
        );
        assert_eq!(account.order_history.len(), 2);
        assert_eq!(account.order_history[0].outcome(), Some(OrderOutcome::Filled));
        assert_eq!(account.order_history[1].outcome(), Some(OrderOutcome::Canceled));
        assert!(account.open_order("c").is_some());
    }

    #[test]
    fn test_untracked_orders_never_reach_history() {
        let mut account = account_with_open(&["a"]);

        let report = reconcile_orders(
            &mut account,
            vec![closed("", dec!(1)), closed("zzz", dec!(0)), resting("new")],
        );

        assert_eq!(report.ignored, 2);
        assert!(account.order_history.is_empty());
        // 스냅샷에서 사라진 주문은 미체결 집합에서도 빠짐
        assert!(account.open_order("a").is_none());
        assert!(account.open_order("new").is_some());
    }

    #[test]
    fn test_duplicate_inactive_recorded_once() {
        let mut account = account_with_open(&["a"]);

        let report = reconcile_orders(&mut account, vec![closed("a", dec!(1)), closed("a", dec!(1))]);

        assert_eq!(report.filled, 1);
        assert_eq!(report.ignored, 1);
        assert_eq!(account.order_history.len(), 1);
    }

    #[test]
    fn test_active_orders_without_id_are_all_kept() {
        let mut account = account_with_open(&["a"]);

        let report = reconcile_orders(
            &mut account,
            vec![
                Order::limit(Side::Buy, dec!(1), dec!(100)),
                Order::limit(Side::Sell, dec!(2), dec!(200)),
                resting("a"),
            ],
        );

        assert_eq!(report.open, 3);
        assert_eq!(account.pending_orders.len(), 2);
        assert_eq!(account.pending_orders[1].quantity, dec!(2));
        assert!(account.open_order("a").is_some());

        // 다음 스냅샷에서 ID가 부여되면 pending에서 빠짐
        let report = reconcile_orders(&mut account, vec![resting("a"), resting("b")]);
        assert_eq!(report.open, 2);
        assert!(account.pending_orders.is_empty());
    }

    #[test]
    fn test_second_pass_does_not_repeat_history() {
        let mut account = account_with_open(&["a"]);
        let snapshot = vec![closed("a", dec!(0))];

        reconcile_orders(&mut account, snapshot.clone());
        let report = reconcile_orders(&mut account, snapshot);

        assert_eq!(report.transitions(), 0);
        assert_eq!(account.order_history.len(), 1);
    }
}
