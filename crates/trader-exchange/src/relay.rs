//! 전략에서 거래소로의 주문 전달.

use std::sync::Arc;
use tracing::debug;
use trader_core::Order;

use crate::traits::{Exchange, ExchangeResult};

/// 전략에 제공되는 주문 전달 핸들.
///
/// 제출/수정/취소를 거래소로 그대로 전달합니다. 로컬 큐, 재시도, 로컬 상태
/// 변경은 없으며 주문 결과는 다음 조정 단계에서만 반영됩니다.
#[derive(Clone)]
pub struct OrderRelay {
    exchange: Arc<dyn Exchange>,
}

impl OrderRelay {
    /// 새 전달 핸들을 생성합니다.
    pub fn new(exchange: Arc<dyn Exchange>) -> Self {
        Self { exchange }
    }

    /// 새 주문을 제출하고 거래소 주문 ID를 반환합니다.
    pub async fn send_order(&self, order: &Order) -> ExchangeResult<String> {
        debug!(
            side = %order.side,
            order_type = %order.order_type,
            quantity = %order.quantity,
            "Relaying new order"
        );
        self.exchange.send_order(order).await
    }

    /// 기존 주문을 수정합니다.
    pub async fn update_order(&self, order: &Order) -> ExchangeResult<()> {
        debug!(order_id = %order.id, "Relaying order update");
        self.exchange.update_order(order).await
    }

    /// 주문을 취소합니다.
    pub async fn cancel_order(&self, order_id: &str) -> ExchangeResult<()> {
        debug!(order_id = %order_id, "Relaying order cancel");
        self.exchange.cancel_order(order_id).await
    }
}

impl std::fmt::Debug for OrderRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderRelay")
            .field("exchange", &self.exchange.name())
            .finish()
    }
}
