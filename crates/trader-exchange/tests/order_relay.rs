//! OrderRelay와 시뮬레이션 거래소 통합 테스트.

use rust_decimal_macros::dec;
use std::sync::Arc;
use trader_core::{Order, Side};
use trader_exchange::{Exchange, ExchangeError, OrderRelay, SimulatedConfig, SimulatedExchange};

fn venue() -> Arc<SimulatedExchange> {
    Arc::new(SimulatedExchange::new(
        SimulatedConfig::default().with_history_minutes(30).with_seed(1),
    ))
}

#[tokio::test]
async fn test_relay_forwards_submit_amend_cancel() {
    let exchange = venue();
    let relay = OrderRelay::new(exchange.clone());

    let order = Order::limit(Side::Buy, dec!(1), dec!(1000));
    let id = relay.send_order(&order).await.unwrap();

    let amended = order.clone().with_id(&id);
    let amended = Order {
        limit_price: Some(dec!(1100)),
        ..amended
    };
    relay.update_order(&amended).await.unwrap();
    assert_eq!(exchange.orders().await[0].limit_price, Some(dec!(1100)));

    relay.cancel_order(&id).await.unwrap();
    assert!(!exchange.orders().await[0].active);

    assert_eq!(exchange.calls_to("send_order").await, 1);
    assert_eq!(exchange.calls_to("update_order").await, 1);
    assert_eq!(exchange.calls_to("cancel_order").await, 1);
}

#[tokio::test]
async fn test_relay_surfaces_gateway_errors() {
    let exchange = venue();
    let relay = OrderRelay::new(exchange.clone());

    let err = relay.cancel_order("unknown").await.unwrap_err();
    assert!(matches!(err, ExchangeError::OrderNotFound(_)));

    exchange.set_market_open(false).await;
    let err = relay
        .send_order(&Order::market(Side::Sell, dec!(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, ExchangeError::MarketClosed(_)));
    assert!(exchange.orders().await.is_empty());
    assert!(exchange.get_orders().await.unwrap().is_empty());
}
