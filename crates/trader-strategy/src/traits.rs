//! Strategy trait 정의.

use async_trait::async_trait;
use serde_json::Value;
use trader_core::{Account, Bar, Instrument};
use trader_exchange::OrderRelay;

/// 전략 콜백 결과 타입.
pub type StrategyResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 라이브 엔진에 연결되는 트레이딩 전략.
///
/// 호출 순서: `prepare` → `reset` → `init` → 틱마다 `on_tick`.
/// 봉 슬라이스는 최신 봉이 인덱스 0이며, `changed` 플래그로 직전 틱 이후
/// 바뀐 봉을 알 수 있습니다. 주문은 `prepare`로 받은 `OrderRelay`를 통해서만
/// 보내며, 결과는 다음 틱의 계좌에 반영됩니다.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// 전략 이름 반환.
    fn name(&self) -> &str;

    /// 주문 전달 핸들을 받습니다.
    fn prepare(&mut self, relay: OrderRelay);

    /// 내부 상태 초기화. 생성 후 `init` 전에 한 번 호출됩니다.
    fn reset(&mut self);

    /// 초기 봉 이력, 계좌, 상품 정보로 전략을 초기화합니다.
    async fn init(
        &mut self,
        bars: &[Bar],
        account: &Account,
        instrument: &Instrument,
        unique_id: &str,
    ) -> StrategyResult<()>;

    /// 조정된 봉/계좌로 매 틱 호출됩니다.
    async fn on_tick(&mut self, bars: &[Bar], account: &Account) -> StrategyResult<()>;

    /// 현재 전략 상태를 JSON으로 반환 (디버깅/모니터링용).
    fn get_state(&self) -> Value {
        Value::Null
    }
}
