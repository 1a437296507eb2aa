//! 거래소 trait 정의.

use async_trait::async_trait;
use trader_core::{Account, Bar, Instrument, Order, Quantity, TickSignal};

use crate::ExchangeError;

/// 거래소 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// 엔진이 의존하는 거래소 게이트웨이 인터페이스.
///
/// 인증, 전송 계층, 요청 한도, 재시도 정책은 구현체가 책임집니다.
/// 엔진은 모든 호출을 순차적으로 대기하므로, 타임아웃이 필요하면 구현체가
/// 연결 에러로 보고해야 합니다.
///
/// 봉 목록은 모두 최신 봉이 인덱스 0인 순서(최신 우선)로 반환합니다.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// 거래소 이름 반환.
    fn name(&self) -> &str;

    /// 실시간 연결이 열려 있는지 확인.
    async fn is_open(&self) -> bool;

    /// 실시간 푸시마다 `TickSignal::notify`를 호출하도록 등록.
    async fn subscribe_ticks(&self, signal: TickSignal);

    /// 거래 상품 메타데이터 조회.
    async fn get_instrument(&self) -> ExchangeResult<Instrument>;

    // === 시장 데이터 ===

    /// 전체 봉 이력 조회 (최신 우선).
    async fn get_bars(&self, minutes_per_bar: u32, start_offset_minutes: u32)
        -> ExchangeResult<Vec<Bar>>;

    /// 최근 봉만 조회 (최신 우선). 헤드 버킷은 부분 데이터일 수 있습니다.
    async fn recent_bars(
        &self,
        minutes_per_bar: u32,
        start_offset_minutes: u32,
    ) -> ExchangeResult<Vec<Bar>>;

    // === 계좌 ===

    /// 계좌의 잔고/포지션 필드를 채웁니다. 주문 목록은 건드리지 않습니다.
    async fn update_account(&self, account: &mut Account) -> ExchangeResult<()>;

    /// 현재 주문 스냅샷 조회 (활성 및 최근 종료 주문 포함).
    async fn get_orders(&self) -> ExchangeResult<Vec<Order>>;

    /// 현재 포지션 조회.
    async fn get_position(&self) -> ExchangeResult<Quantity>;

    // === 주문 작업 ===

    /// 새 주문 제출. 거래소가 부여한 주문 ID를 반환합니다.
    async fn send_order(&self, order: &Order) -> ExchangeResult<String>;

    /// 기존 주문 수정 (ID 기준).
    async fn update_order(&self, order: &Order) -> ExchangeResult<()>;

    /// 주문 취소.
    async fn cancel_order(&self, order_id: &str) -> ExchangeResult<()>;

    // === 상태 ===

    /// 시장이 열려 있지 않으면 에러를 반환합니다.
    async fn check_market_open(&self) -> ExchangeResult<()>;

    /// 세션 종료 정리 (예: 대기 주문 취소).
    async fn exit(&self) -> ExchangeResult<()>;
}
