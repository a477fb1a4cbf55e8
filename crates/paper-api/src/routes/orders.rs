//! 주문 endpoint.
//!
//! 매수/매도는 엔드포인트가 나뉘어 있으며, 본문의 `orderMethod`가
//! 엔드포인트와 일치하지 않으면 거부됩니다.
//!
//! # 엔드포인트
//!
//! - `POST /api/v1/orders/buy` - 매수 주문
//! - `POST /api/v1/orders/sale` - 매도 주문

use axum::{extract::State, routing::post, Json, Router};
use paper_core::OrderRequest;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::{ApiErrorResponse, ApiResult};
use crate::metrics::record_order;
use crate::state::AppState;

/// 주문 요청 본문.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderBody {
    /// 사용자 ID
    pub user_id: String,
    /// 종목 ID
    pub stock_id: String,
    /// 주문 가격
    pub price: Decimal,
    /// 주문 수량
    pub amount: u64,
    /// 주문 유형 ("auto" | "order")
    pub order_type: String,
    /// 주문 방법 ("buy" | "sale")
    pub order_method: String,
}

impl From<OrderBody> for OrderRequest {
    fn from(body: OrderBody) -> Self {
        OrderRequest {
            user_id: body.user_id,
            stock_id: body.stock_id,
            price: body.price,
            amount: body.amount,
            order_type: body.order_type,
            order_method: body.order_method,
        }
    }
}

/// 주문 접수 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderAccepted {
    /// 처리 결과 메시지
    pub message: String,
}

/// 매수 주문.
#[utoipa::path(
    post,
    path = "/api/v1/orders/buy",
    request_body = OrderBody,
    responses(
        (status = 200, description = "주문 접수", body = OrderAccepted),
        (status = 400, description = "검증 실패", body = ApiErrorResponse),
        (status = 422, description = "잔고 부족", body = ApiErrorResponse)
    ),
    tag = "orders"
)]
pub async fn buy_order(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OrderBody>,
) -> ApiResult<Json<OrderAccepted>> {
    let message = state.executor.buy(body.into()).await.map_err(|e| {
        record_order("buy", "rejected");
        ApiErrorResponse::from_ledger(e)
    })?;

    record_order("buy", "accepted");
    Ok(Json(OrderAccepted { message }))
}

/// 매도 주문.
#[utoipa::path(
    post,
    path = "/api/v1/orders/sale",
    request_body = OrderBody,
    responses(
        (status = 200, description = "주문 접수", body = OrderAccepted),
        (status = 400, description = "검증 실패", body = ApiErrorResponse),
        (status = 422, description = "보유 수량 부족", body = ApiErrorResponse)
    ),
    tag = "orders"
)]
pub async fn sale_order(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OrderBody>,
) -> ApiResult<Json<OrderAccepted>> {
    let message = state.executor.sale(body.into()).await.map_err(|e| {
        record_order("sale", "rejected");
        ApiErrorResponse::from_ledger(e)
    })?;

    record_order("sale", "accepted");
    Ok(Json(OrderAccepted { message }))
}

/// 주문 라우터 생성.
pub fn orders_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/buy", post(buy_order))
        .route("/sale", post(sale_order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn order_json(method: &str, amount: u64) -> String {
        format!(
            r#"{{"userId":"u-1","stockId":"AAPL","price":"50","amount":{},"orderType":"order","orderMethod":"{}"}}"#,
            amount, method
        )
    }

    async fn post_order(
        app: &Router,
        path: &str,
        body: String,
    ) -> axum::http::Response<axum::body::Body> {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(path)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_buy_without_funds_is_rejected() {
        let state = create_test_state().await;
        let app = orders_router().with_state(state);

        let response = post_order(&app, "/buy", order_json("buy", 10)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "INSUFFICIENT_BALANCE");
        assert_eq!(error.message, "balance not enough");
    }

    #[tokio::test]
    async fn test_buy_after_deposit_succeeds() {
        let state = create_test_state().await;
        state
            .ledger
            .deposit("u-1", rust_decimal_macros::dec!(1000))
            .await
            .unwrap();
        let app = orders_router().with_state(state);

        let response = post_order(&app, "/buy", order_json("buy", 10)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_method_mismatch_is_rejected() {
        let state = create_test_state().await;
        let app = orders_router().with_state(state);

        // buy 엔드포인트에 sale 본문
        let response = post_order(&app, "/buy", order_json("sale", 1)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "INVALID_ORDER_METHOD");
    }
}
