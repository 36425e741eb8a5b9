use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{error, info};
use utoipa::OpenApi;

use crate::{
    models::{
        dto::{
            HistoryPoint, HistoryQuery, HistorySlice, Message, TickerExists, TickerInfo,
            TickerPrice, TickerSnapshot, TickerStats,
        },
        Error, GatewayError,
    },
    AppState,
};

/// Defines the OpenAPI spec for finance endpoints
#[derive(OpenApi)]
#[openapi(paths(
    get_ticker_data_handler,
    get_ticker_exists_handler,
    get_ticker_price_handler,
    get_ticker_history_period_handler,
    get_ticker_history_handler,
    get_ticker_stats_handler,
    get_ticker_info_handler
))]
pub struct FinanceApi;

/// Used to group finance endpoints together in the OpenAPI documentation
pub const FINANCE_API_GROUP: &str = "FINANCE";

/// Builds a router for all the finance routes
pub fn finance_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:ticker", get(get_ticker_data_handler))
        .route("/:ticker/exists", get(get_ticker_exists_handler))
        .route("/:ticker/price", get(get_ticker_price_handler))
        .route("/:ticker/history", get(get_ticker_history_handler))
        .route("/:ticker/history/:period", get(get_ticker_history_period_handler))
        .route("/:ticker/stats", get(get_ticker_stats_handler))
        .route("/:ticker/info", get(get_ticker_info_handler))
}

/// Logs the outcome of a lookup for `ticker` and turns it into a response.
fn respond<T>(ticker: &str, subject: &str, result: Result<T, GatewayError>) -> Result<Json<T>, Error> {
    match result {
        Ok(body) => {
            info!(ticker, "Fetched {}", subject);
            Ok(Json(body))
        }
        Err(err) => {
            error!(ticker, error = %err, "Failed to fetch {}", subject);
            Err(err.into())
        }
    }
}

/// Get company name, price and day-over-day growth for a ticker
#[utoipa::path(
    get,
    path = "/api/finance/{ticker}",
    tag = FINANCE_API_GROUP,
    params(
        ("ticker" = String, Path, description = "Ticker symbol, e.g. AAPL")
    ),
    responses(
        (status = 200, description = "Ticker snapshot", body = TickerSnapshot),
        (status = 404, description = "Ticker not found", body = Message),
    )
)]
pub async fn get_ticker_data_handler(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<TickerSnapshot>, Error> {
    let result = state.gateway.snapshot(&ticker).await;
    respond(&ticker, "ticker data", result)
}

/// Check whether a ticker traded within the last day
#[utoipa::path(
    get,
    path = "/api/finance/{ticker}/exists",
    tag = FINANCE_API_GROUP,
    params(
        ("ticker" = String, Path, description = "Ticker symbol, e.g. AAPL")
    ),
    responses(
        (status = 200, description = "Whether the ticker has recent prices", body = TickerExists),
        (status = 404, description = "Lookup failed", body = Message),
    )
)]
pub async fn get_ticker_exists_handler(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<TickerExists>, Error> {
    let result = state.gateway.exists(&ticker).await;
    respond(&ticker, "ticker existence", result)
}

#[utoipa::path(
    get,
    path = "/api/finance/{ticker}/price",
    tag = FINANCE_API_GROUP,
    params(
        ("ticker" = String, Path, description = "Ticker symbol, e.g. AAPL")
    ),
    responses(
        (status = 200, description = "Current price", body = TickerPrice),
        (status = 404, description = "Ticker not found", body = Message),
    )
)]
pub async fn get_ticker_price_handler(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<TickerPrice>, Error> {
    let result = state.gateway.price(&ticker).await;
    respond(&ticker, "ticker price", result)
}

/// Get closing prices over one of the supported periods
#[utoipa::path(
    get,
    path = "/api/finance/{ticker}/history/{period}",
    tag = FINANCE_API_GROUP,
    params(
        ("ticker" = String, Path, description = "Ticker symbol, e.g. AAPL"),
        ("period" = String, Path, description = "One of 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max")
    ),
    responses(
        (status = 200, description = "Closing prices keyed by date", body = HistorySlice),
        (status = 400, description = "Invalid period", body = Message),
        (status = 404, description = "History unavailable", body = Message),
    )
)]
pub async fn get_ticker_history_period_handler(
    State(state): State<Arc<AppState>>,
    Path((ticker, period)): Path<(String, String)>,
) -> Result<Json<HistorySlice>, Error> {
    let result = state.gateway.history_slice(&ticker, &period).await;
    respond(&ticker, "ticker history", result)
}

/// Get the daily closing history, oldest first
#[utoipa::path(
    get,
    path = "/api/finance/{ticker}/history",
    tag = FINANCE_API_GROUP,
    params(
        ("ticker" = String, Path, description = "Ticker symbol, e.g. AAPL"),
        HistoryQuery
    ),
    responses(
        (status = 200, description = "Daily closes", body = [HistoryPoint]),
        (status = 400, description = "Invalid length", body = Message),
        (status = 404, description = "History unavailable", body = Message),
    )
)]
pub async fn get_ticker_history_handler(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryPoint>>, Error> {
    let result = state
        .gateway
        .full_history(&ticker, query.length.as_deref())
        .await;
    respond(&ticker, "ticker history", result)
}

#[utoipa::path(
    get,
    path = "/api/finance/{ticker}/stats",
    tag = FINANCE_API_GROUP,
    params(
        ("ticker" = String, Path, description = "Ticker symbol, e.g. AAPL")
    ),
    responses(
        (status = 200, description = "Daily range and market cap", body = TickerStats),
        (status = 404, description = "Ticker not found", body = Message),
    )
)]
pub async fn get_ticker_stats_handler(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<TickerStats>, Error> {
    let result = state.gateway.stats(&ticker).await;
    respond(&ticker, "ticker stats", result)
}

#[utoipa::path(
    get,
    path = "/api/finance/{ticker}/info",
    tag = FINANCE_API_GROUP,
    params(
        ("ticker" = String, Path, description = "Ticker symbol, e.g. AAPL")
    ),
    responses(
        (status = 200, description = "Company profile", body = TickerInfo),
        (status = 404, description = "Ticker not found", body = Message),
    )
)]
pub async fn get_ticker_info_handler(
    State(state): State<Arc<AppState>>,
    Path(ticker): Path<String>,
) -> Result<Json<TickerInfo>, Error> {
    let result = state.gateway.info(&ticker).await;
    respond(&ticker, "ticker info", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        external::mock::{apple_info, row, MockMarket},
        gateway::TickerGateway,
        models::Period,
        routes::make_app,
        Config,
    };
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(market: &Arc<MockMarket>) -> Router {
        let config = Config::from_lookup(|_| None).unwrap();
        let gateway = TickerGateway::new(market.clone(), config.upstream_timeout);
        make_app(Arc::new(AppState { gateway, config })).unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::get(uri).body(Body::empty()).unwrap()).await
    }

    #[tokio::test]
    async fn snapshot_for_apple() {
        let market = Arc::new(MockMarket::with_info(apple_info()));
        let (status, body) = get(app(&market), "/api/finance/AAPL").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "company_name": "Apple Inc.",
                "company_ticker": "AAPL",
                "current_price": 150.0,
                "yesterday_close": 100.0,
                "today_growth": 50.0
            })
        );
    }

    #[tokio::test]
    async fn unknown_ticker_is_404_on_every_info_route() {
        let market = Arc::new(MockMarket::failing());
        for uri in [
            "/api/finance/ZZZZ",
            "/api/finance/ZZZZ/price",
            "/api/finance/ZZZZ/stats",
            "/api/finance/ZZZZ/info",
        ] {
            let (status, body) = get(app(&market), uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body, json!({ "message": "Ticker not found" }));
        }
        assert_eq!(market.info_calls(), 4);
    }

    #[tokio::test]
    async fn price_stats_and_info_bodies() {
        let market = Arc::new(MockMarket::with_info(apple_info()));

        let (_, body) = get(app(&market), "/api/finance/AAPL/price").await;
        assert_eq!(body, json!({ "current_price": 150.0 }));

        let (_, body) = get(app(&market), "/api/finance/AAPL/stats").await;
        assert_eq!(
            body,
            json!({ "daily_high": 152.5, "daily_low": 147.25, "market_cap": 2.3e12 })
        );

        let (status, body) = get(app(&market), "/api/finance/AAPL/info").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["company_name"], "Apple Inc.");
        assert_eq!(body["number_of_employees"], 161000);
        assert_eq!(body["website_url"], "https://www.apple.com");
    }

    #[tokio::test]
    async fn missing_field_is_404() {
        let mut info = apple_info();
        info.as_object_mut().unwrap().remove("dayLow");
        let market = Arc::new(MockMarket::with_info(info));
        let (status, _) = get(app(&market), "/api/finance/AAPL/stats").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn exists_true_false_and_error() {
        let market = Arc::new(MockMarket::with_history(vec![row("2024-12-20", 254.49)]));
        let (status, body) = get(app(&market), "/api/finance/AAPL/exists").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "exists": true }));

        let market = Arc::new(MockMarket::with_history(vec![]));
        let (_, body) = get(app(&market), "/api/finance/DELISTED/exists").await;
        assert_eq!(body, json!({ "exists": false }));

        let market = Arc::new(MockMarket::failing());
        let (status, _) = get(app(&market), "/api/finance/ZZZZ/exists").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_period_is_400_without_upstream_call() {
        let market = Arc::new(MockMarket::with_history(vec![row("2024-12-20", 254.49)]));
        for uri in [
            "/api/finance/AAPL/history/2w",
            "/api/finance/AAPL/history/1w",
            "/api/finance/AAPL/history/MAX",
            "/api/finance/AAPL/history?length=2w",
        ] {
            let (status, body) = get(app(&market), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, json!({ "message": "Invalid length" }));
        }
        assert!(market.history_calls().is_empty());
    }

    #[tokio::test]
    async fn period_history_returns_closes_by_date() {
        let market = Arc::new(MockMarket::with_history(vec![
            row("2024-12-19", 249.79),
            row("2024-12-20", 254.49),
        ]));
        let (status, body) = get(app(&market), "/api/finance/AAPL/history/5d").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "2024-12-19": 249.79, "2024-12-20": 254.49 }));
        assert_eq!(market.history_calls(), vec![Period::FiveDays]);
    }

    #[tokio::test]
    async fn full_history_returns_date_close_points() {
        let market = Arc::new(MockMarket::with_history(vec![
            row("2024-12-19", 249.7912),
            row("2024-12-20", 254.4949),
        ]));
        let (status, body) = get(app(&market), "/api/finance/AAPL/history").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                { "Date": "2024-12-19", "Close": 249.79 },
                { "Date": "2024-12-20", "Close": 254.49 }
            ])
        );
        assert_eq!(market.history_calls(), vec![Period::Max]);

        let (status, _) = get(app(&market), "/api/finance/AAPL/history?length=1y").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(market.history_calls(), vec![Period::Max, Period::OneYear]);
    }

    #[tokio::test]
    async fn history_failures_return_an_explicit_status() {
        let market = Arc::new(MockMarket::failing());
        for uri in ["/api/finance/ZZZZ/history", "/api/finance/ZZZZ/history/1y"] {
            let (status, body) = get(app(&market), uri).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body, json!({ "message": "Ticker not found" }));
        }
    }

    #[tokio::test]
    async fn unmatched_route_is_404() {
        let market = Arc::new(MockMarket::failing());
        let (status, _) = get(app(&market), "/api/finance/AAPL/dividends").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(market.info_calls(), 0);
        assert!(market.history_calls().is_empty());
    }

    #[tokio::test]
    async fn allowed_origin_gets_credentialed_cors_headers() {
        let market = Arc::new(MockMarket::with_info(apple_info()));
        let request = Request::get("/api/finance/AAPL/price")
            .header(header::ORIGIN, "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = app(&market).oneshot(request).await.unwrap();
        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn foreign_origin_gets_no_cors_headers() {
        let market = Arc::new(MockMarket::with_info(apple_info()));
        let request = Request::get("/api/finance/AAPL/price")
            .header(header::ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = app(&market).oneshot(request).await.unwrap();
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn health_and_welcome() {
        let market = Arc::new(MockMarket::failing());
        let (status, body) = get(app(&market), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "OK, I'm alive!" }));

        let (status, body) = get(app(&market), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].as_str().unwrap().starts_with("Welcome"));
    }

    #[tokio::test]
    async fn openapi_document_lists_finance_routes() {
        let market = Arc::new(MockMarket::failing());
        let (status, body) = get(app(&market), "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        let paths = body["paths"].as_object().unwrap();
        assert!(paths.contains_key("/api/finance/{ticker}"));
        assert!(paths.contains_key("/api/finance/{ticker}/history/{period}"));
    }
}
