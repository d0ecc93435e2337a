use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use common::{
    BalanceEntry, BalanceOperation, BalanceProvider, BalanceRequest, BasketInfo, BasketOperation,
    DefiError, DefiOperation, DefiProvider, OperationResult, ProviderError,
};
use defi_interface::aggregator::DefiAggregator;
use log::warn;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

type ApiError = (StatusCode, String);
type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Clone)]
struct DefiService {
    aggregator: Arc<RwLock<DefiAggregator>>,
    rpc_url: String,
}

impl DefiService {
    fn new(rpc_url: &str) -> Self {
        Self {
            aggregator: Arc::new(RwLock::new(DefiAggregator::new(rpc_url))),
            rpc_url: rpc_url.to_string(),
        }
    }
}

/// Map the engine's typed failures onto user-facing status codes. The engine
/// itself never sees HTTP types.
fn error_response(err: DefiError) -> ApiError {
    let status = match &err {
        DefiError::AssetNotFound(_) | DefiError::EmptyBalance { .. } => StatusCode::NOT_FOUND,
        DefiError::ProviderNotSupported(_) | DefiError::OperationNotSupported(_) => {
            StatusCode::FORBIDDEN
        }
        DefiError::Provider(ProviderError::Rejected { .. }) | DefiError::Amount(_) => {
            StatusCode::BAD_REQUEST
        }
        DefiError::Provider(ProviderError::Unavailable { .. }) => StatusCode::BAD_GATEWAY,
    };
    (status, err.to_string())
}

fn parse_provider(raw: &str) -> Result<BalanceProvider, ApiError> {
    BalanceProvider::from_str(raw)
        .map_err(|_| error_response(DefiError::ProviderNotSupported(raw.to_string())))
}

fn parse_operation(raw: &str) -> Result<BalanceOperation, ApiError> {
    BalanceOperation::from_str(raw)
        .map_err(|_| error_response(DefiError::OperationNotSupported(raw.to_string())))
}

#[derive(Deserialize)]
struct BalanceQuery {
    wallet: String,
    provider: String,
    operation: String,
    currency: Option<String>,
}

async fn get_balances(
    State(service): State<DefiService>,
    Query(query): Query<BalanceQuery>,
) -> ApiResult<Vec<BalanceEntry>> {
    let provider = parse_provider(&query.provider)?;
    let operation = parse_operation(&query.operation)?;
    let request = BalanceRequest::new(
        query.wallet.as_str(),
        provider,
        operation,
        query.currency.as_deref(),
    );

    // Prices feed derived values only; serving balances without them beats
    // failing the request.
    {
        let mut aggregator = service.aggregator.write().await;
        if let Err(e) = aggregator.load_prices().await {
            warn!("Could not refresh market prices: {e}");
        }
    }

    let aggregator = service.aggregator.read().await;
    aggregator.get_balances(&request).await.map(Json).map_err(error_response)
}

#[derive(Deserialize)]
struct OperationBody {
    wallet: String,
    operation: String,
    provider: String,
    currency: String,
    amount: Decimal,
}

async fn perform_operation(
    State(service): State<DefiService>,
    Json(body): Json<OperationBody>,
) -> ApiResult<OperationResult> {
    let operation = DefiOperation::from_str(&body.operation)
        .map_err(|_| error_response(DefiError::OperationNotSupported(body.operation.clone())))?;
    let provider = DefiProvider::from_str(&body.provider)
        .map_err(|_| error_response(DefiError::ProviderNotSupported(body.provider.clone())))?;

    let aggregator = service.aggregator.read().await;
    aggregator
        .perform_operation(&body.wallet, operation, provider, &body.currency, body.amount)
        .await
        .map(Json)
        .map_err(error_response)
}

#[derive(Deserialize)]
struct SwapBody {
    wallet: String,
    from: String,
    to: String,
    amount: Decimal,
}

async fn swap_tokens(
    State(service): State<DefiService>,
    Json(body): Json<SwapBody>,
) -> ApiResult<OperationResult> {
    let aggregator = service.aggregator.read().await;
    aggregator
        .swap_tokens(&body.wallet, &body.from, &body.to, body.amount)
        .await
        .map(Json)
        .map_err(error_response)
}

async fn get_baskets(State(service): State<DefiService>) -> ApiResult<Vec<BasketInfo>> {
    let aggregator = service.aggregator.read().await;
    aggregator.get_baskets().await.map(Json).map_err(error_response)
}

#[derive(Deserialize)]
struct BasketOperationBody {
    wallet: String,
    basket: String,
    operation: String,
    amount: Decimal,
}

async fn basket_operation(
    State(service): State<DefiService>,
    Json(body): Json<BasketOperationBody>,
) -> ApiResult<OperationResult> {
    let operation = BasketOperation::from_str(&body.operation)
        .map_err(|_| error_response(DefiError::OperationNotSupported(body.operation.clone())))?;

    let aggregator = service.aggregator.read().await;
    aggregator
        .basket_operation(&body.wallet, &body.basket, body.amount, operation)
        .await
        .map(Json)
        .map_err(error_response)
}

async fn root() -> &'static str {
    "chain-api"
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let rpc_url = std::env::var("RPC_URL").expect("Missing RPC_URL environment variable");
    let service = DefiService::new(&rpc_url);
    log::info!("Using RPC endpoint {}", service.rpc_url);

    let app = Router::new()
        .route("/", get(root))
        .route("/balances", get(get_balances))
        .route("/operations", post(perform_operation))
        .route("/swap", post(swap_tokens))
        .route("/baskets", get(get_baskets))
        .route("/baskets/operations", post(basket_operation))
        .layer(CorsLayer::permissive())
        .with_state(service);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    println!("Server listening on http://0.0.0.0:3000");
    axum::serve(listener, app).await?;
    Ok(())
}
