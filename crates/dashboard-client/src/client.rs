//! reqwest-based backend client.

use async_trait::async_trait;
use dashboard_core::error::{ApiError, ValidationError};
use dashboard_core::traits::DashboardApi;
use dashboard_core::types::{
    validate_model_file, Ack, BacktestRequest, BacktestResult, EquityPoint, Exchange, HftParams,
    HftStatus, Interval, MarketBar, ModelConfig, ModelList, ModelSummary, OrderBookSnapshot,
    Position, TechnicalIndicators, Trade, TradeRequest, TrainingConfig,
};
use reqwest::{header, multipart, Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::config::ApiConfig;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Backend API client.
///
/// Constructed explicitly with its configuration; there is no shared global
/// instance. Cloning is cheap, the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiConfig,
    client: Client,
}

impl ApiClient {
    /// Create a new client.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        config.validate()?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Configuration(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(ApiConfig::from_env())
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Submit a manual trade.
    pub async fn place_trade(&self, request: &TradeRequest) -> Result<Ack, ApiError> {
        request.validate()?;
        let ack = self.send_ack(Method::POST, "/trades", Some(request)).await?;
        info!(
            "Trade submitted: {} {} {} {}",
            request.order_type, request.side, request.quantity, request.symbol
        );
        Ok(ack)
    }

    /// Start the server-side HFT loop.
    pub async fn start_hft(&self, params: &HftParams) -> Result<Ack, ApiError> {
        params.validate()?;
        let ack = self.send_ack(Method::POST, "/hft/start", Some(params)).await?;
        info!("HFT started for {} on {}", params.symbol, params.exchange);
        Ok(ack)
    }

    /// Stop the server-side HFT loop.
    pub async fn stop_hft(&self, symbol: &str) -> Result<Ack, ApiError> {
        ValidationError::check_not_empty("symbol", symbol)?;
        let body = serde_json::json!({ "symbol": symbol });
        let ack = self.send_ack(Method::POST, "/hft/stop", Some(&body)).await?;
        info!("HFT stopped for {}", symbol);
        Ok(ack)
    }

    /// Get the HFT loop status for a symbol.
    pub async fn hft_status(&self, symbol: &str) -> Result<HftStatus, ApiError> {
        ValidationError::check_not_empty("symbol", symbol)?;
        self.get("/hft/status", &[("symbol", symbol.to_string())])
            .await
    }

    /// List saved models.
    pub async fn list_models(&self) -> Result<Vec<ModelSummary>, ApiError> {
        let list: ModelList = self.get("/models", &[]).await?;
        Ok(list.models)
    }

    /// Get the stored configuration of a model.
    pub async fn get_model(&self, name: &str) -> Result<serde_json::Value, ApiError> {
        let path = model_path(name, "")?;
        self.get(&path, &[]).await
    }

    /// Create a model from a layer definition.
    pub async fn create_model(&self, config: &ModelConfig) -> Result<Ack, ApiError> {
        config.validate()?;
        let ack = self.send_ack(Method::POST, "/models", Some(config)).await?;
        info!("Model created with {} layers", config.layers.len());
        Ok(ack)
    }

    /// Upload serialized model weights (`.pth` or `.pt`) as a multipart form.
    pub async fn upload_model(&self, file_name: &str, contents: Vec<u8>) -> Result<Ack, ApiError> {
        validate_model_file(file_name)?;
        if contents.is_empty() {
            return Err(ValidationError::Empty { field: "file" }.into());
        }

        let size = contents.len();
        let part = multipart::Part::bytes(contents).file_name(file_name.trim().to_string());
        let form = multipart::Form::new().part("file", part);
        let body = self
            .dispatch(Method::POST, "/models/upload", |req| req.multipart(form))
            .await?;
        info!("Model uploaded: {} ({} bytes)", file_name, size);
        decode_ack(&body)
    }

    /// Delete a model.
    pub async fn delete_model(&self, name: &str) -> Result<Ack, ApiError> {
        let path = model_path(name, "")?;
        let ack = self
            .send_ack::<serde_json::Value>(Method::DELETE, &path, None)
            .await?;
        info!("Model deleted: {}", name);
        Ok(ack)
    }

    /// Start training a model in the background on the server.
    pub async fn train_model(&self, name: &str, config: &TrainingConfig) -> Result<Ack, ApiError> {
        config.validate()?;
        let path = model_path(name, "/train")?;
        let ack = self.send_ack(Method::POST, &path, Some(config)).await?;
        info!("Training started for model {}", name);
        Ok(ack)
    }

    /// Indicator rows for a symbol and interval, oldest first.
    pub async fn technical_indicators(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<TechnicalIndicators>, ApiError> {
        ValidationError::check_not_empty("symbol", symbol)?;
        let query = [
            ("symbol", symbol.to_string()),
            ("interval", interval.to_string()),
            ("limit", limit.to_string()),
        ];
        self.get("/technical-indicators", &query).await
    }

    /// Run a backtest and wait for its results.
    pub async fn run_backtest(&self, request: &BacktestRequest) -> Result<BacktestResult, ApiError> {
        request.validate()?;
        let body = self.send(Method::POST, "/backtest", &[], Some(request)).await?;
        decode(&body)
    }

    /// GET with bounded retry for transient failures.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let body = self
            .with_retry(path, || {
                self.send::<serde_json::Value>(Method::GET, path, query, None)
            })
            .await?;
        decode(&body)
    }

    /// Non-idempotent requests are sent once.
    async fn send_ack<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Ack, ApiError> {
        let body = self.send(method, path, &[], body).await?;
        decode_ack(&body)
    }

    async fn with_retry<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    let delay = self.config.backoff_for(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying {} after transient error: {}",
                        what,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Send one JSON request and return the raw body of a 2xx response.
    async fn send<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<String, ApiError> {
        self.dispatch(method, path, |mut req| {
            if !query.is_empty() {
                req = req.query(query);
            }
            if let Some(body) = body {
                req = req.json(body);
            }
            req
        })
        .await
    }

    /// Send one request built by `build`, tagged with a fresh request id.
    async fn dispatch<F>(&self, method: Method, path: &str, build: F) -> Result<String, ApiError>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let url = self.config.url(path);
        let request_id = Uuid::new_v4().to_string();
        let span = tracing::debug_span!("api_request", %method, path, %request_id);

        async {
            let req = build(
                self.client
                    .request(method.clone(), &url)
                    .header(REQUEST_ID_HEADER, request_id.as_str()),
            );

            debug!("Sending request to {}", url);
            let resp = req.send().await.map_err(map_transport_error)?;
            read_body(resp).await
        }
        .instrument(span)
        .await
    }
}

async fn read_body(resp: Response) -> Result<String, ApiError> {
    let status = resp.status();
    let text = resp.text().await.map_err(map_transport_error)?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: text,
        });
    }

    Ok(text)
}

fn map_transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout(e.to_string())
    } else if e.is_decode() {
        ApiError::Decode(e.to_string())
    } else {
        ApiError::Network(e.to_string())
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Control endpoints may answer with an empty body or `null`.
fn decode_ack(body: &str) -> Result<Ack, ApiError> {
    let body = body.trim();
    if body.is_empty() || body == "null" {
        return Ok(Ack::default());
    }
    decode(body)
}

/// `/models/{name}{suffix}`, rejecting names that would escape the path segment.
fn model_path(name: &str, suffix: &str) -> Result<String, ApiError> {
    ValidationError::check_not_empty("name", name)?;
    let name = name.trim();
    let reason = if name.contains(['/', '\\', '?', '#']) {
        "contains a reserved character"
    } else if name.chars().all(|c| c == '.') {
        "is a relative path segment"
    } else {
        return Ok(format!("/models/{}{}", name, suffix));
    };
    Err(ValidationError::Invalid {
        field: "name",
        reason: format!("'{}' {}", name, reason),
    }
    .into())
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn get_trades(&self) -> Result<Vec<Trade>, ApiError> {
        self.get("/trades", &[]).await
    }

    async fn get_positions(&self) -> Result<Vec<Position>, ApiError> {
        self.get("/positions", &[]).await
    }

    async fn get_equity_curve(&self) -> Result<Vec<EquityPoint>, ApiError> {
        self.get("/equity-curve", &[]).await
    }

    async fn get_market_data(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<MarketBar>, ApiError> {
        let query = [
            ("symbol", symbol.to_string()),
            ("interval", interval.to_string()),
            ("limit", limit.to_string()),
        ];
        self.get("/market-data", &query).await
    }

    async fn get_order_book(
        &self,
        exchange: Exchange,
        symbol: &str,
    ) -> Result<OrderBookSnapshot, ApiError> {
        let query = [
            ("exchange", exchange.to_string()),
            ("symbol", symbol.to_string()),
        ];
        let book: OrderBookSnapshot = self.get("/orderbook", &query).await?;
        Ok(book.normalized())
    }

    fn name(&self) -> &str {
        &self.config.base_url
    }
}
