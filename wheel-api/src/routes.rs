use std::{convert::Infallible, sync::Arc, time::Instant};

use http_body_util::{BodyExt, Limited};
use hyper::{Method, Request, StatusCode, body::Body};
use ledger::LedgerStore;
use log::{error, info, warn};
use metrics::WheelMetrics;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use spin_engine::{EngineError, EngineResult, SpinEngine};

use crate::{
    error::ApiError,
    response::{self, ApiResponse},
};

/// Request bodies above this size are rejected before parsing.
pub const MAX_BODY_BYTES: usize = 16 * 1024;

pub struct ApiState<S> {
    pub engine: Arc<SpinEngine<S>>,
    pub metrics: Arc<WheelMetrics>,
}

impl<S> Clone for ApiState<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<S> ApiState<S> {
    pub fn new(engine: Arc<SpinEngine<S>>, metrics: Arc<WheelMetrics>) -> Self {
        Self { engine, metrics }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Route {
    Saldo,
    Items,
    Spin,
    Redeem,
    AdminAddCode,
    Health,
    Metrics,
}

impl Route {
    fn resolve(path: &str) -> Option<Self> {
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };
        match path {
            "/api/saldo" => Some(Route::Saldo),
            "/api/items" => Some(Route::Items),
            "/api/spin" => Some(Route::Spin),
            "/api/redeem" => Some(Route::Redeem),
            "/api/admin/add-code" => Some(Route::AdminAddCode),
            "/healthz" => Some(Route::Health),
            "/metrics" => Some(Route::Metrics),
            _ => None,
        }
    }

    fn method(self) -> Method {
        match self {
            Route::Saldo | Route::Items | Route::Health | Route::Metrics => Method::GET,
            Route::Spin | Route::Redeem | Route::AdminAddCode => Method::POST,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Route::Saldo => "/api/saldo",
            Route::Items => "/api/items",
            Route::Spin => "/api/spin",
            Route::Redeem => "/api/redeem",
            Route::AdminAddCode => "/api/admin/add-code",
            Route::Health => "/healthz",
            Route::Metrics => "/metrics",
        }
    }
}

#[derive(Deserialize)]
struct RedeemRequest {
    #[serde(default)]
    code: Option<String>,
}

/// Fields stay loosely typed so a bad secret is reported before bad input.
#[derive(Deserialize)]
struct AddCodeRequest {
    #[serde(default)]
    code: Value,
    #[serde(default)]
    amount: Value,
    #[serde(default)]
    secret: Value,
}

impl AddCodeRequest {
    fn code(&self) -> &str {
        self.code.as_str().unwrap_or_default()
    }

    /// Anything other than a non-negative integer maps to zero, which the engine rejects.
    fn amount(&self) -> u64 {
        self.amount.as_u64().unwrap_or(0)
    }

    fn secret(&self) -> &str {
        self.secret.as_str().unwrap_or_default()
    }
}

/// Entry point for every HTTP request.
pub async fn handle<S, B>(state: ApiState<S>, req: Request<B>) -> Result<ApiResponse, Infallible>
where
    S: LedgerStore + 'static,
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let route = Route::resolve(&path);

    let response = if method == Method::OPTIONS {
        response::preflight()
    } else {
        match route {
            None => response::error(&ApiError::NotFound),
            Some(route) if route.method() != method => response::error(&ApiError::MethodNotAllowed),
            Some(route) => match dispatch(&state, route, req).await {
                Ok(response) => response,
                Err(err) => {
                    log_failure(route, &err);
                    response::error(&err)
                }
            },
        }
    };

    let status = response.status();
    state.metrics.record_request(
        route.map(Route::label).unwrap_or("unmatched"),
        status.as_u16(),
    );
    info!(
        "{method} {path} -> {} in {:?}",
        status.as_u16(),
        started.elapsed()
    );
    Ok(response)
}

async fn dispatch<S, B>(
    state: &ApiState<S>,
    route: Route,
    req: Request<B>,
) -> Result<ApiResponse, ApiError>
where
    S: LedgerStore + 'static,
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match route {
        Route::Saldo => {
            let guest = run_blocking(&state.engine, |engine| engine.guest()).await?;
            Ok(response::json(StatusCode::OK, &guest))
        }
        Route::Items => Ok(response::json(
            StatusCode::OK,
            state.engine.prizes().entries(),
        )),
        Route::Spin => {
            let outcome = run_blocking(&state.engine, |engine| engine.spin()).await?;
            state.metrics.record_spin(&outcome.prize.rarity);
            Ok(response::json(StatusCode::OK, &outcome))
        }
        Route::Redeem => {
            let body: RedeemRequest = read_json(req).await?;
            let code = body.code.unwrap_or_default();
            let result = run_blocking(&state.engine, move |engine| engine.redeem(&code)).await;
            match result {
                Ok(outcome) => {
                    state.metrics.record_redemption("ok", outcome.amount);
                    Ok(response::json(
                        StatusCode::OK,
                        &json!({ "success": true, "amount": outcome.amount }),
                    ))
                }
                Err(err) => {
                    state.metrics.record_redemption(err.outcome(), 0);
                    Err(err)
                }
            }
        }
        Route::AdminAddCode => {
            let body: AddCodeRequest = read_json(req).await?;
            let result = run_blocking(&state.engine, move |engine| {
                engine.admin_add_code(body.code(), body.amount(), body.secret())
            })
            .await;
            match result {
                Ok(()) => {
                    state.metrics.record_admin_call("ok");
                    Ok(response::json(StatusCode::OK, &json!({ "success": true })))
                }
                Err(err) => {
                    state.metrics.record_admin_call(err.outcome());
                    Err(err)
                }
            }
        }
        Route::Health => Ok(response::json(
            StatusCode::OK,
            &json!({
                "status": "ok",
                "prizes": state.engine.prizes().len(),
                "adminEnabled": state.engine.admin_enabled(),
            }),
        )),
        Route::Metrics => {
            let body = state
                .metrics
                .render()
                .map_err(|err| ApiError::Internal(err.to_string()))?;
            Ok(response::text(
                StatusCode::OK,
                state.metrics.content_type(),
                body,
            ))
        }
    }
}

async fn read_json<T, B>(req: Request<B>) -> Result<T, ApiError>
where
    T: DeserializeOwned,
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let bytes = Limited::new(req.into_body(), MAX_BODY_BYTES)
        .collect()
        .await
        .map_err(|err| ApiError::BadRequest(err.to_string()))?
        .to_bytes();
    serde_json::from_slice(&bytes).map_err(|err| ApiError::BadRequest(err.to_string()))
}

/// Runs a ledger operation on the blocking pool; the engine does synchronous file I/O.
async fn run_blocking<S, T, F>(engine: &Arc<SpinEngine<S>>, op: F) -> Result<T, ApiError>
where
    S: LedgerStore + 'static,
    T: Send + 'static,
    F: FnOnce(&SpinEngine<S>) -> EngineResult<T> + Send + 'static,
{
    let engine = Arc::clone(engine);
    tokio::task::spawn_blocking(move || op(&engine))
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
        .map_err(ApiError::from)
}

fn log_failure(route: Route, err: &ApiError) {
    match err {
        ApiError::Engine(EngineError::StorageUnavailable(_))
        | ApiError::Engine(EngineError::InvalidConfiguration(_))
        | ApiError::Internal(_) => error!("{} failed: {err}", route.label()),
        ApiError::Engine(EngineError::Unauthorized)
        | ApiError::Engine(EngineError::ConfigurationMissing) => {
            warn!("{} rejected: {err}", route.label())
        }
        _ => {}
    }
}
