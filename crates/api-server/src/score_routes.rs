//! Stock scoring routes.

use analysis_core::StockReport;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use scoring_engine::{ScoringFamily, ValuationMode, WeightScheme};
use serde::Deserialize;

use crate::{ApiResponse, AppError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ScoreQuery {
    /// `five` or `six`
    #[serde(default)]
    pub scheme: Option<String>,
    /// `first` or `blended`
    #[serde(default)]
    pub valuation: Option<String>,
    /// `linear` or `banded`
    #[serde(default)]
    pub family: Option<String>,
}

pub fn score_routes() -> Router<AppState> {
    Router::new().route("/api/score/:symbol", get(get_score))
}

fn bad_request(e: impl std::fmt::Display) -> AppError {
    AppError::with_status(StatusCode::BAD_REQUEST, anyhow::anyhow!("{}", e))
}

async fn get_score(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<ScoreQuery>,
) -> Result<Json<ApiResponse<StockReport>>, AppError> {
    let mut config = *state.orchestrator.engine().config();

    if let Some(scheme) = query.scheme.as_deref() {
        config.weights = scheme.parse::<WeightScheme>().map_err(bad_request)?;
    }
    if let Some(valuation) = query.valuation.as_deref() {
        config.valuation = valuation.parse::<ValuationMode>().map_err(bad_request)?;
    }
    if let Some(family) = query.family.as_deref() {
        config.family = family.parse::<ScoringFamily>().map_err(bad_request)?;
    }

    let report = state.orchestrator.analyze_with(&symbol, config).await?;
    Ok(Json(ApiResponse::success(report)))
}
