use crate::config::MatchingConfig;
use crate::error::AppError;
use crate::models::{
    ComparisonRow, ComparisonSummary, IndentLine, IndentLineDraft, QuoteIngestStats, QuoteLine,
    Recommendation, VendorQuotes, VendorSummary,
};
use crate::service::comparison::{
    build_comparison, default_selections, recommendations, summarize, vendor_summary,
};
use crate::service::engine::{draft_indent_lines, QuoteEngine};
use crate::service::matcher::assign_matches_by;
use crate::service::rfq_mail::OutboxReceipt;
use crate::service::ProcurementService;
use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// 纯引擎接口的共享状态 (无存储)
#[derive(Clone)]
pub struct EngineState {
    pub engine: Arc<dyn QuoteEngine>,
    pub matching: MatchingConfig,
}

/// 存储流程接口的共享状态
#[derive(Clone)]
pub struct WorkflowState {
    pub service: Arc<ProcurementService>,
    pub export_dir: PathBuf,
}

/// 统一响应体
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(message: impl Into<String>, data: T) -> Response {
        let response = ApiResponse {
            success: true,
            message: message.into(),
            data: Some(data),
        };
        (StatusCode::OK, Json(response)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("请求失败: {}", self);
        }
        let response: ApiResponse<()> = ApiResponse {
            success: false,
            message: format!("Error: {}", self),
            data: None,
        };
        (status, Json(response)).into_response()
    }
}

/// 请求体: 原始文本
#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

/// 请求体: 报价文本, 可附带请购明细以便直接匹配
#[derive(Debug, Deserialize)]
pub struct QuoteParseRequest {
    pub text: String,
    #[serde(default)]
    pub indent_lines: Vec<IndentLine>,
    pub min_score: Option<f64>,
}

/// 请求体: 对比输入
#[derive(Debug, Deserialize)]
pub struct ComparisonRequest {
    pub indent_lines: Vec<IndentLine>,
    pub vendors: Vec<VendorQuotes>,
}

/// 对比结果
#[derive(Debug, Serialize)]
pub struct ComparisonResponse {
    pub rows: Vec<ComparisonRow>,
    pub selections: IndexMap<i64, i64>,
    pub summary: ComparisonSummary,
    pub vendor_summary: Vec<VendorSummary>,
    pub recommendations: Vec<Recommendation>,
}

impl ComparisonResponse {
    fn from_rows(rows: Vec<ComparisonRow>) -> Self {
        Self {
            selections: default_selections(&rows),
            summary: summarize(&rows),
            vendor_summary: vendor_summary(&rows),
            recommendations: recommendations(&rows),
            rows,
        }
    }
}

/// 请求体: 供应商报价
#[derive(Debug, Deserialize)]
pub struct QuoteSubmission {
    pub vendor_id: i64,
    pub text: String,
}

/// 请求体: 询价邀请对象
#[derive(Debug, Deserialize)]
pub struct SendRfqRequest {
    pub vendor_ids: Vec<i64>,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 请购文本 -> 标准化明细草稿
pub async fn parse_indent(
    State(state): State<EngineState>,
    Json(req): Json<TextRequest>,
) -> Response {
    let raw_lines = state.engine.segment(&req.text);
    let drafts: Vec<IndentLineDraft> = draft_indent_lines(state.engine.as_ref(), raw_lines);
    ApiResponse::ok(format!("Parsed {} indent lines", drafts.len()), drafts)
}

/// 报价文本 -> 报价明细 (附带请购明细时一并匹配)
pub async fn parse_quote(
    State(state): State<EngineState>,
    Json(req): Json<QuoteParseRequest>,
) -> Result<Response, AppError> {
    let min_score = req.min_score.unwrap_or(state.matching.min_score);
    if !min_score.is_finite() || min_score < 0.0 {
        return Err(AppError::InvalidInput(format!("min_score {}", min_score)));
    }

    let engine = state.engine.as_ref();
    let mut lines = engine.parse_quote_text(&req.text);
    let matched = if req.indent_lines.is_empty() {
        0
    } else {
        let score = |q: &QuoteLine, i: &IndentLine| engine.match_score(q, i);
        assign_matches_by(&mut lines, &req.indent_lines, min_score, &score)
    };

    Ok(ApiResponse::ok(
        format!("Parsed {} quote lines, {} matched", lines.len(), matched),
        lines,
    ))
}

/// 无存储对比: 输入请购明细与各供应商报价, 输出矩阵、默认选择与汇总
pub async fn compare(
    State(_state): State<EngineState>,
    Json(req): Json<ComparisonRequest>,
) -> Result<Response, AppError> {
    validate_comparison(&req)?;

    let response = ComparisonResponse::from_rows(build_comparison(&req.indent_lines, &req.vendors));
    Ok(ApiResponse::ok(
        format!(
            "Compared {} lines across {} vendors",
            response.summary.total_lines, response.summary.vendors_compared
        ),
        response,
    ))
}

/// 数量须 > 0, 单价/税率/运费须 >= 0 (拒绝, 不截断)
fn validate_comparison(req: &ComparisonRequest) -> Result<(), AppError> {
    let zero = BigDecimal::from(0);
    for line in &req.indent_lines {
        if line.quantity <= zero {
            return Err(AppError::InvalidInput(format!(
                "indent line {}: quantity must be positive",
                line.line_number
            )));
        }
    }

    for vq in &req.vendors {
        for ql in &vq.lines {
            let negative = ql.unit_price.as_ref().is_some_and(|p| *p < zero)
                || ql.gst_percent < zero
                || ql.freight < zero;
            if negative {
                return Err(AppError::InvalidInput(format!(
                    "vendor {} line {}: negative price, GST or freight",
                    vq.vendor_id, ql.line_number
                )));
            }
        }
    }
    Ok(())
}

/// 导入请购文本 (接续已有行号)
pub async fn add_indent_lines(
    State(state): State<WorkflowState>,
    Path(indent_id): Path<i64>,
    Json(req): Json<TextRequest>,
) -> Result<Response, AppError> {
    let lines: Vec<IndentLine> = state.service.ingest_indent_text(indent_id, &req.text).await?;
    Ok(ApiResponse::ok(
        format!("Added {} lines to indent {}", lines.len(), indent_id),
        lines,
    ))
}

/// 重新标准化单条请购明细
pub async fn normalize_indent_line(
    State(state): State<WorkflowState>,
    Path(line_id): Path<i64>,
) -> Result<Response, AppError> {
    let line = state.service.renormalize_line(line_id).await?;
    Ok(ApiResponse::ok(format!("Normalized line {}", line_id), line))
}

/// 导入供应商报价
pub async fn submit_quote(
    State(state): State<WorkflowState>,
    Path(rfq_id): Path<i64>,
    Json(req): Json<QuoteSubmission>,
) -> Result<Response, AppError> {
    let stats: QuoteIngestStats = state
        .service
        .ingest_quote(rfq_id, req.vendor_id, &req.text)
        .await?;
    Ok(ApiResponse::ok(
        format!(
            "Parsed {} quote lines, {} matched, {} unmatched",
            stats.parsed_lines, stats.matched_lines, stats.unmatched_lines
        ),
        stats,
    ))
}

/// 请购单对比矩阵
pub async fn indent_comparison(
    State(state): State<WorkflowState>,
    Path(indent_id): Path<i64>,
) -> Result<Response, AppError> {
    let response = ComparisonResponse::from_rows(state.service.compare_indent(indent_id).await?);
    Ok(ApiResponse::ok(
        format!("Compared {} lines", response.summary.total_lines),
        response,
    ))
}

/// 导出对比表 CSV
pub async fn export_indent_comparison(
    State(state): State<WorkflowState>,
    Path(indent_id): Path<i64>,
) -> Result<Response, AppError> {
    let export = state
        .service
        .export_comparison(indent_id, &state.export_dir)
        .await?;
    Ok(ApiResponse::ok(
        format!("Exported {} rows to {} files", export.rows_written, export.files.len()),
        export,
    ))
}

/// 记录询价邀请邮件
pub async fn send_rfq(
    State(state): State<WorkflowState>,
    Path(rfq_id): Path<i64>,
    Json(req): Json<SendRfqRequest>,
) -> Result<Response, AppError> {
    let receipts: Vec<OutboxReceipt> = state.service.send_rfq(rfq_id, &req.vendor_ids).await?;
    Ok(ApiResponse::ok(
        format!("Recorded {} RFQ emails", receipts.len()),
        receipts,
    ))
}
