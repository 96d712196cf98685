use crate::models::{Category, IndentLine, NormalizedItem, QuoteLine};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::FromRow;

/// 请购明细表 (indent_lines)
#[derive(Debug, Clone, FromRow)]
pub struct IndentLineRow {
    pub id: i64,
    pub indent_id: i64,
    pub line_number: i32,
    pub raw_description: String,
    pub quantity: BigDecimal,
    pub unit: String,
    pub category: Option<String>,
    pub clean_description: Option<String>,
    pub attributes: Option<Json<Map<String, Value>>>,
    pub confidence: Option<f64>,
}

impl From<IndentLineRow> for IndentLine {
    fn from(row: IndentLineRow) -> Self {
        // 四个标准化字段同时存在才视为已标准化
        let normalized_item = match (row.category, row.clean_description, row.attributes, row.confidence) {
            (Some(category), Some(clean_description), Some(Json(attributes)), Some(confidence)) => {
                Some(NormalizedItem {
                    category: Category::from_db(&category),
                    clean_description,
                    attributes,
                    confidence,
                })
            }
            _ => None,
        };

        IndentLine {
            id: row.id,
            line_number: row.line_number.max(0) as u32,
            raw_description: row.raw_description,
            quantity: row.quantity,
            unit: row.unit,
            normalized_item,
        }
    }
}

/// 报价明细表 (quote_lines)
#[derive(Debug, Clone, FromRow)]
pub struct QuoteLineRow {
    pub id: i64,
    pub quote_id: i64,
    pub line_number: i32,
    pub description: String,
    pub quantity: BigDecimal,
    pub unit: String,
    pub unit_price: Option<BigDecimal>,
    pub gst_percent: BigDecimal,
    pub freight: BigDecimal,
    pub lead_time_days: Option<i64>,
    pub payment_terms: Option<String>,
    pub brand: Option<String>,
    pub origin: Option<String>,
    pub matched_indent_line_id: Option<i64>,
    pub match_score: Option<f64>,
}

impl From<QuoteLineRow> for QuoteLine {
    fn from(row: QuoteLineRow) -> Self {
        QuoteLine {
            id: Some(row.id),
            line_number: row.line_number.max(0) as u32,
            description: row.description,
            quantity: row.quantity,
            unit: row.unit,
            unit_price: row.unit_price,
            gst_percent: row.gst_percent,
            freight: row.freight,
            lead_time_days: row.lead_time_days,
            payment_terms: row.payment_terms,
            brand: row.brand,
            origin: row.origin,
            matched_indent_line_id: row.matched_indent_line_id,
            match_score: row.match_score,
        }
    }
}

/// 各供应商最新一次报价单
#[derive(Debug, Clone, FromRow)]
pub struct LatestQuoteRow {
    pub quote_id: i64,
    pub vendor_id: i64,
    pub vendor_name: String,
}

/// 询价单 (rfqs)
#[derive(Debug, Clone, FromRow)]
pub struct RfqRow {
    pub id: i64,
    pub indent_id: i64,
    pub rfq_number: String,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// 供应商 (vendors)
#[derive(Debug, Clone, FromRow)]
pub struct VendorRow {
    pub id: i64,
    pub name: String,
    pub email: String,
}
