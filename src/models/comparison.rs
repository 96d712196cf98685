use bigdecimal::BigDecimal;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 单个供应商对某请购明细的报价 (派生, 不入库)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorOffer {
    pub vendor_name: String,
    pub quote_line_id: Option<i64>,
    pub unit_price: Option<BigDecimal>,
    pub gst_percent: BigDecimal,
    pub freight: BigDecimal,
    pub landed_cost: Option<BigDecimal>,
    pub lead_time_days: Option<i64>,
    pub brand: Option<String>,
    pub payment_terms: Option<String>,
}

/// 对比矩阵行: 一条请购明细 × 各供应商报价
///
/// `vendors` 中缺失的供应商表示"未报价", 不是 0 价。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub line_id: i64,
    pub line_number: u32,
    pub description: String,
    pub quantity: BigDecimal,
    pub unit: String,
    pub vendors: IndexMap<i64, VendorOffer>,
    pub lowest_cost_vendor: Option<i64>,
    pub lowest_lead_time_vendor: Option<i64>,
}

/// 对比汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub total_lines: usize,
    pub vendors_compared: usize,
    pub lines_with_offers: usize,
    pub lines_without_offers: usize,
}

/// 供应商汇总: 报价条数、最低价条数与到岸总额
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorSummary {
    pub vendor_id: i64,
    pub vendor_name: String,
    pub items_quoted: usize,
    pub best_price_count: usize,
    pub total_landed_value: BigDecimal,
}

/// 推荐选择: 每条请购明细的最低成本报价, 无报价时供应商为空
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub line_id: i64,
    pub line_number: u32,
    pub description: String,
    pub quantity: BigDecimal,
    pub unit: String,
    pub vendor_id: Option<i64>,
    pub vendor_name: Option<String>,
    pub quote_line_id: Option<i64>,
    pub landed_cost: Option<BigDecimal>,
    pub lead_time_days: Option<i64>,
    pub brand: Option<String>,
}
