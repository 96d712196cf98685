use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// 默认 GST 税率 (%)
pub const DEFAULT_GST_PERCENT: i32 = 18;

/// 供应商报价明细 (QuoteLine)
///
/// 解析后不可变, 仅匹配器回填 `matched_indent_line_id` / `match_score`。
/// 重新上传生成新的报价单, 不修改旧记录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteLine {
    #[serde(default)]
    pub id: Option<i64>,
    pub line_number: u32,
    pub description: String,
    pub quantity: BigDecimal,
    pub unit: String,
    #[serde(default)]
    pub unit_price: Option<BigDecimal>,
    #[serde(default = "default_gst")]
    pub gst_percent: BigDecimal,
    #[serde(default = "default_freight")]
    pub freight: BigDecimal,
    #[serde(default)]
    pub lead_time_days: Option<i64>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub matched_indent_line_id: Option<i64>,
    #[serde(default)]
    pub match_score: Option<f64>,
}

fn default_gst() -> BigDecimal {
    BigDecimal::from(DEFAULT_GST_PERCENT)
}

fn default_freight() -> BigDecimal {
    BigDecimal::from(0)
}

impl QuoteLine {
    /// 以默认税率/运费构造一条报价明细
    pub fn priced(
        line_number: u32,
        description: String,
        quantity: BigDecimal,
        unit: String,
        unit_price: BigDecimal,
    ) -> Self {
        Self {
            id: None,
            line_number,
            description,
            quantity,
            unit,
            unit_price: Some(unit_price),
            gst_percent: default_gst(),
            freight: default_freight(),
            lead_time_days: None,
            payment_terms: None,
            brand: None,
            origin: None,
            matched_indent_line_id: None,
            match_score: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.matched_indent_line_id.is_some()
    }
}

/// 某供应商针对一个请购单的全部报价明细 (对比输入)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorQuotes {
    pub vendor_id: i64,
    pub vendor_name: String,
    pub lines: Vec<QuoteLine>,
}

/// 报价导入统计
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteIngestStats {
    pub quote_id: i64,
    pub rfq_id: i64,
    pub vendor_id: i64,
    pub parsed_lines: usize,
    pub matched_lines: usize,
    pub unmatched_lines: usize,
}
