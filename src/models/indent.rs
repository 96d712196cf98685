use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// 物料分类 (固定分类表, 声明顺序即匹配优先级)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Bearings,
    Motors,
    Valves,
    Instrumentation,
    Generic,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Bearings => "BEARINGS",
            Category::Motors => "MOTORS",
            Category::Valves => "VALVES",
            Category::Instrumentation => "INSTRUMENTATION",
            Category::Generic => "GENERIC",
        }
    }

    /// 数据库存储值反解析, 未知值归入 GENERIC
    pub fn from_db(value: &str) -> Self {
        match value {
            "BEARINGS" => Category::Bearings,
            "MOTORS" => Category::Motors,
            "VALVES" => Category::Valves,
            "INSTRUMENTATION" => Category::Instrumentation,
            _ => Category::Generic,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 分段器输出的原始行 (用后即弃)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLine {
    pub line_number: u32,
    pub text: String,
    pub quantity: BigDecimal,
    pub unit: String,
}

/// 属性抽取结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub attributes: Map<String, Value>,
    pub clean_description: String,
    pub confidence: f64,
}

/// 标准化物料 (整体替换, 不做局部修改)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItem {
    pub category: Category,
    pub clean_description: String,
    pub attributes: Map<String, Value>,
    pub confidence: f64,
}

impl NormalizedItem {
    pub fn from_extraction(category: Category, extraction: Extraction) -> Self {
        Self {
            category,
            clean_description: extraction.clean_description,
            attributes: extraction.attributes,
            confidence: extraction.confidence,
        }
    }
}

/// 待入库的请购明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndentLineDraft {
    pub line_number: u32,
    pub raw_description: String,
    pub quantity: BigDecimal,
    pub unit: String,
    pub normalized_item: Option<NormalizedItem>,
}

/// 请购明细 (IndentLine)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndentLine {
    pub id: i64,
    pub line_number: u32,
    pub raw_description: String,
    pub quantity: BigDecimal,
    pub unit: String,
    #[serde(default)]
    pub normalized_item: Option<NormalizedItem>,
}

impl IndentLine {
    pub fn from_draft(id: i64, draft: IndentLineDraft) -> Self {
        Self {
            id,
            line_number: draft.line_number,
            raw_description: draft.raw_description,
            quantity: draft.quantity,
            unit: draft.unit,
            normalized_item: draft.normalized_item,
        }
    }

    /// 对比表展示用描述: 优先标准化描述
    pub fn display_description(&self) -> &str {
        self.normalized_item
            .as_ref()
            .map(|n| n.clean_description.as_str())
            .unwrap_or(&self.raw_description)
    }
}
