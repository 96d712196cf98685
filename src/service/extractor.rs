use crate::models::{Category, Extraction, NormalizedItem};
use crate::service::classifier;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

pub const CONFIDENCE_SERIES_FOUND: f64 = 0.85;
pub const CONFIDENCE_CATEGORY_BASELINE: f64 = 0.60;
pub const CONFIDENCE_GENERIC: f64 = 0.40;

/// 轴承型号模式, 按优先级排列, 先命中先得
static BEARING_SERIES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // 深沟球轴承: 6205-2RS, 6308ZZ
        r"(?i)\b(6[0-9]{3})-?(2RS|RS|ZZ|[2Z]{2})?\b",
        // 圆柱滚子: NU210, N210
        r"(?i)\b(NU?[0-9]{3,4})\b",
        // 调心滚子
        r"(?i)\b(22[0-9]{2,3})\b",
        // 圆锥滚子
        r"(?i)\b(30[0-9]{2,3})\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// 内径 x 外径 x 宽度, 例如 25x52x15
static DIMENSIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*[xX×]\s*(\d+)\s*[xX×]\s*(\d+)").unwrap());

const BEARING_BRANDS: [&str; 8] = ["SKF", "FAG", "NSK", "NTN", "TIMKEN", "INA", "KOYO", "NACHI"];

/// 合并连续空白并去除首尾空白
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 按分类抽取属性; 无专用规则的分类走通用路径
pub fn extract_attributes(text: &str, category: Category) -> Extraction {
    match classifier::rule_for(category) {
        Some(rule) => (rule.extract)(text, category),
        None => extract_generic(text, category),
    }
}

/// 分类 + 属性抽取, 始终基于原始描述重新计算
pub fn normalize_item(raw_description: &str) -> NormalizedItem {
    let category = classifier::classify(raw_description);
    NormalizedItem::from_extraction(category, extract_attributes(raw_description, category))
}

/// 轴承专用抽取: 型号 / 密封形式 / 品牌 / 尺寸
pub fn extract_bearing(text: &str, _category: Category) -> Extraction {
    let mut series: Option<String> = None;
    let mut seal_type: Option<String> = None;

    for pattern in BEARING_SERIES.iter() {
        if let Some(cap) = pattern.captures(text) {
            series = Some(cap[1].to_uppercase());
            seal_type = cap.get(2).map(|m| m.as_str().to_uppercase());
            break;
        }
    }

    let upper = text.to_uppercase();
    let brand = BEARING_BRANDS
        .iter()
        .find(|b| upper.contains(*b))
        .map(|b| b.to_string());

    let dimensions = DIMENSIONS.captures(text).and_then(|cap| {
        let bore = cap[1].parse::<i64>().ok()?;
        let outer = cap[2].parse::<i64>().ok()?;
        let width = cap[3].parse::<i64>().ok()?;
        Some((bore, outer, width))
    });

    let mut attributes = Map::new();
    attributes.insert("series".into(), opt_string(&series));
    attributes.insert("bore".into(), dimensions.map(|d| Value::from(d.0)).unwrap_or(Value::Null));
    attributes.insert(
        "outerDiameter".into(),
        dimensions.map(|d| Value::from(d.1)).unwrap_or(Value::Null),
    );
    attributes.insert("width".into(), dimensions.map(|d| Value::from(d.2)).unwrap_or(Value::Null));
    attributes.insert("sealType".into(), opt_string(&seal_type));
    attributes.insert("clearance".into(), Value::Null);
    attributes.insert("brand".into(), opt_string(&brand));

    match series {
        Some(series) => {
            // 用 [品牌] 型号 [密封] 重建描述, 丢弃原始自由文本
            let mut parts = Vec::with_capacity(3);
            if let Some(b) = brand {
                parts.push(b);
            }
            parts.push(series);
            if let Some(s) = seal_type {
                parts.push(s);
            }
            Extraction {
                attributes,
                clean_description: parts.join(" "),
                confidence: CONFIDENCE_SERIES_FOUND,
            }
        }
        None => Extraction {
            attributes,
            clean_description: collapse_whitespace(text),
            confidence: CONFIDENCE_CATEGORY_BASELINE,
        },
    }
}

/// 通用抽取: 关键词袋
pub fn extract_generic(text: &str, category: Category) -> Extraction {
    let keywords: Vec<Value> = text
        .to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() > 3)
        .map(|w| Value::String(w.to_string()))
        .collect();

    let mut attributes = Map::new();
    attributes.insert("rawCategory".into(), Value::String(category.as_str().to_string()));
    attributes.insert("keywords".into(), Value::Array(keywords));

    Extraction {
        attributes,
        clean_description: collapse_whitespace(text),
        confidence: CONFIDENCE_GENERIC,
    }
}

fn opt_string(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}
