use crate::models::RawLine;
use bigdecimal::{BigDecimal, Zero};
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

/// 默认单位
pub const DEFAULT_UNIT: &str = "NOS";

/// 短于该长度 (去空白后) 的行视为噪声
const MIN_LINE_CHARS: usize = 5;

/// 数量 + 单位 (nos|pcs|kg|mtr|set|pair|ltr)
static QTY_WITH_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:,\d{2,3})*(?:\.\d+)?)\s*(nos|pcs|kg|mtr|set|pair|ltr)").unwrap()
});

/// 无单位的独立数字
static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+(?:\.\d+)?)\b").unwrap());

/// 从一行文本推断数量和单位
///
/// 优先取带单位的数字, 其次取第一个独立数字 (单位 NOS), 都没有则为 1 NOS。
/// 解析出的数量不大于 0 时视为未找到。
pub fn infer_quantity(text: &str) -> (BigDecimal, String) {
    if let Some(cap) = QTY_WITH_UNIT.captures(text) {
        if let Some(qty) = parse_positive(&cap[1]) {
            return (qty, cap[2].to_uppercase());
        }
    }

    if let Some(cap) = BARE_NUMBER.captures(text) {
        if let Some(qty) = parse_positive(&cap[1]) {
            return (qty, DEFAULT_UNIT.to_string());
        }
    }

    (BigDecimal::from(1), DEFAULT_UNIT.to_string())
}

fn parse_positive(raw: &str) -> Option<BigDecimal> {
    let qty = BigDecimal::from_str(&raw.replace(',', "")).ok()?;
    if qty > BigDecimal::zero() {
        Some(qty)
    } else {
        None
    }
}

/// 表头/噪声行判断
fn is_noise(line: &str) -> bool {
    let lower = line.to_lowercase();
    line.chars().count() < MIN_LINE_CHARS
        || lower.contains("description")
        || (lower.contains("item") && lower.contains("qty"))
}

/// 将原始文本切分为明细行, 行号从 1 开始连续编号
pub fn segment(text: &str) -> Vec<RawLine> {
    segment_from(text, 1)
}

/// 同 [`segment`], 行号从 `first_line_number` 开始 (追加到已有请购单时使用)
pub fn segment_from(text: &str, first_line_number: u32) -> Vec<RawLine> {
    let mut lines = Vec::new();
    let mut line_number = first_line_number;

    for physical in text.lines() {
        let trimmed = physical.trim();
        if is_noise(trimmed) {
            continue;
        }

        let (quantity, unit) = infer_quantity(trimmed);
        lines.push(RawLine {
            line_number,
            text: trimmed.to_string(),
            quantity,
            unit,
        });
        line_number += 1;
    }

    tracing::debug!("分段完成: {} 行有效明细", lines.len());
    lines
}
