use crate::models::QuoteLine;
use crate::service::segmenter::infer_quantity;
use bigdecimal::BigDecimal;
use regex::{Captures, Regex};
use std::str::FromStr;
use std::sync::LazyLock;

/// 短于该长度 (去空白后) 的行视为噪声
const MIN_LINE_CHARS: usize = 3;

/// 金额: 可选币种标记 (Rs / Rs. / INR / ₹), 千分位 (含印度分组 1,00,000), 最多两位小数, 可选结尾 "/-"
static PRICE: LazyLock<Regex> = LazyLock::new(|| {
    const AMOUNT: &str = r"\d{1,3}(?:,\d{2,3})+(?:\.\d{1,2})?\b|\d+(?:\.\d{1,2})?\b";
    Regex::new(&format!(
        r"(?i)(?:(?P<cur>\b(?:Rs\.?|INR)|₹)\s*(?P<camt>{amount})|\b(?P<amt>{amount}))(?:/-)?",
        amount = AMOUNT
    ))
    .unwrap()
});

fn is_header(lower: &str) -> bool {
    lower.contains("description") && (lower.contains("price") || lower.contains("rate"))
}

/// 选取单价: 带币种标记的金额优先, 否则取行内最后一个金额
fn find_price<'t>(line: &'t str) -> Option<Captures<'t>> {
    let mut last = None;
    for cap in PRICE.captures_iter(line) {
        if cap.name("cur").is_some() {
            return Some(cap);
        }
        last = Some(cap);
    }
    last
}

/// 解析供应商报价文本; 找不到金额的行直接丢弃
///
/// GST 不从文本中抽取, 统一取默认 18%; 运费默认 0。
pub fn parse_quote_text(text: &str) -> Vec<QuoteLine> {
    let mut lines = Vec::new();
    let mut line_number = 1u32;

    for physical in text.lines() {
        let trimmed = physical.trim();
        if trimmed.chars().count() < MIN_LINE_CHARS || is_header(&trimmed.to_lowercase()) {
            continue;
        }

        let Some(cap) = find_price(trimmed) else {
            tracing::debug!("报价行无金额, 跳过: {}", trimmed);
            continue;
        };

        let whole = cap.get(0).map(|m| (m.start(), m.end()));
        let amount = cap.name("camt").or_else(|| cap.name("amt"));
        let (Some((start, end)), Some(amount)) = (whole, amount) else {
            continue;
        };
        let Ok(unit_price) = BigDecimal::from_str(&amount.as_str().replace(',', "")) else {
            continue;
        };

        // 仅移除价格文本并去首尾空白, 保留供应商原文中的间距
        let description = format!("{}{}", &trimmed[..start], &trimmed[end..])
            .trim()
            .to_string();
        let (quantity, unit) = infer_quantity(&description);

        lines.push(QuoteLine::priced(line_number, description, quantity, unit, unit_price));
        line_number += 1;
    }

    tracing::debug!("报价解析完成: {} 行", lines.len());
    lines
}
