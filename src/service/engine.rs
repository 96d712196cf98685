use crate::models::{
    Category, Extraction, IndentLine, IndentLineDraft, NormalizedItem, QuoteLine, RawLine,
};
use crate::service::{classifier, extractor, matcher, quote_parser, segmenter};
use rayon::prelude::*;

/// 文本理解接口: 分段 / 分类 / 属性抽取 / 报价解析 / 相似度
///
/// 默认实现为启发式规则 ([`HeuristicEngine`]), 可替换为统计或模型实现, 调用方无需改动。
pub trait QuoteEngine: Send + Sync {
    fn segment(&self, text: &str) -> Vec<RawLine>;

    fn classify(&self, text: &str) -> Category;

    fn extract_attributes(&self, text: &str, category: Category) -> Extraction;

    fn parse_quote_text(&self, text: &str) -> Vec<QuoteLine>;

    fn match_score(&self, quote: &QuoteLine, indent: &IndentLine) -> f64;

    /// 分类 + 抽取, 始终从原始描述计算
    fn normalize(&self, raw_description: &str) -> NormalizedItem {
        let category = self.classify(raw_description);
        NormalizedItem::from_extraction(category, self.extract_attributes(raw_description, category))
    }
}

/// 关键词 + 正则的启发式实现
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicEngine;

impl QuoteEngine for HeuristicEngine {
    fn segment(&self, text: &str) -> Vec<RawLine> {
        segmenter::segment(text)
    }

    fn classify(&self, text: &str) -> Category {
        classifier::classify(text)
    }

    fn extract_attributes(&self, text: &str, category: Category) -> Extraction {
        extractor::extract_attributes(text, category)
    }

    fn parse_quote_text(&self, text: &str) -> Vec<QuoteLine> {
        quote_parser::parse_quote_text(text)
    }

    fn match_score(&self, quote: &QuoteLine, indent: &IndentLine) -> f64 {
        matcher::match_score(quote, indent)
    }
}

/// 请购文本 -> 已标准化的待入库明细 (并行标准化)
pub fn draft_indent_lines(engine: &dyn QuoteEngine, raw_lines: Vec<RawLine>) -> Vec<IndentLineDraft> {
    raw_lines
        .into_par_iter()
        .map(|raw| {
            let normalized = engine.normalize(&raw.text);
            IndentLineDraft {
                line_number: raw.line_number,
                raw_description: raw.text,
                quantity: raw.quantity,
                unit: raw.unit,
                normalized_item: Some(normalized),
            }
        })
        .collect()
}

/// 重新标准化: 基于 raw_description 整体替换 NormalizedItem
pub fn renormalize(engine: &dyn QuoteEngine, line: &mut IndentLine) {
    line.normalized_item = Some(engine.normalize(&line.raw_description));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drafts_keep_order_and_numbering() {
        let engine = HeuristicEngine;
        let raw = engine.segment("SKF 6205-2RS Bearing 10 nos\nCotton waste 5 kg\nGate valve 2 inch 4 pcs");
        let drafts = draft_indent_lines(&engine, raw);

        let numbers: Vec<u32> = drafts.iter().map(|d| d.line_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        let categories: Vec<Category> = drafts
            .iter()
            .map(|d| d.normalized_item.as_ref().unwrap().category)
            .collect();
        assert_eq!(categories, vec![Category::Bearings, Category::Generic, Category::Valves]);
    }

    #[test]
    fn renormalize_uses_raw_description_not_previous_result() {
        let engine = HeuristicEngine;
        let mut line = IndentLine {
            id: 1,
            line_number: 1,
            raw_description: "SKF 6205-2RS Bearing".to_string(),
            quantity: bigdecimal::BigDecimal::from(10),
            unit: "NOS".to_string(),
            normalized_item: None,
        };
        renormalize(&engine, &mut line);
        let first = line.normalized_item.clone();
        renormalize(&engine, &mut line);
        assert_eq!(line.normalized_item, first);
        assert_eq!(first.unwrap().clean_description, "SKF 6205 2RS");
    }

    /// 替换实现: 所有行都归入通用分类
    struct FlatEngine;

    impl QuoteEngine for FlatEngine {
        fn segment(&self, text: &str) -> Vec<RawLine> {
            segmenter::segment(text)
        }
        fn classify(&self, _text: &str) -> Category {
            Category::Generic
        }
        fn extract_attributes(&self, text: &str, category: Category) -> Extraction {
            extractor::extract_generic(text, category)
        }
        fn parse_quote_text(&self, text: &str) -> Vec<QuoteLine> {
            quote_parser::parse_quote_text(text)
        }
        fn match_score(&self, _quote: &QuoteLine, _indent: &IndentLine) -> f64 {
            1.0
        }
    }

    #[test]
    fn engines_are_swappable_behind_the_trait() {
        let engines: Vec<Box<dyn QuoteEngine>> = vec![Box::new(HeuristicEngine), Box::new(FlatEngine)];
        let categories: Vec<Category> = engines
            .iter()
            .map(|e| e.normalize("SKF 6205 bearing").category)
            .collect();
        assert_eq!(categories, vec![Category::Bearings, Category::Generic]);
    }
}
