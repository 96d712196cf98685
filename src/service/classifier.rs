use crate::models::{Category, Extraction};
use crate::service::extractor;

/// 分类规则: 关键词 + 对应的属性抽取函数
pub struct CategoryRule {
    pub category: Category,
    /// 小写子串关键词
    pub keywords: &'static [&'static str],
    pub extract: fn(&str, Category) -> Extraction,
}

/// 分类表 (声明顺序 = 优先级, 先命中先得; 更具体的分类放前面)
///
/// 新增分类只需追加一条规则, 无需改动 [`classify`] 的控制流。
pub static TAXONOMY: &[CategoryRule] = &[
    CategoryRule {
        category: Category::Bearings,
        keywords: &[
            "bearing",
            "ball bearing",
            "roller bearing",
            "skf",
            "fag",
            "nsk",
            "ntn",
            "timken",
        ],
        extract: extractor::extract_bearing,
    },
    CategoryRule {
        category: Category::Motors,
        keywords: &[
            "motor",
            "electric motor",
            "ac motor",
            "dc motor",
            "servo",
            "gearbox",
        ],
        extract: extractor::extract_generic,
    },
    CategoryRule {
        category: Category::Valves,
        keywords: &[
            "valve",
            "gate valve",
            "globe valve",
            "ball valve",
            "butterfly valve",
            "check valve",
        ],
        extract: extractor::extract_generic,
    },
    CategoryRule {
        category: Category::Instrumentation,
        keywords: &["sensor", "gauge", "transmitter", "controller", "plc"],
        extract: extractor::extract_generic,
    },
];

/// 按关键词判定分类, 无命中返回 GENERIC
pub fn classify(text: &str) -> Category {
    let lower = text.to_lowercase();
    TAXONOMY
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lower.contains(kw)))
        .map(|rule| rule.category)
        .unwrap_or(Category::Generic)
}

/// 查找分类对应的规则 (GENERIC 无规则)
pub fn rule_for(category: Category) -> Option<&'static CategoryRule> {
    TAXONOMY.iter().find(|rule| rule.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearing_keyword_classifies_as_bearings() {
        assert_eq!(classify("SKF 6205-2RS Bearing"), Category::Bearings);
        assert_eq!(classify("deep groove BALL BEARING 6305"), Category::Bearings);
        assert_eq!(classify("Timken 30205"), Category::Bearings);
    }

    #[test]
    fn no_keyword_falls_back_to_generic() {
        assert_eq!(classify("Cotton waste 10 kg"), Category::Generic);
        assert_eq!(classify(""), Category::Generic);
    }

    #[test]
    fn other_categories_are_recognized() {
        assert_eq!(classify("3 phase electric motor 5HP"), Category::Motors);
        assert_eq!(classify("Butterfly valve DN100"), Category::Valves);
        assert_eq!(classify("Pressure gauge 0-10 bar"), Category::Instrumentation);
    }

    #[test]
    fn first_declared_category_wins_on_overlap() {
        // 同时含 bearing 与 motor 关键词
        assert_eq!(classify("Motor end bearing 6306"), Category::Bearings);
        assert_eq!(classify("Gearbox with valve actuator"), Category::Motors);
    }

    #[test]
    fn every_specific_category_has_a_rule() {
        for category in [
            Category::Bearings,
            Category::Motors,
            Category::Valves,
            Category::Instrumentation,
        ] {
            assert!(rule_for(category).is_some(), "missing rule for {}", category);
        }
        assert!(rule_for(Category::Generic).is_none());
    }
}
