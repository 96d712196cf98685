use crate::models::{IndentLine, QuoteLine};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// 分词: 小写, 按空白切分, 仅保留长度 > 2 的词, 去重
pub fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| w.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

/// 词重叠相似度: |交集| / max(|A|, |B|), 两边都为空时为 0
pub fn text_score(a: &str, b: &str) -> f64 {
    let left = tokenize(a);
    let right = tokenize(b);

    let denominator = left.len().max(right.len());
    if denominator == 0 {
        return 0.0;
    }

    let common = left.intersection(&right).count();
    common as f64 / denominator as f64
}

/// 报价明细与请购明细的相似度
pub fn match_score(quote: &QuoteLine, indent: &IndentLine) -> f64 {
    text_score(&quote.description, &indent.raw_description)
}

/// 最佳匹配候选
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub indent_line_id: i64,
    pub line_number: u32,
    pub score: f64,
}

/// 在请购明细中选取得分最高者 (同分取行号小者)
///
/// 得分为 0 或低于 `min_score` 视为未匹配, 不强行分配。
pub fn best_match(
    quote: &QuoteLine,
    indent_lines: &[IndentLine],
    min_score: f64,
) -> Option<MatchCandidate> {
    best_match_by(quote, indent_lines, min_score, &match_score)
}

/// 同 [`best_match`], 使用外部提供的评分函数
pub fn best_match_by<F>(
    quote: &QuoteLine,
    indent_lines: &[IndentLine],
    min_score: f64,
    score_fn: &F,
) -> Option<MatchCandidate>
where
    F: Fn(&QuoteLine, &IndentLine) -> f64 + ?Sized,
{
    let mut best: Option<MatchCandidate> = None;

    for line in indent_lines {
        let score = score_fn(quote, line);
        let is_better = match &best {
            None => true,
            Some(b) => score > b.score || (score == b.score && line.line_number < b.line_number),
        };
        if is_better {
            best = Some(MatchCandidate {
                indent_line_id: line.id,
                line_number: line.line_number,
                score,
            });
        }
    }

    best.filter(|b| b.score > 0.0 && b.score >= min_score)
}

/// 为同一份报价的所有明细回填匹配结果, 返回匹配成功的行数
///
/// 同一请购明细最多分配给该报价中的一行: 得分高者保留, 同分取报价行号小者,
/// 其余行标记为未匹配。
pub fn assign_matches(
    quote_lines: &mut [QuoteLine],
    indent_lines: &[IndentLine],
    min_score: f64,
) -> usize {
    assign_matches_by(quote_lines, indent_lines, min_score, &match_score)
}

/// 同 [`assign_matches`], 使用外部提供的评分函数
pub fn assign_matches_by<F>(
    quote_lines: &mut [QuoteLine],
    indent_lines: &[IndentLine],
    min_score: f64,
    score_fn: &F,
) -> usize
where
    F: Fn(&QuoteLine, &IndentLine) -> f64 + Sync + ?Sized,
{
    let picks: Vec<Option<MatchCandidate>> = quote_lines
        .par_iter()
        .map(|q| best_match_by(q, indent_lines, min_score, score_fn))
        .collect();

    // 请购明细ID -> (报价行下标, 得分)
    let mut winners: HashMap<i64, (usize, f64)> = HashMap::new();
    for (idx, pick) in picks.iter().enumerate() {
        let Some(candidate) = pick else { continue };
        match winners.get(&candidate.indent_line_id) {
            Some(&(held_idx, held_score)) => {
                let takes_over = candidate.score > held_score
                    || (candidate.score == held_score
                        && quote_lines[idx].line_number < quote_lines[held_idx].line_number);
                if takes_over {
                    winners.insert(candidate.indent_line_id, (idx, candidate.score));
                }
            }
            None => {
                winners.insert(candidate.indent_line_id, (idx, candidate.score));
            }
        }
    }

    let accepted: HashMap<usize, (i64, f64)> = winners
        .into_iter()
        .map(|(indent_id, (idx, score))| (idx, (indent_id, score)))
        .collect();

    for (idx, line) in quote_lines.iter_mut().enumerate() {
        match accepted.get(&idx) {
            Some(&(indent_id, score)) => {
                line.matched_indent_line_id = Some(indent_id);
                line.match_score = Some(score);
            }
            None => {
                if picks[idx].is_some() {
                    tracing::debug!(
                        "报价行 {} 与已分配的请购明细冲突, 标记为未匹配",
                        line.line_number
                    );
                }
                line.matched_indent_line_id = None;
                line.match_score = None;
            }
        }
    }

    accepted.len()
}
