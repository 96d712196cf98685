use crate::models::{
    ComparisonRow, ComparisonSummary, IndentLine, QuoteLine, Recommendation, VendorOffer,
    VendorQuotes, VendorSummary,
};
use crate::service::landed_cost::landed_cost;
use bigdecimal::BigDecimal;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

/// 构建对比矩阵: 每条请购明细一行, 行序沿用请购明细顺序, 供应商列序沿用输入顺序
///
/// 到岸成本按请购数量计算, 保证各供应商口径一致。
/// 未报价的供应商不出现在该行中。
pub fn build_comparison(indent_lines: &[IndentLine], vendors: &[VendorQuotes]) -> Vec<ComparisonRow> {
    if indent_lines.is_empty() {
        return Vec::new();
    }

    // 供应商ID -> (请购明细ID -> 报价明细), 同一明细多行时取报价行号小者
    let mut matched: IndexMap<i64, (&str, HashMap<i64, &QuoteLine>)> = IndexMap::new();
    for vq in vendors {
        let (_, by_line) = matched
            .entry(vq.vendor_id)
            .or_insert_with(|| (vq.vendor_name.as_str(), HashMap::new()));
        for ql in &vq.lines {
            let Some(indent_id) = ql.matched_indent_line_id else { continue };
            by_line
                .entry(indent_id)
                .and_modify(|held| {
                    if ql.line_number < held.line_number {
                        *held = ql;
                    }
                })
                .or_insert(ql);
        }
    }

    let rows: Vec<ComparisonRow> = indent_lines
        .iter()
        .map(|line| {
            let mut offers: IndexMap<i64, VendorOffer> = IndexMap::new();
            for (&vendor_id, (vendor_name, by_line)) in &matched {
                if let Some(ql) = by_line.get(&line.id) {
                    offers.insert(vendor_id, offer_for(vendor_name, ql, line));
                }
            }

            ComparisonRow {
                line_id: line.id,
                line_number: line.line_number,
                description: line.display_description().to_string(),
                quantity: line.quantity.clone(),
                unit: line.unit.clone(),
                lowest_cost_vendor: lowest_cost_vendor(&offers),
                lowest_lead_time_vendor: lowest_lead_time_vendor(&offers),
                vendors: offers,
            }
        })
        .collect();

    tracing::debug!(
        "对比矩阵完成: {} 行, {} 个供应商",
        rows.len(),
        matched.len()
    );
    rows
}

fn offer_for(vendor_name: &str, ql: &QuoteLine, line: &IndentLine) -> VendorOffer {
    let landed = ql
        .unit_price
        .as_ref()
        .map(|price| landed_cost(price, &line.quantity, &ql.gst_percent, &ql.freight));

    VendorOffer {
        vendor_name: vendor_name.to_string(),
        quote_line_id: ql.id,
        unit_price: ql.unit_price.clone(),
        gst_percent: ql.gst_percent.clone(),
        freight: ql.freight.clone(),
        landed_cost: landed,
        lead_time_days: ql.lead_time_days,
        brand: ql.brand.clone(),
        payment_terms: ql.payment_terms.clone(),
    }
}

/// 最低到岸成本供应商, 同值取先出现者; 无成本的报价不参与比较
fn lowest_cost_vendor(offers: &IndexMap<i64, VendorOffer>) -> Option<i64> {
    let mut best: Option<(i64, &BigDecimal)> = None;
    for (&vendor_id, offer) in offers {
        let Some(cost) = offer.landed_cost.as_ref() else { continue };
        if best.map_or(true, |(_, b)| cost < b) {
            best = Some((vendor_id, cost));
        }
    }
    best.map(|(id, _)| id)
}

/// 最短交期供应商, 交期为空的报价不参与比较 (不视为 0)
fn lowest_lead_time_vendor(offers: &IndexMap<i64, VendorOffer>) -> Option<i64> {
    let mut best: Option<(i64, i64)> = None;
    for (&vendor_id, offer) in offers {
        let Some(days) = offer.lead_time_days else { continue };
        if best.map_or(true, |(_, b)| days < b) {
            best = Some((vendor_id, days));
        }
    }
    best.map(|(id, _)| id)
}

/// 审批默认选择: 请购明细ID -> 最低成本报价明细ID
pub fn default_selections(rows: &[ComparisonRow]) -> IndexMap<i64, i64> {
    rows.iter()
        .filter_map(|row| {
            let vendor = row.lowest_cost_vendor?;
            let quote_line_id = row.vendors.get(&vendor)?.quote_line_id?;
            Some((row.line_id, quote_line_id))
        })
        .collect()
}

/// 参与对比的供应商 (按首次出现顺序)
pub fn vendors_in(rows: &[ComparisonRow]) -> IndexMap<i64, String> {
    let mut vendors = IndexMap::new();
    for row in rows {
        for (&vendor_id, offer) in &row.vendors {
            vendors
                .entry(vendor_id)
                .or_insert_with(|| offer.vendor_name.clone());
        }
    }
    vendors
}

pub fn summarize(rows: &[ComparisonRow]) -> ComparisonSummary {
    let vendors: IndexSet<i64> = rows
        .iter()
        .flat_map(|row| row.vendors.keys().copied())
        .collect();
    let lines_with_offers = rows.iter().filter(|row| !row.vendors.is_empty()).count();

    ComparisonSummary {
        total_lines: rows.len(),
        vendors_compared: vendors.len(),
        lines_with_offers,
        lines_without_offers: rows.len() - lines_with_offers,
    }
}

/// 各供应商汇总 (按首次出现顺序)
///
/// 最低价条数按行的 `lowest_cost_vendor` 计, 与对比矩阵的同值规则一致;
/// 无到岸成本的报价计入条数, 不计入总额。
pub fn vendor_summary(rows: &[ComparisonRow]) -> Vec<VendorSummary> {
    let mut stats: IndexMap<i64, VendorSummary> = vendors_in(rows)
        .into_iter()
        .map(|(vendor_id, vendor_name)| {
            let summary = VendorSummary {
                vendor_id,
                vendor_name,
                items_quoted: 0,
                best_price_count: 0,
                total_landed_value: BigDecimal::from(0),
            };
            (vendor_id, summary)
        })
        .collect();

    for row in rows {
        for (vendor_id, offer) in &row.vendors {
            let Some(entry) = stats.get_mut(vendor_id) else { continue };
            entry.items_quoted += 1;
            if let Some(cost) = &offer.landed_cost {
                entry.total_landed_value = &entry.total_landed_value + cost;
            }
        }
        if let Some(entry) = row.lowest_cost_vendor.and_then(|id| stats.get_mut(&id)) {
            entry.best_price_count += 1;
        }
    }

    stats.into_values().collect()
}

/// 推荐选择: 每行取最低成本报价, 无报价的行保留为空推荐
pub fn recommendations(rows: &[ComparisonRow]) -> Vec<Recommendation> {
    rows.iter()
        .map(|row| {
            let best = row
                .lowest_cost_vendor
                .and_then(|id| row.vendors.get(&id).map(|offer| (id, offer)));
            Recommendation {
                line_id: row.line_id,
                line_number: row.line_number,
                description: row.description.clone(),
                quantity: row.quantity.clone(),
                unit: row.unit.clone(),
                vendor_id: best.map(|(id, _)| id),
                vendor_name: best.map(|(_, o)| o.vendor_name.clone()),
                quote_line_id: best.and_then(|(_, o)| o.quote_line_id),
                landed_cost: best.and_then(|(_, o)| o.landed_cost.clone()),
                lead_time_days: best.and_then(|(_, o)| o.lead_time_days),
                brand: best.and_then(|(_, o)| o.brand.clone()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn d(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn indent(id: i64, line_number: u32, text: &str, qty: &str) -> IndentLine {
        IndentLine {
            id,
            line_number,
            raw_description: text.to_string(),
            quantity: d(qty),
            unit: "NOS".to_string(),
            normalized_item: None,
        }
    }

    fn offer_line(id: i64, indent_id: i64, price: &str, freight: &str, lead: Option<i64>) -> QuoteLine {
        let mut ql = QuoteLine::priced(1, "offer".to_string(), d("10"), "NOS".to_string(), d(price));
        ql.id = Some(id);
        ql.freight = d(freight);
        ql.lead_time_days = lead;
        ql.matched_indent_line_id = Some(indent_id);
        ql
    }

    fn vendor(id: i64, name: &str, lines: Vec<QuoteLine>) -> VendorQuotes {
        VendorQuotes {
            vendor_id: id,
            vendor_name: name.to_string(),
            lines,
        }
    }

    #[test]
    fn empty_indent_yields_empty_comparison() {
        let vendors = vec![vendor(1, "A", vec![offer_line(1, 1, "10", "0", None)])];
        assert!(build_comparison(&[], &vendors).is_empty());
    }

    #[test]
    fn lowest_cost_and_lead_time_are_picked() {
        let lines = vec![indent(1, 1, "SKF 6205-2RS Bearing", "10")];
        let vendors = vec![
            vendor(100, "Vendor A", vec![offer_line(501, 1, "850", "0", Some(7))]),
            vendor(200, "Vendor B", vec![offer_line(601, 1, "800", "100", Some(10))]),
        ];
        let rows = build_comparison(&lines, &vendors);

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.vendors[&100].landed_cost, Some(d("10030")));
        assert_eq!(row.vendors[&200].landed_cost, Some(d("9540")));
        assert_eq!(row.lowest_cost_vendor, Some(200));
        assert_eq!(row.lowest_lead_time_vendor, Some(100));
    }

    #[test]
    fn ties_go_to_first_vendor_scanned() {
        let lines = vec![indent(1, 1, "Gate valve", "2")];
        let vendors = vec![
            vendor(9, "Nine", vec![offer_line(1, 1, "500", "0", Some(5))]),
            vendor(3, "Three", vec![offer_line(2, 1, "500", "0", Some(5))]),
        ];
        let row = &build_comparison(&lines, &vendors)[0];
        assert_eq!(row.lowest_cost_vendor, Some(9));
        assert_eq!(row.lowest_lead_time_vendor, Some(9));
        assert_eq!(row.vendors.keys().copied().collect::<Vec<_>>(), vec![9, 3]);
    }

    #[test]
    fn missing_quotes_are_absent_not_zero() {
        let lines = vec![indent(1, 1, "Gate valve", "2"), indent(2, 2, "Globe valve", "1")];
        let vendors = vec![
            vendor(1, "A", vec![offer_line(11, 1, "500", "0", None)]),
            vendor(2, "B", vec![]),
        ];
        let rows = build_comparison(&lines, &vendors);
        assert_eq!(rows[0].vendors.len(), 1);
        assert!(!rows[0].vendors.contains_key(&2));
        assert!(rows[1].vendors.is_empty());
        assert_eq!(rows[1].lowest_cost_vendor, None);
        assert_eq!(rows[1].lowest_lead_time_vendor, None);
    }

    #[test]
    fn null_lead_time_is_excluded() {
        let lines = vec![indent(1, 1, "Gate valve", "1")];
        let vendors = vec![
            vendor(1, "A", vec![offer_line(11, 1, "400", "0", None)]),
            vendor(2, "B", vec![offer_line(12, 1, "450", "0", Some(21))]),
        ];
        let row = &build_comparison(&lines, &vendors)[0];
        assert_eq!(row.lowest_cost_vendor, Some(1));
        assert_eq!(row.lowest_lead_time_vendor, Some(2));
    }

    #[test]
    fn offers_without_price_are_not_lowest() {
        let lines = vec![indent(1, 1, "Gate valve", "1")];
        let mut unpriced = offer_line(11, 1, "1", "0", Some(1));
        unpriced.unit_price = None;
        let vendors = vec![
            vendor(1, "A", vec![unpriced]),
            vendor(2, "B", vec![offer_line(12, 1, "450", "0", None)]),
        ];
        let row = &build_comparison(&lines, &vendors)[0];
        assert_eq!(row.vendors[&1].landed_cost, None);
        assert_eq!(row.lowest_cost_vendor, Some(2));
    }

    #[test]
    fn rows_follow_indent_order_and_repeat_identically() {
        let lines = vec![indent(7, 3, "C item", "1"), indent(5, 1, "A item", "1")];
        let vendors = vec![vendor(1, "A", vec![offer_line(1, 5, "10", "0", None)])];
        let first = build_comparison(&lines, &vendors);
        assert_eq!(first.iter().map(|r| r.line_id).collect::<Vec<_>>(), vec![7, 5]);
        assert_eq!(first, build_comparison(&lines, &vendors));
    }

    #[test]
    fn selections_and_summary() {
        let lines = vec![indent(1, 1, "Gate valve", "1"), indent(2, 2, "Globe valve", "1")];
        let vendors = vec![
            vendor(1, "A", vec![offer_line(11, 1, "400", "0", None)]),
            vendor(2, "B", vec![offer_line(12, 1, "350", "0", None)]),
        ];
        let rows = build_comparison(&lines, &vendors);

        let selections = default_selections(&rows);
        assert_eq!(selections.get(&1), Some(&12));
        assert_eq!(selections.get(&2), None);

        let summary = summarize(&rows);
        assert_eq!(summary.total_lines, 2);
        assert_eq!(summary.vendors_compared, 2);
        assert_eq!(summary.lines_with_offers, 1);
        assert_eq!(summary.lines_without_offers, 1);
    }

    #[test]
    fn vendor_summary_counts_quotes_wins_and_value() {
        let lines = vec![
            indent(1, 1, "Gate valve", "1"),
            indent(2, 2, "Globe valve", "2"),
            indent(3, 3, "Check valve", "1"),
        ];
        let vendors = vec![
            vendor(
                1,
                "A",
                vec![offer_line(11, 1, "100", "0", None), offer_line(12, 2, "50", "0", None)],
            ),
            // 第1行与A同价, 最低价归先出现的A
            vendor(2, "B", vec![offer_line(21, 1, "100", "0", None)]),
        ];
        let rows = build_comparison(&lines, &vendors);
        let summary = vendor_summary(&rows);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].vendor_id, 1);
        assert_eq!(summary[0].items_quoted, 2);
        assert_eq!(summary[0].best_price_count, 2);
        assert_eq!(summary[0].total_landed_value, d("236"));
        assert_eq!(summary[1].vendor_name, "B");
        assert_eq!(summary[1].items_quoted, 1);
        assert_eq!(summary[1].best_price_count, 0);
        assert_eq!(summary[1].total_landed_value, d("118"));
    }

    #[test]
    fn recommendations_cover_every_line() {
        let lines = vec![indent(1, 1, "Gate valve", "1"), indent(2, 2, "Globe valve", "1")];
        let mut cheap = offer_line(12, 1, "350", "0", Some(14));
        cheap.brand = Some("L&T".to_string());
        let vendors = vec![
            vendor(1, "A", vec![offer_line(11, 1, "400", "0", Some(7))]),
            vendor(2, "B", vec![cheap]),
        ];
        let recs = recommendations(&build_comparison(&lines, &vendors));

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].vendor_id, Some(2));
        assert_eq!(recs[0].vendor_name.as_deref(), Some("B"));
        assert_eq!(recs[0].quote_line_id, Some(12));
        assert_eq!(recs[0].landed_cost, Some(d("413")));
        assert_eq!(recs[0].lead_time_days, Some(14));
        assert_eq!(recs[0].brand.as_deref(), Some("L&T"));

        assert_eq!(recs[1].line_id, 2);
        assert_eq!(recs[1].vendor_id, None);
        assert_eq!(recs[1].landed_cost, None);
    }
}
