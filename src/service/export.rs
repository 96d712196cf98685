use crate::error::AppResult;
use crate::models::ComparisonRow;
use crate::service::comparison::{recommendations, vendor_summary, vendors_in};
use bigdecimal::BigDecimal;
use std::fs::File;
use std::io::Write;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// 每个供应商占用的列
const VENDOR_COLUMNS: [&str; 7] = [
    "Unit Price",
    "GST %",
    "Freight",
    "Landed Cost",
    "Lead Time",
    "Payment Terms",
    "Brand",
];

const NO_QUOTE: &str = "No Quote";
const NOT_AVAILABLE: &str = "N/A";

/// 将 Option<BigDecimal> 转换为 CSV 字符串
fn option_to_csv(val: &Option<BigDecimal>) -> String {
    val.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// 导出对比明细表 (每条请购明细一行, 每个供应商七列, 末尾为最低成本供应商与金额)
///
/// 未报价的供应商列留空。返回写出的数据行数。
pub fn write_comparison_csv<W: Write>(rows: &[ComparisonRow], out: W) -> AppResult<usize> {
    let vendors = vendors_in(rows);
    let mut writer = csv::Writer::from_writer(out);

    let mut header: Vec<String> = ["Line #", "Description", "Qty", "Unit"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for name in vendors.values() {
        header.extend(VENDOR_COLUMNS.iter().map(|col| format!("{} - {}", name, col)));
    }
    header.push("Best Vendor (Cost)".to_string());
    header.push("Lowest Cost".to_string());
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            row.line_number.to_string(),
            row.description.clone(),
            row.quantity.to_string(),
            row.unit.clone(),
        ];

        for vendor_id in vendors.keys() {
            match row.vendors.get(vendor_id) {
                Some(offer) => {
                    record.push(option_to_csv(&offer.unit_price));
                    record.push(offer.gst_percent.to_string());
                    record.push(offer.freight.to_string());
                    record.push(option_to_csv(&offer.landed_cost));
                    record.push(
                        offer
                            .lead_time_days
                            .map(|d| format!("{} days", d))
                            .unwrap_or_default(),
                    );
                    record.push(offer.payment_terms.clone().unwrap_or_default());
                    record.push(offer.brand.clone().unwrap_or_default());
                }
                None => record.extend(std::iter::repeat(String::new()).take(VENDOR_COLUMNS.len())),
            }
        }

        let best = row
            .lowest_cost_vendor
            .and_then(|id| row.vendors.get(&id));
        record.push(best.map(|o| o.vendor_name.clone()).unwrap_or_default());
        record.push(best.map(|o| option_to_csv(&o.landed_cost)).unwrap_or_default());

        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(rows.len())
}

/// 供应商汇总表: 供应商, 报价条数, 最低价条数, 到岸总额 (两位小数)
pub fn write_vendor_summary_csv<W: Write>(rows: &[ComparisonRow], out: W) -> AppResult<usize> {
    let summary = vendor_summary(rows);
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["Vendor Name", "Items Quoted", "Best Price Count", "Total Landed Value"])?;

    for vendor in &summary {
        writer.write_record([
            vendor.vendor_name.clone(),
            vendor.items_quoted.to_string(),
            vendor.best_price_count.to_string(),
            vendor.total_landed_value.round(2).with_scale(2).to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(summary.len())
}

/// 推荐选择表: 每条请购明细的最低成本供应商, 无报价时为 "No Quote"
pub fn write_recommendations_csv<W: Write>(rows: &[ComparisonRow], out: W) -> AppResult<usize> {
    let recs = recommendations(rows);
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "Line #",
        "Description",
        "Qty",
        "Recommended Vendor",
        "Landed Cost",
        "Lead Time",
        "Brand",
    ])?;

    let na = || NOT_AVAILABLE.to_string();
    for rec in &recs {
        writer.write_record([
            rec.line_number.to_string(),
            rec.description.clone(),
            format!("{} {}", rec.quantity, rec.unit),
            rec.vendor_name.clone().unwrap_or_else(|| NO_QUOTE.to_string()),
            rec.landed_cost.as_ref().map(|c| c.to_string()).unwrap_or_else(na),
            rec.lead_time_days.map(|d| format!("{} days", d)).unwrap_or_else(na),
            rec.brand.clone().unwrap_or_else(na),
        ])?;
    }

    writer.flush()?;
    Ok(recs.len())
}

/// 导出对比明细到 CSV 文件
pub fn export_comparison_csv(rows: &[ComparisonRow], output_path: &Path) -> AppResult<usize> {
    let file = File::create(output_path)?;
    let written = write_comparison_csv(rows, file)?;
    tracing::info!("对比表已导出: {:?}, {} 行", output_path, written);
    Ok(written)
}

/// 一次导出的文件
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonExport {
    pub rows_written: usize,
    pub files: Vec<PathBuf>,
}

/// 导出对比明细、供应商汇总与推荐选择三张表到 `dir`, 文件名以 `stem` 为前缀
pub fn export_comparison_files(
    rows: &[ComparisonRow],
    dir: &Path,
    stem: &str,
) -> AppResult<ComparisonExport> {
    std::fs::create_dir_all(dir)?;

    let comparison = dir.join(format!("{}_comparison.csv", stem));
    let rows_written = export_comparison_csv(rows, &comparison)?;

    let vendors = dir.join(format!("{}_vendors.csv", stem));
    write_vendor_summary_csv(rows, File::create(&vendors)?)?;

    let recommended = dir.join(format!("{}_recommended.csv", stem));
    write_recommendations_csv(rows, File::create(&recommended)?)?;

    tracing::info!("对比导出完成: {:?}", dir);
    Ok(ComparisonExport {
        rows_written,
        files: vec![comparison, vendors, recommended],
    })
}
