use crate::config::MatchingConfig;
use crate::db::queries;
use crate::error::{AppError, AppResult};
use crate::models::{ComparisonRow, IndentLine, QuoteIngestStats, QuoteLine};
use crate::service::comparison::build_comparison;
use crate::service::engine::{draft_indent_lines, QuoteEngine};
use crate::service::export::{export_comparison_files, ComparisonExport};
use crate::service::matcher::assign_matches_by;
use crate::service::rfq_mail::{draft_rfq_email, OutboundEmail, Outbox, OutboxReceipt, RfqInfo};
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;

/// 采购流程服务: 在存储层之上编排标准化、报价匹配与对比
pub struct ProcurementService {
    pool: PgPool,
    engine: Arc<dyn QuoteEngine>,
    outbox: Arc<dyn Outbox>,
    matching: MatchingConfig,
}

impl ProcurementService {
    pub fn new(
        pool: PgPool,
        engine: Arc<dyn QuoteEngine>,
        outbox: Arc<dyn Outbox>,
        matching: MatchingConfig,
    ) -> Self {
        Self {
            pool,
            engine,
            outbox,
            matching,
        }
    }

    /// 导入请购文本: 分段 (接续已有行号) -> 标准化 -> 入库
    pub async fn ingest_indent_text(&self, indent_id: i64, text: &str) -> AppResult<Vec<IndentLine>> {
        let next = queries::max_line_number(&self.pool, indent_id).await?.max(0) as u32 + 1;

        let mut raw_lines = self.engine.segment(text);
        for (offset, raw) in raw_lines.iter_mut().enumerate() {
            raw.line_number = next + offset as u32;
        }
        if raw_lines.is_empty() {
            tracing::info!("Indent {}: 文本中无有效明细", indent_id);
            return Ok(Vec::new());
        }

        let drafts = draft_indent_lines(self.engine.as_ref(), raw_lines);
        let lines = queries::insert_indent_lines(&self.pool, indent_id, drafts).await?;
        tracing::info!(
            "Indent {}: 导入 {} 行, 行号 {}..",
            indent_id,
            lines.len(),
            next
        );
        Ok(lines)
    }

    /// 重新标准化单条明细 (从 raw_description 重新计算, 整体替换)
    pub async fn renormalize_line(&self, line_id: i64) -> AppResult<IndentLine> {
        let Some(mut line) = queries::get_indent_line(&self.pool, line_id).await? else {
            return Err(AppError::NotFound(format!("indent line {}", line_id)));
        };

        let item = self.engine.normalize(&line.raw_description);
        queries::update_normalized_item(&self.pool, line_id, &item).await?;
        tracing::debug!(
            "Indent line {}: {} ({:.2})",
            line_id,
            item.category,
            item.confidence
        );
        line.normalized_item = Some(item);
        Ok(line)
    }

    /// 导入供应商报价: 解析 -> 与询价单对应的请购明细匹配 -> 新建报价单入库
    pub async fn ingest_quote(
        &self,
        rfq_id: i64,
        vendor_id: i64,
        text: &str,
    ) -> AppResult<QuoteIngestStats> {
        let rfq = queries::get_rfq(&self.pool, rfq_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("rfq {}", rfq_id)))?;
        if queries::get_vendor(&self.pool, vendor_id).await?.is_none() {
            return Err(AppError::NotFound(format!("vendor {}", vendor_id)));
        }

        let indent_lines = queries::list_indent_lines(&self.pool, rfq.indent_id).await?;
        let mut quote_lines = self.engine.parse_quote_text(text);

        let engine = self.engine.as_ref();
        let score = |q: &QuoteLine, i: &IndentLine| engine.match_score(q, i);
        let matched = assign_matches_by(
            &mut quote_lines,
            &indent_lines,
            self.matching.min_score,
            &score,
        );

        let quote_id = queries::store_quote(&self.pool, rfq_id, vendor_id, &quote_lines).await?;

        let stats = QuoteIngestStats {
            quote_id,
            rfq_id,
            vendor_id,
            parsed_lines: quote_lines.len(),
            matched_lines: matched,
            unmatched_lines: quote_lines.len() - matched,
        };
        tracing::info!(
            "RFQ {} vendor {}: 报价 {} 行, 已匹配 {}, 未匹配 {}",
            rfq_id,
            vendor_id,
            stats.parsed_lines,
            stats.matched_lines,
            stats.unmatched_lines
        );
        Ok(stats)
    }

    /// 构建请购单对比矩阵 (每次请求重新计算)
    pub async fn compare_indent(&self, indent_id: i64) -> AppResult<Vec<ComparisonRow>> {
        let indent_lines = queries::list_indent_lines(&self.pool, indent_id).await?;
        if indent_lines.is_empty() {
            tracing::warn!("Indent {} has no lines, empty comparison", indent_id);
            return Ok(Vec::new());
        }

        let vendors = queries::latest_vendor_quotes(&self.pool, indent_id).await?;
        tracing::info!(
            "Indent {}: 对比 {} 行, {} 个供应商",
            indent_id,
            indent_lines.len(),
            vendors.len()
        );
        Ok(build_comparison(&indent_lines, &vendors))
    }

    /// 导出对比明细、供应商汇总与推荐选择到导出目录 (文件写入在阻塞线程池执行)
    pub async fn export_comparison(&self, indent_id: i64, dir: &Path) -> AppResult<ComparisonExport> {
        let rows = self.compare_indent(indent_id).await?;
        let dir = dir.to_path_buf();
        let stem = format!(
            "indent_{}_{}",
            indent_id,
            chrono::Utc::now().format("%Y%m%d%H%M%S")
        );
        tokio::task::spawn_blocking(move || export_comparison_files(&rows, &dir, &stem)).await?
    }

    /// 向供应商发送询价邀请 (仅记录到出口, 不实际投递)
    pub async fn send_rfq(&self, rfq_id: i64, vendor_ids: &[i64]) -> AppResult<Vec<OutboxReceipt>> {
        let rfq = queries::get_rfq(&self.pool, rfq_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("rfq {}", rfq_id)))?;
        let lines = queries::list_indent_lines(&self.pool, rfq.indent_id).await?;
        let info = RfqInfo {
            rfq_number: rfq.rfq_number,
            title: rfq.title,
            due_date: rfq.due_date,
            notes: rfq.notes,
        };

        let mut receipts = Vec::with_capacity(vendor_ids.len());
        for &vendor_id in vendor_ids {
            let Some(vendor) = queries::get_vendor(&self.pool, vendor_id).await? else {
                tracing::warn!("Vendor {} not found, skipping", vendor_id);
                continue;
            };
            let draft = draft_rfq_email(&info, &vendor.name, &lines);
            receipts.push(self.outbox.record(OutboundEmail {
                to: vendor.email,
                subject: draft.subject,
                body: draft.body,
            }));
        }

        tracing::info!("RFQ {}: 已记录 {} 封询价邮件", rfq_id, receipts.len());
        Ok(receipts)
    }
}
