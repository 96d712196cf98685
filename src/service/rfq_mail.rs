use crate::models::IndentLine;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

const SEPARATOR: &str = "------------------------------------------------------------";

/// 请供应商在报价中注明的内容
const REQUESTED_FIELDS: [&str; 7] = [
    "Unit Price (excluding GST)",
    "GST percentage",
    "Freight charges (if applicable)",
    "Delivery lead time",
    "Payment terms",
    "Brand/Make offered",
    "Country of origin",
];

/// 询价单抬头信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RfqInfo {
    pub rfq_number: String,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RfqEmail {
    pub subject: String,
    pub body: String,
}

/// 生成询价邀请邮件正文
pub fn draft_rfq_email(rfq: &RfqInfo, vendor_name: &str, lines: &[IndentLine]) -> RfqEmail {
    let subject = format!("RFQ {}: {}", rfq.rfq_number, rfq.title);

    let due = rfq
        .due_date
        .map(|d| format!("Response Due: {}\n", d.format("%d/%m/%Y")))
        .unwrap_or_default();
    let items = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            format!(
                "  {}. {}\n     Qty: {} {}\n",
                idx + 1,
                line.raw_description,
                line.quantity,
                line.unit
            )
        })
        .collect::<String>();
    let requested = REQUESTED_FIELDS
        .iter()
        .map(|field| format!("• {}\n", field))
        .collect::<String>();
    let notes = rfq
        .notes
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .map(|n| format!("\nAdditional Notes:\n{}\n", n))
        .unwrap_or_default();

    let body = format!(
        "Dear {vendor},

We are pleased to invite you to submit your quotation for the following items.

{sep}
RFQ Reference: {number}
Title: {title}
{due}{sep}

ITEMS REQUIRED:

{items}
{sep}

Please provide your quotation with:
{requested}{notes}
Kindly submit your response by the due date.

Best regards,
Purchase Department
",
        vendor = vendor_name,
        sep = SEPARATOR,
        number = rfq.rfq_number,
        title = rfq.title,
    );

    RfqEmail { subject, body }
}

/// 待发送邮件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    /// 仅记录, 未实际投递
    Logged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxReceipt {
    pub message_id: String,
    pub status: DeliveryStatus,
    pub recorded_at: DateTime<Utc>,
}

/// 已记录的邮件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggedEmail {
    pub receipt: OutboxReceipt,
    pub email: OutboundEmail,
}

/// 邮件出口 (显式注入, 不使用全局状态)
pub trait Outbox: Send + Sync {
    fn record(&self, email: OutboundEmail) -> OutboxReceipt;
}

fn next_receipt(seq: &AtomicU64) -> OutboxReceipt {
    let recorded_at = Utc::now();
    let n = seq.fetch_add(1, Ordering::Relaxed);
    OutboxReceipt {
        message_id: format!("email_{}_{}", recorded_at.timestamp_millis(), n),
        status: DeliveryStatus::Logged,
        recorded_at,
    }
}

/// 写入日志的出口
#[derive(Debug, Default)]
pub struct LoggingOutbox {
    seq: AtomicU64,
}

impl Outbox for LoggingOutbox {
    fn record(&self, email: OutboundEmail) -> OutboxReceipt {
        let receipt = next_receipt(&self.seq);
        tracing::info!(
            message_id = %receipt.message_id,
            to = %email.to,
            subject = %email.subject,
            "邮件已记录 (未投递)"
        );
        tracing::debug!("邮件正文:\n{}", email.body);
        receipt
    }
}

/// 内存出口, 供测试与调试查看
#[derive(Debug, Default)]
pub struct MemoryOutbox {
    seq: AtomicU64,
    entries: Mutex<Vec<LoggedEmail>>,
}

impl MemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// 最近 `limit` 封
    pub fn recent(&self, limit: usize) -> Vec<LoggedEmail> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let start = entries.len().saturating_sub(limit);
        entries[start..].to_vec()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl Outbox for MemoryOutbox {
    fn record(&self, email: OutboundEmail) -> OutboxReceipt {
        let receipt = next_receipt(&self.seq);
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(LoggedEmail {
                receipt: receipt.clone(),
                email,
            });
        receipt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;

    fn rfq() -> RfqInfo {
        RfqInfo {
            rfq_number: "RFQ-2610-AB12".to_string(),
            title: "Bearings for conveyor".to_string(),
            due_date: NaiveDate::from_ymd_opt(2026, 11, 2),
            notes: Some("Deliver to Plant 2".to_string()),
        }
    }

    fn line(n: u32, text: &str, qty: i64) -> IndentLine {
        IndentLine {
            id: n as i64,
            line_number: n,
            raw_description: text.to_string(),
            quantity: BigDecimal::from(qty),
            unit: "NOS".to_string(),
            normalized_item: None,
        }
    }

    #[test]
    fn draft_lists_items_and_requested_fields() {
        let lines = vec![line(1, "SKF 6205-2RS Bearing", 10), line(2, "Gate valve 2 inch", 4)];
        let email = draft_rfq_email(&rfq(), "Acme Traders", &lines);

        assert_eq!(email.subject, "RFQ RFQ-2610-AB12: Bearings for conveyor");
        assert!(email.body.starts_with("Dear Acme Traders,"));
        assert!(email.body.contains("  1. SKF 6205-2RS Bearing\n     Qty: 10 NOS"));
        assert!(email.body.contains("  2. Gate valve 2 inch"));
        assert!(email.body.contains("Response Due: 02/11/2026"));
        assert!(email.body.contains("• GST percentage"));
        assert!(email.body.contains("Additional Notes:\nDeliver to Plant 2"));
    }

    #[test]
    fn optional_sections_are_omitted() {
        let mut info = rfq();
        info.due_date = None;
        info.notes = None;
        let email = draft_rfq_email(&info, "Acme", &[]);
        assert!(!email.body.contains("Response Due"));
        assert!(!email.body.contains("Additional Notes"));
    }

    #[test]
    fn memory_outbox_keeps_recent_entries() {
        let outbox = MemoryOutbox::new();
        for i in 0..3 {
            let receipt = outbox.record(OutboundEmail {
                to: format!("vendor{}@example.com", i),
                subject: "RFQ".to_string(),
                body: String::new(),
            });
            assert_eq!(receipt.status, DeliveryStatus::Logged);
        }

        let recent = outbox.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[1].email.to, "vendor2@example.com");
        assert_ne!(recent[0].receipt.message_id, recent[1].receipt.message_id);

        outbox.clear();
        assert!(outbox.recent(10).is_empty());
    }
}
