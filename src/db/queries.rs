use crate::db::rows::{IndentLineRow, LatestQuoteRow, QuoteLineRow, RfqRow, VendorRow};
use crate::models::{IndentLine, IndentLineDraft, NormalizedItem, QuoteLine, VendorQuotes};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;

/// 批量插入分块行数 (14 列 × 1000 行, 低于 Postgres 65535 个绑定参数上限)
const INSERT_CHUNK_ROWS: usize = 1000;

const INDENT_LINE_COLUMNS: &str = "id, indent_id, line_number, raw_description, quantity, unit, \
     category, clean_description, attributes, confidence";

/// 查询请购单明细 (按行号)
pub async fn list_indent_lines(
    pool: &PgPool,
    indent_id: i64,
) -> Result<Vec<IndentLine>, sqlx::Error> {
    let rows = sqlx::query_as::<_, IndentLineRow>(&format!(
        "SELECT {} FROM indent_lines WHERE indent_id = $1 ORDER BY line_number",
        INDENT_LINE_COLUMNS
    ))
    .bind(indent_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(IndentLine::from).collect())
}

/// 查询单条请购明细
pub async fn get_indent_line(
    pool: &PgPool,
    line_id: i64,
) -> Result<Option<IndentLine>, sqlx::Error> {
    let row = sqlx::query_as::<_, IndentLineRow>(&format!(
        "SELECT {} FROM indent_lines WHERE id = $1",
        INDENT_LINE_COLUMNS
    ))
    .bind(line_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(IndentLine::from))
}

/// 当前最大行号, 无明细时为 0
pub async fn max_line_number(pool: &PgPool, indent_id: i64) -> Result<i32, sqlx::Error> {
    let max: Option<i32> =
        sqlx::query_scalar("SELECT max(line_number) FROM indent_lines WHERE indent_id = $1")
            .bind(indent_id)
            .fetch_one(pool)
            .await?;
    Ok(max.unwrap_or(0))
}

/// 批量插入请购明细 (每1000条分块, 同一事务), 返回带ID的明细 (按行号排序)
pub async fn insert_indent_lines(
    pool: &PgPool,
    indent_id: i64,
    drafts: Vec<IndentLineDraft>,
) -> Result<Vec<IndentLine>, sqlx::Error> {
    if drafts.is_empty() {
        return Ok(Vec::new());
    }

    let mut tx = pool.begin().await?;
    let mut ids: HashMap<i32, i64> = HashMap::with_capacity(drafts.len());
    for chunk in drafts.chunks(INSERT_CHUNK_ROWS) {
        let mut query_builder = sqlx::QueryBuilder::new(
            "INSERT INTO indent_lines (
                indent_id, line_number, raw_description, quantity, unit,
                category, clean_description, attributes, confidence
            ) ",
        );

        query_builder.push_values(chunk, |mut b, draft| {
            let item = draft.normalized_item.as_ref();
            b.push_bind(indent_id)
                .push_bind(draft.line_number as i32)
                .push_bind(&draft.raw_description)
                .push_bind(draft.quantity.clone())
                .push_bind(&draft.unit)
                .push_bind(item.map(|n| n.category.as_str()))
                .push_bind(item.map(|n| n.clean_description.clone()))
                .push_bind(item.map(|n| Json(n.attributes.clone())))
                .push_bind(item.map(|n| n.confidence));
        });
        query_builder.push(" RETURNING id, line_number");

        let inserted: Vec<(i64, i32)> = query_builder.build_query_as().fetch_all(&mut *tx).await?;
        ids.extend(inserted.into_iter().map(|(id, n)| (n, id)));
    }
    tx.commit().await?;

    tracing::info!("✓ 插入请购明细 {} 行 (indent {})", ids.len(), indent_id);

    let mut lines: Vec<IndentLine> = drafts
        .into_iter()
        .filter_map(|draft| {
            let id = *ids.get(&(draft.line_number as i32))?;
            Some(IndentLine::from_draft(id, draft))
        })
        .collect();
    lines.sort_by_key(|l| l.line_number);
    Ok(lines)
}

/// 整体替换标准化结果 (后写覆盖)
pub async fn update_normalized_item(
    pool: &PgPool,
    line_id: i64,
    item: &NormalizedItem,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE indent_lines
        SET category = $2, clean_description = $3, attributes = $4, confidence = $5
        WHERE id = $1
        "#,
    )
    .bind(line_id)
    .bind(item.category.as_str())
    .bind(&item.clean_description)
    .bind(Json(&item.attributes))
    .bind(item.confidence)
    .execute(pool)
    .await?;
    Ok(())
}

/// 查询询价单
pub async fn get_rfq(pool: &PgPool, rfq_id: i64) -> Result<Option<RfqRow>, sqlx::Error> {
    sqlx::query_as::<_, RfqRow>(
        r#"
        SELECT id, indent_id, rfq_number, title, due_date, notes
        FROM rfqs
        WHERE id = $1
        "#,
    )
    .bind(rfq_id)
    .fetch_optional(pool)
    .await
}

/// 查询供应商
pub async fn get_vendor(pool: &PgPool, vendor_id: i64) -> Result<Option<VendorRow>, sqlx::Error> {
    sqlx::query_as::<_, VendorRow>("SELECT id, name, email FROM vendors WHERE id = $1")
        .bind(vendor_id)
        .fetch_optional(pool)
        .await
}

/// 新建报价单及其明细 (同一事务: 明细写入失败时不留下空报价单)
///
/// 重新上传即新建, 不修改旧报价。
pub async fn store_quote(
    pool: &PgPool,
    rfq_id: i64,
    vendor_id: i64,
    lines: &[QuoteLine],
) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let quote_id = insert_quote(&mut *tx, rfq_id, vendor_id).await?;
    insert_quote_lines(&mut *tx, quote_id, lines).await?;
    tx.commit().await?;
    Ok(quote_id)
}

async fn insert_quote(
    conn: &mut PgConnection,
    rfq_id: i64,
    vendor_id: i64,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        INSERT INTO quotes (rfq_id, vendor_id, created_at)
        VALUES ($1, $2, now())
        RETURNING id
        "#,
    )
    .bind(rfq_id)
    .bind(vendor_id)
    .fetch_one(&mut *conn)
    .await
}

/// 批量插入报价明细 (每1000条分块)
async fn insert_quote_lines(
    conn: &mut PgConnection,
    quote_id: i64,
    lines: &[QuoteLine],
) -> Result<(), sqlx::Error> {
    for chunk in lines.chunks(INSERT_CHUNK_ROWS) {
        let mut query_builder = sqlx::QueryBuilder::new(
            "INSERT INTO quote_lines (
                quote_id, line_number, description, quantity, unit,
                unit_price, gst_percent, freight, lead_time_days,
                payment_terms, brand, origin, matched_indent_line_id, match_score
            ) ",
        );

        query_builder.push_values(chunk, |mut b, line| {
            b.push_bind(quote_id)
                .push_bind(line.line_number as i32)
                .push_bind(&line.description)
                .push_bind(line.quantity.clone())
                .push_bind(&line.unit)
                .push_bind(line.unit_price.clone())
                .push_bind(line.gst_percent.clone())
                .push_bind(line.freight.clone())
                .push_bind(line.lead_time_days)
                .push_bind(&line.payment_terms)
                .push_bind(&line.brand)
                .push_bind(&line.origin)
                .push_bind(line.matched_indent_line_id)
                .push_bind(line.match_score);
        });

        let result = query_builder.build().execute(&mut *conn).await?;
        tracing::debug!("插入报价明细 {} 行 (quote {})", result.rows_affected(), quote_id);
    }
    Ok(())
}

/// 请购单下各供应商最新一次报价的明细 (按供应商ID排序, 保证对比列顺序稳定)
pub async fn latest_vendor_quotes(
    pool: &PgPool,
    indent_id: i64,
) -> Result<Vec<VendorQuotes>, sqlx::Error> {
    let latest = sqlx::query_as::<_, LatestQuoteRow>(
        r#"
        SELECT DISTINCT ON (q.vendor_id)
               q.id as quote_id,
               q.vendor_id,
               v.name as vendor_name
        FROM quotes q
        INNER JOIN rfqs r ON r.id = q.rfq_id
        INNER JOIN vendors v ON v.id = q.vendor_id
        WHERE r.indent_id = $1
        ORDER BY q.vendor_id, q.created_at DESC, q.id DESC
        "#,
    )
    .bind(indent_id)
    .fetch_all(pool)
    .await?;

    if latest.is_empty() {
        return Ok(Vec::new());
    }

    let quote_ids: Vec<i64> = latest.iter().map(|q| q.quote_id).collect();
    let rows = sqlx::query_as::<_, QuoteLineRow>(
        r#"
        SELECT id, quote_id, line_number, description, quantity, unit,
               unit_price, gst_percent, freight, lead_time_days,
               payment_terms, brand, origin, matched_indent_line_id, match_score
        FROM quote_lines
        WHERE quote_id = ANY($1)
        ORDER BY quote_id, line_number
        "#,
    )
    .bind(&quote_ids)
    .fetch_all(pool)
    .await?;

    let mut by_quote: HashMap<i64, Vec<QuoteLine>> = HashMap::new();
    for row in rows {
        by_quote.entry(row.quote_id).or_default().push(QuoteLine::from(row));
    }

    Ok(latest
        .into_iter()
        .map(|q| VendorQuotes {
            vendor_id: q.vendor_id,
            vendor_name: q.vendor_name,
            lines: by_quote.remove(&q.quote_id).unwrap_or_default(),
        })
        .collect())
}
