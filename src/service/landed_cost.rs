use bigdecimal::BigDecimal;

/// 到岸成本 = 单价 × 数量 × (1 + GST/100) + 运费
///
/// 不校验取值范围, 负数/零数量须由调用方在边界处拒绝。
pub fn landed_cost(
    unit_price: &BigDecimal,
    quantity: &BigDecimal,
    gst_percent: &BigDecimal,
    freight: &BigDecimal,
) -> BigDecimal {
    let base = unit_price * quantity;
    let gst_amount = &base * gst_percent / BigDecimal::from(100);
    base + gst_amount + freight
}
