use crate::domain::order::OrderSummary;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct SummaryRow<'a> {
    order_id: u64,
    status: String,
    total_amount: String,
    item_id: u64,
    product_name: &'a str,
    attributes: &'a str,
    unit_cost: String,
    quantity: u32,
    subtotal: String,
}

/// Writes order summaries as CSV, one row per line item.
///
/// Amounts are always printed with two decimals.
pub struct OrderWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OrderWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_summary(&mut self, summary: &OrderSummary) -> Result<()> {
        let order = &summary.order;
        for item in &summary.items {
            self.writer.serialize(SummaryRow {
                order_id: order.order_id,
                status: order.status.to_string(),
                total_amount: order.total_amount.to_string(),
                item_id: item.item_id,
                product_name: &item.product_name,
                attributes: &item.attributes,
                unit_cost: item.unit_cost.to_string(),
                quantity: item.quantity.value(),
                subtotal: item.subtotal.to_string(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
