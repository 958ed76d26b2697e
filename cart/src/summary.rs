//! Payment summary shown by the order page for the handed-off lines.

use mosi_api_client::CartLine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRow {
    pub product_name: String,
    pub option_type: String,
    pub quantity: u32,
    pub amount: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentSummary {
    /// Sum of quantities across rows.
    pub item_count: u64,
    pub total_amount: i64,
    pub rows: Vec<PaymentRow>,
}

impl PaymentSummary {
    pub fn from_lines(lines: &[CartLine]) -> Self {
        let rows: Vec<PaymentRow> = lines
            .iter()
            .map(|line| PaymentRow {
                product_name: line.product_name.clone(),
                option_type: line.option_type.clone(),
                quantity: line.quantity,
                amount: line.line_total(),
            })
            .collect();

        Self {
            item_count: rows
                .iter()
                .map(|row| u64::from(row.quantity))
                .fold(0, u64::saturating_add),
            total_amount: rows.iter().map(|row| row.amount).fold(0, i64::saturating_add),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// `12000` → `"12,000원"`.
pub fn format_won(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}{grouped}원")
}
