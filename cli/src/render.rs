//! Plain-text rendering.

use mosi_cart::{BadgeLabel, BulkRemoveReport, CartViewState, PaymentSummary, format_won};

pub fn cart(state: &CartViewState) -> String {
    if state.lines.is_empty() {
        return "Your cart is empty.".to_string();
    }

    let mut out: Vec<String> = state
        .lines
        .iter()
        .map(|line| {
            let key = line.key();
            let label = key.to_string();
            let mark = if state.selection.contains(&key) {
                "[x]"
            } else {
                "[ ]"
            };
            let name = if line.available {
                line.product_name.clone()
            } else {
                format!("{} (unavailable)", line.product_name)
            };
            format!(
                "{mark} {label:<12} {name:<32} {:>12} x {:<3} {:>12}",
                format_won(line.unit_price),
                line.quantity,
                format_won(line.line_total()),
            )
        })
        .collect();

    let summary = state.summary();
    out.push(format!(
        "Selected {} of {} available, subtotal {}",
        summary.selected_count,
        summary.available_count,
        format_won(summary.selected_subtotal),
    ));
    out.join("\n")
}

pub fn count(count: u64) -> String {
    match BadgeLabel::from_count(count) {
        BadgeLabel::Hidden => "Cart is empty (0 items)".to_string(),
        label => format!("{count} items in cart (badge {label})"),
    }
}

/// One row per key whose removal failed.
pub fn bulk_failures(report: &BulkRemoveReport) -> Vec<String> {
    report
        .failures()
        .map(|(key, failure)| format!("  failed {key}: {failure}"))
        .collect()
}

pub fn payment_summary(summary: &PaymentSummary) -> String {
    let mut out = vec![format!("Order summary ({} items)", summary.item_count)];
    out.extend(summary.rows.iter().map(|row| {
        format!(
            "  {} [{}] x{} {:>12}",
            row.product_name,
            row.option_type,
            row.quantity,
            format_won(row.amount)
        )
    }));
    out.push(format!("Total: {}", format_won(summary.total_amount)));
    out.join("\n")
}
