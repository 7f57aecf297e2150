//! Template narration used when the AI backend is unavailable

use crate::models::SpendingSummary;
use crate::money::MoneyFormatter;

/// Text for a period with no expenses
pub const NO_EXPENSES_MESSAGE: &str =
    "No expenses recorded this month. Start tracking your spending to get personalized insights!";

/// Share of total spend above which the top category gets its own tip
const DOMINANT_SHARE: f64 = 40.0;

/// Transaction count above which consolidating purchases is suggested
const BUSY_MONTH_TRANSACTIONS: usize = 20;

fn share(amount: f64, total: f64) -> f64 {
    if total > 0.0 {
        amount / total * 100.0
    } else {
        0.0
    }
}

/// Deterministic narrative for a period's spending
pub fn narrate(summary: &SpendingSummary, fmt: &MoneyFormatter) -> String {
    if summary.transaction_count == 0 {
        return NO_EXPENSES_MESSAGE.to_string();
    }

    let ranked = summary.ranked_categories();
    let mut text = format!(
        "This month, you spent {} across {} transactions. ",
        fmt.format(summary.total),
        summary.transaction_count
    );

    let Some(&(top, top_amount)) = ranked.first() else {
        return text.trim_end().to_string();
    };
    let top_share = share(top_amount, summary.total);

    text.push_str(&format!(
        "Your biggest expense was {} ({}, {:.1}% of total spending). ",
        top,
        fmt.format(top_amount),
        top_share
    ));

    if let Some(&(second, second_amount)) = ranked.get(1) {
        text.push_str(&format!(
            "Followed by {} at {:.1}%. ",
            second,
            share(second_amount, summary.total)
        ));
    }

    let tip = if top_share > DOMINANT_SHARE {
        format!(
            "Tip: Your {} spending is quite high. Consider setting a budget limit to track this category better.",
            top
        )
    } else if summary.transaction_count > BUSY_MONTH_TRANSACTIONS {
        format!(
            "Tip: You made {} transactions this month. Try consolidating purchases to save on fees and reduce impulse spending.",
            summary.transaction_count
        )
    } else {
        "Tip: Great job tracking your expenses! Keep monitoring your spending patterns to identify savings opportunities.".to_string()
    };
    text.push_str(&tip);

    text
}
