//! Aggregation engine: dashboard totals and expense breakdowns
//!
//! All functions are pure reductions over a transaction slice. Callers apply
//! the optional date filter first and feed the result to either operation.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{Transaction, TransactionType};

/// Number of entries shown in the dashboard's recent activity list
pub const RECENT_ACTIVITY_LIMIT: usize = 6;

/// Income, expense and balance totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub income: f64,
    pub expenses: f64,
    pub balance: f64,
}

/// Expense total for a single category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub name: String,
    pub value: f64,
}

/// Everything the dashboard view needs in one read
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub summary: Summary,
    pub categories: Vec<CategoryTotal>,
    pub recent: Vec<Transaction>,
}

/// Sum income and expenses. Empty input yields all zeros.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let (income, expenses) =
        transactions
            .iter()
            .fold((0.0, 0.0), |(income, expenses), tx| match tx.kind {
                TransactionType::Income => (income + tx.amount, expenses),
                TransactionType::Expense => (income, expenses + tx.amount),
            });

    Summary {
        income,
        expenses,
        balance: income - expenses,
    }
}

/// Group expenses by category, largest first.
///
/// Ties keep the order in which each category was first encountered.
/// Income transactions never contribute a category.
pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for tx in transactions.iter().filter(|tx| tx.is_expense()) {
        match index.get(tx.category.as_str()) {
            Some(&i) => totals[i].value += tx.amount,
            None => {
                index.insert(tx.category.as_str(), totals.len());
                totals.push(CategoryTotal {
                    name: tx.category.clone(),
                    value: tx.amount,
                });
            }
        }
    }

    // sort_by is stable
    totals.sort_by(|a, b| b.value.total_cmp(&a.value));
    totals
}

/// Keep only transactions on exactly `date`; `None` keeps everything
pub fn filter_by_date(transactions: &[Transaction], date: Option<NaiveDate>) -> Vec<Transaction> {
    match date {
        Some(d) => transactions
            .iter()
            .filter(|tx| tx.date == d)
            .cloned()
            .collect(),
        None => transactions.to_vec(),
    }
}

/// First `limit` entries of a newest-first ledger
pub fn recent(transactions: &[Transaction], limit: usize) -> Vec<Transaction> {
    transactions.iter().take(limit).cloned().collect()
}

/// Build the dashboard view, optionally restricted to a single day
pub fn dashboard(transactions: &[Transaction], date: Option<NaiveDate>) -> Dashboard {
    let filtered = filter_by_date(transactions, date);
    Dashboard {
        summary: summarize(&filtered),
        categories: category_breakdown(&filtered),
        recent: recent(&filtered, RECENT_ACTIVITY_LIMIT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(kind: TransactionType, amount: f64, category: &str, date: &str) -> Transaction {
        Transaction {
            id: crate::models::new_id(),
            amount,
            category: category.to_string(),
            description: format!("{} {}", category, amount),
            kind,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        }
    }

    fn income(amount: f64) -> Transaction {
        tx(TransactionType::Income, amount, "Gaji", "2024-03-01")
    }

    fn expense(amount: f64, category: &str) -> Transaction {
        tx(TransactionType::Expense, amount, category, "2024-03-01")
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(
            summary,
            Summary {
                income: 0.0,
                expenses: 0.0,
                balance: 0.0
            }
        );
    }

    #[test]
    fn test_summarize_scenario() {
        let ledger = vec![income(1_000_000.0), expense(250_000.0, "Makanan")];
        let summary = summarize(&ledger);
        assert_eq!(summary.income, 1_000_000.0);
        assert_eq!(summary.expenses, 250_000.0);
        assert_eq!(summary.balance, 750_000.0);

        let breakdown = category_breakdown(&ledger);
        assert_eq!(
            breakdown,
            vec![CategoryTotal {
                name: "Makanan".to_string(),
                value: 250_000.0
            }]
        );
    }

    #[test]
    fn test_balance_is_income_minus_expenses() {
        let ledgers = vec![
            vec![],
            vec![expense(10.0, "Belanja")],
            vec![income(5.0), income(7.5), expense(20.0, "Hiburan")],
            vec![income(1_000.0), expense(0.0, "Tagihan")],
        ];
        for ledger in ledgers {
            let s = summarize(&ledger);
            assert_eq!(s.balance, s.income - s.expenses);
        }
    }

    #[test]
    fn test_breakdown_sums_per_category_and_sorts_descending() {
        let ledger = vec![
            expense(50_000.0, "Transportasi"),
            expense(20_000.0, "Makanan"),
            income(3_000_000.0),
            expense(100_000.0, "Makanan"),
            expense(300_000.0, "Tagihan"),
        ];
        let breakdown = category_breakdown(&ledger);
        let names: Vec<&str> = breakdown.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Tagihan", "Makanan", "Transportasi"]);
        assert_eq!(breakdown[1].value, 120_000.0);

        for pair in breakdown.windows(2) {
            assert!(pair[0].value >= pair[1].value);
        }
    }

    #[test]
    fn test_breakdown_ties_keep_encounter_order() {
        let ledger = vec![
            expense(10.0, "Hiburan"),
            expense(30.0, "Belanja"),
            expense(10.0, "Kesehatan"),
            expense(10.0, "Pendidikan"),
        ];
        let names: Vec<String> = category_breakdown(&ledger)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Belanja", "Hiburan", "Kesehatan", "Pendidikan"]);
    }

    #[test]
    fn test_breakdown_ignores_income_categories() {
        let ledger = vec![
            income(100.0),
            tx(TransactionType::Income, 50.0, "Makanan", "2024-03-01"),
        ];
        assert!(category_breakdown(&ledger).is_empty());
    }

    #[test]
    fn test_filter_by_date_is_exact_match() {
        let ledger = vec![
            tx(TransactionType::Expense, 1.0, "Makanan", "2024-03-01"),
            tx(TransactionType::Expense, 2.0, "Makanan", "2024-03-02"),
            tx(TransactionType::Income, 3.0, "Gaji", "2024-03-01"),
        ];
        let day = NaiveDate::from_ymd_opt(2024, 3, 1);
        let filtered = filter_by_date(&ledger, day);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|t| Some(t.date) == day));

        assert_eq!(filter_by_date(&ledger, None).len(), 3);
        assert!(filter_by_date(&ledger, NaiveDate::from_ymd_opt(2023, 1, 1)).is_empty());
    }

    #[test]
    fn test_dashboard_recent_is_capped() {
        let ledger: Vec<Transaction> = (0..10).map(|i| expense(i as f64, "Makanan")).collect();
        let view = dashboard(&ledger, None);
        assert_eq!(view.recent.len(), RECENT_ACTIVITY_LIMIT);
        assert_eq!(view.recent[0].id, ledger[0].id);
        assert_eq!(view.summary.expenses, 45.0);
    }
}
