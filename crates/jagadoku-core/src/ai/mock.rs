//! Mock backend for testing
//!
//! Produces deterministic advice from the ledger itself, so development and
//! tests work without an API key or a running model.

use async_trait::async_trait;

use crate::aggregation::{category_breakdown, summarize};
use crate::error::{Error, Result};
use crate::ledger::LedgerSnapshot;
use crate::models::format_idr;

use super::types::{AIInsight, InvestmentAdvice, RiskLevel};
use super::AIBackend;

/// Mock AI backend for testing
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Whether advice requests fail with `Error::Advice`
    pub failing: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            failing: false,
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            failing: false,
        }
    }

    /// A backend whose advice requests always fail
    pub fn failing() -> Self {
        Self {
            healthy: true,
            failing: true,
        }
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn financial_advice(&self, snapshot: &LedgerSnapshot) -> Result<AIInsight> {
        if self.failing {
            return Err(Error::Advice("Mock backend configured to fail".into()));
        }

        let totals = summarize(&snapshot.transactions);
        let summary = if totals.balance >= 0.0 {
            format!(
                "Arus kas positif dengan surplus {} dari pemasukan {}.",
                format_idr(totals.balance),
                format_idr(totals.income)
            )
        } else {
            format!(
                "Pengeluaran melebihi pemasukan sebesar {}.",
                format_idr(-totals.balance)
            )
        };

        let mut saving_tips: Vec<String> = category_breakdown(&snapshot.transactions)
            .into_iter()
            .take(3)
            .map(|c| format!("Tekan pengeluaran {} ({}).", c.name, format_idr(c.value)))
            .collect();
        saving_tips.push("Sisihkan tabungan di awal bulan.".to_string());

        Ok(AIInsight {
            summary,
            saving_tips,
            investment_advice: vec![
                InvestmentAdvice {
                    instrument: "Reksadana Pasar Uang".to_string(),
                    description: "Dana darurat yang mudah dicairkan.".to_string(),
                    risk_level: RiskLevel::Low,
                },
                InvestmentAdvice {
                    instrument: "Emas".to_string(),
                    description: "Lindung nilai jangka menengah.".to_string(),
                    risk_level: RiskLevel::Medium,
                },
                InvestmentAdvice {
                    instrument: "Saham".to_string(),
                    description: "Pertumbuhan jangka panjang.".to_string(),
                    risk_level: RiskLevel::High,
                },
            ],
        })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Transaction, TransactionType};
    use chrono::NaiveDate;

    fn tx(kind: TransactionType, amount: f64, category: &str) -> Transaction {
        Transaction {
            id: crate::models::new_id(),
            amount,
            category: category.to_string(),
            description: "x".to_string(),
            kind,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_mock_advice_uses_ledger() {
        let snapshot = LedgerSnapshot {
            transactions: vec![
                tx(TransactionType::Income, 1_000_000.0, "Gaji"),
                tx(TransactionType::Expense, 250_000.0, "Makanan"),
            ],
            goals: vec![],
        };
        let insight = MockBackend::new().financial_advice(&snapshot).await.unwrap();
        assert!(insight.summary.contains("Rp 750.000"));
        assert!(insight.saving_tips[0].contains("Makanan"));
        assert_eq!(insight.investment_advice.len(), 3);
    }

    #[tokio::test]
    async fn test_mock_advice_deficit() {
        let snapshot = LedgerSnapshot {
            transactions: vec![tx(TransactionType::Expense, 50_000.0, "Hiburan")],
            goals: vec![],
        };
        let insight = MockBackend::new().financial_advice(&snapshot).await.unwrap();
        assert!(insight.summary.contains("melebihi"));
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let err = MockBackend::failing()
            .financial_advice(&LedgerSnapshot::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Advice(_)));
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        assert!(MockBackend::new().health_check().await);
        assert!(!MockBackend::unhealthy().health_check().await);
    }
}
