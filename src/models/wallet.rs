use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum WalletTransactionKind {
    /// Escrow released to the seller after order completion.
    Release,
    /// Funds held by the platform pending completion.
    Hold,
    Adjustment,
    Withdrawal,
}

impl WalletTransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletTransactionKind::Release => "Release",
            WalletTransactionKind::Hold => "Hold",
            WalletTransactionKind::Adjustment => "Adjustment",
            WalletTransactionKind::Withdrawal => "Withdrawal",
        }
    }
}

/// Append-style ledger row; only `status` changes after insert (Hold→Completed).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct WalletTransaction {
    pub id: i64,
    pub transaction_date: DateTime<Utc>,
    pub kind: String,
    pub source: String,
    pub reference_id: String,
    /// Signed amount: releases positive, holds/withdrawals negative.
    pub amount: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct WalletSummary {
    pub released: f64,
    pub on_hold: f64,
    pub total_earned: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WalletQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub kind: Option<String>,
}
