use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Remote order lifecycle. Cancellation is a status, never a row deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Unpaid,
    ReadyToShip,
    Processed,
    Shipped,
    ToConfirmReceive,
    Completed,
    Cancelled,
    InCancel,
    InvoicePending,
    Unknown,
}

impl OrderStatus {
    pub fn from_remote(status: &str) -> Self {
        match status {
            "UNPAID" => OrderStatus::Unpaid,
            "READY_TO_SHIP" => OrderStatus::ReadyToShip,
            "PROCESSED" => OrderStatus::Processed,
            "SHIPPED" => OrderStatus::Shipped,
            "TO_CONFIRM_RECEIVE" => OrderStatus::ToConfirmReceive,
            "COMPLETED" => OrderStatus::Completed,
            "CANCELLED" => OrderStatus::Cancelled,
            "IN_CANCEL" => OrderStatus::InCancel,
            "INVOICE_PENDING" => OrderStatus::InvoicePending,
            _ => OrderStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Unpaid => "UNPAID",
            OrderStatus::ReadyToShip => "READY_TO_SHIP",
            OrderStatus::Processed => "PROCESSED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::ToConfirmReceive => "TO_CONFIRM_RECEIVE",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::InCancel => "IN_CANCEL",
            OrderStatus::InvoicePending => "INVOICE_PENDING",
            OrderStatus::Unknown => "UNKNOWN",
        }
    }
}

/// Local mirror of a remote order, upserted by `order_sn`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Order {
    pub id: i64,
    pub order_sn: String,
    pub shop_id: String,
    pub buyer_name: String,
    pub product_names: String,
    pub total_amount: f64,
    pub status: String,
    pub create_time: i64,
    /// Full remote payload kept for audit/debugging.
    pub raw: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub order_sn: String,
    pub buyer_name: String,
    pub product_names: String,
    pub total_amount: f64,
    pub status: String,
    pub create_time: i64,
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            order_sn: o.order_sn,
            buyer_name: o.buyer_name,
            product_names: o.product_names,
            total_amount: o.total_amount,
            status: o.status,
            create_time: o.create_time,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct OrderQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<String>,
    /// Remote create_time bounds, epoch seconds, inclusive.
    pub create_time_from: Option<i64>,
    pub create_time_to: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping_covers_lifecycle() {
        for (remote, expected) in [
            ("UNPAID", OrderStatus::Unpaid),
            ("READY_TO_SHIP", OrderStatus::ReadyToShip),
            ("PROCESSED", OrderStatus::Processed),
            ("SHIPPED", OrderStatus::Shipped),
            ("TO_CONFIRM_RECEIVE", OrderStatus::ToConfirmReceive),
            ("COMPLETED", OrderStatus::Completed),
            ("CANCELLED", OrderStatus::Cancelled),
            ("IN_CANCEL", OrderStatus::InCancel),
            ("INVOICE_PENDING", OrderStatus::InvoicePending),
        ] {
            assert_eq!(OrderStatus::from_remote(remote), expected);
            assert_eq!(expected.as_str(), remote);
        }
    }

    #[test]
    fn test_unknown_status_falls_back() {
        assert_eq!(
            OrderStatus::from_remote("SOMETHING_NEW"),
            OrderStatus::Unknown
        );
    }
}
