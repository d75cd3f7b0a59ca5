/*
 * Responsibility
 * - 入荷 (incoming) の request/response DTO
 *   - 通常入荷: 購入情報 / 輸送 / 品目 / 付帯情報
 *   - 中身不明のコンテナ受け入れ
 * - validation (形式チェック) 用の validate()
 *   - 在庫分類などの業務ルールはここでは扱わない
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseType {
    PoShipment,
    ManualPurchase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    CompanyCard,
    Cash,
    Invoice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerStatus {
    Unopened,
    Inspected,
    Classified,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransportInfo {
    pub carrier: Option<String>,
    pub vehicle_id: Option<String>,
    pub driver_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingItem {
    pub item_name: String,
    pub sku: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub batch_id: Option<String>,
    pub inspection_status: Option<InspectionStatus>,
    pub storage_location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateIncomingRequest {
    pub purchase_type: PurchaseType,
    pub supplier_name: String,
    pub supplier_id: Option<String>,
    pub purchaser_name: String,
    pub role_id: String,
    pub po_number: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_url: Option<String>,
    pub transport_info: Option<TransportInfo>,
    pub arrival_time: String,
    pub location_received: String,
    pub items: Vec<IncomingItem>,
    pub linked_issue_id: Option<String>,
    pub qa_tag: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub notes: Option<String>,
    #[serde(default)]
    pub consent_tags: Vec<String>,
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

impl CreateIncomingRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if blank(&self.supplier_name) {
            return Err("supplier_name is required");
        }
        if blank(&self.purchaser_name) {
            return Err("purchaser_name is required");
        }
        if blank(&self.role_id) {
            return Err("role_id is required");
        }
        if blank(&self.arrival_time) {
            return Err("arrival_time is required");
        }
        if blank(&self.location_received) {
            return Err("location_received is required");
        }
        if self.items.is_empty() {
            return Err("at least one item is required");
        }

        for item in &self.items {
            if blank(&item.item_name) {
                return Err("item_name is required");
            }
            if blank(&item.unit) {
                return Err("unit is required");
            }
            if !item.quantity.is_finite() || item.quantity < 0.0 {
                return Err("quantity must be a non-negative number");
            }
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct IncomingContainerRequest {
    pub incoming_purchase_id: Option<String>,
    pub label_or_code: String,
    pub description: Option<String>,
    pub quantity_estimate: Option<f64>,
    pub unit: String,
    pub status: ContainerStatus,
    pub received_at: Option<String>,
    pub storage_temp: Option<String>,
    pub remarks: Option<String>,
}

impl IncomingContainerRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if blank(&self.label_or_code) {
            return Err("label_or_code is required");
        }
        if blank(&self.unit) {
            return Err("unit is required");
        }
        if let Some(q) = self.quantity_estimate
            && (!q.is_finite() || q < 0.0)
        {
            return Err("quantity_estimate must be a non-negative number");
        }

        Ok(())
    }
}

/// 受け付けた入荷の控え
#[derive(Debug, Serialize)]
pub struct IntakeReceipt {
    pub status: &'static str,
    pub id: Uuid,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl IntakeReceipt {
    pub fn received(created_by: String, count: Option<usize>) -> Self {
        Self {
            status: "received",
            id: Uuid::new_v4(),
            created_by,
            count,
        }
    }
}
