//! Orders as served by the campus backend.
//!
//! The backend returns loosely shaped JSON: the same purchase collection holds
//! print jobs and stationery purchases, and the only thing telling them apart
//! is whether a `stationeryItems` list is present and non-empty. [`RawOrder`]
//! mirrors that wire shape; [`Order`] is the classified form the rest of the
//! desk works with.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::id::{OrderId, UserId};

/// An order record exactly as the backend serializes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOrder {
    pub order_id: OrderId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pin: Option<String>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default, rename = "stationeryItems")]
    pub stationery_items: Option<Vec<RawStationeryItem>>,
    #[serde(default, rename = "xeroxDetails")]
    pub xerox_details: Option<XeroxDetails>,
    #[serde(default, rename = "totalCost")]
    pub total_cost: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>,
}

/// One stationery line item on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStationeryItem {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub quantity: Option<u32>,
}

/// Print job details attached to a Xerox order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XeroxDetails {
    #[serde(default, deserialize_with = "lenient_string")]
    pub file_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub custom_instructions: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub copies: Option<u32>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub print_side: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub print_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub file_url: Option<String>,
}

/// A classified order.
#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    /// A print job ("arcade"/Xerox order).
    Arcade(ArcadeOrder),
    /// A purchase of physical items.
    Stationery(StationeryOrder),
}

/// A print job waiting at the Xerox counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcadeOrder {
    pub id: OrderId,
    pub pin: Option<String>,
    pub user_id: Option<UserId>,
    pub details: XeroxDetails,
    pub timestamp: Option<String>,
}

/// A stationery purchase. Always carries at least one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationeryOrder {
    pub id: OrderId,
    pub pin: Option<String>,
    pub items: Vec<StationeryItem>,
    pub total_cost: Decimal,
    pub timestamp: Option<String>,
}

/// A stationery line item after ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationeryItem {
    pub name: Option<String>,
    pub quantity: u32,
}

impl StationeryItem {
    /// Label used when the backend did not name the item.
    pub const UNKNOWN_NAME: &'static str = "Unknown Item";

    /// Display name, falling back to [`Self::UNKNOWN_NAME`].
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(Self::UNKNOWN_NAME)
    }
}

impl From<RawStationeryItem> for StationeryItem {
    fn from(raw: RawStationeryItem) -> Self {
        Self {
            name: raw.name,
            quantity: raw.quantity.unwrap_or(0),
        }
    }
}

impl From<RawOrder> for Order {
    fn from(raw: RawOrder) -> Self {
        match raw.stationery_items {
            Some(items) if !items.is_empty() => Self::Stationery(StationeryOrder {
                id: raw.order_id,
                pin: raw.pin,
                items: items.into_iter().map(StationeryItem::from).collect(),
                total_cost: raw.total_cost.unwrap_or_default(),
                timestamp: raw.timestamp,
            }),
            _ => Self::Arcade(ArcadeOrder {
                id: raw.order_id,
                pin: raw.pin,
                user_id: raw.user_id,
                details: raw.xerox_details.unwrap_or_default(),
                timestamp: raw.timestamp,
            }),
        }
    }
}

impl Order {
    /// The backend identifier of this order.
    #[must_use]
    pub const fn id(&self) -> &OrderId {
        match self {
            Self::Arcade(order) => &order.id,
            Self::Stationery(order) => &order.id,
        }
    }

    /// Whether this order belongs on the Xerox dashboard.
    #[must_use]
    pub const fn is_arcade(&self) -> bool {
        matches!(self, Self::Arcade(_))
    }

    /// Returns the print job, if this is one.
    #[must_use]
    pub fn into_arcade(self) -> Option<ArcadeOrder> {
        match self {
            Self::Arcade(order) => Some(order),
            Self::Stationery(_) => None,
        }
    }

    /// Returns the stationery purchase, if this is one.
    #[must_use]
    pub fn into_stationery(self) -> Option<StationeryOrder> {
        match self {
            Self::Stationery(order) => Some(order),
            Self::Arcade(_) => None,
        }
    }
}

impl ArcadeOrder {
    /// Label used when the print job has no file name.
    pub const UNKNOWN_FILE: &'static str = "Unknown File";

    /// File name shown on the card and used for download/print links.
    #[must_use]
    pub fn file_name_or_unknown(&self) -> &str {
        self.details
            .file_name
            .as_deref()
            .unwrap_or(Self::UNKNOWN_FILE)
    }
}

impl StationeryOrder {
    /// Sum of item quantities; items without a quantity count as zero.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Item names joined for a one-line summary.
    #[must_use]
    pub fn item_names(&self) -> String {
        self.items
            .iter()
            .map(StationeryItem::display_name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Accepts a string or a number; `null` and `""` become `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Accepts a non-negative integer or a numeric string; anything else is `None`.
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}
