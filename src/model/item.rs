// File: ./src/model/item.rs
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator};

// The server hands out numeric ids, older builds used strings. Keep them opaque.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Num(i64),
    Str(String),
}

impl From<IdRepr> for String {
    fn from(id: IdRepr) -> Self {
        match id {
            IdRepr::Num(n) => n.to_string(),
            IdRepr::Str(s) => s,
        }
    }
}

pub(crate) fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    IdRepr::deserialize(deserializer).map(String::from)
}

pub(crate) fn opt_id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<IdRepr>::deserialize(deserializer)?.map(String::from))
}

// Unknown statuses from newer servers must not make the whole list unreadable.
fn lenient_status<'de, D>(deserializer: D) -> Result<Option<DeliveryStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|s| s.parse().ok()))
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, EnumIter)]
pub enum DeliveryStatus {
    Pending,
    Assigned,
    Picked,
    #[serde(rename = "Out_For_Delivery")]
    OutForDelivery,
    #[serde(rename = "Delivery_Attempted")]
    DeliveryAttempted,
    Delivered,
}

impl DeliveryStatus {
    /// Name used in URLs and JSON bodies.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Assigned => "Assigned",
            Self::Picked => "Picked",
            Self::OutForDelivery => "Out_For_Delivery",
            Self::DeliveryAttempted => "Delivery_Attempted",
            Self::Delivered => "Delivered",
        }
    }

    /// Statuses an agent may move an item to from this one.
    /// Assignment out of `Pending` is an admin action and not listed here.
    pub fn next_steps(&self) -> &'static [DeliveryStatus] {
        match self {
            Self::Assigned => &[Self::Picked],
            Self::Picked => &[Self::OutForDelivery],
            Self::OutForDelivery => &[Self::DeliveryAttempted, Self::Delivered],
            Self::DeliveryAttempted => &[Self::Delivered],
            Self::Pending | Self::Delivered => &[],
        }
    }

    pub fn can_transition_to(&self, target: DeliveryStatus) -> bool {
        self.next_steps().contains(&target)
    }

    /// Marking an item delivered needs a proof-of-delivery photo.
    pub fn requires_proof_image(target: DeliveryStatus) -> bool {
        target == Self::Delivered
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Button label for moving an item to `target`.
    pub fn action_label(target: DeliveryStatus) -> &'static str {
        match target {
            Self::Picked => "Mark Picked",
            Self::OutForDelivery => "Start Delivery",
            Self::DeliveryAttempted => "Mark Attempted",
            Self::Delivered => "Mark Delivered",
            Self::Assigned => "Assign",
            Self::Pending => "Unassign",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name().replace('_', " "))
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().replace([' ', '-'], "_").to_lowercase();
        DeliveryStatus::iter()
            .find(|st| st.wire_name().to_lowercase() == key)
            .ok_or_else(|| format!("Unknown delivery status: '{}'", s))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryItem {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub customer_number: Option<String>,
    #[serde(default)]
    pub alternative_number: Option<String>,
    /// Free-text label such as "Nov 21, 2025, 4:06 PM - 7:06 PM".
    #[serde(default, rename = "delivery_time")]
    pub delivery_time_text: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<DeliveryStatus>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub delivered_image_url: Option<String>,
    #[serde(default, deserialize_with = "opt_id_as_string")]
    pub delivery_boy_id: Option<String>,
    #[serde(default)]
    pub delivery_boy_name: Option<String>,
}

impl DeliveryItem {
    pub fn new(id: impl Into<String>, delivery_time_text: Option<&str>) -> Self {
        Self {
            id: id.into(),
            delivery_time_text: delivery_time_text.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }

    pub fn is_assigned(&self) -> bool {
        self.delivery_boy_id.is_some()
    }
}

/// A delivery agent ("delivery boy" on the server side).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAgent {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Deserialize)]
struct CountRow {
    status: String,
    count: u64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CountsRepr {
    Map(HashMap<String, u64>),
    Rows(Vec<CountRow>),
}

/// Per-status item counts returned by the count endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusCounts {
    counts: HashMap<DeliveryStatus, u64>,
}

impl StatusCounts {
    pub fn get(&self, status: DeliveryStatus) -> u64 {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeliveryStatus, u64)> + '_ {
        DeliveryStatus::iter().map(|s| (s, self.get(s)))
    }
}

impl<'de> Deserialize<'de> for StatusCounts {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs: Vec<(String, u64)> = match CountsRepr::deserialize(deserializer)? {
            CountsRepr::Map(m) => m.into_iter().collect(),
            CountsRepr::Rows(rows) => rows.into_iter().map(|r| (r.status, r.count)).collect(),
        };
        let mut counts = HashMap::new();
        for (name, count) in pairs {
            match name.parse::<DeliveryStatus>() {
                Ok(status) => *counts.entry(status).or_insert(0) += count,
                Err(e) => log::debug!("Ignoring count row: {}", e),
            }
        }
        Ok(Self { counts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_lifecycle() {
        use DeliveryStatus::*;
        assert_eq!(Assigned.next_steps(), &[Picked]);
        assert_eq!(Picked.next_steps(), &[OutForDelivery]);
        assert_eq!(OutForDelivery.next_steps(), &[DeliveryAttempted, Delivered]);
        assert_eq!(DeliveryAttempted.next_steps(), &[Delivered]);
        assert!(Pending.next_steps().is_empty());
        assert!(Delivered.next_steps().is_empty());
        assert!(!Picked.can_transition_to(Delivered));
        assert!(Delivered.is_terminal());
    }

    #[test]
    fn test_status_names() {
        assert_eq!(DeliveryStatus::OutForDelivery.to_string(), "Out For Delivery");
        assert_eq!(
            "out for delivery".parse::<DeliveryStatus>(),
            Ok(DeliveryStatus::OutForDelivery)
        );
        assert_eq!(
            "Delivery_Attempted".parse::<DeliveryStatus>(),
            Ok(DeliveryStatus::DeliveryAttempted)
        );
        assert!("Lost".parse::<DeliveryStatus>().is_err());
    }

    #[test]
    fn test_item_from_server_json() {
        let json = r#"{
            "id": 42,
            "name": "Parcel",
            "delivery_time": "Nov 21, 2025, 4:06 PM - 7:06 PM",
            "status": "Out_For_Delivery",
            "delivery_boy_id": 7,
            "unknown_field": true
        }"#;
        let item: DeliveryItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "42");
        assert_eq!(item.status, Some(DeliveryStatus::OutForDelivery));
        assert_eq!(item.delivery_boy_id.as_deref(), Some("7"));
        assert!(item.address.is_none());
    }

    #[test]
    fn test_status_counts_shapes() {
        let map: StatusCounts = serde_json::from_str(r#"{"Pending": 3, "Picked": 1}"#).unwrap();
        assert_eq!(map.get(DeliveryStatus::Pending), 3);
        assert_eq!(map.get(DeliveryStatus::Delivered), 0);

        let rows: StatusCounts = serde_json::from_str(
            r#"[{"status": "Out_For_Delivery", "count": 2}, {"status": "Bogus", "count": 9}]"#,
        )
        .unwrap();
        assert_eq!(rows.get(DeliveryStatus::OutForDelivery), 2);
        assert_eq!(rows.total(), 2);
    }
}
