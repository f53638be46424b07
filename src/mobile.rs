/* courier/src/mobile.rs
 *
 * UniFFI interface for exposing the dispatch client to mobile platforms (Android).
 */

use crate::board::ItemBoard;
use crate::client::{ApiClient, ImageUpload};
use crate::config::Config;
use crate::context::StandardContext;
use crate::model::{
    Bucket, DeliveryItem, DeliveryStatus, classify, local_now, parse_delivery_time,
};
use crate::session::{MemorySession, SharedSession};
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

#[derive(Debug, uniffi::Error)]
#[uniffi(flat_error)]
pub enum MobileError {
    Generic(String),
}
impl From<String> for MobileError {
    fn from(e: String) -> Self {
        Self::Generic(e)
    }
}
impl From<&str> for MobileError {
    fn from(e: &str) -> Self {
        Self::Generic(e.to_string())
    }
}
impl From<anyhow::Error> for MobileError {
    fn from(e: anyhow::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
impl std::fmt::Display for MobileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                MobileError::Generic(s) => s,
            }
        )
    }
}
impl std::error::Error for MobileError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum MobileBucket {
    Today,
    Tomorrow,
    Future,
    Expired,
}

impl From<Bucket> for MobileBucket {
    fn from(b: Bucket) -> Self {
        match b {
            Bucket::Today => MobileBucket::Today,
            Bucket::Tomorrow => MobileBucket::Tomorrow,
            Bucket::Future => MobileBucket::Future,
            Bucket::Expired => MobileBucket::Expired,
        }
    }
}

impl From<MobileBucket> for Bucket {
    fn from(b: MobileBucket) -> Self {
        match b {
            MobileBucket::Today => Bucket::Today,
            MobileBucket::Tomorrow => Bucket::Tomorrow,
            MobileBucket::Future => Bucket::Future,
            MobileBucket::Expired => Bucket::Expired,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum MobileStatus {
    Pending,
    Assigned,
    Picked,
    OutForDelivery,
    DeliveryAttempted,
    Delivered,
}

impl From<DeliveryStatus> for MobileStatus {
    fn from(s: DeliveryStatus) -> Self {
        match s {
            DeliveryStatus::Pending => MobileStatus::Pending,
            DeliveryStatus::Assigned => MobileStatus::Assigned,
            DeliveryStatus::Picked => MobileStatus::Picked,
            DeliveryStatus::OutForDelivery => MobileStatus::OutForDelivery,
            DeliveryStatus::DeliveryAttempted => MobileStatus::DeliveryAttempted,
            DeliveryStatus::Delivered => MobileStatus::Delivered,
        }
    }
}

impl From<MobileStatus> for DeliveryStatus {
    fn from(s: MobileStatus) -> Self {
        match s {
            MobileStatus::Pending => DeliveryStatus::Pending,
            MobileStatus::Assigned => DeliveryStatus::Assigned,
            MobileStatus::Picked => DeliveryStatus::Picked,
            MobileStatus::OutForDelivery => DeliveryStatus::OutForDelivery,
            MobileStatus::DeliveryAttempted => DeliveryStatus::DeliveryAttempted,
            MobileStatus::Delivered => DeliveryStatus::Delivered,
        }
    }
}

#[derive(uniffi::Record)]
pub struct MobileItem {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub customer_number: Option<String>,
    pub delivery_time: Option<String>,
    pub status: Option<MobileStatus>,
    pub bucket: MobileBucket,
    pub agent_name: Option<String>,
    pub image_url: Option<String>,
    /// Statuses this item may move to next.
    pub next_steps: Vec<MobileStatus>,
}

impl MobileItem {
    fn from_item(item: &DeliveryItem, now: chrono::NaiveDateTime) -> Self {
        Self {
            id: item.id.clone(),
            name: item.display_name().to_string(),
            address: item.address.clone(),
            customer_number: item.customer_number.clone(),
            delivery_time: item.delivery_time_text.clone(),
            status: item.status.map(MobileStatus::from),
            bucket: classify(item, now).into(),
            agent_name: item.delivery_boy_name.clone(),
            image_url: item.image_url.clone(),
            next_steps: item
                .status
                .map(|s| s.next_steps().iter().copied().map(MobileStatus::from).collect())
                .unwrap_or_default(),
        }
    }
}

#[derive(uniffi::Record)]
pub struct MobileTabCounts {
    pub today: u32,
    pub tomorrow: u32,
    pub future: u32,
    pub expired: u32,
}

#[derive(uniffi::Record)]
pub struct MobileSession {
    pub user_id: String,
    pub username: String,
    pub is_admin: bool,
}

#[derive(uniffi::Object)]
pub struct CourierMobile {
    config: Config,
    session: SharedSession,
    client: Result<ApiClient, String>,
    board: Mutex<ItemBoard>,
}

// Badge counts saturate instead of wrapping.
fn badge(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl CourierMobile {
    fn client(&self) -> Result<&ApiClient, MobileError> {
        self.client.as_ref().map_err(|e| MobileError::from(e.clone()))
    }

    fn with_board<R>(&self, f: impl FnOnce(&mut ItemBoard) -> R) -> R {
        let mut guard = self.board.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    /// Replaces the board contents, switching status if needed. Returns the item count.
    fn fill_board(&self, status: DeliveryStatus, items: Vec<DeliveryItem>) -> u32 {
        let n = badge(items.len());
        self.with_board(|b| {
            if b.status() != status {
                let tab = b.active_tab();
                *b = ItemBoard::new(status).with_tab(tab);
            }
            b.set_items(items);
        });
        n
    }
}

#[uniffi::export(async_runtime = "tokio")]
impl CourierMobile {
    #[uniffi::constructor]
    pub fn new(android_files_dir: String) -> Self {
        #[cfg(target_os = "android")]
        android_logger::init_once(
            android_logger::Config::default()
                .with_max_level(log::LevelFilter::Debug)
                .with_tag("CourierRust"),
        );

        let ctx = StandardContext::new(Some(PathBuf::from(android_files_dir)));
        let config = Config::load_or_default(&ctx).unwrap_or_else(|e| {
            log::warn!("Config unreadable, using defaults: {}", e);
            Config::default()
        });
        let session: SharedSession = Arc::new(MemorySession::new());
        let client = ApiClient::from_config(&config, session.clone());
        if let Err(e) = &client {
            log::error!("HTTP client unavailable: {}", e);
        }
        let board = ItemBoard::new(DeliveryStatus::Pending).with_tab(config.default_tab);

        Self {
            config,
            session,
            client,
            board: Mutex::new(board),
        }
    }

    pub fn api_base_url(&self) -> String {
        self.config.api_base_url.clone()
    }

    /// Parsed start of a label as `YYYY-MM-DDTHH:MM`, or `None` when unparseable.
    pub fn parse_label(&self, label: String) -> Option<String> {
        parse_delivery_time(&label).map(|dt| dt.format("%Y-%m-%dT%H:%M").to_string())
    }

    pub fn classify_label(&self, label: String) -> MobileBucket {
        classify(label.as_str(), local_now()).into()
    }

    pub fn bucket_color(&self, bucket: MobileBucket) -> String {
        Bucket::from(bucket).color().to_string()
    }

    pub fn session(&self) -> Option<MobileSession> {
        self.session.get().map(|s| MobileSession {
            user_id: s.user_id,
            username: s.username,
            is_admin: s.is_admin,
        })
    }

    pub fn logout(&self) {
        if let Ok(client) = self.client() {
            client.logout();
        }
    }

    pub fn set_tab(&self, tab: MobileBucket) {
        self.with_board(|b| b.set_active_tab(tab.into()));
    }

    pub fn active_tab(&self) -> MobileBucket {
        self.with_board(|b| b.active_tab().into())
    }

    pub fn shows_tabs(&self) -> bool {
        self.with_board(|b| b.shows_tabs())
    }

    pub fn visible_items(&self) -> Vec<MobileItem> {
        let now = local_now();
        self.with_board(|b| {
            b.visible(now)
                .into_iter()
                .map(|item| MobileItem::from_item(item, now))
                .collect()
        })
    }

    pub fn tab_counts(&self) -> MobileTabCounts {
        let counts = self.with_board(|b| b.tab_counts(local_now()));
        MobileTabCounts {
            today: badge(counts.today),
            tomorrow: badge(counts.tomorrow),
            future: badge(counts.future),
            expired: badge(counts.expired),
        }
    }

    pub fn empty_message(&self) -> String {
        self.with_board(|b| b.empty_message())
    }

    pub async fn login(
        &self,
        username: String,
        password: String,
    ) -> Result<MobileSession, MobileError> {
        let session = self.client()?.login(&username, &password).await?;
        Ok(MobileSession {
            user_id: session.user_id,
            username: session.username,
            is_admin: session.is_admin,
        })
    }

    /// Fetches one status list into the board. Agents get their own items.
    pub async fn load_items(&self, status: MobileStatus) -> Result<u32, MobileError> {
        let client = self.client()?;
        let status = DeliveryStatus::from(status);
        let is_agent = self.session.get().is_some_and(|s| s.is_agent());
        let items = if is_agent {
            client.agent_items(status).await?
        } else {
            client.items_by_status(status).await?
        };
        Ok(self.fill_board(status, items))
    }

    /// Unassigned items an agent can pick from.
    pub async fn load_pending(&self) -> Result<u32, MobileError> {
        let items = self.client()?.pending_items().await?;
        Ok(self.fill_board(DeliveryStatus::Pending, items))
    }

    /// Assigns a pending item to the signed-in agent and drops it from the board.
    pub async fn pick_item(&self, item_id: String) -> Result<(), MobileError> {
        self.client()?.pick_item(&item_id).await?;
        self.with_board(|b| {
            let rest = b.items().iter().filter(|i| i.id != item_id).cloned().collect();
            b.set_items(rest);
        });
        Ok(())
    }

    /// Moves an item along its lifecycle. `image` is the JPEG proof, needed for `Delivered`.
    pub async fn update_status(
        &self,
        item_id: String,
        target: MobileStatus,
        image: Option<Vec<u8>>,
    ) -> Result<(), MobileError> {
        let item = self
            .with_board(|b| b.items().iter().find(|i| i.id == item_id).cloned())
            .ok_or_else(|| MobileError::from(format!("Unknown item {}", item_id)))?;
        let proof = image.map(|data| ImageUpload::jpeg(Bytes::from(data)));

        self.client()?
            .update_status(&item, target.into(), proof.as_ref())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_badge_saturates() {
        assert_eq!(badge(0), 0);
        assert_eq!(badge(42), 42);
        assert_eq!(badge(u32::MAX as usize), u32::MAX);
        #[cfg(target_pointer_width = "64")]
        assert_eq!(badge(u32::MAX as usize + 1), u32::MAX);
    }
}
