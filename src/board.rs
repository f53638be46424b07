// File: ./src/board.rs
//! View-model behind the item list screens.
//!
//! The board holds whatever the last fetch returned for one status. Date tabs
//! only exist for `Pending`; every other status shows the full list.
use crate::model::{
    Bucket, BucketCounts, DeliveryItem, DeliveryStatus, bucket_counts, filter_by_bucket,
};
use chrono::NaiveDateTime;

#[derive(Debug, Clone)]
pub struct ItemBoard {
    status: DeliveryStatus,
    items: Vec<DeliveryItem>,
    active_tab: Bucket,
}

impl ItemBoard {
    pub fn new(status: DeliveryStatus) -> Self {
        Self {
            status,
            items: Vec::new(),
            active_tab: Bucket::default(),
        }
    }

    pub fn with_tab(mut self, tab: Bucket) -> Self {
        self.active_tab = tab;
        self
    }

    pub fn status(&self) -> DeliveryStatus {
        self.status
    }

    pub fn items(&self) -> &[DeliveryItem] {
        &self.items
    }

    pub fn active_tab(&self) -> Bucket {
        self.active_tab
    }

    pub fn set_items(&mut self, items: Vec<DeliveryItem>) {
        log::debug!("Board {} received {} items", self.status, items.len());
        self.items = items;
    }

    pub fn set_active_tab(&mut self, tab: Bucket) {
        self.active_tab = tab;
    }

    pub fn shows_tabs(&self) -> bool {
        self.status == DeliveryStatus::Pending
    }

    pub fn visible(&self, now: NaiveDateTime) -> Vec<&DeliveryItem> {
        if self.shows_tabs() {
            filter_by_bucket(&self.items, self.active_tab, now)
        } else {
            self.items.iter().collect()
        }
    }

    /// Badge counts. Zero everywhere when the status has no tabs.
    pub fn tab_counts(&self, now: NaiveDateTime) -> BucketCounts {
        if !self.shows_tabs() {
            return BucketCounts::default();
        }
        bucket_counts(&self.items, now)
    }

    pub fn empty_message(&self) -> String {
        let what = if self.shows_tabs() {
            self.active_tab.label().to_lowercase()
        } else {
            self.status.to_string().to_lowercase()
        };
        format!("No {} items", what)
    }
}
