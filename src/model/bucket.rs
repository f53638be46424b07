// File: ./src/model/bucket.rs
//! Calendar-day tabs (Today / Tomorrow / Future / Expired) for delivery items.
//!
//! Everything here is a pure function of the item's delivery-time label and a
//! `now` reference. Callers read the clock once per pass (`local_now`) and hand
//! the same value to every call so a pass straddling midnight stays consistent.
use crate::model::item::DeliveryItem;
use crate::model::parser::parse_delivery_time;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter)]
pub enum Bucket {
    #[default]
    Today,
    Tomorrow,
    Future,
    Expired,
}

impl Bucket {
    pub fn label(&self) -> &'static str {
        match self {
            Bucket::Today => "Today",
            Bucket::Tomorrow => "Tomorrow",
            Bucket::Future => "Future",
            Bucket::Expired => "Expired",
        }
    }

    /// Badge color used by the tab bar.
    pub fn color(&self) -> &'static str {
        match self {
            Bucket::Today => "#737530",
            Bucket::Tomorrow => "#FFA500",
            Bucket::Future => "#4CAF50",
            Bucket::Expired => "#FF5722",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Bucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Bucket::iter()
            .find(|b| b.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                format!(
                    "Unknown tab: '{}' (expected today, tomorrow, future or expired)",
                    s
                )
            })
    }
}

/// Anything that carries a delivery-time label.
pub trait HasDeliveryTime {
    fn delivery_time_text(&self) -> Option<&str>;
}

impl HasDeliveryTime for DeliveryItem {
    fn delivery_time_text(&self) -> Option<&str> {
        self.delivery_time_text.as_deref()
    }
}

impl<T: HasDeliveryTime + ?Sized> HasDeliveryTime for &T {
    fn delivery_time_text(&self) -> Option<&str> {
        (**self).delivery_time_text()
    }
}

impl HasDeliveryTime for str {
    fn delivery_time_text(&self) -> Option<&str> {
        Some(self)
    }
}

impl HasDeliveryTime for Option<String> {
    fn delivery_time_text(&self) -> Option<&str> {
        self.as_deref()
    }
}

/// Wall-clock reference for one classification pass.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Buckets an already parsed moment. `None` always lands in `Future` so the
/// item stays reachable from at least one tab.
pub fn bucket_for(moment: Option<NaiveDateTime>, now: NaiveDateTime) -> Bucket {
    let Some(moment) = moment else {
        return Bucket::Future;
    };
    let day = moment.date();
    let today = now.date();
    if day == today {
        Bucket::Today
    } else if today.succ_opt() == Some(day) {
        Bucket::Tomorrow
    } else if day < today {
        Bucket::Expired
    } else {
        Bucket::Future
    }
}

pub fn classify<T: HasDeliveryTime + ?Sized>(item: &T, now: NaiveDateTime) -> Bucket {
    bucket_for(item.delivery_time_text().and_then(parse_delivery_time), now)
}

/// Per-tab counts. All four buckets are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    pub today: usize,
    pub tomorrow: usize,
    pub future: usize,
    pub expired: usize,
}

impl BucketCounts {
    pub fn get(&self, bucket: Bucket) -> usize {
        match bucket {
            Bucket::Today => self.today,
            Bucket::Tomorrow => self.tomorrow,
            Bucket::Future => self.future,
            Bucket::Expired => self.expired,
        }
    }

    fn bump(&mut self, bucket: Bucket) {
        match bucket {
            Bucket::Today => self.today += 1,
            Bucket::Tomorrow => self.tomorrow += 1,
            Bucket::Future => self.future += 1,
            Bucket::Expired => self.expired += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.today + self.tomorrow + self.future + self.expired
    }

    pub fn iter(&self) -> impl Iterator<Item = (Bucket, usize)> + '_ {
        Bucket::iter().map(|b| (b, self.get(b)))
    }
}

pub fn bucket_counts<'a, T, I>(items: I, now: NaiveDateTime) -> BucketCounts
where
    T: HasDeliveryTime + ?Sized + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut counts = BucketCounts::default();
    for item in items {
        counts.bump(classify(item, now));
    }
    counts
}

/// Items in `bucket`, in input order.
pub fn filter_by_bucket<'a, T>(items: &'a [T], bucket: Bucket, now: NaiveDateTime) -> Vec<&'a T>
where
    T: HasDeliveryTime,
{
    items
        .iter()
        .filter(|item| classify(*item, now) == bucket)
        .collect()
}
