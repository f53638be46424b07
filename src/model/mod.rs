// File: ./src/model/mod.rs
pub mod bucket;
pub mod item;
pub mod parser;

pub use bucket::{
    Bucket, BucketCounts, HasDeliveryTime, bucket_counts, bucket_for, classify, filter_by_bucket,
    local_now,
};
pub use item::{DeliveryAgent, DeliveryItem, DeliveryStatus, StatusCounts};
pub use parser::{format_delivery_time, parse_delivery_time};
