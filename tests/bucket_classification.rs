// Calendar-day tab classification, counts and filtering.
use chrono::{NaiveDate, NaiveDateTime};
use courier::model::{Bucket, DeliveryItem, bucket_counts, bucket_for, classify, filter_by_bucket};
use strum::IntoEnumIterator;

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn item(id: &str, label: Option<&str>) -> DeliveryItem {
    DeliveryItem::new(id, label)
}

#[test]
fn test_earlier_today_is_still_today() {
    let now = at(2025, 6, 10, 13, 0);
    assert_eq!(
        classify(&item("1", Some("Jun 10, 2025, 9:00 AM")), now),
        Bucket::Today
    );
}

#[test]
fn test_day_boundaries() {
    let now = at(2025, 6, 10, 13, 0);
    assert_eq!(
        classify(&item("1", Some("Jun 9, 2025, 11:59 PM")), now),
        Bucket::Expired
    );
    assert_eq!(
        classify(&item("2", Some("Jun 11, 2025, 12:01 AM")), now),
        Bucket::Tomorrow
    );
    assert_eq!(classify(&item("3", Some("Jun 12, 2025")), now), Bucket::Future);
    assert_eq!(
        classify(&item("4", Some("Jun 10, 2025, 11:59 PM")), now),
        Bucket::Today
    );
}

#[test]
fn test_month_and_year_rollover() {
    let now = at(2025, 12, 31, 22, 0);
    assert_eq!(classify("Jan 1, 2026, 8:00 AM", now), Bucket::Tomorrow);
    assert_eq!(classify("Jan 2, 2026", now), Bucket::Future);
    assert_eq!(classify("Dec 30, 2025, 11:00 PM", now), Bucket::Expired);

    let now = at(2024, 2, 28, 9, 0);
    assert_eq!(classify("Feb 29, 2024", now), Bucket::Tomorrow);
    assert_eq!(classify("Mar 1, 2024", now), Bucket::Future);
}

#[test]
fn test_missing_or_unparseable_is_future() {
    let now = at(2025, 6, 10, 13, 0);
    assert_eq!(classify(&item("1", None), now), Bucket::Future);
    assert_eq!(classify(&item("2", Some("")), now), Bucket::Future);
    assert_eq!(classify(&item("3", Some("ASAP please")), now), Bucket::Future);
    assert_eq!(bucket_for(None, now), Bucket::Future);
}

#[test]
fn test_classify_accepts_plain_labels() {
    let now = at(2025, 6, 10, 13, 0);
    let label: Option<String> = Some("Jun 10, 2025".to_string());
    assert_eq!(classify(&label, now), Bucket::Today);
    assert_eq!(classify(&None::<String>, now), Bucket::Future);
    assert_eq!(classify("Jun 1, 2025", now), Bucket::Expired);
}

fn sample() -> Vec<DeliveryItem> {
    vec![
        item("a", Some("Jun 10, 2025, 9:00 AM")),
        item("b", Some("Jun 9, 2025, 11:59 PM")),
        item("c", Some("Jun 11, 2025, 12:01 AM")),
        item("d", None),
        item("e", Some("Jun 10, 2025, 4:00 PM - 6:00 PM")),
        item("f", Some("Jun 12, 2025")),
        item("g", Some("not a date")),
        item("h", Some("May 1, 2025")),
    ]
}

#[test]
fn test_counts_sum_to_input_length() {
    let now = at(2025, 6, 10, 13, 0);
    let items = sample();
    let counts = bucket_counts(&items, now);

    assert_eq!(counts.today, 2);
    assert_eq!(counts.tomorrow, 1);
    assert_eq!(counts.future, 3);
    assert_eq!(counts.expired, 2);
    assert_eq!(counts.total(), items.len());
    assert_eq!(counts.iter().count(), 4);
}

#[test]
fn test_counts_present_when_empty() {
    let now = at(2025, 6, 10, 13, 0);
    let items: Vec<DeliveryItem> = Vec::new();
    let counts = bucket_counts(&items, now);
    for bucket in Bucket::iter() {
        assert_eq!(counts.get(bucket), 0);
    }
    assert_eq!(
        counts.iter().map(|(b, _)| b).collect::<Vec<_>>(),
        Bucket::iter().collect::<Vec<_>>()
    );
}

#[test]
fn test_counts_ignore_order() {
    let now = at(2025, 6, 10, 13, 0);
    let items = sample();
    let mut reversed = items.clone();
    reversed.reverse();
    assert_eq!(bucket_counts(&items, now), bucket_counts(&reversed, now));
}

#[test]
fn test_filter_preserves_order_and_matches_counts() {
    let now = at(2025, 6, 10, 13, 0);
    let items = sample();
    let counts = bucket_counts(&items, now);

    for bucket in Bucket::iter() {
        let filtered = filter_by_bucket(&items, bucket, now);
        assert_eq!(filtered.len(), counts.get(bucket), "bucket {}", bucket);

        // Subsequence of the input, in input order.
        let mut positions = filtered
            .iter()
            .map(|f| items.iter().position(|i| i.id == f.id).unwrap());
        let mut last = positions.next();
        for p in positions {
            assert!(Some(p) > last);
            last = Some(p);
        }
    }

    let ids: Vec<&str> = filter_by_bucket(&items, Bucket::Future, now)
        .into_iter()
        .map(|i| i.id.as_str())
        .collect();
    assert_eq!(ids, vec!["d", "f", "g"]);
}

#[test]
fn test_dst_transition_days_keep_calendar_tabs() {
    // US spring-forward (Mar 9 2025) and fall-back (Nov 2 2025) days.
    let now = at(2025, 3, 9, 3, 30);
    assert_eq!(classify("Mar 9, 2025, 2:30 AM", now), Bucket::Today);
    assert_eq!(classify("Mar 9, 2025, 11:59 PM", now), Bucket::Today);
    assert_eq!(classify("Mar 10, 2025", now), Bucket::Tomorrow);
    assert_eq!(classify("Mar 8, 2025, 11:59 PM", now), Bucket::Expired);

    let now = at(2025, 11, 2, 23, 30);
    assert_eq!(classify("Nov 2, 2025, 1:30 AM", now), Bucket::Today);
    assert_eq!(classify("Nov 3, 2025, 12:00 AM", now), Bucket::Tomorrow);
    assert_eq!(classify("Nov 4, 2025", now), Bucket::Future);

    // Late on the eve of a transition, the short or long day is still tomorrow.
    let now = at(2025, 3, 8, 23, 59);
    assert_eq!(classify("Mar 9, 2025, 11:00 PM", now), Bucket::Tomorrow);
    let now = at(2025, 11, 1, 23, 59);
    assert_eq!(classify("Nov 2, 2025, 1:30 AM", now), Bucket::Tomorrow);
}
