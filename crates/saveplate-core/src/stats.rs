//! Dashboard and analytics aggregation over donation lists.
//!
//! Everything here is a pure function of its inputs; callers pass `now`
//! explicitly so month windows are reproducible.

use std::cmp::Reverse;

use chrono::{DateTime, Datelike, TimeZone, Utc};

use saveplate_types::{
    Donation, DonationStatus, OrphanageStatus, StockItem,
};

pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Number of months shown in the "over time" charts.
pub const TRAILING_MONTHS: usize = 6;

/// `round(part / total * 100)`, or 0 when there is nothing to divide.
pub fn rate(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

// -- Status counts --

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub accepted: usize,
    pub completed: usize,
}

impl StatusCounts {
    pub fn of(donations: &[Donation]) -> Self {
        let mut counts = StatusCounts {
            total: donations.len(),
            ..Default::default()
        };
        for d in donations {
            match d.status {
                DonationStatus::Pending => counts.pending += 1,
                DonationStatus::Accepted => counts.accepted += 1,
                DonationStatus::Completed => counts.completed += 1,
                DonationStatus::Other(_) => {}
            }
        }
        counts
    }

    /// Share of donations an NGO picked up (accepted or completed).
    pub fn acceptance_rate(&self) -> u32 {
        rate(self.accepted + self.completed, self.total)
    }

    pub fn completion_rate(&self) -> u32 {
        rate(self.completed, self.total)
    }

    /// Pie slices, in display order, with empty ones dropped.
    pub fn breakdown(&self) -> Vec<(&'static str, usize)> {
        [
            ("Completed", self.completed),
            ("Accepted", self.accepted),
            ("Pending", self.pending),
        ]
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .collect()
    }
}

pub fn total_serves(donations: &[Donation]) -> u64 {
    donations.iter().map(Donation::serves).sum()
}

// -- Monthly buckets --

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthBucket {
    pub year: i32,
    /// 1-based
    pub month: u32,
    pub label: String,
    pub donations: usize,
    pub serves: u64,
}

/// The trailing six calendar months ending with `now`'s month, oldest first.
/// Months without donations are present with zero counts.
pub fn monthly_buckets<Tz: TimeZone>(donations: &[Donation], now: &DateTime<Tz>) -> Vec<MonthBucket> {
    monthly_buckets_by(donations.iter(), now, |d| d.serves())
}

/// Like [`monthly_buckets`] over any subset, with a custom serves measure.
pub fn monthly_buckets_by<'a, Tz, I, F>(donations: I, now: &DateTime<Tz>, serves: F) -> Vec<MonthBucket>
where
    Tz: TimeZone,
    I: IntoIterator<Item = &'a Donation>,
    F: Fn(&Donation) -> u64,
{
    let anchor = now.year() * 12 + now.month0() as i32;
    let mut buckets: Vec<MonthBucket> = (0..TRAILING_MONTHS as i32)
        .rev()
        .map(|back| {
            let idx = anchor - back;
            let (year, month0) = (idx.div_euclid(12), idx.rem_euclid(12) as u32);
            MonthBucket {
                year,
                month: month0 + 1,
                label: format!("{} {}", MONTHS[month0 as usize], year),
                donations: 0,
                serves: 0,
            }
        })
        .collect();

    let tz = now.timezone();
    for d in donations {
        let Some(date) = d.donation_date else { continue };
        let local = date.with_timezone(&tz);
        let idx = local.year() * 12 + local.month0() as i32;
        let offset = anchor - idx;
        if !(0..TRAILING_MONTHS as i32).contains(&offset) {
            continue;
        }
        let bucket = &mut buckets[TRAILING_MONTHS - 1 - offset as usize];
        bucket.donations += 1;
        bucket.serves += serves(d);
    }
    buckets
}

/// Donations dated in `now`'s calendar month and the serves they carry.
pub fn this_month<Tz: TimeZone>(donations: &[Donation], now: &DateTime<Tz>) -> (usize, u64) {
    let tz = now.timezone();
    donations
        .iter()
        .filter(|d| {
            d.donation_date.is_some_and(|dt| {
                let local = dt.with_timezone(&tz);
                local.year() == now.year() && local.month() == now.month()
            })
        })
        .fold((0, 0), |(n, s), d| (n + 1, s + d.serves()))
}

// -- Top items --

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFrequency {
    pub name: String,
    pub count: usize,
}

/// Most frequently donated food names, grouped case-insensitively.
/// Ties keep the order in which names were first seen.
pub fn top_items(donations: &[Donation], n: usize) -> Vec<ItemFrequency> {
    let mut groups: Vec<(String, usize)> = Vec::new();
    for item in donations.iter().flat_map(|d| &d.items) {
        let key = item.name.to_lowercase();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, count)) => *count += 1,
            None => groups.push((key, 1)),
        }
    }
    groups.sort_by_key(|(_, count)| Reverse(*count));
    groups
        .into_iter()
        .take(n)
        .map(|(key, count)| ItemFrequency {
            name: capitalize(&key),
            count,
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// -- NGO --

/// Items of completed pickups not yet passed on to an orphanage.
pub fn food_stock_count(donations: &[Donation]) -> usize {
    donations
        .iter()
        .filter(|d| d.status == DonationStatus::Completed)
        .map(|d| {
            (0..d.items.len())
                .filter(|idx| !d.donated_items.iter().any(|di| di.item_index == Some(*idx)))
                .count()
        })
        .sum()
}

/// Donations with at least one item confirmed delivered to an orphanage.
pub fn deliveries_completed(donations: &[Donation]) -> usize {
    donations
        .iter()
        .filter(|d| d.donated_items.iter().any(|di| di.is_delivered()))
        .count()
}

/// Newest donations first, at most `n`.
pub fn recent(donations: &[Donation], n: usize) -> Vec<&Donation> {
    let mut sorted: Vec<&Donation> = donations.iter().collect();
    sorted.sort_by_key(|d| Reverse(d.donation_date));
    sorted.truncate(n);
    sorted
}

/// Stock items with the most recently completed pickups first; undated items last.
pub fn newest_completed_first(items: &mut [StockItem]) {
    items.sort_by_key(|i| Reverse(i.completed_at.unwrap_or(DateTime::<Utc>::MIN_UTC)));
}

// -- Orphanage --

pub fn is_upcoming(d: &Donation) -> bool {
    match &d.orphanage_status {
        Some(status) => *status == OrphanageStatus::Upcoming,
        None => d.status == DonationStatus::Accepted,
    }
}

pub fn is_received(d: &Donation) -> bool {
    match &d.orphanage_status {
        Some(status) => *status == OrphanageStatus::Received,
        None => d.status == DonationStatus::Completed,
    }
}

/// Serves that actually reached this orphanage. When only some items of a
/// donation were redirected here, only those count.
pub fn delivered_serves(d: &Donation) -> u64 {
    if d.my_donated_items.is_empty() {
        return d.serves();
    }
    d.my_donated_items
        .iter()
        .filter_map(|di| di.item_index.and_then(|idx| d.items.get(idx)))
        .map(|item| u64::from(item.serves))
        .sum()
}

pub fn received_food_names(d: &Donation) -> String {
    if d.my_donated_items.is_empty() {
        return d.food_names();
    }
    d.my_donated_items
        .iter()
        .filter_map(|di| {
            di.item_name
                .clone()
                .or_else(|| di.item_index.and_then(|idx| d.items.get(idx)).map(|i| i.name.clone()))
        })
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Received donations, latest delivery first.
pub fn recently_received(donations: &[Donation], n: usize) -> Vec<&Donation> {
    let mut received: Vec<&Donation> = donations.iter().filter(|d| is_received(d)).collect();
    received.sort_by_key(|d| {
        Reverse(
            d.my_donated_items
                .first()
                .and_then(|di| di.delivered_at)
                .or(d.updated_at)
                .or(d.donation_date),
        )
    });
    received.truncate(n);
    received
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrphanageSummary {
    pub total: usize,
    pub received: usize,
    pub upcoming: usize,
    pub serves_received: u64,
}

impl OrphanageSummary {
    pub fn of(donations: &[Donation]) -> Self {
        let received: Vec<&Donation> = donations.iter().filter(|d| is_received(d)).collect();
        OrphanageSummary {
            total: donations.len(),
            received: received.len(),
            upcoming: donations.iter().filter(|d| is_upcoming(d)).count(),
            serves_received: received.iter().copied().map(delivered_serves).sum(),
        }
    }

    pub fn receive_rate(&self) -> u32 {
        rate(self.received, self.total)
    }
}

// -- Milestones --

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneState {
    NotStarted,
    InProgress,
    Reached,
}

/// Progress toward the next round hundred of serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestone {
    pub next: u64,
    pub to_go: u64,
    /// Bar fill, 0 to 100
    pub fill: u64,
    pub state: MilestoneState,
}

impl Milestone {
    pub fn for_serves(serves: u64) -> Self {
        let next = serves.max(1).div_ceil(100) * 100;
        let to_go = next - serves;
        let fill = match serves % 100 {
            0 if serves > 0 => 100,
            r => r,
        };
        let state = if to_go > 0 {
            if serves == 0 {
                MilestoneState::NotStarted
            } else {
                MilestoneState::InProgress
            }
        } else {
            MilestoneState::Reached
        };
        Milestone {
            next,
            to_go,
            fill,
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use saveplate_types::{DonatedItem, FoodItem};

    fn item(name: &str, serves: u32) -> FoodItem {
        FoodItem {
            name: name.into(),
            serves,
        }
    }

    fn donation(date: (i32, u32, u32), status: DonationStatus, items: Vec<FoodItem>) -> Donation {
        Donation {
            id: format!("{}-{}-{}", date.0, date.1, date.2),
            donation_date: Some(Utc.with_ymd_and_hms(date.0, date.1, date.2, 10, 0, 0).unwrap()),
            status,
            items,
            ..Default::default()
        }
    }

    #[test]
    fn counts_by_status_and_rate() {
        let ds = vec![
            donation((2026, 1, 1), DonationStatus::Pending, vec![]),
            donation((2026, 1, 2), DonationStatus::Accepted, vec![]),
            donation((2026, 1, 3), DonationStatus::Completed, vec![]),
            donation((2026, 1, 4), DonationStatus::Completed, vec![]),
            donation((2026, 1, 5), DonationStatus::Other("cancelled".into()), vec![]),
        ];
        let c = StatusCounts::of(&ds);
        assert_eq!((c.total, c.pending, c.accepted, c.completed), (5, 1, 1, 2));
        assert_eq!(c.acceptance_rate(), 60);
        assert_eq!(StatusCounts::default().acceptance_rate(), 0);
        assert_eq!(c.breakdown(), vec![("Completed", 2), ("Accepted", 1), ("Pending", 1)]);
    }

    #[test]
    fn six_month_window_is_zero_filled() {
        let now = Utc.with_ymd_and_hms(2026, 2, 15, 9, 0, 0).unwrap();
        let ds = vec![
            donation((2025, 9, 3), DonationStatus::Completed, vec![item("Rice", 10)]),
            donation((2025, 9, 28), DonationStatus::Pending, vec![item("Dal", 5), item("Roti", 3)]),
            donation((2026, 1, 31), DonationStatus::Accepted, vec![item("Rice", 20)]),
            donation((2026, 2, 1), DonationStatus::Completed, vec![item("Khichdi", 7)]),
            // outside the window
            donation((2025, 8, 31), DonationStatus::Completed, vec![item("Rice", 99)]),
            donation((2026, 3, 1), DonationStatus::Completed, vec![item("Rice", 99)]),
        ];
        let buckets = monthly_buckets(&ds, &now);
        let summary: Vec<(&str, usize, u64)> = buckets
            .iter()
            .map(|b| (b.label.as_str(), b.donations, b.serves))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Sep 2025", 2, 18),
                ("Oct 2025", 0, 0),
                ("Nov 2025", 0, 0),
                ("Dec 2025", 0, 0),
                ("Jan 2026", 1, 20),
                ("Feb 2026", 1, 7),
            ]
        );
        assert_eq!(buckets[0].month, 9);
    }

    #[test]
    fn buckets_follow_the_viewers_time_zone() {
        // 2026-01-31 20:00 UTC is already February in IST.
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let now = ist.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap();
        let mut d = donation((2026, 1, 31), DonationStatus::Completed, vec![item("Rice", 4)]);
        d.donation_date = Some(Utc.with_ymd_and_hms(2026, 1, 31, 20, 0, 0).unwrap());
        let buckets = monthly_buckets(std::slice::from_ref(&d), &now);
        assert_eq!(buckets[5].label, "Feb 2026");
        assert_eq!(buckets[5].donations, 1);
        assert_eq!(buckets[4].donations, 0);
    }

    #[test]
    fn top_items_group_case_insensitively() {
        let ds = vec![
            donation((2026, 1, 1), DonationStatus::Pending, vec![item("Rice", 1), item("rice", 1)]),
            donation((2026, 1, 2), DonationStatus::Pending, vec![item("Dal", 1)]),
        ];
        assert_eq!(
            top_items(&ds, 6),
            vec![
                ItemFrequency { name: "Rice".into(), count: 2 },
                ItemFrequency { name: "Dal".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn top_items_truncate_and_keep_tie_order() {
        let ds = vec![donation(
            (2026, 1, 1),
            DonationStatus::Pending,
            vec![item("PULAO", 1), item("idli", 1), item("Idli", 1), item("poha", 1)],
        )];
        let top = top_items(&ds, 2);
        assert_eq!(top[0], ItemFrequency { name: "Idli".into(), count: 2 });
        assert_eq!(top[1], ItemFrequency { name: "Pulao".into(), count: 1 });
    }

    #[test]
    fn stock_count_skips_donated_items() {
        let mut d = donation(
            (2026, 1, 1),
            DonationStatus::Completed,
            vec![item("Rice", 1), item("Dal", 1), item("Roti", 1)],
        );
        d.donated_items = vec![DonatedItem {
            item_index: Some(1),
            ..Default::default()
        }];
        let pending = donation((2026, 1, 2), DonationStatus::Accepted, vec![item("Poha", 1)]);
        assert_eq!(food_stock_count(&[d, pending]), 2);
    }

    #[test]
    fn delivered_serves_counts_only_redirected_items() {
        let mut d = donation(
            (2026, 1, 1),
            DonationStatus::Completed,
            vec![item("Rice", 10), item("Dal", 6)],
        );
        assert_eq!(delivered_serves(&d), 16);
        d.my_donated_items = vec![DonatedItem {
            item_index: Some(1),
            ..Default::default()
        }];
        assert_eq!(delivered_serves(&d), 6);
        assert_eq!(received_food_names(&d), "Dal");
    }

    #[test]
    fn large_serves_sum_without_overflow() {
        let mut d = donation(
            (2026, 1, 1),
            DonationStatus::Completed,
            vec![item("Rice", u32::MAX), item("Dal", u32::MAX)],
        );
        let both = 2 * u64::from(u32::MAX);
        assert_eq!(total_serves(std::slice::from_ref(&d)), both);
        assert_eq!(OrphanageSummary::of(std::slice::from_ref(&d)).serves_received, both);
        d.my_donated_items = vec![
            DonatedItem { item_index: Some(0), ..Default::default() },
            DonatedItem { item_index: Some(1), ..Default::default() },
        ];
        assert_eq!(delivered_serves(&d), both);
    }

    #[test]
    fn orphanage_classification_prefers_orphanage_status() {
        let mut a = donation((2026, 1, 1), DonationStatus::Completed, vec![item("Rice", 5)]);
        a.orphanage_status = Some(OrphanageStatus::Upcoming);
        let b = donation((2026, 1, 2), DonationStatus::Completed, vec![item("Dal", 3)]);
        let c = donation((2026, 1, 3), DonationStatus::Accepted, vec![item("Roti", 2)]);
        assert!(is_upcoming(&a) && !is_received(&a));
        assert!(is_received(&b));
        assert!(is_upcoming(&c));
        let summary = OrphanageSummary::of(&[a, b, c]);
        assert_eq!(summary.received, 1);
        assert_eq!(summary.upcoming, 2);
        assert_eq!(summary.serves_received, 3);
        assert_eq!(summary.receive_rate(), 33);
    }

    #[test]
    fn milestone_arithmetic() {
        assert_eq!(
            Milestone::for_serves(0),
            Milestone { next: 100, to_go: 100, fill: 0, state: MilestoneState::NotStarted }
        );
        assert_eq!(
            Milestone::for_serves(42),
            Milestone { next: 100, to_go: 58, fill: 42, state: MilestoneState::InProgress }
        );
        assert_eq!(
            Milestone::for_serves(200),
            Milestone { next: 200, to_go: 0, fill: 100, state: MilestoneState::Reached }
        );
    }

    #[test]
    fn recent_orders_newest_first() {
        let ds = vec![
            donation((2026, 1, 5), DonationStatus::Pending, vec![]),
            donation((2026, 1, 9), DonationStatus::Pending, vec![]),
            donation((2026, 1, 1), DonationStatus::Pending, vec![]),
        ];
        let ids: Vec<&str> = recent(&ds, 2).iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["2026-1-9", "2026-1-5"]);
    }

    #[test]
    fn this_month_counts_current_calendar_month() {
        let now = Utc.with_ymd_and_hms(2026, 1, 20, 0, 0, 0).unwrap();
        let ds = vec![
            donation((2026, 1, 2), DonationStatus::Completed, vec![item("Rice", 8)]),
            donation((2025, 12, 30), DonationStatus::Completed, vec![item("Dal", 8)]),
        ];
        assert_eq!(this_month(&ds, &now), (1, 8));
    }
}
