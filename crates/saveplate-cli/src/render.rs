//! Plain-text views of the dashboards.

use chrono::{DateTime, Local, Timelike, Utc};

use saveplate_core::freshness::Freshness;
use saveplate_core::stats::{self, Milestone, MilestoneState, OrphanageSummary, StatusCounts};
use saveplate_types::{
    DeliveryStatus, Donation, NgoStock, Notification, Role, StockItem, Tone, UserProfile,
};

const BAR_WIDTH: usize = 20;
const DASH: &str = "—";

pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..12 => "Good Morning",
        12..18 => "Good Afternoon",
        _ => "Good Evening",
    }
}

fn date(dt: Option<DateTime<Utc>>) -> String {
    dt.map(|d| d.with_timezone(&Local).format("%d %b %Y").to_string())
        .unwrap_or_else(|| DASH.to_string())
}

fn or_dash(s: Option<&str>) -> &str {
    s.filter(|s| !s.is_empty()).unwrap_or(DASH)
}

fn bar(value: u64, max: u64, width: usize) -> String {
    let filled = if max == 0 {
        0
    } else {
        ((value as f64 / max as f64) * width as f64).round() as usize
    };
    "#".repeat(filled.min(width))
}

fn header(profile: Option<&UserProfile>, fallback: &str, now: DateTime<Local>) -> Vec<String> {
    let name = profile.and_then(UserProfile::display_name).unwrap_or(fallback);
    vec![
        format!("{}, {name}", greeting(now.hour())),
        now.format("%A, %-d %B %Y").to_string(),
        String::new(),
    ]
}

fn milestone_lines(serves: u64) -> Vec<String> {
    let m = Milestone::for_serves(serves);
    let status = match m.state {
        MilestoneState::NotStarted => "Start donating to reach your first milestone".to_string(),
        MilestoneState::InProgress => format!("{} serves to go", m.to_go),
        MilestoneState::Reached => "Milestone reached!".to_string(),
    };
    vec![
        format!("Next milestone: {} serves", m.next),
        format!("[{:<width$}] {status}", bar(m.fill, 100, BAR_WIDTH), width = BAR_WIDTH),
    ]
}

fn donation_line(d: &Donation) -> String {
    format!(
        "  {:<24} {:>4} serves  {:<10} {}",
        or_dash(Some(d.food_names().as_str())),
        d.serves(),
        d.status.to_string(),
        date(d.donation_date),
    )
}

// -- Dashboards --

pub fn donor_dashboard(
    profile: Option<&UserProfile>,
    donations: &[Donation],
    now: DateTime<Local>,
) -> String {
    let counts = StatusCounts::of(donations);
    let (month_count, month_serves) = stats::this_month(donations, &now);
    let serves = stats::total_serves(donations);

    let mut out = header(profile, "Donor", now);
    out.push(format!(
        "Pending {}   Accepted {}   Completed {}   Serves {}",
        counts.pending, counts.accepted, counts.completed, serves
    ));
    out.push(format!(
        "This month: {month_count} donations, {month_serves} serves"
    ));
    out.extend(milestone_lines(serves));
    out.push(String::new());
    out.push("Recent donations".to_string());
    let recent = stats::recent(donations, 5);
    if recent.is_empty() {
        out.push("  No donations yet".to_string());
    }
    out.extend(recent.into_iter().map(donation_line));
    out.join("\n")
}

pub fn ngo_dashboard(
    profile: Option<&UserProfile>,
    available: &[Donation],
    accepted: &[Donation],
    now: DateTime<Local>,
) -> String {
    let serves = stats::total_serves(accepted);
    let (month_count, month_serves) = stats::this_month(accepted, &now);

    let mut out = header(profile, "NGO", now);
    out.push(format!(
        "Donations Received {}   Food Stock Items {}   Serves Saved {}",
        accepted.len(),
        stats::food_stock_count(accepted),
        serves
    ));
    out.push(format!(
        "Deliveries Completed {}",
        stats::deliveries_completed(accepted)
    ));
    out.push(format!(
        "Your Impact This Month: {month_count} pickups, {month_serves} serves"
    ));
    out.extend(milestone_lines(serves));
    out.push(String::new());

    out.push(format!("Available in your city ({})", available.len()));
    if available.is_empty() {
        out.push("  Nothing waiting right now".to_string());
    }
    for d in available {
        out.push(format!(
            "  [{}] {}  by {}  at {}, best before {}",
            d.id,
            or_dash(Some(d.food_names().as_str())),
            or_dash(d.donor.as_ref().and_then(|r| r.display_name())),
            or_dash(d.location.as_deref()),
            or_dash(d.best_before.as_deref()),
        ));
    }
    out.push(String::new());
    out.push("Recent pickups".to_string());
    out.extend(stats::recent(accepted, 4).into_iter().map(donation_line));
    out.join("\n")
}

pub fn orphanage_dashboard(
    profile: Option<&UserProfile>,
    donations: &[Donation],
    now: DateTime<Local>,
) -> String {
    let summary = OrphanageSummary::of(donations);

    let mut out = header(profile, "Orphanage", now);
    out.push(format!(
        "Total {}   Received {}   Upcoming {}   Serves Received {}",
        summary.total, summary.received, summary.upcoming, summary.serves_received
    ));
    if let Some(children) = profile.map(|p| p.children_count).filter(|c| *c > 0) {
        out.push(format!("Children: {children}"));
    }
    out.push(String::new());

    out.push("Upcoming".to_string());
    let upcoming: Vec<&Donation> = donations.iter().filter(|d| stats::is_upcoming(d)).collect();
    if upcoming.is_empty() {
        out.push("  No upcoming donations".to_string());
    }
    for d in upcoming {
        out.push(format!(
            "  [{}] {}  from {}",
            d.id,
            or_dash(Some(stats::received_food_names(d).as_str())),
            or_dash(d.accepted_by.as_ref().and_then(|r| r.display_name())),
        ));
    }
    out.push(String::new());
    out.push("Recently received".to_string());
    for d in stats::recently_received(donations, 5) {
        out.push(format!(
            "  {:<24} {:>4} serves  {}",
            or_dash(Some(stats::received_food_names(d).as_str())),
            stats::delivered_serves(d),
            date(
                d.my_donated_items
                    .first()
                    .and_then(|i| i.delivered_at)
                    .or(d.updated_at)
            ),
        ));
    }
    out.join("\n")
}

// -- Analytics --

pub fn analytics(role: Role, donations: &[Donation], now: DateTime<Local>) -> String {
    let counts = StatusCounts::of(donations);
    let mut out = vec![format!("Analytics ({role})"), String::new()];

    let buckets = match role {
        Role::Orphanage => {
            let received: Vec<&Donation> =
                donations.iter().filter(|d| stats::is_received(d)).collect();
            out.push(format!(
                "Received {} of {} ({}%)",
                received.len(),
                counts.total,
                OrphanageSummary::of(donations).receive_rate()
            ));
            stats::monthly_buckets_by(received, &now, stats::delivered_serves)
        }
        _ => {
            out.push(format!(
                "Total {}   Acceptance rate {}%   Completion rate {}%",
                counts.total,
                counts.acceptance_rate(),
                counts.completion_rate()
            ));
            stats::monthly_buckets(donations, &now)
        }
    };
    out.push(String::new());

    out.push("Serves per month".to_string());
    let max = buckets.iter().map(|b| b.serves).max().unwrap_or(0);
    for b in &buckets {
        out.push(format!(
            "  {:<8} {:<width$} {:>5} serves  {:>3} donations",
            b.label,
            bar(b.serves, max, BAR_WIDTH),
            b.serves,
            b.donations,
            width = BAR_WIDTH
        ));
    }
    out.push(String::new());

    out.push("Top items".to_string());
    let top = stats::top_items(donations, 6);
    if top.is_empty() {
        out.push(format!("  {DASH}"));
    }
    for item in top {
        out.push(format!("  {:<20} {}", item.name, item.count));
    }

    if role != Role::Orphanage {
        out.push(String::new());
        out.push("Status".to_string());
        for (label, n) in counts.breakdown() {
            out.push(format!("  {label:<10} {n}"));
        }
    }
    out.push(String::new());
    out.extend(milestone_lines(match role {
        Role::Orphanage => OrphanageSummary::of(donations).serves_received,
        _ => stats::total_serves(donations),
    }));
    out.join("\n")
}

// -- Stock --

fn freshness_cells(item: &StockItem, now: DateTime<Utc>) -> String {
    let f = Freshness::of_item(item, now);
    let tier = f.urgency().map(|u| u.as_str()).unwrap_or("");
    format!("{} {:>8} {tier}", f.bar(10), f.to_string())
}

/// NGO food stock with a live countdown column.
pub fn stock_table(items: &[StockItem], now: DateTime<Utc>) -> String {
    if items.is_empty() {
        return "No food in stock".to_string();
    }
    let mut out = vec![format!(
        "{:<14} {:<20} {:>6}  {}",
        "KEY", "ITEM", "SERVES", "FRESHNESS"
    )];
    for item in items {
        out.push(format!(
            "{:<14} {:<20} {:>6}  {}",
            item.key(),
            item.name,
            item.serves,
            freshness_cells(item, now)
        ));
    }
    out.join("\n")
}

/// NGO cards with their requestable stock. Spoiled items are listed but
/// marked, newest pickups first.
pub fn ngo_stock(ngos: &[NgoStock], now: DateTime<Utc>) -> String {
    if ngos.is_empty() {
        return "No NGOs with stock".to_string();
    }
    let mut out = Vec::new();
    for ngo in ngos {
        out.push(format!(
            "{} [{}]  {}  {}",
            or_dash(ngo.ngo_name.as_deref()),
            ngo.id,
            or_dash(ngo.city.as_deref()),
            or_dash(ngo.phone.as_deref()),
        ));
        let mut items = ngo.stock.clone();
        stats::newest_completed_first(&mut items);
        if items.is_empty() {
            out.push("  no items".to_string());
        }
        for item in &items {
            let spoiled = Freshness::of_item(item, now).is_spoiled();
            out.push(format!(
                "  {:<3} {:<20} {:>4} serves  {}{}",
                item.item_index,
                item.name,
                item.serves,
                freshness_cells(item, now),
                if spoiled { "  (cannot request)" } else { "" }
            ));
        }
        out.push(String::new());
    }
    out.join("\n")
}

// -- Lists --

fn tone_mark(tone: Tone) -> &'static str {
    match tone {
        Tone::Success => "+",
        Tone::Warning => "!",
        Tone::Danger => "x",
        Tone::Info => "i",
    }
}

pub fn notifications(list: &[Notification]) -> String {
    if list.is_empty() {
        return "No notifications".to_string();
    }
    let mut out = Vec::new();
    for n in list {
        let unread = if n.read { " " } else { "*" };
        out.push(format!(
            "{unread}[{}] {} {}  ({})",
            tone_mark(n.kind.tone()),
            n.id,
            n.message,
            date(n.created_at)
        ));
        if n.pending_action().is_some() {
            out.push(format!("      run `saveplate resolve {}` to act on this", n.id));
        }
    }
    out.join("\n")
}

pub fn donations(list: &[Donation]) -> String {
    if list.is_empty() {
        return "No donations".to_string();
    }
    list.iter()
        .map(|d| format!("[{}]{}", d.id, donation_line(d)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn delivery_line(d: &Donation) -> String {
    let status = d
        .delivery_status
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "pending".to_string());
    format!(
        "  [{}] {} -> {}  {status}",
        d.id,
        or_dash(Some(d.food_names().as_str())),
        or_dash(d.delivery_to.as_ref().and_then(|r| r.display_name())),
    )
}

pub fn deliveries(list: &[Donation]) -> String {
    let (done, active): (Vec<&Donation>, Vec<&Donation>) = list
        .iter()
        .partition(|d| d.delivery_status == Some(DeliveryStatus::Delivered));
    let mut out = vec![format!("Active deliveries ({})", active.len())];
    out.extend(active.into_iter().map(delivery_line));
    if !done.is_empty() {
        out.push(format!("Completed deliveries ({})", done.len()));
        out.extend(done.into_iter().map(delivery_line));
    }
    out.join("\n")
}

pub fn profiles(list: &[UserProfile], api_base: &str) -> String {
    if list.is_empty() {
        return "Nobody here yet".to_string();
    }
    list.iter()
        .map(|p| {
            let mut line = format!(
                "[{}] {}  {}  {}",
                p.id,
                or_dash(p.display_name()),
                or_dash(p.city.as_deref()),
                or_dash(p.phone.as_deref()),
            );
            if p.children_count > 0 {
                line.push_str(&format!("  {} children", p.children_count));
            }
            if let Some(pic) = p.profile_pic_url(api_base) {
                line.push_str(&format!("  {pic}"));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn profile(p: &UserProfile, api_base: &str) -> String {
    let mut out = vec![
        format!("{} ({})", or_dash(p.display_name()), or_dash(p.role.as_deref())),
        format!("email    {}", or_dash(p.email.as_deref())),
        format!("phone    {}", or_dash(p.phone.as_deref())),
        format!("address  {}", or_dash(p.address.as_deref())),
        format!("city     {}", or_dash(p.city.as_deref())),
    ];
    if let Some(t) = p.donor_type.as_deref() {
        out.push(format!("type     {t}"));
    }
    if let Some(pic) = p.profile_pic_url(api_base) {
        out.push(format!("picture  {pic}"));
    }
    out.push(format!("joined   {}", date(p.created_at)));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use saveplate_types::FoodItem;

    fn stock(name: &str, completed: Option<DateTime<Utc>>) -> StockItem {
        StockItem {
            donation_id: "d1".into(),
            item_index: 0,
            name: name.into(),
            serves: 5,
            best_before: Some("4 hours".into()),
            completed_at: completed,
        }
    }

    #[test]
    fn greeting_by_hour() {
        assert_eq!(greeting(0), "Good Morning");
        assert_eq!(greeting(11), "Good Morning");
        assert_eq!(greeting(12), "Good Afternoon");
        assert_eq!(greeting(18), "Good Evening");
    }

    #[test]
    fn stock_rows_show_countdown_and_tier() {
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let now = start + TimeDelta::hours(3) + TimeDelta::minutes(30);
        let table = stock_table(&[stock("Rice", Some(start)), stock("Dal", None)], now);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[1].contains("30m 0s"));
        assert!(lines[1].ends_with("critical"));
        assert!(lines[2].contains(DASH));
    }

    #[test]
    fn ngo_stock_lists_newest_pickup_first() {
        let older = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let newer = older + TimeDelta::hours(1);
        let ngo = NgoStock {
            id: "n1".into(),
            ngo_name: Some("Helping Hands".into()),
            stock: vec![stock("Old", Some(older)), stock("New", Some(newer))],
            ..Default::default()
        };
        let text = ngo_stock(&[ngo], newer);
        let new_at = text.find("New").unwrap();
        let old_at = text.find("Old").unwrap();
        assert!(new_at < old_at);
    }

    #[test]
    fn analytics_lists_six_months_and_top_items() {
        let now = Local::now();
        let d = Donation {
            id: "d1".into(),
            donation_date: Some(Utc::now()),
            items: vec![
                FoodItem { name: "Rice".into(), serves: 3 },
                FoodItem { name: "rice".into(), serves: 2 },
            ],
            ..Default::default()
        };
        let text = analytics(Role::Donor, &[d], now);
        assert!(text
            .lines()
            .any(|l| l.trim_start().starts_with("Rice") && l.trim_end().ends_with(" 2")));
        let month_rows = text
            .lines()
            .filter(|l| l.contains(" serves ") && l.contains("donations"))
            .count();
        assert_eq!(month_rows, 6);
    }

    #[test]
    fn deliveries_split_active_and_completed() {
        let mut a = Donation { id: "a".into(), ..Default::default() };
        a.delivery_status = Some(DeliveryStatus::AwaitingConfirmation);
        let mut b = Donation { id: "b".into(), ..Default::default() };
        b.delivery_status = Some(DeliveryStatus::Delivered);
        let text = deliveries(&[b, a]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Active deliveries (1)");
        assert!(lines[1].contains("[a]") && lines[1].ends_with("awaiting confirmation"));
        assert_eq!(lines[2], "Completed deliveries (1)");
        assert!(lines[3].contains("[b]"));
    }
}
