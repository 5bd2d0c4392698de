use super::Interval;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn parse_iso_date(date: &str) -> Option<(u32, usize, u32)> {
    let mut parts = date.splitn(3, '-');
    let year: u32 = parts.next()?.parse().ok()?;
    let month: usize = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some((year, month, day))
}

/// Compact axis label for an ISO `YYYY-MM-DD` date.
///
/// - daily / weekly -> `Jan 02`
/// - monthly -> `Jan 2024`
///
/// Unparseable dates fall back to the raw input.
pub fn axis_label(date: &str, interval: Interval) -> String {
    let Some((year, month, day)) = parse_iso_date(date) else {
        return date.to_string();
    };
    match interval {
        Interval::Daily | Interval::Weekly => format!("{} {:02}", MONTHS[month - 1], day),
        Interval::Monthly => format!("{} {}", MONTHS[month - 1], year),
    }
}

/// Fuller tooltip label, always unambiguous across years.
pub fn full_label(date: &str, interval: Interval) -> String {
    let Some((year, month, day)) = parse_iso_date(date) else {
        return date.to_string();
    };
    match interval {
        Interval::Daily => format!("{} {:02}, {}", MONTHS[month - 1], day, year),
        Interval::Weekly => format!("Week of {} {:02}, {}", MONTHS[month - 1], day, year),
        Interval::Monthly => format!("{} {}", MONTHS[month - 1], year),
    }
}

#[cfg(test)]
mod tests {
    use super::{axis_label, full_label};
    use crate::domain::analysis::Interval;

    #[test]
    fn labels_by_interval() {
        assert_eq!(axis_label("2024-01-02", Interval::Daily), "Jan 02");
        assert_eq!(axis_label("2024-01-02", Interval::Weekly), "Jan 02");
        assert_eq!(axis_label("2024-01-02", Interval::Monthly), "Jan 2024");
        assert_eq!(full_label("2024-01-02", Interval::Daily), "Jan 02, 2024");
        assert_eq!(full_label("2024-01-02", Interval::Weekly), "Week of Jan 02, 2024");
        assert_eq!(full_label("2024-01-02", Interval::Monthly), "Jan 2024");
    }

    #[test]
    fn malformed_date_passes_through() {
        assert_eq!(axis_label("not-a-date", Interval::Daily), "not-a-date");
        assert_eq!(full_label("2024-13-01", Interval::Monthly), "2024-13-01");
    }
}
