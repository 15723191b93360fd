use chrono::{DateTime, Utc};

/// Compact countdown to an option expiry, e.g. `3d 04h` or `04h 12m`.
pub fn time_to_expiry(expiry: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = expiry - now;

    if diff.num_seconds() <= 0 {
        return "EXPIRED".to_string();
    }

    let days = diff.num_days();
    let hours = diff.num_hours() % 24;
    let mins = diff.num_minutes() % 60;

    if days > 0 {
        format!("{}d {:02}h", days, hours)
    } else {
        format!("{:02}h {:02}m", hours, mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn formats_days_and_hours() {
        let now = Utc::now();
        let expiry = now + Duration::days(3) + Duration::hours(4) + Duration::minutes(5);
        assert_eq!(time_to_expiry(expiry, now), "3d 04h");
    }

    #[test]
    fn formats_sub_day() {
        let now = Utc::now();
        let expiry = now + Duration::hours(2) + Duration::minutes(7);
        assert_eq!(time_to_expiry(expiry, now), "02h 07m");
    }

    #[test]
    fn past_expiry() {
        let now = Utc::now();
        assert_eq!(time_to_expiry(now - Duration::seconds(1), now), "EXPIRED");
    }
}
