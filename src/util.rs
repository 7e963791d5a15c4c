/// `m:ss` countdown display
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Group digits by thousands: 1234567 -> "1,234,567"
pub fn format_score(score: u64) -> String {
    let digits = score.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

pub fn format_multiplier(multiplier: f64) -> String {
    format!("x{multiplier:.2}")
}

pub fn pluralize_days(days: u32) -> String {
    if days == 1 {
        format!("{days} Day")
    } else {
        format!("{days} Days")
    }
}
