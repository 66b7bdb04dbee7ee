use chrono::NaiveDateTime;

/// US-dollar amount with thousands separators, e.g. `$120,000.00`
pub fn format_money(amount: i32) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{}${}.00", sign, grouped)
}

/// Distance between `from` and `now` in the largest whole unit,
/// e.g. "3 days ago" or "in 2 hours"
pub fn relative_date(from: NaiveDateTime, now: NaiveDateTime) -> String {
    let seconds = (now - from).num_seconds();
    let future = seconds < 0;
    let seconds = seconds.unsigned_abs();

    let (value, unit) = match seconds {
        s if s < 60 => (s, "second"),
        s if s < 60 * 60 => (s / 60, "minute"),
        s if s < 60 * 60 * 24 => (s / (60 * 60), "hour"),
        s if s < 60 * 60 * 24 * 30 => (s / (60 * 60 * 24), "day"),
        s if s < 60 * 60 * 24 * 365 => (s / (60 * 60 * 24 * 30), "month"),
        s => (s / (60 * 60 * 24 * 365), "year"),
    };
    let plural = if value == 1 { "" } else { "s" };

    if future {
        format!("in {} {}{}", value, unit, plural)
    } else {
        format!("{} {}{} ago", value, unit, plural)
    }
}
