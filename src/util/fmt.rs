// Display helpers for server-computed numbers. Nothing here recomputes a value.

pub fn sign(value: f64) -> &'static str {
    if value > 0.0 { "+" } else { "" }
}

// `{:.1}` breaks exact ties to even; the web app rounds them away from zero.
// A double sits exactly on a one-decimal tie only when it is an odd number of quarters.
fn round_1dp(value: f64) -> f64 {
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        (value * 10.0).round() / 10.0
    } else {
        value
    }
}

/// `+12.3` / `-4.0` / `0.0`
pub fn signed_1dp(value: f64) -> String {
    format!("{}{:.1}", sign(value), round_1dp(value))
}

/// `+12.3%`
pub fn percent(value: f64) -> String {
    format!("{}%", signed_1dp(value))
}

/// Signed integer, e.g. a row-count diff: `+1`, `-3`, `0`.
pub fn signed_int(value: i64) -> String {
    if value > 0 { format!("+{value}") } else { value.to_string() }
}

pub fn fixed_1dp(value: f64) -> String {
    format!("{:.1}", round_1dp(value))
}
