// Utility helpers for coercion and number formatting.
//
// The coercion helpers never fail: they report `Coerced::Unparseable` and
// leave it to the null-drop step to remove the row.
use crate::types::Coerced;
use num_format::{Locale, ToFormattedString};

/// Markers pandas reads as NaN by default.
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Exact match only: `" "` and `"NA "` stay as text, as pandas reads them.
pub fn is_na(s: &str) -> bool {
    NA_MARKERS.contains(&s)
}

/// Coerce a comma-formatted amount (`" 17,50,000 "`) to an integer.
///
/// Any `-` in the value is the upstream "no data" placeholder and maps to
/// zero, not to a negative number. Amounts are held as `u128` so that
/// implausibly large entries are kept rather than dropped as unparseable.
pub fn str_to_int(s: Option<&str>) -> Coerced<u128> {
    let Some(raw) = s else {
        return Coerced::Missing;
    };
    let s = raw.replace(',', "");
    if s.contains('-') {
        return Coerced::Parsed(0);
    }
    match s.trim().parse::<u128>() {
        Ok(v) => Coerced::Parsed(v),
        Err(_) => Coerced::Unparseable(raw.to_string()),
    }
}

/// Render a possibly fractional number (`"2007.0"`) as an integer string,
/// truncating toward zero.
pub fn float_to_str(s: Option<&str>) -> Coerced<String> {
    let Some(raw) = s else {
        return Coerced::Missing;
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Coerced::Parsed((v.trunc() as i64).to_string()),
        _ => Coerced::Unparseable(raw.to_string()),
    }
}

pub fn parse_f64_safe(s: Option<&str>) -> Coerced<f64> {
    let Some(raw) = s else {
        return Coerced::Missing;
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Coerced::Parsed(v),
        _ => Coerced::Unparseable(raw.to_string()),
    }
}

/// Round half to even, the way the dashboard's totals have always been
/// rounded (`round(2.5) == 2`).
pub fn round_half_even(v: f64) -> i64 {
    v.round_ties_even() as i64
}

/// Order canonical integer strings numerically (`"999"` before `"1000"`).
pub fn cmp_year(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: u128 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_to_int_strips_separators() {
        assert_eq!(str_to_int(Some(" 17,50,000 ")), Coerced::Parsed(1_750_000));
        assert_eq!(str_to_int(Some("2000000000")), Coerced::Parsed(2_000_000_000));
    }

    #[test]
    fn str_to_int_dash_sentinel_is_zero() {
        assert_eq!(str_to_int(Some(" -   ")), Coerced::Parsed(0));
        assert_eq!(str_to_int(Some("-")), Coerced::Parsed(0));
    }

    #[test]
    fn str_to_int_keeps_unparseable_original() {
        assert_eq!(
            str_to_int(Some("12.5")),
            Coerced::Unparseable("12.5".to_string())
        );
        assert_eq!(str_to_int(None), Coerced::Missing);
    }

    #[test]
    fn str_to_int_keeps_amounts_above_u64() {
        assert_eq!(
            str_to_int(Some("20,000,000,000,000,000,000")),
            Coerced::Parsed(20_000_000_000_000_000_000)
        );
    }

    #[test]
    fn float_to_str_drops_fraction() {
        assert_eq!(float_to_str(Some("2007.0")), Coerced::Parsed("2007".into()));
        assert_eq!(float_to_str(Some("1999")), Coerced::Parsed("1999".into()));
        assert_eq!(float_to_str(Some("2011.9")), Coerced::Parsed("2011".into()));
        assert!(!float_to_str(Some("soon")).is_parsed());
    }

    #[test]
    fn na_markers() {
        assert!(is_na(""));
        assert!(is_na("NaN"));
        assert!(is_na("#N/A N/A"));
        assert!(!is_na("Nantes"));
    }

    #[test]
    fn padded_markers_are_not_na() {
        assert!(!is_na(" "));
        assert!(!is_na("NA "));
        assert!(!is_na("  NaN "));
    }

    #[test]
    fn rounding_is_half_even() {
        assert_eq!(round_half_even(2.5), 2);
        assert_eq!(round_half_even(3.5), 4);
        assert_eq!(round_half_even(349.6), 350);
    }

    #[test]
    fn years_order_numerically() {
        let mut v = vec!["2001", "999", "1990"];
        v.sort_by(|a, b| cmp_year(a, b));
        assert_eq!(v, vec!["999", "1990", "2001"]);
    }

    #[test]
    fn formats_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1500.0, 0), "-1,500");
        assert_eq!(format_int(9855u64), "9,855");
    }
}
