//! Money and progress formatting for the views

use crate::models::Jar;

/// Indicator position used when a jar has no target
pub const MIDPOINT_PERCENT: &str = "50%";

/// Converts an amount in minor units to a fixed two-decimal string.
///
/// `123456` becomes `"1234.56"`, `0` becomes `"0.00"`. Integer arithmetic keeps
/// the result exact for every `i64`.
pub fn convert_to_money_format(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Share of the goal reached, as a whole percent string.
///
/// A positive goal gives `round(balance / goal * 100)%`, halves rounding up like
/// JavaScript's `Math.round`. A zero goal gives the midpoint; a missing or
/// negative goal gives nothing.
pub fn convert_progress_in_percent(balance: i64, goal: Option<i64>) -> Option<String> {
    match goal {
        Some(goal) if goal > 0 => {
            let ratio = balance as f64 / goal as f64 * 100.0;
            let rounded = (ratio + 0.5).floor() as i64;
            Some(format!("{}%", rounded))
        }
        Some(0) => Some(MIDPOINT_PERCENT.to_string()),
        _ => None,
    }
}

/// Indicator value for the jar page: the computed progress, or the midpoint
/// when the jar has no target.
pub fn jar_progress(jar: &Jar) -> String {
    if !jar.has_goal() {
        return MIDPOINT_PERCENT.to_string();
    }
    convert_progress_in_percent(jar.balance, jar.goal)
        .unwrap_or_else(|| MIDPOINT_PERCENT.to_string())
}

/// Sum of all jar balances, money formatted
pub fn total_balance(jars: &[Jar]) -> String {
    let total: i64 = jars.iter().map(|jar| jar.balance).sum();
    convert_to_money_format(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Currency;

    fn jar(balance: i64, goal: Option<i64>) -> Jar {
        Jar {
            id: "j".to_string(),
            send_id: None,
            title: "Jar".to_string(),
            balance,
            goal,
            currency: Currency {
                code: 980,
                name: "UAH".to_string(),
                symbol: Some("₴".to_string()),
                flag: None,
            },
            is_budget: None,
        }
    }

    #[test]
    fn test_money_format() {
        assert_eq!(convert_to_money_format(100), "1.00");
        assert_eq!(convert_to_money_format(123456), "1234.56");
        assert_eq!(convert_to_money_format(0), "0.00");
        assert_eq!(convert_to_money_format(5), "0.05");
        assert_eq!(convert_to_money_format(1005), "10.05");
        assert_eq!(convert_to_money_format(-2550), "-25.50");
        assert_eq!(convert_to_money_format(-7), "-0.07");
        assert_eq!(convert_to_money_format(i64::MIN), "-92233720368547758.08");
    }

    #[test]
    fn test_money_format_matches_float_division() {
        for amount in [1, 99, 101, 4_999, 12_345_678, -1, -150, -99_999] {
            assert_eq!(
                convert_to_money_format(amount),
                format!("{:.2}", amount as f64 / 100.0)
            );
        }
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(convert_progress_in_percent(2000, Some(20000)).as_deref(), Some("10%"));
        assert_eq!(convert_progress_in_percent(1, Some(3)).as_deref(), Some("33%"));
        assert_eq!(convert_progress_in_percent(2, Some(3)).as_deref(), Some("67%"));
        assert_eq!(convert_progress_in_percent(30000, Some(20000)).as_deref(), Some("150%"));
        assert_eq!(convert_progress_in_percent(1, Some(200)).as_deref(), Some("1%"));
        assert_eq!(convert_progress_in_percent(-1, Some(200)).as_deref(), Some("0%"));
        assert_eq!(convert_progress_in_percent(500, Some(0)).as_deref(), Some("50%"));
        assert_eq!(convert_progress_in_percent(500, None), None);
        assert_eq!(convert_progress_in_percent(500, Some(-10)), None);
    }

    #[test]
    fn test_jar_progress_falls_back_to_midpoint() {
        assert_eq!(jar_progress(&jar(5000, Some(10000))), "50%");
        assert_eq!(jar_progress(&jar(2500, Some(10000))), "25%");
        assert_eq!(jar_progress(&jar(2500, None)), "50%");
        assert_eq!(jar_progress(&jar(2500, Some(0))), "50%");
    }

    #[test]
    fn test_total_balance() {
        assert_eq!(total_balance(&[]), "0.00");
        assert_eq!(total_balance(&[jar(1050, None), jar(2025, Some(5000))]), "30.75");
    }
}
