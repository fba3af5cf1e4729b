use crate::schema::{ValidatorKind, ValidatorRule};

/// The outcome of running a field's validators: at most one blocking error
/// and one informational warning message.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct ValidationOutcome {
    pub error: String,
    pub warning: String,
}

/// Runs the declared validators against a non-empty raw value. The first
/// failing rule per channel wins; rules flagged `warning` never block.
pub(crate) fn run_validators(rules: &[ValidatorRule], raw: &str) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();
    for rule in rules {
        let Some(message) = check(rule, raw) else {
            continue;
        };
        if rule.warning {
            if outcome.warning.is_empty() {
                outcome.warning = message;
            }
        } else if outcome.error.is_empty() {
            outcome.error = message;
        }
    }
    outcome
}

/// Returns the failure message for one rule, or `None` when it passes.
fn check(rule: &ValidatorRule, raw: &str) -> Option<String> {
    let parsed = raw.trim().parse::<f64>();
    match rule.kind {
        ValidatorKind::Numeric => match parsed {
            Ok(v) if v.is_finite() => None,
            _ => Some("Value must be a number".to_string()),
        },
        ValidatorKind::Integer => match parsed {
            Ok(v) if v.is_finite() && v.fract() == 0.0 => None,
            _ => Some("Value must be a whole number".to_string()),
        },
        ValidatorKind::Gt | ValidatorKind::Gte | ValidatorKind::Lt | ValidatorKind::Lte => {
            let Ok(v) = parsed else {
                return Some("Value must be a number".to_string());
            };
            let threshold = rule.args.first().copied().unwrap_or(0.0);
            let (passes, relation) = match rule.kind {
                ValidatorKind::Gt => (v > threshold, "greater than"),
                ValidatorKind::Gte => (v >= threshold, "at least"),
                ValidatorKind::Lt => (v < threshold, "less than"),
                ValidatorKind::Lte => (v <= threshold, "at most"),
                _ => unreachable!(),
            };
            if passes {
                None
            } else {
                Some(format!("Value must be {} {}", relation, format_number(threshold)))
            }
        }
    }
}

/// Formats a threshold the way values are displayed: no trailing `.0`. The
/// integer path only applies inside `i64` range, where the cast is exact.
pub(crate) fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Rounds a numeric default to two decimal places; non-numeric defaults are
/// passed through untouched.
pub(crate) fn round_default(raw: &str) -> String {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => format_number((v * 100.0).round() / 100.0),
        _ => raw.to_string(),
    }
}
