use std::fmt;

/// Furthest a misspelling may be from a label and still get a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Matches `value` against the `Display` labels of `options`, ignoring case.
///
/// Misses name the closest label when one is near enough, otherwise every
/// accepted label.
pub(crate) fn parse_label<T>(kind: &str, value: &str, options: &[T]) -> Result<T, String>
where
    T: Copy + fmt::Display,
{
    let wanted = value.trim().to_lowercase();
    if let Some(found) = options.iter().find(|option| option.to_string() == wanted) {
        return Ok(*found);
    }

    let labels: Vec<String> = options.iter().map(|option| option.to_string()).collect();
    match closest_match(&wanted, &labels) {
        Some(suggestion) => Err(format!(
            "unknown {} '{}', did you mean '{}'?",
            kind, value, suggestion
        )),
        None => Err(format!(
            "unknown {} '{}', expected one of: {}",
            kind,
            value,
            labels.join(", ")
        )),
    }
}

/// Position-wise mismatches plus the length difference. First label wins ties.
pub(crate) fn closest_match<'a>(value: &str, labels: &'a [String]) -> Option<&'a str> {
    let value = value.to_lowercase();
    let mut best: Option<(usize, &str)> = None;
    for label in labels {
        let mismatches = value
            .chars()
            .zip(label.chars())
            .filter(|(a, b)| a != b)
            .count();
        let distance = mismatches + value.chars().count().abs_diff(label.chars().count());
        if best.map_or(true, |(min, _)| distance < min) {
            best = Some((distance, label.as_str()));
        }
    }
    best.filter(|(distance, _)| *distance <= MAX_SUGGESTION_DISTANCE)
        .map(|(_, label)| label)
}

/// Implements `FromStr` and `TryFrom<String>` through [`parse_label`] for an
/// enum with an `ALL` table, so `#[serde(try_from = "String")]` picks it up.
macro_rules! parse_by_label {
    ($ty:ty, $kind:literal) => {
        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(value: &str) -> ::std::result::Result<Self, Self::Err> {
                $crate::names::parse_label($kind, value, &<$ty>::ALL)
            }
        }

        impl TryFrom<String> for $ty {
            type Error = String;

            fn try_from(value: String) -> ::std::result::Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

pub(crate) use parse_by_label;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BalancingStrategy;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn upper_case_names_are_accepted() {
        assert_eq!(
            parse_label("strategy", "ROUND_ROBIN", &BalancingStrategy::ALL),
            Ok(BalancingStrategy::RoundRobin)
        );
        assert_eq!(
            parse_label("strategy", " Cpu_Aware ", &BalancingStrategy::ALL),
            Ok(BalancingStrategy::CpuAware)
        );
    }

    #[test]
    fn near_misses_suggest_the_closest_label() {
        let err = parse_label("strategy", "round_robn", &BalancingStrategy::ALL).unwrap_err();
        assert_eq!(
            err,
            "unknown strategy 'round_robn', did you mean 'round_robin'?"
        );
    }

    #[test]
    fn distant_values_list_every_label() {
        let err = parse_label("strategy", "fastest", &BalancingStrategy::ALL).unwrap_err();
        assert!(err.starts_with("unknown strategy 'fastest', expected one of: round_robin, "));
        assert!(err.ends_with("cpu_aware"));
    }

    #[test]
    fn distance_counts_mismatches_and_length() {
        let options = labels(&["java", "go", "rust"]);
        assert_eq!(closest_match("jav", &options), Some("java"));
        assert_eq!(closest_match("RUST", &options), Some("rust"));
        assert_eq!(closest_match("haskell", &options), None);
        // "gx" is one away from "go" and four from "java".
        assert_eq!(closest_match("gx", &options), Some("go"));
    }
}
