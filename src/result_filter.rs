use crate::image_classifier::interface::Observation;
use std::fmt;

/// Text shown for one classification. Rebuilt on every update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayResult(String);

impl DisplayResult {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.0.lines()
    }
}

impl fmt::Display for DisplayResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn format_observation(observation: &Observation) -> String {
    format!(
        "{} - accurate at {:.2}%",
        observation.label,
        observation.confidence * 100.0
    )
}

/// Looks at the first `max_results` observations only, keeps those strictly
/// above `threshold`, and joins them one per line.
pub fn filter(observations: &[Observation], threshold: f32, max_results: usize) -> DisplayResult {
    let text = observations
        .iter()
        .take(max_results)
        .filter(|observation| observation.confidence > threshold)
        .map(format_observation)
        .collect::<Vec<_>>()
        .join("\n");

    DisplayResult(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f32 = 0.25;
    const MAX_RESULTS: usize = 5;

    #[test]
    fn test_drops_low_confidence_and_keeps_order() {
        let observations = vec![
            Observation::new("cat", 0.9066),
            Observation::new("dog", 0.24),
            Observation::new("fox", 0.30),
        ];

        let result = filter(&observations, THRESHOLD, MAX_RESULTS);

        assert_eq!(
            result.as_str(),
            "cat - accurate at 90.66%\nfox - accurate at 30.00%"
        );
    }

    #[test]
    fn test_empty_input_gives_empty_result() {
        let result = filter(&[], THRESHOLD, MAX_RESULTS);
        assert!(result.is_empty());
        assert_eq!(result.as_str(), "");
    }

    #[test]
    fn test_confidence_equal_to_threshold_is_dropped() {
        let observations = vec![Observation::new("owl", 0.25)];
        assert!(filter(&observations, THRESHOLD, MAX_RESULTS).is_empty());
    }

    #[test]
    fn test_only_first_five_are_considered() {
        let observations = vec![
            Observation::new("a", 0.10),
            Observation::new("b", 0.10),
            Observation::new("c", 0.10),
            Observation::new("d", 0.10),
            Observation::new("e", 0.30),
            Observation::new("f", 0.99),
            Observation::new("g", 0.98),
        ];

        let result = filter(&observations, THRESHOLD, MAX_RESULTS);

        assert_eq!(result.as_str(), "e - accurate at 30.00%");
    }

    #[test]
    fn test_fewer_than_five_are_not_padded() {
        let observations = vec![
            Observation::new("tabby", 0.5),
            Observation::new("tiger cat", 0.4),
        ];

        let result = filter(&observations, THRESHOLD, MAX_RESULTS);

        assert_eq!(result.lines().count(), 2);
        assert!(!result.as_str().ends_with('\n'));
    }

    #[test]
    fn test_two_decimal_percentages() {
        let observations = vec![
            Observation::new("x", 1.0),
            Observation::new("y", 0.333333),
            Observation::new("z", 0.5),
        ];

        let result = filter(&observations, THRESHOLD, MAX_RESULTS);

        assert_eq!(
            result.lines().collect::<Vec<_>>(),
            vec![
                "x - accurate at 100.00%",
                "y - accurate at 33.33%",
                "z - accurate at 50.00%",
            ]
        );
    }

    #[test]
    fn test_filter_is_idempotent() {
        let observations = vec![
            Observation::new("cat", 0.9066),
            Observation::new("fox", 0.30),
        ];
        let first = filter(&observations, THRESHOLD, MAX_RESULTS);
        let second = filter(&observations, THRESHOLD, MAX_RESULTS);
        assert_eq!(first.as_str().as_bytes(), second.as_str().as_bytes());
    }
}
