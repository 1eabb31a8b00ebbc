/// Run phase definitions for tracking crawl progress
///
/// A crawl run moves through these phases in order; `Terminated`,
/// `Completed` and `Failed` end it.
use std::fmt;

/// Represents the current phase of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    // ===== Active Phases =====
    /// Requesting `/robots.txt`
    FetchingRobots,

    /// Applying robots directives to the run
    EvaluatingRobots,

    /// Requesting the seed page
    FetchingSeed,

    /// Pulling URLs from the frontier until it is empty
    Draining,

    // ===== Terminal Phases =====
    /// Robots policy forbids crawling the site
    Terminated,

    /// Frontier exhausted; state ready for materialization
    Completed,

    /// A fatal fetch error ended the run
    Failed,
}

impl RunPhase {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated | Self::Completed | Self::Failed)
    }

    /// Returns true if `next` may follow this phase
    pub fn can_transition_to(&self, next: RunPhase) -> bool {
        match (self, next) {
            (Self::FetchingRobots, Self::EvaluatingRobots) => true,
            (Self::EvaluatingRobots, Self::Terminated) => true,
            (Self::EvaluatingRobots, Self::FetchingSeed) => true,
            (Self::FetchingSeed, Self::Terminated) => true,
            (Self::FetchingSeed, Self::Draining) => true,
            (Self::Draining, Self::Completed) => true,
            (from, Self::Failed) => !from.is_terminal(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchingRobots => "fetching_robots",
            Self::EvaluatingRobots => "evaluating_robots",
            Self::FetchingSeed => "fetching_seed",
            Self::Draining => "draining",
            Self::Terminated => "terminated",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!RunPhase::FetchingRobots.is_terminal());
        assert!(!RunPhase::EvaluatingRobots.is_terminal());
        assert!(!RunPhase::FetchingSeed.is_terminal());
        assert!(!RunPhase::Draining.is_terminal());

        assert!(RunPhase::Terminated.is_terminal());
        assert!(RunPhase::Completed.is_terminal());
        assert!(RunPhase::Failed.is_terminal());
    }

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            RunPhase::FetchingRobots,
            RunPhase::EvaluatingRobots,
            RunPhase::FetchingSeed,
            RunPhase::Draining,
            RunPhase::Completed,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].can_transition_to(pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_policy_termination() {
        assert!(RunPhase::EvaluatingRobots.can_transition_to(RunPhase::Terminated));
        assert!(!RunPhase::Draining.can_transition_to(RunPhase::Terminated));
    }

    #[test]
    fn test_failure_from_active_only() {
        assert!(RunPhase::FetchingRobots.can_transition_to(RunPhase::Failed));
        assert!(RunPhase::Draining.can_transition_to(RunPhase::Failed));
        assert!(!RunPhase::Completed.can_transition_to(RunPhase::Failed));
        assert!(!RunPhase::Terminated.can_transition_to(RunPhase::Failed));
    }

    #[test]
    fn test_no_skipping_phases() {
        assert!(!RunPhase::FetchingRobots.can_transition_to(RunPhase::Draining));
        assert!(!RunPhase::Completed.can_transition_to(RunPhase::FetchingRobots));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", RunPhase::FetchingRobots), "fetching_robots");
        assert_eq!(format!("{}", RunPhase::Completed), "completed");
    }
}
