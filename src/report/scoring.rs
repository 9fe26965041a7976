use crate::model::{Bucket, HygieneScore, Issue, ScoreBreakdown};

/// Scores a deduplicated issue set
///
/// Every bucket starts at its weight and loses the issue's severity deduction
/// (High 15, Medium 5, Low 1) for each issue mapped to it, stopping at 0.
pub fn calculate(issues: &[Issue]) -> HygieneScore {
    let mut breakdown = ScoreBreakdown::full();

    for issue in issues {
        breakdown.deduct(Bucket::from(issue.category), issue.severity.deduction());
    }

    HygieneScore {
        total: breakdown.total(),
        breakdown,
    }
}
