use chrono::{Local, NaiveDate};

/// Source of "today" for age derivation and deadline checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvaluationClock {
    #[default]
    System,
    Fixed(NaiveDate),
}

impl EvaluationClock {
    pub fn today(&self) -> NaiveDate {
        match self {
            EvaluationClock::System => Local::now().date_naive(),
            EvaluationClock::Fixed(date) => *date,
        }
    }
}
