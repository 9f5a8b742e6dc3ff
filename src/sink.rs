use crate::error::Result;
use crate::session::SessionSummary;

/// Where finished sessions go. `Ok(false)` means the store refused the record,
/// `Err(SinkUnavailable)` means it could not be reached. Callers do not retry.
pub trait ResultSink {
    fn submit(&mut self, summary: &SessionSummary) -> Result<bool>;
}

/// Ticket for saving one session's summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub session_id: u64,
    pub summary: SessionSummary,
}

impl Submission {
    /// Run the submission against `sink`, keeping the session tag for the reply
    pub fn send_to(&self, sink: &mut dyn ResultSink) -> (u64, Result<bool>) {
        (self.session_id, sink.submit(&self.summary))
    }
}

/// Save progress of the current session's summary
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    NotRequested,
    Pending,
    Saved,
    NotSaved(String),
}

/// How a sink reply was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    NotSaved,
    /// Reply belonged to a session that has since been replaced
    Stale,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuizError;
    use crate::session::Difficulty;

    struct Offline;

    impl ResultSink for Offline {
        fn submit(&mut self, _summary: &SessionSummary) -> Result<bool> {
            Err(QuizError::SinkUnavailable("offline".into()))
        }
    }

    #[test]
    fn send_to_keeps_session_tag() {
        let submission = Submission {
            session_id: 9,
            summary: SessionSummary {
                player_name: "ana".into(),
                final_score: 20,
                correct_count: 2,
                wrong_count: 0,
                accuracy_percent: 100,
                duration_secs: 30,
                difficulty: Difficulty::Hard,
                max_streak: 2,
                allotted_secs: 30,
            },
        };

        let (id, result) = submission.send_to(&mut Offline);
        assert_eq!(id, 9);
        assert!(matches!(result, Err(QuizError::SinkUnavailable(_))));
    }
}
