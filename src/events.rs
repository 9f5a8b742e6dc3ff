use std::sync::mpsc::Sender;

use crate::catalog::{BinLabel, CatalogItem};
use crate::session::SessionSummary;

/// What the engine tells the outside world after each transition
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    RoundChanged {
        session_id: u64,
        item: CatalogItem,
    },
    AnswerResult {
        session_id: u64,
        correct: bool,
        chosen: BinLabel,
        correct_bin: BinLabel,
        item_name: String,
        points_delta: i64,
    },
    SessionTerminated {
        session_id: u64,
        summary: SessionSummary,
    },
}

/// Subscriber interface for UIs. Every hook defaults to doing nothing.
pub trait SessionObserver {
    fn on_round_changed(&mut self, _session_id: u64, _item: &CatalogItem) {}

    #[allow(clippy::too_many_arguments)]
    fn on_answer_result(
        &mut self,
        _session_id: u64,
        _correct: bool,
        _chosen: BinLabel,
        _correct_bin: BinLabel,
        _item_name: &str,
        _points_delta: i64,
    ) {
    }

    fn on_session_terminated(&mut self, _session_id: u64, _summary: &SessionSummary) {}
}

/// Dispatch an event to the matching hook
pub fn notify(observer: &mut dyn SessionObserver, event: &SessionEvent) {
    match event {
        SessionEvent::RoundChanged { session_id, item } => {
            observer.on_round_changed(*session_id, item)
        }
        SessionEvent::AnswerResult {
            session_id,
            correct,
            chosen,
            correct_bin,
            item_name,
            points_delta,
        } => observer.on_answer_result(
            *session_id,
            *correct,
            *chosen,
            *correct_bin,
            item_name,
            *points_delta,
        ),
        SessionEvent::SessionTerminated {
            session_id,
            summary,
        } => observer.on_session_terminated(*session_id, summary),
    }
}

// Forwards events to a channel; a dropped receiver just means nobody is listening
impl SessionObserver for Sender<SessionEvent> {
    fn on_round_changed(&mut self, session_id: u64, item: &CatalogItem) {
        let _ = self.send(SessionEvent::RoundChanged {
            session_id,
            item: item.clone(),
        });
    }

    fn on_answer_result(
        &mut self,
        session_id: u64,
        correct: bool,
        chosen: BinLabel,
        correct_bin: BinLabel,
        item_name: &str,
        points_delta: i64,
    ) {
        let _ = self.send(SessionEvent::AnswerResult {
            session_id,
            correct,
            chosen,
            correct_bin,
            item_name: item_name.to_string(),
            points_delta,
        });
    }

    fn on_session_terminated(&mut self, session_id: u64, summary: &SessionSummary) {
        let _ = self.send(SessionEvent::SessionTerminated {
            session_id,
            summary: summary.clone(),
        });
    }
}
