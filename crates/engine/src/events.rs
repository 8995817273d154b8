use feed::FetchId;

/// Minimal event type for traceability.
///
/// Warning conditions (stale fetch discarded, focus request for a vanished
/// marker, missing viewer location) are recorded here instead of being
/// thrown; the host decides how to surface them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEvent {
    /// Fetch generation the event relates to, if any.
    pub fetch: Option<FetchId>,
    pub kind: &'static str,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<MapEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, fetch: Option<FetchId>, kind: &'static str, message: impl Into<String>) {
        self.events.push(MapEvent {
            fetch,
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[MapEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<MapEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::EventLog;
    use feed::FetchId;

    #[test]
    fn records_events_with_fetch_generation() {
        let mut log = EventLog::new();
        log.emit(Some(FetchId(3)), "test", "hello");
        assert_eq!(log.events().len(), 1);
        assert_eq!(log.events()[0].fetch, Some(FetchId(3)));
        assert_eq!(log.events()[0].kind, "test");
    }

    #[test]
    fn drain_clears_events() {
        let mut log = EventLog::new();
        log.emit(None, "k", "m");
        let drained = log.drain();
        assert_eq!(drained.len(), 1);
        assert!(log.events().is_empty());
    }
}
