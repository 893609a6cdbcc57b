use crate::frame::Frame;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

/// A recorded diagnostic, stamped with the frame it was emitted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub frame_index: u64,
    pub level: Level,
    pub kind: &'static str,
    pub message: String,
}

/// Diagnostics sink.
///
/// Every event is forwarded to `tracing` and kept in memory so callers can
/// inspect what happened during a navigation without scraping logs.
#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
    capacity: Option<usize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `capacity` events, dropping the oldest first.
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            events: Vec::new(),
            capacity: Some(capacity.max(1)),
        }
    }

    pub fn emit(&mut self, frame: Frame, level: Level, kind: &'static str, message: impl Into<String>) {
        let message = message.into();
        match level {
            Level::Debug => tracing::debug!(kind, frame = frame.index, "{message}"),
            Level::Info => tracing::info!(kind, frame = frame.index, "{message}"),
            Level::Warn => tracing::warn!(kind, frame = frame.index, "{message}"),
            Level::Error => tracing::error!(kind, frame = frame.index, "{message}"),
        }

        if let Some(cap) = self.capacity {
            if self.events.len() >= cap {
                let overflow = self.events.len() + 1 - cap;
                self.events.drain(..overflow);
            }
        }
        self.events.push(Event {
            frame_index: frame.index,
            level,
            kind,
            message,
        });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn events_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, Level};
    use crate::frame::Frame;

    #[test]
    fn records_events_with_frame_index() {
        let mut bus = EventBus::new();
        let f = Frame::new(2);
        bus.emit(f, Level::Warn, "map", "no coordinates");
        assert_eq!(bus.events().len(), 1);
        assert_eq!(bus.events()[0].frame_index, 2);
        assert_eq!(bus.events()[0].level, Level::Warn);
    }

    #[test]
    fn drain_clears_events() {
        let mut bus = EventBus::new();
        bus.emit(Frame::new(0), Level::Info, "k", "m");
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert!(bus.events().is_empty());
    }

    #[test]
    fn capacity_limit_drops_oldest() {
        let mut bus = EventBus::with_capacity_limit(2);
        bus.emit(Frame::new(0), Level::Info, "k", "a");
        bus.emit(Frame::new(0), Level::Info, "k", "b");
        bus.emit(Frame::new(0), Level::Info, "other", "c");
        let msgs: Vec<_> = bus.events().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(msgs, vec!["b", "c"]);
        assert_eq!(bus.events_of_kind("k").count(), 1);
    }
}
