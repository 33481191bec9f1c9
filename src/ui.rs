use std::sync::Mutex;

/// Notification severity, mirrored by the presentation layer's styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// The narrow seam between the core and the presentation layer.
///
/// The core never touches layout or animation; it emits progress and
/// notification events through this trait and returns result values to
/// the caller, which renders them however it likes.
pub trait UiSink: Send + Sync {
    fn show_progress(&self, percent: f64);
    fn hide_progress(&self);
    fn notify(&self, message: &str, severity: Severity);
}

/// Default sink that forwards UI events to the tracing subscriber.
pub struct TracingSink;

impl UiSink for TracingSink {
    fn show_progress(&self, percent: f64) {
        tracing::debug!("progress: {percent:.0}%");
    }

    fn hide_progress(&self) {
        tracing::debug!("progress hidden");
    }

    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => tracing::error!("{message}"),
            Severity::Warning => tracing::warn!("{message}"),
            _ => tracing::info!("{message}"),
        }
    }
}

/// Recorded UI event, for asserting on emitted sequences in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Progress(f64),
    HideProgress,
    Notification(String, Severity),
}

/// Sink that records every event it receives. Test-only collaborator.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<UiEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().expect("sink lock poisoned").clone()
    }

    /// Progress percentages in emission order.
    pub fn progress_values(&self) -> Vec<f64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Progress(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn notifications(&self) -> Vec<(String, Severity)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                UiEvent::Notification(m, s) => Some((m, s)),
                _ => None,
            })
            .collect()
    }
}

impl UiSink for RecordingSink {
    fn show_progress(&self, percent: f64) {
        self.events
            .lock()
            .expect("sink lock poisoned")
            .push(UiEvent::Progress(percent));
    }

    fn hide_progress(&self) {
        self.events
            .lock()
            .expect("sink lock poisoned")
            .push(UiEvent::HideProgress);
    }

    fn notify(&self, message: &str, severity: Severity) {
        self.events
            .lock()
            .expect("sink lock poisoned")
            .push(UiEvent::Notification(message.to_string(), severity));
    }
}
