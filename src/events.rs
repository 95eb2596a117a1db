//! Structured crawl events.
//!
//! Failures never abort a run, so the event stream is the only place they
//! surface. Every event goes to the `log` facade under a per-phase target and,
//! when someone subscribed, to a channel as a [`CrawlEvent`] value.

use log::Level;
use std::fmt;
use tokio::sync::mpsc;

/// Part of the run an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Session,
    Links,
    Metadata,
    Output,
}

impl Phase {
    /// `log` target for this phase
    pub fn target(&self) -> &'static str {
        match self {
            Phase::Session => "poem_harvest::session",
            Phase::Links => "poem_harvest::links",
            Phase::Metadata => "poem_harvest::metadata",
            Phase::Output => "poem_harvest::output",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Session => "session",
            Phase::Links => "links",
            Phase::Metadata => "metadata",
            Phase::Output => "output",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlEvent {
    pub level: Level,
    pub phase: Phase,
    /// URL or page number the event is about
    pub context: Option<String>,
    pub message: String,
}

/// Fan-out point for crawl events
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    subscriber: Option<mpsc::UnboundedSender<CrawlEvent>>,
}

impl EventLog {
    /// An event log that only writes to the `log` facade
    pub fn new() -> Self {
        Self::default()
    }

    /// Also deliver every event to the returned receiver
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<CrawlEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscriber = Some(tx);
        rx
    }

    pub fn emit(&self, level: Level, phase: Phase, context: Option<&str>, message: String) {
        match context {
            Some(context) => {
                ::log::log!(target: phase.target(), level, "[{}] {}", context, message)
            }
            None => ::log::log!(target: phase.target(), level, "{}", message),
        }

        if let Some(tx) = &self.subscriber {
            // A dropped receiver only means nobody is listening any more
            let _ = tx.send(CrawlEvent {
                level,
                phase,
                context: context.map(str::to_string),
                message,
            });
        }
    }

    pub fn info(&self, phase: Phase, message: String) {
        self.emit(Level::Info, phase, None, message);
    }

    pub fn warn(&self, phase: Phase, context: Option<&str>, message: String) {
        self.emit(Level::Warn, phase, context, message);
    }

    pub fn error(&self, phase: Phase, context: Option<&str>, message: String) {
        self.emit(Level::Error, phase, context, message);
    }
}
