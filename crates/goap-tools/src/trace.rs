#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A small, allocation-friendly trace event.
///
/// Deliberately "dumb data": a tick, a tag naming what happened, the agent
/// involved (if any), and one numeric payload whose meaning is tag-specific
/// (plan length, ledger count, damage). Recorded during simulation, rendered
/// by tooling afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub tag: Cow<'static, str>,
    pub agent: Option<u64>,
    pub data: u64,
}

impl TraceEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            tag: tag.into(),
            agent: None,
            data: 0,
        }
    }

    pub fn with_agent(mut self, agent: u64) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn with_data(mut self, data: u64) -> Self {
        self.data = data;
        self
    }
}

pub trait TraceSink {
    fn record(&mut self, event: TraceEvent);
}

/// Sink that drops everything; for hosts that don't care.
#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn record(&mut self, _event: TraceEvent) {}
}

/// In-memory event log, the default sink for tests and headless runs.
#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn tagged<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a TraceEvent> + 'a {
        self.events.iter().filter(move |event| event.tag == tag)
    }

    pub fn count(&self, tag: &str) -> usize {
        self.tagged(tag).count()
    }

    pub fn has(&self, tag: &str) -> bool {
        self.tagged(tag).next().is_some()
    }
}

impl TraceSink for TraceLog {
    fn record(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}
