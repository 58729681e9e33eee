use std::collections::VecDeque;

use serde_json::Value;

use crate::config::Config;
use crate::document::Visualization;
use crate::highlight::HighlightTracker;
use crate::reconcile::SnapshotIssue;
use crate::reconcile::SnapshotMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSource {
    Editor,
    Agent,
    Session,
}

impl LogSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Editor => "editor",
            Self::Agent => "agent",
            Self::Session => "session",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub seq: u64,
    pub level: LogLevel,
    pub ts_ms: Option<i64>,
    pub source: LogSource,
    pub context: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct LogBuffer {
    cap: usize,
    next_seq: u64,
    buf: VecDeque<LogEntry>,
}

impl LogBuffer {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            next_seq: 1,
            buf: VecDeque::with_capacity(cap),
        }
    }

    pub fn append(&mut self, mut entry: LogEntry) {
        entry.seq = self.next_seq;
        self.next_seq += 1;

        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.next_seq = 1;
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        self.buf.iter()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AgentStatus {
    /// True while the agent is streaming a response.
    pub busy: bool,
    /// Set once a generate request is sent; cleared when the agent goes idle.
    pub generate_pending: bool,
    pub snapshots_seen: u64,
    pub last_issues: Vec<SnapshotIssue>,
}

/// A template render requested by the agent, resolved by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRequest {
    pub component: String,
    pub data: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub snapshot_mode: SnapshotMode,
    pub generate_message: String,
}

/// Everything one editing session owns. Mutated only through
/// [`crate::reducer::reduce`].
#[derive(Debug, Clone)]
pub struct DeskState {
    pub document: Visualization,
    pub highlight: HighlightTracker,
    pub agent: AgentStatus,
    pub settings: SessionSettings,
    pub last_component: Option<ComponentRequest>,
    pub logs: LogBuffer,
}

impl DeskState {
    pub fn new(config: &Config) -> Self {
        Self {
            document: Visualization::default(),
            highlight: HighlightTracker::new(),
            agent: AgentStatus::default(),
            settings: SessionSettings {
                snapshot_mode: config.reconcile.snapshot_mode,
                generate_message: config.session.generate_message.clone(),
            },
            last_component: None,
            logs: LogBuffer::new(config.session.log_capacity),
        }
    }

    /// The generate control stays disabled from the request until the agent's
    /// response completes.
    pub fn generate_enabled(&self) -> bool {
        !self.agent.busy && !self.agent.generate_pending
    }
}

impl Default for DeskState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
