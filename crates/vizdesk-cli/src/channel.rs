//! File-backed agent channel.
//!
//! The agent side writes an envelope `{ "visualization": {...}, "busy": bool,
//! "tool_calls": [...] }` to the inbox file; each new revision (by mtime) is
//! read once. Outbound, the canonical document is written through to the
//! outbox and chat requests are appended to a JSONL message log.

use std::fs;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use vizdesk_core::actions::AgentAction;
use vizdesk_core::actions::DeskAction;
use vizdesk_core::document::Visualization;
use vizdesk_core::reconcile::AgentSnapshot;

pub const GENERATE_TOOL: &str = "generateVisualization";
pub const RENDER_TOOL: &str = "renderVCComponent";

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel io on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed envelope in {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode outbound message: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InboxEnvelope {
    #[serde(default)]
    pub visualization: Option<Value>,
    #[serde(default)]
    pub busy: Option<bool>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl InboxEnvelope {
    /// Busy goes first so the snapshot's highlight sees the agent's current
    /// streaming state.
    pub fn into_actions(self) -> Vec<DeskAction> {
        let mut actions = Vec::new();
        if let Some(busy) = self.busy {
            actions.push(DeskAction::Agent(AgentAction::SetBusy(busy)));
        }
        if self.visualization.is_some() {
            actions.push(DeskAction::Agent(AgentAction::ReceiveSnapshot(
                AgentSnapshot {
                    visualization: self.visualization,
                },
            )));
        }
        actions.extend(
            self.tool_calls
                .into_iter()
                .filter_map(|call| tool_call_action(&call.name, call.arguments))
                .map(DeskAction::Agent),
        );
        actions
    }
}

/// Maps an agent tool call onto the session action it drives.
pub fn tool_call_action(name: &str, arguments: Value) -> Option<AgentAction> {
    match name {
        GENERATE_TOOL => Some(AgentAction::InvokeGenerateTool(arguments)),
        RENDER_TOOL => {
            let component = arguments
                .get("component")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let data = arguments.get("data").cloned().unwrap_or(Value::Null);
            Some(AgentAction::RenderComponent { component, data })
        }
        other => {
            tracing::warn!(tool = other, "ignoring unknown tool call");
            None
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    ts_ms: i64,
}

#[derive(Debug)]
pub struct FileChannel {
    inbox: PathBuf,
    outbox: PathBuf,
    messages: PathBuf,
    last_mod: Option<SystemTime>,
}

impl FileChannel {
    pub fn new(inbox: PathBuf, outbox: PathBuf, messages: PathBuf) -> Self {
        Self {
            inbox,
            outbox,
            messages,
            last_mod: None,
        }
    }

    /// Message log next to the outbox: `state.json` → `state.messages.jsonl`.
    pub fn default_messages_path(outbox: &Path) -> PathBuf {
        outbox.with_extension("messages.jsonl")
    }

    pub fn inbox(&self) -> &Path {
        &self.inbox
    }

    pub fn outbox(&self) -> &Path {
        &self.outbox
    }

    /// Returns the envelope if the inbox changed since the last poll. A
    /// missing inbox is not an error. A malformed revision is reported once
    /// and then skipped until the file changes again.
    pub fn poll(&mut self) -> Result<Option<InboxEnvelope>, ChannelError> {
        let modified = match fs::metadata(&self.inbox).and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ChannelError::Io {
                    path: self.inbox.clone(),
                    source,
                })
            }
        };
        if self.last_mod == Some(modified) {
            return Ok(None);
        }
        let bytes = fs::read(&self.inbox).map_err(|source| ChannelError::Io {
            path: self.inbox.clone(),
            source,
        })?;
        self.last_mod = Some(modified);
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| ChannelError::Decode {
                path: self.inbox.clone(),
                source,
            })
    }

    /// Write-through of the canonical document. Written to a sibling temp
    /// file and renamed so readers never see a partial document.
    pub fn publish(&self, document: &Visualization) -> Result<(), ChannelError> {
        let bytes = serde_json::to_vec_pretty(document)?;
        let tmp = self.outbox.with_extension("json.tmp");
        fs::write(&tmp, bytes)
            .and_then(|()| fs::rename(&tmp, &self.outbox))
            .map_err(|source| ChannelError::Io {
                path: self.outbox.clone(),
                source,
            })
    }

    pub fn send_message(&self, content: &str) -> Result<(), ChannelError> {
        let message = ChatMessage {
            role: "user",
            content,
            ts_ms: chrono::Utc::now().timestamp_millis(),
        };
        let mut line = serde_json::to_string(&message)?;
        line.push('\n');
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.messages)
            .and_then(|mut file| file.write_all(line.as_bytes()))
            .map_err(|source| ChannelError::Io {
                path: self.messages.clone(),
                source,
            })
    }
}
