//! Scripted event streams for `vizdesk replay`.
//!
//! A script is a list of events, each tagged by `kind`, given as a JSON array,
//! JSON lines, or a YAML sequence (picked by file extension).

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use vizdesk_core::actions::AgentAction;
use vizdesk_core::actions::DeskAction;
use vizdesk_core::actions::UserAction;
use vizdesk_core::document::FieldName;
use vizdesk_core::patch::VisualizationPatch;
use vizdesk_core::reconcile::AgentSnapshot;
use vizdesk_core::reducer::reduce;
use vizdesk_core::reducer::DeskEffect;
use vizdesk_core::state::DeskState;

use crate::channel::tool_call_action;

#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON script: {0}")]
    Json(#[source] serde_json::Error),
    #[error("invalid event on line {line}: {source}")]
    JsonLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid YAML script: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFormat {
    Json,
    JsonLines,
    Yaml,
}

impl ScriptFormat {
    /// `.yaml`/`.yml` and `.jsonl`/`.ndjson` are recognized; anything else is
    /// read as a JSON array.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            Some("jsonl" | "ndjson") => Self::JsonLines,
            _ => Self::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptEvent {
    UserPatch {
        patch: VisualizationPatch,
    },
    Snapshot {
        #[serde(default)]
        visualization: Option<Value>,
    },
    Busy {
        busy: bool,
    },
    Generate,
    ToolCall {
        name: String,
        #[serde(default)]
        arguments: Value,
    },
    RenderComponent {
        component: String,
        #[serde(default)]
        data: Value,
    },
    Copy,
    Reset,
}

impl ScriptEvent {
    pub fn label(&self) -> String {
        match self {
            Self::UserPatch { patch } => {
                let fields: Vec<&str> = patch.fields().into_iter().map(FieldName::as_str).collect();
                format!("user_patch [{}]", fields.join(", "))
            }
            Self::Snapshot { .. } => "snapshot".to_string(),
            Self::Busy { busy } => format!("busy {busy}"),
            Self::Generate => "generate".to_string(),
            Self::ToolCall { name, .. } => format!("tool_call {name}"),
            Self::RenderComponent { component, .. } => format!("render_component {component}"),
            Self::Copy => "copy".to_string(),
            Self::Reset => "reset".to_string(),
        }
    }

    pub fn into_action(self) -> Option<DeskAction> {
        let action = match self {
            Self::UserPatch { patch } => DeskAction::User(UserAction::ApplyPatch(patch)),
            Self::Snapshot { visualization } => {
                DeskAction::Agent(AgentAction::ReceiveSnapshot(AgentSnapshot { visualization }))
            }
            Self::Busy { busy } => DeskAction::Agent(AgentAction::SetBusy(busy)),
            Self::Generate => DeskAction::User(UserAction::RequestGenerate),
            Self::ToolCall { name, arguments } => {
                DeskAction::Agent(tool_call_action(&name, arguments)?)
            }
            Self::RenderComponent { component, data } => {
                DeskAction::Agent(AgentAction::RenderComponent { component, data })
            }
            Self::Copy => DeskAction::User(UserAction::CopyDocument),
            Self::Reset => DeskAction::User(UserAction::ResetSession),
        };
        Some(action)
    }
}

pub fn load(path: &Path) -> Result<Vec<ScriptEvent>, ScriptError> {
    let text = fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text, ScriptFormat::from_path(path))
}

pub fn parse(text: &str, format: ScriptFormat) -> Result<Vec<ScriptEvent>, ScriptError> {
    match format {
        ScriptFormat::Json => serde_json::from_str(text).map_err(ScriptError::Json),
        ScriptFormat::Yaml => Ok(serde_yaml::from_str(text)?),
        ScriptFormat::JsonLines => text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| {
                serde_json::from_str(line).map_err(|source| ScriptError::JsonLine {
                    line: index + 1,
                    source,
                })
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReplayStep {
    pub index: usize,
    pub label: String,
    pub effects: Vec<DeskEffect>,
    pub highlighted: Vec<FieldName>,
}

/// Feeds every event through the reducer in order, recording what each one
/// produced.
pub fn replay(state: &mut DeskState, events: Vec<ScriptEvent>) -> Vec<ReplayStep> {
    events
        .into_iter()
        .enumerate()
        .map(|(index, event)| {
            let label = event.label();
            let effects = match event.into_action() {
                Some(action) => reduce(state, action),
                None => Vec::new(),
            };
            tracing::debug!(step = index + 1, event = %label, effects = effects.len(), "replayed");
            ReplayStep {
                index: index + 1,
                label,
                effects,
                highlighted: state.highlight.visible().iter().copied().collect(),
            }
        })
        .collect()
}

pub fn describe_effect(effect: &DeskEffect) -> String {
    match effect {
        DeskEffect::PublishState(document) => format!("publish \"{}\"", document.title),
        DeskEffect::SubmitChat { message } => format!("chat \"{message}\""),
        DeskEffect::CopyToClipboard(text) => format!("copy {} bytes", text.len()),
        DeskEffect::RequestFrame => "frame".to_string(),
    }
}
