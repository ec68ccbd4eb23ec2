//! Facade compiler: turns facade declarations + the registry into the
//! catalog advertised to clients.
//!
//! Everything here is a pure function of its inputs: the same facades, tier
//! and registry always produce the same definitions, in declaration order.

use crate::facade::spec::{DetailTier, FacadeSpec};
use crate::tools::{ParamDef, RegisteredTool, ToolRegistry};
use crate::types::DanglingReference;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};

/// Parameters every tool receives implicitly; left out of signatures.
pub const IMPLICIT_PARAMS: &[&str] = &["projectId", "project_id"];

/// A tool definition as advertised over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Facade entry point for an internal tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseEntry {
    pub facade: String,
    pub action: String,
}

/// Anything that can answer "is this tool registered?".
pub trait ToolLookup {
    fn contains_tool(&self, name: &str) -> bool;
}

impl ToolLookup for ToolRegistry {
    fn contains_tool(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl ToolLookup for HashSet<String> {
    fn contains_tool(&self, name: &str) -> bool {
        self.contains(name)
    }
}

impl<V> ToolLookup for HashMap<String, V> {
    fn contains_tool(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

// =============================================================================
// Signatures
// =============================================================================

/// Compact signature for one action, e.g. `create(title, tags[]?, priority?: low|high)`.
pub fn build_action_signature(action: &str, tool: &RegisteredTool) -> String {
    signature_from_params(action, tool.params())
}

/// Signature from a parameter list.
///
/// Implicit parameters are skipped, arrays get `[]`, optional names a
/// trailing `?`, and enum value sets are inlined.
pub fn signature_from_params(action: &str, params: &[ParamDef]) -> String {
    let parts: Vec<String> = params
        .iter()
        .filter(|p| !IMPLICIT_PARAMS.contains(&p.name.as_str()))
        .map(|p| {
            let mut part = p.name.clone();
            if p.param_type.is_array() {
                part.push_str("[]");
            }
            if !p.required {
                part.push('?');
            }
            if let Some(values) = p.param_type.enum_values() {
                part.push_str(": ");
                part.push_str(&values.join("|"));
            }
            part
        })
        .collect();

    format!("{}({})", action, parts.join(", "))
}

/// Domain summary plus an `Actions:` block with one signature per action.
///
/// An action whose tool is missing degrades to its bare name.
pub fn build_signature_description(facade: &FacadeSpec, tools: &ToolRegistry) -> String {
    let mut lines = Vec::with_capacity(facade.actions.len() + 2);
    lines.push(first_sentence(&facade.description).to_string());
    lines.push("Actions:".to_string());
    for (action, tool_name) in &facade.actions {
        let signature = match tools.get(tool_name) {
            Some(tool) => build_action_signature(action, tool),
            None => action.clone(),
        };
        lines.push(format!("- {}", signature));
    }
    lines.join("\n")
}

/// First sentence of `text` (through the first `.` followed by whitespace),
/// or its first line when there is no sentence break.
pub fn first_sentence(text: &str) -> &str {
    let text = text.trim();
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '\n' {
            return text[..i].trim_end();
        }
        if c == '.' {
            match chars.peek() {
                None => return text,
                Some((_, next)) if next.is_whitespace() => return &text[..=i],
                _ => {}
            }
        }
    }
    text
}

// =============================================================================
// Catalog
// =============================================================================

/// Input schema for a facade: one required `action` enum, anything else allowed.
pub fn facade_input_schema(facade: &FacadeSpec) -> Value {
    json!({
        "type": "object",
        "properties": {
            "action": {
                "type": "string",
                "enum": facade.action_names(),
                "description": "Operation to perform",
            },
        },
        "required": ["action"],
        "additionalProperties": true,
    })
}

/// Build the advertised tool list for `tier`.
///
/// `compact` and `micro` use the short description; `full` uses action
/// signatures when `tools` is supplied, else the long description.
pub fn build_mcp_definitions(
    facades: &[FacadeSpec],
    tier: DetailTier,
    tools: Option<&ToolRegistry>,
) -> Vec<McpToolDefinition> {
    facades
        .iter()
        .filter(|f| tier.includes(f))
        .map(|f| {
            let description = match (tier, tools) {
                (DetailTier::Full, Some(tools)) => build_signature_description(f, tools),
                (DetailTier::Full, None) => f.description.clone(),
                (DetailTier::Compact | DetailTier::Micro, _) => f.compact_description.clone(),
            };
            McpToolDefinition {
                name: f.name.clone(),
                description,
                input_schema: facade_input_schema(f),
            }
        })
        .collect()
}

/// Internal tool → facade entry point. The first facade action to reference
/// a tool wins.
pub fn build_reverse_map(facades: &[FacadeSpec]) -> HashMap<String, ReverseEntry> {
    let mut map = HashMap::new();
    for facade in facades {
        for (action, tool) in &facade.actions {
            map.entry(tool.clone()).or_insert_with(|| ReverseEntry {
                facade: facade.name.clone(),
                action: action.clone(),
            });
        }
    }
    map
}

/// Every action→tool reference that `tools` cannot resolve (empty = valid).
pub fn validate_facades(facades: &[FacadeSpec], tools: &impl ToolLookup) -> Vec<DanglingReference> {
    facades
        .iter()
        .flat_map(|facade| {
            facade
                .actions
                .iter()
                .filter(|(_, tool)| !tools.contains_tool(tool))
                .map(|(action, tool)| DanglingReference {
                    facade: facade.name.clone(),
                    action: action.clone(),
                    tool: tool.clone(),
                })
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
