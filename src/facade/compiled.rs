//! Closed per-facade action sets, resolved once at startup.

use crate::facade::compiler::build_action_signature;
use crate::facade::spec::FacadeSpec;
use crate::types::{DanglingReference, Error, Result};
use crate::tools::ToolRegistry;

/// One facade action bound to its internal tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledAction {
    pub name: String,
    pub tool: String,
    /// Parameter signature derived from the tool's schema.
    pub signature: String,
}

/// A facade whose actions all reference registered tools.
#[derive(Debug, Clone)]
pub struct CompiledFacade {
    spec: FacadeSpec,
    actions: Vec<CompiledAction>,
}

impl CompiledFacade {
    /// Bind every action of `spec` to its tool in `tools`.
    pub fn compile(spec: FacadeSpec, tools: &ToolRegistry) -> Result<Self> {
        if spec.actions.is_empty() {
            return Err(Error::configuration(format!(
                "facade '{}' declares no actions",
                spec.name
            )));
        }

        let mut actions: Vec<CompiledAction> = Vec::with_capacity(spec.actions.len());
        let mut dangling = Vec::new();
        for (action, tool_name) in &spec.actions {
            if actions.iter().any(|a| &a.name == action) {
                return Err(Error::DuplicateName(format!("{}.{}", spec.name, action)));
            }
            match tools.get(tool_name) {
                Some(tool) => actions.push(CompiledAction {
                    name: action.clone(),
                    tool: tool_name.clone(),
                    signature: build_action_signature(action, tool),
                }),
                None => dangling.push(DanglingReference {
                    facade: spec.name.clone(),
                    action: action.clone(),
                    tool: tool_name.clone(),
                }),
            }
        }
        if !dangling.is_empty() {
            return Err(Error::DanglingReferences(dangling));
        }

        Ok(Self { spec, actions })
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &FacadeSpec {
        &self.spec
    }

    pub fn actions(&self) -> &[CompiledAction] {
        &self.actions
    }

    /// Resolve an action name to its binding.
    pub fn resolve(&self, action: &str) -> Result<&CompiledAction> {
        self.actions
            .iter()
            .find(|a| a.name == action)
            .ok_or_else(|| self.unknown_action(action))
    }

    pub(crate) fn unknown_action(&self, action: &str) -> Error {
        Error::UnknownAction {
            facade: self.spec.name.clone(),
            action: action.to_string(),
            valid: self.actions.iter().map(|a| a.name.clone()).collect(),
        }
    }
}
