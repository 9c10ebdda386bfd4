//! JSON request/response envelope for hosts driving the service over a pipe
//!
//! One request per line in, one response per line out:
//!
//! ```text
//! {"op":"register"}
//! {"op":"update_emotion","agent_id":1,"event":"failure","intensity":0.9,"duration":3}
//! {"op":"evolve","agent_id":1,"iterations":20,"signals":{"entertainment":0.8}}
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use ontos_common::{CommentaryContext, OntosError, Result};
use ontos_darwinian::{ActionAppraisal, ConstantSignals, PerformanceSignals};
use ontos_protocol_dna::SpawnRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::service::{AgentId, PersonaService};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Register,
    Remove {
        agent_id: AgentId,
    },
    GetState {
        agent_id: AgentId,
    },
    UpdateEmotion {
        agent_id: AgentId,
        event: String,
        intensity: f64,
        duration: i64,
    },
    Tick {
        agent_id: AgentId,
    },
    Evolve {
        agent_id: AgentId,
        iterations: Option<usize>,
        #[serde(default)]
        signals: PerformanceSignals,
    },
    GetFitness {
        agent_id: AgentId,
    },
    ExportState {
        agent_id: AgentId,
        destination: Option<PathBuf>,
    },
    ImportState {
        document: Value,
        target: Option<AgentId>,
    },
    Inherit {
        parent: AgentId,
        factor: Option<f64>,
        #[serde(default)]
        overrides: BTreeMap<String, f64>,
    },
    SpawnSubordinate {
        parent: AgentId,
        #[serde(default)]
        request: SpawnRequest,
    },
    Reproduce {
        a: AgentId,
        b: AgentId,
    },
    Frame {
        agent_id: AgentId,
        text: String,
        mode: String,
    },
    Commentary {
        agent_id: AgentId,
        context: CommentaryContext,
    },
    Appraise {
        agent_id: AgentId,
        action: ActionAppraisal,
    },
    Persist {
        agent_id: AgentId,
    },
    Restore {
        agent_id: AgentId,
    },
}

/// Response envelope: `{"ok":true,"result":...}` or `{"ok":false,"error":...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
}

impl Response {
    fn success(result: Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    fn failure(error: &OntosError) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(ErrorBody {
                kind: error_kind(error),
                message: error.to_string(),
            }),
        }
    }
}

fn error_kind(error: &OntosError) -> &'static str {
    match error {
        OntosError::InvalidArgument(_) => "invalid_argument",
        OntosError::ProtectedField(_) => "protected_field",
        OntosError::UnknownTrait(_) => "unknown_trait",
        OntosError::OutOfRangeGene { .. } => "out_of_range_gene",
        OntosError::IncompatibleGenomes(_) => "incompatible_genomes",
        OntosError::InvariantViolation(_) => "invariant_violation",
        OntosError::Serialization(_) => "serialization",
        OntosError::Storage(_) => "storage",
        OntosError::Config(_) => "config",
        OntosError::AgentNotFound(_) => "agent_not_found",
    }
}

impl PersonaService {
    /// Handle one decoded request
    pub fn handle(&self, request: Request) -> Response {
        match self.dispatch(request) {
            Ok(value) => Response::success(value),
            Err(e) => Response::failure(&e),
        }
    }

    /// Decode and handle one JSON line
    pub fn handle_line(&self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request),
            Err(e) => Response::failure(&OntosError::from(e)),
        }
    }

    fn dispatch(&self, request: Request) -> Result<Value> {
        let value = match request {
            Request::Register => serde_json::to_value(self.register()?)?,
            Request::Remove { agent_id } => {
                self.remove(agent_id)?;
                Value::Null
            }
            Request::GetState { agent_id } => serde_json::to_value(self.get_state(agent_id)?)?,
            Request::UpdateEmotion {
                agent_id,
                event,
                intensity,
                duration,
            } => serde_json::to_value(self.update_emotion(agent_id, &event, intensity, duration)?)?,
            Request::Tick { agent_id } => serde_json::to_value(self.tick(agent_id)?)?,
            Request::Evolve {
                agent_id,
                iterations,
                signals,
            } => serde_json::to_value(self.evolve(
                agent_id,
                iterations,
                &ConstantSignals(signals),
            )?)?,
            Request::GetFitness { agent_id } => serde_json::to_value(self.get_fitness(agent_id)?)?,
            Request::ExportState {
                agent_id,
                destination,
            } => {
                let blob = self.export_state(agent_id, destination.as_deref())?;
                serde_json::from_str(&blob)?
            }
            Request::ImportState { document, target } => {
                serde_json::to_value(self.import_state(&document.to_string(), target)?)?
            }
            Request::Inherit {
                parent,
                factor,
                overrides,
            } => serde_json::to_value(self.inherit(parent, factor, overrides)?)?,
            Request::SpawnSubordinate { parent, request } => {
                serde_json::to_value(self.spawn_subordinate(parent, &request)?)?
            }
            Request::Reproduce { a, b } => serde_json::to_value(self.reproduce(a, b)?)?,
            Request::Frame {
                agent_id,
                text,
                mode,
            } => serde_json::to_value(self.frame(agent_id, &text, &mode)?)?,
            Request::Commentary { agent_id, context } => {
                serde_json::to_value(self.commentary(agent_id, context)?)?
            }
            Request::Appraise { agent_id, action } => {
                serde_json::to_value(self.appraise(agent_id, &action)?)?
            }
            Request::Persist { agent_id } => {
                self.persist(agent_id)?;
                Value::Null
            }
            Request::Restore { agent_id } => {
                self.restore(agent_id)?;
                Value::Null
            }
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PersonaConfig;
    use crate::infra::state_store::InMemoryStateStore;
    use std::sync::Arc;

    fn service() -> PersonaService {
        let config = PersonaConfig {
            seed: Some(1),
            ..PersonaConfig::default()
        };
        PersonaService::with_store(config, Arc::new(InMemoryStateStore::new())).unwrap()
    }

    #[test]
    fn test_register_then_state() {
        let svc = service();
        let response = svc.handle_line(r#"{"op":"register"}"#);
        assert!(response.ok);
        assert_eq!(response.result, Some(serde_json::json!(1)));

        let response = svc.handle_line(r#"{"op":"get_state","agent_id":1}"#);
        let state = response.result.unwrap();
        assert_eq!(state["floors"]["no_harm_intent"], serde_json::json!(1.0));
    }

    #[test]
    fn test_errors_are_typed() {
        let svc = service();
        let response = svc.handle_line(r#"{"op":"tick","agent_id":42}"#);
        assert!(!response.ok);
        assert_eq!(response.error.unwrap().kind, "agent_not_found");

        let response = svc.handle_line("not json");
        assert_eq!(response.error.unwrap().kind, "serialization");
    }

    #[test]
    fn test_floor_override_is_protected() {
        let svc = service();
        svc.handle_line(r#"{"op":"register"}"#);
        let response = svc.handle_line(
            r#"{"op":"inherit","parent":1,"overrides":{"no_harm_intent":0.0}}"#,
        );
        assert_eq!(response.error.unwrap().kind, "protected_field");
    }

    #[test]
    fn test_export_import_through_envelope() {
        let svc = service();
        svc.handle_line(r#"{"op":"register"}"#);
        svc.handle_line(r#"{"op":"evolve","agent_id":1,"iterations":5}"#);
        let exported = svc
            .handle_line(r#"{"op":"export_state","agent_id":1}"#)
            .result
            .unwrap();
        let request = serde_json::json!({"op": "import_state", "document": exported});
        let imported = svc.handle_line(&request.to_string());
        assert_eq!(imported.result, Some(serde_json::json!(2)));
        assert_eq!(svc.get_state(1).unwrap(), svc.get_state(2).unwrap());
    }
}
