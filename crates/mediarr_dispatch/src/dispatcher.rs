//! Maps intents to concrete backend operations and executes them.

use crate::catalog::{self, EndpointAction};
use mediarr_client::BackendClient;
use mediarr_protocol::{
    ClientError, ClientRequest, Intent, IntentContext, OperationKind, ServiceKind, SuiteConfig,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};

// ============================================================================
// Resolution (pure) and dispatch outcome
// ============================================================================

/// What the catalog says about a (service, operation, context) triple.
pub enum Resolution {
    /// A concrete call to make.
    Request(ClientRequest),
    /// The operation needs identifiers free text cannot supply.
    Guidance(&'static str),
    /// No catalog entry for this pair.
    Unsupported,
}

/// The single structured result of dispatching one intent.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The backend call succeeded.
    Executed {
        service: ServiceKind,
        operation: OperationKind,
        result: Value,
    },
    /// The router was not confident enough to pick a backend; carries
    /// the match evidence for the caller.
    NeedsClarification {
        confidence: f32,
        matched_keywords: Vec<String>,
        message: String,
    },
    /// The operation exists but needs identifiers; tells the caller how
    /// to proceed.
    Guidance {
        service: ServiceKind,
        operation: OperationKind,
        message: String,
    },
    /// The service was recognized but is not configured.
    Unavailable {
        service: ServiceKind,
        available: Vec<ServiceKind>,
    },
    /// No mapping for this (service, operation) pair.
    Unsupported {
        service: ServiceKind,
        operation: OperationKind,
    },
    /// The backend call failed after retries.
    Failed {
        service: ServiceKind,
        operation: OperationKind,
        error: ClientError,
    },
}

/// Resolve without executing. Pure: same inputs, same resolution.
pub fn resolve(
    service: ServiceKind,
    operation: OperationKind,
    context: &IntentContext,
) -> Resolution {
    match catalog::lookup(service, operation) {
        Some(entry) => match entry.action {
            EndpointAction::Call {
                method,
                path,
                title_param,
                command,
            } => Resolution::Request(catalog::build_request(
                method,
                path,
                title_param,
                command,
                context,
            )),
            EndpointAction::NeedsIds(message) => Resolution::Guidance(message),
        },
        None => Resolution::Unsupported,
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Owns one resilient client per enabled backend and routes intents
/// through them.
pub struct Dispatcher {
    clients: HashMap<ServiceKind, BackendClient>,
}

impl Dispatcher {
    /// Build clients for every enabled backend in the config.
    pub fn from_config(config: &SuiteConfig) -> Result<Self, ClientError> {
        let mut clients = HashMap::new();
        for service in config.enabled_services() {
            let Some(descriptor) = config.descriptor(service) else {
                continue;
            };
            clients.insert(service, BackendClient::new(descriptor)?);
        }
        info!(
            backends = clients.len(),
            "dispatcher ready: {:?}",
            clients.keys().map(|s| s.as_str()).collect::<Vec<_>>()
        );
        Ok(Self { clients })
    }

    /// Enabled backends, in priority order.
    pub fn available(&self) -> Vec<ServiceKind> {
        ServiceKind::PRIORITY
            .into_iter()
            .filter(|s| self.clients.contains_key(s))
            .collect()
    }

    pub fn client(&self, service: ServiceKind) -> Option<&BackendClient> {
        self.clients.get(&service)
    }

    /// Execute a parsed intent end to end.
    pub async fn dispatch(&self, intent: &Intent) -> DispatchOutcome {
        if !intent.service.is_known() {
            return DispatchOutcome::NeedsClarification {
                confidence: intent.confidence,
                matched_keywords: intent.matched_keywords.clone(),
                message: format!(
                    "could not determine a target service for {:?}; please name one of: {}",
                    intent.raw_text,
                    self.available()
                        .iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            };
        }

        self.run(intent.service, intent.operation, &intent.context)
            .await
    }

    /// Direct catalog invocation, bypassing the router.
    pub async fn call(
        &self,
        service: ServiceKind,
        operation: OperationKind,
        context: &IntentContext,
    ) -> DispatchOutcome {
        self.run(service, operation, context).await
    }

    /// Probe every enabled backend's status endpoint.
    pub async fn statuses(&self) -> Vec<(ServiceKind, Result<Value, ClientError>)> {
        let mut out = Vec::new();
        for service in self.available() {
            let client = &self.clients[&service];
            let result = client.system_status().await.map(|r| r.body);
            out.push((service, result));
        }
        out
    }

    async fn run(
        &self,
        service: ServiceKind,
        operation: OperationKind,
        context: &IntentContext,
    ) -> DispatchOutcome {
        let Some(client) = self.clients.get(&service) else {
            warn!(%service, "intent targets an unconfigured backend");
            return DispatchOutcome::Unavailable {
                service,
                available: self.available(),
            };
        };

        match resolve(service, operation, context) {
            Resolution::Request(request) => {
                info!(%service, %operation, path = %request.path, "dispatching");
                match client.execute(request).await {
                    Ok(response) => DispatchOutcome::Executed {
                        service,
                        operation,
                        result: response.body,
                    },
                    Err(error) => {
                        warn!(%service, %operation, %error, "dispatch failed");
                        DispatchOutcome::Failed {
                            service,
                            operation,
                            error,
                        }
                    }
                }
            }
            Resolution::Guidance(message) => DispatchOutcome::Guidance {
                service,
                operation,
                message: message.to_string(),
            },
            Resolution::Unsupported => DispatchOutcome::Unsupported { service, operation },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
