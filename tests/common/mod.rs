//! Shared test utilities for querygate integration tests.
//!
//! Provides a scripted in-process backend so dispatch and API tests run
//! without launching MCP servers.

#![allow(dead_code)]

use async_trait::async_trait;
use querygate::api::{create_router, AppState};
use querygate::config::QuerygateConfig;
use querygate::dispatch::Dispatcher;
use querygate::gateway::{BackendSession, Gateway, GatewayError, Row, SessionConnector};
use querygate::routing::{Classifier, DataSource};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// =============================================================================
// Scripted backend
// =============================================================================

/// What a scripted backend does when called.
#[derive(Debug, Clone)]
pub struct Script {
    pub operations: Vec<String>,
    pub rows: Vec<Row>,
    pub open_error: Option<GatewayError>,
    pub invoke_error: Option<GatewayError>,
    pub invoke_delay: Option<Duration>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            operations: vec!["query".to_string()],
            rows: Vec::new(),
            open_error: None,
            invoke_error: None,
            invoke_delay: None,
        }
    }
}

impl Script {
    pub fn rows(rows: Vec<Value>) -> Self {
        Self {
            rows: rows.into_iter().map(row).collect(),
            ..Default::default()
        }
    }

    pub fn operations(mut self, operations: &[&str]) -> Self {
        self.operations = operations.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn open_error(mut self, error: GatewayError) -> Self {
        self.open_error = Some(error);
        self
    }

    pub fn invoke_error(mut self, error: GatewayError) -> Self {
        self.invoke_error = Some(error);
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.invoke_delay = Some(delay);
        self
    }
}

/// Session lifecycle counters shared by a connector and its sessions.
#[derive(Debug, Default)]
pub struct Counters {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub dropped: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub invocations: Mutex<Vec<(String, Value)>>,
}

impl Counters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> Vec<(String, Value)> {
        self.invocations.lock().unwrap().clone()
    }
}

pub struct ScriptedConnector {
    script: Script,
    pub counters: Arc<Counters>,
}

impl ScriptedConnector {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            counters: Arc::new(Counters::default()),
        })
    }
}

#[async_trait]
impl SessionConnector for ScriptedConnector {
    async fn open(&self) -> Result<Box<dyn BackendSession>, GatewayError> {
        if let Some(e) = &self.script.open_error {
            return Err(e.clone());
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            script: self.script.clone(),
            counters: Arc::clone(&self.counters),
        }))
    }

    fn describe(&self) -> String {
        "scripted-backend".to_string()
    }
}

struct ScriptedSession {
    script: Script,
    counters: Arc<Counters>,
}

#[async_trait]
impl BackendSession for ScriptedSession {
    async fn initialize(&mut self) -> Result<(), GatewayError> {
        Ok(())
    }

    async fn list_operations(&mut self) -> Result<Vec<String>, GatewayError> {
        Ok(self.script.operations.clone())
    }

    async fn invoke(&mut self, operation: &str, arguments: Value) -> Result<Vec<Row>, GatewayError> {
        self.counters
            .invocations
            .lock()
            .unwrap()
            .push((operation.to_string(), arguments));

        let now = self.counters.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.counters.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.script.invoke_delay {
            tokio::time::sleep(delay).await;
        }
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);

        match &self.script.invoke_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.script.rows.clone()),
        }
    }

    async fn close(&mut self) {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
    }

    fn server_name(&self) -> Option<&str> {
        Some("scripted")
    }
}

impl Drop for ScriptedSession {
    fn drop(&mut self) {
        self.counters.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Convert a JSON object literal into a row.
pub fn row(value: Value) -> Row {
    value.as_object().cloned().expect("row must be a JSON object")
}

pub fn scripted_gateway(source: DataSource, connector: &Arc<ScriptedConnector>) -> Gateway {
    Gateway::new(
        format!("{}-data", source),
        source,
        Some(Arc::clone(connector) as Arc<dyn SessionConnector>),
    )
}

/// Dispatcher over two scripted backends.
pub fn scripted_dispatcher(
    vehicle: &Arc<ScriptedConnector>,
    tax: &Arc<ScriptedConnector>,
) -> Dispatcher {
    Dispatcher::new(
        Arc::new(Classifier::default()),
        scripted_gateway(DataSource::Vehicle, vehicle),
        scripted_gateway(DataSource::Tax, tax),
    )
    .expect("gateways are in their slots")
}

/// Dispatcher whose gateways have no backend at all.
pub fn unconfigured_dispatcher() -> Dispatcher {
    Dispatcher::new(
        Arc::new(Classifier::default()),
        Gateway::new("vehicle-data", DataSource::Vehicle, None),
        Gateway::new("tax-data", DataSource::Tax, None),
    )
    .expect("gateways are in their slots")
}

/// Router around a dispatcher with default configuration.
pub fn create_test_app(dispatcher: Dispatcher) -> axum::Router {
    let config = Arc::new(QuerygateConfig::default());
    let state = Arc::new(AppState::new(Arc::new(dispatcher), config));
    create_router(state)
}
