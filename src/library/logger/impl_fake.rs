use crate::library::logger::interface::Logger;
use std::sync::{Arc, Mutex, PoisonError};

/// Keeps every line, namespaced, in memory.
#[derive(Clone, Default)]
pub struct LoggerFake {
    namespace: Option<String>,
    lines: Arc<Mutex<Vec<String>>>,
}

impl LoggerFake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, tag: &str, message: &str) {
        let line = match &self.namespace {
            Some(namespace) => format!("{} {}: {}", tag, namespace, message),
            None => format!("{} {}", tag, message),
        };
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }
}

impl Logger for LoggerFake {
    fn info(&self, message: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.push("INFO", message);
        Ok(())
    }

    fn error(&self, message: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.push("ERROR", message);
        Ok(())
    }

    fn with_namespace(&self, namespace: &str) -> Arc<dyn Logger + Send + Sync> {
        let namespace = match &self.namespace {
            Some(current) => format!("{}:{}", current, namespace),
            None => namespace.to_string(),
        };
        Arc::new(LoggerFake {
            namespace: Some(namespace),
            lines: self.lines.clone(),
        })
    }
}
