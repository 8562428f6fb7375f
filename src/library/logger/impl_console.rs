use crate::library::logger::interface::Logger;
use chrono::Utc;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct LoggerConsole {
    namespace: Option<String>,
    timezone: chrono::FixedOffset,
}

impl LoggerConsole {
    pub fn new(timezone: chrono::FixedOffset) -> Self {
        Self {
            namespace: None,
            timezone,
        }
    }

    fn format_line(&self, level: Level, message: &str) -> String {
        let local_time = Utc::now().with_timezone(&self.timezone);
        let timestamp = local_time.format("%Y-%m-%d %I:%M:%S%.3f %p");
        let tag = match level {
            Level::Info => "INFO",
            Level::Error => "ERROR",
        };
        match &self.namespace {
            Some(namespace) => format!("[{}] {} {}: {}", timestamp, tag, namespace, message),
            None => format!("[{}] {} {}", timestamp, tag, message),
        }
    }
}

impl Logger for LoggerConsole {
    fn info(&self, message: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        println!("{}", self.format_line(Level::Info, message));
        Ok(())
    }

    fn error(&self, message: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        eprintln!("{}", self.format_line(Level::Error, message));
        Ok(())
    }

    fn with_namespace(&self, namespace: &str) -> Arc<dyn Logger + Send + Sync> {
        let new_namespace = match &self.namespace {
            Some(current) => format!("{}:{}", current, namespace),
            None => namespace.to_string(),
        };

        Arc::new(LoggerConsole {
            namespace: Some(new_namespace),
            timezone: self.timezone,
        })
    }
}
