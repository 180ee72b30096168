//! # Logging
//! src/logger/mod.rs
//!
//! El servidor no usa un flag global para decidir si imprime: cada
//! componente recibe un `Arc<dyn Logger>`. Con `--no-print` se inyecta
//! [`NoopLogger`] y el resto del código no cambia.
//!
//! ```
//! use file_server::logger::{Logger, NoopLogger};
//!
//! let logger = NoopLogger;
//! logger.info(format_args!("[{}] Socket closed.", "127.0.0.1:5000"));
//! ```

use std::fmt;
use tracing_subscriber::EnvFilter;

/// Nivel de un evento de log
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Sumidero de mensajes compartido por todas las conexiones
pub trait Logger: Send + Sync {
    /// Registra un mensaje con el nivel indicado
    fn log(&self, level: LogLevel, message: fmt::Arguments<'_>);

    fn debug(&self, message: fmt::Arguments<'_>) {
        self.log(LogLevel::Debug, message);
    }

    fn info(&self, message: fmt::Arguments<'_>) {
        self.log(LogLevel::Info, message);
    }

    fn warn(&self, message: fmt::Arguments<'_>) {
        self.log(LogLevel::Warn, message);
    }

    fn error(&self, message: fmt::Arguments<'_>) {
        self.log(LogLevel::Error, message);
    }
}

/// Reenvía los mensajes a `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: fmt::Arguments<'_>) {
        match level {
            LogLevel::Debug => tracing::debug!("{}", message),
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Warn => tracing::warn!("{}", message),
            LogLevel::Error => tracing::error!("{}", message),
        }
    }
}

/// Descarta todos los mensajes (modo `--no-print`)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl Logger for NoopLogger {
    fn log(&self, _level: LogLevel, _message: fmt::Arguments<'_>) {}
}

/// Filtro usado cuando `RUST_LOG` no está definida: incluye los eventos de
/// debug (lecturas, tamaño de archivo, rangos, bytes enviados)
pub const DEFAULT_LOG_FILTER: &str = "debug";

/// Filtro de niveles: `RUST_LOG` si es válida, si no `DEFAULT_LOG_FILTER`
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Instala el subscriber de `tracing` que escribe a stdout
///
/// El nivel se controla con `RUST_LOG` (ej: `RUST_LOG=info`). Llamarla más
/// de una vez no tiene efecto.
pub fn init_tracing() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_target(false)
        .with_level(true)
        .try_init();
}

/// Logger en memoria para los tests de otros módulos
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryLogger {
    lines: std::sync::Mutex<Vec<(LogLevel, String)>>,
}

#[cfg(test)]
impl MemoryLogger {
    pub(crate) fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub(crate) fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.lines()
            .iter()
            .any(|(logged, line)| *logged == level && line.contains(needle))
    }
}

#[cfg(test)]
impl Logger for MemoryLogger {
    fn log(&self, level: LogLevel, message: fmt::Arguments<'_>) {
        self.lines.lock().unwrap().push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_helpers_forward_level() {
        let logger = MemoryLogger::default();
        logger.debug(format_args!("d"));
        logger.info(format_args!("i {}", 1));
        logger.warn(format_args!("w"));
        logger.error(format_args!("e"));

        let levels: Vec<LogLevel> = logger.lines().iter().map(|(level, _)| *level).collect();
        assert_eq!(
            levels,
            vec![LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error]
        );
        assert!(logger.contains(LogLevel::Info, "i 1"));
    }

    #[test]
    fn test_noop_logger_as_trait_object() {
        let logger: Arc<dyn Logger> = Arc::new(NoopLogger);
        logger.error(format_args!("nothing happens"));
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing();
        TracingLogger.info(format_args!("tracing logger works"));

        if std::env::var(EnvFilter::DEFAULT_ENV).is_err() {
            assert!(tracing::enabled!(tracing::Level::DEBUG));
        }
        assert!(tracing::enabled!(tracing::Level::INFO));
    }

    #[test]
    fn test_log_filter_directives() {
        assert_eq!(log_filter(None).to_string(), DEFAULT_LOG_FILTER);
        assert_eq!(log_filter(Some("warn")).to_string(), "warn");
        assert_eq!(log_filter(Some("file_server=trace")).to_string(), "file_server=trace");
    }
}
