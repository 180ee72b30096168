//! # File Server
//! src/lib.rs
//!
//! Servidor de archivos HTTP/1.1 concurrente implementado sobre sockets
//! bloqueantes: un thread por conexión, con un máximo configurable.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `config`: Argumentos CLI / variables de entorno y validación
//! - `logger`: Capacidad de logging inyectable (tracing o no-op)
//! - `http`: Request-target, header `Range`, tipos MIME, responses y status
//! - `files`: Resolución segura de rutas, apertura de archivos y explorador
//! - `server`: Listener TCP, pool de workers, conexiones y emisión de respuestas
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use file_server::config::Config;
//! use file_server::logger::{Logger, TracingLogger};
//! use file_server::server::Server;
//! use std::sync::Arc;
//!
//! let config = Config::default();
//! let logger: Arc<dyn Logger> = Arc::new(TracingLogger);
//! let server = Server::bind(config, logger).expect("Error al iniciar servidor");
//! server.run();
//! ```

pub mod config;
pub mod files;
pub mod http;
pub mod logger;
pub mod server;
