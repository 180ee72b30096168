//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor de archivos con soporte
//! para argumentos CLI y variables de entorno. Se crea una sola vez al
//! arrancar y después es de solo lectura: todas las conexiones la comparten
//! sin locks.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./file_server --port 3543 --folder simple_web \
//!   --default-redirect simple_web/index.html \
//!   --max-threads 100
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 SERVE_ROOT=/srv/www ./file_server --no-file-explorer
//! ```

use crate::logger::Logger;
use clap::{ArgAction, Parser};
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuración del servidor de archivos
#[derive(Debug, Clone, Parser)]
#[command(name = "file_server")]
#[command(about = "Servidor de archivos HTTP/1.1 concurrente con soporte de rangos")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8081", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha (por defecto todas las interfaces)
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Máximo de conexiones pendientes en la cola del listener
    #[arg(long, default_value = "250", env = "HTTP_BACKLOG")]
    pub backlog: i32,

    /// Máximo de conexiones atendidas en paralelo (un thread por conexión)
    #[arg(long = "max-threads", default_value = "250", env = "MAX_THREADS")]
    pub max_workers: usize,

    /// Directorio contra el que se resuelven las rutas
    #[arg(long, default_value = ".", env = "SERVE_ROOT")]
    pub root: PathBuf,

    /// Carpeta a la que se restringe el explorador de archivos
    #[arg(long, env = "SERVE_FOLDER")]
    pub folder: Option<String>,

    /// Ruta a la que redirige `/` (ej: simple_web/index.html)
    #[arg(long = "default-redirect", env = "DEFAULT_REDIRECT")]
    pub default_route: Option<String>,

    /// Desactiva el explorador de archivos
    #[arg(long = "no-file-explorer", action = ArgAction::SetFalse)]
    pub show_explorer: bool,

    /// Desactiva el log (menor consumo)
    #[arg(long = "no-print", action = ArgAction::SetFalse)]
    pub logging: bool,

    /// Timeout de lectura/escritura de cada socket, en segundos
    #[arg(long = "timeout", default_value = "4", env = "CLIENT_TIMEOUT")]
    pub timeout_secs: u64,

    /// Después de servir un archivo, seguir leyendo requests en la misma conexión
    #[arg(long = "keep-alive")]
    pub keep_alive: bool,
}

/// Errores de validación de la configuración
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Max threads must be >= 1")]
    NoWorkers,

    #[error("Backlog must be >= 1 (got {0})")]
    InvalidBacklog(i32),

    #[error("Client timeout must be > 0")]
    NoTimeout,

    #[error("Default redirect must not be empty")]
    EmptyDefaultRoute,

    #[error("Folder to serve must not be empty")]
    EmptyFolder,

    #[error("Root {} is not a directory", .0.display())]
    RootNotADirectory(PathBuf),
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use file_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8081");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Resuelve `host:port` a una dirección de socket
    pub fn socket_addr(&self) -> io::Result<SocketAddr> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} does not resolve to any address", self.address()),
                )
            })
    }

    /// Timeout de lectura/escritura de los sockets de cliente
    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Carpeta restringida sin la `/` inicial
    ///
    /// # Ejemplo
    /// ```rust
    /// use file_server::config::Config;
    ///
    /// let mut config = Config::default();
    /// assert_eq!(config.folder_prefix(), None);
    ///
    /// config.folder = Some("/simple_web".to_string());
    /// assert_eq!(config.folder_prefix(), Some("simple_web"));
    /// ```
    pub fn folder_prefix(&self) -> Option<&str> {
        self.folder
            .as_deref()
            .map(|folder| folder.strip_prefix('/').unwrap_or(folder))
    }

    /// Valida la configuración
    ///
    /// Retorna el primer valor inválido encontrado
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.backlog <= 0 {
            return Err(ConfigError::InvalidBacklog(self.backlog));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::NoTimeout);
        }
        if matches!(self.default_route.as_deref(), Some("")) {
            return Err(ConfigError::EmptyDefaultRoute);
        }
        if matches!(self.folder_prefix(), Some("")) {
            return Err(ConfigError::EmptyFolder);
        }
        if !self.root.is_dir() {
            return Err(ConfigError::RootNotADirectory(self.root.clone()));
        }

        Ok(())
    }

    /// Registra un resumen de la configuración al arrancar
    pub fn log_summary(&self, logger: &dyn Logger) {
        logger.info(format_args!("####  Welcome to file_server!  ####"));
        logger.info(format_args!("Address:      {}", self.address()));
        logger.info(format_args!("Root:         {}", self.root.display()));
        logger.info(format_args!("Max threads:  {}", self.max_workers));
        logger.info(format_args!("Backlog:      {}", self.backlog));
        logger.info(format_args!("Timeout:      {} s", self.timeout_secs));
        logger.info(format_args!(
            "Explorer:     {}",
            if self.show_explorer { "enabled" } else { "disabled" }
        ));
        logger.info(format_args!(
            "Keep-alive:   {}",
            if self.keep_alive { "enabled" } else { "disabled" }
        ));

        if let Some(folder) = self.folder_prefix() {
            logger.info(format_args!("Folder:       {}", folder));
        }
        if let Some(route) = &self.default_route {
            logger.info(format_args!("Redirect /:   {}", route));
        }
    }
}

impl Default for Config {
    /// Configuración por defecto (idéntica a la del CLI sin argumentos)
    fn default() -> Self {
        Self {
            port: 8081,
            host: "0.0.0.0".to_string(),
            backlog: 250,
            max_workers: 250,
            root: PathBuf::from("."),
            folder: None,
            default_route: None,
            show_explorer: true,
            logging: true,
            timeout_secs: 4,
            keep_alive: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{LogLevel, MemoryLogger};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8081);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.backlog, 250);
        assert_eq!(config.max_workers, 250);
        assert!(config.show_explorer);
        assert!(config.logging);
        assert!(!config.keep_alive);
        assert_eq!(config.client_timeout(), Duration::from_secs(4));
    }

    #[test]
    fn test_cli_defaults_match_default_impl() {
        let parsed = Config::try_parse_from(["file_server"]).unwrap();
        let default = Config::default();

        assert_eq!(parsed.port, default.port);
        assert_eq!(parsed.host, default.host);
        assert_eq!(parsed.max_workers, default.max_workers);
        assert_eq!(parsed.show_explorer, default.show_explorer);
        assert_eq!(parsed.logging, default.logging);
        assert_eq!(parsed.folder, None);
    }

    #[test]
    fn test_cli_flags() {
        let config = Config::try_parse_from([
            "file_server",
            "--port",
            "3543",
            "--folder",
            "/simple_web",
            "--default-redirect",
            "simple_web/index.html",
            "--max-threads",
            "8",
            "--no-file-explorer",
            "--no-print",
            "--keep-alive",
        ])
        .unwrap();

        assert_eq!(config.port, 3543);
        assert_eq!(config.folder_prefix(), Some("simple_web"));
        assert_eq!(config.default_route.as_deref(), Some("simple_web/index.html"));
        assert_eq!(config.max_workers, 8);
        assert!(!config.show_explorer);
        assert!(!config.logging);
        assert!(config.keep_alive);
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "127.0.0.1".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "127.0.0.1:3000");
        assert_eq!(config.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_validate_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_workers() {
        let mut config = Config::default();
        config.max_workers = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoWorkers));
    }

    #[test]
    fn test_validate_invalid_backlog() {
        let mut config = Config::default();
        config.backlog = 0;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Backlog"));
    }

    #[test]
    fn test_validate_invalid_timeout() {
        let mut config = Config::default();
        config.timeout_secs = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoTimeout));
    }

    #[test]
    fn test_validate_empty_strings() {
        let mut config = Config::default();
        config.default_route = Some(String::new());
        assert_eq!(config.validate(), Err(ConfigError::EmptyDefaultRoute));

        let mut config = Config::default();
        config.folder = Some("/".to_string());
        assert_eq!(config.validate(), Err(ConfigError::EmptyFolder));
    }

    #[test]
    fn test_validate_missing_root() {
        let mut config = Config::default();
        config.root = PathBuf::from("/definitely/not/here/file_server");
        assert!(matches!(config.validate(), Err(ConfigError::RootNotADirectory(_))));
    }

    #[test]
    fn test_log_summary() {
        let mut config = Config::default();
        config.default_route = Some("index.html".to_string());
        let logger = MemoryLogger::default();

        config.log_summary(&logger);

        assert!(logger.contains(LogLevel::Info, "0.0.0.0:8081"));
        assert!(logger.contains(LogLevel::Info, "Redirect /:   index.html"));
    }
}
