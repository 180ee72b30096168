//! # Contexto Compartido
//! src/server/context.rs
//!
//! Lo único que comparten las conexiones: configuración, raíz servida y
//! logger. Se arma una vez al arrancar y nadie lo modifica después.

use crate::config::Config;
use crate::files::ServedRoot;
use crate::logger::Logger;
use std::sync::Arc;

/// Estado de solo lectura compartido por todos los workers
pub struct ServerContext {
    pub config: Config,
    pub root: ServedRoot,
    pub logger: Arc<dyn Logger>,
}

impl ServerContext {
    pub fn new(config: Config, logger: Arc<dyn Logger>) -> Self {
        let root = ServedRoot::new(config.root.clone());
        Self { config, root, logger }
    }

    pub fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }
}
