//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto (`tcp`)
//! 2. Limita los workers concurrentes (`pool`)
//! 3. Atiende cada conexión con su máquina de estados (`connection`)
//! 4. Escribe las respuestas por bloques (`emitter`)
//!
//! No hay estado mutable compartido entre conexiones: solo el
//! [`ServerContext`] de solo lectura.

pub mod connection;
pub mod context;
pub mod emitter;
pub mod pool;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use connection::{Connection, ConnectionState, Disposition};
pub use context::ServerContext;
pub use emitter::Emitter;
pub use pool::{WorkerPermit, WorkerPool};
pub use tcp::Server;
