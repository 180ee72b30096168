//! # Manejo de una Conexión
//! src/server/connection.rs
//!
//! Cada conexión aceptada recorre esta máquina de estados en su propio
//! worker:
//!
//! ```text
//! Reading ──n bytes──▶ Parsing ──ok──▶ Responding ──KeepReading──▶ Reading
//!    │                    │                 │
//!    │ EOF / error        │ target inválido └──Close──▶ Closed
//!    ▼                    ▼
//!  Closed ◀──────────  Rejecting (414)
//! ```
//!
//! ## Política de cierre
//!
//! Se cierra después de cada respuesta salvo el 302: tras un redirect se
//! vuelve a `Reading` para atender el request que el cliente manda a
//! continuación. Con `--keep-alive` los archivos servidos (200/206) también
//! vuelven a `Reading`. Listados y errores siempre cierran.
//!
//! ## Orden de decisión en `Responding`
//!
//! 1. `/` con ruta por defecto configurada → 302
//! 2. Ruta de directorio con explorador activo → listado (o 404 si está
//!    fuera de la carpeta restringida)
//! 3. El archivo no se puede abrir → 404
//! 4. Header `Range` fuera de los límites → 500
//! 5. Header `Range` válido → 206
//! 6. Sin `Range` → 200

use super::context::ServerContext;
use super::emitter::Emitter;
use crate::files::DirectoryListing;
use crate::http::request::REQUEST_BUFFER_SIZE;
use crate::http::{ParsedRequest, RequestError};
use std::io::{self, Read, Write};
use std::sync::Arc;

/// Estado actual de la conexión
#[derive(Debug)]
pub enum ConnectionState {
    /// Esperando bytes del cliente
    Reading,

    /// `n` bytes en el buffer, listos para interpretar
    Parsing(usize),

    /// Request válido a responder
    Responding(ParsedRequest),

    /// Request-target inválido: se responde 414 y se cierra
    Rejecting(RequestError),

    Closed,
}

/// Qué hacer después de responder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    KeepReading,
    Close,
}

/// Una conexión de cliente sobre cualquier stream bidireccional
pub struct Connection<S: Read + Write> {
    stream: S,
    peer: String,
    context: Arc<ServerContext>,
    buffer: Vec<u8>,
}

impl<S: Read + Write> Connection<S> {
    pub fn new(stream: S, peer: impl Into<String>, context: Arc<ServerContext>) -> Self {
        Self {
            stream,
            peer: peer.into(),
            context,
            buffer: vec![0u8; REQUEST_BUFFER_SIZE],
        }
    }

    /// Atiende la conexión hasta que se cierre
    ///
    /// Un error de escritura corta la conexión y se propaga al worker.
    pub fn run(mut self) -> io::Result<()> {
        let mut state = ConnectionState::Reading;

        loop {
            state = match state {
                ConnectionState::Reading => self.read_request(),
                ConnectionState::Parsing(length) => {
                    match ParsedRequest::parse(&self.buffer[..length]) {
                        Ok(request) => ConnectionState::Responding(request),
                        Err(e) => ConnectionState::Rejecting(e),
                    }
                }
                ConnectionState::Responding(request) => match self.respond(&request)? {
                    Disposition::KeepReading => ConnectionState::Reading,
                    Disposition::Close => ConnectionState::Closed,
                },
                ConnectionState::Rejecting(e) => {
                    let logger = self.context.logger();
                    logger.warn(format_args!("[{}] Invalid request: {}", self.peer, e));
                    Emitter::new(&mut self.stream, logger).uri_too_long()?;
                    ConnectionState::Closed
                }
                ConnectionState::Closed => {
                    self.context
                        .logger()
                        .info(format_args!("[{}] Socket closed.", self.peer));
                    return Ok(());
                }
            };
        }
    }

    /// Una lectura del socket (un request por lectura)
    fn read_request(&mut self) -> ConnectionState {
        let logger = self.context.logger();

        match self.stream.read(&mut self.buffer) {
            Ok(0) => {
                logger.debug(format_args!("[{}] Peer closed the connection.", self.peer));
                ConnectionState::Closed
            }
            Ok(n) => {
                logger.debug(format_args!("[{}] Read {} bytes.", self.peer, n));
                ConnectionState::Parsing(n)
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => ConnectionState::Reading,
            Err(e) => {
                logger.error(format_args!("[{}] Read failed: {}", self.peer, e));
                ConnectionState::Closed
            }
        }
    }

    fn respond(&mut self, request: &ParsedRequest) -> io::Result<Disposition> {
        let context = Arc::clone(&self.context);
        let config = &context.config;
        let logger = context.logger();

        logger.info(format_args!("[{}] Route: {}", self.peer, request.target()));

        if request.is_root() {
            if let Some(route) = &config.default_route {
                Emitter::new(&mut self.stream, logger).redirect(route)?;
                return Ok(Disposition::KeepReading);
            }
        }

        if request.is_directory_path() && config.show_explorer {
            self.explore(request)?;
            return Ok(Disposition::Close);
        }

        let (mut file, descriptor) = match context.root.open(request.path()) {
            Ok(opened) => opened,
            Err(e) => {
                logger.info(format_args!("[{}] {}", self.peer, e));
                Emitter::new(&mut self.stream, logger).not_found()?;
                return Ok(Disposition::Close);
            }
        };
        logger.debug(format_args!(
            "[{}] Serving {} ({} bytes)",
            self.peer,
            descriptor.path.display(),
            descriptor.size
        ));

        let descriptor = match descriptor.with_range(request.range()) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                logger.error(format_args!("[{}] Range rejected: {}", self.peer, e));
                Emitter::new(&mut self.stream, logger).internal_error()?;
                return Ok(Disposition::Close);
            }
        };
        if let Some(range) = descriptor.range {
            logger.debug(format_args!(
                "[{}] Range detected: {}-{}",
                self.peer,
                range.start(),
                range.end()
            ));
        }

        let sent = Emitter::new(&mut self.stream, logger).file(&mut file, &descriptor)?;
        if sent < descriptor.content_length() {
            logger.warn(format_args!(
                "[{}] File shrank while sending: {} of {} bytes",
                self.peer,
                sent,
                descriptor.content_length()
            ));
            return Ok(Disposition::Close);
        }

        Ok(if config.keep_alive {
            Disposition::KeepReading
        } else {
            Disposition::Close
        })
    }

    /// Listado de directorio (siempre cierra la conexión)
    fn explore(&mut self, request: &ParsedRequest) -> io::Result<()> {
        let context = Arc::clone(&self.context);
        let logger = context.logger();
        let mut emitter = Emitter::new(&mut self.stream, logger);
        let path = request.path_display();

        if let Some(folder) = context.config.folder_prefix() {
            if !request.path().starts_with(folder.as_bytes()) {
                logger.info(format_args!(
                    "[{}] '{}' is outside the served folder '{}'",
                    self.peer, path, folder
                ));
                return emitter.not_found();
            }
        }

        let dir = match context.root.resolve(request.path()) {
            Some(dir) if dir.is_dir() => dir,
            _ => return emitter.not_found(),
        };

        match DirectoryListing::read(&dir, &path, logger) {
            Ok(listing) => {
                logger.info(format_args!(
                    "[{}] Explorer opened: /{} ({} entries)",
                    self.peer,
                    path,
                    listing.len()
                ));
                emitter.listing(&listing.to_html())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => emitter.not_found(),
            Err(e) => {
                logger.error(format_args!(
                    "[{}] Cannot list {}: {}",
                    self.peer,
                    dir.display(),
                    e
                ));
                emitter.internal_error()
            }
        }
    }
}
