//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Listener bloqueante + un thread por conexión, acotado por [`WorkerPool`].
//! El socket se crea con `socket2` para poder fijar el backlog y
//! `SO_REUSEADDR` antes del `listen`.
//!
//! El loop de aceptación nunca termina por un error de una conexión: los
//! fallos de `accept` se registran y se sigue escuchando.

use super::connection::Connection;
use super::context::ServerContext;
use super::pool::WorkerPool;
use crate::config::Config;
use crate::logger::Logger;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Primera espera tras un `accept` fallido
const ACCEPT_BACKOFF_BASE: Duration = Duration::from_millis(10);

/// Espera máxima entre reintentos de `accept`
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Servidor de archivos HTTP/1.1
pub struct Server {
    listener: TcpListener,
    context: Arc<ServerContext>,
    pool: WorkerPool,
}

impl Server {
    /// Crea el socket, hace bind y empieza a escuchar
    pub fn bind(config: Config, logger: Arc<dyn Logger>) -> io::Result<Self> {
        let address = config.socket_addr()?;
        let listener = create_listener(address, config.backlog)?;
        let pool = WorkerPool::new(config.max_workers);

        logger.info(format_args!(
            "Listening on {} (max {} workers)",
            listener.local_addr()?,
            pool.max()
        ));

        Ok(Self {
            listener,
            context: Arc::new(ServerContext::new(config, logger)),
            pool,
        })
    }

    /// Dirección real de escucha (útil con puerto 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Acepta conexiones para siempre
    ///
    /// Tras un `accept` fallido se espera antes de reintentar, con una
    /// espera que crece mientras los fallos sigan (ej: EMFILE).
    pub fn run(&self) -> ! {
        let mut served: u64 = 0;
        let mut failures: u32 = 0;

        loop {
            served += 1;
            match self.accept_next(served) {
                Ok(()) => failures = 0,
                Err(e) => {
                    failures = failures.saturating_add(1);
                    let delay = accept_backoff(failures);
                    self.context.logger().error(format_args!(
                        "Accept failed: {} (retrying in {} ms)",
                        e,
                        delay.as_millis()
                    ));
                    thread::sleep(delay);
                }
            }
        }
    }

    /// Espera lugar en el pool, acepta una conexión y la despacha a un worker
    pub fn accept_next(&self, id: u64) -> io::Result<()> {
        let logger = self.context.logger();

        if self.pool.is_full() {
            logger.warn(format_args!(
                "Server too busy: {} workers active, waiting for a free slot",
                self.pool.active()
            ));
        }
        let permit = self.pool.acquire();

        let (stream, peer) = self.listener.accept()?;
        logger.info(format_args!("[{}] Incoming connection.", peer));

        if let Err(e) = self.configure(&stream) {
            logger.error(format_args!("[{}] Cannot set socket timeouts: {}", peer, e));
            return Ok(());
        }

        let context = Arc::clone(&self.context);
        permit.spawn(format!("conn-{}", id), move || {
            let peer = peer.to_string();
            if let Err(e) = Connection::new(stream, peer.as_str(), Arc::clone(&context)).run() {
                context
                    .logger()
                    .error(format_args!("[{}] Connection aborted: {}", peer, e));
            }
        })?;

        Ok(())
    }

    /// Timeouts de lectura y escritura por socket
    fn configure(&self, stream: &TcpStream) -> io::Result<()> {
        let timeout = Some(self.context.config.client_timeout());
        stream.set_read_timeout(timeout)?;
        stream.set_write_timeout(timeout)
    }
}

/// Espera antes del reintento número `failures` de `accept`
///
/// Duplica desde `ACCEPT_BACKOFF_BASE` hasta `ACCEPT_BACKOFF_MAX`.
fn accept_backoff(failures: u32) -> Duration {
    let exponent = failures.saturating_sub(1).min(16);
    ACCEPT_BACKOFF_BASE
        .saturating_mul(1 << exponent)
        .min(ACCEPT_BACKOFF_MAX)
}

/// Listener bloqueante con `SO_REUSEADDR` y backlog configurable
fn create_listener(address: SocketAddr, backlog: i32) -> io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(address), Type::STREAM, Some(Protocol::TCP))?;

    socket.set_reuse_address(true)?;
    socket.bind(&address.into())?;
    socket.listen(backlog)?;

    Ok(socket.into())
}
