//! # Emisor de Respuestas
//! src/server/emitter.rs
//!
//! Escribe status line + headers y, para archivos, transmite el body por
//! bloques de `TRANSFER_BUFFER_SIZE` bytes. Nunca carga el archivo completo
//! en memoria, así que el consumo por conexión no depende del tamaño del
//! archivo.
//!
//! Headers comunes. `Connection` refleja lo que hace después el socket: tras
//! un 302 se sigue leyendo, tras un error se cierra.
//!
//! | Respuesta | Connection | Accept-Ranges |
//! |-----------|------------|---------------|
//! | 200 / 206 / listado | keep-alive | bytes |
//! | 302 | keep-alive | bytes |
//! | 404 / 414 / 500 | close | bytes |

use crate::files::FileResponse;
use crate::http::{Response, StatusCode};
use crate::logger::Logger;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Tamaño del buffer de transferencia
pub const TRANSFER_BUFFER_SIZE: usize = 10 * 1024;

const NOT_FOUND_PAGE: &str = "<html><head><title> Oops! 404 Not Found</title></head>\
    <body><h1>404 Not Found! :(</h1>\
    <p>The requested resource was not found on this server.</p></body></html>";

const INTERNAL_ERROR_PAGE: &str = "<html><head><title>500 Internal Error</title></head>\
    <body><h1>500</h1><p>Internal server error.</p></body></html>";

const URI_TOO_LONG_PAGE: &str = "<html><head><title>414 URI Too Long</title></head>\
    <body><h1>414</h1><p>The request-target is missing or too long.</p></body></html>";

/// Escribe respuestas sobre una conexión
pub struct Emitter<'a, W: Write> {
    out: &'a mut W,
    logger: &'a dyn Logger,
}

impl<'a, W: Write> Emitter<'a, W> {
    pub fn new(out: &'a mut W, logger: &'a dyn Logger) -> Self {
        Self { out, logger }
    }

    /// Envía una respuesta ya serializable (headers + body en memoria)
    fn send(&mut self, response: &Response) -> io::Result<()> {
        let bytes = response.to_bytes();
        self.logger.debug(format_args!("Sending {} bytes.", bytes.len()));
        self.out.write_all(&bytes)?;
        self.out.flush()
    }

    /// 302 hacia `location`
    pub fn redirect(&mut self, location: &str) -> io::Result<()> {
        let response = Response::new(StatusCode::Found)
            .with_header("Location", location)
            .with_header("Connection", "keep-alive")
            .with_header("Accept-Ranges", "bytes")
            .with_header("Content-Length", "0");
        self.send(&response)?;
        self.logger.info(format_args!("302 redirection to {}", location));
        Ok(())
    }

    /// 404 con página HTML
    pub fn not_found(&mut self) -> io::Result<()> {
        self.send(&error_page(StatusCode::NotFound, NOT_FOUND_PAGE))?;
        self.logger.info(format_args!("404 not found."));
        Ok(())
    }

    /// 500 con página HTML
    pub fn internal_error(&mut self) -> io::Result<()> {
        self.send(&error_page(StatusCode::InternalServerError, INTERNAL_ERROR_PAGE))?;
        self.logger.info(format_args!("500 server side error."));
        Ok(())
    }

    /// 414 con página HTML
    pub fn uri_too_long(&mut self) -> io::Result<()> {
        self.send(&error_page(StatusCode::UriTooLong, URI_TOO_LONG_PAGE))?;
        self.logger.info(format_args!("414 URI too long."));
        Ok(())
    }

    /// 200 con el HTML del explorador
    pub fn listing(&mut self, html: &str) -> io::Result<()> {
        let response = Response::new(StatusCode::Ok)
            .with_header("Connection", "keep-alive")
            .with_header("Accept-Ranges", "bytes")
            .with_header("Content-Type", "text/html")
            .with_body(html);
        self.send(&response)?;
        self.logger.info(format_args!("Response 200 (explorer) done."));
        Ok(())
    }

    /// 200 o 206 según el descriptor; retorna los bytes de body enviados
    ///
    /// Los headers salen antes de tocar el archivo. Si el archivo se acorta
    /// mientras se lee, se envía lo que haya y la conexión se cierra después.
    pub fn file<R: Read + Seek>(&mut self, file: &mut R, descriptor: &FileResponse) -> io::Result<u64> {
        let mut response = Response::new(descriptor.status())
            .with_header("Connection", "keep-alive")
            .with_header("Accept-Ranges", "bytes")
            .with_header("Content-Type", descriptor.mime);

        if let Some(range) = descriptor.range {
            response.add_header("Content-Range", &range.content_range());
        }
        response.add_header("Content-Length", &descriptor.content_length().to_string());

        if descriptor.offset() > 0 {
            file.seek(SeekFrom::Start(descriptor.offset()))?;
        }

        self.send(&response)?;
        let sent = self.stream_body(file, descriptor.content_length())?;

        self.logger.info(format_args!(
            "Response {} done.",
            descriptor.status().as_u16()
        ));
        Ok(sent)
    }

    /// Copia exactamente `length` bytes (o hasta EOF) de `reader` al socket
    fn stream_body<R: Read>(&mut self, reader: &mut R, length: u64) -> io::Result<u64> {
        let mut buffer = vec![0u8; TRANSFER_BUFFER_SIZE];
        let mut remaining = length;

        while remaining > 0 {
            let want = remaining.min(TRANSFER_BUFFER_SIZE as u64) as usize;
            let read = match reader.read(&mut buffer[..want]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };

            self.out.write_all(&buffer[..read])?;
            remaining -= read as u64;
        }

        self.out.flush()?;
        Ok(length - remaining)
    }
}

/// Página de error con los headers comunes
fn error_page(status: StatusCode, body: &str) -> Response {
    Response::html(status, body)
        .with_header("Connection", "close")
        .with_header("Accept-Ranges", "bytes")
}
