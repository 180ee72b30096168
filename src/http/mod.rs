//! # Módulo HTTP
//!
//! Este módulo implementa el subconjunto de HTTP/1.1 que necesita un
//! servidor de archivos, sin usar librerías de alto nivel. Incluye:
//!
//! - Extracción y decodificación del request-target
//! - Detección del header `Range: bytes=`
//! - Tabla de tipos MIME
//! - Construcción de responses HTTP
//! - Manejo de status codes
//!
//! ## Alcance
//!
//! Del request solo se consumen el target de la primera línea y el header
//! `Range`. El método se ignora (todo es un GET implícito) y no se soporta
//! chunked transfer encoding.
//!
//! ### Formato de Request
//!
//! ```text
//! GET /video.mp4 HTTP/1.1\r\n
//! Host: localhost:8081\r\n
//! Range: bytes=0-1023\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 206 Partial Content\r\n
//! Connection: keep-alive\r\n
//! Accept-Ranges: bytes\r\n
//! Content-Type: video/mp4\r\n
//! Content-Range: bytes 0-1023/4096\r\n
//! Content-Length: 1024\r\n
//! \r\n
//! <1024 bytes>
//! ```

pub mod mime;      // Extensión → Content-Type
pub mod range;     // Header Range y validación de offsets
pub mod request;   // Request-target y ParsedRequest
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use range::{ByteRange, RangeError, RangeSpec};
pub use request::{ParsedRequest, RequestError};
pub use response::Response;
pub use status::StatusCode;
