//! # Parsing del Request-Target
//! src/http/request.rs
//!
//! El servidor solo necesita dos cosas del request: la ruta pedida y el
//! header `Range`. Por eso no se parsea el request completo; se extrae el
//! request-target de la primera línea y se escanea el buffer en busca del
//! rango.
//!
//! ## Formato esperado de la primera línea
//!
//! ```text
//! GET /img/a%20b.png HTTP/1.1\r\n
//! ```
//!
//! ## Pasos
//!
//! 1. Extraer el texto entre el primer y el segundo espacio
//! 2. Descartar query string (`?…`) y fragmento (`#…`)
//! 3. Decodificar escapes `%XX`
//! 4. Quitar una `/` inicial para obtener una ruta relativa a la raíz
//!
//! La ruta decodificada se guarda como bytes: `%FF` produce el byte `0xFF`
//! aunque no sea UTF-8 válido, así que los nombres de archivo arbitrarios
//! siguen siendo alcanzables.

use super::range::{scan_range_header, RangeSpec};
use std::borrow::Cow;
use thiserror::Error;

/// Tamaño del buffer de lectura del socket (un request por lectura)
pub const REQUEST_BUFFER_SIZE: usize = 10_000;

/// Largo máximo aceptado para el request-target, en bytes
pub const MAX_URI_LENGTH: usize = 2048;

/// Errores al extraer el request-target (todos se responden con 414)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// La primera línea no tiene dos espacios
    #[error("request line has no request-target")]
    MissingTarget,

    /// Hay dos espacios seguidos
    #[error("request-target is empty")]
    EmptyTarget,

    /// El target supera `MAX_URI_LENGTH`
    #[error("request-target of {0} bytes exceeds the {max} byte limit", max = MAX_URI_LENGTH)]
    TooLong(usize),
}

/// Request ya interpretado: vive una sola iteración del loop de conexión
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    /// Target decodificado, con la `/` inicial (ej: "/img/a b.png")
    target: Vec<u8>,

    /// Ruta relativa a la raíz servida (ej: "img/a b.png"); vacía para `/`
    path: Vec<u8>,

    /// Offsets del header `Range`, si vino
    range: Option<RangeSpec>,
}

impl ParsedRequest {
    /// Interpreta el buffer crudo leído del socket
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use file_server::http::ParsedRequest;
    ///
    /// let raw = b"GET /img/a%20b.png HTTP/1.1\r\nRange: bytes=0-3\r\n\r\n";
    /// let request = ParsedRequest::parse(raw).unwrap();
    ///
    /// assert_eq!(request.target(), "/img/a b.png");
    /// assert_eq!(request.path(), b"img/a b.png");
    /// assert_eq!(request.range().unwrap().end, Some(3));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, RequestError> {
        let raw_target = extract_target(buffer)?;
        let target = percent_decode(strip_query(raw_target));
        let path = strip_leading_slash(&target).to_vec();

        Ok(Self {
            target,
            path,
            range: scan_range_header(buffer),
        })
    }

    /// Target decodificado, para logs (bytes no UTF-8 como U+FFFD)
    pub fn target(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.target)
    }

    /// Ruta relativa a la raíz servida, byte a byte
    pub fn path(&self) -> &[u8] {
        &self.path
    }

    /// Ruta relativa para logs y títulos
    pub fn path_display(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.path)
    }

    /// Offsets del header `Range`
    pub fn range(&self) -> Option<RangeSpec> {
        self.range
    }

    /// `true` si el cliente pidió exactamente `/`
    pub fn is_root(&self) -> bool {
        self.target == b"/"
    }

    /// `true` si la ruta apunta a un directorio (vacía o terminada en `/`)
    pub fn is_directory_path(&self) -> bool {
        self.path.is_empty() || self.path.ends_with(b"/")
    }
}

/// Extrae el request-target de la primera línea del request
///
/// Busca el primer espacio y el siguiente; lo que queda entre ambos es el
/// target. Solo se mira la primera línea.
///
/// # Ejemplo
/// ```
/// use file_server::http::request::{extract_target, RequestError};
///
/// assert_eq!(extract_target(b"GET /index.html HTTP/1.1\r\n"), Ok(&b"/index.html"[..]));
/// assert_eq!(extract_target(b"GET /index.html\r\n"), Err(RequestError::MissingTarget));
/// ```
pub fn extract_target(buffer: &[u8]) -> Result<&[u8], RequestError> {
    let line_end = buffer
        .iter()
        .position(|&b| b == b'\r' || b == b'\n')
        .unwrap_or(buffer.len());
    let line = &buffer[..line_end];

    let first_space = line
        .iter()
        .position(|&b| b == b' ')
        .ok_or(RequestError::MissingTarget)?;
    let rest = &line[first_space + 1..];
    let second_space = rest
        .iter()
        .position(|&b| b == b' ')
        .ok_or(RequestError::MissingTarget)?;

    let target = &rest[..second_space];

    if target.is_empty() {
        return Err(RequestError::EmptyTarget);
    }
    if target.len() > MAX_URI_LENGTH {
        return Err(RequestError::TooLong(target.len()));
    }

    Ok(target)
}

/// Descarta la query string y el fragmento del target
fn strip_query(target: &[u8]) -> &[u8] {
    match target.iter().position(|&b| b == b'?' || b == b'#') {
        Some(end) => &target[..end],
        None => target,
    }
}

/// Decodifica escapes `%XX` (XX hexadecimal) byte a byte
///
/// Un `%` que no va seguido de dos dígitos hexadecimales se copia tal cual.
/// Cada escape se decodifica una sola vez: `%2541` produce `%41`.
///
/// # Ejemplo
/// ```
/// use file_server::http::request::percent_decode;
///
/// assert_eq!(percent_decode(b"a%20b"), b"a b");
/// assert_eq!(percent_decode(b"100%"), b"100%");
/// assert_eq!(percent_decode(b"%e2%9c%93"), "✓".as_bytes());
/// ```
pub fn percent_decode(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        if input[i] == b'%' && i + 2 < input.len() {
            if let (Some(high), Some(low)) = (hex_value(input[i + 1]), hex_value(input[i + 2])) {
                output.push((high << 4) | low);
                i += 3;
                continue;
            }
        }
        output.push(input[i]);
        i += 1;
    }

    output
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Quita una sola `/` inicial
///
/// # Ejemplo
/// ```
/// use file_server::http::request::strip_leading_slash;
///
/// assert_eq!(strip_leading_slash(b"/index.html"), b"index.html");
/// assert_eq!(strip_leading_slash(b"/"), b"");
/// assert_eq!(strip_leading_slash(b"//x"), b"/x");
/// ```
pub fn strip_leading_slash(path: &[u8]) -> &[u8] {
    path.strip_prefix(b"/").unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let request = ParsedRequest::parse(b"GET /index.html HTTP/1.1\r\n\r\n").unwrap();

        assert_eq!(request.target(), "/index.html");
        assert_eq!(request.path(), b"index.html");
        assert_eq!(request.range(), None);
        assert!(!request.is_root());
        assert!(!request.is_directory_path());
    }

    #[test]
    fn test_parse_root() {
        let request = ParsedRequest::parse(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();

        assert!(request.is_root());
        assert_eq!(request.path(), b"");
        assert!(request.is_directory_path());
    }

    #[test]
    fn test_parse_directory_path() {
        let request = ParsedRequest::parse(b"GET /img/ HTTP/1.1\r\n\r\n").unwrap();

        assert!(!request.is_root());
        assert_eq!(request.path(), b"img/");
        assert!(request.is_directory_path());
    }

    #[test]
    fn test_parse_with_range() {
        let raw = b"GET /img/a.png HTTP/1.1\r\nHost: x\r\nRange: bytes=0-3\r\n\r\n";
        let request = ParsedRequest::parse(raw).unwrap();

        let range = request.range().unwrap();
        assert_eq!(range.start, Some(0));
        assert_eq!(range.end, Some(3));
    }

    #[test]
    fn test_parse_strips_query_and_fragment() {
        let request = ParsedRequest::parse(b"GET /app.js?v=3 HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.path(), b"app.js");

        let request = ParsedRequest::parse(b"GET /doc.html#intro HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.path(), b"doc.html");
    }

    #[test]
    fn test_missing_spaces() {
        assert_eq!(ParsedRequest::parse(b"GET\r\n\r\n"), Err(RequestError::MissingTarget));
        assert_eq!(ParsedRequest::parse(b"GET /x\r\n\r\n"), Err(RequestError::MissingTarget));
        assert_eq!(ParsedRequest::parse(b""), Err(RequestError::MissingTarget));
    }

    #[test]
    fn test_spaces_on_later_lines_are_ignored() {
        let raw = b"GET /x\r\nUser-Agent: some agent\r\n\r\n";
        assert_eq!(ParsedRequest::parse(raw), Err(RequestError::MissingTarget));
    }

    #[test]
    fn test_empty_target() {
        assert_eq!(ParsedRequest::parse(b"GET  HTTP/1.1\r\n"), Err(RequestError::EmptyTarget));
    }

    #[test]
    fn test_target_too_long() {
        let mut raw = b"GET /".to_vec();
        raw.extend(std::iter::repeat(b'a').take(MAX_URI_LENGTH));
        raw.extend_from_slice(b" HTTP/1.1\r\n\r\n");

        assert_eq!(
            ParsedRequest::parse(&raw),
            Err(RequestError::TooLong(MAX_URI_LENGTH + 1))
        );
    }

    #[test]
    fn test_target_at_limit_is_accepted() {
        let mut raw = b"GET /".to_vec();
        raw.extend(std::iter::repeat(b'a').take(MAX_URI_LENGTH - 1));
        raw.extend_from_slice(b" HTTP/1.1\r\n\r\n");

        assert!(ParsedRequest::parse(&raw).is_ok());
    }

    #[test]
    fn test_decode_plain_input_is_identity() {
        for plain in ["/index.html", "/a/b/c.txt", "/", "/with-dash_and.dots"] {
            assert_eq!(percent_decode(plain.as_bytes()), plain.as_bytes());
        }
    }

    #[test]
    fn test_decode_escapes() {
        assert_eq!(percent_decode(b"%41%42%43"), b"ABC");
        assert_eq!(percent_decode(b"%2f"), b"/");
        assert_eq!(percent_decode(b"%2F"), b"/");
        assert_eq!(percent_decode(b"%00"), [0u8]);
        assert_eq!(percent_decode(b"%ff"), [0xFFu8]);
    }

    #[test]
    fn test_decode_chained_escapes_decode_once() {
        assert_eq!(percent_decode(b"%2541"), b"%41");
        assert_eq!(percent_decode(b"a%20%20b"), b"a  b");
    }

    #[test]
    fn test_decode_invalid_escapes_untouched() {
        assert_eq!(percent_decode(b"%"), b"%");
        assert_eq!(percent_decode(b"%4"), b"%4");
        assert_eq!(percent_decode(b"%zz"), b"%zz");
        assert_eq!(percent_decode(b"50%off"), b"50%off");
        assert_eq!(percent_decode(b"%%41"), b"%A");
    }

    #[test]
    fn test_decoded_space_in_path() {
        let request = ParsedRequest::parse(b"GET /my%20file.txt HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.path(), b"my file.txt");
    }

    #[test]
    fn test_decoded_bytes_are_kept_verbatim() {
        let request = ParsedRequest::parse(b"GET /%FF.txt HTTP/1.1\r\n\r\n").unwrap();

        assert_eq!(request.path(), b"\xff.txt");
        assert_eq!(request.path_display(), "\u{FFFD}.txt");
        assert!(!request.is_directory_path());
    }

    #[test]
    fn test_encoded_root_is_root() {
        let request = ParsedRequest::parse(b"GET %2F HTTP/1.1\r\n\r\n").unwrap();
        assert!(request.is_root());
    }
}
