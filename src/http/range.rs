//! # Rangos de Bytes
//! src/http/range.rs
//!
//! Detecta el header `Range: bytes=INICIO-FIN` dentro del buffer crudo del
//! request y lo convierte en un rango inclusivo validado contra el tamaño
//! del archivo.
//!
//! El escaneo es deliberadamente simple: busca el literal en todo el buffer
//! (headers incluidos) y lee dos enteros sin signo separados por `-`. Lo que
//! no se pueda leer queda en `None` y se resuelve con los valores por defecto
//! (`0` y `tamaño - 1`) al llamar a [`RangeSpec::resolve`].

use thiserror::Error;

/// Literal que marca el header de rango
pub const RANGE_PREFIX: &[u8] = b"Range: bytes=";

/// Offsets leídos del header, antes de conocer el tamaño del archivo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeSpec {
    /// Primer byte pedido (None si no se pudo leer)
    pub start: Option<u64>,

    /// Último byte pedido, inclusivo (None si no se pudo leer)
    pub end: Option<u64>,
}

/// Rango inclusivo `[start, end]` ya validado: `start <= end <= size - 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    start: u64,
    end: u64,
    size: u64,
}

/// Errores de validación de rango (se responden con 500)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("requested range {start}-{end} is out of bounds for a {size} byte file")]
    OutOfBounds { start: u64, end: u64, size: u64 },

    #[error("requested a range of an empty file")]
    EmptyFile,
}

/// Busca `Range: bytes=` en el buffer y lee los offsets que lo siguen
///
/// Retorna `None` si el header no está presente. Si está presente pero los
/// números no se pueden leer, retorna un `RangeSpec` con los campos en `None`.
///
/// # Ejemplo
/// ```
/// use file_server::http::range::scan_range_header;
///
/// let raw = b"GET /video.mp4 HTTP/1.1\r\nRange: bytes=100-199\r\n\r\n";
/// let spec = scan_range_header(raw).unwrap();
/// assert_eq!(spec.start, Some(100));
/// assert_eq!(spec.end, Some(199));
///
/// assert!(scan_range_header(b"GET / HTTP/1.1\r\n\r\n").is_none());
/// ```
pub fn scan_range_header(buffer: &[u8]) -> Option<RangeSpec> {
    let position = buffer
        .windows(RANGE_PREFIX.len())
        .position(|window| window == RANGE_PREFIX)?;
    let mut rest = &buffer[position + RANGE_PREFIX.len()..];

    let mut spec = RangeSpec::default();

    let Some((start, after_start)) = scan_unsigned(rest) else {
        return Some(spec);
    };
    spec.start = Some(start);
    rest = after_start;

    let Some(after_dash) = rest.strip_prefix(b"-") else {
        return Some(spec);
    };

    if let Some((end, _)) = scan_unsigned(after_dash) {
        spec.end = Some(end);
    }

    Some(spec)
}

/// Lee un entero sin signo decimal, saltando espacios iniciales
///
/// Retorna el valor y el resto del buffer. Falla si no hay dígitos o si el
/// número no cabe en `u64`.
fn scan_unsigned(input: &[u8]) -> Option<(u64, &[u8])> {
    let skipped = input.iter().take_while(|&&b| b == b' ' || b == b'\t').count();
    let input = &input[skipped..];

    let digits = input.iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }

    let mut value: u64 = 0;
    for digit in &input[..digits] {
        value = value
            .checked_mul(10)?
            .checked_add(u64::from(digit - b'0'))?;
    }

    Some((value, &input[digits..]))
}

impl RangeSpec {
    /// Aplica los valores por defecto y valida contra el tamaño del archivo
    ///
    /// Un rango fuera de límites se rechaza, nunca se recorta.
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::range::RangeSpec;
    ///
    /// let spec = RangeSpec { start: Some(10), end: None };
    /// let range = spec.resolve(100).unwrap();
    /// assert_eq!((range.start(), range.end()), (10, 99));
    ///
    /// let spec = RangeSpec { start: Some(0), end: Some(100) };
    /// assert!(spec.resolve(100).is_err());
    /// ```
    pub fn resolve(&self, size: u64) -> Result<ByteRange, RangeError> {
        if size == 0 {
            return Err(RangeError::EmptyFile);
        }

        let last = size - 1;
        let start = self.start.unwrap_or(0);
        let end = self.end.unwrap_or(last);

        if start > last || end > last || start > end {
            return Err(RangeError::OutOfBounds { start, end, size });
        }

        Ok(ByteRange { start, end, size })
    }
}

impl ByteRange {
    /// Primer byte del rango
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Último byte del rango (inclusivo)
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Tamaño total del archivo
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Cantidad de bytes del rango (`end - start + 1`)
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Un rango validado nunca está vacío
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Valor del header `Content-Range`: `bytes start-end/size`
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.size)
    }
}
