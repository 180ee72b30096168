//! # Códigos de Estado HTTP
//!
//! Este módulo define los códigos de estado HTTP/1.1 que emite el servidor
//! de archivos. Solo se usan seis códigos:
//!
//! - **2xx**: Éxito (200 OK, 206 Partial Content)
//! - **3xx**: Redirección (302 Found, para la ruta por defecto)
//! - **4xx**: Error del cliente (404, 414)
//! - **5xx**: Error del servidor (500, también para rangos fuera de límites)

/// Representa los códigos de estado HTTP que soporta nuestro servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - Archivo completo o listado de directorio
    Ok = 200,

    /// 206 Partial Content - Respuesta a un header `Range`
    PartialContent = 206,

    /// 302 Found - Redirección de `/` a la ruta por defecto
    Found = 302,

    /// 404 Not Found - Archivo inexistente o fuera de la carpeta servida
    NotFound = 404,

    /// 414 URI Too Long - Request-target ausente, vacío o demasiado largo
    UriTooLong = 414,

    /// 500 Internal Server Error - Rango inválido o error de I/O
    InternalServerError = 500,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::StatusCode;
    /// assert_eq!(StatusCode::PartialContent.as_u16(), 206);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::UriTooLong.reason_phrase(), "URI Too Long");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::PartialContent => "Partial Content",
            StatusCode::Found => "Found",
            StatusCode::NotFound => "Not Found",
            StatusCode::UriTooLong => "URI Too Long",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
