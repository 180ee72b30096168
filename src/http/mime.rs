//! # Tipos MIME
//! src/http/mime.rs
//!
//! Traduce la extensión de un archivo a su `Content-Type`.
//!
//! La búsqueda es lineal sobre una tabla fija y ordenada; gana la primera
//! coincidencia exacta. No se normalizan mayúsculas: `INDEX.HTML` cae en el
//! tipo por defecto.

/// Tipo usado cuando la extensión no está en la tabla
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Extensiones soportadas (con el punto) y su tipo MIME
const MIME_TYPES: &[(&str, &str)] = &[
    (".html", "text/html"),
    (".htm", "text/html"),
    (".txt", "text/plain"),
    (".css", "text/css"),
    (".js", "application/javascript"),
    (".json", "application/json"),
    (".xml", "application/xml"),
    (".gif", "image/gif"),
    (".jpeg", "image/jpeg"),
    (".mkv", "video/x-matroska"),
    (".flac", "audio/flac"),
    (".mp3", "audio/mp3"),
    (".jpg", "image/jpeg"),
    (".png", "image/png"),
    (".svg", "image/svg+xml"),
    (".mp4", "video/mp4"),
    (".ico", "image/x-icon"),
    (".pdf", "application/pdf"),
    (".doc", "application/msword"),
    (".docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
    (".xls", "application/vnd.ms-excel"),
    (".xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
    (".ppt", "application/vnd.ms-powerpoint"),
    (".pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation"),
];

/// Extrae la extensión (incluyendo el punto) del nombre del archivo
///
/// Un punto al inicio del nombre (`.bashrc`) no cuenta como extensión.
///
/// # Ejemplo
/// ```
/// use file_server::http::mime::extension;
///
/// assert_eq!(extension("img/a.png"), ".png");
/// assert_eq!(extension("archive.tar.gz"), ".gz");
/// assert_eq!(extension(".bashrc"), "");
/// assert_eq!(extension("Makefile"), "");
/// ```
pub fn extension(path: &str) -> &str {
    let file_name = path.rsplit('/').next().unwrap_or(path);

    match file_name.rfind('.') {
        Some(0) | None => "",
        Some(dot) => &file_name[dot..],
    }
}

/// Retorna el tipo MIME para la ruta indicada
///
/// # Ejemplo
/// ```
/// use file_server::http::mime::mime_type;
///
/// assert_eq!(mime_type("index.html"), "text/html");
/// assert_eq!(mime_type("movie.mp4"), "video/mp4");
/// assert_eq!(mime_type("data.bin"), "application/octet-stream");
/// ```
pub fn mime_type(path: &str) -> &'static str {
    let ext = extension(path);

    MIME_TYPES
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME_TYPE)
}
