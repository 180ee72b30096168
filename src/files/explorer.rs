//! # Explorador de Archivos
//! src/files/explorer.rs
//!
//! Genera la página HTML que lista el contenido de un directorio:
//!
//! ```text
//! Index of /img/ (2 entries)
//! ..
//! a.png
//! thumbs/
//! ```
//!
//! Los subdirectorios llevan una `/` final para que el link navegue dentro
//! de ellos. La lista se arma en cada request y se descarta al enviarla.
//!
//! Los nombres se guardan como bytes. El `href` de cada link va
//! percent-encoded (`%`, `?`, `#`, espacios, bytes no ASCII...) para que al
//! seguirlo el servidor decodifique exactamente el nombre listado.

use crate::logger::Logger;
use std::collections::BinaryHeap;
use std::fs;
use std::io;
use std::path::Path;

/// Máximo de entradas listadas por directorio
pub const EXPLORER_MAX_FILES: usize = 1000;

/// Largo máximo de un nombre listado (incluye la `/` de los directorios)
pub const EXPLORER_MAX_FILENAME_SIZE: usize = 255;

/// Crecimiento mínimo del buffer HTML
const HTML_GROWTH_STEP: usize = 1024;

/// Bytes que van tal cual en un `href`; el resto se codifica como `%XX`
const HREF_SAFE: &[u8] = b"-._~/!$&()*+,;=@";

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Entradas de un directorio, listas para renderizar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    /// Ruta pedida, relativa a la raíz (ej: "img/")
    path: String,

    /// Nombres ordenados, byte a byte; los directorios terminan en `/`
    entries: Vec<Vec<u8>>,
}

impl DirectoryListing {
    /// Enumera `dir` (sin `.` ni `..`)
    ///
    /// Los nombres demasiado largos se saltan con un warning. Se conservan
    /// como máximo `EXPLORER_MAX_FILES` entradas (las primeras en orden),
    /// sin acumular el resto en memoria.
    pub fn read(dir: &Path, path: &str, logger: &dyn Logger) -> io::Result<Self> {
        let mut kept: BinaryHeap<Vec<u8>> = BinaryHeap::new();
        let mut total = 0usize;

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let mut name = entry.file_name().into_encoded_bytes();

            if name == b"." || name == b".." {
                continue;
            }
            if entry.path().is_dir() {
                name.push(b'/');
            }
            if name.len() > EXPLORER_MAX_FILENAME_SIZE {
                logger.warn(format_args!(
                    "Explorer: skipping entry of {} bytes in '{}'",
                    name.len(),
                    path
                ));
                continue;
            }

            total += 1;
            kept.push(name);
            if kept.len() > EXPLORER_MAX_FILES {
                kept.pop();
            }
        }

        if total > EXPLORER_MAX_FILES {
            logger.warn(format_args!(
                "Explorer: '{}' has {} entries, listing the first {}",
                path, total, EXPLORER_MAX_FILES
            ));
        }

        Ok(Self {
            path: path.to_string(),
            entries: kept.into_sorted_vec(),
        })
    }

    /// Construye un listado a partir de nombres ya conocidos
    pub fn from_entries(path: &str, entries: Vec<String>) -> Self {
        Self {
            path: path.to_string(),
            entries: entries.into_iter().map(String::into_bytes).collect(),
        }
    }

    /// Nombres listados, byte a byte
    pub fn entries(&self) -> &[Vec<u8>] {
        &self.entries
    }

    /// Nombres listados como texto (bytes no UTF-8 como U+FFFD)
    pub fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| String::from_utf8_lossy(entry).into_owned())
            .collect()
    }

    /// Cantidad de entradas listadas
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renderiza el listado como página HTML
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::files::DirectoryListing;
    ///
    /// let listing = DirectoryListing::from_entries(
    ///     "",
    ///     vec!["img/".to_string(), "my notes.txt".to_string()],
    /// );
    /// let html = listing.to_html();
    ///
    /// assert!(html.contains("<a href='img/'>img/</a>"));
    /// assert!(html.contains("<a href='my%20notes.txt'>my notes.txt</a>"));
    /// ```
    pub fn to_html(&self) -> String {
        let title = escape_html(&self.path);
        let mut html = String::with_capacity(HTML_GROWTH_STEP);

        append(
            &mut html,
            &format!(
                "<html><head><meta charset='utf-8'><title>Index of /{0}</title></head>\
                 <body><h2>Index of /{0}</h2><p>{1} entries</p><hr>",
                title,
                self.entries.len()
            ),
        );
        append(&mut html, "<a href='..'>..</a><br>");

        for entry in &self.entries {
            let href = escape_html(&encode_href(entry));
            let name = escape_html(&String::from_utf8_lossy(entry));
            append(&mut html, &format!("<a href='{}'>{}</a><br>", href, name));
        }

        append(&mut html, "<hr></body></html>");
        html
    }
}

/// Agrega un fragmento reservando de a `HTML_GROWTH_STEP` bytes como mínimo
fn append(html: &mut String, fragment: &str) {
    if html.capacity() - html.len() < fragment.len() {
        html.reserve(fragment.len().max(HTML_GROWTH_STEP));
    }
    html.push_str(fragment);
}

/// Codifica un nombre para usarlo como `href` relativo
///
/// Inverso de `http::request::percent_decode`: todo byte fuera de
/// `HREF_SAFE` y de los alfanuméricos ASCII se escribe como `%XX`.
fn encode_href(name: &[u8]) -> String {
    let mut encoded = String::with_capacity(name.len());

    for &byte in name {
        if byte.is_ascii_alphanumeric() || HREF_SAFE.contains(&byte) {
            encoded.push(char::from(byte));
        } else {
            encoded.push('%');
            encoded.push(char::from(HEX_DIGITS[usize::from(byte >> 4)]));
            encoded.push(char::from(HEX_DIGITS[usize::from(byte & 0x0F)]));
        }
    }

    encoded
}

/// Escapa los caracteres con significado en HTML y en atributos
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&#39;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::test_support::fixture_tree;
    use crate::http::request::percent_decode;
    use crate::logger::{LogLevel, MemoryLogger, NoopLogger};

    #[test]
    fn test_read_fixture_root() {
        let dir = fixture_tree("explorer_root");
        let listing = DirectoryListing::read(&dir, "", &NoopLogger).unwrap();

        assert_eq!(listing.names(), vec!["empty.txt", "img/", "index.html"]);
        assert_eq!(listing.len(), 3);
    }

    #[test]
    fn test_read_subdirectory() {
        let dir = fixture_tree("explorer_sub");
        let listing = DirectoryListing::read(&dir.join("img"), "img/", &NoopLogger).unwrap();

        assert_eq!(listing.entries(), &[b"a.png".to_vec()]);
    }

    #[test]
    fn test_read_empty_directory() {
        let dir = fixture_tree("explorer_empty");
        fs::create_dir_all(dir.join("nothing")).unwrap();

        let listing = DirectoryListing::read(&dir.join("nothing"), "nothing/", &NoopLogger).unwrap();
        assert!(listing.is_empty());
        assert!(listing.to_html().contains("0 entries"));
    }

    #[test]
    fn test_read_missing_directory() {
        let dir = fixture_tree("explorer_missing");
        let result = DirectoryListing::read(&dir.join("nope"), "nope/", &NoopLogger);

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_long_names_are_skipped() {
        let dir = fixture_tree("explorer_long");
        let long_name = "x".repeat(EXPLORER_MAX_FILENAME_SIZE);
        fs::write(dir.join(&long_name), b"").unwrap();
        fs::create_dir_all(dir.join("y".repeat(EXPLORER_MAX_FILENAME_SIZE))).unwrap();

        let logger = MemoryLogger::default();
        let listing = DirectoryListing::read(&dir, "", &logger).unwrap();

        assert!(listing.names().contains(&long_name));
        assert_eq!(listing.len(), 4);
        assert!(logger.contains(LogLevel::Warn, "skipping entry of 256 bytes"));
    }

    #[test]
    fn test_large_directory_keeps_first_entries() {
        let dir = fixture_tree("explorer_many");
        let many = dir.join("many");
        fs::create_dir_all(&many).unwrap();
        for i in 0..EXPLORER_MAX_FILES + 5 {
            fs::write(many.join(format!("f{:04}", i)), b"").unwrap();
        }

        let logger = MemoryLogger::default();
        let listing = DirectoryListing::read(&many, "many/", &logger).unwrap();
        let names = listing.names();

        assert_eq!(listing.len(), EXPLORER_MAX_FILES);
        assert_eq!(names.first().map(String::as_str), Some("f0000"));
        assert_eq!(names.last().map(String::as_str), Some("f0999"));
        assert!(logger.contains(LogLevel::Warn, "has 1005 entries, listing the first 1000"));
    }

    #[test]
    fn test_html_structure() {
        let listing = DirectoryListing::from_entries("img/", vec!["a.png".to_string()]);
        let html = listing.to_html();

        assert!(html.starts_with("<html>"));
        assert!(html.contains("Index of /img/"));
        assert!(html.contains("1 entries"));
        assert!(html.ends_with("</body></html>"));

        let parent = html.find("<a href='..'>").unwrap();
        let entry = html.find("<a href='a.png'>").unwrap();
        assert!(parent < entry);
        assert_eq!(html.matches("<a href=").count(), 2);
    }

    #[test]
    fn test_html_escapes_names() {
        let listing = DirectoryListing::from_entries("", vec!["<b>'x'&.txt".to_string()]);
        let html = listing.to_html();

        assert!(html.contains(">&lt;b&gt;&#39;x&#39;&amp;.txt</a>"));
        assert!(html.contains("<a href='%3Cb%3E%27x%27&amp;.txt'>"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_href_encodes_reserved_bytes() {
        let listing = DirectoryListing::from_entries(
            "",
            vec![
                "a%20b.txt".to_string(),
                "q?x.txt".to_string(),
                "h#1.txt".to_string(),
                "año.txt".to_string(),
                "dir with space/".to_string(),
            ],
        );
        let html = listing.to_html();

        assert!(html.contains("<a href='a%2520b.txt'>a%20b.txt</a>"));
        assert!(html.contains("<a href='q%3Fx.txt'>q?x.txt</a>"));
        assert!(html.contains("<a href='h%231.txt'>h#1.txt</a>"));
        assert!(html.contains("<a href='a%C3%B1o.txt'>año.txt</a>"));
        assert!(html.contains("<a href='dir%20with%20space/'>"));
    }

    #[test]
    fn test_href_decodes_back_to_name() {
        let names: [&[u8]; 5] = [b"plain.txt", b"50% off?.txt", b"\xff\xfe.bin", b"a:b#c", b"sub dir/"];

        for name in names {
            assert_eq!(percent_decode(encode_href(name).as_bytes()), name);
        }
    }

    #[test]
    fn test_append_grows_in_steps() {
        let mut html = String::new();
        append(&mut html, "abc");
        assert!(html.capacity() >= HTML_GROWTH_STEP);

        let big = "z".repeat(HTML_GROWTH_STEP * 2);
        append(&mut html, &big);
        assert_eq!(html.len(), 3 + big.len());
    }
}
