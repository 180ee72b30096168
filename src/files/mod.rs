//! # Acceso al Sistema de Archivos
//! src/files/mod.rs
//!
//! Traduce rutas relativas del request a rutas reales bajo la raíz servida
//! y abre los archivos a transmitir.
//!
//! ## Seguridad
//!
//! Una ruta solo puede contener componentes normales (`img`, `a.png`) o `.`.
//! Cualquier `..`, raíz o prefijo de unidad hace que la ruta se rechace, así
//! que nunca se sale de la raíz.
//!
//! Las rutas llegan como bytes. En unix se usan tal cual como nombre de
//! archivo; en otras plataformas se interpretan como UTF-8.

pub mod explorer;

pub use explorer::DirectoryListing;

use crate::http::mime;
use crate::http::{ByteRange, RangeError, RangeSpec, StatusCode};
use std::ffi::OsStr;
use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Errores al abrir un archivo pedido
#[derive(Debug, Error)]
pub enum FileError {
    #[error("path escapes the served root: {0}")]
    OutsideRoot(String),

    #[error("not a regular file: {}", .0.display())]
    NotAFile(PathBuf),

    #[error("cannot open {}: {}", .path.display(), .source)]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Raíz del árbol de archivos expuesto por el servidor
#[derive(Debug, Clone)]
pub struct ServedRoot {
    root: PathBuf,
}

/// Descriptor de la respuesta para un archivo ya abierto
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResponse {
    /// Ruta real del archivo
    pub path: PathBuf,

    /// Tamaño en bytes
    pub size: u64,

    /// Content-Type según la extensión
    pub mime: &'static str,

    /// Rango pedido, ya validado
    pub range: Option<ByteRange>,
}

impl ServedRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Une una ruta relativa del request con la raíz
    ///
    /// Retorna `None` si la ruta intenta salir de la raíz.
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::files::ServedRoot;
    /// use std::path::PathBuf;
    ///
    /// let root = ServedRoot::new("/srv/www");
    /// assert_eq!(root.resolve(b"img/a.png"), Some(PathBuf::from("/srv/www/img/a.png")));
    /// assert_eq!(root.resolve(b""), Some(PathBuf::from("/srv/www")));
    /// assert_eq!(root.resolve(b"../etc/passwd"), None);
    /// assert_eq!(root.resolve(b"/etc/passwd"), None);
    /// ```
    pub fn resolve(&self, relative: &[u8]) -> Option<PathBuf> {
        let mut resolved = self.root.clone();

        for component in bytes_to_path(relative).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }

        Some(resolved)
    }

    /// Abre un archivo regular bajo la raíz
    ///
    /// Un directorio cuenta como archivo inexistente.
    pub fn open(&self, relative: &[u8]) -> Result<(File, FileResponse), FileError> {
        let path = self
            .resolve(relative)
            .ok_or_else(|| FileError::OutsideRoot(String::from_utf8_lossy(relative).into_owned()))?;

        let file = File::open(&path).map_err(|source| FileError::Open {
            path: path.clone(),
            source,
        })?;
        let metadata = file.metadata().map_err(|source| FileError::Open {
            path: path.clone(),
            source,
        })?;

        if !metadata.is_file() {
            return Err(FileError::NotAFile(path));
        }

        let response = FileResponse {
            mime: mime::mime_type(&String::from_utf8_lossy(relative)),
            size: metadata.len(),
            path,
            range: None,
        };

        Ok((file, response))
    }
}

/// Ruta relativa como `Path`, sin pasar por UTF-8
#[cfg(unix)]
fn bytes_to_path(bytes: &[u8]) -> &Path {
    use std::os::unix::ffi::OsStrExt;
    Path::new(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: &[u8]) -> std::borrow::Cow<'_, Path> {
    match String::from_utf8_lossy(bytes) {
        std::borrow::Cow::Borrowed(text) => std::borrow::Cow::Borrowed(Path::new(OsStr::new(text))),
        std::borrow::Cow::Owned(text) => std::borrow::Cow::Owned(PathBuf::from(text)),
    }
}

impl FileResponse {
    /// Aplica el header `Range` (si vino) validándolo contra el tamaño
    pub fn with_range(mut self, spec: Option<RangeSpec>) -> Result<Self, RangeError> {
        self.range = spec.map(|spec| spec.resolve(self.size)).transpose()?;
        Ok(self)
    }

    /// 206 si hay rango, 200 si no
    pub fn status(&self) -> StatusCode {
        match self.range {
            Some(_) => StatusCode::PartialContent,
            None => StatusCode::Ok,
        }
    }

    /// Bytes que lleva el body
    pub fn content_length(&self) -> u64 {
        self.range.map_or(self.size, |range| range.len())
    }

    /// Offset desde el que se empieza a leer
    pub fn offset(&self) -> u64 {
        self.range.map_or(0, |range| range.start())
    }
}
