use std::io;
use std::path::{Path, PathBuf};

use rand::{distributions::Alphanumeric, Rng};
use tracing::{debug, info};

/// URL prefix logos are served under
pub const LOGO_URL_PREFIX: &str = "/uploads/logos";

/// Disk-backed store for uploaded company logos
#[derive(Clone, Debug)]
pub struct LogoStore {
    dir: PathBuf,
}

impl LogoStore {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: upload_dir.into().join("logos"),
        }
    }

    /// Copy an uploaded file in under a random name and return its public URL
    pub fn save(
        &self,
        source: &Path,
        content_type: Option<&str>,
        file_name: Option<&str>,
    ) -> io::Result<String> {
        std::fs::create_dir_all(&self.dir)?;

        let name = format!("{}.{}", random_stem(), extension(content_type, file_name));
        let target = self.dir.join(&name);
        std::fs::copy(source, &target)?;

        info!("Stored company logo {}", target.display());
        Ok(format!("{}/{}", LOGO_URL_PREFIX, name))
    }

    /// Read a stored logo back; `None` for unknown or malformed names
    pub fn load(&self, name: &str) -> io::Result<Option<(Vec<u8>, &'static str)>> {
        if !is_stored_name(name) {
            debug!("Rejected logo name {:?}", name);
            return Ok(None);
        }
        match std::fs::read(self.dir.join(name)) {
            Ok(bytes) => Ok(Some((bytes, content_type_for(name)))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl LogoStore {
    /// Delete a logo by the URL `save` returned. Unknown URLs are a no-op.
    pub fn remove(&self, url: &str) -> io::Result<()> {
        let name = match url
            .strip_prefix(LOGO_URL_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
        {
            Some(name) if is_stored_name(name) => name,
            _ => return Ok(()),
        };
        match std::fs::remove_file(self.dir.join(name)) {
            Ok(()) => {
                info!("Removed company logo {}", name);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Number of stored logos
    pub fn count(&self) -> io::Result<usize> {
        match std::fs::read_dir(&self.dir) {
            Ok(entries) => Ok(entries.count()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e),
        }
    }
}

fn random_stem() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(20)
        .map(char::from)
        .collect()
}

const EXTENSIONS: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("avif", "image/avif"),
];

fn extension(content_type: Option<&str>, file_name: Option<&str>) -> &'static str {
    let from_name = file_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    if let Some(ext) = from_name {
        if let Some((known, _)) = EXTENSIONS.iter().find(|(e, _)| *e == ext) {
            return *known;
        }
    }
    content_type
        .and_then(|ct| EXTENSIONS.iter().find(|(_, mime)| *mime == ct))
        .map(|(ext, _)| *ext)
        .unwrap_or("img")
}

fn content_type_for(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or_default();
    EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or("application/octet-stream")
}

fn is_stored_name(name: &str) -> bool {
    match name.split_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty()
                && stem.chars().all(|c| c.is_ascii_alphanumeric())
                && !ext.is_empty()
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}
