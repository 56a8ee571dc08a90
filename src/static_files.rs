//! Serving files from a directory through ordinary routes.

use http::StatusCode;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

use crate::context::Context;
use crate::router::{RouteGroup, Router};

/// Maps URL paths below a base directory to files on disk.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self {
            base_dir: base.into(),
        }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Join `url_path` onto the base directory, refusing `..`, roots and prefixes.
    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(pb)
    }

    #[must_use]
    pub fn content_type(path: &Path) -> &'static str {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "html" => "text/html",
            "css" => "text/css",
            "js" => "text/javascript",
            "json" => "application/json",
            "txt" => "text/plain",
            _ => "application/octet-stream",
        }
    }

    /// Read the file behind `url_path` along with its content type.
    pub fn load(&self, url_path: &str) -> io::Result<(Vec<u8>, &'static str)> {
        let path = self
            .map_path(url_path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "invalid path"))?;
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        let bytes = fs::read(&path)?;
        Ok((bytes, Self::content_type(&path)))
    }

    /// Relative URL paths (`/css/site.css`) of every file currently below the base.
    pub fn discover(&self) -> io::Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.base_dir).sort_by_file_name() {
            let entry = entry.map_err(io::Error::other)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.base_dir) else {
                continue;
            };
            let url: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            files.push(format!("/{}", url.join("/")));
        }
        Ok(files)
    }

    fn serve(&self, ctx: &mut Context, url_path: &str) {
        match self.load(url_path) {
            Ok((bytes, content_type)) => {
                ctx.response().append_body(&bytes, Some(content_type));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %url_path, "Static file vanished after registration");
                ctx.response()
                    .error(&format!("404 {url_path} not found"), StatusCode::NOT_FOUND);
            }
            Err(e) => {
                error!(path = %url_path, error = %e, "Failed reading static file");
                ctx.response()
                    .error("Internal Server Error", StatusCode::INTERNAL_SERVER_ERROR);
            }
        }
    }
}

impl Router {
    /// Mount every file below `dir` as a `GET` route under `prefix`.
    ///
    /// The directory is walked once, now; files added later are not served. Files
    /// removed later answer `404`. Files whose path has a segment starting with `:` are
    /// skipped, since that segment would register as a variable.
    pub fn static_dir(
        &mut self,
        prefix: &str,
        dir: impl Into<PathBuf>,
    ) -> io::Result<&mut RouteGroup> {
        let files = Arc::new(StaticFiles::new(dir));
        let discovered = files.discover()?;
        let group = self.group(prefix);
        for url_path in discovered {
            if url_path.split('/').any(|segment| segment.starts_with(':')) {
                warn!(prefix = %prefix, path = %url_path, "Skipping static file with `:` segment");
                continue;
            }
            debug!(prefix = %prefix, path = %url_path, "Static file registered");
            let files = Arc::clone(&files);
            let served = url_path.clone();
            group.path(&url_path).get(move |ctx: &mut Context| {
                files.serve(ctx, &served);
            });
        }
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_path_prevents_traversal() {
        let sf = StaticFiles::new("public");
        assert!(sf.map_path("../Cargo.toml").is_none());
        assert!(sf.map_path("css/../../Cargo.toml").is_none());
        assert_eq!(
            sf.map_path("/css/site.css"),
            Some(PathBuf::from("public/css/site.css"))
        );
    }

    #[test]
    fn test_content_type() {
        assert_eq!(StaticFiles::content_type(Path::new("a.HTML")), "text/html");
        assert_eq!(StaticFiles::content_type(Path::new("a.js")), "text/javascript");
        assert_eq!(
            StaticFiles::content_type(Path::new("a.bin")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_load_and_discover() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("hello.txt"), "Hello\n").unwrap();
        fs::write(dir.path().join("css/site.css"), "body{}").unwrap();

        let sf = StaticFiles::new(dir.path());
        let (bytes, ct) = sf.load("hello.txt").unwrap();
        assert_eq!(ct, "text/plain");
        assert_eq!(bytes, b"Hello\n");
        assert_eq!(sf.discover().unwrap(), vec!["/css/site.css", "/hello.txt"]);
        assert_eq!(
            sf.load("missing.txt").unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }
}
