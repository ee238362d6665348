//! Directory-backed asset store
//!
//! Serves files below a root directory, with index file lookup for
//! directories, `ETag` validation and HEAD support.

use crate::assets::{AssetError, AssetRequest, AssetResponse, AssetStore};
use crate::config::{AssetsConfig, HttpConfig};
use crate::http::{self, cache, mime};
use crate::logger;
use hyper::body::Bytes;
use hyper::Method;
use percent_encoding::percent_decode_str;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Asset store reading from the local filesystem
#[derive(Debug, Clone)]
pub struct DirAssetStore {
    root: PathBuf,
    index_files: Vec<String>,
    cache_control: String,
    enable_cors: bool,
}

impl DirAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_files: vec!["index.html".to_string(), "index.htm".to_string()],
            cache_control: cache::cache_control(3600),
            enable_cors: false,
        }
    }

    pub fn from_config(assets: &AssetsConfig, http: &HttpConfig) -> Self {
        Self::new(&assets.directory)
            .with_index_files(assets.index_files.clone())
            .with_cache_max_age(assets.cache_max_age)
            .with_cors(http.enable_cors)
    }

    #[must_use]
    pub fn with_index_files(mut self, index_files: Vec<String>) -> Self {
        self.index_files = index_files;
        self
    }

    #[must_use]
    pub fn with_cache_max_age(mut self, max_age: u32) -> Self {
        self.cache_control = cache::cache_control(max_age);
        self
    }

    #[must_use]
    pub const fn with_cors(mut self, enable_cors: bool) -> Self {
        self.enable_cors = enable_cors;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a request path to a file below the root.
    ///
    /// `Ok(None)` means there is no such asset. An unreadable root is a
    /// store failure.
    async fn resolve(&self, path: &str) -> Result<Option<PathBuf>, AssetError> {
        let root = fs::canonicalize(&self.root).await.map_err(|e| {
            AssetError::Unavailable(format!(
                "static directory '{}' is inaccessible: {e}",
                self.root.display()
            ))
        })?;

        // Decode each segment, then drop empty, `.` and `..` ones before
        // touching the filesystem
        let mut relative = PathBuf::new();
        for segment in path.split('/') {
            let Ok(decoded) = percent_decode_str(segment).decode_utf8() else {
                return Ok(None);
            };
            if decoded.is_empty() || decoded == "." || decoded == ".." {
                continue;
            }
            // An encoded separator or NUL never names a single file
            if decoded.contains(['/', '\\', '\0']) {
                return Ok(None);
            }
            relative.push(&*decoded);
        }

        let mut file_path = root.join(&relative);

        if relative.as_os_str().is_empty() || is_dir(&file_path).await {
            for index_file in &self.index_files {
                let index_path = file_path.join(index_file);
                if is_file(&index_path).await {
                    file_path = index_path;
                    break;
                }
            }
        }

        // Not found is the common case, no need to log it
        let Ok(canonical) = fs::canonicalize(&file_path).await else {
            return Ok(None);
        };
        if !canonical.starts_with(&root) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {} -> {}",
                path,
                canonical.display()
            ));
            return Ok(None);
        }
        if !is_file(&canonical).await {
            return Ok(None);
        }

        Ok(Some(canonical))
    }
}

impl AssetStore for DirAssetStore {
    async fn fetch(&self, request: AssetRequest<'_>) -> Result<AssetResponse, AssetError> {
        let method = request.method();
        if *method == Method::OPTIONS {
            return Ok(http::build_options_response(self.enable_cors));
        }
        if *method != Method::GET && *method != Method::HEAD {
            return Ok(http::build_405_response());
        }

        let Some(file_path) = self.resolve(request.path()).await? else {
            return Ok(http::build_404_response());
        };

        let content = match fs::read(&file_path).await {
            Ok(c) => c,
            // removed between resolve and read
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(http::build_404_response()),
            Err(source) => {
                return Err(AssetError::Io {
                    path: file_path,
                    source,
                })
            }
        };

        let etag = cache::generate_etag(&content);
        let if_none_match = request
            .headers()
            .get("if-none-match")
            .and_then(|v| v.to_str().ok());
        if cache::check_etag_match(if_none_match, &etag) {
            return Ok(http::build_304_response(&etag, &self.cache_control));
        }

        Ok(http::build_asset_response(
            Bytes::from(content),
            mime::content_type_for(&file_path),
            &etag,
            &self.cache_control,
            *method == Method::HEAD,
        ))
    }
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{self, Env};
    use http_body_util::BodyExt;
    use hyper::http::request::Parts;
    use hyper::Request;
    use tempfile::TempDir;

    const SHELL: &str = "<!doctype html><div id=app></div>";

    /// Site layout:
    /// `index.html`, `about.html`, `assets/app.js`, `docs/index.html`,
    /// plus `secret.txt` one level above the served root
    fn site() -> (TempDir, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("secret.txt"), "top secret").unwrap();

        let root = tmp.path().join("public");
        std::fs::create_dir_all(root.join("assets")).unwrap();
        std::fs::create_dir_all(root.join("docs")).unwrap();
        std::fs::write(root.join("index.html"), SHELL).unwrap();
        std::fs::write(root.join("about.html"), "About page").unwrap();
        std::fs::write(root.join("assets/app.js"), "console.log(1)").unwrap();
        std::fs::write(root.join("docs/index.html"), "Docs").unwrap();
        (tmp, root)
    }

    fn head(method: Method, uri: &str, etag: Option<&str>) -> Parts {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(etag) = etag {
            builder = builder.header("if-none-match", etag);
        }
        builder.body(()).unwrap().into_parts().0
    }

    async fn fetch(store: &DirAssetStore, method: Method, uri: &str) -> AssetResponse {
        let parts = head(method, uri, None);
        store.fetch(AssetRequest::original(&parts)).await.unwrap()
    }

    async fn body_text(resp: AssetResponse) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_serves_existing_file() {
        let (_tmp, root) = site();
        let store = DirAssetStore::new(&root);

        let resp = fetch(&store, Method::GET, "/assets/app.js").await;

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "text/javascript; charset=utf-8");
        assert_eq!(resp.headers()["cache-control"], "public, max-age=3600");
        assert!(resp.headers().contains_key("etag"));
        assert_eq!(body_text(resp).await, "console.log(1)");
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let (_tmp, root) = site();
        let store = DirAssetStore::new(&root);

        assert_eq!(fetch(&store, Method::GET, "/missing-route").await.status(), 404);
        assert_eq!(fetch(&store, Method::GET, "/about.html/x").await.status(), 404);
    }

    #[tokio::test]
    async fn test_directories_use_index_files() {
        let (_tmp, root) = site();
        let store = DirAssetStore::new(&root);

        assert_eq!(body_text(fetch(&store, Method::GET, "/").await).await, SHELL);
        assert_eq!(body_text(fetch(&store, Method::GET, "/docs").await).await, "Docs");
        assert_eq!(body_text(fetch(&store, Method::GET, "/docs/").await).await, "Docs");
        // directory without any index file
        assert_eq!(fetch(&store, Method::GET, "/assets/").await.status(), 404);
    }

    #[tokio::test]
    async fn test_fallback_document_resolves() {
        let (_tmp, root) = site();
        let store = DirAssetStore::new(&root);
        let parts = head(Method::GET, "/settings/profile", None);

        let resp = store.fetch(AssetRequest::fallback(&parts)).await.unwrap();

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-type"], "text/html; charset=utf-8");
        assert_eq!(body_text(resp).await, SHELL);
    }

    #[tokio::test]
    async fn test_traversal_is_blocked() {
        let (_tmp, root) = site();
        let store = DirAssetStore::new(&root);

        assert_eq!(fetch(&store, Method::GET, "/../secret.txt").await.status(), 404);
        assert_eq!(fetch(&store, Method::GET, "/assets/../../secret.txt").await.status(), 404);
        assert_eq!(fetch(&store, Method::GET, "/%2e%2e/secret.txt").await.status(), 404);
        assert_eq!(fetch(&store, Method::GET, "/assets/%2E%2E%2F..%2Fsecret.txt").await.status(), 404);
    }

    #[tokio::test]
    async fn test_percent_encoded_names() {
        let (_tmp, root) = site();
        std::fs::write(root.join("logo dark.svg"), "<svg/>").unwrap();
        std::fs::write(root.join("café.js"), "export {}").unwrap();
        let store = DirAssetStore::new(&root);

        let logo = fetch(&store, Method::GET, "/logo%20dark.svg").await;
        assert_eq!(logo.status(), 200);
        assert_eq!(logo.headers()["content-type"], "image/svg+xml");
        assert_eq!(body_text(logo).await, "<svg/>");

        let script = fetch(&store, Method::GET, "/caf%C3%A9.js").await;
        assert_eq!(script.status(), 200);
        assert_eq!(script.headers()["content-type"], "text/javascript; charset=utf-8");
        assert_eq!(body_text(script).await, "export {}");

        // encoded separators do not split segments
        assert_eq!(fetch(&store, Method::GET, "/assets%2Fapp.js").await.status(), 404);
        assert_eq!(fetch(&store, Method::GET, "/assets%5Capp.js").await.status(), 404);
        assert_eq!(fetch(&store, Method::GET, "/about%00.html").await.status(), 404);
        // not valid UTF-8 once decoded
        assert_eq!(fetch(&store, Method::GET, "/%FF.js").await.status(), 404);
    }

    #[tokio::test]
    async fn test_matching_etag_gets_304() {
        let (_tmp, root) = site();
        let store = DirAssetStore::new(&root).with_cache_max_age(60);

        let first = fetch(&store, Method::GET, "/about.html").await;
        let etag = first.headers()["etag"].to_str().unwrap().to_string();

        let parts = head(Method::GET, "/about.html", Some(&etag));
        let second = store.fetch(AssetRequest::original(&parts)).await.unwrap();

        assert_eq!(second.status(), 304);
        assert_eq!(second.headers()["etag"], etag.as_str());
        assert_eq!(second.headers()["cache-control"], "public, max-age=60");
    }

    #[tokio::test]
    async fn test_head_has_length_but_no_body() {
        let (_tmp, root) = site();
        let store = DirAssetStore::new(&root);

        let resp = fetch(&store, Method::HEAD, "/about.html").await;

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["content-length"], "10");
        assert_eq!(body_text(resp).await, "");
    }

    #[tokio::test]
    async fn test_method_handling() {
        let (_tmp, root) = site();
        let store = DirAssetStore::new(&root).with_cors(true);

        assert_eq!(fetch(&store, Method::POST, "/about.html").await.status(), 405);
        assert_eq!(fetch(&store, Method::DELETE, "/missing").await.status(), 405);

        let options = fetch(&store, Method::OPTIONS, "/about.html").await;
        assert_eq!(options.status(), 204);
        assert_eq!(options.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_missing_root_is_a_store_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DirAssetStore::new(tmp.path().join("nope"));
        let parts = head(Method::GET, "/about.html", None);

        let err = store.fetch(AssetRequest::original(&parts)).await.unwrap_err();

        assert!(matches!(err, AssetError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_spa_handler_over_directory() {
        let (_tmp, root) = site();
        let env = Env::new(DirAssetStore::new(&root));

        let about = Request::builder().uri("/about.html").body(()).unwrap();
        let resp = handler::handle(about, &env).await.unwrap();
        assert_eq!(body_text(resp).await, "About page");

        let deep = Request::builder().uri("/users/7/posts").body(()).unwrap();
        let resp = handler::handle(deep, &env).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(body_text(resp).await, SHELL);

        std::fs::remove_file(root.join("index.html")).unwrap();
        let deep = Request::builder().uri("/users/7/posts").body(()).unwrap();
        let resp = handler::handle(deep, &env).await.unwrap();
        assert_eq!(resp.status(), 404);
    }
}
