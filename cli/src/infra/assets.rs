//! Embedded deployment bundle, compiled into the binary.
//!
//! At compile time, `include_dir!` embeds everything under `assets/bundle/`:
//!   - `docker-compose.yml`        postgres, n8n and nginx services
//!   - `nginx/nginx.conf`          reverse proxy top-level config
//!   - `nginx/conf.d/n8n.conf`     site config proxying to n8n
//!   - `DEPLOYMENT.md`             operations guide
//!   - `n8n-deploy.yaml`           default settings

use std::path::Path;

use anyhow::Result;
use include_dir::{Dir, DirEntry, include_dir};

static BUNDLE: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets/bundle");

/// Every bundled file as `(path relative to the deployment dir, contents)`,
/// sorted by path.
#[must_use]
pub fn bundle_files() -> Vec<(&'static Path, &'static [u8])> {
    fn walk(dir: &'static Dir<'static>, out: &mut Vec<(&'static Path, &'static [u8])>) {
        for entry in dir.entries() {
            match entry {
                DirEntry::Dir(d) => walk(d, out),
                DirEntry::File(f) => out.push((f.path(), f.contents())),
            }
        }
    }
    let mut files = Vec::new();
    walk(&BUNDLE, &mut files);
    files.sort_by_key(|(p, _)| *p);
    files
}

/// Raw bytes of one bundled file.
///
/// # Errors
///
/// Returns an error if no file with the given relative path exists.
pub fn get_asset(name: &str) -> Result<&'static [u8]> {
    BUNDLE
        .get_file(name)
        .map(include_dir::File::contents)
        .ok_or_else(|| anyhow::anyhow!("embedded asset not found: {name}"))
}
