// # File Secret Store
//
// Reads secrets from a directory tree laid out like mounted Kubernetes
// secret volumes.
//
// ## Layout
//
// ```text
// <root>/
//   <namespace>/
//     <secret-name>/
//       <key>          # file content is the value
// ```
//
// Every lookup hits the filesystem, so rotated secrets are picked up on the
// next challenge without a restart.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::Error;
use crate::traits::secret_store::SecretStore;

/// Directory-backed secret store
///
/// # Example
///
/// ```rust,no_run
/// use pdd_core::secrets::FileSecretStore;
/// use pdd_core::traits::SecretStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileSecretStore::new("/var/run/secrets/pdd")?;
///     let token = store.get_secret_value("cert-manager", "pdd-token", "token").await?;
///     println!("token has {} chars", token.len());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    root: PathBuf,
}

impl FileSecretStore {
    /// Create a store rooted at `root`
    ///
    /// The directory must exist; individual secrets are resolved lazily.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, Error> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(Error::config(format!(
                "secret directory does not exist: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn value_path(&self, namespace: &str, secret_name: &str, key: &str) -> Result<PathBuf, Error> {
        for (what, part) in [("namespace", namespace), ("secret name", secret_name), ("key", key)] {
            validate_segment(what, part)?;
        }
        Ok(self.root.join(namespace).join(secret_name).join(key))
    }
}

// Each part must stay a single path component under the root.
fn validate_segment(what: &str, part: &str) -> Result<(), Error> {
    let mut components = Path::new(part).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(Error::invalid_input(format!("invalid {what}: {part:?}"))),
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get_secret_value(
        &self,
        namespace: &str,
        secret_name: &str,
        key: &str,
    ) -> Result<String, Error> {
        let path = self.value_path(namespace, secret_name, key)?;
        tracing::debug!(path = %path.display(), "Reading secret value");

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(content.trim_end().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let secret_dir = self.root.join(namespace).join(secret_name);
                if fs::metadata(&secret_dir).await.is_ok() {
                    Err(Error::not_found(format!(
                        "key {key:?} not found in secret \"{namespace}/{secret_name}\""
                    )))
                } else {
                    Err(Error::not_found(format!("secret \"{namespace}/{secret_name}\"")))
                }
            }
            Err(e) => Err(Error::Io(e)),
        }
    }
}
