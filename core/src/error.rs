use std::path::PathBuf;

/// Failures that abort an import run.
///
/// Per-record and per-file failures are recovered where they happen and never
/// become an `ImportError`.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("cannot create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open store at {}: {cause:#}", .path.display())]
    OpenStore { path: PathBuf, cause: anyhow::Error },

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_dir_message_names_path() {
        let err = ImportError::CreateDir {
            path: PathBuf::from("/nope/out"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(err.to_string().contains("/nope/out"));
    }

    #[test]
    fn store_is_transparent() {
        let err = ImportError::from(anyhow::anyhow!("disk I/O error"));
        assert_eq!(err.to_string(), "disk I/O error");
    }
}
