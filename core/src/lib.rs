//! Core utilities and shared types for the scan importer.

pub mod error;
pub mod fs;

pub use error::ImportError;

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!version().is_empty());
    }
}
