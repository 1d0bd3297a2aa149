//! JSON (de)serialization of surface requests.
//!
//! Lets a host application keep reproducible invocation files and pass
//! them to the CLI instead of a dozen flags.

use crate::engine::SurfaceRequest;
use crate::io::IoError;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Load a [`SurfaceRequest`] from a JSON file
pub fn load_request(path: impl AsRef<Path>) -> Result<SurfaceRequest, IoError> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Save a [`SurfaceRequest`] to a pretty-printed JSON file
pub fn save_request(request: &SurfaceRequest, path: impl AsRef<Path>) -> Result<(), IoError> {
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, request)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_round_trip() {
        let request = SurfaceRequest::classic_julia();
        let path = std::env::temp_dir().join("qjulia_test_request.json");

        save_request(&request, &path).unwrap();
        let loaded = load_request(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, request);
    }

    #[test]
    fn test_malformed_request_file() {
        let path = std::env::temp_dir().join("qjulia_test_bad_request.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let result = load_request(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(IoError::Json(_))));
    }
}
