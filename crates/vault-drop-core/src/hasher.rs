use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const CHUNK_SIZE: usize = 8192;

/// Streaming blake3 fingerprint of a file's byte content.
///
/// Deterministic in the bytes only — name, timestamps and location do not
/// contribute. Reads in fixed-size chunks so large files never require full
/// in-memory buffering.
pub fn fingerprint_file(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    fingerprint_reader(file)
}

/// Fingerprint an arbitrary byte stream.
pub fn fingerprint_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn fingerprint_depends_on_content_not_name() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a.txt");
        let b = tmp.path().join("completely_different_name.pdf");
        fs::write(&a, "same bytes").unwrap();
        fs::write(&b, "same bytes").unwrap();

        assert_eq!(
            fingerprint_file(&a).unwrap(),
            fingerprint_file(&b).unwrap()
        );
    }

    #[test]
    fn fingerprint_differs_on_content() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a.txt");
        let b = tmp.path().join("b.txt");
        fs::write(&a, "one").unwrap();
        fs::write(&b, "two").unwrap();

        assert_ne!(
            fingerprint_file(&a).unwrap(),
            fingerprint_file(&b).unwrap()
        );
    }

    #[test]
    fn fingerprint_streams_across_chunk_boundary() {
        // Content larger than one read chunk hashes identically to the
        // one-shot digest.
        let data = vec![0x5Au8; CHUNK_SIZE * 3 + 17];
        let streamed = fingerprint_reader(&data[..]).unwrap();
        let direct = blake3::hash(&data).to_hex().to_string();
        assert_eq!(streamed, direct);
    }
}
