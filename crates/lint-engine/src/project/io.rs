use crate::errors::AnalysisFailure;
use crate::project::file::FileRef;
use crate::project::source::ResourceProvider;
use std::io::Read;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Character encodings the engine can decode source files from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Latin1,
}

impl Encoding {
    /// Resolve an encoding label (case-insensitive, `-`/`_` tolerant).
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" => Some(Encoding::Utf8),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Some(Encoding::Latin1),
            _ => None,
        }
    }

    pub fn decode(&self, bytes: Vec<u8>) -> Result<String, String> {
        match self {
            Encoding::Utf8 => {
                let bytes = match bytes.strip_prefix(UTF8_BOM) {
                    Some(rest) => rest.to_vec(),
                    None => bytes,
                };
                String::from_utf8(bytes).map_err(|e| e.to_string())
            }
            Encoding::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

/// Read a file through the provider and decode it with its declared encoding.
///
/// - Files above `max_file_size` bytes are refused without decoding; at most
///   one byte past the limit is read
pub fn read_source(
    provider: &dyn ResourceProvider,
    file: &FileRef,
    max_file_size: usize,
) -> Result<String, AnalysisFailure> {
    let read_failure = |source| AnalysisFailure::Read {
        path: file.path().to_string(),
        source,
    };

    let reader = provider.open(file).map_err(read_failure)?;
    let limit = u64::try_from(max_file_size).unwrap_or(u64::MAX);
    let mut bytes = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(read_failure)?;

    if bytes.len() > max_file_size {
        return Err(AnalysisFailure::TooLarge {
            path: file.path().to_string(),
            limit: max_file_size,
        });
    }

    decode(file, bytes)
}

pub fn decode(file: &FileRef, bytes: Vec<u8>) -> Result<String, AnalysisFailure> {
    let decode_failure = |message: String| AnalysisFailure::Decode {
        path: file.path().to_string(),
        encoding: file.encoding().to_string(),
        message,
    };

    let encoding = Encoding::from_label(file.encoding())
        .ok_or_else(|| decode_failure("unsupported encoding".to_string()))?;
    encoding.decode(bytes).map_err(decode_failure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryResourceProvider;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts the bytes handed out so tests can see how far a read went.
    struct CountingProvider {
        inner: MemoryResourceProvider,
        served: AtomicUsize,
    }

    struct CountingReader<'a> {
        inner: Box<dyn Read + 'a>,
        served: &'a AtomicUsize,
    }

    impl Read for CountingReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let read = self.inner.read(buf)?;
            self.served.fetch_add(read, Ordering::SeqCst);
            Ok(read)
        }
    }

    impl ResourceProvider for CountingProvider {
        fn project_name(&self) -> &str {
            self.inner.project_name()
        }

        fn resource_tree(&self) -> anyhow::Result<crate::project::ResourceNode> {
            self.inner.resource_tree()
        }

        fn open(&self, file: &FileRef) -> io::Result<Box<dyn Read + '_>> {
            Ok(Box::new(CountingReader {
                inner: self.inner.open(file)?,
                served: &self.served,
            }))
        }
    }

    #[test]
    fn test_oversized_file_is_refused_after_reading_past_the_limit() {
        let provider = CountingProvider {
            inner: MemoryResourceProvider::new("web"),
            served: Default::default(),
        };
        provider.inner.write("big.js", &"x".repeat(1_000_000));

        let err = read_source(&provider, &FileRef::new("big.js"), 16).unwrap_err();

        assert!(matches!(err, AnalysisFailure::TooLarge { limit: 16, .. }));
        assert!(provider.served.load(Ordering::SeqCst) <= 17);
    }

    #[test]
    fn test_file_at_the_limit_is_read() {
        let provider = MemoryResourceProvider::new("web");
        provider.write("exact.js", &"x".repeat(16));

        let content = read_source(&provider, &FileRef::new("exact.js"), 16).unwrap();

        assert_eq!(content.len(), 16);
    }

    #[test]
    fn test_unlimited_size_reads_everything() {
        let provider = MemoryResourceProvider::new("web");
        provider.write("a.js", "var a;\n");

        let content = read_source(&provider, &FileRef::new("a.js"), usize::MAX).unwrap();

        assert_eq!(content, "var a;\n");
    }

    #[test]
    fn test_encoding_labels() {
        assert_eq!(Encoding::from_label("UTF-8"), Some(Encoding::Utf8));
        assert_eq!(Encoding::from_label("utf8"), Some(Encoding::Utf8));
        assert_eq!(Encoding::from_label("ISO-8859-1"), Some(Encoding::Latin1));
        assert_eq!(Encoding::from_label("latin_1"), Some(Encoding::Latin1));
        assert_eq!(Encoding::from_label("Shift_JIS"), None);
    }

    #[test]
    fn test_decode_utf8_strips_bom() {
        let file = FileRef::new("a.js");
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("var x = 1;".as_bytes());

        assert_eq!(decode(&file, bytes).unwrap(), "var x = 1;");
    }

    #[test]
    fn test_decode_latin1() {
        let file = FileRef::with_encoding("a.js", "ISO-8859-1");
        // "café" in latin1
        let bytes = vec![0x63, 0x61, 0x66, 0xE9];

        assert_eq!(decode(&file, bytes).unwrap(), "café");
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let file = FileRef::new("a.js");
        let err = decode(&file, vec![0x63, 0xE9, 0x00]).unwrap_err();

        match err {
            AnalysisFailure::Decode { path, encoding, .. } => {
                assert_eq!(path, "a.js");
                assert_eq!(encoding, "UTF-8");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_unknown_encoding() {
        let file = FileRef::with_encoding("a.js", "EBCDIC");
        let err = decode(&file, b"x".to_vec()).unwrap_err();
        assert!(err.to_string().contains("unsupported encoding"));
    }
}
