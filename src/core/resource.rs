use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

/// An opaque handle to a source of bytes.
///
/// Readers resolve their input through this capability instead of a concrete
/// file, so the same reader works against files on disk, in-memory buffers
/// and test doubles. `exists` is checked before `open` so a reader in
/// non-strict mode can degrade to an empty input instead of failing.
///
/// # Examples
///
/// ```
/// use xml_batch_rs::core::resource::{BytesResource, Resource};
///
/// let resource = BytesResource::new("<root/>");
/// assert!(resource.exists());
///
/// let mut content = String::new();
/// use std::io::Read;
/// resource.open().unwrap().read_to_string(&mut content).unwrap();
/// assert_eq!(content, "<root/>");
/// ```
pub trait Resource {
    /// True when the underlying byte source is currently present.
    fn exists(&self) -> bool;

    /// Opens a fresh byte stream over the resource.
    fn open(&self) -> io::Result<Box<dyn Read>>;

    /// Human readable location, used in logs and error messages.
    fn description(&self) -> String;
}

/// A [`Resource`] backed by a file on disk.
///
/// # Examples
///
/// ```no_run
/// use xml_batch_rs::core::resource::{FileResource, Resource};
///
/// let resource = FileResource::new("data/orders.xml");
/// if resource.exists() {
///     let stream = resource.open().unwrap();
///     // hand the stream to a reader
/// }
/// ```
pub struct FileResource {
    path: PathBuf,
}

impl FileResource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Resource for FileResource {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn open(&self) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(File::open(&self.path)?))
    }

    fn description(&self) -> String {
        format!("file [{}]", self.path.display())
    }
}

/// A [`Resource`] backed by an in-memory buffer.
///
/// Always present; opening hands out a fresh cursor over a copy of the
/// bytes. Mostly useful for tests and small embedded documents.
pub struct BytesResource {
    bytes: Vec<u8>,
}

impl BytesResource {
    pub fn new<B: Into<Vec<u8>>>(bytes: B) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl Resource for BytesResource {
    fn exists(&self) -> bool {
        true
    }

    fn open(&self) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(Cursor::new(self.bytes.clone())))
    }

    fn description(&self) -> String {
        format!("in-memory buffer [{} bytes]", self.bytes.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    #[test]
    fn file_resource_reports_missing_file() {
        let resource = FileResource::new(temp_dir().join("definitely-not-here.xml"));

        assert!(!resource.exists());
        assert!(resource.open().is_err());
        assert!(resource.description().contains("definitely-not-here.xml"));
    }

    #[test]
    fn bytes_resource_always_exists() {
        let resource = BytesResource::new(b"<root></root>".to_vec());

        assert!(resource.exists());

        let mut content = String::new();
        resource
            .open()
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "<root></root>");
    }

    #[test]
    fn bytes_resource_can_be_opened_twice() {
        let resource = BytesResource::new("<a/>");

        for _ in 0..2 {
            let mut content = String::new();
            resource
                .open()
                .unwrap()
                .read_to_string(&mut content)
                .unwrap();
            assert_eq!(content, "<a/>");
        }
    }
}
