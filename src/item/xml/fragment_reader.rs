use crate::core::item::{ItemReader, ItemReaderResult, ItemStreamReader};
use crate::core::resource::{BytesResource, FileResource, Resource};
use crate::error::BatchError;
use crate::item::xml::mapper::{FragmentMapper, SerdeFragmentMapper};
use log::{debug, error, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{QName, ResolveResult};
use quick_xml::reader::NsReader;
use serde::de::DeserializeOwned;
use std::cell::{Cell, RefCell};
use std::io::{BufReader, Read};
use std::path::Path;
use std::str;

/// A builder for creating XML fragment readers.
///
/// This builder helps configure fragment readers with:
/// - A fragment root element name, optionally qualified as `{namespace}local`
/// - A mapper that turns each fragment into an item
/// - Strict or lenient handling of missing or unreadable input
/// - Buffer capacity for performance tuning
///
/// # Examples
///
/// ```
/// use serde::Deserialize;
/// use xml_batch_rs::core::item::{ItemReader, ItemStreamReader};
/// use xml_batch_rs::item::xml::XmlFragmentReaderBuilder;
///
/// #[derive(Debug, Deserialize)]
/// struct Person {
///     #[serde(rename = "@id")]
///     id: i32,
///     name: String,
/// }
///
/// let xml_data = r#"
/// <people>
///   <person id="1"><name>Alice</name></person>
///   <person id="2"><name>Bob</name></person>
/// </people>
/// "#;
///
/// let reader = XmlFragmentReaderBuilder::<Person>::new()
///     .fragment_root("person")
///     .serde_mapper()
///     .from_bytes(xml_data)
///     .unwrap();
///
/// reader.open(0).unwrap();
///
/// let mut names = Vec::new();
/// while let Some(person) = reader.read().unwrap() {
///     names.push(person.name);
/// }
///
/// assert_eq!(names, vec!["Alice", "Bob"]);
/// reader.close().unwrap();
/// ```
pub struct XmlFragmentReaderBuilder<T: 'static> {
    fragment_root: Option<String>,
    strict: bool,
    capacity: usize,
    mapper: Option<Box<dyn FragmentMapper<T>>>,
}

impl<T: 'static> Default for XmlFragmentReaderBuilder<T> {
    fn default() -> Self {
        Self {
            fragment_root: None,
            strict: true,
            capacity: 1024,
            mapper: None,
        }
    }
}

impl<T: 'static> XmlFragmentReaderBuilder<T> {
    /// Creates a new XML fragment reader builder.
    ///
    /// By default, it will:
    /// - Require the input resource to exist (strict mode)
    /// - Use a buffer capacity of 1024 bytes
    ///
    /// # Examples
    ///
    /// ```
    /// use xml_batch_rs::item::xml::XmlFragmentReaderBuilder;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Person {
    ///     name: String,
    /// }
    ///
    /// let builder = XmlFragmentReaderBuilder::<Person>::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name of the element that delimits one fragment.
    ///
    /// Every occurrence of this element in the document becomes one item.
    /// The name can be qualified with a namespace URI in `{namespace}local`
    /// form, in which case only elements bound to that namespace are
    /// selected, and empty braces (`{}local`) select only elements that are
    /// in no namespace. An unqualified name matches on the local name
    /// alone, whatever namespace the element is in.
    ///
    /// # Examples
    ///
    /// ```
    /// use xml_batch_rs::item::xml::XmlFragmentReaderBuilder;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Person {
    ///     name: String,
    /// }
    ///
    /// let builder = XmlFragmentReaderBuilder::<Person>::new()
    ///     .fragment_root("{urn:example:people}person");
    /// ```
    pub fn fragment_root<S: AsRef<str>>(mut self, name: S) -> Self {
        self.fragment_root = Some(name.as_ref().to_string());
        self
    }

    /// Controls how a missing or unreadable input resource is handled by
    /// `open`.
    ///
    /// In strict mode (the default) opening a reader whose resource does
    /// not exist or cannot be opened fails. With `strict(false)` the reader
    /// opens successfully and behaves as if the input were empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde::Deserialize;
    /// use xml_batch_rs::core::item::{ItemReader, ItemStreamReader};
    /// use xml_batch_rs::item::xml::XmlFragmentReaderBuilder;
    ///
    /// #[derive(Debug, Deserialize)]
    /// struct Person {
    ///     name: String,
    /// }
    ///
    /// let reader = XmlFragmentReaderBuilder::<Person>::new()
    ///     .fragment_root("person")
    ///     .serde_mapper()
    ///     .strict(false)
    ///     .from_path("does-not-exist/people.xml")
    ///     .unwrap();
    ///
    /// reader.open(0).unwrap();
    /// assert!(reader.read().unwrap().is_none());
    /// reader.close().unwrap();
    /// ```
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets the buffer capacity for the underlying XML reader.
    ///
    /// Higher capacity can improve performance for larger XML documents
    /// but will use more memory.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the mapper that converts extracted fragments into items.
    ///
    /// # Examples
    ///
    /// ```
    /// use xml_batch_rs::core::item::{ItemReader, ItemStreamReader};
    /// use xml_batch_rs::error::BatchError;
    /// use xml_batch_rs::item::xml::{FragmentMapper, XmlFragmentReaderBuilder};
    ///
    /// struct LengthMapper;
    ///
    /// impl FragmentMapper<usize> for LengthMapper {
    ///     fn map_fragment(&self, fragment: &str) -> Result<usize, BatchError> {
    ///         Ok(fragment.len())
    ///     }
    /// }
    ///
    /// let reader = XmlFragmentReaderBuilder::<usize>::new()
    ///     .fragment_root("entry")
    ///     .mapper(LengthMapper)
    ///     .from_bytes("<log><entry>a</entry></log>")
    ///     .unwrap();
    ///
    /// reader.open(0).unwrap();
    /// assert_eq!(reader.read().unwrap(), Some(16));
    /// reader.close().unwrap();
    /// ```
    pub fn mapper<M: FragmentMapper<T> + 'static>(mut self, mapper: M) -> Self {
        self.mapper = Some(Box::new(mapper));
        self
    }

    /// Creates an XML fragment reader over a file path.
    ///
    /// The file is not opened here; `open` resolves it, so a file that is
    /// produced by an earlier step may not exist yet when the reader is
    /// built.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use serde::Deserialize;
    /// use xml_batch_rs::core::item::{ItemReader, ItemStreamReader};
    /// use xml_batch_rs::item::xml::XmlFragmentReaderBuilder;
    ///
    /// #[derive(Debug, Deserialize)]
    /// struct Product {
    ///     name: String,
    ///     price: i32,
    /// }
    ///
    /// let reader = XmlFragmentReaderBuilder::<Product>::new()
    ///     .fragment_root("product")
    ///     .serde_mapper()
    ///     .from_path("data/products.xml")
    ///     .unwrap();
    ///
    /// reader.open(0).unwrap();
    /// while let Some(product) = reader.read().unwrap() {
    ///     println!("Read product: {}", product.name);
    /// }
    /// reader.close().unwrap();
    /// ```
    pub fn from_path<P: AsRef<Path>>(self, path: P) -> Result<XmlFragmentReader<T>, BatchError> {
        self.from_resource(FileResource::new(path))
    }

    /// Creates an XML fragment reader over an in-memory document.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde::Deserialize;
    /// use xml_batch_rs::core::item::{ItemReader, ItemStreamReader};
    /// use xml_batch_rs::item::xml::XmlFragmentReaderBuilder;
    ///
    /// #[derive(Debug, Deserialize)]
    /// struct Product {
    ///     name: String,
    /// }
    ///
    /// let reader = XmlFragmentReaderBuilder::<Product>::new()
    ///     .fragment_root("product")
    ///     .serde_mapper()
    ///     .from_bytes("<catalog><product><name>chair</name></product></catalog>")
    ///     .unwrap();
    ///
    /// reader.open(0).unwrap();
    /// assert_eq!(reader.read().unwrap().unwrap().name, "chair");
    /// reader.close().unwrap();
    /// ```
    pub fn from_bytes<B: Into<Vec<u8>>>(self, bytes: B) -> Result<XmlFragmentReader<T>, BatchError> {
        self.from_resource(BytesResource::new(bytes))
    }

    /// Creates an XML fragment reader over any [`Resource`] implementation.
    pub fn from_resource<R: Resource + 'static>(
        self,
        resource: R,
    ) -> Result<XmlFragmentReader<T>, BatchError> {
        self.build(Box::new(resource))
    }

    fn build(self, resource: Box<dyn Resource>) -> Result<XmlFragmentReader<T>, BatchError> {
        let fragment_root = self.fragment_root.ok_or_else(|| {
            BatchError::Configuration("the fragment root element name is required".to_string())
        })?;
        let (namespace, local_name) = split_fragment_root(&fragment_root)?;
        let mapper = self
            .mapper
            .ok_or_else(|| BatchError::Configuration("a fragment mapper is required".to_string()))?;

        Ok(XmlFragmentReader {
            resource,
            local_name,
            namespace,
            mapper,
            strict: self.strict,
            capacity: self.capacity,
            state: RefCell::new(ReaderState::Unopened),
            read_count: Cell::new(0),
            buffer: RefCell::new(Vec::with_capacity(1024)),
        })
    }
}

impl<T: DeserializeOwned + 'static> XmlFragmentReaderBuilder<T> {
    /// Uses the serde deserializer to map fragments into items.
    ///
    /// Shorthand for `.mapper(SerdeFragmentMapper::new())`.
    pub fn serde_mapper(mut self) -> Self {
        self.mapper = Some(Box::new(SerdeFragmentMapper::new()));
        self
    }
}

/// Splits a fragment root name given in `{namespace}local` form.
fn split_fragment_root(name: &str) -> Result<(Option<String>, String), BatchError> {
    if name.is_empty() {
        return Err(BatchError::Configuration(
            "the fragment root element name must not be empty".to_string(),
        ));
    }
    if !name.starts_with('{') {
        return Ok((None, name.to_string()));
    }

    let close = name.rfind('}').ok_or_else(|| {
        BatchError::Configuration(format!("malformed fragment root element name: {}", name))
    })?;
    let namespace = &name[1..close];
    let local = &name[close + 1..];
    if local.is_empty() {
        return Err(BatchError::Configuration(format!(
            "malformed fragment root element name: {}",
            name
        )));
    }

    // Empty braces keep an empty namespace, which matches unbound elements
    Ok((Some(namespace.to_string()), local.to_string()))
}

type FragmentSource = NsReader<BufReader<Box<dyn Read>>>;

/// Lifecycle of the underlying event stream.
enum ReaderState {
    Unopened,
    Opened(FragmentSource),
    NoInput,
    Closed,
}

/// An item reader that treats an XML document as a sequence of fragments.
///
/// The document is scanned for occurrences of a configured fragment root
/// element. Each occurrence is extracted as a self-contained piece of XML,
/// from its start tag through the matching end tag, and handed to a
/// [`FragmentMapper`] that turns it into an item. The surrounding document
/// structure is never materialized, so arbitrarily large inputs can be
/// processed with constant memory.
///
/// The reader must be opened before reading and closed afterwards. `open`
/// takes the number of items already read by a previous run; that many
/// fragments are skipped without being mapped, so a restarted job resumes
/// where it stopped.
///
/// Two matching rules are deliberately shallow: the scan for a fragment
/// start examines each start tag as it comes, without tracking how deep it
/// nests, and the restart skip matches both fragment boundaries by local
/// name only. Extraction itself is depth-balanced, so a fragment may contain
/// same-named children, but a document that wraps the fragment root inside
/// another element with the same local name is selected and skipped by these
/// shallow rules. Keep fragment roots out of same-named wrapper elements.
///
/// # Examples
///
/// ```
/// use serde::Deserialize;
/// use xml_batch_rs::core::item::{ItemReader, ItemStreamReader};
/// use xml_batch_rs::item::xml::XmlFragmentReaderBuilder;
///
/// #[derive(Debug, Deserialize)]
/// struct Product {
///     #[serde(rename = "@id")]
///     id: i32,
///     name: String,
/// }
///
/// let xml_data = r#"
/// <catalog>
///   <product id="1"><name>chair</name></product>
///   <product id="2"><name>table</name></product>
/// </catalog>
/// "#;
///
/// let reader = XmlFragmentReaderBuilder::<Product>::new()
///     .fragment_root("product")
///     .serde_mapper()
///     .from_bytes(xml_data)
///     .unwrap();
///
/// reader.open(0).unwrap();
///
/// let first = reader.read().unwrap().unwrap();
/// assert_eq!(first.id, 1);
/// assert_eq!(first.name, "chair");
///
/// let second = reader.read().unwrap().unwrap();
/// assert_eq!(second.name, "table");
///
/// // No more fragments
/// assert!(reader.read().unwrap().is_none());
/// reader.close().unwrap();
/// ```
///
/// Restarting after two items were already processed:
///
/// ```
/// use serde::Deserialize;
/// use xml_batch_rs::core::item::{ItemReader, ItemStreamReader};
/// use xml_batch_rs::item::xml::XmlFragmentReaderBuilder;
///
/// #[derive(Debug, Deserialize)]
/// struct Product {
///     name: String,
/// }
///
/// let xml_data = r#"
/// <catalog>
///   <product><name>chair</name></product>
///   <product><name>table</name></product>
///   <product><name>lamp</name></product>
/// </catalog>
/// "#;
///
/// let reader = XmlFragmentReaderBuilder::<Product>::new()
///     .fragment_root("product")
///     .serde_mapper()
///     .from_bytes(xml_data)
///     .unwrap();
///
/// // Two items were read before the previous run stopped
/// reader.open(2).unwrap();
///
/// let third = reader.read().unwrap().unwrap();
/// assert_eq!(third.name, "lamp");
/// assert!(reader.read().unwrap().is_none());
/// assert_eq!(reader.read_count(), 3);
///
/// reader.close().unwrap();
/// ```
pub struct XmlFragmentReader<T: 'static> {
    resource: Box<dyn Resource>,
    local_name: String,
    namespace: Option<String>,
    mapper: Box<dyn FragmentMapper<T>>,
    strict: bool,
    capacity: usize,
    state: RefCell<ReaderState>,
    read_count: Cell<usize>,
    buffer: RefCell<Vec<u8>>,
}

impl<T: 'static> XmlFragmentReader<T> {
    /// Returns the number of items delivered so far plus the fragments
    /// skipped on restart.
    ///
    /// Persist this value when a run stops and pass it to `open` on the
    /// next run to resume after the last item read. A fragment whose
    /// mapping fails is consumed from the stream but not counted.
    pub fn read_count(&self) -> usize {
        self.read_count.get()
    }

    /// Returns the local part of the fragment root element name.
    ///
    /// # Examples
    ///
    /// ```
    /// use xml_batch_rs::item::xml::XmlFragmentReaderBuilder;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize)]
    /// struct Person {
    ///     name: String,
    /// }
    ///
    /// let reader = XmlFragmentReaderBuilder::<Person>::new()
    ///     .fragment_root("{urn:example:people}person")
    ///     .serde_mapper()
    ///     .from_bytes("<people/>")
    ///     .unwrap();
    ///
    /// assert_eq!(reader.fragment_local_name(), "person");
    /// assert_eq!(reader.fragment_namespace(), Some("urn:example:people"));
    /// ```
    pub fn fragment_local_name(&self) -> &str {
        &self.local_name
    }

    /// Returns the namespace URI of the fragment root element name, if one
    /// was configured. An empty string pins the fragment root to elements
    /// in no namespace.
    pub fn fragment_namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Checks whether a start element opens a fragment.
    ///
    /// The local name must match. When a namespace was configured the
    /// element must additionally resolve to that namespace URI, or to no
    /// namespace at all when the configured namespace is empty.
    fn matches_fragment_root(&self, resolve: &ResolveResult<'_>, name: QName<'_>) -> bool {
        if name.local_name().into_inner() != self.local_name.as_bytes() {
            return false;
        }
        match &self.namespace {
            Some(expected) if expected.is_empty() => {
                matches!(resolve, ResolveResult::Unbound)
            }
            Some(expected) => match resolve {
                ResolveResult::Bound(ns) => ns.into_inner() == expected.as_bytes(),
                _ => false,
            },
            None => true,
        }
    }

    /// Advances the stream to the next fragment root start element and
    /// consumes it. Returns `None` when the document ends first.
    fn next_fragment_start(
        &self,
        reader: &mut FragmentSource,
    ) -> Result<Option<BytesStart<'static>>, BatchError> {
        let mut buffer = self.buffer.borrow_mut();
        loop {
            buffer.clear();
            let (resolve, event) = reader
                .read_resolved_event_into(&mut buffer)
                .map_err(|e| BatchError::StreamRead(format!("XML parsing error: {}", e)))?;

            match event {
                Event::Start(e) => {
                    if self.matches_fragment_root(&resolve, e.name()) {
                        debug!("Found fragment start: '{}'", self.local_name);
                        return Ok(Some(e.into_owned()));
                    }
                }
                Event::Eof => {
                    debug!("Reached end of document");
                    return Ok(None);
                }
                _ => {}
            }
        }
    }

    /// Reconstructs the textual content of one fragment whose start tag has
    /// already been consumed from the stream.
    fn extract_fragment(
        &self,
        reader: &mut FragmentSource,
        start: &BytesStart<'_>,
    ) -> Result<String, BatchError> {
        let mut buffer = self.buffer.borrow_mut();
        let mut fragment = String::new();
        push_start_tag(&mut fragment, start);

        // Copy events verbatim until the start tag is balanced again
        let mut depth = 1;
        while depth > 0 {
            buffer.clear();
            match reader.read_event_into(&mut buffer) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    push_start_tag(&mut fragment, e);
                }
                Ok(Event::End(ref e)) => {
                    depth -= 1;
                    let name = e.name();
                    if let Ok(name) = str::from_utf8(name.as_ref()) {
                        fragment.push_str("</");
                        fragment.push_str(name);
                        fragment.push('>');
                    }
                }
                Ok(Event::Text(ref text)) => {
                    // Raw content, escapes are left for the mapper to resolve
                    if let Ok(s) = str::from_utf8(text.as_ref()) {
                        fragment.push_str(s);
                    }
                }
                Ok(Event::CData(ref cdata)) => {
                    if let Ok(s) = str::from_utf8(cdata.as_ref()) {
                        fragment.push_str("<![CDATA[");
                        fragment.push_str(s);
                        fragment.push_str("]]>");
                    }
                }
                Ok(Event::GeneralRef(entity)) => {
                    let bytes = entity.into_inner();
                    if let Ok(name) = str::from_utf8(&bytes) {
                        fragment.push('&');
                        fragment.push_str(name);
                        fragment.push(';');
                    }
                }
                Ok(Event::Eof) => {
                    return Err(BatchError::StreamRead(format!(
                        "unexpected end of document inside a '{}' fragment",
                        self.local_name
                    )));
                }
                Err(e) => {
                    return Err(BatchError::StreamRead(format!("XML parsing error: {}", e)));
                }
                _ => {}
            }
        }

        debug!("Extracted fragment: {}", fragment);
        Ok(fragment)
    }

    /// Skips fragments consumed by a previous run.
    ///
    /// Matching is on the local name only, on both the start and the end
    /// boundary. A namespace configured for reading does not narrow the
    /// skip.
    fn skip_fragments(&self, reader: &mut FragmentSource, count: usize) -> Result<(), BatchError> {
        for skipped in 0..count {
            if !self.skip_to_fragment_start(reader)? || !self.skip_to_fragment_end(reader)? {
                return Err(BatchError::RestartMismatch(format!(
                    "the input ended after {} of {} fragments were skipped",
                    skipped, count
                )));
            }
        }
        debug!("Skipped {} previously read fragment(s)", count);
        Ok(())
    }

    fn skip_to_fragment_start(&self, reader: &mut FragmentSource) -> Result<bool, BatchError> {
        let mut buffer = self.buffer.borrow_mut();
        loop {
            buffer.clear();
            let event = reader
                .read_event_into(&mut buffer)
                .map_err(|e| BatchError::StreamRead(format!("XML parsing error: {}", e)))?;

            match event {
                Event::Start(e) => {
                    if e.name().local_name().into_inner() == self.local_name.as_bytes() {
                        return Ok(true);
                    }
                }
                Event::Eof => return Ok(false),
                _ => {}
            }
        }
    }

    fn skip_to_fragment_end(&self, reader: &mut FragmentSource) -> Result<bool, BatchError> {
        let mut buffer = self.buffer.borrow_mut();
        loop {
            buffer.clear();
            let event = reader
                .read_event_into(&mut buffer)
                .map_err(|e| BatchError::StreamRead(format!("XML parsing error: {}", e)))?;

            match event {
                Event::End(e) => {
                    if e.name().local_name().into_inner() == self.local_name.as_bytes() {
                        return Ok(true);
                    }
                }
                Event::Eof => return Ok(false),
                _ => {}
            }
        }
    }
}

/// Serializes a start tag, with its attributes, back to text.
fn push_start_tag(fragment: &mut String, e: &BytesStart<'_>) {
    fragment.push('<');
    let name = e.name();
    if let Ok(name) = str::from_utf8(name.as_ref()) {
        fragment.push_str(name);
    }
    for attr in e.attributes().flatten() {
        fragment.push(' ');
        if let Ok(key) = str::from_utf8(attr.key.as_ref()) {
            fragment.push_str(key);
        }
        fragment.push_str("=\"");
        if let Ok(value) = str::from_utf8(attr.value.as_ref()) {
            // A single-quoted source attribute may hold a literal quote
            fragment.push_str(&value.replace('"', "&quot;"));
        }
        fragment.push('"');
    }
    fragment.push('>');
}

impl<T: 'static> ItemReader<T> for XmlFragmentReader<T> {
    /// Reads the next fragment and maps it into an item.
    ///
    /// Returns `Ok(None)` once the document holds no further fragment, and
    /// keeps returning it on subsequent calls. Mapping failures are
    /// returned as errors and leave the stream positioned after the bad
    /// fragment, so the caller decides whether to continue.
    fn read(&self) -> ItemReaderResult<T> {
        let mut state = self.state.borrow_mut();
        match &mut *state {
            ReaderState::Opened(reader) => {
                let start = match self.next_fragment_start(reader)? {
                    Some(start) => start,
                    None => return Ok(None),
                };
                let fragment = self.extract_fragment(reader, &start)?;
                let item = self.mapper.map_fragment(&fragment)?;
                self.read_count.set(self.read_count.get() + 1);
                Ok(Some(item))
            }
            ReaderState::NoInput => Ok(None),
            ReaderState::Unopened => Err(BatchError::IllegalState(
                "the reader must be opened before it can be read".to_string(),
            )),
            ReaderState::Closed => Err(BatchError::IllegalState(
                "the reader has been closed".to_string(),
            )),
        }
    }
}

impl<T: 'static> ItemStreamReader<T> for XmlFragmentReader<T> {
    /// Resolves the input resource and positions the stream.
    ///
    /// `already_read` fragments are skipped without being mapped. A missing
    /// or unopenable resource fails in strict mode; otherwise the reader
    /// opens on an empty input and every subsequent `read` returns
    /// `Ok(None)`.
    fn open(&self, already_read: usize) -> Result<(), BatchError> {
        if !matches!(*self.state.borrow(), ReaderState::Unopened) {
            return Err(BatchError::IllegalState(
                "the reader is already opened or closed".to_string(),
            ));
        }

        debug!(
            "Opening XML fragment reader on {}, {} item(s) already read",
            self.resource.description(),
            already_read
        );

        if !self.resource.exists() {
            if self.strict {
                return Err(BatchError::Resource(format!(
                    "the input resource must exist (reader is in strict mode): {}",
                    self.resource.description()
                )));
            }
            warn!(
                "Input resource does not exist: {}",
                self.resource.description()
            );
            self.read_count.set(already_read);
            *self.state.borrow_mut() = ReaderState::NoInput;
            return Ok(());
        }

        let stream = match self.resource.open() {
            Ok(stream) => stream,
            Err(e) => {
                if self.strict {
                    error!("Failed to open {}: {}", self.resource.description(), e);
                    return Err(BatchError::Resource(format!(
                        "failed to open {}: {}",
                        self.resource.description(),
                        e
                    )));
                }
                warn!(
                    "Input resource cannot be opened: {}: {}",
                    self.resource.description(),
                    e
                );
                self.read_count.set(already_read);
                *self.state.borrow_mut() = ReaderState::NoInput;
                return Ok(());
            }
        };

        let mut reader = NsReader::from_reader(BufReader::with_capacity(self.capacity, stream));
        let config = reader.config_mut();
        config.expand_empty_elements = true;

        if already_read > 0 {
            self.skip_fragments(&mut reader, already_read)?;
        }
        self.read_count.set(already_read);
        *self.state.borrow_mut() = ReaderState::Opened(reader);
        Ok(())
    }

    /// Releases the input stream. Closing is idempotent and never fails.
    fn close(&self) -> Result<(), BatchError> {
        debug!("Closing XML fragment reader");
        *self.state.borrow_mut() = ReaderState::Closed;
        Ok(())
    }
}
