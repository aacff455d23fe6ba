use std::marker::PhantomData;

use quick_xml::de::from_str;
use serde::de::DeserializeOwned;

use crate::error::BatchError;

/// Converts one extracted XML fragment into a domain item.
///
/// The reader hands each mapper call exactly the text of one fragment, from
/// its root start tag through the matching end tag, so an implementation can
/// parse it in isolation from the surrounding document. Mapping failures are
/// returned to the caller unchanged; the reader neither retries nor skips.
///
/// # Examples
///
/// A hand-written mapper that only pulls one field out of the fragment:
///
/// ```
/// use xml_batch_rs::error::BatchError;
/// use xml_batch_rs::item::xml::FragmentMapper;
///
/// struct NameMapper;
///
/// impl FragmentMapper<String> for NameMapper {
///     fn map_fragment(&self, fragment: &str) -> Result<String, BatchError> {
///         fragment
///             .split("<name>")
///             .nth(1)
///             .and_then(|rest| rest.split("</name>").next())
///             .map(str::to_string)
///             .ok_or_else(|| BatchError::Mapping("no <name> element".to_string()))
///     }
/// }
///
/// let mapper = NameMapper;
/// let item = mapper.map_fragment("<person><name>Alice</name></person>").unwrap();
/// assert_eq!(item, "Alice");
/// ```
pub trait FragmentMapper<T> {
    /// Maps the fragment text to an item, or fails with a mapping error.
    fn map_fragment(&self, fragment: &str) -> Result<T, BatchError>;
}

/// A [`FragmentMapper`] that deserializes fragments with serde.
///
/// Uses the `quick-xml` deserializer, so the usual serde attributes apply:
/// `#[serde(rename = "@id")]` for attributes, nested structs for nested
/// elements, and so on.
///
/// # Examples
///
/// ```
/// use serde::Deserialize;
/// use xml_batch_rs::item::xml::{FragmentMapper, SerdeFragmentMapper};
///
/// #[derive(Debug, Deserialize)]
/// struct Person {
///     #[serde(rename = "@id")]
///     id: i32,
///     name: String,
/// }
///
/// let mapper = SerdeFragmentMapper::<Person>::new();
/// let person = mapper
///     .map_fragment(r#"<person id="7"><name>Alice</name></person>"#)
///     .unwrap();
///
/// assert_eq!(person.id, 7);
/// assert_eq!(person.name, "Alice");
/// ```
pub struct SerdeFragmentMapper<T> {
    _marker: PhantomData<T>,
}

impl<T> SerdeFragmentMapper<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for SerdeFragmentMapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> FragmentMapper<T> for SerdeFragmentMapper<T> {
    fn map_fragment(&self, fragment: &str) -> Result<T, BatchError> {
        from_str(fragment).map_err(|e| {
            BatchError::Mapping(format!("failed to deserialize fragment: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestItem {
        name: String,
        value: i32,
    }

    #[test]
    fn maps_well_formed_fragment() {
        let mapper = SerdeFragmentMapper::<TestItem>::new();

        let item = mapper
            .map_fragment("<TestItem><name>test1</name><value>42</value></TestItem>")
            .unwrap();

        assert_eq!(
            item,
            TestItem {
                name: "test1".to_string(),
                value: 42,
            }
        );
    }

    #[test]
    fn type_mismatch_is_a_mapping_error() {
        let mapper = SerdeFragmentMapper::<TestItem>::new();

        let result =
            mapper.map_fragment("<TestItem><name>test1</name><value>nope</value></TestItem>");

        assert!(matches!(result, Err(BatchError::Mapping(_))));
    }

    #[test]
    fn escaped_text_is_unescaped_during_mapping() {
        let mapper = SerdeFragmentMapper::<TestItem>::new();

        let item = mapper
            .map_fragment("<TestItem><name>AT&amp;T</name><value>1</value></TestItem>")
            .unwrap();

        assert_eq!(item.name, "AT&T");
    }
}
