/// Fragment-oriented reading of XML documents.
///
/// This module provides an item reader that treats an XML document as a flat
/// sequence of fragments, each delimited by a configured root element, and a
/// mapper abstraction that turns every extracted fragment into one item. The
/// implementation uses `quick-xml` for streaming, namespace-aware parsing.
///
/// # Features
///
/// - Stream fragments out of documents of any size with constant memory
/// - Select fragments by local name or `{namespace}local` qualified name
/// - Resume a restarted run by skipping the items already read
/// - Map fragments with serde, or with any custom `FragmentMapper`
/// - Support for XML attributes via serde's `#[serde(rename = "@attribute_name")]`
///
/// # Examples
///
/// ## Reading fragments
///
/// ```
/// use serde::Deserialize;
/// use xml_batch_rs::core::item::{ItemReader, ItemStreamReader};
/// use xml_batch_rs::item::xml::XmlFragmentReaderBuilder;
///
/// // Define a data structure with XML attributes and nested elements
/// #[derive(Debug, Deserialize)]
/// struct Product {
///     #[serde(rename = "@id")]
///     id: String,
///     #[serde(rename = "@available")]
///     available: bool,
///     name: String,
///     price: f64,
///     #[serde(default)]
///     description: Option<String>,
/// }
///
/// // Sample XML data
/// let xml_data = r#"
/// <catalog>
///   <product id="P001" available="true">
///     <name>Wireless Headphones</name>
///     <price>79.99</price>
///     <description>Noise-cancelling wireless headphones with 20hr battery life</description>
///   </product>
///   <product id="P002" available="false">
///     <name>USB-C Cable</name>
///     <price>12.99</price>
///   </product>
/// </catalog>
/// "#;
///
/// let reader = XmlFragmentReaderBuilder::<Product>::new()
///     .fragment_root("product")
///     .serde_mapper()
///     .from_bytes(xml_data)
///     .unwrap();
///
/// // Read and process the products
/// reader.open(0).unwrap();
/// let mut products = Vec::new();
/// while let Some(product) = reader.read().unwrap() {
///     products.push(product);
/// }
/// reader.close().unwrap();
///
/// // Verify results
/// assert_eq!(products.len(), 2);
/// assert_eq!(products[0].id, "P001");
/// assert_eq!(products[0].name, "Wireless Headphones");
/// assert_eq!(products[0].price, 79.99);
/// assert!(products[0].available);
/// assert!(products[0].description.is_some());
///
/// assert_eq!(products[1].id, "P002");
/// assert_eq!(products[1].name, "USB-C Cable");
/// assert_eq!(products[1].price, 12.99);
/// assert!(!products[1].available);
/// assert!(products[1].description.is_none());
/// ```
///
/// ## Resuming an interrupted run
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
/// // The previous run stopped after reading one product
/// let reader = XmlFragmentReaderBuilder::<Product>::new()
///     .fragment_root("product")
///     .serde_mapper()
///     .from_bytes(xml_data)
///     .unwrap();
///
/// reader.open(1).unwrap();
///
/// // Reading picks up with the second product
/// assert_eq!(reader.read().unwrap().unwrap().name, "table");
/// assert_eq!(reader.read().unwrap().unwrap().name, "lamp");
/// assert!(reader.read().unwrap().is_none());
///
/// reader.close().unwrap();
/// ```
pub mod fragment_reader;

/// Mapping of extracted XML fragments into typed items.
pub mod mapper;

pub use fragment_reader::{XmlFragmentReader, XmlFragmentReaderBuilder};
pub use mapper::{FragmentMapper, SerdeFragmentMapper};
