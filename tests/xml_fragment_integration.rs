use std::{env::temp_dir, fs};

use anyhow::Result;
use rand::distr::{Alphanumeric, SampleString};
use serde::Deserialize;
use xml_batch_rs::{
    core::item::{ItemReader, ItemStreamReader},
    error::BatchError,
    item::xml::XmlFragmentReaderBuilder,
};

#[derive(Debug, Deserialize, Clone, PartialEq)]
struct Product {
    #[serde(rename = "@id")]
    id: String,
    #[serde(rename = "@available")]
    available: bool,
    name: String,
    price: f64,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
struct Invoice {
    #[serde(rename = "@id")]
    id: String,
    amount: f64,
}

/// Writes a document to a uniquely named file in the temp directory.
fn write_temp_xml(content: &str) -> std::path::PathBuf {
    let file_name = Alphanumeric.sample_string(&mut rand::rng(), 16);
    let path = temp_dir().join(format!("{}.xml", file_name));
    fs::write(&path, content).expect("Failed to write XML file");
    path
}

fn invoice_document(count: usize) -> String {
    let mut xml = String::from("<invoices>\n");
    for i in 1..=count {
        xml.push_str(&format!(
            "  <invoice id=\"INV-{:03}\"><amount>{}00.0</amount></invoice>\n",
            i, i
        ));
    }
    xml.push_str("</invoices>\n");
    xml
}

#[test]
fn read_product_catalog_from_file() {
    env_logger::init();

    let xml_content = r#"
    <catalog>
      <product id="P001" available="true">
        <name>Wireless Headphones</name>
        <price>79.99</price>
        <description>Noise-cancelling wireless headphones with 20hr battery life</description>
      </product>
      <product id="P002" available="false">
        <name>USB-C Cable</name>
        <price>12.99</price>
      </product>
      <product id="P003" available="true">
        <name>Smart Watch</name>
        <price>149.99</price>
        <description>Fitness tracking smart watch with heart rate monitor</description>
      </product>
    </catalog>
    "#;

    let xml_path = write_temp_xml(xml_content);

    let reader = XmlFragmentReaderBuilder::<Product>::new()
        .fragment_root("product")
        .serde_mapper()
        .capacity(1024)
        .from_path(&xml_path)
        .expect("Unable to build the reader");

    reader.open(0).expect("Unable to open the reader");

    let mut products = Vec::new();
    while let Some(product) = reader.read().expect("Unable to read a product") {
        products.push(product);
    }

    reader.close().expect("Unable to close the reader");

    assert_eq!(products.len(), 3);
    assert_eq!(reader.read_count(), 3);

    assert_eq!(products[0].id, "P001");
    assert!(products[0].available);
    assert_eq!(products[0].name, "Wireless Headphones");
    assert_eq!(products[0].price, 79.99);
    assert!(products[0].description.is_some());

    assert_eq!(products[1].id, "P002");
    assert!(!products[1].available);
    assert!(products[1].description.is_none());

    assert_eq!(products[2].id, "P003");
    assert_eq!(products[2].price, 149.99);
}

#[test]
fn resume_reading_after_an_interrupted_run() -> Result<()> {
    let xml_path = write_temp_xml(&invoice_document(5));

    // First run reads two invoices, then the job is interrupted
    let reader = XmlFragmentReaderBuilder::<Invoice>::new()
        .fragment_root("invoice")
        .serde_mapper()
        .from_path(&xml_path)?;

    reader.open(0)?;

    let first = reader.read()?.unwrap();
    assert_eq!(first.id, "INV-001");
    assert_eq!(first.amount, 100.0);
    assert_eq!(reader.read()?.unwrap().id, "INV-002");

    let checkpoint = reader.read_count();
    assert_eq!(checkpoint, 2);
    reader.close()?;

    // Second run resumes from the persisted checkpoint
    let reader = XmlFragmentReaderBuilder::<Invoice>::new()
        .fragment_root("invoice")
        .serde_mapper()
        .from_path(&xml_path)?;

    reader.open(checkpoint)?;

    let mut remaining = Vec::new();
    while let Some(invoice) = reader.read()? {
        remaining.push(invoice.id);
    }

    assert_eq!(remaining, vec!["INV-003", "INV-004", "INV-005"]);
    assert_eq!(reader.read_count(), 5);
    reader.close()?;

    Ok(())
}

#[test]
fn every_restart_position_resumes_at_the_right_invoice() -> Result<()> {
    let xml_path = write_temp_xml(&invoice_document(5));

    for already_read in 0..=5 {
        let reader = XmlFragmentReaderBuilder::<Invoice>::new()
            .fragment_root("invoice")
            .serde_mapper()
            .from_path(&xml_path)?;

        reader.open(already_read)?;

        let mut ids = Vec::new();
        while let Some(invoice) = reader.read()? {
            ids.push(invoice.id);
        }

        let expected: Vec<String> = (already_read + 1..=5)
            .map(|i| format!("INV-{:03}", i))
            .collect();
        assert_eq!(ids, expected);
        assert_eq!(reader.read_count(), 5);

        reader.close()?;
    }

    Ok(())
}

#[test]
fn strict_reader_fails_on_a_missing_file() {
    let file_name = Alphanumeric.sample_string(&mut rand::rng(), 16);
    let missing = temp_dir().join(format!("{}.xml", file_name));

    let reader = XmlFragmentReaderBuilder::<Invoice>::new()
        .fragment_root("invoice")
        .serde_mapper()
        .from_path(&missing)
        .expect("Unable to build the reader");

    let result = reader.open(0);
    assert!(matches!(result, Err(BatchError::Resource(_))));
}

#[test]
fn lenient_reader_treats_a_missing_file_as_empty() {
    let file_name = Alphanumeric.sample_string(&mut rand::rng(), 16);
    let missing = temp_dir().join(format!("{}.xml", file_name));

    let reader = XmlFragmentReaderBuilder::<Invoice>::new()
        .fragment_root("invoice")
        .serde_mapper()
        .strict(false)
        .from_path(&missing)
        .expect("Unable to build the reader");

    reader.open(0).expect("Unable to open the reader");
    assert!(reader.read().expect("Unable to read").is_none());
    assert_eq!(reader.read_count(), 0);
    reader.close().expect("Unable to close the reader");
}

#[test]
fn select_fragments_from_a_mixed_namespace_document() -> Result<()> {
    #[derive(Debug, Deserialize)]
    struct Record {
        field: String,
    }

    let xml_content = r#"
    <feed xmlns:a="urn:example:archive">
      <a:record><a:field>legacy-1</a:field></a:record>
      <record xmlns="urn:example:live"><field>live-1</field></record>
      <a:record><a:field>legacy-2</a:field></a:record>
      <record xmlns="urn:example:live"><field>live-2</field></record>
    </feed>
    "#;

    let xml_path = write_temp_xml(xml_content);

    let reader = XmlFragmentReaderBuilder::<Record>::new()
        .fragment_root("{urn:example:live}record")
        .serde_mapper()
        .from_path(&xml_path)?;

    reader.open(0)?;

    let mut fields = Vec::new();
    while let Some(record) = reader.read()? {
        fields.push(record.field);
    }

    assert_eq!(fields, vec!["live-1", "live-2"]);
    reader.close()?;

    Ok(())
}

#[test]
fn restart_skip_counts_fragments_from_any_namespace() -> Result<()> {
    #[derive(Debug, Deserialize)]
    struct Record {
        field: String,
    }

    let xml_content = r#"
    <feed xmlns:a="urn:example:archive">
      <a:record><a:field>legacy-1</a:field></a:record>
      <record xmlns="urn:example:live"><field>live-1</field></record>
      <a:record><a:field>legacy-2</a:field></a:record>
      <record xmlns="urn:example:live"><field>live-2</field></record>
    </feed>
    "#;

    let xml_path = write_temp_xml(xml_content);

    let reader = XmlFragmentReaderBuilder::<Record>::new()
        .fragment_root("{urn:example:live}record")
        .serde_mapper()
        .from_path(&xml_path)?;

    // Skipping counts every element with the local name "record", whichever
    // namespace it is in, so two skipped fragments cover legacy-1 and live-1
    reader.open(2)?;

    assert_eq!(reader.read()?.unwrap().field, "live-2");
    assert!(reader.read()?.is_none());
    reader.close()?;

    Ok(())
}
