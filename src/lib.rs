#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 <div align="center">
   <h1>XML Batch for Rust</h1>
   <h3>A restartable, fragment-oriented XML item reader for batch applications</h3>

   [![crate](https://img.shields.io/crates/v/xml-batch-rs.svg)](https://crates.io/crates/xml-batch-rs)
   [![docs](https://docs.rs/xml-batch-rs/badge.svg)](https://docs.rs/xml-batch-rs)
   ![license](https://shields.io/badge/license-MIT%2FApache--2.0-blue)

  </div>

 # XML Batch for Rust

 Batch jobs rarely consume an XML document as one tree. They consume a long, flat
 sequence of repeated elements, one record at a time, and they have to survive
 being interrupted halfway through. **XML Batch for Rust** reads documents that
 way: it streams the input, hands out one fragment per call, and can reopen a
 document positioned exactly after the last record a previous run processed.

 ## Core Concepts

Understanding these core components will help you get started:

- **ItemReader:** An abstraction that represents the retrieval of input, one item at a time.
- **ItemStreamReader:** An `ItemReader` whose input has a lifecycle. It is opened before the first read, possibly positioned after previously consumed items, and closed when the run ends.
- **Fragment:** One occurrence of the configured fragment root element, extracted from its start tag through the matching end tag. Each fragment becomes one item.
- **FragmentMapper:** An abstraction that converts the text of one fragment into a typed item. A serde-based mapper is provided, custom mappers plug in through a trait.
- **Resource:** The byte source a reader draws from. Files and in-memory buffers are built in; anything else can implement the trait.

 ## What it does

- Streams fragments out of documents of any size with constant memory
- Selects fragments by local name, or by `{namespace}local` qualified name
- Resumes after a restart by skipping the number of items already read
- Treats a missing or unreadable input as an error (strict mode, default) or as an empty input
- Propagates mapping failures per item, leaving the stream readable

 ## Roadmap

- [ ] Fragment-oriented XML item writer
- [ ] Cap on the total number of items read from one document
- [ ] Re-declare in-scope namespaces on extracted fragments

 ## Getting Started

Add the crate to your Cargo.toml:

```toml
[dependencies]
xml-batch-rs = "<version>"
```

Then, on your main.rs:

```rust
# use serde::Deserialize;
# use xml_batch_rs::{
#     core::item::{ItemReader, ItemStreamReader},
#     error::BatchError,
#     item::xml::XmlFragmentReaderBuilder,
# };
# #[derive(Debug, Deserialize)]
# struct Invoice {
#     #[serde(rename = "@id")]
#     id: String,
#     amount: f64,
# }
fn main() -> Result<(), BatchError> {
    let xml = r#"
    <invoices>
        <invoice id="2024-001"><amount>450.0</amount></invoice>
        <invoice id="2024-002"><amount>1200.5</amount></invoice>
    </invoices>
    "#;

    let reader = XmlFragmentReaderBuilder::<Invoice>::new()
        .fragment_root("invoice")
        .serde_mapper()
        .from_bytes(xml)?;

    reader.open(0)?;

    let mut total = 0.0;
    while let Some(invoice) = reader.read()? {
        total += invoice.amount;
    }

    assert_eq!(reader.read_count(), 2);
    assert!(total > 1650.0);

    reader.close()?;
    Ok(())
}
```

 ## Restartability

 The number of items read so far is available from the reader at any time
 through `read_count()`. Persist it with the rest of your job state when a run
 stops, and pass it to `open` on the next run: the reader skips that many
 fragments without mapping them and the next `read` returns the first
 unprocessed item. Skipping matches fragments by local name only and does not
 apply the namespace filter used for reading. A restart count that exceeds
 what the document holds fails the open with a restart mismatch error.

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.

 ## Contribution
 Unless you explicitly state otherwise, any contribution intentionally submitted
 for inclusion in the work by you, as defined in the Apache-2.0 license, shall be
 dual licensed as above, without any additional terms or conditions

 */

/// Core abstractions for item reading and input resources
pub mod core;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Item reader implementations
pub mod item;
