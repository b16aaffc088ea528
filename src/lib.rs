#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # csv-builder-rs

 Schema-driven CSV encoding for structured records. Declare the columns once,
 say where each column's value lives inside a record, and turn any number of
 records into correctly escaped, delimited rows, either one at a time or as a
 stream sitting between a producer of records and a consumer of text.

 ## Core Concepts

- **RowEncoder:** Holds the ordered column list, the alias table mapping a
  column to an access path such as `meta.roles[0]`, the virtual (computed)
  columns and the output format. Encodes the header, a record or a raw array.
- **EncodeStage:** Applies a `RowEncoder` to a sequence of items that may be
  in-memory values, JSON text or JSON bytes. The header is emitted once,
  right before the first row; a malformed item halts the stage.
- **ItemReader:** The upstream producer, pulled one item at a time.
- **ItemWriter:** The downstream consumer of encoded chunks.
- **EncodeStep:** Runs reader → stage → writer to completion and reports
  what happened.

 ## Column Resolution

 For every column, in order: a virtual function registered for that column
 wins; otherwise the column's alias (or the column name itself) is resolved
 as a path into the record; a path that leads nowhere yields an empty field.

 ## Features

| **Feature** | **Description**                                        |
|-------------|--------------------------------------------------------|
| logger      | Enables a logger `ItemWriter`, useful for debugging    |
| full        | Enables all available features                         |

 ## Getting Started

```rust
# use csv_builder_rs::{
#     core::{stage::read_stream, step::{EncodeStepBuilder, StepStatus}},
#     encoder::row_encoder::RowEncoderBuilder,
#     item::{memory::VecItemReader, text_writer::TextItemWriterBuilder},
#     core::stage::Payload,
#     BuilderError,
# };
# use serde_json::json;
fn main() -> Result<(), BuilderError> {
    let encoder = RowEncoderBuilder::new()
        .headers(["Name", "Primary Role", "Active"])
        .alias("Name", "name")
        .alias("Primary Role", "meta.roles[0]")
        .alias("Active", "meta.active")
        .build();

    // One-shot
    let row = encoder.encode_record(&json!({"name": "Ann", "meta": {"active": true}}))?;
    assert_eq!(row, "\"Ann\",\"\",\"true\"\n");

    // Streaming, from JSON text items
    let csv: String = read_stream(&encoder, vec![
        r#"{"name": "Ann", "meta": {"roles": ["admin"], "active": true}}"#,
        r#"{"name": "Bob", "meta": {"roles": [], "active": false}}"#,
    ])
    .collect::<Result<_, _>>()?;
    assert_eq!(
        csv,
        "\"Name\",\"Primary Role\",\"Active\"\n\"Ann\",\"admin\",\"true\"\n\"Bob\",\"\",\"false\"\n"
    );

    // As a step between a reader and a writer
    let reader = VecItemReader::new(vec![Payload::from(json!({"name": "Cid"}))]);
    let writer = TextItemWriterBuilder::new().from_writer(Vec::new());
    let step = EncodeStepBuilder::new(&encoder)
        .reader(&reader)
        .writer(&writer)
        .build()?;
    assert_eq!(step.execute().status, StepStatus::Success);

    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Stage, step and producer/consumer abstractions
pub mod core;

/// Record to row encoding
pub mod encoder;

/// Error types
pub mod error;

#[doc(inline)]
pub use error::*;

/// Item readers / writers feeding and draining the encode stage
pub mod item;
