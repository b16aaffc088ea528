//! Row encoding: from a record and a column schema to one line of text.
//!
//! The encoder is pure and synchronous. It owns the ordered column list, the
//! alias table mapping columns to access paths, the virtual (computed)
//! columns and the output [`format::Format`]. It keeps no per-row state, so a
//! single instance can be reused for any number of rows and shared between
//! threads once built.
//!
//! # Examples
//!
//! ```
//! use csv_builder_rs::encoder::row_encoder::RowEncoderBuilder;
//! use serde_json::json;
//!
//! let encoder = RowEncoderBuilder::new()
//!     .headers(["First Name", "Primary Role", "Tags"])
//!     .alias("Primary Role", "meta.roles[0]")
//!     .virtual_column("First Name", |user| {
//!         let name = user["name"].as_str().unwrap_or_default();
//!         name.split(' ').next().unwrap_or_default().to_string()
//!     })
//!     .alias("Tags", "tags")
//!     .build();
//!
//! let user = json!({
//!     "name": "User One",
//!     "meta": {"roles": ["user"]},
//!     "tags": ["foo", "bar"]
//! });
//!
//! assert_eq!(
//!     encoder.encode_record(&user).unwrap(),
//!     "\"User\",\"user\",\"foo,bar\"\n"
//! );
//! ```

pub mod config;

pub mod format;

/// Dotted/bracketed access paths into nested records.
pub mod path;

pub mod row_encoder;

/// Record classification and field text rendering.
pub mod value;
