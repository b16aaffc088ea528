//! Output format of an encoded row.
//!
//! A [`Format`] decides three things: the string placed between fields, the
//! string closing every row, and whether fields are quoted. Quoting is
//! all-or-nothing: when it is on every field is wrapped in `"` and inner
//! quotes are doubled, when it is off fields are written verbatim and a
//! value containing the delimiter or the terminator will break the row.
//!
//! ```
//! use csv_builder_rs::encoder::format::Format;
//!
//! let format = Format::default();
//! assert_eq!(format.join_row(["a", "say \"hi\""]), "\"a\",\"say \"\"hi\"\"\"\n");
//!
//! let tsv = Format::default().with_delimiter("\t").with_quoted(false);
//! assert_eq!(tsv.join_row(["a", "b"]), "a\tb\n");
//! ```

pub const QUOTE: char = '"';

pub const DEFAULT_DELIMITER: &str = ",";

pub const DEFAULT_TERMINATOR: &str = "\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Format {
    pub delimiter: String,
    pub terminator: String,
    pub quoted: bool,
}

impl Default for Format {
    fn default() -> Self {
        Format {
            delimiter: DEFAULT_DELIMITER.to_string(),
            terminator: DEFAULT_TERMINATOR.to_string(),
            quoted: true,
        }
    }
}

impl Format {
    pub fn with_delimiter(mut self, delimiter: &str) -> Self {
        self.delimiter = delimiter.to_string();
        self
    }

    pub fn with_terminator(mut self, terminator: &str) -> Self {
        self.terminator = terminator.to_string();
        self
    }

    pub fn with_quoted(mut self, quoted: bool) -> Self {
        self.quoted = quoted;
        self
    }

    /// Appends one field to `out`, escaped according to this format.
    pub fn push_field(&self, out: &mut String, text: &str) {
        if !self.quoted {
            out.push_str(text);
            return;
        }
        out.push(QUOTE);
        for c in text.chars() {
            if c == QUOTE {
                out.push(QUOTE);
            }
            out.push(c);
        }
        out.push(QUOTE);
    }

    /// Escapes and joins `fields` into a complete, terminated row.
    pub fn join_row<I, S>(&self, fields: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut row = String::new();
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                row.push_str(&self.delimiter);
            }
            self.push_field(&mut row, field.as_ref());
        }
        row.push_str(&self.terminator);
        row
    }
}
