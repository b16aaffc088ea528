use serde_json::Value;

/// One step of an [`AccessPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

impl PathSegment {
    fn select<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        match (self, value) {
            (PathSegment::Field(name), Value::Object(map)) => map.get(name),
            (PathSegment::Field(name), Value::Array(items)) => {
                name.parse::<usize>().ok().and_then(|i| items.get(i))
            }
            (PathSegment::Index(i), Value::Array(items)) => items.get(*i),
            (PathSegment::Index(i), Value::Object(map)) => map.get(&i.to_string()),
            _ => None,
        }
    }
}

/// A pre-parsed field-access expression such as `meta.roles[0]`.
///
/// Supported syntax is `a.b`, `a[0]`, `a["b.c"]`, `a['b']` and any chain of
/// those. An unterminated bracket is not an error: the rest of the
/// expression becomes a literal field name.
///
/// # Examples
///
/// ```
/// use csv_builder_rs::encoder::path::AccessPath;
/// use serde_json::json;
///
/// let path = AccessPath::parse("meta.roles[0]");
/// let user = json!({"meta": {"roles": ["admin", "user"]}});
/// assert_eq!(path.resolve(&user), Some(&json!("admin")));
/// assert_eq!(path.resolve(&json!({"name": "nobody"})), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPath {
    raw: String,
    segments: Vec<PathSegment>,
}

impl AccessPath {
    pub fn parse(raw: &str) -> AccessPath {
        let mut segments = Vec::new();
        let mut field = String::new();
        let mut chars = raw.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            match c {
                '.' => flush_field(&mut field, &mut segments),
                '[' => {
                    flush_field(&mut field, &mut segments);
                    match parse_bracket(&raw[pos + 1..]) {
                        Some((segment, consumed)) => {
                            segments.push(segment);
                            let end = pos + 1 + consumed;
                            while chars.next_if(|(p, _)| *p < end).is_some() {}
                        }
                        None => {
                            field.push_str(&raw[pos..]);
                            break;
                        }
                    }
                }
                _ => field.push(c),
            }
        }
        flush_field(&mut field, &mut segments);

        AccessPath {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Looks the path up in `record`.
    ///
    /// A mapping holding the whole expression as a key is matched directly,
    /// so column names with dots or brackets in them still resolve. Returns
    /// `None` as soon as a segment is absent or hits the wrong kind of
    /// container.
    pub fn resolve<'v>(&self, record: &'v Value) -> Option<&'v Value> {
        if self.segments.is_empty() {
            return None;
        }
        if let Some(value) = record.as_object().and_then(|map| map.get(&self.raw)) {
            return Some(value);
        }
        self.segments
            .iter()
            .try_fold(record, |current, segment| segment.select(current))
    }
}

fn flush_field(field: &mut String, segments: &mut Vec<PathSegment>) {
    if !field.is_empty() {
        segments.push(PathSegment::Field(std::mem::take(field)));
    }
}

/// Parses the inside of `[...]`; `rest` starts right after the `[`.
/// Returns the segment and the number of bytes consumed, closing `]` included.
fn parse_bracket(rest: &str) -> Option<(PathSegment, usize)> {
    let quote = rest.chars().next()?;
    if quote == '"' || quote == '\'' {
        let body = &rest[1..];
        let close = body.find(quote)?;
        if !body[close + 1..].starts_with(']') {
            return None;
        }
        let segment = PathSegment::Field(body[..close].to_string());
        return Some((segment, close + 3));
    }

    let close = rest.find(']')?;
    let inner = rest[..close].trim();
    let segment = match inner.parse::<usize>() {
        Ok(index) => PathSegment::Index(index),
        Err(_) => PathSegment::Field(inner.to_string()),
    };
    Some((segment, close + 1))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{AccessPath, PathSegment};

    fn field(name: &str) -> PathSegment {
        PathSegment::Field(name.to_string())
    }

    #[test]
    fn dotted_and_bracketed_paths_should_be_parsed() {
        assert_eq!(AccessPath::parse("name").segments(), &[field("name")]);
        assert_eq!(
            AccessPath::parse("meta.roles[0]").segments(),
            &[field("meta"), field("roles"), PathSegment::Index(0)]
        );
        assert_eq!(
            AccessPath::parse("a[1].b[\"c.d\"]['e']").segments(),
            &[
                field("a"),
                PathSegment::Index(1),
                field("b"),
                field("c.d"),
                field("e")
            ]
        );
        assert_eq!(
            AccessPath::parse("list[ 2 ]").segments(),
            &[field("list"), PathSegment::Index(2)]
        );
    }

    #[test]
    fn unterminated_bracket_should_become_a_literal_field() {
        let path = AccessPath::parse("tags[0");
        assert_eq!(path.segments(), &[field("tags"), field("[0")]);

        let path = AccessPath::parse("a[\"b]");
        assert_eq!(path.segments(), &[field("a"), field("[\"b]")]);
    }

    #[test]
    fn missing_segments_should_resolve_to_none() {
        let path = AccessPath::parse("meta.roles[0]");
        assert_eq!(path.resolve(&json!({})), None);
        assert_eq!(path.resolve(&json!({"meta": null})), None);
        assert_eq!(path.resolve(&json!({"meta": {"roles": []}})), None);
        assert_eq!(path.resolve(&json!({"meta": {"roles": "admin"}})), None);
        assert_eq!(path.resolve(&json!("meta")), None);
    }

    #[test]
    fn whole_path_key_should_take_precedence() {
        let record = json!({"a.b": 1, "a": {"b": 2}});
        assert_eq!(AccessPath::parse("a.b").resolve(&record), Some(&json!(1)));

        let record = json!({"a": {"b": 2}});
        assert_eq!(AccessPath::parse("a.b").resolve(&record), Some(&json!(2)));
    }

    #[test]
    fn indices_should_cross_container_kinds() {
        let record = json!({"roles": ["x", "y"], "by_pos": {"1": "one"}});
        assert_eq!(
            AccessPath::parse("roles.1").resolve(&record),
            Some(&json!("y"))
        );
        assert_eq!(
            AccessPath::parse("by_pos[1]").resolve(&record),
            Some(&json!("one"))
        );
        assert_eq!(AccessPath::parse("roles[7]").resolve(&record), None);
    }

    #[test]
    fn empty_path_should_never_resolve() {
        assert_eq!(AccessPath::parse("").resolve(&json!({"": 1})), None);
        assert!(AccessPath::parse("").segments().is_empty());
    }
}
