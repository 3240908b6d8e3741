use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::SchemaError;
use crate::field::FieldDescriptor;
use crate::field_type::FieldType;

const META_INFO: &[u8] = b"MetaInfo";
const RECORD_INFO: &[u8] = b"RecordInfo";
const FIELD: &[u8] = b"Field";

/// Ordered list of fields decoded from a file's metadata.
///
/// Field order is on-disk order: the first field starts at byte 0 of
/// every record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Schema {
  fields: Vec<FieldDescriptor>,
}

impl Schema {
  #[must_use]
  pub fn new(fields: Vec<FieldDescriptor>) -> Self {
    Self { fields }
  }

  #[must_use]
  pub fn fields(&self) -> &[FieldDescriptor] {
    &self.fields
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.fields.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }

  /// First field with the given name.
  #[must_use]
  pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
    self.fields.iter().find(|f| f.name == name)
  }

  pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor> {
    self.fields.iter()
  }
}

impl<'a> IntoIterator for &'a Schema {
  type Item = &'a FieldDescriptor;
  type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

  fn into_iter(self) -> Self::IntoIter {
    self.fields.iter()
  }
}

/// A schema together with the metadata text it was parsed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedMetadata {
  pub schema: Schema,
  /// The text that parsed: the original, or the wrapped form when the
  /// original lacked the `MetaInfo` element. Kept verbatim.
  pub text: String,
  /// True when the text had to be wrapped.
  pub wrapped: bool,
}

/// Surround raw metadata text with a `MetaInfo` element.
///
/// Pure string transformation; it does not inspect the text.
#[must_use]
pub fn wrap_metadata(text: &str) -> String {
  let mut wrapped = String::with_capacity(text.len() + 21);
  wrapped.push_str("<MetaInfo>");
  wrapped.push_str(text);
  wrapped.push_str("</MetaInfo>");
  wrapped
}

/// Parse metadata text, tolerating files that omit the `MetaInfo` wrapper.
///
/// Two attempts, in order:
///
///   1. [`parse_strict`] on the text as given.
///   2. [`parse_strict`] on [`wrap_metadata`] of the text.
///
/// # Errors
///
/// When both attempts fail, returns the error from the first attempt,
/// since that describes the file as it actually is.
pub fn parse_metadata(text: String) -> Result<ParsedMetadata, SchemaError> {
  let first = match parse_strict(&text) {
    Ok(schema) => {
      return Ok(ParsedMetadata {
        schema,
        text,
        wrapped: false,
      });
    }
    Err(e) => e,
  };

  let wrapped = wrap_metadata(&text);
  match parse_strict(&wrapped) {
    Ok(schema) => Ok(ParsedMetadata {
      schema,
      text: wrapped,
      wrapped: true,
    }),
    Err(_) => Err(first),
  }
}

/// Where the parser is relative to the first `RecordInfo` element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RecordInfoState {
  NotSeen,
  Open,
  Done,
}

/// Parse a `MetaInfo`-rooted metadata document.
///
/// ```text
/// <MetaInfo>                 ← root, required
///   <RecordInfo>             ← first one is the schema
///     <Field name=".." type=".." size=".." scale=".." source=".."/>
///     ...
///   </RecordInfo>
/// </MetaInfo>
/// ```
///
/// Only `Field` elements directly inside the first `RecordInfo` are read.
/// Other elements and attributes are ignored. Parsing stops when the root
/// element closes; anything after it is not looked at.
///
/// # Errors
///
/// Any [`SchemaError`] variant; see its documentation.
pub fn parse_strict(text: &str) -> Result<Schema, SchemaError> {
  let mut reader = Reader::from_str(text);
  let mut open: Vec<Vec<u8>> = Vec::new();
  let mut seen_root = false;
  let mut state = RecordInfoState::NotSeen;
  let mut fields = Vec::new();

  loop {
    let event = reader.read_event()?;
    let (element, is_empty) = match &event {
      Event::Start(e) => (e, false),
      Event::Empty(e) => (e, true),
      Event::End(_) => {
        let closed = open.pop();
        if open.len() == 1 && state == RecordInfoState::Open && closed.as_deref() == Some(RECORD_INFO)
        {
          state = RecordInfoState::Done;
        }
        if open.is_empty() {
          break;
        }
        continue;
      }
      Event::Eof => break,
      _ => continue,
    };

    let name = element.name().as_ref().to_vec();
    match open.len() {
      0 => {
        seen_root = true;
        if name != META_INFO {
          return Err(SchemaError::UnexpectedRoot {
            found: lossy(&name),
          });
        }
      }
      1 if name == RECORD_INFO && state == RecordInfoState::NotSeen => {
        state = if is_empty {
          RecordInfoState::Done
        } else {
          RecordInfoState::Open
        };
      }
      2 if name == FIELD && state == RecordInfoState::Open => {
        fields.push(parse_field(element)?);
      }
      _ => {}
    }

    if !is_empty {
      open.push(name);
    } else if open.is_empty() {
      break;
    }
  }

  if let Some(name) = open.last() {
    return Err(SchemaError::UnclosedElement { name: lossy(name) });
  }
  if !seen_root {
    return Err(SchemaError::EmptyDocument);
  }
  if state == RecordInfoState::NotSeen {
    return Err(SchemaError::MissingRecordInfo);
  }

  Ok(Schema::new(fields))
}

fn parse_field(element: &BytesStart<'_>) -> Result<FieldDescriptor, SchemaError> {
  let mut name = String::new();
  let mut source = String::new();
  let mut type_name = String::new();
  let mut size = None;
  let mut scale = None;

  for attr in element.attributes() {
    let attr = attr.map_err(quick_xml::Error::from)?;
    let value = attr.unescape_value()?;
    match attr.key.as_ref() {
      b"name" => name = value.into_owned(),
      b"source" => source = value.into_owned(),
      b"type" => type_name = value.into_owned(),
      b"size" => size = Some(value.into_owned()),
      b"scale" => scale = Some(value.into_owned()),
      _ => {}
    }
  }

  let size = parse_number(&name, "size", size)?;
  let scale = parse_number(&name, "scale", scale)?;

  Ok(FieldDescriptor {
    field_type: FieldType::from_name(&type_name),
    name,
    source,
    size,
    scale,
  })
}

fn parse_number(
  field: &str,
  attribute: &'static str,
  value: Option<String>,
) -> Result<u32, SchemaError> {
  let Some(value) = value else {
    return Ok(0);
  };
  value
    .trim()
    .parse()
    .map_err(|_| SchemaError::InvalidAttribute {
      field: field.to_string(),
      attribute,
      value,
    })
}

fn lossy(name: &[u8]) -> String {
  String::from_utf8_lossy(name).into_owned()
}
