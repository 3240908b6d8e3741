// ── Macro for type-name enum boilerplate ──────────────────────────────
//
// Every known field type maps to exactly one name in the metadata XML
// (`type="V_WString"`). The macro generates the name conversion pair and
// adds the `Unknown(String)` catch-all, so only the table below needs to
// change when a type is added.

macro_rules! field_types {
  (
    $(#[$meta:meta])*
    pub enum $name:ident {
      $( $(#[$vmeta:meta])* $variant:ident = $wire:literal ),+ $(,)?
    }
  ) => {
    $(#[$meta])*
    pub enum $name {
      $( $(#[$vmeta])* $variant, )+
      /// A type name this version does not recognize. The raw name is
      /// kept so diagnostics can show it.
      Unknown(String),
    }

    impl $name {
      /// Map a `type` attribute value onto a field type.
      ///
      /// Never fails: unrecognized names become [`Self::Unknown`].
      #[must_use]
      pub fn from_name(name: &str) -> Self {
        match name {
          $( $wire => Self::$variant, )+
          other => Self::Unknown(other.to_string()),
        }
      }

      /// The name used for this type in the metadata XML.
      #[must_use]
      pub fn name(&self) -> &str {
        match self {
          $( Self::$variant => $wire, )+
          Self::Unknown(name) => name,
        }
      }
    }
  };
}

field_types! {
  /// Logical type of one field, as declared in the metadata XML.
  ///
  /// ```text
  /// ┌──────────────┬───────────────────────┬──────────┐
  /// │ Type         │ Fixed footprint       │ Variable │
  /// ├──────────────┼───────────────────────┼──────────┤
  /// │ Bool         │ 1                     │          │
  /// │ Byte         │ 2                     │          │
  /// │ Int16        │ 3                     │          │
  /// │ Int32, Float │ 5                     │          │
  /// │ Int64,Double │ 9                     │          │
  /// │ String       │ size + 1              │          │
  /// │ FixedDecimal │ size + 1              │          │
  /// │ WString      │ 2 * size + 1          │          │
  /// │ Date         │ 11                    │          │
  /// │ DateTime     │ 20                    │          │
  /// │ V_String     │ 4                     │ yes      │
  /// │ V_WString    │ 4                     │ yes      │
  /// │ Blob         │ 4                     │ yes      │
  /// │ SpatialObj   │ 4                     │ yes      │
  /// │ (unknown)    │ 0                     │          │
  /// └──────────────┴───────────────────────┴──────────┘
  /// ```
  ///
  /// The one-byte surplus on most fixed types is the per-field null flag.
  #[derive(Clone, Debug, PartialEq, Eq, Hash)]
  pub enum FieldType {
    Bool = "Bool",
    Byte = "Byte",
    Int16 = "Int16",
    Int32 = "Int32",
    Int64 = "Int64",
    Float = "Float",
    Double = "Double",
    FixedDecimal = "FixedDecimal",
    String = "String",
    WString = "WString",
    VString = "V_String",
    VWString = "V_WString",
    Date = "Date",
    DateTime = "DateTime",
    Blob = "Blob",
    SpatialObj = "SpatialObj",
  }
}

impl FieldType {
  /// Variable-width types store a 4-byte offset in the fixed prefix and
  /// their payload after it.
  #[must_use]
  pub fn is_variable(&self) -> bool {
    matches!(self, Self::VString | Self::VWString | Self::Blob | Self::SpatialObj)
  }

  #[must_use]
  pub fn is_unknown(&self) -> bool {
    matches!(self, Self::Unknown(_))
  }

  /// Bytes this field occupies in a record's fixed prefix.
  ///
  /// `size` is the declared size attribute; only string-like types use it.
  /// Unknown types contribute zero so files carrying newer types can still
  /// be streamed, with the caveat that any real footprint they have will
  /// shift every later field.
  #[must_use]
  pub fn fixed_footprint(&self, size: u32) -> u32 {
    match self {
      Self::Bool => 1,
      Self::Byte => 2,
      Self::Int16 => 3,
      Self::Int32 | Self::Float => 5,
      Self::Int64 | Self::Double => 9,
      Self::String | Self::FixedDecimal => size.saturating_add(1),
      Self::WString => size.saturating_mul(2).saturating_add(1),
      Self::VString | Self::VWString | Self::Blob | Self::SpatialObj => 4,
      Self::Date => 11,
      Self::DateTime => 20,
      Self::Unknown(_) => 0,
    }
  }
}

impl std::fmt::Display for FieldType {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn names_map_both_ways() {
    for name in [
      "Bool", "Byte", "Int16", "Int32", "Int64", "Float", "Double", "FixedDecimal", "String",
      "WString", "V_String", "V_WString", "Date", "DateTime", "Blob", "SpatialObj",
    ] {
      let ty = FieldType::from_name(name);
      assert!(!ty.is_unknown(), "{name} should be known");
      assert_eq!(ty.name(), name);
    }
  }

  #[test]
  fn unknown_name_is_preserved() {
    let ty = FieldType::from_name("Time");
    assert_eq!(ty, FieldType::Unknown("Time".to_string()));
    assert_eq!(ty.name(), "Time");
    assert_eq!(ty.fixed_footprint(8), 0);
  }

  #[test]
  fn names_are_case_sensitive() {
    assert!(FieldType::from_name("int32").is_unknown());
  }

  #[test]
  fn footprints() {
    assert_eq!(FieldType::Bool.fixed_footprint(0), 1);
    assert_eq!(FieldType::Byte.fixed_footprint(0), 2);
    assert_eq!(FieldType::Int16.fixed_footprint(0), 3);
    assert_eq!(FieldType::Int32.fixed_footprint(0), 5);
    assert_eq!(FieldType::Float.fixed_footprint(0), 5);
    assert_eq!(FieldType::Int64.fixed_footprint(0), 9);
    assert_eq!(FieldType::Double.fixed_footprint(0), 9);
    assert_eq!(FieldType::String.fixed_footprint(16), 17);
    assert_eq!(FieldType::FixedDecimal.fixed_footprint(19), 20);
    assert_eq!(FieldType::WString.fixed_footprint(10), 21);
    assert_eq!(FieldType::VWString.fixed_footprint(1000), 4);
    assert_eq!(FieldType::SpatialObj.fixed_footprint(0), 4);
    assert_eq!(FieldType::Date.fixed_footprint(0), 11);
    assert_eq!(FieldType::DateTime.fixed_footprint(0), 20);
  }

  #[test]
  fn footprint_saturates() {
    assert_eq!(FieldType::WString.fixed_footprint(u32::MAX), u32::MAX);
  }

  #[test]
  fn variable_types() {
    assert!(FieldType::VString.is_variable());
    assert!(FieldType::VWString.is_variable());
    assert!(FieldType::Blob.is_variable());
    assert!(FieldType::SpatialObj.is_variable());
    assert!(!FieldType::String.is_variable());
    assert!(!FieldType::Unknown("V_Thing".into()).is_variable());
  }
}
