//! Ready-made fixtures modelled on three real-world files: a customer
//! table with several variable-width strings, a tiny table whose records
//! each carry a very large blob, and a long single-column id table.

use crate::fixture::{FieldDef, FixtureBuilder, record_info_xml, variable_record};

/// Metadata of the customer table, byte for byte.
pub const TUTORIAL_DATA_METADATA: &str = r#"<MetaInfo><RecordInfo>
	<Field name="UserID" source="RecordID: Starting Value=100" type="Int32"/>
	<Field name="First" size="12" source="Formula: titlecase([_CurrentField_])" type="V_WString"/>
	<Field name="Last" size="19" source="Formula: titlecase([_CurrentField_])" type="V_WString"/>
	<Field name="Prefix" size="12" source="Formula: titlecase([_CurrentField_])" type="V_String"/>
	<Field name="Gender" size="16" source="Formula: Replace([Gender], &quot;*~~//*~~//femal&quot;, &quot;*~~//*~~//female&quot;)" type="String"/>
	<Field name="Birth Date" source="DateTime: To yyyy-MM-dd hh:mm:ss" type="DateTime"/>
	<Field name="Registration Date/Time" source="DateTime: To yyyy-MM-dd hh:mm:ss" type="DateTime"/>
	<Field name="Email" size="35" source="CrossTab:Header:JSON_Name:email:Concat:" type="V_WString"/>
	<Field name="Country" size="2" source="CrossTab:Header:JSON_Name:nat:Concat:" type="String"/>
</RecordInfo>
</MetaInfo>"#;

/// Metadata with an attribute on the root and a trailing newline.
pub const TEXT_INPUT_METADATA: &str = "<MetaInfo connection=\"Output\">\n<RecordInfo>\n\t<Field name=\"Field1\" size=\"1\" source=\"TextInput:\" type=\"String\"/>\n\t<Field name=\"Field2\" source=\"TextInput:\" type=\"Byte\"/>\n</RecordInfo>\n</MetaInfo>\n";

pub const TUTORIAL_DATA_RECORDS: u64 = 8716;
pub const TUTORIAL_DATA_FIRST_ID: i32 = 100;
/// Fixed prefix of a customer record, before the variable length word.
pub const TUTORIAL_DATA_FIXED: usize = 81;

pub const LOTS_OF_RECORDS: u64 = 100_000;

/// Blob sizes of the three large-field records; the middle one spans
/// several blocks.
pub const VERY_LONG_FIELD_SIZES: [usize; 3] = [150_000, 700_000, 262_000];

/// One customer record with `UserID = id`.
#[must_use]
pub fn tutorial_record(id: i32) -> Vec<u8> {
    let mut fixed = Vec::with_capacity(TUTORIAL_DATA_FIXED);
    fixed.extend_from_slice(&id.to_le_bytes());
    fixed.push(0);
    // First, Last, Prefix: offsets into the variable payload
    fixed.extend_from_slice(&[0u8; 12]);
    let gender = if id % 2 == 0 { "female" } else { "male" };
    fixed.extend(padded(gender, 17));
    fixed.extend(padded("1990-04-12 00:00:00", 20));
    fixed.extend(padded("2016-11-03 14:22:05", 20));
    // Email offset
    fixed.extend_from_slice(&[0u8; 4]);
    fixed.extend(padded(if id % 3 == 0 { "GB" } else { "US" }, 3));
    debug_assert_eq!(fixed.len(), TUTORIAL_DATA_FIXED);

    let payload = format!(
        "Name{id}|Surname{id}|Mx|name{id}.surname@example.com{}",
        "~".repeat((id.unsigned_abs() % 40) as usize)
    );
    variable_record(&fixed, Some(payload.as_bytes()))
}

fn padded(text: &str, width: usize) -> Vec<u8> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.resize(width, 0);
    bytes
}

/// The customer table: 8,716 records with ids 100 upward.
#[must_use]
pub fn tutorial_data() -> FixtureBuilder {
    FixtureBuilder::new(TUTORIAL_DATA_METADATA)
        .description("TutorialData")
        .records((0..).take(8716).map(|i| tutorial_record(TUTORIAL_DATA_FIRST_ID + i)))
}

/// Schema of the large-field table: a `Byte` id and a `Blob`.
#[must_use]
pub fn very_long_field_metadata() -> String {
    record_info_xml(&[
        FieldDef::new("id", "Byte"),
        FieldDef::new("Data", "Blob").size(2_147_483_647),
    ])
}

/// One large-field record. The blob repeats a short pattern so it still
/// compresses.
#[must_use]
pub fn very_long_field_record(id: u8, blob_len: usize) -> Vec<u8> {
    let fixed = [id, 0, 0, 0, 0, 0];
    let blob: Vec<u8> = (0..blob_len)
        .map(|i| b"0123456789abcdef"[(i + usize::from(id)) % 16])
        .collect();
    variable_record(&fixed, Some(blob.as_slice()))
}

/// The large-field table: ids 1, 2, 3.
#[must_use]
pub fn very_long_field() -> FixtureBuilder {
    FixtureBuilder::new(very_long_field_metadata())
        .description("VeryLongField")
        .records(
            VERY_LONG_FIELD_SIZES
                .iter()
                .zip(1u8..)
                .map(|(&len, id)| very_long_field_record(id, len)),
        )
}

/// Schema of the id table: a single `Int32`.
#[must_use]
pub fn lots_of_records_metadata() -> String {
    record_info_xml(&[FieldDef::new("RecordID", "Int32").source("RecordID: Starting Value=1")])
}

/// One id-table record.
#[must_use]
pub fn id_record(id: u32) -> Vec<u8> {
    let mut record = id.to_le_bytes().to_vec();
    record.push(0);
    record
}

/// The id table: 100,000 records with ids 1 upward.
#[must_use]
pub fn lots_of_records() -> FixtureBuilder {
    FixtureBuilder::new(lots_of_records_metadata())
        .description("LotsOfRecords")
        .records((1..=100_000u32).map(id_record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tutorial_record_layout() {
        let record = tutorial_record(100);
        assert_eq!(&record[..4], &100i32.to_le_bytes());
        let var_len = u32::from_le_bytes(record[81..85].try_into().unwrap()) as usize;
        assert_eq!(record.len(), 85 + var_len);
    }

    #[test]
    fn scenario_record_counts() {
        assert_eq!(tutorial_data().record_count(), TUTORIAL_DATA_RECORDS);
        assert_eq!(very_long_field().record_count(), 3);
        assert_eq!(lots_of_records().record_count(), LOTS_OF_RECORDS);
    }
}
