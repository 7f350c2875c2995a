//! Test utilities for parquet-records

#[cfg(test)]
pub mod test {
    use crate::{OriginalType, PhysicalType, Repetition, Schema, SchemaBuilder, SchemaNode};

    pub fn utf8<S: Into<String>>(name: S, repetition: Repetition) -> SchemaNode {
        SchemaNode::primitive(name, repetition, PhysicalType::ByteArray)
            .with_original_type(OriginalType::Utf8)
    }

    /// Create a simple flat schema for testing
    pub fn sample_schema() -> Schema {
        SchemaBuilder::new()
            .with_message(
                "root",
                vec![
                    SchemaNode::primitive("id", Repetition::Required, PhysicalType::Int64),
                    utf8("name", Repetition::Optional),
                    SchemaNode::primitive("age", Repetition::Optional, PhysicalType::Int32),
                    SchemaNode::primitive("salary", Repetition::Optional, PhysicalType::Double),
                ],
            )
            .build()
            .unwrap()
    }

    /// A record with a nested struct and a standard 3-level list
    pub fn nested_record_schema() -> Schema {
        SchemaBuilder::new()
            .with_message(
                "root",
                vec![
                    SchemaNode::primitive("id", Repetition::Required, PhysicalType::Int64),
                    SchemaNode::group(
                        "address",
                        Repetition::Optional,
                        vec![
                            utf8("street", Repetition::Required),
                            utf8("city", Repetition::Optional),
                        ],
                    ),
                    three_level_list(
                        "tags",
                        SchemaNode::primitive("element", Repetition::Optional, PhysicalType::Int32),
                    ),
                ],
            )
            .build()
            .unwrap()
    }

    /// `optional group <name> (LIST) { repeated group list { <element> } }`
    pub fn three_level_list(name: &str, element: SchemaNode) -> SchemaNode {
        SchemaNode::group(
            name,
            Repetition::Optional,
            vec![SchemaNode::group("list", Repetition::Repeated, vec![element])],
        )
        .with_original_type(OriginalType::List)
    }
}
