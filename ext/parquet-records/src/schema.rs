use std::fmt;

/// Core schema representation for Parquet files
///
/// The root is always a group (the message type); its fields are the
/// top-level columns of every record.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub root: SchemaNode,
}

/// Represents a node in the Parquet schema tree
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A leaf column
    Primitive {
        name: String,
        repetition: Repetition,
        physical_type: PhysicalType,
        original_type: Option<OriginalType>,
    },
    /// A group of named fields, possibly annotated as a list or map
    Group {
        name: String,
        repetition: Repetition,
        original_type: Option<OriginalType>,
        fields: Vec<SchemaNode>,
    },
}

/// Physical storage types of Parquet leaf columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalType {
    Boolean,
    Int32,
    Int64,
    Int96,
    Float,
    Double,
    ByteArray,
    FixedLenByteArray(i32),
}

/// Original (converted) type annotations refining a physical type or a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OriginalType {
    Utf8,
    Map,
    MapKeyValue,
    List,
    Enum,
    Decimal { precision: u32, scale: u32 },
    Date,
    TimeMillis,
    TimeMicros,
    TimestampMillis,
    TimestampMicros,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Json,
    Bson,
    Interval,
}

/// Represents how values are repeated in Parquet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repetition {
    /// Field must have exactly one value
    Required,
    /// Field can have 0 or 1 value
    Optional,
    /// Field can have 0 or more values
    Repeated,
}

impl SchemaNode {
    /// Create a leaf node without annotation
    pub fn primitive<S: Into<String>>(
        name: S,
        repetition: Repetition,
        physical_type: PhysicalType,
    ) -> Self {
        SchemaNode::Primitive {
            name: name.into(),
            repetition,
            physical_type,
            original_type: None,
        }
    }

    /// Create an unannotated group node
    pub fn group<S: Into<String>>(name: S, repetition: Repetition, fields: Vec<SchemaNode>) -> Self {
        SchemaNode::Group {
            name: name.into(),
            repetition,
            original_type: None,
            fields,
        }
    }

    /// Return this node with the given annotation
    pub fn with_original_type(mut self, annotation: OriginalType) -> Self {
        match &mut self {
            SchemaNode::Primitive { original_type, .. } | SchemaNode::Group { original_type, .. } => {
                *original_type = Some(annotation)
            }
        }
        self
    }

    /// Get the name of this schema node
    pub fn name(&self) -> &str {
        match self {
            SchemaNode::Primitive { name, .. } => name,
            SchemaNode::Group { name, .. } => name,
        }
    }

    pub fn repetition(&self) -> Repetition {
        match self {
            SchemaNode::Primitive { repetition, .. } => *repetition,
            SchemaNode::Group { repetition, .. } => *repetition,
        }
    }

    pub fn original_type(&self) -> Option<OriginalType> {
        match self {
            SchemaNode::Primitive { original_type, .. } => *original_type,
            SchemaNode::Group { original_type, .. } => *original_type,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, SchemaNode::Primitive { .. })
    }

    pub fn is_repeated(&self) -> bool {
        self.repetition() == Repetition::Repeated
    }

    /// Children of a group; empty for leaves
    pub fn fields(&self) -> &[SchemaNode] {
        match self {
            SchemaNode::Primitive { .. } => &[],
            SchemaNode::Group { fields, .. } => fields,
        }
    }

    /// Physical type and annotation, e.g. `INT32 (UINT_8)`
    pub fn type_string(&self) -> String {
        let base = match self {
            SchemaNode::Primitive { physical_type, .. } => physical_type.to_string(),
            SchemaNode::Group { name, .. } => format!("group {}", name),
        };
        match self.original_type() {
            Some(annotation) => format!("{} ({})", base, annotation),
            None => base,
        }
    }
}

impl fmt::Display for PhysicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhysicalType::Boolean => "BOOLEAN",
            PhysicalType::Int32 => "INT32",
            PhysicalType::Int64 => "INT64",
            PhysicalType::Int96 => "INT96",
            PhysicalType::Float => "FLOAT",
            PhysicalType::Double => "DOUBLE",
            PhysicalType::ByteArray => "BINARY",
            PhysicalType::FixedLenByteArray(_) => "FIXED_LEN_BYTE_ARRAY",
        };
        f.write_str(name)
    }
}

impl fmt::Display for OriginalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OriginalType::Utf8 => "UTF8",
            OriginalType::Map => "MAP",
            OriginalType::MapKeyValue => "MAP_KEY_VALUE",
            OriginalType::List => "LIST",
            OriginalType::Enum => "ENUM",
            OriginalType::Decimal { .. } => "DECIMAL",
            OriginalType::Date => "DATE",
            OriginalType::TimeMillis => "TIME_MILLIS",
            OriginalType::TimeMicros => "TIME_MICROS",
            OriginalType::TimestampMillis => "TIMESTAMP_MILLIS",
            OriginalType::TimestampMicros => "TIMESTAMP_MICROS",
            OriginalType::UInt8 => "UINT_8",
            OriginalType::UInt16 => "UINT_16",
            OriginalType::UInt32 => "UINT_32",
            OriginalType::UInt64 => "UINT_64",
            OriginalType::Int8 => "INT_8",
            OriginalType::Int16 => "INT_16",
            OriginalType::Int32 => "INT_32",
            OriginalType::Int64 => "INT_64",
            OriginalType::Json => "JSON",
            OriginalType::Bson => "BSON",
            OriginalType::Interval => "INTERVAL",
        };
        f.write_str(name)
    }
}

impl Schema {
    /// Top-level fields of the record
    pub fn fields(&self) -> &[SchemaNode] {
        self.root.fields()
    }

    /// Number of leaf columns, i.e. column chunks per row group
    pub fn leaf_count(&self) -> usize {
        fn count_leaves(node: &SchemaNode) -> usize {
            match node {
                SchemaNode::Primitive { .. } => 1,
                SchemaNode::Group { fields, .. } => fields.iter().map(count_leaves).sum(),
            }
        }
        count_leaves(&self.root)
    }
}

/// Builder for creating schemas
pub struct SchemaBuilder {
    root: Option<SchemaNode>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn with_root(mut self, root: SchemaNode) -> Self {
        self.root = Some(root);
        self
    }

    /// Shorthand for a `message` root group holding `fields`
    pub fn with_message<S: Into<String>>(self, name: S, fields: Vec<SchemaNode>) -> Self {
        self.with_root(SchemaNode::group(name, Repetition::Required, fields))
    }

    pub fn build(self) -> Result<Schema, &'static str> {
        match self.root {
            Some(root @ SchemaNode::Group { .. }) => Ok(Schema { root }),
            Some(SchemaNode::Primitive { .. }) => Err("Schema root must be a group"),
            None => Err("Schema must have a root node"),
        }
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
