use super::list::{ElementConverter, ListConverter};
use super::map::{KeyValueConverter, MapConverter};
use super::primitive::{LeafKind, PrimitiveConverter};
use super::record::RecordConverter;
use super::updater::Updater;
use super::Converter;
use crate::error::SchemaError;
use crate::materializer::RecordMaterializer;
use crate::options::ConversionOptions;
use crate::schema::{OriginalType, Schema, SchemaNode};

/// Compiles a schema into a converter tree, once per file
#[derive(Debug, Clone, Default)]
pub struct ConverterFactory {
    options: ConversionOptions,
}

impl ConverterFactory {
    pub fn new(options: ConversionOptions) -> Self {
        Self { options }
    }

    pub fn compile(&self, schema: &Schema) -> Result<RecordMaterializer, SchemaError> {
        let root = self.record_converter(&schema.root, Updater::Noop)?;
        Ok(RecordMaterializer::new(root))
    }

    fn record_converter(
        &self,
        node: &SchemaNode,
        updater: Updater,
    ) -> Result<RecordConverter, SchemaError> {
        if node.fields().is_empty() {
            return Err(SchemaError::EmptyGroup(node.name().to_string()));
        }

        let fields = node
            .fields()
            .iter()
            .map(|field| Ok((field.name().to_string(), self.field_converter(field)?)))
            .collect::<Result<Vec<_>, SchemaError>>()?;
        Ok(RecordConverter::new(fields, updater))
    }

    /// A repeated field outside a LIST is an array of its own type, with no wrapper level
    fn field_converter(&self, field: &SchemaNode) -> Result<Converter, SchemaError> {
        if field.is_repeated() && field.original_type() != Some(OriginalType::List) {
            self.converter(field, Updater::array())
        } else {
            self.converter(field, Updater::slot())
        }
    }

    fn converter(&self, node: &SchemaNode, updater: Updater) -> Result<Converter, SchemaError> {
        match node {
            SchemaNode::Primitive { .. } => {
                let kind = LeafKind::for_node(node, &self.options)?;
                Ok(Converter::Primitive(PrimitiveConverter::new(kind, updater)))
            }
            SchemaNode::Group { original_type, .. } => match original_type {
                None => Ok(Converter::Record(self.record_converter(node, updater)?)),
                Some(OriginalType::List) => self.list_converter(node, updater),
                Some(OriginalType::Map | OriginalType::MapKeyValue) => {
                    self.map_converter(node, updater)
                }
                Some(_) => Err(SchemaError::Unrecognized(node.name().to_string())),
            },
        }
    }

    fn list_converter(&self, node: &SchemaNode, updater: Updater) -> Result<Converter, SchemaError> {
        let invalid = || SchemaError::InvalidList(node.name().to_string());

        let [repeated] = node.fields() else {
            return Err(invalid());
        };
        if !repeated.is_repeated() {
            return Err(invalid());
        }

        let child = if is_element_type(repeated, node.name()) {
            self.converter(repeated, Updater::array())?
        } else {
            let [element] = repeated.fields() else {
                return Err(invalid());
            };
            let element = self.converter(element, Updater::slot())?;
            Converter::Element(ElementConverter::new(element, Updater::array()))
        };

        Ok(Converter::List(ListConverter::new(child, updater)))
    }

    fn map_converter(&self, node: &SchemaNode, updater: Updater) -> Result<Converter, SchemaError> {
        let invalid = || SchemaError::InvalidMap(node.name().to_string());

        let [key_value] = node.fields() else {
            return Err(invalid());
        };
        if key_value.is_primitive() || !key_value.is_repeated() {
            return Err(invalid());
        }
        let [key, value] = key_value.fields() else {
            return Err(invalid());
        };
        if !key.is_primitive() {
            return Err(SchemaError::MapKeyNotPrimitive(key.name().to_string()));
        }

        let key = self.converter(key, Updater::slot())?;
        let value = self.field_converter(value)?;
        Ok(Converter::Map(MapConverter::new(
            KeyValueConverter::new(key, value),
            updater,
        )))
    }
}

/// Whether the repeated level of a list is itself the element (the legacy 2-level layouts)
fn is_element_type(repeated: &SchemaNode, list_name: &str) -> bool {
    match repeated {
        SchemaNode::Primitive { .. } => true,
        SchemaNode::Group { name, fields, .. } => {
            fields.len() > 1 || name == "array" || *name == format!("{}_tuple", list_name)
        }
    }
}
