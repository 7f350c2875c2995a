use std::mem;

use super::updater::{ContainerUpdater, Updater};
use super::Converter;
use crate::value::Value;

/// Converter for an unannotated group, and for the message root.
///
/// Each field gets a child converter whose outbox is drained at `end()`.
/// Field order in the produced map follows the schema.
#[derive(Debug)]
pub struct RecordConverter {
    names: Vec<Value>,
    children: Vec<Converter>,
    pub(crate) updater: Updater,
    current: Vec<(Value, Value)>,
}

impl RecordConverter {
    pub fn new(fields: Vec<(String, Converter)>, updater: Updater) -> Self {
        let (names, children) = fields
            .into_iter()
            .map(|(name, child)| (Value::string(name), child))
            .unzip();
        Self {
            names,
            children,
            updater,
            current: Vec::new(),
        }
    }

    pub fn field_count(&self) -> usize {
        self.children.len()
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Converter> {
        self.children.get_mut(index)
    }

    pub fn start(&mut self) {
        for child in &mut self.children {
            if let Some(updater) = child.updater_mut() {
                updater.start();
            }
        }
    }

    pub fn end(&mut self) {
        let entries: Vec<(Value, Value)> = self
            .names
            .iter()
            .cloned()
            .zip(
                self.children
                    .iter_mut()
                    .map(|child| child.updater_mut().map(Updater::take).unwrap_or_default()),
            )
            .collect();

        if self.updater.is_noop() {
            self.current = entries;
        } else {
            self.updater.set(Value::Map(entries));
        }
    }

    /// The last record finished by a root converter
    pub fn take_current(&mut self) -> Value {
        Value::Map(mem::take(&mut self.current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::primitive::{LeafKind, PrimitiveConverter};

    fn leaf(kind: LeafKind, updater: Updater) -> Converter {
        Converter::Primitive(PrimitiveConverter::new(kind, updater))
    }

    #[test]
    fn test_absent_fields_are_nil() {
        let mut record = RecordConverter::new(
            vec![
                ("a".to_string(), leaf(LeafKind::Int32, Updater::slot())),
                ("b".to_string(), leaf(LeafKind::String, Updater::slot())),
            ],
            Updater::Noop,
        );

        record.start();
        record.end();
        assert_eq!(
            record.take_current(),
            Value::Map(vec![
                (Value::string("a"), Value::Nil),
                (Value::string("b"), Value::Nil),
            ])
        );
    }

    #[test]
    fn test_nested_record_publishes_map() {
        let mut record = RecordConverter::new(
            vec![("x".to_string(), leaf(LeafKind::Int64, Updater::slot()))],
            Updater::slot(),
        );

        record.start();
        if let Some(Converter::Primitive(x)) = record.child_mut(0) {
            x.add_int64(7).unwrap();
        }
        record.end();

        assert_eq!(
            record.updater.take(),
            Value::Map(vec![(Value::string("x"), Value::Integer(7))])
        );
        assert_eq!(record.take_current(), Value::Map(vec![]));
    }

    #[test]
    fn test_start_resets_previous_values() {
        let mut record = RecordConverter::new(
            vec![("r".to_string(), leaf(LeafKind::Int32, Updater::array()))],
            Updater::Noop,
        );

        record.start();
        if let Some(Converter::Primitive(r)) = record.child_mut(0) {
            r.add_int32(1).unwrap();
            r.add_int32(2).unwrap();
        }
        record.end();
        assert_eq!(
            record.take_current().get("r"),
            Some(&Value::Array(vec![Value::Integer(1), Value::Integer(2)]))
        );

        record.start();
        record.end();
        assert_eq!(record.take_current().get("r"), Some(&Value::Array(vec![])));
    }
}
