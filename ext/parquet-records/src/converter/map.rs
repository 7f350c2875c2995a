use std::mem;

use super::updater::{ContainerUpdater, Updater};
use super::Converter;
use crate::value::Value;

/// Converter for a MAP or MAP_KEY_VALUE annotated group
#[derive(Debug)]
pub struct MapConverter {
    key_value: Box<Converter>,
    pub(crate) updater: Updater,
}

impl MapConverter {
    pub fn new(key_value: KeyValueConverter, updater: Updater) -> Self {
        Self {
            key_value: Box::new(Converter::KeyValue(key_value)),
            updater,
        }
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Converter> {
        (index == 0).then_some(self.key_value.as_mut())
    }

    fn entries_mut(&mut self) -> Option<&mut Vec<(Value, Value)>> {
        match self.key_value.as_mut() {
            Converter::KeyValue(key_value) => Some(&mut key_value.entries),
            _ => None,
        }
    }

    pub fn start(&mut self) {
        if let Some(entries) = self.entries_mut() {
            entries.clear();
        }
    }

    pub fn end(&mut self) {
        let entries = self.entries_mut().map(mem::take).unwrap_or_default();
        self.updater.set(Value::Map(entries));
    }
}

/// The repeated key/value wrapper of a map; collects one pair per occurrence
#[derive(Debug)]
pub struct KeyValueConverter {
    key: Box<Converter>,
    value: Box<Converter>,
    entries: Vec<(Value, Value)>,
}

impl KeyValueConverter {
    pub fn new(key: Converter, value: Converter) -> Self {
        Self {
            key: Box::new(key),
            value: Box::new(value),
            entries: Vec::new(),
        }
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Converter> {
        match index {
            0 => Some(self.key.as_mut()),
            1 => Some(self.value.as_mut()),
            _ => None,
        }
    }

    pub fn start(&mut self) {
        for child in [self.key.as_mut(), self.value.as_mut()] {
            if let Some(updater) = child.updater_mut() {
                updater.start();
            }
        }
    }

    pub fn end(&mut self) {
        let key = self.key.updater_mut().map(Updater::take).unwrap_or_default();
        let value = self.value.updater_mut().map(Updater::take).unwrap_or_default();
        self.entries.push((key, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::primitive::{LeafKind, PrimitiveConverter};

    fn string_to_int() -> MapConverter {
        let key = Converter::Primitive(PrimitiveConverter::new(LeafKind::String, Updater::slot()));
        let value = Converter::Primitive(PrimitiveConverter::new(LeafKind::Int32, Updater::slot()));
        MapConverter::new(KeyValueConverter::new(key, value), Updater::slot())
    }

    fn put(map: &mut MapConverter, key: &'static str, value: Option<i32>) {
        let Some(Converter::KeyValue(pair)) = map.child_mut(0) else {
            panic!("expected key/value wrapper");
        };
        pair.start();
        if let Some(Converter::Primitive(k)) = pair.child_mut(0) {
            k.add_bytes(&bytes::Bytes::from_static(key.as_bytes())).unwrap();
        }
        if let (Some(v), Some(Converter::Primitive(leaf))) = (value, pair.child_mut(1)) {
            leaf.add_int32(v).unwrap();
        }
        pair.end();
    }

    #[test]
    fn test_duplicate_keys_preserved() {
        let mut map = string_to_int();
        map.start();
        put(&mut map, "a", Some(1));
        put(&mut map, "a", Some(2));
        put(&mut map, "b", None);
        map.end();

        assert_eq!(
            map.updater.take(),
            Value::Map(vec![
                (Value::string("a"), Value::Integer(1)),
                (Value::string("a"), Value::Integer(2)),
                (Value::string("b"), Value::Nil),
            ])
        );
    }

    #[test]
    fn test_start_clears_entries() {
        let mut map = string_to_int();
        map.start();
        put(&mut map, "a", Some(1));
        map.end();
        let _ = map.updater.take();

        map.start();
        map.end();
        assert_eq!(map.updater.take(), Value::Map(vec![]));
    }
}
