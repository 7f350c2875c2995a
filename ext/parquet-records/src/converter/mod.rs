//! Converter tree that turns assembler events into [`Value`](crate::Value)s.
//!
//! Every schema node compiles to one [`Converter`]. Groups receive
//! `start`/`end`, leaves receive one `add_*` per occurrence, and every
//! converter hands its finished value to its parent through its
//! [`Updater`] outbox.

pub mod decimal;
pub mod factory;
pub mod list;
pub mod map;
pub mod primitive;
pub mod record;
pub mod updater;

pub use decimal::DecimalType;
pub use factory::ConverterFactory;
pub use list::{ElementConverter, ListConverter};
pub use map::{KeyValueConverter, MapConverter};
pub use primitive::{LeafKind, PrimitiveConverter};
pub use record::RecordConverter;
pub use updater::{ContainerUpdater, Updater};

use crate::error::RecordError;

/// One node of the converter tree
#[derive(Debug)]
pub enum Converter {
    Primitive(PrimitiveConverter),
    Record(RecordConverter),
    List(ListConverter),
    /// Repeated wrapper of a 3-level list
    Element(ElementConverter),
    Map(MapConverter),
    /// Repeated wrapper of a map
    KeyValue(KeyValueConverter),
}

impl Converter {
    fn kind_name(&self) -> &'static str {
        match self {
            Converter::Primitive(_) => "primitive",
            Converter::Record(_) => "record",
            Converter::List(_) => "list",
            Converter::Element(_) => "list element",
            Converter::Map(_) => "map",
            Converter::KeyValue(_) => "map key/value",
        }
    }

    /// The outbox the parent drains; key/value wrappers hand entries to their map directly
    pub fn updater_mut(&mut self) -> Option<&mut Updater> {
        match self {
            Converter::Primitive(c) => Some(&mut c.updater),
            Converter::Record(c) => Some(&mut c.updater),
            Converter::List(c) => Some(&mut c.updater),
            Converter::Element(c) => Some(&mut c.updater),
            Converter::Map(c) => Some(&mut c.updater),
            Converter::KeyValue(_) => None,
        }
    }

    pub fn start(&mut self) -> Result<(), RecordError> {
        match self {
            Converter::Primitive(_) => return Err(self.unexpected("start")),
            Converter::Record(c) => c.start(),
            Converter::List(c) => c.start(),
            Converter::Element(c) => c.start(),
            Converter::Map(c) => c.start(),
            Converter::KeyValue(c) => c.start(),
        }
        Ok(())
    }

    pub fn end(&mut self) -> Result<(), RecordError> {
        match self {
            Converter::Primitive(_) => return Err(self.unexpected("end")),
            Converter::Record(c) => c.end(),
            Converter::List(c) => c.end(),
            Converter::Element(c) => c.end(),
            Converter::Map(c) => c.end(),
            Converter::KeyValue(c) => c.end(),
        }
        Ok(())
    }

    /// Child converter for the `index`-th field of this group
    pub fn child_mut(&mut self, index: usize) -> Result<&mut Converter, RecordError> {
        let name = self.kind_name();
        let child = match self {
            Converter::Primitive(_) => None,
            Converter::Record(c) => c.child_mut(index),
            Converter::List(c) => c.child_mut(index),
            Converter::Element(c) => c.child_mut(index),
            Converter::Map(c) => c.child_mut(index),
            Converter::KeyValue(c) => c.child_mut(index),
        };
        child.ok_or(RecordError::UnexpectedEvent {
            converter: name,
            event: "child field",
        })
    }

    pub fn as_primitive_mut(&mut self) -> Result<&mut PrimitiveConverter, RecordError> {
        match self {
            Converter::Primitive(c) => Ok(c),
            other => Err(other.unexpected("primitive value")),
        }
    }

    fn unexpected(&self, event: &'static str) -> RecordError {
        RecordError::UnexpectedEvent {
            converter: self.kind_name(),
            event,
        }
    }
}
