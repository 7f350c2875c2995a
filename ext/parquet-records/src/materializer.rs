use crate::converter::{Converter, RecordConverter};
use crate::value::Value;

/// Owns the root of a compiled converter tree and hands out finished records
#[derive(Debug)]
pub struct RecordMaterializer {
    root: Converter,
}

impl RecordMaterializer {
    pub fn new(root: RecordConverter) -> Self {
        Self {
            root: Converter::Record(root),
        }
    }

    pub fn root(&self) -> &Converter {
        &self.root
    }

    /// The tree the assembler drives
    pub fn root_mut(&mut self) -> &mut Converter {
        &mut self.root
    }

    /// Drain the record completed by the last root `end()`
    pub fn current_record(&mut self) -> Value {
        match &mut self.root {
            Converter::Record(root) => root.take_current(),
            _ => Value::Nil,
        }
    }
}
