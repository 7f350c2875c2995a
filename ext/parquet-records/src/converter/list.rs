use super::updater::{ContainerUpdater, Updater};
use super::Converter;

/// Converter for a LIST-annotated group.
///
/// The child is the repeated level; its outbox is an array accumulator that
/// this converter publishes as one `Value::Array` at `end()`.
#[derive(Debug)]
pub struct ListConverter {
    repeated: Box<Converter>,
    pub(crate) updater: Updater,
}

impl ListConverter {
    pub fn new(repeated: Converter, updater: Updater) -> Self {
        Self {
            repeated: Box::new(repeated),
            updater,
        }
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Converter> {
        (index == 0).then_some(self.repeated.as_mut())
    }

    pub fn start(&mut self) {
        if let Some(items) = self.repeated.updater_mut() {
            items.start();
        }
    }

    pub fn end(&mut self) {
        if let Some(items) = self.repeated.updater_mut() {
            let items = items.take();
            self.updater.set(items);
        }
    }
}

/// The repeated wrapper of a standard 3-level list.
///
/// Each occurrence contributes exactly one element; a missing element becomes Nil.
#[derive(Debug)]
pub struct ElementConverter {
    element: Box<Converter>,
    pub(crate) updater: Updater,
}

impl ElementConverter {
    pub fn new(element: Converter, updater: Updater) -> Self {
        Self {
            element: Box::new(element),
            updater,
        }
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Converter> {
        (index == 0).then_some(self.element.as_mut())
    }

    pub fn start(&mut self) {
        if let Some(element) = self.element.updater_mut() {
            element.start();
        }
    }

    pub fn end(&mut self) {
        let element = self
            .element
            .updater_mut()
            .map(Updater::take)
            .unwrap_or_default();
        self.updater.set(element);
    }
}
