//! User-facing diagnostics.
//!
//! The canvas never prints. It hands messages to a [`Reporter`], which the
//! front-end supplies: the terminal keeps them for its status line, tests
//! inspect them, and the default forwards to the `log` facade.

use std::cell::RefCell;
use std::rc::Rc;

use log::Level;

pub trait Reporter {
    fn report(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.report(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.report(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.report(Level::Error, message);
    }
}

/// Forwards everything to `log` under the `wirecanvas` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, level: Level, message: &str) {
        log::log!(target: "wirecanvas", level, "{message}");
    }
}

/// Keeps every message in order and also forwards it to `log`.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: RefCell<Vec<(Level, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.borrow().clone()
    }

    pub fn last(&self) -> Option<(Level, String)> {
        self.entries.borrow().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries.borrow().iter().any(|(_, m)| m.contains(needle))
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, level: Level, message: &str) {
        LogReporter.report(level, message);
        self.entries.borrow_mut().push((level, message.to_owned()));
    }
}

impl<R: Reporter + ?Sized> Reporter for Rc<R> {
    fn report(&self, level: Level, message: &str) {
        (**self).report(level, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_reporter_keeps_order() {
        let r = MemoryReporter::new();
        r.info("first");
        r.warn("second");
        assert_eq!(r.len(), 2);
        assert_eq!(r.entries()[0], (Level::Info, "first".to_owned()));
        assert_eq!(r.last(), Some((Level::Warn, "second".to_owned())));
        assert!(r.contains("sec"));
        r.clear();
        assert!(r.is_empty());
    }

    #[test]
    fn shared_reporter_sees_messages() {
        let shared = Rc::new(MemoryReporter::new());
        let boxed: Box<dyn Reporter> = Box::new(Rc::clone(&shared));
        boxed.error("boom");
        assert_eq!(shared.last(), Some((Level::Error, "boom".to_owned())));
    }
}
