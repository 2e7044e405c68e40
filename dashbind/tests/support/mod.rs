#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use dashbind::prelude::*;

#[derive(Debug, Default)]
pub struct Drive {
    pub enabled: bool,
    pub speed: f64,
    pub wheels: Vec<String>,
}

pub fn drive() -> Rc<RefCell<Drive>> {
    Rc::new(RefCell::new(Drive {
        wheels: vec!["left".to_string(), "right".to_string()],
        ..Drive::default()
    }))
}

pub fn binder(bus: &LocalBus, root: &str) -> Binder {
    Binder::new(Rc::new(bus.clone()), TopicPath::new(root))
}

/// Counts how often a writer saw a dashboard edit
pub fn counter() -> (Rc<RefCell<u32>>, impl FnMut(bool) + 'static) {
    let count = Rc::new(RefCell::new(0));
    let sink = count.clone();
    (count, move |_| *sink.borrow_mut() += 1)
}
