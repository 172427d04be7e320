use std::cell::RefCell;
use std::rc::Rc;

/// Shared mutable ownership, used for environment frames and instances.
/// Closure chains may form cycles; frames live until the end of the session.
pub type Shared<T> = Rc<RefCell<T>>;

pub fn create_shared<T>(val: T) -> Shared<T> {
    Rc::new(RefCell::new(val))
}
