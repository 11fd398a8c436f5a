use crate::types::{Bounds, Variable};

pub(super) fn bounded_continuous(lower: f64, upper: f64) -> Variable {
    Variable::continuous(Bounds::new(lower, upper))
}

pub(super) fn unbounded_continuous() -> Variable {
    Variable::free()
}
