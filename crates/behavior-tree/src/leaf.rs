//! Closure-backed leaf nodes.
//!
//! Small predicates and one-line actions do not deserve a dedicated struct.
//! [`Condition`] lifts a `Fn(&C) -> bool` into a node and [`Action`] lifts a
//! `Fn(&mut C) -> Status`.

use crate::{Behavior, Status};

/// Read-only predicate over the blackboard.
pub struct Condition<F> {
    predicate: F,
}

impl<F> Condition<F> {
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<C, F> Behavior<C> for Condition<F>
where
    F: Fn(&C) -> bool + Send + Sync,
{
    fn tick(&self, ctx: &mut C) -> Status {
        Status::from_bool((self.predicate)(ctx))
    }
}

/// Action that may write to the blackboard.
pub struct Action<F> {
    run: F,
}

impl<F> Action<F> {
    pub fn new(run: F) -> Self {
        Self { run }
    }
}

impl<C, F> Behavior<C> for Action<F>
where
    F: Fn(&mut C) -> Status + Send + Sync,
{
    fn tick(&self, ctx: &mut C) -> Status {
        (self.run)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_reads_context() {
        let positive = Condition::new(|value: &i32| *value > 0);
        assert_eq!(positive.tick(&mut 3), Status::Success);
        assert_eq!(positive.tick(&mut -3), Status::Failure);
    }

    #[test]
    fn action_writes_context() {
        let double = Action::new(|value: &mut i32| {
            *value *= 2;
            Status::Success
        });
        let mut value = 4;
        assert_eq!(double.tick(&mut value), Status::Success);
        assert_eq!(value, 8);
    }
}
