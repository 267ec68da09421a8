//! Lightweight behavior tree library for tick-driven real-time agents.
//!
//! The tree is stateless and re-evaluated from the root every frame. Nodes
//! communicate through a caller-defined blackboard type `C`; long-running
//! activities keep their progress in the blackboard's owner and report
//! [`Status::Running`] until they finish.
//!
//! - **Stateless nodes**: Trees are `Send + Sync` and can be shared
//! - **Running state**: Multi-tick actions report progress instead of blocking
//! - **Zero dependencies**: Pure Rust with no external crates
//!
//! # Architecture
//!
//! - [`Behavior`]: Core trait for all nodes
//! - [`Status`]: Success, Failure or Running
//! - Composite nodes: [`Sequence`], [`Selector`]
//! - Decorator nodes: [`Inverter`], [`AlwaysSucceed`]
//! - Leaf nodes: [`Condition`], [`Action`]

pub mod behavior;
pub mod builder;
pub mod composite;
pub mod decorator;
pub mod leaf;
pub mod status;

pub use behavior::Behavior;
pub use builder::{action, always_succeed, condition, inverter, selector, sequence};
pub use composite::{Selector, Sequence};
pub use decorator::{AlwaysSucceed, Inverter};
pub use leaf::{Action, Condition};
pub use status::Status;

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        hits: u32,
        ready: bool,
    }

    #[test]
    fn helpers_are_reachable_from_the_crate_root() {
        let tree: Box<dyn Behavior<Counter>> = selector(vec![
            sequence(vec![
                condition(|c: &Counter| c.ready),
                action(|c: &mut Counter| {
                    c.hits += 1;
                    Status::Success
                }),
            ]),
            always_succeed(inverter(action(|_: &mut Counter| Status::Success))),
        ]);

        let mut counter = Counter { hits: 0, ready: true };
        assert_eq!(tree.tick(&mut counter), Status::Success);
        assert_eq!(counter.hits, 1);

        counter.ready = false;
        assert_eq!(tree.tick(&mut counter), Status::Success);
        assert_eq!(counter.hits, 1);
    }
}
