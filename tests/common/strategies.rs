use lifecycle_core::value::Dictionary;
use proptest::prelude::*;
use serde_json::Value;

/// A lifecycle stimulus applied to a component manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOp {
    Start,
    Stop,
    BecomeValid,
    BecomeInvalid,
}

pub fn lifecycle_op_strategy() -> impl Strategy<Value = LifecycleOp> {
    prop_oneof![
        Just(LifecycleOp::Start),
        Just(LifecycleOp::Stop),
        Just(LifecycleOp::BecomeValid),
        Just(LifecycleOp::BecomeInvalid),
    ]
}

pub fn lifecycle_ops_strategy() -> impl Strategy<Value = Vec<LifecycleOp>> {
    prop::collection::vec(lifecycle_op_strategy(), 0..24)
}

/// Keys that never collide with a declared property or the identity key
pub fn unknown_key_strategy() -> impl Strategy<Value = String> {
    "x_[a-z]{1,8}"
}

/// Textual or already-typed values, all of which propagate unchanged
pub fn propagated_value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-z]{0,8}".prop_map(Value::String),
        (0i64..1000).prop_map(|n| Value::from(n)),
        any::<bool>().prop_map(Value::Bool),
    ]
}

/// Configuration made only of entries no declared property matches
pub fn unknown_entries_strategy() -> impl Strategy<Value = Dictionary> {
    prop::collection::btree_map(unknown_key_strategy(), propagated_value_strategy(), 0..6)
}

/// Value assigned to the `level` property
pub fn level_strategy() -> impl Strategy<Value = String> {
    "[0-9]{1,3}"
}
