//! Entity bindings: one module per persisted entity.

pub mod car;
