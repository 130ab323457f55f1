//! Scene hierarchy
//!
//! Nodes of the scene are plain [`TransformId`] handles into a
//! [`TransformTree`]. Anything positioned in the world, colliders included,
//! refers to a transform by handle and reads its world pose through the tree.

mod transform;

pub use transform::{DirtyFlags, Reparent, TransformId, TransformNode, TransformTree};

#[cfg(test)]
mod tests;
