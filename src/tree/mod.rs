//! Tree-shaped namespaces.
//!
//! Both the stable store and the working store are a [`Node`] folder named
//! `fs`. Nodes are owned recursively; a [`NodePath`] locates a node by
//! stepwise descent from the root.

pub mod node;
pub mod path;

pub use node::{Node, NodeKind, ROOT_NAME};
pub use path::{NodePath, resolve};
