#![doc(html_root_url = "https://docs.rs/graft-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! A keyed VDOM patcher with lifecycle hooks.
//!
//! [`Patcher::patch`] reconciles a previously rendered [`VNode`] tree against a new one,
//! applying the minimal structural mutations to a live tree through a [`Target`].
//! Attributes, styles, listeners and transitions are left to [`Module`]s and per-node [`Hooks`].

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod diff;
pub mod hooks;
pub mod load;
pub mod memory;
pub mod removal;
pub mod selector;
pub mod target;
pub mod vnode;
pub mod web;

pub use diff::Patcher;
pub use hooks::{Hooks, Module};
pub use removal::Completion;
pub use target::Target;
pub use vnode::{same_vnode, Child, Key, VNode, VNodeData, VNodeRef};
