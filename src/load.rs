//! Representing existing live nodes as [`VNode`]s.

use crate::{target::Target, vnode::VNode};
use tracing::trace;

/// Describes `element` as a childless `tag#id.class.class` node (tag lower-cased), holding `element` as its handle.
pub fn adopt_element<T: Target>(target: &T, element: T::Node) -> VNode<T> {
	let mut sel = target.tag_name(&element).to_lowercase();
	if let Some(id) = target.get_attribute(&element, "id").filter(|id| !id.is_empty()) {
		sel.push('#');
		sel.push_str(&id);
	}
	if let Some(class) = target.get_attribute(&element, "class") {
		for class in class.split_whitespace() {
			sel.push('.');
			sel.push_str(class);
		}
	}
	trace!(%sel, ?element, "Adopted live element.");
	VNode::adopted(sel, element)
}
