//! `tag#id.class.class` shorthand as carried by [`VNode::sel`](`crate::vnode::VNode::sel`).

/// The selector of comment nodes.
pub const COMMENT: &str = "!";

/// Namespace applied to `svg` roots and everything below them, up to `foreignObject`.
pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Tag of the element below which SVG content reverts to the ambient namespace.
pub const FOREIGN_OBJECT: &str = "foreignObject";

/// A selector split into its parts.
///
/// Only the first `#` starts an id, and classes are only recognised after it (`div#a.b`, not `div.b#a`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector<'a> {
	pub tag: &'a str,
	pub id: Option<&'a str>,
	classes: Option<&'a str>,
}
impl<'a> Selector<'a> {
	#[must_use]
	pub fn parse(sel: &'a str) -> Self {
		let hash_idx = sel.find('#');
		let dot_search_start = hash_idx.unwrap_or(0);
		let dot_idx = sel[dot_search_start..].find('.').map(|i| i + dot_search_start);

		// A leading `#` or `.` is part of the tag.
		let hash = hash_idx.filter(|&i| i > 0).unwrap_or_else(|| sel.len());
		let dot = dot_idx.filter(|&i| i > 0).unwrap_or_else(|| sel.len());

		let tag = if hash_idx.is_some() || dot_idx.is_some() { &sel[..hash.min(dot)] } else { sel };
		let id = if hash < dot { Some(&sel[hash + 1..dot]) } else { None };
		let classes = if dot < sel.len() { Some(&sel[dot + 1..]) } else { None };

		Self { tag, id, classes }
	}

	/// Space-separated class list, as it would appear in a `class` attribute.
	#[must_use]
	pub fn class_list(&self) -> Option<String> {
		self.classes.map(|classes| classes.replace('.', " "))
	}
}

/// Whether `sel` is `svg` or starts with `svg.` or `svg#`.
#[must_use]
pub fn is_svg_root(sel: &str) -> bool {
	sel.strip_prefix("svg").map_or(false, |rest| rest.is_empty() || rest.starts_with('.') || rest.starts_with('#'))
}

/// Namespace of the element described by `sel`.
///
/// `svg` roots and everything inside them (`in_svg`) are in [`SVG_NAMESPACE`], regardless of their payload.
/// Elsewhere only the node's own payload namespace applies. It is not inherited.
#[must_use]
pub fn element_namespace<'a>(sel: &str, own: Option<&'a str>, in_svg: bool) -> Option<&'a str> {
	if in_svg || is_svg_root(sel) {
		Some(SVG_NAMESPACE)
	} else {
		own
	}
}

/// Whether the children of the element described by `sel` are inside an SVG subtree.
#[must_use]
pub fn children_in_svg(sel: &str, in_svg: bool) -> bool {
	(in_svg || is_svg_root(sel)) && Selector::parse(sel).tag != FOREIGN_OBJECT
}
