use graft_dom::{memory::MemoryTarget, Target, VNode};
use std::rc::Rc;

use memory_fixture_::{children, handle_for, item, keyed_list, list_html, Fixture};

#[test]
fn append() {
	let fixture = Fixture::new();
	let old = fixture.mount(keyed_list(&[1, 2]));
	let new = fixture.patcher.patch(&old, keyed_list(&[1, 2, 3])).unwrap();

	assert_eq!(fixture.element_creations(), 1);
	assert_eq!(fixture.target.move_count(), 0);
	assert_eq!(fixture.target.render(new.elm().unwrap()), list_html(&[1, 2, 3]));
}

#[test]
fn prepend() {
	let fixture = Fixture::new();
	let old = fixture.mount(keyed_list(&[1, 2]));
	let new = fixture.patcher.patch(&old, keyed_list(&[3, 1, 2])).unwrap();

	assert_eq!(fixture.element_creations(), 1);
	assert_eq!(fixture.target.move_count(), 0);
	assert_eq!(fixture.target.render(new.elm().unwrap()), list_html(&[3, 1, 2]));
}

#[test]
fn reversal_only_moves() {
	let fixture = Fixture::new();
	let old = fixture.mount(keyed_list(&[1, 2, 3]));
	let handles: Vec<_> = [1, 2, 3].iter().map(|&key| handle_for(&old, key)).collect();

	let new = fixture.patcher.patch(&old, keyed_list(&[3, 2, 1])).unwrap();

	assert_eq!(fixture.target.creation_count(), 0);
	assert_eq!(fixture.target.move_count(), 2);
	assert_eq!(fixture.target.render(new.elm().unwrap()), list_html(&[3, 2, 1]));
	assert_eq!([1, 2, 3].iter().map(|&key| handle_for(&new, key)).collect::<Vec<_>>(), handles);
}

#[test]
fn unchanged_list_is_quiet() {
	let fixture = Fixture::new();
	let old = fixture.mount(keyed_list(&[1, 2, 3]));
	fixture.patcher.patch(&old, keyed_list(&[1, 2, 3])).unwrap();
	assert_eq!(fixture.target.journal(), []);
}

#[test]
fn adjacent_swap() {
	let fixture = Fixture::new();
	let old = fixture.mount(keyed_list(&[1, 2, 3, 4]));
	let new = fixture.patcher.patch(&old, keyed_list(&[1, 3, 2, 4])).unwrap();

	assert_eq!(fixture.target.creation_count(), 0);
	assert_eq!(fixture.target.move_count(), 1);
	assert_eq!(fixture.target.render(new.elm().unwrap()), list_html(&[1, 3, 2, 4]));
}

#[test]
fn shuffle_keeps_survivor_handles() {
	let fixture = Fixture::new();
	let old = fixture.mount(keyed_list(&[1, 2, 3, 4, 5]));
	let removed = handle_for(&old, 3).unwrap();
	let survivors: Vec<_> = [4, 1, 5, 2].iter().map(|&key| (key, handle_for(&old, key))).collect();

	let new = fixture.patcher.patch(&old, keyed_list(&[4, 1, 5, 2, 6])).unwrap();

	let ul = new.elm().unwrap();
	assert_eq!(fixture.target.render(ul), list_html(&[4, 1, 5, 2, 6]));
	for (key, handle) in survivors {
		assert_eq!(handle_for(&new, key), handle, "key {}", key);
	}
	assert_eq!(fixture.element_creations(), 1);
	assert_eq!(fixture.target.parent_node(&removed), None);
	assert_eq!(
		fixture.target.children(ul),
		children(&new).iter().map(|child| child.elm().unwrap()).collect::<Vec<_>>()
	);
}

#[test]
fn key_shared_across_element_kinds_is_recreated() {
	let fixture = Fixture::new();
	let old = fixture.mount(VNode::element("section").with_children(vec![VNode::element("div").with_key(1).into_child()]).into_ref());
	let old_div = handle_for(&old, 1).unwrap();

	let new = fixture
		.patcher
		.patch(&old, VNode::element("section").with_children(vec![VNode::element("span").with_key(1).into_child()]).into_ref())
		.unwrap();

	let new_span = handle_for(&new, 1).unwrap();
	assert_ne!(new_span, old_div);
	assert_eq!(fixture.element_creations(), 1);
	assert_eq!(fixture.target.parent_node(&old_div), None);
	assert_eq!(fixture.target.render(new.elm().unwrap()), "<section><span></span></section>");
}

#[test]
fn keyed_match_deep_inside_is_moved_not_recreated() {
	let fixture = Fixture::new();
	let old = fixture.mount(keyed_list(&[1, 2, 3, 4]));
	let three = handle_for(&old, 3);

	// Neither end matches, so this goes through the key map.
	let new = fixture.patcher.patch(&old, keyed_list(&[3, 9, 8])).unwrap();

	assert_eq!(handle_for(&new, 3), three);
	assert_eq!(fixture.target.render(new.elm().unwrap()), list_html(&[3, 9, 8]));
	assert_eq!(fixture.element_creations(), 2);
}

#[test]
fn keyed_moves_leave_the_old_children_untouched() {
	let fixture = Fixture::new();
	let old = fixture.mount(keyed_list(&[1, 2, 3, 4]));
	let before: Vec<_> = old.children().unwrap().to_vec();

	fixture.patcher.patch(&old, keyed_list(&[3, 9, 2, 8])).unwrap();

	let after = old.children().unwrap();
	assert_eq!(after.len(), 4);
	assert!(before.iter().zip(after.iter()).all(|(a, b)| match (a, b) {
		(Some(a), Some(b)) => Rc::ptr_eq(a, b),
		_ => false,
	}));
	// The moved node is still found through the old tree.
	assert!(fixture.target.parent_node(&handle_for(&old, 3).unwrap()).is_some());
}

#[test]
fn unkeyed_siblings_patch_positionally() {
	let fixture = Fixture::new();
	let paragraphs = |texts: &[&str]| {
		VNode::element("div").with_children(texts.iter().map(|&text| VNode::element("p").with_text(text).into_child())).into_ref()
	};
	let old = fixture.mount(paragraphs(&["a", "b"]));
	let handles: Vec<_> = children(&old).iter().map(|child| child.elm()).collect();

	let new = fixture.patcher.patch(&old, paragraphs(&["x", "y", "z"])).unwrap();

	assert_eq!(children(&new).iter().take(2).map(|child| child.elm()).collect::<Vec<_>>(), handles);
	assert_eq!(fixture.target.render(new.elm().unwrap()), "<div><p>x</p><p>y</p><p>z</p></div>");
}

#[test]
fn empty_slots_are_skipped() {
	let fixture = Fixture::new();
	let old = fixture.mount(
		VNode::element("ul")
			.with_children(vec![item(1).into_child(), None, item(2).into_child()])
			.into_ref(),
	);
	assert_eq!(fixture.render(), format!("<main>{}</main>", list_html(&[1, 2])));

	let new = fixture
		.patcher
		.patch(&old, VNode::element("ul").with_children(vec![None, item(2).into_child(), None, item(1).into_child(), None]).into_ref())
		.unwrap();
	assert_eq!(fixture.target.render(new.elm().unwrap()), list_html(&[2, 1]));
	assert_eq!(fixture.target.creation_count(), 0);
}

#[test]
fn removes_trailing_and_leading() {
	let fixture = Fixture::new();
	let old = fixture.mount(keyed_list(&[1, 2, 3, 4, 5]));
	let new = fixture.patcher.patch(&old, keyed_list(&[2, 3, 4])).unwrap();

	assert_eq!(fixture.target.render(new.elm().unwrap()), list_html(&[2, 3, 4]));
	assert_eq!(fixture.target.removal_count(), 2);
	assert_eq!(fixture.target.creation_count(), 0);
}

#[test]
fn duplicate_keys_do_not_panic() {
	let fixture = Fixture::new();
	let old = fixture.mount(keyed_list(&[1, 1, 2]));
	let new = fixture.patcher.patch(&old, keyed_list(&[2, 1, 1, 3])).unwrap();
	let ul = new.elm().unwrap();
	assert_eq!(fixture.target.text_content(ul).len(), 4);
}

#[test]
fn text_children_update_in_place() {
	let fixture = Fixture::new();
	let old = fixture.mount(VNode::element("p").with_children(vec![VNode::text_node("Hello, ").into_child(), VNode::text_node("world").into_child()]).into_ref());
	let handles: Vec<_> = children(&old).iter().map(|child| child.elm()).collect();

	let new = fixture
		.patcher
		.patch(&old, VNode::element("p").with_children(vec![VNode::text_node("Hello, ").into_child(), VNode::text_node("there").into_child()]).into_ref())
		.unwrap();

	assert_eq!(children(&new).iter().map(|child| child.elm()).collect::<Vec<_>>(), handles);
	assert_eq!(fixture.target.render(new.elm().unwrap()), "<p>Hello, there</p>");
	assert_eq!(fixture.target.journal().len(), 1);
}

#[test]
fn string_and_integer_keys_differ() {
	let fixture = Fixture::new();
	let old = fixture.mount(VNode::element("ul").with_children(vec![VNode::element("li").with_key("1").into_child()]).into_ref());
	let new = fixture
		.patcher
		.patch(&old, VNode::<MemoryTarget>::element("ul").with_children(vec![VNode::element("li").with_key(1).into_child()]).into_ref())
		.unwrap();
	assert_eq!(fixture.element_creations(), 1);
	assert_eq!(fixture.target.children(new.elm().unwrap()).len(), 1);
}
