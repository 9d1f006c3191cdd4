#![cfg(target_arch = "wasm32")]

use graft_dom::{web::WebTarget, Module, Patcher, Target, VNode, VNodeRef};
use std::{cell::Cell, rc::Rc, sync::Once};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, HtmlBodyElement, Node};

wasm_bindgen_test_configure!(run_in_browser);

static LOG_INITIALIZED: Once = Once::new();

#[wasm_bindgen_test]
fn text() {
	test_create_diff_identical_remove(|| VNode::element("span").with_text("Hello graft-dom text!"), 1);
}

#[wasm_bindgen_test]
fn nested() {
	test_create_diff_identical_remove(
		|| {
			VNode::element("div").with_children(vec![
				VNode::element("p").with_text("Hello graft-dom").into_child(),
				VNode::text_node(" and ").into_child(),
				VNode::element("p").with_children(vec![VNode::element("em").with_text("nodes!").into_child()]).into_child(),
			])
		},
		4,
	);
}

#[wasm_bindgen_test]
fn keyed() {
	test_create_diff_identical_remove(
		|| VNode::element("ul").with_children((0..3).map(|i| VNode::element("li").with_key(i).with_text(i.to_string()).into_child())),
		4,
	);
}

#[wasm_bindgen_test]
fn svg() {
	test_create_diff_identical_remove(|| VNode::element("svg").with_children(vec![VNode::element("rect").into_child()]), 2);
}

/// Mounts `vdom`, patches it with an identical copy, then replaces it and checks the live element count throughout.
fn test_create_diff_identical_remove(vdom: impl Fn() -> VNode<WebTarget>, element_count: isize) {
	LOG_INITIALIZED.call_once(|| {
		//TODO: Fail on Warning or Error.
		tracing_wasm::set_as_global_default();
	});

	let body: Node = window().unwrap().document().unwrap().body().unwrap().dyn_into::<HtmlBodyElement>().unwrap().into();
	let target = Rc::new(WebTarget::for_node(&body).unwrap());
	let placeholder = target.create_element("template").unwrap();
	target.append_child(&body, &placeholder).unwrap();

	let live = Rc::new(Cell::new(0_isize));
	let counter = {
		let (created, destroyed) = (Rc::clone(&live), Rc::clone(&live));
		Module::new()
			.on_create(move |_: &VNodeRef<WebTarget>, _: &VNodeRef<WebTarget>| created.set(created.get() + 1))
			.on_destroy(move |_: &VNodeRef<WebTarget>| destroyed.set(destroyed.get() - 1))
	};
	let patcher = Patcher::new(Rc::clone(&target), vec![counter]);

	let vnode = patcher.patch_element(&placeholder, vdom().into_ref()).unwrap();
	// The adopted placeholder was destroyed.
	assert_eq!(live.get(), element_count - 1);
	live.set(element_count);

	let elm = vnode.elm().unwrap();
	let html = elm.dyn_ref::<web_sys::Element>().unwrap().outer_html();

	let vnode = patcher.patch(&vnode, vdom().into_ref()).unwrap();
	assert_eq!(live.get(), element_count);
	assert_eq!(vnode.elm(), Some(elm.clone()));
	assert_eq!(elm.dyn_ref::<web_sys::Element>().unwrap().outer_html(), html);

	let vnode = patcher.patch(&vnode, VNode::element("hr").into_ref()).unwrap();
	assert_eq!(live.get(), 1);
	assert_eq!(elm.parent_node(), None);

	target.remove_child(&body, &vnode.elm().unwrap()).unwrap();
}
