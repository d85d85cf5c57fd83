#![allow(dead_code)]

use std::{rc::Rc, sync::Once};

use blocktree::{
    dom::memory::{MemoryDom, MemoryNode},
    Dom, Template, TemplateBuilder,
};

pub fn init_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

/// A fresh host along with an empty container element.
pub fn setup() -> (MemoryDom, MemoryNode) {
    init_tracing();

    let dom = MemoryDom::new();
    let container = dom.create_element("main");

    (dom, container)
}

/// `<li class="item" .done={1} @click={2}><span>{0}</span><block-child/></li>`
pub fn item_template(dom: &MemoryDom) -> Rc<Template<MemoryDom>> {
    TemplateBuilder::new()
        .with_element("li", None)
        .with_attribute(0, "class", "item")
        .with_element("span", Some(0))
        .with_dynamic_text(Some(1), 0)
        .with_slot(Some(0))
        .bind_class(0, "done", 1)
        .on(0, "click", 2)
        .compile(dom)
        .expect("item template to compile")
}

/// `<section><block-child/><hr><block-child/></section>`
pub fn two_slot_template(dom: &MemoryDom) -> Rc<Template<MemoryDom>> {
    TemplateBuilder::new()
        .with_element("section", None)
        .with_slot(Some(0))
        .with_element("hr", Some(0))
        .with_slot(Some(0))
        .compile(dom)
        .expect("two slot template to compile")
}
