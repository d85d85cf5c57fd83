mod common;

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use blocktree::{
    dom::memory::{MemoryDom, MemoryEvent},
    Block, Config, Dom, MarkerKind, Value,
};
use common::{item_template, setup, two_slot_template};

#[test]
fn text_patch_preserves_identity() {
    let (dom, container) = setup();

    let mut block = Block::<MemoryDom>::text("one");
    block.mount(&dom, &container);
    let handle = block.handle().cloned().unwrap();
    assert_eq!(handle.text().as_deref(), Some("one"));

    block.patch(&dom, Block::text("two"));

    assert_eq!(block.handle(), Some(&handle));
    assert_eq!(handle.text().as_deref(), Some("two"));
}

#[test]
fn node_slots_and_markers_stay_in_step() {
    let (dom, container) = setup();
    let template = two_slot_template(&dom);
    let node = |a: Option<&str>, b: Option<&str>| {
        Block::node(&template, Vec::new(), vec![a.map(Block::text), b.map(Block::text)])
    };

    let mut block = node(Some("a"), None);
    block.mount(&dom, &container);

    let transitions = [
        (None, None),
        (Some("x"), Some("y")),
        (Some("x2"), None),
        (None, Some("y2")),
        (None, None),
    ];
    for (a, b) in transitions {
        block.patch(&dom, node(a, b));

        let node_block = block.as_node().unwrap();
        assert_eq!(node_block.anchors().len(), 2);
        assert_eq!(node_block.children().len(), 2);
        assert_eq!(
            dom.inner_markup(&container),
            format!("<section>{}<hr>{}</section>", a.unwrap_or(""), b.unwrap_or(""))
        );
    }
}

#[test]
fn removed_child_leaves_only_its_marker() {
    let (dom, container) = setup();
    let template = item_template(&dom);

    let mut block = Block::node(
        &template,
        vec!["task".into()],
        vec![Some(Block::html("<em>urgent</em><small>!</small>"))],
    );
    block.mount(&dom, &container);
    let li = block.handle().cloned().unwrap();
    assert_eq!(li.children().len(), 4);

    block.patch(&dom, Block::node(&template, vec!["task".into()], vec![None]));

    let anchors = block.as_node().unwrap().anchors().to_vec();
    assert_eq!(li.children()[1..], anchors[..]);
    assert_eq!(dom.first_tagged(&li, "em"), None);
    assert_eq!(
        dom.serialize(&li),
        r#"<li class="item"><span>task</span></li>"#
    );
}

#[test]
fn multi_slot_transitions() {
    let (dom, container) = setup();
    let multi = |children: [Option<&str>; 4]| {
        Block::<MemoryDom>::multi(children.into_iter().map(|child| child.map(Block::text)).collect())
    };

    let mut block = multi([None, Some("b"), None, Some("d")]);
    block.mount(&dom, &container);
    assert_eq!(dom.inner_markup(&container), "bd");

    block.patch(&dom, multi([None, None, Some("c"), Some("D")]));
    assert_eq!(dom.inner_markup(&container), "cD");

    let multi_block = block.as_multi().unwrap();
    assert_eq!(multi_block.anchors().len(), multi_block.arity());
}

#[test]
fn html_patch_matches_an_independent_parse() {
    let (dom, container) = setup();
    let markup = r#"<ul><li data-x="1">one &amp; two</li><li>three</li></ul>tail<br>"#;

    let mut block = Block::<MemoryDom>::html("<p>initial</p>");
    block.mount(&dom, &container);
    block.patch(&dom, Block::html(markup));

    let expected = dom
        .parse_markup(markup)
        .iter()
        .map(|node| dom.serialize(node))
        .collect::<String>();
    assert_eq!(block.to_markup(&dom), expected);
    assert_eq!(dom.inner_markup(&container), expected);
}

#[test]
fn collection_mounts_mixed_children_in_order() {
    let (dom, container) = setup();
    let template = item_template(&dom);

    let mut block = Block::collection(vec![
        Block::text("first"),
        Block::node(&template, vec!["second".into()], vec![None]),
        Block::html("<b>third</b>"),
    ]);
    block.mount(&dom, &container);

    let collection = block.as_collection().unwrap();
    let children = container.children();
    let anchor = collection.anchor().unwrap();

    assert_eq!(children.last(), Some(anchor));
    let handles = collection
        .children()
        .iter()
        .map(|child| child.handle().cloned().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(handles[..], children[..3]);
    assert_eq!(
        dom.inner_markup(&container),
        r#"first<li class="item"><span>second</span></li><b>third</b>"#
    );
}

#[test]
fn collection_rebuild_keeps_siblings_in_place() {
    let (dom, container) = setup();

    let mut before = Block::<MemoryDom>::text("[");
    let mut list = Block::collection(vec![Block::text("a"), Block::text("b")]);
    let mut after = Block::<MemoryDom>::text("]");
    before.mount(&dom, &container);
    list.mount(&dom, &container);
    after.mount(&dom, &container);

    list.patch(
        &dom,
        Block::collection(vec![Block::text("c"), Block::text("b"), Block::text("a")]),
    );
    assert_eq!(dom.inner_markup(&container), "[cba]");

    list.patch(&dom, Block::collection(Vec::new()));
    assert_eq!(dom.inner_markup(&container), "[]");
}

#[test]
fn siblings_keep_their_order_across_data_patches() {
    let (dom, container) = setup();
    let template = item_template(&dom);
    let item = |label: &str, done: bool| {
        Block::node(&template, vec![label.into(), done.into()], vec![None])
    };

    let mut first = item("first", false);
    let mut second = item("second", false);
    first.mount(&dom, &container);
    second.mount(&dom, &container);
    let roots = [first.handle().cloned(), second.handle().cloned()];

    for round in 0..3 {
        second.patch(&dom, item(&format!("second {round}"), true));
        first.patch(&dom, item(&format!("first {round}"), round % 2 == 1));
    }

    let children = container.children();
    assert_eq!([Some(children[0].clone()), Some(children[1].clone())], roots);
    assert_eq!(
        dom.inner_markup(&container),
        concat!(
            r#"<li class="item"><span>first 2</span></li>"#,
            r#"<li class="item done"><span>second 2</span></li>"#,
        )
    );
}

#[test]
fn handler_swap_reuses_the_registration() {
    let (dom, container) = setup();
    let template = item_template(&dom);
    let counts = Rc::new([Cell::new(0), Cell::new(0)]);

    let item = |which: usize| {
        let counts = Rc::clone(&counts);
        Block::node(
            &template,
            vec![
                "clickable".into(),
                false.into(),
                Value::<MemoryDom>::handler(move |event: &MemoryEvent| {
                    assert_eq!(event.name, "click");
                    counts[which].set(counts[which].get() + 1);
                }),
            ],
            vec![None],
        )
    };

    let mut block = item(0);
    block.mount(&dom, &container);
    let li = block.handle().cloned().unwrap();
    dom.dispatch(&li, "click");

    block.patch(&dom, item(1));
    assert_eq!(dom.listener_count(&li), 1);
    dom.dispatch(&li, "click");
    dom.dispatch(&li, "click");

    assert_eq!((counts[0].get(), counts[1].get()), (1, 2));

    block.remove(&dom);
    assert_eq!(dom.listener_count(&li), 0);
    assert!(container.children().is_empty());
}

#[test]
fn handlers_can_patch_from_within_a_dispatch() {
    let (dom, container) = setup();
    let dom = Rc::new(dom);
    let template = item_template(&dom);
    let root: Rc<RefCell<Option<Block<MemoryDom>>>> = Rc::default();

    let handler = Value::<MemoryDom>::handler({
        let (dom, template, root) = (Rc::clone(&dom), Rc::clone(&template), Rc::clone(&root));
        move |_: &MemoryEvent| {
            if let Some(block) = root.borrow_mut().as_mut() {
                block.patch(
                    &dom,
                    Block::node(&template, vec!["clicked".into(), true.into()], vec![None]),
                );
            }
        }
    });

    let mut block = Block::node(&template, vec!["waiting".into(), false.into(), handler], vec![None]);
    block.mount(&dom, &container);
    let li = block.handle().cloned().unwrap();
    *root.borrow_mut() = Some(block);

    assert_eq!(dom.dispatch(&li, "click"), 1);
    assert_eq!(
        dom.inner_markup(&container),
        r#"<li class="item done"><span>clicked</span></li>"#
    );

    // The patched data has no handler, so the listener stays registered but does nothing
    assert_eq!(dom.dispatch(&li, "click"), 1);
    assert_eq!(dom.listener_count(&li), 1);
}

#[test]
fn comment_markers_show_up_in_snapshots() {
    let dom = MemoryDom::with_config(
        Config::default()
            .with_marker(MarkerKind::Comment)
            .with_placeholder_tag("X-SLOT"),
    );
    let container = dom.create_element("main");
    let template = two_slot_template(&dom);

    let mut block = Block::multi(vec![
        Some(Block::node(&template, Vec::new(), vec![Some(Block::text("a")), None])),
        None,
    ]);
    block.mount(&dom, &container);

    assert_eq!(
        dom.inner_markup(&container),
        "<section>a<!----><hr><!----></section><!----><!---->"
    );
    assert_eq!(block.to_markup(&dom), dom.inner_markup(&container));

    let html_container = dom.create_element("main");
    let mut html = Block::html("<b>x</b>");
    html.mount(&dom, &html_container);
    assert_eq!(html.to_markup(&dom), "<b>x</b><!---->");
    assert_eq!(html.to_markup(&dom), dom.inner_markup(&html_container));

    html.patch(&dom, Block::html(""));
    assert_eq!(html.to_markup(&dom), "<!---->");
    assert_eq!(html.to_markup(&dom), dom.inner_markup(&html_container));
}
