use super::*;
use crate::builder::El;

fn chat(doc: &mut Document) -> NodeKey {
    let body = doc.body();
    doc.append_tree(body, &El::new("div").attr("id", "chat")).unwrap()
}

#[test]
fn new_document_has_connected_body() {
    let doc = Document::new();
    assert!(doc.is_connected(doc.body()));
    assert_eq!(doc.parent(doc.body()), Some(doc.root()));
    assert_eq!(doc.tag_name(doc.body()), Some("body"));
}

#[test]
fn detached_nodes_are_live_but_not_connected() {
    let mut doc = Document::new();
    let root = chat(&mut doc);
    let row = doc.build(&El::new("div").class("msg")).unwrap();
    assert!(doc.contains(row));
    assert!(!doc.is_connected(row));

    doc.append_child(root, row).unwrap();
    assert!(doc.is_connected(row));

    doc.detach(root).unwrap();
    assert!(doc.contains(row));
    assert!(!doc.is_connected(row));
}

#[test]
fn remove_frees_subtree_and_keys_are_not_reused() {
    let mut doc = Document::new();
    let root = chat(&mut doc);
    let row = doc.append_tree(root, &El::new("div").text("hi")).unwrap();
    let text = doc.children(row)[0];
    doc.remove(row).unwrap();
    assert!(!doc.contains(row));
    assert!(!doc.contains(text));

    let fresh = doc.create_element("div");
    assert!(fresh.0 > text.0);
    assert_eq!(doc.set_text(text, "x"), Err(DomError::MissingKey(text)));
}

#[test]
fn append_moves_node_between_parents() {
    let mut doc = Document::new();
    let a = chat(&mut doc);
    let body = doc.body();
    let b = doc.append_tree(body, &El::new("div")).unwrap();
    let child = doc.append_tree(a, &El::new("span")).unwrap();
    doc.append_child(b, child).unwrap();
    assert!(doc.children(a).is_empty());
    assert_eq!(doc.children(b), &[child]);
    assert_eq!(doc.parent(child), Some(b));
}

#[test]
fn rejects_cycles_and_bad_parents() {
    let mut doc = Document::new();
    let root = chat(&mut doc);
    let inner = doc.append_tree(root, &El::new("span")).unwrap();
    assert_eq!(
        doc.append_child(inner, root),
        Err(DomError::CycleDetected {
            parent: inner,
            child: root
        })
    );
    let text = doc.create_text("t");
    let other = doc.create_element("b");
    assert_eq!(doc.append_child(text, other), Err(DomError::InvalidParent(text)));
    assert_eq!(doc.remove(doc.root()), Err(DomError::RootImmutable));
}

#[test]
fn insert_before_requires_sibling_of_parent() {
    let mut doc = Document::new();
    let root = chat(&mut doc);
    let first = doc.append_tree(root, &El::new("i")).unwrap();
    let node = doc.create_element("b");
    doc.insert_before(root, node, first).unwrap();
    assert_eq!(doc.children(root), &[node, first]);

    let stray = doc.create_element("u");
    let other = doc.create_element("s");
    assert_eq!(
        doc.insert_before(root, other, stray),
        Err(DomError::InvalidSibling {
            parent: root,
            before: stray
        })
    );
}

#[test]
fn set_text_content_edits_single_text_child_in_place() {
    let mut doc = Document::new();
    let root = chat(&mut doc);
    let span = doc.append_tree(root, &El::new("span").text("Chatbot")).unwrap();
    let text = doc.children(span)[0];
    doc.set_text_content(span, "(Alice)").unwrap();
    assert_eq!(doc.children(span), &[text]);
    assert_eq!(doc.text(text), Some("(Alice)"));

    let mixed = doc
        .append_tree(root, &El::new("span").text("a").child(El::new("b").text("b")))
        .unwrap();
    doc.set_text_content(mixed, "c").unwrap();
    assert_eq!(doc.children(mixed).len(), 1);
    assert_eq!(doc.text_content(mixed), "c");
}

#[test]
fn attributes_and_classes() {
    let mut doc = Document::new();
    let root = chat(&mut doc);
    let span = doc
        .append_tree(root, &El::new("span").class("user").class("color-3"))
        .unwrap();
    assert!(doc.has_class(span, "user"));
    assert_eq!(doc.classes(span).collect::<Vec<_>>(), ["user", "color-3"]);

    doc.set_attribute(span, "data-name", "Alice").unwrap();
    doc.set_attribute(span, "data-name", "Bob").unwrap();
    assert_eq!(doc.attr(span, "data-name"), Some("Bob"));
    doc.remove_attribute(span, "data-name").unwrap();
    assert_eq!(doc.attr(span, "data-name"), None);

    let text = doc.create_text("t");
    assert_eq!(
        doc.set_attribute(text, "a", "b"),
        Err(DomError::WrongNodeKind(text))
    );
}

#[test]
fn observers_receive_subtree_records() {
    let mut doc = Document::new();
    let root = chat(&mut doc);
    let all = doc.observe(root, ObserveOptions::everything());
    let shallow = doc.observe(
        root,
        ObserveOptions {
            child_list: true,
            ..ObserveOptions::default()
        },
    );

    let row = doc.append_tree(root, &El::new("div").text("hi")).unwrap();
    let text = doc.children(row)[0];
    doc.set_text(text, "hello").unwrap();
    doc.set_attribute(row, "data-x", "1").unwrap();

    let records = doc.take_records(all);
    assert_eq!(
        records,
        vec![
            MutationRecord::ChildList {
                target: root,
                added: vec![row],
                removed: Vec::new(),
            },
            MutationRecord::CharacterData { target: text },
            MutationRecord::Attributes {
                target: row,
                name: "data-x".to_string(),
            },
        ]
    );
    assert!(doc.take_records(all).is_empty());

    // Only the direct child insertion matches a non-subtree child_list observer.
    assert_eq!(doc.take_records(shallow).len(), 1);
}

#[test]
fn disconnected_observer_stops_queueing() {
    let mut doc = Document::new();
    let body = doc.body();
    let watcher = doc.observe(body, ObserveOptions::structure());
    chat(&mut doc);
    assert_eq!(doc.pending_records(watcher), 1);
    assert!(doc.disconnect(watcher));
    chat(&mut doc);
    assert!(doc.take_records(watcher).is_empty());
}

#[test]
fn materialize_round_trips_structure() {
    let mut doc = Document::new();
    let root = chat(&mut doc);
    doc.append_tree(root, &El::new("span").class("a").text("x"))
        .unwrap();
    let node = doc.materialize(root).unwrap();
    let Node::Element { children, .. } = &node else {
        panic!("expected element");
    };
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].children().len(), 1);
}
