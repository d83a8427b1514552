use super::*;
use crate::directory::DirectoryError;
use classify::{BotMatcher, Classification, ClassifierConfig, FormatRule, MatcherEntry, Message};
use dom::El;
use std::collections::HashMap;

#[derive(Default)]
struct FakeDirectory {
    colors: HashMap<String, String>,
    registered: Vec<String>,
    fail: bool,
}

impl UserDirectory for FakeDirectory {
    fn color_of(&self, _doc: &Document, name: &str) -> Option<String> {
        self.colors.get(name).cloned()
    }

    fn register(&mut self, name: &str, _now: Millis) -> Result<(), DirectoryError> {
        if self.fail {
            return Err(DirectoryError::Unavailable);
        }
        self.registered.push(name.to_string());
        Ok(())
    }
}

fn processor(config: EngineConfig) -> RowProcessor {
    let classifier = Classifier::from_config(&ClassifierConfig::default()).unwrap();
    RowProcessor::new(Rc::new(classifier), config, HostSchema::THELOUNGE)
}

fn row_el(kind: &str, sender: &str, content: El) -> El {
    El::new("div")
        .class("msg")
        .attr("data-type", kind)
        .child(El::new("span").class("time").text("12:00"))
        .child(
            El::new("span")
                .class("from")
                .child(El::new("span").class("user").class("color-3").text(sender)),
        )
        .child(content.class("content"))
}

fn mount(doc: &mut Document, channel: &str, row: El) -> NodeKey {
    let view = El::new("div").attr("data-current-channel", channel);
    let body = doc.body();
    let view = doc.append_tree(body, &view).unwrap();
    doc.append_tree(view, &row).unwrap()
}

fn sender(doc: &Document, row: NodeKey) -> NodeKey {
    HostSchema::THELOUNGE.sender_of(doc, row).unwrap()
}

fn content(doc: &Document, row: NodeKey) -> NodeKey {
    HostSchema::THELOUNGE.content_of(doc, row).unwrap()
}

#[test]
fn bridged_row_is_rewritten_and_marked() {
    let mut doc = Document::new();
    let row = mount(
        &mut doc,
        "#ath",
        row_el("message", "Chatbot", El::new("span").text("[SB] Alice: hello")),
    );
    let mut dir = FakeDirectory::default();
    dir.colors.insert("Alice".into(), "color-12".into());
    let mut p = processor(EngineConfig::default());

    let outcome = p.process(&mut doc, row, &mut dir, Millis(0)).unwrap();

    assert_eq!(outcome, RowOutcome::Rewritten { content: ContentEdit::Stripped });
    let s = sender(&doc, row);
    assert_eq!(doc.text_content(s), "(Alice)");
    assert_eq!(doc.attr(s, NAME_ATTR), Some("Alice"));
    assert_eq!(doc.attr(s, BRIDGED_ATTR), Some("SB"));
    assert_eq!(doc.attr(s, BRIDGED_CHANNEL_ATTR), Some("#ath"));
    assert_eq!(doc.attr(s, "class"), Some("user color-12"));
    assert_eq!(doc.text_content(content(&doc, row)), "hello");
    assert_eq!(dir.registered, ["Alice"]);

    let marker = row_fingerprint(&doc, &HostSchema::THELOUNGE, row).to_hex();
    assert_eq!(doc.attr(row, PROCESSED_ATTR), Some(marker.as_str()));
}

#[test]
fn second_pass_is_a_no_op() {
    let mut doc = Document::new();
    let row = mount(
        &mut doc,
        "",
        row_el("message", "Chatbot", El::new("span").text("[SB] Alice: hello")),
    );
    let mut dir = FakeDirectory::default();
    let mut p = processor(EngineConfig::default());
    p.process(&mut doc, row, &mut dir, Millis(0)).unwrap();
    let before = doc.materialize(row).unwrap();

    let outcome = p.process(&mut doc, row, &mut dir, Millis(1)).unwrap();

    assert_eq!(outcome, RowOutcome::AlreadyProcessed);
    assert_eq!(doc.materialize(row).unwrap(), before);
}

#[test]
fn ordinary_user_row_is_untouched() {
    let mut doc = Document::new();
    let row = mount(&mut doc, "", row_el("message", "alice", El::new("span").text("[SB] x: y")));
    let before = doc.materialize(row).unwrap();
    let mut p = processor(EngineConfig::default());

    let outcome = p
        .process(&mut doc, row, &mut FakeDirectory::default(), Millis(0))
        .unwrap();

    assert_eq!(outcome, RowOutcome::NotBridged);
    assert_eq!(doc.materialize(row).unwrap(), before);
}

#[test]
fn row_without_content_is_unrecognized() {
    let mut doc = Document::new();
    let el = El::new("div").class("msg").child(
        El::new("span")
            .class("from")
            .child(El::new("span").class("user").text("Chatbot")),
    );
    let row = mount(&mut doc, "", el);
    let mut p = processor(EngineConfig::default());
    assert_eq!(
        p.process(&mut doc, row, &mut FakeDirectory::default(), Millis(0)).unwrap(),
        RowOutcome::Unrecognized
    );
}

#[test]
fn join_rows_hidden_only_when_enabled() {
    let mut doc = Document::new();
    let row = mount(&mut doc, "", row_el("join", "bob", El::new("span").text("bob joined")));

    let mut keep = processor(EngineConfig::default());
    keep.process(&mut doc, row, &mut FakeDirectory::default(), Millis(0))
        .unwrap();
    assert_eq!(doc.attr(row, "style"), None);

    let mut hide = processor(EngineConfig {
        remove_join_quit: true,
        ..EngineConfig::default()
    });
    let outcome = hide
        .process(&mut doc, row, &mut FakeDirectory::default(), Millis(0))
        .unwrap();
    assert_eq!(outcome, RowOutcome::Hidden);
    assert_eq!(doc.attr(row, "style"), Some("display: none;"));
    assert!(doc.attr(row, PROCESSED_ATTR).is_some());
}

#[test]
fn unknown_color_is_retried_once_after_delay() {
    let mut doc = Document::new();
    let row = mount(
        &mut doc,
        "",
        row_el("message", "Chatbot", El::new("span").text("[SB] Alice: hi")),
    );
    let mut dir = FakeDirectory::default();
    let mut p = processor(EngineConfig::default());

    p.process(&mut doc, row, &mut dir, Millis(1000)).unwrap();
    assert_eq!(p.pending_retries(), 1);
    assert_eq!(doc.attr(sender(&doc, row), "class"), Some("user color-3"));

    dir.colors.insert("Alice".into(), "color-9".into());
    assert_eq!(p.fire_due(&mut doc, &dir, Millis(1199)), 0);
    assert_eq!(p.fire_due(&mut doc, &dir, Millis(1200)), 1);
    assert_eq!(doc.attr(sender(&doc, row), "class"), Some("user color-9"));
    assert_eq!(p.pending_retries(), 0);
}

#[test]
fn retry_is_dropped_for_detached_or_renamed_rows() {
    let mut doc = Document::new();
    let gone = mount(
        &mut doc,
        "",
        row_el("message", "Chatbot", El::new("span").text("[SB] Alice: hi")),
    );
    let renamed = mount(
        &mut doc,
        "",
        row_el("message", "Chatbot", El::new("span").text("[SB] Carol: hi")),
    );
    let mut dir = FakeDirectory::default();
    let mut p = processor(EngineConfig::default());
    p.process(&mut doc, gone, &mut dir, Millis(0)).unwrap();
    p.process(&mut doc, renamed, &mut dir, Millis(0)).unwrap();

    doc.detach(gone).unwrap();
    let s = sender(&doc, renamed);
    doc.set_attribute(s, NAME_ATTR, "Someone").unwrap();
    dir.colors.insert("Alice".into(), "color-1".into());
    dir.colors.insert("Carol".into(), "color-2".into());

    assert_eq!(p.fire_due(&mut doc, &dir, Millis(500)), 0);
    assert_eq!(doc.attr(s, "class"), Some("user color-3"));
}

/// Claims every line was relayed by "Alice" behind a prefix that is never
/// actually there.
struct StalePrefixRule;

impl FormatRule for StalePrefixRule {
    fn name(&self) -> &'static str {
        "stale-prefix"
    }

    fn apply(&self, msg: &Message<'_>) -> Option<Classification> {
        Some(Classification {
            display_name: "Alice".to_string(),
            strip_prefix: Some(format!("[gone] {}", msg.sender)),
            tag: String::new(),
        })
    }
}

#[test]
fn strip_mismatch_keeps_rename_and_warns_once() {
    let mut doc = Document::new();
    let row = mount(
        &mut doc,
        "",
        row_el("message", "Chatbot", El::new("span").text("Alice: hi")),
    );
    let matcher = BotMatcher::new(&[MatcherEntry::exact("Chatbot")]).unwrap();
    let classifier = Classifier::new(matcher, vec![Box::new(StalePrefixRule)]);
    let mut p = RowProcessor::new(Rc::new(classifier), EngineConfig::default(), HostSchema::THELOUNGE);
    let mut dir = FakeDirectory::default();

    let outcome = p.process(&mut doc, row, &mut dir, Millis(0)).unwrap();

    assert_eq!(outcome, RowOutcome::Rewritten { content: ContentEdit::Mismatch });
    assert_eq!(doc.text_content(sender(&doc, row)), "(Alice)");
    assert_eq!(doc.text_content(content(&doc, row)), "Alice: hi");
    assert_eq!(p.warnings(), 1);

    // The host re-renders the row; it mismatches again but is not re-warned.
    let s = sender(&doc, row);
    doc.set_text_content(s, "Chatbot").unwrap();
    let c = content(&doc, row);
    doc.set_text_content(c, "Alice: hi again").unwrap();
    let outcome = p.process(&mut doc, row, &mut dir, Millis(5)).unwrap();
    assert_eq!(outcome, RowOutcome::Rewritten { content: ContentEdit::Mismatch });
    assert_eq!(p.warnings(), 1);
}

#[test]
fn directory_failure_is_not_fatal() {
    let mut doc = Document::new();
    let row = mount(
        &mut doc,
        "",
        row_el("message", "Chatbot", El::new("span").text("[SB] Alice: hi")),
    );
    let mut dir = FakeDirectory {
        fail: true,
        ..FakeDirectory::default()
    };
    let mut p = processor(EngineConfig::default());

    let outcome = p.process(&mut doc, row, &mut dir, Millis(0)).unwrap();

    assert_eq!(outcome, RowOutcome::Rewritten { content: ContentEdit::Stripped });
    assert_eq!(doc.text_content(sender(&doc, row)), "(Alice)");
}

#[test]
fn channel_scoped_relay_renames_without_stripping() {
    let mut doc = Document::new();
    let row = mount(
        &mut doc,
        "#huno",
        row_el("message", "carol-web", El::new("span").text("hello there")),
    );
    let mut p = processor(EngineConfig {
        use_decorators: false,
        ..EngineConfig::default()
    });

    let outcome = p
        .process(&mut doc, row, &mut FakeDirectory::default(), Millis(0))
        .unwrap();

    assert_eq!(outcome, RowOutcome::Rewritten { content: ContentEdit::Untouched });
    assert_eq!(doc.text_content(sender(&doc, row)), "carol");
    assert_eq!(doc.text_content(content(&doc, row)), "hello there");
}
