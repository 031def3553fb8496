use std::cell::RefCell;
use std::rc::Rc;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui_tagfit::input::KeyCode;
use ratatui_tagfit::input::KeyEvent;
use ratatui_tagfit::prelude::*;
use ratatui_tagfit::table::fit::ManualViewport;
use ratatui_tagfit::table::view::ScrollX;

const WORDS: &[&str] = &[
    "rust", "go", "rust", " zig ", "", "go", "c", "   ", "Rust", "c", "ocaml", "zig",
];

fn type_str(input: &mut TagInput, s: &str) -> Vec<TagInputAction> {
    s.chars()
        .map(|c| input.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Char(c)))))
        .collect()
}

#[test]
fn duplicate_prevention_holds_for_any_add_sequence() {
    for start in 0..WORDS.len() {
        let mut input = TagInput::new();
        for w in WORDS.iter().cycle().skip(start).take(WORDS.len() * 2) {
            input.add_tag(w);
        }
        let tags = input.tags();
        let mut dedup = tags.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), tags.len(), "{tags:?}");
        assert!(tags.iter().all(|t| !t.trim().is_empty() && t.trim() == t));
    }
}

#[test]
fn tag_count_never_exceeds_limit() {
    for max in 0..5 {
        let mut input = TagInput::with_options(TagInputOptions {
            max_tags: Some(max),
            allow_duplicates: true,
            ..Default::default()
        });
        for w in WORDS {
            input.add_tag(w);
            assert!(input.tags().len() <= max);
        }
        type_str(&mut input, "a b c d e f ");
        assert!(input.tags().len() <= max);
    }
}

#[test]
fn controlled_host_feeds_value_back() {
    let value = Rc::new(RefCell::new("react,javascript".to_string()));
    let mut input = TagInput::new();
    input.set_value(&value.borrow());
    let sink = Rc::clone(&value);
    input.set_on_change(move |v| *sink.borrow_mut() = v.to_string());

    type_str(&mut input, "typescript ");
    input.set_value(&value.borrow().clone());
    assert_eq!(value.borrow().as_str(), "react,javascript,typescript");
    assert_eq!(input.tags(), vec!["react", "javascript", "typescript"]);

    input.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Backspace)));
    input.set_value(&value.borrow().clone());
    assert_eq!(value.borrow().as_str(), "react,javascript");

    input.clear_tags();
    input.set_value(&value.borrow().clone());
    assert_eq!(value.borrow().as_str(), "");
    assert!(input.tags().is_empty());
}

#[test]
fn value_always_matches_joined_tags() {
    let mut input = TagInput::with_options(TagInputOptions {
        separator: Separator::pattern(r"[;|]").unwrap(),
        ..Default::default()
    });
    input.set_value("a, b");
    assert_eq!(input.value(), input.tags().join(","));
    type_str(&mut input, "c;d|e");
    assert_eq!(input.tags(), vec!["a", "b", "c", "d"]);
    assert_eq!(input.pending(), "e");
    assert_eq!(input.value(), "a,b,c,d");
}

#[test]
fn viewport_fit_tracks_manual_source() {
    let mut table = TableView::with_options(TableOptions {
        columns: vec![TableColumn::new("Name", 10), TableColumn::new("Dept", 12)],
        page_size: Some(20),
        multi_select: true,
        ..Default::default()
    });
    table.set_rows(
        (1..=50)
            .map(|i| vec![format!("Employee {i}"), "Engineering".to_string()])
            .collect(),
    );
    let mut fit = AutoResizingTable::new(table);
    let mut source = ManualViewport::new(1000);
    assert!(fit.mount(&mut source));
    assert_eq!(fit.table().scroll_bounds().y, Some(600));
    assert_eq!(fit.table().scroll_bounds().x, ScrollX::MaxContent);

    fit.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Char('n'))));
    fit.handle_event(InputEvent::Key(KeyEvent::new(KeyCode::Char(' '))));

    for h in [900, 300, 1000] {
        source.set_height(Some(h));
        fit.handle_event(InputEvent::Resize {
            width: 80,
            height: h as u16,
        });
        assert_eq!(fit.available_height(), h - 400);
        assert_eq!(fit.table().page(), 1);
        assert_eq!(fit.table().selected_rows(), vec![20]);
    }

    let area = Rect::new(0, 0, 40, 12);
    let mut buf = Buffer::empty(area);
    fit.render(area, &mut buf, &Theme::default());
    assert_eq!(fit.table().state.viewport_h, 10);

    fit.unmount(&mut source);
    assert_eq!(source.listener_count(), 0);
}
