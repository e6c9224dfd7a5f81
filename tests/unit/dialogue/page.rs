use super::*;

fn sample() -> DialoguePage {
    DialoguePage::builder()
        .marker("startblip")
        .text("I am ")
        .styled("slam", ["red"])
        .line_break()
        .directive("wait", ["1"])
        .text("ok")
        .marker("hidearrow")
        .build()
}

#[test]
fn totals_ignore_breaks_and_directives() {
    let page = sample();
    assert_eq!(page.total_chars(), 11);
    assert_eq!(page.raw_text(), "I am slamok");
}

#[test]
fn directives_carry_their_reveal_position() {
    let page = sample();
    let positions: Vec<(usize, &str)> = page
        .directives()
        .into_iter()
        .map(|(p, d)| (p, d.name.as_str()))
        .collect();
    assert_eq!(positions, [(0, "startblip"), (9, "wait"), (11, "hidearrow")]);
}

#[test]
fn visible_prefix_splits_lines_and_truncates_chunks() {
    let page = sample();

    assert!(page.visible(0).raw_text().is_empty());

    let v = page.visible(7);
    assert_eq!(v.lines.len(), 1);
    assert_eq!(v.lines[0][0].text, "I am ");
    assert_eq!(v.lines[0][1].text, "sl");
    assert_eq!(v.lines[0][1].tags, ["red"]);

    // The line break after "slam" only appears once text past it is revealed.
    assert_eq!(page.visible(9).lines.len(), 1);
    let v = page.visible(10);
    assert_eq!(v.lines.len(), 2);
    assert_eq!(v.lines[1][0].text, "o");
    assert_eq!(page.visible(99).raw_text(), page.raw_text());
}

#[test]
fn multibyte_chars_are_single_reveal_steps() {
    let page = DialoguePage::builder().text("¿qué?").build();
    assert_eq!(page.total_chars(), 5);
    assert_eq!(page.visible(3).raw_text(), "¿qu");
}

#[test]
fn tags_at_boundary_without_content_are_empty() {
    let page = sample();
    assert!(page.tags_at(0).is_empty());
    assert!(page.tags_at(3).is_empty());
    assert_eq!(page.tags_at(6), ["red"]);
    assert!(page.tags_at(10).is_empty());
    assert!(DialoguePage::default().tags_at(5).is_empty());
}

#[test]
fn pages_round_trip_through_json() {
    let page = sample();
    let s = serde_json::to_string(&page).unwrap();
    let back: DialoguePage = serde_json::from_str(&s).unwrap();
    assert_eq!(back, page);
}
