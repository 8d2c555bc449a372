use simavi::infrastructure::observability::output_preview;

#[test]
fn given_blank_output_when_previewing_then_marked_empty() {
    assert_eq!(output_preview("  \n "), "[EMPTY]");
}

#[test]
fn given_short_output_when_previewing_then_returned_trimmed() {
    assert_eq!(output_preview("  {\"a\":1}\n"), "{\"a\":1}");
}

#[test]
fn given_long_multibyte_output_when_previewing_then_cut_on_char_boundary() {
    let text = "ß".repeat(150);

    let preview = output_preview(&text);

    assert!(preview.starts_with(&"ß".repeat(100)));
    assert!(preview.ends_with("... (150 chars total)"));
}
