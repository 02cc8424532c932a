use crate::test_utils::compile_err;

#[test]
fn render_points_at_token() {
    let pattern = "u8 Rq u4";
    let rendered = compile_err(pattern).render(pattern, false);
    assert!(rendered.contains("error: parse error: unknown setting qualifier `q`"), "{rendered}");
    assert!(rendered.contains("u8 Rq u4"), "{rendered}");
    assert!(rendered.contains("^^"), "{rendered}");
}

#[test]
fn render_empty_span_at_end() {
    let pattern = "u8 =";
    let rendered = compile_err(pattern).render(pattern, false);
    assert!(rendered.contains("expected a literal after `=`"), "{rendered}");
}

#[test]
fn render_unsupported_feature() {
    let pattern = "{u1}$";
    let rendered = compile_err(pattern).render(pattern, false);
    assert!(rendered.contains("unbounded repetition is not supported"), "{rendered}");
}

#[test]
fn render_colored_has_escapes() {
    let pattern = "u0";
    let rendered = compile_err(pattern).render(pattern, true);
    assert!(rendered.contains('\x1b'));
}
