//! End-to-end tests for the compile-and-render pipeline: realistic
//! form-element templates with conditional classes, attribute merging,
//! loops, and the default escaping behavior.

use pretty_assertions::assert_eq;

use sprig::{compile, Attributes, Context, RenderError, TemplateError, Value};

fn render(source: &str, context: &Context) -> Result<String, TemplateError> {
    let compiled = compile(source, "test.html")?;
    Ok(compiled.unit.render(context)?)
}

/// A fieldset legend template in the shape real themes use: a class list
/// built with ternaries, merged into the attribute object, with the
/// legend text escaped by default.
const LEGEND_TEMPLATE: &str = "\
{% set classes = ['fieldset-legend', required ? 'form-required' : ''] %}\
<legend{{ attributes.addClass(classes) }}>{{ title }}</legend>";

#[test]
fn test_legend_with_required_marker() {
    let mut ctx = Context::new();
    ctx.insert("attributes", Attributes::new());
    ctx.insert("required", true);
    ctx.insert("title", "Name & address");

    let out = render(LEGEND_TEMPLATE, &ctx).expect("Should render");
    assert_eq!(
        out,
        r#"<legend class="fieldset-legend form-required">Name &amp; address</legend>"#
    );
}

#[test]
fn test_legend_without_required_marker() {
    let mut ctx = Context::new();
    ctx.insert("attributes", Attributes::new());
    ctx.insert("required", false);
    ctx.insert("title", "Name");

    let out = render(LEGEND_TEMPLATE, &ctx).expect("Should render");
    // The false branch contributes an empty token, which must not appear
    assert_eq!(out, r#"<legend class="fieldset-legend">Name</legend>"#);
}

#[test]
fn test_untrusted_input_escaped_everywhere() {
    let mut ctx = Context::new();
    ctx.insert("title", "<script>alert('x')</script>");
    let out = render("<h2>{{ title }}</h2>", &ctx).expect("Should render");
    assert_eq!(
        out,
        "<h2>&lt;script&gt;alert(&#039;x&#039;)&lt;/script&gt;</h2>"
    );
}

#[test]
fn test_raw_filter_trusts_value() {
    let mut ctx = Context::new();
    ctx.insert("body", "<p>already rendered</p>");
    let out = render("{{ body|raw }}", &ctx).expect("Should render");
    assert_eq!(out, "<p>already rendered</p>");
}

#[test]
fn test_absent_context_members_render_as_nothing() {
    let source = "<div>{{ element.prefix }}{{ element.field.widget }}</div>";
    let out = render(source, &Context::new()).expect("Should render");
    assert_eq!(out, "<div></div>");
}

#[test]
fn test_interpolation_without_padding() {
    // Delimiters work with or without interior whitespace
    let out = render("<p>{{x}}</p>", &Context::new()).expect("Should render");
    assert_eq!(out, "<p></p>");

    let mut ctx = Context::new();
    ctx.insert("x", "y");
    assert_eq!(render("<p>{{x}}</p>", &ctx).expect("Should render"), "<p>y</p>");
}

#[test]
fn test_conditional_wrapper() {
    let source = "{% if errors %}<div class=\"error\">{{ errors }}</div>{% else %}ok{% endif %}";
    let mut ctx = Context::new();
    ctx.insert("errors", "field is required");
    assert_eq!(
        render(source, &ctx).expect("Should render"),
        "<div class=\"error\">field is required</div>"
    );

    assert_eq!(render(source, &Context::new()).expect("Should render"), "ok");
}

#[test]
fn test_loop_over_items() {
    let mut ctx = Context::new();
    ctx.insert(
        "links",
        vec![Value::from("Home"), Value::from("About"), Value::from("Contact")],
    );
    let out = render(
        "<ul>{% for link in links %}<li>{{ link }}</li>{% endfor %}</ul>",
        &ctx,
    )
    .expect("Should render");
    assert_eq!(out, "<ul><li>Home</li><li>About</li><li>Contact</li></ul>");
}

#[test]
fn test_render_failure_yields_no_partial_output() {
    // The text before the bad loop must not leak out on failure
    let mut ctx = Context::new();
    ctx.insert("count", 3.0);
    let result = render("before {% for x in count %}x{% endfor %}", &ctx);
    match result {
        Err(TemplateError::Render(RenderError::NotIterable { found, .. })) => {
            assert_eq!(found, "number");
        }
        other => panic!("Expected NotIterable, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_compiled_unit_renders_many_contexts() {
    let compiled = compile("<span>{{ label }}</span>", "label.html").expect("Should compile");

    for label in ["one", "two", "three"] {
        let mut ctx = Context::new();
        ctx.insert("label", label);
        assert_eq!(
            compiled.unit.render(&ctx).expect("Should render"),
            format!("<span>{}</span>", label)
        );
    }
}

#[test]
fn test_units_are_shareable_across_threads() {
    use std::sync::Arc;

    let compiled = Arc::new(compile("{{ n }}", "n.html").expect("Should compile"));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let compiled = Arc::clone(&compiled);
            std::thread::spawn(move || {
                let mut ctx = Context::new();
                ctx.insert("n", i as i64);
                compiled.unit.render(&ctx).expect("Should render")
            })
        })
        .collect();

    let mut outputs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    outputs.sort();
    assert_eq!(outputs, vec!["0", "1", "2", "3"]);
}

#[test]
fn test_comments_leave_no_trace() {
    let out = render("a{# note to themers #}b", &Context::new()).expect("Should render");
    assert_eq!(out, "ab");
}

#[test]
fn test_comments_tolerate_unpaired_quotes() {
    let out = render("a{# don't do this #}b", &Context::new()).expect("Should render");
    assert_eq!(out, "ab");
}

#[test]
fn test_debug_map_reports_directive_lines() {
    let source = "<fieldset>\n{% if required %}\n{{ title }}\n{% endif %}\n</fieldset>\n";
    let compiled = compile(source, "fieldset.html").expect("Should compile");

    // Node 0: leading text, node 1: the if on line 2
    assert_eq!(compiled.debug.line_of(0), Some(1));
    assert_eq!(compiled.debug.line_of(1), Some(2));
}

#[test]
fn test_syntax_error_reports_useful_message() {
    let err = compile("{% if x %}unclosed", "broken.html").unwrap_err();
    match err {
        TemplateError::Compile(errors) => {
            assert!(!errors.is_empty());
            let report = errors[0].format("{% if x %}unclosed", "broken.html");
            assert!(report.contains("broken.html"));
        }
        other => panic!("Expected compile error, got {:?}", other),
    }
}
