//! Built-in Typst report template with `{{PLACEHOLDER}}` markers.

pub const TEMPLATE: &str = r#"#set page(paper: "a4", flipped: true, margin: 1.5cm)
#set text(size: 9pt)

= {{TITLE}}

== Model Inputs

{{PARAMETER_TABLE}}

== Summary

{{SUMMARY_TABLE}}

== Growth

{{GROWTH_CHART}}

== Period Projection

{{PERIOD_TABLE}}
"#;

pub fn template() -> &'static str {
    TEMPLATE
}
