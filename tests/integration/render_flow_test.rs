use cimr_core::markdown::{extract_sections, table_of_contents};
use cimr_core::{extract_image_filenames, format_agent_output, markdown_to_html};

const AGENT_RESPONSE: &str = "# Acme Corp Valuation\n\
Summary of the **triangulated** valuation.\n\
## Peer Multiples\n\
```json\n\
[{\"company\": \"Globex\", \"ev_ebitda\": 11.2, \"market_cap\": 1250000000}, \
{\"company\": \"Initech\", \"ev_ebitda\": 9.8, \"market_cap\": 830000000}]\n\
```\n\
## Balance Sheet\n\
| Metric | Value |\n\
|---|---|\n\
| Debt/Equity | 0.45 |\n\
| Current Ratio | 1.8 |\n\
---\n\
Chart saved:\n\
plot_IFRS Capital (central)_20240101_120000.png\n\
![Capital](plot_IFRS Capital (central)_20240101_120000.png)";

#[test]
fn test_full_response_pipeline() {
    let formatted = format_agent_output(AGENT_RESPONSE);
    let html = markdown_to_html(&formatted);

    assert!(html.contains("<h1>Acme Corp Valuation</h1>"));
    assert!(html.contains("<h2>Peer Multiples</h2>"));
    assert!(html.contains("<strong>triangulated</strong>"));
    assert!(html.contains("Data Records (2 items)"));
    assert!(html.contains("<span class=\"text-green-400\">1,250,000,000</span>"));
    assert!(html.contains("<hr />"));
    assert!(html.contains(">Debt/Equity</td>"));
}

#[test]
fn test_json_array_table_shape() {
    let html = markdown_to_html(
        "```json\n[{\"a\": 1, \"b\": 2, \"c\": 3}, {\"a\": 4, \"b\": 5, \"c\": 6}]\n```",
    );
    assert_eq!(html.matches("<th ").count(), 3);
    let body = html.split("<tbody>").nth(1).unwrap();
    assert_eq!(body.matches("<tr>").count(), 2);
}

#[test]
fn test_json_object_key_value_table() {
    let html = markdown_to_html("```json\n{\"a\": 1, \"b\": 2}\n```");
    assert!(html.contains("Data Details"));
    assert_eq!(html.matches("<tr>").count(), 2);
    assert!(html.contains(">a</td>"));
    assert!(html.contains(">b</td>"));
}

#[test]
fn test_markdown_image_reference_is_found() {
    let found = extract_image_filenames("Here it is: ![chart](foo.png)");
    assert!(found.iter().any(|f| f == "foo.png"));
}

#[test]
fn test_images_found_in_response() {
    let found = extract_image_filenames(AGENT_RESPONSE);
    let expected = "plot_IFRS Capital (central)_20240101_120000.png";
    assert!(found.len() >= 2);
    assert!(found.iter().filter(|f| f.as_str() == expected).count() >= 2);
}

fn assert_html_names_come_from_text(text: &str) {
    let html = markdown_to_html(&format_agent_output(text));
    for name in extract_image_filenames(&html) {
        assert!(
            text.contains(&name),
            "{:?} found in rendered HTML but not in {:?}",
            name,
            text
        );
    }
}

#[test]
fn test_image_names_survive_rendering() {
    assert_html_names_come_from_text(AGENT_RESPONSE);
}

#[test]
fn test_rendered_image_names_appear_in_source() {
    let cases = [
        ("list item", "Charts:\n- chart.png\n- plot_b_20240101_120000.png"),
        ("numbered heading", "1. revenue_plot.png\nsee above"),
        ("heading", "## capital (central).png"),
        ("pipe table cell", "| Chart | Note |\n|---|---|\n| growth.png | yoy |"),
        ("json value", "```json\n{\"chart\": \"margins_2024.png\"}\n```"),
        ("json records", "```json\n[{\"file\": \"a.png\"}, {\"file\": \"b.png\"}]\n```"),
        ("json list", "```json\n[\"one.png\", \"two.png\"]\n```"),
        ("bold", "Saved **summary.png** for you"),
        ("markdown image", "![Capital](plot_IFRS Capital (central)_20240101_120000.png)"),
    ];

    for (label, text) in cases {
        let html = markdown_to_html(&format_agent_output(text));
        assert!(
            !extract_image_filenames(&html).is_empty(),
            "{}: expected an image name in {:?}",
            label,
            html
        );
        assert_html_names_come_from_text(text);
    }
}

#[test]
fn test_json_key_names_are_humanized() {
    let html = markdown_to_html("```json\n{\"my_chart.png\": 1}\n```");
    assert_eq!(extract_image_filenames(&html), vec!["my chart.png"]);
}

#[test]
fn test_sections_and_outline() {
    let formatted = format_agent_output(AGENT_RESPONSE);

    let toc = table_of_contents(&formatted);
    let titles: Vec<&str> = toc.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Acme Corp Valuation", "Peer Multiples", "Balance Sheet"]
    );
    assert_eq!(toc[1].id, "peer-multiples");

    let sections = extract_sections(&formatted);
    assert_eq!(sections.len(), 3);
    assert!(sections[2].body.contains("Debt/Equity"));
}

#[test]
fn test_formatting_is_stable() {
    let once = format_agent_output(AGENT_RESPONSE);
    assert_eq!(format_agent_output(&once), once);
}
