//! HTML pages for the form and the prediction result

use crate::error::ChurnError;
use crate::feature_extractor::fields;
use crate::types::prediction::PredictionResult;
use std::fmt::Write;

/// Form inputs in display order: (field, label, kind)
const FORM_FIELDS: [(&str, &str, InputKind); 14] = [
    (fields::ACCOUNT_LENGTH, "Account Length (days)", InputKind::Integer),
    (fields::AREA_CODE, "Area Code", InputKind::Integer),
    (fields::INTL_PLAN, "International Plan", InputKind::YesNo),
    (fields::VMAIL_PLAN, "Voice Mail Plan", InputKind::YesNo),
    (fields::VMAIL_MESSAGES, "Voice Mail Messages", InputKind::Integer),
    (fields::DAY_MINUTES, "Total Day Minutes", InputKind::Decimal),
    (fields::DAY_CALLS, "Total Day Calls", InputKind::Integer),
    (fields::EVE_MINUTES, "Total Evening Minutes", InputKind::Decimal),
    (fields::EVE_CALLS, "Total Evening Calls", InputKind::Integer),
    (fields::NIGHT_MINUTES, "Total Night Minutes", InputKind::Decimal),
    (fields::NIGHT_CALLS, "Total Night Calls", InputKind::Integer),
    (fields::INTL_MINUTES, "Total International Minutes", InputKind::Decimal),
    (fields::INTL_CALLS, "Total International Calls", InputKind::Integer),
    (fields::CUST_SERV_CALLS, "Customer Service Calls", InputKind::Integer),
];

#[derive(Clone, Copy)]
enum InputKind {
    Integer,
    Decimal,
    YesNo,
}

const STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:2rem auto;}\
label{display:block;margin-top:.6rem;}input,select{width:100%;padding:.3rem;}\
button{margin-top:1rem;padding:.5rem 1rem;}.churn{color:#b00020;}.no-churn{color:#1b5e20;}";

/// Input form served on `GET /`
pub fn render_form() -> Result<String, ChurnError> {
    let mut html = String::with_capacity(4096);
    page_start(&mut html, "Customer Churn Prediction")?;

    writeln!(html, "<h1>Customer Churn Prediction</h1>")?;
    writeln!(html, "<form method=\"post\" action=\"/predict\">")?;
    for (name, label, kind) in FORM_FIELDS {
        writeln!(html, "<label for=\"{name}\">{}</label>", escape(label))?;
        match kind {
            InputKind::YesNo => writeln!(
                html,
                "<select id=\"{name}\" name=\"{name}\"><option>No</option><option>Yes</option></select>"
            )?,
            InputKind::Integer => writeln!(
                html,
                "<input id=\"{name}\" name=\"{name}\" type=\"number\" step=\"1\" required>"
            )?,
            InputKind::Decimal => writeln!(
                html,
                "<input id=\"{name}\" name=\"{name}\" type=\"number\" step=\"any\" required>"
            )?,
        }
    }
    writeln!(html, "<button type=\"submit\">Predict</button>")?;
    writeln!(html, "</form>")?;

    page_end(&mut html)?;
    Ok(html)
}

/// Result page served on a successful `POST /predict`
pub fn render_result(result: &PredictionResult) -> Result<String, ChurnError> {
    let mut html = String::with_capacity(2048);
    page_start(&mut html, "Churn Prediction Result")?;

    let class = if result.label.is_churn() { "churn" } else { "no-churn" };
    writeln!(html, "<h1>Prediction Result</h1>")?;
    writeln!(
        html,
        "<p>Prediction: <strong class=\"{class}\">{}</strong></p>",
        escape(&result.label.to_string())
    )?;
    writeln!(html, "<p>Churn Probability: {:.2}%</p>", result.probability)?;

    writeln!(html, "<h2>Reasons</h2>\n<ol>")?;
    for reason in result.reasons() {
        writeln!(html, "<li>{}</li>", escape(reason))?;
    }
    writeln!(html, "</ol>")?;

    writeln!(html, "<h2>Recommendations</h2>\n<ol>")?;
    for recommendation in result.recommendations() {
        writeln!(html, "<li>{}</li>", escape(recommendation))?;
    }
    writeln!(html, "</ol>")?;

    writeln!(html, "<p><a href=\"/\">Predict another customer</a></p>")?;
    page_end(&mut html)?;
    Ok(html)
}

fn page_start(html: &mut String, title: &str) -> std::fmt::Result {
    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">")?;
    writeln!(html, "<title>{}</title>", escape(title))?;
    writeln!(html, "<style>{STYLE}</style>\n</head>\n<body>")
}

fn page_end(html: &mut String) -> std::fmt::Result {
    writeln!(html, "</body>\n</html>")
}

/// Escape text for element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::prediction::{ChurnLabel, Finding};

    #[test]
    fn test_form_has_every_field() {
        let html = render_form().unwrap();

        for name in fields::ALL {
            assert!(html.contains(&format!("name=\"{name}\"")), "missing {name}");
        }
        assert!(html.contains("action=\"/predict\""));
        assert!(html.contains("<option>Yes</option>"));
    }

    #[test]
    fn test_result_lists_findings_in_order() {
        let result = PredictionResult {
            label: ChurnLabel::Churn,
            probability: 72.5,
            findings: vec![
                Finding {
                    rule: "international_plan",
                    reason: "First reason".to_string(),
                    recommendation: "First fix".to_string(),
                },
                Finding {
                    rule: "service_calls",
                    reason: "Second reason".to_string(),
                    recommendation: "Second fix".to_string(),
                },
            ],
        };

        let html = render_result(&result).unwrap();

        assert!(html.contains("<strong class=\"churn\">Churn</strong>"));
        assert!(html.contains("72.50%"));
        let first = html.find("First reason").unwrap();
        let second = html.find("Second reason").unwrap();
        assert!(first < second);
        assert!(html.contains("<li>Second fix</li>"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape("plain — text"), "plain — text");
    }
}
