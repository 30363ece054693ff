use crate::error::{Error, Result};
use crate::models::ReadmeAnalysis;

/// Pull the analysis object out of free-form model text and bring it within
/// the summary/fact bounds.
pub fn parse_llm_response(response: &str) -> Result<ReadmeAnalysis> {
    let json_str = extract_json(response)?;

    let analysis: ReadmeAnalysis = serde_json::from_str(json_str)
        .map_err(|e| Error::ParseError(format!("Failed to parse LLM response: {}", e)))?;

    analysis.normalized().ok_or_else(|| {
        Error::ParseError("LLM response is missing a summary or cool facts".to_string())
    })
}

fn extract_json(text: &str) -> Result<&str> {
    // Fenced block, with or without a language tag
    if let Some(start) = text.find("```") {
        let after_fence = start + 3;
        let body_start = text[after_fence..]
            .find('\n')
            .map(|i| after_fence + i + 1)
            .unwrap_or(after_fence);
        if let Some(end) = text[body_start..].find("```") {
            let content = text[body_start..body_start + end].trim();
            if content.starts_with('{') {
                return Ok(content);
            }
        }
    }

    // Bare object: scan for the matching close brace, skipping string contents
    if let Some(start) = text.find('{') {
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escape_next = false;

        for (offset, c) in text[start..].char_indices() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match c {
                '\\' if in_string => escape_next = true,
                '"' => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(&text[start..start + offset + 1]);
                    }
                }
                _ => {}
            }
        }
    }

    Err(Error::ParseError("No valid JSON found in response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_markdown() {
        let input = r#"Here's the analysis:
```json
{"summary": "A tool", "cool_facts": ["fast"]}
```
"#;
        let result = extract_json(input).unwrap();
        assert_eq!(result, r#"{"summary": "A tool", "cool_facts": ["fast"]}"#);
    }

    #[test]
    fn test_extract_raw_json_with_multibyte_text() {
        let input = r#"Résumé → {"summary": "Ünïcode {braces}", "cool_facts": ["naïve"]} done"#;
        let result = extract_json(input).unwrap();
        assert_eq!(
            result,
            r#"{"summary": "Ünïcode {braces}", "cool_facts": ["naïve"]}"#
        );
    }

    #[test]
    fn test_parse_rejects_missing_facts() {
        let err = parse_llm_response(r#"{"summary": "ok", "cool_facts": []}"#).unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }

    #[test]
    fn test_parse_rejects_plain_text() {
        assert!(parse_llm_response("I could not read the README.").is_err());
    }

    #[test]
    fn test_parse_normalizes_facts() {
        let analysis = parse_llm_response(
            r#"{"summary": "  An HTTP server  ", "cool_facts": ["a", "b", "c", "d", "e"]}"#,
        )
        .unwrap();
        assert_eq!(analysis.summary, "An HTTP server");
        assert_eq!(analysis.cool_facts, vec!["a", "b", "c", "d"]);
    }
}
