pub const SYSTEM_PROMPT: &str = r#"You summarize GitHub repositories from their README.

You must respond with valid JSON matching this exact schema:
{
    "summary": "string, a concise summary of the repository (max 500 characters)",
    "cool_facts": ["string, an interesting technical fact about the repository (max 200 characters)"]
}

Guidelines:
- Provide between 1 and 4 cool_facts
- Only state facts supported by the README
- Be informative but brief"#;

/// README text beyond this many characters is cut before prompting.
pub const MAX_README_CHARS: usize = 12_000;

pub fn readme_prompt(readme: &str) -> String {
    let mut content: String = readme.chars().take(MAX_README_CHARS).collect();
    if content.len() < readme.len() {
        content.push_str("\n... [truncated]");
    }

    format!(
        "Analyze the following GitHub repository README content and provide a concise summary and interesting facts.\n\
         Be informative but brief.\n\n\
         README Content:\n{}\n\n\
         Provide your analysis as JSON:\n",
        content
    )
}
