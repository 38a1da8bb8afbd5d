//! System directives and prompt assembly for each operation.

use sitesmith_core::artifact::{Locale, SourceFile};

pub const SITE_SYSTEM_INSTRUCTION: &str = r#"You are Sitesmith, a senior web architect.
Build world-class, responsive multi-page websites with a modern UI (glassmorphism, Tailwind via CDN is allowed).

OUTPUT FORMAT: RAW JSON ONLY, no prose and no Markdown fences:
{"files":[{"name":"index.html","type":"html","content":"..."}],"language":"id|tet|en|pt"}

Rules:
- Always include index.html.
- "type" is one of html, css, js, json.
- Reference stylesheets with <link rel="stylesheet" href="style.css"> and scripts with <script src="app.js"></script>.
- Link between pages with relative .html hrefs.
- When updating an existing site, return every file, not only the changed ones."#;

pub const CHAT_SYSTEM_INSTRUCTION: &str =
    "You are the Sitesmith assistant. Answer questions about building and editing websites. Keep answers concise.";

const TUTOR_SYSTEM_INSTRUCTION: &str = r#"You are the Sitesmith educator. The user wants help learning.
Reply with JSON only:
"chatResponse": one short sentence for the chat bubble.
"boardContent": detailed lesson material in Markdown for the board."#;

/// One-line instruction naming the language the output must be written in.
pub fn language_hint(locale: Locale) -> &'static str {
    match locale {
        Locale::Id => "Gunakan Bahasa Indonesia profesional.",
        Locale::Tet => "Uza Lia-Tetun formál.",
        Locale::Pt => "Use Português Europeu padrão.",
        Locale::En => "Use International English.",
    }
}

pub fn generate_prompt(prompt: &str, locale: Locale) -> String {
    format!("{}\n\nPROMPT: {}", language_hint(locale), prompt.trim())
}

/// Replays every current file as `name:\ncontent`, then the instruction.
pub fn refine_prompt(files: &[SourceFile], instruction: &str, locale: Locale) -> String {
    let context = files
        .iter()
        .map(|file| format!("{}:\n{}", file.name, file.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "{}\n\n{context}\n\nUPDATE: {}",
        language_hint(locale),
        instruction.trim()
    )
}

pub fn tutor_system_instruction(locale: Locale) -> String {
    format!("{TUTOR_SYSTEM_INSTRUCTION}\n\n{}", language_hint(locale))
}
