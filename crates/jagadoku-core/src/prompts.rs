//! Prompt templates for the advice requester
//!
//! A prompt file is YAML frontmatter followed by `# System` and `# User`
//! sections. The embedded copy is used unless a file with the same id exists
//! in `~/.local/share/jagadoku/prompts/overrides/`.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

const FINANCIAL_ADVICE: &str = include_str!("../../../prompts/financial_advice.md");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Ledger analysis producing summary, saving tips and investment advice
    FinancialAdvice,
}

impl PromptId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FinancialAdvice => "financial_advice",
        }
    }

    fn embedded(&self) -> &'static str {
        match self {
            Self::FinancialAdvice => FINANCIAL_ADVICE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    pub id: String,
    /// Bumped whenever the wording changes
    pub version: u32,
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub metadata: PromptMetadata,
    pub body: String,
    /// File the prompt was read from, `None` for the embedded copy
    pub source: Option<PathBuf>,
}

impl Prompt {
    /// Parse `---`-delimited frontmatter and the body after it
    pub fn parse(raw: &str, source: Option<PathBuf>) -> Result<Self> {
        let rest = raw
            .trim_start()
            .strip_prefix("---")
            .ok_or_else(|| Error::InvalidData("Prompt must start with YAML frontmatter".into()))?;
        let (frontmatter, body) = rest
            .split_once("\n---")
            .ok_or_else(|| Error::InvalidData("Prompt frontmatter is not closed".into()))?;

        let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
            .map_err(|e| Error::InvalidData(format!("Invalid prompt frontmatter: {}", e)))?;

        Ok(Self {
            metadata,
            body: body.trim().to_string(),
            source,
        })
    }

    pub fn is_override(&self) -> bool {
        self.source.is_some()
    }

    pub fn system_section(&self) -> Option<&str> {
        section(&self.body, "# System")
    }

    /// User section with variables filled in; the whole body if there is no `# User`
    pub fn render_user(&self, vars: &HashMap<&str, &str>) -> String {
        render(section(&self.body, "# User").unwrap_or(&self.body), vars)
    }
}

/// Loads prompts once and keeps them
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    loaded: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    pub fn new() -> Self {
        Self::with_override_dir(default_prompts_dir())
    }

    /// Embedded prompts only
    pub fn embedded_only() -> Self {
        Self::with_override_dir(None)
    }

    pub fn with_override_dir(dir: Option<PathBuf>) -> Self {
        Self {
            override_dir: dir,
            loaded: HashMap::new(),
        }
    }

    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        if !self.loaded.contains_key(&id) {
            let prompt = self.load(id)?;
            self.loaded.insert(id, prompt);
        }
        self.loaded
            .get(&id)
            .ok_or_else(|| Error::NotFound(format!("Prompt {}", id.as_str())))
    }

    fn load(&self, id: PromptId) -> Result<Prompt> {
        let path = self
            .override_dir
            .as_ref()
            .map(|d| d.join(format!("{}.md", id.as_str())))
            .filter(|p| p.is_file());

        match path {
            Some(path) => {
                debug!(path = %path.display(), "Using prompt override");
                let raw = fs::read_to_string(&path)?;
                Prompt::parse(&raw, Some(path))
            }
            None => Prompt::parse(id.embedded(), None),
        }
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("jagadoku").join("prompts").join("overrides"))
}

/// Text under `header` up to the next top-level header
fn section<'a>(body: &'a str, header: &str) -> Option<&'a str> {
    let after = &body[body.find(header)? + header.len()..];
    let end = after.find("\n# ").unwrap_or(after.len());
    Some(after[..end].trim())
}

/// Fill `{{var}}` placeholders.
///
/// `{{#if var}}...{{/if}}` keeps its content only when `var` is set and
/// non-empty. Blocks do not nest.
fn render(template: &str, vars: &HashMap<&str, &str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some((before, after)) = rest.split_once("{{#if ") {
        let Some((name, tail)) = after.split_once("}}") else {
            break;
        };
        let Some((block, tail)) = tail.split_once("{{/if}}") else {
            break;
        };
        out.push_str(before);
        if vars.get(name.trim()).is_some_and(|v| !v.is_empty()) {
            out.push_str(block);
        }
        rest = tail;
    }
    out.push_str(rest);

    vars.iter().fold(out, |text, (key, value)| {
        text.replace(&format!("{{{{{}}}}}", key), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>(pairs: &[(&'a str, &'a str)]) -> HashMap<&'a str, &'a str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_parse() {
        let raw = "---\nid: test_prompt\nversion: 2\ntask_type: reasoning\n---\n\n# System\nBe brief.\n\n# User\nHello {{name}}.\n";
        let prompt = Prompt::parse(raw, None).unwrap();
        assert_eq!(prompt.metadata.id, "test_prompt");
        assert_eq!(prompt.metadata.version, 2);
        assert_eq!(prompt.system_section(), Some("Be brief."));
        assert_eq!(prompt.render_user(&vars(&[("name", "Sari")])), "Hello Sari.");
        assert!(!prompt.is_override());
    }

    #[test]
    fn test_parse_requires_frontmatter() {
        assert!(Prompt::parse("# User\nhello", None).is_err());
        assert!(Prompt::parse("---\nid: x\n# User", None).is_err());
    }

    #[test]
    fn test_section_bounds() {
        let body = "# System\nSystem text.\n\n# User\nUser text.";
        assert_eq!(section(body, "# System"), Some("System text."));
        assert_eq!(section(body, "# User"), Some("User text."));
        assert_eq!(section(body, "# Missing"), None);
    }

    #[test]
    fn test_conditional_blocks() {
        let template = "Start{{#if summary}}\nRingkasan: {{summary}}{{/if}}\nEnd";

        let with = render(template, &vars(&[("summary", "sehat")]));
        assert_eq!(with, "Start\nRingkasan: sehat\nEnd");

        let without = render(template, &HashMap::new());
        assert_eq!(without, "Start\nEnd");

        let blank = render(template, &vars(&[("summary", "")]));
        assert_eq!(blank, "Start\nEnd");
    }

    #[test]
    fn test_financial_advice_renders_ledger() {
        let mut lib = PromptLibrary::embedded_only();
        let prompt = lib.get(PromptId::FinancialAdvice).unwrap();
        assert_eq!(prompt.metadata.id, PromptId::FinancialAdvice.as_str());

        let user = prompt.render_user(&vars(&[
            ("transactions", r#"[{"amount":250000}]"#),
            ("goals", "[]"),
        ]));

        assert!(user.contains(r#"Data Transaksi: [{"amount":250000}]"#));
        assert!(user.contains("Tujuan Menabung: []"));
        assert!(user.contains("Bahasa Indonesia"));
        assert!(!user.contains("{{"));
        assert!(prompt.system_section().unwrap().contains("investmentAdvice"));
    }

    #[test]
    fn test_override_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("financial_advice.md"),
            "---\nid: financial_advice\nversion: 9\n---\n# User\nCustom {{goals}}",
        )
        .unwrap();

        let mut lib = PromptLibrary::with_override_dir(Some(dir.path().to_path_buf()));
        let prompt = lib.get(PromptId::FinancialAdvice).unwrap();
        assert!(prompt.is_override());
        assert_eq!(prompt.metadata.version, 9);
        assert_eq!(prompt.render_user(&vars(&[("goals", "[]")])), "Custom []");
    }
}
