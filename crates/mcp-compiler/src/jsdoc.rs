// crates/mcp-compiler/src/jsdoc.rs
// JSDoc block parsing and lookup

use crate::checker::Program;
use tree_sitter::Node;

/// A parsed `/** ... */` block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    /// Prose before the first tag, lines joined with `\n`
    pub description: Option<String>,
    pub tags: Vec<DocTag>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTag {
    pub name: String,
    /// Everything after the tag name, continuation lines included
    pub text: String,
}

impl DocComment {
    /// Parse raw comment text. Returns `None` unless it is a `/**` block.
    pub fn parse(raw: &str) -> Option<Self> {
        let body = raw.strip_prefix("/**")?;
        let body = body.strip_suffix("*/").unwrap_or(body);

        let mut prose: Vec<&str> = Vec::new();
        let mut tags: Vec<DocTag> = Vec::new();
        for line in body.lines() {
            let line = line.trim();
            let line = line.strip_prefix('*').unwrap_or(line).trim();

            if let Some(rest) = line.strip_prefix('@') {
                let name: String = rest.chars().take_while(|c| is_tag_char(*c)).collect();
                if !name.is_empty() {
                    let text = rest[name.len()..].trim().to_string();
                    tags.push(DocTag { name, text });
                    continue;
                }
            }

            match tags.last_mut() {
                Some(tag) => {
                    if !line.is_empty() {
                        if !tag.text.is_empty() {
                            tag.text.push('\n');
                        }
                        tag.text.push_str(line);
                    }
                }
                None => prose.push(line),
            }
        }

        let description = prose.join("\n").trim().to_string();
        Some(Self {
            description: (!description.is_empty()).then_some(description),
            tags,
        })
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }

    /// Text of the `@param` entry for `param`, if documented
    pub fn param_description(&self, param: &str) -> Option<&str> {
        self.tags
            .iter()
            .filter(|t| t.name == "param")
            .find_map(|t| {
                let (name, rest) = split_param(&t.text);
                (name == param).then_some(rest)
            })
            .filter(|d| !d.is_empty())
    }
}

fn is_tag_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Split `{type} [name=default] - description` into name and description
fn split_param(text: &str) -> (&str, &str) {
    let mut rest = text.trim_start();
    if rest.starts_with('{')
        && let Some(end) = rest.find('}')
    {
        rest = rest[end + 1..].trim_start();
    }

    let (raw_name, description) = match rest.find(char::is_whitespace) {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, ""),
    };
    let name = raw_name.trim_start_matches('[').trim_end_matches(']');
    let name = name.split('=').next().unwrap_or(name);

    let description = description.trim_start();
    let description = description.strip_prefix('-').unwrap_or(description);
    (name, description.trim())
}

/// Nearest `/** */` block attached to `node`.
/// Plain comments in between are skipped; any other sibling ends the search.
pub fn leading_doc_comment(program: &Program, node: Node) -> Option<DocComment> {
    let mut sib = node.prev_sibling();
    while let Some(n) = sib {
        if n.kind() == "comment" {
            let text = program.text(n);
            if text.starts_with("/**") {
                return DocComment::parse(text);
            }
        } else if n.is_named() {
            break;
        }
        sib = n.prev_sibling();
    }
    None
}
