use std::{collections::BTreeMap, fmt, sync::Arc};

use once_cell::sync::Lazy;
use syntect::{
    dumps::from_uncompressed_data,
    parsing::{SyntaxReference, SyntaxSet},
};
use tracing::{debug, warn};

/// Tags registered by [`LanguageRegistry::builtin`]. Tags whose grammar is
/// missing from the syntax pack are skipped.
pub const DEFAULT_LANGUAGE_TAGS: &[&str] = &[
    "swift",
    "bash",
    "sh",
    "shell",
    "zsh",
    "yaml",
    "yml",
    "xml",
    "json",
    "rust",
    "ruby",
    "python",
    "py",
    "javascript",
    "js",
    "typescript",
    "ts",
    "toml",
    "diff",
    "markdown",
    "md",
    "html",
    "css",
    "sql",
    "c",
    "cpp",
    "java",
    "kotlin",
    "go",
    "dockerfile",
];

const CLASS_PREFIX: &str = "language-";

/// Immutable highlighting ruleset, identified by the syntect syntax name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grammar {
    name: String,
}

impl Grammar {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Declared language of a code block, e.g. `swift`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageTag(String);

impl LanguageTag {
    pub fn new(tag: impl Into<String>) -> Option<Self> {
        let tag = tag.into();
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == tag.len() {
            Some(Self(tag))
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// First word of a fenced block's info string (```` ```swift title=x ````).
    pub fn from_info_string(info: &str) -> Option<Self> {
        info.split_whitespace().next().and_then(Self::new)
    }

    /// Extract the tag from a `language-<tag>` token inside a class
    /// attribute. An absent class attribute means an absent tag.
    pub fn from_class(class: Option<&str>) -> Option<Self> {
        let class = class?;
        let start = class.find(CLASS_PREFIX)? + CLASS_PREFIX.len();
        let tag: String = class[start..]
            .chars()
            .take_while(|ch| ch.is_alphanumeric() || *ch == '_')
            .collect();
        Self::new(tag)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Mapping from language tag to grammar, backed by a syntect syntax set.
///
/// The registry is populated before the first render and shared read-only
/// afterwards; see [`language_registry`].
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    syntax_set: SyntaxSet,
    grammars: BTreeMap<String, Grammar>,
}

impl LanguageRegistry {
    /// Empty registry over the given syntaxes.
    pub fn new(syntax_set: SyntaxSet) -> Self {
        Self {
            syntax_set,
            grammars: BTreeMap::new(),
        }
    }

    /// Registry over the bundled syntax pack with [`DEFAULT_LANGUAGE_TAGS`].
    pub fn builtin() -> Self {
        let mut registry = Self::new(load_syntax_pack());
        for tag in DEFAULT_LANGUAGE_TAGS {
            match registry.grammar(tag) {
                Some(grammar) => registry.register(*tag, grammar),
                None => debug!(
                    target = "folio::render::languages",
                    tag, "no grammar in syntax pack; tag not registered"
                ),
            }
        }
        registry
    }

    /// Resolve a grammar from the syntax set by token, name or extension.
    pub fn grammar(&self, token: &str) -> Option<Grammar> {
        find_syntax(&self.syntax_set, token).map(|syntax| Grammar {
            name: syntax.name.clone(),
        })
    }

    /// Map `tag` to `grammar`. Registering the same pair again is a no-op;
    /// a different grammar replaces the previous one.
    pub fn register(&mut self, tag: impl Into<String>, grammar: Grammar) {
        self.grammars.insert(tag.into(), grammar);
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, tag: &str) -> Option<&Grammar> {
        self.grammars.get(tag)
    }

    /// Copy of this registry that only keeps the listed tags.
    pub fn restricted<'a>(&self, tags: impl IntoIterator<Item = &'a str>) -> Self {
        let mut restricted = Self::new(self.syntax_set.clone());
        for tag in tags {
            if let Some(grammar) = self.lookup(tag) {
                restricted.register(tag, grammar.clone());
            }
        }
        restricted
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.grammars.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }

    pub(crate) fn syntax_set(&self) -> &SyntaxSet {
        &self.syntax_set
    }

    pub(crate) fn syntax_for(&self, grammar: &Grammar) -> Option<&SyntaxReference> {
        self.syntax_set.find_syntax_by_name(grammar.name())
    }
}

static LANGUAGE_REGISTRY: Lazy<Arc<LanguageRegistry>> =
    Lazy::new(|| Arc::new(LanguageRegistry::builtin()));

/// Process-wide registry, initialised on first use and never mutated.
pub fn language_registry() -> Arc<LanguageRegistry> {
    Arc::clone(&LANGUAGE_REGISTRY)
}

fn load_syntax_pack() -> SyntaxSet {
    let syntax_bytes = include_bytes!(env!("SYNTAX_PACK_FILE"));
    match from_uncompressed_data(syntax_bytes) {
        Ok(syntax_set) => syntax_set,
        Err(err) => {
            warn!(
                target = "folio::render::languages",
                error = %err,
                "syntax pack unreadable; falling back to default syntaxes"
            );
            SyntaxSet::load_defaults_newlines()
        }
    }
}

fn find_syntax<'a>(syntax_set: &'a SyntaxSet, token: &str) -> Option<&'a SyntaxReference> {
    let lowercase = token.to_ascii_lowercase();
    syntax_set
        .find_syntax_by_token(&lowercase)
        .or_else(|| syntax_set.find_syntax_by_name(token))
        .or_else(|| syntax_set.find_syntax_by_extension(&lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults_registry() -> LanguageRegistry {
        LanguageRegistry::new(SyntaxSet::load_defaults_newlines())
    }

    #[test]
    fn builtin_registry_covers_article_languages() {
        let registry = language_registry();
        for tag in ["swift", "bash", "yaml", "xml"] {
            assert!(registry.lookup(tag).is_some(), "missing grammar for {tag}");
        }
        assert_eq!(registry.lookup("swift").map(Grammar::name), Some("Swift"));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let mut registry = defaults_registry();
        let grammar = registry.grammar("yaml").expect("yaml grammar");
        registry.register("yaml", grammar);

        assert!(registry.lookup("yaml").is_some());
        assert!(registry.lookup("YAML").is_none());
    }

    #[test]
    fn registering_same_pair_twice_is_stable() {
        let mut registry = defaults_registry();
        let grammar = registry.grammar("xml").expect("xml grammar");
        registry.register("xml", grammar.clone());
        registry.register("xml", grammar.clone());

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("xml"), Some(&grammar));
    }

    #[test]
    fn registering_different_grammar_overwrites() {
        let mut registry = defaults_registry();
        let xml = registry.grammar("xml").expect("xml grammar");
        let yaml = registry.grammar("yaml").expect("yaml grammar");
        registry.register("config", xml);
        registry.register("config", yaml.clone());

        assert_eq!(registry.lookup("config"), Some(&yaml));
    }

    #[test]
    fn unknown_tag_is_absent_not_an_error() {
        let registry = defaults_registry();
        assert!(registry.lookup("brainfuck").is_none());
        assert!(registry.grammar("definitely-not-a-language").is_none());
    }

    #[test]
    fn restricted_registry_keeps_only_listed_tags() {
        let restricted = language_registry().restricted(["bash", "nonexistent"]);
        assert_eq!(restricted.tags().collect::<Vec<_>>(), vec!["bash"]);
        assert!(restricted.lookup("swift").is_none());
    }

    #[test]
    fn tag_from_class_attribute() {
        assert_eq!(
            LanguageTag::from_class(Some("language-swift")),
            LanguageTag::new("swift")
        );
        assert_eq!(
            LanguageTag::from_class(Some("hljs language-yaml extra")),
            LanguageTag::new("yaml")
        );
        assert_eq!(LanguageTag::from_class(None), None);
        assert_eq!(LanguageTag::from_class(Some("")), None);
        assert_eq!(LanguageTag::from_class(Some("language-")), None);
        assert_eq!(LanguageTag::from_class(Some("codeBlock")), None);
    }

    #[test]
    fn tag_from_info_string_takes_first_word() {
        assert_eq!(
            LanguageTag::from_info_string("swift title=\"main.swift\""),
            LanguageTag::new("swift")
        );
        assert_eq!(LanguageTag::from_info_string("   "), None);
    }
}
