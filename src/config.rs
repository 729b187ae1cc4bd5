//! Terminal vocabularies as data
//!
//!     A grammar's operators and keywords are often easier to maintain in a file than in
//!     code. [TerminalsConfig] is the serialized form of a [Terminals] vocabulary and can be
//!     read from YAML or JSON:
//!
//!         operators: ["+", "-", "(", ")"]
//!         keywords: [select, from, where]
//!         case_insensitive: true
//!
//!     [GrammarRegistry] keeps such vocabularies by name. `defaults/grammars.yaml` is
//!     embedded into the crate and provides a few common ones (`sql`, `java`, `arithmetic`)
//!     through [GrammarRegistry::with_defaults].

use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::terminals::Terminals;

const DEFAULT_GRAMMARS: &str = include_str!("../defaults/grammars.yaml");

/// Failure to read or deserialize a vocabulary.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read vocabulary: {}", e),
            ConfigError::Yaml(e) => write!(f, "invalid YAML vocabulary: {}", e),
            ConfigError::Json(e) => write!(f, "invalid JSON vocabulary: {}", e),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Yaml(e) => Some(e),
            ConfigError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        ConfigError::Yaml(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Operators and keywords of a language; every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalsConfig {
    pub operators: Vec<String>,
    pub keywords: Vec<String>,
    pub case_insensitive: bool,
}

impl TerminalsConfig {
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads a `.json` file as JSON and anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&text),
            _ => Self::from_yaml(&text),
        }
    }

    pub fn build(&self) -> Terminals {
        let terminals = Terminals::operators(&self.operators);
        if self.case_insensitive {
            terminals.case_insensitive_keywords(&self.keywords)
        } else {
            terminals.keywords(&self.keywords)
        }
    }
}

/// Named vocabularies.
#[derive(Debug, Clone, Default)]
pub struct GrammarRegistry {
    grammars: HashMap<String, TerminalsConfig>,
}

impl GrammarRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the embedded default vocabularies.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        registry.load_yaml(DEFAULT_GRAMMARS)?;
        Ok(registry)
    }

    /// Registers every entry of a YAML mapping from name to vocabulary.
    pub fn load_yaml(&mut self, text: &str) -> Result<(), ConfigError> {
        let entries: BTreeMap<String, TerminalsConfig> = serde_yaml::from_str(text)?;
        for (name, config) in entries {
            self.register(name, config);
        }
        Ok(())
    }

    /// Registers `config` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, config: TerminalsConfig) {
        self.grammars.insert(name.into(), config);
    }

    pub fn get(&self, name: &str) -> Option<&TerminalsConfig> {
        self.grammars.get(name)
    }

    /// The vocabulary registered as `name`, built into [Terminals].
    pub fn terminals(&self, name: &str) -> Option<Terminals> {
        self.get(name).map(TerminalsConfig::build)
    }

    pub fn has(&self, name: &str) -> bool {
        self.grammars.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn list_all(&self) -> Vec<String> {
        let mut names: Vec<_> = self.grammars.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::scanners::whitespaces;
    use crate::token::Lexeme;

    #[test]
    fn test_yaml_and_json_agree() {
        let yaml = TerminalsConfig::from_yaml(
            "operators: ['+', '+=']\nkeywords: [let]\ncase_insensitive: true\n",
        )
        .unwrap();
        let json = TerminalsConfig::from_json(
            r#"{"operators": ["+", "+="], "keywords": ["let"], "case_insensitive": true}"#,
        )
        .unwrap();
        assert_eq!(yaml, json);
    }

    #[test]
    fn test_missing_fields_default() {
        let config = TerminalsConfig::from_yaml("keywords: [if]").unwrap();
        assert!(config.operators.is_empty());
        assert!(!config.case_insensitive);
    }

    #[test]
    fn test_invalid_document_is_reported() {
        let err = TerminalsConfig::from_json("{\"operators\": 3}").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().starts_with("invalid JSON vocabulary"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_build_honors_case_insensitivity() {
        let config = TerminalsConfig {
            operators: vec!["=".into()],
            keywords: vec!["let".into()],
            case_insensitive: true,
        };
        let terms = config.build();
        assert!(terms.is_case_insensitive());
        let lexer = terms.tokenizer().lexer(whitespaces().optional());
        let tokens = lexer.parse("LET x =").unwrap();
        assert_eq!(tokens[0].value, Lexeme::Reserved("let".into()));
        assert_eq!(tokens[1].value, Lexeme::Identifier("x".into()));
        assert_eq!(tokens[2].value, Lexeme::Reserved("=".into()));
    }

    #[test]
    fn test_default_registry() {
        let registry = GrammarRegistry::with_defaults().unwrap();
        assert_eq!(registry.list_all(), vec!["arithmetic", "java", "sql"]);
        assert!(registry.has("sql"));
        assert!(registry.get("sql").unwrap().case_insensitive);
        let java = registry.terminals("java").unwrap();
        assert_eq!(java.word("class"), Some(Lexeme::Reserved("class".into())));
        assert!(registry.terminals("cobol").is_none());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = GrammarRegistry::new();
        registry.register("calc", TerminalsConfig::default());
        registry.register(
            "calc",
            TerminalsConfig {
                operators: vec!["+".into()],
                ..Default::default()
            },
        );
        assert_eq!(registry.list_all(), vec!["calc"]);
        assert_eq!(registry.get("calc").unwrap().operators, vec!["+"]);
    }
}
