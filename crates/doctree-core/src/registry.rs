//! Parser and renderer registry
//!
//! A [`Registry`] is built once per run and passed by reference into the
//! pipeline. Parsers are keyed by file extension (without the dot),
//! renderers by name. Extension aliases map onto a canonical extension and
//! are resolved before every parser lookup.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::config::Config;
use crate::error::{ConfigError, ParseError, RenderError};
use crate::record::ParseOutput;
use crate::tree::DocTree;

/// Turns one source file into records
pub trait Parser: Send + Sync {
    fn parse(&self, path: &Path, config: &Config) -> Result<ParseOutput, ParseError>;
}

impl<F> Parser for F
where
    F: Fn(&Path, &Config) -> Result<ParseOutput, ParseError> + Send + Sync,
{
    fn parse(&self, path: &Path, config: &Config) -> Result<ParseOutput, ParseError> {
        self(path, config)
    }
}

/// Writes a resolved tree somewhere
pub trait Renderer: Send + Sync {
    fn render(&self, tree: &DocTree, config: &Config) -> Result<(), RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&DocTree, &Config) -> Result<(), RenderError> + Send + Sync,
{
    fn render(&self, tree: &DocTree, config: &Config) -> Result<(), RenderError> {
        self(tree, config)
    }
}

/// Registered parsers, renderers and extension aliases
#[derive(Default)]
pub struct Registry {
    parsers: HashMap<String, Box<dyn Parser>>,
    renderers: HashMap<String, Box<dyn Renderer>>,
    aliases: HashMap<String, String>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parsers: Vec<_> = self.parsers.keys().collect();
        parsers.sort();
        let mut renderers: Vec<_> = self.renderers.keys().collect();
        renderers.sort();
        f.debug_struct("Registry")
            .field("parsers", &parsers)
            .field("renderers", &renderers)
            .field("aliases", &self.aliases)
            .finish()
    }
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in record parsers and renderers
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.use_plugin(crate::parsers::register);
        registry.use_plugin(crate::render::register);
        registry
    }

    /// Register a parser for a file extension, replacing any previous one
    pub fn register_parser(&mut self, extension: &str, parser: impl Parser + 'static) {
        self.parsers.insert(normalize(extension), Box::new(parser));
    }

    /// Register a renderer under a name, replacing any previous one
    pub fn register_renderer(&mut self, name: &str, renderer: impl Renderer + 'static) {
        self.renderers.insert(name.to_string(), Box::new(renderer));
    }

    /// Route files with extension `alias` to the parser for `canonical`
    pub fn extension_alias(&mut self, alias: &str, canonical: &str) {
        self.aliases.insert(normalize(alias), normalize(canonical));
    }

    /// Apply a plugin. Plugins only ever add entries.
    pub fn use_plugin(&mut self, plugin: impl FnOnce(&mut Registry)) {
        plugin(self);
    }

    /// Register every `alias:extension` pair from the config
    pub fn apply_config(&mut self, config: &Config) -> Result<(), ConfigError> {
        for (alias, canonical) in config.alias_pairs()? {
            self.extension_alias(&alias, &canonical);
        }
        Ok(())
    }

    /// Canonical extension for an extension or alias
    pub fn canonical_extension<'a>(&'a self, extension: &'a str) -> &'a str {
        let mut current = extension;
        // bounded walk so alias loops terminate
        for _ in 0..=self.aliases.len() {
            match self.aliases.get(current) {
                Some(next) if next != current => current = next,
                _ => break,
            }
        }
        current
    }

    /// Parser for a file, by its (aliased) extension
    pub fn parser_for(&self, path: &Path) -> Option<&dyn Parser> {
        let extension = normalize(path.extension()?.to_str()?);
        let canonical = self.canonical_extension(&extension);
        self.parsers.get(canonical).map(|p| p.as_ref())
    }

    /// Whether some parser handles this file
    pub fn supports(&self, path: &Path) -> bool {
        self.parser_for(path).is_some()
    }

    /// Renderer by name
    pub fn renderer(&self, name: &str) -> Result<&dyn Renderer, ConfigError> {
        self.renderers
            .get(name)
            .map(|r| r.as_ref())
            .ok_or_else(|| ConfigError::UnknownRenderer(name.to_string()))
    }

    /// Registered extensions, sorted
    pub fn extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self
            .parsers
            .keys()
            .chain(self.aliases.keys())
            .map(String::as_str)
            .collect();
        extensions.sort_unstable();
        extensions.dedup();
        extensions
    }
}

fn normalize(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Record, RecordKind};

    fn stub(_: &Path, _: &Config) -> Result<ParseOutput, ParseError> {
        Ok(ParseOutput::from_records(vec![Record::new("Stub", RecordKind::Class)]))
    }

    #[test]
    fn test_parser_lookup_by_extension() {
        let mut registry = Registry::new();
        registry.register_parser(".js", stub);

        assert!(registry.supports(Path::new("lib/ajax.js")));
        assert!(registry.supports(Path::new("lib/AJAX.JS")));
        assert!(!registry.supports(Path::new("lib/ajax.css")));
        assert!(!registry.supports(Path::new("Makefile")));
    }

    #[test]
    fn test_alias_resolved_before_lookup() {
        let mut registry = Registry::new();
        registry.register_parser("js", stub);
        registry.extension_alias("mjs", "js");

        let parser = registry.parser_for(Path::new("mod.mjs")).unwrap();
        let output = parser.parse(Path::new("mod.mjs"), &Config::default()).unwrap();
        assert_eq!(output.records[0].id, "Stub");
        assert_eq!(registry.canonical_extension("mjs"), "js");
    }

    #[test]
    fn test_alias_loop_terminates() {
        let mut registry = Registry::new();
        registry.extension_alias("a", "b");
        registry.extension_alias("b", "a");
        assert!(registry.parser_for(Path::new("x.a")).is_none());
    }

    #[test]
    fn test_unknown_renderer() {
        let registry = Registry::new();
        assert!(matches!(
            registry.renderer("html"),
            Err(ConfigError::UnknownRenderer(name)) if name == "html"
        ));
    }

    #[test]
    fn test_plugin_registers_closures() {
        let mut registry = Registry::new();
        registry.use_plugin(|r: &mut Registry| {
            r.register_parser("txt", |_: &Path, _: &Config| -> Result<ParseOutput, ParseError> {
                Ok(ParseOutput::default())
            });
            r.register_renderer("null", |_: &DocTree, _: &Config| -> Result<(), RenderError> {
                Ok(())
            });
        });

        assert!(registry.supports(Path::new("notes.txt")));
        assert!(registry.renderer("null").is_ok());
    }

    #[test]
    fn test_config_aliases_applied() {
        let config = Config {
            aliases: vec!["cjs:json".into()],
            ..Config::default()
        };
        let mut registry = Registry::with_builtins();
        registry.apply_config(&config).unwrap();

        assert!(registry.supports(Path::new("records.cjs")));
        assert_eq!(registry.extensions(), vec!["cjs", "json", "toml"]);
        assert!(registry.renderer("json").is_ok());
    }
}
