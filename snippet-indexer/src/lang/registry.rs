//! Grammar registry: reusable tree-sitter parser handles per language.
//!
//! Parser handles are created lazily on first use and pooled for the life of
//! the registry. Handles are not `Sync`, so the pool hands out exclusive
//! access per parse call: `with_parser` pops a pooled handle (or creates one),
//! runs the closure, and returns the handle afterwards, capped by the
//! configured pool size. Creation is serialized by the pool lock; steady-state
//! lookups only pop from a per-language vector.

use super::Language;
use crate::errors::{Error, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;
use tree_sitter::Parser;

pub struct GrammarRegistry {
    max_pool_per_language: usize,
    pools: Mutex<HashMap<Language, Vec<Parser>>>,
}

impl GrammarRegistry {
    pub fn new(max_pool_per_language: usize) -> Self {
        Self {
            max_pool_per_language: max_pool_per_language.max(1),
            pools: Mutex::new(HashMap::new()),
        }
    }

    /// Run `f` with exclusive access to a parser configured for `lang`.
    ///
    /// The handle is taken from the pool when available and returned to it
    /// afterwards; excess handles beyond the cap are dropped.
    pub fn with_parser<T>(&self, lang: Language, f: impl FnOnce(&mut Parser) -> T) -> Result<T> {
        let pooled = {
            let mut pools = self.pools.lock().expect("grammar pool poisoned");
            pools.get_mut(&lang).and_then(Vec::pop)
        };

        let mut parser = match pooled {
            Some(p) => p,
            None => {
                debug!(language = %lang, "creating parser handle");
                new_parser(lang)?
            }
        };

        let out = f(&mut parser);

        let mut pools = self.pools.lock().expect("grammar pool poisoned");
        let pool = pools.entry(lang).or_default();
        if pool.len() < self.max_pool_per_language {
            pool.push(parser);
        }

        Ok(out)
    }

    /// Number of currently pooled handles for a language (test hook).
    pub fn pooled(&self, lang: Language) -> usize {
        self.pools
            .lock()
            .expect("grammar pool poisoned")
            .get(&lang)
            .map_or(0, Vec::len)
    }
}

fn new_parser(lang: Language) -> Result<Parser> {
    let mut parser = Parser::new();
    parser
        .set_language(&grammar(lang))
        .map_err(|_| Error::LanguageUnavailable(lang.as_str()))?;
    Ok(parser)
}

fn grammar(lang: Language) -> tree_sitter::Language {
    match lang {
        Language::Python => tree_sitter_python::LANGUAGE.into(),
        Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        Language::Java => tree_sitter_java::LANGUAGE.into(),
        Language::Go => tree_sitter_go::LANGUAGE.into(),
        Language::C => tree_sitter_c::LANGUAGE.into(),
        Language::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        Language::Kotlin => tree_sitter_kotlin_ng::LANGUAGE.into(),
        Language::Lua => tree_sitter_lua::LANGUAGE.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_pooled_and_reused() {
        let registry = GrammarRegistry::new(4);
        assert_eq!(registry.pooled(Language::Python), 0);

        registry
            .with_parser(Language::Python, |parser| {
                assert!(parser.parse("x = 1\n", None).is_some());
            })
            .unwrap();
        assert_eq!(registry.pooled(Language::Python), 1);

        // Second use pops the pooled handle and puts it back.
        registry
            .with_parser(Language::Python, |parser| {
                assert!(parser.parse("y = 2\n", None).is_some());
            })
            .unwrap();
        assert_eq!(registry.pooled(Language::Python), 1);
    }

    #[test]
    fn pool_cap_is_enforced() {
        let registry = GrammarRegistry::new(1);
        // Nested use forces a second handle; only one survives release.
        registry
            .with_parser(Language::Go, |_outer| {
                registry
                    .with_parser(Language::Go, |inner| {
                        assert!(inner.parse("package main\n", None).is_some());
                    })
                    .unwrap();
            })
            .unwrap();
        assert_eq!(registry.pooled(Language::Go), 1);
    }
}
