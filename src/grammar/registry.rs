//! Registry of solver variants.
//!
//! Built-in variants cover the solver logs seen so far. Field positions differ
//! between them (cost sits anywhere from segment 1 to segment 3), and so do the
//! selection markers; each observed layout is registered as its own variant
//! rather than normalised to a canonical one.

use crate::error::{Error, Result};
use crate::grammar::rule::{FieldRule, Metric};
use crate::grammar::variant::{GrammarSpec, RawGrammar};
use anyhow::Context;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const ELAPSED: &str = "elapsed: ";
const COST: &str = "cost: ";
const HANDLED: &str = "handled: ";
const EVAL: &str = "eval: ";
const TEMP: &str = "temp: ";

/// Top-level shape of a grammar file.
#[derive(Debug, Clone, Deserialize)]
pub struct GrammarFile {
    #[serde(default)]
    pub variants: Vec<RawGrammar>,
}

#[derive(Debug, Clone)]
pub struct Registry {
    variants: BTreeMap<String, GrammarSpec>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Registry {
    pub fn empty() -> Self {
        Self {
            variants: BTreeMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let variants = builtin_grammars()
            .into_iter()
            .map(|raw| {
                let g = GrammarSpec::from_raw(raw).expect("built-in grammar is valid");
                (g.name().to_string(), g)
            })
            .collect();
        Self { variants }
    }

    /// Look up the grammar for a solver variant.
    pub fn resolve(&self, variant: &str) -> Result<&GrammarSpec> {
        self.variants
            .get(variant)
            .ok_or_else(|| Error::UnknownVariant(variant.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.variants.keys().map(String::as_str)
    }

    pub fn grammars(&self) -> impl Iterator<Item = &GrammarSpec> + '_ {
        self.variants.values()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Merge variants from parsed grammar-file JSON. Names must be unique
    /// within one file; a name matching an existing variant replaces it.
    pub fn extend_from_json(&mut self, json: &str) -> Result<usize> {
        let file: GrammarFile = serde_json::from_str(json).map_err(|e| Error::InvalidGrammar {
            name: "<file>".into(),
            reason: e.to_string(),
        })?;

        let mut seen = BTreeSet::new();
        let mut parsed = Vec::with_capacity(file.variants.len());
        for raw in file.variants {
            if !seen.insert(raw.name.clone()) {
                return Err(Error::InvalidGrammar {
                    name: raw.name,
                    reason: "duplicate variant name in grammar file".into(),
                });
            }
            parsed.push(GrammarSpec::from_raw(raw)?);
        }

        let count = parsed.len();
        for g in parsed {
            if self.variants.contains_key(g.name()) {
                warn!("grammar file overrides variant {}", g.name());
            }
            self.variants.insert(g.name().to_string(), g);
        }
        Ok(count)
    }

    /// Merge variants from a grammar file on disk.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> anyhow::Result<usize> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("read grammar file {}", path.display()))?;
        let count = self
            .extend_from_json(&text)
            .with_context(|| format!("load grammar file {}", path.display()))?;
        debug!("loaded {} variant(s) from {}", count, path.display());
        Ok(count)
    }
}

fn grammar(
    name: &str,
    select: &[&str],
    cap: Option<usize>,
    fields: Vec<(Metric, FieldRule)>,
) -> RawGrammar {
    RawGrammar {
        name: name.to_string(),
        select: select.iter().map(|s| s.to_string()).collect(),
        cap,
        fields: fields.into_iter().collect(),
    }
}

fn builtin_grammars() -> Vec<RawGrammar> {
    vec![
        grammar(
            "hybrid-tabu",
            &["UPDATE"],
            None,
            vec![
                (Metric::Elapsed, FieldRule::float(ELAPSED, 0)),
                (Metric::Cost, FieldRule::integer(COST, 1)),
                (Metric::Handled, FieldRule::integer(HANDLED, 4)),
            ],
        ),
        grammar(
            "local-search",
            &["UPDATE"],
            None,
            vec![
                (Metric::Elapsed, FieldRule::float(ELAPSED, 0)),
                (Metric::Cost, FieldRule::integer(COST, 3)),
                (Metric::Handled, FieldRule::integer(HANDLED, 6)),
            ],
        ),
        // The naive baseline prints a short line per step; only the leading
        // window is interesting.
        grammar(
            "naive",
            &["elapsed", "UPDATE"],
            Some(100),
            vec![
                (Metric::Elapsed, FieldRule::float(ELAPSED, 0)),
                (Metric::Handled, FieldRule::integer(HANDLED, 1)),
                (Metric::Cost, FieldRule::integer(COST, 2)),
            ],
        ),
        grammar(
            "simulated-annealing",
            &["X", "UPDATE"],
            None,
            vec![
                (Metric::Elapsed, FieldRule::float(ELAPSED, 0)),
                (Metric::Cost, FieldRule::integer(COST, 1)),
                (Metric::Handled, FieldRule::integer(HANDLED, 4)),
                (Metric::Eval, FieldRule::float(EVAL, 5)),
            ],
        ),
        grammar(
            "simulated-annealing-temp",
            &["X", "UPDATE"],
            None,
            vec![
                (Metric::Elapsed, FieldRule::float(ELAPSED, 0)),
                (Metric::Cost, FieldRule::integer(COST, 1)),
                (Metric::Handled, FieldRule::integer(HANDLED, 4)),
                (Metric::Eval, FieldRule::float(EVAL, 5)),
                (Metric::Temperature, FieldRule::float(TEMP, 7)),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_builtin_grammar_validates() {
        let raw = builtin_grammars();
        let expected = raw.len();
        for r in raw {
            let name = r.name.clone();
            assert!(GrammarSpec::from_raw(r).is_ok(), "built-in {} invalid", name);
        }
        assert_eq!(Registry::builtin().len(), expected);
    }

    #[test]
    fn resolves_known_variants() {
        let reg = Registry::builtin();
        let names: Vec<&str> = reg.names().collect();
        assert_eq!(
            names,
            vec![
                "hybrid-tabu",
                "local-search",
                "naive",
                "simulated-annealing",
                "simulated-annealing-temp",
            ]
        );

        let ls = reg.resolve("local-search").unwrap();
        assert_eq!(ls.rule(Metric::Cost), Some(&FieldRule::integer(COST, 3)));
        assert_eq!(ls.rule(Metric::Handled).map(|r| r.position), Some(6));

        let naive = reg.resolve("naive").unwrap();
        assert_eq!(naive.default_cap(), Some(100));
        assert!(naive.selects("elapsed: 1.0, handled: 2, cost: 3"));
    }

    #[test]
    fn unknown_variant_is_an_error() {
        let reg = Registry::builtin();
        match reg.resolve("ant-colony") {
            Err(Error::UnknownVariant(name)) => assert_eq!(name, "ant-colony"),
            other => panic!("expected UnknownVariant, got {:?}", other),
        }
    }

    #[test]
    fn extends_from_json_and_overrides() {
        let mut reg = Registry::builtin();
        let before = reg.len();
        let json = r#"{
            "variants": [
                {
                    "name": "genetic",
                    "select": ["GEN"],
                    "cap": 10,
                    "fields": {
                        "elapsed": { "marker": "t=", "position": 2, "kind": "float" },
                        "cost":    { "marker": "c=", "position": 0, "kind": "integer" },
                        "handled": { "marker": "h=", "position": 1, "kind": "integer" }
                    }
                },
                {
                    "name": "naive",
                    "select": ["STEP"],
                    "fields": {
                        "elapsed": { "marker": "elapsed: ", "position": 0, "kind": "float" },
                        "cost":    { "marker": "cost: ",    "position": 1, "kind": "integer" },
                        "handled": { "marker": "handled: ", "position": 2, "kind": "integer" }
                    }
                }
            ]
        }"#;
        assert_eq!(reg.extend_from_json(json).unwrap(), 2);
        assert_eq!(reg.len(), before + 1);

        let genetic = reg.resolve("genetic").unwrap();
        assert_eq!(genetic.default_cap(), Some(10));
        assert_eq!(genetic.rule(Metric::Elapsed).map(|r| r.position), Some(2));

        let naive = reg.resolve("naive").unwrap();
        assert_eq!(naive.select_markers(), ["STEP".to_string()]);
        assert_eq!(naive.default_cap(), None);
    }

    #[test]
    fn rejects_duplicate_names_in_one_file() {
        let entry = r#"{ "name": "dup", "select": ["U"], "fields": {
            "elapsed": { "marker": "e", "position": 0, "kind": "float" },
            "cost": { "marker": "c", "position": 1, "kind": "integer" },
            "handled": { "marker": "h", "position": 2, "kind": "integer" } } }"#;
        let json = format!(r#"{{ "variants": [{}, {}] }}"#, entry, entry);
        let mut reg = Registry::empty();
        let err = reg.extend_from_json(&json).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
        assert!(reg.is_empty());
    }

    #[test]
    fn rejects_rule_without_position() {
        let json = r#"{ "variants": [ { "name": "bad", "select": ["U"], "fields": {
            "elapsed": { "marker": "e", "kind": "float" } } } ] }"#;
        let mut reg = Registry::empty();
        assert!(matches!(
            reg.extend_from_json(json),
            Err(Error::InvalidGrammar { .. })
        ));
    }

    #[test]
    fn load_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grammars.json");
        std::fs::write(
            &path,
            r#"{ "variants": [ { "name": "disk", "select": ["D"], "fields": {
                "elapsed": { "marker": "e:", "position": 0, "kind": "float" },
                "cost": { "marker": "c:", "position": 1, "kind": "integer" },
                "handled": { "marker": "h:", "position": 2, "kind": "integer" } } } ] }"#,
        )
        .unwrap();

        let mut reg = Registry::empty();
        assert_eq!(reg.load_file(&path).unwrap(), 1);
        assert!(reg.resolve("disk").is_ok());

        let missing = reg.load_file(dir.path().join("nope.json")).unwrap_err();
        assert!(format!("{:#}", missing).contains("read grammar file"));
    }
}
