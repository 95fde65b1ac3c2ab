//! In-memory rule book: the create / update / evaluate / combine flows a
//! rule service runs around the engine. Rule text is parsed on every
//! write and stored in canonical form; nothing outlives the value.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use slog::{debug, info, o, Logger};
use thiserror::Error;

use crate::ast::Node;
use crate::combine::combine;
use crate::error::RuleError;
use crate::eval::{evaluate_logged, DataRecord};
use crate::parser::{parse_with, ParseOptions};
use crate::stats::UsageStats;
use crate::validate::Catalog;

#[derive(Debug, Error)]
pub enum BookError {
    #[error("Rule not found: {0}")]
    NotFound(String),

    #[error("Rule {0} is inactive")]
    Inactive(String),

    #[error("Invalid attribute(s): {}", .0.join(", "))]
    UnknownAttributes(Vec<String>),

    #[error(transparent)]
    Rule(#[from] RuleError),
}

#[derive(Debug, Clone, Default)]
pub struct BookConfig {
    pub parse: ParseOptions,
    /// When set, rules may only reference these attributes
    pub catalog: Option<Catalog>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rule_string: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRule {
    pub name: String,
    pub description: String,
    pub rule_string: String,
}

impl NewRule {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        rule_string: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            rule_string: rule_string.into(),
        }
    }
}

/// Partial update; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub rule_string: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub rule_id: String,
    pub result: bool,
}

pub struct RuleBook {
    logger: Logger,
    config: BookConfig,
    // creation order
    rules: Vec<RuleRecord>,
    stats: HashMap<String, UsageStats>,
    next_id: u64,
}

impl RuleBook {
    pub fn new(logger: &Logger, config: BookConfig) -> Self {
        Self {
            logger: logger.new(o!("component" => "rule_book")),
            config,
            rules: Vec::new(),
            stats: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn create(&mut self, rule: NewRule) -> Result<RuleRecord, BookError> {
        let node = self.compile(&rule.rule_string)?;
        let record = self.insert(rule.name, rule.description, &node);
        info!(self.logger, "created rule"; "id" => %record.id, "rule" => %record.rule_string);
        Ok(record)
    }

    pub fn get(&self, id: &str) -> Result<&RuleRecord, BookError> {
        self.rules
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| BookError::NotFound(id.to_string()))
    }

    pub fn list(&self) -> &[RuleRecord] {
        &self.rules
    }

    pub fn update(&mut self, id: &str, update: RuleUpdate) -> Result<RuleRecord, BookError> {
        let canonical = match &update.rule_string {
            Some(text) => Some(self.compile(text)?.to_string()),
            None => None,
        };

        let record = self
            .rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| BookError::NotFound(id.to_string()))?;

        if let Some(name) = update.name {
            record.name = name;
        }
        if let Some(description) = update.description {
            record.description = description;
        }
        if let Some(rule_string) = canonical {
            record.rule_string = rule_string;
        }
        if let Some(active) = update.active {
            record.active = active;
        }
        record.version += 1;
        record.updated_at = Utc::now();

        info!(self.logger, "updated rule"; "id" => id, "version" => record.version);
        Ok(record.clone())
    }

    pub fn delete(&mut self, id: &str) -> Result<RuleRecord, BookError> {
        let index = self
            .rules
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| BookError::NotFound(id.to_string()))?;
        self.stats.remove(id);
        info!(self.logger, "deleted rule"; "id" => id);
        Ok(self.rules.remove(index))
    }

    /// Evaluate a stored rule; inactive rules are refused
    pub fn evaluate(
        &mut self,
        id: &str,
        record: &DataRecord,
    ) -> Result<EvaluationOutcome, BookError> {
        let stored = self.get(id)?;
        if !stored.active {
            return Err(BookError::Inactive(id.to_string()));
        }
        let node = parse_with(&stored.rule_string, self.config.parse)?;

        let started = Instant::now();
        let logger = self.logger.new(o!("rule_id" => id.to_string()));
        let result = evaluate_logged(&logger, &node, record)?;
        self.stats
            .entry(id.to_string())
            .or_default()
            .record(result, started.elapsed());

        Ok(EvaluationOutcome {
            rule_id: id.to_string(),
            result,
        })
    }

    /// AND the given rules together, in order, and store the result as a
    /// new rule whose description lists where it came from
    pub fn combine<S: AsRef<str>>(
        &mut self,
        ids: &[S],
        name: Option<String>,
    ) -> Result<RuleRecord, BookError> {
        let nodes = ids
            .iter()
            .map(|id| -> Result<Node, BookError> {
                let stored = self.get(id.as_ref())?;
                Ok(parse_with(&stored.rule_string, self.config.parse)?)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let combined = combine(nodes)?;
        // stored text must stay readable under this book's nesting limit
        let combined = parse_with(&combined.to_string(), self.config.parse)?;

        let sources = ids.iter().map(|id| id.as_ref()).join(", ");
        let name = name.unwrap_or_else(|| format!("Combined rule ({})", sources));
        let description = format!("Combination of rules: {}", sources);
        let record = self.insert(name, description, &combined);

        info!(self.logger, "combined rules"; "id" => %record.id, "sources" => %sources);
        Ok(record)
    }

    pub fn stats(&self, id: &str) -> Option<&UsageStats> {
        self.stats.get(id)
    }

    fn compile(&self, text: &str) -> Result<Node, BookError> {
        let node = parse_with(text, self.config.parse)?;
        if let Some(catalog) = &self.config.catalog {
            let unknown = catalog.unknown_in(&node);
            if !unknown.is_empty() {
                debug!(self.logger, "rejected rule"; "rule" => text, "unknown" => ?unknown);
                return Err(BookError::UnknownAttributes(unknown));
            }
        }
        Ok(node)
    }

    fn insert(&mut self, name: String, description: String, node: &Node) -> RuleRecord {
        self.next_id += 1;
        let now = Utc::now();
        let record = RuleRecord {
            id: format!("rule-{}", self.next_id),
            name,
            description,
            rule_string: node.to_string(),
            created_at: now,
            updated_at: now,
            version: 1,
            active: true,
        };
        self.rules.push(record.clone());
        record
    }
}
