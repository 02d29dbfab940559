// crates/accolade-core/src/runtime/catalog.rs
// ============================================================================
// Module: Accolade Catalog
// Description: In-memory achievement catalog and its builder.
// Purpose: Parse achievement definitions into immutable catalog entries.
// Dependencies: accolade-relation, crate::core, crate::interfaces, time
// ============================================================================

//! ## Overview
//! [`CatalogBuilder`] accepts achievements in declaration order and rejects
//! anything the engine could not evaluate: unknown type labels, malformed
//! trigger strings, duplicate identifiers, and composite expressions that do
//! not parse. A composite expression may only reference achievements
//! declared before it, which keeps relation trees acyclic by construction.
//!
//! How expression tokens map to achievements is chosen by
//! [`TokenResolution`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use accolade_relation::RelationError;
use accolade_relation::RelationParser;
use accolade_relation::ValidationLimits;
use accolade_relation::validate_tree;
use time::Date;
use time::Time;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::core::Achievement;
use crate::core::AchievementDefinition;
use crate::core::AchievementId;
use crate::core::AchievementTrigger;
use crate::core::AchievementType;
use crate::core::ScoreRange;
use crate::core::TimeRange;
use crate::interfaces::Catalog;
use crate::interfaces::CatalogError;

// ============================================================================
// SECTION: Formats
// ============================================================================

/// Calendar date format for date triggers.
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
/// Time format with seconds.
const TIME_FORMAT_SECONDS: &[BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]:[second]");
/// Time format without seconds.
const TIME_FORMAT_MINUTES: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");

// ============================================================================
// SECTION: Token Resolution
// ============================================================================

/// Rule mapping composite expression tokens to earlier achievements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenResolution {
    /// Tokens are achievement identifiers.
    #[default]
    Identifier,
    /// Tokens are type labels (`date`, `score`, ...) naming the only earlier
    /// achievement of that type; other tokens fall back to identifiers.
    TypeLabel,
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Immutable in-memory catalog.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    /// Achievements in declaration order.
    achievements: Vec<Achievement>,
    /// Position of each achievement by identifier.
    index: BTreeMap<AchievementId, usize>,
}

impl InMemoryCatalog {
    /// Returns a builder using identifier resolution.
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Builds a catalog from definitions in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] for the first invalid definition.
    pub fn from_definitions<'a>(
        definitions: impl IntoIterator<Item = &'a AchievementDefinition>,
        resolution: TokenResolution,
    ) -> Result<Self, CatalogError> {
        let mut builder = CatalogBuilder::new().with_resolution(resolution);
        for definition in definitions {
            builder.add_definition(definition)?;
        }
        Ok(builder.build())
    }

    /// Returns the number of achievements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.achievements.len()
    }

    /// Returns true when the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.achievements.is_empty()
    }
}

impl Catalog for InMemoryCatalog {
    fn get(&self, id: &AchievementId) -> Option<&Achievement> {
        self.index.get(id).and_then(|position| self.achievements.get(*position))
    }

    fn all(&self) -> &[Achievement] {
        &self.achievements
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Validating catalog builder.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    /// Token resolution rule for composite expressions.
    resolution: TokenResolution,
    /// Expression parser.
    parser: RelationParser,
    /// Catalog under construction.
    catalog: InMemoryCatalog,
}

impl CatalogBuilder {
    /// Creates an empty builder using identifier resolution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the token resolution rule.
    #[must_use]
    pub const fn with_resolution(mut self, resolution: TokenResolution) -> Self {
        self.resolution = resolution;
        self
    }

    /// Adds a fully built achievement.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the identifier is taken, the trigger is
    /// invalid, the level bounds are inconsistent, or a composite relation
    /// references an achievement not declared earlier.
    pub fn add(&mut self, achievement: Achievement) -> Result<(), CatalogError> {
        let id = achievement.id.as_str();
        if id.trim().is_empty() {
            return Err(invalid(id, "identifier is empty"));
        }
        if self.catalog.index.contains_key(&achievement.id) {
            return Err(CatalogError::DuplicateId(id.to_string()));
        }
        achievement.trigger.validate().map_err(|message| CatalogError::InvalidTrigger {
            id: id.to_string(),
            message,
        })?;
        if achievement.max_level == 0 {
            return Err(invalid(id, "max level must be at least 1"));
        }
        if let Some(levels) = achievement.trigger.level_count()
            && levels != achievement.max_level
        {
            return Err(invalid(
                id,
                &format!("max level {} does not match {levels} trigger levels", achievement.max_level),
            ));
        }
        if let AchievementTrigger::Composite(relation) = &achievement.trigger {
            validate_tree(relation, ValidationLimits::default())
                .map_err(|kind| RelationError::new(id, kind))?;
            if let Some(missing) =
                relation.targets().into_iter().find(|target| !self.catalog.index.contains_key(*target))
            {
                return Err(CatalogError::UnknownDependency {
                    id: id.to_string(),
                    dependency: missing.to_string(),
                });
            }
        }
        let position = self.catalog.achievements.len();
        self.catalog.index.insert(achievement.id.clone(), position);
        self.catalog.achievements.push(achievement);
        Ok(())
    }

    /// Parses and adds a raw definition.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the type label, trigger strings, or
    /// composite expression are invalid, or when [`CatalogBuilder::add`]
    /// rejects the result.
    pub fn add_definition(&mut self, definition: &AchievementDefinition) -> Result<(), CatalogError> {
        let kind = AchievementType::parse(&definition.kind)?;
        let trigger = self.parse_trigger(kind, definition)?;
        let mut achievement = Achievement::new(definition.id.as_str(), trigger);
        if let Some(category) = &definition.category {
            achievement = achievement.with_category(category.as_str());
        }
        if let Some(max_level) = definition.max_level {
            achievement = achievement.with_max_level(max_level);
        }
        for event in &definition.events {
            achievement = achievement.with_event(event.as_str());
        }
        self.add(achievement)
    }

    /// Finishes the catalog.
    #[must_use]
    pub fn build(self) -> InMemoryCatalog {
        self.catalog
    }

    /// Parses the trigger strings of a definition.
    fn parse_trigger(
        &self,
        kind: AchievementType,
        definition: &AchievementDefinition,
    ) -> Result<AchievementTrigger, CatalogError> {
        let id = definition.id.as_str();
        let values = &definition.triggers;
        let bad = |message: String| CatalogError::InvalidTrigger {
            id: id.to_string(),
            message,
        };
        let trigger = match kind {
            AchievementType::Date => AchievementTrigger::Date(
                values
                    .iter()
                    .map(|raw| {
                        Date::parse(raw.trim(), DATE_FORMAT)
                            .map_err(|err| bad(format!("invalid date `{raw}`: {err}")))
                    })
                    .collect::<Result<_, _>>()?,
            ),
            AchievementType::Time => match values.as_slice() {
                [raw] => AchievementTrigger::Time(parse_time(raw).map_err(bad)?),
                _ => return Err(bad("time achievements take exactly one time".to_string())),
            },
            AchievementType::TimeRange => AchievementTrigger::TimeRange(
                values
                    .iter()
                    .map(|raw| {
                        let (start, end) = raw
                            .split_once('-')
                            .ok_or_else(|| bad(format!("time range `{raw}` is not `start-end`")))?;
                        Ok(TimeRange::new(
                            parse_time(start).map_err(bad)?,
                            parse_time(end).map_err(bad)?,
                        ))
                    })
                    .collect::<Result<_, CatalogError>>()?,
            ),
            AchievementType::Single => {
                if !values.is_empty() {
                    return Err(bad("single achievements take no trigger values".to_string()));
                }
                AchievementTrigger::Single
            }
            AchievementType::Score => AchievementTrigger::Score(
                values.iter().map(|raw| parse_score(raw).map_err(bad)).collect::<Result<_, _>>()?,
            ),
            AchievementType::ScoreRange => AchievementTrigger::ScoreRange(
                values
                    .iter()
                    .map(|raw| {
                        let (min, max) = raw
                            .split_once('-')
                            .ok_or_else(|| bad(format!("score range `{raw}` is not `min-max`")))?;
                        let (min, max) = (parse_score(min).map_err(bad)?, parse_score(max).map_err(bad)?);
                        ScoreRange::new(min, max)
                            .ok_or_else(|| bad(format!("score range `{raw}` has min above max")))
                    })
                    .collect::<Result<_, CatalogError>>()?,
            ),
            AchievementType::Composite => match values.as_slice() {
                [expression] => AchievementTrigger::Composite(self.parse_expression(id, expression)?),
                _ => return Err(bad("composite achievements take exactly one expression".to_string())),
            },
        };
        Ok(trigger)
    }

    /// Parses a composite expression against earlier achievements.
    fn parse_expression(
        &self,
        id: &str,
        expression: &str,
    ) -> Result<accolade_relation::Relation<AchievementId>, CatalogError> {
        let catalog = &self.catalog;
        let by_identifier = |token: &str| {
            let candidate = AchievementId::new(token);
            catalog.index.contains_key(&candidate).then_some(candidate)
        };
        let relation = match self.resolution {
            TokenResolution::Identifier => self.parser.parse(id, expression, &by_identifier)?,
            TokenResolution::TypeLabel => {
                let by_label = |token: &str| {
                    AchievementType::parse(token)
                        .ok()
                        .and_then(|kind| {
                            let mut matches =
                                catalog.achievements.iter().filter(|entry| entry.kind() == kind);
                            match (matches.next(), matches.next()) {
                                (Some(only), None) => Some(only.id.clone()),
                                _ => None,
                            }
                        })
                        .or_else(|| by_identifier(token))
                };
                self.parser.parse(id, expression, &by_label)?
            }
        };
        Ok(relation)
    }
}

/// Builds an invalid-definition error.
fn invalid(id: &str, message: &str) -> CatalogError {
    CatalogError::Invalid {
        id: id.to_string(),
        message: message.to_string(),
    }
}

/// Parses `HH:MM` or `HH:MM:SS`.
fn parse_time(raw: &str) -> Result<Time, String> {
    let trimmed = raw.trim();
    Time::parse(trimmed, TIME_FORMAT_SECONDS)
        .or_else(|_| Time::parse(trimmed, TIME_FORMAT_MINUTES))
        .map_err(|err| format!("invalid time `{trimmed}`: {err}"))
}

/// Parses a non-negative score.
fn parse_score(raw: &str) -> Result<u64, String> {
    let trimmed = raw.trim();
    trimmed.parse::<u64>().map_err(|err| format!("invalid score `{trimmed}`: {err}"))
}
