// crates/accolade-core/tests/controller.rs
// ============================================================================
// Test Module: Controller
// Coverage: Trigger flow, idempotent unlocks, high scores, localization.
// ============================================================================
//! ## Overview
//! Controller tests against a finder that reports every listening
//! achievement at level 1, so the controller's own guards are exercised
//! independently of any provider logic.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use accolade_core::Achievement;
use accolade_core::AchievementController;
use accolade_core::AchievementId;
use accolade_core::AchievementTrigger;
use accolade_core::AchievementTriggers;
use accolade_core::Catalog;
use accolade_core::CatalogBuilder;
use accolade_core::ControllerError;
use accolade_core::EngineAuditEvent;
use accolade_core::EngineAuditKind;
use accolade_core::EngineAuditSink;
use accolade_core::EventName;
use accolade_core::FindRequest;
use accolade_core::InMemoryCatalog;
use accolade_core::InMemoryScoreStore;
use accolade_core::InMemoryUnlockStore;
use accolade_core::Locale;
use accolade_core::LocalizationError;
use accolade_core::MessageBundle;
use accolade_core::OwnerId;
use accolade_core::ProviderError;
use accolade_core::ScoreChangedEvent;
use accolade_core::StaticBundleSource;
use accolade_core::TriggerRequest;
use accolade_core::UnlockFinder;
use accolade_core::UnlockedEvent;
use accolade_core::UnlockedEventFactory;
use support::TestResult;
use support::ensure;

// ========================================================================
// Fixtures
// ========================================================================

/// Finder reporting every listening achievement at level 1.
struct ListeningFinder {
    /// Shared catalog.
    catalog: Arc<InMemoryCatalog>,
    /// Shared factory.
    factory: Arc<UnlockedEventFactory>,
}

impl ListeningFinder {
    /// Builds a level-1 event for `achievement`.
    fn event(&self, achievement: &Achievement, owners: &BTreeSet<OwnerId>) -> UnlockedEvent {
        self.factory.create_event(achievement, 1, None, owners.clone())
    }
}

impl UnlockFinder for ListeningFinder {
    fn find_all(&self) -> Result<Vec<UnlockedEvent>, ProviderError> {
        Ok(self.catalog.all().iter().map(|entry| self.event(entry, &BTreeSet::new())).collect())
    }

    fn find_unlockables(&self, request: &FindRequest) -> Result<Vec<UnlockedEvent>, ProviderError> {
        Ok(self
            .catalog
            .by_event(&request.event)
            .into_iter()
            .map(|entry| self.event(entry, &request.owners))
            .collect())
    }

    fn unlockable(
        &self,
        id: &AchievementId,
        _value: Option<u64>,
    ) -> Result<Option<UnlockedEvent>, ProviderError> {
        let entry =
            self.catalog.get(id).ok_or_else(|| ProviderError::UnknownAchievement(id.to_string()))?;
        Ok(Some(self.event(entry, &BTreeSet::new())))
    }
}

/// Audit sink keeping every record.
#[derive(Default)]
struct MemorySink {
    /// Recorded events.
    events: Mutex<Vec<EngineAuditKind>>,
}

impl EngineAuditSink for MemorySink {
    fn record(&self, event: &EngineAuditEvent) {
        self.events.lock().unwrap().push(event.kind.clone());
    }
}

/// Controller type under test.
type Controller =
    AchievementController<ListeningFinder, Arc<InMemoryCatalog>, InMemoryScoreStore, InMemoryUnlockStore>;

/// Test harness with captured notifications.
struct Harness {
    /// Controller under test.
    controller: Controller,
    /// Unlock notifications in publication order.
    unlocked: Arc<Mutex<Vec<String>>>,
    /// Score notifications in publication order.
    scores: Arc<Mutex<Vec<(String, u64)>>>,
    /// Audit records.
    audit: Arc<MemorySink>,
}

/// Builds a harness over `single` achievements listening to `login`, one
/// multi-level achievement, and an idle achievement.
fn harness() -> TestResult<Harness> {
    let mut builder = CatalogBuilder::new();
    builder.add(Achievement::new("first_login", AchievementTrigger::Single).with_event("login"))?;
    builder.add(Achievement::new("greeter", AchievementTrigger::Single).with_event("login"))?;
    builder.add(Achievement::new("veteran", AchievementTrigger::Single).with_max_level(3))?;
    let catalog = Arc::new(builder.build());
    let factory = Arc::new(UnlockedEventFactory::new());
    let finder = ListeningFinder {
        catalog: Arc::clone(&catalog),
        factory: Arc::clone(&factory),
    };
    let audit = Arc::new(MemorySink::default());
    let bundles = StaticBundleSource::new()
        .with_bundle(
            "messages",
            MessageBundle::new(None).with_message("greeter.title", "Greeter"),
        )
        .with_bundle(
            "messages",
            MessageBundle::new(Some(Locale::parse("fr")?)).with_message("greeter.title", "Hôte"),
        );
    let controller = AchievementController::new(
        finder,
        catalog,
        InMemoryScoreStore::new(),
        InMemoryUnlockStore::new(),
        factory,
    )
    .with_audit_sink(Arc::clone(&audit) as Arc<dyn EngineAuditSink>)
    .with_bundle_source(Arc::new(bundles));

    let unlocked = Arc::new(Mutex::new(Vec::new()));
    let unlocked_log = Arc::clone(&unlocked);
    controller.bus().subscribe_unlocked(Arc::new(move |event: &UnlockedEvent| {
        unlocked_log.lock().unwrap().push(format!("{}@{}", event.id, event.level));
    }));
    let scores = Arc::new(Mutex::new(Vec::new()));
    let score_log = Arc::clone(&scores);
    controller.bus().subscribe_score_changed(Arc::new(move |event: &ScoreChangedEvent| {
        score_log.lock().unwrap().push((event.event.to_string(), event.value));
    }));
    Ok(Harness {
        controller,
        unlocked,
        scores,
        audit,
    })
}

// ========================================================================
// Triggers
// ========================================================================

#[test]
fn trigger_increments_publishes_score_then_unlocks() -> TestResult {
    let harness = harness()?;
    let outcome = harness.controller.trigger_event(TriggerRequest::new("login").with_owner("ana"))?;
    ensure(outcome.score.value == 1, "counter incremented")?;
    ensure(outcome.unlocked.len() == 2, "both listeners unlocked")?;
    ensure(outcome.unlocked.iter().all(|event| event.owners.contains(&OwnerId::new("ana"))), "owners")?;
    ensure(*harness.scores.lock().unwrap() == [("login".to_string(), 1)], "score published")?;
    ensure(*harness.unlocked.lock().unwrap() == ["first_login@1", "greeter@1"], "catalog order")?;

    let audit = harness.audit.events.lock().unwrap();
    ensure(matches!(audit[0], EngineAuditKind::ScoreChanged { value: 1, .. }), "score audited first")?;
    ensure(audit.len() == 3, "one score and two unlock records")?;
    Ok(())
}

#[test]
fn repeated_trigger_never_republishes_unlocks() -> TestResult {
    let harness = harness()?;
    harness.controller.trigger_event(TriggerRequest::new("login"))?;
    let second = harness.controller.trigger_event(TriggerRequest::new("login"))?;
    ensure(second.unlocked.is_empty(), "nothing new")?;
    ensure(harness.unlocked.lock().unwrap().len() == 2, "exactly one event per achievement")?;
    ensure(harness.scores.lock().unwrap().len() == 2, "score always published")?;
    ensure(harness.controller.all_unlocked()?.len() == 2, "two records")?;
    Ok(())
}

#[test]
fn explicit_score_sets_the_counter() -> TestResult {
    let harness = harness()?;
    harness.controller.trigger_event(TriggerRequest::new("jump"))?;
    let outcome = harness.controller.trigger_event(TriggerRequest::new("jump").with_score(40))?;
    ensure(outcome.score.value == 40, "set, not incremented")?;
    ensure(harness.controller.current_score(&EventName::new("jump"))? == 40, "stored")?;
    ensure(outcome.unlocked.is_empty(), "no listeners")?;
    Ok(())
}

#[test]
fn high_score_at_or_below_stored_is_silent() -> TestResult {
    let harness = harness()?;
    let first = harness.controller.trigger_event_with_high_score("best", 50, BTreeSet::new())?;
    ensure(first.is_some_and(|outcome| outcome.score.value == 50), "first high score applied")?;
    for lower in [50, 10] {
        let outcome = harness.controller.trigger_event_with_high_score("best", lower, BTreeSet::new())?;
        ensure(outcome.is_none(), "no-op")?;
    }
    ensure(*harness.scores.lock().unwrap() == [("best".to_string(), 50)], "one publication")?;
    ensure(harness.controller.current_score(&EventName::new("best"))? == 50, "store untouched")?;
    Ok(())
}

// ========================================================================
// Manual Unlock
// ========================================================================

#[test]
fn manual_unlock_is_idempotent() -> TestResult {
    let harness = harness()?;
    let id = AchievementId::new("greeter");
    let first = harness.controller.unlock(&id, Some("manual".to_string()), BTreeSet::new())?;
    ensure(first.is_some_and(|event| event.trigger_value.as_deref() == Some("manual")), "unlocked")?;
    let second = harness.controller.unlock(&id, None, BTreeSet::new())?;
    ensure(second.is_none(), "second unlock is a no-op")?;
    ensure(*harness.unlocked.lock().unwrap() == ["greeter@1"], "published once")?;
    ensure(harness.controller.all_unlocked()?.len() == 1, "one record")?;
    Ok(())
}

#[test]
fn manual_unlock_advances_levels_up_to_max() -> TestResult {
    let harness = harness()?;
    let id = AchievementId::new("veteran");
    for _ in 0 .. 5 {
        harness.controller.unlock(&id, None, BTreeSet::new())?;
    }
    ensure(*harness.unlocked.lock().unwrap() == ["veteran@1", "veteran@2", "veteran@3"], "levels")?;
    ensure(harness.controller.is_unlocked_at(&id, 3)?, "max level reached")?;
    Ok(())
}

#[test]
fn manual_unlock_of_unknown_id_fails() -> TestResult {
    let harness = harness()?;
    let err = harness.controller.unlock(&AchievementId::new("ghost"), None, BTreeSet::new()).unwrap_err();
    ensure(matches!(err, ControllerError::UnknownAchievement(id) if id == "ghost"), "unknown id")
}

// ========================================================================
// Reconciliation
// ========================================================================

#[test]
fn check_and_unlock_skips_already_unlocked() -> TestResult {
    let harness = harness()?;
    harness.controller.unlock(&AchievementId::new("first_login"), None, BTreeSet::new())?;
    harness.unlocked.lock().unwrap().clear();

    let found = harness.controller.check_and_unlock()?;
    let ids: Vec<&str> = found.iter().map(|event| event.id.as_str()).collect();
    ensure(ids == ["greeter", "veteran"], "only new unlocks")?;
    ensure(harness.unlocked.lock().unwrap().len() == 2, "published per new unlock")?;
    ensure(harness.controller.check_and_unlock()?.is_empty(), "second sweep is quiet")?;
    Ok(())
}

#[test]
fn reset_clears_scores_and_unlocks() -> TestResult {
    let harness = harness()?;
    harness.controller.trigger_event(TriggerRequest::new("login").with_owner("ana"))?;
    ensure(harness.controller.all_by_owner(&OwnerId::new("ana"))?.len() == 2, "credited")?;
    harness.controller.reset()?;
    ensure(harness.controller.all_unlocked()?.is_empty(), "unlocks cleared")?;
    ensure(harness.controller.current_score(&EventName::new("login"))? == 0, "scores cleared")?;
    ensure(!harness.controller.is_unlocked(&AchievementId::new("greeter"))?, "locked again")?;
    let audit = harness.audit.events.lock().unwrap();
    ensure(audit.last() == Some(&EngineAuditKind::Reset), "reset audited")?;
    Ok(())
}

// ========================================================================
// Localization
// ========================================================================

#[test]
fn base_name_and_locale_localize_later_events() -> TestResult {
    let harness = harness()?;
    let id = AchievementId::new("greeter");
    harness.controller.set_internationalization_base_name("messages")?;
    ensure(harness.controller.resource_bundle().is_some(), "bundle loaded")?;
    harness.controller.set_locale(Locale::parse("fr")?)?;
    ensure(harness.controller.locale() == Locale::parse("fr")?, "locale switched")?;

    let event = harness.controller.unlock(&id, None, BTreeSet::new())?.unwrap();
    ensure(event.title == "Hôte", "french title")?;
    ensure(event.text == "greeter.text", "missing text keeps key")?;
    Ok(())
}

#[test]
fn missing_bundle_is_a_configuration_error() -> TestResult {
    let harness = harness()?;
    let err = harness.controller.set_internationalization_base_name("absent").unwrap_err();
    ensure(
        matches!(err, ControllerError::Localization(LocalizationError::MissingBundle { .. })),
        "missing bundle",
    )?;
    ensure(harness.controller.resource_bundle().is_none(), "no bundle installed")?;
    Ok(())
}

// ========================================================================
// Trigger Surface
// ========================================================================

/// Feeds triggers through the narrow capability only.
fn drive<T: AchievementTriggers>(engine: &T) -> Result<usize, T::Error> {
    let outcome = engine.trigger_event(TriggerRequest::new("login"))?;
    Ok(outcome.unlocked.len() + engine.check_all()?.len())
}

#[test]
fn controller_serves_the_trigger_capability() -> TestResult {
    let harness = harness()?;
    let unlocked = drive(&harness.controller)?;
    ensure(unlocked == 3, "two from the trigger, one from the sweep")?;
    ensure(harness.controller.get(&AchievementId::new("veteran")).is_some(), "query passthrough")?;
    ensure(harness.controller.all().len() == 3, "catalog passthrough")?;
    ensure(harness.controller.all_by_events().len() == 1, "one event key")?;
    Ok(())
}
