use crate::battle::RosterSink;
use crate::combatant::Combatant;
use crate::data::{get_species_data, gym_leader};
use crate::errors::{StoreError, StoreResult};
use crate::game_state::save::{GameSave, ModuleStats, MAX_TEAM_SIZE};
use crate::lrs::Cmi5Session;
use crate::persistence::{state_keys, Clock, PersistenceGateway, SaveScheduler};
use crate::progression::leveling::{target_level, xp_bonus, Milestone};
use schema::SpeciesKind;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, error, info, warn};

const MODULE_COUNT: usize = 8;
const GYM_COUNT: u8 = 8;
const ELITE_FOUR_SIZE: usize = 4;
const STARTER_LEVEL: u8 = 5;

/// Collaborators the store is handed rather than reaching for globals.
pub struct StoreDeps {
    pub gateway: PersistenceGateway,
    pub scheduler: SaveScheduler,
    pub clock: Box<dyn Clock>,
    pub session: Option<Rc<RefCell<Cmi5Session>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamPlacement {
    Team(usize),
    Storage(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelUp {
    pub slot: usize,
    pub name: String,
    pub from: u8,
    pub to: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GymReward {
    pub badge: String,
    pub score: u8,
    pub level_ups: Vec<LevelUp>,
}

/// Sole owner of the save document. Mutations schedule a debounced write;
/// milestones write immediately.
pub struct GameStateStore {
    save: GameSave,
    gateway: PersistenceGateway,
    scheduler: SaveScheduler,
    clock: Box<dyn Clock>,
    session: Option<Rc<RefCell<Cmi5Session>>>,
}

impl GameStateStore {
    pub fn new(deps: StoreDeps) -> Self {
        Self {
            save: GameSave::new(deps.clock.now()),
            gateway: deps.gateway,
            scheduler: deps.scheduler,
            clock: deps.clock,
            session: deps.session,
        }
    }

    /// Load the stored game, migrating it, or begin a fresh one.
    pub fn load(&mut self) -> &GameSave {
        let now = self.clock.now();
        self.save = match self.gateway.get_state(state_keys::GAME_STATE) {
            Some(document) => match GameSave::migrate(document, now) {
                Some(save) => {
                    info!("loaded existing game state");
                    save
                }
                None => GameSave::new(now),
            },
            None => {
                info!("created new game state");
                GameSave::new(now)
            }
        };
        &self.save
    }

    pub fn save(&self) -> &GameSave {
        &self.save
    }

    fn with_session(&self, report: impl FnOnce(&mut Cmi5Session)) {
        if let Some(session) = &self.session {
            report(&mut session.borrow_mut());
        }
    }

    fn write_now(&mut self) -> bool {
        self.save.updated_at = self.clock.now();
        let document = match serde_json::to_value(&self.save) {
            Ok(document) => document,
            Err(e) => {
                error!(error = %e, "failed to serialize game state");
                return false;
            }
        };
        let success = self.gateway.save_state(state_keys::GAME_STATE, &document);
        debug!(success, "game state saved");
        success
    }

    /// Write immediately, superseding any pending debounced write.
    pub fn force_save(&mut self) -> bool {
        self.scheduler.force();
        self.write_now()
    }

    fn schedule_save(&mut self) {
        self.scheduler.mark_dirty(self.clock.now());
    }

    pub fn has_pending_save(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Perform the pending debounced write if its quiet period has elapsed.
    pub fn flush_if_due(&mut self) -> bool {
        if self.scheduler.poll(self.clock.now()) {
            return self.write_now();
        }
        false
    }

    pub fn has_started(&self) -> bool {
        self.save.has_started()
    }

    pub fn player_name(&self) -> &str {
        &self.save.player.name
    }

    pub fn set_player_name(&mut self, name: &str) {
        self.save.player.name = name.to_string();
        self.schedule_save();
    }

    pub fn reset_game(&mut self) -> &GameSave {
        self.save = GameSave::new(self.clock.now());
        self.force_save();
        info!("game state reset");
        &self.save
    }

    /// Begin a new run with a level 5 starter.
    pub fn start_game(&mut self, starter: &str) -> StoreResult<Combatant> {
        let species = get_species_data(starter)?;
        if !matches!(species.kind, SpeciesKind::Starter) {
            return Err(StoreError::InvalidStarter(starter.to_string()));
        }

        let instance = Combatant::new(species, STARTER_LEVEL);
        self.save.player.started_at = Some(self.clock.now());
        self.save.player.starter_choice = Some(starter.to_string());
        self.save.team = vec![instance.clone()];
        self.save.progress.current_section = "module1".to_string();

        self.force_save();
        self.with_session(|session| session.started_game(starter));
        info!(starter, "game started");
        Ok(instance)
    }

    pub fn team(&self) -> &[Combatant] {
        &self.save.team
    }

    pub fn storage(&self) -> &[Combatant] {
        &self.save.storage
    }

    /// First member still able to battle.
    pub fn active_member(&self) -> Option<&Combatant> {
        self.save.team.iter().find(|member| !member.is_fainted())
    }

    pub fn add_to_team(&mut self, member: Combatant) -> TeamPlacement {
        let placement = if self.save.team.len() < MAX_TEAM_SIZE {
            self.save.team.push(member);
            TeamPlacement::Team(self.save.team.len() - 1)
        } else {
            self.save.storage.push(member);
            TeamPlacement::Storage(self.save.storage.len() - 1)
        };
        self.schedule_save();
        placement
    }

    /// Move a member to storage. The team always keeps at least one member.
    pub fn remove_from_team(&mut self, slot: usize) -> StoreResult<Combatant> {
        if slot >= self.save.team.len() {
            return Err(StoreError::InvalidSlot(slot));
        }
        if self.save.team.len() <= 1 {
            return Err(StoreError::LastMember);
        }
        let removed = self.save.team.remove(slot);
        self.save.storage.push(removed.clone());
        self.schedule_save();
        Ok(removed)
    }

    pub fn swap_team_member(&mut self, team_slot: usize, storage_slot: usize) -> StoreResult<()> {
        if team_slot >= self.save.team.len() {
            return Err(StoreError::InvalidSlot(team_slot));
        }
        if storage_slot >= self.save.storage.len() {
            return Err(StoreError::InvalidSlot(storage_slot));
        }
        std::mem::swap(
            &mut self.save.team[team_slot],
            &mut self.save.storage[storage_slot],
        );
        self.schedule_save();
        Ok(())
    }

    pub fn heal_team(&mut self) -> bool {
        for member in &mut self.save.team {
            member.heal_fully();
            debug!(name = %member.name, hp = member.current_hp, "healed");
        }
        self.force_save()
    }

    pub fn update_team_member_hp(&mut self, slot: usize, hp: u16) -> StoreResult<()> {
        let member = self
            .save
            .team
            .get_mut(slot)
            .ok_or(StoreError::InvalidSlot(slot))?;
        member.set_hp(hp);
        self.schedule_save();
        Ok(())
    }

    /// Pull the roster toward the gym's level band, scaled by the gym score.
    /// Unknown gyms change nothing.
    pub fn level_up_team(&mut self, gym: u8, score: u8) -> Vec<LevelUp> {
        let Some(band) = Milestone::Gym(gym).level_band() else {
            return Vec::new();
        };
        let bonus = xp_bonus(score);

        let mut level_ups = Vec::new();
        for (slot, member) in self.save.team.iter_mut().enumerate() {
            let target = target_level(member.level, band, bonus.multiplier);
            if target <= member.level {
                continue;
            }
            let species = match get_species_data(&member.name) {
                Ok(species) => species,
                Err(e) => {
                    warn!(name = %member.name, error = %e, "cannot level up unknown species");
                    continue;
                }
            };
            let from = member.level;
            member.level_up_to(species, target);
            info!(name = %member.name, from, to = target, bonus = bonus.label, "level up");
            level_ups.push(LevelUp {
                slot,
                name: member.name.clone(),
                from,
                to: target,
            });
        }

        self.schedule_save();
        level_ups
    }

    pub fn current_section(&self) -> &str {
        &self.save.progress.current_section
    }

    pub fn set_current_section(&mut self, section: &str) {
        self.save.progress.current_section = section.to_string();
        self.schedule_save();
    }

    pub fn is_module_completed(&self, module: u8) -> bool {
        self.save.progress.completed_modules.contains(&module)
    }

    pub fn complete_module(&mut self, module: u8, score: u8) {
        push_unique(&mut self.save.progress.completed_modules, module);

        let attempts = self
            .save
            .module_stats
            .get(&module)
            .map_or(0, |stats| stats.attempts)
            + 1;
        self.save.module_stats.insert(
            module,
            ModuleStats {
                score,
                completed_at: self.clock.now(),
                attempts,
            },
        );

        self.force_save();
        let completed = self.save.progress.completed_modules.len();
        let percent = (completed * 100 / MODULE_COUNT).min(100) as u8;
        self.with_session(|session| session.progressed(percent));
    }

    pub fn is_gym_completed(&self, gym: u8) -> bool {
        self.save.progress.completed_gyms.contains(&gym)
    }

    /// Award the gym's badge, level the roster, and move on to the catch
    /// phase (or the Elite Four after the last gym).
    pub fn complete_gym(&mut self, gym: u8, score: u8) -> StoreResult<GymReward> {
        let badge = gym_leader(gym)?.badge.clone();

        push_unique(&mut self.save.progress.completed_gyms, gym);
        if !self.save.progress.badges.contains(&badge) {
            self.save.progress.badges.push(badge.clone());
        }

        let level_ups = self.level_up_team(gym, score);

        self.save.progress.current_section = if gym < GYM_COUNT {
            format!("catch{}", gym)
        } else {
            "elite4".to_string()
        };

        self.force_save();
        self.with_session(|session| session.earned(&badge, score));
        info!(gym, badge = %badge, score, "gym completed");

        Ok(GymReward {
            badge,
            score,
            level_ups,
        })
    }

    pub fn completed_gyms(&self) -> &[u8] {
        &self.save.progress.completed_gyms
    }

    pub fn completed_gyms_count(&self) -> usize {
        self.save.progress.completed_gyms.len()
    }

    pub fn badges(&self) -> &[String] {
        &self.save.progress.badges
    }

    pub fn complete_catch_phase(&mut self, gym: u8) {
        push_unique(&mut self.save.progress.completed_catch_phases, gym);
        self.save.progress.current_section = format!("module{}", gym + 1);
        self.schedule_save();
    }

    pub fn is_catch_phase_complete(&self, gym: u8) -> bool {
        self.save.progress.completed_catch_phases.contains(&gym)
    }

    pub fn defeat_elite_four(&mut self, member: &str) {
        if !self
            .save
            .progress
            .elite_four_defeated
            .iter()
            .any(|id| id == member)
        {
            self.save.progress.elite_four_defeated.push(member.to_string());
        }
        self.force_save();
    }

    pub fn is_elite_four_complete(&self) -> bool {
        self.save.progress.elite_four_defeated.len() >= ELITE_FOUR_SIZE
    }

    pub fn defeat_rival(&mut self) {
        self.save.progress.rival_defeated = true;
        self.save.progress.is_champion = true;
        self.force_save();
        self.with_session(|session| {
            session.completed(100, true);
            session.passed(100);
        });
        info!("rival defeated, player is champion");
    }

    pub fn is_champion(&self) -> bool {
        self.save.progress.is_champion
    }
}

impl RosterSink for GameStateStore {
    fn update_hp(&mut self, slot: usize, hp: u16) {
        if let Err(e) = self.update_team_member_hp(slot, hp) {
            warn!(slot, error = %e, "battle write-back ignored");
        }
    }
}

fn push_unique(values: &mut Vec<u8>, value: u8) {
    if !values.contains(&value) {
        values.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lrs::{LaunchParams, StatementLog};
    use crate::persistence::{ManualClock, MemoryStateStore, StateStore};
    use crate::rng::BattleRng;
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    struct Harness {
        store: GameStateStore,
        disk: Rc<RefCell<MemoryStateStore>>,
        clock: ManualClock,
        log: StatementLog,
    }

    impl Harness {
        fn saved(&self) -> Option<GameSave> {
            self.disk
                .borrow()
                .get(state_keys::GAME_STATE)
                .cloned()
                .and_then(|document| GameSave::migrate(document, self.clock.now()))
        }
    }

    #[fixture]
    fn harness() -> Harness {
        let disk = Rc::new(RefCell::new(MemoryStateStore::default()));
        let clock = ManualClock::default();
        let log = StatementLog::default();
        let session = Cmi5Session::new(
            Box::new(log.clone()),
            LaunchParams::default(),
            BattleRng::seeded(11),
        );
        let store = GameStateStore::new(StoreDeps {
            gateway: PersistenceGateway::local_only(Box::new(disk.clone())),
            scheduler: SaveScheduler::default(),
            clock: Box::new(clock.clone()),
            session: Some(Rc::new(RefCell::new(session))),
        });
        Harness {
            store,
            disk,
            clock,
            log,
        }
    }

    #[rstest]
    fn test_start_game_saves_immediately_and_reports(mut harness: Harness) {
        let starter = harness.store.start_game("PUMPLET").unwrap();

        assert_eq!(starter.level, 5);
        assert_eq!(harness.store.current_section(), "module1");
        assert!(harness.store.has_started());
        let saved = harness.saved().unwrap();
        assert_eq!(saved.player.starter_choice.as_deref(), Some("PUMPLET"));
        assert_eq!(saved.team.len(), 1);
        assert_eq!(harness.log.verbs(), vec!["initialized"]);
    }

    #[rstest]
    fn test_non_starter_is_rejected(mut harness: Harness) {
        assert!(matches!(
            harness.store.start_game("SENSORB"),
            Err(StoreError::InvalidStarter(_))
        ));
        assert!(matches!(
            harness.store.start_game("NOPE"),
            Err(StoreError::Data(_))
        ));
    }

    #[rstest]
    fn test_load_restores_saved_game(mut harness: Harness) {
        harness.store.start_game("GRIDLING").unwrap();
        let mut fresh = GameStateStore::new(StoreDeps {
            gateway: PersistenceGateway::local_only(Box::new(harness.disk.clone())),
            scheduler: SaveScheduler::default(),
            clock: Box::new(harness.clock.clone()),
            session: None,
        });

        let loaded = fresh.load();

        assert_eq!(loaded.team[0].name, "GRIDLING");
        assert_eq!(loaded.progress.current_section, "module1");
    }

    #[rstest]
    fn test_save_timestamps_follow_the_store_clock(mut harness: Harness) {
        // Arrange
        let started = harness.clock.now();
        harness.store.start_game("GRIDLING").unwrap();
        harness.clock.advance(TimeDelta::hours(3));

        // Act
        let loaded = harness.store.load();

        // Assert
        assert_eq!(loaded.created_at, started);
        assert_eq!(loaded.updated_at, started + TimeDelta::hours(3));
    }

    #[rstest]
    fn test_load_without_save_starts_fresh(mut harness: Harness) {
        harness
            .disk
            .borrow_mut()
            .save_state(state_keys::GAME_STATE, &serde_json::json!({ "junk": true }))
            .unwrap();
        let save = harness.store.load();
        assert!(!save.has_started());
        assert_eq!(save.progress.current_section, "intro");
    }

    #[rstest]
    fn test_seventh_member_goes_to_storage(mut harness: Harness) {
        harness.store.start_game("GRIDLING").unwrap();
        for _ in 0..5 {
            let member = Combatant::from_species_name("SENSORB", 5).unwrap();
            assert!(matches!(harness.store.add_to_team(member), TeamPlacement::Team(_)));
        }
        let extra = Combatant::from_species_name("ACTUMON", 5).unwrap();
        assert_eq!(harness.store.add_to_team(extra), TeamPlacement::Storage(0));
        assert_eq!(harness.store.team().len(), 6);
    }

    #[rstest]
    fn test_last_member_cannot_be_removed(mut harness: Harness) {
        harness.store.start_game("GRIDLING").unwrap();
        assert!(matches!(harness.store.remove_from_team(0), Err(StoreError::LastMember)));

        harness
            .store
            .add_to_team(Combatant::from_species_name("SENSORB", 5).unwrap());
        let removed = harness.store.remove_from_team(0).unwrap();
        assert_eq!(removed.name, "GRIDLING");
        assert_eq!(harness.store.storage()[0].name, "GRIDLING");
        assert!(matches!(harness.store.remove_from_team(4), Err(StoreError::InvalidSlot(4))));
    }

    #[rstest]
    fn test_swap_with_storage(mut harness: Harness) {
        harness.store.start_game("GRIDLING").unwrap();
        harness
            .store
            .add_to_team(Combatant::from_species_name("SENSORB", 5).unwrap());
        harness.store.remove_from_team(1).unwrap();

        harness.store.swap_team_member(0, 0).unwrap();

        assert_eq!(harness.store.team()[0].name, "SENSORB");
        assert_eq!(harness.store.storage()[0].name, "GRIDLING");
        assert!(harness.store.swap_team_member(0, 3).is_err());
    }

    #[rstest]
    fn test_hp_updates_are_debounced(mut harness: Harness) {
        harness.store.start_game("GRIDLING").unwrap();
        harness.store.update_hp(0, 3);
        harness.store.update_hp(0, 1);

        assert!(harness.store.has_pending_save());
        assert!(!harness.store.flush_if_due());
        assert_eq!(harness.saved().unwrap().team[0].current_hp, 24);

        harness.clock.advance(TimeDelta::milliseconds(1000));
        assert!(harness.store.flush_if_due());
        assert_eq!(harness.saved().unwrap().team[0].current_hp, 1);
    }

    #[rstest]
    fn test_heal_team_forces_save(mut harness: Harness) {
        harness.store.start_game("GRIDLING").unwrap();
        harness.store.update_hp(0, 0);
        assert!(harness.store.heal_team());
        assert!(!harness.store.has_pending_save());
        assert_eq!(harness.saved().unwrap().team[0].current_hp, 24);
        assert_eq!(harness.store.active_member().unwrap().name, "GRIDLING");
    }

    #[rstest]
    fn test_complete_gym_levels_team_and_reports_badge(mut harness: Harness) {
        harness.store.start_game("SPARKLET").unwrap();

        let reward = harness.store.complete_gym(1, 100).unwrap();

        assert_eq!(reward.badge, gym_leader(1).unwrap().badge);
        // 5 + floor((15 - 5) * 0.5 * 1.25) = 11
        assert_eq!(
            reward.level_ups,
            vec![LevelUp { slot: 0, name: "SPARKLET".to_string(), from: 5, to: 11 }]
        );
        assert_eq!(harness.store.current_section(), "catch1");
        assert_eq!(harness.store.badges().len(), 1);
        assert_eq!(harness.log.verbs(), vec!["initialized", "earned"]);

        harness.store.complete_gym(1, 100).unwrap();
        assert_eq!(harness.store.badges().len(), 1);
        assert_eq!(harness.store.completed_gyms_count(), 1);
    }

    #[rstest]
    fn test_last_gym_leads_to_elite_four(mut harness: Harness) {
        harness.store.start_game("SPARKLET").unwrap();
        harness.store.complete_gym(8, 80).unwrap();
        assert_eq!(harness.store.current_section(), "elite4");
    }

    #[rstest]
    fn test_level_up_never_lowers_levels(mut harness: Harness) {
        harness.store.start_game("GRIDLING").unwrap();
        harness
            .store
            .add_to_team(Combatant::from_species_name("SENSORB", 40).unwrap());

        let level_ups = harness.store.level_up_team(1, 100);

        assert_eq!(level_ups.len(), 1);
        assert_eq!(harness.store.team()[1].level, 40);
        assert!(harness.store.level_up_team(9, 100).is_empty());
    }

    #[rstest]
    fn test_module_completion_tracks_attempts_and_progress(mut harness: Harness) {
        harness.store.complete_module(1, 70);
        harness.store.complete_module(1, 90);
        harness.store.complete_module(2, 85);

        let stats = &harness.store.save().module_stats;
        assert_eq!(stats[&1].attempts, 2);
        assert_eq!(stats[&1].score, 90);
        assert_eq!(harness.store.save().progress.completed_modules, vec![1, 2]);
        assert!(harness.store.is_module_completed(2));

        let progress: Vec<_> = harness
            .log
            .statements()
            .into_iter()
            .filter_map(|s| s.result)
            .map(|r| r.extensions.values().next().cloned())
            .collect();
        assert_eq!(
            progress,
            vec![Some(12.into()), Some(12.into()), Some(25.into())]
        );
    }

    #[rstest]
    fn test_catch_phase_moves_to_next_module(mut harness: Harness) {
        harness.store.complete_catch_phase(3);
        assert!(harness.store.is_catch_phase_complete(3));
        assert_eq!(harness.store.current_section(), "module4");
    }

    #[rstest]
    fn test_elite_four_and_rival(mut harness: Harness) {
        for id in ["e1", "e2", "e3", "e3"] {
            harness.store.defeat_elite_four(id);
        }
        assert!(!harness.store.is_elite_four_complete());
        harness.store.defeat_elite_four("e4");
        assert!(harness.store.is_elite_four_complete());

        harness.store.defeat_rival();

        assert!(harness.store.is_champion());
        assert!(harness.saved().unwrap().progress.rival_defeated);
        assert_eq!(harness.log.verbs(), vec!["completed", "passed"]);
    }

    #[rstest]
    fn test_reset_game(mut harness: Harness) {
        harness.store.start_game("GRIDLING").unwrap();
        harness.store.set_player_name("Ada");
        harness.store.reset_game();
        assert!(!harness.store.has_started());
        assert_eq!(harness.store.player_name(), "Trainer");
        assert!(!harness.saved().unwrap().has_started());
    }
}
