//! Session registry: owns every live board and serializes play on each one.
//!
//! Boards live behind their own mutex so independent games never contend.
//! One call to [`SessionRegistry::play`] holds the board's lock for the full
//! cycle of human move, computer reply, terminal check, score commit and
//! reset. A round that ends is therefore scored exactly once.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::{Duration, Instant};

use derive_getters::Getters;
use serde::Serialize;
use tictactoebot_engine::{
    Board, BoardId, Difficulty, Language, Participant, StandardProvider, StrategyProvider, Symbol,
    TerminalState, UserId,
};
use tracing::{debug, info, instrument, warn};

use crate::{ProfileDefaults, ProfileStore, Score, ScoreOutcome, SessionError, UserProfile};

/// Result of one [`SessionRegistry::play`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct PlayReport {
    /// Board as it stood after the cycle, before any reset.
    board: Board,
    /// Cell the computer answered with, if it moved.
    ai_move: Option<u8>,
    /// Terminal state reached by the cycle.
    state: TerminalState,
    /// Marks on the board when the cycle finished.
    moves: usize,
    /// Acting user's counters after the round was scored.
    score: Option<Score>,
}

impl PlayReport {
    /// Returns true when the cycle finished the round.
    pub fn is_round_over(&self) -> bool {
        self.state.is_terminal()
    }
}

#[derive(Debug)]
struct Session {
    board: Board,
    last_active: Instant,
    retired: bool,
}

impl Session {
    fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}

type SessionHandle = Arc<Mutex<Session>>;

/// Registry entry: the session plus the people seated at it, readable
/// without taking the session lock.
#[derive(Debug)]
struct Slot {
    session: SessionHandle,
    players: Vec<UserId>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Non-blocking lock. A poisoned lock is recovered, only a held one is `None`.
fn try_lock<T>(mutex: &Mutex<T>) -> Option<MutexGuard<'_, T>> {
    match mutex.try_lock() {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(e)) => Some(e.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    }
}

/// Maps a finished board to one outcome per human seat.
fn round_outcomes(board: &Board, state: TerminalState) -> Vec<(UserId, ScoreOutcome)> {
    let humans = [Participant::Human(board.author()), board.target()];
    match state {
        TerminalState::InProgress => Vec::new(),
        TerminalState::Draw => humans
            .iter()
            .filter_map(|p| p.user_id())
            .map(|u| (u, ScoreOutcome::Draw))
            .collect(),
        TerminalState::Won(Participant::Ai) => vec![(board.author(), ScoreOutcome::LossToBot)],
        TerminalState::Won(winner) => {
            let mut outcomes: Vec<_> = winner
                .user_id()
                .map(|u| (u, ScoreOutcome::Win))
                .into_iter()
                .collect();
            if let Some(loser) = board.opponent_of(winner).user_id() {
                outcomes.push((loser, ScoreOutcome::LossToPlayer));
            }
            outcomes
        }
    }
}

/// Owns live boards and the profile cache.
///
/// The cache holds profiles of players seated at a live board; retiring or
/// evicting a board drops the profiles nobody else references.
///
/// Lock order: a session before the board map, the board map before the
/// profile cache. The map is only ever held while try-locking a session.
///
/// Construct once per process and share behind an [`Arc`].
pub struct SessionRegistry {
    boards: Mutex<HashMap<BoardId, Slot>>,
    profiles: Mutex<HashMap<UserId, UserProfile>>,
    store: Arc<dyn ProfileStore>,
    strategies: Arc<dyn StrategyProvider>,
    defaults: ProfileDefaults,
    next_id: AtomicU64,
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &lock(&self.boards).len())
            .field("store", &self.store)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl SessionRegistry {
    /// Creates a registry backed by `store`, with the standard opponents.
    #[instrument(skip(store))]
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        info!("Creating SessionRegistry");
        Self {
            boards: Mutex::new(HashMap::new()),
            profiles: Mutex::new(HashMap::new()),
            store,
            strategies: Arc::new(StandardProvider::new()),
            defaults: ProfileDefaults::default(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Replaces the strategy provider.
    pub fn with_strategies(mut self, strategies: Arc<dyn StrategyProvider>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Replaces the settings given to new players.
    pub fn with_defaults(mut self, defaults: ProfileDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    fn allocate_id(&self) -> BoardId {
        BoardId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn insert(&self, board: Board) -> BoardId {
        let id = board.id();
        let players = [Participant::Human(board.author()), board.target()]
            .iter()
            .filter_map(|p| p.user_id())
            .collect();
        let session = Session {
            board,
            last_active: Instant::now(),
            retired: false,
        };
        let slot = Slot {
            session: Arc::new(Mutex::new(session)),
            players,
        };
        lock(&self.boards).insert(id, slot);
        id
    }

    fn handle(&self, id: BoardId) -> Result<SessionHandle, SessionError> {
        lock(&self.boards)
            .get(&id)
            .map(|slot| slot.session.clone())
            .ok_or(SessionError::SessionNotFound(id))
    }

    /// Drops cached profiles of players with no live board.
    fn prune_profiles(&self) {
        let boards = lock(&self.boards);
        let seated: HashSet<UserId> = boards
            .values()
            .flat_map(|slot| slot.players.iter().copied())
            .collect();
        let mut profiles = lock(&self.profiles);
        let before = profiles.len();
        profiles.retain(|user, _| seated.contains(user));
        if profiles.len() < before {
            debug!(dropped = before - profiles.len(), "Pruned profile cache");
        }
    }

    /// Number of profiles currently cached.
    pub fn cached_profiles(&self) -> usize {
        lock(&self.profiles).len()
    }

    /// Locks a session, rejecting one retired while we waited.
    fn with_session<T>(
        &self,
        id: BoardId,
        f: impl FnOnce(&mut Session) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let handle = self.handle(id)?;
        let mut session = lock(&handle);
        if session.retired {
            return Err(SessionError::SessionNotFound(id));
        }
        f(&mut session)
    }

    /// Starts a game against the computer. The player moves first.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Setup`] for an empty symbol and
    /// [`SessionError::Profile`] if the player's profile cannot be loaded.
    #[instrument(skip(self))]
    pub fn create_solo_session(
        &self,
        player: UserId,
        symbol: Symbol,
    ) -> Result<BoardId, SessionError> {
        let board = Board::solo(self.allocate_id(), player, symbol)?;
        self.get_or_create_user(player)?;
        let id = self.insert(board);
        info!(board_id = %id, "Solo session created");
        Ok(id)
    }

    /// Starts a game between two people. The author moves first.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Setup`] for an empty symbol or self-play and
    /// [`SessionError::Profile`] if a profile cannot be loaded.
    #[instrument(skip(self))]
    pub fn create_multiplayer_session(
        &self,
        author: UserId,
        target: UserId,
        author_symbol: Symbol,
    ) -> Result<BoardId, SessionError> {
        let board = Board::new(
            self.allocate_id(),
            author,
            Participant::Human(target),
            author_symbol,
        )?;
        self.get_or_create_user(author)?;
        self.get_or_create_user(target)?;
        let id = self.insert(board);
        info!(board_id = %id, "Multiplayer session created");
        Ok(id)
    }

    /// Returns a snapshot of a live board.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionNotFound`] if absent or retired.
    pub fn get_board(&self, id: BoardId) -> Result<Board, SessionError> {
        self.with_session(id, |session| Ok(session.board.clone()))
    }

    /// Removes a board and returns its last state.
    ///
    /// A result left unrecorded by an earlier failed commit is recorded
    /// first; if that fails again the board stays registered.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionNotFound`] if absent or already retired
    /// and [`SessionError::Profile`] if a pending result cannot be recorded.
    #[instrument(skip(self))]
    pub fn retire_board(&self, id: BoardId) -> Result<Board, SessionError> {
        let board = self.with_session(id, |session| {
            let last = session.board.clone();
            let state = last.check_terminal();
            if state.is_terminal() {
                self.commit_round(&mut session.board, state)?;
            }
            session.retired = true;
            lock(&self.boards).remove(&id);
            Ok(last)
        })?;
        self.prune_profiles();
        info!(board_id = %id, "Session retired");
        Ok(board)
    }

    /// Returns a player's profile, creating it with defaults on first contact.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Profile`] if the store fails.
    #[instrument(skip(self))]
    pub fn get_or_create_user(&self, user: UserId) -> Result<UserProfile, SessionError> {
        if let Some(profile) = lock(&self.profiles).get(&user) {
            return Ok(profile.clone());
        }
        let profile = self.store.get_or_create(user, self.defaults)?;
        debug!(%user, "Profile cached");
        lock(&self.profiles).insert(user, profile.clone());
        Ok(profile)
    }

    /// Same as [`get_or_create_user`](Self::get_or_create_user).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Profile`] if the store fails.
    pub fn profile(&self, user: UserId) -> Result<UserProfile, SessionError> {
        self.get_or_create_user(user)
    }

    /// Stores a new difficulty for the player's future computer moves.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Profile`] if the store fails.
    #[instrument(skip(self))]
    pub fn set_difficulty(&self, user: UserId, difficulty: Difficulty) -> Result<(), SessionError> {
        self.get_or_create_user(user)?;
        self.store.set_difficulty(user, difficulty)?;
        if let Some(profile) = lock(&self.profiles).get_mut(&user) {
            profile.set_difficulty(difficulty);
        }
        info!(%user, %difficulty, "Difficulty changed");
        Ok(())
    }

    /// Stores a new interface language.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Profile`] if the store fails.
    #[instrument(skip(self))]
    pub fn set_language(&self, user: UserId, language: Language) -> Result<(), SessionError> {
        self.get_or_create_user(user)?;
        self.store.set_language(user, language)?;
        if let Some(profile) = lock(&self.profiles).get_mut(&user) {
            profile.set_language(language);
        }
        info!(%user, %language, "Language changed");
        Ok(())
    }

    /// Plays `cell` for `user`, answers with the computer when it is
    /// seated, and scores and resets the board if the round ended.
    ///
    /// # Errors
    ///
    /// - [`SessionError::SessionNotFound`] for an unknown board
    /// - [`SessionError::Move`] for a rejected move; nothing changes
    /// - [`SessionError::Profile`] if the difficulty cannot be read (nothing
    ///   changes) or the result cannot be recorded (the board stays finished
    ///   until [`settle`](Self::settle) succeeds)
    #[instrument(skip(self))]
    pub fn play(&self, id: BoardId, user: UserId, cell: u8) -> Result<PlayReport, SessionError> {
        self.with_session(id, |session| {
            let difficulty = if session.board.is_solo() {
                Some(*self.get_or_create_user(session.board.author())?.difficulty())
            } else {
                None
            };

            if let Err(e) = session.board.apply_move(user, cell) {
                warn!(board_id = %id, %user, cell, error = %e, "Move rejected");
                return Err(e.into());
            }
            session.touch();

            let mut ai_move = None;
            let mut state = session.board.check_terminal();
            if let (TerminalState::InProgress, Some(difficulty)) = (state, difficulty) {
                let mut strategy = self.strategies.strategy(difficulty);
                ai_move = Some(session.board.apply_ai_move(&mut *strategy)?);
                state = session.board.check_terminal();
            }

            let board = session.board.clone();
            let moves = board.history().len();
            let score = if state.is_terminal() {
                self.commit_round(&mut session.board, state)?;
                self.current_score(user)
            } else {
                None
            };

            Ok(PlayReport {
                board,
                ai_move,
                state,
                moves,
                score,
            })
        })
    }

    /// Records a finished round and resets the board. Caller holds the board lock.
    fn commit_round(&self, board: &mut Board, state: TerminalState) -> Result<(), SessionError> {
        let outcomes = round_outcomes(board, state);
        if let Err(e) = self.store.record_round(&outcomes) {
            warn!(board_id = %board.id(), error = %e, "Score commit failed; board left unsettled");
            return Err(e.into());
        }

        let mut profiles = lock(&self.profiles);
        for (user, outcome) in &outcomes {
            if let Some(profile) = profiles.get_mut(user) {
                profile.score_mut().apply(*outcome);
            }
        }
        drop(profiles);

        info!(
            board_id = %board.id(),
            ?state,
            moves = board.history().len(),
            "Round finished"
        );
        board.reset();
        Ok(())
    }

    fn current_score(&self, user: UserId) -> Option<Score> {
        match self.get_or_create_user(user) {
            Ok(profile) => Some(*profile.score()),
            Err(e) => {
                warn!(%user, error = %e, "Score unavailable after commit");
                None
            }
        }
    }

    /// Reports the board's terminal state without scoring it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionNotFound`] for an unknown board.
    pub fn check_terminal(&self, id: BoardId) -> Result<TerminalState, SessionError> {
        self.with_session(id, |session| Ok(session.board.check_terminal()))
    }

    /// Records a result left pending by a failed commit.
    ///
    /// Returns the settled state, or `None` if the board was mid-round.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SessionNotFound`] for an unknown board and
    /// [`SessionError::Profile`] if the store still fails.
    #[instrument(skip(self))]
    pub fn settle(&self, id: BoardId) -> Result<Option<TerminalState>, SessionError> {
        self.with_session(id, |session| {
            let state = session.board.check_terminal();
            if !state.is_terminal() {
                debug!(board_id = %id, "Nothing to settle");
                return Ok(None);
            }
            self.commit_round(&mut session.board, state)?;
            Ok(Some(state))
        })
    }

    /// Ids of every live board.
    pub fn sessions(&self) -> Vec<BoardId> {
        let mut ids: Vec<_> = lock(&self.boards).keys().copied().collect();
        ids.sort();
        ids
    }

    /// Boards untouched for at least `max_idle`. Boards busy right now are skipped.
    pub fn idle_sessions(&self, max_idle: Duration) -> Vec<BoardId> {
        let boards = lock(&self.boards);
        let mut ids: Vec<_> = boards
            .iter()
            .filter(|(_, slot)| {
                try_lock(&slot.session).is_some_and(|s| s.last_active.elapsed() >= max_idle)
            })
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// Retires every board idle for at least `max_idle`. Returns the retired ids.
    ///
    /// Boards busy right now are skipped. A board holding an unrecorded
    /// result is settled first and kept if the store still fails.
    #[instrument(skip(self))]
    pub fn evict_idle(&self, max_idle: Duration) -> Vec<BoardId> {
        let handles: Vec<_> = lock(&self.boards)
            .iter()
            .map(|(id, slot)| (*id, slot.session.clone()))
            .collect();

        let mut evicted = Vec::new();
        for (id, handle) in handles {
            let Some(mut session) = try_lock(&handle) else {
                continue;
            };
            if session.retired || session.last_active.elapsed() < max_idle {
                continue;
            }
            let state = session.board.check_terminal();
            if state.is_terminal() {
                if let Err(e) = self.commit_round(&mut session.board, state) {
                    warn!(board_id = %id, error = %e, "Idle board kept until its result is recorded");
                    continue;
                }
            }
            session.retired = true;
            lock(&self.boards).remove(&id);
            evicted.push(id);
        }

        evicted.sort();
        if !evicted.is_empty() {
            self.prune_profiles();
            info!(count = evicted.len(), "Evicted idle sessions");
        }
        evicted
    }
}
