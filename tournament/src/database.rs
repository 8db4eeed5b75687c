// ═══════════════════════════════════════════════════════════════════════
// Database — SQLite storage for finished episodes and ELO ratings
// ═══════════════════════════════════════════════════════════════════════

use crate::runner::EpisodeResult;
use rusqlite::{params, Connection, OptionalExtension, Result};
use serde::Serialize;
use std::path::Path;
use tactics_engine::types::PlayerId;

pub const DEFAULT_ELO: f64 = 1500.0;
pub const ELO_K: f64 = 32.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    pub name: String,
    pub elo: f64,
    pub episodes: u32,
    pub wins: u32,
    pub draws: u32,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database { conn: Connection::open(path)? };
        db.create_schema()?;
        Ok(db)
    }

    /// In-memory database (useful for tests).
    pub fn in_memory() -> Result<Self> {
        let db = Database { conn: Connection::open_in_memory()? };
        db.create_schema()?;
        Ok(db)
    }

    fn create_schema(&self) -> Result<()> {
        self.conn.execute_batch("
            CREATE TABLE IF NOT EXISTS agents (
                id          INTEGER PRIMARY KEY,
                name        TEXT NOT NULL UNIQUE,
                elo         REAL NOT NULL DEFAULT 1500.0,
                episodes    INTEGER NOT NULL DEFAULT 0,
                wins        INTEGER NOT NULL DEFAULT 0,
                draws       INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS episodes (
                id          INTEGER PRIMARY KEY,
                seed        INTEGER NOT NULL,
                steps       INTEGER NOT NULL,
                turns       INTEGER NOT NULL,
                outcome     TEXT NOT NULL,
                played_at   TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS episode_players (
                id          INTEGER PRIMARY KEY,
                episode_id  INTEGER NOT NULL REFERENCES episodes(id),
                agent_id    INTEGER NOT NULL REFERENCES agents(id),
                seat        INTEGER NOT NULL,
                reward      INTEGER NOT NULL
            );
        ")
    }

    /// Register an agent (or return existing ID).
    pub fn register_agent(&self, name: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT OR IGNORE INTO agents (name) VALUES (?1)",
            params![name],
        )?;
        self.conn.query_row(
            "SELECT id FROM agents WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
    }

    /// Store a finished episode, update per-agent tallies and ratings.
    pub fn store_episode(&self, result: &EpisodeResult) -> Result<i64> {
        let outcome = serde_json::to_string(&result.outcome)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        self.conn.execute(
            "INSERT INTO episodes (seed, steps, turns, outcome) VALUES (?1, ?2, ?3, ?4)",
            params![result.seed as i64, result.steps, result.turns, outcome],
        )?;
        let episode_id = self.conn.last_insert_rowid();

        let mut ids = [0i64; 2];
        for seat in PlayerId::ALL {
            let i = seat.index();
            ids[i] = self.register_agent(&result.agents[i])?;
            let reward = result.rewards[i];
            self.conn.execute(
                "INSERT INTO episode_players (episode_id, agent_id, seat, reward) VALUES (?1, ?2, ?3, ?4)",
                params![episode_id, ids[i], i as i64, reward],
            )?;
            self.conn.execute(
                "UPDATE agents SET episodes = episodes + 1, wins = wins + ?1, draws = draws + ?2 WHERE id = ?3",
                params![(reward > 0) as i64, (reward == 0) as i64, ids[i]],
            )?;
        }

        let score = match result.rewards[0] {
            1 => 1.0,
            -1 => 0.0,
            _ => 0.5,
        };
        self.update_elo(ids[0], ids[1], score, ELO_K)?;

        tracing::debug!(
            target: "tactics::database",
            event = "episode.stored",
            episode_id,
            seed = result.seed,
        );
        Ok(episode_id)
    }

    fn elo(&self, agent_id: i64) -> Result<f64> {
        let elo = self.conn.query_row(
            "SELECT elo FROM agents WHERE id = ?1",
            params![agent_id],
            |row| row.get(0),
        ).optional()?;
        Ok(elo.unwrap_or(DEFAULT_ELO))
    }

    /// Two-player ELO update. `score_a` is 1 for a win by `a`, 0.5 for a draw, 0 for a loss.
    /// An agent playing itself keeps its rating.
    pub fn update_elo(&self, a: i64, b: i64, score_a: f64, k: f64) -> Result<()> {
        if a == b {
            return Ok(());
        }
        let elo_a = self.elo(a)?;
        let elo_b = self.elo(b)?;

        let expected_a = 1.0 / (1.0 + 10f64.powf((elo_b - elo_a) / 400.0));
        let delta = k * (score_a - expected_a);

        self.conn.execute(
            "UPDATE agents SET elo = elo + ?1 WHERE id = ?2",
            params![delta, a],
        )?;
        self.conn.execute(
            "UPDATE agents SET elo = elo - ?1 WHERE id = ?2",
            params![delta, b],
        )?;
        Ok(())
    }

    /// Get ELO leaderboard.
    pub fn leaderboard(&self) -> Result<Vec<LeaderboardRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, elo, episodes, wins, draws FROM agents ORDER BY elo DESC, name ASC"
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(LeaderboardRow {
                name: row.get(0)?,
                elo: row.get(1)?,
                episodes: row.get(2)?,
                wins: row.get(3)?,
                draws: row.get(4)?,
            })
        })?;
        rows.collect()
    }

    /// Get total number of episodes stored.
    pub fn episode_count(&self) -> Result<u32> {
        self.conn.query_row("SELECT COUNT(*) FROM episodes", [], |row| row.get(0))
    }
}
