// ═══════════════════════════════════════════════════════════════════════
// Harness integration tests — the environment as an external player
// drives it: JSON in, player states out.
// ═══════════════════════════════════════════════════════════════════════

use serde_json::{json, Value};
use tactics_engine::types::*;
use tactics_engine::Config;
use tactics_tournament::{evaluate, make_agents, Environment, PlayerState};

fn environment(overrides: Value) -> Environment {
    let mut base = json!({"mapSeed": 42});
    if let (Some(base), Some(extra)) = (base.as_object_mut(), overrides.as_object()) {
        base.extend(extra.clone());
    }
    let config = Config::from_json_str(&base.to_string()).unwrap();
    Environment::new(config).unwrap()
}

fn env() -> Environment {
    environment(json!({}))
}

fn as_json(states: &[PlayerState; 2]) -> Value {
    serde_json::to_value(states).unwrap()
}

// ── Setup ──────────────────────────────────────────────────────────────

#[test]
fn test_has_correct_timeouts_and_defaults() {
    let env = env();
    let c = env.configuration();
    assert_eq!(c.act_timeout, 5.0);
    assert_eq!(c.run_timeout, 1200.0);
    assert_eq!((c.map_width, c.map_height), (20, 20));
    assert_eq!(c.starting_gold, 250);
    assert!(!c.fog_of_war);
    assert_eq!(c.enabled_units, "W,M,C,A,K,R,S,B");
}

#[test]
fn test_initial_observations() {
    let mut env = env();
    let states = as_json(&env.reset().unwrap());
    assert_eq!(states[0]["status"], "ACTIVE");
    assert_eq!(states[1]["status"], "INACTIVE");

    let obs = &states[0]["observation"];
    assert_eq!(obs["mapWidth"], 20);
    assert_eq!(obs["mapHeight"], 20);
    assert_eq!(obs["turnNumber"], 0);
    assert_eq!(obs["player"], 0);
    assert_eq!(obs["board"].as_array().unwrap().len(), 20);
    assert_eq!(obs["board"][0].as_array().unwrap().len(), 20);
    assert_eq!(obs["gold"], json!([250, 250]));
    assert_eq!(states[1]["observation"]["player"], 1);
}

#[test]
fn test_board_is_mostly_grass_with_structures() {
    let mut env = env();
    let states = as_json(&env.reset().unwrap());
    let obs = &states[0]["observation"];

    let grass: usize = obs["board"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row.as_array().unwrap().iter().filter(|t| *t == "p").count())
        .sum();
    assert!(grass > 200, "only {grass} grass tiles");

    let count = |kind: &str| obs["structures"].as_array().unwrap().iter().filter(|s| s["type"] == kind).count();
    assert_eq!(count("h"), 2);
    assert!(count("b") >= 4);
    assert!(count("t") > 0);
}

// ── Turns and production ───────────────────────────────────────────────

#[test]
fn test_end_turn_and_back() {
    let mut env = env();
    env.reset().unwrap();
    let states = env.step([Some(json!([{"type": "end_turn"}])), None]).unwrap();
    assert_eq!(states[0].status, PlayerStatus::Inactive);
    assert_eq!(states[1].status, PlayerStatus::Active);

    let states = env.step([None, Some(json!([{"type": "end_turn"}]))]).unwrap();
    assert_eq!(states[0].status, PlayerStatus::Active);
    assert_eq!(states[1].status, PlayerStatus::Inactive);
}

#[test]
fn test_create_unit_at_building_deducts_gold() {
    let mut env = env();
    let states = as_json(&env.reset().unwrap());
    let building = states[0]["observation"]["structures"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["owner"] == 1 && s["type"] == "b")
        .cloned()
        .unwrap();

    let actions = json!([
        {"type": "create_unit", "unit_type": "W", "x": building["x"], "y": building["y"]},
        {"type": "end_turn"},
    ]);
    let states = as_json(&env.step([Some(actions), None]).unwrap());
    let obs = &states[0]["observation"];

    let warriors: Vec<&Value> = obs["units"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|u| u["type"] == "W" && u["owner"] == 1)
        .collect();
    assert_eq!(warriors.len(), 1);
    assert_eq!(warriors[0]["x"], building["x"]);
    assert_eq!(warriors[0]["y"], building["y"]);
    // income goes to the player whose turn begins, not the one ending it
    assert_eq!(obs["gold"][0], 50);
}

// ── Fatal input ────────────────────────────────────────────────────────

#[test]
fn test_invalid_action_loses() {
    let mut env = env();
    env.reset().unwrap();
    let states = env.step([Some(json!(["not_a_dict"])), None]).unwrap();
    assert_eq!(states[0].status, PlayerStatus::Done);
    assert_eq!((states[0].reward, states[1].reward), (-1, 1));
    assert!(env.done());
}

#[test]
fn test_unknown_action_type_loses() {
    let mut env = env();
    env.reset().unwrap();
    let states = env.step([Some(json!([{"type": "fly_to_moon"}])), None]).unwrap();
    assert_eq!(states[0].status, PlayerStatus::Done);
    assert_eq!((states[0].reward, states[1].reward), (-1, 1));
}

#[test]
fn test_stepping_a_finished_episode_fails() {
    let mut env = env();
    env.reset().unwrap();
    env.step([Some(json!("garbage")), None]).unwrap();
    assert!(env.step([None, None]).is_err());
}

// ── Rendering ──────────────────────────────────────────────────────────

#[test]
fn test_can_render_ansi() {
    let mut env = env();
    env.reset().unwrap();
    let out = env.render(true);
    assert!(out.contains("Turn"));
    assert!(out.contains("P1 Gold"));
    assert!(out.contains("P2 Gold"));
}

// ── Built-in agents ────────────────────────────────────────────────────

fn run(names: [&str; 2]) -> (Environment, Vec<[PlayerState; 2]>) {
    let mut env = env();
    let mut agents = make_agents(names, 42).unwrap();
    let trajectory = env.run(&mut agents).unwrap();
    (env, trajectory)
}

#[test]
fn test_can_run_builtin_agents() {
    for names in [["random", "random"], ["aggressive", "aggressive"], ["random", "aggressive"]] {
        let (env, trajectory) = run(names);
        assert!(env.done(), "{names:?} did not finish");
        assert!(trajectory.len() as u32 <= env.configuration().episode_steps + 1);
    }
}

#[test]
fn test_rewards_sum_to_zero() {
    let (_, trajectory) = run(["random", "aggressive"]);
    let last = trajectory.last().unwrap();
    let (r0, r1) = (last[0].reward, last[1].reward);
    assert!([(1, -1), (-1, 1), (0, 0)].contains(&(r0, r1)));
    assert_eq!(last[0].status, PlayerStatus::Done);
    assert_eq!(last[1].status, PlayerStatus::Done);
}

#[test]
fn test_runs_are_reproducible() {
    let (a, ta) = run(["random", "aggressive"]);
    let (b, tb) = run(["random", "aggressive"]);
    assert_eq!(serde_json::to_string(a.state()).unwrap(), serde_json::to_string(b.state()).unwrap());
    assert_eq!(ta, tb);
}

// ── Evaluate ───────────────────────────────────────────────────────────

#[test]
fn test_can_evaluate() {
    let config = Config { map_seed: 42, episode_steps: 10, ..Config::default() };
    let rewards = evaluate(&config, ["random", "random"], 2).unwrap();
    assert_eq!(rewards.len(), 2);
    for pair in rewards {
        assert!([[1, -1], [-1, 1], [0, 0]].contains(&pair));
    }
}

// ── Configuration overrides ────────────────────────────────────────────

#[test]
fn test_custom_starting_gold() {
    let mut env = environment(json!({"startingGold": 500}));
    let states = env.reset().unwrap();
    assert_eq!(states[0].observation.gold, [500, 500]);
}

#[test]
fn test_custom_episode_steps() {
    let env = environment(json!({"episodeSteps": 5}));
    assert_eq!(env.configuration().episode_steps, 5);
    assert_eq!(env.to_json().unwrap()["configuration"]["episodeSteps"], 5);
}
