#![deny(warnings)]

//! Headless demo driver: walks a `GameSession` through load, actions,
//! corruption lockout, repair, and hard reset using scripted backend
//! responses, printing one summary line per step.

use anyhow::{anyhow, Result};
use client_state::{
    ApiRequest, GameSession, GateOutcome, LockState, Notice, Reply, StateResponse, View,
};
use game_model::{GainEvent, GameState};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Initial snapshot in the exact wire shape the backend serves: one
/// healthy profile and one corrupt save whose data is junk.
const INITIAL_STATE: &str = r#"{
    "profiles": [
        {
            "name": "Adventurer",
            "total_level": 4,
            "data": {
                "skills": {
                    "Woodcutting": {"level": 2, "current_xp": 40.0, "xp_to_next_level": 115.0},
                    "Mining": {"level": 1, "current_xp": 30.0, "xp_to_next_level": 100.0},
                    "Foraging": {"level": 1, "current_xp": 5.0, "xp_to_next_level": 100.0}
                },
                "inventory": {"Wood": 12, "Stone": 4, "Herbs": 1},
                "stats": {"strength": 3, "intelligence": 1, "dexterity": 2}
            }
        },
        {
            "name": "Old Save",
            "status": "corrupt",
            "data": "unreadable"
        }
    ],
    "selected_profile_index": 0
}"#;

/// Shorten large totals for the gains line (1500 -> "1.50k").
fn format_compact(n: u64) -> String {
    if n < 1000 {
        return n.to_string();
    }
    const SUFFIXES: [&str; 5] = ["", "k", "M", "B", "T"];
    let i = (((n as f64).log10() / 3.0).floor() as usize).min(SUFFIXES.len() - 1);
    format!("{:.2}{}", (n as f64) / 1000f64.powi(i as i32), SUFFIXES[i])
}

fn print_notices(notices: &[Notice]) {
    for n in notices {
        println!("  [{}] {}", n.title, n.body);
    }
}

fn apply(
    session: &mut GameSession,
    request: ApiRequest,
    response: StateResponse,
    now_ms: u64,
) -> Result<()> {
    let ticket = session.begin(request)?;
    let update = session.complete(ticket, Ok(response), now_ms)?;
    print_notices(&update.notices);
    Ok(())
}

fn parse_state(raw: &str) -> Result<GameState> {
    Ok(serde_json::from_str(raw)?)
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();
    info!(git_sha = env!("GIT_SHA"), "starting demo driver");

    let mut session = GameSession::new();
    let initial = parse_state(INITIAL_STATE)?;

    // Initial load.
    let ticket = session.begin(ApiRequest::FetchState)?;
    session.complete(
        ticket,
        Ok(StateResponse {
            state: initial.clone(),
            recent_gain: None,
        }),
        0,
    )?;
    let profile = session.current_profile()?;
    println!(
        "Loaded | profile: {} | total level: {} | profiles: {}",
        profile.name,
        profile.total_level,
        session.store().state().map(|s| s.profiles.len()).unwrap_or(0)
    );

    // A burst of gathering actions; each response re-arms the window.
    let actions: [(&str, &str, i64, &str); 3] = [
        ("mine-stone-button", "Mining", 15, "Stone"),
        ("mine-stone-button", "Mining", 15, "Stone"),
        ("gather-wood-button", "Woodcutting", 10, "Wood"),
    ];
    for (i, (action_id, skill, xp, item)) in actions.iter().enumerate() {
        let now_ms = (i as u64) * 500;
        apply(
            &mut session,
            ApiRequest::PerformAction {
                action_id: action_id.to_string(),
            },
            StateResponse {
                state: initial.clone(),
                recent_gain: Some(GainEvent {
                    skill: Some(skill.to_string()),
                    xp: Some(*xp),
                    item: Some(item.to_string()),
                    quantity: Some(1),
                }),
            },
            now_ms,
        )?;
    }
    if let Some(summary) = session.gains().summary() {
        for (skill, xp) in &summary.xp {
            println!("Recently obtained | +{} {} XP", format_compact(*xp), skill);
        }
        for (item, qty) in &summary.items {
            println!("Recently obtained | +{} {}", format_compact(*qty), item);
        }
    }
    // 3000ms of inactivity after the last action clears the buffer.
    let cleared = session.tick(1000 + 3000);
    println!("Gains window expired | cleared: {cleared}");

    // Switching to the corrupt save locks the session.
    apply(
        &mut session,
        ApiRequest::SelectProfile { index: 1 },
        StateResponse {
            state: GameState {
                selected_profile_index: 1,
                ..initial.clone()
            },
            recent_gain: None,
        },
        5000,
    )?;
    println!(
        "Corrupt save selected | lock: {:?} | view: {:?} | nav to Home allowed: {}",
        session.lock(),
        session.active_view(),
        session.switch_view(View::Home)
    );

    // Repair it through the accept/decline gate.
    let gated = session.gate_reset_profile()?;
    let ticket = match session.resolve_gate(gated, &Reply::Accept)? {
        GateOutcome::Dispatched(t) => t,
        GateOutcome::Cancelled(_) => return Err(anyhow!("fix gate unexpectedly cancelled")),
    };
    let mut fixed = initial.clone();
    fixed.selected_profile_index = 1;
    fixed.profiles[1] = GameState::seed().profiles.remove(0);
    fixed.profiles[1].name = "Old Save".to_string();
    let update = session.complete(ticket, Ok(StateResponse { state: fixed, recent_gain: None }), 5100)?;
    print_notices(&update.notices);
    println!(
        "Profile fixed | lock: {:?} | nav to Home allowed: {}",
        session.lock(),
        session.switch_view(View::Home)
    );

    // Hard reset behind the exact-phrase gate.
    let gated = session.gate_hard_reset();
    let ticket = match session.resolve_gate(gated, &Reply::Text("reset all game data".into()))? {
        GateOutcome::Dispatched(t) => t,
        GateOutcome::Cancelled(_) => return Err(anyhow!("hard reset gate unexpectedly cancelled")),
    };
    let update = session.complete(
        ticket,
        Ok(StateResponse {
            state: GameState::seed(),
            recent_gain: None,
        }),
        6000,
    )?;
    print_notices(&update.notices);

    let profile = session.current_profile()?;
    println!(
        "Session OK | profile: {} | lock: {:?} | view: {:?}",
        profile.name,
        session.lock(),
        session.active_view()
    );
    debug_assert_eq!(session.lock(), LockState::Unlocked);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_parses_with_lenient_corrupt_data() {
        let state = parse_state(INITIAL_STATE).unwrap();
        assert_eq!(state.profiles.len(), 2);
        assert!(state.profiles[1].is_corrupt());
        assert!(state.profiles[1].data.is_none());
    }

    #[test]
    fn compact_formatting_matches_the_ui() {
        assert_eq!(format_compact(999), "999");
        assert_eq!(format_compact(1500), "1.50k");
        assert_eq!(format_compact(2_300_000), "2.30M");
    }
}
