//! Terminal front end: plays one gym battle against the saved game, reading
//! choices from stdin.
//!
//! Usage: `scadamon [questions.json] [gym-id]`

use anyhow::{bail, Context, Result};
use scadamon::battle::SwitchMode;
use scadamon::data::starters;
use scadamon::game_state::GameStateStore;
use scadamon::persistence::{LocalStateStore, SaveScheduler, SystemClock};
use scadamon::questions::{load_question_bank, parse_question_bank};
use scadamon::{
    get_move_data, BattleDeps, BattleEngine, BattleInput, BattleOutcome, BattlePhase, BattleRng,
    BattleSetup, Cmi5Session, GameConfig, LaunchParams, Opponent, PersistenceGateway, Question,
    StateStore, StatementLog, StoreDeps,
};
use std::cell::RefCell;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::rc::Rc;

const SAMPLE_QUESTIONS: &str = include_str!("../data/questions.json");

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("scadamon=info".parse()?),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let questions = load_questions(args.first().map(String::as_str))?;
    let gym: u8 = match args.get(1) {
        Some(raw) => raw.parse().with_context(|| format!("invalid gym id {}", raw))?,
        None => 1,
    };

    let config = GameConfig::load();
    let params = match env::var("SCADAMON_LAUNCH") {
        Ok(query) => LaunchParams::from_query(&query),
        Err(_) => config.launch.to_params(),
    };
    let standalone = params.is_standalone();

    let session = Rc::new(RefCell::new(Cmi5Session::new(
        Box::new(StatementLog::default()),
        params,
        BattleRng::from_entropy(),
    )));
    session.borrow_mut().initialize();

    let remote: Option<Box<dyn StateStore>> = if standalone {
        None
    } else {
        Some(Box::new(Rc::clone(&session)))
    };
    let gateway = PersistenceGateway::new(
        remote,
        Box::new(LocalStateStore::new(&config.persistence.save_dir)),
    );
    let store = Rc::new(RefCell::new(GameStateStore::new(StoreDeps {
        gateway,
        scheduler: SaveScheduler::from_millis(config.persistence.debounce_ms),
        clock: Box::new(SystemClock),
        session: Some(Rc::clone(&session)),
    })));
    store.borrow_mut().load();

    let mut input = io::stdin().lock();
    if !store.borrow().has_started() {
        let starter = choose_starter(&mut input)?;
        store.borrow_mut().start_game(&starter)?;
    }

    let outcome: Rc<RefCell<Option<BattleOutcome>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&outcome);
    let player_team = store.borrow().team().to_vec();

    let mut engine = BattleEngine::new(
        BattleSetup {
            config: config.battle,
            opponent: Opponent::Gym(gym),
            player_team,
            questions,
        },
        BattleDeps {
            recorder: Box::new(Rc::clone(&session)),
            roster: Box::new(Rc::clone(&store)),
            rng: BattleRng::from_entropy(),
            on_complete: Box::new(move |result| *sink.borrow_mut() = Some(result)),
        },
    )?;

    print!("{}", engine.handle(BattleInput::Begin)?);
    while !engine.is_over() {
        prompt_for(&engine);
        let Some(line) = read_line(&mut input)? else {
            println!("Battle abandoned.");
            break;
        };
        let Some(choice) = parse_choice(engine.phase(), &line) else {
            println!("Not a valid choice.");
            continue;
        };
        match engine.handle(choice) {
            Ok(bus) => print!("{}", bus),
            Err(e) => println!("{}", e),
        }
        store.borrow_mut().flush_if_due();
    }

    let result = outcome.borrow_mut().take();
    if let Some(result) = result.filter(|r| r.victory) {
        let reward = store.borrow_mut().complete_gym(gym, result.score)?;
        for level_up in &reward.level_ups {
            println!("{} grew to level {}!", level_up.name, level_up.to);
        }
    }

    store.borrow_mut().force_save();
    session.borrow_mut().terminate();
    Ok(())
}

fn load_questions(path: Option<&str>) -> Result<Vec<Question>> {
    let questions = match path {
        Some(path) => load_question_bank(Path::new(path))
            .with_context(|| format!("failed to load question bank {}", path))?,
        None => parse_question_bank(SAMPLE_QUESTIONS).context("embedded question bank")?,
    };
    if questions.is_empty() {
        bail!("question bank has no usable questions");
    }
    Ok(questions)
}

fn read_line(input: &mut impl BufRead) -> Result<Option<String>> {
    print!("> ");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn choose_starter(input: &mut impl BufRead) -> Result<String> {
    let options = starters()?;
    println!("Choose your starter:");
    for (i, species) in options.iter().enumerate() {
        println!("  {}) {}", i + 1, species.name);
    }
    loop {
        let Some(line) = read_line(input)? else {
            bail!("no starter chosen");
        };
        if let Some(species) = slot(&line).and_then(|i| options.get(i)) {
            return Ok(species.name.clone());
        }
        println!("Pick 1 to {}.", options.len());
    }
}

fn prompt_for(engine: &BattleEngine) {
    match engine.phase() {
        BattlePhase::PlayerTurn => {
            let active = engine.active_player();
            let enemy = engine.active_enemy();
            println!(
                "{} Lv{} HP {}/{}  vs  {} Lv{} HP {}/{}  (score {}%)",
                active.name,
                active.level,
                active.current_hp,
                active.max_hp,
                enemy.name,
                enemy.level,
                enemy.current_hp,
                enemy.max_hp,
                engine.score()
            );
            for (i, id) in active.moves.iter().enumerate() {
                let name = get_move_data(id).map_or(id.as_str(), |m| m.name.as_str());
                println!("  {}) {}", i + 1, name);
            }
            println!("  s) Switch");
        }
        BattlePhase::Switching(mode) => {
            for (i, member) in engine.player_team().iter().enumerate() {
                println!(
                    "  {}) {} HP {}/{}",
                    i + 1,
                    member.name,
                    member.current_hp,
                    member.max_hp
                );
            }
            if mode == SwitchMode::Voluntary {
                println!("  c) Cancel");
            }
        }
        _ => {}
    }
}

fn slot(text: &str) -> Option<usize> {
    text.parse::<usize>().ok()?.checked_sub(1)
}

fn parse_choice(phase: BattlePhase, line: &str) -> Option<BattleInput> {
    match (phase, line) {
        (BattlePhase::PlayerTurn, "s") => Some(BattleInput::OpenSwitch),
        (BattlePhase::PlayerTurn, text) => slot(text).map(BattleInput::ChooseMove),
        (BattlePhase::Switching(SwitchMode::Voluntary), "c") => Some(BattleInput::CancelSwitch),
        (BattlePhase::Switching(SwitchMode::Starter), text) => {
            slot(text).map(BattleInput::SelectStarter)
        }
        (BattlePhase::Switching(_), text) => slot(text).map(BattleInput::SwitchTo),
        (BattlePhase::Question, text) => slot(text).map(BattleInput::Answer),
        _ => None,
    }
}
