//! Arcade Engine entry point
//!
//! Natively this is a headless runner: the autopilot plays one game in virtual
//! time and the result is printed as JSON. The browser build is driven through
//! `platform::web::WebGame` instead.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::{Path, PathBuf};

    use arcade_engine::autopilot::Autopilot;
    use arcade_engine::platform::ManualScheduler;
    use arcade_engine::renderer::Screen;
    use arcade_engine::sim::GamePhase;
    use arcade_engine::{GameKind, HighScores, Session, Settings, Tuning};
    use clap::{Parser, ValueEnum};
    use serde::Serialize;

    #[derive(Parser, Debug)]
    #[command(name = "arcade-engine")]
    #[command(about = "Run an arcade game headless with the autopilot playing")]
    struct Cli {
        /// Game to play
        #[arg(long, value_enum, default_value_t = GameArg::BrickBreaker)]
        game: GameArg,
        /// Frames of virtual time to run (60 per second)
        #[arg(long, default_value_t = 3_600)]
        frames: u64,
        /// Session seed
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Tuning JSON file
        #[arg(long)]
        tuning: Option<PathBuf>,
        /// Settings JSON file
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Autopilot aim error in board units
        #[arg(long, default_value_t = 12.0)]
        jitter: f32,
    }

    #[derive(Clone, Copy, Debug, ValueEnum)]
    enum GameArg {
        BrickBreaker,
        SpaceInvaders,
        Cricket,
    }

    impl From<GameArg> for GameKind {
        fn from(arg: GameArg) -> Self {
            match arg {
                GameArg::BrickBreaker => GameKind::BrickBreaker,
                GameArg::SpaceInvaders => GameKind::SpaceInvaders,
                GameArg::Cricket => GameKind::Cricket,
            }
        }
    }

    #[derive(Serialize)]
    struct RunSummary<'a> {
        game_type: &'a str,
        seed: u64,
        frames: u64,
        finished: bool,
        screen: Screen,
        leaderboard: &'a HighScores,
    }

    fn read_file(path: &Path) -> Option<String> {
        match std::fs::read_to_string(path) {
            Ok(text) => Some(text),
            Err(e) => {
                log::error!("Cannot read {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn run() -> i32 {
        let cli = Cli::parse();
        let kind = GameKind::from(cli.game);

        let tuning = match &cli.tuning {
            Some(path) => match read_file(path) {
                Some(text) => Tuning::load_or_default(&text),
                None => return 1,
            },
            None => Tuning::default(),
        };
        let settings = match &cli.settings {
            Some(path) => match read_file(path) {
                Some(text) => Settings::load_or_default(&text),
                None => return 1,
            },
            None => Settings::default(),
        };

        let mut session = Session::new(
            kind,
            tuning,
            &settings,
            HighScores::new(),
            ManualScheduler::new(),
        );
        let mut pilot = Autopilot::new(kind, cli.seed).with_jitter(cli.jitter);

        session.start(cli.seed);
        let mut frames = 0;
        while frames < cli.frames {
            for event in pilot.events(session.state()) {
                session.handle_input(event);
            }
            if !session.pump() {
                break;
            }
            frames += 1;
        }

        let finished = session.phase() == GamePhase::GameOver;
        if !finished {
            log::info!("Frame budget spent after {} frames; stopping", frames);
            session.stop();
        }

        let summary = RunSummary {
            game_type: kind.game_type(),
            seed: cli.seed,
            frames,
            finished,
            screen: session.screen(),
            leaderboard: session.sink(),
        };
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => {
                println!("{json}");
                0
            }
            Err(e) => {
                log::error!("Cannot serialize run summary: {}", e);
                1
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    std::process::exit(headless::run());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser entry point is `platform::web::init`
}
