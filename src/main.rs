use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::{self, Stdout};
use std::thread;
use std::time::{Duration, Instant};

use maze_collapse::input::dir_for_key;
use maze_collapse::render::{render, Renderer, TerminalBanner, Viewport};
use maze_collapse::{build_layout, generate, RapierWorld, Session, Settings};

struct Game {
    world: RapierWorld,
    session: Session,
    viewport: Viewport,
    hud: String,
}

fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let settings = Settings::parse();
    let game = new_game(&settings)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &settings, game);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn new_game(settings: &Settings) -> io::Result<Game> {
    let params = settings.maze_params()?;
    let seed = settings.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!("maze seed {seed}");
    let mut rng = StdRng::seed_from_u64(seed);

    let start = params.start.resolve(params.dims, &mut rng);
    let maze = generate(params.dims, start, &mut rng)?;
    let perfect = maze.is_perfect();
    info!(
        "generated {}x{} maze from ({}, {}) with {} open passages",
        params.dims.cells_horizontal(),
        params.dims.cells_vertical(),
        start.row,
        start.col,
        maze.open_passage_count()
    );
    if !perfect {
        warn!("maze is not a spanning tree");
    }

    let layout = build_layout(&maze, params.arena, &params.geometry)?;
    let mut world = RapierWorld::new();
    let session = Session::spawn(
        &mut world,
        &layout,
        settings.velocity_step,
        settings.collapse_gravity,
    );
    let viewport = Viewport::new(params.dims, layout.unit_x, layout.unit_y);
    let hud = format!(
        "Seed: {}  Maze: {}x{}  (arrows/hjkl steer, q to quit)",
        seed,
        params.dims.cells_horizontal(),
        params.dims.cells_vertical()
    );

    Ok(Game {
        world,
        session,
        viewport,
        hud,
    })
}

fn run(stdout: &mut Stdout, settings: &Settings, game: Game) -> io::Result<()> {
    let Game {
        mut world,
        mut session,
        viewport,
        hud,
    } = game;
    let mut renderer = Renderer::new(&viewport);
    let mut banner = TerminalBanner::default();
    let (tick_ms, render_fps) = settings.timing();
    let tick = Duration::from_millis(tick_ms);
    let frame_time = Duration::from_micros(1_000_000 / render_fps);
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        code => {
                            if let Some(dir) = dir_for_key(code) {
                                session.steer(&mut world, dir);
                            }
                        }
                    },
                    _ => {}
                }
            }
        }

        if last_tick.elapsed() >= tick {
            last_tick = Instant::now();
            world.step();
            session.pump_collisions(&mut world, &mut banner);
        }

        render(stdout, &viewport, &world.bodies(), &hud, &banner, &mut renderer)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}
