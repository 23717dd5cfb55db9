use maze_rl::{
    algo::tabular::{greedy, greedy_rollout, QTableAgent, QTableAgentConfig},
    gym::{GridWorld, GridWorldConfig, Rewards},
    maze::Generator,
    Error,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn quiet(episodes: u32) -> QTableAgentConfig {
    QTableAgentConfig {
        episodes,
        log_interval: 0,
        ..Default::default()
    }
}

#[test]
fn corridor_converges_to_shortest_path() {
    let grid = ".....".parse().unwrap();
    let mut env = GridWorld::from_grid(grid, (0, 0), (0, 4), Rewards::default()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let mut agent = QTableAgent::new(&env, quiet(500));
    let history = agent.train(&mut env, &mut rng);
    assert_eq!(history.len(), 500);
    assert!(history.iter().all(|s| s.terminated), "every episode reaches the goal");

    let rollout = greedy_rollout(agent.q_table(), &mut env, greedy::DEFAULT_MAX_STEPS);
    assert!(rollout.reached_goal(), "greedy policy reaches goal");
    assert_eq!(rollout.moves(), 4, "shortest corridor path");
    assert_eq!(rollout.path, [(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]);
}

#[test]
fn generated_maze_is_solved() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let mut env = GridWorld::new(GridWorldConfig::new(6, 6), &mut rng).unwrap();
    let shortest = env
        .grid()
        .distance(env.start(), env.goal())
        .expect("generated mazes are connected");

    let mut agent = QTableAgent::new(&env, quiet(2000));
    agent.train(&mut env, &mut rng);

    let rollout = greedy_rollout(agent.q_table(), &mut env, greedy::DEFAULT_MAX_STEPS);
    assert!(rollout.reached_goal(), "greedy policy solves the maze");
    // Prim mazes are trees, so a path without revisits is the unique shortest one
    assert_eq!(rollout.moves(), shortest);
    assert_eq!(rollout.path.last(), Some(&env.goal()));
}

#[test]
fn hand_edited_maze_is_solved() {
    let config = GridWorldConfig {
        generator: Generator::Empty,
        ..GridWorldConfig::new(3, 3)
    };
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut env = GridWorld::new(config, &mut rng).unwrap();
    env.toggle_wall((1, 0)).unwrap();
    env.toggle_wall((1, 1)).unwrap();
    assert_eq!(env.grid().to_string(), "...\n##.\n...\n");

    let mut agent = QTableAgent::new(&env, quiet(1000));
    agent.train(&mut env, &mut rng);

    let rollout = greedy_rollout(agent.q_table(), &mut env, greedy::DEFAULT_MAX_STEPS);
    assert_eq!(rollout.path, [(0, 0), (0, 1), (0, 2), (1, 2), (2, 2)]);
}

#[test]
fn training_freezes_the_layout() {
    let config = GridWorldConfig {
        generator: Generator::Empty,
        ..GridWorldConfig::new(3, 3)
    };
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut env = GridWorld::new(config, &mut rng).unwrap();

    let mut agent = QTableAgent::new(&env, quiet(500));
    agent.train(&mut env, &mut rng);
    assert!(env.is_committed(), "training commits the grid");

    for pos in [(0, 1), (1, 1), (1, 0), (1, 2)] {
        assert_eq!(env.toggle_wall(pos), Err(Error::GridLocked), "toggle {pos:?} after training");
    }
    assert_eq!(env.grid().to_string(), "...\n...\n...\n", "layout unchanged");

    let rollout = greedy_rollout(agent.q_table(), &mut env, greedy::DEFAULT_MAX_STEPS);
    assert!(rollout.reached_goal(), "trained policy still matches the grid");
}

#[test]
fn seeded_runs_are_reproducible() {
    let run = |seed| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut env = GridWorld::new(GridWorldConfig::new(8, 8), &mut rng).unwrap();
        let mut agent = QTableAgent::new(&env, quiet(50));
        let history = agent.train(&mut env, &mut rng);
        (env.grid().clone(), agent.into_q_table(), history)
    };

    let (grid_a, table_a, history_a) = run(99);
    let (grid_b, table_b, history_b) = run(99);
    assert_eq!(grid_a, grid_b, "same maze");
    assert_eq!(table_a, table_b, "same learned values");
    assert_eq!(history_a, history_b, "same telemetry");
}

#[test]
fn rendering_shows_replayed_path() {
    let grid = "..#\n#..\n#..\n".parse().unwrap();
    let mut env = GridWorld::from_grid(grid, (0, 0), (2, 2), Rewards::default()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let mut agent = QTableAgent::new(&env, quiet(800));
    agent.train(&mut env, &mut rng);
    let rollout = greedy_rollout(agent.q_table(), &mut env, greedy::DEFAULT_MAX_STEPS);
    assert!(rollout.reached_goal());
    assert_eq!(rollout.moves(), 4);

    let mut frames = Vec::new();
    rollout
        .replay(&mut env, |env| frames.push(env.render(&rollout.path)))
        .unwrap();
    assert_eq!(frames.len(), rollout.path.len(), "one frame per position");
    assert_eq!(frames[0].lines().next(), Some("A*#"), "agent starts on start cell");
    assert!(frames.last().is_some_and(|f| f.ends_with("A\n")), "agent ends on goal");
}
