use std::{env, error::Error, fs, path::Path};

use maze_rl::{
    algo::tabular::{greedy, greedy_rollout, QTableAgent, QTableAgentConfig},
    gym::{GridWorld, GridWorldConfig},
};
use rand::{rngs::StdRng, SeedableRng};

const NUM_EPISODES: u32 = 500;

fn main() -> Result<(), Box<dyn Error>> {
    let path = Path::new("demos/maze_q_learning");
    let seed = env::args()
        .nth(1)
        .map(|s| s.parse::<u64>())
        .transpose()?
        .unwrap_or(0);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut world = GridWorld::new(GridWorldConfig::default(), &mut rng)?;
    println!("Maze (seed {seed}):\n{}", world.render(&[]));

    let config: QTableAgentConfig = QTableAgentConfig {
        episodes: NUM_EPISODES,
        ..Default::default()
    };
    let mut agent = QTableAgent::new(&world, config);
    let history = agent.train(&mut world, &mut rng);

    fs::create_dir_all(path.join("out"))?;
    let mut wtr = csv::Writer::from_path(path.join("out/data.csv"))?;
    wtr.write_record(["episode", "reward", "epsilon", "steps"])?;
    for stats in &history {
        if stats.episode % 100 == 0 {
            println!(
                "Episode {}, Reward: {:.1}, Epsilon: {:.2}",
                stats.episode, stats.total_reward, stats.epsilon
            );
        }
        wtr.write_record([
            stats.episode.to_string(),
            stats.total_reward.to_string(),
            stats.epsilon.to_string(),
            stats.steps.to_string(),
        ])?;
    }
    wtr.flush()?;

    let rollout = greedy_rollout(agent.q_table(), &mut world, greedy::DEFAULT_MAX_STEPS);
    rollout.replay(&mut world, |_| {})?;
    println!("\nGreedy path ({} moves):\n{}", rollout.moves(), world.render(&rollout.path));
    if !rollout.reached_goal() {
        println!("Policy stopped early ({:?}) without reaching the goal", rollout.end);
    }

    Ok(())
}
