use anyhow::{anyhow, Context, Result};
use asteroids_canvas_core::transmission::{TransmissionState, TransmissionTimeline};
use asteroids_canvas_host::config::HostConfig;
use asteroids_canvas_host::pilot::{create_pilot, describe_pilots, pilot_ids};
use asteroids_canvas_host::runner::{frame_commands, replay_inputs, run_session};
use asteroids_canvas_host::soak::{resolve_pilots, run_soak, SoakConfig};
use asteroids_canvas_host::util::{
    parse_seed, parse_seed_csv, seed_sequence, seed_to_hex, write_bytes, write_json,
};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

const DEFAULT_SEED: u32 = 0xA57E_0001;

#[derive(Parser, Debug)]
#[command(name = "asteroids-canvas")]
#[command(about = "Headless driver for the asteroid-field stage: runs, soaks and frame dumps")]
struct Cli {
    /// JSON game config; missing fields keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available pilots
    ListPilots,
    /// Play one game with a scripted pilot
    Run {
        #[arg(long, default_value = "hunter")]
        pilot: String,
        #[arg(long)]
        seed: Option<String>,
        #[arg(long)]
        max_frames: Option<u32>,
        /// Writes `<output>.json` metrics and `<output>.inputs` bytes
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replay a recorded `.inputs` file and print the final state
    Replay {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        seed: Option<String>,
    },
    /// Run many pilots over many seeds in parallel
    Soak {
        #[arg(long)]
        pilots: Option<String>,
        #[arg(long)]
        seeds: Option<String>,
        #[arg(long)]
        seed_start: Option<String>,
        #[arg(long, default_value_t = 12)]
        seed_count: u32,
        #[arg(long)]
        max_frames: Option<u32>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long)]
        jobs: Option<usize>,
    },
    /// Print the transmission timeline for the configured texts
    Timeline,
    /// Dump the draw commands of one frame as JSON
    Frame {
        #[arg(long, default_value = "hunter")]
        pilot: String,
        #[arg(long)]
        seed: Option<String>,
        #[arg(long)]
        frame: u32,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let Cli { config, command } = Cli::parse();
    let host = HostConfig::from_env();
    let resolve_seed = |seed: Option<&str>| seed.map(parse_seed).unwrap_or(Ok(DEFAULT_SEED));

    match command {
        Commands::ListPilots => {
            for (id, description) in describe_pilots() {
                println!("{id:12} {description}");
            }
        }
        Commands::Run {
            pilot,
            seed,
            max_frames,
            output,
        } => {
            ensure_pilot(&pilot)?;
            let seed = resolve_seed(seed.as_deref())?;
            let game_config = host.game_config(config.as_deref(), seed)?;
            let artifact =
                run_session(&pilot, &game_config, max_frames.unwrap_or(host.max_frames))?;
            let metrics = &artifact.metrics;

            println!("pilot={}", metrics.pilot_id);
            println!("seed={}", seed_to_hex(metrics.seed));
            println!("frames={}", metrics.frame_count);
            println!("score={}", metrics.collected_score);
            println!("state={:?}", metrics.final_state);
            println!("rng={:#010x}", metrics.final_rng_state);
            if let Some(frame) = metrics.stage_cleared_frame {
                println!("stage_cleared_frame={frame}");
            }
            if let Some(frame) = metrics.finished_frame {
                println!("finished_frame={frame}");
            }

            if let Some(base) = output {
                let metrics_path = base.with_extension("json");
                let inputs_path = base.with_extension("inputs");
                write_json(&metrics_path, metrics)?;
                write_bytes(&inputs_path, &artifact.inputs)?;
                println!("metrics={}", metrics_path.display());
                println!("inputs={}", inputs_path.display());
            }
        }
        Commands::Replay { input, seed } => {
            let seed = resolve_seed(seed.as_deref())?;
            let game_config = host.game_config(config.as_deref(), seed)?;
            let bytes =
                fs::read(&input).with_context(|| format!("failed reading {}", input.display()))?;
            let result = replay_inputs(&game_config, &bytes)?;

            println!("input={}", input.display());
            println!("seed={}", seed_to_hex(seed));
            println!("frames={}", result.frame_count);
            println!("score={}", result.collected_score);
            println!("state={:?}", result.game_state);
            println!("rng={:#010x}", result.rng_state);
        }
        Commands::Soak {
            pilots,
            seeds,
            seed_start,
            seed_count,
            max_frames,
            out_dir,
            jobs,
        } => {
            let pilots = resolve_pilots(pilots.as_deref())?;
            for pilot in &pilots {
                ensure_pilot(pilot)?;
            }
            let seeds = match seeds {
                Some(csv) => parse_seed_csv(&csv)?,
                None => seed_sequence(resolve_seed(seed_start.as_deref())?, seed_count),
            };
            let base = host.game_config(config.as_deref(), DEFAULT_SEED)?;
            let out_dir = out_dir.unwrap_or_else(|| PathBuf::from("soak"));

            let report = run_soak(SoakConfig {
                pilots,
                seeds,
                max_frames: max_frames.unwrap_or(host.max_frames),
                base,
                out_dir: out_dir.clone(),
                jobs: jobs.or(host.soak_jobs),
            })?;

            println!("runs={}", report.run_count);
            println!(
                "jobs={}",
                report
                    .jobs
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "auto".to_string())
            );
            println!("out_dir={}", out_dir.display());
            for (idx, pilot) in report.rankings.iter().enumerate() {
                println!(
                    "  {}. {}  clear={:.0}% finish={:.0}% avg_score={:.1} max_score={} avg_frames={:.1}",
                    idx + 1,
                    pilot.pilot_id,
                    pilot.clear_rate * 100.0,
                    pilot.finish_rate * 100.0,
                    pilot.avg_score,
                    pilot.max_score,
                    pilot.avg_frames,
                );
            }
        }
        Commands::Timeline => {
            let game_config = host.game_config(config.as_deref(), DEFAULT_SEED)?;
            let timeline =
                TransmissionTimeline::for_texts(&game_config.static_label, &game_config.message);
            for state in TransmissionState::ALL {
                println!("{state:?}={}", timeline.duration(state));
            }
            println!("total={}", timeline.total());
        }
        Commands::Frame {
            pilot,
            seed,
            frame,
            output,
        } => {
            ensure_pilot(&pilot)?;
            let seed = resolve_seed(seed.as_deref())?;
            let game_config = host.game_config(config.as_deref(), seed)?;
            let commands = frame_commands(&pilot, &game_config, frame)?;

            if let Some(path) = output {
                write_json(&path, &commands)?;
                println!("frame={frame}");
                println!("commands={}", commands.len());
                println!("output={}", path.display());
            } else {
                let encoded = serde_json::to_vec_pretty(&commands)?;
                println!("{}", String::from_utf8_lossy(&encoded));
            }
        }
    }

    Ok(())
}

fn ensure_pilot(pilot: &str) -> Result<()> {
    if create_pilot(pilot).is_none() {
        let available = pilot_ids().join(", ");
        return Err(anyhow!("unknown pilot '{pilot}'. available: {available}"));
    }
    Ok(())
}
