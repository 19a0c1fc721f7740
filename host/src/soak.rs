use crate::pilot::pilot_ids;
use crate::runner::{run_session, SessionMetrics};
use crate::util::{seed_to_hex, write_bytes, write_json};
use anyhow::{anyhow, Context, Result};
use asteroids_canvas_core::{GameConfig, GameState};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Debug)]
pub struct SoakConfig {
    pub pilots: Vec<String>,
    pub seeds: Vec<u32>,
    pub max_frames: u32,
    /// Seed is replaced per run.
    pub base: GameConfig,
    pub out_dir: PathBuf,
    pub jobs: Option<usize>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PilotAggregate {
    pub pilot_id: String,
    pub runs: usize,
    pub avg_score: f64,
    pub max_score: u32,
    pub avg_frames: f64,
    pub clear_rate: f64,
    pub finish_rate: f64,
    pub avg_clear_frame: Option<f64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SoakReport {
    pub generated_unix_s: u64,
    pub max_frames: u32,
    pub jobs: Option<usize>,
    pub pilots: Vec<String>,
    pub seeds: Vec<u32>,
    pub run_count: usize,
    pub rankings: Vec<PilotAggregate>,
    pub runs: Vec<SessionMetrics>,
}

pub fn resolve_pilots(input: Option<&str>) -> Result<Vec<String>> {
    match input {
        None => Ok(pilot_ids().iter().map(|id| (*id).to_string()).collect()),
        Some(raw) => {
            let mut pilots = Vec::new();
            for token in raw.split(',') {
                let token = token.trim();
                if token.is_empty() {
                    continue;
                }
                pilots.push(token.to_string());
            }
            if pilots.is_empty() {
                return Err(anyhow!("--pilots resolved to empty list"));
            }
            Ok(pilots)
        }
    }
}

/// Runs every pilot against every seed in parallel and writes `summary.json` and `runs.csv`.
pub fn run_soak(config: SoakConfig) -> Result<SoakReport> {
    if config.seeds.is_empty() {
        return Err(anyhow!("soak requires at least one seed"));
    }
    if config.pilots.is_empty() {
        return Err(anyhow!("soak requires at least one pilot"));
    }
    if config.jobs == Some(0) {
        return Err(anyhow!("soak --jobs must be >= 1 when provided"));
    }

    let run_jobs: Vec<(String, u32)> = config
        .pilots
        .iter()
        .flat_map(|pilot| config.seeds.iter().map(move |seed| (pilot.clone(), *seed)))
        .collect();

    let run_one = |(pilot_id, seed): &(String, u32)| -> Result<SessionMetrics> {
        let game_config = GameConfig {
            seed: *seed,
            ..config.base.clone()
        };
        let artifact = run_session(pilot_id, &game_config, config.max_frames)
            .with_context(|| format!("soak run failed for pilot={pilot_id} seed={seed:#x}"))?;
        Ok(artifact.metrics)
    };

    let run_results: Vec<Result<SessionMetrics>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| run_jobs.par_iter().map(run_one).collect())
    } else {
        run_jobs.par_iter().map(run_one).collect()
    };

    let mut runs = Vec::with_capacity(run_results.len());
    for result in run_results {
        runs.push(result?);
    }

    let rankings = aggregate(&runs);

    let report = SoakReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        max_frames: config.max_frames,
        jobs: config.jobs,
        pilots: config.pilots,
        seeds: config.seeds,
        run_count: runs.len(),
        rankings,
        runs,
    };

    write_json(&config.out_dir.join("summary.json"), &report)?;
    write_runs_csv(&config.out_dir.join("runs.csv"), &report.runs)?;
    Ok(report)
}

fn aggregate(runs: &[SessionMetrics]) -> Vec<PilotAggregate> {
    let mut grouped: BTreeMap<&str, Vec<&SessionMetrics>> = BTreeMap::new();
    for run in runs {
        grouped.entry(run.pilot_id.as_str()).or_default().push(run);
    }

    let mut rankings: Vec<PilotAggregate> = grouped
        .into_iter()
        .map(|(pilot_id, pilot_runs)| {
            let count = pilot_runs.len() as f64;
            let sum_score: u64 = pilot_runs.iter().map(|r| r.collected_score as u64).sum();
            let sum_frames: u64 = pilot_runs.iter().map(|r| r.frame_count as u64).sum();
            let clear_frames: Vec<u32> = pilot_runs
                .iter()
                .filter_map(|r| r.stage_cleared_frame)
                .collect();
            let finished = pilot_runs
                .iter()
                .filter(|r| r.final_state == GameState::Finished)
                .count();

            PilotAggregate {
                pilot_id: pilot_id.to_string(),
                runs: pilot_runs.len(),
                avg_score: sum_score as f64 / count,
                max_score: pilot_runs
                    .iter()
                    .map(|r| r.collected_score)
                    .max()
                    .unwrap_or_default(),
                avg_frames: sum_frames as f64 / count,
                clear_rate: clear_frames.len() as f64 / count,
                finish_rate: finished as f64 / count,
                avg_clear_frame: (!clear_frames.is_empty()).then(|| {
                    clear_frames.iter().map(|f| *f as f64).sum::<f64>()
                        / clear_frames.len() as f64
                }),
            }
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.clear_rate
            .total_cmp(&a.clear_rate)
            .then_with(|| b.avg_score.total_cmp(&a.avg_score))
            .then_with(|| a.avg_frames.total_cmp(&b.avg_frames))
    });
    rankings
}

fn write_runs_csv(path: &Path, rows: &[SessionMetrics]) -> Result<()> {
    let mut csv = String::from(
        "pilot_id,seed_hex,seed,frame_count,collected_score,final_state,stage_cleared_frame,finished_frame,action_frames,turn_frames,thrust_frames,fire_frames\n",
    );
    for row in rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{:?},{},{},{},{},{},{}\n",
            row.pilot_id,
            seed_to_hex(row.seed),
            row.seed,
            row.frame_count,
            row.collected_score,
            row.final_state,
            optional(row.stage_cleared_frame),
            optional(row.finished_frame),
            row.action_frames,
            row.turn_frames,
            row.thrust_frames,
            row.fire_frames
        ));
    }
    write_bytes(path, csv.as_bytes())
}

fn optional(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
