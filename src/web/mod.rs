use std::{
    collections::VecDeque,
    convert::Infallible,
    net::SocketAddr,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::get,
    Json, Router,
};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::broadcast};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::{error, info, warn};

use crate::{
    area::{Area, AreaCatalog},
    engine::{self, EngineBuilder, EngineSettings, TickAccumulator},
    growth::{GrowthTable, TickPreview},
    rank::{CompatibilityEngine, RankInfo},
    resolver::{EnvironmentReading, SEA_HUMIDITY},
    scenario::Scenario,
    systems::install_default_systems,
    world::{World, WorldSnapshot},
};

const FRAME: Duration = Duration::from_millis(50);
/// Longest real-time gap credited to the pacer in one frame.
const MAX_FRAME_GAP: Duration = Duration::from_secs(1);
const MAX_FRAMES: usize = 1440;

#[derive(Clone, Serialize)]
pub struct UiFrame {
    pub snapshot: WorldSnapshot,
    pub completed: bool,
}

#[derive(Clone, Serialize)]
pub struct StateEnvelope {
    pub scenario: String,
    pub tick_seconds: f64,
    /// Seconds until the next tick fires.
    pub remaining_seconds: f64,
    pub frame: Option<UiFrame>,
    pub completed: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid reading: {0}")]
    InvalidReading(String),
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidReading(_) | Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}

struct AppState {
    broadcaster: broadcast::Sender<String>,
    world: Arc<Mutex<World>>,
    pacer: Arc<Mutex<TickAccumulator>>,
    latest_frame: Arc<Mutex<Option<UiFrame>>>,
    frames: Arc<Mutex<VecDeque<UiFrame>>>,
    catalog: AreaCatalog,
    growth: GrowthTable,
    scenario_name: String,
    tick_period: Duration,
    simulation_done: Arc<AtomicBool>,
}

pub struct WebServerConfig {
    pub scenario: Scenario,
    /// Stop after this many ticks; run until shutdown when `None`.
    pub ticks: Option<u64>,
    pub tick_period: Duration,
    pub snapshot_interval: u64,
    pub snapshot_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Swaps in a new reading and restarts the tick period, so a full period
/// must pass under the new reading before it counts.
///
/// Lock order is world, then pacer; the sim loop takes them the same way.
fn apply_reading<'a>(
    world: &'a Mutex<World>,
    pacer: &Mutex<TickAccumulator>,
    reading: EnvironmentReading,
) -> MutexGuard<'a, World> {
    let mut guard = lock(world);
    guard.set_environment(reading);
    lock(pacer).reset();
    guard
}

fn publish(
    frame: UiFrame,
    latest: &Mutex<Option<UiFrame>>,
    frames: &Mutex<VecDeque<UiFrame>>,
    tx: &broadcast::Sender<String>,
) {
    *lock(latest) = Some(frame.clone());
    {
        let mut history = lock(frames);
        if history.len() == MAX_FRAMES {
            history.pop_front();
        }
        history.push_back(frame.clone());
    }
    if let Ok(payload) = serde_json::to_string(&frame) {
        let _ = tx.send(payload);
    }
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        scenario,
        ticks,
        tick_period,
        snapshot_interval,
        snapshot_dir,
        host,
        port,
    } = config;

    let scenario_name = scenario.name.clone();
    let world = Arc::new(Mutex::new(scenario.build_world()));
    let settings = EngineSettings {
        scenario_name: scenario_name.clone(),
        growth: scenario.growth,
        snapshot_interval_ticks: snapshot_interval,
        snapshot_dir,
    };
    let mut engine =
        install_default_systems(EngineBuilder::new(settings), scenario.schedule()).build();

    let (tx, _) = broadcast::channel::<String>(512);
    let latest_frame: Arc<Mutex<Option<UiFrame>>> = Arc::new(Mutex::new(None));
    let frames: Arc<Mutex<VecDeque<UiFrame>>> = Arc::new(Mutex::new(VecDeque::new()));
    let simulation_done = Arc::new(AtomicBool::new(false));
    let stop = Arc::new(AtomicBool::new(false));
    let pacer = Arc::new(Mutex::new(
        TickAccumulator::new(tick_period).with_max_frame(MAX_FRAME_GAP),
    ));

    let world_for_sim = world.clone();
    let pacer_for_sim = pacer.clone();
    let latest_for_sim = latest_frame.clone();
    let frames_for_sim = frames.clone();
    let done_for_sim = simulation_done.clone();
    let stop_for_sim = stop.clone();
    let tx_for_sim = tx.clone();

    let sim_handle = tokio::task::spawn_blocking(move || -> Result<()> {
        let initial = UiFrame {
            snapshot: engine.snapshot(&lock(&world_for_sim)),
            completed: false,
        };
        publish(initial, &latest_for_sim, &frames_for_sim, &tx_for_sim);

        let mut last = Instant::now();
        let mut ticks_run = 0u64;
        while !stop_for_sim.load(Ordering::SeqCst) && ticks.map_or(true, |limit| ticks_run < limit)
        {
            std::thread::sleep(FRAME);
            let mut guard = lock(&world_for_sim);
            let now = Instant::now();
            let mut due = u64::from(lock(&pacer_for_sim).advance(now - last));
            last = now;
            if let Some(limit) = ticks {
                due = due.min(limit - ticks_run);
            }
            if due == 0 {
                continue;
            }
            engine.run_with_hook(&mut guard, due, |snapshot| {
                let frame = UiFrame {
                    snapshot,
                    completed: false,
                };
                publish(frame, &latest_for_sim, &frames_for_sim, &tx_for_sim);
            })?;
            ticks_run += due;
        }

        done_for_sim.store(true, Ordering::SeqCst);
        let final_frame = UiFrame {
            snapshot: engine.snapshot(&lock(&world_for_sim)),
            completed: true,
        };
        publish(final_frame, &latest_for_sim, &frames_for_sim, &tx_for_sim);
        Ok(())
    });

    let state = Arc::new(AppState {
        broadcaster: tx.clone(),
        world,
        pacer,
        latest_frame,
        frames,
        catalog: AreaCatalog::standard(),
        growth: scenario.growth,
        scenario_name: scenario_name.clone(),
        tick_period,
        simulation_done,
    });

    let router = Router::new()
        .route("/api/state", get(latest_state))
        .route("/api/frames", get(all_frames))
        .route("/api/events", get(stream_events))
        .route("/api/resolve", get(resolve))
        .route("/api/forecast", get(forecast))
        .route("/api/environment", get(current_environment).post(set_environment))
        .with_state(state);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;

    info!(%addr, scenario = %scenario_name, "web api listening");

    let listener = TcpListener::bind(addr).await?;
    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    stop.store(true, Ordering::SeqCst);
    match sim_handle.await {
        Ok(Ok(())) => info!(scenario = %scenario_name, "simulation stopped"),
        Ok(Err(err)) => error!(error = ?err, "simulation error"),
        Err(err) => error!(error = ?err, "simulation task failed"),
    }

    served?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down web api");
}

async fn latest_state(State(state): State<Arc<AppState>>) -> Json<StateEnvelope> {
    let frame = lock(&state.latest_frame).clone();
    Json(StateEnvelope {
        scenario: state.scenario_name.clone(),
        tick_seconds: state.tick_period.as_secs_f64(),
        remaining_seconds: lock(&state.pacer).remaining().as_secs_f64(),
        frame,
        completed: state.simulation_done.load(Ordering::SeqCst),
    })
}

#[derive(Serialize)]
struct FramesResponse {
    scenario: String,
    completed: bool,
    frames: Vec<UiFrame>,
}

async fn all_frames(State(state): State<Arc<AppState>>) -> Json<FramesResponse> {
    let frames = lock(&state.frames).iter().cloned().collect();
    Json(FramesResponse {
        scenario: state.scenario_name.clone(),
        completed: state.simulation_done.load(Ordering::SeqCst),
        frames,
    })
}

async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.broadcaster.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok(Event::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}

#[derive(Debug, Deserialize)]
struct ResolveQuery {
    temperature: i32,
    humidity: i32,
    #[serde(alias = "depth")]
    light: i32,
    hour: Option<u32>,
}

#[derive(Serialize)]
struct ResolveResponse {
    reading: EnvironmentReading,
    area: Option<Area>,
    rank: RankInfo,
}

fn check_reading(reading: &EnvironmentReading) -> Result<(), ApiError> {
    if !(0..=SEA_HUMIDITY).contains(&reading.humidity) {
        return Err(ApiError::InvalidReading(format!(
            "humidity {} outside 0..=100",
            reading.humidity
        )));
    }
    Ok(())
}

/// Resolves an arbitrary reading and ranks it for the live creature.
async fn resolve(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let reading = EnvironmentReading::new(query.temperature, query.humidity, query.light);
    check_reading(&reading)?;
    let (creature, clock) = {
        let world = lock(&state.world);
        (world.creature.clone(), world.clock().time())
    };
    let now = match query.hour {
        Some(hour) => NaiveTime::from_hms_opt(hour, 0, 0)
            .ok_or_else(|| ApiError::InvalidQuery(format!("hour {hour} outside 0..=23")))?,
        None => clock,
    };

    let compatibility = CompatibilityEngine::new(&state.catalog);
    let area = compatibility.resolver().resolve_reading(&reading).area().cloned();
    let rank = compatibility.compute_rank(&creature, &reading, &now, creature.attribute);
    Ok(Json(ResolveResponse {
        reading,
        area,
        rank,
    }))
}

async fn forecast(State(state): State<Arc<AppState>>) -> Json<TickPreview> {
    let world = lock(&state.world);
    Json(engine::forecast(&state.catalog, &state.growth, &world))
}

async fn current_environment(State(state): State<Arc<AppState>>) -> Json<EnvironmentReading> {
    Json(lock(&state.world).environment)
}

#[derive(Serialize)]
struct EnvironmentUpdate {
    environment: EnvironmentReading,
    forecast: TickPreview,
}

/// Replaces the live reading until the next scheduled entry falls due and
/// restarts the tick period.
async fn set_environment(
    State(state): State<Arc<AppState>>,
    Json(reading): Json<EnvironmentReading>,
) -> Result<Json<EnvironmentUpdate>, ApiError> {
    if let Err(err) = check_reading(&reading) {
        warn!(error = %err, "rejected environment update");
        return Err(err);
    }
    let world = apply_reading(&state.world, &state.pacer, reading);
    info!(
        temperature = reading.temperature,
        humidity = reading.humidity,
        light = reading.light,
        "environment updated over http"
    );
    Ok(Json(EnvironmentUpdate {
        environment: reading,
        forecast: engine::forecast(&state.catalog, &state.growth, &world),
    }))
}
