//! Read-only observation server.
//!
//! Runs the simulation to completion on a blocking task, publishing one
//! frame per cycle. Clients poll `/api/state`, fetch the whole run from
//! `/api/frames`, or subscribe to `/api/stream` for server-sent events.
//! Nothing served here can mutate the simulation.

use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use anyhow::Result;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::{net::TcpListener, sync::broadcast};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::{error, info};

use crate::names::NameCatalog;
use crate::scenario::Scenario;
use crate::snapshot::CitySnapshot;

#[derive(Clone, Serialize)]
pub struct CycleFrame {
    pub snapshot: CitySnapshot,
    pub completed: bool,
}

#[derive(Clone, Serialize)]
pub struct StateEnvelope {
    pub city: String,
    pub total_cycles: u32,
    pub frame: Option<CycleFrame>,
    pub completed: bool,
}

#[derive(Serialize)]
struct FramesResponse {
    city: String,
    total_cycles: u32,
    completed: bool,
    frames: Vec<CycleFrame>,
}

#[derive(Clone)]
struct AppState {
    broadcaster: broadcast::Sender<String>,
    latest_frame: Arc<Mutex<Option<CycleFrame>>>,
    frames: Arc<Mutex<Vec<CycleFrame>>>,
    total_cycles: u32,
    city_name: String,
    simulation_done: Arc<AtomicBool>,
}

pub struct ObserverConfig {
    pub scenario: Scenario,
    pub names: NameCatalog,
    pub cycles: u32,
    pub host: String,
    pub port: u16,
}

pub async fn run(config: ObserverConfig) -> Result<()> {
    let ObserverConfig {
        scenario,
        names,
        cycles,
        host,
        port,
    } = config;

    let city_name = scenario.name.clone();
    let mut simulation = scenario.build_simulation(&names)?;

    let (tx, _) = broadcast::channel::<String>(512);
    let latest_frame: Arc<Mutex<Option<CycleFrame>>> = Arc::new(Mutex::new(None));
    let frames: Arc<Mutex<Vec<CycleFrame>>> = Arc::new(Mutex::new(Vec::new()));
    let simulation_done = Arc::new(AtomicBool::new(false));

    let latest_for_sim = latest_frame.clone();
    let frames_for_sim = frames.clone();
    let done_for_sim = simulation_done.clone();
    let tx_for_sim = tx.clone();

    let sim_handle = tokio::task::spawn_blocking(move || {
        simulation.run_cycles_with_hook(cycles, |sim| {
            let frame = CycleFrame {
                snapshot: CitySnapshot::capture(sim),
                completed: false,
            };
            {
                let mut guard = latest_for_sim.lock().expect("latest frame lock poisoned");
                *guard = Some(frame.clone());
            }
            {
                let mut guard = frames_for_sim.lock().expect("frames lock poisoned");
                guard.push(frame.clone());
            }
            if let Ok(payload) = serde_json::to_string(&frame) {
                let _ = tx_for_sim.send(payload);
            }
        });

        done_for_sim.store(true, Ordering::SeqCst);

        // Re-publish the last frame flagged as final so late subscribers
        // see a terminal marker.
        let final_frame = {
            let guard = latest_for_sim.lock().expect("latest frame lock poisoned");
            guard.clone()
        };
        if let Some(mut frame) = final_frame {
            frame.completed = true;
            {
                let mut guard = latest_for_sim.lock().expect("latest frame lock poisoned");
                *guard = Some(frame.clone());
            }
            {
                let mut guard = frames_for_sim.lock().expect("frames lock poisoned");
                if let Some(last) = guard.last_mut() {
                    *last = frame.clone();
                }
            }
            if let Ok(payload) = serde_json::to_string(&frame) {
                let _ = tx_for_sim.send(payload);
            }
        }
    });

    let state = Arc::new(AppState {
        broadcaster: tx,
        latest_frame,
        frames,
        total_cycles: cycles,
        city_name: city_name.clone(),
        simulation_done,
    });

    tokio::spawn(async move {
        match sim_handle.await {
            Ok(()) => info!(city = %city_name, "simulation run finished"),
            Err(err) => error!(?err, "simulation task failed"),
        }
    });

    let router = Router::new()
        .route("/api/state", get(latest_state))
        .route("/api/frames", get(all_frames))
        .route("/api/stream", get(stream_frames))
        .with_state(state);

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    info!(%addr, "observer listening");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutting down observer");
}

async fn latest_state(State(state): State<Arc<AppState>>) -> Json<StateEnvelope> {
    let frame = state
        .latest_frame
        .lock()
        .expect("latest frame lock poisoned")
        .clone();
    Json(StateEnvelope {
        city: state.city_name.clone(),
        total_cycles: state.total_cycles,
        frame,
        completed: state.simulation_done.load(Ordering::SeqCst),
    })
}

async fn all_frames(State(state): State<Arc<AppState>>) -> Json<FramesResponse> {
    let frames = state.frames.lock().expect("frames lock poisoned").clone();
    Json(FramesResponse {
        city: state.city_name.clone(),
        total_cycles: state.total_cycles,
        completed: state.simulation_done.load(Ordering::SeqCst),
        frames,
    })
}

async fn stream_frames(
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
