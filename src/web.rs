use actix_web::{middleware, web, App, HttpResponse, HttpServer, Result};
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::error::AllocationError;
use crate::records::write_lineup_to;
use crate::schedule::{
    allocate, allocate_with_rng, calculate_variance, get_player_quarter_breakdown,
    get_subs_for_quarter, swap_positions, swap_with_sub, update_slot, Allocation, MatchConfig,
    PlayerId, QuarterLabel, VarianceStats,
};

/// The lineup currently being edited. Held in memory only.
pub struct StoredLineup {
    pub roster: Vec<PlayerId>,
    pub config: MatchConfig,
    pub allocation: Allocation,
    pub generated_at: DateTime<Utc>,
}

pub struct AppState {
    pub lineup: Mutex<Option<StoredLineup>>,
    pub default_config: MatchConfig,
}

#[derive(Deserialize)]
pub struct AllocateRequest {
    roster: Vec<PlayerId>,
    config: Option<MatchConfig>,
    #[serde(default)]
    manual_goalkeepers: Vec<Option<PlayerId>>,
    seed: Option<u64>,
}

#[derive(Deserialize)]
pub struct SwapRequest {
    quarter: u32,
    slot_a: usize,
    slot_b: usize,
}

#[derive(Deserialize)]
pub struct SwapSubRequest {
    quarter: u32,
    slot: usize,
    bench_player: PlayerId,
}

#[derive(Deserialize)]
pub struct UpdateSlotRequest {
    quarter: u32,
    slot: usize,
    player: PlayerId,
}

#[derive(Serialize)]
pub struct AllocationResponse<'a> {
    allocation: &'a Allocation,
    stats: VarianceStats,
    generated_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct SubsResponse {
    quarter: u32,
    subs: Vec<PlayerId>,
}

#[derive(Serialize)]
pub struct BreakdownResponse {
    player: PlayerId,
    quarters: Vec<QuarterLabel>,
    total_minutes: u32,
}

fn lock_lineup(state: &AppState) -> Result<MutexGuard<'_, Option<StoredLineup>>> {
    state
        .lineup
        .lock()
        .map_err(|_| actix_web::error::ErrorInternalServerError("lineup state poisoned"))
}

fn no_lineup() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({"error": "No lineup generated yet"}))
}

fn error_response(err: &AllocationError) -> HttpResponse {
    let body = serde_json::json!({"success": false, "error": err.to_string()});
    if err.is_input_error() {
        HttpResponse::BadRequest().json(body)
    } else {
        HttpResponse::UnprocessableEntity().json(body)
    }
}

fn lineup_response(lineup: &StoredLineup) -> HttpResponse {
    HttpResponse::Ok().json(AllocationResponse {
        allocation: &lineup.allocation,
        stats: calculate_variance(&lineup.allocation),
        generated_at: lineup.generated_at,
    })
}

// Generate a fresh lineup and make it the current one
async fn post_allocate(
    req: web::Json<AllocateRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let req = req.into_inner();
    let config = req.config.unwrap_or_else(|| state.default_config.clone());

    let result = match req.seed {
        Some(seed) => allocate_with_rng(
            &req.roster,
            &config,
            &req.manual_goalkeepers,
            &mut ChaCha8Rng::seed_from_u64(seed),
        ),
        None => allocate(&req.roster, &config, &req.manual_goalkeepers),
    };

    match result {
        Ok(allocation) => {
            info!(players = req.roster.len(), warnings = allocation.warnings().len(), "lineup generated via API");
            let lineup = StoredLineup {
                roster: req.roster,
                config,
                allocation,
                generated_at: Utc::now(),
            };
            let response = lineup_response(&lineup);
            *lock_lineup(&state)? = Some(lineup);
            Ok(response)
        }
        Err(e) => Ok(error_response(&e)),
    }
}

async fn get_allocation(state: web::Data<AppState>) -> Result<HttpResponse> {
    let lineup = lock_lineup(&state)?;
    match lineup.as_ref() {
        Some(lineup) => Ok(lineup_response(lineup)),
        None => Ok(no_lineup()),
    }
}

/// Applies an edit to the stored lineup; a rejected edit leaves it untouched
fn apply_edit<F>(state: &AppState, edit: F) -> Result<HttpResponse>
where
    F: FnOnce(&StoredLineup) -> std::result::Result<Allocation, AllocationError>,
{
    let mut guard = lock_lineup(state)?;
    let Some(lineup) = guard.as_mut() else {
        return Ok(no_lineup());
    };
    match edit(lineup) {
        Ok(allocation) => {
            lineup.allocation = allocation;
            Ok(lineup_response(lineup))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

async fn post_swap(req: web::Json<SwapRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    apply_edit(&state, |lineup| {
        swap_positions(
            &lineup.allocation,
            &lineup.config,
            req.quarter,
            req.slot_a,
            req.slot_b,
            Some(lineup.roster.as_slice()),
        )
    })
}

async fn post_swap_sub(req: web::Json<SwapSubRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    apply_edit(&state, |lineup| {
        swap_with_sub(
            &lineup.allocation,
            &lineup.config,
            req.quarter,
            req.slot,
            &req.bench_player,
            &lineup.roster,
        )
    })
}

async fn post_update_slot(req: web::Json<UpdateSlotRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    apply_edit(&state, |lineup| update_slot(&lineup.allocation, req.quarter, req.slot, &req.player))
}

async fn get_subs(quarter: web::Path<u32>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let quarter = quarter.into_inner();
    let lineup = lock_lineup(&state)?;
    let Some(lineup) = lineup.as_ref() else {
        return Ok(no_lineup());
    };
    match get_subs_for_quarter(&lineup.allocation, quarter, &lineup.roster) {
        Ok(subs) => Ok(HttpResponse::Ok().json(SubsResponse { quarter, subs })),
        Err(e) => Ok(HttpResponse::NotFound().json(serde_json::json!({"error": e.to_string()}))),
    }
}

async fn get_breakdown(player: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let player = player.into_inner();
    let lineup = lock_lineup(&state)?;
    let Some(lineup) = lineup.as_ref() else {
        return Ok(no_lineup());
    };
    if !lineup.allocation.summary().contains_key(&player) {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({"error": format!("Unknown player: {}", player)})));
    }
    Ok(HttpResponse::Ok().json(BreakdownResponse {
        quarters: get_player_quarter_breakdown(&lineup.allocation, &player),
        total_minutes: lineup.allocation.total_minutes(&player),
        player,
    }))
}

async fn get_export(state: web::Data<AppState>) -> Result<HttpResponse> {
    let lineup = lock_lineup(&state)?;
    let Some(lineup) = lineup.as_ref() else {
        return Ok(no_lineup());
    };
    let mut buffer = Vec::new();
    write_lineup_to(&lineup.allocation, &mut buffer)
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Failed to export lineup: {}", e)))?;
    Ok(HttpResponse::Ok().content_type("text/csv").body(buffer))
}

/// Registers the JSON API routes; shared by the server and the handler tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/allocate", web::post().to(post_allocate))
        .route("/api/allocation", web::get().to(get_allocation))
        .route("/api/swap", web::post().to(post_swap))
        .route("/api/swap-sub", web::post().to(post_swap_sub))
        .route("/api/update-slot", web::post().to(post_update_slot))
        .route("/api/subs/{quarter}", web::get().to(get_subs))
        .route("/api/breakdown/{player}", web::get().to(get_breakdown))
        .route("/api/export.csv", web::get().to(get_export));
}

pub async fn start_server(port: u16, default_config: MatchConfig) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState {
        lineup: Mutex::new(None),
        default_config,
    });

    info!(port, "starting lineup API");
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
