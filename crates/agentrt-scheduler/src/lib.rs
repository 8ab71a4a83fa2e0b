//! §4.3 Tool Scheduler.
//!
//! A batch of tool calls emitted by one model turn is partitioned into
//! "waves": the largest possible groups of calls whose resource footprints
//! pairwise do not conflict (`agentrt_resources::conflicts`), preserving the
//! model's emitted order within and across waves. Waves run one after
//! another; calls within a wave run concurrently (`futures_util::future::join_all`,
//! the same fan-out idiom used for independent async work throughout the
//! corpus this runtime is built on). Results are always returned in the
//! model's original call order, regardless of which call inside a wave
//! finished first.

use std::sync::Arc;

use agentrt_resources::{conflicts, Resources};
use agentrt_tools::{Tool, ToolRegistry, ToolRunError};
use futures_util::future::join_all;
use serde_json::Value;
use tokio::sync::watch;

/// A single tool call as handed to the scheduler: the model-assigned call id,
/// tool name, and raw (already-accumulated, §4.4) argument string.
#[derive(Debug, Clone)]
pub struct PendingCall {
    pub id: String,
    pub name: String,
    pub raw_arguments: String,
}

/// Outcome of one call, keyed back to its `id` so the driver can graft the
/// result onto the right `tool` message regardless of execution order.
#[derive(Debug, Clone)]
pub struct CallResult {
    pub id: String,
    pub name: String,
    pub outcome: CallOutcome,
}

#[derive(Debug, Clone)]
pub enum CallOutcome {
    Success(Value),
    /// §7 ToolParseFailure — the raw argument string was not valid JSON for
    /// this tool, or referenced a tool the registry does not know.
    ParseFailure(String),
    /// §7 ToolHandlerFailure — the tool ran and returned an error.
    HandlerFailure(String),
    /// The handler cooperatively aborted (`ToolRunError::Aborted`) or the
    /// scheduler's cancellation signal fired before the call started.
    Aborted(String),
}

/// Partition `calls` into waves: maximal runs where, within a wave, no two
/// calls' resolved footprints conflict. A call that conflicts with anything
/// already placed in the current wave starts a new wave. This is a greedy
/// left-to-right partition, not a global optimum — it is however stable and
/// preserves order, which is what the driver's result-grafting depends on.
///
/// Greedy here means non-contiguous: once a call is rejected by a wave it
/// checks every later wave too, so a call can join an earlier wave than the
/// one immediately preceding it in emission order. This is a looser packing
/// than "close the current wave the instant something doesn't fit," but it
/// never reorders results (`run_all` restores emitted order) and it produces
/// strictly fewer waves, which is strictly better for latency.
pub fn plan_waves(registry: &ToolRegistry, calls: &[PendingCall]) -> Vec<Vec<usize>> {
    let mut footprints: Vec<Resources> = Vec::with_capacity(calls.len());
    for call in calls {
        // An unknown tool name or an unparsable argument string each become a
        // structured per-call error in `run_one` (§4.3) — they must not abort
        // scheduling for the rest of the batch. Give either case the widest
        // possible footprint ("all files" write) so the errored call never
        // races ahead of real work; it serializes into its own wave instead.
        let footprint = registry
            .get(&call.name)
            .and_then(|tool| serde_json::from_str::<Value>(&call.raw_arguments).ok().map(|parsed| tool.resolve_resources(&parsed)))
            .unwrap_or_else(|| {
                Resources::files(agentrt_resources::FileAccess::all(agentrt_resources::FileMode::Write))
            });
        footprints.push(footprint);
    }

    let mut waves: Vec<Vec<usize>> = Vec::new();
    let mut wave_footprints: Vec<Resources> = Vec::new();

    'outer: for (idx, footprint) in footprints.iter().enumerate() {
        for (wave, wave_footprint) in waves.iter_mut().zip(wave_footprints.iter_mut()) {
            if !conflicts(wave_footprint, footprint) {
                *wave_footprint = wave_footprint.merge(footprint);
                wave.push(idx);
                continue 'outer;
            }
        }
        waves.push(vec![idx]);
        wave_footprints.push(footprint.clone());
    }

    waves
}

/// Execute `calls` wave by wave. `cancel` is checked before each call starts;
/// once it fires, pending calls (not yet started) resolve to `Aborted`
/// without running their handler, and calls already in flight are left to
/// run to completion within the current wave (cooperative, not preemptive —
/// a handler notices `cancel` itself via `Tool::run`'s contract, §5).
pub async fn run_all(registry: &ToolRegistry, calls: &[PendingCall], cancel: &watch::Receiver<bool>) -> Vec<CallResult> {
    let waves = plan_waves(registry, calls);
    let mut results: Vec<Option<CallResult>> = vec![None; calls.len()];

    for wave in waves {
        if *cancel.borrow() {
            tracing::debug!(remaining = wave.len(), "cancellation signal set, aborting wave");
            for idx in wave {
                results[idx] = Some(CallResult {
                    id: calls[idx].id.clone(),
                    name: calls[idx].name.clone(),
                    outcome: CallOutcome::Aborted("cancelled before wave start".to_string()),
                });
            }
            continue;
        }

        let futures = wave.iter().map(|&idx| run_one(registry, &calls[idx]));
        let wave_results = join_all(futures).await;
        for (idx, result) in wave.into_iter().zip(wave_results) {
            results[idx] = Some(result);
        }
    }

    results.into_iter().map(|r| r.expect("every index assigned by its wave")).collect()
}

async fn run_one(registry: &ToolRegistry, call: &PendingCall) -> CallResult {
    let tool = match registry.get(&call.name) {
        Some(tool) => tool.clone(),
        None => {
            return CallResult {
                id: call.id.clone(),
                name: call.name.clone(),
                outcome: CallOutcome::ParseFailure(format!("unknown tool: {}", call.name)),
            }
        }
    };

    let parsed: Value = match serde_json::from_str(&call.raw_arguments) {
        Ok(v) => v,
        Err(err) => {
            return CallResult {
                id: call.id.clone(),
                name: call.name.clone(),
                outcome: CallOutcome::ParseFailure(format!(
                    "invalid arguments for {}: {err}",
                    call.name
                )),
            };
        }
    };

    tool.on_start(&parsed);
    let outcome = tool.run(parsed).await;
    tool.on_complete(&outcome);

    let outcome = match outcome {
        Ok(value) => CallOutcome::Success(value),
        Err(ToolRunError::Failed(message)) => CallOutcome::HandlerFailure(message),
        Err(ToolRunError::Aborted(message)) => CallOutcome::Aborted(message),
    };

    CallResult {
        id: call.id.clone(),
        name: call.name.clone(),
        outcome,
    }
}
