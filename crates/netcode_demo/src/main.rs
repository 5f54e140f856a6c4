//! Drives a roster of drones through every list mutation and helper query,
//! logging each change event.

mod config;
mod roster;

use anyhow::Result;
use config::DemoConfig;
use netcode::{HandleListExt, Registry};
use roster::Roster;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = DemoConfig::load()?;
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting roster demo with {} drones", config.spawn_count);
    let mut roster = Roster::new(config.registry.clone());

    let mut spawned = Vec::with_capacity(config.spawn_count);
    for i in 0..config.spawn_count {
        let battery = (i as u32 * 37) % 100;
        spawned.push(roster.add(battery)?);
    }

    roster.insert(config.insert_index, 100)?;
    roster.replace(config.value_index, 75)?;
    let removed = roster.remove_at(config.remove_index)?;
    tracing::info!("Removed handle {:?}", removed);
    if let Some(lead) = roster.drone_at(0) {
        tracing::info!("Lead drone is {} at {}%", lead.callsign, lead.battery);
    }
    tracing::info!("Roster: {:?}", roster.callsigns()?);

    let registry = roster.registry();
    let drones = roster.drones();
    if let Some(strongest) = drones.find(registry, |d| d.battery >= 70)? {
        tracing::info!("First drone above 70%: {}", strongest.callsign);
    }
    let low = drones.find_all(registry, |d| d.battery <= config.recall_battery)?;
    tracing::info!("{} drones need recall", low.len());
    if drones.any(registry, |d| d.battery == 0)? {
        tracing::warn!("A drone has an empty battery");
    }
    let mut total = 0;
    drones.for_each_resolved(registry, |d| total += d.battery)?;
    tracing::info!("Total battery across roster: {}", total);

    let recalled = roster.recall(config.recall_battery)?;
    tracing::info!("Recalled {:?}", recalled);
    let listed = spawned
        .iter()
        .filter(|id| roster.is_listed(**id).unwrap_or(false))
        .count();
    tracing::info!("{} of the first {} drones still listed", listed, spawned.len());

    // Despawn one listed drone behind the list's back, then clean up
    if let Some(&id) = spawned.iter().rev().find(|id| roster.registry().is_spawned(**id)) {
        roster.despawn(id);
        if let Err(e) = roster.callsigns() {
            tracing::warn!("Roster out of sync: {}", e);
        }
        tracing::info!("Pruned {} stale handles", roster.prune());
    }

    tracing::info!("Final roster: {:?}", roster.callsigns()?);
    roster.clear();
    Ok(())
}
