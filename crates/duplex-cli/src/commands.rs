//! Subcommand implementations: thin wrappers over the orchestrator.

use std::collections::BTreeSet;

use duplex_client::HttpClient;
use duplex_dr::{CreateDrParams, DrOrchestrator, StorageConfigChoice};

type Orchestrator = DrOrchestrator<HttpClient>;

pub async fn create(
    orchestrator: &Orchestrator,
    source: String,
    target: String,
    dbs: Vec<String>,
    storage_config: StorageConfigChoice,
    parallelism: u32,
    dry_run: bool,
) -> anyhow::Result<()> {
    let params = CreateDrParams {
        storage_config,
        parallelism,
        dry_run,
        ..CreateDrParams::new(source, target, dbs.into_iter().collect())
    };
    let dr_id = orchestrator.create(&params).await?;
    println!("created DR config {dr_id}");
    Ok(())
}

pub async fn delete(orchestrator: &Orchestrator, source: &str, force: bool) -> anyhow::Result<()> {
    let dr_id = orchestrator.delete(source, force).await?;
    println!("deleted DR config {dr_id}");
    Ok(())
}

pub async fn available_tables(orchestrator: &Orchestrator, source: &str) -> anyhow::Result<()> {
    let tables = orchestrator.available_tables(source).await?;
    if tables.is_empty() {
        println!("no tables available to add");
        return Ok(());
    }
    for table in tables {
        // Non-empty tables trigger a full bootstrap copy when added.
        println!(
            "{}  {}  {} bytes",
            table.table_id,
            table.qualified_name(),
            table.size_bytes
        );
    }
    Ok(())
}

pub async fn add_tables(
    orchestrator: &Orchestrator,
    source: &str,
    tables: Vec<String>,
) -> anyhow::Result<()> {
    let requested: BTreeSet<String> = tables.into_iter().collect();
    orchestrator.add_tables(source, &requested).await?;
    println!("added {} table(s) to replication", requested.len());
    Ok(())
}

pub async fn remove_tables(
    orchestrator: &Orchestrator,
    source: &str,
    tables: Vec<String>,
) -> anyhow::Result<()> {
    let requested: BTreeSet<String> = tables.into_iter().collect();
    orchestrator.remove_tables(source, &requested).await?;
    println!("removed {} table(s) from replication", requested.len());
    Ok(())
}

pub async fn switchover(orchestrator: &Orchestrator, source: &str) -> anyhow::Result<()> {
    orchestrator.switchover(source).await?;
    println!("switchover complete; roles are exchanged");
    Ok(())
}

pub async fn failover(orchestrator: &Orchestrator, source: &str) -> anyhow::Result<()> {
    orchestrator.failover(source).await?;
    println!("failover complete; the former replica is now primary with no DR config");
    println!("run `duplex repair` once the failed universe is reachable again");
    Ok(())
}

pub async fn repair(orchestrator: &Orchestrator, source: &str) -> anyhow::Result<()> {
    orchestrator.repair(source).await?;
    println!("repair complete; the failed universe is bootstrapping as the new replica");
    Ok(())
}

pub async fn sync(orchestrator: &Orchestrator, source: &str) -> anyhow::Result<()> {
    orchestrator.sync(source).await?;
    println!("DR config synchronized");
    Ok(())
}

pub async fn pause(orchestrator: &Orchestrator, source: &str) -> anyhow::Result<()> {
    orchestrator.pause(source).await?;
    println!("replication paused");
    Ok(())
}

pub async fn resume(orchestrator: &Orchestrator, source: &str) -> anyhow::Result<()> {
    orchestrator.resume(source).await?;
    println!("replication resumed");
    Ok(())
}
