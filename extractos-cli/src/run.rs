//! The daily run: one token, then fetch → normalize → write for each account in order.
//!
//! Any provider error stops the run. Workbooks already written stay on disk and
//! the remaining accounts are not processed (nor logged as having no movements).

use anyhow::{Context, Result};
use chrono::NaiveDate;
use extractos_api::ProviderClient;
use extractos_core::{normalize, Account};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::export;

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub root: PathBuf,
    pub sheet_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedStatement {
    pub entity: String,
    pub rows: usize,
    pub path: PathBuf,
}

/// What one run produced. An entity is either exported or without activity, never both.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub date: NaiveDate,
    pub exported: Vec<ExportedStatement>,
    pub without_activity: Vec<String>,
    pub log_path: PathBuf,
}

pub async fn run(
    client: &ProviderClient,
    accounts: &[Account],
    date: NaiveDate,
    output: &OutputOptions,
) -> Result<RunSummary> {
    let movements_dir = export::movements_dir(&output.root, date);
    let no_activity_dir = export::no_activity_dir(&output.root, date);
    for dir in [&movements_dir, &no_activity_dir] {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }

    let token = client
        .acquire_token()
        .await
        .context("acquiring access token")?;

    let mut exported = Vec::new();
    let mut without_activity = Vec::new();
    let mut written: HashSet<PathBuf> = HashSet::new();

    for account in accounts {
        let entity = &account.entity_name;
        info!(
            entity = %entity,
            bank = %account.bank_number,
            account = %account.account_number,
            %date,
            "fetching statements"
        );

        let records = client
            .fetch_statements(&token, &account.account_number, &account.bank_number, date)
            .await
            .with_context(|| format!("fetching statements for {entity}"))?;
        let table = normalize(&records);

        if table.is_empty() {
            println!("{entity}: 0 movimientos");
            without_activity.push(entity.clone());
        } else {
            println!("{entity}: {} movimientos — exportando…", table.len());
            let path = movements_dir.join(export::statement_file_name(entity, date));
            if !written.insert(path.clone()) {
                warn!(
                    entity = %entity,
                    path = %path.display(),
                    "file name already used this run, overwriting"
                );
            }
            export::write_statement_xlsx(&table, &path, &output.sheet_name)?;
            println!("  Guardado en «{}»", path.display());
            exported.push(ExportedStatement {
                entity: entity.clone(),
                rows: table.len(),
                path,
            });
        }
        println!();
    }

    let log_path = export::write_no_activity_log(&no_activity_dir, date, &without_activity)?;
    println!(
        "Log de bancos sin movimientos guardado en «{}»",
        log_path.display()
    );

    Ok(RunSummary {
        date,
        exported,
        without_activity,
        log_path,
    })
}
