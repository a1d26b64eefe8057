mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use commands::{Cli, Commands, OutputFormat};
use error::AppError;
use log::{debug, info, warn};
use proofmind_core::codec::format_egld;
use proofmind_core::native::{FileStorage, NativeProxyProvider};
use proofmind_core::store::{category_breakdown, dashboard_stats};
use proofmind_core::{
    session, Certificate, CoreError, CreateCertificateRequest, LocalKeyBridge, NetworkConfig,
    ProofMindContext, TransactionStatus, UpdateCertificateRequest, WalletInfo,
};
use serde::Serialize;
use std::path::Path;
use std::rc::Rc;

const POLL_INTERVAL_MS: u64 = 2_000;
const MAX_POLLS: u32 = 30;

// The context is built on Rc, so everything stays on one thread.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if let Err(error) = run(cli).await {
        eprintln!("{} {}", "ERROR:".red(), error);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    if let Commands::NewKey { output, force } = &cli.command {
        let path = output.as_deref().unwrap_or(cli.key.as_path());
        return new_key(path, *force, cli.format);
    }

    let config_path = cli.config.to_string_lossy().to_string();
    let config = NetworkConfig::from_file(&config_path)?;
    config.validate()?;
    debug!("Loaded network config from {} (chain {})", config_path, config.chain_id);

    let network = Rc::new(NativeProxyProvider::new(&config.api_url));
    let storage = FileStorage::new(&cli.session_dir);
    let mut ctx = ProofMindContext::new(config, network);

    match cli.command {
        Commands::NewKey { .. } => Ok(()),

        Commands::Connect { provider } => {
            let bridge = Rc::new(load_key(&cli.key)?);
            let wallet = ctx.connect(provider, bridge).await?;
            session::persist(&storage, &wallet).await?;
            info!("Session saved under {}", storage.base_dir().display());
            print_wallet(cli.format, &wallet)
        }

        Commands::Disconnect => {
            match load_key(&cli.key) {
                Ok(bridge) => {
                    if ctx.restore_session(&storage, Rc::new(bridge)).await?.is_some() {
                        if let Err(e) = ctx.disconnect().await {
                            warn!("Wallet did not log out cleanly: {}", e);
                        }
                    }
                }
                Err(e) => warn!("Skipping wallet logout: {}", e),
            }
            session::forget(&storage).await?;
            println!("Disconnected");
            Ok(())
        }

        Commands::Status => {
            let bridge = Rc::new(load_key(&cli.key)?);
            match ctx.restore_session(&storage, bridge).await? {
                Some(wallet) => {
                    session::persist(&storage, &wallet).await?;
                    print_wallet(cli.format, &wallet)
                }
                None => {
                    println!("No wallet session");
                    Ok(())
                }
            }
        }

        Commands::Certify { id, text, category, metadata, tags, wait } => {
            resume(&mut ctx, &storage, &cli.key).await?;
            let request = CreateCertificateRequest {
                proof_text: text,
                proof_id: id,
                category,
                metadata,
                ai_tags: (!tags.is_empty()).then_some(tags),
            };
            let tx_hash = ctx.create_certificate(request).await?;
            report_transaction(&ctx, cli.format, &tx_hash, wait).await
        }

        Commands::Update { id, text, category, metadata, tags, wait } => {
            resume(&mut ctx, &storage, &cli.key).await?;
            let request = UpdateCertificateRequest {
                proof_id: id,
                new_proof_text: text,
                new_category: category,
                new_metadata: metadata,
                new_ai_tags: (!tags.is_empty()).then_some(tags),
            };
            let tx_hash = ctx.update_certificate(request).await?;
            report_transaction(&ctx, cli.format, &tx_hash, wait).await
        }

        Commands::Get { id, owner } => {
            let owner = resolve_owner(owner, &storage).await?;
            match ctx.get_certificate(&owner, &id).await {
                Some(cert) => emit(cli.format, &cert, || print_certificate(&cert)),
                None => {
                    println!("No certificate {} for {}", id, owner);
                    Ok(())
                }
            }
        }

        Commands::List { owner } => {
            let owner = resolve_owner(owner, &storage).await?;
            let certificates = ctx.get_user_certificates(&owner).await;
            emit(cli.format, &certificates, || {
                if certificates.is_empty() {
                    println!("No certificates for {}", owner);
                }
                for cert in &certificates {
                    print_certificate(cert);
                    println!();
                }
            })
        }

        Commands::Stats { owner } => {
            let owner = resolve_owner(owner, &storage).await?;
            let certificates = ctx.get_user_certificates(&owner).await;
            let stats = dashboard_stats(&certificates);
            let breakdown = category_breakdown(&certificates);
            let report = serde_json::json!({ "dashboard": stats, "categories": breakdown });
            emit(cli.format, &report, || {
                println!("Total:      {}", stats.total_certificates);
                println!("Verified:   {}", stats.verified_certificates);
                println!("Pending:    {}", stats.pending_certificates);
                println!("Categories: {}", stats.categories_count);
                if let Some(ts) = stats.last_activity {
                    println!("Last activity: {}", ts);
                }
                for entry in &breakdown {
                    println!("  {:<14} {:>4} ({}%)", entry.category, entry.count, entry.percentage);
                }
            })
        }

        Commands::Total { category } => {
            let count = match &category {
                Some(category) => ctx.get_category_stats(category).await,
                None => ctx.get_total_certificates().await,
            };
            emit(cli.format, &count, || match &category {
                Some(category) => println!("{}: {}", category, count),
                None => println!("{}", count),
            })
        }

        Commands::TxStatus { hash, wait } => {
            let status = if wait {
                ctx.gateway().wait_for_transaction(&hash, POLL_INTERVAL_MS, MAX_POLLS).await?
            } else {
                ctx.transaction_status(&hash).await?
            };
            emit(cli.format, &status, || print_status(&status))
        }
    }
}

fn load_key(path: &Path) -> Result<LocalKeyBridge, AppError> {
    let pem = std::fs::read_to_string(path).map_err(|e| AppError::InvalidKey {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    LocalKeyBridge::from_pem(&pem).map_err(|e| AppError::InvalidKey {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn new_key(path: &Path, force: bool, format: OutputFormat) -> Result<(), AppError> {
    if path.exists() && !force {
        return Err(AppError::KeyExists(path.display().to_string()));
    }
    let bridge = LocalKeyBridge::generate()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bridge.to_pem())?;
    info!("Wrote key for {} to {}", bridge.address(), path.display());
    emit(format, &bridge.address(), || println!("{}", bridge.address()))
}

/// Re-attach to the remembered session. Writes need one.
async fn resume(
    ctx: &mut ProofMindContext,
    storage: &FileStorage,
    key: &Path,
) -> Result<WalletInfo, AppError> {
    let bridge = Rc::new(load_key(key)?);
    let wallet = ctx
        .restore_session(storage, bridge)
        .await?
        .ok_or(CoreError::NotConnected)?;
    session::persist(storage, &wallet).await?;
    Ok(wallet)
}

async fn resolve_owner(explicit: Option<String>, storage: &FileStorage) -> Result<String, AppError> {
    if let Some(owner) = explicit {
        return Ok(owner);
    }
    session::load_session(storage)
        .await?
        .filter(|w| w.is_connected)
        .map(|w| w.address)
        .ok_or(AppError::NoOwner)
}

async fn report_transaction(
    ctx: &ProofMindContext,
    format: OutputFormat,
    tx_hash: &str,
    wait: bool,
) -> Result<(), AppError> {
    let status = if wait {
        Some(
            ctx.gateway()
                .wait_for_transaction(tx_hash, POLL_INTERVAL_MS, MAX_POLLS)
                .await?,
        )
    } else {
        None
    };
    let url = ctx.gateway().transaction_url(tx_hash);
    let report = serde_json::json!({ "txHash": tx_hash, "explorerUrl": url, "status": status });
    emit(format, &report, || {
        println!("Transaction: {}", tx_hash);
        println!("Explorer:    {}", url);
        if let Some(status) = &status {
            print_status(status);
        }
    })
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, plain: impl FnOnce()) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Plain => plain(),
    }
    Ok(())
}

fn print_wallet(format: OutputFormat, wallet: &WalletInfo) -> Result<(), AppError> {
    let balance = format_egld(&wallet.balance)?;
    emit(format, wallet, || {
        println!("Address:  {}", wallet.address);
        println!("Provider: {}", wallet.provider);
        println!("Balance:  {} EGLD", balance);
    })
}

fn print_certificate(cert: &Certificate) {
    println!("{} [{}]", cert.proof_id.bold(), cert.category);
    println!("  Status:     {} (confidence {})", cert.verification_status, cert.confidence_score);
    match cert.created_at() {
        Some(at) => println!("  Created:    {}", at.to_rfc3339()),
        None => println!("  Created:    {}", cert.timestamp),
    }
    if !cert.ai_tags.is_empty() {
        println!("  Tags:       {}", cert.ai_tags.join(", "));
    }
    println!("  Text:       {}", cert.proof_text);
}

fn print_status(status: &TransactionStatus) {
    let label = match status {
        TransactionStatus::Success => "success".green(),
        TransactionStatus::Fail | TransactionStatus::Invalid => {
            format!("{:?}", status).to_lowercase().red()
        }
        TransactionStatus::Pending => "pending".yellow(),
        TransactionStatus::Unknown(name) => name.as_str().normal(),
    };
    println!("Status:      {}", label);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proofmind_core::ProviderKind;

    fn wallet(address: &str, connected: bool) -> WalletInfo {
        WalletInfo {
            address: address.to_string(),
            balance: "0".to_string(),
            is_connected: connected,
            provider: ProviderKind::Extension,
        }
    }

    #[tokio::test]
    async fn test_owner_prefers_explicit_address() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        session::persist(&storage, &wallet("erd1stored", true)).await.unwrap();
        let owner = resolve_owner(Some("erd1explicit".to_string()), &storage).await.unwrap();
        assert_eq!(owner, "erd1explicit");
    }

    #[tokio::test]
    async fn test_owner_falls_back_to_session() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        session::persist(&storage, &wallet("erd1stored", true)).await.unwrap();
        assert_eq!(resolve_owner(None, &storage).await.unwrap(), "erd1stored");
    }

    #[tokio::test]
    async fn test_owner_missing_without_session() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        session::persist(&storage, &wallet("erd1stored", false)).await.unwrap();
        assert!(matches!(resolve_owner(None, &storage).await, Err(AppError::NoOwner)));
    }

    #[test]
    fn test_new_key_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys/wallet.pem");
        new_key(&path, false, OutputFormat::Json).unwrap();
        let bridge = load_key(&path).unwrap();
        assert!(bridge.address().starts_with("erd1"));
        assert!(matches!(
            new_key(&path, false, OutputFormat::Json),
            Err(AppError::KeyExists(_))
        ));
        new_key(&path, true, OutputFormat::Json).unwrap();
        assert_ne!(load_key(&path).unwrap().address(), bridge.address());
    }
}
