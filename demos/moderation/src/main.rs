//! A scripted walk through every Warden subsystem, with timeouts shrunk
//! to seconds so the whole thing finishes quickly.
//!
//! Run with `cargo run -p moderation [config.json]`. Set `RUST_LOG=debug`
//! to see the routine transitions too.

use std::sync::Arc;
use std::time::Duration;

use warden::prelude::*;

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// What a real host would turn into coloured chat lines.
fn render(notice: &Notice, names: &SharedRoster) -> String {
    let name = |id: PlayerId| {
        names
            .get(id)
            .map(|p| p.name)
            .unwrap_or_else(|| id.to_string())
    };
    match *notice {
        Notice::TeleportRequested { requester, target } => {
            format!("{} wants to teleport to {}", name(requester), name(target))
        }
        Notice::TeleportAccepted { requester, target } => {
            format!("{} accepted {}'s request", name(target), name(requester))
        }
        Notice::TeleportExpired { requester, target } => {
            format!("{}'s request to {} expired", name(requester), name(target))
        }
        Notice::NowIdle { player } => format!("{} is now idle", name(player)),
        Notice::Returned { player } => format!("{} is no longer idle", name(player)),
    }
}

fn demo_config() -> WardenConfig {
    WardenConfig {
        ledger_path: std::env::temp_dir().join("warden-demo").join("punishments.json"),
        request: RequestConfig {
            timeout: Duration::from_secs(3),
        },
        idle: IdleConfig {
            threshold: Duration::from_secs(4),
            sweep_interval: Duration::from_secs(1),
        },
        ..WardenConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), WardenError> {
    let config = match std::env::args().nth(1) {
        Some(path) => WardenConfig::from_json_file(path)?,
        None => demo_config(),
    };
    init_tracing(&config.log_filter);

    let roster = Arc::new(SharedRoster::new());
    let (notifier, mut notices) = ChannelNotifier::new();
    let warden = Warden::builder()
        .config(config)
        .roster(Arc::clone(&roster))
        .notifier(Arc::new(notifier))
        .build()?;

    let printer = {
        let roster = Arc::clone(&roster);
        tokio::spawn(async move {
            while let Some(notice) = notices.recv().await {
                tracing::info!(to = ?notice.recipient(), "{}", render(&notice, &roster));
            }
        })
    };

    let steve = PlayerId::random();
    let alex = PlayerId::random();
    let griefer = PlayerId::random();

    // Moderation
    warden.impose_ban(griefer, "Griefer", "burning down spawn", Some(parse_duration("1d12h")?));
    match warden.on_pre_login(griefer, "Griefer") {
        LoginVerdict::Denied { reason, expires_in } => tracing::info!(
            %reason,
            remaining = %expires_in.map(format_duration).unwrap_or_else(|| "forever".into()),
            "Griefer was refused at login"
        ),
        LoginVerdict::Allowed => tracing::warn!("Griefer got in"),
    }
    if let Err(e) = parse_duration("10x") {
        tracing::info!(error = %e, "bad duration rejected");
    }

    warden.on_join(OnlinePlayer::new(steve, "Steve"));
    warden.on_join(OnlinePlayer::new(alex, "Alex"));

    warden.impose_mute(alex, "Alex", "caps lock", Some(Duration::from_secs(2)));
    tracing::info!(allowed = warden.on_chat(alex).is_allowed(), "Alex tries to chat");
    tokio::time::sleep(Duration::from_secs(2)).await;
    tracing::info!(allowed = warden.on_chat(alex).is_allowed(), "Alex tries again");

    // Teleport requests
    warden.request_teleport(steve, alex)?;
    if let Err(e) = warden.request_teleport(steve, steve) {
        tracing::info!(error = %e, "self request rejected");
    }
    let from = warden.accept_teleport(alex)?;
    tracing::info!(%from, "Alex accepted; the host teleports Steve now");

    warden.request_teleport(alex, steve)?;
    tokio::time::sleep(Duration::from_secs(4)).await;
    if let Err(e) = warden.accept_teleport(steve) {
        tracing::info!(error = %e, "too late to accept");
    }

    // Idleness
    warden.on_command(steve);
    tokio::time::sleep(Duration::from_secs(6)).await;
    let spawn = BlockPos::new(0, 64, 0);
    warden.on_move(steve, spawn, BlockPos::new(1, 64, 0));
    tracing::info!(
        steve_idle = warden.is_idle(steve),
        alex_idle = warden.is_idle(alex),
        "after a quiet spell"
    );

    warden.on_quit(steve);
    warden.on_quit(alex);
    warden.revoke_ban_by_name("griefer");

    warden.shutdown()?;
    drop(warden);
    tokio::time::sleep(Duration::from_millis(50)).await;
    printer.abort();
    Ok(())
}
