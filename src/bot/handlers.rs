//! Telegram command surface.
//!
//! One command per supported platform plus the public info commands and the
//! privileged admin commands. Platform commands funnel into the
//! [`Orchestrator`]; everything else is rendered directly here.

use crate::config::Settings;
use crate::delivery::TelegramDelivery;
use crate::orchestrator::{ExtractionRequest, Orchestrator};
use crate::platforms::{FormatHint, Platform};
use crate::stats::{StatsSnapshot, UsageStats};
use anyhow::Result;
use chrono::Utc;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};

/// Pause between broadcast sends so the Bot API does not throttle us.
const BROADCAST_PAUSE: Duration = Duration::from_millis(50);

/// All bot commands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "show the welcome message")]
    Start,
    #[command(description = "show the welcome message")]
    Help,
    #[command(description = "bot info and uptime")]
    About,
    #[command(description = "detailed statistics (admin)")]
    Stats,
    #[command(description = "broadcast a message to all known users (admin)")]
    Broadcast(String),
    #[command(description = "admin command list (admin)")]
    Adminhelp,

    #[command(description = "download an Instagram post")]
    Instagram(String),
    #[command(description = "download a Facebook video")]
    Facebook(String),
    #[command(description = "download a TikTok video")]
    Tiktok(String),
    #[command(description = "download an X post")]
    X(String),
    #[command(description = "download a Pinterest pin")]
    Pinterest(String),
    #[command(description = "download a Threads post")]
    Threads(String),
    #[command(description = "download a YouTube video: /youtube [format] <url>")]
    Youtube(String),
    #[command(description = "download a Spotify track")]
    Spotify(String),
    #[command(description = "download a SoundCloud track")]
    Soundcloud(String),
    #[command(description = "download a MediaFire file")]
    Mediafire(String),
    #[command(description = "download a CapCut template")]
    Capcut(String),
    #[command(rename = "yt_trans", description = "fetch a YouTube transcript")]
    YtTrans(String),
}

/// User id from a message, or 0 when the sender is hidden.
#[must_use]
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Routes one parsed command.
///
/// # Errors
///
/// Returns an error only when a direct reply fails to send; pipeline
/// failures are handled inside the orchestrator.
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    orchestrator: Arc<Orchestrator>,
    settings: Arc<Settings>,
    stats: Arc<UsageStats>,
) -> Result<()> {
    match cmd {
        Command::Start | Command::Help => start(&bot, &msg).await,
        Command::About => about(&bot, &msg, &stats).await,
        Command::Stats => admin_stats(&bot, &msg, &settings, &stats).await,
        Command::Broadcast(text) => broadcast(&bot, &msg, &settings, &stats, &text).await,
        Command::Adminhelp => adminhelp(&bot, &msg, &settings).await,

        Command::Instagram(args) => {
            run_platform(&bot, &msg, &orchestrator, Platform::Instagram, &args).await
        }
        Command::Facebook(args) => {
            run_platform(&bot, &msg, &orchestrator, Platform::Facebook, &args).await
        }
        Command::Tiktok(args) => {
            run_platform(&bot, &msg, &orchestrator, Platform::Tiktok, &args).await
        }
        Command::X(args) => run_platform(&bot, &msg, &orchestrator, Platform::X, &args).await,
        Command::Pinterest(args) => {
            run_platform(&bot, &msg, &orchestrator, Platform::Pinterest, &args).await
        }
        Command::Threads(args) => {
            run_platform(&bot, &msg, &orchestrator, Platform::Threads, &args).await
        }
        Command::Youtube(args) => youtube(&bot, &msg, &orchestrator, &args).await,
        Command::Spotify(args) => {
            run_platform(&bot, &msg, &orchestrator, Platform::Spotify, &args).await
        }
        Command::Soundcloud(args) => {
            run_platform(&bot, &msg, &orchestrator, Platform::Soundcloud, &args).await
        }
        Command::Mediafire(args) => {
            run_platform(&bot, &msg, &orchestrator, Platform::Mediafire, &args).await
        }
        Command::Capcut(args) => {
            run_platform(&bot, &msg, &orchestrator, Platform::Capcut, &args).await
        }
        Command::YtTrans(args) => {
            run_platform(&bot, &msg, &orchestrator, Platform::YtTranscript, &args).await
        }
    }
}

async fn run_platform(
    bot: &Bot,
    msg: &Message,
    orchestrator: &Orchestrator,
    platform: Platform,
    args: &str,
) -> Result<()> {
    let url = args.trim();
    if url.is_empty() {
        let usage = format!("Usage: /{} <url>", platform.command_name());
        bot.send_message(msg.chat.id, usage).await?;
        return Ok(());
    }

    dispatch(bot, msg, orchestrator, platform, url, None).await;
    Ok(())
}

/// `/youtube [format] <url>`; the optional leading token is restricted to
/// the fixed format set.
async fn youtube(bot: &Bot, msg: &Message, orchestrator: &Orchestrator, args: &str) -> Result<()> {
    let Some((hint, url)) = parse_youtube_args(args) else {
        let usage = format!(
            "Usage: /youtube [format] <url>\nFormats: {}",
            FormatHint::ALLOWED.join(", ")
        );
        bot.send_message(msg.chat.id, usage).await?;
        return Ok(());
    };

    dispatch(bot, msg, orchestrator, Platform::Youtube, url, hint).await;
    Ok(())
}

/// Splits `/youtube` arguments into an optional format hint and the URL.
/// `None` means the input is malformed and the usage message applies. A lone
/// format token is not mistaken for a URL.
fn parse_youtube_args(args: &str) -> Option<(Option<FormatHint>, &str)> {
    let mut parts = args.split_whitespace();
    let first = parts.next()?;
    match parts.next() {
        None => {
            if first.parse::<FormatHint>().is_ok() {
                return None;
            }
            Some((None, first))
        }
        Some(url) => match first.parse::<FormatHint>() {
            Ok(hint) => Some((Some(hint), url)),
            Err(()) => None,
        },
    }
}

async fn dispatch(
    bot: &Bot,
    msg: &Message,
    orchestrator: &Orchestrator,
    platform: Platform,
    url: &str,
    format_hint: Option<FormatHint>,
) {
    let user_id = get_user_id_safe(msg);
    info!(user_id, command = platform.command_name(), "relay request");

    let delivery = Arc::new(TelegramDelivery::new(bot.clone(), msg.chat.id));
    let request = ExtractionRequest {
        platform,
        source_url: url.to_string(),
        format_hint,
    };
    orchestrator.handle(delivery, user_id, request).await;
}

async fn start(bot: &Bot, msg: &Message) -> Result<()> {
    let name = msg
        .from
        .as_ref()
        .map_or("there", |u| u.first_name.as_str());
    let text = format!(
        "Welcome, {}!\n\n\
         I'm a social media downloader bot.\n\n\
         <b>Supported platforms:</b>\n\
         /instagram /facebook /tiktok /x /pinterest\n\
         /youtube /spotify /soundcloud /mediafire /capcut\n\
         /threads /yt_trans\n\n\
         Example:\n<code>/tiktok https://www.tiktok.com/@...</code>\n\n\
         /help /about",
        html_escape::encode_text(name)
    );
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

async fn about(bot: &Bot, msg: &Message, stats: &UsageStats) -> Result<()> {
    let snap = stats.snapshot();
    let text = format!(
        "<b>Bot info</b>\n\n\
         Uptime: {}\n\
         Total users: {}\n\
         Total requests: {}\n\
         Success rate: {:.1}%",
        format_uptime(&snap),
        snap.unique_users,
        snap.total_requests,
        snap.success_rate()
    );
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

async fn admin_stats(
    bot: &Bot,
    msg: &Message,
    settings: &Settings,
    stats: &UsageStats,
) -> Result<()> {
    if !is_admin(settings, msg) {
        bot.send_message(msg.chat.id, "Admin only").await?;
        return Ok(());
    }

    let snap = stats.snapshot();
    let mut text = format!(
        "<b>Bot statistics</b>\n\n\
         Uptime: {}\n\
         Unique users: {}\n\
         Total requests: {}\n\
         Success: {} | Failed: {}\n\
         Top commands:\n",
        format_uptime(&snap),
        snap.unique_users,
        snap.total_requests,
        snap.successful_requests,
        snap.failed_requests
    );
    if snap.top_commands.is_empty() {
        text.push_str("None yet");
    } else {
        for (command, count) in snap.top_commands.iter().take(5) {
            let _ = writeln!(text, "• /{command}: {count}");
        }
    }

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

async fn broadcast(
    bot: &Bot,
    msg: &Message,
    settings: &Settings,
    stats: &UsageStats,
    text: &str,
) -> Result<()> {
    if !is_admin(settings, msg) {
        bot.send_message(msg.chat.id, "Admin only").await?;
        return Ok(());
    }
    let text = text.trim();
    if text.is_empty() {
        bot.send_message(msg.chat.id, "Usage: /broadcast <message>")
            .await?;
        return Ok(());
    }

    let progress = bot.send_message(msg.chat.id, "📤 Sending...").await?;
    let mut sent = 0u32;
    let mut failed = 0u32;
    for user_id in stats.snapshot().user_ids {
        match bot.send_message(ChatId(user_id), text).await {
            Ok(_) => sent += 1,
            Err(e) => {
                warn!(user_id, error = %e, "broadcast send failed");
                failed += 1;
            }
        }
        tokio::time::sleep(BROADCAST_PAUSE).await;
    }

    bot.edit_message_text(
        msg.chat.id,
        progress.id,
        format!("Sent: {sent}\nFailed: {failed}"),
    )
    .await?;
    Ok(())
}

async fn adminhelp(bot: &Bot, msg: &Message, settings: &Settings) -> Result<()> {
    if !is_admin(settings, msg) {
        bot.send_message(msg.chat.id, "Admin only").await?;
        return Ok(());
    }
    bot.send_message(msg.chat.id, "/stats\n/broadcast <msg>\n/adminhelp")
        .await?;
    Ok(())
}

fn is_admin(settings: &Settings, msg: &Message) -> bool {
    settings.admin_ids().contains(&get_user_id_safe(msg))
}

fn format_uptime(snap: &StatsSnapshot) -> String {
    let uptime = Utc::now().signed_duration_since(snap.started_at);
    let days = uptime.num_days();
    let hours = uptime.num_hours() % 24;
    let minutes = uptime.num_minutes() % 60;
    format!("{days}d {hours}h {minutes}m")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_args_split_into_hint_and_url() {
        assert_eq!(
            parse_youtube_args("mp3 https://youtu.be/abc"),
            Some((Some(FormatHint::Mp3), "https://youtu.be/abc"))
        );
        assert_eq!(
            parse_youtube_args("https://youtu.be/abc"),
            Some((None, "https://youtu.be/abc"))
        );
    }

    #[test]
    fn lone_format_token_is_not_a_url() {
        assert_eq!(parse_youtube_args("mp3"), None);
        assert_eq!(parse_youtube_args("720"), None);
    }

    #[test]
    fn unknown_format_token_is_rejected() {
        assert_eq!(parse_youtube_args("4k https://youtu.be/abc"), None);
        assert_eq!(parse_youtube_args(""), None);
    }
}
