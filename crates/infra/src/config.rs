use chrono::Duration;
use chrono_tz::Tz;
use passgate_domain::{
    default_reminder_bands, parse_role_list, AdmissionPolicy, DispatchProfile, ReminderBand, Role,
};
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Zone used for cron schedules and for dates shown to people
    pub timezone: Tz,
    /// Roles that only have to respect an event's own registration deadline
    pub baseline_roles: Vec<Role>,
    /// How long before an event starts registration closes for every role
    /// that is not a baseline role. There is no sensible default for this,
    /// when it is missing only the registration deadline applies.
    pub privileged_registration_cutoff: Option<Duration>,
    /// Roles that never get a pass automatically on registration
    pub pass_excluded_roles: Vec<Role>,
    pub dispatch_profiles: Vec<DispatchProfile>,
    /// Upper bound for one channel delivery inside a dispatch cycle
    pub dispatch_delivery_timeout: std::time::Duration,
    pub reminder_poll_interval: std::time::Duration,
    /// How far ahead the reminder scheduler looks for starting events.
    /// Has to cover the earliest edge of every reminder band.
    pub reminder_lookahead: Duration,
    pub reminder_bands: Vec<ReminderBand>,
    pub club_owner_reminder_schedule: String,
    pub chat: ChatConfig,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_url: String,
    pub bot_token: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parses the env var `key`, logging and falling back to `default` when it
/// is missing or malformed
fn parse_env<T: FromStr + std::fmt::Display>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    key, raw, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

const DEFAULT_REMINDER_POLL_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);
const DEFAULT_REMINDER_LOOKAHEAD_HOURS: i64 = 25;

/// Keeps the reminder poll interval and look-ahead consistent with `bands`.
///
/// The poll interval has to be non zero and shorter than the narrowest band,
/// otherwise a band can pass between two polls. The look-ahead has to reach
/// the latest edge of every band, otherwise those reminders are never due.
/// Invalid values are logged and replaced.
fn checked_reminder_timing(
    poll_interval: std::time::Duration,
    lookahead: Duration,
    bands: &[ReminderBand],
) -> (std::time::Duration, Duration) {
    let narrowest_band = bands.iter().filter_map(|b| b.width.to_std().ok()).min();
    let poll_interval = match narrowest_band {
        _ if poll_interval.is_zero() => {
            warn!(
                "The given REMINDER_POLL_INTERVAL_SECS is zero, falling back to the default: {:?}.",
                DEFAULT_REMINDER_POLL_INTERVAL
            );
            DEFAULT_REMINDER_POLL_INTERVAL
        }
        Some(width) if poll_interval >= width => {
            let fallback = std::cmp::min(DEFAULT_REMINDER_POLL_INTERVAL, width / 5);
            warn!(
                "The given reminder poll interval: {:?} is not shorter than the narrowest reminder band: {:?}, falling back to: {:?}.",
                poll_interval, width, fallback
            );
            fallback
        }
        _ => poll_interval,
    };

    let latest_edge = bands.iter().map(|b| b.latest()).max();
    let lookahead = match latest_edge {
        Some(edge) if lookahead < edge => {
            let fallback = std::cmp::max(Duration::hours(DEFAULT_REMINDER_LOOKAHEAD_HOURS), edge);
            warn!(
                "The given REMINDER_LOOKAHEAD_HOURS: {}h does not cover the latest reminder band edge: {}min, falling back to: {}h.",
                lookahead.num_hours(),
                edge.num_minutes(),
                fallback.num_hours()
            );
            fallback
        }
        _ => lookahead,
    };

    (poll_interval, lookahead)
}

fn default_dispatch_profiles(recipient_emails: &[String], chat_channel_id: Option<i64>) -> Vec<DispatchProfile> {
    vec![
        DispatchProfile {
            name: "weekday".into(),
            recipient_emails: recipient_emails.to_vec(),
            chat_channel_id,
            active: true,
            schedule: "0 0 16 * * Mon-Fri".into(),
        },
        DispatchProfile {
            name: "weekend".into(),
            recipient_emails: recipient_emails.to_vec(),
            chat_channel_id,
            active: true,
            schedule: "0 0 12 * * Sat".into(),
        },
    ]
}

impl Config {
    pub fn new() -> Self {
        let port = parse_env("PORT", 5000usize);

        let timezone = match std::env::var("TIMEZONE") {
            Ok(raw) => match raw.parse::<Tz>() {
                Ok(tz) => tz,
                Err(_) => {
                    warn!(
                        "The given TIMEZONE: {} is not a valid IANA zone, falling back to UTC.",
                        raw
                    );
                    Tz::UTC
                }
            },
            Err(_) => Tz::UTC,
        };

        let baseline_roles = parse_role_list(&env_or("BASELINE_ROLES", "student"));
        let privileged_registration_cutoff =
            match std::env::var("PRIVILEGED_REGISTRATION_CUTOFF_MINUTES") {
                Ok(raw) => match raw.trim().parse::<i64>() {
                    Ok(minutes) if minutes >= 0 => Some(Duration::minutes(minutes)),
                    _ => {
                        warn!(
                            "The given PRIVILEGED_REGISTRATION_CUTOFF_MINUTES: {} is not valid, only registration deadlines will apply.",
                            raw
                        );
                        None
                    }
                },
                Err(_) => {
                    warn!("Did not find PRIVILEGED_REGISTRATION_CUTOFF_MINUTES environment variable. Only registration deadlines will apply.");
                    None
                }
            };
        let pass_excluded_roles = parse_role_list(&env_or("PASS_EXCLUDED_ROLES", ""));

        let pass_emails = env_or("PASS_EMAILS", "")
            .split(',')
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .collect::<Vec<_>>();
        let pass_chat_id = match std::env::var("PASS_CHAT_ID") {
            Ok(raw) => match raw.trim().parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!("The given PASS_CHAT_ID: {} is not a valid chat id, ignoring it.", raw);
                    None
                }
            },
            Err(_) => None,
        };
        let dispatch_profiles = match std::env::var("PASS_DISPATCH_PROFILES") {
            Ok(raw) => match serde_json::from_str::<Vec<DispatchProfile>>(&raw) {
                Ok(profiles) => profiles,
                Err(e) => {
                    warn!(
                        "The given PASS_DISPATCH_PROFILES could not be parsed: {}, falling back to the default profiles.",
                        e
                    );
                    default_dispatch_profiles(&pass_emails, pass_chat_id)
                }
            },
            Err(_) => default_dispatch_profiles(&pass_emails, pass_chat_id),
        };
        info!(
            "Loaded {} pass dispatch profiles: {:?}",
            dispatch_profiles.len(),
            dispatch_profiles.iter().map(|p| &p.name).collect::<Vec<_>>()
        );

        let dispatch_delivery_timeout =
            std::time::Duration::from_secs(parse_env("DISPATCH_DELIVERY_TIMEOUT_SECS", 300u64));
        let reminder_bands = default_reminder_bands();
        let (reminder_poll_interval, reminder_lookahead) = checked_reminder_timing(
            std::time::Duration::from_secs(parse_env(
                "REMINDER_POLL_INTERVAL_SECS",
                DEFAULT_REMINDER_POLL_INTERVAL.as_secs(),
            )),
            Duration::hours(parse_env(
                "REMINDER_LOOKAHEAD_HOURS",
                DEFAULT_REMINDER_LOOKAHEAD_HOURS,
            )),
            &reminder_bands,
        );

        let chat = ChatConfig {
            api_url: env_or("CHAT_API_URL", "https://api.telegram.org"),
            bot_token: env_or("CHAT_BOT_TOKEN", ""),
        };
        if chat.bot_token.is_empty() {
            warn!("Did not find CHAT_BOT_TOKEN environment variable. Chat deliveries will fail.");
        }
        let smtp = SmtpConfig {
            host: env_or("SMTP_HOST", "localhost"),
            port: parse_env("SMTP_PORT", 587u16),
            username: env_or("SMTP_USERNAME", ""),
            password: env_or("SMTP_PASSWORD", ""),
            from: env_or("SMTP_FROM", ""),
        };

        Self {
            port,
            timezone,
            baseline_roles,
            privileged_registration_cutoff,
            pass_excluded_roles,
            dispatch_profiles,
            dispatch_delivery_timeout,
            reminder_poll_interval,
            reminder_lookahead,
            reminder_bands,
            club_owner_reminder_schedule: env_or("CLUB_OWNER_REMINDER_SCHEDULE", "0 0 16 * * Fri"),
            chat,
            smtp,
        }
    }

    pub fn admission_policy(&self) -> AdmissionPolicy {
        AdmissionPolicy {
            baseline_roles: self.baseline_roles.clone(),
            extended_cutoff: self.privileged_registration_cutoff,
        }
    }

    pub fn is_pass_excluded(&self, role: &Role) -> bool {
        self.pass_excluded_roles.iter().any(|r| r == role)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profiles_share_recipients() {
        let profiles = default_dispatch_profiles(&["ops@club.org".to_string()], Some(-100));
        assert_eq!(profiles.len(), 2);
        assert!(profiles.iter().all(|p| p.active));
        assert!(profiles
            .iter()
            .all(|p| p.recipient_emails == vec!["ops@club.org".to_string()]));
        assert_eq!(profiles[0].schedule, "0 0 16 * * Mon-Fri");
        assert_eq!(profiles[1].schedule, "0 0 12 * * Sat");
    }

    #[test]
    fn zero_poll_interval_falls_back_to_default() {
        let (poll, _) = checked_reminder_timing(
            std::time::Duration::ZERO,
            Duration::hours(25),
            &default_reminder_bands(),
        );
        assert_eq!(poll, DEFAULT_REMINDER_POLL_INTERVAL);
    }

    #[test]
    fn poll_interval_has_to_be_shorter_than_narrowest_band() {
        let bands = default_reminder_bands();
        let (poll, _) =
            checked_reminder_timing(std::time::Duration::from_secs(300), Duration::hours(25), &bands);
        assert_eq!(poll, DEFAULT_REMINDER_POLL_INTERVAL);

        let (poll, _) =
            checked_reminder_timing(std::time::Duration::from_secs(30), Duration::hours(25), &bands);
        assert_eq!(poll, std::time::Duration::from_secs(30));

        // Fallback stays below a band narrower than the default interval
        let mut narrow = ReminderBand::hour_before();
        narrow.width = Duration::seconds(100);
        let (poll, _) = checked_reminder_timing(
            std::time::Duration::from_secs(120),
            Duration::hours(25),
            &[narrow],
        );
        assert_eq!(poll, std::time::Duration::from_secs(20));
    }

    #[test]
    fn lookahead_has_to_cover_latest_band_edge() {
        let bands = default_reminder_bands();
        let poll = std::time::Duration::from_secs(60);

        let (_, lookahead) = checked_reminder_timing(poll, Duration::hours(24), &bands);
        assert_eq!(lookahead, Duration::hours(25));
        assert!(bands.iter().all(|b| b.latest() <= lookahead));

        let (_, lookahead) = checked_reminder_timing(poll, Duration::hours(30), &bands);
        assert_eq!(lookahead, Duration::hours(30));

        let mut far = ReminderBand::day_before();
        far.offset = Duration::hours(48);
        let (_, lookahead) = checked_reminder_timing(poll, Duration::hours(25), &[far.clone()]);
        assert_eq!(lookahead, far.latest());
    }

    #[test]
    fn excluded_roles_are_matched_case_insensitive() {
        let mut config = Config::new();
        config.pass_excluded_roles = parse_role_list("Staff, guest");
        assert!(config.is_pass_excluded(&Role::new("staff")));
        assert!(!config.is_pass_excluded(&Role::new("student")));
    }
}
