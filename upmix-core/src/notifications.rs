// upmix-core/src/notifications.rs
//
// Module for handling ntfy notifications.

use crate::error::{CoreError, CoreResult};
use ntfy::DispatcherBuilder;
use ntfy::error::Error as NtfyError;
use ntfy::payload::{Payload, Priority as NtfyPriority};
use url::Url;

/// Trait for sending notifications.
pub trait Notifier: Send + Sync {
    /// Sends a notification.
    fn send(
        &self,
        topic_url: &str,
        message: &str,
        title: Option<&str>,
        priority: Option<u8>,
        tags: Option<&str>,
    ) -> CoreResult<()>;
}

/// Implementation of `Notifier` using the `ntfy` crate (blocking).
#[derive(Debug, Default)]
pub struct NtfyNotifier;

impl NtfyNotifier {
    /// Creates a new NtfyNotifier.
    pub fn new() -> CoreResult<Self> {
        Ok(Self)
    }
}

// Helper function to map u8 priority to ntfy::Priority
fn map_priority(p: u8) -> Option<NtfyPriority> {
    match p {
        1 => Some(NtfyPriority::Min),
        2 => Some(NtfyPriority::Low),
        3 => Some(NtfyPriority::Default),
        4 => Some(NtfyPriority::High),
        5 => Some(NtfyPriority::Max),
        _ => None,
    }
}

impl Notifier for NtfyNotifier {
    fn send(
        &self,
        topic_url: &str,
        message: &str,
        title: Option<&str>,
        priority: Option<u8>,
        tags: Option<&str>,
    ) -> CoreResult<()> {
        // Parse the full topic URL and split it into base URL and topic.
        let parsed_url = Url::parse(topic_url).map_err(|e| {
            CoreError::NotificationFailed(format!("Invalid ntfy topic URL '{topic_url}': {e}"))
        })?;

        let host = match parsed_url.host_str() {
            Some(h) if !h.is_empty() => h,
            _ => {
                return Err(CoreError::NotificationFailed(format!(
                    "URL '{topic_url}' must have a non-empty host"
                )));
            }
        };

        let base_url = format!("{}://{}", parsed_url.scheme(), host);

        let topic = parsed_url.path().trim_start_matches('/');
        if topic.is_empty() {
            return Err(CoreError::NotificationFailed(format!(
                "URL '{topic_url}' is missing topic path"
            )));
        }

        let dispatcher = DispatcherBuilder::new(&base_url)
            .build_blocking()
            .map_err(|e: NtfyError| {
                CoreError::NotificationFailed(format!(
                    "Failed to build ntfy dispatcher for {base_url}: {e}"
                ))
            })?;

        let mut payload_builder = Payload::new(topic).message(message);

        if let Some(t) = title {
            payload_builder = payload_builder.title(t);
        }

        if let Some(p_val) = priority {
            if let Some(ntfy_p) = map_priority(p_val) {
                payload_builder = payload_builder.priority(ntfy_p);
            } else {
                log::warn!("Invalid ntfy priority value provided: {p_val}");
            }
        }

        // Combine input tags with "upmix"
        let mut final_tags: Vec<String> = tags
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();

        if !final_tags.iter().any(|t| t == "upmix") {
            final_tags.push("upmix".to_string());
        }
        if !final_tags.is_empty() {
            payload_builder = payload_builder.tags(final_tags);
        }

        let final_payload = payload_builder;

        dispatcher.send(&final_payload).map_err(|e: NtfyError| {
            CoreError::NotificationFailed(format!(
                "Failed to send ntfy notification to {topic_url}: {e}"
            ))
        })
    }
}
