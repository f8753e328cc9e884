//! Simulated streaming chat page.
//!
//! Stands in for a real browser driver integration: picks a canned reply
//! for the "sent" message and streams it into the region channel as
//! cumulative snapshots, a few characters per chunk.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;

use chatprobe_watch::{NotifyOutcome, RegionSender};

/// Canned reply for a user message, in the manner of a scripted demo bot.
pub fn reply_for(message: &str) -> String {
    match message.to_lowercase().trim() {
        "hello" => {
            "Hello! How can I assist you today? I am a helpful assistant ready to answer \
             your questions."
                .to_string()
        }
        "hi" => "Hi there! Great to meet you. How may I help you?".to_string(),
        other => format!(
            "Thank you for your message. I understand you said: \"{other}\". How can I help \
             you further?"
        ),
    }
}

/// Stream `response` into the channel as growing snapshots.
///
/// Stops early if the subscription side goes away.
pub fn stream_response(
    tx: RegionSender,
    response: String,
    chunk_size: usize,
    chunk_delay: Duration,
) -> JoinHandle<()> {
    let chunk_size = chunk_size.max(1);
    tokio::spawn(async move {
        let chars: Vec<char> = response.chars().collect();
        let mut upto = 0;
        while upto < chars.len() {
            upto = (upto + chunk_size).min(chars.len());
            let snapshot: String = chars[..upto].iter().collect();
            if tx.notify(snapshot) == NotifyOutcome::Closed {
                tracing::debug!("subscription dropped, stopping simulated stream");
                return;
            }
            sleep(chunk_delay).await;
        }
        tracing::debug!(chars = chars.len(), "simulated stream finished");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatprobe_watch::region_channel;

    #[test]
    fn known_messages_get_canned_replies() {
        assert!(reply_for("hello").starts_with("Hello!"));
        assert!(reply_for("HELLO ").starts_with("Hello!"));
        assert!(reply_for("hi").starts_with("Hi there!"));
    }

    #[test]
    fn unknown_message_echoed_in_fallback() {
        let reply = reply_for("what is rust");
        assert!(reply.contains("what is rust"));
    }

    #[tokio::test(start_paused = true)]
    async fn stream_settles_with_full_response() {
        let (tx, sub) = region_channel("", 256);
        let response = reply_for("hi");

        stream_response(tx, response.clone(), 4, Duration::from_millis(10));

        let result = chatprobe_watch::wait_until_settled(
            sub,
            Duration::from_millis(100),
            Duration::from_secs(10),
        )
        .await
        .expect("valid settings");

        assert!(result.is_completed());
        assert_eq!(result.final_text(), response);
    }
}
