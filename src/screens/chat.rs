//! The chat assistant.
//!
//! Free-text prompts go to the backend's chat endpoint; replies accumulate
//! in a linear in-memory transcript for the REPL session. The request
//! carries the one client-side timeout in the application: if no response
//! arrives in time, a local fallback line joins the transcript and the
//! prompt stays usable. No streaming, no queueing, no user cancel.

use crate::api::Backend;
use crate::cli::Context;
use anyhow::Result;

pub const FALLBACK_REPLY: &str =
    "I'm having trouble connecting right now. Please try again in a moment.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speaker {
    You,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub speaker: Speaker,
    pub text: String,
}

/// Send one prompt and append both sides to the log. Any failure (timeout
/// included) becomes the local fallback line instead of an error alert.
pub fn send(backend: &dyn Backend, log: &mut Vec<ChatLine>, prompt: &str) -> bool {
    log.push(ChatLine {
        speaker: Speaker::You,
        text: prompt.to_string(),
    });
    match backend.chat(prompt) {
        Ok(reply) => {
            log.push(ChatLine {
                speaker: Speaker::Assistant,
                text: reply,
            });
            true
        }
        Err(_) => {
            log.push(ChatLine {
                speaker: Speaker::Assistant,
                text: FALLBACK_REPLY.to_string(),
            });
            false
        }
    }
}

/// The chat screen. With no argument, replays the transcript; with one,
/// sends it as a prompt.
pub fn screen(ctx: &Context, args: &str) -> Result<()> {
    let prompt = args.trim();
    if prompt.is_empty() {
        let log = ctx.chat_log.borrow();
        if log.is_empty() {
            println!("No conversation yet. Try /chat <question>.");
        } else {
            for line in log.iter() {
                render_line(line);
            }
        }
        return Ok(());
    }

    let _ = ctx.transcript.borrow_mut().chat_prompt(prompt);
    let mut log = ctx.chat_log.borrow_mut();
    let delivered = send(ctx.api.as_ref(), &mut log, prompt);
    if !delivered {
        let _ = ctx.transcript.borrow_mut().chat_fallback();
    }
    if let Some(line) = log.last() {
        render_line(line);
    }
    Ok(())
}

fn render_line(line: &ChatLine) {
    match line.speaker {
        Speaker::You => println!("you> {}", line.text),
        Speaker::Assistant => println!("bot> {}", line.text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockBackend;
    use crate::api::ApiError;

    #[test]
    fn test_reply_joins_transcript() {
        let backend = MockBackend::new();
        let mut log = Vec::new();
        assert!(send(&backend, &mut log, "how do targets work?"));
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].speaker, Speaker::You);
        assert_eq!(log[1].speaker, Speaker::Assistant);
        assert!(log[1].text.contains("how do targets work?"));
    }

    #[test]
    fn test_timeout_inserts_fallback_and_stays_usable() {
        let backend = MockBackend::new();
        *backend.fail_next.borrow_mut() =
            Some(ApiError::Transport("timed out reading response".to_string()));
        let mut log = Vec::new();
        assert!(!send(&backend, &mut log, "hello?"));
        assert_eq!(log[1].text, FALLBACK_REPLY);

        // The next prompt goes through; the screen was not left disabled.
        assert!(send(&backend, &mut log, "hello again"));
        assert_eq!(log.len(), 4);
        assert_eq!(backend.call_count("chat"), 2);
    }
}
