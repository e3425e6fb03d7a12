use std::sync::Arc;

use sqlchat::{ConversationController, IgnoreReason, SendOutcome};
use tokio::task::JoinSet;

/// REPL-side owner of the controller and of every send it has started
///
/// Sends run as background tasks so thread commands stay responsive while the
/// agent works. They are tracked so `shutdown` can let each one commit its
/// reply before the final snapshot.
pub struct Session {
    chat: Arc<ConversationController>,
    sends: JoinSet<()>,
}

impl Session {
    pub fn new(chat: Arc<ConversationController>) -> Self {
        Self {
            chat,
            sends: JoinSet::new(),
        }
    }

    pub fn chat(&self) -> &Arc<ConversationController> {
        &self.chat
    }

    /// Sends started and not yet reaped
    pub fn in_flight(&self) -> usize {
        self.sends.len()
    }

    pub fn ask(&mut self, question: String) {
        while let Some(finished) = self.sends.try_join_next() {
            if let Err(e) = finished {
                tracing::error!("Send task failed: {}", e);
            }
        }

        let chat = self.chat.clone();
        self.sends.spawn(async move {
            match chat.send(&question).await {
                SendOutcome::Ignored(IgnoreReason::Busy) => {
                    println!("Still waiting for the previous answer; question not sent")
                }
                SendOutcome::Discarded { thread_id } => {
                    println!("Chat {} was deleted before its answer arrived", thread_id)
                }
                _ => {}
            }
        });
    }

    /// Wait for every outstanding send to commit, then write a final snapshot
    pub async fn shutdown(mut self) -> bool {
        if !self.sends.is_empty() {
            println!("Waiting for the agent to finish answering...");
        }
        while let Some(finished) = self.sends.join_next().await {
            if let Err(e) = finished {
                tracing::error!("Send task failed: {}", e);
            }
        }
        self.chat.save_now()
    }
}
