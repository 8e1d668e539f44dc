use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::message::{Message, MessageDraft, SenderRole};
use super::replies::{quick_messages, reply_for};
use crate::error::{Error, Result, ValidationError};
use crate::store::RecordStore;

/// Default delay before the simulated driver answers.
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(2000);

/// Outcome of [`ChatService::send`].
#[derive(Debug)]
pub struct SentMessage {
    pub message: Message,
    /// Present for rider messages.
    pub auto_reply: Option<AutoReply>,
}

/// A scheduled driver reply.
///
/// Dropping the handle leaves the reply scheduled; call
/// [`AutoReply::cancel`] to withdraw it.
#[derive(Debug)]
pub struct AutoReply {
    token: CancellationToken,
    task: JoinHandle<Result<Option<Message>>>,
}

impl AutoReply {
    /// Withdraw the reply. Once it is cancelled it is never stored.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the reply. `None` when it was cancelled first.
    pub async fn wait(self) -> Result<Option<Message>> {
        self.task
            .await
            .map_err(|err| Error::Storage(format!("auto-reply task failed: {err}")))?
    }
}

#[derive(Clone)]
pub struct ChatService {
    store: RecordStore<Message>,
    reply_delay: Duration,
}

impl ChatService {
    pub fn new(store: RecordStore<Message>) -> Self {
        Self {
            store,
            reply_delay: DEFAULT_REPLY_DELAY,
        }
    }

    pub fn with_reply_delay(mut self, reply_delay: Duration) -> Self {
        self.reply_delay = reply_delay;
        self
    }

    pub fn store(&self) -> &RecordStore<Message> {
        &self.store
    }

    pub fn quick_messages(&self) -> Vec<&'static str> {
        quick_messages()
    }

    /// Messages of one ride, oldest first.
    pub async fn list_messages(&self, ride_id: u64) -> Result<Vec<Message>> {
        let mut messages = self.store.find(|message| message.ride_id == ride_id).await?;
        messages.sort_by(|a, b| a.sent_at.cmp(&b.sent_at).then(a.id.cmp(&b.id)));
        Ok(messages)
    }

    /// Store a message. Rider messages also schedule the driver's reply; the
    /// call returns without waiting for it.
    pub async fn send(&self, ride_id: u64, sender: SenderRole, content: &str) -> Result<SentMessage> {
        self.send_scoped(ride_id, sender, content, CancellationToken::new())
            .await
    }

    /// Open a per-ride conversation whose pending replies die with it.
    pub fn open(&self, ride_id: u64) -> ChatSession {
        ChatSession {
            chat: self.clone(),
            ride_id,
            token: CancellationToken::new(),
        }
    }

    async fn send_scoped(
        &self,
        ride_id: u64,
        sender: SenderRole,
        content: &str,
        token: CancellationToken,
    ) -> Result<SentMessage> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ValidationError::EmptyMessage.into());
        }

        let message = self
            .store
            .create(MessageDraft {
                ride_id,
                sender,
                content: content.to_string(),
            })
            .await?;
        info!(ride_id, message_id = message.id, %sender, "message sent");

        let auto_reply = match sender {
            SenderRole::Rider => Some(self.schedule_reply(ride_id, reply_for(content), token)),
            SenderRole::Driver => None,
        };
        Ok(SentMessage {
            message,
            auto_reply,
        })
    }

    fn schedule_reply(&self, ride_id: u64, reply: &'static str, token: CancellationToken) -> AutoReply {
        debug!(ride_id, delay = ?self.reply_delay, "auto-reply scheduled");
        let task = tokio::spawn(deliver_reply(
            self.store.clone(),
            ride_id,
            reply,
            self.reply_delay,
            token.clone(),
        ));
        AutoReply { token, task }
    }
}

async fn deliver_reply(
    store: RecordStore<Message>,
    ride_id: u64,
    reply: &'static str,
    delay: Duration,
    cancelled: CancellationToken,
) -> Result<Option<Message>> {
    tokio::select! {
        biased;
        _ = cancelled.cancelled() => {
            debug!(ride_id, "auto-reply cancelled");
            return Ok(None);
        }
        _ = tokio::time::sleep(delay) => {}
    }

    let draft = MessageDraft {
        ride_id,
        sender: SenderRole::Driver,
        content: reply.to_string(),
    };
    // The store only commits after its latency wait, so dropping the create
    // while it waits leaves nothing behind.
    tokio::select! {
        biased;
        _ = cancelled.cancelled() => {
            debug!(ride_id, "auto-reply cancelled");
            Ok(None)
        }
        created = store.create(draft) => {
            let message = created?;
            debug!(ride_id, message_id = message.id, "auto-reply delivered");
            Ok(Some(message))
        }
    }
}

/// One ride's conversation as the rider sees it.
///
/// Closing or dropping the session withdraws every reply it is still
/// waiting on.
pub struct ChatSession {
    chat: ChatService,
    ride_id: u64,
    token: CancellationToken,
}

impl ChatSession {
    pub fn ride_id(&self) -> u64 {
        self.ride_id
    }

    pub async fn messages(&self) -> Result<Vec<Message>> {
        self.chat.list_messages(self.ride_id).await
    }

    /// Send as the rider.
    pub async fn send(&self, content: &str) -> Result<SentMessage> {
        self.chat
            .send_scoped(self.ride_id, SenderRole::Rider, content, self.token.child_token())
            .await
    }

    pub fn close(self) {}
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
